//! Help rendering for the app and its commands.

use std::io::Write;

use crate::command::Command;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::flags::Flags;

const INDENT: &str = "   ";

/// App-level help: name, usage, commands and the options of the resolved
/// command (or the global options when it has none).
pub fn app_help(ctx: &Context<'_>) -> String {
    let app = ctx.app();
    let mut out = String::new();

    section(&mut out, "NAME", &title(&app.name, &app.usage));

    let usage = if app.usage_text.trim().is_empty() {
        format!("{} <command> [options]", app.name)
    } else {
        app.usage_text.trim().to_string()
    };
    section(&mut out, "USAGE", &usage);

    if !app.description.trim().is_empty() {
        section(&mut out, "DESCRIPTION", app.description.trim());
    }

    let commands = command_rows(&app.commands.visible_commands());
    if !commands.is_empty() {
        section(&mut out, "COMMANDS", &commands);
    }

    let options = match ctx.command() {
        Some(command) if !command.flags.is_empty() => flag_rows(&command.flags),
        _ => flag_rows(&app.flags),
    };
    if !options.is_empty() {
        section(&mut out, "OPTIONS", &options);
    }

    if !app.version.trim().is_empty() {
        section(&mut out, "VERSION", app.version.trim());
    }
    if !app.authors.is_empty() {
        section(&mut out, "AUTHOR", &app.authors.join("\n"));
    }
    out
}

/// Help for one command: name, usage, subcommands and its own options.
pub fn command_help(ctx: &Context<'_>, command: &Command) -> String {
    let app = ctx.app();
    let mut out = String::new();
    let full_name = format!("{} {}", app.name, command.help_name());

    section(&mut out, "NAME", &title(&full_name, &command.usage));

    let usage = if command.usage_text.trim().is_empty() {
        let mut usage = full_name.clone();
        if !command.subcommands.is_empty() {
            usage.push_str(" <command>");
        }
        if !command.flags.is_empty() {
            usage.push_str(" [options]");
        }
        usage
    } else {
        command.usage_text.trim().to_string()
    };
    section(&mut out, "USAGE", &usage);

    if !command.description.trim().is_empty() {
        section(&mut out, "DESCRIPTION", command.description.trim());
    }

    let subcommands = command_rows(&command.subcommands.visible_commands());
    if !subcommands.is_empty() {
        section(&mut out, "COMMANDS", &subcommands);
    }

    let options = flag_rows(&command.flags);
    if !options.is_empty() {
        section(&mut out, "OPTIONS", &options);
    }
    out
}

/// Write the app help to the app's writer.
pub fn show_app_help(ctx: &Context<'_>) -> Result<()> {
    let text = app_help(ctx);
    ctx.app().writer().write_all(text.as_bytes())?;
    Ok(())
}

/// Write the help of the registered command known by `name`.
pub fn show_command_help(ctx: &Context<'_>, name: &str) -> Result<()> {
    let command = ctx
        .app()
        .commands
        .get(name)
        .ok_or_else(|| Error::CommandNotFound(name.to_string()))?;
    let text = command_help(ctx, command);
    ctx.app().writer().write_all(text.as_bytes())?;
    Ok(())
}

fn title(name: &str, usage: &str) -> String {
    if usage.trim().is_empty() {
        name.to_string()
    } else {
        format!("{name} - {}", usage.trim())
    }
}

fn section(out: &mut String, heading: &str, body: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(heading);
    out.push_str(":\n");
    for line in body.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!("{INDENT}{line}\n"));
        }
    }
}

fn command_rows(commands: &[&Command]) -> String {
    let rows: Vec<(String, String)> = commands
        .iter()
        .map(|cmd| {
            let names: Vec<&str> = std::iter::once(cmd.help_name())
                .chain(cmd.aliases.iter().map(String::as_str))
                .collect();
            (names.join(", "), cmd.usage.trim().to_string())
        })
        .collect();
    aligned(&rows)
}

fn flag_rows(flags: &Flags) -> String {
    let rows: Vec<(String, String)> = flags
        .visible()
        .map(|flag| split_row(&flag.to_string()))
        .collect();
    aligned(&rows)
}

fn split_row(line: &str) -> (String, String) {
    match line.split_once('\t') {
        Some((left, right)) => (left.to_string(), right.to_string()),
        None => (line.to_string(), String::new()),
    }
}

fn aligned(rows: &[(String, String)]) -> String {
    let width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (left, right) in rows {
        if right.is_empty() {
            out.push_str(&format!("{left}\n"));
        } else {
            out.push_str(&format!("{left:width$}   {right}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::args::Args;
    use crate::command::Commands;
    use crate::context::ExecContext;
    use crate::flag_set::FlagSet;
    use crate::flags::{BoolFlag, GenericFlag};

    fn app() -> App {
        let mut app = App::new("tgwrap");
        app.usage = "Thin wrapper around terraform".to_string();
        app.version = "0.1.0".to_string();
        app.authors = vec!["Platform Team".to_string()];
        app.flags.add(BoolFlag::new("help").alias("h").usage("Show help"));
        app.commands = Commands::new()
            .with(Command::new("run-all").usage("Run a command on every module"))
            .with(Command::new("spin-up").hidden())
            .with(
                Command::new("terragrunt-info")
                    .alias("info")
                    .usage("Print resolved options")
                    .flags(
                        Flags::new()
                            .with(GenericFlag::<String>::new("terragrunt-config").usage("Config file"))
                            .with(BoolFlag::new("hidden-one").hidden()),
                    ),
            )
            .with(Command::new("*").usage("Forward to terraform"));
        app
    }

    fn root(app: &App) -> Context<'_> {
        Context::new(app, ExecContext::new(), Args::default(), FlagSet::new(), Vec::new())
    }

    #[test]
    fn app_help_lists_visible_commands_in_order() {
        let app = app();
        let text = app_help(&root(&app));

        assert!(text.starts_with("NAME:\n   tgwrap - Thin wrapper around terraform\n"), "{text}");
        assert!(text.contains("USAGE:\n   tgwrap <command> [options]\n"), "{text}");
        assert!(!text.contains("spin-up"), "{text}");
        let run_all = text.find("run-all").unwrap();
        let info = text.find("terragrunt-info, info").unwrap();
        let star = text.find("*   ").unwrap();
        assert!(run_all < info && info < star, "{text}");
        assert!(text.contains("--help, -h   Show help"), "{text}");
        assert!(text.contains("VERSION:\n   0.1.0\n"), "{text}");
        assert!(text.contains("AUTHOR:\n   Platform Team\n"), "{text}");
    }

    #[test]
    fn command_rows_are_aligned() {
        let app = app();
        let text = app_help(&root(&app));
        assert!(text.contains("   run-all                 Run a command on every module\n"), "{text}");
        assert!(text.contains("   terragrunt-info, info   Print resolved options\n"), "{text}");
    }

    #[test]
    fn command_help_shows_its_visible_options() {
        let app = app();
        let ctx = root(&app);
        let command = app.commands.get("info").unwrap();
        let text = command_help(&ctx, command);

        assert!(text.contains("NAME:\n   tgwrap terragrunt-info - Print resolved options\n"), "{text}");
        assert!(text.contains("USAGE:\n   tgwrap terragrunt-info [options]\n"), "{text}");
        assert!(text.contains("--terragrunt-config value   Config file"), "{text}");
        assert!(!text.contains("hidden-one"), "{text}");
        assert!(!text.contains("COMMANDS"), "{text}");
    }

    #[test]
    fn listing_uses_the_help_name() {
        let app = app();
        app.commands
            .get("run-all")
            .unwrap()
            .set_help_name("run-all <command>");
        let text = app_help(&root(&app));
        assert!(text.contains("   run-all <command>       Run a command on every module\n"), "{text}");
        assert!(text.contains("   terragrunt-info, info   Print resolved options\n"), "{text}");
    }

    #[test]
    fn usage_text_overrides_generated_usage() {
        let mut app = app();
        app.usage_text = "tgwrap [global options] <terraform command>".to_string();
        let text = app_help(&root(&app));
        assert!(text.contains("USAGE:\n   tgwrap [global options] <terraform command>\n"), "{text}");
    }

    #[test]
    fn unknown_command_help_is_an_error() {
        let app = app();
        let err = show_command_help(&root(&app), "plan").unwrap_err();
        assert!(matches!(err, Error::CommandNotFound(ref name) if name == "plan"));
    }
}
