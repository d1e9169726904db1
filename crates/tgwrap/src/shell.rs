//! Running the wrapped terraform binary.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result, bail};
use tgwrap_cli::ExitCode;
use tracing::debug;

use crate::options::TerragruntOptions;

/// Run terraform with `args` in the options' working dir and environment.
///
/// A non-zero exit is returned as [`ExitCode`] so the status reaches the
/// process exit unchanged.
pub fn run_terraform_command(opts: &TerragruntOptions, args: &[String]) -> Result<()> {
    debug!(
        binary = %opts.terraform_path,
        dir = %opts.working_dir,
        args = ?args,
        "running terraform"
    );

    let mut cmd = Command::new(&opts.terraform_path);
    cmd.args(args).envs(&opts.env);
    if !opts.working_dir.is_empty() {
        cmd.current_dir(&opts.working_dir);
    }

    let status = if opts.output_prefix.is_empty() {
        cmd.status()
            .with_context(|| format!("failed to run {}", opts.terraform_path))?
    } else {
        run_prefixed(&mut cmd, &opts.output_prefix)
            .with_context(|| format!("failed to run {}", opts.terraform_path))?
    };

    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(ExitCode(code))
            .with_context(|| format!("{} {} exited with {status}", opts.terraform_path, args.join(" "))),
        None => bail!("{} terminated by a signal", opts.terraform_path),
    }
}

fn run_prefixed(cmd: &mut Command, prefix: &str) -> Result<ExitStatus> {
    let mut child = cmd.stdout(Stdio::piped()).spawn()?;
    let copied = match child.stdout.take() {
        Some(stdout) => copy_prefixed(stdout, &mut std::io::stdout().lock(), prefix),
        None => Ok(()),
    };
    // Reap the child even when copying its output failed.
    let status = child.wait()?;
    copied?;
    Ok(status)
}

/// Copy `input` line by line to `out`, prefixing each line. Bytes that are
/// not UTF-8 are replaced rather than rejected.
fn copy_prefixed(input: impl Read, out: &mut impl Write, prefix: &str) -> io::Result<()> {
    let mut reader = BufReader::new(input);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&line);
        writeln!(out, "{prefix}{}", text.trim_end_matches(['\n', '\r']))?;
    }
}
