use tracing_subscriber::{EnvFilter, fmt};

/// Map a `--terragrunt-log-level` value onto a tracing level directive.
///
/// `panic` and `fatal` have no tracing counterpart and map to `error`.
pub fn parse_log_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "panic" | "fatal" | "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}

/// Install the stderr subscriber. `RUST_LOG` overrides `level` when set.
///
/// Only the first call in a process installs anything.
pub fn init(level: &str, disable_colors: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!disable_colors)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_onto_tracing() {
        assert_eq!(parse_log_level("FATAL"), Some("error"));
        assert_eq!(parse_log_level("warning"), Some("warn"));
        assert_eq!(parse_log_level(" debug "), Some("debug"));
        assert_eq!(parse_log_level("loud"), None);
    }
}
