use tracing_subscriber::EnvFilter;

/// Level directive for the subscriber. `--verbose` wins over `--log-level`.
pub fn resolve_level(
    log_level: &str,
    verbose: bool,
) -> &str {
    if verbose { "debug" } else { log_level }
}

/// Installs the global subscriber on stderr.
///
/// `RUST_LOG` takes precedence over `level`. Timestamps and targets are
/// stripped so the output reads like plain CLI messages. Calling this twice
/// is harmless.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}
