use tracing_subscriber::EnvFilter;

/// Builds the log filter: `RUST_LOG` wins, then `configured`, and an invalid
/// expression falls back to `warn`.
pub fn env_filter(configured: &str) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match configured.parse::<EnvFilter>() {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!(
                    "WARN: log level '{}' is not a valid tracing filter ({}); falling back to 'warn'",
                    configured, e
                );
                EnvFilter::new("warn")
            }
        },
    }
}

/// Installs the global subscriber. Logs go to stderr so they never mix with
/// the conversation on stdout.
pub fn init(configured: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
