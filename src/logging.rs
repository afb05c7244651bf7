use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber, writing to stderr so command
/// output on stdout stays machine-readable. `RUST_LOG` takes precedence
/// over `default_level`. Calling this twice is a no-op.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
