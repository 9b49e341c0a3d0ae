use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,tennis_injury=debug";

/// Installs the global subscriber. `RUST_LOG` wins over `override_filter`.
pub fn init_logging(override_filter: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(override_filter.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
