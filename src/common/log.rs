use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber honoring `RUST_LOG`. Hosts that embed the
/// switcher into their own tracing setup can skip this.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
