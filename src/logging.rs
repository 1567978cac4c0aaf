// 13.0 logging.rs: tracing subscriber for the simulator and embedding services.
// RUST_LOG wins when set; otherwise info, or debug with verbose.

use tracing_subscriber::EnvFilter;

pub fn default_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "cds_core=debug,info" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install a global fmt subscriber. Safe to call twice; the second call is a no-op.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(default_filter(verbose))
        .with_target(true)
        .try_init();
}
