use tracing_subscriber::EnvFilter;

use crate::config::RuntimeConfig;

/// Install the global fmt subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init_tracing(runtime: &RuntimeConfig) {
    let filter = EnvFilter::try_new(&runtime.log_level)
        .unwrap_or_else(|_| EnvFilter::new("chart_studio=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
