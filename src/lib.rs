pub mod analysis; // Report analysis client (hosted vision model)
pub mod analysis_gate; // One-at-a-time busy flag
pub mod chart; // Dashboard trend data
pub mod config;
pub mod models;
pub mod session; // In-memory reports, vitals, view state
pub mod upload; // Upload → analyze → store workflow

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Safe to call more than once;
/// later calls are no-ops.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
