use crate::error::MockademyResult;
pub use tracing::instrument;
pub use tracing::{debug, error, info, trace, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber.
///
/// Log verbosity is controlled through `RUST_LOG`; requests and dataset
/// loading log at `info` and below by default.
pub fn init_tracing() -> MockademyResult<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .init();
    Ok(())
}
