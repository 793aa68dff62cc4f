pub mod build_info;

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "crm_portal=info,portal_core=info,portal_store_json=info";

/// Installs the global `tracing` subscriber, writing to stderr so command
/// output on stdout stays machine-readable. Callers should go through
/// [`crate::init_with_filter`], which guards this with a `Once`.
pub fn init_tracing(filter: Option<&str>) {
    let directive = filter.unwrap_or(DEFAULT_DIRECTIVE);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
