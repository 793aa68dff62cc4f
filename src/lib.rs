#![doc(test(attr(deny(warnings))))]

//! CRM Portal bundles the list engine, trip planner and map finder from
//! `portal-core` with a JSON record store and a small terminal front-end.

pub mod cli;
pub mod errors;
pub mod utils;

pub use errors::PortalError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(None);
}

/// Initializes global tracing once. `RUST_LOG` wins over `filter`, which
/// wins over the built-in `crm_portal=info` default.
pub fn init_with_filter(filter: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::debug!("CRM Portal tracing initialized.");
    });
}
