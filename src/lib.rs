//! Caredesk — credentialing & payout workflow backend of a telehealth
//! platform.
//!
//! Callers (HTTP handlers, RPC servers, CLIs) resolve an [`identity::AuthzContext`]
//! once per request and invoke the operations in [`admin`] against a shared
//! [`store::Store`]. Transport, rendering, and session mechanics stay outside
//! this crate.

pub mod admin;
pub mod cache;
pub mod config;
pub mod db;
pub mod identity;
pub mod models;
pub mod store;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding the workflow.
///
/// Honors `RUST_LOG`, falling back to the crate-scoped default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
