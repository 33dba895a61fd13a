//! User-facing notifications
//!
//! The catalog has no UI. Whatever presents errors and confirmations to a
//! user (dialogs, a CLI, a log) implements [`CatalogObserver`].

use tracing::{error, info};

use crate::error::CatalogError;

pub trait CatalogObserver {
    /// An operation failed and a user should hear about it
    fn report_error(&self, context: &str, error: &CatalogError);

    /// Accepted sorts changed; consumers holding summaries should refresh
    fn sorts_changed(&self) {}

    /// A single import went through
    fn import_confirmed(&self, _message: &str) {}
}

/// Sends everything to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CatalogObserver for TracingObserver {
    fn report_error(&self, context: &str, error: &CatalogError) {
        error!(%context, %error, "sort catalog error");
    }

    fn sorts_changed(&self) {
        info!("sort list changed");
    }

    fn import_confirmed(&self, message: &str) {
        info!("{}", message);
    }
}
