//! Listing-view invalidation seam.
//!
//! Mutating workflow operations invalidate the admin listing view after a
//! successful write so subsequent reads reflect the change. Invalidation is
//! fire-and-forget: a failure is logged and never fails the operation or
//! rolls back the write.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

/// The admin listing view mutations invalidate.
pub const ADMIN_VIEW: &str = "/admin";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

pub trait ListingCache: Send + Sync {
    fn invalidate(&self, view: &str) -> Result<(), CacheError>;
}

/// Epoch counter per view. Readers compare epochs to decide whether a
/// rendered listing is stale.
#[derive(Default)]
pub struct ViewCache {
    epochs: Mutex<HashMap<String, u64>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current epoch for a view (0 if never invalidated).
    pub fn epoch(&self, view: &str) -> u64 {
        self.epochs
            .lock()
            .map(|map| map.get(view).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl ListingCache for ViewCache {
    fn invalidate(&self, view: &str) -> Result<(), CacheError> {
        let mut map = self
            .epochs
            .lock()
            .map_err(|_| CacheError::Unavailable("epoch lock poisoned".into()))?;
        *map.entry(view.to_string()).or_insert(0) += 1;
        tracing::debug!(view, "listing cache invalidated");
        Ok(())
    }
}

/// Cache that does nothing — for callers without a cached listing layer.
pub struct NoopCache;

impl ListingCache for NoopCache {
    fn invalidate(&self, _view: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
