//! Shared concurrency gate
//!
//! One gate bounds every sitemap fetch and page prime of a run, so a large
//! sitemap index competes for the same budget as the pages it lists.

use crate::PrimerError;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting gate with `capacity` slots
///
/// A slot is held for as long as the returned permit lives, and is released
/// when the permit is dropped, including on early return or panic.
#[derive(Debug, Clone)]
pub struct Throttle {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl Throttle {
    /// Creates a gate with `capacity` slots (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free slot
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, PrimerError> {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PrimerError::ThrottleClosed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots not currently held
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
