use std::sync::{Mutex, MutexGuard};

use codechat_core::ingest::IngestionKind;
use codechat_core::{CodechatError, Result};
use tokio::sync::{Semaphore, SemaphorePermit};

/// Single in-flight ingestion token.
///
/// Acquisition never waits: a second submission while one is running is
/// rejected with [`CodechatError::OperationInProgress`].
#[derive(Debug)]
pub struct IngestionSlot {
    semaphore: Semaphore,
    holder: Mutex<Option<IngestionKind>>,
}

impl Default for IngestionSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestionSlot {
    pub fn new() -> Self {
        Self {
            semaphore: Semaphore::new(1),
            holder: Mutex::new(None),
        }
    }

    pub fn try_acquire(&self, kind: IngestionKind) -> Result<IngestionPermit<'_>> {
        match self.semaphore.try_acquire() {
            Ok(permit) => {
                *self.lock_holder() = Some(kind);
                tracing::debug!("[IngestionSlot] Acquired for {}", kind);
                Ok(IngestionPermit {
                    _permit: permit,
                    slot: self,
                })
            }
            Err(_) => {
                let current = self.current().unwrap_or(kind);
                Err(CodechatError::OperationInProgress { current })
            }
        }
    }

    /// Kind of the ingestion currently holding the slot.
    pub fn current(&self) -> Option<IngestionKind> {
        *self.lock_holder()
    }

    pub fn is_busy(&self) -> bool {
        self.semaphore.available_permits() == 0
    }

    fn lock_holder(&self) -> MutexGuard<'_, Option<IngestionKind>> {
        // The guarded value is a plain Copy enum; a poisoned lock still holds a valid one.
        self.holder.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Held for the duration of one ingestion; frees the slot on drop.
pub struct IngestionPermit<'a> {
    _permit: SemaphorePermit<'a>,
    slot: &'a IngestionSlot,
}

impl Drop for IngestionPermit<'_> {
    fn drop(&mut self) {
        *self.slot.lock_holder() = None;
        tracing::debug!("[IngestionSlot] Released");
    }
}
