//! Cooperative cancellation untuk blocking wait
//!
//! Pengganti "signal pending" di wait loop: token di-cek setiap iterasi,
//! wait yang dibatalkan kembali sebagai `PipeError::Interrupted`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Clone berbagi flag yang sama.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tandai token sebagai cancelled
    ///
    /// Waiter yang sedang parkir baru melihatnya setelah bangun; pakai
    /// `RingBuffer::interrupt` untuk cancel + membangunkan sekaligus.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline(always)]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Re-arm token setelah caller menangani interrupt
    #[inline]
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}
