//! Poll registration dengan `mio::Waker`
//!
//! Setara `poll_wait` pada kedua wait queue: event loop mendaftarkan
//! waker-nya, dan setiap transfer yang berhasil membangunkan semuanya.
//! Setelah bangun, event loop memanggil `Handle::poll()` untuk snapshot.

use std::collections::HashMap;
use std::ops::{BitOr, BitOrAssign};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mio::Waker;
use parking_lot::Mutex;

/// Poll event mask (`POLLIN`, `POLLOUT`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollMask(libc::c_short);

impl PollMask {
    pub const EMPTY: Self = Self(0);
    pub const IN: Self = Self(libc::POLLIN);
    pub const RDNORM: Self = Self(libc::POLLRDNORM);
    pub const OUT: Self = Self(libc::POLLOUT);
    pub const WRNORM: Self = Self(libc::POLLWRNORM);

    /// Mask yang dilaporkan saat ada data
    pub const READABLE: Self = Self(libc::POLLIN | libc::POLLRDNORM);
    /// Mask yang dilaporkan saat ada ruang
    pub const WRITABLE: Self = Self(libc::POLLOUT | libc::POLLWRNORM);

    #[inline(always)]
    pub fn bits(self) -> libc::c_short {
        self.0
    }

    #[inline(always)]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline(always)]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for PollMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PollMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Key untuk deregister waker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WakerKey(usize);

/// Daftar waker yang menunggu perubahan occupancy
#[derive(Debug, Default)]
pub struct PollSet {
    wakers: Mutex<HashMap<WakerKey, Arc<Waker>>>,
    next_key: AtomicUsize,
}

impl PollSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, waker: Arc<Waker>) -> WakerKey {
        let key = WakerKey(self.next_key.fetch_add(1, Ordering::Relaxed));
        self.wakers.lock().insert(key, waker);
        key
    }

    /// Returns `true` jika key masih terdaftar
    pub fn deregister(&self, key: WakerKey) -> bool {
        self.wakers.lock().remove(&key).is_some()
    }

    pub fn len(&self) -> usize {
        self.wakers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.wakers.lock().is_empty()
    }

    /// Bangunkan semua event loop yang terdaftar
    ///
    /// Waker yang gagal tetap terdaftar; error-nya hanya di-log.
    pub fn wake_all(&self) {
        let wakers: Vec<(WakerKey, Arc<Waker>)> = self
            .wakers
            .lock()
            .iter()
            .map(|(key, waker)| (*key, Arc::clone(waker)))
            .collect();

        for (key, waker) in wakers {
            if let Err(e) = waker.wake() {
                log::warn!("poll waker {:?} failed: {}", key, e);
            }
        }
    }
}
