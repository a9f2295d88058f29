//! Blocking Byte Ring Buffer
//!
//! Satu mutex melindungi storage dan kedua cursor sebagai satu unit.
//! Reader parkir di `not_empty`, writer parkir di `not_full`; lock dilepas
//! selama parkir dan setiap waiter re-check kondisinya di dalam loop.
//!
//! Satu slot selalu dibiarkan kosong:
//! - empty: `read_cursor == write_cursor`
//! - full:  `write_cursor` tepat satu slot di belakang `read_cursor`
//!
//! Jadi kapasitas yang bisa dipakai adalah `capacity - 1` bytes.

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::cancel::CancelToken;
use super::region::Region;
use crate::config::PipeConfig;
use crate::error::{PipeError, Result};

/// Blocking atau non-blocking, setara dengan `O_NONBLOCK`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Blocking,
    NonBlocking,
}

impl Mode {
    #[inline(always)]
    pub fn from_nonblocking(nonblocking: bool) -> Self {
        if nonblocking {
            Self::NonBlocking
        } else {
            Self::Blocking
        }
    }
}

/// Snapshot readiness untuk caller gaya poll/select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Readiness {
    pub readable: bool,
    pub writable: bool,
}

/// State yang dilindungi lock
struct Ring {
    storage: Region,
    read_cursor: usize,
    write_cursor: usize,
}

impl Ring {
    fn new(storage: Region) -> Self {
        Self {
            storage,
            read_cursor: 0,
            write_cursor: 0,
        }
    }

    #[inline(always)]
    fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.read_cursor == self.write_cursor
    }

    #[inline(always)]
    fn buffered(&self) -> usize {
        (self.write_cursor + self.capacity() - self.read_cursor) % self.capacity()
    }

    #[inline(always)]
    fn free(&self) -> usize {
        self.capacity() - 1 - self.buffered()
    }

    /// Bytes yang bisa dibaca tanpa melewati ujung array
    #[inline(always)]
    fn readable_run(&self) -> usize {
        if self.write_cursor >= self.read_cursor {
            self.write_cursor - self.read_cursor
        } else {
            self.capacity() - self.read_cursor
        }
    }

    /// Ruang yang bisa ditulis tanpa melewati ujung array atau slot cadangan
    #[inline(always)]
    fn writable_run(&self) -> usize {
        let run = if self.write_cursor >= self.read_cursor {
            self.capacity() - self.write_cursor
        } else {
            self.read_cursor - self.write_cursor - 1
        };
        run.min(self.free())
    }

    fn copy_out(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.readable_run());
        let start = self.read_cursor;
        dst[..n].copy_from_slice(&self.storage[start..start + n]);

        self.read_cursor += n;
        if self.read_cursor == self.capacity() {
            self.read_cursor = 0;
        }
        n
    }

    fn copy_in(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.writable_run());
        let start = self.write_cursor;
        self.storage[start..start + n].copy_from_slice(&src[..n]);

        self.write_cursor += n;
        if self.write_cursor == self.capacity() {
            self.write_cursor = 0;
        }
        n
    }

    fn readiness(&self) -> Readiness {
        Readiness {
            readable: !self.is_empty(),
            writable: self.free() > 0,
        }
    }
}

/// Bounded byte ring yang dipakai bersama oleh banyak reader dan writer
///
/// Dibuat sekali lalu di-share lewat `Arc`; tidak ada instance global.
pub struct RingBuffer {
    ring: Mutex<Ring>,
    not_empty: Condvar,
    not_full: Condvar,
    config: PipeConfig,
}

impl RingBuffer {
    /// Membuat ring dengan `config.initial_capacity` bytes storage
    pub fn new(config: PipeConfig) -> Result<Self> {
        config.validate()?;
        let storage = Region::zeroed(config.initial_capacity)?;

        Ok(Self {
            ring: Mutex::new(Ring::new(storage)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            config,
        })
    }

    /// Shortcut: kapasitas awal tertentu, batas resize default
    /// (atau `capacity` sendiri jika lebih besar)
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let defaults = PipeConfig::default();
        Self::new(
            defaults
                .with_initial_capacity(capacity)
                .with_max_capacity(defaults.max_capacity.max(capacity)),
        )
    }

    /// Baca maksimal `dst.len()` bytes
    ///
    /// Saat kosong: `NonBlocking` langsung `WouldBlock`, `Blocking` parkir di
    /// `not_empty` sampai ada data atau `cancel` di-trigger (`Interrupted`).
    /// Tidak pernah menyalin melewati ujung array dalam satu call, jadi hasil
    /// bisa lebih pendek dari data yang tersedia (short read).
    pub fn read(&self, dst: &mut [u8], mode: Mode, cancel: &CancelToken) -> Result<usize> {
        if dst.is_empty() {
            return Ok(0);
        }

        let mut ring = self.ring.lock();
        while ring.is_empty() {
            Self::wait(&mut ring, &self.not_empty, mode, cancel)?;
        }

        let n = ring.copy_out(dst);
        drop(ring);

        self.not_full.notify_all();
        Ok(n)
    }

    /// Tulis sebanyak mungkin dari `src`, mengembalikan jumlah bytes tertulis
    ///
    /// Penuh: `NonBlocking` langsung `WouldBlock`, `Blocking` parkir di
    /// `not_full`. Begitu ada ruang, hanya yang muat (dan contiguous) yang
    /// ditulis; caller wajib loop untuk sisanya (short write).
    pub fn write(&self, src: &[u8], mode: Mode, cancel: &CancelToken) -> Result<usize> {
        if src.is_empty() {
            return Ok(0);
        }

        let mut ring = self.ring.lock();
        while ring.free() == 0 {
            Self::wait(&mut ring, &self.not_full, mode, cancel)?;
        }

        let n = ring.copy_in(src);
        drop(ring);

        self.not_empty.notify_all();
        Ok(n)
    }

    /// Point-in-time snapshot, tidak ada jaminan setelah lock dilepas
    pub fn query_readiness(&self) -> Readiness {
        self.ring.lock().readiness()
    }

    /// Ganti storage dengan region baru berukuran `new_capacity`
    ///
    /// DESTRUKTIF: semua data yang masih di buffer dibuang dan kedua cursor
    /// kembali ke 0. Region baru dialokasi sebelum lock diambil; kalau
    /// alokasi gagal, buffer lama tidak tersentuh.
    ///
    /// Waiter yang sedang parkir tidak dibangunkan. Mereka baru re-check
    /// kondisi setelah read/write berikutnya (atau `interrupt`).
    pub fn resize(&self, new_capacity: usize) -> Result<()> {
        self.config.check_capacity(new_capacity)?;
        let storage = Region::zeroed(new_capacity)?;

        let mut ring = self.ring.lock();
        let old = std::mem::replace(&mut *ring, Ring::new(storage));
        drop(ring);
        drop(old);

        Ok(())
    }

    /// Resize hanya kalau `new_capacity` berbeda dari kapasitas saat ini
    ///
    /// Perbandingan dan penggantian storage terjadi di bawah lock yang sama,
    /// jadi resize lain yang menyelinap di antaranya tidak membuat data
    /// yang baru ditulis ikut terbuang. Mengembalikan `true` kalau storage
    /// benar-benar diganti.
    pub fn resize_if_changed(&self, new_capacity: usize) -> Result<bool> {
        self.config.check_capacity(new_capacity)?;
        if self.ring.lock().capacity() == new_capacity {
            return Ok(false);
        }
        let storage = Region::zeroed(new_capacity)?;

        let mut ring = self.ring.lock();
        if ring.capacity() == new_capacity {
            return Ok(false);
        }
        let old = std::mem::replace(&mut *ring, Ring::new(storage));
        drop(ring);
        drop(old);

        Ok(true)
    }

    /// Batalkan wait milik `cancel` dan bangunkan semua waiter
    ///
    /// Lock diambil sebentar sebelum notify supaya waiter yang baru saja
    /// cek token (dan belum parkir) tidak kehilangan wakeup.
    pub fn interrupt(&self, cancel: &CancelToken) {
        cancel.cancel();
        self.wake_all();
    }

    /// Bangunkan semua waiter; masing-masing akan re-check kondisinya
    pub fn wake_all(&self) {
        drop(self.ring.lock());
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Ukuran storage saat ini (termasuk slot cadangan)
    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }

    /// Jumlah bytes yang sedang di-buffer
    pub fn len(&self) -> usize {
        self.ring.lock().buffered()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    pub fn config(&self) -> &PipeConfig {
        &self.config
    }

    fn wait(
        ring: &mut MutexGuard<'_, Ring>,
        cond: &Condvar,
        mode: Mode,
        cancel: &CancelToken,
    ) -> Result<()> {
        if mode == Mode::NonBlocking {
            return Err(PipeError::WouldBlock);
        }
        if cancel.is_cancelled() {
            return Err(PipeError::Interrupted);
        }

        cond.wait(ring);

        if cancel.is_cancelled() {
            return Err(PipeError::Interrupted);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ring = self.ring.lock();
        f.debug_struct("RingBuffer")
            .field("capacity", &ring.capacity())
            .field("read_cursor", &ring.read_cursor)
            .field("write_cursor", &ring.write_cursor)
            .field("max_capacity", &self.config.max_capacity)
            .finish()
    }
}
