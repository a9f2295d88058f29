//! Open file handle untuk device
//!
//! Handle hanya menyimpan referensi ke device bersama, mode blocking, dan
//! token interrupt miliknya sendiri. Close tidak melepas resource apa pun.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mio::Waker;

use super::poll::{PollMask, WakerKey};
use super::{DeviceInner, OpenFlags};
use crate::core::{CancelToken, Mode};
use crate::error::{PipeError, Result};

/// Handle hasil `Device::open`
///
/// Semua method mengambil `&self`, jadi satu handle bisa di-share
/// antar thread lewat `Arc` (misalnya supaya thread lain bisa `interrupt`).
#[derive(Debug)]
pub struct Handle {
    device: Arc<DeviceInner>,
    nonblocking: AtomicBool,
    cancel: CancelToken,
    id: u64,
}

impl Handle {
    pub(super) fn new(device: Arc<DeviceInner>, flags: OpenFlags, id: u64) -> Self {
        Self {
            device,
            nonblocking: AtomicBool::new(flags.contains(OpenFlags::NONBLOCK)),
            cancel: CancelToken::new(),
            id,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline(always)]
    fn mode(&self) -> Mode {
        Mode::from_nonblocking(self.nonblocking.load(Ordering::Relaxed))
    }

    pub fn is_nonblocking(&self) -> bool {
        self.nonblocking.load(Ordering::Relaxed)
    }

    /// Setara `fcntl(F_SETFL, O_NONBLOCK)`
    pub fn set_nonblocking(&self, nonblocking: bool) {
        self.nonblocking.store(nonblocking, Ordering::Relaxed);
    }

    /// Baca dari pipe sesuai mode handle
    ///
    /// `Interrupted` mengonsumsi interrupt yang pending, jadi call
    /// berikutnya akan menunggu normal lagi.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let result = self.device.pipe.read(buf, self.mode(), &self.cancel);
        self.after_transfer(&result);
        result
    }

    /// Tulis ke pipe sesuai mode handle; bisa short write
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        let result = self.device.pipe.write(buf, self.mode(), &self.cancel);
        self.after_transfer(&result);
        result
    }

    fn after_transfer(&self, result: &Result<usize>) {
        match result {
            Ok(n) if *n > 0 => self.device.poll.wake_all(),
            Err(PipeError::Interrupted) => {
                log::debug!("handle {} wait interrupted", self.id);
                self.cancel.reset();
            }
            _ => {}
        }
    }

    /// Snapshot readiness sebagai poll mask
    pub fn poll(&self) -> PollMask {
        let readiness = self.device.pipe.query_readiness();
        let mut mask = PollMask::EMPTY;
        if readiness.readable {
            mask |= PollMask::READABLE;
        }
        if readiness.writable {
            mask |= PollMask::WRITABLE;
        }
        mask
    }

    /// Daftarkan waker event loop; dibangunkan setiap ada transfer
    pub fn register_waker(&self, waker: Arc<Waker>) -> WakerKey {
        self.device.poll.register(waker)
    }

    pub fn deregister_waker(&self, key: WakerKey) -> bool {
        self.device.poll.deregister(key)
    }

    /// Kirim "signal" ke handle ini
    ///
    /// Wait yang sedang berjalan kembali dengan `Interrupted`. Kalau tidak
    /// ada yang menunggu, interrupt tetap pending sampai wait berikutnya.
    pub fn interrupt(&self) {
        self.device.pipe.interrupt(&self.cancel);
    }

    pub fn ioctl(&self, cmd: u32, arg: &mut libc::c_int) -> Result<()> {
        self.device.ioctl(cmd, arg)
    }

    /// Release; tidak ada state per-handle yang perlu dibersihkan
    pub fn close(self) {}
}

impl Drop for Handle {
    fn drop(&mut self) {
        log::debug!("handle {} released", self.id);
    }
}

impl io::Read for Handle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Handle::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Write for Handle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Handle::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for &Handle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Handle::read(*self, buf).map_err(io::Error::from)
    }
}

impl io::Write for &Handle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Handle::write(*self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
