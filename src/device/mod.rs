//! Device Layer: I/O dispatch di atas ring buffer
//!
//! Peran file-ops driver: open/release, read/write dengan `O_NONBLOCK`,
//! poll, dan ioctl. Ring buffer dibuat sekali di sini lalu di-inject ke
//! setiap handle dan ke admin file; tidak ada instance global.

mod handle;
mod poll;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub use handle::Handle;
pub use poll::{PollMask, PollSet, WakerKey};

use crate::config::PipeConfig;
use crate::core::{Readiness, RingBuffer};
use crate::error::{PipeError, Result};
use crate::protocol::{AdminFile, ScullCommand};

/// Flag open yang dimengerti device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags(libc::c_int);

impl OpenFlags {
    pub const NONBLOCK: Self = Self(libc::O_NONBLOCK);

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Ambil dari flag `open(2)` mentah; bit lain diabaikan
    pub const fn from_bits_truncate(bits: libc::c_int) -> Self {
        Self(bits & libc::O_NONBLOCK)
    }

    #[inline(always)]
    pub fn bits(self) -> libc::c_int {
        self.0
    }

    #[inline(always)]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

#[derive(Debug)]
pub(crate) struct DeviceInner {
    pipe: Arc<RingBuffer>,
    poll: PollSet,
    next_handle: AtomicU64,
}

impl DeviceInner {
    fn ioctl(&self, cmd: u32, arg: &mut libc::c_int) -> Result<()> {
        let command = ScullCommand::parse(cmd).map_err(|err| {
            log::debug!("ioctl {:#010x} rejected", cmd);
            err
        })?;

        match command {
            ScullCommand::Get => {
                *arg = libc::c_int::try_from(self.pipe.capacity())
                    .map_err(|_| PipeError::invalid("arg", "capacity does not fit in int"))?;
                log::debug!("ioctl GET -> {}", *arg);
                Ok(())
            }
            ScullCommand::Set => {
                let size = usize::try_from(*arg)
                    .map_err(|_| PipeError::invalid("arg", format!("negative size {}", *arg)))?;
                if self.pipe.resize_if_changed(size)? {
                    log::info!("pipe resized to {} bytes via ioctl", size);
                } else {
                    log::debug!("ioctl SET {} unchanged", size);
                }
                Ok(())
            }
        }
    }
}

/// Pipe device: satu ring buffer bersama untuk semua handle
#[derive(Debug, Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

impl Device {
    /// Alokasi ring buffer awal dan siapkan device
    pub fn new(config: PipeConfig) -> Result<Self> {
        let pipe = RingBuffer::new(config)?;
        log::debug!(
            "pipe device created: capacity {}, max {}",
            config.initial_capacity,
            config.max_capacity
        );

        Ok(Self {
            inner: Arc::new(DeviceInner {
                pipe: Arc::new(pipe),
                poll: PollSet::new(),
                next_handle: AtomicU64::new(1),
            }),
        })
    }

    /// Buka handle baru. Tidak ada state yang dialokasi selain referensi.
    pub fn open(&self, flags: OpenFlags) -> Handle {
        let id = self.inner.next_handle.fetch_add(1, Ordering::Relaxed);
        log::debug!("handle {} opened (flags {:#x})", id, flags.bits());
        Handle::new(Arc::clone(&self.inner), flags, id)
    }

    /// Resize destruktif, lihat `RingBuffer::resize`
    pub fn resize(&self, new_capacity: usize) -> Result<()> {
        self.inner.pipe.resize(new_capacity)?;
        log::info!("pipe resized to {} bytes", new_capacity);
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.inner.pipe.capacity()
    }

    pub fn query_readiness(&self) -> Readiness {
        self.inner.pipe.query_readiness()
    }

    /// ioctl tanpa handle (`unlocked_ioctl` memakai device global)
    pub fn ioctl(&self, cmd: u32, arg: &mut libc::c_int) -> Result<()> {
        self.inner.ioctl(cmd, arg)
    }

    /// Admin file yang berbagi ring buffer yang sama
    pub fn admin(&self) -> AdminFile {
        AdminFile::new(Arc::clone(&self.inner.pipe))
    }

    /// Akses langsung ke ring buffer
    pub fn pipe(&self) -> &Arc<RingBuffer> {
        &self.inner.pipe
    }
}
