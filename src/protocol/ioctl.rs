//! ioctl Command Encoding
//!
//! Layout mengikuti `_IOC` Linux (asm-generic):
//! ┌──────┬──────────────┬──────────┬──────────┐
//! │ dir  │ size (14 bit)│ type (8) │ nr (8)   │
//! │ 31-30│ 29-16        │ 15-8     │ 7-0      │
//! └──────┴──────────────┴──────────┴──────────┘

use std::mem;

use crate::error::{PipeError, Result};

pub const IOC_NRBITS: u32 = 8;
pub const IOC_TYPEBITS: u32 = 8;
pub const IOC_SIZEBITS: u32 = 14;
pub const IOC_DIRBITS: u32 = 2;

pub const IOC_NRSHIFT: u32 = 0;
pub const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
pub const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
pub const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

pub const IOC_NONE: u32 = 0;
pub const IOC_WRITE: u32 = 1;
pub const IOC_READ: u32 = 2;

/// Magic number device ('s')
pub const SCULL_MAGIC: u8 = b's';
/// Set kapasitas, argumen `int`
pub const SCULL_SET: u32 = iow(SCULL_MAGIC, 1, mem::size_of::<libc::c_int>() as u32);
/// Get kapasitas, argumen `int`. Arah WRITE dipertahankan dari nomor aslinya.
pub const SCULL_GET: u32 = iow(SCULL_MAGIC, 2, mem::size_of::<libc::c_int>() as u32);
/// Nomor command tertinggi yang diterima
pub const SCULL_MAX: u8 = 4;

/// `_IOC(dir, type, nr, size)`
pub const fn ioc(dir: u32, ty: u8, nr: u8, size: u32) -> u32 {
    (dir << IOC_DIRSHIFT)
        | ((size & ((1 << IOC_SIZEBITS) - 1)) << IOC_SIZESHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
}

/// `_IOW(type, nr, size)`
pub const fn iow(ty: u8, nr: u8, size: u32) -> u32 {
    ioc(IOC_WRITE, ty, nr, size)
}

/// `_IOR(type, nr, size)`
pub const fn ior(ty: u8, nr: u8, size: u32) -> u32 {
    ioc(IOC_READ, ty, nr, size)
}

/// Field-field dari nomor ioctl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoctlNumber {
    pub dir: u32,
    pub ty: u8,
    pub nr: u8,
    pub size: u32,
}

impl IoctlNumber {
    #[inline(always)]
    pub fn decode(cmd: u32) -> Self {
        Self {
            dir: (cmd >> IOC_DIRSHIFT) & ((1 << IOC_DIRBITS) - 1),
            ty: ((cmd >> IOC_TYPESHIFT) & ((1 << IOC_TYPEBITS) - 1)) as u8,
            nr: ((cmd >> IOC_NRSHIFT) & ((1 << IOC_NRBITS) - 1)) as u8,
            size: (cmd >> IOC_SIZESHIFT) & ((1 << IOC_SIZEBITS) - 1),
        }
    }

    #[inline(always)]
    pub fn encode(&self) -> u32 {
        ioc(self.dir, self.ty, self.nr, self.size)
    }
}

/// Command yang dimengerti device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScullCommand {
    /// Baca kapasitas ke argumen
    Get,
    /// Resize ke nilai argumen (hanya kalau berbeda)
    Set,
}

impl ScullCommand {
    /// Validasi dan decode nomor ioctl
    ///
    /// Magic asing atau `nr > SCULL_MAX` ditolak sebelum command dicocokkan,
    /// sama seperti command yang tidak dikenal: `NotTty`.
    pub fn parse(cmd: u32) -> Result<Self> {
        let number = IoctlNumber::decode(cmd);
        if number.ty != SCULL_MAGIC || number.nr > SCULL_MAX {
            return Err(PipeError::NotTty { cmd });
        }

        match cmd {
            SCULL_GET => Ok(Self::Get),
            SCULL_SET => Ok(Self::Set),
            _ => Err(PipeError::NotTty { cmd }),
        }
    }

    pub fn number(self) -> u32 {
        match self {
            Self::Get => SCULL_GET,
            Self::Set => SCULL_SET,
        }
    }
}
