//! Storage region untuk ring buffer
//!
//! Anonymous mmap: halaman di-zero oleh kernel, dan kegagalan alokasi
//! kembali sebagai `io::Error` alih-alih abort.

use memmap2::MmapMut;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::error::{PipeError, Result};

/// Owned, zero-initialised byte region
pub struct Region {
    mmap: MmapMut,
    len: usize,
}

impl Region {
    /// Alokasi region baru sebesar `len` bytes, semua nol
    pub fn zeroed(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(PipeError::invalid("len", "region must not be empty"));
        }

        let mmap = MmapMut::map_anon(len).map_err(|source| PipeError::OutOfMemory {
            requested: len,
            source,
        })?;

        Ok(Self { mmap, len })
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Deref for Region {
    type Target = [u8];

    #[inline(always)]
    fn deref(&self) -> &[u8] {
        &self.mmap[..self.len]
    }
}

impl DerefMut for Region {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.mmap[..self.len]
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_zeroed() {
        let region = Region::zeroed(300).unwrap();
        assert_eq!(region.len(), 300);
        assert!(region.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_region_writable() {
        let mut region = Region::zeroed(16).unwrap();
        region[..5].copy_from_slice(b"scull");
        assert_eq!(&region[..5], b"scull");
        assert_eq!(region[5], 0);
    }

    #[test]
    fn test_empty_region_rejected() {
        assert!(matches!(
            Region::zeroed(0),
            Err(PipeError::InvalidArgument { .. })
        ));
    }
}
