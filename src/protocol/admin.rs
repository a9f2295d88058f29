//! Admin text interface
//!
//! Adapter tipis di atas `RingBuffer::resize` / `capacity`:
//! - read: kapasitas sebagai satu baris desimal
//! - write: satu angka desimal, memicu resize (destruktif)

use std::sync::Arc;

use crate::core::RingBuffer;
use crate::error::{PipeError, Result};

/// Panjang input maksimum yang diterima `write`
pub const MAX_INPUT_LEN: usize = 32;

/// File admin untuk satu device
#[derive(Debug, Clone)]
pub struct AdminFile {
    pipe: Arc<RingBuffer>,
}

impl AdminFile {
    pub fn new(pipe: Arc<RingBuffer>) -> Self {
        Self { pipe }
    }

    /// `"<capacity>\n"` di offset 0, string kosong (EOF) setelahnya
    pub fn read(&self, offset: u64) -> String {
        if offset > 0 {
            return String::new();
        }
        format!("{}\n", self.pipe.capacity())
    }

    /// Parse kapasitas baru dan resize
    ///
    /// Mengembalikan jumlah byte input yang dikonsumsi. Input harus ditulis
    /// sekaligus di offset 0.
    pub fn write(&self, input: &[u8], offset: u64) -> Result<usize> {
        if input.len() > MAX_INPUT_LEN {
            log::warn!("admin write rejected: {} bytes of input", input.len());
            return Err(PipeError::invalid(
                "input",
                format!("longer than {} bytes", MAX_INPUT_LEN),
            ));
        }
        if offset != 0 {
            log::warn!("admin write rejected: offset {}", offset);
            return Err(PipeError::invalid("offset", "must be written at offset 0"));
        }

        let capacity = parse_capacity(input)?;
        if let Err(err) = self.pipe.resize(capacity) {
            log::warn!("admin resize to {} failed: {}", capacity, err);
            return Err(err);
        }

        log::info!("pipe resized to {} bytes via admin file", capacity);
        Ok(input.len())
    }
}

/// Angka desimal tanpa tanda; whitespace di sekitarnya diabaikan
fn parse_capacity(input: &[u8]) -> Result<usize> {
    let text = std::str::from_utf8(input)
        .map_err(|_| PipeError::invalid("input", "not valid UTF-8"))?
        .trim();

    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        log::warn!("admin write rejected: {:?} is not a decimal number", text);
        return Err(PipeError::invalid(
            "input",
            format!("{:?} is not a decimal number", text),
        ));
    }

    text.parse::<usize>()
        .map_err(|e| PipeError::invalid("input", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CancelToken, Mode};

    fn admin() -> (Arc<RingBuffer>, AdminFile) {
        let pipe = Arc::new(RingBuffer::with_capacity(256).unwrap());
        (Arc::clone(&pipe), AdminFile::new(pipe))
    }

    #[test]
    fn test_read_reports_capacity_once() {
        let (_, file) = admin();
        assert_eq!(file.read(0), "256\n");
        assert_eq!(file.read(4), "");
    }

    #[test]
    fn test_write_resizes() {
        let (pipe, file) = admin();
        pipe.write(b"xyz", Mode::NonBlocking, &CancelToken::new())
            .unwrap();

        assert_eq!(file.write(b"64\n", 0).unwrap(), 3);
        assert_eq!(pipe.capacity(), 64);
        assert!(pipe.is_empty());
        assert_eq!(file.read(0), "64\n");
    }

    #[test]
    fn test_write_bounds() {
        let (pipe, file) = admin();
        assert!(file.write(b"0", 0).is_err());
        assert!(file.write(b"1025", 0).is_err());
        assert_eq!(pipe.capacity(), 256);

        assert!(file.write(b"1024", 0).is_ok());
        assert_eq!(pipe.capacity(), 1024);
    }

    #[test]
    fn test_write_rejects_garbage() {
        let (_, file) = admin();
        assert!(file.write(b"", 0).is_err());
        assert!(file.write(b"12abc", 0).is_err());
        assert!(file.write(b"-5", 0).is_err());
        assert!(file.write(b"99999999999999999999999999", 0).is_err());
    }

    #[test]
    fn test_write_rejects_long_input_and_offset() {
        let (_, file) = admin();
        let long = [b'1'; MAX_INPUT_LEN + 1];
        assert!(matches!(
            file.write(&long, 0),
            Err(PipeError::InvalidArgument {
                parameter: "input",
                ..
            })
        ));
        assert!(matches!(
            file.write(b"64", 1),
            Err(PipeError::InvalidArgument {
                parameter: "offset",
                ..
            })
        ));
    }
}
