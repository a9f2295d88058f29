//! Error types untuk scull pipe
//!
//! Setiap kegagalan dikembalikan ke caller; tidak ada yang ditelan diam-diam.

use std::io;

/// Result type alias untuk operasi pipe
pub type Result<T> = std::result::Result<T, PipeError>;

/// Semua kondisi error yang bisa dilihat caller
#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    /// Operasi harus menunggu, tapi caller minta non-blocking
    #[error("operation would block")]
    WouldBlock,

    /// Wait dibatalkan dari luar sebelum kondisi terpenuhi
    #[error("wait interrupted")]
    Interrupted,

    /// Parameter di luar batas (resize, admin input, config)
    #[error("invalid argument: {parameter} - {message}")]
    InvalidArgument {
        parameter: &'static str,
        message: String,
    },

    /// Alokasi storage gagal; buffer lama tetap utuh
    #[error("failed to allocate {requested} bytes")]
    OutOfMemory {
        requested: usize,
        #[source]
        source: io::Error,
    },

    /// Command ioctl tidak dikenal
    #[error("inappropriate ioctl command {cmd:#010x}")]
    NotTty { cmd: u32 },
}

impl PipeError {
    pub fn invalid(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            parameter,
            message: message.into(),
        }
    }

    /// POSIX errno yang setara, untuk layer dispatch gaya file-ops
    pub fn errno(&self) -> i32 {
        match self {
            Self::WouldBlock => libc::EAGAIN,
            Self::Interrupted => libc::EINTR,
            Self::InvalidArgument { .. } => libc::EINVAL,
            Self::OutOfMemory { .. } => libc::ENOMEM,
            Self::NotTty { .. } => libc::ENOTTY,
        }
    }

    /// Recoverable: caller boleh retry seluruh call nanti
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::WouldBlock | Self::Interrupted)
    }
}

impl From<PipeError> for io::Error {
    fn from(err: PipeError) -> Self {
        let kind = match &err {
            PipeError::WouldBlock => io::ErrorKind::WouldBlock,
            PipeError::Interrupted => io::ErrorKind::Interrupted,
            PipeError::InvalidArgument { .. } => io::ErrorKind::InvalidInput,
            PipeError::OutOfMemory { .. } => io::ErrorKind::OutOfMemory,
            PipeError::NotTty { .. } => io::ErrorKind::Unsupported,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(PipeError::WouldBlock.errno(), libc::EAGAIN);
        assert_eq!(PipeError::Interrupted.errno(), libc::EINTR);
        assert_eq!(PipeError::invalid("capacity", "zero").errno(), libc::EINVAL);
        assert_eq!(PipeError::NotTty { cmd: 0 }.errno(), libc::ENOTTY);
    }

    #[test]
    fn test_io_error_kind() {
        let err: io::Error = PipeError::WouldBlock.into();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);

        let err: io::Error = PipeError::Interrupted.into();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);

        let err: io::Error = PipeError::invalid("capacity", "too large").into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_retryable() {
        assert!(PipeError::WouldBlock.is_retryable());
        assert!(PipeError::Interrupted.is_retryable());
        assert!(!PipeError::invalid("capacity", "zero").is_retryable());
    }
}
