//! scull-pipe - Bounded Blocking Byte Pipe
//!
//! Arsitektur:
//! - core: ring buffer dengan mutex + dua condition variable
//! - device: file-ops (open/read/write/poll/ioctl) di atas satu ring bersama
//! - protocol: decode ioctl dan admin text interface
//!
//! ```
//! use scull_pipe::{Device, OpenFlags, PipeConfig};
//!
//! let device = Device::new(PipeConfig::default()).unwrap();
//! let writer = device.open(OpenFlags::NONBLOCK);
//! let reader = device.open(OpenFlags::NONBLOCK);
//!
//! assert_eq!(writer.write(b"hello").unwrap(), 5);
//! let mut buf = [0u8; 16];
//! let n = reader.read(&mut buf).unwrap();
//! assert_eq!(&buf[..n], b"hello");
//! ```

pub mod config;
pub mod core;
pub mod device;
pub mod error;
pub mod protocol;

pub use crate::config::PipeConfig;
pub use crate::core::{CancelToken, Mode, Readiness, RingBuffer};
pub use crate::device::{Device, Handle, OpenFlags, PollMask};
pub use crate::error::{PipeError, Result};
