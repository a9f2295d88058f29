//! Protocol Layer: control surfaces di atas ring buffer
//!
//! - ioctl: decode nomor command gaya `_IOC` Linux
//! - admin: baca/tulis kapasitas sebagai teks desimal

pub mod admin;
pub mod ioctl;

pub use admin::AdminFile;
pub use ioctl::{IoctlNumber, ScullCommand, SCULL_GET, SCULL_MAGIC, SCULL_MAX, SCULL_SET};
