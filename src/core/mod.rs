//! Core module: blocking byte ring buffer
//!
//! Prinsip desain:
//! - Satu lock untuk storage + kedua cursor
//! - Lock dilepas selama menunggu, kondisi selalu di-re-check
//! - Tidak ada logging, registrasi, atau formatting di sini

mod cancel;
mod region;
mod ring_buffer;

pub use cancel::CancelToken;
pub use region::Region;
pub use ring_buffer::{Mode, Readiness, RingBuffer};
