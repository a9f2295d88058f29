//! Device-level tests: handles, poll, interrupt, ioctl, admin file

use std::io::{Read, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use mio::{Events, Poll, Token, Waker};
use scull_pipe::protocol::{SCULL_GET, SCULL_SET};
use scull_pipe::{Device, OpenFlags, PipeConfig, PipeError, PollMask};

const WAKE: Token = Token(1);

fn device(capacity: usize) -> Device {
    Device::new(PipeConfig::default().with_initial_capacity(capacity)).unwrap()
}

#[test]
fn test_handles_share_one_ring() {
    let dev = device(64);
    let a = dev.open(OpenFlags::NONBLOCK);
    let b = dev.open(OpenFlags::NONBLOCK);
    assert_ne!(a.id(), b.id());

    a.write(b"from a").unwrap();
    let mut buf = [0u8; 16];
    let n = b.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"from a");

    a.close();
    b.close();
}

#[test]
fn test_poll_mask_tracks_occupancy() {
    let dev = device(4);
    let h = dev.open(OpenFlags::NONBLOCK);

    assert_eq!(h.poll(), PollMask::WRITABLE);

    h.write(b"ab").unwrap();
    assert_eq!(h.poll(), PollMask::READABLE | PollMask::WRITABLE);

    h.write(b"cd").unwrap();
    assert_eq!(h.poll(), PollMask::READABLE);
    assert!(matches!(h.write(b"e"), Err(PipeError::WouldBlock)));
}

#[test]
fn test_nonblocking_toggle() {
    let dev = device(16);
    let h = dev.open(OpenFlags::empty());
    assert!(!h.is_nonblocking());

    h.set_nonblocking(true);
    let mut buf = [0u8; 4];
    let err = h.read(&mut buf).unwrap_err();
    assert_eq!(err.errno(), libc::EAGAIN);
}

#[test]
fn test_io_traits_short_write_and_write_all() {
    let dev = device(8);
    let mut writer = dev.open(OpenFlags::NONBLOCK);
    let mut reader = dev.open(OpenFlags::NONBLOCK);

    // Hanya 7 byte yang muat
    assert_eq!(Write::write(&mut writer, b"0123456789").unwrap(), 7);

    let mut buf = [0u8; 16];
    let n = Read::read(&mut reader, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"0123456");

    let err = Read::read(&mut reader, &mut buf).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::WouldBlock);
}

#[test]
fn test_blocking_handles_across_threads() {
    let dev = device(16);
    let reader = dev.open(OpenFlags::empty());
    let writer = dev.open(OpenFlags::empty());
    let payload: Vec<u8> = (0..200u8).collect();

    let producer = {
        let payload = payload.clone();
        thread::spawn(move || {
            (&writer).write_all(&payload).unwrap();
        })
    };

    let mut received = vec![0u8; payload.len()];
    (&reader).read_exact(&mut received).unwrap();
    producer.join().unwrap();

    assert_eq!(received, payload);
}

#[test]
fn test_interrupt_is_one_shot() {
    let dev = device(16);
    let reader = Arc::new(dev.open(OpenFlags::empty()));

    let blocked = {
        let reader = Arc::clone(&reader);
        thread::spawn(move || {
            let mut buf = [0u8; 4];
            reader.read(&mut buf)
        })
    };

    thread::sleep(Duration::from_millis(20));
    reader.interrupt();
    let err = blocked.join().unwrap().unwrap_err();
    assert!(matches!(err, PipeError::Interrupted));
    assert_eq!(err.errno(), libc::EINTR);

    // Interrupt sudah dikonsumsi: read berikutnya menunggu data lagi
    let again = {
        let reader = Arc::clone(&reader);
        thread::spawn(move || {
            let mut buf = [0u8; 4];
            reader.read(&mut buf).map(|n| buf[..n].to_vec())
        })
    };
    thread::sleep(Duration::from_millis(20));
    dev.open(OpenFlags::NONBLOCK).write(b"hi").unwrap();
    assert_eq!(again.join().unwrap().unwrap(), b"hi");
}

#[test]
fn test_pending_interrupt_hits_next_wait() {
    let dev = device(16);
    let h = dev.open(OpenFlags::empty());
    h.interrupt();

    let mut buf = [0u8; 4];
    assert!(matches!(h.read(&mut buf), Err(PipeError::Interrupted)));
}

#[test]
fn test_waker_fires_on_write() {
    let mut poll = Poll::new().unwrap();
    let waker = Arc::new(Waker::new(poll.registry(), WAKE).unwrap());

    let dev = device(64);
    let reader = dev.open(OpenFlags::NONBLOCK);
    let key = reader.register_waker(waker);

    let writer = dev.open(OpenFlags::NONBLOCK);
    let producer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        writer.write(b"ready").unwrap();
    });

    let mut events = Events::with_capacity(4);
    poll.poll(&mut events, Some(Duration::from_secs(5))).unwrap();
    assert!(events.iter().any(|e| e.token() == WAKE));
    producer.join().unwrap();

    assert!(reader.poll().contains(PollMask::READABLE));
    assert!(reader.deregister_waker(key));
}

#[test]
fn test_ioctl_through_handle() {
    let dev = device(256);
    let h = dev.open(OpenFlags::NONBLOCK);
    h.write(b"data").unwrap();

    let mut size = 0;
    h.ioctl(SCULL_GET, &mut size).unwrap();
    assert_eq!(size, 256);

    size = 100;
    h.ioctl(SCULL_SET, &mut size).unwrap();
    assert_eq!(dev.capacity(), 100);
    assert_eq!(h.poll(), PollMask::WRITABLE);

    let err = h.ioctl(0x1234, &mut size).unwrap_err();
    assert_eq!(err.errno(), libc::ENOTTY);
}

#[test]
fn test_admin_file_round_trip() {
    let dev = device(256);
    let admin = dev.admin();
    assert_eq!(admin.read(0), "256\n");

    assert_eq!(admin.write(b"512\n", 0).unwrap(), 4);
    assert_eq!(dev.capacity(), 512);

    let err = admin.write(b"2048", 0).unwrap_err();
    assert_eq!(err.errno(), libc::EINVAL);
    assert_eq!(admin.read(0), "512\n");
}

#[test]
fn test_resize_discards_and_keeps_handles_usable() {
    let dev = device(256);
    let h = dev.open(OpenFlags::NONBLOCK);
    h.write(b"ABC").unwrap();

    dev.resize(64).unwrap();
    assert!(!dev.query_readiness().readable);

    h.write(b"new").unwrap();
    let mut buf = [0u8; 8];
    let n = h.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"new");
}

#[test]
fn test_invalid_config_rejected() {
    let err = Device::new(PipeConfig::default().with_initial_capacity(1)).unwrap_err();
    assert!(matches!(err, PipeError::InvalidArgument { .. }));
}
