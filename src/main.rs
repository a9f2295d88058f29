//! scull-pipe CLI
//!
//! Usage:
//!   scull-pipe pump [--capacity N] [--chunk N] [--nonblocking] < input > output
//!   scull-pipe bench [--iterations N] [--capacity N]
//!   scull-pipe status [--capacity N]

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mio::{Events, Poll, Token, Waker};

use scull_pipe::config::{DEFAULT_CAPACITY, DEFAULT_MAX_CAPACITY};
use scull_pipe::{Device, Handle, OpenFlags, PipeConfig, PipeError};

const WAKE_TOKEN: Token = Token(0);

#[derive(Parser, Debug)]
#[command(name = "scull-pipe")]
#[command(about = "Bounded blocking byte pipe (scull pipe device in user space)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, Copy)]
struct PipeArgs {
    /// Initial ring capacity in bytes (one slot stays unused)
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Largest capacity accepted by resize
    #[arg(long, default_value_t = DEFAULT_MAX_CAPACITY)]
    max_capacity: usize,
}

impl PipeArgs {
    fn config(&self) -> PipeConfig {
        PipeConfig::default()
            .with_initial_capacity(self.capacity)
            .with_max_capacity(self.max_capacity)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy stdin to stdout through the pipe device
    Pump {
        #[command(flatten)]
        pipe: PipeArgs,

        /// Bytes per read/write call
        #[arg(long, default_value_t = 64)]
        chunk: usize,

        /// Reader waits on a mio Poll instead of blocking in read
        #[arg(long)]
        nonblocking: bool,
    },
    /// Single-threaded write/read latency
    Bench {
        #[command(flatten)]
        pipe: PipeArgs,

        #[arg(long, default_value_t = 1_000_000)]
        iterations: usize,

        /// Bytes per write
        #[arg(long, default_value_t = 64)]
        message_size: usize,
    },
    /// Print the admin line and readiness of a fresh device
    Status {
        #[command(flatten)]
        pipe: PipeArgs,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Pump {
            pipe,
            chunk,
            nonblocking,
        } => pump(pipe.config(), chunk, nonblocking),
        Command::Bench {
            pipe,
            iterations,
            message_size,
        } => bench(pipe.config(), iterations, message_size),
        Command::Status { pipe } => status(pipe.config()),
    }
}

fn pump(config: PipeConfig, chunk: usize, nonblocking: bool) -> Result<()> {
    anyhow::ensure!(chunk > 0, "--chunk must be at least 1");

    let device = Device::new(config).context("Failed to create pipe device")?;
    let reader = Arc::new(device.open(if nonblocking {
        OpenFlags::NONBLOCK
    } else {
        OpenFlags::empty()
    }));
    let writer = device.open(OpenFlags::empty());
    let done = Arc::new(AtomicBool::new(false));

    let mut poll = Poll::new().context("Failed to create poll instance")?;
    let waker = Arc::new(Waker::new(poll.registry(), WAKE_TOKEN).context("Failed to create waker")?);
    let key = reader.register_waker(Arc::clone(&waker));

    log::info!(
        "pumping stdin -> pipe ({} bytes) -> stdout, {} mode",
        device.capacity(),
        if nonblocking { "poll" } else { "blocking" }
    );

    let producer = {
        let reader = Arc::clone(&reader);
        let done = Arc::clone(&done);
        let waker = Arc::clone(&waker);
        thread::spawn(move || -> Result<u64> {
            let mut input = io::stdin().lock();
            let mut buf = vec![0u8; chunk];
            let mut total = 0u64;
            loop {
                let n = input.read(&mut buf).context("Failed to read stdin")?;
                if n == 0 {
                    break;
                }
                // write_all meng-handle short write
                (&writer)
                    .write_all(&buf[..n])
                    .context("Failed to write into pipe")?;
                total += n as u64;
            }

            done.store(true, Ordering::Release);
            reader.interrupt();
            waker.wake().context("Failed to wake reader")?;
            Ok(total)
        })
    };

    let mut output = io::stdout().lock();
    let mut events = Events::with_capacity(8);
    let mut buf = vec![0u8; chunk];
    let mut copied = 0u64;

    loop {
        let finished = done.load(Ordering::Acquire);
        if finished {
            // Producer selesai: sisa data di-drain tanpa menunggu
            reader.set_nonblocking(true);
        }
        match reader.read(&mut buf) {
            Ok(n) => {
                output.write_all(&buf[..n]).context("Failed to write stdout")?;
                copied += n as u64;
            }
            Err(PipeError::WouldBlock) | Err(PipeError::Interrupted) if finished => break,
            Err(PipeError::WouldBlock) => {
                poll.poll(&mut events, None).context("Poll failed")?;
            }
            Err(PipeError::Interrupted) => continue,
            Err(e) => return Err(e).context("Failed to read from pipe"),
        }
    }
    output.flush().context("Failed to flush stdout")?;
    reader.deregister_waker(key);

    let produced = producer
        .join()
        .map_err(|_| anyhow::anyhow!("producer thread panicked"))??;
    log::info!("done: {} bytes in, {} bytes out", produced, copied);
    anyhow::ensure!(produced == copied, "byte count mismatch");

    Ok(())
}

fn bench(config: PipeConfig, iterations: usize, message_size: usize) -> Result<()> {
    let device = Device::new(config).context("Failed to create pipe device")?;
    let handle = device.open(OpenFlags::NONBLOCK);

    println!("📊 Pipe Benchmark (write + drain, single thread)");
    println!("------------------------------------------------");

    let msg = vec![0xA5u8; message_size];
    let mut sink = vec![0u8; device.capacity()];

    // Warm up
    for _ in 0..1000 {
        write_then_drain(&handle, &msg, &mut sink)?;
    }

    let start = Instant::now();
    let mut bytes = 0u64;
    for _ in 0..iterations {
        bytes += write_then_drain(&handle, &msg, &mut sink)? as u64;
    }
    let duration = start.elapsed();

    let ns = duration.as_nanos() as f64 / iterations.max(1) as f64;

    println!("  Capacity: {} bytes", device.capacity());
    println!("  Message size: {} bytes", message_size);
    println!("  Operations: {}", iterations);
    println!("  Latency: {:.2} ns/op ({:.3} μs/op)", ns, ns / 1000.0);
    println!(
        "  Throughput: {:.2} MB/sec",
        bytes as f64 / duration.as_secs_f64() / 1_000_000.0
    );

    Ok(())
}

/// Tulis satu pesan (dengan short write) lalu kosongkan ring
fn write_then_drain(handle: &Handle, msg: &[u8], sink: &mut [u8]) -> Result<usize> {
    let mut written = 0;
    while written < msg.len() {
        match handle.write(&msg[written..]) {
            Ok(n) => written += n,
            Err(PipeError::WouldBlock) => drain(handle, sink)?,
            Err(e) => return Err(e.into()),
        }
    }
    drain(handle, sink)?;
    Ok(written)
}

fn drain(handle: &Handle, sink: &mut [u8]) -> Result<()> {
    loop {
        match handle.read(sink) {
            Ok(_) => {}
            Err(PipeError::WouldBlock) => return Ok(()),
            Err(e) => return Err(e.into()),
        }
    }
}

fn status(config: PipeConfig) -> Result<()> {
    let device = Device::new(config).context("Failed to create pipe device")?;
    let handle = device.open(OpenFlags::NONBLOCK);
    let mask = handle.poll();

    print!("{}", device.admin().read(0));
    println!(
        "readable={} writable={} max_capacity={}",
        mask.contains(scull_pipe::PollMask::READABLE),
        mask.contains(scull_pipe::PollMask::WRITABLE),
        config.max_capacity
    );

    Ok(())
}
