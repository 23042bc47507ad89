//! # Line Receiver - The Hardware Writer
//!
//! A dedicated OS thread reads the incoming line and pushes every byte
//! through the transfer channel. It never looks at the drain and never
//! waits for it, exactly like a DMA engine fed by a UART.

use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use dr_core::DmaWriter;

/// Bytes read from the line per transfer burst.
const CHUNK_SIZE: usize = 16;

/// Bits on the wire per byte (start + 8 data + stop).
const BITS_PER_BYTE: u64 = 10;

/// How fast the emulated line delivers bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// As fast as the source yields data.
    Unpaced,
    /// Sleep to match a serial line at this baud rate.
    Baud(u32),
}

impl Pacing {
    /// `0` means unpaced.
    pub fn from_baud(baud: u32) -> Self {
        if baud == 0 {
            Self::Unpaced
        } else {
            Self::Baud(baud)
        }
    }

    /// Wire time of one byte, if paced. `Baud(0)` is treated as unpaced.
    pub fn byte_time(&self) -> Option<Duration> {
        match *self {
            Self::Unpaced | Self::Baud(0) => None,
            Self::Baud(baud) => Some(Duration::from_nanos(
                BITS_PER_BYTE * 1_000_000_000 / u64::from(baud),
            )),
        }
    }
}

/// Counters published by the receiver thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineTotals {
    /// Bytes read from the line.
    pub received: u64,
    /// Bytes the channel refused because it was disabled.
    pub discarded: u64,
}

#[derive(Default)]
struct LineState {
    closed: AtomicBool,
    received: AtomicU64,
    discarded: AtomicU64,
}

impl LineState {
    fn totals(&self) -> LineTotals {
        LineTotals {
            received: self.received.load(Ordering::Acquire),
            discarded: self.discarded.load(Ordering::Acquire),
        }
    }
}

pub struct LineReceiver {
    state: Arc<LineState>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl LineReceiver {
    /// Start pumping `source` into the channel behind `writer`.
    pub fn spawn<R>(writer: DmaWriter, source: R, pacing: Pacing) -> std::io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let state = Arc::new(LineState::default());
        let thread_state = Arc::clone(&state);

        let handle = thread::Builder::new()
            .name("dr-line".into())
            .spawn(move || {
                let result = pump(&writer, source, pacing, &thread_state);
                thread_state.closed.store(true, Ordering::Release);
                result
            })?;

        Ok(Self { state, handle })
    }

    /// `true` once the source hit EOF or failed. Every byte the receiver
    /// transferred is published before this turns `true`.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::Acquire)
    }

    /// Current counters, without waiting for the thread.
    pub fn totals(&self) -> LineTotals {
        self.state.totals()
    }

    /// Wait for the thread and return its final counters.
    pub fn join(self) -> crate::Result<LineTotals> {
        let Self { state, handle } = self;
        match handle.join() {
            Ok(result) => {
                result?;
                Ok(state.totals())
            }
            Err(_) => Err(crate::Error::ReceiverPanicked),
        }
    }
}

fn pump<R: Read>(
    writer: &DmaWriter,
    mut source: R,
    pacing: Pacing,
    state: &LineState,
) -> std::io::Result<()> {
    let byte_time = pacing.byte_time();
    let mut chunk = [0u8; CHUNK_SIZE];

    loop {
        let n = match source.read(&mut chunk) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        let accepted = writer.transfer_all(&chunk[..n]);
        state.received.fetch_add(n as u64, Ordering::Release);
        if accepted < n {
            state
                .discarded
                .fetch_add((n - accepted) as u64, Ordering::Release);
        }

        if let Some(per_byte) = byte_time {
            thread::sleep(per_byte * n as u32);
        }
    }
}
