//! Transmit side of the drain.

use std::io::Write;

use crc32fast::Hasher;
use dr_core::OutputSink;

/// Character-level transmitter over any byte writer.
///
/// Each byte goes out with its own `write_all`, the way a UART transmit
/// register takes one character at a time; the span is flushed at its end.
/// Forwarding is best effort: a failed write is logged once and counted.
pub struct UartSink<W: Write> {
    inner: W,
    sent: u64,
    failed: u64,
}

impl<W: Write> UartSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            sent: 0,
            failed: 0,
        }
    }

    /// Bytes accepted by the transport.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Bytes the transport rejected.
    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn fail(&mut self, lost: usize, error: &std::io::Error) {
        if self.failed == 0 {
            tracing::warn!("Transmit failed, dropping output: {}", error);
        }
        self.failed += lost as u64;
    }
}

impl<W: Write> OutputSink for UartSink<W> {
    fn forward(&mut self, span: &[u8]) {
        for (i, byte) in span.iter().enumerate() {
            if let Err(e) = self.inner.write_all(std::slice::from_ref(byte)) {
                self.fail(span.len() - i, &e);
                return;
            }
            self.sent += 1;
        }
        if let Err(e) = self.inner.flush() {
            self.fail(0, &e);
        }
    }
}

/// Checksums everything forwarded, for end-to-end ordering checks.
#[derive(Default)]
pub struct CrcSink {
    hasher: Hasher,
    bytes: u64,
}

impl CrcSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// CRC-32 of the forwarded stream so far.
    pub fn checksum(&self) -> u32 {
        self.hasher.clone().finalize()
    }
}

impl OutputSink for CrcSink {
    fn forward(&mut self, span: &[u8]) {
        self.hasher.update(span);
        self.bytes += span.len() as u64;
    }
}
