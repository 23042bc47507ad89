//! # Drain Cycle - Periodic Read-and-Forward
//!
//! Once per trigger: sample the writer once, forward everything between the
//! read cursor and that sample, then move the cursor.
//!
//! ```text
//! cursor <= end:  [.... r######e .....]        one span  [r, e)
//! cursor >  end:  [####e ......... r###]       two spans [r, N) then [0, e)
//! ```
//!
//! The sample is taken exactly once. Re-sampling mid-cycle would let the
//! unread region grow under a half-finished drain.
//!
//! # Overrun
//!
//! A wrapped offset cannot tell a small advance from an advance plus a full
//! lap. When the tracker also reports a free-running count, the cycle
//! forwards an exact lap (`advanced == N`) whole, and on `advanced > N` keeps
//! only the newest `N - 1` bytes and reports the rest as dropped. Without a
//! count both stay silent.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::cursor::ReadCursor;
use crate::position::PositionTracker;
use crate::ring::{RingStore, RingView};

/// Byte-oriented transmit side.
///
/// Called once per contiguous span, in write order. Blocking is fine; the
/// cycle waits for each span to be accepted.
pub trait OutputSink {
    fn forward(&mut self, span: &[u8]);
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    #[inline]
    fn forward(&mut self, span: &[u8]) {
        (**self).forward(span);
    }
}

impl OutputSink for Vec<u8> {
    #[inline]
    fn forward(&mut self, span: &[u8]) {
        self.extend_from_slice(span);
    }
}

/// Outcome of a single drain cycle.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    /// Bytes handed to the sink.
    pub forwarded: usize,
    /// Spans handed to the sink (0, 1 or 2).
    pub spans: u8,
    /// Bytes lost to an overrun detected in this cycle.
    pub dropped: u64,
    /// Cursor position after the cycle.
    pub cursor: usize,
}

impl DrainReport {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forwarded == 0 && self.dropped == 0
    }

    #[inline]
    pub fn overrun(&self) -> bool {
        self.dropped > 0
    }
}

/// Totals since the drain was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainStats {
    pub cycles: u64,
    pub forwarded: u64,
    pub spans: u64,
    pub overruns: u64,
    pub dropped: u64,
}

impl DrainStats {
    fn record(&mut self, report: &DrainReport) {
        self.cycles += 1;
        self.forwarded += report.forwarded as u64;
        self.spans += u64::from(report.spans);
        if report.overrun() {
            self.overruns += 1;
            self.dropped += report.dropped;
        }
    }
}

/// The consumer side of the ring.
pub struct DrainCycle<P> {
    store: Arc<RingStore>,
    tracker: P,
    cursor: ReadCursor,
    /// Last free-running count seen, for overrun detection.
    last_transferred: u64,
    /// One ring's worth of scratch, allocated once.
    staging: Vec<u8>,
    stats: DrainStats,
}

impl<P: PositionTracker> DrainCycle<P> {
    /// Create a drain reading `store` with the cursor at offset 0.
    ///
    /// The writer is assumed to start at offset 0 with nothing transferred.
    pub fn new(store: Arc<RingStore>, tracker: P) -> Self {
        let capacity = store.capacity();
        Self {
            store,
            tracker,
            cursor: ReadCursor::new(capacity),
            last_transferred: 0,
            staging: vec![0; capacity],
            stats: DrainStats::default(),
        }
    }

    #[inline]
    pub fn cursor(&self) -> &ReadCursor {
        &self.cursor
    }

    #[inline]
    pub fn stats(&self) -> DrainStats {
        self.stats
    }

    #[inline]
    pub fn tracker(&self) -> &P {
        &self.tracker
    }

    /// Run one cycle: forward every byte written since the previous one.
    pub fn run<S: OutputSink + ?Sized>(&mut self, sink: &mut S) -> DrainReport {
        let capacity = self.store.capacity();
        let snapshot = self.tracker.snapshot();
        let end = snapshot.position % capacity;

        let mut dropped = 0;
        let mut full_lap = false;
        if let Some(transferred) = snapshot.transferred {
            let advanced = transferred.wrapping_sub(self.last_transferred);
            self.last_transferred = transferred;

            if advanced > capacity as u64 {
                // The oldest surviving byte sits right after the writer.
                let kept = capacity as u64 - 1;
                dropped = advanced - kept;
                self.cursor.resync(end + 1);
            } else if advanced == capacity as u64 {
                // Cursor and writer coincide, yet every cell holds unread data.
                full_lap = true;
            }
        }

        let pending = if full_lap {
            capacity
        } else {
            self.cursor.pending(end)
        };
        let mut report = DrainReport {
            dropped,
            cursor: self.cursor.position(),
            ..DrainReport::default()
        };

        if pending > 0 {
            let view = self.store.read(self.cursor.position(), pending);
            for segment in view.segments() {
                if segment.is_empty() {
                    continue;
                }
                let span = RingView::copy_segment(segment, &mut self.staging);
                sink.forward(span);
                report.forwarded += span.len();
                report.spans += 1;
            }
            self.cursor.advance_to(end);
            report.cursor = end;
        }

        self.stats.record(&report);
        report
    }
}
