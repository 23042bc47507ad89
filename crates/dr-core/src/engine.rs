//! # Engine - Transfer Engine Model
//!
//! Stands in for the DMA channel that moves received bytes from the line
//! register into the ring. It runs on its own and never waits for software.
//!
//! The channel keeps one free-running `transferred` counter. A transfer
//! commits the byte at `transferred mod N` and then publishes the new count
//! with `Release`; readers `Acquire` it, so a sampled position never runs
//! ahead of committed data.
//!
//! `disable` and `transfer` pair up through `enabled` and `in_flight`, both
//! `SeqCst`: either the writer sees the channel disabled, or `disable` sees
//! the transfer and waits for it to publish.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::position::{PositionTracker, Snapshot};
use crate::ring::RingStore;

/// Shared state of one transfer channel.
pub struct DmaChannel {
    store: Arc<RingStore>,
    transferred: AtomicU64,
    enabled: AtomicBool,
    /// Set by the writer for the duration of one transfer.
    in_flight: AtomicBool,
    writer_taken: AtomicBool,
}

impl DmaChannel {
    /// Create a disabled channel targeting `store`.
    pub fn new(store: Arc<RingStore>) -> Arc<Self> {
        Arc::new(Self {
            store,
            transferred: AtomicU64::new(0),
            enabled: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            writer_taken: AtomicBool::new(false),
        })
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Stop accepting bytes.
    ///
    /// Returns once no transfer is in progress, so every byte the writer
    /// accepted is already reflected in `transferred`.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        while self.in_flight.load(Ordering::SeqCst) {
            core::hint::spin_loop();
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// The ring this channel writes into.
    #[inline]
    pub fn store(&self) -> &Arc<RingStore> {
        &self.store
    }

    /// Total bytes moved since creation.
    #[inline]
    pub fn transferred(&self) -> u64 {
        self.transferred.load(Ordering::Acquire)
    }

    /// Claim the single writer handle.
    ///
    /// Returns `None` if it was already taken.
    pub fn take_writer(self: &Arc<Self>) -> Option<DmaWriter> {
        if self.writer_taken.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(DmaWriter {
            channel: Arc::clone(self),
        })
    }

    #[inline]
    fn offset_of(&self, transferred: u64) -> usize {
        (transferred % self.store.capacity() as u64) as usize
    }
}

impl PositionTracker for DmaChannel {
    #[inline]
    fn current_position(&self) -> usize {
        self.offset_of(self.transferred())
    }

    #[inline]
    fn snapshot(&self) -> Snapshot {
        let transferred = self.transferred();
        Snapshot {
            position: self.offset_of(transferred),
            transferred: Some(transferred),
        }
    }
}

impl core::fmt::Debug for DmaChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DmaChannel")
            .field("capacity", &self.store.capacity())
            .field("transferred", &self.transferred())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// The producer side of a channel. Exactly one exists per channel.
pub struct DmaWriter {
    channel: Arc<DmaChannel>,
}

impl DmaWriter {
    /// Move one received byte into the ring.
    ///
    /// Returns `false` and discards the byte while the channel is disabled.
    #[inline]
    pub fn transfer(&self, byte: u8) -> bool {
        let channel = &*self.channel;
        channel.in_flight.store(true, Ordering::SeqCst);
        let accepted = channel.enabled.load(Ordering::SeqCst);
        if accepted {
            // Single writer: nobody else stores to `transferred`.
            let count = channel.transferred.load(Ordering::Relaxed);
            channel.store.commit(channel.offset_of(count), byte);
            channel
                .transferred
                .store(count.wrapping_add(1), Ordering::Release);
        }
        channel.in_flight.store(false, Ordering::Release);
        accepted
    }

    /// Transfer a run of bytes, returning how many were accepted.
    pub fn transfer_all(&self, bytes: &[u8]) -> usize {
        bytes.iter().take_while(|&&b| self.transfer(b)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(capacity: usize) -> Arc<DmaChannel> {
        DmaChannel::new(Arc::new(RingStore::new(capacity)))
    }

    #[test]
    fn test_new_channel_is_disabled_at_zero() {
        let ch = channel(8);
        assert!(!ch.is_enabled());
        assert_eq!(ch.current_position(), 0);
        assert_eq!(ch.snapshot().transferred, Some(0));
    }

    #[test]
    fn test_disabled_channel_discards_bytes() {
        let ch = channel(8);
        let writer = ch.take_writer().unwrap();
        assert!(!writer.transfer(b'x'));
        assert_eq!(ch.transferred(), 0);
    }

    #[test]
    fn test_only_one_writer() {
        let ch = channel(8);
        assert!(ch.take_writer().is_some());
        assert!(ch.take_writer().is_none());
    }

    #[test]
    fn test_transfer_advances_and_wraps_position() {
        let ch = channel(4);
        let writer = ch.take_writer().unwrap();
        ch.enable();

        assert_eq!(writer.transfer_all(b"abc"), 3);
        assert_eq!(ch.current_position(), 3);

        assert_eq!(writer.transfer_all(b"de"), 2);
        assert_eq!(ch.current_position(), 1);
        assert_eq!(
            ch.snapshot(),
            Snapshot {
                position: 1,
                transferred: Some(5),
            }
        );

        let mut out = [0u8; 4];
        let view = ch.store().read(0, 4);
        let [first, _] = view.segments();
        assert_eq!(crate::RingView::copy_segment(first, &mut out), b"ebcd");
    }

    #[test]
    fn test_transfer_all_stops_when_disabled() {
        let ch = channel(8);
        let writer = ch.take_writer().unwrap();
        assert_eq!(writer.transfer_all(b"abc"), 0);
        ch.enable();
        assert_eq!(writer.transfer_all(b"abc"), 3);
        ch.disable();
        assert_eq!(writer.transfer_all(b"abc"), 0);
        assert_eq!(ch.transferred(), 3);
    }

    #[test]
    fn test_disable_waits_for_transfer_in_flight() {
        let ch = channel(64);
        let writer = ch.take_writer().unwrap();
        ch.enable();

        let pusher = std::thread::spawn(move || {
            let mut accepted = 0u64;
            while writer.transfer(accepted as u8) {
                accepted += 1;
            }
            accepted
        });

        while ch.transferred() < 1000 {
            std::thread::yield_now();
        }
        ch.disable();
        let seen = ch.transferred();

        let accepted = pusher.join().unwrap();
        assert_eq!(seen, accepted);
        assert_eq!(ch.transferred(), accepted);
    }
}
