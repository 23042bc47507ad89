//! # Ring Store - Fixed Circular Memory
//!
//! The store is a single contiguous region allocated once at startup and
//! never resized. It is written exclusively by the transfer engine and read
//! exclusively by the drain cycle.
//!
//! ```text
//! [0 ........................................... N)
//!        ^ read cursor            ^ write position
//!        |---- unread region ---->|
//! ```
//!
//! Cells are atomic bytes. The engine stores with `Relaxed` and then
//! publishes its position with `Release`; the reader acquires the position
//! first, so every byte below a sampled position is visible. If the writer
//! laps the reader the bytes are stale, but never torn at the language level.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU8, Ordering};

/// The fixed-capacity byte ring.
pub struct RingStore {
    cells: Box<[AtomicU8]>,
}

impl RingStore {
    /// Allocate a zeroed ring of `capacity` bytes.
    ///
    /// # Panics
    /// Panics if `capacity < 2` (a single cell can never hold unread data).
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "Ring store must have at least 2 bytes");
        let cells: Vec<AtomicU8> = (0..capacity).map(|_| AtomicU8::new(0)).collect();
        Self {
            cells: cells.into_boxed_slice(),
        }
    }

    /// Total number of bytes in the ring.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// View `length` bytes starting at `offset`, split at the top of the ring
    /// when the span wraps.
    ///
    /// `offset` is reduced modulo the capacity.
    ///
    /// # Panics
    /// Panics if `length` exceeds the capacity.
    pub fn read(&self, offset: usize, length: usize) -> RingView<'_> {
        let capacity = self.capacity();
        assert!(
            length <= capacity,
            "read of {length} bytes exceeds ring capacity {capacity}"
        );
        let offset = offset % capacity;

        if offset + length <= capacity {
            RingView {
                first: &self.cells[offset..offset + length],
                second: &[],
            }
        } else {
            RingView {
                first: &self.cells[offset..],
                second: &self.cells[..offset + length - capacity],
            }
        }
    }

    /// Commit one byte. Only the transfer engine writes.
    #[inline]
    pub(crate) fn commit(&self, offset: usize, byte: u8) {
        self.cells[offset].store(byte, Ordering::Relaxed);
    }
}

impl core::fmt::Debug for RingStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingStore")
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// A borrowed span of the ring: one segment when contiguous, two when the
/// span crosses the top of the buffer.
#[derive(Clone, Copy)]
pub struct RingView<'a> {
    first: &'a [AtomicU8],
    second: &'a [AtomicU8],
}

impl<'a> RingView<'a> {
    /// Total length of the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.first.len() + self.second.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if the view is split at the top of the ring.
    #[inline]
    pub fn is_wrapped(&self) -> bool {
        !self.second.is_empty()
    }

    /// The segments in write order: tail before wrap, then head after it.
    #[inline]
    pub fn segments(&self) -> [&'a [AtomicU8]; 2] {
        [self.first, self.second]
    }

    /// Copy one segment into `out`, returning the filled prefix.
    ///
    /// # Panics
    /// Panics if `out` is shorter than the segment.
    pub fn copy_segment<'b>(segment: &[AtomicU8], out: &'b mut [u8]) -> &'b [u8] {
        let dst = &mut out[..segment.len()];
        for (d, cell) in dst.iter_mut().zip(segment) {
            *d = cell.load(Ordering::Relaxed);
        }
        dst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn filled(capacity: usize) -> RingStore {
        let store = RingStore::new(capacity);
        for i in 0..capacity {
            store.commit(i, i as u8);
        }
        store
    }

    fn collect(view: RingView<'_>) -> Vec<Vec<u8>> {
        let mut scratch = [0u8; 64];
        view.segments()
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| RingView::copy_segment(s, &mut scratch).to_vec())
            .collect()
    }

    #[test]
    fn test_new_store_is_zeroed() {
        let store = RingStore::new(4);
        assert_eq!(store.capacity(), 4);
        assert_eq!(collect(store.read(0, 4)), [[0u8, 0, 0, 0]]);
    }

    #[test]
    #[should_panic(expected = "at least 2 bytes")]
    fn test_capacity_of_one_is_rejected() {
        let _ = RingStore::new(1);
    }

    #[test]
    fn test_contiguous_read() {
        let store = filled(8);
        let view = store.read(2, 4);
        assert!(!view.is_wrapped());
        assert_eq!(view.len(), 4);
        assert_eq!(collect(view), [[2u8, 3, 4, 5]]);
    }

    #[test]
    fn test_read_ending_exactly_at_top_is_contiguous() {
        let store = filled(8);
        let view = store.read(5, 3);
        assert!(!view.is_wrapped());
        assert_eq!(collect(view), [[5u8, 6, 7]]);
    }

    #[test]
    fn test_wrapped_read_splits_tail_then_head() {
        let store = filled(8);
        let view = store.read(6, 5);
        assert!(view.is_wrapped());
        assert_eq!(collect(view), [&[6u8, 7][..], &[0, 1, 2][..]]);
    }

    #[test]
    fn test_offset_is_reduced_modulo_capacity() {
        let store = filled(8);
        assert_eq!(collect(store.read(10, 2)), [[2u8, 3]]);
    }

    #[test]
    fn test_empty_read() {
        let store = filled(8);
        let view = store.read(3, 0);
        assert!(view.is_empty());
        assert!(collect(view).is_empty());
    }

    #[test]
    #[should_panic(expected = "exceeds ring capacity")]
    fn test_oversize_read_panics() {
        let store = filled(8);
        let _ = store.read(0, 9);
    }
}
