//! # Cursor - Consumer Read Position
//!
//! Tracks where the drain cycle last stopped reading. It is the only state
//! that survives between drain invocations.
//!
//! The unread region is the circular span from the cursor to the writer's
//! sampled position. Because that position is a wrapped offset, equal values
//! mean "nothing new" (an exact full lap looks identical and is treated as an
//! overrun elsewhere when a free-running counter is available).

/// Ring read cursor.
#[derive(Debug, Clone)]
pub struct ReadCursor {
    /// Next offset to read from.
    position: usize,

    /// Total number of bytes in the ring.
    capacity: usize,
}

impl ReadCursor {
    /// Create a cursor at offset 0 for a ring of `capacity` bytes.
    ///
    /// # Panics
    /// Panics if `capacity < 2`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "Ring buffer must have at least 2 bytes");
        Self {
            position: 0,
            capacity,
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of unread bytes up to `end` (exclusive), always `< capacity`.
    #[inline]
    pub fn pending(&self, end: usize) -> usize {
        let end = end % self.capacity;
        if end >= self.position {
            end - self.position
        } else {
            self.capacity - self.position + end
        }
    }

    /// `true` if reading up to `end` crosses the top of the ring.
    #[inline]
    pub fn wraps_to(&self, end: usize) -> bool {
        let end = end % self.capacity;
        end < self.position && end > 0
    }

    /// Mark everything up to `end` as read.
    #[inline]
    pub fn advance_to(&mut self, end: usize) {
        self.position = end % self.capacity;
    }

    /// Move the cursor without reading, after an overrun.
    #[inline]
    pub fn resync(&mut self, position: usize) {
        self.position = position % self.capacity;
    }
}

// =============================================================================
// Kani Proofs: Cursor Arithmetic
// =============================================================================

#[cfg(kani)]
mod proofs {
    use super::*;

    /// **Proof: pending never reaches a full lap**
    #[kani::proof]
    fn verify_pending_below_capacity() {
        let capacity: usize = kani::any();
        kani::assume(capacity >= 2 && capacity <= 16);
        let start: usize = kani::any();
        let end: usize = kani::any();
        kani::assume(start < capacity && end < capacity);

        let mut cursor = ReadCursor::new(capacity);
        cursor.resync(start);

        assert!(cursor.pending(end) < capacity);
    }

    /// **Proof: advancing to a position consumes everything up to it**
    #[kani::proof]
    fn verify_advance_empties_region() {
        let capacity: usize = kani::any();
        kani::assume(capacity >= 2 && capacity <= 16);
        let start: usize = kani::any();
        let end: usize = kani::any();
        kani::assume(start < capacity && end < capacity);

        let mut cursor = ReadCursor::new(capacity);
        cursor.resync(start);
        let before = cursor.pending(end);
        cursor.advance_to(end);

        assert_eq!(cursor.pending(end), 0);
        assert!(before == 0 || cursor.position() != start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cursor_starts_at_zero() {
        let c = ReadCursor::new(8);
        assert_eq!(c.position(), 0);
        assert_eq!(c.capacity(), 8);
        assert_eq!(c.pending(0), 0);
    }

    #[test]
    fn test_pending_without_wrap() {
        let mut c = ReadCursor::new(8);
        c.resync(2);
        assert_eq!(c.pending(7), 5);
        assert!(!c.wraps_to(7));
    }

    #[test]
    fn test_pending_with_wrap() {
        let mut c = ReadCursor::new(8);
        c.resync(3);
        assert_eq!(c.pending(2), 7);
        assert!(c.wraps_to(2));
    }

    #[test]
    fn test_end_at_zero_does_not_cross_top() {
        let mut c = ReadCursor::new(8);
        c.resync(5);
        assert_eq!(c.pending(0), 3);
        assert!(!c.wraps_to(0));
    }

    #[test]
    fn test_maximum_single_lap() {
        let mut c = ReadCursor::new(8);
        c.resync(1);
        assert_eq!(c.pending(0), 7);
        c.resync(0);
        assert_eq!(c.pending(7), 7);
    }

    #[test]
    fn test_advance_to() {
        let mut c = ReadCursor::new(8);
        c.advance_to(3);
        assert_eq!(c.position(), 3);
        assert_eq!(c.pending(3), 0);
    }

    #[test]
    #[should_panic(expected = "at least 2 bytes")]
    fn test_capacity_of_one_is_rejected() {
        let _ = ReadCursor::new(1);
    }
}
