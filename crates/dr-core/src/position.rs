//! # Position Tracker - The Writer's Progress Counter
//!
//! The transfer engine reports how many bytes it has moved, reinterpreted as
//! an offset into the ring. Sampling must be side-effect free and safe at any
//! time while the transfer is running.

use alloc::sync::Arc;

/// One consistent sample of the writer's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Write offset in `[0, capacity)`.
    pub position: usize,

    /// Free-running count of bytes transferred, if the engine keeps one.
    /// Lets the drain tell "small progress" from "progress plus a lap".
    pub transferred: Option<u64>,
}

impl Snapshot {
    /// A sample that carries only the wrapped offset.
    #[inline]
    pub const fn at(position: usize) -> Self {
        Self {
            position,
            transferred: None,
        }
    }
}

/// Read access to the writer's position.
pub trait PositionTracker {
    /// The writer's current offset into the ring.
    fn current_position(&self) -> usize;

    /// Sample everything the tracker knows in one read.
    ///
    /// The drain cycle calls this exactly once per invocation.
    fn snapshot(&self) -> Snapshot {
        Snapshot::at(self.current_position())
    }
}

impl<T: PositionTracker + ?Sized> PositionTracker for &T {
    #[inline]
    fn current_position(&self) -> usize {
        (**self).current_position()
    }

    #[inline]
    fn snapshot(&self) -> Snapshot {
        (**self).snapshot()
    }
}

impl<T: PositionTracker + ?Sized> PositionTracker for Arc<T> {
    #[inline]
    fn current_position(&self) -> usize {
        (**self).current_position()
    }

    #[inline]
    fn snapshot(&self) -> Snapshot {
        (**self).snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct Fixed(Cell<usize>);

    impl PositionTracker for Fixed {
        fn current_position(&self) -> usize {
            self.0.get()
        }
    }

    #[test]
    fn test_default_snapshot_has_no_counter() {
        let tracker = Fixed(Cell::new(5));
        assert_eq!(tracker.snapshot(), Snapshot::at(5));
    }

    #[test]
    fn test_references_forward_to_the_tracker() {
        let tracker = Fixed(Cell::new(3));
        let by_ref = &tracker;
        tracker.0.set(7);
        assert_eq!(by_ref.current_position(), 7);
        assert_eq!(by_ref.snapshot().position, 7);
    }
}
