//! # dr-core - The "Physics" of DMARING
//!
//! A byte stream lands in a fixed ring through a transfer engine that never
//! stops and never asks permission. Software only ever samples how far the
//! engine got and drains what lies between its own cursor and that sample.
//!
//! - [`RingStore`]: the fixed-capacity circular memory.
//! - [`PositionTracker`]: the engine's progress counter, seen as an offset.
//! - [`ReadCursor`]: the single piece of persistent consumer state.
//! - [`DmaChannel`]: model of the hardware writer.
//! - [`DrainCycle`]: the periodic read-and-forward step.
//!
//! # Contract
//!
//! The engine publishes its position only after the bytes up to it are
//! committed. The drain samples that position once per cycle. Between two
//! cycles the writer must not complete a full lap; when the tracker exposes
//! a free-running count, a broken lap is detected and reported as an overrun.

#![no_std]

extern crate alloc;

pub mod banner;
pub mod cursor;
pub mod drain;
pub mod engine;
pub mod position;
pub mod ring;

pub use cursor::ReadCursor;
pub use drain::{DrainCycle, DrainReport, DrainStats, OutputSink};
pub use engine::{DmaChannel, DmaWriter};
pub use position::{PositionTracker, Snapshot};
pub use ring::{RingStore, RingView};

/// Ring capacity used by the reference board firmware.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Trigger frequency of the reference board (1 ms period).
pub const TICKS_PER_SECOND: u32 = 1000;

#[cfg(test)]
extern crate std;
