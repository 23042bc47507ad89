//! # dr-io - The "Engine" of DMARING
//!
//! Hosts the ring on a real machine: a dedicated thread plays the transfer
//! engine, a tokio interval plays the periodic task, and the drained bytes
//! go out through a character-level sink.

pub mod config;
pub mod error;
pub mod event_loop;
pub mod line;
pub mod sink;

pub use error::{Error, Result};
