//! # Event Loop - Startup Sequence and Periodic Drain
//!
//! Startup: banner to the sink, enable the channel, start the line, arm the
//! trigger. Steady state: every tick runs one drain cycle. The loop ends with
//! a final drain once the line closes or shutdown is requested.
//!
//! Ticks that pile up behind a slow sink collapse into one, like a single
//! pending timer interrupt.

use std::future::Future;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use dr_core::banner::emit_banner;
use dr_core::{DmaChannel, DrainCycle, DrainReport, DrainStats, OutputSink, RingStore};

use crate::line::{LineReceiver, LineTotals, Pacing};
use crate::{Error, Result};

/// Configuration for the event loop.
#[derive(Debug, Clone)]
pub struct EventLoopConfig {
    pub capacity: usize,
    pub tick: Duration,
    pub pacing: Pacing,
    pub banner: bool,
}

impl Default for EventLoopConfig {
    fn default() -> Self {
        Self {
            capacity: dr_core::DEFAULT_CAPACITY,
            tick: Duration::from_secs(1) / dr_core::TICKS_PER_SECOND,
            pacing: Pacing::Baud(115_200),
            banner: true,
        }
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub drain: DrainStats,
    /// Receiver counters. After an interrupt the thread is still running, so
    /// these may trail the channel by one read chunk.
    pub line: LineTotals,
    pub banner_bytes: usize,
    /// `true` if shutdown was requested before the line closed.
    pub interrupted: bool,
}

pub struct EventLoop {
    config: EventLoopConfig,
    channel: Arc<DmaChannel>,
}

impl EventLoop {
    pub fn new(config: &EventLoopConfig) -> Result<Self> {
        if config.capacity < 2 {
            return Err(Error::InvalidCapacity(config.capacity));
        }
        if config.tick.is_zero() {
            return Err(Error::InvalidTick);
        }

        let store = Arc::new(RingStore::new(config.capacity));
        let channel = DmaChannel::new(store);

        Ok(Self {
            config: config.clone(),
            channel,
        })
    }

    #[inline]
    pub fn channel(&self) -> &Arc<DmaChannel> {
        &self.channel
    }

    /// Run until `line` reaches EOF or `shutdown` resolves.
    pub async fn run<R, S, F>(self, line: R, sink: &mut S, shutdown: F) -> Result<RunSummary>
    where
        R: Read + Send + 'static,
        S: OutputSink + ?Sized,
        F: Future<Output = ()>,
    {
        let banner_bytes = if self.config.banner {
            emit_banner(sink)
        } else {
            tracing::info!("Init complete");
            0
        };

        let writer = self.channel.take_writer().ok_or(Error::WriterTaken)?;
        let mut drain = DrainCycle::new(Arc::clone(self.channel.store()), Arc::clone(&self.channel));

        self.channel.enable();
        let receiver = LineReceiver::spawn(writer, line, self.config.pacing)?;

        let mut trigger = tokio::time::interval(self.config.tick);
        trigger.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(
            capacity = self.config.capacity,
            tick_us = self.config.tick.as_micros() as u64,
            "Drain trigger armed"
        );

        tokio::pin!(shutdown);
        let mut interrupted = false;
        let mut fired = false;

        loop {
            tokio::select! {
                _ = trigger.tick() => {}
                () = &mut shutdown => interrupted = true,
            }

            if !fired {
                tracing::debug!("Drain trigger fired");
                fired = true;
            }

            if interrupted {
                // Waits out a transfer in progress; the snapshot below sees it.
                self.channel.disable();
            }
            // Sampled before draining so the last bytes are never missed.
            let closed = interrupted || receiver.is_closed();

            let report = drain.run(sink);
            log_report(&report);

            if closed {
                break;
            }
        }

        self.channel.disable();

        let line = if interrupted {
            // The source may block forever; leave the thread behind.
            receiver.totals()
        } else {
            tokio::task::spawn_blocking(move || receiver.join())
                .await
                .map_err(|_| Error::ReceiverPanicked)??
        };

        let summary = RunSummary {
            drain: drain.stats(),
            line,
            banner_bytes,
            interrupted,
        };
        tracing::info!(
            forwarded = summary.drain.forwarded,
            received = summary.line.received,
            overruns = summary.drain.overruns,
            dropped = summary.drain.dropped,
            "Drain stopped"
        );
        Ok(summary)
    }
}

fn log_report(report: &DrainReport) {
    if report.overrun() {
        tracing::warn!(
            dropped = report.dropped,
            forwarded = report.forwarded,
            "Ring overrun: writer lapped the drain"
        );
    } else if !report.is_empty() {
        tracing::debug!(
            forwarded = report.forwarded,
            spans = report.spans,
            cursor = report.cursor,
            "Drained"
        );
    }
}
