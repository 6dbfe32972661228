//! Fixed-timestep tick driver for gridsnake rooms.
//!
//! One driver per room. It starts idle: [`TickDriver::wait_for_tick`]
//! pends forever until [`TickDriver::start`] is called when the round
//! begins, and pends again after [`TickDriver::stop`] once the round
//! ends. This makes it safe to keep as a permanent branch of the room
//! actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         info = driver.wait_for_tick() => {
//!             let events = sim.tick(epoch_ms());
//!             // broadcast ...
//!         }
//!     }
//! }
//! ```
//!
//! Overruns are handled by skipping: when a tick fires late, the next
//! deadline is scheduled from *now* rather than from the missed one, so
//! a slow tick never snowballs into a burst of catch-up ticks. The
//! simulation compensates for lost wall-clock time on its own.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

/// Highest supported tick rate.
pub const MAX_RATE_HZ: u32 = 128;

/// Jitter range (µs) applied to the first deadline after [`TickDriver::start`],
/// so rooms started in the same instant do not tick in lockstep.
const START_JITTER_US: u64 = 2_000;

/// Information about a fired tick.
#[derive(Debug, Clone, Copy)]
pub struct TickInfo {
    /// Monotonically increasing tick number, starting at 1.
    pub tick: u64,
    /// `true` when the tick fired noticeably late.
    pub overrun: bool,
    /// Whole periods skipped because of the overrun.
    pub skipped: u64,
}

/// Fixed-timestep tick driver.
pub struct TickDriver {
    period: Duration,
    rate_hz: u32,
    jitter_us: u64,
    running: bool,
    tick_count: u64,
    next_tick: Option<Instant>,
}

impl TickDriver {
    /// Creates an idle driver for the given rate. Rates above
    /// [`MAX_RATE_HZ`] are clamped; a rate of 0 is raised to 1.
    pub fn new(rate_hz: u32) -> Self {
        let rate_hz = rate_hz.clamp(1, MAX_RATE_HZ);
        debug!(rate_hz, "tick driver created (idle)");
        Self {
            period: Duration::from_secs_f64(1.0 / rate_hz as f64),
            rate_hz,
            jitter_us: START_JITTER_US,
            running: false,
            tick_count: 0,
            next_tick: None,
        }
    }

    /// Disables start jitter. Intended for deterministic tests.
    pub fn without_jitter(mut self) -> Self {
        self.jitter_us = 0;
        self
    }

    /// Begins ticking. The first deadline is one period from now plus a
    /// small random jitter. Idempotent: calling on a running driver does
    /// not reschedule.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        let jitter = if self.jitter_us > 0 {
            Duration::from_micros(rand::rng().random_range(0..self.jitter_us))
        } else {
            Duration::ZERO
        };
        self.next_tick = Some(Instant::now() + self.period + jitter);
        self.running = true;
        debug!(rate_hz = self.rate_hz, "tick driver started");
    }

    /// Stops ticking. `wait_for_tick` pends until the next `start`.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.next_tick = None;
            debug!(tick = self.tick_count, "tick driver stopped");
        }
    }

    /// Whether the driver is currently ticking.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks fired since creation.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The fixed tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// The configured rate in Hz.
    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    /// Waits until the next tick is due.
    ///
    /// While the driver is stopped this future pends forever; it never
    /// resolves on its own, but `tokio::select!` keeps servicing other
    /// branches.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let Some(next) = self.next_tick.filter(|_| self.running) else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > self.period / 10;
        let mut skipped = 0u64;
        if overrun {
            skipped = late_by.as_nanos() as u64 / self.period.as_nanos() as u64;
            if skipped > 0 {
                warn!(
                    tick = self.tick_count,
                    skipped,
                    late_ms = late_by.as_secs_f64() * 1000.0,
                    "tick overrun, skipping ahead"
                );
            }
        }
        // Skip policy: schedule from now, not from the missed deadline.
        self.next_tick = Some(now + self.period);

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            overrun,
            skipped,
        }
    }
}
