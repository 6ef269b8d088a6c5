//! The scheduler thread's main loop.
//!
//! The scheduler owns [`PatrolEngine`] exclusively (moved in via
//! `thread::spawn`). Commands and ticks run one at a time on this thread,
//! so a feedback never observes a half-replaced particle set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::engine::{PatrolEngine, TickError, TickReport};
use crate::snapshot::SnapshotSlot;

/// State held by the scheduler's main loop.
pub(crate) struct SchedulerState {
    engine: PatrolEngine,
    slot: Arc<SnapshotSlot>,
    cmd_rx: Receiver<Command>,
    shutdown_flag: Arc<AtomicBool>,
    interval: Duration,
    last_tick: Instant,
}

impl SchedulerState {
    pub fn new(
        engine: PatrolEngine,
        slot: Arc<SnapshotSlot>,
        cmd_rx: Receiver<Command>,
        shutdown_flag: Arc<AtomicBool>,
        interval: Duration,
    ) -> Self {
        Self {
            engine,
            slot,
            cmd_rx,
            shutdown_flag,
            interval,
            last_tick: Instant::now(),
        }
    }

    /// Main loop. Runs until the shutdown flag is set or every sender is
    /// dropped.
    ///
    /// A due tick runs before the next command is taken, so a steady
    /// stream of requests cannot hold the refresh off. The next tick is
    /// armed only once the previous one has completed, so ticks never
    /// overlap and drift by their own duration. Consumes self and hands
    /// the engine back through the `JoinHandle`.
    pub fn run(mut self) -> PatrolEngine {
        let mut deadline = self.last_tick + self.interval;
        loop {
            if self.shutdown_flag.load(Ordering::Acquire) {
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                let _ = self.run_tick(self.interval);
                deadline = self.last_tick + self.interval;
                continue;
            }
            match self.cmd_rx.recv_timeout(deadline - now) {
                Ok(cmd) => {
                    if self.handle(cmd) {
                        deadline = self.last_tick + self.interval;
                    }
                }
                // The deadline check at the top runs the tick.
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!(tick = %self.engine.tick_id(), "scheduler stopped");
        self.engine
    }

    /// Run one tick and publish. A failed tick is logged and still
    /// re-arms the timer.
    fn run_tick(&mut self, elapsed: Duration) -> Result<TickReport, TickError> {
        let result = self.engine.tick(elapsed);
        match &result {
            Ok(report) => info!(
                tick = %report.tick_id,
                particles = report.metrics.particles,
                total_us = report.metrics.total_us,
                "tick complete"
            ),
            Err(error) => warn!(
                %error,
                failed_ticks = self.engine.metrics().failed_ticks,
                "tick failed; next tick still armed"
            ),
        }
        self.last_tick = Instant::now();
        self.slot.publish(self.engine.snapshot());
        result
    }

    /// Apply one command. Returns whether it ran a tick.
    fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Feedback { feedback, reply } => {
                let result = self.engine.report_feedback(&feedback);
                if result.is_ok() {
                    self.slot.publish(self.engine.snapshot());
                }
                let _ = reply.send(result);
            }
            Command::ReportOil { sightings, reply } => {
                // Best-effort reply: the caller may have given up waiting.
                let _ = reply.send(self.engine.report_oil(&sightings));
            }
            Command::AttachMission { config, reply } => {
                let result = self.engine.attach_mission(&config);
                if result.is_ok() {
                    self.slot.publish(self.engine.snapshot());
                }
                let _ = reply.send(result);
            }
            Command::DetachMission { reply } => {
                let had = self.engine.detach_mission();
                self.slot.publish(self.engine.snapshot());
                let _ = reply.send(had);
            }
            Command::Wake => {}
            Command::TickNow { reply } => {
                let elapsed = self.last_tick.elapsed();
                debug!(?elapsed, "tick requested");
                let _ = reply.send(self.run_tick(elapsed).map(|r| r.tick_id));
                return true;
            }
        }
        false
    }
}
