//! Per-tick timing and counters.
//!
//! [`TickMetrics`] describes the most recent tick; the cumulative counters
//! carry across ticks for the lifetime of the engine.

/// Timing and counters for the most recent tick.
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickMetrics {
    /// Wall-clock time for the whole tick.
    pub total_us: u64,
    /// Time handing the previous snapshot to the transport for persistence.
    pub persist_us: u64,
    /// Time advancing the transport and pulling the new snapshot.
    pub advance_us: u64,
    /// Time recomputing the simulation-window density.
    pub simulation_density_us: u64,
    /// Time recomputing the mission density (0 without a mission).
    pub mission_density_us: u64,
    /// Live particles after the tick.
    pub particles: usize,
    /// Cumulative particles consumed by robot feedback.
    pub consumed_total: u64,
    /// Cumulative failed ticks.
    pub failed_ticks: u64,
}
