use std::time::Instant;

/// Two-state machine driving the live position estimate: `Running` advances
/// the baseline each tick, `Held` freezes it. The phase only changes when a
/// new snapshot arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Held,
}

/// Frame-driven estimator that smooths the playback position between sparse
/// session snapshots. Snapshot arrivals hard-reset the baseline; render-clock
/// ticks advance it while playing.
#[derive(Debug, Clone)]
pub struct PositionInterpolator {
    baseline_ms: f64,
    last_tick: Instant,
    phase: Phase,
}

impl PositionInterpolator {
    pub fn new(now: Instant) -> Self {
        Self {
            baseline_ms: 0.0,
            last_tick: now,
            phase: Phase::Held,
        }
    }

    /// Apply a freshly arrived snapshot: the reported position overrides any
    /// interpolation drift accumulated since the previous snapshot.
    pub fn reset(&mut self, position_ms: u64, playing: bool, now: Instant) {
        self.baseline_ms = position_ms as f64;
        self.last_tick = now;
        self.phase = if playing { Phase::Running } else { Phase::Held };
    }

    /// Advance the estimate by the wall-clock time since the previous tick.
    /// The tick timestamp updates unconditionally so elapsed time never
    /// accumulates across a pause.
    pub fn tick(&mut self, now: Instant) {
        // A monotonic clock cannot go backwards, but saturate anyway so a
        // regressed `now` freezes the estimate instead of rewinding it.
        let elapsed = now.saturating_duration_since(self.last_tick);
        if self.phase == Phase::Running {
            self.baseline_ms += elapsed.as_secs_f64() * 1000.0;
        }
        self.last_tick = now;
    }

    pub fn position_ms(&self) -> u64 {
        self.baseline_ms.max(0.0).round() as u64
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Fraction of the track elapsed, clamped to `[0, 1]`. A missing or zero
    /// duration yields zero rather than dividing by it.
    pub fn progress_ratio(&self, duration_ms: u64) -> f64 {
        if duration_ms == 0 {
            return 0.0;
        }
        (self.baseline_ms / duration_ms as f64).clamp(0.0, 1.0)
    }
}
