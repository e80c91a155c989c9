//! Time management for the simulation
//!
//! The clock counts discrete ticks; in-game seconds are derived from the
//! tick counter so the two never drift apart. Periodic behaviors (commuter spawning, upkeep billing) are gated on tick
//! boundaries through [`Periodic`].

/// Small slack so a frame delta that lands a hair under a whole number of
/// ticks still counts as reaching it
const TICK_EPSILON: f64 = 1e-6;

/// The range of ticks a single frame advanced over: `(from, to]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSpan {
    pub from: u64,
    pub to: u64,
}

impl TickSpan {
    /// Number of ticks covered by this span
    pub fn len(&self) -> u64 {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.to == self.from
    }
}

/// Monotonic simulation clock
#[derive(Debug, Clone)]
pub struct Clock {
    /// Ticks elapsed since the simulation started
    tick: u64,
    /// In-game seconds covered by one tick
    tick_duration: f64,
}

impl Clock {
    pub fn new(tick_duration: f32) -> Self {
        Self {
            tick: 0,
            tick_duration: f64::from(tick_duration.max(f32::EPSILON)),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// In-game seconds elapsed, always `tick * tick_duration`
    pub fn elapsed(&self) -> f64 {
        self.tick as f64 * self.tick_duration
    }

    pub fn tick_duration(&self) -> f64 {
        self.tick_duration
    }

    /// Advance by one frame of `delta_secs` in-game seconds
    ///
    /// A frame always advances at least one tick. A slow frame spanning
    /// several tick durations jumps the counter by all of them at once.
    /// The jump depends only on this frame's delta, never on earlier ones.
    pub fn advance(&mut self, delta_secs: f32) -> TickSpan {
        let from = self.tick;
        let delta = f64::from(delta_secs);
        let whole = if delta.is_finite() && delta > 0.0 {
            ((delta / self.tick_duration) + TICK_EPSILON).floor() as u64
        } else {
            0
        };
        self.tick = from.saturating_add(whole.max(1));

        TickSpan {
            from,
            to: self.tick,
        }
    }
}

/// A behavior that fires once whenever a multiple of `interval` ticks is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periodic {
    interval: u64,
}

impl Periodic {
    pub fn new(interval: u64) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Whether a boundary was crossed during `span`
    ///
    /// Fires at most once per span even if several boundaries were
    /// skipped; missed boundaries are not caught up. An interval of zero
    /// disables the behavior.
    pub fn fired(&self, span: TickSpan) -> bool {
        if self.interval == 0 {
            return false;
        }
        span.to / self.interval > span.from / self.interval
    }
}
