//! Stress pulse lifecycle: `Idle → Active { until } → Idle`.
//!
//! A pulse adds load on top of the user's artificial load instead of
//! mutating it, so expiring a pulse can never undo a slider change made
//! while it was active. Triggering during an active pulse merges the two:
//! the larger amount wins and the later deadline wins.

use std::time::Duration;

use tokio::time::Instant;

use neurogrid_state::{StressView, clamp_artificial_load};

/// Longest single pulse. Longer requests are shortened to this.
pub const MAX_PULSE: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StressState {
    #[default]
    Idle,
    Active {
        amount: f64,
        until: Instant,
    },
}

/// What a trigger did to the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressTransition {
    /// A new pulse began.
    Started,
    /// An active pulse was merged with the new one.
    Extended,
}

impl StressState {
    /// Extra load contributed by the pulse.
    pub fn amount(&self) -> f64 {
        match self {
            StressState::Idle => 0.0,
            StressState::Active { amount, .. } => *amount,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, StressState::Active { .. })
    }

    /// When the active pulse ends.
    pub fn deadline(&self) -> Option<Instant> {
        match self {
            StressState::Idle => None,
            StressState::Active { until, .. } => Some(*until),
        }
    }

    /// Start a pulse of `amount` (clamped to `[0, 80]`) lasting `duration`
    /// (at most [`MAX_PULSE`]).
    pub fn trigger(&mut self, amount: f64, duration: Duration, now: Instant) -> StressTransition {
        let amount = clamp_artificial_load(amount);
        let until = now
            .checked_add(duration.min(MAX_PULSE))
            .unwrap_or(now);
        match *self {
            StressState::Idle => {
                *self = StressState::Active { amount, until };
                StressTransition::Started
            }
            StressState::Active {
                amount: current,
                until: current_until,
            } => {
                *self = StressState::Active {
                    amount: current.max(amount),
                    until: current_until.max(until),
                };
                StressTransition::Extended
            }
        }
    }

    /// Return to `Idle` if the deadline has passed. Returns whether a pulse
    /// ended.
    pub fn expire(&mut self, now: Instant) -> bool {
        match *self {
            StressState::Active { until, .. } if now >= until => {
                *self = StressState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn view(&self, now: Instant) -> StressView {
        match *self {
            StressState::Idle => StressView::default(),
            StressState::Active { amount, until } => StressView {
                active: true,
                amount,
                remaining_ms: until.saturating_duration_since(now).as_millis() as u64,
            },
        }
    }
}
