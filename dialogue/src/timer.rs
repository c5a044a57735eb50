//! Turn timer — a single countdown per active turn.
//!
//! The timer does not own a task or a callback. It records the deadline and
//! the turn generation it was armed for; whoever drives the clock calls
//! [`TurnTimer::poll`] on each tick. An expiry fires once and carries its
//! generation, so the controller can discard it if the turn has moved on.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Stopped,
    Running { generation: u64, deadline: Instant },
}

/// Countdown armed for one turn generation at a time.
#[derive(Debug, Clone)]
pub struct TurnTimer {
    duration: Duration,
    state: TimerState,
}

impl TurnTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: TimerState::Stopped,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Arm (or re-arm) the countdown for `generation`, starting at `now`.
    pub fn restart(&mut self, generation: u64, now: Instant) {
        self.state = TimerState::Running {
            generation,
            deadline: now + self.duration,
        };
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    /// Generation the running countdown belongs to.
    pub fn generation(&self) -> Option<u64> {
        match self.state {
            TimerState::Running { generation, .. } => Some(generation),
            TimerState::Stopped => None,
        }
    }

    /// Time left, or `None` when stopped.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match self.state {
            TimerState::Running { deadline, .. } => Some(deadline.saturating_duration_since(now)),
            TimerState::Stopped => None,
        }
    }

    /// Fire if the deadline has passed. Returns the armed generation exactly
    /// once and leaves the timer stopped until the next restart.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        match self.state {
            TimerState::Running {
                generation,
                deadline,
            } if now >= deadline => {
                self.state = TimerState::Stopped;
                Some(generation)
            }
            _ => None,
        }
    }
}
