use std::time::{Duration, Instant};

use crate::Easing;

/// Phase of a single-track tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenPhase {
    NotStarted,
    Animating,
    Complete,
}

/// One sampled value of a [`Tween`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSample {
    /// Eased progress in `[0, 1]`.
    pub value: f32,
    /// Linear progress in `[0, 1]` before easing.
    pub progress: f32,
    pub finished: bool,
}

/// A fixed-duration 0→1 ramp anchored at a wall-clock start.
///
/// Once a tween reports `Complete` it stays complete: later samples return 1
/// and earlier timestamps never rewind it.
#[derive(Debug, Clone)]
pub struct Tween {
    duration: Duration,
    easing: Easing,
    start: Option<Instant>,
    phase: TweenPhase,
    last_value: f32,
}

impl Tween {
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            start: None,
            phase: TweenPhase::NotStarted,
            last_value: 0.0,
        }
    }

    pub fn phase(&self) -> TweenPhase {
        self.phase
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Anchors the ramp at `now`. Calling `start` again is a no-op.
    pub fn start(&mut self, now: Instant) {
        if self.phase == TweenPhase::NotStarted {
            self.start = Some(now);
            self.phase = TweenPhase::Animating;
        }
    }

    pub fn sample(&mut self, now: Instant) -> TweenSample {
        let Some(start) = self.start else {
            return TweenSample {
                value: 0.0,
                progress: 0.0,
                finished: false,
            };
        };
        if self.phase == TweenPhase::Complete {
            return TweenSample {
                value: 1.0,
                progress: 1.0,
                finished: true,
            };
        }

        let elapsed = now.saturating_duration_since(start);
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        };
        let finished = progress >= 1.0;
        let value = if finished {
            1.0
        } else {
            self.easing.sample(progress).max(self.last_value)
        };
        self.last_value = value;
        if finished {
            self.phase = TweenPhase::Complete;
        }

        TweenSample {
            value,
            progress,
            finished,
        }
    }
}
