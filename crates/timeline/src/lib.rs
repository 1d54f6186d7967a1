//! Declarative animation timelines.
//!
//! A [`Timeline`] is a flat list of [`Track`]s, each describing one property of
//! one target moving from a start value to an end value over a window of time.
//! Sampling the timeline at an offset evaluates every track; there are no
//! timers or callbacks, so any offset can be inspected directly.
//!
//! Easing curves are looked up by name through a process-wide registry that is
//! populated once via [`register_once`] before anything mounts.

mod easing;
mod registry;
mod tween;

use std::time::Duration;

pub use easing::{Easing, CSS_EASE_OUT};
pub use registry::{is_registered, lookup, names, register_once};
pub use tween::{Tween, TweenPhase, TweenSample};

#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("easing registry has not been initialised; call timeline::register_once first")]
    Unregistered,
    #[error("unknown easing curve '{0}'")]
    UnknownEasing(String),
    #[error("invalid track for {target}.{property}: {reason}")]
    InvalidTrack {
        target: String,
        property: String,
        reason: String,
    },
}

/// One animated property: `(target, property, from, to, start, duration, easing)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub target: String,
    pub property: String,
    pub from: f32,
    pub to: f32,
    pub start: Duration,
    pub duration: Duration,
    pub easing: Easing,
}

impl Track {
    pub fn new(
        target: impl Into<String>,
        property: impl Into<String>,
        from: f32,
        to: f32,
    ) -> Self {
        Self {
            target: target.into(),
            property: property.into(),
            from,
            to,
            start: Duration::ZERO,
            duration: Duration::ZERO,
            easing: Easing::Linear,
        }
    }

    pub fn starting_at(mut self, start: Duration) -> Self {
        self.start = start;
        self
    }

    pub fn lasting(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn eased(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn end(&self) -> Duration {
        self.start + self.duration
    }

    /// Value at `offset`; holds `from` before the window and `to` after it.
    pub fn value_at(&self, offset: Duration) -> f32 {
        if offset <= self.start {
            return if self.duration.is_zero() && offset == self.start {
                self.to
            } else {
                self.from
            };
        }
        if offset >= self.end() {
            return self.to;
        }
        let local = (offset - self.start).as_secs_f32() / self.duration.as_secs_f32();
        let eased = self.easing.sample(local);
        self.from + (self.to - self.from) * eased
    }

    fn validate(&self) -> Result<(), TimelineError> {
        let reason = if self.target.trim().is_empty() {
            Some("target id must not be empty")
        } else if self.property.trim().is_empty() {
            Some("property must not be empty")
        } else if !self.from.is_finite() || !self.to.is_finite() {
            Some("from/to values must be finite")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(TimelineError::InvalidTrack {
                target: self.target.clone(),
                property: self.property.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// A sampled property value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<'a> {
    pub target: &'a str,
    pub property: &'a str,
    pub value: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    tracks: Vec<Track>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, track: Track) -> Result<(), TimelineError> {
        track.validate()?;
        self.tracks.push(track);
        Ok(())
    }

    pub fn with_track(mut self, track: Track) -> Result<Self, TimelineError> {
        self.push(track)?;
        Ok(self)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Offset at which the last track settles.
    pub fn duration(&self) -> Duration {
        self.tracks
            .iter()
            .map(Track::end)
            .max()
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_complete(&self, offset: Duration) -> bool {
        offset >= self.duration()
    }

    /// Value of `target.property` at `offset`.
    ///
    /// When several tracks animate the same property, the latest one that has
    /// started wins; before any has started the earliest track's `from` holds.
    pub fn value(&self, target: &str, property: &str, offset: Duration) -> Option<f32> {
        let mut matching: Vec<&Track> = self
            .tracks
            .iter()
            .filter(|track| track.target == target && track.property == property)
            .collect();
        matching.sort_by_key(|track| track.start);
        let first = matching.first()?;
        let active = matching
            .iter()
            .rev()
            .find(|track| track.start <= offset)
            .unwrap_or(first);
        Some(active.value_at(offset))
    }

    /// Every distinct `(target, property)` pair evaluated at `offset`, in
    /// first-declared order.
    pub fn sample(&self, offset: Duration) -> Vec<Sample<'_>> {
        let mut samples: Vec<Sample<'_>> = Vec::new();
        for track in &self.tracks {
            let seen = samples
                .iter()
                .any(|s| s.target == track.target && s.property == track.property);
            if seen {
                continue;
            }
            if let Some(value) = self.value(&track.target, &track.property, offset) {
                samples.push(Sample {
                    target: &track.target,
                    property: &track.property,
                    value,
                });
            }
        }
        samples
    }
}

pub mod presets {
    use std::time::Duration;

    use crate::{Timeline, TimelineError, Track, CSS_EASE_OUT};

    pub const HERO_TARGETS: [&str; 4] = ["logo", "title", "subtitle", "buttons"];
    pub const HERO_STAGGER: Duration = Duration::from_millis(200);
    pub const HERO_DURATION: Duration = Duration::from_millis(800);
    pub const HERO_RISE_PX: f32 = 30.0;

    /// Staggered fade-and-rise used by the hero section: each target fades
    /// from transparent and rises 30px, the n-th one starting `(n + 1) * 200ms`
    /// after mount.
    pub fn hero_entrance() -> Result<Timeline, TimelineError> {
        staggered_entrance(&HERO_TARGETS, HERO_STAGGER, HERO_DURATION, HERO_RISE_PX)
    }

    pub fn staggered_entrance(
        targets: &[&str],
        stagger: Duration,
        duration: Duration,
        rise: f32,
    ) -> Result<Timeline, TimelineError> {
        let mut timeline = Timeline::new();
        for (index, target) in targets.iter().enumerate() {
            let start = stagger * (index as u32 + 1);
            timeline.push(
                Track::new(*target, "opacity", 0.0, 1.0)
                    .starting_at(start)
                    .lasting(duration)
                    .eased(CSS_EASE_OUT),
            )?;
            timeline.push(
                Track::new(*target, "translateY", rise, 0.0)
                    .starting_at(start)
                    .lasting(duration)
                    .eased(CSS_EASE_OUT),
            )?;
        }
        Ok(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::presets::{hero_entrance, HERO_TARGETS};
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn track_holds_end_values_outside_its_window() {
        let track = Track::new("logo", "opacity", 0.0, 1.0)
            .starting_at(ms(200))
            .lasting(ms(800));
        assert_eq!(track.value_at(ms(0)), 0.0);
        assert_eq!(track.value_at(ms(200)), 0.0);
        assert!((track.value_at(ms(600)) - 0.5).abs() < 1e-6);
        assert_eq!(track.value_at(ms(1000)), 1.0);
        assert_eq!(track.value_at(ms(5000)), 1.0);
    }

    #[test]
    fn hero_entrance_staggers_targets() {
        let timeline = hero_entrance().unwrap();
        assert_eq!(timeline.tracks().len(), HERO_TARGETS.len() * 2);
        assert_eq!(timeline.duration(), ms(800 + 800));

        // At 300ms only the logo has started moving.
        let logo = timeline.value("logo", "opacity", ms(300)).unwrap();
        let title = timeline.value("title", "opacity", ms(300)).unwrap();
        assert!(logo > 0.0 && logo < 1.0);
        assert_eq!(title, 0.0);
        assert_eq!(timeline.value("buttons", "translateY", ms(300)), Some(30.0));

        assert!(timeline.is_complete(ms(1600)));
        for sample in timeline.sample(ms(1600)) {
            let expected = if sample.property == "opacity" { 1.0 } else { 0.0 };
            assert_eq!(sample.value, expected, "{}.{}", sample.target, sample.property);
        }
    }

    #[test]
    fn later_track_takes_over_shared_property() {
        let timeline = Timeline::new()
            .with_track(Track::new("card", "opacity", 0.0, 1.0).lasting(ms(100)))
            .unwrap()
            .with_track(
                Track::new("card", "opacity", 1.0, 0.2)
                    .starting_at(ms(500))
                    .lasting(ms(100)),
            )
            .unwrap();
        assert_eq!(timeline.value("card", "opacity", ms(300)), Some(1.0));
        assert_eq!(timeline.value("card", "opacity", ms(700)), Some(0.2));
        assert_eq!(timeline.sample(ms(700)).len(), 1);
        assert_eq!(timeline.value("card", "scale", ms(700)), None);
    }

    #[test]
    fn rejects_non_finite_tracks() {
        let err = Timeline::new()
            .push(Track::new("logo", "opacity", f32::NAN, 1.0))
            .unwrap_err();
        assert!(matches!(err, TimelineError::InvalidTrack { .. }));
    }
}
