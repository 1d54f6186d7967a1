use std::time::{Duration, Instant};

use timeline::{Easing, Tween, TweenPhase};

use super::UniformDriver;
use crate::runtime::RenderPolicy;
use crate::uniforms::UniformSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadeSettings {
    pub dpr_cap: f32,
    pub intro_duration: Duration,
    pub intro_easing: Easing,
    /// Shader seconds covered by the full scroll region.
    pub time_span: f32,
    pub scroll_pages: f32,
}

impl Default for ShadeSettings {
    fn default() -> Self {
        Self {
            dpr_cap: 1.0,
            intro_duration: Duration::from_secs(3),
            intro_easing: Easing::PowerOut(2),
            time_span: 200.0,
            scroll_pages: 8.0,
        }
    }
}

/// Scroll-coupled day cycle with a one-shot intro reveal.
///
/// Day progress and cloud offset both track the same clamped scroll
/// progress; shader time is that progress scaled by `time_span`. The time
/// delta is measured between drawn frames, so a redraw with no scroll in
/// between always sees a delta of zero.
#[derive(Debug, Clone)]
pub struct ShadeDriver {
    settings: ShadeSettings,
    intro: Tween,
    shader_time: f32,
    last_drawn_time: f32,
}

impl ShadeDriver {
    pub fn new(settings: ShadeSettings) -> Self {
        Self {
            intro: Tween::new(settings.intro_duration, settings.intro_easing),
            settings,
            shader_time: 0.0,
            last_drawn_time: 0.0,
        }
    }

    pub fn intro_phase(&self) -> TweenPhase {
        self.intro.phase()
    }

    pub fn settings(&self) -> &ShadeSettings {
        &self.settings
    }
}

impl UniformDriver for ShadeDriver {
    fn label(&self) -> &'static str {
        "shade"
    }

    fn policy(&self) -> RenderPolicy {
        RenderPolicy::OnDemand
    }

    fn dpr_cap(&self) -> f32 {
        self.settings.dpr_cap
    }

    fn scroll_pages(&self) -> Option<f32> {
        Some(self.settings.scroll_pages)
    }

    fn on_mount(&mut self, now: Instant, uniforms: &mut UniformSet) -> bool {
        self.intro.start(now);
        uniforms.intro = self.intro.sample(now).value;
        true
    }

    fn on_frame(&mut self, now: Instant, uniforms: &mut UniformSet) -> bool {
        uniforms.time = self.shader_time;
        uniforms.time_delta = (self.shader_time - self.last_drawn_time).max(0.0);
        self.last_drawn_time = self.shader_time;

        if self.intro.phase() != TweenPhase::Animating {
            return false;
        }
        let sample = self.intro.sample(now);
        uniforms.intro = sample.value;
        !sample.finished
    }

    fn on_scroll(&mut self, progress: f32, uniforms: &mut UniformSet) -> bool {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.shader_time = progress * self.settings.time_span;
        uniforms.time = self.shader_time;
        uniforms.day_progress = progress;
        uniforms.scroll_offset = progress;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reports `progress` and then draws, returning the drawn delta.
    fn scroll_then_draw(
        driver: &mut ShadeDriver,
        uniforms: &mut UniformSet,
        progress: f32,
        now: Instant,
    ) -> f32 {
        driver.on_scroll(progress, uniforms);
        driver.on_frame(now, uniforms);
        uniforms.time_delta
    }

    #[test]
    fn scroll_reports_drive_day_and_time() {
        let now = Instant::now();
        let mut driver = ShadeDriver::new(ShadeSettings::default());
        let mut uniforms = UniformSet::default();

        assert!(driver.on_scroll(0.0, &mut uniforms));
        assert_eq!((uniforms.day_progress, uniforms.time), (0.0, 0.0));

        assert_eq!(scroll_then_draw(&mut driver, &mut uniforms, 0.5, now), 100.0);
        assert_eq!(uniforms.day_progress, 0.5);
        assert_eq!(uniforms.scroll_offset, 0.5);
        assert_eq!(uniforms.time, 100.0);

        assert_eq!(scroll_then_draw(&mut driver, &mut uniforms, 0.5, now), 0.0);

        assert_eq!(scroll_then_draw(&mut driver, &mut uniforms, 1.0, now), 100.0);
        assert_eq!(uniforms.day_progress, 1.0);
        assert_eq!(uniforms.time, 200.0);
    }

    #[test]
    fn progress_is_clamped_and_delta_never_negative() {
        let now = Instant::now();
        let mut driver = ShadeDriver::new(ShadeSettings::default());
        let mut uniforms = UniformSet::default();
        for progress in [0.8, 1.7, -0.3, f32::NAN, 0.25] {
            assert!(scroll_then_draw(&mut driver, &mut uniforms, progress, now) >= 0.0);
            assert!((0.0..=1.0).contains(&uniforms.day_progress));
            assert_eq!(uniforms.day_progress, uniforms.scroll_offset);
        }
        assert_eq!(uniforms.day_progress, 0.25);
        assert_eq!(uniforms.time_delta, 50.0);
    }

    #[test]
    fn redraw_without_scroll_has_zero_delta() {
        let now = Instant::now();
        let mut driver = ShadeDriver::new(ShadeSettings::default());
        let mut uniforms = UniformSet::default();
        driver.on_mount(now, &mut uniforms);

        assert_eq!(scroll_then_draw(&mut driver, &mut uniforms, 0.5, now), 100.0);

        driver.on_frame(now + Duration::from_millis(16), &mut uniforms);
        assert_eq!(uniforms.time_delta, 0.0);
        assert_eq!(uniforms.time, 100.0);
    }

    #[test]
    fn coalesced_reports_measure_delta_from_last_draw() {
        let now = Instant::now();
        let mut driver = ShadeDriver::new(ShadeSettings::default());
        let mut uniforms = UniformSet::default();
        assert_eq!(scroll_then_draw(&mut driver, &mut uniforms, 0.25, now), 50.0);

        for progress in [0.5, 0.75, 0.4] {
            driver.on_scroll(progress, &mut uniforms);
        }
        driver.on_frame(now, &mut uniforms);
        assert_eq!(uniforms.time, 80.0);
        assert_eq!(uniforms.time_delta, 30.0);
    }

    #[test]
    fn intro_ramps_once_and_stays_complete() {
        let start = Instant::now();
        let mut driver = ShadeDriver::new(ShadeSettings::default());
        let mut uniforms = UniformSet::default();
        assert!(driver.on_mount(start, &mut uniforms));
        assert_eq!(driver.intro_phase(), TweenPhase::Animating);

        let mut previous = 0.0;
        for ms in (0..3000).step_by(250) {
            assert!(driver.on_frame(start + Duration::from_millis(ms), &mut uniforms));
            assert!(uniforms.intro >= previous);
            previous = uniforms.intro;
        }
        assert!(!driver.on_frame(start + Duration::from_secs(3), &mut uniforms));
        assert_eq!(uniforms.intro, 1.0);
        assert_eq!(driver.intro_phase(), TweenPhase::Complete);

        // Completed intros never restart, even if mounted again.
        assert!(!driver.on_frame(start + Duration::from_secs(4), &mut uniforms));
        driver.on_mount(start + Duration::from_secs(5), &mut uniforms);
        assert_eq!(driver.intro_phase(), TweenPhase::Complete);
        assert_eq!(uniforms.intro, 1.0);
    }
}
