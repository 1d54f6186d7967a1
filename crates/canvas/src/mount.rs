use std::time::Instant;

use tracing::{debug, info};

use crate::backend::ContextSource;
use crate::driver::UniformDriver;
use crate::error::{FrameError, ShaderError};
use crate::host::ShaderCanvasHost;
use crate::runtime::RenderPolicy;
use crate::scheduler::FrameRequester;
use crate::scroll::{ScrollObserver, ScrollRegion, ScrollUpdate, SubscriptionId};
use crate::surface::Viewport;
use crate::types::ShaderSources;

/// Result of a frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Drawn,
    /// Nothing was pending, the mount is closed, or the surface had no image
    /// to present.
    Skipped,
}

/// A scene mounted onto one drawing surface.
///
/// `open` acquires the host's program, sizes the surface, subscribes to
/// scroll reports when the driver follows scrolling, and asks for the first
/// frame. `close` undoes each of those; dropping an open mount closes it.
pub struct CanvasMount<S: ContextSource> {
    host: ShaderCanvasHost<S>,
    driver: Box<dyn UniformDriver>,
    scroll: ScrollObserver,
    subscription: Option<SubscriptionId>,
    viewport: Viewport,
    open: bool,
}

impl<S: ContextSource> CanvasMount<S> {
    pub fn open(
        source: S,
        requester: Box<dyn FrameRequester>,
        sources: &ShaderSources,
        mut driver: Box<dyn UniformDriver>,
        viewport: Viewport,
        now: Instant,
    ) -> Result<Self, ShaderError> {
        let mut host = ShaderCanvasHost::new(source, requester, driver.dpr_cap());
        host.resize(viewport);
        if let Err(err) = host.initialize(&sources.vertex, &sources.fragment) {
            host.dispose();
            return Err(err);
        }

        let mut scroll = ScrollObserver::new();
        let subscription = driver
            .scroll_pages()
            .map(|pages| scroll.subscribe(ScrollRegion::pages(pages, viewport.css_height)));

        if driver.on_mount(now, host.uniforms_mut()) {
            host.request_redraw();
        }
        info!(
            scene = driver.label(),
            policy = ?driver.policy(),
            width = viewport.css_width,
            height = viewport.css_height,
            "mounted shader canvas"
        );

        Ok(Self {
            host,
            driver,
            scroll,
            subscription,
            viewport,
            open: true,
        })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn host(&self) -> &ShaderCanvasHost<S> {
        &self.host
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn policy(&self) -> RenderPolicy {
        self.driver.policy()
    }

    /// Current page scroll offset and its upper bound, in CSS pixels.
    pub fn scroll_extent(&self) -> (f32, f32) {
        (self.scroll.position(), self.scroll.max_position())
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if !self.open {
            return;
        }
        self.viewport = viewport;
        if let (Some(id), Some(pages)) = (self.subscription, self.driver.scroll_pages()) {
            self.scroll
                .update_region(id, ScrollRegion::pages(pages, viewport.css_height));
        }
        if self.host.resize(viewport) {
            debug!(metrics = ?self.host.metrics(), "canvas resized");
            self.host.request_redraw();
        }
    }

    pub fn scroll_by(&mut self, delta_px: f32) {
        if !self.open {
            return;
        }
        let updates = self.scroll.scroll_by(delta_px);
        self.deliver(updates);
    }

    pub fn scroll_to(&mut self, position_px: f32) {
        if !self.open {
            return;
        }
        let updates = self.scroll.scroll_to(position_px);
        self.deliver(updates);
    }

    fn deliver(&mut self, updates: Vec<ScrollUpdate>) {
        for update in updates {
            if Some(update.subscription) != self.subscription {
                continue;
            }
            if self.driver.on_scroll(update.progress, self.host.uniforms_mut()) {
                self.host.request_redraw();
            }
        }
    }

    pub fn request_redraw(&mut self) {
        if self.open {
            self.host.request_redraw();
        }
    }

    /// Runs one frame callback: draws if a redraw was pending and keeps
    /// continuous drivers ticking.
    pub fn frame(&mut self, now: Instant) -> Result<FrameStatus, FrameError> {
        if !self.open || !self.host.take_frame() {
            return Ok(FrameStatus::Skipped);
        }
        let again = self.driver.on_frame(now, self.host.uniforms_mut());
        let presented = self.host.draw()?;
        if again {
            self.host.request_redraw();
        }
        Ok(if presented {
            FrameStatus::Drawn
        } else {
            FrameStatus::Skipped
        })
    }

    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Some(id) = self.subscription.take() {
            self.scroll.unsubscribe(id);
        }
        self.host.dispose();
        info!(
            scene = self.driver.label(),
            draws = self.host.draw_count(),
            "unmounted shader canvas"
        );
    }
}

impl<S: ContextSource> Drop for CanvasMount<S> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::backend::recording::{RecordingSource, SharedLedger};
    use crate::driver::{PrismDriver, ShadeDriver, ShadeSettings};
    use crate::scheduler::tests::CountingRequester;

    fn sources() -> ShaderSources {
        ShaderSources::new("void main() {}", "void mainImage(out vec4 c, in vec2 p) {}")
    }

    fn open_shade(
        now: Instant,
    ) -> (
        CanvasMount<RecordingSource>,
        SharedLedger,
        CountingRequester,
    ) {
        let (source, ledger) = RecordingSource::new();
        let requester = CountingRequester::default();
        let mount = CanvasMount::open(
            source,
            Box::new(requester.clone()),
            &sources(),
            Box::new(ShadeDriver::new(ShadeSettings::default())),
            Viewport::new(1000.0, 100.0, 2.0),
            now,
        )
        .expect("open");
        (mount, ledger, requester)
    }

    #[test]
    fn scroll_burst_collapses_into_one_draw() {
        let start = Instant::now();
        let (mut mount, ledger, requester) = open_shade(start);
        // Let the intro finish so only scroll triggers remain.
        let done = start + Duration::from_secs(4);
        while mount.frame(done).unwrap() == FrameStatus::Drawn {}
        let draws = ledger.borrow().draws;
        let requests = requester.0.get();

        for _ in 0..5 {
            mount.scroll_by(70.0);
        }
        assert_eq!(requester.0.get(), requests + 1);
        assert_eq!(mount.frame(done).unwrap(), FrameStatus::Drawn);
        assert_eq!(mount.frame(done).unwrap(), FrameStatus::Skipped);

        let ledger = ledger.borrow();
        assert_eq!(ledger.draws, draws + 1);
        let uniforms = ledger.last_upload().unwrap();
        assert_eq!(uniforms.day_progress, 0.5);
        assert_eq!(uniforms.scroll_offset, 0.5);
        assert_eq!(uniforms.time, 100.0);
        assert_eq!(uniforms.resolution, [1000.0, 100.0, 1.0]);
    }

    #[test]
    fn draw_without_new_scroll_has_zero_time_delta() {
        let start = Instant::now();
        let (mut mount, ledger, _) = open_shade(start);
        mount.scroll_to(350.0);
        assert_eq!(
            mount.frame(start + Duration::from_millis(100)).unwrap(),
            FrameStatus::Drawn
        );
        let scrolled = ledger.borrow().last_upload().unwrap();
        assert_eq!((scrolled.time, scrolled.time_delta), (100.0, 100.0));

        // The intro is still ramping, so another frame follows with no scroll.
        assert_eq!(
            mount.frame(start + Duration::from_millis(200)).unwrap(),
            FrameStatus::Drawn
        );
        let intro_only = ledger.borrow().last_upload().unwrap();
        assert_eq!(intro_only.time, 100.0);
        assert_eq!(intro_only.time_delta, 0.0);
        assert!(intro_only.intro > scrolled.intro);
    }

    #[test]
    fn skipped_presentation_is_not_reported_as_drawn() {
        let start = Instant::now();
        let (mut mount, ledger, requester) = open_shade(start);
        ledger.borrow_mut().skip_draws = true;
        let requests = requester.0.get();

        let status = mount.frame(start + Duration::from_millis(100)).unwrap();
        assert_eq!(status, FrameStatus::Skipped);
        assert_eq!(mount.host().draw_count(), 0);
        // The intro still asks for the next frame.
        assert_eq!(requester.0.get(), requests + 1);
    }

    #[test]
    fn unmount_during_intro_stops_drawing() {
        let start = Instant::now();
        let (mut mount, ledger, _) = open_shade(start);
        mount.frame(start + Duration::from_millis(100)).unwrap();
        mount.close();
        let draws = ledger.borrow().draws;
        assert_eq!(ledger.borrow().live_objects(), 0);

        for ms in [200, 1000, 5000] {
            let status = mount.frame(start + Duration::from_millis(ms)).unwrap();
            assert_eq!(status, FrameStatus::Skipped);
        }
        mount.scroll_by(300.0);
        mount.resize(Viewport::new(10.0, 10.0, 1.0));
        assert_eq!(ledger.borrow().draws, draws);
        mount.close();
    }

    #[test]
    fn prism_keeps_requesting_frames() {
        let start = Instant::now();
        let (source, ledger) = RecordingSource::new();
        let requester = CountingRequester::default();
        let mut mount = CanvasMount::open(
            source,
            Box::new(requester.clone()),
            &sources(),
            Box::new(PrismDriver::default()),
            Viewport::new(640.0, 480.0, 3.0),
            start,
        )
        .unwrap();
        assert_eq!(mount.policy(), RenderPolicy::Continuous);
        for frame in 1..=10u64 {
            let status = mount.frame(start + Duration::from_millis(frame * 16)).unwrap();
            assert_eq!(status, FrameStatus::Drawn);
        }
        assert_eq!(requester.0.get(), 11);
        let ledger = ledger.borrow();
        assert_eq!(ledger.draws, 10);
        assert_eq!(ledger.last_upload().unwrap().resolution, [1280.0, 960.0, 1.0]);
    }

    #[test]
    fn failed_open_leaves_nothing_allocated() {
        let (source, ledger) = RecordingSource::new();
        ledger.borrow_mut().fail_compile = Some(crate::error::ShaderStageKind::Fragment);
        let result = CanvasMount::open(
            source,
            Box::new(CountingRequester::default()),
            &sources(),
            Box::new(PrismDriver::default()),
            Viewport::new(640.0, 480.0, 1.0),
            Instant::now(),
        );
        assert!(matches!(result, Err(ShaderError::CompileError { .. })));
        assert_eq!(ledger.borrow().live_objects(), 0);
    }

    #[test]
    fn frame_fault_is_reported() {
        let start = Instant::now();
        let (mut mount, ledger, _) = open_shade(start);
        ledger.borrow_mut().fail_draw = true;
        assert!(matches!(mount.frame(start), Err(FrameError::Device(_))));
    }

    #[test]
    fn resize_keeps_scroll_progress() {
        let start = Instant::now();
        let (mut mount, _, _) = open_shade(start);
        mount.scroll_to(350.0);
        mount.resize(Viewport::new(1000.0, 200.0, 1.0));
        assert_eq!(mount.scroll_extent(), (700.0, 1400.0));
        assert!(mount.host().has_pending_frame());
    }
}
