//! Scroll observation for scroll-coupled scenes.
//!
//! Mirrors a page whose top is at offset 0. Each subscription describes a
//! trigger region that starts at the top of the page; its progress is 0 when
//! the region's top meets the viewport's top and 1 when the region's bottom
//! meets the viewport's bottom.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRegion {
    pub trigger_region_height_px: f32,
    pub viewport_height_px: f32,
}

impl ScrollRegion {
    /// A region `pages` viewport heights tall.
    pub fn pages(pages: f32, viewport_height_px: f32) -> Self {
        Self {
            trigger_region_height_px: pages * viewport_height_px,
            viewport_height_px,
        }
    }

    /// Distance the page can scroll while the region is pinned.
    pub fn scrollable_px(&self) -> f32 {
        (self.trigger_region_height_px - self.viewport_height_px).max(0.0)
    }

    fn progress_at(&self, position: f32) -> f32 {
        let distance = self.scrollable_px();
        if distance <= 0.0 {
            return 0.0;
        }
        (position / distance).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollUpdate {
    pub subscription: SubscriptionId,
    pub progress: f32,
}

#[derive(Debug, Clone)]
struct Subscription {
    id: SubscriptionId,
    region: ScrollRegion,
    progress: f32,
}

#[derive(Debug, Default)]
pub struct ScrollObserver {
    position_px: f32,
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl ScrollObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, region: ScrollRegion) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let progress = region.progress_at(self.position_px);
        self.subscriptions.push(Subscription {
            id,
            region,
            progress,
        });
        tracing::debug!(
            region_px = region.trigger_region_height_px,
            viewport_px = region.viewport_height_px,
            "scroll subscription added"
        );
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        if self.subscriptions.is_empty() {
            self.position_px = 0.0;
        }
        self.subscriptions.len() != before
    }

    pub fn progress(&self, id: SubscriptionId) -> Option<f32> {
        self.subscriptions
            .iter()
            .find(|sub| sub.id == id)
            .map(|sub| sub.progress)
    }

    pub fn position(&self) -> f32 {
        self.position_px
    }

    /// Furthest scroll offset any subscribed region allows.
    pub fn max_position(&self) -> f32 {
        self.subscriptions
            .iter()
            .map(|sub| sub.region.scrollable_px())
            .fold(0.0, f32::max)
    }

    pub fn scroll_by(&mut self, delta_px: f32) -> Vec<ScrollUpdate> {
        if !delta_px.is_finite() {
            return Vec::new();
        }
        self.scroll_to(self.position_px + delta_px)
    }

    pub fn scroll_to(&mut self, position_px: f32) -> Vec<ScrollUpdate> {
        if !position_px.is_finite() {
            return Vec::new();
        }
        self.position_px = position_px.clamp(0.0, self.max_position());
        self.emit()
    }

    /// Replaces a subscription's region, keeping its progress. The page
    /// position moves so the region stays at the same relative offset.
    pub fn update_region(&mut self, id: SubscriptionId, region: ScrollRegion) -> bool {
        let Some(sub) = self.subscriptions.iter_mut().find(|sub| sub.id == id) else {
            return false;
        };
        sub.region = region;
        let target = sub.progress * region.scrollable_px();
        self.position_px = target.clamp(0.0, self.max_position());
        for sub in &mut self.subscriptions {
            if sub.id != id {
                sub.progress = sub.region.progress_at(self.position_px);
            }
        }
        true
    }

    fn emit(&mut self) -> Vec<ScrollUpdate> {
        let position = self.position_px;
        self.subscriptions
            .iter_mut()
            .filter_map(|sub| {
                let progress = sub.region.progress_at(position);
                if progress == sub.progress {
                    return None;
                }
                sub.progress = progress;
                Some(ScrollUpdate {
                    subscription: sub.id,
                    progress,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_spans_region_minus_viewport() {
        let mut observer = ScrollObserver::new();
        let id = observer.subscribe(ScrollRegion::pages(8.0, 100.0));
        assert_eq!(observer.max_position(), 700.0);
        assert_eq!(observer.progress(id), Some(0.0));

        let updates = observer.scroll_by(350.0);
        assert_eq!(
            updates,
            vec![ScrollUpdate {
                subscription: id,
                progress: 0.5
            }]
        );
        assert_eq!(observer.scroll_to(10_000.0)[0].progress, 1.0);
        assert_eq!(observer.position(), 700.0);
    }

    #[test]
    fn progress_is_monotonic_while_scrolling_down() {
        let mut observer = ScrollObserver::new();
        let id = observer.subscribe(ScrollRegion::pages(8.0, 720.0));
        let mut last = 0.0;
        for _ in 0..200 {
            for update in observer.scroll_by(48.0) {
                assert_eq!(update.subscription, id);
                assert!(update.progress >= last);
                last = update.progress;
            }
        }
        assert_eq!(last, 1.0);
        assert!(observer.scroll_by(48.0).is_empty());
    }

    #[test]
    fn resize_keeps_progress() {
        let mut observer = ScrollObserver::new();
        let id = observer.subscribe(ScrollRegion::pages(8.0, 100.0));
        observer.scroll_to(175.0);
        assert_eq!(observer.progress(id), Some(0.25));

        assert!(observer.update_region(id, ScrollRegion::pages(8.0, 200.0)));
        assert_eq!(observer.position(), 350.0);
        assert_eq!(observer.progress(id), Some(0.25));
    }

    #[test]
    fn released_subscriptions_stop_reporting() {
        let mut observer = ScrollObserver::new();
        let id = observer.subscribe(ScrollRegion::pages(4.0, 100.0));
        assert!(observer.unsubscribe(id));
        assert!(!observer.unsubscribe(id));
        assert!(observer.scroll_by(50.0).is_empty());
        assert_eq!(observer.progress(id), None);
        assert_eq!(observer.position(), 0.0);
    }

    #[test]
    fn degenerate_region_reports_zero() {
        let region = ScrollRegion::pages(1.0, 100.0);
        assert_eq!(region.scrollable_px(), 0.0);
        assert_eq!(region.progress_at(50.0), 0.0);
    }
}
