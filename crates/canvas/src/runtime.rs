use std::time::{Duration, Instant};

/// How a canvas decides when to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPolicy {
    /// Draw on every display refresh until unmounted.
    Continuous,
    /// Draw only after an external trigger, coalescing bursts into one frame.
    OnDemand,
}

/// Rolling frames-per-second counter, refreshed once a second.
#[derive(Debug, Clone)]
pub struct FrameStats {
    frames_since_update: u32,
    last_update: Instant,
    frames_per_second: f32,
    total_frames: u64,
}

impl FrameStats {
    pub fn new(now: Instant) -> Self {
        Self {
            frames_since_update: 0,
            last_update: now,
            frames_per_second: 0.0,
            total_frames: 0,
        }
    }

    /// Records one presented frame. Returns the new rate when the window
    /// rolled over.
    pub fn record(&mut self, now: Instant) -> Option<f32> {
        self.frames_since_update += 1;
        self.total_frames += 1;
        let elapsed = now.saturating_duration_since(self.last_update);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        self.frames_per_second = self.frames_since_update as f32 / elapsed.as_secs_f32();
        self.frames_since_update = 0;
        self.last_update = now;
        Some(self.frames_per_second)
    }

    pub fn frames_per_second(&self) -> f32 {
        self.frames_per_second
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}
