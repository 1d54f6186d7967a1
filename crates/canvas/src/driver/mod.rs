//! Per-scene uniform drivers.
//!
//! A driver owns the time-varying state behind a scene's uniforms. The mount
//! calls it on mount, on every frame callback, and on every scroll report;
//! the boolean each hook returns tells the mount whether a redraw is due.

mod prism;
mod shade;

use std::time::Instant;

pub use prism::{PrismDriver, PrismPhase};
pub use shade::{ShadeDriver, ShadeSettings};

use crate::runtime::RenderPolicy;
use crate::uniforms::UniformSet;

pub trait UniformDriver {
    fn label(&self) -> &'static str;

    fn policy(&self) -> RenderPolicy;

    /// Upper bound on the device pixel ratio used for the backing store.
    fn dpr_cap(&self) -> f32;

    /// Height of the scroll region in viewport heights, for drivers that
    /// follow the scroll position.
    fn scroll_pages(&self) -> Option<f32> {
        None
    }

    fn on_mount(&mut self, now: Instant, uniforms: &mut UniformSet) -> bool;

    /// Updates uniforms for the frame about to be drawn. Returns `true` when
    /// another frame should follow.
    fn on_frame(&mut self, now: Instant, uniforms: &mut UniformSet) -> bool;

    fn on_scroll(&mut self, _progress: f32, _uniforms: &mut UniformSet) -> bool {
        false
    }
}
