use std::sync::Arc;

use winit::window::Window;

/// Something that can ask the platform for one future frame callback.
pub trait FrameRequester {
    fn request_frame(&self);
}

impl FrameRequester for Arc<Window> {
    fn request_frame(&self) {
        self.request_redraw();
    }
}

/// Coalesces redraw triggers into at most one outstanding frame request.
///
/// Once cancelled the scheduler is dead: later requests are ignored and a
/// frame callback that still fires finds nothing pending.
pub struct RedrawScheduler {
    requester: Box<dyn FrameRequester>,
    pending: bool,
    alive: bool,
}

impl RedrawScheduler {
    pub fn new(requester: Box<dyn FrameRequester>) -> Self {
        Self {
            requester,
            pending: false,
            alive: true,
        }
    }

    /// Marks a redraw as due. Returns `true` when this call issued a new
    /// platform request.
    pub fn request(&mut self) -> bool {
        if !self.alive || self.pending {
            return false;
        }
        self.pending = true;
        self.requester.request_frame();
        true
    }

    /// Consumes the pending request at the start of a frame callback.
    pub fn take(&mut self) -> bool {
        let due = self.alive && self.pending;
        self.pending = false;
        due
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn cancel(&mut self) {
        self.pending = false;
        self.alive = false;
    }
}
