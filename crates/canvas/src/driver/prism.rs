use std::time::Instant;

use super::UniformDriver;
use crate::runtime::RenderPolicy;
use crate::uniforms::UniformSet;

pub const PRISM_DPR_CAP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrismPhase {
    Idle,
    Running,
}

/// Free-running clock: `iTime` is the wall time since mount.
#[derive(Debug, Clone)]
pub struct PrismDriver {
    phase: PrismPhase,
    mounted_at: Option<Instant>,
    dpr_cap: f32,
}

impl PrismDriver {
    pub fn new(dpr_cap: f32) -> Self {
        Self {
            phase: PrismPhase::Idle,
            mounted_at: None,
            dpr_cap,
        }
    }

    pub fn phase(&self) -> PrismPhase {
        self.phase
    }
}

impl Default for PrismDriver {
    fn default() -> Self {
        Self::new(PRISM_DPR_CAP)
    }
}

impl UniformDriver for PrismDriver {
    fn label(&self) -> &'static str {
        "prism"
    }

    fn policy(&self) -> RenderPolicy {
        RenderPolicy::Continuous
    }

    fn dpr_cap(&self) -> f32 {
        self.dpr_cap
    }

    fn on_mount(&mut self, now: Instant, uniforms: &mut UniformSet) -> bool {
        self.mounted_at = Some(now);
        uniforms.time = 0.0;
        true
    }

    fn on_frame(&mut self, now: Instant, uniforms: &mut UniformSet) -> bool {
        let mounted_at = *self.mounted_at.get_or_insert(now);
        self.phase = PrismPhase::Running;
        uniforms.time = now.saturating_duration_since(mounted_at).as_secs_f32();
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn runs_forever_from_first_frame() {
        let start = Instant::now();
        let mut driver = PrismDriver::default();
        let mut uniforms = UniformSet::default();
        assert!(driver.on_mount(start, &mut uniforms));
        assert_eq!(driver.phase(), PrismPhase::Idle);

        assert!(driver.on_frame(start + Duration::from_millis(1500), &mut uniforms));
        assert_eq!(driver.phase(), PrismPhase::Running);
        assert!((uniforms.time - 1.5).abs() < 1e-6);

        assert!(driver.on_frame(start + Duration::from_secs(90), &mut uniforms));
        assert!((uniforms.time - 90.0).abs() < 1e-4);
        assert!(!driver.on_scroll(0.5, &mut uniforms));
    }
}
