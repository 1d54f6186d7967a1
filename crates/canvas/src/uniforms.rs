use bytemuck::{Pod, Zeroable};

/// Values pushed to the fragment stage before every draw.
///
/// The layout mirrors the std140 `CanvasUniforms` block injected by
/// [`crate::compile`]: a `vec3` followed by five floats, the first of which
/// packs into the `vec3`'s trailing slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UniformSet {
    /// `iResolution`: backing-store width, height, and pixel aspect (always 1).
    pub resolution: [f32; 3],
    /// `iTime`, seconds.
    pub time: f32,
    /// `iTimeDelta`, seconds.
    pub time_delta: f32,
    /// `uIntro`, entrance progress in `[0, 1]`.
    pub intro: f32,
    /// `uDayProgress`, scroll progress in `[0, 1]`.
    pub day_progress: f32,
    /// `uScrollOffset`, cloud drift in `[0, 1]`.
    pub scroll_offset: f32,
}

pub const UNIFORM_BLOCK_SIZE: usize = std::mem::size_of::<UniformSet>();

impl Default for UniformSet {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl UniformSet {
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = [width as f32, height as f32, 1.0];
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
