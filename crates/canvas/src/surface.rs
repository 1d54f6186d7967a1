use winit::dpi::PhysicalSize;

/// Pixel dimensions of a drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Container size in CSS (logical) pixels plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub css_width: f32,
    pub css_height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(css_width: f32, css_height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            css_width,
            css_height,
            device_pixel_ratio,
        }
    }

    /// Converts a window's physical size back into CSS pixels.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        Self {
            css_width: (size.width as f64 / scale) as f32,
            css_height: (size.height as f64 / scale) as f32,
            device_pixel_ratio: scale as f32,
        }
    }
}

/// Backing store and displayed size computed for one viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    /// Pixel size of the render target the shader draws into.
    pub backing: SurfaceSize,
    /// Unscaled size the drawable occupies on screen, in CSS pixels.
    pub display: SurfaceSize,
    /// Ratio applied to produce `backing`, after capping.
    pub pixel_ratio: f32,
}

impl SurfaceMetrics {
    pub fn compute(viewport: Viewport, dpr_cap: f32) -> Self {
        let pixel_ratio = effective_pixel_ratio(viewport.device_pixel_ratio, dpr_cap);
        let css_width = sanitize(viewport.css_width);
        let css_height = sanitize(viewport.css_height);
        Self {
            backing: SurfaceSize::new(
                (css_width * pixel_ratio).floor() as u32,
                (css_height * pixel_ratio).floor() as u32,
            ),
            display: SurfaceSize::new(css_width.floor() as u32, css_height.floor() as u32),
            pixel_ratio,
        }
    }
}

/// `clamp(dpr, 1, cap)`; a cap below 1 behaves as 1.
pub fn effective_pixel_ratio(device_pixel_ratio: f32, dpr_cap: f32) -> f32 {
    let cap = if dpr_cap.is_finite() { dpr_cap.max(1.0) } else { 1.0 };
    if !device_pixel_ratio.is_finite() {
        return 1.0;
    }
    device_pixel_ratio.clamp(1.0, cap)
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
