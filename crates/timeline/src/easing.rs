/// Shapes a normalized progress value in `[0, 1]`.
///
/// Every curve maps 0 to 0 and 1 to 1; inputs outside the unit range are
/// clamped before sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    Smoothstep,
    /// Quadratic ease-in/ease-out (`power1.inOut`).
    EaseInOut,
    /// `1 - (1 - t)^(n + 1)`; `PowerOut(2)` is the `power2.out` curve.
    PowerOut(u8),
    /// `t^(n + 1)`.
    PowerIn(u8),
    /// CSS-style cubic Bézier with fixed end points at (0,0) and (1,1).
    CubicBezier(f32, f32, f32, f32),
}

/// The CSS `ease-out` keyword.
pub const CSS_EASE_OUT: Easing = Easing::CubicBezier(0.0, 0.0, 0.58, 1.0);

impl Easing {
    pub fn sample(self, t: f32) -> f32 {
        let clamped = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => clamped,
            Easing::Smoothstep => clamped * clamped * (3.0 - 2.0 * clamped),
            Easing::EaseInOut => {
                if clamped < 0.5 {
                    2.0 * clamped * clamped
                } else {
                    -1.0 + (4.0 - 2.0 * clamped) * clamped
                }
            }
            Easing::PowerOut(power) => 1.0 - (1.0 - clamped).powi(i32::from(power) + 1),
            Easing::PowerIn(power) => clamped.powi(i32::from(power) + 1),
            Easing::CubicBezier(x1, y1, x2, y2) => {
                let s = solve_bezier_parameter(clamped, x1, x2);
                bezier_component(s, y1, y2)
            }
        }
    }
}

fn bezier_component(s: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_slope(s: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Finds the curve parameter whose x coordinate equals `x`.
fn solve_bezier_parameter(x: f32, x1: f32, x2: f32) -> f32 {
    let mut s = x;
    for _ in 0..8 {
        let error = bezier_component(s, x1, x2) - x;
        if error.abs() < 1e-6 {
            return s;
        }
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= error / slope;
    }

    // Newton stalled on a flat segment; bisect instead.
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    s = x;
    for _ in 0..32 {
        let value = bezier_component(s, x1, x2);
        if (value - x).abs() < 1e-6 {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = 0.5 * (lo + hi);
    }
    s
}
