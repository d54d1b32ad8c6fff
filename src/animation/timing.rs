//! Easing curves for keyframe animation.
//!
//! - [`TimingFunction::Linear`] - Constant speed (no easing)
//! - [`TimingFunction::EaseIn`] - Starts slow, ends fast (acceleration)
//! - [`TimingFunction::EaseOut`] - Starts fast, ends slow (deceleration)
//! - [`TimingFunction::EaseInOut`] - Slow start and end, fast middle
//! - [`TimingFunction::CubicBezier`] - CSS-style cubic bezier curve
//! - [`TimingFunction::Hold`] - Keep the start value until the segment ends
//! - [`TimingFunction::Custom`] - User-defined function
//!
//! ```ignore
//! Animation::new(Target::Node(id), Property::X)
//!     .keyframe(0.0, 0.0)
//!     .keyframe_with(0.5, 120.0, TimingFunction::EaseOut)
//! ```

use std::sync::Arc;

/// Timing function that controls the animation curve
#[derive(Clone, Default)]
pub enum TimingFunction {
    /// Linear interpolation (constant speed)
    #[default]
    Linear,
    /// Starts slow, ends fast
    EaseIn,
    /// Starts fast, ends slow
    EaseOut,
    /// Starts slow, speeds up, then slows down
    EaseInOut,
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
    /// Step: 0 until the end of the segment
    Hold,
    /// Custom timing function
    Custom(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
}

impl TimingFunction {
    /// Evaluate the curve at progress `t`, clamped to `[0, 1]`.
    /// The result may leave `[0, 1]` for overshooting curves.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            TimingFunction::Linear => t,
            TimingFunction::EaseIn => ease_in(t),
            TimingFunction::EaseOut => ease_out(t),
            TimingFunction::EaseInOut => ease_in_out(t),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
            TimingFunction::Hold => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            TimingFunction::Custom(f) => f(t),
        }
    }

    /// Create a custom timing function from a closure
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f32) -> f32 + Send + Sync + 'static,
    {
        TimingFunction::Custom(Arc::new(f))
    }
}

impl std::fmt::Debug for TimingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingFunction::CubicBezier(x1, y1, x2, y2) => f
                .debug_tuple("CubicBezier")
                .field(x1)
                .field(y1)
                .field(x2)
                .field(y2)
                .finish(),
            TimingFunction::Custom(_) => f.write_str("Custom(..)"),
            TimingFunction::Linear => f.write_str("Linear"),
            TimingFunction::EaseIn => f.write_str("EaseIn"),
            TimingFunction::EaseOut => f.write_str("EaseOut"),
            TimingFunction::EaseInOut => f.write_str("EaseInOut"),
            TimingFunction::Hold => f.write_str("Hold"),
        }
    }
}

fn ease_in(t: f32) -> f32 {
    t * t
}

fn ease_out(t: f32) -> f32 {
    1.0 - ease_in(1.0 - t)
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        ease_in(t * 2.0) * 0.5
    } else {
        0.5 + ease_out(t * 2.0 - 1.0) * 0.5
    }
}

/// One coordinate of a bezier running from 0 through `p1`, `p2` to 1.
fn bezier(s: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * s * (inv * p1 + s * p2) + s * s * s
}

fn bezier_slope(s: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Find the curve parameter whose x equals `x`, then return its y.
///
/// Newton steps converge quickly on well-behaved curves; bisection takes
/// over when the slope flattens or a step leaves `[0, 1]`.
fn cubic_bezier(x: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    let mut s = x;
    for _ in 0..16 {
        let err = bezier(s, x1, x2) - x;
        if err.abs() < 1e-5 {
            break;
        }
        if err > 0.0 {
            hi = s;
        } else {
            lo = s;
        }
        let slope = bezier_slope(s, x1, x2);
        let next = if slope.abs() > 1e-6 { s - err / slope } else { -1.0 };
        s = if next > lo && next < hi { next } else { (lo + hi) * 0.5 };
    }
    bezier(s, y1, y2)
}
