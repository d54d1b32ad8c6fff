use crate::geometry::Point;

/// Values that can be interpolated between two endpoints.
pub trait Animatable: Copy + PartialEq + 'static {
    /// t = 0.0 returns `from`, t = 1.0 returns `to`; values outside
    /// `[0, 1]` extrapolate.
    fn lerp(from: Self, to: Self, t: f32) -> Self;
}

impl Animatable for f32 {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Animatable for Point {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        Point::new(f32::lerp(from.x, to.x, t), f32::lerp(from.y, to.y, t))
    }
}
