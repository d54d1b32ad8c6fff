//! Drawable variants attached to nodes.
//!
//! A [`Shape`] only knows how to draw itself and how to test a point against
//! its own geometry. Transform composition, opacity, clipping and child
//! traversal all live in [`paint`](crate::paint) and
//! [`hit_test`](crate::hit_test) and are shared by every variant.

mod arc;
mod image;
mod label;
mod rect;

use std::any::Any;
use std::fmt;

pub use arc::ArcShape;
pub use image::ImageShape;
pub use label::LabelShape;
pub use rect::RectShape;

use crate::geometry::{Point, Rect, Size};
use crate::surface::Surface;

pub trait Shape: Any + fmt::Debug {
    /// Draw the shape into `bounds`, the node's local rectangle `(-cx, -cy, w, h)`.
    fn draw(&self, surface: &mut dyn Surface, bounds: Rect);

    /// Test a point already mapped into the node's rotated frame.
    ///
    /// `local` is still multiplied by the node's accumulated `scale`, so
    /// implementations scale their geometry by `scale` before comparing.
    fn hit_test(&self, local: Point, bounds: Rect, scale: (f32, f32)) -> bool {
        hit_rect(local, bounds, scale)
    }

    /// Size the node should take when created from this shape.
    fn natural_size(&self) -> Option<Size> {
        None
    }

    /// Advance shape-local animation state.
    fn update(&mut self, _dt: f32) {}

    /// Drop references to external drawing resources. Called once when the
    /// owning node is destroyed.
    fn release(&mut self) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Axis-aligned rectangle test in scaled local space.
pub fn hit_rect(local: Point, bounds: Rect, (sx, sy): (f32, f32)) -> bool {
    let (x0, x1) = ordered(bounds.x * sx, bounds.right() * sx);
    let (y0, y1) = ordered(bounds.y * sy, bounds.bottom() * sy);
    local.x >= x0 && local.x <= x1 && local.y >= y0 && local.y <= y1
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// A node with no visual of its own, used to group children.
#[derive(Debug, Default, Clone, Copy)]
pub struct Group;

impl Shape for Group {
    fn draw(&self, _surface: &mut dyn Surface, _bounds: Rect) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rect_scaled() {
        let bounds = Rect::new(-10.0, -5.0, 20.0, 10.0);
        assert!(hit_rect(Point::new(19.0, 0.0), bounds, (2.0, 1.0)));
        assert!(!hit_rect(Point::new(21.0, 0.0), bounds, (2.0, 1.0)));
        assert!(!hit_rect(Point::new(0.0, 6.0), bounds, (2.0, 1.0)));
    }

    #[test]
    fn test_hit_rect_negative_scale() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Mirrored on x: geometry now spans -10..0
        assert!(hit_rect(Point::new(-5.0, 5.0), bounds, (-1.0, 1.0)));
        assert!(!hit_rect(Point::new(5.0, 5.0), bounds, (-1.0, 1.0)));
    }

    #[test]
    fn test_zero_sized_group_never_hits() {
        let bounds = Rect::new(0.0, 0.0, 0.0, 0.0);
        assert!(!Group.hit_test(Point::new(1.0, 1.0), bounds, (1.0, 1.0)));
    }
}
