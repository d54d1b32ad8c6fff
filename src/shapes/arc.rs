use std::any::Any;
use std::f32::consts::TAU;

use super::Shape;
use crate::geometry::{Color, Point, Rect, Size};
use crate::surface::Surface;

/// A circle or circular sector.
///
/// The arc is inscribed in the node bounds, so with the default centered pivot
/// its center sits exactly on the node position.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcShape {
    pub radius: f32,
    /// Start of the sector in radians
    pub start_angle: f32,
    /// End of the sector in radians
    pub end_angle: f32,
    /// Fill the interior, otherwise stroke the outline
    pub filled: bool,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
}

impl ArcShape {
    /// A full filled white circle.
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            start_angle: 0.0,
            end_angle: TAU,
            filled: true,
            fill: Color::WHITE,
            stroke: Color::WHITE,
            stroke_width: 1.0,
        }
    }

    pub fn angles(mut self, start: f32, end: f32) -> Self {
        self.start_angle = start;
        self.end_angle = end;
        self
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.fill = color;
        self.filled = true;
        self
    }

    /// Switch to an outline drawn with `color` at `width`.
    pub fn stroke(mut self, color: Color, width: f32) -> Self {
        self.stroke = color;
        self.stroke_width = width;
        self.filled = false;
        self
    }

    fn center(&self, bounds: Rect) -> Point {
        Point::new(bounds.x + self.radius, bounds.y + self.radius)
    }
}

impl Shape for ArcShape {
    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        if self.filled {
            surface.set_fill_style(self.fill);
        } else {
            surface.set_stroke_style(self.stroke, self.stroke_width);
        }
        surface.draw_arc(
            self.center(bounds),
            self.radius,
            self.start_angle,
            self.end_angle,
            self.filled,
        );
    }

    /// Circle test against the radius scaled by the x scale only, so a
    /// non-uniformly scaled arc keeps a circular hit region.
    fn hit_test(&self, local: Point, bounds: Rect, (sx, sy): (f32, f32)) -> bool {
        let center = self.center(bounds);
        let dx = local.x - center.x * sx;
        let dy = local.y - center.y * sy;
        let r = self.radius * sx;
        dx * dx + dy * dy <= r * r
    }

    fn natural_size(&self) -> Option<Size> {
        let d = self.radius * 2.0;
        Some(Size::new(d, d))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
