use std::any::Any;

use super::Shape;
use crate::geometry::{Color, Rect};
use crate::surface::Surface;

/// An axis-aligned box filling the node bounds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RectShape {
    pub fill: Option<Color>,
    /// Outline color and width
    pub stroke: Option<(Color, f32)>,
}

impl RectShape {
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
        }
    }

    pub fn outlined(color: Color, width: f32) -> Self {
        Self {
            fill: None,
            stroke: Some((color, width)),
        }
    }

    pub fn with_stroke(mut self, color: Color, width: f32) -> Self {
        self.stroke = Some((color, width));
        self
    }
}

impl Shape for RectShape {
    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        if let Some(fill) = self.fill {
            surface.set_fill_style(fill);
            surface.draw_rect(bounds, true);
        }
        if let Some((color, width)) = self.stroke {
            surface.set_stroke_style(color, width);
            surface.draw_rect(bounds, false);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
