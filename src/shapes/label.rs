use std::any::Any;

use super::Shape;
use crate::geometry::{Color, Point, Rect};
use crate::surface::{Font, Surface, TextAlign};

/// A single line of text anchored to the top edge of the node bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelShape {
    pub text: String,
    pub font: Font,
    pub color: Color,
    pub align: TextAlign,
}

impl LabelShape {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: Font::default(),
            color: Color::WHITE,
            align: TextAlign::Left,
        }
    }

    pub fn font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

impl Shape for LabelShape {
    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        if self.text.is_empty() {
            return;
        }
        let x = match self.align {
            TextAlign::Left => bounds.x,
            TextAlign::Center => bounds.x + bounds.width * 0.5,
            TextAlign::Right => bounds.right(),
        };
        surface.set_fill_style(self.color);
        surface.draw_text(&self.text, Point::new(x, bounds.y), &self.font, self.align);
    }

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
    use crate::surface::{DrawCommand, RecordingSurface};

    #[test]
    fn test_center_aligned_anchor() {
        let label = LabelShape::new("score").align(TextAlign::Center);
        let mut surface = RecordingSurface::new();
        label.draw(&mut surface, Rect::new(-50.0, -10.0, 100.0, 20.0));
        assert!(matches!(
            &surface.commands()[1],
            DrawCommand::Text { position, .. } if *position == Point::new(0.0, -10.0)
        ));
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let mut surface = RecordingSurface::new();
        LabelShape::new("").draw(&mut surface, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(surface.commands().is_empty());
    }
}
