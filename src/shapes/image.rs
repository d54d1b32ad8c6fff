use std::any::Any;

use super::Shape;
use crate::geometry::{Rect, Size};
use crate::surface::Surface;

/// A bitmap, or one frame of a bitmap atlas, stretched over the node bounds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageShape {
    /// Name of the bitmap resource
    pub bitmap: Option<String>,
    /// Atlas frames; empty means the whole bitmap
    pub frames: Vec<Rect>,
    /// Current frame position, fractional while animating
    pub frame: f32,
    /// Frames advanced per second
    pub frame_speed: f32,
}

impl ImageShape {
    pub fn new(bitmap: impl Into<String>) -> Self {
        Self {
            bitmap: Some(bitmap.into()),
            ..Self::default()
        }
    }

    pub fn frames(mut self, frames: Vec<Rect>) -> Self {
        self.frames = frames;
        self.frame = 0.0;
        self
    }

    pub fn frame_speed(mut self, frames_per_second: f32) -> Self {
        self.frame_speed = frames_per_second;
        self
    }

    /// The atlas rectangle shown this frame.
    pub fn current_frame(&self) -> Option<Rect> {
        if self.frames.is_empty() {
            return None;
        }
        let index = (self.frame.max(0.0) as usize).min(self.frames.len() - 1);
        Some(self.frames[index])
    }
}

impl Shape for ImageShape {
    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        if let Some(bitmap) = &self.bitmap {
            surface.draw_image(bitmap, self.current_frame(), bounds);
        }
    }

    fn natural_size(&self) -> Option<Size> {
        self.frames.first().map(|f| Size::new(f.width, f.height))
    }

    fn update(&mut self, dt: f32) {
        if self.frame_speed == 0.0 || self.frames.len() < 2 {
            return;
        }
        let count = self.frames.len() as f32;
        self.frame = (self.frame + self.frame_speed * dt).rem_euclid(count);
    }

    fn release(&mut self) {
        self.bitmap = None;
        self.frames.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
