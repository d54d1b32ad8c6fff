//! The drawing-surface contract the scene graph renders through.
//!
//! A [`Surface`] is a 2D immediate-mode context with a single active affine
//! transform, fill/stroke styles, a global alpha and a clip stack. The scene
//! graph installs a fully composed screen-space transform before every node,
//! so implementations never need to track parent transforms themselves.
//!
//! Clip state must always be balanced. Code inside this crate only pushes a
//! clip through [`ClipScope`], which pops it again when dropped.

mod commands;
mod recording;

use std::ops::{Deref, DerefMut};

pub use commands::DrawCommand;
pub use recording::RecordingSurface;

use crate::geometry::{Color, Point, Rect};
use crate::transform::Transform2D;

/// Horizontal alignment of text relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Font used to render label text.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    /// Font size in canvas units
    pub size: f32,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("sans-serif", 16.0)
    }
}

/// Primitive drawing operations required by the scene graph.
///
/// All geometry is in the coordinate space established by the last
/// [`set_transform`](Surface::set_transform) call.
pub trait Surface {
    /// Replace the active transform.
    fn set_transform(&mut self, transform: &Transform2D);

    /// Alpha multiplied into every subsequent primitive.
    fn set_global_alpha(&mut self, alpha: f32);

    fn set_fill_style(&mut self, color: Color);

    fn set_stroke_style(&mut self, color: Color, width: f32);

    /// Circular sector from `start_angle` to `end_angle` (radians).
    /// Filled interior when `filled`, otherwise the stroked outline.
    fn draw_arc(
        &mut self,
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        filled: bool,
    );

    fn draw_rect(&mut self, rect: Rect, filled: bool);

    /// Draw the region `src` of a named bitmap (or the whole bitmap when
    /// `None`) into `dst`.
    fn draw_image(&mut self, bitmap: &str, src: Option<Rect>, dst: Rect);

    fn draw_text(&mut self, text: &str, position: Point, font: &Font, align: TextAlign);

    /// Save the drawing state and intersect the clip region with `rect`.
    fn push_clip(&mut self, rect: Rect);

    /// Restore the state saved by the matching [`push_clip`](Surface::push_clip).
    fn pop_clip(&mut self);

    /// Clear the whole surface, filling with `color` when given.
    fn clear(&mut self, color: Option<Color>);
}

/// A pushed clip region that is popped exactly once when the scope ends.
///
/// Dereferences to the underlying surface so drawing continues through the
/// guard while the clip is active.
pub struct ClipScope<'a> {
    surface: &'a mut dyn Surface,
}

impl<'a> ClipScope<'a> {
    pub fn push(surface: &'a mut dyn Surface, rect: Rect) -> Self {
        surface.push_clip(rect);
        Self { surface }
    }
}

impl<'a> Deref for ClipScope<'a> {
    type Target = dyn Surface + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.surface
    }
}

impl<'a> DerefMut for ClipScope<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.surface
    }
}

impl Drop for ClipScope<'_> {
    fn drop(&mut self) {
        self.surface.pop_clip();
    }
}
