//! Draw command definitions recorded by [`RecordingSurface`](super::RecordingSurface).

use super::{Font, TextAlign};
use crate::geometry::{Color, Point, Rect};
use crate::transform::Transform2D;

/// A single surface call, captured with its arguments.
///
/// Geometry is in the coordinate space of the transform installed by the
/// most recent [`DrawCommand::SetTransform`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetTransform(Transform2D),
    GlobalAlpha(f32),
    FillStyle(Color),
    StrokeStyle {
        color: Color,
        width: f32,
    },
    /// Circular sector.
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        filled: bool,
    },
    Rect {
        rect: Rect,
        filled: bool,
    },
    Image {
        bitmap: String,
        src: Option<Rect>,
        dst: Rect,
    },
    Text {
        text: String,
        position: Point,
        font: Font,
        align: TextAlign,
    },
    PushClip(Rect),
    PopClip,
    Clear(Option<Color>),
}

impl DrawCommand {
    /// True for commands that put pixels on the surface.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            DrawCommand::Arc { .. }
                | DrawCommand::Rect { .. }
                | DrawCommand::Image { .. }
                | DrawCommand::Text { .. }
        )
    }
}
