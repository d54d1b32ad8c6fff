use super::{DrawCommand, Font, Surface, TextAlign};
use crate::geometry::{Color, Point, Rect};
use crate::transform::Transform2D;

/// A headless [`Surface`] that records every call.
///
/// Useful for tests and for hosts that replay the command list onto their own
/// backend. Clip bookkeeping is tracked separately so balance can be checked
/// without scanning the command list.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    clip_depth: usize,
    max_clip_depth: usize,
    clip_pushes: usize,
    clip_pops: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the clip counters untouched.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Forget everything recorded so far.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }

    pub fn max_clip_depth(&self) -> usize {
        self.max_clip_depth
    }

    pub fn clip_pushes(&self) -> usize {
        self.clip_pushes
    }

    pub fn clip_pops(&self) -> usize {
        self.clip_pops
    }

    /// Commands that draw pixels, in submission order.
    pub fn primitives(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| c.is_primitive())
    }

    /// The transform that was active for the `n`th primitive.
    pub fn transform_for_primitive(&self, n: usize) -> Option<Transform2D> {
        let mut current = Transform2D::IDENTITY;
        let mut seen = 0;
        for cmd in &self.commands {
            match cmd {
                DrawCommand::SetTransform(t) => current = *t,
                c if c.is_primitive() => {
                    if seen == n {
                        return Some(current);
                    }
                    seen += 1;
                }
                _ => {}
            }
        }
        None
    }

    /// The global alpha that was active for the `n`th primitive.
    pub fn alpha_for_primitive(&self, n: usize) -> Option<f32> {
        let mut current = 1.0;
        let mut seen = 0;
        for cmd in &self.commands {
            match cmd {
                DrawCommand::GlobalAlpha(a) => current = *a,
                c if c.is_primitive() => {
                    if seen == n {
                        return Some(current);
                    }
                    seen += 1;
                }
                _ => {}
            }
        }
        None
    }
}

impl Surface for RecordingSurface {
    fn set_transform(&mut self, transform: &Transform2D) {
        self.commands.push(DrawCommand::SetTransform(*transform));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn set_fill_style(&mut self, color: Color) {
        self.commands.push(DrawCommand::FillStyle(color));
    }

    fn set_stroke_style(&mut self, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeStyle { color, width });
    }

    fn draw_arc(
        &mut self,
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        filled: bool,
    ) {
        self.commands.push(DrawCommand::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            filled,
        });
    }

    fn draw_rect(&mut self, rect: Rect, filled: bool) {
        self.commands.push(DrawCommand::Rect { rect, filled });
    }

    fn draw_image(&mut self, bitmap: &str, src: Option<Rect>, dst: Rect) {
        self.commands.push(DrawCommand::Image {
            bitmap: bitmap.to_string(),
            src,
            dst,
        });
    }

    fn draw_text(&mut self, text: &str, position: Point, font: &Font, align: TextAlign) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            position,
            font: font.clone(),
            align,
        });
    }

    fn push_clip(&mut self, rect: Rect) {
        self.clip_pushes += 1;
        self.clip_depth += 1;
        self.max_clip_depth = self.max_clip_depth.max(self.clip_depth);
        self.commands.push(DrawCommand::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        self.clip_pops += 1;
        self.clip_depth = self.clip_depth.saturating_sub(1);
        self.commands.push(DrawCommand::PopClip);
    }

    fn clear(&mut self, color: Option<Color>) {
        self.commands.push(DrawCommand::Clear(color));
    }
}
