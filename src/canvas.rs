//! Mapping between the virtual design canvas and the device display.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// How the virtual canvas is fitted onto the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScalingMethod {
    /// Draw the canvas 1:1, centered on the canvas size.
    None,
    /// Scale so the canvas width fills the display width.
    FitX,
    /// Scale so the canvas height fills the display height.
    FitY,
    /// Scale by the smaller of the two fits so the whole canvas is visible.
    #[default]
    FitBest,
    /// Resize the canvas to the display and draw 1:1.
    FitSize,
}

/// Derived canvas-to-display mapping.
///
/// World origin `(0, 0)` sits at `(canvas_cx, canvas_cy)` in display space and
/// one world unit spans `scale` display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMetrics {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub display_width: f32,
    pub display_height: f32,
    pub scale: f32,
    pub canvas_cx: f32,
    pub canvas_cy: f32,
}

impl CanvasMetrics {
    /// Compute the mapping for `method`.
    pub fn compute(
        method: ScalingMethod,
        canvas_width: f32,
        canvas_height: f32,
        display_width: f32,
        display_height: f32,
    ) -> Self {
        let mut metrics = Self {
            canvas_width,
            canvas_height,
            display_width,
            display_height,
            scale: 1.0,
            canvas_cx: display_width * 0.5,
            canvas_cy: display_height * 0.5,
        };

        let fit_x = ratio(display_width, canvas_width);
        let fit_y = ratio(display_height, canvas_height);
        match method {
            ScalingMethod::None => {
                metrics.canvas_cx = canvas_width * 0.5;
                metrics.canvas_cy = canvas_height * 0.5;
            }
            ScalingMethod::FitX => metrics.scale = fit_x,
            ScalingMethod::FitY => metrics.scale = fit_y,
            ScalingMethod::FitBest => metrics.scale = fit_x.min(fit_y),
            ScalingMethod::FitSize => {
                metrics.canvas_width = display_width;
                metrics.canvas_height = display_height;
            }
        }
        metrics
    }

    /// Convert a display-space point into world (virtual canvas) space.
    pub fn display_to_world(&self, x: f32, y: f32) -> Point {
        Point::new(
            (x - self.canvas_cx) / self.scale,
            (y - self.canvas_cy) / self.scale,
        )
    }

    /// Convert a world-space point into display space.
    pub fn world_to_display(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.canvas_cx,
            p.y * self.scale + self.canvas_cy,
        )
    }
}

fn ratio(display: f32, canvas: f32) -> f32 {
    if canvas > 0.0 {
        display / canvas
    } else {
        1.0
    }
}
