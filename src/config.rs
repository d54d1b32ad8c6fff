#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::canvas::ScalingMethod;
use crate::geometry::{Color, Size};

/// Appearance of the screen shown while preloaded resources are pending.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoadingScreenStyle {
    /// Fill behind everything
    pub background: Color,
    /// Bitmap drawn over the background, stretched to the canvas
    pub background_bitmap: Option<String>,
    /// Track of the progress bar
    pub bar_background: Color,
    /// Filled part of the progress bar
    pub bar_fill: Color,
    pub bar_width: f32,
    pub bar_height: f32,
}

impl Default for LoadingScreenStyle {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            background_bitmap: None,
            bar_background: Color::rgb(0.25, 0.25, 0.25),
            bar_fill: Color::WHITE,
            bar_width: 300.0,
            bar_height: 12.0,
        }
    }
}

impl LoadingScreenStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn background_bitmap(mut self, name: impl Into<String>) -> Self {
        self.background_bitmap = Some(name.into());
        self
    }

    pub fn bar_colors(mut self, background: Color, fill: Color) -> Self {
        self.bar_background = background;
        self.bar_fill = fill;
        self
    }

    pub fn bar_size(mut self, width: f32, height: f32) -> Self {
        self.bar_width = width;
        self.bar_height = height;
        self
    }
}

/// Configuration for an [`App`](crate::App).
///
/// ```ignore
/// AppConfig::new()
///     .canvas_size(1024.0, 768.0)
///     .display_size(1920.0, 1080.0)
///     .scaling(ScalingMethod::FitBest)
///     .target_fps(30)
///     .clear_color(Color::BLACK)
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AppConfig {
    /// Virtual design canvas the scenes are authored against.
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Size of the device display in pixels.
    pub display_width: f32,
    pub display_height: f32,
    /// Logic updates per second. 0 runs one update per refresh with the
    /// measured frame delta.
    pub target_fps: u32,
    /// Draw callbacks per second.
    pub refresh_rate: u32,
    pub scaling: ScalingMethod,
    /// Clear the surface before drawing each frame.
    pub clear_canvas: bool,
    /// Clear colour, transparent when `None`.
    pub clear_color: Option<Color>,
    /// Hold scenes back until every preload resource reports in.
    pub wait_for_resources: bool,
    /// Log lookup misses and frame statistics.
    pub debug: bool,
    pub loading_screen: LoadingScreenStyle,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            display_width: 800.0,
            display_height: 600.0,
            target_fps: 60,
            refresh_rate: 60,
            scaling: ScalingMethod::FitBest,
            clear_canvas: true,
            clear_color: None,
            wait_for_resources: true,
            debug: false,
            loading_screen: LoadingScreenStyle::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canvas_size(mut self, width: f32, height: f32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    pub fn display_size(mut self, width: f32, height: f32) -> Self {
        self.display_width = width;
        self.display_height = height;
        self
    }

    /// Set the logic rate. Pass 0 for variable-rate updates.
    pub fn target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    pub fn refresh_rate(mut self, hz: u32) -> Self {
        self.refresh_rate = hz;
        self
    }

    pub fn scaling(mut self, method: ScalingMethod) -> Self {
        self.scaling = method;
        self
    }

    pub fn clear_canvas(mut self, clear: bool) -> Self {
        self.clear_canvas = clear;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = Some(color);
        self
    }

    pub fn wait_for_resources(mut self, wait: bool) -> Self {
        self.wait_for_resources = wait;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn loading_screen(mut self, style: LoadingScreenStyle) -> Self {
        self.loading_screen = style;
        self
    }

    pub fn canvas(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }

    pub fn display(&self) -> Size {
        Size::new(self.display_width, self.display_height)
    }

    pub fn is_variable_rate(&self) -> bool {
        self.target_fps == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.canvas(), Size::new(800.0, 600.0));
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.scaling, ScalingMethod::FitBest);
        assert!(config.clear_canvas);
        assert!(config.wait_for_resources);
        assert!(!config.is_variable_rate());
    }

    #[test]
    fn test_builder() {
        let config = AppConfig::new()
            .canvas_size(320.0, 240.0)
            .display_size(640.0, 480.0)
            .target_fps(0)
            .clear_color(Color::BLACK)
            .loading_screen(LoadingScreenStyle::new().bar_size(100.0, 4.0));
        assert_eq!(config.display(), Size::new(640.0, 480.0));
        assert!(config.is_variable_rate());
        assert_eq!(config.clear_color, Some(Color::BLACK));
        assert_eq!(config.loading_screen.bar_width, 100.0);
    }
}
