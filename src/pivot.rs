use crate::geometry::Size;

/// Horizontal anchor of a node's pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HorizontalAnchor {
    /// Left edge (0.0)
    Left,
    /// Center (0.5)
    Center,
    /// Right edge (1.0)
    Right,
    /// Fraction of the node width, 0.0 = left edge, 1.0 = right edge
    Fraction(f32),
    /// Absolute offset from the left edge, independent of size
    Px(f32),
}

/// Vertical anchor of a node's pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalAnchor {
    /// Top edge (0.0)
    Top,
    /// Center (0.5)
    Center,
    /// Bottom edge (1.0)
    Bottom,
    /// Fraction of the node height, 0.0 = top edge, 1.0 = bottom edge
    Fraction(f32),
    /// Absolute offset from the top edge, independent of size
    Px(f32),
}

/// The point of a node that sits at its position and around which it rotates
/// and scales.
///
/// A node's own geometry occupies the local rectangle `(-cx, -cy, w, h)` where
/// `(cx, cy)` is the resolved pivot offset. Fractional anchors are scaled by
/// the node size, `Px` anchors are taken as-is ("absolute origin").
///
/// ```ignore
/// // Rotate around the top-left corner
/// Node::new(RectShape::filled(Color::WHITE))
///     .size(64.0, 32.0)
///     .pivot(Pivot::TOP_LEFT)
///     .rotation(0.5)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    pub horizontal: HorizontalAnchor,
    pub vertical: VerticalAnchor,
}

impl Pivot {
    /// Center of the node - the default
    pub const CENTER: Self = Self {
        horizontal: HorizontalAnchor::Center,
        vertical: VerticalAnchor::Center,
    };

    pub const TOP_LEFT: Self = Self {
        horizontal: HorizontalAnchor::Left,
        vertical: VerticalAnchor::Top,
    };

    pub const TOP_RIGHT: Self = Self {
        horizontal: HorizontalAnchor::Right,
        vertical: VerticalAnchor::Top,
    };

    pub const BOTTOM_LEFT: Self = Self {
        horizontal: HorizontalAnchor::Left,
        vertical: VerticalAnchor::Bottom,
    };

    pub const BOTTOM_RIGHT: Self = Self {
        horizontal: HorizontalAnchor::Right,
        vertical: VerticalAnchor::Bottom,
    };

    pub fn new(horizontal: HorizontalAnchor, vertical: VerticalAnchor) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Pivot normalized to the node size (0.0..=1.0 on each axis).
    pub fn normalized(x: f32, y: f32) -> Self {
        Self {
            horizontal: HorizontalAnchor::Fraction(x),
            vertical: VerticalAnchor::Fraction(y),
        }
    }

    /// Pivot at an absolute offset from the node's top-left corner.
    pub fn absolute(x: f32, y: f32) -> Self {
        Self {
            horizontal: HorizontalAnchor::Px(x),
            vertical: VerticalAnchor::Px(y),
        }
    }

    /// Resolve to the local pivot offset `(cx, cy)`.
    ///
    /// The result is rounded to whole units so node edges land on pixel
    /// boundaries.
    pub fn resolve(&self, size: Size) -> (f32, f32) {
        let x = match self.horizontal {
            HorizontalAnchor::Left => 0.0,
            HorizontalAnchor::Center => size.width * 0.5,
            HorizontalAnchor::Right => size.width,
            HorizontalAnchor::Fraction(f) => size.width * f,
            HorizontalAnchor::Px(px) => px,
        };

        let y = match self.vertical {
            VerticalAnchor::Top => 0.0,
            VerticalAnchor::Center => size.height * 0.5,
            VerticalAnchor::Bottom => size.height,
            VerticalAnchor::Fraction(f) => size.height * f,
            VerticalAnchor::Px(px) => px,
        };

        (x.round(), y.round())
    }

    /// True when both anchors ignore the node size.
    pub fn is_absolute(&self) -> bool {
        matches!(self.horizontal, HorizontalAnchor::Px(_))
            && matches!(self.vertical, VerticalAnchor::Px(_))
    }
}

impl Default for Pivot {
    fn default() -> Self {
        Self::CENTER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        let size = Size::new(200.0, 100.0);
        assert_eq!(Pivot::CENTER.resolve(size), (100.0, 50.0));
        assert_eq!(Pivot::TOP_LEFT.resolve(size), (0.0, 0.0));
        assert_eq!(Pivot::TOP_RIGHT.resolve(size), (200.0, 0.0));
        assert_eq!(Pivot::BOTTOM_LEFT.resolve(size), (0.0, 100.0));
        assert_eq!(Pivot::BOTTOM_RIGHT.resolve(size), (200.0, 100.0));
    }

    #[test]
    fn test_normalized_scales_with_size() {
        let pivot = Pivot::normalized(0.25, 0.75);
        assert_eq!(pivot.resolve(Size::new(100.0, 200.0)), (25.0, 150.0));
        assert_eq!(pivot.resolve(Size::new(40.0, 40.0)), (10.0, 30.0));
    }

    #[test]
    fn test_absolute_ignores_size() {
        let pivot = Pivot::absolute(10.0, 20.0);
        assert!(pivot.is_absolute());
        assert_eq!(pivot.resolve(Size::new(500.0, 500.0)), (10.0, 20.0));
        assert_eq!(pivot.resolve(Size::zero()), (10.0, 20.0));
    }

    #[test]
    fn test_resolve_snaps_to_whole_units() {
        // 33 * 0.5 = 16.5 rounds away from zero
        assert_eq!(Pivot::CENTER.resolve(Size::new(33.0, 21.0)), (17.0, 11.0));
        assert_eq!(Pivot::absolute(2.4, -1.6).resolve(Size::zero()), (2.0, -2.0));
    }

    #[test]
    fn test_default() {
        assert_eq!(Pivot::default(), Pivot::CENTER);
        assert!(!Pivot::default().is_absolute());
    }
}
