//! Scene graph nodes ("actors").
//!
//! A [`Node`] owns its local transform parameters, its display flags and a
//! boxed [`Shape`]. Parent/child links live in the owning [`Tree`](crate::tree::Tree)
//! so a node never holds a reference to its parent or scene.

use bitflags::bitflags;

use crate::animation::Property;
use crate::geometry::{Point, Rect, Size};
use crate::pivot::Pivot;
use crate::shapes::{Group, Shape};
use crate::transform::Transform2D;

bitflags! {
    /// Display and interaction switches for a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u16 {
        /// Node and its subtree are drawn
        const VISIBLE = 1 << 0;
        /// Node and its subtree take part in hit testing
        const TOUCHABLE = 1 << 1;
        /// Clip the node's own shape to its bounds
        const SELF_CLIP = 1 << 2;
        /// Clip the node's children to its bounds
        const CLIP_CHILDREN = 1 << 3;
        /// Never offset by the scene camera
        const IGNORE_CAMERA = 1 << 4;
        /// Multiply opacity with the parent's instead of the scene's
        const INHERIT_OPACITY = 1 << 5;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        NodeFlags::VISIBLE | NodeFlags::TOUCHABLE | NodeFlags::INHERIT_OPACITY
    }
}

/// Accumulated state a parent hands down to its children during traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentFrame {
    pub transform: Transform2D,
    pub opacity: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl ParentFrame {
    pub fn of(node: &Node) -> Self {
        Self {
            transform: node.transform,
            opacity: node.accum_opacity,
            scale_x: node.accum_scale_x,
            scale_y: node.accum_scale_y,
        }
    }
}

/// Scene-level offsets used to map a query point into node space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitFrame {
    /// Scene position
    pub scene: Point,
    /// Scene camera position
    pub camera: Point,
}

#[derive(Debug)]
pub struct Node {
    name: String,
    x: f32,
    y: f32,
    rotation: f32,
    scale_x: f32,
    scale_y: f32,
    pivot: Pivot,
    size: Size,
    opacity: f32,
    depth: u32,
    layer: i32,
    flags: NodeFlags,

    pub vx: f32,
    pub vy: f32,
    pub vr: f32,
    pub vx_damping: f32,
    pub vy_damping: f32,
    pub vr_damping: f32,

    // Derived during traversal
    transform: Transform2D,
    transform_dirty: bool,
    accum_opacity: f32,
    accum_scale_x: f32,
    accum_scale_y: f32,
    layer_changed: bool,

    shape: Box<dyn Shape>,
}

impl Node {
    /// Create a detached node drawing `shape`, sized to the shape's natural size.
    pub fn new(shape: impl Shape) -> Self {
        Self::from_boxed(Box::new(shape))
    }

    pub fn from_boxed(shape: Box<dyn Shape>) -> Self {
        let size = shape.natural_size().unwrap_or_default();
        Self {
            name: String::new(),
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            pivot: Pivot::CENTER,
            size,
            opacity: 1.0,
            depth: 0,
            layer: 0,
            flags: NodeFlags::default(),
            vx: 0.0,
            vy: 0.0,
            vr: 0.0,
            vx_damping: 1.0,
            vy_damping: 1.0,
            vr_damping: 1.0,
            transform: Transform2D::IDENTITY,
            transform_dirty: true,
            accum_opacity: 1.0,
            accum_scale_x: 1.0,
            accum_scale_y: 1.0,
            layer_changed: false,
            shape,
        }
    }

    /// A node without a visual, for grouping children.
    pub fn group() -> Self {
        Self::new(Group)
    }

    // Builder methods

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.set_position(x, y);
        self
    }

    pub fn rotation(mut self, radians: f32) -> Self {
        self.set_rotation(radians);
        self
    }

    pub fn scale(mut self, sx: f32, sy: f32) -> Self {
        self.set_scale(sx, sy);
        self
    }

    pub fn pivot(mut self, pivot: Pivot) -> Self {
        self.pivot = pivot;
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.size = Size::new(width, height);
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.set_opacity(opacity);
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn visible(self, on: bool) -> Self {
        self.with_flag(NodeFlags::VISIBLE, on)
    }

    pub fn touchable(self, on: bool) -> Self {
        self.with_flag(NodeFlags::TOUCHABLE, on)
    }

    pub fn self_clip(self, on: bool) -> Self {
        self.with_flag(NodeFlags::SELF_CLIP, on)
    }

    pub fn clip_children(self, on: bool) -> Self {
        self.with_flag(NodeFlags::CLIP_CHILDREN, on)
    }

    pub fn ignore_camera(self, on: bool) -> Self {
        self.with_flag(NodeFlags::IGNORE_CAMERA, on)
    }

    pub fn inherit_opacity(self, on: bool) -> Self {
        self.with_flag(NodeFlags::INHERIT_OPACITY, on)
    }

    pub fn velocity(mut self, vx: f32, vy: f32, vr: f32) -> Self {
        self.vx = vx;
        self.vy = vy;
        self.vr = vr;
        self
    }

    /// Per-update multipliers applied to the velocities.
    pub fn damping(mut self, x: f32, y: f32, r: f32) -> Self {
        self.vx_damping = x;
        self.vy_damping = y;
        self.vr_damping = r;
        self
    }

    fn with_flag(mut self, flag: NodeFlags, on: bool) -> Self {
        self.flags.set(flag, on);
        self
    }

    // Setters

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        if self.x != x || self.y != y {
            self.x = x;
            self.y = y;
            self.transform_dirty = true;
        }
    }

    pub fn set_rotation(&mut self, radians: f32) {
        if self.rotation != radians {
            self.rotation = radians;
            self.transform_dirty = true;
        }
    }

    pub fn set_scale(&mut self, sx: f32, sy: f32) {
        if self.scale_x != sx || self.scale_y != sy {
            self.scale_x = sx;
            self.scale_y = sy;
            self.transform_dirty = true;
        }
    }

    pub fn set_pivot(&mut self, pivot: Pivot) {
        self.pivot = pivot;
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = Size::new(width, height);
    }

    /// Resize the node to its shape's natural size, if the shape has one.
    pub fn fit_to_shape(&mut self) {
        if let Some(size) = self.shape.natural_size() {
            self.size = size;
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.depth = depth;
    }

    /// Change the z-order among siblings. The sibling list is re-sorted at the
    /// end of the next scene update.
    pub fn set_layer(&mut self, layer: i32) {
        if self.layer != layer {
            self.layer = layer;
            self.layer_changed = true;
        }
    }

    pub fn set_flag(&mut self, flag: NodeFlags, on: bool) {
        self.flags.set(flag, on);
    }

    pub fn set_visible(&mut self, on: bool) {
        self.set_flag(NodeFlags::VISIBLE, on);
    }

    pub fn set_touchable(&mut self, on: bool) {
        self.set_flag(NodeFlags::TOUCHABLE, on);
    }

    pub fn set_velocity(&mut self, vx: f32, vy: f32, vr: f32) {
        self.vx = vx;
        self.vy = vy;
        self.vr = vr;
    }

    /// Force the transform to be rebuilt on the next traversal.
    pub fn mark_dirty(&mut self) {
        self.transform_dirty = true;
    }

    // Getters

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn get_rotation(&self) -> f32 {
        self.rotation
    }

    pub fn get_scale(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }

    pub fn get_pivot(&self) -> Pivot {
        self.pivot
    }

    pub fn get_size(&self) -> Size {
        self.size
    }

    pub fn get_opacity(&self) -> f32 {
        self.opacity
    }

    pub fn get_depth(&self) -> u32 {
        self.depth
    }

    pub fn get_layer(&self) -> i32 {
        self.layer
    }

    pub fn get_flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    pub fn is_touchable(&self) -> bool {
        self.flags.contains(NodeFlags::TOUCHABLE)
    }

    /// Opacity after composition with the parent or scene, as of the last draw.
    pub fn accum_opacity(&self) -> f32 {
        self.accum_opacity
    }

    /// Scale after composition with all ancestors.
    pub fn accum_scale(&self) -> (f32, f32) {
        (self.accum_scale_x, self.accum_scale_y)
    }

    /// World transform (without scene offset, camera or display scale).
    pub fn transform(&self) -> &Transform2D {
        &self.transform
    }

    pub fn is_transform_dirty(&self) -> bool {
        self.transform_dirty
    }

    /// Node position in scene space, as of the last transform update.
    pub fn world_position(&self) -> Point {
        self.transform.translation()
    }

    /// The pixel-snapped pivot offset `(cx, cy)`.
    pub fn pivot_offset(&self) -> (f32, f32) {
        self.pivot.resolve(self.size)
    }

    /// The node's own rectangle in local space, `(-cx, -cy, w, h)`.
    pub fn bounds(&self) -> Rect {
        let (cx, cy) = self.pivot_offset();
        Rect::new(-cx, -cy, self.size.width, self.size.height)
    }

    /// Only the near layers (depth 0 and 1) scroll with the camera.
    pub fn camera_applies(&self) -> bool {
        self.depth <= 1 && !self.flags.contains(NodeFlags::IGNORE_CAMERA)
    }

    pub fn shape(&self) -> &dyn Shape {
        &*self.shape
    }

    pub fn shape_mut(&mut self) -> &mut dyn Shape {
        &mut *self.shape
    }

    /// Downcast the shape to a concrete type.
    pub fn shape_as<T: Shape>(&self) -> Option<&T> {
        self.shape.as_any().downcast_ref::<T>()
    }

    pub fn shape_as_mut<T: Shape>(&mut self) -> Option<&mut T> {
        self.shape.as_any_mut().downcast_mut::<T>()
    }

    /// Read an animatable property.
    pub fn property(&self, property: Property) -> Option<f32> {
        match property {
            Property::X => Some(self.x),
            Property::Y => Some(self.y),
            Property::Rotation => Some(self.rotation),
            Property::ScaleX => Some(self.scale_x),
            Property::ScaleY => Some(self.scale_y),
            Property::Opacity => Some(self.opacity),
            Property::Width => Some(self.size.width),
            Property::Height => Some(self.size.height),
            Property::CameraX | Property::CameraY => None,
        }
    }

    /// Write an animatable property. Returns `false` when nodes don't have it.
    pub fn set_property(&mut self, property: Property, value: f32) -> bool {
        match property {
            Property::X => self.set_position(value, self.y),
            Property::Y => self.set_position(self.x, value),
            Property::Rotation => self.set_rotation(value),
            Property::ScaleX => self.set_scale(value, self.scale_y),
            Property::ScaleY => self.set_scale(self.scale_x, value),
            Property::Opacity => self.set_opacity(value),
            Property::Width => self.size.width = value,
            Property::Height => self.size.height = value,
            Property::CameraX | Property::CameraY => return false,
        }
        true
    }

    /// Recompute the world transform and accumulated scale when this node or
    /// its parent changed. Returns `true` when the transform was rebuilt, in
    /// which case the caller must dirty the children.
    pub fn update_transform(&mut self, parent: Option<&ParentFrame>) -> bool {
        if !self.transform_dirty {
            return false;
        }
        let local =
            Transform2D::from_components(self.x, self.y, self.rotation, self.scale_x, self.scale_y);
        match parent {
            Some(parent) => {
                self.transform = parent.transform.then(&local);
                self.accum_scale_x = parent.scale_x * self.scale_x;
                self.accum_scale_y = parent.scale_y * self.scale_y;
            }
            None => {
                self.transform = local;
                self.accum_scale_x = self.scale_x;
                self.accum_scale_y = self.scale_y;
            }
        }
        self.transform_dirty = false;
        true
    }

    /// Compose opacity with the parent when parented and inheriting, otherwise
    /// with the scene.
    pub fn update_opacity(&mut self, parent: Option<&ParentFrame>, scene_opacity: f32) {
        self.accum_opacity = match parent {
            Some(parent) if self.flags.contains(NodeFlags::INHERIT_OPACITY) => {
                parent.opacity * self.opacity
            }
            _ => scene_opacity * self.opacity,
        };
    }

    /// Test a scene-space point against this node's own geometry, using the
    /// transform from the last traversal.
    pub fn hit_test(&self, point: Point, frame: &HitFrame) -> bool {
        let (sx, sy) = (self.accum_scale_x, self.accum_scale_y);
        if sx == 0.0 || sy == 0.0 {
            return false;
        }
        let camera = if self.camera_applies() {
            frame.camera
        } else {
            Point::ZERO
        };
        let t = &self.transform;
        let dx = point.x - (t.tx + frame.scene.x - camera.x);
        let dy = point.y - (t.ty + frame.scene.y - camera.y);
        // Undo rotation using the linear part; each axis is left scaled once.
        let local = Point::new((t.a * dx + t.b * dy) / sx, (t.c * dx + t.d * dy) / sy);
        self.shape.hit_test(local, self.bounds(), (sx, sy))
    }

    /// Integrate velocities and advance the shape.
    pub(crate) fn update(&mut self, dt: f32) {
        if self.vx != 0.0 || self.vy != 0.0 {
            self.set_position(self.x + self.vx * dt, self.y + self.vy * dt);
            self.vx *= self.vx_damping;
            self.vy *= self.vy_damping;
        }
        if self.vr != 0.0 {
            self.set_rotation(self.rotation + self.vr * dt);
            self.vr *= self.vr_damping;
        }
        self.shape.update(dt);
    }

    pub(crate) fn take_layer_changed(&mut self) -> bool {
        std::mem::take(&mut self.layer_changed)
    }

    pub(crate) fn release(&mut self) {
        self.shape.release();
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::group()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ArcShape, RectShape};

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_defaults() {
        let node = Node::group();
        assert!(node.is_visible());
        assert!(node.is_touchable());
        assert!(node.get_flags().contains(NodeFlags::INHERIT_OPACITY));
        assert!(node.is_transform_dirty());
        assert_eq!(node.get_pivot(), Pivot::CENTER);
    }

    #[test]
    fn test_arc_node_takes_natural_size() {
        let node = Node::new(ArcShape::new(12.0));
        assert_eq!(node.get_size(), Size::new(24.0, 24.0));
        assert_eq!(node.bounds(), Rect::new(-12.0, -12.0, 24.0, 24.0));
    }

    #[test]
    fn test_update_transform_only_when_dirty() {
        let mut node = Node::group().position(10.0, 5.0);
        assert!(node.update_transform(None));
        assert!(!node.update_transform(None));
        node.set_position(10.0, 5.0);
        assert!(!node.update_transform(None));
        node.set_rotation(0.5);
        assert!(node.update_transform(None));
    }

    #[test]
    fn test_child_transform_maps_into_parent() {
        let mut parent = Node::group().position(100.0, 0.0).scale(2.0, 2.0);
        parent.update_transform(None);
        let frame = ParentFrame::of(&parent);

        let mut child = Node::group().position(10.0, 0.0).scale(1.5, 0.5);
        child.update_transform(Some(&frame));
        assert_eq!(child.world_position(), Point::new(120.0, 0.0));
        assert_eq!(child.accum_scale(), (3.0, 1.0));
    }

    #[test]
    fn test_opacity_inherit_vs_scene() {
        let parent = ParentFrame {
            transform: Transform2D::IDENTITY,
            opacity: 0.5,
            scale_x: 1.0,
            scale_y: 1.0,
        };
        let mut node = Node::group().opacity(0.8);
        node.update_opacity(Some(&parent), 0.9);
        assert!(approx_eq(node.accum_opacity(), 0.4));

        let mut opted_out = Node::group().opacity(0.8).inherit_opacity(false);
        opted_out.update_opacity(Some(&parent), 0.9);
        assert!(approx_eq(opted_out.accum_opacity(), 0.72));

        let mut root = Node::group().opacity(0.8);
        root.update_opacity(None, 0.5);
        assert!(approx_eq(root.accum_opacity(), 0.4));
    }

    #[test]
    fn test_camera_applies_to_near_depths_only() {
        assert!(Node::group().depth(0).camera_applies());
        assert!(Node::group().depth(1).camera_applies());
        assert!(!Node::group().depth(2).camera_applies());
        assert!(!Node::group().ignore_camera(true).camera_applies());
    }

    #[test]
    fn test_rotated_rect_hit() {
        let mut node = Node::new(RectShape::filled(crate::geometry::Color::WHITE))
            .size(40.0, 10.0)
            .rotation(std::f32::consts::FRAC_PI_2);
        node.update_transform(None);
        let frame = HitFrame::default();
        // Rotated a quarter turn the long edge runs along y.
        assert!(node.hit_test(Point::new(0.0, 18.0), &frame));
        assert!(!node.hit_test(Point::new(18.0, 0.0), &frame));
    }

    #[test]
    fn test_zero_scale_never_hits() {
        let mut node = Node::new(ArcShape::new(10.0)).scale(0.0, 1.0);
        node.update_transform(None);
        assert!(!node.hit_test(Point::ZERO, &HitFrame::default()));
    }

    #[test]
    fn test_velocity_and_damping() {
        let mut node = Node::group().velocity(10.0, 0.0, 1.0).damping(0.5, 1.0, 1.0);
        node.update_transform(None);
        node.update(0.5);
        assert_eq!(node.x(), 5.0);
        assert_eq!(node.vx, 5.0);
        assert_eq!(node.get_rotation(), 0.5);
        assert!(node.is_transform_dirty());
    }

    #[test]
    fn test_shape_downcast() {
        let mut node = Node::new(ArcShape::new(3.0));
        assert!(node.shape_as::<RectShape>().is_none());
        node.shape_as_mut::<ArcShape>().expect("arc").radius = 6.0;
        node.fit_to_shape();
        assert_eq!(node.get_size(), Size::new(12.0, 12.0));
    }

    #[test]
    fn test_layer_change_flag() {
        let mut node = Node::group();
        node.set_layer(0);
        assert!(!node.take_layer_changed());
        node.set_layer(3);
        assert!(node.take_layer_changed());
        assert!(!node.take_layer_changed());
    }
}
