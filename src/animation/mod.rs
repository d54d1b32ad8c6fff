//! Time-driven property animation.
//!
//! Timelines never hold references into the scene graph. They address what
//! they animate through a [`Target`] and read and write values through a
//! [`PropertyHost`], which both [`Scene`](crate::Scene) and
//! [`App`](crate::App) implement.

mod animatable;
mod timeline;
mod timing;

pub use animatable::Animatable;
pub use timeline::{Animation, Keyframe, Timeline, TimelineManager};
pub use timing::TimingFunction;

use crate::scene::SceneId;
use crate::tree::NodeId;

/// An animatable scalar on a node or scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    X,
    Y,
    Rotation,
    ScaleX,
    ScaleY,
    Opacity,
    Width,
    Height,
    /// Scene camera, horizontal
    CameraX,
    /// Scene camera, vertical
    CameraY,
}

/// What an animation or action writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// A node of the scene that owns the timeline
    Node(NodeId),
    Scene(SceneId),
    /// A node of a specific scene, for app-level timelines
    SceneNode(SceneId, NodeId),
}

/// Read/write access to animatable properties.
///
/// Unknown targets or properties the target doesn't have read as `None` and
/// ignore writes.
pub trait PropertyHost {
    fn property(&self, target: Target, property: Property) -> Option<f32>;

    /// Returns `false` when the write was ignored.
    fn set_property(&mut self, target: Target, property: Property, value: f32) -> bool;
}
