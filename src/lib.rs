//! A retained 2D scene graph.
//!
//! An [`App`] owns a list of [`Scene`]s drawn in layer order. Each scene owns
//! a tree of [`Node`]s that carry a transform, a [`Shape`](shapes::Shape) and
//! flags for visibility, hit testing, clipping and camera behavior. Drawing
//! goes through the [`Surface`](surface::Surface) trait so any 2D backend can
//! host the graph.
//!
//! ```no_run
//! use tableau::prelude::*;
//!
//! let mut scene = Scene::new("main");
//! scene.add_node(Node::new(ArcShape::new(20.0).fill(Color::rgb(0.9, 0.2, 0.2))));
//!
//! let mut app = App::with_config(AppConfig::new().canvas_size(800.0, 450.0));
//! let id = app.add_scene(scene);
//! app.set_focus(Some(id));
//! app.start(RecordingSurface::new()).unwrap();
//! ```

pub mod actions;
pub mod animation;
pub mod app;
pub mod canvas;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod node;
pub mod paint;
pub mod pivot;
mod runner;
pub mod resources;
pub mod scene;
pub mod shapes;
pub mod stats;
pub mod surface;
pub mod transform;
pub mod tree;

pub use app::{App, AppState, HitActor};
pub use config::AppConfig;
pub use error::{Error, LoadError, Result};
pub use node::Node;
pub use scene::{Scene, SceneId};
pub use tree::NodeId;

pub mod prelude {
    pub use crate::actions::{
        Action, ActionStatus, ActionsList, Call, SetProperty, TweenProperty, Wait,
    };
    pub use crate::animation::{
        Animation, Property, PropertyHost, Target, Timeline, TimingFunction,
    };
    pub use crate::canvas::ScalingMethod;
    pub use crate::config::LoadingScreenStyle;
    pub use crate::events::{AppEvent, EventQueue, Key, TouchEvent};
    pub use crate::geometry::{Color, Point, Rect, Size};
    pub use crate::node::NodeFlags;
    pub use crate::pivot::Pivot;
    pub use crate::resources::{Resource, ResourceKind};
    pub use crate::shapes::{ArcShape, Group, ImageShape, LabelShape, RectShape, Shape};
    pub use crate::surface::{RecordingSurface, Surface};
    pub use crate::transform::Transform2D;
    pub use crate::{App, AppConfig, Node, NodeId, Scene, SceneId};
}
