//! Input and loader events, and the queue that carries them into the logic tick.
//!
//! Hosts push [`AppEvent`]s from their own callbacks (or other threads) into
//! an [`EventQueue`]; [`App::update`](crate::App::update) drains it once at the
//! start of every logic tick so the scene graph is only touched from the loop.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::LoadError;
use crate::geometry::Point;
use crate::resources::ResourceKind;
use crate::tree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    Home,
    End,
    /// Character input
    Char(char),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A touch or pointer press, in display pixels
    TouchBegin { id: u32, x: f32, y: f32 },
    /// A touch or pointer drag, in display pixels
    TouchMove { id: u32, x: f32, y: f32 },
    /// A touch or pointer release, in display pixels
    TouchEnd { id: u32, x: f32, y: f32 },
    KeyDown { key: Key },
    KeyUp { key: Key },
    /// The display changed size
    Resize { width: f32, height: f32 },
    /// The host finished loading a resource, successfully or not
    ResourceLoaded {
        kind: ResourceKind,
        name: String,
        result: Result<(), LoadError>,
    },
}

/// A touch delivered to a scene, already converted to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub id: u32,
    pub position: Point,
    /// The node under the touch. Moves and ends keep the node the touch
    /// began on.
    pub target: Option<NodeId>,
}

/// Thread-safe FIFO of pending events. Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<VecDeque<AppEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: AppEvent) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(event);
    }

    /// Take every pending event in arrival order.
    pub fn drain(&self) -> Vec<AppEvent> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
