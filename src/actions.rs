//! Sequential scripted actions.
//!
//! An [`ActionsList`] runs its actions one after another; each action keeps
//! running until it reports [`ActionStatus::Done`]. Like timelines, actions
//! reach the scene graph only through a [`PropertyHost`].

use std::fmt;

use crate::animation::{Animatable, Property, PropertyHost, Target, TimingFunction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Running,
    Done,
}

pub trait Action {
    /// Called when the action becomes current, before its first tick.
    fn on_init(&mut self, _host: &mut dyn PropertyHost) {}

    fn on_tick(&mut self, dt: f32, host: &mut dyn PropertyHost) -> ActionStatus;

    /// Prepare for another play of the owning list.
    fn reset(&mut self) {}
}

/// Do nothing for a number of seconds.
#[derive(Debug, Clone)]
pub struct Wait {
    duration: f32,
    elapsed: f32,
}

impl Wait {
    pub fn new(seconds: f32) -> Self {
        Self {
            duration: seconds,
            elapsed: 0.0,
        }
    }
}

impl Action for Wait {
    fn on_tick(&mut self, dt: f32, _host: &mut dyn PropertyHost) -> ActionStatus {
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            ActionStatus::Done
        } else {
            ActionStatus::Running
        }
    }

    fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Write a value once.
#[derive(Debug, Clone)]
pub struct SetProperty {
    pub target: Target,
    pub property: Property,
    pub value: f32,
}

impl SetProperty {
    pub fn new(target: Target, property: Property, value: f32) -> Self {
        Self {
            target,
            property,
            value,
        }
    }
}

impl Action for SetProperty {
    fn on_tick(&mut self, _dt: f32, host: &mut dyn PropertyHost) -> ActionStatus {
        host.set_property(self.target, self.property, self.value);
        ActionStatus::Done
    }
}

/// Move a property from its current value to `to` over `duration` seconds.
#[derive(Debug, Clone)]
pub struct TweenProperty {
    target: Target,
    property: Property,
    to: f32,
    duration: f32,
    timing: TimingFunction,
    from: Option<f32>,
    elapsed: f32,
}

impl TweenProperty {
    pub fn new(target: Target, property: Property, to: f32, duration: f32) -> Self {
        Self {
            target,
            property,
            to,
            duration,
            timing: TimingFunction::Linear,
            from: None,
            elapsed: 0.0,
        }
    }

    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }
}

impl Action for TweenProperty {
    fn on_init(&mut self, host: &mut dyn PropertyHost) {
        self.from = host.property(self.target, self.property);
        self.elapsed = 0.0;
    }

    fn on_tick(&mut self, dt: f32, host: &mut dyn PropertyHost) -> ActionStatus {
        // Nothing to read from means nothing to animate.
        let Some(from) = self.from else {
            return ActionStatus::Done;
        };
        self.elapsed += dt;
        let progress = if self.duration > 0.0 {
            self.elapsed / self.duration
        } else {
            1.0
        };
        let value = f32::lerp(from, self.to, self.timing.evaluate(progress));
        host.set_property(self.target, self.property, value);
        if progress >= 1.0 {
            ActionStatus::Done
        } else {
            ActionStatus::Running
        }
    }

    fn reset(&mut self) {
        self.from = None;
        self.elapsed = 0.0;
    }
}

/// Run a closure once.
pub struct Call {
    f: Box<dyn FnMut(&mut dyn PropertyHost)>,
}

impl Call {
    pub fn new<F: FnMut(&mut dyn PropertyHost) + 'static>(f: F) -> Self {
        Self { f: Box::new(f) }
    }
}

impl Action for Call {
    fn on_tick(&mut self, _dt: f32, host: &mut dyn PropertyHost) -> ActionStatus {
        (self.f)(host);
        ActionStatus::Done
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Call")
    }
}

/// A named sequence of actions, played `repeat` times (0 = forever).
pub struct ActionsList {
    pub name: String,
    actions: Vec<Box<dyn Action>>,
    current: usize,
    started: bool,
    repeat: u32,
    plays: u32,
    finished: bool,
}

impl ActionsList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
            current: 0,
            started: false,
            repeat: 1,
            plays: 0,
            finished: false,
        }
    }

    pub fn then(mut self, action: impl Action + 'static) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    pub fn repeat(mut self, count: u32) -> Self {
        self.repeat = count;
        self
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Index of the running action.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Tick the current action. Actions that finish instantly hand over to
    /// the next one within the same tick; a new play starts on the next tick.
    pub fn execute(&mut self, dt: f32, host: &mut dyn PropertyHost) {
        if self.finished {
            return;
        }
        if self.actions.is_empty() {
            self.finished = true;
            return;
        }

        let mut dt = dt;
        while let Some(action) = self.actions.get_mut(self.current) {
            if !self.started {
                action.on_init(host);
                self.started = true;
            }
            match action.on_tick(dt, host) {
                ActionStatus::Running => return,
                ActionStatus::Done => {
                    self.current += 1;
                    self.started = false;
                    dt = 0.0;
                }
            }
        }

        self.plays += 1;
        if self.repeat != 0 && self.plays >= self.repeat {
            log::debug!("actions list `{}` finished", self.name);
            self.finished = true;
        } else {
            self.current = 0;
            self.actions.iter_mut().for_each(|a| a.reset());
        }
    }
}

impl fmt::Debug for ActionsList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionsList")
            .field("name", &self.name)
            .field("actions", &self.actions.len())
            .field("current", &self.current)
            .field("plays", &self.plays)
            .field("finished", &self.finished)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct ActionsListManager {
    lists: Vec<ActionsList>,
}

impl ActionsListManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, list: ActionsList) {
        self.lists.push(list);
    }

    pub fn remove(&mut self, name: &str) -> Option<ActionsList> {
        let index = self.lists.iter().position(|l| l.name == name)?;
        Some(self.lists.remove(index))
    }

    pub fn find(&self, name: &str) -> Option<&ActionsList> {
        self.lists.iter().find(|l| l.name == name)
    }

    /// Tick every list and drop the finished ones.
    pub fn execute(&mut self, dt: f32, host: &mut dyn PropertyHost) {
        for list in &mut self.lists {
            list.execute(dt, host);
        }
        self.lists.retain(|l| !l.is_finished());
    }

    pub fn append(&mut self, other: &mut ActionsListManager) {
        self.lists.append(&mut other.lists);
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
