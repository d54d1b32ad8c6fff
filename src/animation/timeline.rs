use super::{Animatable, Property, PropertyHost, Target, TimingFunction};

#[derive(Debug, Clone)]
pub struct Keyframe {
    /// Seconds from the start of the animation
    pub time: f32,
    pub value: f32,
    /// Curve used to reach this keyframe from the previous one
    pub timing: TimingFunction,
}

/// Keyframed animation of one property of one target.
#[derive(Debug, Clone)]
pub struct Animation {
    target: Target,
    property: Property,
    keyframes: Vec<Keyframe>,
    /// Number of plays, 0 repeats forever
    repeat: u32,
    delay: f32,
    time_scale: f32,
    time: f32,
    finished: bool,
}

impl Animation {
    pub fn new(target: Target, property: Property) -> Self {
        Self {
            target,
            property,
            keyframes: Vec::new(),
            repeat: 1,
            delay: 0.0,
            time_scale: 1.0,
            time: 0.0,
            finished: false,
        }
    }

    /// Add a keyframe reached linearly.
    pub fn keyframe(self, time: f32, value: f32) -> Self {
        self.keyframe_with(time, value, TimingFunction::Linear)
    }

    pub fn keyframe_with(mut self, time: f32, value: f32, timing: TimingFunction) -> Self {
        let index = self.keyframes.partition_point(|k| k.time <= time);
        self.keyframes.insert(
            index,
            Keyframe {
                time,
                value,
                timing,
            },
        );
        self
    }

    /// Play `count` times; 0 loops forever.
    pub fn repeat(mut self, count: u32) -> Self {
        self.repeat = count;
        self
    }

    /// Seconds to wait before the first keyframe applies.
    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale;
        self
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn property(&self) -> Property {
        self.property
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Time of the last keyframe.
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Interpolated value at `t` seconds into one play.
    pub fn value_at(&self, t: f32) -> Option<f32> {
        let first = self.keyframes.first()?;
        if t <= first.time {
            return Some(first.value);
        }
        let next = self.keyframes.partition_point(|k| k.time <= t);
        let Some(to) = self.keyframes.get(next) else {
            return self.keyframes.last().map(|k| k.value);
        };
        let from = &self.keyframes[next - 1];
        let span = to.time - from.time;
        let progress = if span > 0.0 {
            (t - from.time) / span
        } else {
            1.0
        };
        Some(f32::lerp(from.value, to.value, to.timing.evaluate(progress)))
    }

    /// Advance by `dt` seconds and write the current value through `host`.
    pub fn advance(&mut self, dt: f32, host: &mut dyn PropertyHost) {
        if self.finished {
            return;
        }
        self.time += dt * self.time_scale;
        let t = self.time - self.delay;
        if t < 0.0 {
            return;
        }

        let duration = self.duration();
        let local = if duration <= 0.0 {
            self.finished = true;
            duration
        } else {
            let plays = (t / duration).floor();
            if self.repeat != 0 && plays >= self.repeat as f32 {
                self.finished = true;
                duration
            } else {
                t.rem_euclid(duration)
            }
        };

        if let Some(value) = self.value_at(local) {
            if !host.set_property(self.target, self.property, value) {
                log::trace!(
                    "animation target {:?} has no {:?}, stopping",
                    self.target,
                    self.property
                );
                self.finished = true;
            }
        } else {
            self.finished = true;
        }
    }

    /// Rewind to the start.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.finished = false;
    }
}

/// A named group of animations played together.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    pub name: String,
    animations: Vec<Animation>,
    paused: bool,
}

impl Timeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn animation(mut self, animation: Animation) -> Self {
        self.animations.push(animation);
        self
    }

    pub fn add(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.animations.iter().all(Animation::is_finished)
    }

    pub fn restart(&mut self) {
        self.animations.iter_mut().for_each(Animation::reset);
    }

    pub fn update(&mut self, dt: f32, host: &mut dyn PropertyHost) {
        if self.paused {
            return;
        }
        for animation in &mut self.animations {
            animation.advance(dt, host);
        }
    }
}

/// Runs a set of timelines and drops them once they finish.
#[derive(Debug, Default)]
pub struct TimelineManager {
    timelines: Vec<Timeline>,
}

impl TimelineManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, timeline: Timeline) {
        self.timelines.push(timeline);
    }

    pub fn remove(&mut self, name: &str) -> Option<Timeline> {
        let index = self.timelines.iter().position(|t| t.name == name)?;
        Some(self.timelines.remove(index))
    }

    pub fn find(&self, name: &str) -> Option<&Timeline> {
        self.timelines.iter().find(|t| t.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Timeline> {
        self.timelines.iter_mut().find(|t| t.name == name)
    }

    pub fn update(&mut self, dt: f32, host: &mut dyn PropertyHost) {
        for timeline in &mut self.timelines {
            timeline.update(dt, host);
        }
        self.timelines.retain(|t| {
            let done = t.is_finished();
            if done {
                log::debug!("timeline `{}` finished", t.name);
            }
            !done
        });
    }

    /// Move timelines added elsewhere (e.g. while this manager was taken out
    /// for an update) into this one, keeping their order after existing ones.
    pub fn append(&mut self, other: &mut TimelineManager) {
        self.timelines.append(&mut other.timelines);
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }
}
