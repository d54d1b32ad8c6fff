//! Scenes: named containers of a node forest with their own camera,
//! timelines, actions and resources.

use std::collections::HashMap;
use std::fmt;
use std::mem;

use crate::actions::ActionsListManager;
use crate::animation::{Animatable, Property, PropertyHost, Target, TimelineManager};
use crate::canvas::CanvasMetrics;
use crate::events::{Key, TouchEvent};
use crate::geometry::{Point, Rect};
use crate::hit_test::hit_test_tree;
use crate::node::{HitFrame, Node};
use crate::paint::{draw_tree, SceneFrame};
use crate::resources::Resources;
use crate::surface::Surface;
use crate::tree::{NodeId, Tree};

/// Identifier assigned to a scene when it is added to an [`App`](crate::App).
/// Scenes that were never added carry the unassigned id 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SceneId(u32);

impl SceneId {
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

pub type TickHandler = Box<dyn FnMut(&mut Scene, f32)>;
pub type TouchHandler = Box<dyn FnMut(&mut Scene, &TouchEvent)>;
pub type KeyHandler = Box<dyn FnMut(&mut Scene, Key)>;

#[derive(Default)]
struct Handlers {
    on_tick: Option<TickHandler>,
    on_begin_touch: Option<TouchHandler>,
    on_move_touch: Option<TouchHandler>,
    on_end_touch: Option<TouchHandler>,
    on_key_down: Option<KeyHandler>,
    on_key_up: Option<KeyHandler>,
}

#[derive(Debug, Clone, Copy)]
struct CameraFollow {
    target: NodeId,
    /// Fraction of the remaining distance covered per second; 0 snaps.
    speed: f32,
}

pub struct Scene {
    id: SceneId,
    name: String,
    x: f32,
    y: f32,
    camera: Point,
    opacity: f32,
    layer: i32,
    layer_changed: bool,
    visible: bool,
    tree: Tree,
    timelines: TimelineManager,
    actions: ActionsListManager,
    resources: Resources,
    follow: Option<CameraFollow>,
    camera_extents: Option<Rect>,
    handlers: Handlers,
    /// Node each active touch began on
    touches: HashMap<u32, Option<NodeId>>,
    pending_removals: Vec<NodeId>,
    destroyed: bool,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SceneId::default(),
            name: name.into(),
            x: 0.0,
            y: 0.0,
            camera: Point::ZERO,
            opacity: 1.0,
            layer: 0,
            layer_changed: false,
            visible: true,
            tree: Tree::new(),
            timelines: TimelineManager::new(),
            actions: ActionsListManager::new(),
            resources: Resources::new(),
            follow: None,
            camera_extents: None,
            handlers: Handlers::default(),
            touches: HashMap::new(),
            pending_removals: Vec::new(),
            destroyed: false,
        }
    }

    // Builder methods

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.set_opacity(opacity);
        self
    }

    pub fn layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn camera(mut self, x: f32, y: f32) -> Self {
        self.camera = Point::new(x, y);
        self
    }

    pub fn on_tick<F: FnMut(&mut Scene, f32) + 'static>(mut self, f: F) -> Self {
        self.handlers.on_tick = Some(Box::new(f));
        self
    }

    pub fn on_begin_touch<F: FnMut(&mut Scene, &TouchEvent) + 'static>(mut self, f: F) -> Self {
        self.handlers.on_begin_touch = Some(Box::new(f));
        self
    }

    pub fn on_move_touch<F: FnMut(&mut Scene, &TouchEvent) + 'static>(mut self, f: F) -> Self {
        self.handlers.on_move_touch = Some(Box::new(f));
        self
    }

    pub fn on_end_touch<F: FnMut(&mut Scene, &TouchEvent) + 'static>(mut self, f: F) -> Self {
        self.handlers.on_end_touch = Some(Box::new(f));
        self
    }

    pub fn on_key_down<F: FnMut(&mut Scene, Key) + 'static>(mut self, f: F) -> Self {
        self.handlers.on_key_down = Some(Box::new(f));
        self
    }

    pub fn on_key_up<F: FnMut(&mut Scene, Key) + 'static>(mut self, f: F) -> Self {
        self.handlers.on_key_up = Some(Box::new(f));
        self
    }

    // Identity

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: SceneId) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // Nodes

    /// Add a node at the end of the root list.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.tree.insert_root(node)
    }

    /// Add a node as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Option<NodeId> {
        self.tree.insert_child(parent, node)
    }

    /// Move an existing node under another parent (or to the roots).
    pub fn reparent(&mut self, id: NodeId, parent: Option<NodeId>) -> bool {
        self.tree.attach(id, parent)
    }

    /// Schedule a node and its subtree for removal at the end of the next
    /// update. Returns `false` for unknown nodes.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.tree.contains(id) {
            return false;
        }
        if !self.pending_removals.contains(&id) {
            self.pending_removals.push(id);
        }
        true
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.tree.get_mut(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.tree.children(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        self.tree.roots()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// Depth-first search for a node by name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.tree.find_by_name(name)
    }

    /// Topmost touchable node under a world-space point.
    pub fn find_hit_actor(&self, point: Point) -> Option<NodeId> {
        let frame = HitFrame {
            scene: Point::new(self.x, self.y),
            camera: self.camera,
        };
        hit_test_tree(&self.tree, point, &frame)
    }

    // Frame

    /// Run one logic step: callbacks, timelines, actions, node motion,
    /// deferred removals, layer sorting and transforms.
    pub fn update(&mut self, dt: f32) {
        if let Some(mut handler) = self.handlers.on_tick.take() {
            handler(self, dt);
            self.handlers.on_tick.get_or_insert(handler);
        }

        let mut timelines = mem::take(&mut self.timelines);
        timelines.update(dt, self);
        timelines.append(&mut self.timelines);
        self.timelines = timelines;

        let mut actions = mem::take(&mut self.actions);
        actions.execute(dt, self);
        actions.append(&mut self.actions);
        self.actions = actions;

        for id in self.tree.linked() {
            if let Some(node) = self.tree.get_mut(id) {
                node.update(dt);
            }
        }

        self.flush_removals();
        self.tree.sort_layers();
        self.tree.update_transforms();
        self.update_camera(dt);
    }

    fn flush_removals(&mut self) {
        if self.pending_removals.is_empty() {
            return;
        }
        let mut removed = 0;
        for id in mem::take(&mut self.pending_removals) {
            removed += self.tree.remove(id);
        }
        let tree = &self.tree;
        self.touches
            .values_mut()
            .for_each(|target| *target = target.filter(|&id| tree.contains(id)));
        if self.follow.is_some_and(|f| !tree.contains(f.target)) {
            self.follow = None;
        }
        log::debug!("scene `{}` removed {} node(s)", self.name, removed);
    }

    fn update_camera(&mut self, dt: f32) {
        if let Some(follow) = self.follow {
            if let Some(node) = self.tree.get(follow.target) {
                let target = node.world_position();
                self.camera = if follow.speed <= 0.0 {
                    target
                } else {
                    Point::lerp(self.camera, target, (follow.speed * dt).min(1.0))
                };
            }
        }
        if let Some(extents) = self.camera_extents {
            self.camera = extents.clamp(self.camera);
        }
    }

    /// Draw every visible node. Skipped entirely when the scene is hidden.
    pub fn draw(&mut self, surface: &mut dyn Surface, metrics: &CanvasMetrics) {
        if !self.visible {
            return;
        }
        let frame = SceneFrame {
            origin: Point::new(
                self.x * metrics.scale + metrics.canvas_cx,
                self.y * metrics.scale + metrics.canvas_cy,
            ),
            camera: self.camera,
            scale: metrics.scale,
            opacity: self.opacity,
        };
        draw_tree(&mut self.tree, surface, &frame);
    }

    /// Rebuild dirty transforms without drawing.
    pub fn update_transforms(&mut self) {
        self.tree.update_transforms();
    }

    /// Force every node transform to be rebuilt.
    pub fn dirty(&mut self) {
        self.tree.mark_all_dirty();
    }

    // Resources and sub-systems

    pub fn count_resources_need_loading(&self) -> usize {
        self.resources.count_need_loading()
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    pub fn timelines(&self) -> &TimelineManager {
        &self.timelines
    }

    pub fn timelines_mut(&mut self) -> &mut TimelineManager {
        &mut self.timelines
    }

    pub fn actions(&self) -> &ActionsListManager {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut ActionsListManager {
        &mut self.actions
    }

    // Scene properties

    pub fn get_position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn get_camera(&self) -> Point {
        self.camera
    }

    pub fn set_camera(&mut self, x: f32, y: f32) {
        self.camera = Point::new(x, y);
    }

    pub fn get_opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn get_layer(&self) -> i32 {
        self.layer
    }

    /// Change the scene's stacking order. The app re-sorts its scene list at
    /// the end of the current update.
    pub fn set_layer(&mut self, layer: i32) {
        if self.layer != layer {
            self.layer = layer;
            self.layer_changed = true;
        }
    }

    pub(crate) fn take_layer_changed(&mut self) -> bool {
        mem::take(&mut self.layer_changed)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Keep the camera moving toward `target`'s world position. `speed` is
    /// the fraction of the remaining distance covered per second; 0 snaps.
    pub fn follow(&mut self, target: NodeId, speed: f32) {
        self.follow = Some(CameraFollow { target, speed });
    }

    pub fn stop_following(&mut self) {
        self.follow = None;
    }

    /// Limit the camera position to `extents`, or lift the limit with `None`.
    pub fn set_camera_extents(&mut self, extents: Option<Rect>) {
        self.camera_extents = extents;
    }

    /// Mark the scene for removal; it is torn down after the current app
    /// update finishes.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // Input

    /// Hit test and record which node the touch began on.
    pub fn begin_touch_base(&mut self, id: u32, position: Point) {
        let target = self.find_hit_actor(position);
        self.touches.insert(id, target);
        let event = TouchEvent {
            id,
            position,
            target,
        };
        self.call_touch(|h| &mut h.on_begin_touch, &event);
    }

    pub fn move_touch_base(&mut self, id: u32, position: Point) {
        let target = match self.touches.get(&id) {
            Some(&captured) => captured,
            None => self.find_hit_actor(position),
        };
        let event = TouchEvent {
            id,
            position,
            target,
        };
        self.call_touch(|h| &mut h.on_move_touch, &event);
    }

    pub fn end_touch_base(&mut self, id: u32, position: Point) {
        let target = match self.touches.remove(&id) {
            Some(captured) => captured,
            None => self.find_hit_actor(position),
        };
        let event = TouchEvent {
            id,
            position,
            target,
        };
        self.call_touch(|h| &mut h.on_end_touch, &event);
    }

    pub fn key_down_base(&mut self, key: Key) {
        self.call_key(|h| &mut h.on_key_down, key);
    }

    pub fn key_up_base(&mut self, key: Key) {
        self.call_key(|h| &mut h.on_key_up, key);
    }

    /// Run a handler with the scene borrowed mutably, then put it back unless
    /// the handler installed a replacement.
    fn call_touch(
        &mut self,
        slot: fn(&mut Handlers) -> &mut Option<TouchHandler>,
        event: &TouchEvent,
    ) {
        let Some(mut handler) = slot(&mut self.handlers).take() else {
            return;
        };
        handler(self, event);
        slot(&mut self.handlers).get_or_insert(handler);
    }

    fn call_key(&mut self, slot: fn(&mut Handlers) -> &mut Option<KeyHandler>, key: Key) {
        let Some(mut handler) = slot(&mut self.handlers).take() else {
            return;
        };
        handler(self, key);
        slot(&mut self.handlers).get_or_insert(handler);
    }

    fn scene_property(&self, property: Property) -> Option<f32> {
        match property {
            Property::X => Some(self.x),
            Property::Y => Some(self.y),
            Property::Opacity => Some(self.opacity),
            Property::CameraX => Some(self.camera.x),
            Property::CameraY => Some(self.camera.y),
            _ => None,
        }
    }

    fn set_scene_property(&mut self, property: Property, value: f32) -> bool {
        match property {
            Property::X => self.x = value,
            Property::Y => self.y = value,
            Property::Opacity => self.set_opacity(value),
            Property::CameraX => self.camera.x = value,
            Property::CameraY => self.camera.y = value,
            _ => return false,
        }
        true
    }
}

impl PropertyHost for Scene {
    fn property(&self, target: Target, property: Property) -> Option<f32> {
        match target {
            Target::Node(node) => self.tree.get(node)?.property(property),
            Target::SceneNode(scene, node) if scene == self.id => {
                self.tree.get(node)?.property(property)
            }
            Target::Scene(scene) if scene == self.id => self.scene_property(property),
            _ => None,
        }
    }

    fn set_property(&mut self, target: Target, property: Property, value: f32) -> bool {
        match target {
            Target::Node(node) => self
                .tree
                .get_mut(node)
                .is_some_and(|n| n.set_property(property, value)),
            Target::SceneNode(scene, node) if scene == self.id => self
                .tree
                .get_mut(node)
                .is_some_and(|n| n.set_property(property, value)),
            Target::Scene(scene) if scene == self.id => self.set_scene_property(property, value),
            _ => false,
        }
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("position", &(self.x, self.y))
            .field("camera", &self.camera)
            .field("opacity", &self.opacity)
            .field("layer", &self.layer)
            .field("visible", &self.visible)
            .field("destroyed", &self.destroyed)
            .field("tree", &self.tree)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animation, Timeline};
    use crate::actions::{ActionsList, SetProperty};
    use crate::shapes::ArcShape;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn circle(r: f32) -> Node {
        Node::new(ArcShape::new(r))
    }

    #[test]
    fn test_remove_node_is_deferred_to_update() {
        let mut scene = Scene::new("game");
        let a = scene.add_node(circle(5.0));
        let child = scene.add_child(a, circle(2.0)).unwrap();

        assert!(scene.remove_node(a));
        assert!(scene.node(a).is_some());

        scene.update(0.016);
        assert!(scene.node(a).is_none());
        assert!(scene.node(child).is_none());
        assert!(!scene.remove_node(a));
    }

    #[test]
    fn test_find_hit_actor_uses_scene_position() {
        let mut scene = Scene::new("game").position(50.0, 0.0);
        let id = scene.add_node(circle(5.0));
        scene.update_transforms();

        assert_eq!(scene.find_hit_actor(Point::new(50.0, 0.0)), Some(id));
        assert_eq!(scene.find_hit_actor(Point::ZERO), None);
    }

    #[test]
    fn test_timelines_drive_nodes() {
        let mut scene = Scene::new("game");
        let id = scene.add_node(circle(5.0));
        scene.timelines_mut().add(
            Timeline::new("slide").animation(
                Animation::new(Target::Node(id), Property::X)
                    .keyframe(0.0, 0.0)
                    .keyframe(1.0, 100.0),
            ),
        );

        scene.update(0.5);
        assert_eq!(scene.node(id).unwrap().x(), 50.0);
        // Transforms are current after the update
        assert_eq!(scene.node(id).unwrap().world_position(), Point::new(50.0, 0.0));
    }

    #[test]
    fn test_actions_drive_scene_properties() {
        let mut scene = Scene::new("game");
        let target = Target::Scene(scene.id());
        scene
            .actions_mut()
            .add(ActionsList::new("fade").then(SetProperty::new(target, Property::Opacity, 0.25)));

        scene.update(0.016);
        assert_eq!(scene.get_opacity(), 0.25);
        assert!(scene.actions().is_empty());
    }

    #[test]
    fn test_other_scene_targets_are_ignored() {
        let mut scene = Scene::new("game");
        assert!(!scene.set_property(Target::Scene(SceneId::new(99)), Property::X, 1.0));
        assert_eq!(scene.property(Target::Scene(SceneId::new(99)), Property::X), None);
    }

    #[test]
    fn test_on_tick_can_mutate_scene() {
        let mut scene = Scene::new("game").on_tick(|scene, dt| {
            let camera = scene.get_camera();
            scene.set_camera(camera.x + dt, 0.0);
        });
        scene.update(1.0);
        scene.update(1.0);
        assert_eq!(scene.get_camera(), Point::new(2.0, 0.0));
    }

    #[test]
    fn test_touch_capture_keeps_begin_target() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let mut scene = Scene::new("game").on_move_touch(move |_, event| {
            log.borrow_mut().push(event.target);
        });
        let id = scene.add_node(circle(5.0));
        scene.update_transforms();

        scene.begin_touch_base(1, Point::ZERO);
        scene.move_touch_base(1, Point::new(100.0, 100.0));
        // An uncaptured touch is hit tested where it is
        scene.move_touch_base(2, Point::new(100.0, 100.0));

        assert_eq!(*seen.borrow(), vec![Some(id), None]);
    }

    #[test]
    fn test_camera_follow_snaps_and_clamps() {
        let mut scene = Scene::new("game");
        let hero = scene.add_node(circle(5.0).position(300.0, 40.0));
        scene.follow(hero, 0.0);
        scene.update(0.016);
        assert_eq!(scene.get_camera(), Point::new(300.0, 40.0));

        scene.set_camera_extents(Some(Rect::new(-100.0, -100.0, 200.0, 200.0)));
        scene.update(0.016);
        assert_eq!(scene.get_camera(), Point::new(100.0, 40.0));
    }

    #[test]
    fn test_detached_nodes_do_not_move() {
        let mut scene = Scene::new("game");
        let linked = scene.add_node(circle(5.0).velocity(10.0, 0.0, 0.0));
        let loose = scene.add_node(circle(5.0).velocity(10.0, 0.0, 0.0));
        let loose_child = scene
            .add_child(loose, circle(2.0).velocity(0.0, 10.0, 0.0))
            .unwrap();
        assert!(scene.tree_mut().detach(loose));

        scene.update(1.0);
        assert_eq!(scene.node(linked).unwrap().x(), 10.0);
        assert_eq!(scene.node(loose).unwrap().x(), 0.0);
        assert_eq!(scene.node(loose_child).unwrap().y(), 0.0);
    }

    #[test]
    fn test_layer_change_flags_once() {
        let mut scene = Scene::new("hud");
        scene.set_layer(0);
        assert!(!scene.take_layer_changed());
        scene.set_layer(4);
        assert!(scene.take_layer_changed());
        assert!(!scene.take_layer_changed());
    }
}
