use std::fmt;
use std::mem;
use std::time::Instant;

use crate::actions::ActionsListManager;
use crate::animation::{Property, PropertyHost, Target, TimelineManager};
use crate::canvas::{CanvasMetrics, ScalingMethod};
use crate::config::AppConfig;
use crate::error::LoadError;
use crate::events::{AppEvent, EventQueue};
use crate::geometry::{Point, Rect};
use crate::resources::{LoadTracker, MarkLoaded, Resource, ResourceKind, Resources};
use crate::scene::{Scene, SceneId};
use crate::stats::FrameStats;
use crate::surface::Surface;
use crate::transform::Transform2D;
use crate::tree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Scenes and resources are being registered
    Constructing,
    /// Preload resources are still reporting in; scenes don't run yet
    WaitingForResources,
    Running,
}

/// A node found by [`App::find_hit_actor`], with the scene it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitActor {
    pub scene: SceneId,
    pub node: NodeId,
}

/// Called once when the app starts running.
pub type ReadyHandler = Box<dyn FnMut(&mut App)>;

pub struct App {
    config: AppConfig,
    metrics: CanvasMetrics,
    scenes: Vec<Scene>,
    next_scene_id: u32,
    focus: Option<SceneId>,
    secondary_focus: Option<SceneId>,
    resources: Resources,
    load_tracker: LoadTracker,
    state: AppState,
    events: EventQueue,
    timelines: TimelineManager,
    actions: ActionsListManager,
    stats: FrameStats,
    order_changed: bool,
    on_ready: Option<ReadyHandler>,
    quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let metrics = compute_metrics(&config);
        Self {
            config,
            metrics,
            scenes: Vec::new(),
            next_scene_id: 1,
            focus: None,
            secondary_focus: None,
            resources: Resources::new(),
            load_tracker: LoadTracker::default(),
            state: AppState::Constructing,
            events: EventQueue::new(),
            timelines: TimelineManager::new(),
            actions: ActionsListManager::new(),
            stats: FrameStats::new(),
            order_changed: false,
            on_ready: None,
            quit: false,
        }
    }

    /// Set a callback that runs once, when loading has finished and the app
    /// enters [`AppState::Running`].
    pub fn on_ready<F: FnMut(&mut App) + 'static>(mut self, callback: F) -> Self {
        self.on_ready = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn metrics(&self) -> &CanvasMetrics {
        &self.metrics
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn load_tracker(&self) -> &LoadTracker {
        &self.load_tracker
    }

    pub fn frame_stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Handle for pushing input and loader events from the host.
    pub fn event_queue(&self) -> EventQueue {
        self.events.clone()
    }

    /// Ask the main loop to stop after the current callback.
    pub fn quit(&mut self) {
        self.quit = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    // Scenes

    /// Add a scene on top of the existing ones (within its layer) and return
    /// its id.
    pub fn add_scene(&mut self, mut scene: Scene) -> SceneId {
        let id = SceneId::new(self.next_scene_id);
        self.next_scene_id += 1;
        scene.set_id(id);
        if self.config.debug && self.scenes.iter().any(|s| s.name() == scene.name()) {
            log::warn!("scene name `{}` is already in use", scene.name());
        }
        log::debug!("added scene `{}` ({:?})", scene.name(), id);
        self.scenes.push(scene);
        self.order_changed = true;
        id
    }

    /// Mark a scene for removal. It keeps updating and can still be found
    /// until [`cleanup_destroyed_scenes`](Self::cleanup_destroyed_scenes)
    /// runs at the end of the current update. Focus is released immediately.
    pub fn remove_scene(&mut self, name: &str) -> bool {
        let Some(scene) = self
            .scenes
            .iter_mut()
            .find(|s| s.name() == name && !s.is_destroyed())
        else {
            self.lookup_miss("scene", name);
            return false;
        };
        scene.destroy();
        let id = scene.id();
        self.release_focus(id);
        true
    }

    pub fn find_scene(&self, name: &str) -> Option<&Scene> {
        let found = self.scenes.iter().find(|s| s.name() == name);
        if found.is_none() {
            self.lookup_miss("scene", name);
        }
        found
    }

    pub fn find_scene_mut(&mut self, name: &str) -> Option<&mut Scene> {
        let index = self.scenes.iter().position(|s| s.name() == name);
        if index.is_none() {
            self.lookup_miss("scene", name);
        }
        index.map(move |i| &mut self.scenes[i])
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id() == id)
    }

    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.id() == id)
    }

    /// Scenes in draw order.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Drop every scene marked for removal.
    pub fn cleanup_destroyed_scenes(&mut self) {
        if !self.scenes.iter().any(Scene::is_destroyed) {
            return;
        }
        let (destroyed, alive): (Vec<Scene>, Vec<Scene>) =
            mem::take(&mut self.scenes).into_iter().partition(Scene::is_destroyed);
        self.scenes = alive;
        for mut scene in destroyed {
            self.release_focus(scene.id());
            scene.tree_mut().clear();
            log::debug!("cleaned up scene `{}`", scene.name());
        }
    }

    pub fn set_focus(&mut self, scene: Option<SceneId>) {
        self.focus = scene;
    }

    pub fn set_secondary_focus(&mut self, scene: Option<SceneId>) {
        self.secondary_focus = scene;
    }

    pub fn focus(&self) -> Option<SceneId> {
        self.focus
    }

    pub fn secondary_focus(&self) -> Option<SceneId> {
        self.secondary_focus
    }

    fn release_focus(&mut self, id: SceneId) {
        if self.focus == Some(id) {
            self.focus = None;
        }
        if self.secondary_focus == Some(id) {
            self.secondary_focus = None;
        }
    }

    fn focus_scenes(&self) -> Vec<SceneId> {
        let mut ids = Vec::with_capacity(2);
        for id in [self.focus, self.secondary_focus].into_iter().flatten() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    // Resources

    pub fn add_resource(&mut self, resource: Resource) {
        self.resources.add(resource);
    }

    pub fn remove_resource(&mut self, name: &str, kind: ResourceKind) -> Option<Resource> {
        let removed = self.resources.remove(name, kind);
        if removed.is_none() {
            self.lookup_miss(&kind.to_string(), name);
        }
        removed
    }

    pub fn find_resource(&self, name: &str, kind: ResourceKind) -> Option<&Resource> {
        let found = self.resources.find(name, kind);
        if found.is_none() {
            self.lookup_miss(&kind.to_string(), name);
        }
        found
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    /// Preload resources still pending, optionally including every scene's.
    pub fn count_resources_need_loading(&self, include_scenes: bool) -> usize {
        let mut count = self.resources.count_need_loading();
        if include_scenes {
            count += self
                .scenes
                .iter()
                .map(Scene::count_resources_need_loading)
                .sum::<usize>();
        }
        count
    }

    /// Record the outcome of one resource load. Failures are logged but
    /// still count toward completion. Only the first report of a preload
    /// resource advances the tracker.
    pub fn notify_resource_loaded(
        &mut self,
        kind: ResourceKind,
        name: &str,
        result: Result<(), LoadError>,
    ) {
        let failed = result.is_err();
        if let Err(err) = &result {
            log::warn!("{}", err);
        }
        let mut mark = self.resources.mark_loaded(name, kind, failed);
        for scene in &mut self.scenes {
            if mark != MarkLoaded::NotFound {
                break;
            }
            mark = scene.resources_mut().mark_loaded(name, kind, failed);
        }
        match mark {
            MarkLoaded::Pending => self.load_tracker.record(!failed),
            MarkLoaded::Settled => {
                log::debug!("{} `{}` reported again or not preloaded", kind, name)
            }
            MarkLoaded::NotFound => self.lookup_miss(&kind.to_string(), name),
        }
    }

    fn lookup_miss(&self, what: &str, name: &str) {
        if self.config.debug {
            log::warn!("{} `{}` not found", what, name);
        }
    }

    // Canvas

    pub fn set_canvas_scaling_method(&mut self, method: ScalingMethod) {
        self.config.scaling = method;
        self.metrics = compute_metrics(&self.config);
        log::info!(
            "canvas scaling {:?}: scale={:.3} center=({}, {})",
            method,
            self.metrics.scale,
            self.metrics.canvas_cx,
            self.metrics.canvas_cy
        );
        self.dirty();
    }

    pub fn set_display_size(&mut self, width: f32, height: f32) {
        self.config.display_width = width;
        self.config.display_height = height;
        self.set_canvas_scaling_method(self.config.scaling);
    }

    /// Convert a display-space point to virtual canvas (world) space.
    pub fn canvas_to_virtual(&self, x: f32, y: f32) -> Point {
        self.metrics.display_to_world(x, y)
    }

    /// Force every node of every scene to rebuild its transform.
    pub fn dirty(&mut self) {
        for scene in &mut self.scenes {
            scene.dirty();
        }
    }

    /// Topmost node under a world-space point. Only focused scenes are
    /// searched when any scene has focus; otherwise every visible scene that
    /// is not being removed, topmost first.
    pub fn find_hit_actor(&self, point: Point) -> Option<HitActor> {
        let focused = self.focus_scenes();
        let hit = |scene: &Scene| {
            scene.find_hit_actor(point).map(|node| HitActor {
                scene: scene.id(),
                node,
            })
        };
        if focused.is_empty() {
            self.scenes
                .iter()
                .rev()
                .filter(|scene| scene.is_visible() && !scene.is_destroyed())
                .find_map(hit)
        } else {
            focused
                .into_iter()
                .filter_map(|id| self.scene(id))
                .find_map(hit)
        }
    }

    // Global sub-systems

    pub fn timelines_mut(&mut self) -> &mut TimelineManager {
        &mut self.timelines
    }

    pub fn actions_mut(&mut self) -> &mut ActionsListManager {
        &mut self.actions
    }

    // Loop

    /// Leave the constructing state: wait for preloads if there are any,
    /// otherwise start running.
    pub fn begin(&mut self) {
        if self.state != AppState::Constructing {
            return;
        }
        let pending = self.count_resources_need_loading(true);
        self.load_tracker = LoadTracker::new(pending);
        if self.config.wait_for_resources && pending > 0 {
            log::info!("waiting for {} resource(s)", pending);
            self.state = AppState::WaitingForResources;
        } else {
            self.enter_running();
        }
    }

    fn enter_running(&mut self) {
        log::info!(
            "running ({} loaded, {} failed)",
            self.load_tracker.total_loaded,
            self.load_tracker.total_load_errors
        );
        self.state = AppState::Running;
        if let Some(mut callback) = self.on_ready.take() {
            callback(self);
        }
    }

    /// Run one logic tick of `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.begin();
        self.stats.record_logic_tick();
        self.process_events();

        if self.state == AppState::WaitingForResources {
            if !self.load_tracker.is_complete() {
                return;
            }
            self.enter_running();
        }

        let mut timelines = mem::take(&mut self.timelines);
        timelines.update(dt, self);
        timelines.append(&mut self.timelines);
        self.timelines = timelines;

        let mut actions = mem::take(&mut self.actions);
        actions.execute(dt, self);
        actions.append(&mut self.actions);
        self.actions = actions;

        for scene in &mut self.scenes {
            scene.update(dt);
        }

        self.cleanup_destroyed_scenes();

        for scene in &mut self.scenes {
            if scene.take_layer_changed() {
                self.order_changed = true;
            }
        }
        if mem::take(&mut self.order_changed) {
            self.scenes.sort_by_key(Scene::get_layer);
        }
    }

    fn process_events(&mut self) {
        for event in self.events.drain() {
            match event {
                AppEvent::TouchBegin { id, x, y } => {
                    let point = self.canvas_to_virtual(x, y);
                    self.route_input(|scene| scene.begin_touch_base(id, point));
                }
                AppEvent::TouchMove { id, x, y } => {
                    let point = self.canvas_to_virtual(x, y);
                    self.route_input(|scene| scene.move_touch_base(id, point));
                }
                AppEvent::TouchEnd { id, x, y } => {
                    let point = self.canvas_to_virtual(x, y);
                    self.route_input(|scene| scene.end_touch_base(id, point));
                }
                AppEvent::KeyDown { key } => self.route_input(|scene| scene.key_down_base(key)),
                AppEvent::KeyUp { key } => self.route_input(|scene| scene.key_up_base(key)),
                AppEvent::Resize { width, height } => self.set_display_size(width, height),
                AppEvent::ResourceLoaded { kind, name, result } => {
                    self.notify_resource_loaded(kind, &name, result)
                }
            }
        }
    }

    /// Deliver input to the focus scenes. Input is dropped until running.
    fn route_input(&mut self, mut deliver: impl FnMut(&mut Scene)) {
        if self.state != AppState::Running {
            return;
        }
        for id in self.focus_scenes() {
            if let Some(scene) = self.scene_mut(id) {
                deliver(scene);
            }
        }
    }

    /// Draw one frame: the loading screen while waiting for resources,
    /// otherwise every scene in order.
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        let now = Instant::now();
        self.stats.record_frame(now);

        if self.state == AppState::WaitingForResources {
            self.draw_loading_screen(surface);
        } else {
            if self.config.clear_canvas {
                surface.set_transform(&Transform2D::IDENTITY);
                surface.set_global_alpha(1.0);
                surface.clear(self.config.clear_color);
            }
            let metrics = self.metrics;
            for scene in &mut self.scenes {
                scene.draw(surface, &metrics);
            }
        }

        if self.config.debug {
            self.stats.log_if_due(now);
        }
    }

    fn draw_loading_screen(&self, surface: &mut dyn Surface) {
        let style = &self.config.loading_screen;
        let m = &self.metrics;

        surface.set_transform(&Transform2D::IDENTITY);
        surface.set_global_alpha(1.0);
        surface.clear(Some(style.background));
        if let Some(bitmap) = &style.background_bitmap {
            let screen = Rect::new(0.0, 0.0, m.display_width, m.display_height);
            surface.draw_image(bitmap, None, screen);
        }

        // Bar centered on the canvas, in world units
        surface.set_transform(&Transform2D::new(
            m.scale,
            0.0,
            0.0,
            m.scale,
            m.canvas_cx,
            m.canvas_cy,
        ));
        let bar = Rect::new(
            -style.bar_width * 0.5,
            -style.bar_height * 0.5,
            style.bar_width,
            style.bar_height,
        );
        surface.set_fill_style(style.bar_background);
        surface.draw_rect(bar, true);

        let progress = self.load_tracker.progress();
        if progress > 0.0 {
            surface.set_fill_style(style.bar_fill);
            surface.draw_rect(
                Rect::new(bar.x, bar.y, bar.width * progress, bar.height),
                true,
            );
        }
    }
}

fn compute_metrics(config: &AppConfig) -> CanvasMetrics {
    CanvasMetrics::compute(
        config.scaling,
        config.canvas_width,
        config.canvas_height,
        config.display_width,
        config.display_height,
    )
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyHost for App {
    fn property(&self, target: Target, property: Property) -> Option<f32> {
        match target {
            Target::Scene(id) | Target::SceneNode(id, _) => {
                self.scene(id)?.property(target, property)
            }
            Target::Node(_) => None,
        }
    }

    fn set_property(&mut self, target: Target, property: Property, value: f32) -> bool {
        match target {
            Target::Scene(id) | Target::SceneNode(id, _) => self
                .scene_mut(id)
                .is_some_and(|s| s.set_property(target, property, value)),
            Target::Node(_) => false,
        }
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("state", &self.state)
            .field("metrics", &self.metrics)
            .field("scenes", &self.scenes.len())
            .field("focus", &self.focus)
            .field("secondary_focus", &self.secondary_focus)
            .field("load_tracker", &self.load_tracker)
            .finish()
    }
}
