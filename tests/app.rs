use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tableau::prelude::*;
use tableau::surface::DrawCommand;
use tableau::{AppState, HitActor, LoadError};

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn loaded(kind: ResourceKind, name: &str) -> AppEvent {
    AppEvent::ResourceLoaded {
        kind,
        name: name.to_string(),
        result: Ok(()),
    }
}

fn failed(kind: ResourceKind, name: &str) -> AppEvent {
    AppEvent::ResourceLoaded {
        kind,
        name: name.to_string(),
        result: Err(LoadError::new(kind, name, "not found")),
    }
}

#[test]
fn fit_best_uses_the_smaller_ratio() {
    let app = App::with_config(
        AppConfig::new()
            .canvas_size(800.0, 450.0)
            .display_size(1200.0, 900.0)
            .scaling(ScalingMethod::FitBest),
    );
    let m = app.metrics();
    assert!(approx_eq(m.scale, 1.5));
    assert!(approx_eq(m.canvas_cx, 600.0));
    assert!(approx_eq(m.canvas_cy, 450.0));

    let p = app.canvas_to_virtual(750.0, 450.0);
    assert!(approx_eq(p.x, 100.0));
    assert!(approx_eq(p.y, 0.0));
}

#[test]
fn changing_scaling_rebuilds_node_transforms() {
    let mut app = App::with_config(
        AppConfig::new()
            .canvas_size(800.0, 600.0)
            .display_size(1600.0, 1200.0),
    );
    let mut scene = Scene::new("main");
    scene.add_node(Node::new(RectShape::filled(Color::WHITE)).position(10.0, 0.0));
    app.add_scene(scene);
    app.update(0.0);

    let mut surface = RecordingSurface::new();
    app.draw(&mut surface);
    assert!(approx_eq(surface.transform_for_primitive(0).unwrap().tx, 820.0));

    app.set_canvas_scaling_method(ScalingMethod::None);
    assert!(approx_eq(app.metrics().scale, 1.0));
    surface.reset();
    app.draw(&mut surface);
    assert!(approx_eq(surface.transform_for_primitive(0).unwrap().tx, 410.0));
}

#[test]
fn loading_waits_for_every_preload_and_fires_ready_once() {
    init_logger();
    let ready = Rc::new(Cell::new(0));
    let ready_count = ready.clone();
    let mut app = App::new().on_ready(move |_| ready_count.set(ready_count.get() + 1));

    app.add_resource(Resource::new(ResourceKind::Bitmap, "hero", "hero.png"));
    app.add_resource(Resource::new(ResourceKind::Bitmap, "tiles", "tiles.png"));
    app.add_resource(Resource::new(ResourceKind::Sound, "jump", "jump.ogg"));
    app.add_resource(Resource::new(ResourceKind::Sound, "music", "music.ogg").lazy());
    let mut scene = Scene::new("level");
    scene
        .resources_mut()
        .add(Resource::new(ResourceKind::Font, "title", "title.ttf"));
    scene
        .resources_mut()
        .add(Resource::new(ResourceKind::Brush, "sky", "sky.json"));
    app.add_scene(scene);

    assert_eq!(app.count_resources_need_loading(false), 3);
    assert_eq!(app.count_resources_need_loading(true), 5);

    app.begin();
    assert_eq!(app.state(), AppState::WaitingForResources);
    assert_eq!(app.load_tracker().total_to_load, 5);

    let queue = app.event_queue();
    queue.push(loaded(ResourceKind::Bitmap, "hero"));
    queue.push(failed(ResourceKind::Bitmap, "tiles"));
    queue.push(loaded(ResourceKind::Sound, "jump"));
    app.update(0.016);
    assert_eq!(app.state(), AppState::WaitingForResources);
    assert_eq!(app.load_tracker().total_loaded, 3);
    assert_eq!(ready.get(), 0);

    queue.push(failed(ResourceKind::Font, "title"));
    queue.push(loaded(ResourceKind::Brush, "sky"));
    app.update(0.016);
    assert_eq!(app.state(), AppState::Running);
    assert_eq!(app.load_tracker().total_loaded, 5);
    assert_eq!(app.load_tracker().total_load_errors, 2);
    assert_eq!(ready.get(), 1);
    assert_eq!(app.count_resources_need_loading(true), 0);

    app.update(0.016);
    assert_eq!(ready.get(), 1);
}

#[test]
fn only_first_preload_reports_advance_loading() {
    init_logger();
    let ready = Rc::new(Cell::new(0));
    let ready_count = ready.clone();
    let mut app = App::new().on_ready(move |_| ready_count.set(ready_count.get() + 1));
    app.add_resource(Resource::new(ResourceKind::Bitmap, "a", "a.png"));
    app.add_resource(Resource::new(ResourceKind::Bitmap, "b", "b.png"));
    app.add_resource(Resource::new(ResourceKind::Sound, "music", "music.ogg").lazy());

    app.begin();
    assert_eq!(app.load_tracker().total_to_load, 2);

    let queue = app.event_queue();
    queue.push(loaded(ResourceKind::Sound, "music"));
    queue.push(loaded(ResourceKind::Bitmap, "nope"));
    queue.push(loaded(ResourceKind::Bitmap, "a"));
    queue.push(failed(ResourceKind::Bitmap, "a"));
    app.update(0.016);

    assert_eq!(app.state(), AppState::WaitingForResources);
    assert_eq!(app.load_tracker().total_loaded, 1);
    assert_eq!(app.load_tracker().total_load_errors, 0);
    assert_eq!(app.count_resources_need_loading(true), 1);
    assert_eq!(ready.get(), 0);

    queue.push(loaded(ResourceKind::Bitmap, "b"));
    app.update(0.016);
    assert_eq!(app.state(), AppState::Running);
    assert_eq!(app.load_tracker().total_loaded, 2);
    assert_eq!(ready.get(), 1);
}

#[test]
fn loading_screen_is_drawn_while_waiting() {
    let style = LoadingScreenStyle::new()
        .background(Color::BLACK)
        .bar_colors(Color::rgb(0.2, 0.2, 0.2), Color::WHITE)
        .bar_size(200.0, 10.0);
    let mut app = App::with_config(AppConfig::new().loading_screen(style));
    app.add_resource(Resource::new(ResourceKind::Bitmap, "a", "a.png"));
    app.add_resource(Resource::new(ResourceKind::Bitmap, "b", "b.png"));
    let mut scene = Scene::new("main");
    scene.add_node(Node::new(ArcShape::new(5.0)));
    app.add_scene(scene);
    app.begin();

    app.event_queue().push(loaded(ResourceKind::Bitmap, "a"));
    app.update(0.016);

    let mut surface = RecordingSurface::new();
    app.draw(&mut surface);

    assert!(surface
        .commands()
        .contains(&DrawCommand::Clear(Some(Color::BLACK))));
    // Scenes are not drawn yet: only the bar background and half the fill.
    let rects: Vec<_> = surface
        .primitives()
        .filter_map(|c| match c {
            DrawCommand::Rect { rect, .. } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(rects.len(), 2);
    assert_eq!(rects[0], Rect::new(-100.0, -5.0, 200.0, 10.0));
    assert!(approx_eq(rects[1].width, 100.0));
    assert!(!surface
        .primitives()
        .any(|c| matches!(c, DrawCommand::Arc { .. })));
}

#[test]
fn touches_are_routed_to_focus_scenes_in_world_space() {
    init_logger();
    let touched = Rc::new(RefCell::new(Vec::new()));
    let log = touched.clone();
    let mut scene = Scene::new("game").on_begin_touch(move |_, event| {
        log.borrow_mut().push((event.id, event.position, event.target));
    });
    let node = scene.add_node(Node::new(ArcShape::new(20.0)));
    let mut app = App::new();
    let id = app.add_scene(scene);
    app.update(0.0);

    // Not focused: input is ignored.
    app.event_queue().push(AppEvent::TouchBegin {
        id: 1,
        x: 400.0,
        y: 300.0,
    });
    app.update(0.016);
    assert!(touched.borrow().is_empty());

    app.set_focus(Some(id));
    app.event_queue().push(AppEvent::TouchBegin {
        id: 1,
        x: 400.0,
        y: 300.0,
    });
    app.event_queue().push(AppEvent::TouchBegin {
        id: 2,
        x: 700.0,
        y: 300.0,
    });
    app.update(0.016);

    let touched = touched.borrow();
    assert_eq!(touched.len(), 2);
    assert_eq!(touched[0], (1, Point::ZERO, Some(node)));
    assert_eq!(touched[1], (2, Point::new(300.0, 0.0), None));
}

#[test]
fn keys_reach_both_focus_scenes() {
    let presses = Rc::new(Cell::new(0));
    let mut app = App::new();
    let mut ids = Vec::new();
    for name in ["hud", "game"] {
        let count = presses.clone();
        ids.push(app.add_scene(
            Scene::new(name).on_key_down(move |_, key| {
                if key == Key::Space {
                    count.set(count.get() + 1);
                }
            }),
        ));
    }
    app.set_focus(Some(ids[0]));
    app.set_secondary_focus(Some(ids[1]));
    app.update(0.0);

    app.event_queue().push(AppEvent::KeyDown { key: Key::Space });
    app.update(0.016);
    assert_eq!(presses.get(), 2);
}

#[test]
fn scene_destroyed_during_update_is_removed_after_all_scenes_ran() {
    init_logger();
    let later_ticks = Rc::new(Cell::new(0));
    let ticks = later_ticks.clone();

    let mut app = App::new();
    let doomed = app.add_scene(Scene::new("doomed").on_tick(|scene, _| scene.destroy()));
    app.add_scene(Scene::new("later").on_tick(move |_, _| ticks.set(ticks.get() + 1)));
    app.set_focus(Some(doomed));
    app.update(0.016);

    assert_eq!(later_ticks.get(), 1);
    assert!(app.find_scene("doomed").is_none());
    assert!(app.scene(doomed).is_none());
    assert_eq!(app.scenes().len(), 1);
}

#[test]
fn removing_a_scene_defers_teardown_to_the_next_update() {
    let mut app = App::new();
    app.add_scene(Scene::new("menu"));
    app.update(0.0);

    assert!(app.remove_scene("menu"));
    assert!(app.find_scene("menu").is_some_and(Scene::is_destroyed));
    app.update(0.016);
    assert!(app.find_scene("menu").is_none());
}

#[test]
fn global_timeline_animates_a_scene_node() {
    let mut app = App::new();
    let mut scene = Scene::new("main");
    let node = scene.add_node(Node::group());
    let id = app.add_scene(scene);
    app.timelines_mut().add(
        Timeline::new("slide").animation(
            Animation::new(Target::SceneNode(id, node), Property::X)
                .keyframe(0.0, 0.0)
                .keyframe(1.0, 100.0),
        ),
    );

    app.update(0.5);
    let n = app.scene(id).and_then(|s| s.node(node)).unwrap();
    assert!(approx_eq(n.x(), 50.0));
    assert!(approx_eq(n.world_position().x, 50.0));

    app.update(0.6);
    assert!(app.timelines_mut().is_empty());
}

#[test]
fn global_actions_fade_a_scene() {
    let mut app = App::new();
    let id = app.add_scene(Scene::new("main"));
    app.actions_mut().add(
        ActionsList::new("fade")
            .then(Wait::new(0.1))
            .then(SetProperty::new(Target::Scene(id), Property::Opacity, 0.25)),
    );

    app.update(0.05);
    assert!(approx_eq(app.scene(id).unwrap().get_opacity(), 1.0));
    app.update(0.05);
    assert!(approx_eq(app.scene(id).unwrap().get_opacity(), 0.25));
}

#[test]
fn scenes_draw_in_layer_order_after_clear() {
    let mut app = App::with_config(AppConfig::new().clear_color(Color::BLACK));
    let mut top = Scene::new("top").layer(1);
    top.add_node(Node::new(RectShape::filled(Color::WHITE)).size(4.0, 4.0));
    let mut bottom = Scene::new("bottom");
    bottom.add_node(Node::new(ArcShape::new(2.0)));
    app.add_scene(top);
    app.add_scene(bottom);
    app.update(0.016);

    let mut surface = RecordingSurface::new();
    app.draw(&mut surface);

    assert_eq!(
        surface.commands().first(),
        Some(&DrawCommand::SetTransform(Transform2D::IDENTITY))
    );
    assert!(surface
        .commands()
        .contains(&DrawCommand::Clear(Some(Color::BLACK))));
    let primitives: Vec<_> = surface.primitives().collect();
    assert!(matches!(primitives[0], DrawCommand::Arc { .. }));
    assert!(matches!(primitives[1], DrawCommand::Rect { .. }));
    assert_eq!(app.frame_stats().frames(), 1);
}

#[test]
fn hit_search_is_limited_to_focus_scenes() {
    let mut app = App::new();
    let mut background = Scene::new("background");
    let back_node = background.add_node(Node::new(ArcShape::new(10.0)));
    let back = app.add_scene(background);
    let hud = app.add_scene(Scene::new("hud"));
    app.update(0.0);

    assert_eq!(
        app.find_hit_actor(Point::ZERO),
        Some(HitActor {
            scene: back,
            node: back_node
        })
    );

    app.set_focus(Some(hud));
    assert_eq!(app.find_hit_actor(Point::ZERO), None);
}

#[test]
fn resize_event_recomputes_metrics() {
    let mut app = App::with_config(AppConfig::new().canvas_size(800.0, 600.0));
    app.event_queue().push(AppEvent::Resize {
        width: 400.0,
        height: 300.0,
    });
    app.update(0.016);
    assert!(approx_eq(app.metrics().scale, 0.5));
    assert!(approx_eq(app.metrics().canvas_cx, 200.0));
}
