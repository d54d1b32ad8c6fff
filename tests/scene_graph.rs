use std::cell::Cell;
use std::rc::Rc;

use tableau::canvas::CanvasMetrics;
use tableau::prelude::*;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Unscaled 800x600 canvas, world origin at (400, 300).
fn metrics() -> CanvasMetrics {
    CanvasMetrics::compute(ScalingMethod::None, 800.0, 600.0, 800.0, 600.0)
}

fn square(size: f32) -> Node {
    Node::new(RectShape::filled(Color::WHITE)).size(size, size)
}

#[test]
fn clips_stay_balanced_for_every_flag_combination() {
    init_logger();
    let combos = [(false, false), (true, false), (false, true), (true, true)];

    let mut scene = Scene::new("clips");
    let mut expected_pushes = 0;
    for (self_clip, clip_children) in combos {
        let root = scene.add_node(square(100.0).self_clip(self_clip).clip_children(clip_children));
        if self_clip || clip_children {
            expected_pushes += 1;
        }
        // Every inner combination beneath every outer one.
        for (inner_self, inner_children) in combos {
            let child = scene
                .add_child(
                    root,
                    square(50.0).self_clip(inner_self).clip_children(inner_children),
                )
                .unwrap();
            if inner_self || inner_children {
                expected_pushes += 1;
            }
            scene.add_child(child, square(10.0).self_clip(true)).unwrap();
            expected_pushes += 1;
        }
    }
    // Hidden subtrees never touch the clip stack.
    let hidden = scene.add_node(square(10.0).self_clip(true).visible(false));
    scene.add_child(hidden, square(5.0).clip_children(true)).unwrap();

    let mut surface = RecordingSurface::new();
    scene.draw(&mut surface, &metrics());

    assert_eq!(surface.clip_pushes(), expected_pushes);
    assert_eq!(surface.clip_pops(), expected_pushes);
    assert_eq!(surface.clip_depth(), 0);
}

#[test]
fn deep_self_clipped_chain_nests_clips() {
    let mut scene = Scene::new("deep");
    let mut parent = scene.add_node(square(100.0).self_clip(true).clip_children(true));
    for _ in 0..9 {
        parent = scene
            .add_child(parent, square(100.0).self_clip(true).clip_children(true))
            .unwrap();
    }

    let mut surface = RecordingSurface::new();
    scene.draw(&mut surface, &metrics());

    assert_eq!(surface.max_clip_depth(), 10);
    assert_eq!(surface.clip_depth(), 0);
    assert_eq!(surface.clip_pushes(), surface.clip_pops());
}

#[test]
fn opacity_multiplies_down_the_chain() {
    let mut scene = Scene::new("fade");
    let a = scene.add_node(square(10.0).opacity(0.5));
    let b = scene.add_child(a, square(10.0).opacity(0.5)).unwrap();
    scene.add_child(b, square(10.0).opacity(0.8)).unwrap();

    let mut surface = RecordingSurface::new();
    scene.draw(&mut surface, &metrics());

    assert!(approx_eq(surface.alpha_for_primitive(0).unwrap(), 0.5));
    assert!(approx_eq(surface.alpha_for_primitive(1).unwrap(), 0.25));
    assert!(approx_eq(surface.alpha_for_primitive(2).unwrap(), 0.2));
}

#[test]
fn opacity_opt_out_restarts_from_scene() {
    let mut scene = Scene::new("fade");
    let a = scene.add_node(square(10.0).opacity(0.5));
    let b = scene
        .add_child(a, square(10.0).opacity(0.5).inherit_opacity(false))
        .unwrap();
    scene.add_child(b, square(10.0).opacity(0.8)).unwrap();

    let mut surface = RecordingSurface::new();
    scene.draw(&mut surface, &metrics());

    assert!(approx_eq(surface.alpha_for_primitive(1).unwrap(), 0.5));
    assert!(approx_eq(surface.alpha_for_primitive(2).unwrap(), 0.4));
}

#[test]
fn scene_opacity_scales_roots() {
    let mut scene = Scene::new("fade").opacity(0.5);
    scene.add_node(square(10.0).opacity(0.5));

    let mut surface = RecordingSurface::new();
    scene.draw(&mut surface, &metrics());

    assert!(approx_eq(surface.alpha_for_primitive(0).unwrap(), 0.25));
}

#[test]
fn children_win_hit_tests_over_parents() {
    let mut scene = Scene::new("hits");
    let parent = scene.add_node(Node::new(ArcShape::new(50.0)));
    let child = scene.add_child(parent, Node::new(ArcShape::new(10.0))).unwrap();
    scene.update(0.0);

    assert_eq!(scene.find_hit_actor(Point::ZERO), Some(child));
    // Outside the child, inside the parent.
    assert_eq!(scene.find_hit_actor(Point::new(30.0, 0.0)), Some(parent));
    assert_eq!(scene.find_hit_actor(Point::new(80.0, 0.0)), None);
}

#[test]
fn first_sibling_in_list_order_wins() {
    let mut scene = Scene::new("hits");
    let first = scene.add_node(Node::new(ArcShape::new(20.0)));
    scene.add_node(Node::new(ArcShape::new(20.0)));
    scene.update(0.0);

    assert_eq!(scene.find_hit_actor(Point::ZERO), Some(first));
}

#[test]
fn untouchable_parent_hides_its_subtree() {
    let mut scene = Scene::new("hits");
    let parent = scene.add_node(Node::new(ArcShape::new(50.0)).touchable(false));
    scene.add_child(parent, Node::new(ArcShape::new(10.0))).unwrap();
    scene.update(0.0);

    assert_eq!(scene.find_hit_actor(Point::ZERO), None);
}

#[test]
fn camera_applies_only_to_shallow_nodes() {
    let mut scene = Scene::new("camera").camera(100.0, 0.0);
    scene.add_node(square(10.0));
    scene.add_node(square(10.0).ignore_camera(true));
    scene.add_node(square(10.0).depth(2));

    let mut surface = RecordingSurface::new();
    scene.draw(&mut surface, &metrics());

    assert!(approx_eq(surface.transform_for_primitive(0).unwrap().tx, 300.0));
    assert!(approx_eq(surface.transform_for_primitive(1).unwrap().tx, 400.0));
    assert!(approx_eq(surface.transform_for_primitive(2).unwrap().tx, 400.0));
}

#[test]
fn camera_shifts_hit_tests_like_drawing() {
    let mut scene = Scene::new("camera").camera(100.0, 0.0);
    let node = scene.add_node(Node::new(ArcShape::new(10.0)).position(100.0, 0.0));
    scene.update(0.0);

    // Drawn at world x = 0 once the camera is subtracted.
    assert_eq!(scene.find_hit_actor(Point::ZERO), Some(node));
    assert_eq!(scene.find_hit_actor(Point::new(100.0, 0.0)), None);
}

#[test]
fn node_removed_from_tick_callback_survives_until_update_ends() {
    init_logger();
    let seen_during_tick = Rc::new(Cell::new(false));
    let seen = seen_during_tick.clone();
    let mut scene = Scene::new("removal").on_tick(move |scene, _| {
        if let Some(id) = scene.find_node("doomed") {
            assert!(scene.remove_node(id));
            seen.set(scene.node(id).is_some());
        }
    });
    let parent = scene.add_node(Node::group().named("doomed"));
    let child = scene.add_child(parent, Node::group()).unwrap();

    scene.update(0.016);

    assert!(seen_during_tick.get());
    assert!(scene.node(parent).is_none());
    assert!(scene.node(child).is_none());
    assert!(scene.roots().is_empty());
}

#[test]
fn moving_a_parent_moves_drawn_children() {
    let mut scene = Scene::new("move");
    let parent = scene.add_node(Node::group());
    scene.add_child(parent, square(10.0).position(10.0, 0.0)).unwrap();

    let mut surface = RecordingSurface::new();
    scene.draw(&mut surface, &metrics());
    assert!(approx_eq(surface.transform_for_primitive(0).unwrap().tx, 410.0));

    scene.node_mut(parent).unwrap().set_position(50.0, 0.0);
    surface.reset();
    scene.draw(&mut surface, &metrics());
    assert!(approx_eq(surface.transform_for_primitive(0).unwrap().tx, 460.0));
}
