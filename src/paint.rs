//! Draw traversal over a scene's node forest.
//!
//! Each visible node composes its opacity and transform from its parent,
//! installs the resulting screen-space transform on the surface, draws its
//! shape and then its children in list order. Clip regions are pushed only
//! through [`ClipScope`] so every push is matched by exactly one pop.

use crate::geometry::Point;
use crate::node::{NodeFlags, ParentFrame};
use crate::surface::{ClipScope, Surface};
use crate::tree::{NodeId, Tree};

/// Per-scene values shared by every node of one draw pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    /// Screen-space position of the scene origin (scene position scaled,
    /// plus the canvas center offset)
    pub origin: Point,
    /// Scene camera in world units
    pub camera: Point,
    /// Canvas-to-display scale
    pub scale: f32,
    /// Scene opacity
    pub opacity: f32,
}

impl SceneFrame {
    /// Screen origin for a node, with the camera applied when it scrolls.
    fn origin_for(&self, camera_applies: bool) -> Point {
        if camera_applies {
            Point::new(
                self.origin.x - self.camera.x * self.scale,
                self.origin.y - self.camera.y * self.scale,
            )
        } else {
            self.origin
        }
    }
}

/// Draw every root of `tree` in paint order.
pub fn draw_tree(tree: &mut Tree, surface: &mut dyn Surface, frame: &SceneFrame) {
    let count = tree.roots().len();
    for i in 0..count {
        if let Some(&root) = tree.roots().get(i) {
            draw_node(tree, root, None, surface, frame);
        }
    }
}

/// Draw one node and its subtree.
pub fn draw_node(
    tree: &mut Tree,
    id: NodeId,
    parent: Option<&ParentFrame>,
    surface: &mut dyn Surface,
    frame: &SceneFrame,
) {
    let Some(node) = tree.get_mut(id) else {
        return;
    };
    if !node.is_visible() {
        return;
    }

    node.update_opacity(parent, frame.opacity);
    let changed = node.update_transform(parent);

    let origin = frame.origin_for(node.camera_applies());
    let screen = node.transform().to_screen(frame.scale, origin.x, origin.y);
    let alpha = node.accum_opacity();
    let bounds = node.bounds();
    let flags = node.get_flags();
    let own_frame = ParentFrame::of(node);

    if changed {
        tree.mark_children_dirty(id);
    }

    surface.set_transform(&screen);
    surface.set_global_alpha(alpha);

    let self_clip = flags.contains(NodeFlags::SELF_CLIP);
    let clip_children = flags.contains(NodeFlags::CLIP_CHILDREN);

    if self_clip {
        let mut clip = ClipScope::push(surface, bounds);
        draw_shape(tree, id, &mut *clip);
        if clip_children {
            draw_children(tree, id, &own_frame, &mut *clip, frame);
            return;
        }
    } else {
        draw_shape(tree, id, surface);
        if clip_children {
            let mut clip = ClipScope::push(surface, bounds);
            draw_children(tree, id, &own_frame, &mut *clip, frame);
            return;
        }
    }

    draw_children(tree, id, &own_frame, surface, frame);
}

fn draw_shape(tree: &Tree, id: NodeId, surface: &mut dyn Surface) {
    if let Some(node) = tree.get(id) {
        node.shape().draw(surface, node.bounds());
    }
}

fn draw_children(
    tree: &mut Tree,
    id: NodeId,
    own_frame: &ParentFrame,
    surface: &mut dyn Surface,
    frame: &SceneFrame,
) {
    let count = tree.children(id).len();
    for i in 0..count {
        if let Some(child) = tree.child_at(id, i) {
            draw_node(tree, child, Some(own_frame), surface, frame);
        }
    }
}
