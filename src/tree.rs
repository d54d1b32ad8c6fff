//! Arena storage for one scene's node forest.
//!
//! Nodes live in a dense `Vec` for cache-friendly traversal, addressed through
//! a sparse map of generational [`NodeId`]s. Parent/child links are kept next
//! to each node in the arena, so nodes never reference each other directly
//! and removing a subtree cannot leave a cycle behind.
//!
//! ## Key Features
//!
//! - **Generational Indices**: a `NodeId` whose slot was freed and reused is
//!   rejected instead of silently addressing the new node.
//!
//! - **Swap-Remove**: O(1) removal without holes in dense storage.
//!
//! - **Ordered Children**: every sibling list (and the root list) keeps paint
//!   order. Layer changes flag the list and it is re-sorted once per update by
//!   [`Tree::sort_layers`].

use std::mem;

use crate::node::{Node, ParentFrame};

/// Stable handle to a node inside a [`Tree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Combine generation (high bits) and index (low bits) for external use.
    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

/// Entry in the sparse map. The generation survives while the slot is free
/// so the next allocation can bump it.
struct SparseEntry {
    dense_index: Option<usize>,
    generation: u32,
}

struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Children need a layer re-sort
    order_changed: bool,
    /// Back-pointer to the sparse entry (for swap-remove fixup)
    sparse_index: u32,
}

#[derive(Default)]
pub struct Tree {
    dense: Vec<Slot>,
    sparse: Vec<SparseEntry>,
    free_indices: Vec<u32>,
    roots: Vec<NodeId>,
    roots_order_changed: bool,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a detached node. It is neither drawn nor hit tested until it is
    /// attached as a root or under a parent.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let dense_index = self.dense.len();
        let (sparse_index, generation) = match self.free_indices.pop() {
            Some(idx) => {
                let entry = &mut self.sparse[idx as usize];
                entry.generation = entry.generation.wrapping_add(1);
                entry.dense_index = Some(dense_index);
                (idx, entry.generation)
            }
            None => {
                let idx = self.sparse.len() as u32;
                self.sparse.push(SparseEntry {
                    dense_index: Some(dense_index),
                    generation: 0,
                });
                (idx, 0)
            }
        };

        self.dense.push(Slot {
            node,
            parent: None,
            children: Vec::new(),
            order_changed: false,
            sparse_index,
        });

        let id = NodeId::new(sparse_index, generation);
        log::trace!("inserted node {:?}", id);
        id
    }

    /// Insert a node and append it to the root list.
    pub fn insert_root(&mut self, node: Node) -> NodeId {
        let id = self.insert(node);
        self.attach(id, None);
        id
    }

    /// Insert a node as the last child of `parent`. Returns `None` (and drops
    /// the node) when the parent doesn't exist.
    pub fn insert_child(&mut self, parent: NodeId, node: Node) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        let id = self.insert(node);
        self.attach(id, Some(parent));
        Some(id)
    }

    fn dense_index(&self, id: NodeId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.dense_index)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.dense_index(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.dense_index(id).map(|idx| &self.dense[idx].node)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.dense_index(id).map(move |idx| &mut self.dense[idx].node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.dense_index(id).and_then(|idx| self.dense[idx].parent)
    }

    /// Children in paint order. Empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.dense_index(id) {
            Some(idx) => &self.dense[idx].children,
            None => &[],
        }
    }

    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Root nodes in paint order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.roots.contains(&id)
    }

    /// True when `ancestor` is `id` or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Move `child` to the end of `parent`'s children, or of the root list
    /// when `parent` is `None`.
    ///
    /// Returns `false` without changing anything when either node is missing
    /// or when `parent` lies inside `child`'s own subtree.
    pub fn attach(&mut self, child: NodeId, parent: Option<NodeId>) -> bool {
        if !self.contains(child) {
            return false;
        }
        if let Some(parent) = parent {
            if !self.contains(parent) || self.is_ancestor_or_self(child, parent) {
                log::trace!("rejected attaching {:?} under {:?}", child, parent);
                return false;
            }
        }

        self.detach(child);

        match parent {
            Some(parent) => {
                if let Some(idx) = self.dense_index(parent) {
                    self.dense[idx].children.push(child);
                    self.dense[idx].order_changed = true;
                }
            }
            None => {
                self.roots.push(child);
                self.roots_order_changed = true;
            }
        }
        if let Some(idx) = self.dense_index(child) {
            self.dense[idx].parent = parent;
            self.dense[idx].node.mark_dirty();
        }
        true
    }

    /// Unlink a node from its parent or from the root list. The node and its
    /// subtree stay in the arena. Returns `false` if the node was not linked.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(idx) = self.dense_index(id) else {
            return false;
        };
        match self.dense[idx].parent.take() {
            Some(parent) => {
                if let Some(parent_idx) = self.dense_index(parent) {
                    self.dense[parent_idx].children.retain(|&c| c != id);
                }
                true
            }
            None => {
                let before = self.roots.len();
                self.roots.retain(|&r| r != id);
                before != self.roots.len()
            }
        }
    }

    /// Ids of `id` and all its descendants, parents before children.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Remove a node together with its whole subtree, releasing every shape.
    /// Returns the number of nodes removed (0 for unknown ids).
    pub fn remove(&mut self, id: NodeId) -> usize {
        if !self.contains(id) {
            return 0;
        }
        self.detach(id);
        let doomed = self.subtree(id);
        for &node in &doomed {
            self.unregister(node);
        }
        log::trace!("removed {} node(s) starting at {:?}", doomed.len(), id);
        doomed.len()
    }

    fn unregister(&mut self, id: NodeId) {
        let Some(dense_index) = self.dense_index(id) else {
            return;
        };
        let mut removed = self.dense.swap_remove(dense_index);

        // Fix up the moved slot's sparse entry
        if dense_index < self.dense.len() {
            let moved = self.dense[dense_index].sparse_index;
            self.sparse[moved as usize].dense_index = Some(dense_index);
        }

        self.sparse[id.index as usize].dense_index = None;
        self.free_indices.push(id.index);
        removed.node.release();
    }

    /// Depth-first search from the roots for the first node with `name`.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.get(id).is_some_and(|n| n.name() == name) {
                return Some(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        None
    }

    /// Force every node to rebuild its transform on the next traversal.
    pub fn mark_all_dirty(&mut self) {
        for slot in &mut self.dense {
            slot.node.mark_dirty();
        }
    }

    /// Mark the direct children of `id` dirty after its transform changed.
    pub(crate) fn mark_children_dirty(&mut self, id: NodeId) {
        let Some(idx) = self.dense_index(id) else {
            return;
        };
        for i in 0..self.dense[idx].children.len() {
            let child = self.dense[idx].children[i];
            if let Some(child_idx) = self.dense_index(child) {
                self.dense[child_idx].node.mark_dirty();
            }
        }
    }

    /// Rebuild dirty transforms from the roots down without drawing.
    pub fn update_transforms(&mut self) {
        for i in 0..self.roots.len() {
            let root = self.roots[i];
            self.update_transform_recursive(root, None);
        }
    }

    fn update_transform_recursive(&mut self, id: NodeId, parent: Option<ParentFrame>) {
        let (changed, frame) = {
            let Some(node) = self.get_mut(id) else {
                return;
            };
            let changed = node.update_transform(parent.as_ref());
            (changed, ParentFrame::of(node))
        };
        if changed {
            self.mark_children_dirty(id);
        }
        let count = self.children(id).len();
        for i in 0..count {
            if let Some(child) = self.child_at(id, i) {
                self.update_transform_recursive(child, Some(frame));
            }
        }
    }

    /// Re-sort every sibling list whose members changed layer since the last
    /// call. The sort is stable, so equal layers keep insertion order.
    /// Returns `true` if any list was sorted.
    pub fn sort_layers(&mut self) -> bool {
        let flagged: Vec<Option<NodeId>> = self
            .dense
            .iter_mut()
            .filter_map(|slot| slot.node.take_layer_changed().then_some(slot.parent))
            .collect();
        for parent in flagged {
            match parent.and_then(|p| self.dense_index(p)) {
                Some(idx) => self.dense[idx].order_changed = true,
                None => self.roots_order_changed = true,
            }
        }

        let mut sorted = false;
        if mem::take(&mut self.roots_order_changed) {
            let mut roots = mem::take(&mut self.roots);
            self.sort_by_layer(&mut roots);
            self.roots = roots;
            sorted = true;
        }
        for idx in 0..self.dense.len() {
            if mem::take(&mut self.dense[idx].order_changed) {
                let mut children = mem::take(&mut self.dense[idx].children);
                self.sort_by_layer(&mut children);
                self.dense[idx].children = children;
                sorted = true;
            }
        }
        sorted
    }

    fn sort_by_layer(&self, ids: &mut [NodeId]) {
        ids.sort_by_key(|&id| self.get(id).map_or(0, |n| n.get_layer()));
    }

    /// Ids of every node reachable from the roots, in paint order. Detached
    /// subtrees are left out.
    pub fn linked(&self) -> Vec<NodeId> {
        self.roots.iter().flat_map(|&root| self.subtree(root)).collect()
    }

    /// Remove every node.
    pub fn clear(&mut self) {
        for slot in &mut self.dense {
            slot.node.release();
        }
        self.dense.clear();
        self.roots.clear();
        self.roots_order_changed = false;
        // Keep generations so ids from before the clear stay stale.
        for (index, entry) in self.sparse.iter_mut().enumerate() {
            if entry.dense_index.take().is_some() {
                self.free_indices.push(index as u32);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.dense.len())
            .field("roots", &self.roots)
            .finish()
    }
}
