// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, ordering, updates, queries.

use alloc::vec::Vec;

use kurbo::Vec2;
use smallvec::SmallVec;
use tracing::{debug, warn};
use understory_style::{InteractionState, StyleMap, StyleValue};

use crate::config::TreeConfig;
use crate::damage::Damage;
use crate::entity::{Entity, EntityKind};
use crate::error::TreeError;
use crate::types::{Anchor, EntityFlags, Layout, NodeId, SizeSpec};

/// Snapshot of a child list, small enough to live on the stack for typical fan-out.
pub type ChildList = SmallVec<[NodeId; 8]>;

/// Retained entity tree.
///
/// Nodes live in a generational arena and are created detached with [`Tree::insert`]. They
/// become part of a hierarchy through [`Tree::attach`], and geometry is computed lazily by
/// [`Tree::resolve`]: a node recomputes only when it was marked dirty or its parent's
/// geometry version moved on since the node last looked.
///
/// ## Example
///
/// ```rust
/// use kurbo::Rect;
/// use understory_entity_tree::{Anchor, Context, Entity, SizeSpec, Tree};
///
/// let mut tree = Tree::new();
/// let root = tree.insert(Entity::new(()).with_size(SizeSpec::FILL));
/// let a = tree.insert(Entity::new(()).with_size(SizeSpec::new(1.0, 100.0)));
/// let b = tree.insert(Entity::new(()).with_size(SizeSpec::new(1.0, 100.0)));
/// tree.attach(root, a, None).unwrap();
/// tree.attach(root, b, None).unwrap();
///
/// let cx = Context::new(Rect::new(0.0, 0.0, 400.0, 300.0));
/// assert_eq!(tree.resolve(b, &cx).unwrap().outer, Rect::new(0.0, 100.0, 400.0, 200.0));
/// ```
pub struct Tree<K = ()> {
    /// slots
    nodes: Vec<Option<Node<K>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    config: TreeConfig,
    pub(crate) damage: Damage,
}

impl<K> core::fmt::Debug for Tree<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<K> Default for Tree<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometry cache of one node.
#[derive(Clone, Debug, Default)]
pub(crate) struct Cache {
    pub(crate) layout: Layout,
    /// Bumped on every recompute.
    pub(crate) version: u64,
    pub(crate) dirty: bool,
    /// Parent (or context) version seen at the last recompute.
    pub(crate) observed_parent: Option<u64>,
    /// Previous visible sibling and its version, for auto-flow anchors.
    pub(crate) observed_flow: Option<(NodeId, u64)>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Drag {
    pub(crate) offset: Vec2,
    /// Anchor position relative to the parent's inner origin, captured on first layout.
    pub(crate) baseline: Option<Vec2>,
}

#[derive(Clone, Debug)]
pub(crate) struct Node<K> {
    generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Position in the parent's child list.
    pub(crate) index: usize,
    pub(crate) entity: Entity<K>,
    pub(crate) state: InteractionState,
    pub(crate) cache: Cache,
    pub(crate) drag: Drag,
    /// Children ordered by priority; `None` when stale.
    sorted: Option<ChildList>,
}

impl<K> Node<K> {
    fn new(generation: u32, entity: Entity<K>) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            index: 0,
            entity,
            state: InteractionState::Default,
            cache: Cache {
                dirty: true,
                ..Cache::default()
            },
            drag: Drag::default(),
            sorted: None,
        }
    }
}

impl<K> Tree<K> {
    /// Create an empty tree in strict mode.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Create an empty tree with a specific configuration.
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            config,
            damage: Damage::default(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> TreeConfig {
        self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: TreeConfig) {
        self.config = config;
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node<K> {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    pub(crate) fn node_opt(&self, id: NodeId) -> Option<&Node<K>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node<K>> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Report a structural violation according to the tolerance policy.
    fn violation(&self, err: TreeError) -> Result<bool, TreeError> {
        if self.config.tolerant {
            warn!(error = %err, "ignoring structural violation in tolerant mode");
            Ok(false)
        } else {
            Err(err)
        }
    }

    /// Take the damage accumulated since the last call.
    ///
    /// Layout recomputes that move or resize a node, state changes, visibility changes, and
    /// removals all contribute rectangles. Regions may overlap.
    pub fn take_damage(&mut self) -> Damage {
        core::mem::take(&mut self.damage)
    }

    /// Detach a node from its parent and attach it to `parent` at `index`.
    ///
    /// Unlike [`Tree::attach`] this never treats an existing parent as a violation.
    fn relink(&mut self, id: NodeId, parent: NodeId, index: Option<usize>) -> Result<bool, TreeError> {
        if let Some(old) = self.node(id).parent {
            self.detach(old, id)?;
        }
        self.attach(parent, id, index)
    }

    /// Attach a detached `child` under `parent` at `index` (append when `None`).
    ///
    /// Later siblings are reindexed, both nodes are marked dirty, and the parent's sorted view
    /// is invalidated. Attaching a node that already has a parent, or under its own
    /// descendant, is a structural violation.
    pub fn attach(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> Result<bool, TreeError> {
        if !self.is_alive(parent) {
            return self.violation(TreeError::StaleNode(parent));
        }
        if !self.is_alive(child) {
            return self.violation(TreeError::StaleNode(child));
        }
        if let Some(current) = self.node(child).parent {
            return self.violation(TreeError::AlreadyAttached {
                child,
                parent: current,
            });
        }
        let mut cursor = Some(parent);
        while let Some(a) = cursor {
            if a == child {
                return self.violation(TreeError::WouldCycle { child, parent });
            }
            cursor = self.node(a).parent;
        }
        let len = self.node(parent).children.len();
        let index = index.unwrap_or(len);
        if index > len {
            return self.violation(TreeError::IndexOutOfRange { index, len });
        }

        let p = self.node_mut(parent);
        p.children.insert(index, child);
        p.cache.dirty = true;
        p.sorted = None;
        self.reindex(parent, index);

        let c = self.node_mut(child);
        c.parent = Some(parent);
        c.cache.dirty = true;
        c.cache.observed_parent = None;
        c.cache.observed_flow = None;
        debug!(parent = %parent, child = %child, index, "attached");
        Ok(true)
    }

    /// Detach `child` from `parent`.
    ///
    /// Fails with [`TreeError::WrongParent`] when `parent` is not the child's parent. The
    /// remaining siblings are reindexed and both nodes are marked dirty. The child stays
    /// alive and can be attached again.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) -> Result<bool, TreeError> {
        if !self.is_alive(parent) {
            return self.violation(TreeError::StaleNode(parent));
        }
        if !self.is_alive(child) {
            return self.violation(TreeError::StaleNode(child));
        }
        let actual = self.node(child).parent;
        if actual != Some(parent) {
            return self.violation(TreeError::WrongParent {
                child,
                expected: parent,
                actual,
            });
        }

        let index = self.node(child).index;
        let p = self.node_mut(parent);
        let removed = if p.children.get(index) == Some(&child) {
            p.children.remove(index);
            index
        } else {
            // Index drifted; fall back to a scan rather than corrupting the list.
            let pos = p
                .children
                .iter()
                .position(|&c| c == child)
                .expect("child listed under its parent");
            p.children.remove(pos);
            pos
        };
        p.cache.dirty = true;
        p.sorted = None;
        self.reindex(parent, removed);

        let c = self.node_mut(child);
        c.parent = None;
        c.index = 0;
        c.cache.dirty = true;
        c.cache.observed_parent = None;
        c.cache.observed_flow = None;
        let outer = c.cache.layout.outer;
        self.damage.push(outer);
        debug!(parent = %parent, child = %child, "detached");
        Ok(true)
    }

    fn reindex(&mut self, parent: NodeId, from: usize) {
        let len = self.node(parent).children.len();
        for i in from..len {
            let c = self.node(parent).children[i];
            self.node_mut(c).index = i;
        }
    }

    /// Re-attach a node as the last child of its parent so it draws and is targeted above
    /// its siblings. Returns `Ok(false)` for parentless nodes.
    pub fn bring_to_front(&mut self, id: NodeId) -> Result<bool, TreeError> {
        let Some(parent) = self.parent_of(id) else {
            return Ok(false);
        };
        self.relink(id, parent, None)
    }

    /// Re-attach a node as the first child of its parent. Returns `Ok(false)` for parentless
    /// nodes.
    pub fn send_to_back(&mut self, id: NodeId) -> Result<bool, TreeError> {
        let Some(parent) = self.parent_of(id) else {
            return Ok(false);
        };
        self.relink(id, parent, Some(0))
    }

    /// Remove a node and its subtree from the tree.
    ///
    /// The identifiers become stale immediately. Returns `false` if `id` was already stale.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        if let Some(parent) = self.node(id).parent {
            // Cannot fail: the parent link was just read from the node.
            let _ = self.detach(parent, id);
        }
        let mut stack = alloc::vec![id];
        while let Some(n) = stack.pop() {
            let node = self.nodes[n.idx()].take().expect("dangling NodeId");
            self.damage.push(node.cache.layout.outer);
            stack.extend(node.children.iter().copied());
            self.free_list.push(n.idx());
        }
        debug!(node = %id, "removed subtree");
        true
    }

    /// Returns the parent of a node if live, or `None` for parentless or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a node in attachment order, or an empty slice if the node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Position of a node within its parent's child list.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let n = self.node_opt(id)?;
        n.parent.map(|_| n.index)
    }

    /// The full local description of a live node.
    pub fn entity(&self, id: NodeId) -> Option<&Entity<K>> {
        self.node_opt(id).map(|n| &n.entity)
    }

    /// The kind of a live node.
    pub fn kind(&self, id: NodeId) -> Option<&K> {
        self.node_opt(id).map(|n| &n.entity.kind)
    }

    /// Mutable access to a node's kind.
    ///
    /// Kind data can change the node's default size and priority bonus, so this marks the
    /// node dirty and invalidates its parent's sorted view.
    pub fn kind_mut(&mut self, id: NodeId) -> Option<&mut K> {
        let parent = self.node_opt(id)?.parent;
        if let Some(p) = parent {
            self.node_mut(p).sorted = None;
        }
        let n = self.node_mut(id);
        n.cache.dirty = true;
        Some(&mut n.entity.kind)
    }

    /// Flags of a live node.
    pub fn flags(&self, id: NodeId) -> Option<EntityFlags> {
        self.node_opt(id).map(|n| n.entity.flags)
    }

    /// Lookup key of a live node.
    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.node_opt(id).and_then(|n| n.entity.key.as_deref())
    }

    /// Current interaction state of a live node.
    pub fn state(&self, id: NodeId) -> Option<InteractionState> {
        self.node_opt(id).map(|n| n.state)
    }

    /// Geometry version of a live node. Advances on every recompute.
    pub fn version(&self, id: NodeId) -> Option<u64> {
        self.node_opt(id).map(|n| n.cache.version)
    }

    /// Whether the node's own dirty flag is set.
    pub fn is_dirty(&self, id: NodeId) -> Option<bool> {
        self.node_opt(id).map(|n| n.cache.dirty)
    }

    /// Rectangles as of the node's last recompute, without refreshing them.
    ///
    /// Use [`Tree::resolve`] for current values.
    pub fn cached_layout(&self, id: NodeId) -> Option<Layout> {
        self.node_opt(id).map(|n| n.cache.layout)
    }

    /// Accumulated drag offset of a live node.
    pub fn drag_offset(&self, id: NodeId) -> Option<Vec2> {
        self.node_opt(id).map(|n| n.drag.offset)
    }

    /// Merged style map (kind stylesheet plus instance overrides) of a live node.
    pub fn style(&self, id: NodeId) -> Option<&StyleMap> {
        self.node_opt(id).map(|n| &n.entity.style)
    }

    /// Read a style property for the node's current state.
    ///
    /// Falls back to the default state. A property missing from both is a structural
    /// violation: an error in strict mode, `Ok(None)` in tolerant mode.
    pub fn get_style(&self, id: NodeId, name: &str) -> Result<Option<StyleValue>, TreeError> {
        let Some(n) = self.node_opt(id) else {
            return self.violation(TreeError::StaleNode(id)).map(|_| None);
        };
        match n.entity.style.get(name, n.state) {
            Some(v) => Ok(Some(*v)),
            None => self
                .violation(TreeError::MissingStyle {
                    node: id,
                    name: name.into(),
                    state: n.state,
                })
                .map(|_| None),
        }
    }

    /// Update the requested size.
    pub fn set_size(&mut self, id: NodeId, size: SizeSpec) {
        if let Some(n) = self.node_opt_mut(id)
            && n.entity.size != size
        {
            n.entity.size = size;
            n.cache.dirty = true;
        }
    }

    /// Update the anchor.
    pub fn set_anchor(&mut self, id: NodeId, anchor: Anchor) {
        if let Some(n) = self.node_opt_mut(id)
            && n.entity.anchor != anchor
        {
            n.entity.anchor = anchor;
            n.cache.dirty = true;
        }
    }

    /// Update the anchor offset.
    pub fn set_offset(&mut self, id: NodeId, offset: Vec2) {
        if let Some(n) = self.node_opt_mut(id)
            && n.entity.offset != offset
        {
            n.entity.offset = offset;
            n.cache.dirty = true;
        }
    }

    /// Update the lower size clamp.
    pub fn set_min_size(&mut self, id: NodeId, min: Option<SizeSpec>) {
        if let Some(n) = self.node_opt_mut(id)
            && n.entity.min_size != min
        {
            n.entity.min_size = min;
            n.cache.dirty = true;
        }
    }

    /// Update the upper size clamp.
    pub fn set_max_size(&mut self, id: NodeId, max: Option<SizeSpec>) {
        if let Some(n) = self.node_opt_mut(id)
            && n.entity.max_size != max
        {
            n.entity.max_size = max;
            n.cache.dirty = true;
        }
    }

    /// Update node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: EntityFlags) {
        if let Some(n) = self.node_opt_mut(id)
            && n.entity.flags != flags
        {
            let was_visible = n.entity.flags.contains(EntityFlags::VISIBLE);
            n.entity.flags = flags;
            n.cache.dirty = true;
            if was_visible != flags.contains(EntityFlags::VISIBLE) {
                let outer = n.cache.layout.outer;
                self.damage.push(outer);
            }
        }
    }

    /// Set or clear a subset of flags.
    pub fn set_flag(&mut self, id: NodeId, flag: EntityFlags, on: bool) {
        if let Some(mut flags) = self.flags(id) {
            flags.set(flag, on);
            self.set_flags(id, flags);
        }
    }

    /// Update the instance priority bonus.
    pub fn set_priority_bonus(&mut self, id: NodeId, bonus: i32) {
        let Some(n) = self.node_opt_mut(id) else {
            return;
        };
        if n.entity.priority_bonus == bonus {
            return;
        }
        n.entity.priority_bonus = bonus;
        if let Some(p) = n.parent {
            self.node_mut(p).sorted = None;
        }
    }

    /// Set an instance style override.
    pub fn set_style(
        &mut self,
        id: NodeId,
        state: InteractionState,
        name: impl Into<alloc::borrow::Cow<'static, str>>,
        value: impl Into<StyleValue>,
    ) {
        if let Some(n) = self.node_opt_mut(id) {
            n.entity.style.set(state, name, value);
            n.cache.dirty = true;
            let outer = n.cache.layout.outer;
            self.damage.push(outer);
        }
    }

    /// Update the interaction state. Returns whether it changed.
    ///
    /// State-dependent style (padding in particular) may change the inner rectangle, so a
    /// change marks the node dirty.
    pub fn set_state(&mut self, id: NodeId, state: InteractionState) -> bool {
        let Some(n) = self.node_opt_mut(id) else {
            return false;
        };
        if n.state == state {
            return false;
        }
        n.state = state;
        n.cache.dirty = true;
        let outer = n.cache.layout.outer;
        self.damage.push(outer);
        true
    }

    /// Add to the accumulated drag offset.
    pub fn drag_by(&mut self, id: NodeId, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.drag.offset += delta;
            n.cache.dirty = true;
        }
    }

    /// Forget the drag offset and baseline so the node returns to its anchored position.
    pub fn reset_drag(&mut self, id: NodeId) {
        if let Some(n) = self.node_opt_mut(id) {
            n.drag = Drag::default();
            n.cache.dirty = true;
        }
    }

    /// Mark a node dirty. Descendants notice lazily through the version check.
    pub fn mark_dirty(&mut self, id: NodeId) {
        if let Some(n) = self.node_opt_mut(id) {
            n.cache.dirty = true;
        }
    }

    /// Find the first node in `root`'s subtree (including `root`) with the given key.
    pub fn find_by_key(&self, root: NodeId, key: &str) -> Option<NodeId> {
        self.depth_first(root).find(|&id| self.key(id) == Some(key))
    }

    /// Iterate `root` and its descendants in tree (attachment) order, depth first.
    pub fn depth_first(&self, root: NodeId) -> DepthFirst<'_, K> {
        DepthFirst {
            tree: self,
            root,
            next: self.is_alive(root).then_some(root),
        }
    }

    /// Next node in tree order (pre-order, attachment order), crossing subtree boundaries.
    ///
    /// Returns `None` after the last node of the hierarchy `current` belongs to, or for a
    /// stale id.
    pub fn next_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }
        self.next_in_order(current, None)
    }

    fn next_in_order(&self, current: NodeId, root: Option<NodeId>) -> Option<NodeId> {
        if let Some(&first_child) = self.node(current).children.first() {
            return Some(first_child);
        }

        let mut node = current;
        while Some(node) != root {
            let n = self.node(node);
            let parent = n.parent?;
            if let Some(&next_sibling) = self.node(parent).children.get(n.index + 1) {
                return Some(next_sibling);
            }
            node = parent;
        }
        None
    }

    /// Previous visible sibling in tree order, skipping invisible ones.
    pub(crate) fn prev_visible_sibling(&self, id: NodeId) -> Option<NodeId> {
        let n = self.node(id);
        let parent = n.parent?;
        self.node(parent).children[..n.index]
            .iter()
            .rev()
            .copied()
            .find(|&s| self.node(s).entity.flags.contains(EntityFlags::VISIBLE))
    }
}

impl<K: EntityKind> Tree<K> {
    /// Insert a new detached node.
    ///
    /// The kind's stylesheet is merged beneath the entity's instance style. The node has no
    /// parent until [`Tree::attach`] is called; resolving it before then places it in the
    /// viewport like a root.
    pub fn insert(&mut self, entity: Entity<K>) -> NodeId {
        let mut entity = entity;
        let sheet = entity.kind.default_style();
        entity.style.merge_under(&sheet);

        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, entity));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, entity)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Insert a node and attach it as the last child of `parent`.
    pub fn insert_child(&mut self, parent: NodeId, entity: Entity<K>) -> Result<NodeId, TreeError> {
        let id = self.insert(entity);
        match self.attach(parent, id, None) {
            Ok(true) => Ok(id),
            Ok(false) => {
                self.remove(id);
                Err(TreeError::StaleNode(parent))
            }
            Err(e) => {
                self.remove(id);
                Err(e)
            }
        }
    }

    /// Children ordered by ascending priority (attachment index plus bonuses).
    ///
    /// This is draw order; input targeting walks it in reverse. The view is cached until the
    /// child list or a bonus changes.
    pub fn sorted_children(&mut self, id: NodeId) -> &[NodeId] {
        if !self.is_alive(id) {
            return &[];
        }
        if self.node(id).sorted.is_none() {
            let sorted = self.compute_sorted(id);
            self.node_mut(id).sorted = Some(sorted);
        }
        self.node(id).sorted.as_deref().unwrap_or(&[])
    }

    /// Owned copy of the sorted view, safe to iterate while mutating the tree.
    pub fn sorted_snapshot(&mut self, id: NodeId) -> ChildList {
        ChildList::from_slice(self.sorted_children(id))
    }

    fn compute_sorted(&self, id: NodeId) -> ChildList {
        let mut keyed: SmallVec<[(i64, NodeId); 8]> = self
            .node(id)
            .children
            .iter()
            .map(|&c| {
                let n = self.node(c);
                let index = i64::try_from(n.index).unwrap_or(i64::MAX);
                let bonus = i64::from(n.entity.priority_bonus)
                    + i64::from(n.entity.kind.priority_bonus());
                (index + bonus, c)
            })
            .collect();
        // Stable: equal keys keep attachment order.
        keyed.sort_by_key(|&(key, _)| key);
        keyed.into_iter().map(|(_, c)| c).collect()
    }
}

/// Depth-first iterator over a subtree; see [`Tree::depth_first`].
#[derive(Debug)]
pub struct DepthFirst<'a, K> {
    tree: &'a Tree<K>,
    root: NodeId,
    next: Option<NodeId>,
}

impl<K> Iterator for DepthFirst<'_, K> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.next_in_order(current, Some(self.root));
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use understory_style::props;

    fn plain() -> Entity<()> {
        Entity::new(())
    }

    fn tree_with_children(n: usize) -> (Tree, NodeId, Vec<NodeId>) {
        let mut tree = Tree::new();
        let root = tree.insert(plain());
        let kids = (0..n)
            .map(|_| tree.insert_child(root, plain()).unwrap())
            .collect();
        (tree, root, kids)
    }

    #[test]
    fn attach_reindexes_later_siblings() {
        let (mut tree, root, kids) = tree_with_children(3);
        let x = tree.insert(plain());
        tree.attach(root, x, Some(1)).unwrap();

        assert_eq!(tree.children_of(root), &[kids[0], x, kids[1], kids[2]]);
        assert_eq!(tree.index_of(x), Some(1));
        assert_eq!(tree.index_of(kids[2]), Some(3));
        assert_eq!(tree.is_dirty(root), Some(true));
    }

    #[test]
    fn attaching_a_parented_node_is_an_error_when_strict() {
        let (mut tree, root, kids) = tree_with_children(1);
        let other = tree.insert(plain());
        let err = tree.attach(other, kids[0], None).unwrap_err();
        assert_eq!(
            err,
            TreeError::AlreadyAttached {
                child: kids[0],
                parent: root
            }
        );
        assert_eq!(tree.parent_of(kids[0]), Some(root), "failed attach must not move the node");
    }

    #[test]
    fn tolerant_mode_turns_violations_into_no_ops() {
        let (mut tree, root, kids) = tree_with_children(1);
        tree.set_config(TreeConfig::tolerant());
        let other = tree.insert(plain());

        assert_eq!(tree.attach(other, kids[0], None), Ok(false));
        assert_eq!(tree.detach(other, kids[0]), Ok(false));
        assert_eq!(tree.get_style(kids[0], "Missing"), Ok(None));
        assert_eq!(tree.parent_of(kids[0]), Some(root));
    }

    #[test]
    fn detach_from_wrong_parent_fails() {
        let (mut tree, root, kids) = tree_with_children(2);
        let err = tree.detach(kids[0], kids[1]).unwrap_err();
        assert_eq!(
            err,
            TreeError::WrongParent {
                child: kids[1],
                expected: kids[0],
                actual: Some(root),
            }
        );
    }

    #[test]
    fn detach_reindexes_and_keeps_child_alive() {
        let (mut tree, root, kids) = tree_with_children(3);
        assert_eq!(tree.detach(root, kids[0]), Ok(true));
        assert_eq!(tree.children_of(root), &[kids[1], kids[2]]);
        assert_eq!(tree.index_of(kids[1]), Some(0));
        assert_eq!(tree.index_of(kids[2]), Some(1));
        assert!(tree.is_alive(kids[0]));
        assert_eq!(tree.parent_of(kids[0]), None);
    }

    #[test]
    fn cycles_are_rejected() {
        let (mut tree, root, kids) = tree_with_children(1);
        let err = tree.attach(kids[0], root, None).unwrap_err();
        assert_eq!(
            err,
            TreeError::WouldCycle {
                child: root,
                parent: kids[0]
            }
        );
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let (mut tree, root, _) = tree_with_children(1);
        let x = tree.insert(plain());
        assert_eq!(
            tree.attach(root, x, Some(5)),
            Err(TreeError::IndexOutOfRange { index: 5, len: 1 })
        );
    }

    #[test]
    fn sorted_view_honors_bonus_and_is_cached() {
        let (mut tree, root, kids) = tree_with_children(3);
        assert_eq!(tree.sorted_children(root), &[kids[0], kids[1], kids[2]]);

        tree.set_priority_bonus(kids[0], 10);
        assert_eq!(tree.sorted_children(root), &[kids[1], kids[2], kids[0]]);

        tree.set_priority_bonus(kids[0], 0);
        assert_eq!(tree.sorted_children(root), &[kids[0], kids[1], kids[2]]);
    }

    #[test]
    fn bring_to_front_moves_to_the_end_without_reparenting() {
        let (mut tree, root, kids) = tree_with_children(3);
        assert_eq!(tree.bring_to_front(kids[0]), Ok(true));
        assert_eq!(tree.children_of(root), &[kids[1], kids[2], kids[0]]);
        assert_eq!(tree.parent_of(kids[0]), Some(root));
        assert_eq!(tree.send_to_back(kids[0]), Ok(true));
        assert_eq!(tree.children_of(root), &[kids[0], kids[1], kids[2]]);
        assert_eq!(tree.bring_to_front(root), Ok(false));
    }

    #[test]
    fn remove_frees_the_subtree() {
        let (mut tree, root, kids) = tree_with_children(2);
        let grandchild = tree.insert_child(kids[0], plain()).unwrap();
        assert!(tree.remove(kids[0]));
        assert!(!tree.is_alive(kids[0]));
        assert!(!tree.is_alive(grandchild));
        assert_eq!(tree.children_of(root), &[kids[1]]);

        // Slot reuse yields a new generation, so the old id stays stale.
        let reused = tree.insert(plain());
        assert!(tree.is_alive(reused));
        assert_ne!(reused, kids[0]);
        assert_ne!(reused, grandchild);
    }

    #[test]
    fn depth_first_stays_within_the_subtree() {
        let (mut tree, root, kids) = tree_with_children(2);
        let a = tree.insert_child(kids[0], plain().with_key("a")).unwrap();
        let b = tree.insert_child(kids[1], plain().with_key("b")).unwrap();

        let order: Vec<NodeId> = tree.depth_first(root).collect();
        assert_eq!(order, vec![root, kids[0], a, kids[1], b]);

        assert_eq!(tree.next_depth_first(a), Some(kids[1]));
        assert_eq!(tree.next_depth_first(b), None);

        let sub: Vec<NodeId> = tree.depth_first(kids[0]).collect();
        assert_eq!(sub, vec![kids[0], a]);

        assert_eq!(tree.find_by_key(root, "b"), Some(b));
        assert_eq!(tree.find_by_key(kids[0], "b"), None);
    }

    #[test]
    fn missing_style_is_an_error_when_strict() {
        let mut tree: Tree = Tree::new();
        let n = tree.insert(plain().with_style(InteractionState::Default, props::PADDING, 2.0_f64));
        assert_eq!(
            tree.get_style(n, props::PADDING),
            Ok(Some(StyleValue::Float(2.0)))
        );
        assert!(matches!(
            tree.get_style(n, props::FILL_COLOR),
            Err(TreeError::MissingStyle { .. })
        ));
    }

    #[test]
    fn state_changes_mark_dirty() {
        let (mut tree, _, kids) = tree_with_children(1);
        tree.node_mut(kids[0]).cache.dirty = false;
        assert!(tree.set_state(kids[0], InteractionState::Hover));
        assert_eq!(tree.is_dirty(kids[0]), Some(true));
        assert!(!tree.set_state(kids[0], InteractionState::Hover));
    }
}
