// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ancestry rules and pointer hit testing.

use kurbo::Point;

use crate::config::Context;
use crate::entity::EntityKind;
use crate::tree::Tree;
use crate::types::{EntityFlags, NodeId};

/// Flags accumulated over a node's ancestors during a top-down walk.
///
/// Input routing and hit testing carry one of these down the tree so that a node can decide
/// whether it may react without walking back up to the root.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ancestry {
    /// Every ancestor is visible.
    pub visible: bool,
    /// Every ancestor is enabled.
    pub enabled: bool,
    /// Some ancestor is locked.
    pub locked: bool,
}

impl Ancestry {
    /// Ancestry above a root: nothing hidden, disabled, or locked.
    pub const ROOT: Self = Self {
        visible: true,
        enabled: true,
        locked: false,
    };

    /// Ancestry seen by the children of a node with `flags`.
    #[must_use]
    pub fn child(self, flags: EntityFlags) -> Self {
        Self {
            visible: self.visible && flags.contains(EntityFlags::VISIBLE),
            enabled: self.enabled && flags.contains(EntityFlags::ENABLED),
            locked: self.locked || flags.contains(EntityFlags::LOCKED),
        }
    }

    /// Whether a node with `flags` under this ancestry may react to input.
    ///
    /// Hidden or disabled nodes (self or ancestor) never react. Locked nodes never react, and
    /// nodes under a locked ancestor react only with
    /// [`REACT_WHEN_PARENT_LOCKED`](EntityFlags::REACT_WHEN_PARENT_LOCKED).
    pub fn admits(self, flags: EntityFlags) -> bool {
        self.visible
            && self.enabled
            && flags.contains(EntityFlags::VISIBLE | EntityFlags::ENABLED)
            && !flags.contains(EntityFlags::LOCKED)
            && (!self.locked || flags.contains(EntityFlags::REACT_WHEN_PARENT_LOCKED))
    }
}

impl Default for Ancestry {
    fn default() -> Self {
        Self::ROOT
    }
}

impl<K> Tree<K> {
    /// Ancestry accumulated over the ancestors of `id` (excluding `id` itself).
    pub fn ancestry_of(&self, id: NodeId) -> Option<Ancestry> {
        let mut anc = Ancestry::ROOT;
        let mut cursor = self.node_opt(id)?.parent;
        while let Some(a) = cursor {
            let n = self.node(a);
            anc = anc.child(n.entity.flags);
            cursor = n.parent;
        }
        Some(anc)
    }

    /// Whether the node and all its ancestors are visible.
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        self.effective(id, |anc, flags| anc.child(flags).visible)
    }

    /// Whether the node and all its ancestors are enabled.
    pub fn is_effectively_enabled(&self, id: NodeId) -> bool {
        self.effective(id, |anc, flags| anc.child(flags).enabled)
    }

    /// Whether the node is locked, either itself or through an ancestor it does not opt out of.
    pub fn is_effectively_locked(&self, id: NodeId) -> bool {
        self.effective(id, |anc, flags| {
            flags.contains(EntityFlags::LOCKED)
                || (anc.locked && !flags.contains(EntityFlags::REACT_WHEN_PARENT_LOCKED))
        })
    }

    fn effective(&self, id: NodeId, f: impl FnOnce(Ancestry, EntityFlags) -> bool) -> bool {
        match (self.ancestry_of(id), self.flags(id)) {
            (Some(anc), Some(flags)) => f(anc, flags),
            _ => false,
        }
    }
}

impl<K: EntityKind> Tree<K> {
    /// The node a pointer at `point` would target, searching `root`'s subtree.
    ///
    /// Applies the same rules as frame routing: children are searched front to back (reverse
    /// priority order) before their parent; hidden, disabled, and locked nodes never match;
    /// click-through nodes pass the point on to what lies beneath them. Layout is brought up
    /// to date first. No state changes and no events are raised.
    pub fn hit_test(&mut self, root: NodeId, point: Point, cx: &Context) -> Option<NodeId> {
        let anc = self.ancestry_of(root)?;
        self.update_layout(root, cx);
        self.hit_walk(root, point, anc)
    }

    fn hit_walk(&mut self, id: NodeId, point: Point, anc: Ancestry) -> Option<NodeId> {
        let flags = self.node(id).entity.flags;
        let below = anc.child(flags);
        if !below.visible {
            return None;
        }
        for &child in self.sorted_snapshot(id).iter().rev() {
            if let Some(hit) = self.hit_walk(child, point, below) {
                return Some(hit);
            }
        }
        let inside = self.node(id).cache.layout.outer.contains(point);
        (inside && anc.admits(flags) && !flags.contains(EntityFlags::CLICK_THROUGH)).then_some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Anchor, Entity, SizeSpec};
    use kurbo::Rect;

    fn panel(x: f64, y: f64, w: f64, h: f64) -> Entity<()> {
        Entity::new(())
            .with_anchor(Anchor::TopLeft)
            .with_offset(kurbo::Vec2::new(x, y))
            .with_size(SizeSpec::px(w, h))
    }

    fn setup() -> (Tree, Context, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let back = tree.insert_child(root, panel(0.0, 0.0, 100.0, 100.0)).unwrap();
        let front = tree.insert_child(root, panel(50.0, 50.0, 100.0, 100.0)).unwrap();
        let cx = Context::new(Rect::new(0.0, 0.0, 400.0, 300.0));
        (tree, cx, root, back, front)
    }

    #[test]
    fn later_sibling_wins_overlap() {
        let (mut tree, cx, root, back, front) = setup();
        assert_eq!(tree.hit_test(root, Point::new(75.0, 75.0), &cx), Some(front));
        assert_eq!(tree.hit_test(root, Point::new(10.0, 10.0), &cx), Some(back));
        assert_eq!(tree.hit_test(root, Point::new(390.0, 290.0), &cx), Some(root));
    }

    #[test]
    fn priority_bonus_reorders_targeting() {
        let (mut tree, cx, root, back, _) = setup();
        tree.set_priority_bonus(back, 5);
        assert_eq!(tree.hit_test(root, Point::new(75.0, 75.0), &cx), Some(back));
    }

    #[test]
    fn blocked_nodes_fall_through() {
        let (mut tree, cx, root, back, front) = setup();
        tree.set_flag(front, EntityFlags::CLICK_THROUGH, true);
        assert_eq!(tree.hit_test(root, Point::new(75.0, 75.0), &cx), Some(back));

        tree.set_flag(back, EntityFlags::ENABLED, false);
        assert_eq!(tree.hit_test(root, Point::new(75.0, 75.0), &cx), Some(root));

        tree.set_flag(root, EntityFlags::LOCKED, true);
        assert_eq!(tree.hit_test(root, Point::new(75.0, 75.0), &cx), None);
    }

    #[test]
    fn scrollbar_reacts_under_locked_parent() {
        let (mut tree, cx, root, back, _) = setup();
        let bar = tree
            .insert_child(
                back,
                panel(0.0, 0.0, 10.0, 10.0).with_flags(
                    EntityFlags::default() | EntityFlags::REACT_WHEN_PARENT_LOCKED,
                ),
            )
            .unwrap();
        tree.set_flag(back, EntityFlags::LOCKED, true);

        assert_eq!(tree.hit_test(root, Point::new(5.0, 5.0), &cx), Some(bar));
        assert_eq!(tree.hit_test(root, Point::new(30.0, 30.0), &cx), Some(root));
        assert!(tree.is_effectively_locked(back));
        assert!(!tree.is_effectively_locked(bar));
    }

    #[test]
    fn hidden_ancestor_hides_descendants() {
        let (mut tree, _, root, back, _) = setup();
        let leaf = tree.insert_child(back, Entity::new(())).unwrap();
        tree.set_flag(back, EntityFlags::VISIBLE, false);
        assert!(!tree.is_effectively_visible(leaf));
        assert!(tree.is_effectively_enabled(leaf));
        assert!(tree.is_effectively_visible(root));
    }
}
