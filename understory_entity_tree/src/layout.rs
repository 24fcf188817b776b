// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry resolution and the pull-based recompute cache.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;
use tracing::trace;
use understory_style::props;

use crate::config::Context;
use crate::entity::EntityKind;
use crate::tree::Tree;
use crate::types::{Anchor, EntityFlags, Layout, NodeId, SizeSpec};
use crate::util::{clamp_origin, floor_size, inset};

/// Previous visible sibling as seen by an auto-flow node.
#[derive(Copy, Clone, Debug)]
struct Flow {
    outer: Rect,
    space_after: Vec2,
}

impl<K: EntityKind> Tree<K> {
    /// Whether the node would recompute on its next resolve.
    ///
    /// True when the node is dirty, when the version of its parent (or of the context, for
    /// roots) differs from the one it observed, or, for auto-flow anchors, when its previous
    /// visible sibling changed identity or version.
    pub fn needs_recompute(&self, id: NodeId, cx: &Context) -> bool {
        let Some(n) = self.node_opt(id) else {
            return false;
        };
        let parent_version = match n.parent {
            Some(p) => self.node(p).cache.version,
            None => cx.version(),
        };
        n.cache.dirty
            || n.cache.observed_parent != Some(parent_version)
            || (n.entity.anchor.is_auto() && n.cache.observed_flow != self.flow_key(id))
    }

    /// Resolve the outer and inner rectangles of a node.
    ///
    /// Ancestors are resolved first (each only if stale), so the result is always consistent
    /// with the current tree. Returns `None` for stale ids.
    pub fn resolve(&mut self, id: NodeId, cx: &Context) -> Option<Layout> {
        if !self.is_alive(id) {
            return None;
        }
        let (parent_inner, parent_version) = match self.node(id).parent {
            Some(p) => {
                let inner = self.resolve(p, cx)?.inner;
                (inner, self.node(p).cache.version)
            }
            None => (cx.viewport(), cx.version()),
        };

        // Auto-flow nodes depend on earlier siblings; settle them front to back.
        let mut chain: SmallVec<[NodeId; 8]> = SmallVec::new();
        chain.push(id);
        let mut cursor = id;
        while self.node(cursor).entity.anchor.is_auto()
            && let Some(prev) = self.prev_visible_sibling(cursor)
        {
            chain.push(prev);
            cursor = prev;
        }
        let mut layout = Layout::default();
        for &n in chain.iter().rev() {
            layout = self.resolve_one(n, parent_inner, parent_version, cx);
        }
        Some(layout)
    }

    /// Resolve `root` and every visible descendant, top down.
    ///
    /// Invisible subtrees are skipped and resolved when they become visible again.
    pub fn update_layout(&mut self, root: NodeId, cx: &Context) {
        let Some(layout) = self.resolve(root, cx) else {
            return;
        };
        if !self.node(root).entity.flags.contains(EntityFlags::VISIBLE) {
            return;
        }
        let mut stack: Vec<(NodeId, Rect, u64)> =
            alloc::vec![(root, layout.inner, self.node(root).cache.version)];
        while let Some((parent, inner, version)) = stack.pop() {
            for i in 0..self.node(parent).children.len() {
                let child = self.node(parent).children[i];
                if !self.node(child).entity.flags.contains(EntityFlags::VISIBLE) {
                    continue;
                }
                // Earlier visible siblings were settled by previous iterations.
                let l = self.resolve_one(child, inner, version, cx);
                stack.push((child, l.inner, self.node(child).cache.version));
            }
        }
    }

    fn flow_key(&self, id: NodeId) -> Option<(NodeId, u64)> {
        self.prev_visible_sibling(id)
            .map(|s| (s, self.node(s).cache.version))
    }

    /// Recompute one node if stale, assuming its parent and flow predecessor are current.
    fn resolve_one(&mut self, id: NodeId, parent: Rect, parent_version: u64, cx: &Context) -> Layout {
        let n = self.node(id);
        let auto = n.entity.anchor.is_auto();
        let flow_key = if auto { self.flow_key(id) } else { None };
        if !n.cache.dirty
            && n.cache.observed_parent == Some(parent_version)
            && (!auto || n.cache.observed_flow == flow_key)
        {
            return n.cache.layout;
        }

        let scale = cx.scale();
        let flow = flow_key.map(|(s, _)| {
            let sn = self.node(s);
            Flow {
                outer: sn.cache.layout.outer,
                space_after: sn.entity.style.vector_or(props::SPACE_AFTER, sn.state, Vec2::ZERO)
                    * scale,
            }
        });
        let layout = self.compute(id, parent, flow, scale);

        let n = self.node_mut(id);
        let previous = n.cache.layout.outer;
        n.cache.layout = layout;
        n.cache.version += 1;
        n.cache.dirty = false;
        n.cache.observed_parent = Some(parent_version);
        n.cache.observed_flow = flow_key;
        trace!(node = %id, outer = ?layout.outer, version = n.cache.version, "recomputed geometry");
        if previous != layout.outer {
            self.damage.push(previous);
            self.damage.push(layout.outer);
        }
        layout
    }

    fn compute(&mut self, id: NodeId, p: Rect, flow: Option<Flow>, scale: f64) -> Layout {
        let n = self.node(id);
        let e = &n.entity;
        let flags = e.flags;

        let requested = e.size.or(e.kind.default_size()).or(SizeSpec::FILL);
        let (pw, ph) = (p.width(), p.height());
        let mut w = requested.width.resolve(pw, scale).unwrap_or(pw);
        let mut h = requested.height.resolve(ph, scale).unwrap_or(ph);
        if let Some(max) = e.max_size {
            if let Some(mw) = max.width.resolve(pw, scale) {
                w = w.min(mw);
            }
            if let Some(mh) = max.height.resolve(ph, scale) {
                h = h.min(mh);
            }
        }
        if let Some(min) = e.min_size {
            if let Some(mw) = min.width.resolve(pw, scale) {
                w = w.max(mw);
            }
            if let Some(mh) = min.height.resolve(ph, scale) {
                h = h.max(mh);
            }
        }
        let size = floor_size(Size::new(w, h));

        let o = e.offset * scale;
        let space_before = e.style.vector_or(props::SPACE_BEFORE, n.state, Vec2::ZERO) * scale;
        let padding = e.style.vector_or(props::PADDING, n.state, Vec2::ZERO) * scale;

        let center_x = p.x0 + (pw - size.width) / 2.0 + o.x;
        let center_y = p.y0 + (ph - size.height) / 2.0 + o.y;
        let left = p.x0 + o.x;
        let right = p.x1 - size.width - o.x;
        let top = p.y0 + o.y;
        let bottom = p.y1 - size.height - o.y;
        let anchored = match e.anchor {
            Anchor::TopLeft => Point::new(left, top),
            Anchor::TopCenter => Point::new(center_x, top),
            Anchor::TopRight => Point::new(right, top),
            Anchor::CenterLeft => Point::new(left, center_y),
            Anchor::Center => Point::new(center_x, center_y),
            Anchor::CenterRight => Point::new(right, center_y),
            Anchor::BottomLeft => Point::new(left, bottom),
            Anchor::BottomCenter => Point::new(center_x, bottom),
            Anchor::BottomRight => Point::new(right, bottom),
            auto => flow_origin(auto, p, size, o, space_before, flow),
        }
        .floor();

        let origin = if flags.contains(EntityFlags::DRAGGABLE) {
            self.dragged_origin(id, anchored, size, p, flags)
        } else {
            anchored
        };

        let outer = Rect::from_origin_size(origin, size);
        Layout {
            outer,
            inner: inset(outer, padding),
        }
    }

    /// Apply the accumulated drag offset on top of the captured baseline.
    fn dragged_origin(
        &mut self,
        id: NodeId,
        anchored: Point,
        size: Size,
        p: Rect,
        flags: EntityFlags,
    ) -> Point {
        let drag = &mut self.node_mut(id).drag;
        if drag.baseline.is_none() && drag.offset == Vec2::ZERO {
            return anchored;
        }
        let baseline = *drag.baseline.get_or_insert(anchored - p.origin());
        let pos = (p.origin() + baseline + drag.offset).floor();
        if !flags.contains(EntityFlags::LIMIT_DRAG_TO_PARENT) {
            return pos;
        }
        let clamped = clamp_origin(pos, size, p);
        // Keep the offset in sync so dragging back responds immediately.
        drag.offset += clamped - pos;
        clamped
    }
}

/// Origin of an auto-flow node relative to its previous visible sibling.
fn flow_origin(
    anchor: Anchor,
    p: Rect,
    size: Size,
    o: Vec2,
    before: Vec2,
    flow: Option<Flow>,
) -> Point {
    let centered = p.x0 + (p.width() - size.width) / 2.0 + o.x;
    let Some(prev) = flow else {
        let x = if anchor == Anchor::AutoCenter {
            centered
        } else {
            p.x0 + before.x + o.x
        };
        return Point::new(x, p.y0 + before.y + o.y);
    };
    let below = prev.outer.y1 + prev.space_after.y + before.y + o.y;
    match anchor {
        Anchor::AutoCenter => Point::new(centered, below),
        Anchor::AutoInline | Anchor::AutoInlineNoBreak => {
            let x = prev.outer.x1 + prev.space_after.x + before.x + o.x;
            // Only the right edge is checked.
            if anchor == Anchor::AutoInline && x + size.width > p.x1 {
                Point::new(p.x0 + before.x + o.x, below)
            } else {
                Point::new(x, prev.outer.y0 + o.y)
            }
        }
        _ => Point::new(p.x0 + before.x + o.x, below),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Entity;
    use understory_style::InteractionState;

    fn viewport() -> Context {
        Context::new(Rect::new(0.0, 0.0, 400.0, 300.0))
    }

    fn child(tree: &mut Tree, parent: NodeId, entity: Entity<()>) -> NodeId {
        tree.insert_child(parent, entity).unwrap()
    }

    #[test]
    fn auto_children_stack_vertically() {
        let cx = viewport();
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let a = child(&mut tree, root, Entity::new(()).with_size(SizeSpec::new(1.0, 100.0)));
        let b = child(&mut tree, root, Entity::new(()).with_size(SizeSpec::new(1.0, 100.0)));

        assert_eq!(tree.resolve(root, &cx).unwrap().outer, cx.viewport());
        assert_eq!(tree.resolve(a, &cx).unwrap().outer, Rect::new(0.0, 0.0, 400.0, 100.0));
        assert_eq!(tree.resolve(b, &cx).unwrap().outer, Rect::new(0.0, 100.0, 400.0, 200.0));
    }

    #[test]
    fn resolving_twice_does_not_recompute() {
        let cx = viewport();
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let a = child(&mut tree, root, Entity::new(()).with_size(SizeSpec::px(50.0, 50.0)));
        let first = tree.resolve(a, &cx).unwrap();
        let version = tree.version(a).unwrap();
        assert!(!tree.needs_recompute(a, &cx));
        assert_eq!(tree.resolve(a, &cx).unwrap(), first);
        assert_eq!(tree.version(a), Some(version), "clean node must not bump its version");
    }

    #[test]
    fn percentage_follows_parent_resize() {
        let mut cx = viewport();
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let half = child(&mut tree, root, Entity::new(()).with_size(SizeSpec::new(0.5, 0.5)));
        assert_eq!(tree.resolve(half, &cx).unwrap().outer.size(), Size::new(200.0, 150.0));

        cx.set_viewport(Rect::new(0.0, 0.0, 301.0, 100.0));
        assert!(tree.needs_recompute(root, &cx));
        assert!(!tree.needs_recompute(half, &cx), "children notice lazily");
        assert_eq!(
            tree.resolve(half, &cx).unwrap().outer.size(),
            Size::new(150.0, 50.0),
            "fractions floor to whole pixels"
        );
    }

    #[test]
    fn mark_dirty_does_not_cascade() {
        let cx = viewport();
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let a = child(&mut tree, root, Entity::new(()));
        tree.update_layout(root, &cx);

        tree.mark_dirty(root);
        assert_eq!(tree.is_dirty(a), Some(false));
        tree.resolve(root, &cx);
        assert!(tree.needs_recompute(a, &cx));
    }

    #[test]
    fn fixed_anchors_measure_offsets_inward() {
        let cx = viewport();
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let br = child(
            &mut tree,
            root,
            Entity::new(())
                .with_anchor(Anchor::BottomRight)
                .with_offset(Vec2::new(10.0, 20.0))
                .with_size(SizeSpec::px(50.0, 40.0)),
        );
        let c = child(
            &mut tree,
            root,
            Entity::new(())
                .with_anchor(Anchor::Center)
                .with_size(SizeSpec::px(100.0, 100.0)),
        );
        assert_eq!(tree.resolve(br, &cx).unwrap().outer, Rect::new(340.0, 240.0, 390.0, 280.0));
        assert_eq!(tree.resolve(c, &cx).unwrap().outer, Rect::new(150.0, 100.0, 250.0, 200.0));
    }

    #[test]
    fn inline_wraps_only_past_right_edge() {
        let cx = viewport();
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let row = |tree: &mut Tree| {
            child(
                tree,
                root,
                Entity::new(())
                    .with_anchor(Anchor::AutoInline)
                    .with_size(SizeSpec::px(200.0, 50.0)),
            )
        };
        let a = row(&mut tree);
        let b = row(&mut tree);
        let c = row(&mut tree);
        tree.update_layout(root, &cx);

        assert_eq!(tree.cached_layout(a).unwrap().outer, Rect::new(0.0, 0.0, 200.0, 50.0));
        assert_eq!(
            tree.cached_layout(b).unwrap().outer,
            Rect::new(200.0, 0.0, 400.0, 50.0),
            "touching the right edge does not wrap"
        );
        assert_eq!(tree.cached_layout(c).unwrap().outer, Rect::new(0.0, 50.0, 200.0, 100.0));

        tree.set_anchor(c, Anchor::AutoInlineNoBreak);
        assert_eq!(tree.resolve(c, &cx).unwrap().outer, Rect::new(400.0, 0.0, 600.0, 50.0));
    }

    #[test]
    fn flow_skips_invisible_siblings_and_tracks_their_resize() {
        let cx = viewport();
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let a = child(&mut tree, root, Entity::new(()).with_size(SizeSpec::new(1.0, 30.0)));
        let hidden = child(&mut tree, root, Entity::new(()).with_size(SizeSpec::new(1.0, 500.0)));
        let b = child(&mut tree, root, Entity::new(()).with_size(SizeSpec::new(1.0, 30.0)));
        tree.set_flag(hidden, EntityFlags::VISIBLE, false);
        assert_eq!(tree.resolve(b, &cx).unwrap().outer.y0, 30.0);

        tree.set_size(a, SizeSpec::new(1.0, 60.0));
        assert!(tree.needs_recompute(a, &cx));
        assert_eq!(tree.resolve(b, &cx).unwrap().outer.y0, 60.0);
    }

    #[test]
    fn clamps_apply_max_then_min() {
        let cx = viewport();
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let n = child(
            &mut tree,
            root,
            Entity::new(())
                .with_size(SizeSpec::FILL)
                .with_max_size(SizeSpec::new(100.0, -1.0))
                .with_min_size(SizeSpec::new(150.0, -1.0)),
        );
        let outer = tree.resolve(n, &cx).unwrap().outer;
        assert_eq!(outer.width(), 150.0, "min wins over max");
        assert_eq!(outer.height(), 300.0, "defaulted clamp axes are ignored");
    }

    #[test]
    fn scale_applies_to_pixels_and_padding_only() {
        let cx = viewport().with_scale(2.0);
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let n = child(
            &mut tree,
            root,
            Entity::new(())
                .with_anchor(Anchor::TopLeft)
                .with_offset(Vec2::new(5.0, 5.0))
                .with_size(SizeSpec::new(0.5, 20.0))
                .with_style(InteractionState::Default, props::PADDING, Vec2::new(2.0, 3.0)),
        );
        let l = tree.resolve(n, &cx).unwrap();
        assert_eq!(l.outer, Rect::new(10.0, 10.0, 210.0, 50.0));
        assert_eq!(l.inner, Rect::new(14.0, 16.0, 206.0, 44.0));
    }

    #[test]
    fn drag_moves_from_baseline_and_respects_parent_limit() {
        let cx = viewport();
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let flags = EntityFlags::default() | EntityFlags::DRAGGABLE;
        let n = child(
            &mut tree,
            root,
            Entity::new(())
                .with_anchor(Anchor::Center)
                .with_size(SizeSpec::px(100.0, 100.0))
                .with_flags(flags),
        );
        assert_eq!(tree.resolve(n, &cx).unwrap().outer.origin(), Point::new(150.0, 100.0));

        tree.drag_by(n, Vec2::new(30.0, -20.0));
        assert_eq!(tree.resolve(n, &cx).unwrap().outer.origin(), Point::new(180.0, 80.0));

        tree.set_flags(n, flags | EntityFlags::LIMIT_DRAG_TO_PARENT);
        tree.drag_by(n, Vec2::new(1000.0, 0.0));
        assert_eq!(tree.resolve(n, &cx).unwrap().outer.origin(), Point::new(300.0, 80.0));
        tree.drag_by(n, Vec2::new(-10.0, 0.0));
        assert_eq!(
            tree.resolve(n, &cx).unwrap().outer.origin(),
            Point::new(290.0, 80.0),
            "offset is rewritten at the clamp"
        );

        tree.reset_drag(n);
        assert_eq!(tree.resolve(n, &cx).unwrap().outer.origin(), Point::new(150.0, 100.0));
    }

    #[test]
    fn layout_changes_produce_damage() {
        let cx = viewport();
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let n = child(&mut tree, root, Entity::new(()).with_size(SizeSpec::px(10.0, 10.0)));
        tree.update_layout(root, &cx);
        let _ = tree.take_damage();

        tree.update_layout(root, &cx);
        assert!(tree.take_damage().is_empty());

        tree.set_offset(n, Vec2::new(0.0, 20.0));
        tree.update_layout(root, &cx);
        let damage = tree.take_damage();
        assert_eq!(damage.union_rect(), Some(Rect::new(0.0, 0.0, 10.0, 30.0)));
    }

    #[test]
    fn spacing_separates_auto_siblings() {
        let cx = viewport();
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let a = child(
            &mut tree,
            root,
            Entity::new(())
                .with_size(SizeSpec::new(1.0, 100.0))
                .with_style(InteractionState::Default, props::SPACE_BEFORE, Vec2::new(0.0, 7.0))
                .with_style(InteractionState::Default, props::SPACE_AFTER, Vec2::new(0.0, 5.0)),
        );
        let b = child(
            &mut tree,
            root,
            Entity::new(())
                .with_size(SizeSpec::new(1.0, 50.0))
                .with_style(InteractionState::Default, props::SPACE_BEFORE, Vec2::new(0.0, 3.0)),
        );

        let a_outer = tree.resolve(a, &cx).unwrap().outer;
        assert_eq!(a_outer, Rect::new(0.0, 7.0, 400.0, 107.0), "first sibling uses its own space-before");
        assert_eq!(
            tree.resolve(b, &cx).unwrap().outer,
            Rect::new(0.0, 115.0, 400.0, 165.0),
            "space-after of the previous plus own space-before"
        );

        tree.set_flag(a, EntityFlags::VISIBLE, false);
        assert_eq!(
            tree.resolve(b, &cx).unwrap().outer.origin(),
            Point::new(0.0, 3.0),
            "with no visible predecessor only space-before applies"
        );
    }

    #[test]
    fn detach_then_reattach_reproduces_the_rect() {
        let cx = viewport();
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let _a = child(&mut tree, root, Entity::new(()).with_size(SizeSpec::new(1.0, 40.0)));
        let b = child(&mut tree, root, Entity::new(()).with_size(SizeSpec::new(0.5, 30.0)));
        let before = tree.resolve(b, &cx).unwrap().outer;

        tree.detach(root, b).unwrap();
        assert_eq!(tree.resolve(b, &cx).unwrap().outer, Rect::new(0.0, 0.0, 200.0, 30.0));
        tree.attach(root, b, None).unwrap();
        assert_eq!(tree.resolve(b, &cx).unwrap().outer, before);
        assert_eq!(before, Rect::new(0.0, 40.0, 200.0, 70.0));
    }
}
