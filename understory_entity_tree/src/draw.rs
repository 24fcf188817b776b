// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Back-to-front draw walk.

use kurbo::Rect;
use understory_style::{Color, InteractionState, props};

use crate::config::Context;
use crate::entity::EntityKind;
use crate::tree::Tree;
use crate::types::{EntityFlags, NodeId};

/// Everything a painter needs to draw one node.
#[derive(Debug)]
pub struct DrawItem<'a, K> {
    /// Node being drawn.
    pub id: NodeId,
    /// The node's kind, for kind-specific painting.
    pub kind: &'a K,
    /// Resolved outer rectangle.
    pub outer: Rect,
    /// Resolved inner rectangle.
    pub inner: Rect,
    /// Current interaction state.
    pub state: InteractionState,
    /// [`FILL_COLOR`](props::FILL_COLOR) for the current state, if styled.
    pub fill: Option<Color>,
    /// [`OUTLINE_COLOR`](props::OUTLINE_COLOR) for the current state, if styled.
    pub outline: Option<Color>,
}

/// Renders nodes on behalf of [`Tree::draw`].
///
/// `before_draw` and `after_draw` bracket a node and all its descendants, which lets a
/// painter push and pop clips or layers.
pub trait Painter<K> {
    /// Called before the node and its subtree are painted.
    fn before_draw(&mut self, item: &DrawItem<'_, K>) {
        let _ = item;
    }

    /// Paint a single node.
    fn paint(&mut self, item: &DrawItem<'_, K>);

    /// Called after the node's subtree has been painted.
    fn after_draw(&mut self, item: &DrawItem<'_, K>) {
        let _ = item;
    }
}

impl<K: EntityKind> Tree<K> {
    /// Bring layout up to date and paint `root`'s visible subtree back to front.
    ///
    /// Siblings are painted in ascending priority order, so later and boosted siblings end up
    /// on top. Invisible nodes and their descendants are skipped.
    pub fn draw(&mut self, root: NodeId, cx: &Context, painter: &mut impl Painter<K>) {
        if !self.is_effectively_visible(root) {
            return;
        }
        self.update_layout(root, cx);
        self.draw_node(root, painter);
    }

    fn draw_node(&mut self, id: NodeId, painter: &mut impl Painter<K>) {
        if !self.node(id).entity.flags.contains(EntityFlags::VISIBLE) {
            return;
        }
        let item = self.draw_item(id);
        painter.before_draw(&item);
        painter.paint(&item);
        for child in self.sorted_snapshot(id) {
            self.draw_node(child, painter);
        }
        painter.after_draw(&self.draw_item(id));
    }

    fn draw_item(&self, id: NodeId) -> DrawItem<'_, K> {
        let n = self.node(id);
        let style = &n.entity.style;
        DrawItem {
            id,
            kind: &n.entity.kind,
            outer: n.cache.layout.outer,
            inner: n.cache.layout.inner,
            state: n.state,
            fill: style.get(props::FILL_COLOR, n.state).and_then(as_color),
            outline: style.get(props::OUTLINE_COLOR, n.state).and_then(as_color),
        }
    }
}

fn as_color(value: &understory_style::StyleValue) -> Option<Color> {
    match value {
        understory_style::StyleValue::Color(c) => Some(*c),
        _ => None,
    }
}
