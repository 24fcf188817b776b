// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events raised by the router and the handler trait that receives them.

use understory_entity_tree::{NodeId, Tree};

/// What happened to a node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EventKind {
    /// The node became the pointer target.
    Enter,
    /// The node stopped being the pointer target.
    Leave,
    /// The primary button (or gamepad confirm) went down over the node.
    Press,
    /// The primary button (or gamepad confirm) went up after pressing the node.
    Release,
    /// Primary press and release completed on the node.
    Click,
    /// Secondary press and release completed on the node.
    RightClick,
    /// Wheel delta routed to the node.
    Wheel(f64),
    /// The pointer moved after pressing a draggable node.
    DragStart,
    /// The node moved with the pointer.
    Drag,
    /// The button was released while dragging.
    DragEnd,
    /// The node gained (`true`) or lost (`false`) focus.
    FocusChange(bool),
    /// The node's value changed; raised through [`Router::notify_value_changed`](crate::Router::notify_value_changed).
    ValueChange,
    /// The routing pass reached the node, before its children.
    BeforeUpdate,
    /// The routing pass finished the node and its children.
    AfterUpdate,
}

/// An event addressed to one node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Event {
    /// Node the event is about.
    pub node: NodeId,
    /// What happened.
    pub kind: EventKind,
}

impl Event {
    pub(crate) fn new(node: NodeId, kind: EventKind) -> Self {
        Self { node, kind }
    }
}

/// Receives router events.
///
/// Handlers get mutable access to the tree and may restructure it (remove the clicked node,
/// reorder siblings, toggle flags). The router re-checks liveness after every call.
pub trait EventHandler<K> {
    /// Handle one event.
    fn handle(&mut self, tree: &mut Tree<K>, event: &Event);
}

impl<K, F> EventHandler<K> for F
where
    F: FnMut(&mut Tree<K>, &Event),
{
    fn handle(&mut self, tree: &mut Tree<K>, event: &Event) {
        self(tree, event);
    }
}
