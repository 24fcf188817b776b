// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural errors raised by tree operations.

use alloc::string::String;

use understory_style::InteractionState;

use crate::types::NodeId;

/// Structural violations.
///
/// These indicate programming errors in the caller. They are returned as errors unless the
/// tree runs in tolerant mode (see [`TreeConfig`](crate::TreeConfig)).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The child already has a parent.
    #[error("node {child} is already attached to {parent}")]
    AlreadyAttached {
        /// Node being attached.
        child: NodeId,
        /// Its current parent.
        parent: NodeId,
    },
    /// The child's parent is not the one the caller named.
    #[error("node {child} is not a child of {expected}")]
    WrongParent {
        /// Node being detached.
        child: NodeId,
        /// Parent the caller named.
        expected: NodeId,
        /// Actual parent, if any.
        actual: Option<NodeId>,
    },
    /// Attaching would make a node its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    WouldCycle {
        /// Node being attached.
        child: NodeId,
        /// Requested parent, which lies inside the child's subtree.
        parent: NodeId,
    },
    /// The identifier refers to a removed node.
    #[error("node {0} is stale")]
    StaleNode(NodeId),
    /// Insertion index past the end of the child list.
    #[error("index {index} is out of range for {len} children")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current number of children.
        len: usize,
    },
    /// A style property has no value for the state nor for the default state.
    #[error("node {node} has no style property `{name}` for {state:?} or the default state")]
    MissingStyle {
        /// Node whose style was read.
        node: NodeId,
        /// Property name.
        name: String,
        /// State that was requested.
        state: InteractionState,
    },
}
