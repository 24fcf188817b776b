// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Entity Tree: a retained UI tree with anchor-driven layout.
//!
//! The tree owns a hierarchy of entities (panels, buttons, labels, whatever the host's
//! [`EntityKind`] describes) and answers three questions every frame:
//!
//! - Where is each entity? Geometry comes from declarative [`SizeSpec`]s and [`Anchor`]s,
//!   resolved top down against the parent's inner rectangle.
//! - What changed? Recomputation is pull-based. Setters mark only the touched node dirty;
//!   descendants notice on their next resolve because their parent's geometry version moved on.
//!   An ancestor resize therefore costs O(depth) until the subtree is actually read.
//! - In what order? Siblings are ordered by attachment index plus priority bonuses. Drawing
//!   walks that order forward and pointer targeting walks it backward.
//!
//! ## Sizes
//!
//! Each axis of a [`SizeSpec`] picks its own mode, and raw numbers classify by range:
//! `0` fills the parent, `(0, 1]` is a fraction of the parent, `> 1` is pixels, and a negative
//! value defers to the kind's default. Pixel sizes, offsets, padding, and spacing are
//! multiplied by [`Context::scale`]. Results are floored to whole pixels and never drop below
//! one pixel.
//!
//! ## Auto-flow
//!
//! The four `Auto*` anchors place an entity relative to its previous visible sibling in tree
//! order: below it, after it on the same row (wrapping when the right edge would overflow the
//! parent), after it without wrapping, or below it and centered.
//!
//! ## API overview
//!
//! - [`Tree`]: arena of nodes. [`Tree::insert`], [`Tree::attach`], [`Tree::detach`],
//!   [`Tree::remove`], [`Tree::bring_to_front`].
//! - [`Tree::resolve`], [`Tree::update_layout`], [`Tree::needs_recompute`]: geometry.
//! - [`Tree::sorted_children`]: cached priority order.
//! - [`Tree::hit_test`] and [`Ancestry`]: targeting rules shared with input routing.
//! - [`Tree::draw`] with a [`Painter`]: back-to-front paint walk.
//! - [`Tree::take_damage`]: regions touched since the last frame.
//!
//! Structural misuse (attaching an attached node, detaching from the wrong parent, reading a
//! style property nobody defined) returns a [`TreeError`] unless [`TreeConfig::tolerant`] is
//! set, in which case it is logged through `tracing` and ignored.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod damage;
mod draw;
mod entity;
mod error;
mod hit;
mod layout;
mod tree;
mod types;
mod util;

pub use config::{Context, TreeConfig};
pub use damage::Damage;
pub use draw::{DrawItem, Painter};
pub use entity::{Entity, EntityKind};
pub use error::TreeError;
pub use hit::Ancestry;
pub use tree::{ChildList, DepthFirst, Tree};
pub use types::{Anchor, EntityFlags, Layout, Length, NodeId, SizeSpec};

pub use understory_style;
