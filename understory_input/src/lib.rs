// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Input: frame-synchronous input routing for an entity tree.
//!
//! ## Overview
//!
//! The host samples its devices once per frame into a [`FrameInput`] and hands it to
//! [`Router::update_frame`] together with the tree and an [`EventHandler`]. The router:
//!
//! - finds the single pointer target (deepest, front-most interactive node under the pointer),
//! - derives enter/leave, press/release, click, right-click, and wheel events,
//! - tracks focus (the last node pressed, or the gamepad selection),
//! - runs drag sessions on draggable nodes, bringing the dragged node to the front,
//! - moves the gamepad selection with [`understory_focus`],
//! - sets each affected node's [`InteractionState`](understory_entity_tree::understory_style::InteractionState)
//!   so styles can react.
//!
//! Everything runs synchronously on the caller's thread. Handlers receive `&mut Tree` and may
//! restructure it mid-pass.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Rect, Vec2};
//! use understory_entity_tree::{Anchor, Context, Entity, SizeSpec, Tree};
//! use understory_input::{Buttons, Event, EventKind, FrameInput, Router};
//!
//! let cx = Context::new(Rect::new(0.0, 0.0, 200.0, 200.0));
//! let mut tree = Tree::new();
//! let root = tree.insert(Entity::new(()));
//! let button = tree
//!     .insert_child(
//!         root,
//!         Entity::new(())
//!             .with_anchor(Anchor::TopLeft)
//!             .with_size(SizeSpec::px(80.0, 30.0)),
//!     )
//!     .unwrap();
//!
//! let mut clicks = Vec::new();
//! let mut handler = |_: &mut Tree, e: &Event| {
//!     if e.kind == EventKind::Click {
//!         clicks.push(e.node);
//!     }
//! };
//! let mut router = Router::new();
//! let down = FrameInput::at((10.0, 10.0)).with_buttons(Buttons::LEFT);
//! router.update_frame(&mut tree, root, &cx, &down, &mut handler).unwrap();
//! router
//!     .update_frame(&mut tree, root, &cx, &FrameInput::at((10.0, 10.0)), &mut handler)
//!     .unwrap();
//! assert_eq!(clicks, [button]);
//! ```
//!
//! This crate is `no_std`.

#![no_std]

mod event;
mod frame;
mod press;
mod router;

pub use event::{Event, EventHandler, EventKind};
pub use frame::{Buttons, FrameInput, FrameResult};
pub use press::{ClickResult, Press, PressButton, PressState};
pub use router::{InputError, Router, RouterConfig};
