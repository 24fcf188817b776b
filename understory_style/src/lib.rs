// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Style: per-state style property maps.
//!
//! A [`StyleMap`] stores typed [`StyleValue`]s keyed by an [`InteractionState`] and a property
//! name. Lookups for the current state fall back to [`InteractionState::Default`] when the
//! state has no entry of its own, so a theme only has to spell out what differs on hover or
//! press.
//!
//! ```rust
//! use understory_style::{Color, InteractionState, StyleMap, StyleValue, props};
//!
//! let mut sheet = StyleMap::new();
//! sheet.set(InteractionState::Default, props::FILL_COLOR, Color::BLACK);
//! sheet.set(InteractionState::Hover, props::FILL_COLOR, Color::WHITE);
//! sheet.set(InteractionState::Default, props::PADDING, 4.0_f64);
//!
//! // Hover has its own fill…
//! assert_eq!(
//!     sheet.get(props::FILL_COLOR, InteractionState::Hover),
//!     Some(&StyleValue::Color(Color::WHITE))
//! );
//! // …but inherits padding from the default state.
//! assert_eq!(sheet.float_or(props::PADDING, InteractionState::Pressed, 0.0), 4.0);
//! ```
//!
//! Entities start from the stylesheet of their kind and layer instance overrides on top via
//! [`StyleMap::merge_under`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod color;
mod map;
pub mod props;

pub use color::Color;
pub use map::{InteractionState, StyleMap, StyleValue};
