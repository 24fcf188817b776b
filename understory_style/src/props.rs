// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Well-known property names read by the entity tree and its collaborators.
//!
//! Hosts may store any other name in a [`StyleMap`](crate::StyleMap); these are only the
//! ones the core itself consults.

/// Padding between an entity's outer and inner rectangles.
///
/// A [`StyleValue::Float`](crate::StyleValue::Float) pads all sides equally; a
/// [`StyleValue::Vector`](crate::StyleValue::Vector) pads horizontally by `x` and vertically
/// by `y`.
pub const PADDING: &str = "Padding";

/// Space inserted before an auto-flow entity (`x` inline, `y` stacked).
pub const SPACE_BEFORE: &str = "SpaceBefore";

/// Space inserted after an auto-flow entity, before its next sibling.
pub const SPACE_AFTER: &str = "SpaceAfter";

/// Background fill color handed to the painter.
pub const FILL_COLOR: &str = "FillColor";

/// Outline color handed to the painter.
pub const OUTLINE_COLOR: &str = "OutlineColor";
