// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the entity tree: identifiers, flags, anchors, and size specifications.

use core::fmt;

use kurbo::Rect;

/// Identifier for a node in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.0, self.1)
    }
}

bitflags::bitflags! {
    /// Per-entity behavior flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EntityFlags: u16 {
        /// Entity is drawn and can be targeted.
        const VISIBLE = 1 << 0;
        /// Entity reacts to input. Disabled entities still draw.
        const ENABLED = 1 << 1;
        /// Entity and its descendants ignore input but still draw.
        const LOCKED = 1 << 2;
        /// Entity can be dragged by the pointer.
        const DRAGGABLE = 1 << 3;
        /// Dragging keeps the entity inside its parent's inner rectangle.
        const LIMIT_DRAG_TO_PARENT = 1 << 4;
        /// Entity never becomes the pointer target; its children still can.
        const CLICK_THROUGH = 1 << 5;
        /// Entity keeps reacting when an ancestor is locked (scrollbars).
        const REACT_WHEN_PARENT_LOCKED = 1 << 6;
        /// Entity participates in gamepad navigation.
        const SELECTABLE = 1 << 7;
        /// Entity is selected when gamepad navigation starts from nothing.
        const FIRST_SELECTABLE = 1 << 8;
    }
}

impl Default for EntityFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::ENABLED
    }
}

/// Where an entity is placed within its parent's inner rectangle.
///
/// The nine fixed anchors pin a corner, edge midpoint, or the center of the entity to the
/// matching point of the parent. Offsets move the entity inward from right and bottom edges.
/// The four `Auto*` anchors position relative to the previous visible sibling in tree order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Top-left corner.
    TopLeft,
    /// Middle of the top edge.
    TopCenter,
    /// Top-right corner.
    TopRight,
    /// Middle of the left edge.
    CenterLeft,
    /// Center.
    Center,
    /// Middle of the right edge.
    CenterRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Middle of the bottom edge.
    BottomCenter,
    /// Bottom-right corner.
    BottomRight,
    /// Stack below the previous visible sibling, aligned left.
    #[default]
    Auto,
    /// Continue the previous sibling's row, wrapping when the right edge would overflow.
    AutoInline,
    /// Continue the previous sibling's row without ever wrapping.
    AutoInlineNoBreak,
    /// Stack below the previous visible sibling, centered horizontally.
    AutoCenter,
}

impl Anchor {
    /// Whether this anchor derives its position from the previous sibling.
    pub const fn is_auto(self) -> bool {
        matches!(
            self,
            Self::Auto | Self::AutoInline | Self::AutoInlineNoBreak | Self::AutoCenter
        )
    }
}

/// Requested extent along one axis.
///
/// Numeric values convert with [`From<f64>`]: negative values mean [`Length::Default`],
/// `0` means [`Length::Fill`], values in `(0, 1]` are fractions of the parent, and values
/// above `1` are absolute pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Length {
    /// Use the entity kind's default for this axis.
    #[default]
    Default,
    /// Take the parent's full inner extent.
    Fill,
    /// Fraction of the parent's inner extent.
    Fraction(f64),
    /// Absolute pixels before the global scale factor is applied.
    Px(f64),
}

impl From<f64> for Length {
    fn from(value: f64) -> Self {
        if value < 0.0 {
            Self::Default
        } else if value == 0.0 {
            Self::Fill
        } else if value <= 1.0 {
            Self::Fraction(value)
        } else {
            Self::Px(value)
        }
    }
}

impl Length {
    /// Resolve against a parent extent. Returns `None` for [`Length::Default`].
    pub fn resolve(self, parent_extent: f64, scale: f64) -> Option<f64> {
        match self {
            Self::Default => None,
            Self::Fill => Some(parent_extent),
            Self::Fraction(f) => Some(parent_extent * f),
            Self::Px(px) => Some(px * scale),
        }
    }

    /// Return `self`, or `fallback` when `self` is [`Length::Default`].
    pub fn or(self, fallback: Self) -> Self {
        match self {
            Self::Default => fallback,
            other => other,
        }
    }
}

/// Two-axis size request. Each axis picks its own mode.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SizeSpec {
    /// Horizontal extent.
    pub width: Length,
    /// Vertical extent.
    pub height: Length,
}

impl SizeSpec {
    /// Both axes use the kind default.
    pub const DEFAULT: Self = Self {
        width: Length::Default,
        height: Length::Default,
    };

    /// Both axes fill the parent.
    pub const FILL: Self = Self {
        width: Length::Fill,
        height: Length::Fill,
    };

    /// Create a size from anything convertible to [`Length`] (including raw `f64`s).
    pub fn new(width: impl Into<Length>, height: impl Into<Length>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }

    /// Absolute pixel size.
    pub const fn px(width: f64, height: f64) -> Self {
        Self {
            width: Length::Px(width),
            height: Length::Px(height),
        }
    }

    /// Replace defaulted axes with the matching axis of `fallback`.
    pub fn or(self, fallback: Self) -> Self {
        Self {
            width: self.width.or(fallback.width),
            height: self.height.or(fallback.height),
        }
    }
}

/// Resolved rectangles of a node.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Layout {
    /// Rectangle the entity occupies within its parent.
    pub outer: Rect,
    /// Outer rectangle minus padding; children are positioned within it.
    pub inner: Rect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_classify_by_range() {
        assert_eq!(Length::from(-1.0), Length::Default);
        assert_eq!(Length::from(0.0), Length::Fill);
        assert_eq!(Length::from(0.25), Length::Fraction(0.25));
        assert_eq!(Length::from(1.0), Length::Fraction(1.0));
        assert_eq!(Length::from(1.5), Length::Px(1.5));
    }

    #[test]
    fn axes_mix_modes_independently() {
        let spec = SizeSpec::new(1.0, 40.0);
        assert_eq!(spec.width.resolve(300.0, 2.0), Some(300.0));
        assert_eq!(spec.height.resolve(300.0, 2.0), Some(80.0), "pixels are scaled");
        assert_eq!(
            SizeSpec::new(-1.0, 40.0).or(SizeSpec::FILL),
            SizeSpec {
                width: Length::Fill,
                height: Length::Px(40.0),
            }
        );
    }

    #[test]
    fn only_flow_anchors_are_auto() {
        assert!(Anchor::AutoInline.is_auto());
        assert!(Anchor::default().is_auto());
        assert!(!Anchor::BottomRight.is_auto());
    }
}
