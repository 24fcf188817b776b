// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entity descriptions and the per-kind behavior hooks.

use alloc::borrow::Cow;
use alloc::string::String;

use kurbo::Vec2;
use understory_style::{InteractionState, StyleMap, StyleValue};

use crate::types::{Anchor, EntityFlags, SizeSpec};

/// Behavior shared by every entity of one kind.
///
/// Hosts usually implement this on an enum of their widget kinds. The tree only asks
/// for the handful of answers that influence layout, ordering, and routing; painting is
/// left to a [`Painter`](crate::Painter).
pub trait EntityKind {
    /// Size used for axes whose [`SizeSpec`] is [`Length::Default`](crate::Length::Default).
    fn default_size(&self) -> SizeSpec;

    /// Extra ordering priority among siblings. Higher draws later and is targeted first.
    ///
    /// A dropdown raises this while its list is open. Changes made through
    /// [`Tree::kind_mut`](crate::Tree::kind_mut) are picked up automatically.
    fn priority_bonus(&self) -> i32 {
        0
    }

    /// Whether entities of this kind consume presses even when not draggable.
    ///
    /// Naturally interactive entities claim the drag target so that pressing a button
    /// inside a draggable panel does not drag the panel.
    fn naturally_interactive(&self) -> bool {
        false
    }

    /// The kind's stylesheet. Instance overrides are layered on top at insertion.
    fn default_style(&self) -> StyleMap {
        StyleMap::new()
    }
}

/// Plain container: fills its parent and has no special behavior.
impl EntityKind for () {
    fn default_size(&self) -> SizeSpec {
        SizeSpec::FILL
    }
}

/// Local description of an entity before (and while) it lives in a [`Tree`](crate::Tree).
#[derive(Clone, Debug)]
pub struct Entity<K> {
    /// Kind-specific data and behavior.
    pub kind: K,
    /// Optional lookup key; see [`Tree::find_by_key`](crate::Tree::find_by_key).
    pub key: Option<String>,
    /// Requested size.
    pub size: SizeSpec,
    /// Placement rule.
    pub anchor: Anchor,
    /// Offset from the anchor point, in unscaled pixels.
    pub offset: Vec2,
    /// Lower clamp; defaulted axes are not clamped.
    pub min_size: Option<SizeSpec>,
    /// Upper clamp; defaulted axes are not clamped.
    pub max_size: Option<SizeSpec>,
    /// Behavior flags.
    pub flags: EntityFlags,
    /// Instance ordering bonus added to the kind's bonus.
    pub priority_bonus: i32,
    /// Instance style overrides.
    pub style: StyleMap,
}

impl<K> Entity<K> {
    /// Create an auto-anchored entity with default size and flags.
    pub fn new(kind: K) -> Self {
        Self {
            kind,
            key: None,
            size: SizeSpec::DEFAULT,
            anchor: Anchor::default(),
            offset: Vec2::ZERO,
            min_size: None,
            max_size: None,
            flags: EntityFlags::default(),
            priority_bonus: 0,
            style: StyleMap::new(),
        }
    }

    /// Set the lookup key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the requested size.
    #[must_use]
    pub fn with_size(mut self, size: SizeSpec) -> Self {
        self.size = size;
        self
    }

    /// Set the anchor.
    #[must_use]
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set the anchor offset.
    #[must_use]
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Set the lower size clamp.
    #[must_use]
    pub fn with_min_size(mut self, min: SizeSpec) -> Self {
        self.min_size = Some(min);
        self
    }

    /// Set the upper size clamp.
    #[must_use]
    pub fn with_max_size(mut self, max: SizeSpec) -> Self {
        self.max_size = Some(max);
        self
    }

    /// Replace the flags.
    #[must_use]
    pub fn with_flags(mut self, flags: EntityFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the instance ordering bonus.
    #[must_use]
    pub fn with_priority_bonus(mut self, bonus: i32) -> Self {
        self.priority_bonus = bonus;
        self
    }

    /// Add an instance style override.
    #[must_use]
    pub fn with_style(
        mut self,
        state: InteractionState,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<StyleValue>,
    ) -> Self {
        self.style.set(state, name, value);
        self
    }
}
