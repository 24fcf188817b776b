// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed `(state, property)` store with default-state fallback.

use alloc::borrow::Cow;
use core::hash::Hash;

use hashbrown::{Equivalent, HashMap};
use kurbo::Vec2;

use crate::Color;

/// Interaction state of an entity, as tracked by the input router.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InteractionState {
    /// Pointer is elsewhere.
    #[default]
    Default,
    /// Pointer is over the entity with the button up.
    Hover,
    /// Pointer is over the entity with the button down.
    Pressed,
}

/// A typed style value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StyleValue {
    /// A color.
    Color(Color),
    /// A scalar.
    Float(f64),
    /// A 2D vector (for example per-axis padding or spacing).
    Vector(Vec2),
    /// An integer.
    Int(i32),
}

impl From<Color> for StyleValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Vec2> for StyleValue {
    fn from(value: Vec2) -> Self {
        Self::Vector(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct StyleKey {
    state: InteractionState,
    name: Cow<'static, str>,
}

// Must hash identically to `StyleKey`: derived `Hash` visits the fields in
// order, and `Cow<str>` hashes as `str`.
#[derive(Hash)]
struct StyleKeyRef<'a> {
    state: InteractionState,
    name: &'a str,
}

impl Equivalent<StyleKey> for StyleKeyRef<'_> {
    fn equivalent(&self, key: &StyleKey) -> bool {
        self.state == key.state && self.name == key.name
    }
}

/// Style properties keyed by interaction state and property name.
///
/// Reads through [`StyleMap::get`] fall back to the [`InteractionState::Default`] entry when
/// the requested state has none. The typed `*_or` accessors additionally fall back to a
/// caller-supplied value when neither exists.
#[derive(Clone, Debug, Default)]
pub struct StyleMap {
    entries: HashMap<StyleKey, StyleValue>,
}

impl StyleMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `(state, property)` entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set a property for a state, returning the previous value if any.
    pub fn set(
        &mut self,
        state: InteractionState,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<StyleValue>,
    ) -> Option<StyleValue> {
        self.entries.insert(
            StyleKey {
                state,
                name: name.into(),
            },
            value.into(),
        )
    }

    /// Builder form of [`StyleMap::set`].
    #[must_use]
    pub fn with(
        mut self,
        state: InteractionState,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<StyleValue>,
    ) -> Self {
        self.set(state, name, value);
        self
    }

    /// Remove a property for a state.
    pub fn remove(&mut self, state: InteractionState, name: &str) -> Option<StyleValue> {
        self.entries.remove(&StyleKeyRef { state, name })
    }

    /// Look up a property for exactly this state, without fallback.
    pub fn get_exact(&self, name: &str, state: InteractionState) -> Option<&StyleValue> {
        self.entries.get(&StyleKeyRef { state, name })
    }

    /// Look up a property for `state`, falling back to the default state.
    pub fn get(&self, name: &str, state: InteractionState) -> Option<&StyleValue> {
        self.get_exact(name, state).or_else(|| {
            if state == InteractionState::Default {
                None
            } else {
                self.get_exact(name, InteractionState::Default)
            }
        })
    }

    /// Whether a lookup for `state` would find a value.
    pub fn contains(&self, name: &str, state: InteractionState) -> bool {
        self.get(name, state).is_some()
    }

    /// Read a scalar, or `fallback` when absent or not a scalar.
    ///
    /// An integer value is widened.
    pub fn float_or(&self, name: &str, state: InteractionState, fallback: f64) -> f64 {
        match self.get(name, state) {
            Some(StyleValue::Float(v)) => *v,
            Some(StyleValue::Int(v)) => f64::from(*v),
            _ => fallback,
        }
    }

    /// Read a vector, or `fallback` when absent.
    ///
    /// A scalar value is splatted to both axes.
    pub fn vector_or(&self, name: &str, state: InteractionState, fallback: Vec2) -> Vec2 {
        match self.get(name, state) {
            Some(StyleValue::Vector(v)) => *v,
            Some(StyleValue::Float(v)) => Vec2::new(*v, *v),
            Some(StyleValue::Int(v)) => Vec2::new(f64::from(*v), f64::from(*v)),
            _ => fallback,
        }
    }

    /// Read a color, or `fallback` when absent or not a color.
    pub fn color_or(&self, name: &str, state: InteractionState, fallback: Color) -> Color {
        match self.get(name, state) {
            Some(StyleValue::Color(c)) => *c,
            _ => fallback,
        }
    }

    /// Read an integer, or `fallback` when absent or not an integer.
    pub fn int_or(&self, name: &str, state: InteractionState, fallback: i32) -> i32 {
        match self.get(name, state) {
            Some(StyleValue::Int(v)) => *v,
            _ => fallback,
        }
    }

    /// Fill in every entry of `base` that this map does not define itself.
    ///
    /// Used to layer instance overrides over a kind's stylesheet: the receiver keeps its own
    /// values and gains the rest.
    pub fn merge_under(&mut self, base: &Self) {
        for (key, value) in &base.entries {
            self.entries.entry(key.clone()).or_insert(*value);
        }
    }

    /// Iterate `(state, name, value)` entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (InteractionState, &str, &StyleValue)> + '_ {
        self.entries
            .iter()
            .map(|(k, v)| (k.state, &*k.name, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;

    #[test]
    fn state_lookup_falls_back_to_default() {
        let map = StyleMap::new()
            .with(InteractionState::Default, props::FILL_COLOR, Color::BLACK)
            .with(InteractionState::Pressed, props::FILL_COLOR, Color::WHITE);

        assert_eq!(
            map.color_or(props::FILL_COLOR, InteractionState::Hover, Color::TRANSPARENT),
            Color::BLACK,
            "hover has no entry and should inherit the default state"
        );
        assert_eq!(
            map.color_or(props::FILL_COLOR, InteractionState::Pressed, Color::TRANSPARENT),
            Color::WHITE
        );
        assert!(map.get_exact(props::FILL_COLOR, InteractionState::Hover).is_none());
    }

    #[test]
    fn missing_property_uses_caller_fallback() {
        let map = StyleMap::new().with(InteractionState::Hover, props::PADDING, 8.0_f64);
        // Only hover is defined, so default-state reads miss.
        assert_eq!(map.float_or(props::PADDING, InteractionState::Default, 2.0), 2.0);
        assert_eq!(map.float_or(props::PADDING, InteractionState::Hover, 2.0), 8.0);
        assert!(!map.contains("Nope", InteractionState::Hover));
    }

    #[test]
    fn scalar_values_splat_into_vectors() {
        let map = StyleMap::new()
            .with(InteractionState::Default, props::PADDING, 3.0_f64)
            .with(InteractionState::Default, props::SPACE_AFTER, 2_i32);
        assert_eq!(
            map.vector_or(props::PADDING, InteractionState::Hover, Vec2::ZERO),
            Vec2::new(3.0, 3.0)
        );
        assert_eq!(
            map.vector_or(props::SPACE_AFTER, InteractionState::Default, Vec2::ZERO),
            Vec2::new(2.0, 2.0)
        );
        assert_eq!(map.int_or(props::SPACE_AFTER, InteractionState::Default, 0), 2);
    }

    #[test]
    fn merge_under_keeps_overrides() {
        let sheet = StyleMap::new()
            .with(InteractionState::Default, props::PADDING, 10.0_f64)
            .with(InteractionState::Default, props::FILL_COLOR, Color::BLACK);
        let mut instance = StyleMap::new().with(InteractionState::Default, props::PADDING, 0.0_f64);
        instance.merge_under(&sheet);

        assert_eq!(instance.len(), 2);
        assert_eq!(instance.float_or(props::PADDING, InteractionState::Default, -1.0), 0.0);
        assert_eq!(
            instance.color_or(props::FILL_COLOR, InteractionState::Default, Color::WHITE),
            Color::BLACK
        );
    }

    #[test]
    fn owned_and_borrowed_names_address_the_same_entry() {
        let mut map = StyleMap::new();
        map.set(
            InteractionState::Hover,
            alloc::string::String::from("Custom"),
            1_i32,
        );
        assert_eq!(
            map.remove(InteractionState::Hover, "Custom"),
            Some(StyleValue::Int(1))
        );
        assert!(map.is_empty());
    }
}
