// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Focus: directional focus navigation.
//!
//! Gamepads and arrow keys move a selection across the screen, and the screen rarely matches
//! the shape of the widget tree: a button two levels away may sit right next to the current
//! one. This crate therefore navigates geometrically:
//!
//! - **Navigation intents** ([`Navigation`]): up, down, left, right. [`Navigation::from_delta`]
//!   maps an analog or d-pad delta onto its dominant axis.
//! - **Candidates** ([`FocusEntry`] / [`FocusSpace`]): where selectable nodes are, in one
//!   shared coordinate space.
//! - **Policies** ([`FocusPolicy`]): pick the next node given an origin and a direction.
//!   [`DirectionalPolicy`] is the stock implementation.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Rect;
//! use understory_focus::{DirectionalPolicy, FocusEntry, FocusPolicy, FocusSpace, Navigation};
//!
//! let entries = [
//!     FocusEntry::new(1_u32, Rect::new(0.0, 0.0, 50.0, 50.0)),
//!     FocusEntry::new(2_u32, Rect::new(100.0, 0.0, 150.0, 50.0)),
//!     FocusEntry::new(3_u32, Rect::new(60.0, 200.0, 110.0, 250.0)),
//! ];
//! let space = FocusSpace { nodes: &entries };
//! let policy = DirectionalPolicy::default();
//!
//! // Aligned and a little further beats closer but far off-axis.
//! assert_eq!(policy.next(1, Navigation::Right, &space), Some(2));
//! assert_eq!(policy.next(1, Navigation::Left, &space), None);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `kurbo`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for floating-point math.
//! - `entity_tree_adapter`: enables [`adapters::entity_tree`], which builds a [`FocusSpace`]
//!   from an `understory_entity_tree::Tree` and resolves entry points.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use kurbo::{Rect, Vec2};

#[cfg(feature = "entity_tree_adapter")]
pub mod adapters;

/// Direction of focus navigation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Toward smaller y.
    Up,
    /// Toward larger y.
    Down,
    /// Toward smaller x.
    Left,
    /// Toward larger x.
    Right,
}

impl Navigation {
    /// Direction of the dominant axis of `delta` (y grows downward).
    ///
    /// Returns `None` for a zero delta. Exact diagonals resolve to the horizontal axis.
    pub fn from_delta(delta: Vec2) -> Option<Self> {
        if delta.x == 0.0 && delta.y == 0.0 {
            return None;
        }
        let horizontal = delta.x.abs() >= delta.y.abs();
        Some(match (horizontal, delta.x > 0.0, delta.y > 0.0) {
            (true, true, _) => Self::Right,
            (true, false, _) => Self::Left,
            (false, _, true) => Self::Down,
            (false, _, false) => Self::Up,
        })
    }
}

/// A single selectable candidate within a [`FocusSpace`].
#[derive(Clone, Debug)]
pub struct FocusEntry<K> {
    /// Identifier for this node.
    pub id: K,
    /// Bounds in the coordinate space of the surrounding [`FocusSpace`].
    pub rect: Rect,
    /// Whether this node can currently take the selection.
    pub enabled: bool,
    /// Whether this node is where navigation starts when nothing is selected.
    pub autofocus: bool,
}

impl<K> FocusEntry<K> {
    /// An enabled, non-autofocus entry.
    pub fn new(id: K, rect: Rect) -> Self {
        Self {
            id,
            rect,
            enabled: true,
            autofocus: false,
        }
    }
}

/// A read-only view of selectable candidates.
///
/// Policies treat it as an immutable snapshot. All entries must share one coordinate space.
#[derive(Clone, Debug)]
pub struct FocusSpace<'a, K> {
    /// Candidates visible to the current policy.
    pub nodes: &'a [FocusEntry<K>],
}

impl<K: Copy + Eq> FocusSpace<'_, K> {
    /// The enabled entry with the given id.
    pub fn get(&self, id: K) -> Option<&FocusEntry<K>> {
        self.nodes.iter().find(|e| e.id == id && e.enabled)
    }

    /// The first enabled autofocus entry, in slice order.
    pub fn entry_point(&self) -> Option<K> {
        self.nodes
            .iter()
            .find(|e| e.enabled && e.autofocus)
            .map(|e| e.id)
    }
}

/// Trait for focus traversal policies.
pub trait FocusPolicy<K>
where
    K: Copy + Eq,
{
    /// Compute the next selection given an origin, direction, and focus space.
    ///
    /// Returns `None` when nothing lies in that direction; the caller keeps the current
    /// selection.
    fn next(&self, origin: K, direction: Navigation, space: &FocusSpace<'_, K>) -> Option<K>;
}

/// Geometric policy: only candidates strictly beyond the origin's edge qualify.
///
/// "Right" requires `candidate.x0 >= origin.x1`, and likewise for the other directions.
/// Candidates are scored by the gap between the origin's edge and the candidate's leading
/// edge plus `off_axis_weight` times the perpendicular distance between centers. The lowest
/// score wins; ties go to the smaller perpendicular distance, then to slice order.
///
/// Nearest-leading-edge ordering therefore holds only among equally aligned candidates: a
/// well-aligned node further away beats a closer one that is far off axis.
#[derive(Copy, Clone, Debug)]
pub struct DirectionalPolicy {
    /// Penalty factor for perpendicular misalignment.
    pub off_axis_weight: f64,
}

impl Default for DirectionalPolicy {
    fn default() -> Self {
        Self {
            off_axis_weight: 4.0,
        }
    }
}

impl<K> FocusPolicy<K> for DirectionalPolicy
where
    K: Copy + Eq,
{
    fn next(&self, origin: K, direction: Navigation, space: &FocusSpace<'_, K>) -> Option<K> {
        let from = space.get(origin)?.rect;
        let oc = from.center();

        let mut best: Option<(f64, f64, K)> = None;
        for candidate in space.nodes {
            if !candidate.enabled || candidate.id == origin {
                continue;
            }
            let r = candidate.rect;
            let cc = r.center();
            let (gap, perpendicular) = match direction {
                Navigation::Right => (r.x0 - from.x1, cc.y - oc.y),
                Navigation::Left => (from.x0 - r.x1, cc.y - oc.y),
                Navigation::Down => (r.y0 - from.y1, cc.x - oc.x),
                Navigation::Up => (from.y0 - r.y1, cc.x - oc.x),
            };
            if gap < 0.0 {
                continue;
            }
            let perpendicular = perpendicular.abs();
            let score = gap + self.off_axis_weight * perpendicular;
            if !score.is_finite() {
                continue;
            }
            let better = match best {
                None => true,
                Some((s, p, _)) => score < s || (score == s && perpendicular < p),
            };
            if better {
                best = Some((score, perpendicular, candidate.id));
            }
        }
        best.map(|(_, _, id)| id)
    }
}

/// Navigation failures that leave the selection stuck.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// Nothing is selected and no selectable node is marked as the entry point.
    #[error("no selectable entry point: mark one selectable node as the first selectable")]
    NoEntryPoint,
}
