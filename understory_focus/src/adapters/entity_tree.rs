// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus spaces built from an `understory_entity_tree::Tree`.
//!
//! Every node flagged [`SELECTABLE`](EntityFlags::SELECTABLE) that is effectively visible and
//! enabled becomes a [`FocusEntry`] with its resolved outer rectangle. Nodes flagged
//! [`FIRST_SELECTABLE`](EntityFlags::FIRST_SELECTABLE) are entry points.
//!
//! The scan covers the whole subtree in tree order rather than just the siblings of the
//! current node, because visual adjacency rarely follows tree adjacency.

use alloc::vec::Vec;

use tracing::{debug, error};
use understory_entity_tree::{Context, EntityFlags, EntityKind, NodeId, Tree};

use crate::{FocusEntry, FocusPolicy, FocusSpace, Navigation, NavigationError};

/// Collect the selectable nodes of `root`'s subtree, bringing layout up to date first.
pub fn focus_entries<K: EntityKind>(
    tree: &mut Tree<K>,
    root: NodeId,
    cx: &Context,
) -> Vec<FocusEntry<NodeId>> {
    tree.update_layout(root, cx);
    let tree = &*tree;
    tree.depth_first(root)
        .filter_map(|id| {
            let flags = tree.flags(id)?;
            if !flags.contains(EntityFlags::SELECTABLE)
                || !tree.is_effectively_visible(id)
                || !tree.is_effectively_enabled(id)
            {
                return None;
            }
            Some(FocusEntry {
                id,
                rect: tree.cached_layout(id)?.outer,
                enabled: true,
                autofocus: flags.contains(EntityFlags::FIRST_SELECTABLE),
            })
        })
        .collect()
}

/// Move the selection one step in `direction`.
///
/// With no current selection (or one that is no longer selectable) the entry point is
/// returned; a tree without one fails with [`NavigationError::NoEntryPoint`]. Otherwise the
/// policy picks the next node, and `Ok(None)` means nothing lies that way and the selection
/// should stay where it is.
pub fn navigate<K: EntityKind>(
    tree: &mut Tree<K>,
    root: NodeId,
    cx: &Context,
    current: Option<NodeId>,
    direction: Navigation,
    policy: &impl FocusPolicy<NodeId>,
) -> Result<Option<NodeId>, NavigationError> {
    let entries = focus_entries(tree, root, cx);
    let space = FocusSpace { nodes: &entries };
    match current.filter(|&c| space.get(c).is_some()) {
        Some(origin) => {
            let next = policy.next(origin, direction, &space);
            debug!(from = %origin, to = ?next, ?direction, "directional navigation");
            Ok(next)
        }
        None => match space.entry_point() {
            Some(entry) => {
                debug!(node = %entry, "navigation entered at first selectable");
                Ok(Some(entry))
            }
            None => {
                error!(root = %root, "no first-selectable node; gamepad navigation is stuck");
                Err(NavigationError::NoEntryPoint)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DirectionalPolicy;
    use kurbo::{Rect, Vec2};
    use understory_entity_tree::{Anchor, Entity, SizeSpec};

    fn button(x: f64, y: f64, flags: EntityFlags) -> Entity<()> {
        Entity::new(())
            .with_anchor(Anchor::TopLeft)
            .with_offset(Vec2::new(x, y))
            .with_size(SizeSpec::px(50.0, 50.0))
            .with_flags(EntityFlags::default() | flags)
    }

    #[test]
    fn navigation_crosses_tree_levels() {
        let cx = Context::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let start = tree
            .insert_child(
                root,
                button(0.0, 0.0, EntityFlags::SELECTABLE | EntityFlags::FIRST_SELECTABLE),
            )
            .unwrap();
        // A panel nested two levels deep, holding the visually adjacent button.
        let panel = tree
            .insert_child(root, Entity::new(()).with_anchor(Anchor::TopLeft))
            .unwrap();
        let inner = tree
            .insert_child(panel, Entity::new(()).with_anchor(Anchor::TopLeft))
            .unwrap();
        let right = tree
            .insert_child(inner, button(100.0, 0.0, EntityFlags::SELECTABLE))
            .unwrap();
        let below = tree
            .insert_child(root, button(60.0, 200.0, EntityFlags::SELECTABLE))
            .unwrap();
        let policy = DirectionalPolicy::default();

        assert_eq!(
            navigate(&mut tree, root, &cx, None, Navigation::Right, &policy),
            Ok(Some(start)),
            "first press enters at the first selectable"
        );
        assert_eq!(
            navigate(&mut tree, root, &cx, Some(start), Navigation::Right, &policy),
            Ok(Some(right))
        );
        assert_eq!(
            navigate(&mut tree, root, &cx, Some(start), Navigation::Down, &policy),
            Ok(Some(below))
        );
        assert_eq!(
            navigate(&mut tree, root, &cx, Some(start), Navigation::Up, &policy),
            Ok(None)
        );
    }

    #[test]
    fn hidden_or_disabled_nodes_are_not_candidates() {
        let cx = Context::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        let start = tree
            .insert_child(
                root,
                button(0.0, 0.0, EntityFlags::SELECTABLE | EntityFlags::FIRST_SELECTABLE),
            )
            .unwrap();
        let near = tree
            .insert_child(root, button(100.0, 0.0, EntityFlags::SELECTABLE))
            .unwrap();
        let far = tree
            .insert_child(root, button(300.0, 0.0, EntityFlags::SELECTABLE))
            .unwrap();
        tree.set_flag(near, EntityFlags::ENABLED, false);

        let policy = DirectionalPolicy::default();
        assert_eq!(
            navigate(&mut tree, root, &cx, Some(start), Navigation::Right, &policy),
            Ok(Some(far))
        );
        tree.set_flag(root, EntityFlags::VISIBLE, false);
        assert!(focus_entries(&mut tree, root, &cx).is_empty());
    }

    #[test]
    fn missing_entry_point_is_an_error() {
        let cx = Context::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let mut tree = Tree::new();
        let root = tree.insert(Entity::new(()));
        tree.insert_child(root, button(0.0, 0.0, EntityFlags::SELECTABLE))
            .unwrap();
        assert_eq!(
            navigate(
                &mut tree,
                root,
                &cx,
                None,
                Navigation::Down,
                &DirectionalPolicy::default()
            ),
            Err(NavigationError::NoEntryPoint)
        );
    }
}
