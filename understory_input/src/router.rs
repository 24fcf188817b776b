// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame router.
//!
//! ## Overview
//!
//! One [`Router::update_frame`] call per frame walks the tree in priority order, picks the
//! single pointer target and drag claimant, and turns the difference between this frame's
//! device state and the last one into events.
//!
//! ## Target selection
//!
//! - Children are visited in reverse priority order (front to back) before their parent
//!   decides whether it claims the target, so the deepest, front-most node wins.
//! - Once a node claims the target, nothing visited later re-claims it.
//! - Hidden, disabled, and locked nodes are skipped as targets but their children are still
//!   visited; [`REACT_WHEN_PARENT_LOCKED`](EntityFlags::REACT_WHEN_PARENT_LOCKED) lets a node
//!   react under a locked ancestor. Hidden subtrees are not visited at all.
//! - Click-through nodes never claim the target.
//!
//! ## Event order
//!
//! `BeforeUpdate`/`AfterUpdate` during the walk, then `Leave`/`Enter`, `Press` and focus
//! changes, drag events, `Release`/`Click`/`RightClick`, `Wheel`, and finally gamepad focus
//! moves and confirm presses.

use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use tracing::{debug, trace};
use understory_entity_tree::understory_style::InteractionState;
use understory_entity_tree::{Ancestry, Context, EntityFlags, EntityKind, NodeId, Tree, TreeError};
use understory_focus::adapters::entity_tree::navigate;
use understory_focus::{DirectionalPolicy, Navigation, NavigationError};

use crate::event::{Event, EventHandler, EventKind};
use crate::frame::{Buttons, FrameInput, FrameResult};
use crate::press::{ClickResult, PressButton, PressState};

/// Router configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RouterConfig {
    /// Also click the focused node when the button is released over it, even if the press
    /// started elsewhere.
    pub promiscuous_clicks: bool,
    /// Distance the pointer must travel after a press before a drag starts. Zero means any
    /// movement starts a drag.
    pub drag_threshold: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            promiscuous_clicks: false,
            drag_threshold: 0.0,
        }
    }
}

/// Failures surfaced from a routing pass.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum InputError {
    /// Gamepad navigation has nowhere to start.
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    /// A structural tree operation performed by the router failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Copy, Clone, Debug)]
struct DragSession {
    node: NodeId,
    last: Point,
    active: bool,
}

/// Results accumulated during the walk.
#[derive(Default)]
struct Scan {
    target: Option<NodeId>,
    drag_claim: Option<NodeId>,
}

/// Frame-synchronous input router.
///
/// Holds the state that persists between frames: hover, focus, active presses, the drag
/// session, and the previous device levels.
pub struct Router {
    config: RouterConfig,
    policy: DirectionalPolicy,
    hover: Option<NodeId>,
    focus: Option<NodeId>,
    presses: PressState<NodeId>,
    drag: Option<DragSession>,
    prev_buttons: Buttons,
    prev_direction: Option<Navigation>,
    confirm: Option<Option<NodeId>>,
    /// Nodes whose interaction state this router set to something other than default.
    styled: SmallVec<[NodeId; 2]>,
}

impl core::fmt::Debug for Router {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("hover", &self.hover)
            .field("focus", &self.focus)
            .field("dragging", &self.dragging())
            .finish_non_exhaustive()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a router with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create a router with a specific configuration.
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            policy: DirectionalPolicy::default(),
            hover: None,
            focus: None,
            presses: PressState::new(),
            drag: None,
            prev_buttons: Buttons::empty(),
            prev_direction: None,
            confirm: None,
            styled: SmallVec::new(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> RouterConfig {
        self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: RouterConfig) {
        self.config = config;
    }

    /// Replace the gamepad navigation policy.
    pub fn set_policy(&mut self, policy: DirectionalPolicy) {
        self.policy = policy;
    }

    /// Pointer target as of the last frame.
    pub fn hover(&self) -> Option<NodeId> {
        self.hover
    }

    /// Focused node (last pressed node, or gamepad selection).
    pub fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    /// Node currently being dragged.
    pub fn dragging(&self) -> Option<NodeId> {
        self.drag.filter(|d| d.active).map(|d| d.node)
    }

    /// Raise [`EventKind::ValueChange`] for `node` through `handler`.
    ///
    /// Widgets call this when their value changes, whether from input or from code.
    pub fn notify_value_changed<K>(
        &mut self,
        tree: &mut Tree<K>,
        node: NodeId,
        handler: &mut impl EventHandler<K>,
    ) {
        if tree.is_alive(node) {
            handler.handle(tree, &Event::new(node, EventKind::ValueChange));
        }
    }

    /// Move focus to `node` (or clear it), raising focus-change events.
    pub fn set_focus<K>(
        &mut self,
        tree: &mut Tree<K>,
        node: Option<NodeId>,
        handler: &mut impl EventHandler<K>,
    ) {
        if self.focus == node {
            return;
        }
        let old = core::mem::replace(&mut self.focus, node);
        debug!(from = ?old, to = ?node, "focus changed");
        if let Some(old) = old
            && tree.is_alive(old)
        {
            handler.handle(tree, &Event::new(old, EventKind::FocusChange(false)));
        }
        if let Some(new) = node
            && tree.is_alive(new)
        {
            handler.handle(tree, &Event::new(new, EventKind::FocusChange(true)));
        }
    }

    /// Route one frame of input through `root`'s subtree.
    ///
    /// Layout is brought up to date first, so targeting always sees current geometry.
    /// Handlers run synchronously and may mutate the tree; the router snapshots sibling lists
    /// and re-checks liveness before touching any node again.
    ///
    /// Fails only when gamepad navigation starts with nothing selected and no node is flagged
    /// [`FIRST_SELECTABLE`](EntityFlags::FIRST_SELECTABLE), or when bringing a dragged node to
    /// the front violates the tree's structure in strict mode.
    pub fn update_frame<K: EntityKind>(
        &mut self,
        tree: &mut Tree<K>,
        root: NodeId,
        cx: &Context,
        input: &FrameInput,
        handler: &mut impl EventHandler<K>,
    ) -> Result<FrameResult, InputError> {
        self.forget_stale(tree);
        tree.update_layout(root, cx);

        let mut scan = Scan::default();
        if let Some(anc) = tree.ancestry_of(root) {
            self.visit(tree, root, anc, input.pointer, &mut scan, handler);
        }
        let target = scan.target.filter(|&t| tree.is_alive(t));

        let pressed = input.buttons.difference(self.prev_buttons);
        let released = self.prev_buttons.difference(input.buttons);
        self.prev_buttons = input.buttons;

        self.update_hover(tree, target, handler);

        if pressed.contains(Buttons::LEFT) {
            self.presses
                .on_down(PressButton::Primary, target, input.pointer);
            if let Some(t) = target {
                handler.handle(tree, &Event::new(t, EventKind::Press));
                self.set_focus(tree, Some(t), handler);
            }
            self.drag = scan
                .drag_claim
                .filter(|&n| tree.is_alive(n))
                .filter(|&n| tree.flags(n).is_some_and(|f| f.contains(EntityFlags::DRAGGABLE)))
                .map(|node| DragSession {
                    node,
                    last: input.pointer,
                    active: false,
                });
        }
        if pressed.contains(Buttons::RIGHT) {
            self.presses
                .on_down(PressButton::Secondary, target, input.pointer);
        }

        if input.buttons.contains(Buttons::LEFT) {
            self.update_drag(tree, input.pointer, handler)?;
        }

        if released.contains(Buttons::LEFT) {
            self.release_primary(tree, target, handler);
        }
        if released.contains(Buttons::RIGHT) {
            let result = self.presses.on_up(
                PressButton::Secondary,
                target,
                self.focus,
                self.config.promiscuous_clicks,
            );
            if let ClickResult::Click(n) = result
                && tree.is_alive(n)
            {
                handler.handle(tree, &Event::new(n, EventKind::RightClick));
            }
        }

        if input.wheel != 0.0 {
            let recipient = cx
                .active
                .filter(|&a| interactive(tree, a))
                .or(target);
            if let Some(n) = recipient
                && tree.is_alive(n)
            {
                trace!(node = %n, delta = input.wheel, "wheel");
                handler.handle(tree, &Event::new(n, EventKind::Wheel(input.wheel)));
            }
        }

        let direction = Navigation::from_delta(input.gamepad);
        if direction != self.prev_direction {
            self.prev_direction = direction;
            if let Some(direction) = direction {
                let next = navigate(tree, root, cx, self.focus, direction, &self.policy)?;
                if next.is_some() {
                    self.set_focus(tree, next, handler);
                }
            }
        }
        self.update_confirm(tree, input.gamepad_confirm, handler);

        self.apply_states(tree, target, input.buttons.contains(Buttons::LEFT));

        let drag_target = match self.drag {
            Some(session) if tree.is_alive(session.node) => Some(session.node),
            _ if pressed.contains(Buttons::LEFT) => scan.drag_claim.filter(|&n| tree.is_alive(n)),
            _ => None,
        };
        Ok(FrameResult {
            target,
            drag_target,
        })
    }

    fn forget_stale<K>(&mut self, tree: &Tree<K>) {
        let alive = |n: &NodeId| tree.is_alive(*n);
        self.hover = self.hover.filter(alive);
        self.focus = self.focus.filter(alive);
        self.drag = self.drag.filter(|d| tree.is_alive(d.node));
        if let Some(origin) = self.confirm {
            self.confirm = Some(origin.filter(alive));
        }
        self.presses.retain(alive);
        self.styled.retain(|n| tree.is_alive(*n));
    }

    fn visit<K: EntityKind>(
        &mut self,
        tree: &mut Tree<K>,
        id: NodeId,
        anc: Ancestry,
        pointer: Point,
        scan: &mut Scan,
        handler: &mut impl EventHandler<K>,
    ) {
        let Some(flags) = tree.flags(id) else {
            return;
        };
        let below = anc.child(flags);
        if !below.visible {
            return;
        }
        handler.handle(tree, &Event::new(id, EventKind::BeforeUpdate));

        let had_target = scan.target.is_some();
        for child in tree.sorted_snapshot(id).into_iter().rev() {
            // Handlers may have removed or moved the child since the snapshot.
            if tree.parent_of(child) != Some(id) {
                continue;
            }
            self.visit(tree, child, below, pointer, scan, handler);
        }

        let Some(flags) = tree.flags(id) else {
            return;
        };
        let reacts = anc.admits(flags) && !flags.contains(EntityFlags::CLICK_THROUGH);
        if scan.target.is_none()
            && reacts
            && tree
                .cached_layout(id)
                .is_some_and(|l| l.outer.contains(pointer))
        {
            scan.target = Some(id);
        }
        let on_target_path = !had_target && scan.target.is_some();
        if on_target_path && reacts && scan.drag_claim.is_none() {
            let claims = flags.contains(EntityFlags::DRAGGABLE)
                || tree.kind(id).is_some_and(|k| k.naturally_interactive());
            if claims {
                scan.drag_claim = Some(id);
            }
        }

        handler.handle(tree, &Event::new(id, EventKind::AfterUpdate));
    }

    fn update_hover<K>(
        &mut self,
        tree: &mut Tree<K>,
        target: Option<NodeId>,
        handler: &mut impl EventHandler<K>,
    ) {
        if self.hover == target {
            return;
        }
        let old = core::mem::replace(&mut self.hover, target);
        debug!(from = ?old, to = ?target, "pointer target changed");
        if let Some(old) = old
            && tree.is_alive(old)
        {
            handler.handle(tree, &Event::new(old, EventKind::Leave));
        }
        if let Some(new) = target
            && tree.is_alive(new)
        {
            handler.handle(tree, &Event::new(new, EventKind::Enter));
        }
    }

    fn update_drag<K: EntityKind>(
        &mut self,
        tree: &mut Tree<K>,
        pointer: Point,
        handler: &mut impl EventHandler<K>,
    ) -> Result<(), InputError> {
        let Some(mut session) = self.drag else {
            return Ok(());
        };
        if !session.active {
            let Some(down) = self
                .presses
                .active(PressButton::Primary)
                .map(|p| p.down_position)
            else {
                return Ok(());
            };
            let moved: Vec2 = pointer - down;
            let threshold = self.config.drag_threshold;
            if moved == Vec2::ZERO || moved.hypot2() <= threshold * threshold {
                return Ok(());
            }
            session.active = true;
            self.drag = Some(session);
            tree.bring_to_front(session.node)?;
            debug!(node = %session.node, "drag started");
            handler.handle(tree, &Event::new(session.node, EventKind::DragStart));
        }
        let delta = pointer - session.last;
        session.last = pointer;
        self.drag = Some(session);
        if delta != Vec2::ZERO && tree.is_alive(session.node) {
            tree.drag_by(session.node, delta);
            handler.handle(tree, &Event::new(session.node, EventKind::Drag));
        }
        Ok(())
    }

    fn release_primary<K>(
        &mut self,
        tree: &mut Tree<K>,
        target: Option<NodeId>,
        handler: &mut impl EventHandler<K>,
    ) {
        if let Some(session) = self.drag.take()
            && session.active
        {
            debug!(node = %session.node, "drag ended");
            if tree.is_alive(session.node) {
                handler.handle(tree, &Event::new(session.node, EventKind::DragEnd));
            }
            // A drag consumes the press; release it without clicking.
            if let Some(o) = self
                .presses
                .cancel(PressButton::Primary)
                .and_then(|p| p.target)
                && tree.is_alive(o)
            {
                handler.handle(tree, &Event::new(o, EventKind::Release));
            }
            return;
        }
        let origin = self
            .presses
            .active(PressButton::Primary)
            .and_then(|p| p.target);
        let result = self.presses.on_up(
            PressButton::Primary,
            target,
            self.focus,
            self.config.promiscuous_clicks,
        );
        if let Some(o) = origin
            && tree.is_alive(o)
        {
            handler.handle(tree, &Event::new(o, EventKind::Release));
        }
        if let ClickResult::Click(n) = result
            && tree.is_alive(n)
        {
            debug!(node = %n, "click");
            handler.handle(tree, &Event::new(n, EventKind::Click));
        }
    }

    fn update_confirm<K>(&mut self, tree: &mut Tree<K>, held: bool, handler: &mut impl EventHandler<K>) {
        match (self.confirm, held) {
            (None, true) => {
                let origin = self.focus.filter(|&f| interactive(tree, f));
                self.confirm = Some(origin);
                if let Some(f) = origin {
                    handler.handle(tree, &Event::new(f, EventKind::Press));
                }
            }
            (Some(origin), false) => {
                self.confirm = None;
                if let Some(o) = origin
                    && tree.is_alive(o)
                {
                    handler.handle(tree, &Event::new(o, EventKind::Release));
                    if self.focus == Some(o) && tree.is_alive(o) {
                        handler.handle(tree, &Event::new(o, EventKind::Click));
                    }
                }
            }
            _ => {}
        }
    }

    /// Give the pointer target its hover or pressed state and reset nodes that lost it.
    ///
    /// With promiscuous clicks the focused node also shows as pressed while the left button
    /// is held, wherever the pointer is.
    fn apply_states<K>(&mut self, tree: &mut Tree<K>, target: Option<NodeId>, left_held: bool) {
        let mut wanted: SmallVec<[(NodeId, InteractionState); 2]> = SmallVec::new();
        if let Some(t) = target {
            let state = if left_held {
                InteractionState::Pressed
            } else {
                InteractionState::Hover
            };
            wanted.push((t, state));
        }
        if let Some(Some(o)) = self.confirm
            && Some(o) != target
        {
            wanted.push((o, InteractionState::Pressed));
        }
        // Promiscuous clicks keep the focused node pressed while the button is held.
        if self.config.promiscuous_clicks
            && left_held
            && let Some(f) = self.focus
            && !wanted.iter().any(|&(w, _)| w == f)
            && interactive(tree, f)
        {
            wanted.push((f, InteractionState::Pressed));
        }

        for &n in &self.styled {
            if !wanted.iter().any(|&(w, _)| w == n) {
                tree.set_state(n, InteractionState::Default);
            }
        }
        self.styled.clear();
        for &(n, state) in &wanted {
            if tree.is_alive(n) {
                tree.set_state(n, state);
                self.styled.push(n);
            }
        }
    }
}

/// Whether `id` is alive and may react to input given its ancestry.
fn interactive<K>(tree: &Tree<K>, id: NodeId) -> bool {
    match (tree.ancestry_of(id), tree.flags(id)) {
        (Some(anc), Some(flags)) => anc.admits(flags),
        _ => false,
    }
}
