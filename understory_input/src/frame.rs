// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame input snapshot and routing result.

use kurbo::{Point, Vec2};
use understory_entity_tree::NodeId;

bitflags::bitflags! {
    /// Pointer buttons held during a frame.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        /// Primary button.
        const LEFT = 1 << 0;
        /// Secondary button.
        const RIGHT = 1 << 1;
    }
}

/// Device state sampled by the host once per frame.
///
/// Buttons and the gamepad confirm flag are levels, not edges: the router derives presses
/// and releases by comparing with the previous frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer position in viewport coordinates.
    pub pointer: Point,
    /// Buttons currently held.
    pub buttons: Buttons,
    /// Wheel movement since the last frame.
    pub wheel: f64,
    /// Directional gamepad input; the dominant axis of a nonzero value picks a direction.
    pub gamepad: Vec2,
    /// Gamepad confirm button held.
    pub gamepad_confirm: bool,
}

impl FrameInput {
    /// Pointer at `pointer` with no buttons held.
    pub fn at(pointer: impl Into<Point>) -> Self {
        Self {
            pointer: pointer.into(),
            ..Self::default()
        }
    }

    /// Builder: set held buttons.
    #[must_use]
    pub fn with_buttons(mut self, buttons: Buttons) -> Self {
        self.buttons = buttons;
        self
    }

    /// Builder: set wheel movement.
    #[must_use]
    pub fn with_wheel(mut self, wheel: f64) -> Self {
        self.wheel = wheel;
        self
    }

    /// Builder: set gamepad direction.
    #[must_use]
    pub fn with_gamepad(mut self, gamepad: Vec2) -> Self {
        self.gamepad = gamepad;
        self
    }

    /// Builder: set the gamepad confirm level.
    #[must_use]
    pub fn with_confirm(mut self, held: bool) -> Self {
        self.gamepad_confirm = held;
        self
    }
}

/// Outcome of one routing pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameResult {
    /// Deepest, highest-priority interactive node under the pointer.
    pub target: Option<NodeId>,
    /// Node claiming drag this frame: the node being dragged, or the node a press just
    /// landed on if it is draggable or naturally interactive.
    pub drag_target: Option<NodeId>,
}
