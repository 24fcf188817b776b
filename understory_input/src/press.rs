// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press tracking and click recognition.
//!
//! A click is recognized when a button goes up over the same node it went down on. In
//! promiscuous mode a release over the focused node also clicks it, wherever the press
//! started; this lets a focused widget keep reacting after the pointer slipped off it during
//! the press.
//!
//! ```
//! use kurbo::Point;
//! use understory_input::{ClickResult, PressButton, PressState};
//!
//! let mut presses: PressState<u32> = PressState::new();
//! presses.on_down(PressButton::Primary, Some(42), Point::new(10.0, 20.0));
//! assert_eq!(
//!     presses.on_up(PressButton::Primary, Some(42), None, false),
//!     ClickResult::Click(42)
//! );
//!
//! // Pressed outside, released over the focused node.
//! presses.on_down(PressButton::Primary, None, Point::ZERO);
//! assert_eq!(
//!     presses.on_up(PressButton::Primary, Some(7), Some(7), true),
//!     ClickResult::Click(7)
//! );
//! ```

use kurbo::Point;

/// Which button a press belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PressButton {
    /// Left mouse button or gamepad confirm.
    Primary,
    /// Right mouse button.
    Secondary,
}

/// An active press.
#[derive(Clone, Debug, PartialEq)]
pub struct Press<K> {
    /// Node under the pointer when the button went down, if any.
    pub target: Option<K>,
    /// Pointer position at press time.
    pub down_position: Point,
}

/// Result of a release.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickResult<K> {
    /// Click event should be generated on the specified node.
    Click(K),
    /// No click; carries the node the press started on, if any.
    Suppressed(Option<K>),
}

/// Press state for both buttons.
#[derive(Clone, Debug)]
pub struct PressState<K> {
    primary: Option<Press<K>>,
    secondary: Option<Press<K>>,
}

impl<K> Default for PressState<K> {
    fn default() -> Self {
        Self {
            primary: None,
            secondary: None,
        }
    }
}

impl<K: PartialEq + Clone> PressState<K> {
    /// Create an empty press state.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, button: PressButton) -> &mut Option<Press<K>> {
        match button {
            PressButton::Primary => &mut self.primary,
            PressButton::Secondary => &mut self.secondary,
        }
    }

    /// Record a button going down over `target` (or over nothing).
    pub fn on_down(&mut self, button: PressButton, target: Option<K>, position: Point) {
        *self.slot(button) = Some(Press {
            target,
            down_position: position,
        });
    }

    /// The active press for `button`, if any.
    pub fn active(&self, button: PressButton) -> Option<&Press<K>> {
        match button {
            PressButton::Primary => self.primary.as_ref(),
            PressButton::Secondary => self.secondary.as_ref(),
        }
    }

    /// Record a button going up over `target` and decide whether it clicks.
    ///
    /// `focused` is only consulted when `promiscuous` is set.
    pub fn on_up(
        &mut self,
        button: PressButton,
        target: Option<K>,
        focused: Option<K>,
        promiscuous: bool,
    ) -> ClickResult<K> {
        let press = self.slot(button).take();
        let origin = press.and_then(|p| p.target);
        let Some(target) = target else {
            return ClickResult::Suppressed(origin);
        };
        if origin.as_ref() == Some(&target) || (promiscuous && focused.as_ref() == Some(&target)) {
            ClickResult::Click(target)
        } else {
            ClickResult::Suppressed(origin)
        }
    }

    /// Forget any press of `button`, for example after it turned into a drag.
    pub fn cancel(&mut self, button: PressButton) -> Option<Press<K>> {
        self.slot(button).take()
    }

    /// Drop presses whose target no longer satisfies `alive`.
    pub fn retain(&mut self, mut alive: impl FnMut(&K) -> bool) {
        for slot in [&mut self.primary, &mut self.secondary] {
            if let Some(p) = slot
                && let Some(t) = &p.target
                && !alive(t)
            {
                p.target = None;
            }
        }
    }
}
