// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree-wide configuration and the per-frame host context.

use kurbo::Rect;

use crate::types::NodeId;

/// Configuration stored in a [`Tree`](crate::Tree).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeConfig {
    /// Turn structural violations into logged no-ops.
    ///
    /// When `false` (the default), attaching an already-parented node, detaching from the
    /// wrong parent, or reading a missing style property returns an error. When `true`,
    /// those calls log a warning and return `Ok(false)` / `Ok(None)`.
    pub tolerant: bool,
}

impl TreeConfig {
    /// Configuration with tolerant mode enabled.
    pub const fn tolerant() -> Self {
        Self { tolerant: true }
    }
}

/// State owned by the host loop and passed into layout, routing, and drawing.
///
/// Roots resolve to [`Context::viewport`]. Changing the viewport or the scale bumps
/// [`Context::version`], which roots observe the same way children observe their
/// parent's geometry version.
#[derive(Clone, Debug)]
pub struct Context {
    viewport: Rect,
    scale: f64,
    version: u64,
    /// Node that receives wheel input regardless of the pointer target (for example a
    /// scrollbar that captured the wheel).
    pub active: Option<NodeId>,
}

impl Context {
    /// Create a context for a viewport at scale `1.0`.
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            scale: 1.0,
            version: 0,
            active: None,
        }
    }

    /// Builder form of [`Context::set_scale`].
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.set_scale(scale);
        self
    }

    /// Rectangle roots resolve to.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Global scale applied to pixel sizes, offsets, padding, and spacing.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Geometry version observed by roots.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the viewport. Roots recompute on their next resolve if it changed.
    pub fn set_viewport(&mut self, viewport: Rect) {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.version += 1;
        }
    }

    /// Replace the global scale. Must be finite and positive.
    pub fn set_scale(&mut self, scale: f64) {
        debug_assert!(
            scale.is_finite() && scale > 0.0,
            "scale must be finite and positive, got {scale}"
        );
        if self.scale != scale {
            self.scale = scale;
            self.version += 1;
        }
    }
}
