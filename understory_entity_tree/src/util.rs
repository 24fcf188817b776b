// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect, Size, Vec2};

/// Floor both axes of a size, keeping each at least one pixel.
pub(crate) fn floor_size(size: Size) -> Size {
    let s = size.floor();
    Size::new(s.width.max(1.0), s.height.max(1.0))
}

/// Shrink `rect` by `pad` on every side, keeping at least one pixel per axis.
pub(crate) fn inset(rect: Rect, pad: Vec2) -> Rect {
    let pad = pad.floor();
    let x0 = rect.x0 + pad.x;
    let y0 = rect.y0 + pad.y;
    let w = (rect.width() - 2.0 * pad.x).max(1.0);
    let h = (rect.height() - 2.0 * pad.y).max(1.0);
    Rect::from_origin_size(Point::new(x0, y0), Size::new(w, h))
}

/// Clamp an origin so a box of `size` stays inside `bounds` where possible.
pub(crate) fn clamp_origin(origin: Point, size: Size, bounds: Rect) -> Point {
    let max_x = (bounds.x1 - size.width).max(bounds.x0);
    let max_y = (bounds.y1 - size.height).max(bounds.y0);
    Point::new(
        origin.x.clamp(bounds.x0, max_x),
        origin.y.clamp(bounds.y0, max_y),
    )
}
