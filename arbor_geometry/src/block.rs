// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid-unit to pixel conversion.

// In no_std builds `round` comes from Kurbo's polyfill trait.
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Size};

/// Number of grid units per block.
///
/// Persisted item geometry (positions, widths) is expressed in grid units so
/// that items can sit at sub-block offsets; layout itself reasons in blocks.
pub const GRID_SIZE: f64 = 60.0;

/// The pixel extent of one block inside a particular container.
///
/// Derived per container from its pixel bounds and its declared inner size in
/// blocks. Blocks are not required to be square: a container letterboxed away
/// from its natural aspect stretches blocks along one axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockSize {
    /// Width of one block in pixels.
    pub w: f64,
    /// Height of one block in pixels.
    pub h: f64,
}

impl BlockSize {
    /// Computes the block size for a container of `bounds_px` pixels with an
    /// inner size of `inner_bl` blocks.
    ///
    /// # Panics
    ///
    /// Debug-asserts that the inner size is positive; a container with a
    /// non-positive declared inner size is a contract violation.
    #[must_use]
    pub fn of(bounds_px: Size, inner_bl: Size) -> Self {
        debug_assert!(
            inner_bl.width > 0.0 && inner_bl.height > 0.0,
            "container inner size must be positive"
        );
        Self {
            w: bounds_px.width / inner_bl.width,
            h: bounds_px.height / inner_bl.height,
        }
    }

    /// A uniform block size of `px` pixels per block on both axes.
    #[must_use]
    pub const fn uniform(px: f64) -> Self {
        Self { w: px, h: px }
    }

    /// Converts a grid-unit position and size into a whole-pixel rectangle.
    #[must_use]
    pub fn rect_from_gr(self, pos_gr: Point, size_gr: Size) -> Rect {
        self.rect_from_bl(
            Point::new(pos_gr.x / GRID_SIZE, pos_gr.y / GRID_SIZE),
            Size::new(size_gr.width / GRID_SIZE, size_gr.height / GRID_SIZE),
        )
    }

    /// Converts a block position and size into a whole-pixel rectangle.
    #[must_use]
    pub fn rect_from_bl(self, pos_bl: Point, size_bl: Size) -> Rect {
        quantize(Rect::new(
            pos_bl.x * self.w,
            pos_bl.y * self.h,
            (pos_bl.x + size_bl.width) * self.w,
            (pos_bl.y + size_bl.height) * self.h,
        ))
    }

    /// Pixels per grid unit along each axis.
    #[must_use]
    pub fn px_per_gr(self) -> (f64, f64) {
        (self.w / GRID_SIZE, self.h / GRID_SIZE)
    }
}

/// Rounds each edge of `r` to a whole pixel.
///
/// Rounding edges (rather than origin plus size) means two rectangles that
/// shared an edge before rounding still share it afterwards, which avoids
/// subpixel seam artifacts between adjacent items.
#[must_use]
pub fn quantize(r: Rect) -> Rect {
    Rect::new(r.x0.round(), r.y0.round(), r.x1.round(), r.y1.round())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_size_from_bounds() {
        let b = BlockSize::of(Size::new(480.0, 300.0), Size::new(8.0, 5.0));
        assert_eq!(b.w, 60.0);
        assert_eq!(b.h, 60.0);

        let stretched = BlockSize::of(Size::new(480.0, 150.0), Size::new(8.0, 5.0));
        assert_eq!(stretched.w, 60.0);
        assert_eq!(stretched.h, 30.0);
    }

    #[test]
    fn gr_conversion_round_trips_through_blocks() {
        let b = BlockSize::uniform(60.0);
        let r = b.rect_from_gr(Point::new(120.0, 60.0), Size::new(180.0, 60.0));
        assert_eq!(r, Rect::new(120.0, 60.0, 300.0, 120.0));
    }

    #[test]
    fn quantize_preserves_shared_edges() {
        let b = BlockSize::of(Size::new(500.0, 500.0), Size::new(3.0, 3.0));
        let left = b.rect_from_bl(Point::new(0.0, 0.0), Size::new(1.0, 1.0));
        let right = b.rect_from_bl(Point::new(1.0, 0.0), Size::new(1.0, 1.0));
        // Adjacent cells meet exactly: no seam, no overlap.
        assert_eq!(left.x1, right.x0);
        assert_eq!(left.x1.fract(), 0.0);
    }

    #[test]
    fn quantize_rounds_all_edges() {
        let r = quantize(Rect::new(0.4, 0.6, 10.5, 19.2));
        assert_eq!(r, Rect::new(0.0, 1.0, 11.0, 19.0));
    }

    #[test]
    fn px_per_gr_matches_block_scale() {
        let b = BlockSize::uniform(60.0);
        let (x, y) = b.px_per_gr();
        assert_eq!(x, 1.0);
        assert_eq!(y, 1.0);
    }
}
