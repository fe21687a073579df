// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure placement math for the arrangement algorithms.

use alloc::vec::Vec;

use arbor_geometry::quantize;
use arbor_items::JustifiedLastRow;
use kurbo::{Point, Rect, Size};

/// Letterbox tolerance for spatial pages: the viewport fills the page exactly
/// while `viewport aspect / natural aspect` stays within this band of 1.
pub const SPATIAL_ASPECT_TOLERANCE: f64 = 0.25;

/// Minimum rendered width (px) at which a child page expands its children.
pub const PAGE_EXPAND_MIN_PX: f64 = 96.0;

/// Minimum rendered width (px) below which an element becomes a placeholder.
pub const DETAIL_MIN_PX: f64 = 40.0;

/// Width-to-height ratio of a grid cell.
pub const GRID_CELL_ASPECT: f64 = 1.5;

/// Cell margin on each side, as a fraction of cell width.
pub const GRID_CELL_MARGIN_FRACTION: f64 = 0.01;

/// Height of one list row in pixels.
pub const LIST_ROW_HEIGHT_PX: f64 = 24.0;

/// Pixels per block inside list rows (used for pane-width resizing).
pub const LIST_BLOCK_PX: f64 = 24.0;

/// Target justified row height as a fraction of the page width.
pub const JUSTIFIED_ROW_FRACTION: f64 = 0.2;

/// Tolerance band around the target justified row height.
pub const JUSTIFIED_TOLERANCE: f64 = 0.25;

/// The page rectangle of a spatial page within `viewport`.
///
/// While the viewport aspect is within [`SPATIAL_ASPECT_TOLERANCE`] of the
/// page's natural aspect the viewport is used exactly (blocks stretch a
/// little). Beyond the band the page is letterboxed: the largest centered
/// rectangle whose aspect sits on the nearest edge of the band.
#[must_use]
pub fn spatial_page_rect(viewport: Rect, natural_aspect: f64) -> Rect {
    debug_assert!(natural_aspect > 0.0, "natural aspect must be positive");
    let vw = viewport.width();
    let vh = viewport.height();
    if vw <= 0.0 || vh <= 0.0 {
        return viewport;
    }
    let ratio = (vw / vh) / natural_aspect;
    if (ratio - 1.0).abs() <= SPATIAL_ASPECT_TOLERANCE {
        return viewport;
    }
    let target_aspect = if ratio > 1.0 {
        // Viewport too wide: clamp to the wide edge of the band.
        natural_aspect * (1.0 + SPATIAL_ASPECT_TOLERANCE)
    } else {
        natural_aspect * (1.0 - SPATIAL_ASPECT_TOLERANCE)
    };
    let (w, h) = if vw / vh > target_aspect {
        (vh * target_aspect, vh)
    } else {
        (vw, vw / target_aspect)
    };
    let x0 = viewport.x0 + (vw - w) / 2.0;
    let y0 = viewport.y0 + (vh - h) / 2.0;
    quantize(Rect::new(x0, y0, x0 + w, y0 + h))
}

/// Number of rows a grid with `cols` columns needs for `n` children.
#[must_use]
pub fn grid_row_count(n: usize, cols: usize) -> usize {
    debug_assert!(cols > 0, "grid needs at least one column");
    n.div_ceil(cols)
}

/// The inner rectangle of grid cell `index` (row-major), inset by the cell
/// margin on each side, within a child area `width` px wide.
#[must_use]
pub fn grid_cell_rect(width: f64, cols: usize, index: usize) -> Rect {
    debug_assert!(cols > 0, "grid needs at least one column");
    let cell_w = width / cols as f64;
    let cell_h = cell_w / GRID_CELL_ASPECT;
    let margin = cell_w * GRID_CELL_MARGIN_FRACTION;
    let col = index % cols;
    let row = index / cols;
    let x0 = col as f64 * cell_w;
    let y0 = row as f64 * cell_h;
    quantize(Rect::new(
        x0 + margin,
        y0 + margin,
        x0 + cell_w - margin,
        y0 + cell_h - margin,
    ))
}

/// The rectangle of list row `index` in a pane `pane_width` px wide.
#[must_use]
pub fn list_row_rect(pane_width: f64, index: usize) -> Rect {
    let y0 = index as f64 * LIST_ROW_HEIGHT_PX;
    quantize(Rect::new(0.0, y0, pane_width, y0 + LIST_ROW_HEIGHT_PX))
}

/// Packs items with the given aspect ratios into justified rows across
/// `width` px, returning one rectangle per item (same order as `aspects`).
///
/// Rows are closed once their justified height drops to the target height;
/// the final short row follows `last`.
#[must_use]
pub fn justified_rects(aspects: &[f64], width: f64, last: JustifiedLastRow) -> Vec<Rect> {
    let mut rects = Vec::with_capacity(aspects.len());
    if aspects.is_empty() || width <= 0.0 {
        return rects;
    }
    let target_h = width * JUSTIFIED_ROW_FRACTION;
    let max_h = target_h * (1.0 + JUSTIFIED_TOLERANCE);

    let mut y = 0.0;
    let mut row_start = 0;
    let mut aspect_sum = 0.0;
    for (i, aspect) in aspects.iter().enumerate() {
        debug_assert!(*aspect > 0.0, "aspect ratios must be positive");
        aspect_sum += aspect.max(0.05);
        let is_last = i + 1 == aspects.len();
        let row_h = width / aspect_sum;
        if row_h <= target_h || is_last {
            let (h, mut x) = if row_h <= max_h {
                // Justify: stretch to the full width.
                (row_h, 0.0)
            } else {
                // A short final row.
                match last {
                    JustifiedLastRow::Justify => (row_h, 0.0),
                    JustifiedLastRow::LeftAlign => (target_h, 0.0),
                    JustifiedLastRow::Center => {
                        (target_h, (width - aspect_sum * target_h) / 2.0)
                    }
                }
            };
            for a in &aspects[row_start..=i] {
                let w = a.max(0.05) * h;
                rects.push(quantize(Rect::new(x, y, x + w, y + h)));
                x += w;
            }
            y += h;
            row_start = i + 1;
            aspect_sum = 0.0;
        }
    }
    rects
}

/// Total content height of justified rows (bottom edge of the last rect).
#[must_use]
pub fn justified_content_height(rects: &[Rect]) -> f64 {
    rects.iter().fold(0.0, |acc, r| acc.max(r.y1))
}

/// Positions for a vertical document flow: given each item's height, returns
/// the top offset of each item and the total height.
#[must_use]
pub fn document_flow(heights: &[f64]) -> (Vec<f64>, f64) {
    let mut ys = Vec::with_capacity(heights.len());
    let mut y = 0.0;
    for h in heights {
        ys.push(y);
        y += h.max(0.0);
    }
    (ys, y)
}

/// Center of `r`.
#[must_use]
pub fn rect_center(r: Rect) -> Point {
    Point::new((r.x0 + r.x1) / 2.0, (r.y0 + r.y1) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spatial_rect_fills_viewport_within_tolerance() {
        // Natural aspect 1.6, viewport aspect 1.5: ratio 0.9375, inside band.
        let vp = Rect::new(0.0, 0.0, 1500.0, 1000.0);
        assert_eq!(spatial_page_rect(vp, 1.6), vp);
    }

    #[test]
    fn spatial_rect_letterboxes_a_very_wide_viewport() {
        let vp = Rect::new(0.0, 0.0, 4000.0, 1000.0);
        let r = spatial_page_rect(vp, 1.6);
        // Clamped to aspect 2.0: 2000x1000, centered.
        assert_eq!(r, Rect::new(1000.0, 0.0, 3000.0, 1000.0));
    }

    #[test]
    fn spatial_rect_letterboxes_a_very_tall_viewport() {
        let vp = Rect::new(0.0, 0.0, 1000.0, 4000.0);
        let r = spatial_page_rect(vp, 1.6);
        // Clamped to aspect 1.2: 1000 x 833, centered vertically.
        assert!(r.width() == 1000.0);
        assert!((r.height() - (1000.0 / 1.2)).abs() <= 1.0);
        assert!((rect_center(r).y - 2000.0).abs() <= 1.0);
    }

    #[test]
    fn grid_cells_tile_row_major_with_fractional_margin() {
        let width = 400.0;
        let cols = 4;
        let cell_w = 100.0;
        let margin = cell_w * GRID_CELL_MARGIN_FRACTION;
        for index in 0..9 {
            let r = grid_cell_rect(width, cols, index);
            let col = index % cols;
            let row = index / cols;
            let raw = Rect::new(
                col as f64 * cell_w + margin,
                row as f64 * (cell_w / GRID_CELL_ASPECT) + margin,
                (col + 1) as f64 * cell_w - margin,
                (row + 1) as f64 * (cell_w / GRID_CELL_ASPECT) - margin,
            );
            assert_eq!(r, quantize(raw));
        }
        assert_eq!(grid_row_count(9, 4), 3);
    }

    #[test]
    fn list_rows_stack_at_fixed_height() {
        let r0 = list_row_rect(200.0, 0);
        let r5 = list_row_rect(200.0, 5);
        assert_eq!(r0.height(), LIST_ROW_HEIGHT_PX);
        assert_eq!(r5.y0, 5.0 * LIST_ROW_HEIGHT_PX);
        assert_eq!(r5.width(), 200.0);
    }

    #[test]
    fn justified_full_rows_span_the_width() {
        // Eight square items across 1000 px; target row height 200 px means
        // five squares per row.
        let aspects = [1.0; 8];
        let rects = justified_rects(&aspects, 1000.0, JustifiedLastRow::LeftAlign);
        assert_eq!(rects.len(), 8);
        // The second row starts where the first ends.
        assert_eq!(rects[5].y0, rects[0].y1);
        assert!((rects[5].y0 - 200.0).abs() <= 1.0);
        let first_row_right = rects[..5].iter().fold(0.0_f64, |m, r| m.max(r.x1));
        assert!((first_row_right - 1000.0).abs() <= 1.0);
    }

    #[test]
    fn justified_short_last_row_honors_policy() {
        let aspects = [1.0; 6];
        let left = justified_rects(&aspects, 1000.0, JustifiedLastRow::LeftAlign);
        assert_eq!(left[5].x0, 0.0);
        assert!((left[5].height() - 200.0).abs() <= 1.0);

        let centered = justified_rects(&aspects, 1000.0, JustifiedLastRow::Center);
        assert!((rect_center(centered[5]).x - 500.0).abs() <= 1.0);
    }

    #[test]
    fn justify_policy_stretches_the_short_last_row() {
        let aspects = [1.0; 6];
        let rects = justified_rects(&aspects, 1000.0, JustifiedLastRow::Justify);
        // The lone item of the last row spans the full width.
        assert_eq!(rects[5].x0, 0.0);
        assert!((rects[5].x1 - 1000.0).abs() <= 1.0);
        assert!((rects[5].height() - 1000.0).abs() <= 1.0);
    }

    #[test]
    fn document_flow_accumulates_heights() {
        let (ys, total) = document_flow(&[10.0, 20.0, 30.0]);
        assert_eq!(ys, alloc::vec![0.0, 10.0, 30.0]);
        assert_eq!(total, 60.0);
    }
}
