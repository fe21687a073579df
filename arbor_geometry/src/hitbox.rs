// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hitboxes: sub-regions of a visual element carrying interaction affordances.

use kurbo::{Point, Rect};

bitflags::bitflags! {
    /// Interaction affordances a hitbox can carry.
    ///
    /// A single hitbox may carry several flags (a region that is both
    /// clickable and the start of a move gesture, for instance).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct HitboxFlags: u16 {
        /// Activates the element (open, follow, toggle).
        const CLICK            = 0b0000_0001;
        /// Starts a move gesture for the element.
        const MOVE             = 0b0000_0010;
        /// Starts a resize gesture for the element.
        const RESIZE           = 0b0000_0100;
        /// Starts a column-width resize (tables, list panes, dock edge).
        const COL_RESIZE       = 0b0000_1000;
        /// Opens the element as a popup over the current page.
        const OPEN_POPUP       = 0b0001_0000;
        /// Drop region that attaches a dragged item to this element.
        const ATTACH           = 0b0010_0000;
        /// Drop region that inserts a dragged item into a composite.
        const ATTACH_COMPOSITE = 0b0100_0000;
        /// Expands or collapses the element in place.
        const EXPAND           = 0b1000_0000;
    }
}

/// Extra per-hitbox data.
///
/// Present only where the affordance needs a parameter, such as which column
/// boundary a [`HitboxFlags::COL_RESIZE`] hitbox controls.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HitboxMeta {
    /// Column index for column-resize hitboxes.
    pub col: usize,
}

/// A sub-region of a visual element with an interaction affordance.
///
/// Bounds are relative to the owning element's top-left corner. Hitboxes are
/// ordered background to foreground: when several hitboxes contain a point,
/// flags accumulate and the metadata of the topmost hitbox wins.
#[derive(Clone, Debug, PartialEq)]
pub struct Hitbox {
    /// The affordances this region carries.
    pub flags: HitboxFlags,
    /// Region relative to the owning element.
    pub bounds: Rect,
    /// Optional parameter for the affordance.
    pub meta: Option<HitboxMeta>,
}

impl Hitbox {
    /// Creates a hitbox with no metadata.
    #[must_use]
    pub const fn new(flags: HitboxFlags, bounds: Rect) -> Self {
        Self {
            flags,
            bounds,
            meta: None,
        }
    }

    /// Creates a column-resize hitbox for column boundary `col`.
    #[must_use]
    pub const fn col_resize(bounds: Rect, col: usize) -> Self {
        Self {
            flags: HitboxFlags::COL_RESIZE,
            bounds,
            meta: Some(HitboxMeta { col }),
        }
    }
}

/// Resolves a point (in the owning element's coordinate space) against an
/// ordered hitbox list.
///
/// Returns the union of flags of all hitboxes containing the point, plus the
/// metadata of the topmost (last) containing hitbox that carries any, or
/// `None` if no hitbox contains the point.
#[must_use]
pub fn resolve_hitboxes(hitboxes: &[Hitbox], p: Point) -> Option<(HitboxFlags, Option<HitboxMeta>)> {
    let mut flags = HitboxFlags::empty();
    let mut meta = None;
    let mut any = false;
    for hb in hitboxes {
        if hb.bounds.contains(p) {
            any = true;
            flags |= hb.flags;
            if hb.meta.is_some() {
                meta = hb.meta;
            }
        }
    }
    any.then_some((flags, meta))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_misses_outside_all_hitboxes() {
        let hbs = [Hitbox::new(
            HitboxFlags::CLICK,
            Rect::new(0.0, 0.0, 10.0, 10.0),
        )];
        assert_eq!(resolve_hitboxes(&hbs, Point::new(20.0, 20.0)), None);
    }

    #[test]
    fn resolve_unions_flags_of_overlapping_hitboxes() {
        let hbs = [
            Hitbox::new(
                HitboxFlags::CLICK | HitboxFlags::MOVE,
                Rect::new(0.0, 0.0, 100.0, 100.0),
            ),
            Hitbox::new(HitboxFlags::RESIZE, Rect::new(92.0, 92.0, 100.0, 100.0)),
        ];
        let (flags, meta) = resolve_hitboxes(&hbs, Point::new(95.0, 95.0)).unwrap();
        assert_eq!(
            flags,
            HitboxFlags::CLICK | HitboxFlags::MOVE | HitboxFlags::RESIZE
        );
        assert_eq!(meta, None);
    }

    #[test]
    fn resolve_takes_topmost_meta() {
        let hbs = [
            Hitbox::col_resize(Rect::new(0.0, 0.0, 100.0, 100.0), 0),
            Hitbox::col_resize(Rect::new(40.0, 0.0, 100.0, 100.0), 2),
        ];
        let (_, meta) = resolve_hitboxes(&hbs, Point::new(50.0, 5.0)).unwrap();
        assert_eq!(meta, Some(HitboxMeta { col: 2 }));
    }
}
