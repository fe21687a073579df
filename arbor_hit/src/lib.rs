// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Hit: pointer hit testing over an arranged visual-element tree.
//!
//! A hit query walks the cached tree front to back: overlays above page
//! content, later siblings above earlier ones, children above their
//! container's own hitboxes. The result names the element hit, the union of
//! hitbox flags under the point, and the interaction context the pointer
//! machinery needs (the nearest interactive root, the enclosing composite,
//! the deepest spatial page under the cursor).
//!
//! Hit queries never mutate the cache and are cheap enough to run on every
//! pointer move.
//!
//! ## Minimal example
//!
//! ```rust
//! use arbor_arrange::{OverlayState, VesCache};
//! use arbor_geometry::HitboxFlags;
//! use arbor_hit::{HitOptions, hit_test};
//! use arbor_items::{Item, MemoryStore, PageItem};
//! use kurbo::{Point, Rect};
//!
//! let mut store = MemoryStore::new();
//! let page = store.add_root(Item::page(store.mint_id(), PageItem::default()));
//! store.add_child(
//!     page,
//!     Item::note(store.mint_id(), Point::new(0.0, 0.0), 240.0).with_title("hi"),
//! );
//! let mut cache = VesCache::new();
//! cache.full_arrange(
//!     &store,
//!     &OverlayState::default(),
//!     page,
//!     Rect::new(0.0, 0.0, 1600.0, 1000.0),
//! );
//!
//! let hit = hit_test(&cache, &store, Point::new(100.0, 100.0), &HitOptions::default()).unwrap();
//! assert!(hit.flags.contains(HitboxFlags::MOVE));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use arbor_arrange::{VeFlags, VePath, VesCache, VisualElement};
use arbor_geometry::{HitboxFlags, HitboxMeta, resolve_hitboxes};
use arbor_items::{Arrangement, ItemId, ItemStore};
use kurbo::Point;

/// Options narrowing a hit query.
#[derive(Copy, Clone, Debug)]
pub struct HitOptions<'a> {
    /// Items to skip entirely, subtree included. A drag passes the dragged
    /// items here so they do not hit themselves.
    pub ignore: &'a [ItemId],
    /// Whether expand handles count. Disabled while dragging so a drop on a
    /// page's corner is a plain drop.
    pub allow_expand: bool,
    /// Whether the walk descends into embedded interactive roots (expanded
    /// child pages, popup content, the dock). When off, an embedded root is
    /// opaque and hits resolve to the root element itself.
    pub allow_embedded: bool,
}

impl Default for HitOptions<'_> {
    fn default() -> Self {
        Self {
            ignore: &[],
            allow_expand: true,
            allow_embedded: true,
        }
    }
}

/// The outcome of a hit query.
#[derive(Clone, Debug, PartialEq)]
pub struct HitInfo {
    /// The element hit.
    pub path: VePath,
    /// Union of the flags of every hitbox under the point. Empty means the
    /// bare canvas of a spatial page (marquee selection territory).
    pub flags: HitboxFlags,
    /// Metadata of the topmost hitbox carrying any, such as the column
    /// index of a column-resize strip.
    pub meta: Option<HitboxMeta>,
    /// The enclosing composite when the hit element is one of its members.
    pub composite: Option<VePath>,
    /// The innermost interactive root containing the hit (the top-level
    /// page, an expanded child page, the popup, or the dock).
    pub root_path: VePath,
    /// The deepest detailed spatial page under the point; drops reposition
    /// within it.
    pub over_positionable: Option<VePath>,
}

/// Hit-tests `point` (viewport space) against the cached arrangement.
#[must_use]
pub fn hit_test(
    cache: &VesCache,
    store: &dyn ItemStore,
    point: Point,
    opts: &HitOptions<'_>,
) -> Option<HitInfo> {
    let root = cache.root_path()?;
    let origin = cache.get(root)?.bounds.origin();
    let walker = Walker {
        cache,
        store,
        opts,
    };
    walker.walk(root, origin, point, root.clone(), None)
}

struct Walker<'a> {
    cache: &'a VesCache,
    store: &'a dyn ItemStore,
    opts: &'a HitOptions<'a>,
}

impl Walker<'_> {
    /// Tests the element at `path`, whose own top-left sits at `origin` in
    /// viewport space.
    fn walk(
        &self,
        path: &VePath,
        origin: Point,
        p: Point,
        mut root_path: VePath,
        mut over_positionable: Option<VePath>,
    ) -> Option<HitInfo> {
        let ve = self.cache.get(path)?;
        if ve.is_placeholder() {
            return None;
        }
        let seg = path.last();
        if self.opts.ignore.contains(&seg.item)
            || seg.link.is_some_and(|l| self.opts.ignore.contains(&l))
        {
            return None;
        }
        let local = Point::new(p.x - origin.x, p.y - origin.y);
        let size = ve.bounds.size();
        if local.x < 0.0 || local.y < 0.0 || local.x > size.width || local.y > size.height {
            return None;
        }

        // Only the root element of an embedded surface starts an interaction
        // scope; its descendants inherit DOCK/POPUP flags but not this one.
        let embedded = ve.flags.contains(VeFlags::EMBEDDED_INTERACTIVE_ROOT);
        if embedded && path.depth() > 1 {
            if !self.opts.allow_embedded {
                // Opaque: the surface interacts as a single element.
                return self.own_hit(ve, local, root_path, over_positionable);
            }
            root_path = path.clone();
        }

        if ve.flags.contains(VeFlags::DETAILED) && self.is_spatial_page(ve) {
            over_positionable = Some(path.clone());
        }

        // Overlays are topmost, the popup modal over its bounds.
        for overlay in ve.overlays.iter().rev() {
            let Some(ove) = self.cache.get(overlay) else {
                continue;
            };
            let o = Point::new(origin.x + ove.bounds.x0, origin.y + ove.bounds.y0);
            if let Some(hit) = self.walk(overlay, o, p, root_path.clone(), over_positionable.clone())
            {
                return Some(hit);
            }
            if ove.flags.contains(VeFlags::POPUP)
                && seg_contains(p, o, ove)
            {
                // Swallow: nothing under the popup is reachable.
                return Some(HitInfo {
                    path: overlay.clone(),
                    flags: HitboxFlags::empty(),
                    meta: None,
                    composite: None,
                    root_path: overlay.clone(),
                    over_positionable: None,
                });
            }
        }

        // A composite's handle strip beats its members.
        let is_composite = ve
            .hitboxes
            .first()
            .is_some_and(|h| h.flags.contains(HitboxFlags::ATTACH_COMPOSITE));
        if is_composite {
            if let Some(handle) = ve.hitboxes.last() {
                if handle.flags.contains(HitboxFlags::MOVE) && handle.bounds.contains(local) {
                    // Resolve the full union so the resize corner, which lies
                    // inside the strip, still yields RESIZE.
                    return self.own_hit(ve, local, root_path, over_positionable);
                }
            }
        }

        // Attachment chips float above content.
        for att in ve.attachments.iter().rev() {
            let Some(ave) = self.cache.get(att) else {
                continue;
            };
            let o = Point::new(origin.x + ave.bounds.x0, origin.y + ave.bounds.y0);
            if let Some(hit) = self.walk(att, o, p, root_path.clone(), over_positionable.clone()) {
                return Some(hit);
            }
        }

        // Children, topmost (last) first, above the container's own boxes.
        let ca = ve.child_area_or_bounds();
        for child in ve.children.iter().rev() {
            let Some(cve) = self.cache.get(child) else {
                continue;
            };
            let o = Point::new(
                origin.x + ca.x0 + cve.bounds.x0,
                origin.y + ca.y0 + cve.bounds.y0,
            );
            if let Some(mut hit) =
                self.walk(child, o, p, root_path.clone(), over_positionable.clone())
            {
                if is_composite && hit.composite.is_none() {
                    hit.composite = Some(path.clone());
                }
                return Some(hit);
            }
        }

        self.own_hit(ve, local, root_path, over_positionable)
    }

    /// Resolves the element's own hitboxes, falling back to a bare-canvas
    /// hit on detailed spatial pages.
    fn own_hit(
        &self,
        ve: &VisualElement,
        local: Point,
        root_path: VePath,
        over_positionable: Option<VePath>,
    ) -> Option<HitInfo> {
        if let Some((mut flags, meta)) = resolve_hitboxes(&ve.hitboxes, local) {
            if !self.opts.allow_expand {
                flags.remove(HitboxFlags::EXPAND);
            }
            if !flags.is_empty() {
                return Some(HitInfo {
                    path: ve.path.clone(),
                    flags,
                    meta,
                    composite: None,
                    root_path,
                    over_positionable,
                });
            }
        }
        if ve.flags.contains(VeFlags::DETAILED) && self.is_spatial_page(ve) {
            return Some(HitInfo {
                path: ve.path.clone(),
                flags: HitboxFlags::empty(),
                meta: None,
                composite: None,
                root_path,
                over_positionable: Some(ve.path.clone()),
            });
        }
        None
    }

    fn is_spatial_page(&self, ve: &VisualElement) -> bool {
        self.store
            .get(ve.display_item)
            .and_then(|item| item.as_page())
            .is_some_and(|p| p.arrangement == Arrangement::Spatial)
    }
}

/// Whether viewport point `p` lies within an element whose top-left sits at
/// `origin`.
fn seg_contains(p: Point, origin: Point, ve: &VisualElement) -> bool {
    let size = ve.bounds.size();
    p.x >= origin.x && p.y >= origin.y && p.x <= origin.x + size.width && p.y <= origin.y + size.height
}
