// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Arrange: the arrangement engine and visual-element cache.
//!
//! Arrangement turns a page of [`arbor_items`] into a tree of **visual
//! elements**: transient, pixel-positioned nodes carrying bounds, hitboxes,
//! and structural flags. Each element is identified by a [`VePath`], the
//! chain of item (and link) ids from the top-level page down, so the same
//! item reached through two routes (a link, a list row plus its detail
//! pane, a popup) yields distinct elements.
//!
//! The engine is pull-based and synchronous: it arranges whatever the store
//! holds right now and *requests* loads for containers whose children have
//! not arrived, never blocking on them.
//!
//! - [`VesCache`] owns the arranged tree, keyed by path, and re-derives
//!   single subtrees in place where the parent arrangement permits it.
//! - [`InvalidationQueue`] batches staleness marks from store mutations and
//!   flushes them as the minimal set of re-arrangements.
//! - [`OverlayState`] carries the transient popup and dock state that the
//!   embedder owns.
//!
//! ## Minimal example
//!
//! ```rust
//! use arbor_arrange::{OverlayState, VesCache};
//! use arbor_items::{Item, MemoryStore, PageItem};
//! use kurbo::{Point, Rect};
//!
//! let mut store = MemoryStore::new();
//! let page = store.add_root(Item::page(store.mint_id(), PageItem::default()));
//! store.add_child(
//!     page,
//!     Item::note(store.mint_id(), Point::new(60.0, 60.0), 240.0).with_title("hi"),
//! );
//!
//! let mut cache = VesCache::new();
//! let viewport = Rect::new(0.0, 0.0, 1600.0, 1000.0);
//! let root = cache.full_arrange(&store, &OverlayState::default(), page, viewport);
//! assert_eq!(cache.get(&root).unwrap().children.len(), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod arrange;
mod cache;
mod layout;
mod ve;

pub use cache::{
    CacheDebugInfo, DEFAULT_DOCK_WIDTH_PX, InvalidationQueue, OverlayState, VesCache,
};
pub use layout::{
    DETAIL_MIN_PX, GRID_CELL_ASPECT, GRID_CELL_MARGIN_FRACTION, JUSTIFIED_ROW_FRACTION,
    JUSTIFIED_TOLERANCE, LIST_BLOCK_PX, LIST_ROW_HEIGHT_PX, PAGE_EXPAND_MIN_PX,
    SPATIAL_ASPECT_TOLERANCE, document_flow, grid_cell_rect, grid_row_count,
    justified_content_height, justified_rects, list_row_rect, rect_center, spatial_page_rect,
};
pub use ve::{PathSeg, SegKind, VeFlags, VePath, VisualElement};
