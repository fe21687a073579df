// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Items: the document model consumed by the arrangement engine.
//!
//! An Arbor document is a hierarchy of **items**: pages, tables, notes,
//! composites, images, ratings, and links. Containers hold an ordered list of
//! children plus an optional list of attachments; links are indirection nodes
//! pointing at another item by id.
//!
//! This crate provides:
//!
//! - [`Item`] / [`ItemKind`]: the item types and their type-specific fields
//!   (spatial geometry in grid units, per-page arrangement configuration,
//!   table column widths, link targets, …).
//! - [`OrderKey`]: fractional ordering keys for stable sibling sort that is
//!   independent of insertion order. A new key can always be generated
//!   between two existing keys without renumbering siblings.
//! - [`ItemStore`] / [`ItemStoreMut`]: the read and write interfaces the
//!   engine consumes. Persistence and network transport live entirely behind
//!   these traits; the engine never fetches or persists anything itself.
//! - [`MemoryStore`]: an in-memory reference implementation used by tests and
//!   by embedders that keep the whole document resident.
//!
//! ## Child loading
//!
//! A container's children may not be loaded yet (they are fetched lazily by
//! an external loader). [`ItemStore::is_children_loaded`] reports this; the
//! arrangement engine arranges with whatever is present and *requests* loads
//! rather than awaiting them, so a store must never block in `children`.
//!
//! ## Minimal example
//!
//! ```rust
//! use arbor_items::{Item, ItemStore, MemoryStore, OrderKey, PageItem};
//! use kurbo::Point;
//!
//! let mut store = MemoryStore::new();
//! let page = store.add_root(Item::page(store.mint_id(), PageItem::default()));
//! let note = Item::note(store.mint_id(), Point::new(60.0, 60.0), 240.0);
//! let note = store.add_child(page, note);
//!
//! assert_eq!(store.children(page), &[note]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod item;
mod order;
mod store;

pub use item::{
    Arrangement, CompositeItem, ImageItem, Item, ItemId, ItemKind, JustifiedLastRow, LinkItem,
    MIN_TABLE_HEIGHT_GR, NoteItem, PageItem, RatingItem, Relationship, Spatial, TableItem,
};
pub use order::OrderKey;
pub use store::{ItemStore, ItemStoreMut, MemoryStore};
