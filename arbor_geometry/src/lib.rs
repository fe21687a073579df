// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Geometry: block/pixel geometry primitives for spatial document layout.
//!
//! Arbor documents measure item geometry in resolution-independent **grid
//! units** ("gr"), where [`GRID_SIZE`] grid units make up one **block**
//! ("bl"). Layout works in blocks and emits pixels via a per-container
//! [`BlockSize`] conversion derived from the container's pixel bounds and its
//! declared inner size in blocks.
//!
//! This crate provides:
//!
//! - [`BlockSize`]: the pixel extent of one block inside a container, plus
//!   conversions from grid-unit and block coordinates to pixel rectangles.
//! - [`quantize`]: whole-pixel rounding of rectangle edges, so adjacent items
//!   share rounded edges and no subpixel seams appear between them.
//! - [`Hitbox`] / [`HitboxFlags`] / [`HitboxMeta`]: sub-regions of a visual
//!   element carrying interaction affordances (click, move, resize, …).
//! - [`line_count`]: the fixed text metric used to derive note heights.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect, Size};
//! use arbor_geometry::{BlockSize, GRID_SIZE};
//!
//! // A page 480x300 px with an inner size of 8x5 blocks: 60x60 px per block.
//! let block = BlockSize::of(Size::new(480.0, 300.0), Size::new(8.0, 5.0));
//! assert_eq!(block.w, 60.0);
//!
//! // An item at (60, 120) gr with a width of 120 gr is 2 blocks wide.
//! let r = block.rect_from_gr(Point::new(60.0, 120.0), Size::new(120.0, 60.0));
//! assert_eq!(r, Rect::new(60.0, 120.0, 180.0, 180.0));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod block;
mod hitbox;
mod text;

pub use block::{BlockSize, GRID_SIZE, quantize};
pub use hitbox::{Hitbox, HitboxFlags, HitboxMeta, resolve_hitboxes};
pub use text::{NOTE_CHARS_PER_BLOCK, line_count};
