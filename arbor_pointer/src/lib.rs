// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Pointer: the pointer interaction state machine.
//!
//! One [`PointerState`] tracks a single pointer from press to release. A
//! press starts out *ambiguous*; crossing the drag threshold promotes it to
//! the drag the pressed hitboxes allow (moving an item, resizing it,
//! dragging a column boundary, rubber-band selecting, moving the popup).
//! Releasing before the threshold fires the click behavior instead.
//!
//! Drags are proposals until release: [`PointerState::on_move`] returns a
//! transient [`DragProposal`] for the embedder to render, and only
//! [`PointerState::on_release`] writes through
//! [`arbor_items::ItemStoreMut`] and marks the arrangement stale. If the
//! document changes under an in-progress action (another collaborator, a
//! background load), the action is abandoned rather than committed against
//! stale geometry.
//!
//! Long presses are polled cooperatively: the embedder calls
//! [`PointerState::poll_long_press`] from its tick with a monotonic
//! millisecond clock; there are no timers or callbacks in here.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod state;

pub use state::{
    DOCK_MAX_PX, DOCK_MIN_PX, DRAG_THRESHOLD_PX, DragProposal, LONG_PRESS_MS, MouseAction,
    PointerEffect, PointerState,
};
