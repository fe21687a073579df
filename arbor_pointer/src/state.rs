// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press/drag/release tracking and commit.

use alloc::vec::Vec;

use arbor_arrange::{
    InvalidationQueue, LIST_BLOCK_PX, LIST_ROW_HEIGHT_PX, OverlayState, SegKind, VeFlags, VePath,
    VesCache,
};
use arbor_geometry::{BlockSize, GRID_SIZE, HitboxFlags};
use arbor_hit::{HitInfo, HitOptions, hit_test};
use arbor_items::{
    Arrangement, Item, ItemId, ItemKind, ItemStore, ItemStoreMut, OrderKey, Relationship, Spatial,
};
use kurbo::{Point, Rect, Size, Vec2};

/// How long a press must be held, without moving, to count as a long press.
pub const LONG_PRESS_MS: u64 = 750;

/// Manhattan distance a pointer must travel before an ambiguous press
/// becomes a drag.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// Narrowest the dock strip resizes to, px.
pub const DOCK_MIN_PX: f64 = 80.0;

/// Widest the dock strip resizes to, px.
pub const DOCK_MAX_PX: f64 = 480.0;

/// What the current pointer action is doing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MouseAction {
    /// Pressed, not yet past the drag threshold.
    Ambiguous,
    /// Dragging an item to a new position (or parent).
    Moving,
    /// Dragging the popup by its border.
    MovingPopup,
    /// Dragging an item's resize handle.
    Resizing,
    /// Dragging a table column boundary.
    ResizingColumn,
    /// Dragging the popup's resize handle.
    ResizingPopup,
    /// Dragging the dock strip's edge.
    ResizingDock,
    /// Dragging a list page's pane boundary.
    ResizingListPageColumn,
    /// Rubber-band selecting on a page canvas.
    Selecting,
}

/// What the embedder should do after a release, click, or long press.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEffect {
    /// Nothing.
    None,
    /// A plain click on the element.
    Click(VePath),
    /// Open the page's popup showing this item.
    OpenPopup(ItemId),
    /// Navigate into this page.
    EnterPage(ItemId),
    /// Open the rating editor for this element.
    OpenRating(VePath),
    /// Toggle whether this child page shows expanded.
    ToggleExpand(ItemId),
    /// Replace the selection with these items.
    SetSelection(Vec<ItemId>),
    /// Show the context menu for this element.
    ContextMenu(VePath),
    /// Begin editing this item's text.
    EditItem(ItemId),
}

/// A transient drag outcome for the embedder to render. Nothing is
/// committed until release.
#[derive(Clone, Debug, PartialEq)]
pub enum DragProposal {
    /// Proposed absolute bounds of the moved element.
    Move(Rect),
    /// Proposed popup center in the page's grid units.
    MovePopup(Point),
    /// Proposed width of the resized element, px.
    Resize(f64),
    /// Proposed popup width in grid units.
    ResizePopup(f64),
    /// Proposed width of the dragged column, blocks.
    ResizeColumn(usize, f64),
    /// Proposed dock width, px.
    ResizeDock(f64),
    /// Proposed list pane width, blocks.
    ResizeListPane(f64),
    /// Current rubber-band rectangle, viewport space.
    Select(Rect),
}

/// Snapshot of everything a drag commit needs, taken at press time so the
/// commit is independent of re-arrangements that happen mid-drag.
#[derive(Clone, Debug)]
struct Action {
    mode: MouseAction,
    drag: MouseAction,
    path: VePath,
    item: ItemId,
    flags: HitboxFlags,
    col: usize,
    start: Point,
    start_bounds: Rect,
    start_spatial: Option<Spatial>,
    start_width_bl: f64,
    start_table_height_gr: f64,
    popup_start: (Point, f64),
    block: BlockSize,
    revision: u64,
    deadline_ms: Option<u64>,
}

/// Tracks one pointer from press to release.
#[derive(Debug, Default)]
pub struct PointerState {
    active: Option<Action>,
}

impl PointerState {
    /// Creates an idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current action, if a press is in progress.
    #[must_use]
    pub fn action(&self) -> Option<MouseAction> {
        self.active.as_ref().map(|a| a.mode)
    }

    /// Whether a press is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Abandons the action without committing anything.
    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Starts tracking a press on `hit` at `point` (viewport space).
    pub fn on_press(
        &mut self,
        cache: &VesCache,
        store: &dyn ItemStore,
        hit: &HitInfo,
        point: Point,
        now_ms: u64,
    ) {
        self.active = None;
        let Some(ve) = cache.get(&hit.path) else {
            return;
        };
        let seg = hit.path.last();
        let item = seg.link.unwrap_or(seg.item);
        let drag = resolve_drag(cache, store, hit);
        let Some(start_bounds) = cache.abs_bounds(&hit.path) else {
            return;
        };

        let source = store.get(item);
        let display = store.get(ve.display_item);
        let start_spatial = source.and_then(Item::spatial);
        // Only a real table commits a height on resize; a link to one keeps
        // its own one-block geometry.
        let start_table_height_gr = source.and_then(Item::as_table).map_or(0.0, |t| t.height_gr);
        let col = hit.meta.map_or(0, |m| m.col);
        let start_width_bl = match drag {
            MouseAction::ResizingColumn => display
                .and_then(Item::as_table)
                .and_then(|t| t.column_widths_bl.get(col).copied())
                .unwrap_or(1.0),
            MouseAction::ResizingListPageColumn => display
                .and_then(Item::as_page)
                .map_or(2.0, |p| p.list_pane_width_bl),
            _ => 0.0,
        };
        let popup_start = cache
            .top_page()
            .and_then(|id| store.get(id))
            .and_then(Item::as_page)
            .map_or((Point::ZERO, GRID_SIZE), |p| {
                (p.popup_pos_gr, p.popup_width_gr)
            });
        let block = snapshot_block(cache, store, hit, drag);

        // A held press enters pages and edits ratings, unless it sits on a
        // dedicated handle or on the top-level page itself.
        let long_pressable = hit.path.parent().is_some()
            && !hit
                .flags
                .intersects(HitboxFlags::RESIZE | HitboxFlags::COL_RESIZE | HitboxFlags::EXPAND)
            && display.is_some_and(|d| matches!(d.kind, ItemKind::Page(_) | ItemKind::Rating(_)));

        self.active = Some(Action {
            mode: MouseAction::Ambiguous,
            drag,
            path: hit.path.clone(),
            item,
            flags: hit.flags,
            col,
            start: point,
            start_bounds,
            start_spatial,
            start_width_bl,
            start_table_height_gr,
            popup_start,
            block,
            revision: store.revision(),
            deadline_ms: long_pressable.then(|| now_ms + LONG_PRESS_MS),
        });
    }

    /// Updates an in-progress press. Past the drag threshold the press
    /// promotes to its drag action and yields proposals.
    pub fn on_move(&mut self, store: &dyn ItemStore, point: Point) -> Option<DragProposal> {
        let action = self.active.as_mut()?;
        if store.revision() != action.revision {
            // The document changed underneath; the press no longer means
            // what it did.
            self.active = None;
            return None;
        }
        let delta = point - action.start;
        if action.mode == MouseAction::Ambiguous {
            if delta.x.abs() + delta.y.abs() < DRAG_THRESHOLD_PX {
                return None;
            }
            action.mode = action.drag;
        }
        let a = &*action;
        Some(match a.mode {
            MouseAction::Ambiguous => return None,
            MouseAction::Moving => DragProposal::Move(a.start_bounds + delta),
            MouseAction::MovingPopup => {
                DragProposal::MovePopup(a.popup_start.0 + delta_gr(delta, a.block))
            }
            MouseAction::Resizing => {
                DragProposal::Resize((a.start_bounds.width() + delta.x).max(a.block.w))
            }
            MouseAction::ResizingPopup => DragProposal::ResizePopup(
                (a.popup_start.1 + delta_gr(delta, a.block).x).max(GRID_SIZE),
            ),
            MouseAction::ResizingColumn => DragProposal::ResizeColumn(
                a.col,
                (a.start_width_bl + delta.x / a.block.w).max(1.0),
            ),
            MouseAction::ResizingDock => DragProposal::ResizeDock(
                (a.start_bounds.width() + delta.x).clamp(DOCK_MIN_PX, DOCK_MAX_PX),
            ),
            MouseAction::ResizingListPageColumn => DragProposal::ResizeListPane(
                (a.start_width_bl + delta.x / a.block.w).max(2.0),
            ),
            MouseAction::Selecting => DragProposal::Select(band(a.start, point)),
        })
    }

    /// Finishes the press: clicks fire their effect, drags commit through
    /// the store and mark the arrangement stale.
    pub fn on_release(
        &mut self,
        cache: &VesCache,
        store: &mut dyn ItemStoreMut,
        overlay: &mut OverlayState,
        queue: &mut InvalidationQueue,
        point: Point,
    ) -> PointerEffect {
        let Some(a) = self.active.take() else {
            return PointerEffect::None;
        };
        if store.revision() != a.revision {
            return PointerEffect::None;
        }
        if a.mode == MouseAction::Ambiguous {
            return click(cache, store, queue, &a);
        }
        let delta = point - a.start;
        match a.mode {
            MouseAction::Ambiguous => PointerEffect::None,
            MouseAction::Moving => commit_move(cache, store, queue, &a, point, delta),
            MouseAction::MovingPopup => {
                if let Some(page) = cache.top_page() {
                    let pos = a.popup_start.0 + delta_gr(delta, a.block);
                    store.set_page_popup(page, pos, a.popup_start.1);
                    queue.mark_path(a.path.clone());
                }
                PointerEffect::None
            }
            MouseAction::Resizing => {
                if let Some(sp) = a.start_spatial {
                    let width = (sp.width_gr + delta_gr(delta, a.block).x).max(GRID_SIZE);
                    store.set_width(a.item, width);
                    if a.start_table_height_gr > 0.0 {
                        let height = a.start_table_height_gr + delta_gr(delta, a.block).y;
                        store.set_table_height(a.item, height);
                    }
                    queue.mark_path(a.path.clone());
                }
                PointerEffect::None
            }
            MouseAction::ResizingPopup => {
                if let Some(page) = cache.top_page() {
                    let width = (a.popup_start.1 + delta_gr(delta, a.block).x).max(GRID_SIZE);
                    store.set_page_popup(page, a.popup_start.0, width);
                    queue.mark_path(a.path.clone());
                }
                PointerEffect::None
            }
            MouseAction::ResizingColumn => {
                let width = (a.start_width_bl + delta.x / a.block.w).max(1.0);
                store.set_table_column_width(a.path.item(), a.col, width);
                queue.mark_path(a.path.clone());
                PointerEffect::None
            }
            MouseAction::ResizingDock => {
                overlay.dock_width_px =
                    (a.start_bounds.width() + delta.x).clamp(DOCK_MIN_PX, DOCK_MAX_PX);
                // The dock strip shifts the whole page area.
                queue.mark_full();
                PointerEffect::None
            }
            MouseAction::ResizingListPageColumn => {
                let width = (a.start_width_bl + delta.x / a.block.w).max(2.0);
                store.set_page_list_pane_width(a.path.item(), width);
                queue.mark_path(a.path.clone());
                PointerEffect::None
            }
            MouseAction::Selecting => {
                let rect = band(a.start, point);
                PointerEffect::SetSelection(cache.items_intersecting(&a.path, rect))
            }
        }
    }

    /// Cooperative long-press check; call from the embedder's tick.
    ///
    /// Fires at most once per press, only while the press is still
    /// ambiguous, and abandons instead of firing when the document changed
    /// since the press.
    pub fn poll_long_press(&mut self, store: &dyn ItemStore, now_ms: u64) -> PointerEffect {
        let fire = self.active.as_ref().is_some_and(|a| {
            a.mode == MouseAction::Ambiguous && a.deadline_ms.is_some_and(|d| now_ms >= d)
        });
        if !fire {
            return PointerEffect::None;
        }
        let Some(a) = self.active.take() else {
            return PointerEffect::None;
        };
        if store.revision() != a.revision {
            return PointerEffect::None;
        }
        let display = a.path.item();
        match store.get(display).map(|i| &i.kind) {
            Some(ItemKind::Page(_)) => PointerEffect::EnterPage(display),
            Some(ItemKind::Rating(_)) => PointerEffect::OpenRating(a.path),
            _ => PointerEffect::None,
        }
    }

    /// A right click shows the context menu; it never starts a drag.
    #[must_use]
    pub fn on_right_click(&self, hit: &HitInfo) -> PointerEffect {
        PointerEffect::ContextMenu(hit.path.clone())
    }

    /// A double click edits notes and enters pages.
    #[must_use]
    pub fn on_double_click(&self, store: &dyn ItemStore, hit: &HitInfo) -> PointerEffect {
        let id = hit.path.item();
        match store.get(id).map(|i| &i.kind) {
            Some(ItemKind::Note(_)) => PointerEffect::EditItem(id),
            Some(ItemKind::Page(_)) => PointerEffect::EnterPage(id),
            _ => PointerEffect::None,
        }
    }
}

/// Click behavior of a press that never crossed the drag threshold.
fn click(
    cache: &VesCache,
    store: &mut dyn ItemStoreMut,
    queue: &mut InvalidationQueue,
    a: &Action,
) -> PointerEffect {
    // The expand corner overlaps the page body, so it wins the union.
    if a.flags.contains(HitboxFlags::EXPAND) {
        return PointerEffect::ToggleExpand(a.path.item());
    }
    if a.flags.contains(HitboxFlags::OPEN_POPUP) {
        return PointerEffect::OpenPopup(a.path.item());
    }
    if a.flags.is_empty() {
        // Canvas click clears the selection.
        return PointerEffect::SetSelection(Vec::new());
    }
    // Clicking a list row selects it on its page.
    let row_on_list_page = cache.get(&a.path).is_some_and(|ve| {
        ve.flags.contains(VeFlags::LIST_PAGE_ROW) && !ve.flags.contains(VeFlags::DOCK)
    });
    if row_on_list_page {
        if let Some(parent) = a.path.parent() {
            if let Some(page_ve) = cache.get(&parent) {
                store.set_page_selected_row(page_ve.display_item, Some(a.item));
                queue.mark_path(parent);
            }
        }
    }
    if a.flags.contains(HitboxFlags::CLICK) {
        return PointerEffect::Click(a.path.clone());
    }
    PointerEffect::None
}

/// Commits a finished move: reposition within the parent, reorder a list
/// row, or reparent onto the spatial page under the drop point.
fn commit_move(
    cache: &VesCache,
    store: &mut dyn ItemStoreMut,
    queue: &mut InvalidationQueue,
    a: &Action,
    point: Point,
    delta: Vec2,
) -> PointerEffect {
    let Some(parent_path) = a.path.parent() else {
        return PointerEffect::None;
    };
    let parent_arrangement = cache
        .get(&parent_path)
        .and_then(|ve| store.get(ve.display_item))
        .and_then(Item::as_page)
        .map(|p| p.arrangement);

    // Where did the drop land?
    let ignore = [a.item];
    let opts = HitOptions {
        ignore: &ignore,
        allow_expand: false,
        allow_embedded: true,
    };
    let drop = hit_test(cache, &*store, point, &opts);
    let target = drop.and_then(|d| d.over_positionable);

    match (parent_arrangement, target) {
        // Dropped on a different spatial page: reparent there.
        (_, Some(target_path)) if target_path != parent_path => {
            reparent(cache, store, queue, a, delta, &target_path)
        }
        // Same spatial parent: plain reposition.
        (Some(Arrangement::Spatial), _) => {
            if let Some(sp) = a.start_spatial {
                let pos = sp.pos_gr + delta_gr(delta, a.block);
                store.set_position(a.item, pos);
                queue.mark_path(a.path.clone());
            }
            PointerEffect::None
        }
        // List rows reorder by drop height.
        (Some(Arrangement::List), _) => reorder_list_row(cache, store, queue, a, point, &parent_path),
        _ => PointerEffect::None,
    }
}

fn reparent(
    cache: &VesCache,
    store: &mut dyn ItemStoreMut,
    queue: &mut InvalidationQueue,
    a: &Action,
    delta: Vec2,
    target_path: &VePath,
) -> PointerEffect {
    let Some(target_ve) = cache.get(target_path) else {
        return PointerEffect::None;
    };
    let Some(target_page) = store.get(target_ve.display_item).cloned() else {
        return PointerEffect::None;
    };
    let Some(target_abs) = cache.abs_bounds(target_path) else {
        return PointerEffect::None;
    };
    let p = target_page.page_data();
    let ca = target_ve.child_area_or_bounds();
    let block = BlockSize::of(
        ca.size(),
        Size::new(p.inner_width_bl, p.inner_width_bl / p.natural_aspect),
    );
    // Keep the element where it was dropped, in the target page's units.
    let dropped = a.start_bounds.origin() + delta;
    let rel = dropped - (target_abs.origin() + ca.origin().to_vec2());
    let pos = Point::new(rel.x / block.w * GRID_SIZE, rel.y / block.h * GRID_SIZE);

    let order = match store
        .children(target_page.id)
        .last()
        .and_then(|last| store.get(*last))
    {
        Some(last) => OrderKey::after(&last.order),
        None => OrderKey::initial(),
    };
    store.move_item(a.item, target_page.id, Relationship::Child, order);
    store.set_position(a.item, pos);
    queue.mark_full();
    PointerEffect::None
}

fn reorder_list_row(
    cache: &VesCache,
    store: &mut dyn ItemStoreMut,
    queue: &mut InvalidationQueue,
    a: &Action,
    point: Point,
    parent_path: &VePath,
) -> PointerEffect {
    let Some(parent_ve) = cache.get(parent_path) else {
        return PointerEffect::None;
    };
    let Some(parent_abs) = cache.abs_bounds(parent_path) else {
        return PointerEffect::None;
    };
    let page_id = parent_ve.display_item;
    let ca = parent_ve.child_area_or_bounds();
    let y = point.y - parent_abs.y0 - ca.y0;
    let siblings: Vec<ItemId> = store
        .children(page_id)
        .iter()
        .copied()
        .filter(|c| *c != a.item)
        .collect();
    #[expect(clippy::cast_possible_truncation, reason = "small row index")]
    let index = ((y / LIST_ROW_HEIGHT_PX).max(0.0) as usize).min(siblings.len());

    let before = index
        .checked_sub(1)
        .and_then(|i| siblings.get(i))
        .and_then(|id| store.get(*id))
        .map(|i| i.order.clone());
    let after = siblings
        .get(index)
        .and_then(|id| store.get(*id))
        .map(|i| i.order.clone());
    let order = OrderKey::between(before.as_ref(), after.as_ref());
    store.move_item(a.item, page_id, Relationship::Child, order);
    queue.mark_path(parent_path.clone());
    PointerEffect::None
}

/// The drag a press would promote to, given what was hit.
fn resolve_drag(cache: &VesCache, store: &dyn ItemStore, hit: &HitInfo) -> MouseAction {
    let flags = hit.flags;
    if flags.is_empty() {
        return MouseAction::Selecting;
    }
    if flags.contains(HitboxFlags::COL_RESIZE) {
        let ve = cache.get(&hit.path);
        if ve.is_some_and(|v| v.flags.contains(VeFlags::DOCK)) {
            return MouseAction::ResizingDock;
        }
        let list_page = ve
            .and_then(|v| store.get(v.display_item))
            .and_then(Item::as_page)
            .is_some_and(|p| p.arrangement == Arrangement::List);
        if list_page {
            return MouseAction::ResizingListPageColumn;
        }
        return MouseAction::ResizingColumn;
    }
    if flags.contains(HitboxFlags::RESIZE) {
        if hit.path.last().kind == SegKind::Popup {
            return MouseAction::ResizingPopup;
        }
        return MouseAction::Resizing;
    }
    if hit.path.last().kind == SegKind::Popup {
        return MouseAction::MovingPopup;
    }
    MouseAction::Moving
}

/// The pixels-per-block scale the drag converts with.
fn snapshot_block(
    cache: &VesCache,
    store: &dyn ItemStore,
    hit: &HitInfo,
    drag: MouseAction,
) -> BlockSize {
    match drag {
        // Popup geometry lives in the top page's grid units.
        MouseAction::MovingPopup | MouseAction::ResizingPopup => cache
            .root_path()
            .and_then(|root| page_block(cache, store, root))
            .unwrap_or(BlockSize::uniform(GRID_SIZE)),
        MouseAction::ResizingColumn => cache
            .get(&hit.path)
            .and_then(|ve| {
                let t = store.get(ve.display_item)?.as_table()?;
                let w_bl = (t.spatial.width_gr / GRID_SIZE).max(1.0);
                Some(BlockSize::uniform(ve.bounds.width() / w_bl))
            })
            .unwrap_or(BlockSize::uniform(GRID_SIZE)),
        MouseAction::ResizingListPageColumn => BlockSize::uniform(LIST_BLOCK_PX),
        _ => hit
            .path
            .parent()
            .and_then(|parent| page_block(cache, store, &parent))
            .unwrap_or(BlockSize::uniform(GRID_SIZE)),
    }
}

/// The block size a page arranges its spatial children with.
fn page_block(cache: &VesCache, store: &dyn ItemStore, page_path: &VePath) -> Option<BlockSize> {
    let ve = cache.get(page_path)?;
    let p = store.get(ve.display_item)?.as_page()?;
    let ca = ve.child_area_or_bounds();
    Some(BlockSize::of(
        ca.size(),
        Size::new(p.inner_width_bl, p.inner_width_bl / p.natural_aspect),
    ))
}

fn delta_gr(delta: Vec2, block: BlockSize) -> Vec2 {
    Vec2::new(delta.x / block.w * GRID_SIZE, delta.y / block.h * GRID_SIZE)
}

/// The normalized rectangle between two corners.
fn band(a: Point, b: Point) -> Rect {
    Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}
