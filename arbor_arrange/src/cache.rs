// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The visual-element cache and its invalidation queue.

use alloc::vec::Vec;

use arbor_geometry::{BlockSize, GRID_SIZE};
use arbor_items::{Arrangement, Item, ItemId, ItemKind, ItemStore};
use hashbrown::HashMap;
use kurbo::{Rect, Size, Vec2};

use crate::arrange::{Arranger, Expand, source_child_id};
use crate::layout::LIST_BLOCK_PX;
use crate::ve::{SegKind, VeFlags, VePath, VisualElement};

/// Dock width when the embedder has not chosen one, px.
pub const DEFAULT_DOCK_WIDTH_PX: f64 = 160.0;

/// Which overlays are open on the arranged page.
///
/// Overlay state is transient UI state owned by the embedder, not persisted
/// document data, so it rides alongside the store rather than inside it.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayState {
    /// The item shown in the page's popup, if open.
    pub popup: Option<ItemId>,
    /// The page whose children fill the dock strip, if docked.
    pub dock_page: Option<ItemId>,
    /// Current dock strip width in pixels.
    pub dock_width_px: f64,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            popup: None,
            dock_page: None,
            dock_width_px: DEFAULT_DOCK_WIDTH_PX,
        }
    }
}

/// Cache of the arranged visual-element tree, keyed by path.
///
/// A full arrangement pass replaces the whole tree. Between full passes,
/// [`rearrange_subtree`](Self::rearrange_subtree) re-derives a single
/// element in place when its geometry is independent of its siblings, and
/// escalates to a full pass otherwise.
#[derive(Debug, Default)]
pub struct VesCache {
    entries: HashMap<VePath, VisualElement>,
    root: Option<VePath>,
    top_page: Option<ItemId>,
    viewport: Rect,
    load_requests: Vec<ItemId>,
    generation: u64,
}

impl VesCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an element by path.
    #[must_use]
    pub fn get(&self, path: &VePath) -> Option<&VisualElement> {
        self.entries.get(path)
    }

    /// The root element of the current arrangement.
    #[must_use]
    pub fn root(&self) -> Option<&VisualElement> {
        self.entries.get(self.root.as_ref()?)
    }

    /// The path of the root element.
    #[must_use]
    pub fn root_path(&self) -> Option<&VePath> {
        self.root.as_ref()
    }

    /// The page currently arranged at the top level.
    #[must_use]
    pub fn top_page(&self) -> Option<ItemId> {
        self.top_page
    }

    /// The viewport of the last full arrangement.
    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Bumped on every (full or partial) arrangement.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of cached elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no arrangement.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops the arrangement (for example when navigating away).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.root = None;
        self.top_page = None;
        self.generation += 1;
    }

    /// Arranges `page` into `viewport` from scratch, replacing any previous
    /// tree. Returns the root path.
    pub fn full_arrange(
        &mut self,
        store: &dyn ItemStore,
        overlay: &OverlayState,
        page: ItemId,
        viewport: Rect,
    ) -> VePath {
        let mut arranger = Arranger::new(store, overlay);
        let root = arranger.arrange_desktop(page, viewport);
        self.entries.clear();
        for ve in arranger.out {
            self.entries.insert(ve.path.clone(), ve);
        }
        self.root = Some(root.clone());
        self.top_page = Some(page);
        self.viewport = viewport;
        self.note_loads(arranger.load_requests);
        self.generation += 1;
        root
    }

    /// Re-runs the last full arrangement with the current store and overlay
    /// state. Does nothing before the first [`full_arrange`](Self::full_arrange).
    pub fn refresh(&mut self, store: &dyn ItemStore, overlay: &OverlayState) {
        if let Some(page) = self.top_page {
            self.full_arrange(store, overlay, page, self.viewport);
        }
    }

    /// Re-derives the element at `path` (and its subtree) in place.
    ///
    /// Only possible where the parent arrangement places children
    /// independently: spatial, grid, and list pages, table rows, and
    /// attachment chips. Anywhere else (justified and document pages,
    /// composites, overlays, roots) one child's size moves its siblings, so
    /// the call escalates to a full pass. Returns `true` when the update
    /// stayed local.
    pub fn rearrange_subtree(
        &mut self,
        store: &dyn ItemStore,
        overlay: &OverlayState,
        path: &VePath,
    ) -> bool {
        let Some(parent_path) = path.parent() else {
            self.refresh(store, overlay);
            return false;
        };
        let seg = path.last();
        let (parent_ve, parent_item) = match self
            .entries
            .get(&parent_path)
            .and_then(|ve| Some((ve.clone(), store.get(ve.display_item)?.clone())))
        {
            Some(pair) => pair,
            None => {
                self.refresh(store, overlay);
                return false;
            }
        };
        if seg.kind != SegKind::Child
            || parent_ve
                .flags
                .intersects(VeFlags::DOCK | VeFlags::LIST_PAGE_ROW | VeFlags::INSIDE_TABLE)
        {
            // Overlays, dock rows, table cells: shared geometry, escalate.
            self.refresh(store, overlay);
            return false;
        }

        let source = source_child_id(seg);
        let inherited = parent_inherited(&parent_ve);
        let mut arranger = Arranger::new(store, overlay);
        let new_path = match (&parent_item.kind, parent_ve.attachments.contains(path)) {
            // Attachment chips sit at a fixed slot given their index.
            (_, true) => {
                let index = parent_ve
                    .attachments
                    .iter()
                    .position(|p| p == path)
                    .unwrap_or(0);
                arranger.rearrange_attachment_chip(&parent_ve, &parent_path, index, source, inherited)
            }
            (ItemKind::Page(p), false) => match p.arrangement {
                Arrangement::Spatial => arranger.arrange_spatial_child(
                    &parent_item,
                    &parent_path,
                    parent_ve.child_area_or_bounds().size(),
                    source,
                    inherited,
                ),
                Arrangement::Grid => {
                    let index = store.children(parent_item.id).iter().position(|c| *c == source);
                    index.and_then(|i| {
                        let area = parent_ve.child_area_or_bounds();
                        let rect = crate::layout::grid_cell_rect(
                            area.width(),
                            p.grid_columns.max(1),
                            i,
                        );
                        let block = arranger.uniform_block_for(source, rect);
                        arranger.emit_item_ve(
                            &parent_path,
                            SegKind::Child,
                            source,
                            rect,
                            inherited,
                            Expand::NoTables,
                            block,
                        )
                    })
                }
                Arrangement::List => {
                    let index = store.children(parent_item.id).iter().position(|c| *c == source);
                    index.and_then(|i| {
                        let pane_w = (p.list_pane_width_bl * LIST_BLOCK_PX)
                            .min(parent_ve.child_area_or_bounds().width());
                        arranger.arrange_list_row(&parent_path, pane_w, i, source, inherited)
                    })
                }
                Arrangement::Justified | Arrangement::Document => None,
            },
            (ItemKind::Table(_), false) => {
                let index = store.children(parent_item.id).iter().position(|c| *c == source);
                index.and_then(|i| {
                    let block = self.table_row_block(store, &parent_path, &parent_ve, &parent_item);
                    arranger.arrange_table_row(
                        &parent_item,
                        &parent_path,
                        i,
                        source,
                        block,
                        inherited,
                    )
                })
            }
            _ => None,
        };

        let Some(new_path) = new_path else {
            self.refresh(store, overlay);
            return false;
        };

        // Splice: drop the stale subtree, adopt the fresh one, and fix the
        // parent's reference if link resolution changed the path.
        self.entries.retain(|p, _| !p.starts_with(path));
        for ve in arranger.out {
            self.entries.insert(ve.path.clone(), ve);
        }
        if new_path != *path {
            if let Some(pve) = self.entries.get_mut(&parent_path) {
                for slot in pve.children.iter_mut().chain(pve.attachments.iter_mut()) {
                    if slot == path {
                        *slot = new_path.clone();
                    }
                }
            }
        }
        self.note_loads(arranger.load_requests);
        self.generation += 1;
        true
    }

    /// Container ids whose children should be loaded, drained.
    pub fn take_load_requests(&mut self) -> Vec<ItemId> {
        core::mem::take(&mut self.load_requests)
    }

    fn note_loads(&mut self, requests: Vec<ItemId>) {
        for id in requests {
            if !self.load_requests.contains(&id) {
                self.load_requests.push(id);
            }
        }
    }

    /// Absolute (viewport-space) bounds of the element at `path`.
    #[must_use]
    pub fn abs_bounds(&self, path: &VePath) -> Option<Rect> {
        let ve = self.entries.get(path)?;
        let Some(parent_path) = &ve.parent else {
            return Some(ve.bounds);
        };
        let parent = self.entries.get(parent_path)?;
        let parent_abs = self.abs_bounds(parent_path)?;
        // Children live in the parent's child area; attachments and overlays
        // live in the parent's own space.
        let offset = if parent.children.contains(path) {
            parent.child_area_or_bounds().origin().to_vec2()
        } else {
            Vec2::ZERO
        };
        Some(ve.bounds + parent_abs.origin().to_vec2() + offset)
    }

    /// The direct children of the page at `page_path` whose absolute bounds
    /// intersect `rect_abs`, as source item ids (marquee selection).
    #[must_use]
    pub fn items_intersecting(&self, page_path: &VePath, rect_abs: Rect) -> Vec<ItemId> {
        let Some(page) = self.entries.get(page_path) else {
            return Vec::new();
        };
        page.children
            .iter()
            .filter(|child| {
                self.abs_bounds(child)
                    .is_some_and(|b| b.intersect(rect_abs).area() > 0.0)
            })
            .map(|child| source_child_id(child.last()))
            .collect()
    }

    /// A point-in-time summary for debugging and tests.
    #[must_use]
    pub fn debug_info(&self) -> CacheDebugInfo {
        CacheDebugInfo {
            entries: self.entries.len(),
            generation: self.generation,
            pending_loads: self.load_requests.len(),
        }
    }

    /// The block size the table at `table_path` was arranged with, re-derived
    /// from the same unquantized inputs as the full pass so a partial row
    /// rearrange lands on identical pixels.
    fn table_row_block(
        &self,
        store: &dyn ItemStore,
        table_path: &VePath,
        table_ve: &VisualElement,
        table_item: &Item,
    ) -> BlockSize {
        let from_page = table_path.parent().and_then(|gp_path| {
            let gp_ve = self.entries.get(&gp_path)?;
            let p = store.get(gp_ve.display_item)?.as_page()?;
            let area = gp_ve.child_area_or_bounds().size();
            Some(match (table_path.last().kind, p.arrangement) {
                (SegKind::Child, Arrangement::Document) => {
                    BlockSize::uniform(area.width / p.inner_width_bl)
                }
                // The list detail pane sizes blocks by the item's own width.
                (SegKind::Detail, _) => {
                    let w_bl = (table_item.table_data().spatial.width_gr / GRID_SIZE).max(1.0);
                    BlockSize::uniform((table_ve.bounds.width() / w_bl).max(1.0))
                }
                _ => BlockSize::of(
                    area,
                    Size::new(p.inner_width_bl, p.inner_width_bl / p.natural_aspect),
                ),
            })
        });
        from_page.unwrap_or_else(|| {
            // Last resort: back the block out of the arranged bounds.
            let t = table_item.table_data();
            let w_bl = (t.spatial.width_gr / GRID_SIZE).max(1.0);
            let h_bl = (t.height_gr / GRID_SIZE).max(1.0);
            BlockSize {
                w: table_ve.bounds.width() / w_bl,
                h: table_ve.bounds.height() / h_bl,
            }
        })
    }
}

/// Snapshot of cache counters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CacheDebugInfo {
    /// Number of cached visual elements.
    pub entries: usize,
    /// Arrangement generation counter.
    pub generation: u64,
    /// Load requests not yet drained.
    pub pending_loads: usize,
}

/// Context flags a parent passes down to re-arranged children.
fn parent_inherited(parent: &VisualElement) -> VeFlags {
    parent.flags
        & (VeFlags::POPUP | VeFlags::DOCK | VeFlags::INSIDE_COMPOSITE_OR_DOCK)
}

/// Accumulates invalidation marks and applies them in one batch.
///
/// Store mutations mark paths (geometry changes) or the whole tree
/// (structure changes); [`flush`](Self::flush) then performs the minimal
/// set of re-arrangements. Marks are deduplicated and nested marks collapse
/// into their ancestor.
#[derive(Debug, Default)]
pub struct InvalidationQueue {
    paths: Vec<VePath>,
    full: bool,
}

impl InvalidationQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the subtree at `path` stale.
    pub fn mark_path(&mut self, path: VePath) {
        if self.full || self.paths.contains(&path) {
            return;
        }
        self.paths.push(path);
    }

    /// Marks the whole tree stale.
    pub fn mark_full(&mut self) {
        self.full = true;
        self.paths.clear();
    }

    /// Whether nothing is marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.full && self.paths.is_empty()
    }

    /// Applies all marks to `cache` and empties the queue. Returns whether
    /// any re-arrangement ran.
    pub fn flush(
        &mut self,
        cache: &mut VesCache,
        store: &dyn ItemStore,
        overlay: &OverlayState,
    ) -> bool {
        if self.full {
            self.full = false;
            self.paths.clear();
            cache.refresh(store, overlay);
            return true;
        }
        let mut paths = core::mem::take(&mut self.paths);
        // Collapse descendants into their marked ancestors.
        let snapshot = paths.clone();
        paths.retain(|p| {
            !snapshot
                .iter()
                .any(|other| *other != *p && p.starts_with(other))
        });
        let mut did = false;
        for path in paths {
            did = true;
            if !cache.rearrange_subtree(store, overlay, &path) {
                // Escalated to a full pass; everything is fresh now.
                break;
            }
        }
        did
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{grid_cell_rect, spatial_page_rect};
    use alloc::vec::Vec;
    use arbor_geometry::GRID_SIZE;
    use arbor_items::{Arrangement, Item, ItemStoreMut, MemoryStore, PageItem};
    use kurbo::Point;

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1600.0, 1000.0)
    }

    fn spatial_page(store: &mut MemoryStore) -> ItemId {
        store.add_root(Item::page(store.mint_id(), PageItem::default()))
    }

    #[test]
    fn full_arrange_builds_the_tree() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        let note = store.add_child(
            page,
            Item::note(store.mint_id(), Point::new(60.0, 60.0), 240.0).with_title("hello"),
        );

        let mut cache = VesCache::new();
        let root = cache.full_arrange(&store, &OverlayState::default(), page, viewport());

        let root_ve = cache.get(&root).unwrap();
        assert_eq!(root_ve.display_item, page);
        assert_eq!(root_ve.children.len(), 1);
        let note_ve = cache.get(&root_ve.children[0]).unwrap();
        assert_eq!(note_ve.display_item, note);
        assert!(note_ve.flags.contains(VeFlags::DETAILED));
        assert!(!note_ve.hitboxes.is_empty());
    }

    #[test]
    fn full_arrange_is_idempotent() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        store.add_child(
            page,
            Item::note(store.mint_id(), Point::new(0.0, 0.0), 180.0).with_title("a"),
        );
        store.add_child(
            page,
            Item::note(store.mint_id(), Point::new(120.0, 120.0), 180.0).with_title("b"),
        );

        let mut cache = VesCache::new();
        let overlay = OverlayState::default();
        cache.full_arrange(&store, &overlay, page, viewport());
        let first: Vec<(VePath, VisualElement)> = {
            let mut v: Vec<_> = cache
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            v.sort_by_key(|(k, _)| alloc::format!("{k}"));
            v
        };
        cache.full_arrange(&store, &overlay, page, viewport());
        let second: Vec<(VePath, VisualElement)> = {
            let mut v: Vec<_> = cache
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            v.sort_by_key(|(k, _)| alloc::format!("{k}"));
            v
        };
        assert_eq!(first, second);
    }

    #[test]
    fn spatial_children_stay_inside_the_page_rect() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        store.add_child(
            page,
            Item::note(store.mint_id(), Point::new(60.0, 60.0), 120.0).with_title("x"),
        );

        let mut cache = VesCache::new();
        let root = cache.full_arrange(&store, &OverlayState::default(), page, viewport());
        let root_ve = cache.get(&root).unwrap().clone();
        let page_rect = spatial_page_rect(viewport(), 1.6);
        assert_eq!(
            cache.abs_bounds(&root).unwrap().origin(),
            viewport().origin()
        );
        for child in &root_ve.children {
            let abs = cache.abs_bounds(child).unwrap();
            assert!(page_rect.contains(abs.origin()));
        }
    }

    #[test]
    fn grid_page_places_nine_items_in_four_columns() {
        let mut store = MemoryStore::new();
        let page = store.add_root(Item::page(
            store.mint_id(),
            PageItem {
                arrangement: Arrangement::Grid,
                grid_columns: 4,
                ..PageItem::default()
            },
        ));
        for i in 0..9 {
            store.add_child(
                page,
                Item::note(store.mint_id(), Point::ZERO, 120.0).with_title(&alloc::format!("{i}")),
            );
        }

        let mut cache = VesCache::new();
        let root = cache.full_arrange(&store, &OverlayState::default(), page, viewport());
        let root_ve = cache.get(&root).unwrap();
        assert_eq!(root_ve.children.len(), 9);
        let width = root_ve.child_area_or_bounds().width();
        for (i, child) in root_ve.children.iter().enumerate() {
            let ve = cache.get(child).unwrap();
            assert_eq!(ve.bounds, grid_cell_rect(width, 4, i));
        }
        // Three rows of cells.
        let last = cache.get(&root_ve.children[8]).unwrap();
        let first = cache.get(&root_ve.children[0]).unwrap();
        assert!(last.bounds.y0 > first.bounds.y1);
    }

    #[test]
    fn partial_rearrange_tracks_a_note_edit() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        let note = store.add_child(
            page,
            Item::note(store.mint_id(), Point::new(60.0, 60.0), 240.0).with_title("short"),
        );
        let other = store.add_child(
            page,
            Item::note(store.mint_id(), Point::new(600.0, 60.0), 240.0).with_title("other"),
        );

        let mut cache = VesCache::new();
        let overlay = OverlayState::default();
        let root = cache.full_arrange(&store, &overlay, page, viewport());
        let root_ve = cache.get(&root).unwrap().clone();
        let note_path = root_ve.children[0].clone();
        let other_path = root_ve.children[1].clone();
        let old_note = cache.get(&note_path).unwrap().clone();
        let old_other = cache.get(&other_path).unwrap().clone();
        assert_eq!(old_note.display_item, note);
        assert_eq!(old_other.display_item, other);

        // A longer title wraps to more lines and grows the element.
        store.set_title(note, &"x".repeat(40));
        assert!(cache.rearrange_subtree(&store, &overlay, &note_path));

        let new_note = cache.get(&note_path).unwrap();
        assert_eq!(new_note.bounds.origin(), old_note.bounds.origin());
        assert!(new_note.bounds.height() > old_note.bounds.height());
        // The sibling is untouched.
        assert_eq!(cache.get(&other_path).unwrap(), &old_other);
    }

    #[test]
    fn rearrange_of_document_child_escalates_to_full() {
        let mut store = MemoryStore::new();
        let page = store.add_root(Item::page(
            store.mint_id(),
            PageItem {
                arrangement: Arrangement::Document,
                ..PageItem::default()
            },
        ));
        let first = store.add_child(
            page,
            Item::note(store.mint_id(), Point::ZERO, 240.0).with_title("one"),
        );
        store.add_child(
            page,
            Item::note(store.mint_id(), Point::ZERO, 240.0).with_title("two"),
        );

        let mut cache = VesCache::new();
        let overlay = OverlayState::default();
        let root = cache.full_arrange(&store, &overlay, page, viewport());
        let first_path = cache.get(&root).unwrap().children[0].clone();
        let second_path = cache.get(&root).unwrap().children[1].clone();
        let old_second_y = cache.get(&second_path).unwrap().bounds.y0;

        store.set_title(first, &"y".repeat(40));
        // Document flow couples siblings, so the partial path refuses.
        assert!(!cache.rearrange_subtree(&store, &overlay, &first_path));
        // The escalated full pass still produced the right result.
        assert!(cache.get(&second_path).unwrap().bounds.y0 > old_second_y);
    }

    fn snapshot(cache: &VesCache) -> Vec<(alloc::string::String, VisualElement)> {
        let mut v: Vec<_> = cache
            .entries
            .iter()
            .map(|(k, v)| (alloc::format!("{k}"), v.clone()))
            .collect();
        v.sort_by(|a, b| a.0.cmp(&b.0));
        v
    }

    #[test]
    fn partial_rearrange_matches_a_full_pass() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        let note = store.add_child(
            page,
            Item::note(store.mint_id(), Point::new(60.0, 60.0), 240.0).with_title("short"),
        );
        let table = store.add_child(
            page,
            Item::table(store.mint_id(), Point::new(240.0, 30.0), 240.0, 240.0),
        );
        let row = store.add_child(
            table,
            Item::note(store.mint_id(), Point::ZERO, 240.0).with_title("row"),
        );

        let mut cache = VesCache::new();
        let overlay = OverlayState::default();
        let root = cache.full_arrange(&store, &overlay, page, viewport());
        let note_path = cache.get(&root).unwrap().children[0].clone();
        let table_path = cache.get(&root).unwrap().children[1].clone();
        let row_path = cache.get(&table_path).unwrap().children[0].clone();

        store.set_title(note, &"x".repeat(40));
        store.set_title(row, "renamed");
        assert!(cache.rearrange_subtree(&store, &overlay, &note_path));
        assert!(cache.rearrange_subtree(&store, &overlay, &row_path));

        // The patched tree is indistinguishable from a fresh arrangement.
        let mut fresh = VesCache::new();
        fresh.full_arrange(&store, &overlay, page, viewport());
        assert_eq!(snapshot(&cache), snapshot(&fresh));
    }

    #[test]
    fn every_child_stays_inside_its_parents_child_area() {
        for arrangement in [
            Arrangement::Spatial,
            Arrangement::Grid,
            Arrangement::List,
            Arrangement::Justified,
            Arrangement::Document,
        ] {
            let mut store = MemoryStore::new();
            let page = store.add_root(Item::page(
                store.mint_id(),
                PageItem {
                    arrangement,
                    ..PageItem::default()
                },
            ));
            for i in 0..6 {
                store.add_child(
                    page,
                    Item::note(
                        store.mint_id(),
                        Point::new(i as f64 * 60.0, i as f64 * 30.0),
                        180.0,
                    )
                    .with_title(&alloc::format!("note {i}")),
                );
            }
            if !matches!(arrangement, Arrangement::Grid | Arrangement::Justified) {
                let table = store.add_child(
                    page,
                    Item::table(store.mint_id(), Point::new(60.0, 30.0), 240.0, 240.0),
                );
                store.add_child(
                    table,
                    Item::note(store.mint_id(), Point::ZERO, 240.0).with_title("row"),
                );
            }

            let mut cache = VesCache::new();
            cache.full_arrange(&store, &OverlayState::default(), page, viewport());
            for (path, ve) in &cache.entries {
                let Some(parent_path) = &ve.parent else {
                    continue;
                };
                let parent = cache.entries.get(parent_path).unwrap();
                if !parent.children.contains(path) {
                    continue;
                }
                // Child bounds live in the parent's child-area space; a one
                // pixel slack absorbs edge rounding.
                let area = parent.child_area_or_bounds().size();
                assert!(
                    ve.bounds.x0 >= -1.0
                        && ve.bounds.y0 >= -1.0
                        && ve.bounds.x1 <= area.width + 1.0
                        && ve.bounds.y1 <= area.height + 1.0,
                    "{path} escapes its parent under {arrangement:?}"
                );
            }
        }
    }

    #[test]
    fn load_requests_cover_unloaded_containers() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        let child_page = store.add_child(
            page,
            Item::page(
                store.mint_id(),
                PageItem {
                    spatial: arbor_items::Spatial {
                        pos_gr: Point::new(60.0, 60.0),
                        width_gr: 8.0 * GRID_SIZE,
                    },
                    ..PageItem::default()
                },
            ),
        );
        store.set_children_loaded(child_page, false);

        let mut cache = VesCache::new();
        cache.full_arrange(&store, &OverlayState::default(), page, viewport());
        let loads = cache.take_load_requests();
        assert_eq!(loads, alloc::vec![child_page]);
        // Drained; a second take is empty.
        assert!(cache.take_load_requests().is_empty());
    }

    #[test]
    fn unresolved_link_arranges_as_placeholder() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        let link = store.add_child(
            page,
            Item::link(store.mint_id(), Point::new(60.0, 60.0), 240.0, None),
        );

        let mut cache = VesCache::new();
        let root = cache.full_arrange(&store, &OverlayState::default(), page, viewport());
        let link_path = cache.get(&root).unwrap().children[0].clone();
        let ve = cache.get(&link_path).unwrap();
        assert_eq!(ve.display_item, link);
        assert!(ve.is_placeholder());
        assert!(ve.hitboxes.is_empty());
        assert!(ve.children.is_empty());
    }

    #[test]
    fn resolved_link_shows_target_with_link_in_path() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        let target = store.add_child(
            page,
            Item::note(store.mint_id(), Point::new(600.0, 300.0), 240.0).with_title("target"),
        );
        let link = store.add_child(
            page,
            Item::link(store.mint_id(), Point::new(60.0, 60.0), 180.0, Some(target)),
        );

        let mut cache = VesCache::new();
        let root = cache.full_arrange(&store, &OverlayState::default(), page, viewport());
        let root_ve = cache.get(&root).unwrap();
        // The link child displays the target but keeps the link's geometry.
        let link_ve = root_ve
            .children
            .iter()
            .map(|p| cache.get(p).unwrap())
            .find(|ve| ve.link_item == Some(link))
            .unwrap();
        assert_eq!(link_ve.display_item, target);
        // Two distinct paths for the same displayed item.
        assert_eq!(root_ve.children.len(), 2);
    }

    #[test]
    fn popup_overlay_floats_above_the_page() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        let note = store.add_child(
            page,
            Item::note(store.mint_id(), Point::new(60.0, 60.0), 240.0).with_title("n"),
        );

        let mut cache = VesCache::new();
        let overlay = OverlayState {
            popup: Some(note),
            ..OverlayState::default()
        };
        let root = cache.full_arrange(&store, &overlay, page, viewport());
        let root_ve = cache.get(&root).unwrap();
        assert_eq!(root_ve.overlays.len(), 1);
        let popup = cache.get(&root_ve.overlays[0]).unwrap();
        assert!(popup.flags.contains(VeFlags::POPUP));
        assert!(popup.flags.contains(VeFlags::EMBEDDED_INTERACTIVE_ROOT));
        assert_eq!(popup.path.last().kind, SegKind::Popup);
        // Chrome: a move border and a resize corner.
        assert_eq!(popup.hitboxes.len(), 2);
    }

    #[test]
    fn dock_shows_rows_of_the_docked_page() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        let docked = store.add_root(Item::page(store.mint_id(), PageItem::default()));
        for t in ["a", "b", "c"] {
            store.add_child(
                docked,
                Item::note(store.mint_id(), Point::ZERO, 120.0).with_title(t),
            );
        }

        let mut cache = VesCache::new();
        let overlay = OverlayState {
            dock_page: Some(docked),
            ..OverlayState::default()
        };
        let root = cache.full_arrange(&store, &overlay, page, viewport());
        let root_ve = cache.get(&root).unwrap();
        let dock = cache.get(&root_ve.overlays[0]).unwrap();
        assert!(dock.flags.contains(VeFlags::DOCK));
        assert_eq!(dock.children.len(), 3);
        let row = cache.get(&dock.children[0]).unwrap();
        assert!(row.flags.contains(VeFlags::INSIDE_COMPOSITE_OR_DOCK));
        assert!(row.flags.contains(VeFlags::LIST_PAGE_ROW));
        // The page content shifts right of the dock strip.
        let page_area = root_ve.child_area_or_bounds();
        assert!(page_area.x0 >= overlay.dock_width_px);
    }

    #[test]
    fn marquee_query_returns_intersecting_children() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        let near = store.add_child(
            page,
            Item::note(store.mint_id(), Point::new(0.0, 0.0), 120.0).with_title("near"),
        );
        let far = store.add_child(
            page,
            Item::note(store.mint_id(), Point::new(420.0, 270.0), 120.0).with_title("far"),
        );

        let mut cache = VesCache::new();
        let root = cache.full_arrange(&store, &OverlayState::default(), page, viewport());
        let near_abs = {
            let root_ve = cache.get(&root).unwrap();
            cache.abs_bounds(&root_ve.children[0]).unwrap()
        };
        let hits = cache.items_intersecting(&root, near_abs.inflate(2.0, 2.0));
        assert!(hits.contains(&near));
        assert!(!hits.contains(&far));
    }

    #[test]
    fn invalidation_queue_collapses_nested_marks() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        let note = store.add_child(
            page,
            Item::note(store.mint_id(), Point::new(60.0, 60.0), 240.0).with_title("n"),
        );

        let mut cache = VesCache::new();
        let overlay = OverlayState::default();
        let root = cache.full_arrange(&store, &overlay, page, viewport());
        let note_path = cache.get(&root).unwrap().children[0].clone();

        let mut queue = InvalidationQueue::new();
        assert!(queue.is_empty());
        store.set_title(note, "edited");
        queue.mark_path(note_path.clone());
        queue.mark_path(note_path.clone());
        let before = cache.generation();
        assert!(queue.flush(&mut cache, &store, &overlay));
        // One partial pass, not two.
        assert_eq!(cache.generation(), before + 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn full_mark_wins_over_path_marks() {
        let mut store = MemoryStore::new();
        let page = spatial_page(&mut store);
        store.add_child(
            page,
            Item::note(store.mint_id(), Point::ZERO, 120.0).with_title("n"),
        );

        let mut cache = VesCache::new();
        let overlay = OverlayState::default();
        let root = cache.full_arrange(&store, &overlay, page, viewport());
        let note_path = cache.get(&root).unwrap().children[0].clone();

        let mut queue = InvalidationQueue::new();
        queue.mark_path(note_path);
        queue.mark_full();
        assert!(queue.flush(&mut cache, &store, &overlay));
        assert!(cache.root().is_some());
    }
}
