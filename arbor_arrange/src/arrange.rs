// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recursive arrangement pass: items in, visual elements out.

use alloc::vec::Vec;

use arbor_geometry::{BlockSize, GRID_SIZE, Hitbox, HitboxFlags, quantize};
use arbor_items::{Arrangement, Item, ItemId, ItemKind, ItemStore};
use kurbo::{Point, Rect, Size};

use crate::layout::{
    DETAIL_MIN_PX, LIST_BLOCK_PX, PAGE_EXPAND_MIN_PX, document_flow, grid_cell_rect,
    grid_row_count, justified_content_height, justified_rects, list_row_rect, spatial_page_rect,
};
use crate::ve::{PathSeg, SegKind, VeFlags, VePath, VisualElement};
use crate::OverlayState;

/// Side length of the bottom-right resize handle, px.
pub const RESIZE_HANDLE_PX: f64 = 10.0;
/// Side length of the top-right attach region, px.
pub const ATTACH_HANDLE_PX: f64 = 10.0;
/// Side length of the top-left expand region on pages, px.
pub const EXPAND_HANDLE_PX: f64 = 10.0;
/// Width of the composite move-handle strip at the right edge, px.
pub const COMPOSITE_HANDLE_PX: f64 = 10.0;
/// Height of the popup move border at the top edge, px.
pub const POPUP_BORDER_PX: f64 = 10.0;
/// Grab width of column-resize strips, px.
pub const COL_RESIZE_GRAB_PX: f64 = 6.0;
/// Side length of attachment chips shown at an item's top-right, px.
pub const ATTACH_CHIP_PX: f64 = 12.0;

/// Context flags a child inherits from its container.
const INHERITED_MASK: VeFlags = VeFlags::POPUP
    .union(VeFlags::DOCK)
    .union(VeFlags::INSIDE_COMPOSITE_OR_DOCK);

/// How far container children are expanded below this element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Expand {
    /// Pages, tables, and composites all expand.
    Full,
    /// Pages and composites expand; tables are an unsupported child kind
    /// here (grid and justified pages).
    NoTables,
    /// Nothing expands (compact strips such as composite members).
    Leaf,
}

/// The original (pre-link-resolution) child id a path segment came from.
pub(crate) fn source_child_id(seg: PathSeg) -> ItemId {
    seg.link.unwrap_or(seg.item)
}

/// One arrangement pass. Collects finished visual elements and the ids of
/// containers whose children should be loaded.
pub(crate) struct Arranger<'a> {
    store: &'a dyn ItemStore,
    overlay: &'a OverlayState,
    pub(crate) out: Vec<VisualElement>,
    pub(crate) load_requests: Vec<ItemId>,
}

impl<'a> Arranger<'a> {
    pub(crate) fn new(store: &'a dyn ItemStore, overlay: &'a OverlayState) -> Self {
        Self {
            store,
            overlay,
            out: Vec::new(),
            load_requests: Vec::new(),
        }
    }

    fn request_children(&mut self, id: ItemId) {
        if !self.store.is_children_loaded(id) && !self.load_requests.contains(&id) {
            self.load_requests.push(id);
        }
    }

    /// Arranges the top-level page plus its dock and popup overlays.
    pub(crate) fn arrange_desktop(&mut self, page_id: ItemId, viewport: Rect) -> VePath {
        let page = self
            .store
            .get(page_id)
            .unwrap_or_else(|| panic!("no item {page_id} to arrange"))
            .clone();
        let p = page.page_data();
        let path = VePath::root(page_id);

        let dock_w = if self.overlay.dock_page.is_some() {
            self.overlay.dock_width_px
        } else {
            0.0
        };
        let avail = Rect::new(
            (viewport.x0 + dock_w).min(viewport.x1),
            viewport.y0,
            viewport.x1,
            viewport.y1,
        );
        let area_abs = match p.arrangement {
            Arrangement::Spatial => spatial_page_rect(avail, p.natural_aspect),
            _ => avail,
        };
        // Child area in the root's own space.
        let area_own = Rect::new(
            area_abs.x0 - viewport.x0,
            area_abs.y0 - viewport.y0,
            area_abs.x1 - viewport.x0,
            area_abs.y1 - viewport.y0,
        );

        self.request_children(page_id);
        let mut ve = VisualElement::new(path.clone(), page_id, viewport);
        ve.flags = VeFlags::DETAILED;
        let (children, child_area) =
            self.arrange_page_contents(&page, &path, area_own, VeFlags::empty());
        ve.children = children;
        ve.child_area = Some(child_area);
        if p.arrangement == Arrangement::List {
            ve.hitboxes.push(list_pane_hitbox(p, child_area));
        }

        if let Some(dock_page) = self.overlay.dock_page {
            let strip = Rect::new(0.0, 0.0, dock_w, viewport.height());
            if let Some(dock) = self.arrange_dock(dock_page, &path, strip) {
                ve.overlays.push(dock);
            }
        }
        if let Some(popup) = self.arrange_popup(&page, &path, child_area) {
            ve.overlays.push(popup);
        }

        self.out.push(ve);
        path
    }

    /// Arranges a page's children into `area` (the page's child area in its
    /// own space). Returns the child paths and the final (possibly
    /// scroll-extended) child area.
    pub(crate) fn arrange_page_contents(
        &mut self,
        page: &Item,
        path: &VePath,
        area: Rect,
        inherited: VeFlags,
    ) -> (Vec<VePath>, Rect) {
        let p = page.page_data();
        let ids: Vec<ItemId> = self.store.children(page.id).to_vec();
        let size = area.size();
        let mut children = Vec::with_capacity(ids.len());

        match p.arrangement {
            Arrangement::Spatial => {
                for id in ids {
                    if let Some(child) = self.arrange_spatial_child(page, path, size, id, inherited)
                    {
                        children.push(child);
                    }
                }
                (children, area)
            }
            Arrangement::Grid => {
                let cols = p.grid_columns.max(1);
                for (i, id) in ids.iter().enumerate() {
                    let rect = grid_cell_rect(size.width, cols, i);
                    let block = self.uniform_block_for(*id, rect);
                    if let Some(child) = self.emit_item_ve(
                        path,
                        SegKind::Child,
                        *id,
                        rect,
                        inherited,
                        Expand::NoTables,
                        block,
                    ) {
                        children.push(child);
                    }
                }
                let rows = grid_row_count(ids.len(), cols);
                let cell_h = size.width / cols as f64 / crate::layout::GRID_CELL_ASPECT;
                let content_h = (rows as f64 * cell_h).max(size.height);
                (
                    children,
                    Rect::new(area.x0, area.y0, area.x1, area.y0 + content_h),
                )
            }
            Arrangement::List => self.arrange_list_contents(page, path, area, inherited),
            Arrangement::Justified => {
                let aspects: Vec<f64> = ids
                    .iter()
                    .map(|id| {
                        let aspect = self
                            .display_of(*id)
                            .map(|d| {
                                let s = d.size_bl(self.store);
                                s.width / s.height.max(0.1)
                            })
                            .unwrap_or(1.0);
                        aspect.clamp(0.1, 10.0)
                    })
                    .collect();
                let rects = justified_rects(&aspects, size.width, p.justified_last_row);
                for (id, rect) in ids.iter().zip(&rects) {
                    let block = self.uniform_block_for(*id, *rect);
                    if let Some(child) = self.emit_item_ve(
                        path,
                        SegKind::Child,
                        *id,
                        *rect,
                        inherited,
                        Expand::NoTables,
                        block,
                    ) {
                        children.push(child);
                    }
                }
                let content_h = justified_content_height(&rects).max(size.height);
                (
                    children,
                    Rect::new(area.x0, area.y0, area.x1, area.y0 + content_h),
                )
            }
            Arrangement::Document => {
                let block = BlockSize::uniform(size.width / p.inner_width_bl);
                let mut heights = Vec::with_capacity(ids.len());
                let mut widths = Vec::with_capacity(ids.len());
                for id in &ids {
                    let (w_bl, h_bl) = match self.display_of(*id) {
                        Some(d) => {
                            let w = (d.size_bl(self.store).width).min(p.inner_width_bl);
                            (w, d.height_bl_at_width(w, self.store))
                        }
                        None => (p.inner_width_bl, 1.0),
                    };
                    widths.push(w_bl);
                    heights.push(h_bl * block.h);
                }
                let (ys, total) = document_flow(&heights);
                for (i, id) in ids.iter().enumerate() {
                    let rect = block.rect_from_bl(
                        Point::new(0.0, ys[i] / block.h),
                        Size::new(widths[i], heights[i] / block.h),
                    );
                    if let Some(child) = self.emit_item_ve(
                        path,
                        SegKind::Child,
                        *id,
                        rect,
                        inherited,
                        Expand::Full,
                        block,
                    ) {
                        children.push(child);
                    }
                }
                let content_h = total.max(size.height);
                (
                    children,
                    Rect::new(area.x0, area.y0, area.x1, area.y0 + content_h),
                )
            }
        }
    }

    /// Arranges one child of a spatial page at its explicit position.
    pub(crate) fn arrange_spatial_child(
        &mut self,
        page: &Item,
        page_path: &VePath,
        area: Size,
        child_id: ItemId,
        inherited: VeFlags,
    ) -> Option<VePath> {
        let p = page.page_data();
        let block = BlockSize::of(
            area,
            Size::new(p.inner_width_bl, p.inner_width_bl / p.natural_aspect),
        );
        let raw = self.store.get(child_id)?;
        let sp = raw.spatial()?;
        let w_bl = sp.width_gr / GRID_SIZE;
        let h_bl = self
            .display_of(child_id)
            .map(|d| d.height_bl_at_width(w_bl, self.store))
            .unwrap_or(1.0);
        let rect = block.rect_from_gr(sp.pos_gr, Size::new(sp.width_gr, h_bl * GRID_SIZE));
        self.emit_item_ve(
            page_path,
            SegKind::Child,
            child_id,
            rect,
            inherited,
            Expand::Full,
            block,
        )
    }

    /// Arranges the compact rows (and selected detail) of a list page.
    fn arrange_list_contents(
        &mut self,
        page: &Item,
        path: &VePath,
        area: Rect,
        inherited: VeFlags,
    ) -> (Vec<VePath>, Rect) {
        let p = page.page_data();
        let ids: Vec<ItemId> = self.store.children(page.id).to_vec();
        let pane_w = (p.list_pane_width_bl * LIST_BLOCK_PX).min(area.width());
        let mut children = Vec::with_capacity(ids.len() + 1);
        for (i, id) in ids.iter().enumerate() {
            if let Some(row) = self.arrange_list_row(path, pane_w, i, *id, inherited) {
                children.push(row);
            }
        }
        if let Some(selected) = p.selected_list_item {
            if ids.contains(&selected) {
                let detail = Rect::new(pane_w, 0.0, area.width(), area.height());
                let block = self.uniform_block_for(selected, detail);
                if let Some(d) = self.emit_item_ve(
                    path,
                    SegKind::Detail,
                    selected,
                    detail,
                    inherited,
                    Expand::Full,
                    block,
                ) {
                    children.push(d);
                }
            }
        }
        let content_h = (ids.len() as f64 * crate::layout::LIST_ROW_HEIGHT_PX).max(area.height());
        (
            children,
            Rect::new(area.x0, area.y0, area.x1, area.y0 + content_h),
        )
    }

    /// Arranges one list row.
    pub(crate) fn arrange_list_row(
        &mut self,
        parent_path: &VePath,
        pane_w: f64,
        index: usize,
        child_id: ItemId,
        inherited: VeFlags,
    ) -> Option<VePath> {
        let rect = list_row_rect(pane_w, index);
        let path = self.emit_item_ve(
            parent_path,
            SegKind::Child,
            child_id,
            rect,
            inherited | VeFlags::LIST_PAGE_ROW,
            Expand::Leaf,
            BlockSize::uniform(LIST_BLOCK_PX),
        )?;
        Some(path)
    }

    /// Arranges one row of a table (the child item plus its attachment
    /// cells in the extra columns).
    pub(crate) fn arrange_table_row(
        &mut self,
        table: &Item,
        table_path: &VePath,
        index: usize,
        child_id: ItemId,
        block: BlockSize,
        inherited: VeFlags,
    ) -> Option<VePath> {
        let t = table.table_data();
        let width_px: f64 = t.column_widths_bl.iter().sum::<f64>() * block.w;
        let rect = quantize(Rect::new(
            0.0,
            index as f64 * block.h,
            width_px,
            (index + 1) as f64 * block.h,
        ));
        let row_flags = inherited | VeFlags::INSIDE_TABLE;
        let row_path = self.emit_item_ve(
            table_path,
            SegKind::Child,
            child_id,
            rect,
            row_flags,
            Expand::Leaf,
            block,
        )?;

        // Attachment cells in the extra columns.
        let display_id = row_path.item();
        let atts: Vec<ItemId> = self.store.attachments(display_id).to_vec();
        let mut att_paths = Vec::new();
        let mut x = t.column_widths_bl[0] * block.w;
        for (col_w, att_id) in t.column_widths_bl.iter().skip(1).zip(atts.iter()) {
            let cell = quantize(Rect::new(x, 0.0, x + col_w * block.w, block.h));
            if let Some(att) = self.emit_item_ve(
                &row_path,
                SegKind::Child,
                *att_id,
                cell,
                row_flags,
                Expand::Leaf,
                block,
            ) {
                // Cells open their attachment; they are not draggable rows.
                if let Some(cell_ve) = self.out.iter_mut().rev().find(|ve| ve.path == att) {
                    cell_ve.hitboxes = alloc::vec![Hitbox::new(
                        HitboxFlags::CLICK,
                        Rect::from_origin_size(Point::ZERO, cell.size()),
                    )];
                }
                att_paths.push(att);
            }
            x += col_w * block.w;
        }
        if !att_paths.is_empty() {
            if let Some(row_ve) = self.out.iter_mut().rev().find(|ve| ve.path == row_path) {
                row_ve.attachments = att_paths;
            }
        }
        Some(row_path)
    }

    /// Arranges the dock strip showing `dock_page` in row form.
    fn arrange_dock(
        &mut self,
        dock_page: ItemId,
        root_path: &VePath,
        strip: Rect,
    ) -> Option<VePath> {
        let page = self.store.get(dock_page)?;
        debug_assert!(page.as_page().is_some(), "dock item must be a page");
        self.request_children(dock_page);
        let path = root_path.push(PathSeg {
            item: dock_page,
            link: None,
            kind: SegKind::Dock,
        });
        let mut ve = VisualElement::new(path.clone(), dock_page, strip);
        ve.flags = VeFlags::DOCK
            | VeFlags::EMBEDDED_INTERACTIVE_ROOT
            | VeFlags::DETAILED
            | VeFlags::INSIDE_COMPOSITE_OR_DOCK;
        let ids: Vec<ItemId> = self.store.children(dock_page).to_vec();
        let inherited = VeFlags::DOCK | VeFlags::INSIDE_COMPOSITE_OR_DOCK;
        let mut rows = Vec::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if let Some(row) = self.arrange_list_row(&path, strip.width(), i, *id, inherited) {
                rows.push(row);
            }
        }
        ve.children = rows;
        ve.child_area = Some(Rect::from_origin_size(Point::ZERO, strip.size()));
        // Right-edge grab strip resizes the dock.
        ve.hitboxes = alloc::vec![Hitbox::col_resize(
            Rect::new(
                strip.width() - COL_RESIZE_GRAB_PX,
                0.0,
                strip.width(),
                strip.height()
            ),
            0,
        )];
        self.out.push(ve);
        Some(path)
    }

    /// Arranges the page's popup overlay, if one is open.
    fn arrange_popup(
        &mut self,
        root_page: &Item,
        root_path: &VePath,
        child_area: Rect,
    ) -> Option<VePath> {
        let popup_id = self.overlay.popup?;
        let target = self.store.get(popup_id)?;
        let p = root_page.page_data();
        let block = BlockSize::of(
            child_area.size(),
            Size::new(p.inner_width_bl, p.inner_width_bl / p.natural_aspect),
        );
        let w_bl = p.popup_width_gr / GRID_SIZE;
        let h_bl = target.height_bl_at_width(w_bl, self.store);
        let w_px = w_bl * block.w;
        let h_px = h_bl * block.h;
        let center = Point::new(
            child_area.x0 + p.popup_pos_gr.x / GRID_SIZE * block.w,
            child_area.y0 + p.popup_pos_gr.y / GRID_SIZE * block.h,
        );
        let rect = quantize(Rect::new(
            center.x - w_px / 2.0,
            center.y - h_px / 2.0,
            center.x + w_px / 2.0,
            center.y + h_px / 2.0,
        ));
        let path = self.emit_item_ve(
            root_path,
            SegKind::Popup,
            popup_id,
            rect,
            VeFlags::POPUP,
            Expand::Full,
            block,
        )?;
        if let Some(ve) = self.out.iter_mut().rev().find(|ve| ve.path == path) {
            ve.flags |= VeFlags::EMBEDDED_INTERACTIVE_ROOT;
            // The popup chrome: a move border along the top and a resize
            // corner; content interaction goes through the children.
            ve.hitboxes = alloc::vec![
                Hitbox::new(
                    HitboxFlags::MOVE,
                    Rect::new(0.0, 0.0, rect.width(), POPUP_BORDER_PX),
                ),
                Hitbox::new(
                    HitboxFlags::RESIZE,
                    Rect::new(
                        rect.width() - RESIZE_HANDLE_PX,
                        rect.height() - RESIZE_HANDLE_PX,
                        rect.width(),
                        rect.height(),
                    ),
                ),
            ];
        }
        Some(path)
    }

    /// The item a child displays: the child itself, or its link target.
    fn display_of(&self, child_id: ItemId) -> Option<&'a Item> {
        let item = self.store.get(child_id)?;
        match &item.kind {
            ItemKind::Link(l) => l.target.and_then(|t| self.store.get(t)),
            _ => Some(item),
        }
    }

    /// Re-places one attachment chip at its indexed slot along the parent's
    /// top edge.
    pub(crate) fn rearrange_attachment_chip(
        &mut self,
        parent_ve: &VisualElement,
        parent_path: &VePath,
        index: usize,
        source: ItemId,
        inherited: VeFlags,
    ) -> Option<VePath> {
        let size = parent_ve.bounds.size();
        let x1 = size.width - index as f64 * ATTACH_CHIP_PX;
        let chip = quantize(Rect::new(x1 - ATTACH_CHIP_PX, 0.0, x1, ATTACH_CHIP_PX));
        self.emit_item_ve(
            parent_path,
            SegKind::Child,
            source,
            chip,
            inherited,
            Expand::Leaf,
            BlockSize::uniform(ATTACH_CHIP_PX),
        )
    }

    /// A uniform block size matching the child's own width when rendered
    /// into `rect` (grid cells, justified cells, detail panes).
    pub(crate) fn uniform_block_for(&self, child_id: ItemId, rect: Rect) -> BlockSize {
        let w_bl = self
            .display_of(child_id)
            .and_then(|d| d.spatial())
            .map(|s| (s.width_gr / GRID_SIZE).max(1.0))
            .unwrap_or(1.0);
        BlockSize::uniform((rect.width() / w_bl).max(1.0))
    }

    /// Creates the visual element for one item (resolving link indirection)
    /// and recurses into container internals where `expand` allows.
    pub(crate) fn emit_item_ve(
        &mut self,
        parent_path: &VePath,
        seg_kind: SegKind,
        child_id: ItemId,
        rect: Rect,
        inherited: VeFlags,
        expand: Expand,
        block: BlockSize,
    ) -> Option<VePath> {
        let raw = self.store.get(child_id)?;
        let (display, link_id) = match &raw.kind {
            ItemKind::Link(l) => match l.target.and_then(|t| self.store.get(t)) {
                Some(target) => (target.clone(), Some(child_id)),
                None => {
                    // Unresolved link: an empty, non-interactive placeholder.
                    let path = parent_path.push(PathSeg {
                        item: child_id,
                        link: None,
                        kind: seg_kind,
                    });
                    let mut ve = VisualElement::new(path.clone(), child_id, rect);
                    ve.flags = inherited | VeFlags::PLACEHOLDER;
                    self.out.push(ve);
                    return Some(path);
                }
            },
            _ => (raw.clone(), None),
        };

        let path = parent_path.push(PathSeg {
            item: display.id,
            link: link_id,
            kind: seg_kind,
        });
        let mut ve = VisualElement::new(path.clone(), display.id, rect);
        ve.link_item = link_id;
        ve.flags = inherited;

        if rect.width() < DETAIL_MIN_PX {
            ve.flags |= VeFlags::PLACEHOLDER;
            self.out.push(ve);
            return Some(path);
        }
        ve.flags |= VeFlags::DETAILED;

        if display.is_container() {
            self.request_children(display.id);
        }

        let size = rect.size();
        match &display.kind {
            ItemKind::Page(p) => {
                let expanded = expand != Expand::Leaf && size.width >= PAGE_EXPAND_MIN_PX;
                if expanded {
                    ve.flags |= VeFlags::EMBEDDED_INTERACTIVE_ROOT;
                    let area = Rect::from_origin_size(Point::ZERO, size);
                    let (children, child_area) = self.arrange_page_contents(
                        &display,
                        &path,
                        area,
                        inherited & INHERITED_MASK,
                    );
                    ve.children = children;
                    ve.child_area = Some(child_area);
                }
                ve.hitboxes = page_hitboxes(size);
                if expanded && p.arrangement == Arrangement::List {
                    ve.hitboxes.push(list_pane_hitbox(p, ve.child_area_or_bounds()));
                }
            }
            ItemKind::Table(t) => {
                debug_assert!(
                    expand != Expand::NoTables,
                    "table children are not supported in grid and justified pages"
                );
                if expand == Expand::Full {
                    let header_h = if t.show_header { block.h } else { 0.0 };
                    let child_area = Rect::new(0.0, header_h, size.width, size.height);
                    #[expect(clippy::cast_possible_truncation, reason = "small visible row count")]
                    let visible = ((size.height - header_h) / block.h).max(0.0) as usize;
                    let ids: Vec<ItemId> = self.store.children(display.id).to_vec();
                    let mut rows = Vec::new();
                    for (i, id) in ids.iter().take(visible).enumerate() {
                        if let Some(row) = self.arrange_table_row(
                            &display,
                            &path,
                            i,
                            *id,
                            block,
                            inherited & INHERITED_MASK,
                        ) {
                            rows.push(row);
                        }
                    }
                    ve.children = rows;
                    ve.child_area = Some(child_area);
                }
                ve.hitboxes = table_hitboxes(t, size, block);
            }
            ItemKind::Composite(_) => {
                if expand != Expand::Leaf {
                    let (members, child_area) =
                        self.arrange_composite_members(&display, &path, size, block, inherited);
                    ve.children = members;
                    ve.child_area = Some(child_area);
                }
                ve.hitboxes = composite_hitboxes(size);
            }
            ItemKind::Note(_) | ItemKind::Image(_) => {
                ve.hitboxes = note_like_hitboxes(size, ve.flags);
            }
            ItemKind::Rating(_) => {
                ve.hitboxes = alloc::vec![
                    Hitbox::new(
                        HitboxFlags::CLICK | HitboxFlags::MOVE,
                        Rect::from_origin_size(Point::ZERO, size),
                    ),
                ];
            }
            ItemKind::Link(_) => unreachable!("links resolve before emission"),
        }

        // Compact contexts flatten every kind to a plain row.
        if ve
            .flags
            .intersects(VeFlags::LIST_PAGE_ROW | VeFlags::INSIDE_TABLE)
        {
            ve.hitboxes = row_hitboxes(size);
        }

        // Attachment chips at the top-right (not inside tables, where
        // attachments occupy the extra columns instead).
        if expand != Expand::Leaf && !ve.flags.contains(VeFlags::INSIDE_TABLE) {
            let atts: Vec<ItemId> = self.store.attachments(display.id).to_vec();
            let mut chips = Vec::new();
            for (k, att_id) in atts.iter().enumerate() {
                let x1 = size.width - k as f64 * ATTACH_CHIP_PX;
                let chip = quantize(Rect::new(x1 - ATTACH_CHIP_PX, 0.0, x1, ATTACH_CHIP_PX));
                if let Some(att) = self.emit_item_ve(
                    &path,
                    SegKind::Child,
                    *att_id,
                    chip,
                    inherited & INHERITED_MASK,
                    Expand::Leaf,
                    block,
                ) {
                    chips.push(att);
                }
            }
            ve.attachments = chips;
        }

        self.out.push(ve);
        Some(path)
    }

    /// Arranges composite members stacked vertically.
    fn arrange_composite_members(
        &mut self,
        comp: &Item,
        path: &VePath,
        size: Size,
        block: BlockSize,
        inherited: VeFlags,
    ) -> (Vec<VePath>, Rect) {
        let w_bl = size.width / block.w;
        let ids: Vec<ItemId> = self.store.children(comp.id).to_vec();
        let member_flags = (inherited & INHERITED_MASK)
            | VeFlags::INSIDE_COMPOSITE
            | VeFlags::INSIDE_COMPOSITE_OR_DOCK;
        let mut members = Vec::with_capacity(ids.len());
        let mut y_bl = 0.0;
        for id in ids {
            let h_bl = self
                .display_of(id)
                .map(|d| d.height_bl_at_width(w_bl, self.store))
                .unwrap_or(1.0);
            let rect = block.rect_from_bl(Point::new(0.0, y_bl), Size::new(w_bl, h_bl));
            if let Some(member) = self.emit_item_ve(
                path,
                SegKind::Child,
                id,
                rect,
                member_flags,
                Expand::Leaf,
                block,
            ) {
                members.push(member);
            }
            y_bl += h_bl;
        }
        let content_h = (y_bl * block.h).max(size.height);
        (members, Rect::new(0.0, 0.0, size.width, content_h))
    }
}

/// Hitboxes for a page shown as a child item.
fn page_hitboxes(size: Size) -> Vec<Hitbox> {
    alloc::vec![
        Hitbox::new(
            HitboxFlags::OPEN_POPUP | HitboxFlags::MOVE,
            Rect::from_origin_size(Point::ZERO, size),
        ),
        Hitbox::new(
            HitboxFlags::EXPAND,
            Rect::new(0.0, 0.0, EXPAND_HANDLE_PX, EXPAND_HANDLE_PX),
        ),
        Hitbox::new(
            HitboxFlags::ATTACH,
            Rect::new(size.width - ATTACH_HANDLE_PX, 0.0, size.width, ATTACH_HANDLE_PX),
        ),
        Hitbox::new(
            HitboxFlags::RESIZE,
            Rect::new(
                size.width - RESIZE_HANDLE_PX,
                size.height - RESIZE_HANDLE_PX,
                size.width,
                size.height,
            ),
        ),
    ]
}

/// Hitboxes for notes and images.
fn note_like_hitboxes(size: Size, flags: VeFlags) -> Vec<Hitbox> {
    let mut hbs = alloc::vec![
        Hitbox::new(
            HitboxFlags::CLICK | HitboxFlags::MOVE,
            Rect::from_origin_size(Point::ZERO, size),
        ),
        Hitbox::new(
            HitboxFlags::ATTACH,
            Rect::new(size.width - ATTACH_HANDLE_PX, 0.0, size.width, ATTACH_HANDLE_PX),
        ),
    ];
    if !flags.contains(VeFlags::INSIDE_COMPOSITE) {
        hbs.push(Hitbox::new(
            HitboxFlags::RESIZE,
            Rect::new(
                size.width - RESIZE_HANDLE_PX,
                size.height - RESIZE_HANDLE_PX,
                size.width,
                size.height,
            ),
        ));
    }
    hbs
}

/// The pane-boundary grab strip of a list page, in the page's own space.
fn list_pane_hitbox(p: &arbor_items::PageItem, area: Rect) -> Hitbox {
    let x = area.x0 + (p.list_pane_width_bl * LIST_BLOCK_PX).min(area.width());
    Hitbox::col_resize(
        Rect::new(
            x - COL_RESIZE_GRAB_PX / 2.0,
            area.y0,
            x + COL_RESIZE_GRAB_PX / 2.0,
            area.y1,
        ),
        0,
    )
}

/// Hitboxes for compact rows (tables, list pages).
fn row_hitboxes(size: Size) -> Vec<Hitbox> {
    alloc::vec![Hitbox::new(
        HitboxFlags::CLICK | HitboxFlags::MOVE,
        Rect::from_origin_size(Point::ZERO, size),
    )]
}

/// Hitboxes for a table: header move/click, column-resize strips, resize.
fn table_hitboxes(t: &arbor_items::TableItem, size: Size, block: BlockSize) -> Vec<Hitbox> {
    let mut hbs = Vec::new();
    if t.show_header {
        hbs.push(Hitbox::new(
            HitboxFlags::CLICK | HitboxFlags::MOVE,
            Rect::new(0.0, 0.0, size.width, block.h),
        ));
    }
    let mut x = 0.0;
    for (col, w_bl) in t.column_widths_bl.iter().enumerate() {
        x += w_bl * block.w;
        hbs.push(Hitbox::col_resize(
            Rect::new(
                x - COL_RESIZE_GRAB_PX / 2.0,
                0.0,
                x + COL_RESIZE_GRAB_PX / 2.0,
                size.height,
            ),
            col,
        ));
    }
    hbs.push(Hitbox::new(
        HitboxFlags::RESIZE,
        Rect::new(
            size.width - RESIZE_HANDLE_PX,
            size.height - RESIZE_HANDLE_PX,
            size.width,
            size.height,
        ),
    ));
    hbs
}

/// Hitboxes for a composite.
///
/// Order matters for the hit tie-break: the whole-bounds body comes first
/// and loses to members; the dedicated handle strip is last and wins over
/// them.
fn composite_hitboxes(size: Size) -> Vec<Hitbox> {
    alloc::vec![
        Hitbox::new(
            HitboxFlags::ATTACH_COMPOSITE | HitboxFlags::MOVE,
            Rect::from_origin_size(Point::ZERO, size),
        ),
        Hitbox::new(
            HitboxFlags::RESIZE,
            Rect::new(
                size.width - RESIZE_HANDLE_PX,
                size.height - RESIZE_HANDLE_PX,
                size.width,
                size.height,
            ),
        ),
        Hitbox::new(
            HitboxFlags::MOVE | HitboxFlags::CLICK,
            Rect::new(size.width - COMPOSITE_HANDLE_PX, 0.0, size.width, size.height),
        ),
    ]
}
