// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item types and their type-specific fields.

use alloc::string::String;
use alloc::vec::Vec;

use arbor_geometry::{GRID_SIZE, line_count};
use kurbo::{Point, Size};

use crate::OrderKey;
use crate::store::ItemStore;

/// Minimum table height in grid units (two blocks: header plus one row).
pub const MIN_TABLE_HEIGHT_GR: f64 = 2.0 * GRID_SIZE;

/// Stable identifier of an item.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// How an item relates to its parent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Relationship {
    /// Ordinary contained child.
    Child,
    /// Attached to the parent item (shown alongside it, not inside it).
    Attachment,
}

/// Layout strategy applied to a page's children.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arrangement {
    /// Children at explicit positions within the page's inner width.
    Spatial,
    /// Fixed column count, row-major cells.
    Grid,
    /// Single column of fixed-height rows with a detail pane.
    List,
    /// Photo-wall row packing by aspect ratio.
    Justified,
    /// Vertical flow in sort order, ignoring spatial coordinates.
    Document,
}

/// How the (possibly short) last row of a justified page is placed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JustifiedLastRow {
    /// Stretch to fill the row like every other row.
    Justify,
    /// Keep the target row height, align left.
    LeftAlign,
    /// Keep the target row height, center horizontally.
    Center,
}

/// Position and width in grid units within the parent container.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spatial {
    /// Top-left position in grid units.
    pub pos_gr: Point,
    /// Width in grid units.
    pub width_gr: f64,
}

/// Page: a container whose children are laid out by an [`Arrangement`].
#[derive(Clone, Debug, PartialEq)]
pub struct PageItem {
    /// Geometry within the parent container.
    pub spatial: Spatial,
    /// Declared inner width in blocks; children are positioned within it.
    pub inner_width_bl: f64,
    /// Width-to-height ratio of the page's natural shape.
    pub natural_aspect: f64,
    /// Layout strategy for the page's children.
    pub arrangement: Arrangement,
    /// Column count for [`Arrangement::Grid`].
    pub grid_columns: usize,
    /// Last-row policy for [`Arrangement::Justified`].
    pub justified_last_row: JustifiedLastRow,
    /// Width of the row pane in blocks for [`Arrangement::List`].
    pub list_pane_width_bl: f64,
    /// The selected row of a list page. Persisted on the page, not on any
    /// transient visual element.
    pub selected_list_item: Option<ItemId>,
    /// Center position of this page's popup, in this page's grid units.
    pub popup_pos_gr: Point,
    /// Width of this page's popup in grid units.
    pub popup_width_gr: f64,
}

impl Default for PageItem {
    fn default() -> Self {
        Self {
            spatial: Spatial {
                pos_gr: Point::ZERO,
                width_gr: 4.0 * GRID_SIZE,
            },
            inner_width_bl: 8.0,
            natural_aspect: 1.6,
            arrangement: Arrangement::Spatial,
            grid_columns: 4,
            justified_last_row: JustifiedLastRow::LeftAlign,
            list_pane_width_bl: 8.0,
            selected_list_item: None,
            popup_pos_gr: Point::new(240.0, 150.0),
            popup_width_gr: 240.0,
        }
    }
}

/// Table: a container shown as a header plus one row per child.
#[derive(Clone, Debug, PartialEq)]
pub struct TableItem {
    /// Geometry within the parent container.
    pub spatial: Spatial,
    /// Height in grid units.
    pub height_gr: f64,
    /// Column widths in blocks. The first column shows the child title;
    /// subsequent columns show the child's attachments.
    pub column_widths_bl: Vec<f64>,
    /// Whether the one-block header row is shown.
    pub show_header: bool,
}

/// Note: a block of wrapped text.
#[derive(Clone, Debug, PartialEq)]
pub struct NoteItem {
    /// Geometry within the parent container.
    pub spatial: Spatial,
}

/// Composite: members stacked vertically inside a shared border.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeItem {
    /// Geometry within the parent container.
    pub spatial: Spatial,
}

/// Image with an intrinsic aspect ratio.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageItem {
    /// Geometry within the parent container.
    pub spatial: Spatial,
    /// Intrinsic width-to-height ratio.
    pub aspect: f64,
}

/// Rating: a fixed one-by-one block showing a star value.
#[derive(Clone, Debug, PartialEq)]
pub struct RatingItem {
    /// Top-left position in grid units.
    pub pos_gr: Point,
    /// Star value, `0..=5`.
    pub rating: u8,
}

/// Link: a non-owning redirect to another item.
///
/// Carries its own geometry override; resolves at arrangement time to the
/// target item's content. A link with no (or unknown) target arranges as an
/// empty placeholder.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkItem {
    /// Geometry within the parent container.
    pub spatial: Spatial,
    /// The linked-to item, if any.
    pub target: Option<ItemId>,
}

/// Type-specific item data.
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "variants mirror the per-kind structs")]
pub enum ItemKind {
    Page(PageItem),
    Table(TableItem),
    Note(NoteItem),
    Composite(CompositeItem),
    Image(ImageItem),
    Rating(RatingItem),
    Link(LinkItem),
}

/// A node in the document hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    /// Stable identifier.
    pub id: ItemId,
    /// Owning parent, if any.
    pub parent: Option<ItemId>,
    /// Relationship to the parent.
    pub relationship: Relationship,
    /// Fractional sibling ordering key.
    pub order: OrderKey,
    /// Title; for notes this is the displayed text.
    pub title: String,
    /// Type-specific data.
    pub kind: ItemKind,
}

impl Item {
    fn new(id: ItemId, kind: ItemKind) -> Self {
        Self {
            id,
            parent: None,
            relationship: Relationship::Child,
            order: OrderKey::initial(),
            title: String::new(),
            kind,
        }
    }

    /// Creates a detached page item.
    #[must_use]
    pub fn page(id: ItemId, page: PageItem) -> Self {
        Self::new(id, ItemKind::Page(page))
    }

    /// Creates a detached table item.
    #[must_use]
    pub fn table(id: ItemId, pos_gr: Point, width_gr: f64, height_gr: f64) -> Self {
        Self::new(
            id,
            ItemKind::Table(TableItem {
                spatial: Spatial { pos_gr, width_gr },
                height_gr,
                column_widths_bl: alloc::vec![4.0],
                show_header: true,
            }),
        )
    }

    /// Creates a detached note item.
    #[must_use]
    pub fn note(id: ItemId, pos_gr: Point, width_gr: f64) -> Self {
        Self::new(
            id,
            ItemKind::Note(NoteItem {
                spatial: Spatial { pos_gr, width_gr },
            }),
        )
    }

    /// Creates a detached composite item.
    #[must_use]
    pub fn composite(id: ItemId, pos_gr: Point, width_gr: f64) -> Self {
        Self::new(
            id,
            ItemKind::Composite(CompositeItem {
                spatial: Spatial { pos_gr, width_gr },
            }),
        )
    }

    /// Creates a detached image item.
    #[must_use]
    pub fn image(id: ItemId, pos_gr: Point, width_gr: f64, aspect: f64) -> Self {
        debug_assert!(aspect > 0.0, "image aspect must be positive");
        Self::new(
            id,
            ItemKind::Image(ImageItem {
                spatial: Spatial { pos_gr, width_gr },
                aspect,
            }),
        )
    }

    /// Creates a detached rating item.
    #[must_use]
    pub fn rating(id: ItemId, pos_gr: Point, rating: u8) -> Self {
        debug_assert!(rating <= 5, "rating must be 0..=5");
        Self::new(id, ItemKind::Rating(RatingItem { pos_gr, rating }))
    }

    /// Creates a detached link item.
    #[must_use]
    pub fn link(id: ItemId, pos_gr: Point, width_gr: f64, target: Option<ItemId>) -> Self {
        Self::new(
            id,
            ItemKind::Link(LinkItem {
                spatial: Spatial { pos_gr, width_gr },
                target,
            }),
        )
    }

    /// Sets the title; builder-style helper for construction.
    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = String::from(title);
        self
    }

    /// Whether this item can contain children.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Page(_) | ItemKind::Table(_) | ItemKind::Composite(_)
        )
    }

    /// Spatial geometry within the parent, if this kind has one.
    ///
    /// Ratings report a fixed one-block width.
    #[must_use]
    pub fn spatial(&self) -> Option<Spatial> {
        match &self.kind {
            ItemKind::Page(p) => Some(p.spatial),
            ItemKind::Table(t) => Some(t.spatial),
            ItemKind::Note(n) => Some(n.spatial),
            ItemKind::Composite(c) => Some(c.spatial),
            ItemKind::Image(i) => Some(i.spatial),
            ItemKind::Rating(r) => Some(Spatial {
                pos_gr: r.pos_gr,
                width_gr: GRID_SIZE,
            }),
            ItemKind::Link(l) => Some(l.spatial),
        }
    }

    /// Updates the position in grid units. Returns `false` for kinds with no
    /// spatial geometry.
    pub fn set_position_gr(&mut self, pos_gr: Point) -> bool {
        match &mut self.kind {
            ItemKind::Page(p) => p.spatial.pos_gr = pos_gr,
            ItemKind::Table(t) => t.spatial.pos_gr = pos_gr,
            ItemKind::Note(n) => n.spatial.pos_gr = pos_gr,
            ItemKind::Composite(c) => c.spatial.pos_gr = pos_gr,
            ItemKind::Image(i) => i.spatial.pos_gr = pos_gr,
            ItemKind::Rating(r) => r.pos_gr = pos_gr,
            ItemKind::Link(l) => l.spatial.pos_gr = pos_gr,
        }
        true
    }

    /// Updates the width in grid units. Returns `false` for kinds with a
    /// fixed width.
    pub fn set_width_gr(&mut self, width_gr: f64) -> bool {
        let width_gr = width_gr.max(GRID_SIZE);
        match &mut self.kind {
            ItemKind::Page(p) => p.spatial.width_gr = width_gr,
            ItemKind::Table(t) => t.spatial.width_gr = width_gr,
            ItemKind::Note(n) => n.spatial.width_gr = width_gr,
            ItemKind::Composite(c) => c.spatial.width_gr = width_gr,
            ItemKind::Image(i) => i.spatial.width_gr = width_gr,
            ItemKind::Rating(_) => return false,
            ItemKind::Link(l) => l.spatial.width_gr = width_gr,
        }
        true
    }

    /// The page data, if this is a page.
    #[must_use]
    pub fn as_page(&self) -> Option<&PageItem> {
        match &self.kind {
            ItemKind::Page(p) => Some(p),
            _ => None,
        }
    }

    /// The page data. Panics if this is not a page; callers rely on the
    /// document model's type consistency.
    #[must_use]
    pub fn page_data(&self) -> &PageItem {
        match &self.kind {
            ItemKind::Page(p) => p,
            _ => panic!("item {} is not a page", self.id),
        }
    }

    /// The table data, if this is a table.
    #[must_use]
    pub fn as_table(&self) -> Option<&TableItem> {
        match &self.kind {
            ItemKind::Table(t) => Some(t),
            _ => None,
        }
    }

    /// The table data. Panics if this is not a table.
    #[must_use]
    pub fn table_data(&self) -> &TableItem {
        match &self.kind {
            ItemKind::Table(t) => t,
            _ => panic!("item {} is not a table", self.id),
        }
    }

    /// The link data, if this is a link.
    #[must_use]
    pub fn as_link(&self) -> Option<&LinkItem> {
        match &self.kind {
            ItemKind::Link(l) => Some(l),
            _ => None,
        }
    }

    /// Natural size in blocks at the item's own width.
    ///
    /// Composites consult the store for member heights; all other kinds are
    /// self-contained.
    #[must_use]
    pub fn size_bl(&self, store: &dyn ItemStore) -> Size {
        let w = match self.spatial() {
            Some(s) => s.width_gr / GRID_SIZE,
            None => 1.0,
        };
        Size::new(w, self.height_bl_at_width(w, store))
    }

    /// Natural height in blocks when rendered `width_bl` blocks wide.
    #[must_use]
    pub fn height_bl_at_width(&self, width_bl: f64, store: &dyn ItemStore) -> f64 {
        match &self.kind {
            ItemKind::Page(p) => width_bl / p.natural_aspect,
            ItemKind::Table(t) => t.height_gr / GRID_SIZE,
            ItemKind::Note(_) => line_count(&self.title, width_bl) as f64,
            ItemKind::Composite(_) => store
                .children(self.id)
                .iter()
                .filter_map(|id| store.get(*id))
                .map(|member| member.height_bl_at_width(width_bl, store))
                .sum::<f64>()
                .max(1.0),
            ItemKind::Image(i) => width_bl / i.aspect,
            ItemKind::Rating(_) => 1.0,
            ItemKind::Link(_) => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn note_height_follows_line_count() {
        let store = MemoryStore::new();
        let short = Item::note(ItemId(1), Point::ZERO, 4.0 * GRID_SIZE).with_title("hi");
        let long =
            Item::note(ItemId(2), Point::ZERO, 4.0 * GRID_SIZE).with_title(&"x".repeat(60));
        assert_eq!(short.size_bl(&store), Size::new(4.0, 1.0));
        assert_eq!(long.size_bl(&store), Size::new(4.0, 3.0));
    }

    #[test]
    fn page_height_follows_natural_aspect() {
        let store = MemoryStore::new();
        let page = Item::page(
            ItemId(1),
            PageItem {
                spatial: Spatial {
                    pos_gr: Point::ZERO,
                    width_gr: 8.0 * GRID_SIZE,
                },
                natural_aspect: 2.0,
                ..PageItem::default()
            },
        );
        assert_eq!(page.size_bl(&store), Size::new(8.0, 4.0));
    }

    #[test]
    fn composite_height_sums_member_heights() {
        let mut store = MemoryStore::new();
        let root = store.add_root(Item::page(store.mint_id(), PageItem::default()));
        let comp = store.add_child(root, Item::composite(store.mint_id(), Point::ZERO, 240.0));
        store.add_child(comp, Item::note(store.mint_id(), Point::ZERO, 240.0).with_title("a"));
        store.add_child(
            comp,
            Item::note(store.mint_id(), Point::ZERO, 240.0).with_title(&"y".repeat(50)),
        );
        use crate::ItemStore as _;
        let comp_item = store.get(comp).unwrap();
        // 1 line + 2 lines at 4 blocks wide.
        assert_eq!(comp_item.height_bl_at_width(4.0, &store), 3.0);
    }

    #[test]
    fn rating_has_fixed_one_block_geometry() {
        let store = MemoryStore::new();
        let mut r = Item::rating(ItemId(1), Point::new(60.0, 0.0), 3);
        assert_eq!(r.size_bl(&store), Size::new(1.0, 1.0));
        assert!(!r.set_width_gr(300.0));
    }

    #[test]
    #[should_panic(expected = "is not a page")]
    fn page_cast_on_note_is_fatal() {
        let note = Item::note(ItemId(1), Point::ZERO, 60.0);
        let _ = note.page_data();
    }
}
