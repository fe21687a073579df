// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The item-store traits and an in-memory reference implementation.

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;

use hashbrown::{HashMap, HashSet};
use kurbo::Point;

use crate::{Item, ItemId, ItemKind, OrderKey, Relationship};

/// Read access to the document hierarchy.
///
/// Implementations must be non-blocking: children that have not been fetched
/// yet are simply absent from [`children`](Self::children) and reported via
/// [`is_children_loaded`](Self::is_children_loaded). The engine arranges with
/// whatever is present and requests loads separately.
pub trait ItemStore {
    /// Looks up an item by id.
    fn get(&self, id: ItemId) -> Option<&Item>;

    /// The loaded children of `id`, sorted by order key.
    fn children(&self, id: ItemId) -> &[ItemId];

    /// The loaded attachments of `id`, sorted by order key.
    fn attachments(&self, id: ItemId) -> &[ItemId];

    /// Whether `id`'s children have been fetched.
    fn is_children_loaded(&self, id: ItemId) -> bool;

    /// Monotonic counter bumped on every mutation.
    ///
    /// Used to detect that the document changed under an in-progress pointer
    /// action.
    fn revision(&self) -> u64;
}

/// Write access to the document hierarchy.
///
/// Every method bumps [`ItemStore::revision`]. Methods that address a
/// type-specific field panic when called on the wrong kind; the document
/// model guarantees type consistency by construction, so a mismatch is a
/// programmer error.
pub trait ItemStoreMut: ItemStore {
    /// Sets an item's position in grid units.
    fn set_position(&mut self, id: ItemId, pos_gr: Point);

    /// Sets an item's width in grid units.
    fn set_width(&mut self, id: ItemId, width_gr: f64);

    /// Sets an item's title.
    fn set_title(&mut self, id: ItemId, title: &str);

    /// Sets a table's height in grid units.
    fn set_table_height(&mut self, id: ItemId, height_gr: f64);

    /// Sets the width of one table column in blocks.
    fn set_table_column_width(&mut self, id: ItemId, col: usize, width_bl: f64);

    /// Sets a page's popup geometry in the page's grid units.
    fn set_page_popup(&mut self, id: ItemId, pos_gr: Point, width_gr: f64);

    /// Sets a list page's row-pane width in blocks.
    fn set_page_list_pane_width(&mut self, id: ItemId, width_bl: f64);

    /// Sets a list page's selected row.
    fn set_page_selected_row(&mut self, id: ItemId, selected: Option<ItemId>);

    /// Moves an item to a new parent with the given relationship and order.
    fn move_item(
        &mut self,
        id: ItemId,
        new_parent: ItemId,
        relationship: Relationship,
        order: OrderKey,
    );

    /// Re-sorts `id`'s children and attachments by order key.
    fn sort_children(&mut self, id: ItemId);
}

/// In-memory [`ItemStore`] used by tests and fully resident embedders.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: HashMap<ItemId, Item>,
    children: HashMap<ItemId, Vec<ItemId>>,
    attachments: HashMap<ItemId, Vec<ItemId>>,
    loaded: HashSet<ItemId>,
    next_id: Cell<u64>,
    revision: u64,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            ..Self::default()
        }
    }

    /// Mints a fresh item id.
    ///
    /// Takes `&self` so an id can be minted inline in the argument list of
    /// `add_child`/`add_root` without a second mutable borrow of the store.
    pub fn mint_id(&self) -> ItemId {
        let id = ItemId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        id
    }

    /// Adds a parentless item (a top-level page).
    pub fn add_root(&mut self, item: Item) -> ItemId {
        let id = item.id;
        self.items.insert(id, item);
        self.loaded.insert(id);
        self.bump();
        id
    }

    /// Adds `item` as the last child of `parent`.
    pub fn add_child(&mut self, parent: ItemId, item: Item) -> ItemId {
        self.add_related(parent, item, Relationship::Child)
    }

    /// Adds `item` as the last attachment of `parent`.
    pub fn add_attachment(&mut self, parent: ItemId, item: Item) -> ItemId {
        self.add_related(parent, item, Relationship::Attachment)
    }

    fn add_related(&mut self, parent: ItemId, mut item: Item, rel: Relationship) -> ItemId {
        debug_assert!(
            self.items.contains_key(&parent),
            "parent must exist before adding children"
        );
        let id = item.id;
        let list = match rel {
            Relationship::Child => self.children.entry(parent).or_default(),
            Relationship::Attachment => self.attachments.entry(parent).or_default(),
        };
        item.parent = Some(parent);
        item.relationship = rel;
        item.order = match list.last().and_then(|last| self.items.get(last)) {
            Some(last) => OrderKey::after(&last.order),
            None => OrderKey::initial(),
        };
        list.push(id);
        self.items.insert(id, item);
        if rel == Relationship::Child {
            self.loaded.insert(parent);
        }
        self.bump();
        id
    }

    /// Removes an item and its entire subtree.
    pub fn remove_item(&mut self, id: ItemId) {
        if let Some(item) = self.items.remove(&id) {
            if let Some(parent) = item.parent {
                if let Some(list) = self.children.get_mut(&parent) {
                    list.retain(|c| *c != id);
                }
                if let Some(list) = self.attachments.get_mut(&parent) {
                    list.retain(|c| *c != id);
                }
            }
            for child in self
                .children
                .remove(&id)
                .unwrap_or_default()
                .into_iter()
                .chain(self.attachments.remove(&id).unwrap_or_default())
            {
                self.remove_item(child);
            }
            self.loaded.remove(&id);
            self.bump();
        }
    }

    /// Marks whether `id`'s children count as fetched.
    ///
    /// Tests use this to simulate a container whose children have not arrived
    /// from the external loader yet.
    pub fn set_children_loaded(&mut self, id: ItemId, loaded: bool) {
        if loaded {
            self.loaded.insert(id);
        } else {
            self.loaded.remove(&id);
        }
        self.bump();
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn with_item<F: FnOnce(&mut Item)>(&mut self, id: ItemId, f: F) {
        let item = self
            .items
            .get_mut(&id)
            .unwrap_or_else(|| panic!("no item {id}"));
        f(item);
        self.bump();
    }
}

impl ItemStore for MemoryStore {
    fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    fn children(&self, id: ItemId) -> &[ItemId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    fn attachments(&self, id: ItemId) -> &[ItemId] {
        self.attachments.get(&id).map_or(&[], Vec::as_slice)
    }

    fn is_children_loaded(&self, id: ItemId) -> bool {
        self.loaded.contains(&id)
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

impl ItemStoreMut for MemoryStore {
    fn set_position(&mut self, id: ItemId, pos_gr: Point) {
        self.with_item(id, |item| {
            item.set_position_gr(pos_gr);
        });
    }

    fn set_width(&mut self, id: ItemId, width_gr: f64) {
        self.with_item(id, |item| {
            item.set_width_gr(width_gr);
        });
    }

    fn set_title(&mut self, id: ItemId, title: &str) {
        self.with_item(id, |item| {
            item.title = String::from(title);
        });
    }

    fn set_table_height(&mut self, id: ItemId, height_gr: f64) {
        self.with_item(id, |item| match &mut item.kind {
            ItemKind::Table(t) => t.height_gr = height_gr.max(crate::item::MIN_TABLE_HEIGHT_GR),
            _ => panic!("item {id} is not a table"),
        });
    }

    fn set_table_column_width(&mut self, id: ItemId, col: usize, width_bl: f64) {
        self.with_item(id, |item| match &mut item.kind {
            ItemKind::Table(t) => {
                let slot = t
                    .column_widths_bl
                    .get_mut(col)
                    .unwrap_or_else(|| panic!("table {id} has no column {col}"));
                *slot = width_bl.max(1.0);
            }
            _ => panic!("item {id} is not a table"),
        });
    }

    fn set_page_popup(&mut self, id: ItemId, pos_gr: Point, width_gr: f64) {
        self.with_item(id, |item| match &mut item.kind {
            ItemKind::Page(p) => {
                p.popup_pos_gr = pos_gr;
                p.popup_width_gr = width_gr.max(arbor_geometry::GRID_SIZE);
            }
            _ => panic!("item {id} is not a page"),
        });
    }

    fn set_page_list_pane_width(&mut self, id: ItemId, width_bl: f64) {
        self.with_item(id, |item| match &mut item.kind {
            ItemKind::Page(p) => p.list_pane_width_bl = width_bl.max(2.0),
            _ => panic!("item {id} is not a page"),
        });
    }

    fn set_page_selected_row(&mut self, id: ItemId, selected: Option<ItemId>) {
        self.with_item(id, |item| match &mut item.kind {
            ItemKind::Page(p) => p.selected_list_item = selected,
            _ => panic!("item {id} is not a page"),
        });
    }

    fn move_item(
        &mut self,
        id: ItemId,
        new_parent: ItemId,
        relationship: Relationship,
        order: OrderKey,
    ) {
        let old_parent = self
            .items
            .get(&id)
            .unwrap_or_else(|| panic!("no item {id}"))
            .parent;
        if let Some(old) = old_parent {
            if let Some(list) = self.children.get_mut(&old) {
                list.retain(|c| *c != id);
            }
            if let Some(list) = self.attachments.get_mut(&old) {
                list.retain(|c| *c != id);
            }
        }
        self.with_item(id, |item| {
            item.parent = Some(new_parent);
            item.relationship = relationship;
            item.order = order;
        });
        match relationship {
            Relationship::Child => self.children.entry(new_parent).or_default().push(id),
            Relationship::Attachment => self.attachments.entry(new_parent).or_default().push(id),
        }
        self.sort_children(new_parent);
    }

    fn sort_children(&mut self, id: ItemId) {
        for map in [&mut self.children, &mut self.attachments] {
            if let Some(list) = map.get_mut(&id) {
                list.sort_by(|a, b| {
                    let ka = self.items.get(a).map(|i| &i.order);
                    let kb = self.items.get(b).map(|i| &i.order);
                    ka.cmp(&kb)
                });
            }
        }
        self.bump();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PageItem;

    fn page_with_children(store: &mut MemoryStore, n: usize) -> ItemId {
        let page = store.add_root(Item::page(store.mint_id(), PageItem::default()));
        for i in 0..n {
            let note = Item::note(store.mint_id(), Point::new(i as f64 * 60.0, 0.0), 120.0);
            store.add_child(page, note);
        }
        page
    }

    #[test]
    fn ids_mint_inline_while_adding() {
        let mut store = MemoryStore::new();
        let page = store.add_root(Item::page(store.mint_id(), PageItem::default()));
        let note = store.add_child(page, Item::note(store.mint_id(), Point::ZERO, 120.0));
        assert_ne!(page, note);
        assert_eq!(store.children(page), &[note]);
    }

    #[test]
    fn children_are_sorted_by_order_key() {
        let mut store = MemoryStore::new();
        let page = page_with_children(&mut store, 3);
        let ids: Vec<ItemId> = store.children(page).to_vec();
        let mut keys: Vec<OrderKey> = ids
            .iter()
            .map(|id| store.get(*id).unwrap().order.clone())
            .collect();
        let sorted = keys.clone();
        keys.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn move_item_reparents_and_resorts() {
        let mut store = MemoryStore::new();
        let page_a = page_with_children(&mut store, 2);
        let page_b = page_with_children(&mut store, 1);
        let moved = store.children(page_a)[0];

        let first_b = store.children(page_b)[0];
        let order = OrderKey::before(&store.get(first_b).unwrap().order);
        store.move_item(moved, page_b, Relationship::Child, order);

        assert_eq!(store.children(page_a).len(), 1);
        assert_eq!(store.children(page_b), &[moved, first_b]);
        assert_eq!(store.get(moved).unwrap().parent, Some(page_b));
    }

    #[test]
    fn revision_bumps_on_every_mutation() {
        let mut store = MemoryStore::new();
        let page = page_with_children(&mut store, 1);
        let note = store.children(page)[0];
        let r0 = store.revision();
        store.set_position(note, Point::new(120.0, 120.0));
        assert!(store.revision() > r0);
        let r1 = store.revision();
        store.set_title(note, "edited");
        assert!(store.revision() > r1);
    }

    #[test]
    fn remove_item_drops_subtree() {
        let mut store = MemoryStore::new();
        let page = store.add_root(Item::page(ItemId(100), PageItem::default()));
        let table = store.add_child(page, Item::table(ItemId(101), Point::ZERO, 240.0, 240.0));
        let row = store.add_child(table, Item::note(ItemId(102), Point::ZERO, 60.0));
        store.remove_item(table);
        assert!(store.get(table).is_none());
        assert!(store.get(row).is_none());
        assert!(store.children(page).is_empty());
    }

    #[test]
    fn unloaded_container_reports_no_children() {
        let mut store = MemoryStore::new();
        let page = page_with_children(&mut store, 2);
        assert!(store.is_children_loaded(page));
        store.set_children_loaded(page, false);
        assert!(!store.is_children_loaded(page));
        // Children stay resident; the flag only drives load requests.
        assert_eq!(store.children(page).len(), 2);
    }
}
