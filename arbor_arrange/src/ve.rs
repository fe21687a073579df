// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visual elements: positioned, bounded tree nodes mirroring items.

use alloc::vec::Vec;

use arbor_geometry::Hitbox;
use arbor_items::ItemId;
use kurbo::{Point, Rect};
use smallvec::SmallVec;

bitflags::bitflags! {
    /// Structural context of a visual element.
    ///
    /// These affect both rendering and hit/move semantics and are inherited
    /// down the subtree where noted.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct VeFlags: u16 {
        /// Inside the popup overlay of a page (inherited).
        const POPUP                   = 0b0000_0000_0001;
        /// A table row or a cell inside a table row (inherited).
        const INSIDE_TABLE            = 0b0000_0000_0010;
        /// A member of a composite (inherited).
        const INSIDE_COMPOSITE        = 0b0000_0000_0100;
        /// Inside a composite or the dock (inherited).
        const INSIDE_COMPOSITE_OR_DOCK = 0b0000_0000_1000;
        /// Root of a nested interactive surface (expanded child page,
        /// popup content, dock).
        const EMBEDDED_INTERACTIVE_ROOT = 0b0000_0001_0000;
        /// Rendered large enough for full detail and interaction.
        const DETAILED                = 0b0000_0010_0000;
        /// The dock strip (inherited).
        const DOCK                    = 0b0000_0100_0000;
        /// A compact row of a list page.
        const LIST_PAGE_ROW           = 0b0000_1000_0000;
        /// Too small (or unresolved) to interact with: carries no hitboxes
        /// and no children.
        const PLACEHOLDER             = 0b0001_0000_0000;
    }
}

/// How a path segment attaches to its parent element.
///
/// Distinct kinds keep paths unique when the same item appears twice under
/// one parent (as a list row and as the expanded detail, or as a page child
/// and as the popup).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SegKind {
    /// Ordinary child or attachment.
    Child,
    /// The popup overlay of a page.
    Popup,
    /// The dock strip.
    Dock,
    /// The expanded detail pane of a list page.
    Detail,
}

/// One step of a visual-element path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathSeg {
    /// The item shown at this step (the link target for linked items).
    pub item: ItemId,
    /// The link traversed to reach `item`, if any.
    pub link: Option<ItemId>,
    /// How this step attaches to its parent.
    pub kind: SegKind,
}

/// Stable identity of a visual element's position in the tree.
///
/// Composed from the chain of ancestor item/link ids; unique within one
/// arrangement pass and stable across re-arrangements that do not change
/// document structure, so caching and selection tracking survive incidental
/// re-layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VePath {
    segs: SmallVec<[PathSeg; 4]>,
}

impl VePath {
    /// The path of a top-level page.
    #[must_use]
    pub fn root(item: ItemId) -> Self {
        Self {
            segs: smallvec::smallvec![PathSeg {
                item,
                link: None,
                kind: SegKind::Child,
            }],
        }
    }

    /// Extends the path by one segment.
    #[must_use]
    pub fn push(&self, seg: PathSeg) -> Self {
        let mut segs = self.segs.clone();
        segs.push(seg);
        Self { segs }
    }

    /// Extends by an ordinary child step.
    #[must_use]
    pub fn child(&self, item: ItemId, link: Option<ItemId>) -> Self {
        self.push(PathSeg {
            item,
            link,
            kind: SegKind::Child,
        })
    }

    /// The parent path, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segs.len() <= 1 {
            return None;
        }
        let mut segs = self.segs.clone();
        segs.pop();
        Some(Self { segs })
    }

    /// The final segment.
    #[must_use]
    pub fn last(&self) -> PathSeg {
        *self.segs.last().expect("paths are never empty")
    }

    /// The item shown at the end of the path.
    #[must_use]
    pub fn item(&self) -> ItemId {
        self.last().item
    }

    /// Number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segs.len()
    }

    /// Whether `self` equals or descends from `other`.
    #[must_use]
    pub fn starts_with(&self, other: &Self) -> bool {
        self.segs.len() >= other.segs.len() && self.segs[..other.segs.len()] == other.segs[..]
    }
}

impl core::fmt::Display for VePath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, seg) in self.segs.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            match seg.kind {
                SegKind::Child => {}
                SegKind::Popup => write!(f, "popup:")?,
                SegKind::Dock => write!(f, "dock:")?,
                SegKind::Detail => write!(f, "detail:")?,
            }
            write!(f, "{}", seg.item)?;
            if let Some(link) = seg.link {
                write!(f, "[{link}]")?;
            }
        }
        Ok(())
    }
}

/// A transient, positioned node mirroring an item (or link-resolved item)
/// within one arranged tree.
///
/// ## Coordinate spaces
///
/// - `bounds` is relative to the parent's child area (for `Child`/`Detail`
///   segments) or to the parent's own top-left (for overlay segments).
/// - `child_area` and `hitboxes` are relative to this element's own
///   top-left. A container's child area may be taller than its bounds when
///   its content scrolls.
///
/// Visual elements are created fresh on every arrangement pass and never
/// mutated independently of re-arrangement; tree navigation goes through
/// paths resolved in the cache, so there are no object cycles.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualElement {
    /// Identity of this tree position.
    pub path: VePath,
    /// The concrete, non-link item being shown (for an unresolved link, the
    /// link itself, flagged [`VeFlags::PLACEHOLDER`]).
    pub display_item: ItemId,
    /// The link traversed to reach `display_item`, if any.
    pub link_item: Option<ItemId>,
    /// Structural context flags.
    pub flags: VeFlags,
    /// Position and size in pixels; see the coordinate-space notes above.
    pub bounds: Rect,
    /// Sub-rectangle children are laid out within (containers only).
    pub child_area: Option<Rect>,
    /// Interaction hitboxes, ordered background to foreground.
    pub hitboxes: Vec<Hitbox>,
    /// Child elements in sibling (z) order: later is topmost.
    pub children: Vec<VePath>,
    /// Attachment elements.
    pub attachments: Vec<VePath>,
    /// Overlay elements (popup, dock); only on a top-level page.
    pub overlays: Vec<VePath>,
    /// Parent path, resolved through the cache.
    pub parent: Option<VePath>,
}

impl VisualElement {
    /// Creates a bare element with no children or hitboxes.
    #[must_use]
    pub fn new(path: VePath, display_item: ItemId, bounds: Rect) -> Self {
        Self {
            parent: path.parent(),
            path,
            display_item,
            link_item: None,
            flags: VeFlags::empty(),
            bounds,
            child_area: None,
            hitboxes: Vec::new(),
            children: Vec::new(),
            attachments: Vec::new(),
            overlays: Vec::new(),
        }
    }

    /// The child area in this element's own space, defaulting to the full
    /// bounds for elements without an explicit one.
    #[must_use]
    pub fn child_area_or_bounds(&self) -> Rect {
        self.child_area
            .unwrap_or_else(|| Rect::from_origin_size(Point::ZERO, self.bounds.size()))
    }

    /// Whether this element is a non-interactive placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.flags.contains(VeFlags::PLACEHOLDER)
    }
}
