// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fractional ordering keys.

use smallvec::SmallVec;

/// A fractional ordering key: an arbitrary-precision byte string compared
/// lexicographically.
///
/// Sibling order is determined by comparing keys, never by insertion order.
/// [`OrderKey::between`] always produces a key strictly between its bounds,
/// so an item can be inserted at any position without renumbering siblings.
///
/// ```rust
/// use arbor_items::OrderKey;
///
/// let a = OrderKey::initial();
/// let b = OrderKey::between(Some(&a), None);
/// let mid = OrderKey::between(Some(&a), Some(&b));
/// assert!(a < mid && mid < b);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderKey(SmallVec<[u8; 8]>);

impl OrderKey {
    /// The key for the first element of an empty sibling list.
    #[must_use]
    pub fn initial() -> Self {
        Self(SmallVec::from_slice(&[0x80]))
    }

    /// A key strictly after `prev`.
    #[must_use]
    pub fn after(prev: &Self) -> Self {
        Self::between(Some(prev), None)
    }

    /// A key strictly before `next`.
    #[must_use]
    pub fn before(next: &Self) -> Self {
        Self::between(None, Some(next))
    }

    /// A key strictly between `lo` and `hi`.
    ///
    /// `None` bounds mean the open start/end of the key space. Requires
    /// `lo < hi` where both are present (debug-asserted).
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "values stay below 0x100")]
    pub fn between(lo: Option<&Self>, hi: Option<&Self>) -> Self {
        if let (Some(l), Some(h)) = (lo, hi) {
            debug_assert!(l < h, "order key bounds must satisfy lo < hi");
        }
        let lo = lo.map(|k| k.0.as_slice()).unwrap_or(&[]);
        let hi_bytes = hi.map(|k| k.0.as_slice()).unwrap_or(&[]);

        let mut out: SmallVec<[u8; 8]> = SmallVec::new();
        // While `bounded`, `out` equals a prefix of `hi` and the next byte is
        // constrained by it; once a byte strictly below `hi` is emitted, any
        // suffix keeps the key below `hi`.
        let mut bounded = hi.is_some();
        let mut i = 0;
        loop {
            let l = u16::from(lo.get(i).copied().unwrap_or(0));
            let h = if bounded {
                // `lo < hi` with a shared prefix implies `hi` has a byte here.
                u16::from(hi_bytes[i])
            } else {
                0x100
            };
            if h - l > 1 {
                out.push(((l + h) / 2) as u8);
                return Self(out);
            }
            out.push(l as u8);
            if h == l + 1 {
                bounded = false;
            }
            i += 1;
        }
    }

    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn initial_is_midpoint() {
        assert_eq!(OrderKey::initial().as_bytes(), &[0x80]);
    }

    #[test]
    fn after_is_strictly_greater() {
        let mut k = OrderKey::initial();
        for _ in 0..50 {
            let next = OrderKey::after(&k);
            assert!(next > k);
            k = next;
        }
    }

    #[test]
    fn before_is_strictly_smaller() {
        let mut k = OrderKey::initial();
        for _ in 0..50 {
            let prev = OrderKey::before(&k);
            assert!(prev < k);
            k = prev;
        }
    }

    #[test]
    fn between_stays_inside_bounds_under_repeated_splitting() {
        let lo = OrderKey::initial();
        let hi = OrderKey::after(&lo);
        let mut a = lo.clone();
        let mut b = hi.clone();
        // Repeated bisection between ever-closer bounds.
        for _ in 0..64 {
            let mid = OrderKey::between(Some(&a), Some(&b));
            assert!(a < mid && mid < b);
            if mid.as_bytes().len() % 2 == 0 {
                a = mid;
            } else {
                b = mid;
            }
        }
    }

    #[test]
    fn between_adjacent_byte_values() {
        let a = OrderKey(SmallVec::from_slice(&[0x80]));
        let b = OrderKey(SmallVec::from_slice(&[0x81]));
        let mid = OrderKey::between(Some(&a), Some(&b));
        assert!(a < mid && mid < b);
    }

    #[test]
    fn keys_sort_lexicographically() {
        let mut keys = Vec::new();
        let mut k = OrderKey::initial();
        for _ in 0..10 {
            keys.push(k.clone());
            k = OrderKey::after(&k);
        }
        let mut shuffled = keys.clone();
        shuffled.reverse();
        shuffled.sort();
        assert_eq!(shuffled, keys);
    }
}
