use blake3::Hash;

use crate::geometry::{Position, Span};
use crate::item::GridItem;
use crate::layout::GridEngine;

/// blake3 digest over every item's `(x, y, w, h)` in slot order.
pub fn layout_fingerprint<T>(items: &[GridItem<T>]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(items.len() as u64).to_le_bytes());
    for item in items {
        for value in [item.x, item.y, item.w, item.h] {
            hasher.update(&(value as u64).to_le_bytes());
        }
    }
    hasher.finalize()
}

/// Geometry of every slot at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSnapshot {
    geometry: Vec<(Position, Span)>,
    hash: Hash,
}

impl LayoutSnapshot {
    pub fn capture<T>(items: &[GridItem<T>]) -> Self {
        Self {
            geometry: items
                .iter()
                .map(|item| (item.position(), item.span()))
                .collect(),
            hash: layout_fingerprint(items),
        }
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn len(&self) -> usize {
        self.geometry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
    }

    pub fn geometry(&self, slot: usize) -> Option<(Position, Span)> {
        self.geometry.get(slot).copied()
    }

    /// Slots of `items` whose geometry differs from the captured one. Slots
    /// the snapshot never saw count as changed.
    pub fn changed_slots<T>(&self, items: &[GridItem<T>]) -> Vec<usize> {
        if items.len() == self.geometry.len() && layout_fingerprint(items) == self.hash {
            return Vec::new();
        }
        items
            .iter()
            .enumerate()
            .filter(|(slot, item)| {
                self.geometry(*slot) != Some((item.position(), item.span()))
            })
            .map(|(slot, _)| slot)
            .collect()
    }
}

impl<T> GridEngine<T> {
    pub fn fingerprint(&self) -> Hash {
        layout_fingerprint(self.items())
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot::capture(self.items())
    }

    /// Slots whose position or size changed since `snapshot` was taken.
    pub fn changed_since(&self, snapshot: &LayoutSnapshot) -> Vec<usize> {
        snapshot.changed_slots(self.items())
    }

    /// Items whose geometry differs from their counterpart in `initial`.
    ///
    /// Counterparts are matched through `key_of`; items with no counterpart
    /// are skipped.
    pub fn changed_items<K, F>(&self, initial: &[GridItem<T>], key_of: F) -> Vec<&GridItem<T>>
    where
        K: PartialEq,
        F: Fn(&T) -> K,
    {
        self.items()
            .iter()
            .filter(|item| {
                let key = key_of(&item.data);
                initial
                    .iter()
                    .find(|candidate| key_of(&candidate.data) == key)
                    .is_some_and(|before| item.geometry_differs(before))
            })
            .collect()
    }
}
