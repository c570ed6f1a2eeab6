//! Id-keyed entity storage with deterministic iteration order.

use std::collections::BTreeMap;

use crate::ArenaId;

/// Map of live entities keyed by identifier.
///
/// Identifiers are allocated from a monotonically increasing counter and are
/// never reused within a session, so a stale id held by a projectile or aura
/// can only ever miss. Iteration follows identifier order, which keeps every
/// system that walks an arena deterministic.
#[derive(Clone, Debug)]
pub struct Arena<K, V> {
    entries: BTreeMap<K, V>,
    next_id: u32,
}

impl<K: ArenaId, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<K: ArenaId, V> Arena<K, V> {
    /// Creates an empty arena with a reset identifier counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh identifier and stores the value built for it.
    pub fn allocate(&mut self, build: impl FnOnce(K) -> V) -> K {
        let id = K::from_raw(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let _ = self.entries.insert(id, build(id));
        id
    }

    /// Replaces the value stored under an existing identifier.
    ///
    /// Returns `false` without inserting when the identifier is not live.
    pub fn replace(&mut self, id: K, value: V) -> bool {
        match self.entries.get_mut(&id) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Removes the entity, returning it when it was live.
    pub fn remove(&mut self, id: K) -> Option<V> {
        self.entries.remove(&id)
    }

    /// Looks up a live entity.
    #[must_use]
    pub fn get(&self, id: K) -> Option<&V> {
        self.entries.get(&id)
    }

    /// Looks up a live entity for mutation.
    pub fn get_mut(&mut self, id: K) -> Option<&mut V> {
        self.entries.get_mut(&id)
    }

    /// Reports whether the identifier refers to a live entity.
    #[must_use]
    pub fn contains(&self, id: K) -> bool {
        self.entries.contains_key(&id)
    }

    /// Iterates over live entities in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    /// Iterates over live entity values in identifier order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.values()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the arena holds no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
