//! Presence-only storage for tag components.

use std::marker::PhantomData;

use fixedbitset::FixedBitSet;
use log::warn;

use crate::{
    entity::{Entity, Generation, Id},
    slice::Slice,
    store::Store,
};

/// A store for marker components that carry no data.
///
/// Membership is one bit per entity slot, plus the generation of the handle that set it so
/// stale handles read as absent. [`read`](Store::read) reports presence by returning
/// `T::default()`.
///
/// `T` must be a unit marker such as `struct Enemy;`. The written value is discarded, so a
/// data-carrying `T` would read back as `T::default()` rather than what was written; use a
/// [`MapStore`](crate::store::MapStore) for those.
#[derive(Debug)]
pub struct SetStore<T> {
    members: FixedBitSet,
    generations: Vec<Generation>,
    len: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SetStore<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            members: FixedBitSet::new(),
            generations: Vec::new(),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Create an empty set with room for slot ids below `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: FixedBitSet::with_capacity(capacity),
            generations: vec![Generation::FIRST; capacity],
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Add `entity` to the set, replacing an older generation of its id. A handle older than
    /// the current member of its slot is ignored.
    pub fn insert(&mut self, entity: Entity) {
        let index = entity.index();
        if index >= self.members.len() {
            self.members.grow(index + 1);
            self.generations.resize(index + 1, Generation::FIRST);
        }
        if self.members.contains(index) && self.generations[index] > entity.generation() {
            warn!("ignoring insert through stale handle {entity:?}");
            return;
        }
        if !self.members.put(index) {
            self.len += 1;
        }
        self.generations[index] = entity.generation();
    }

    /// Check membership of this exact handle.
    #[inline]
    pub fn has(&self, entity: Entity) -> bool {
        let index = entity.index();
        self.members.contains(index) && self.generations[index] == entity.generation()
    }

    /// Remove `entity` from the set. Returns `true` if it was a member.
    pub fn remove(&mut self, entity: Entity) -> bool {
        if !self.has(entity) {
            return false;
        }
        self.members.set(entity.index(), false);
        self.len -= 1;
        true
    }

    /// Iterate over members in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.members.ones().map(|index| {
            Entity::new_with_generation(Id::from(index as u32), self.generations[index])
        })
    }
}

impl<T> Default for SetStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Default> Store for SetStore<T> {
    type Item = T;

    #[inline]
    fn write(&mut self, entity: Entity, _value: T) {
        self.insert(entity);
    }

    #[inline]
    fn read(&self, entity: Entity) -> Option<T> {
        self.has(entity).then(T::default)
    }

    #[inline]
    fn destroy(&mut self, entity: Entity) {
        self.remove(entity);
    }

    fn owners(&self) -> Slice {
        self.iter().collect()
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn occupant(&self, id: Id) -> Option<Entity> {
        let index = id.value() as usize;
        self.members
            .contains(index)
            .then(|| Entity::new_with_generation(id, self.generations[index]))
    }

    #[inline]
    fn contains(&self, entity: Entity) -> bool {
        self.has(entity)
    }
}
