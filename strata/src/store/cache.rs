//! A fixed-size, direct-mapped write cache in front of any store.
//!
//! [`CacheStore`] keeps up to `N` recently written values in a slot array and forwards
//! everything else to its backing store. Slot assignment is fixed (`entity.index() % N`), so
//! admission and eviction are O(1) with no recency bookkeeping.
//!
//! # Coherence
//!
//! A resident slot is the authoritative value for its entity; the backing store may hold an
//! older value for it until the slot is evicted or [flushed](CacheStore::flush). Evicting a
//! dirty slot always writes it back first, so no value is ever dropped silently.
//!
//! # Miss policy
//!
//! Reads never populate the cache. A miss is answered straight from the backing store and
//! leaves residency untouched, so a cold scan over many entities cannot evict the hot ones.
//! Only writes admit entities.
//!
//! ```rust
//! use strata::entity::Registry;
//! use strata::store::{CacheStore, MapStore, Store};
//!
//! let registry = Registry::new();
//! let (a, b, c) = (registry.create(), registry.create(), registry.create());
//!
//! let mut cache = CacheStore::<_, 2>::new(MapStore::new());
//! cache.write(a, 1);
//! cache.write(b, 2);
//! cache.write(c, 3); // `c` maps to `a`'s slot and evicts it to the backing store
//!
//! assert_eq!(cache.read(a), Some(1));
//! assert_eq!(cache.read(b), Some(2));
//! assert_eq!(cache.read(c), Some(3));
//! assert_eq!(cache.stats().evictions, 1);
//! ```

use std::cell::Cell;

use log::{trace, warn};

use crate::{
    entity::{Entity, Id},
    slice::Slice,
    store::Store,
};

/// A resident cache entry.
#[derive(Debug, Clone)]
struct Slot<T> {
    entity: Entity,
    value: T,
    /// The backing store does not hold `value` yet.
    dirty: bool,
}

/// Counters describing how a [`CacheStore`] has been used.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads and writes answered by a resident slot.
    pub hits: u64,
    /// Reads and writes that found no resident slot for the entity.
    pub misses: u64,
    /// Resident entries displaced by a write for another entity.
    pub evictions: u64,
    /// Dirty entries written back to the backing store.
    pub writebacks: u64,
}

impl CacheStats {
    /// Fraction of accesses answered by the cache, or `0.0` before any access.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Wraps a backing store `B` with an `N`-slot direct-mapped write cache.
///
/// `B` is typically owned, but may be `&mut S` to attach the cache to a store for a scope.
/// Either way the backing store must only be reached through the cache while it is attached;
/// [`into_inner`](CacheStore::into_inner) flushes and detaches it.
pub struct CacheStore<B: Store, const N: usize> {
    backing: B,
    slots: Box<[Option<Slot<B::Item>>]>,
    resident: usize,

    hits: Cell<u64>,
    misses: Cell<u64>,
    evictions: u64,
    writebacks: u64,
}

impl<B: Store, const N: usize> CacheStore<B, N> {
    /// Attach a cache to `backing`. The cache starts empty.
    pub fn new(backing: B) -> Self {
        const { assert!(N > 0, "a cache store needs at least one slot") };
        Self {
            backing,
            slots: (0..N).map(|_| None).collect(),
            resident: 0,
            hits: Cell::new(0),
            misses: Cell::new(0),
            evictions: 0,
            writebacks: 0,
        }
    }

    /// The slot `entity` maps to.
    #[inline]
    fn slot_of(entity: Entity) -> usize {
        entity.index() % N
    }

    #[inline]
    fn resident_slot(&self, entity: Entity) -> Option<&Slot<B::Item>> {
        self.slots[Self::slot_of(entity)]
            .as_ref()
            .filter(|slot| slot.entity == entity)
    }

    /// Number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots.
    #[inline]
    pub fn resident_len(&self) -> usize {
        self.resident
    }

    /// Check if `entity` currently occupies a slot.
    #[inline]
    pub fn is_resident(&self, entity: Entity) -> bool {
        self.resident_slot(entity).is_some()
    }

    /// Read access to the backing store. Values of resident dirty entities may be stale here.
    #[inline]
    pub fn backing(&self) -> &B {
        &self.backing
    }

    /// Usage counters since construction or the last [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            evictions: self.evictions,
            writebacks: self.writebacks,
        }
    }

    /// Zero the usage counters.
    pub fn reset_stats(&mut self) {
        self.hits.set(0);
        self.misses.set(0);
        self.evictions = 0;
        self.writebacks = 0;
    }

    /// Write every dirty slot back to the backing store. Slots stay resident, now clean.
    pub fn flush(&mut self) {
        let mut written = 0;
        for slot in self.slots.iter_mut().flatten().filter(|slot| slot.dirty) {
            self.backing.write(slot.entity, slot.value.clone());
            slot.dirty = false;
            written += 1;
        }
        self.writebacks += written;
        trace!("cache flush wrote back {written} of {} resident entries", self.resident);
    }

    /// Flush and detach, returning the backing store.
    pub fn into_inner(mut self) -> B {
        self.flush();
        self.backing
    }

    #[inline]
    fn count(counter: &Cell<u64>) {
        counter.set(counter.get() + 1);
    }
}

impl<B: Store, const N: usize> Store for CacheStore<B, N> {
    type Item = B::Item;

    fn write(&mut self, entity: Entity, value: Self::Item) {
        let index = Self::slot_of(entity);

        // An older generation of this id may be resident, or already evicted to the backing
        // store. Either way the newer handle replaces it; a stale handle is ignored.
        let resident = self.slots[index]
            .as_ref()
            .map(|slot| slot.entity)
            .filter(|holder| holder.id() == entity.id());
        let holder = resident.or_else(|| self.backing.occupant(entity.id()));
        if let Some(holder) = holder
            && holder != entity
        {
            if holder.generation() > entity.generation() {
                warn!("ignoring write through stale handle {entity:?}: slot is held by {holder:?}");
                return;
            }
            trace!("cache slot {index}: {entity:?} supersedes {holder:?}");
            self.backing.destroy(holder);
        }

        let incoming = Slot {
            entity,
            value,
            dirty: true,
        };
        match self.slots[index].replace(incoming) {
            Some(previous) if previous.entity == entity => Self::count(&self.hits),
            Some(superseded) if superseded.entity.id() == entity.id() => {
                // Discarded above, never written back.
                Self::count(&self.misses);
            }
            Some(victim) => {
                Self::count(&self.misses);
                self.evictions += 1;
                if victim.dirty {
                    trace!("cache slot {index}: evicting {:?} to backing store", victim.entity);
                    self.backing.write(victim.entity, victim.value);
                    self.writebacks += 1;
                }
            }
            None => {
                Self::count(&self.misses);
                self.resident += 1;
            }
        }
    }

    fn read(&self, entity: Entity) -> Option<Self::Item> {
        if let Some(slot) = self.resident_slot(entity) {
            Self::count(&self.hits);
            return Some(slot.value.clone());
        }
        Self::count(&self.misses);
        self.backing.read(entity)
    }

    fn destroy(&mut self, entity: Entity) {
        let index = Self::slot_of(entity);
        if self.slots[index]
            .as_ref()
            .is_some_and(|slot| slot.entity == entity)
        {
            self.slots[index] = None;
            self.resident -= 1;
        }
        // An older value may have been evicted into the backing store.
        self.backing.destroy(entity);
    }

    fn owners(&self) -> Slice {
        let mut owners: Vec<Entity> = self
            .backing
            .owners()
            .into_iter()
            .filter(|entity| !self.is_resident(*entity))
            .collect();
        owners.extend(self.slots.iter().flatten().map(|slot| slot.entity));
        Slice::from(owners)
    }

    fn len(&self) -> usize {
        let resident_only = self
            .slots
            .iter()
            .flatten()
            .filter(|slot| !self.backing.contains(slot.entity))
            .count();
        self.backing.len() + resident_only
    }

    fn occupant(&self, id: Id) -> Option<Entity> {
        let slot = self.slots[id.value() as usize % N].as_ref();
        match slot.filter(|slot| slot.entity.id() == id) {
            Some(slot) => Some(slot.entity),
            None => self.backing.occupant(id),
        }
    }

    #[inline]
    fn contains(&self, entity: Entity) -> bool {
        self.is_resident(entity) || self.backing.contains(entity)
    }
}
