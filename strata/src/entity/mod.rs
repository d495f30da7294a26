//! Entity identifiers and the registry that hands them out.
//!
//! An entity is nothing more than an identifier: it is defined entirely by which stores
//! currently hold a component for it. This module provides the identifier type and the
//! [`Registry`] that allocates and recycles identifiers.
//!
//! # Identifiers
//!
//! - **[`Entity`]**: a dense [`Id`] paired with a [`Generation`]. The id is the slot index
//!   stores use for direct addressing; the generation counts how many times the slot has
//!   been recycled.
//!
//! - **[`Registry`]**: allocates fresh ids, reuses recycled ones, and bumps the generation
//!   of a slot when it is recycled so that stale handles never alias a live entity.
//!
//! # Recycling
//!
//! The registry does not track component membership. Callers recycle an entity only
//! after every store has dropped it (see [`World::despawn`](crate::world::World::despawn)
//! for the destroy-everywhere helper):
//!
//! ```rust
//! use strata::entity::Registry;
//!
//! let registry = Registry::new();
//! let entity = registry.create();
//! assert!(registry.recycle(entity));
//!
//! let reused = registry.create();
//! assert_eq!(reused.id(), entity.id());
//! assert_ne!(reused, entity);
//! assert!(!registry.is_live(entity));
//! ```

use std::sync::{
    PoisonError, RwLock,
    atomic::{AtomicU32, Ordering},
};

use crossbeam::queue::SegQueue;
use log::warn;

/// The generation of an entity slot. Starts at `FIRST` and is bumped every time the slot is
/// recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    /// The first generation of an entity slot.
    pub const FIRST: Self = Self(0);

    /// Get the generation following this one.
    #[inline]
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A dense entity slot identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Get the raw identifier value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Id {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// An opaque entity handle.
///
/// Two simultaneously live entities never share an `(id, generation)` pair. Stores key their
/// slots by [`Entity::index`] and compare the full handle, so a stale handle reads as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    id: Id,
    generation: Generation,
}

impl Entity {
    /// Construct an entity in the first generation of the given slot.
    #[inline]
    pub(crate) fn new(id: impl Into<Id>) -> Self {
        Self::new_with_generation(id.into(), Generation::FIRST)
    }

    #[inline]
    pub(crate) const fn new_with_generation(id: Id, generation: Generation) -> Self {
        Self { id, generation }
    }

    /// Get the slot id of this entity.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the generation of this entity.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Get the index of this entity in indexable storage (e.g. a `Vec` or bit set).
    #[inline]
    pub fn index(&self) -> usize {
        self.id.0 as usize
    }
}

impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Entities order by id first, then by generation.
impl Ord for Entity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.generation.cmp(&other.generation))
    }
}

const CHUNK_SIZE: usize = 4096;

/// Growable table of per-slot generations. Chunks are never moved once allocated, so
/// readers only need the outer lock long enough to find their chunk.
#[derive(Default, Debug)]
struct Generations {
    chunks: RwLock<Vec<Box<[AtomicU32; CHUNK_SIZE]>>>,
}

impl Generations {
    const fn new() -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
        }
    }

    #[inline]
    fn locate(id: Id) -> (usize, usize) {
        let index = id.0 as usize;
        (index / CHUNK_SIZE, index % CHUNK_SIZE)
    }

    fn get(&self, id: Id) -> Generation {
        let (chunk, slot) = Self::locate(id);
        let chunks = self.chunks.read().unwrap_or_else(PoisonError::into_inner);
        Generation(
            chunks
                .get(chunk)
                .map_or(0, |chunk| chunk[slot].load(Ordering::Acquire)),
        )
    }

    fn bump(&self, id: Id) {
        self.ensure_capacity(id);
        let (chunk, slot) = Self::locate(id);
        let chunks = self.chunks.read().unwrap_or_else(PoisonError::into_inner);
        chunks[chunk][slot].fetch_add(1, Ordering::Release);
    }

    fn ensure_capacity(&self, id: Id) {
        let (chunk, _) = Self::locate(id);
        let len = self.chunks.read().unwrap_or_else(PoisonError::into_inner).len();
        if chunk >= len {
            let mut chunks = self.chunks.write().unwrap_or_else(PoisonError::into_inner);
            while chunks.len() <= chunk {
                chunks.push(Box::new(std::array::from_fn(|_| AtomicU32::new(0))));
            }
        }
    }
}

/// Allocates and reclaims entity identifiers.
///
/// All operations take `&self`, so callers can mint entities while holding borrows of the
/// stores a [`World`](crate::world::World) exposes. Recycled ids are handed out again (in
/// recycle order) before any fresh id is minted, keeping the id space dense for the
/// direct-indexed stores.
#[derive(Default, Debug)]
pub struct Registry {
    generations: Generations,

    /// Ids available for reuse. Their generation has already been bumped.
    dead_pool: SegQueue<Id>,

    /// Next fresh id.
    next_id: AtomicU32,
}

impl Registry {
    /// Construct an empty registry starting from id 0.
    #[inline]
    pub const fn new() -> Self {
        Self {
            generations: Generations::new(),
            dead_pool: SegQueue::new(),
            next_id: AtomicU32::new(0),
        }
    }

    /// Create a new entity, reusing a recycled id when one is available.
    pub fn create(&self) -> Entity {
        if let Some(id) = self.dead_pool.pop() {
            return Entity::new_with_generation(id, self.generations.get(id));
        }

        let id = Id(self.mint(1));
        self.generations.ensure_capacity(id);
        Entity::new(id)
    }

    /// Create `count` entities at once. Recycled ids are drained first.
    pub fn create_many(&self, count: usize) -> Vec<Entity> {
        let mut created = Vec::with_capacity(count);
        while created.len() < count
            && let Some(id) = self.dead_pool.pop()
        {
            created.push(Entity::new_with_generation(id, self.generations.get(id)));
        }

        let remaining = u32::try_from(count - created.len())
            .unwrap_or_else(|_| panic!("cannot create {count} entities: id space exhausted"));
        if remaining > 0 {
            let start = self.mint(remaining);
            let end = start + remaining;
            self.generations.ensure_capacity(Id(end - 1));
            created.extend((start..end).map(|id| Entity::new(Id(id))));
        }

        created
    }

    /// Reserve `count` fresh ids, returning the first.
    ///
    /// # Panics
    ///
    /// Panics if the ids would run past `u32::MAX`.
    fn mint(&self, count: u32) -> u32 {
        self.next_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                next.checked_add(count)
            })
            .unwrap_or_else(|next| {
                panic!("cannot create {count} entities past id {next}: id space exhausted")
            })
    }

    /// Make the id of `entity` available for reuse.
    ///
    /// The caller guarantees that no store still holds a component for `entity`. Returns
    /// `false` (and does nothing) when `entity` is not live, e.g. when it was already
    /// recycled.
    pub fn recycle(&self, entity: Entity) -> bool {
        if !self.is_live(entity) {
            warn!("ignoring recycle of entity {entity:?}: handle is not live");
            return false;
        }
        self.generations.bump(entity.id);
        self.dead_pool.push(entity.id);
        true
    }

    /// Check whether `entity` was handed out by this registry and has not been recycled.
    ///
    /// A pooled id already carries its bumped generation, which no handle has been issued
    /// for yet, so a generation match is enough.
    pub fn is_live(&self, entity: Entity) -> bool {
        entity.id.0 < self.next_id.load(Ordering::Relaxed)
            && self.generations.get(entity.id) == entity.generation
    }

    /// Number of entities currently live.
    pub fn live_count(&self) -> usize {
        self.next_id.load(Ordering::Relaxed) as usize - self.dead_pool.len()
    }
}
