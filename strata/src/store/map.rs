//! Dense sparse-set storage, the default backend for data-carrying components.

use log::warn;

use crate::{
    entity::{Entity, Id},
    slice::Slice,
    store::{
        Store,
        index::{BlockIndex, Row},
    },
};

/// A sparse-set store: a block-sparse index maps each entity slot to a dense row, and two packed
/// vecs hold the owning entity and the value for every row.
///
/// ```text
/// index:    [ 0 → r1 ][ 1 → ·  ][ 2 → r0 ][ 3 → r2 ]
/// entities: [ e2, e0, e3 ]
/// values:   [ v2, v0, v3 ]
/// ```
///
/// Writes, reads and destroys are O(1). Destroy swap-removes the row, so iteration over
/// [`owners`](Store::owners) and [`iter`](MapStore::iter) walks tightly packed memory, in an
/// order that changes when entries are destroyed.
#[derive(Debug)]
pub struct MapStore<T> {
    index: BlockIndex,
    entities: Vec<Entity>,
    values: Vec<T>,
}

impl<T> MapStore<T> {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self::new_with_block_size(BlockIndex::DEFAULT_BLOCK_SIZE)
    }

    /// Create an empty store whose sparse index allocates `block_size` slots at a time.
    pub const fn new_with_block_size(block_size: usize) -> Self {
        Self {
            index: BlockIndex::new_with_block_size(block_size),
            entities: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Row of `entity`, provided the slot is held by this exact handle.
    #[inline]
    fn row(&self, entity: Entity) -> Option<Row> {
        let row = self.index.get(entity)?;
        (self.entities[row.index()] == entity).then_some(row)
    }

    /// Get a reference to the value of `entity`.
    #[inline]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.row(entity).map(|row| &self.values[row.index()])
    }

    /// Get a mutable reference to the value of `entity`.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.row(entity).map(|row| &mut self.values[row.index()])
    }

    /// Remove and return the value of `entity`.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let row = self.row(entity)?;
        self.index.remove(entity);

        let last = self.entities.len() - 1;
        if row.index() != last {
            let moved = self.entities[last];
            self.index.insert(moved, row);
        }
        self.entities.swap_remove(row.index());
        Some(self.values.swap_remove(row.index()))
    }

    /// Iterate over `(entity, value)` pairs in dense order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.values.iter())
    }

    /// Iterate over `(entity, value)` pairs in dense order, with mutable values.
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (Entity, &mut T)> {
        self.entities.iter().copied().zip(self.values.iter_mut())
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.index.clear();
        self.entities.clear();
        self.values.clear();
    }
}

impl<T> Default for MapStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Store for MapStore<T> {
    type Item = T;

    fn write(&mut self, entity: Entity, value: T) {
        // The slot may be held by this handle, by another generation of the same id, or free.
        if let Some(row) = self.index.get(entity) {
            let holder = self.entities[row.index()];
            if holder.generation() > entity.generation() {
                warn!("ignoring write through stale handle {entity:?}: slot is held by {holder:?}");
                return;
            }
            self.entities[row.index()] = entity;
            self.values[row.index()] = value;
            return;
        }

        let row = Row::new(self.entities.len());
        self.index.insert(entity, row);
        self.entities.push(entity);
        self.values.push(value);
    }

    #[inline]
    fn read(&self, entity: Entity) -> Option<T> {
        self.get(entity).cloned()
    }

    #[inline]
    fn destroy(&mut self, entity: Entity) {
        self.remove(entity);
    }

    fn owners(&self) -> Slice {
        Slice::from(self.entities.clone())
    }

    #[inline]
    fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    fn occupant(&self, id: Id) -> Option<Entity> {
        let row = self.index.get(Entity::new(id))?;
        Some(self.entities[row.index()])
    }

    #[inline]
    fn contains(&self, entity: Entity) -> bool {
        self.row(entity).is_some()
    }
}
