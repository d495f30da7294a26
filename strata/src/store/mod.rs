//! Component stores: the storage backends that map entities to component values.
//!
//! Every backend implements the [`Store`] contract. Base stores hold the data; wrapper stores
//! layer behavior over another store while presenting the same contract, so callers never
//! need to know how a component is stored.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Callers: World lookups, slice engine, game logic            │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ Store contract
//!          ┌─────────────────────┼───────────────────────┐
//! ┌────────▼────────┐  ┌─────────▼─────────┐  ┌──────────▼─────────┐
//! │  Composite      │  │  CacheStore       │  │  SpatialIndexStore │
//! │  - k children   │  │  - N direct-mapped│  │  - cell → entities │
//! │  - all-or-none  │  │    front slots    │  │    hash grid       │
//! └────────┬────────┘  └─────────┬─────────┘  └──────────┬─────────┘
//!          │                     │ backing               │ backing
//! ┌────────▼─────────────────────▼───────────────────────▼─────────┐
//! │  Base stores: MapStore (sparse set), SetStore (bit set)        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Ownership
//!
//! Wrappers take their backing store by value. Because `&mut S` is itself a [`Store`], a
//! wrapper can also borrow a backing store for a scope, during which the borrow checker rules
//! out any access that bypasses the wrapper. When a store must be reachable from several
//! places at once (a World entry that is also a composite child), wrap it in [`Shared`].

pub mod cache;
pub mod composite;
pub(crate) mod index;
pub mod map;
pub mod set;
pub mod spatial;

use std::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    rc::Rc,
};

use crate::{
    entity::{Entity, Id},
    slice::Slice,
};

pub use cache::{CacheStats, CacheStore};
pub use composite::{Children, Composite};
pub use map::MapStore;
pub use set::SetStore;
pub use spatial::{Cell, Spatial, SpatialIndexStore};

/// The storage contract every backend implements.
///
/// A store owns the mapping from [`Entity`] to an optional [`Store::Item`]. After
/// `write(e, v)`, `read(e)` yields `Some(v)` until the next `write` or `destroy` of `e`.
/// Absence is a normal outcome, never an error.
///
/// A store holds at most one handle per entity slot. Writing through a newer generation of a
/// slot's id replaces the older handle and its value; writing through an older generation
/// than the one holding the slot is ignored.
pub trait Store {
    /// The component value held per entity.
    type Item: Clone;

    /// Attach `value` to `entity`, replacing any existing value.
    fn write(&mut self, entity: Entity, value: Self::Item);

    /// Read the value attached to `entity`, if any.
    fn read(&self, entity: Entity) -> Option<Self::Item>;

    /// Detach the value of `entity`. A no-op when absent.
    fn destroy(&mut self, entity: Entity);

    /// All entities currently holding a value. The order is backend specific but stable
    /// while the store is not mutated.
    fn owners(&self) -> Slice;

    /// Number of entities currently holding a value.
    fn len(&self) -> usize;

    /// The handle holding the slot of `id`, whatever its generation.
    ///
    /// The default scans [`owners`](Store::owners); stores with a direct slot index answer in
    /// O(1).
    fn occupant(&self, id: Id) -> Option<Entity> {
        self.owners().into_iter().find(|entity| entity.id() == id)
    }

    /// Check if `entity` holds a value.
    #[inline]
    fn contains(&self, entity: Entity) -> bool {
        self.read(entity).is_some()
    }

    /// Check if no entity holds a value.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A scoped borrow of a store is a store. Wrappers built over `&mut S` keep exclusive access
/// to `S` for as long as they live.
impl<S: Store + ?Sized> Store for &mut S {
    type Item = S::Item;

    #[inline]
    fn write(&mut self, entity: Entity, value: Self::Item) {
        (**self).write(entity, value)
    }

    #[inline]
    fn read(&self, entity: Entity) -> Option<Self::Item> {
        (**self).read(entity)
    }

    #[inline]
    fn destroy(&mut self, entity: Entity) {
        (**self).destroy(entity)
    }

    #[inline]
    fn owners(&self) -> Slice {
        (**self).owners()
    }

    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn occupant(&self, id: Id) -> Option<Entity> {
        (**self).occupant(id)
    }

    #[inline]
    fn contains(&self, entity: Entity) -> bool {
        (**self).contains(entity)
    }
}

/// An item-free view of a store's entity domain.
///
/// Object safe, so stores of different item types can be intersected together
/// (see [`slice::intersect`](crate::slice::intersect)).
pub trait Domain {
    /// Number of entities in the domain.
    fn size(&self) -> usize;

    /// Check if `entity` is in the domain.
    fn has(&self, entity: Entity) -> bool;

    /// Every entity in the domain.
    fn members(&self) -> Slice;
}

impl<S: Store + ?Sized> Domain for S {
    #[inline]
    fn size(&self) -> usize {
        self.len()
    }

    #[inline]
    fn has(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    #[inline]
    fn members(&self) -> Slice {
        self.owners()
    }
}

/// A single-threaded shared handle to a store.
///
/// Clones point at the same store. Each [`Store`] call borrows the inner store for the
/// duration of the call only; holding a [`Shared::borrow_mut`] guard across another access to
/// the same store panics.
pub struct Shared<S> {
    inner: Rc<RefCell<S>>,
}

impl<S> Shared<S> {
    /// Wrap `store` in a shared handle.
    pub fn new(store: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(store)),
        }
    }

    /// Borrow the inner store.
    ///
    /// # Panics
    ///
    /// Panics if the store is currently mutably borrowed.
    #[inline]
    pub fn borrow(&self) -> Ref<'_, S> {
        self.inner.borrow()
    }

    /// Mutably borrow the inner store.
    ///
    /// # Panics
    ///
    /// Panics if the store is currently borrowed.
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, S> {
        self.inner.borrow_mut()
    }

    /// Check whether two handles point at the same store.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<S> Clone for Shared<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Shared<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.inner).finish()
    }
}

impl<S: Store> Store for Shared<S> {
    type Item = S::Item;

    #[inline]
    fn write(&mut self, entity: Entity, value: Self::Item) {
        self.inner.borrow_mut().write(entity, value)
    }

    #[inline]
    fn read(&self, entity: Entity) -> Option<Self::Item> {
        self.inner.borrow().read(entity)
    }

    #[inline]
    fn destroy(&mut self, entity: Entity) {
        self.inner.borrow_mut().destroy(entity)
    }

    #[inline]
    fn owners(&self) -> Slice {
        self.inner.borrow().owners()
    }

    #[inline]
    fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    #[inline]
    fn occupant(&self, id: Id) -> Option<Entity> {
        self.inner.borrow().occupant(id)
    }

    #[inline]
    fn contains(&self, entity: Entity) -> bool {
        self.inner.borrow().contains(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_handles_see_the_same_store() {
        // Given
        let mut a = Shared::new(MapStore::<u32>::new());
        let b = a.clone();
        let e = Entity::new(3);

        // When
        a.write(e, 7);

        // Then
        assert!(a.ptr_eq(&b));
        assert_eq!(b.read(e), Some(7));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn borrowed_store_is_a_store() {
        // Given
        let mut map = MapStore::<u32>::new();
        let e = Entity::new(0);

        // When
        {
            let mut borrowed = &mut map;
            borrowed.write(e, 1);
            assert!(borrowed.contains(e));
        }

        // Then
        assert_eq!(map.read(e), Some(1));
    }

    #[test]
    fn domains_erase_item_types() {
        // Given
        let mut numbers = MapStore::<u32>::new();
        let mut names = MapStore::<String>::new();
        numbers.write(Entity::new(0), 1);
        names.write(Entity::new(1), "one".to_string());

        // When
        let domains: [&dyn Domain; 2] = [&numbers, &names];

        // Then
        assert!(domains[0].has(Entity::new(0)));
        assert!(!domains[1].has(Entity::new(0)));
        assert_eq!(domains[1].members().as_ref(), &[Entity::new(1)]);
    }

    #[test]
    #[should_panic]
    fn shared_reentrant_mutation_panics() {
        let shared = Shared::new(MapStore::<u32>::new());
        let _guard = shared.borrow_mut();
        let mut other = shared.clone();
        other.write(Entity::new(0), 1);
    }
}
