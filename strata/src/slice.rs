//! Entity slices and the bulk operations driven by them.
//!
//! A [`Slice`] is an ordered list of entities produced by a query: the owners of a store, or
//! the intersection of several stores' owners. Bulk operations walk a slice in order and
//! come in two access modes:
//!
//! - **Strict** (`*_strict`): every entity in the slice must be present in the target store.
//!   A missing entity means the slice was computed against the wrong domain, and the
//!   operation panics naming the entity and the caller's location.
//! - **Safe** (`*_safe`, `for_each_partial`): never panic. Absent values are passed as
//!   `None` and the callback decides what to do.
//!
//! Writes made by a bulk operation are visible to the rest of the same traversal.
//!
//! ```rust
//! use strata::entity::Registry;
//! use strata::slice;
//! use strata::store::{MapStore, Store};
//!
//! let registry = Registry::new();
//! let mut health = MapStore::new();
//! let mut armor = MapStore::new();
//! for i in 0..4 {
//!     let e = registry.create();
//!     health.write(e, 100);
//!     if i % 2 == 0 {
//!         armor.write(e, 5);
//!     }
//! }
//!
//! // Every armored entity has health, so the strict mode holds.
//! let armored = slice::intersect(&[&health, &armor]);
//! slice::map_strict(&armored, &mut health, |hp| hp + 50);
//!
//! // Not every entity with health has armor.
//! let everyone = slice::owners(&health);
//! slice::for_each_safe(&everyone, &armor, |_, value| assert!(value.is_none() || value == Some(5)));
//! ```

use std::ops::Deref;

use crate::{
    entity::Entity,
    store::{Children, Composite, Domain, Store},
};

/// An owned, ordered sequence of entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slice(Vec<Entity>);

impl Slice {
    /// Create an empty slice.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of entities in the slice.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the slice holds no entities.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The same entities in ascending order.
    pub fn sorted(mut self) -> Self {
        self.0.sort_unstable();
        self
    }

    /// Unwrap into the underlying vec, keeping the order.
    pub fn into_vec(self) -> Vec<Entity> {
        self.0
    }
}

impl Deref for Slice {
    type Target = [Entity];

    #[inline]
    fn deref(&self) -> &[Entity] {
        &self.0
    }
}

impl AsRef<[Entity]> for Slice {
    #[inline]
    fn as_ref(&self) -> &[Entity] {
        &self.0
    }
}

impl From<Vec<Entity>> for Slice {
    #[inline]
    fn from(entities: Vec<Entity>) -> Self {
        Self(entities)
    }
}

impl FromIterator<Entity> for Slice {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Slice {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Slice {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Every entity holding a value in `store`.
#[inline]
pub fn owners<S: Store + ?Sized>(store: &S) -> Slice {
    store.owners()
}

/// Entities present in every domain, in the order of the smallest one.
///
/// Only the smallest domain is enumerated; the others are probed per entity, so the cost
/// follows the rarest component rather than the most common one. No domains yield an empty
/// slice.
pub fn intersect(domains: &[&dyn Domain]) -> Slice {
    let Some((shortest, _)) = domains
        .iter()
        .enumerate()
        .min_by_key(|(_, domain)| domain.size())
    else {
        return Slice::new();
    };

    domains[shortest]
        .members()
        .into_iter()
        .filter(|entity| {
            domains
                .iter()
                .enumerate()
                .all(|(i, domain)| i == shortest || domain.has(*entity))
        })
        .collect()
}

/// Keep the entities of `slice` that are in `domain`, preserving order.
pub fn filter(slice: &Slice, domain: &dyn Domain) -> Slice {
    slice.iter().copied().filter(|e| domain.has(*e)).collect()
}

#[cold]
#[track_caller]
fn domain_violation(entity: Entity) -> ! {
    panic!("strict slice access: {entity:?} has no value in the target store")
}

/// Replace the value of every entity in `slice` with `f(value)`.
///
/// # Panics
///
/// Panics if an entity of `slice` has no value in `store`. Entities before it have already
/// been updated.
#[track_caller]
pub fn map_strict<S, F>(slice: &Slice, store: &mut S, mut f: F)
where
    S: Store + ?Sized,
    F: FnMut(S::Item) -> S::Item,
{
    for &entity in slice {
        let Some(value) = store.read(entity) else {
            domain_violation(entity);
        };
        store.write(entity, f(value));
    }
}

/// Visit the value of every entity in `slice`.
///
/// # Panics
///
/// Panics if an entity of `slice` has no value in `store`.
#[track_caller]
pub fn for_each_strict<S, F>(slice: &Slice, store: &S, mut f: F)
where
    S: Store + ?Sized,
    F: FnMut(Entity, S::Item),
{
    for &entity in slice {
        let Some(value) = store.read(entity) else {
            domain_violation(entity);
        };
        f(entity, value);
    }
}

/// Read the value of every entity in `slice`, in slice order.
///
/// # Panics
///
/// Panics if an entity of `slice` has no value in `store`.
#[track_caller]
pub fn read_strict<S: Store + ?Sized>(slice: &Slice, store: &S) -> Vec<S::Item> {
    let mut values = Vec::with_capacity(slice.len());
    for &entity in slice {
        let Some(value) = store.read(entity) else {
            domain_violation(entity);
        };
        values.push(value);
    }
    values
}

/// Call `f(entity, value)` for every entity in `slice`, with `None` where `store` holds no
/// value. Returning `Some(new)` writes `new` back; returning `None` leaves the entity as it
/// was.
pub fn map_safe<S, F>(slice: &Slice, store: &mut S, mut f: F)
where
    S: Store + ?Sized,
    F: FnMut(Entity, Option<S::Item>) -> Option<S::Item>,
{
    for &entity in slice {
        if let Some(value) = f(entity, store.read(entity)) {
            store.write(entity, value);
        }
    }
}

/// Visit every entity in `slice` with its value in `store`, if any.
pub fn for_each_safe<S, F>(slice: &Slice, store: &S, mut f: F)
where
    S: Store + ?Sized,
    F: FnMut(Entity, Option<S::Item>),
{
    for &entity in slice {
        f(entity, store.read(entity));
    }
}

/// Read every entity in `slice`, `None` where `store` holds no value.
pub fn read_safe<S: Store + ?Sized>(slice: &Slice, store: &S) -> Vec<Option<S::Item>> {
    slice.iter().map(|&entity| store.read(entity)).collect()
}

/// Visit every entity in `slice` with the per-child values of `composite`.
pub fn for_each_partial<C, F>(slice: &Slice, composite: &Composite<C>, mut f: F)
where
    C: Children,
    F: FnMut(Entity, C::Partial),
{
    for &entity in slice {
        f(entity, composite.read_partial(entity));
    }
}

/// Write `f(entity)` to `store` for every entity in `slice`.
pub fn write_each<S, F>(slice: &Slice, store: &mut S, mut f: F)
where
    S: Store + ?Sized,
    F: FnMut(Entity) -> S::Item,
{
    for &entity in slice {
        store.write(entity, f(entity));
    }
}

/// Destroy the value of every entity in `slice`.
pub fn destroy_each<S: Store + ?Sized>(slice: &Slice, store: &mut S) {
    for &entity in slice {
        store.destroy(entity);
    }
}
