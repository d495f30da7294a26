//! The World: one configured store per component type, plus the entity registry.
//!
//! A `World` is a lookup table built once at startup. Each component type is wired to an
//! instance of its [`Component::Storage`] through a [`WorldBuilder`]; after
//! [`build`](WorldBuilder::build) the wiring never changes. Stores are handed out as
//! [`Shared`] handles, so the same store can be used directly and as a composite child.
//!
//! # Example
//!
//! ```rust
//! use strata::Component;
//! use strata::slice;
//! use strata::store::{CacheStore, MapStore, Store};
//! use strata::world::World;
//!
//! #[derive(Component, Clone, Debug, PartialEq)]
//! struct Position(f32, f32);
//!
//! #[derive(Component, Clone, Debug, PartialEq)]
//! #[component(storage = CacheStore<MapStore<Self>, 16>)]
//! struct Velocity(f32, f32);
//!
//! let world = World::builder()
//!     .with_default::<Position>()
//!     .with::<Velocity>(CacheStore::new(MapStore::new()))
//!     .build()
//!     .expect("valid wiring");
//!
//! let e = world.spawn();
//! world.store::<Position>().clone().write(e, Position(0.0, 0.0));
//! world.store::<Velocity>().clone().write(e, Velocity(1.0, 2.0));
//!
//! let mut moving = world.composite::<(Position, Velocity)>();
//! let domain = slice::owners(&moving);
//! slice::map_strict(&domain, &mut moving, |(p, v)| (Position(p.0 + v.0, p.1 + v.1), v));
//!
//! assert_eq!(world.store::<Position>().read(e), Some(Position(1.0, 2.0)));
//! ```
mod error;

use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
};

use log::{debug, error};

use crate::{
    component::{Component, ComponentSet},
    entity::{Entity, Registry},
    store::{Composite, Shared, Store},
};

pub use error::WorldError;

/// Type-erased access to a configured store.
trait AnyStore {
    /// Name of the component type the store holds.
    fn component(&self) -> &'static str;

    /// Destroy `entity` in the store.
    fn destroy(&self, entity: Entity);

    /// Number of entities in the store.
    fn len(&self) -> usize;

    fn as_any(&self) -> &dyn Any;
}

/// A configured store and the component it was registered for.
struct Entry<S> {
    component: &'static str,
    store: Shared<S>,
}

impl<S: Store + 'static> AnyStore for Entry<S> {
    fn component(&self) -> &'static str {
        self.component
    }

    fn destroy(&self, entity: Entity) {
        self.store.borrow_mut().destroy(entity);
    }

    fn len(&self) -> usize {
        self.store.borrow().len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Collects the store wiring for a [`World`].
#[derive(Default)]
pub struct WorldBuilder {
    registry: Option<Registry>,
    entries: HashMap<TypeId, Box<dyn AnyStore>>,
    order: Vec<TypeId>,
    required: Vec<(TypeId, &'static str)>,
    duplicates: Vec<&'static str>,
}

impl WorldBuilder {
    /// Wire `C` to `store`.
    pub fn with<C: Component>(mut self, store: C::Storage) -> Self {
        let id = TypeId::of::<C>();
        let component = type_name::<C>();
        if self.entries.contains_key(&id) {
            self.duplicates.push(component);
            return self;
        }

        self.entries.insert(
            id,
            Box::new(Entry {
                component,
                store: Shared::new(store),
            }),
        );
        self.order.push(id);
        self
    }

    /// Wire `C` to a default-constructed store.
    pub fn with_default<C: Component>(self) -> Self
    where
        C::Storage: Default,
    {
        self.with::<C>(C::Storage::default())
    }

    /// Fail the build unless `C` is wired.
    pub fn require<C: Component>(mut self) -> Self {
        self.required.push((TypeId::of::<C>(), type_name::<C>()));
        self
    }

    /// Use `registry` instead of a fresh one.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Check the wiring and build the world.
    pub fn build(self) -> Result<World, WorldError> {
        if let Some(&component) = self.duplicates.first() {
            return Err(WorldError::Duplicate(component));
        }

        let missing: Vec<&'static str> = self
            .required
            .iter()
            .filter(|(id, _)| !self.entries.contains_key(id))
            .map(|(_, name)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(WorldError::Missing(missing));
        }

        debug!("world built with {} component stores", self.entries.len());
        Ok(World {
            registry: self.registry.unwrap_or_default(),
            entries: self.entries,
            order: self.order,
        })
    }
}

/// A fixed table from component type to its configured store, plus the entity registry.
pub struct World {
    registry: Registry,
    entries: HashMap<TypeId, Box<dyn AnyStore>>,
    /// Registration order, so despawn visits stores deterministically.
    order: Vec<TypeId>,
}

impl World {
    /// Start wiring a world.
    pub fn builder() -> WorldBuilder {
        WorldBuilder::default()
    }

    /// The entity registry.
    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Create a new entity.
    #[inline]
    pub fn spawn(&self) -> Entity {
        self.registry.create()
    }

    /// Destroy `entity` in every configured store, then recycle it.
    ///
    /// Returns `false` if `entity` was not live. Its components are destroyed either way,
    /// which is a no-op for stale handles.
    pub fn despawn(&self, entity: Entity) -> bool {
        for id in &self.order {
            if let Some(entry) = self.entries.get(id) {
                entry.destroy(entity);
            }
        }
        debug!("despawned {entity:?} from {} stores", self.order.len());
        self.registry.recycle(entity)
    }

    /// Check if `C` has a configured store.
    pub fn has<C: Component>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<C>())
    }

    /// The configured store for `C`.
    pub fn try_store<C: Component>(&self) -> Result<&Shared<C::Storage>, WorldError> {
        self.entries
            .get(&TypeId::of::<C>())
            .and_then(|entry| entry.as_any().downcast_ref::<Entry<C::Storage>>())
            .map(|entry| &entry.store)
            .ok_or(WorldError::Unconfigured(type_name::<C>()))
    }

    /// The configured store for `C`.
    ///
    /// # Panics
    ///
    /// Panics if `C` was never wired into this world.
    #[track_caller]
    pub fn store<C: Component>(&self) -> &Shared<C::Storage> {
        match self.try_store::<C>() {
            Ok(store) => store,
            Err(err) => {
                error!("{err}");
                panic!("{err}");
            }
        }
    }

    /// A composite over the configured stores of every component in `S`.
    ///
    /// # Panics
    ///
    /// Panics if any component of `S` was never wired into this world.
    #[track_caller]
    pub fn composite<S: ComponentSet>(&self) -> Composite<S::Stores> {
        match self.try_composite::<S>() {
            Ok(composite) => composite,
            Err(err) => {
                error!("{err}");
                panic!("{err}");
            }
        }
    }

    /// A composite over the configured stores of every component in `S`.
    pub fn try_composite<S: ComponentSet>(&self) -> Result<Composite<S::Stores>, WorldError> {
        S::fetch(self).map(Composite::new)
    }

    /// Number of configured stores.
    pub fn store_count(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stores = f.debug_map();
        for id in &self.order {
            if let Some(entry) = self.entries.get(id) {
                stores.entry(&entry.component(), &entry.len());
            }
        }
        stores.finish()
    }
}
