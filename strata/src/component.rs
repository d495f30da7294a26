//! Component types and the storage each one is configured with.

use crate::{
    all_tuples,
    store::{Children, Shared, Store},
    world::{World, WorldError},
};

/// A piece of data attached to entities.
///
/// The storage backend is part of the type: `Storage` names the concrete store every
/// [`World`] keeps for this component, so lookups resolve at compile time.
///
/// Usually derived:
///
/// ```rust
/// use strata::Component;
/// use strata::store::{CacheStore, MapStore, SetStore};
///
/// #[derive(Component, Clone, Debug)]
/// struct Health(u32);
///
/// #[derive(Component, Clone, Default)]
/// #[component(storage = SetStore<Self>)]
/// struct Enemy;
///
/// #[derive(Component, Clone)]
/// #[component(storage = CacheStore<MapStore<Self>, 64>)]
/// struct Score(u64);
/// ```
pub trait Component: Clone + 'static {
    /// The store holding this component's values.
    type Storage: Store<Item = Self> + 'static;
}

/// A tuple of components looked up together as one [`Composite`](crate::store::Composite).
pub trait ComponentSet: 'static {
    /// Shared handles to the configured store of each component, in tuple order.
    type Stores: Children;

    /// Fetch the configured stores from `world`.
    fn fetch(world: &World) -> Result<Self::Stores, WorldError>;
}

macro_rules! tuple_component_set {
    ($($name:ident $var:ident),*) => {
        impl<$($name: Component),*> ComponentSet for ($($name,)*) {
            type Stores = ($(Shared<$name::Storage>,)*);

            fn fetch(world: &World) -> Result<Self::Stores, WorldError> {
                $(let $var = world.try_store::<$name>()?.clone();)*
                Ok(($($var,)*))
            }
        }
    }
}

all_tuples!(tuple_component_set);
