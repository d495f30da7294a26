//! Strata: composable component storage for entity-component systems.
//!
//! Entities are plain identifiers handed out by an [`entity::Registry`]. Each component type
//! lives in its own [`store::Store`], and stores stack: a [`store::CacheStore`] or a
//! [`store::SpatialIndexStore`] wraps a base store and still looks like one, and a
//! [`store::Composite`] makes a tuple of stores act as a single store. The [`slice`]
//! module drives bulk reads and writes over entity sets, and a [`World`] wires every
//! component type to its store once at startup.
//!
//! ```rust
//! use strata::{Component, World, slice};
//! use strata::store::{SetStore, Store};
//!
//! #[derive(Component, Clone, Debug, PartialEq)]
//! struct Health(u32);
//!
//! #[derive(Component, Clone, Default)]
//! #[component(storage = SetStore<Self>)]
//! struct Poisoned;
//!
//! let world = World::builder()
//!     .with_default::<Health>()
//!     .with_default::<Poisoned>()
//!     .build()
//!     .expect("valid wiring");
//!
//! let (a, b) = (world.spawn(), world.spawn());
//! let mut health = world.store::<Health>().clone();
//! health.write(a, Health(10));
//! health.write(b, Health(10));
//! world.store::<Poisoned>().clone().write(b, Poisoned);
//!
//! let sick = slice::intersect(&[world.store::<Health>(), world.store::<Poisoned>()]);
//! slice::map_strict(&sick, &mut health, |Health(hp)| Health(hp - 3));
//!
//! assert_eq!(health.read(a), Some(Health(10)));
//! assert_eq!(health.read(b), Some(Health(7)));
//! ```

// Lets derive output name `::strata` from inside this crate too.
extern crate self as strata;

pub mod component;
pub mod entity;
pub mod slice;
pub mod store;
pub(crate) mod util;
pub mod world;

pub use component::Component;
pub use entity::Entity;
pub use slice::Slice;
pub use store::Store;
pub use world::World;

pub use strata_macros::Component;
