//! Several stores presented as one store over a tuple of their items.

use crate::{
    all_tuples,
    entity::Entity,
    slice::{self, Slice},
    store::{Domain, Store},
};

/// A tuple of child stores that a [`Composite`] drives together.
///
/// Implemented for tuples of 1 to 8 stores. Children are visited in tuple order.
pub trait Children {
    /// The tuple of child items.
    type Items: Clone;

    /// The tuple of per-child optional items.
    type Partial;

    /// Write one item to each child.
    fn write_all(&mut self, entity: Entity, items: Self::Items);

    /// Read every child, or `None` if any child lacks `entity`.
    fn read_all(&self, entity: Entity) -> Option<Self::Items>;

    /// Read every child independently.
    fn read_each(&self, entity: Entity) -> Self::Partial;

    /// Destroy `entity` in every child.
    fn destroy_all(&mut self, entity: Entity);

    /// The entity domain of each child, in tuple order.
    fn domains(&self) -> Vec<&dyn Domain>;
}

macro_rules! tuple_children {
    ($($name:ident $var:ident),*) => {
        impl<$($name: Store),*> Children for ($($name,)*) {
            type Items = ($($name::Item,)*);
            type Partial = ($(Option<$name::Item>,)*);

            fn write_all(&mut self, entity: Entity, items: Self::Items) {
                #[allow(non_snake_case)]
                let ($($name,)*) = self;
                let ($($var,)*) = items;
                $($name.write(entity, $var);)*
            }

            fn read_all(&self, entity: Entity) -> Option<Self::Items> {
                #[allow(non_snake_case)]
                let ($($name,)*) = self;
                Some(($($name.read(entity)?,)*))
            }

            fn read_each(&self, entity: Entity) -> Self::Partial {
                #[allow(non_snake_case)]
                let ($($name,)*) = self;
                ($($name.read(entity),)*)
            }

            fn destroy_all(&mut self, entity: Entity) {
                #[allow(non_snake_case)]
                let ($($name,)*) = self;
                $($name.destroy(entity);)*
            }

            fn domains(&self) -> Vec<&dyn Domain> {
                #[allow(non_snake_case)]
                let ($($name,)*) = self;
                vec![$($name as &dyn Domain),*]
            }
        }
    }
}

all_tuples!(tuple_children);

/// A store over a tuple of child stores, so that a tuple of components behaves as one.
///
/// - [`write`](Store::write) writes every child, in tuple order.
/// - [`read`](Store::read) is all-or-nothing: `Some` only when every child holds the entity.
///   [`read_partial`](Composite::read_partial) reports each child separately instead.
/// - [`destroy`](Store::destroy) destroys the entity in every child.
/// - [`owners`](Store::owners) is the intersection of the children's owners, computed by
///   walking the smallest child and probing the others.
///
/// Children are usually [`Shared`](crate::store::Shared) handles, so the same stores stay
/// reachable on their own.
///
/// ```rust
/// use strata::entity::Registry;
/// use strata::store::{Composite, MapStore, Store};
///
/// let registry = Registry::new();
/// let (a, b) = (registry.create(), registry.create());
///
/// let mut pair = Composite::new((MapStore::<u32>::new(), MapStore::<&str>::new()));
/// pair.write(a, (1, "one"));
/// pair.children_mut().0.write(b, 2);
///
/// assert_eq!(pair.read(a), Some((1, "one")));
/// assert_eq!(pair.read(b), None);
/// assert_eq!(pair.read_partial(b), (Some(2), None));
/// assert_eq!(pair.owners().as_ref(), &[a]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Composite<C> {
    children: C,
}

impl<C: Children> Composite<C> {
    /// Wrap a tuple of one to eight child stores.
    pub fn new(children: C) -> Self {
        Self { children }
    }

    /// Read each child independently. Never fails, absent children are `None`.
    #[inline]
    pub fn read_partial(&self, entity: Entity) -> C::Partial {
        self.children.read_each(entity)
    }

    /// The wrapped child stores.
    #[inline]
    pub fn children(&self) -> &C {
        &self.children
    }

    /// Mutable access to the child stores. Writes made here bypass the all-or-nothing write.
    #[inline]
    pub fn children_mut(&mut self) -> &mut C {
        &mut self.children
    }

    /// Unwrap the composite, returning its child stores.
    pub fn into_children(self) -> C {
        self.children
    }
}

impl<C: Children> Store for Composite<C> {
    type Item = C::Items;

    #[inline]
    fn write(&mut self, entity: Entity, value: Self::Item) {
        self.children.write_all(entity, value)
    }

    #[inline]
    fn read(&self, entity: Entity) -> Option<Self::Item> {
        self.children.read_all(entity)
    }

    #[inline]
    fn destroy(&mut self, entity: Entity) {
        self.children.destroy_all(entity)
    }

    fn owners(&self) -> Slice {
        slice::intersect(&self.children.domains())
    }

    /// Size of the owner intersection. Computes the intersection.
    fn len(&self) -> usize {
        self.owners().len()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.children
            .domains()
            .iter()
            .all(|domain| domain.has(entity))
    }
}
