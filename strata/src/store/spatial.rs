//! A hash-grid index kept alongside a store of positioned values.

use std::collections::HashMap;

use log::warn;

use crate::{entity::Entity, slice::Slice, store::Store};

/// A value with a location on the plane.
pub trait Spatial {
    /// World-space `(x, y)` of the value.
    fn location(&self) -> (f32, f32);
}

impl Spatial for (f32, f32) {
    #[inline]
    fn location(&self) -> (f32, f32) {
        *self
    }
}

impl Spatial for [f32; 2] {
    #[inline]
    fn location(&self) -> (f32, f32) {
        (self[0], self[1])
    }
}

/// A square grid cell. Cell `(x, y)` covers `[x * size, (x + 1) * size)` on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    /// The cell at grid coordinates `(x, y)`.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell containing `location` on a grid of `size`-wide cells.
    #[inline]
    pub fn containing(location: (f32, f32), size: f32) -> Self {
        Self {
            x: (location.0 / size).floor() as i32,
            y: (location.1 / size).floor() as i32,
        }
    }
}

/// Wraps a backing store of [`Spatial`] values and indexes every owner by the grid cell its
/// current value falls in.
///
/// The cell of an entity is always derived from the value held by the backing store, never
/// stored separately, so the index can only drift if the backing store is mutated around the
/// wrapper.
#[derive(Debug)]
pub struct SpatialIndexStore<S: Store>
where
    S::Item: Spatial,
{
    backing: S,
    cell_size: f32,
    grid: HashMap<Cell, Vec<Entity>>,
}

impl<S: Store> SpatialIndexStore<S>
where
    S::Item: Spatial,
{
    /// Cell size used by [`new`](Self::new).
    pub const DEFAULT_CELL_SIZE: f32 = 32.0;

    /// Index `backing` with the default cell size.
    pub fn new(backing: S) -> Self {
        Self::with_cell_size(backing, Self::DEFAULT_CELL_SIZE)
    }

    /// Index `backing` with `cell_size`-wide cells. Values already in `backing` are indexed
    /// immediately.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not a positive finite number.
    pub fn with_cell_size(backing: S, cell_size: f32) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be positive and finite, got {cell_size}"
        );

        let mut grid: HashMap<Cell, Vec<Entity>> = HashMap::new();
        for entity in backing.owners() {
            if let Some(value) = backing.read(entity) {
                let cell = Cell::containing(value.location(), cell_size);
                grid.entry(cell).or_default().push(entity);
            }
        }

        Self {
            backing,
            cell_size,
            grid,
        }
    }

    /// Width of a grid cell in world units.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// The cell `value` would be indexed under.
    #[inline]
    pub fn cell_for(&self, value: &S::Item) -> Cell {
        Cell::containing(value.location(), self.cell_size)
    }

    /// The cell `entity` is currently indexed under.
    pub fn cell_of(&self, entity: Entity) -> Option<Cell> {
        self.backing.read(entity).map(|value| self.cell_for(&value))
    }

    /// Entities whose current value falls in `cell`, in the order they entered it.
    pub fn entities_near(&self, cell: Cell) -> Slice {
        self.grid
            .get(&cell)
            .map(|entities| Slice::from(entities.clone()))
            .unwrap_or_default()
    }

    /// Entities in the square of cells within `radius` of `cell` (Chebyshev distance),
    /// cell by cell in row-major order.
    pub fn entities_around(&self, cell: Cell, radius: u32) -> Slice {
        let span = 2 * u64::from(radius) + 1;
        let mut found = Vec::new();

        if span.saturating_mul(span) > self.grid.len() as u64 {
            // The square has more cells than the grid has occupied ones.
            let reach = i64::from(radius);
            let mut cells: Vec<Cell> = self
                .grid
                .keys()
                .copied()
                .filter(|c| {
                    (i64::from(c.x) - i64::from(cell.x)).abs() <= reach
                        && (i64::from(c.y) - i64::from(cell.y)).abs() <= reach
                })
                .collect();
            cells.sort_unstable_by_key(|c| (c.y, c.x));
            for c in cells {
                if let Some(entities) = self.grid.get(&c) {
                    found.extend_from_slice(entities);
                }
            }
        } else {
            let radius = i32::try_from(radius).unwrap_or(i32::MAX);
            for y in cell.y.saturating_sub(radius)..=cell.y.saturating_add(radius) {
                for x in cell.x.saturating_sub(radius)..=cell.x.saturating_add(radius) {
                    if let Some(entities) = self.grid.get(&Cell::new(x, y)) {
                        found.extend_from_slice(entities);
                    }
                }
            }
        }

        Slice::from(found)
    }

    /// Every cell holding at least one entity, in ascending order.
    pub fn occupied_cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.grid.keys().copied().collect();
        cells.sort_unstable();
        cells
    }

    /// Read access to the backing store.
    #[inline]
    pub fn backing(&self) -> &S {
        &self.backing
    }

    /// Detach the index, returning the backing store.
    pub fn into_inner(self) -> S {
        self.backing
    }

    fn link(&mut self, cell: Cell, entity: Entity) {
        self.grid.entry(cell).or_default().push(entity);
    }

    fn unlink(&mut self, cell: Cell, entity: Entity) {
        if let Some(entities) = self.grid.get_mut(&cell) {
            if let Some(position) = entities.iter().position(|e| *e == entity) {
                entities.swap_remove(position);
            }
            if entities.is_empty() {
                self.grid.remove(&cell);
            }
        }
    }
}

impl<S: Store> Store for SpatialIndexStore<S>
where
    S::Item: Spatial,
{
    type Item = S::Item;

    fn write(&mut self, entity: Entity, value: Self::Item) {
        // A newer generation of the id takes the slot over, grid entry included.
        if let Some(holder) = self.backing.occupant(entity.id())
            && holder != entity
        {
            if holder.generation() > entity.generation() {
                warn!("ignoring write through stale handle {entity:?}: slot is held by {holder:?}");
                return;
            }
            self.destroy(holder);
        }

        let cell = self.cell_for(&value);
        match self.cell_of(entity) {
            Some(previous) if previous == cell => {}
            Some(previous) => {
                self.unlink(previous, entity);
                self.link(cell, entity);
            }
            None => self.link(cell, entity),
        }
        self.backing.write(entity, value);
    }

    #[inline]
    fn read(&self, entity: Entity) -> Option<Self::Item> {
        self.backing.read(entity)
    }

    fn destroy(&mut self, entity: Entity) {
        if let Some(cell) = self.cell_of(entity) {
            self.unlink(cell, entity);
            self.backing.destroy(entity);
        }
    }

    #[inline]
    fn owners(&self) -> Slice {
        self.backing.owners()
    }

    #[inline]
    fn len(&self) -> usize {
        self.backing.len()
    }

    #[inline]
    fn contains(&self, entity: Entity) -> bool {
        self.backing.contains(entity)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{
        entity::{Generation, Id},
        store::{CacheStore, MapStore},
    };

    fn entity(id: u32) -> Entity {
        Entity::new(id)
    }

    fn index() -> SpatialIndexStore<MapStore<(f32, f32)>> {
        SpatialIndexStore::with_cell_size(MapStore::new(), 10.0)
    }

    #[test]
    fn cell_floors_negative_coordinates() {
        assert_eq!(Cell::containing((0.0, 9.99), 10.0), Cell::new(0, 0));
        assert_eq!(Cell::containing((10.0, -0.5), 10.0), Cell::new(1, -1));
        assert_eq!(Cell::containing((-10.0, -10.01), 10.0), Cell::new(-1, -2));
    }

    #[test]
    fn spatial_write_indexes_by_cell() {
        // Given
        let mut grid = index();

        // When
        grid.write(entity(0), (1.0, 1.0));
        grid.write(entity(1), (9.0, 2.0));
        grid.write(entity(2), (15.0, 1.0));

        // Then
        assert_eq!(
            grid.entities_near(Cell::new(0, 0)).as_ref(),
            &[entity(0), entity(1)]
        );
        assert_eq!(grid.entities_near(Cell::new(1, 0)).as_ref(), &[entity(2)]);
        assert!(grid.entities_near(Cell::new(5, 5)).is_empty());
        assert_eq!(grid.cell_of(entity(2)), Some(Cell::new(1, 0)));
        assert_eq!(grid.read(entity(1)), Some((9.0, 2.0)));
    }

    #[test]
    fn spatial_move_between_cells() {
        // Given
        let mut grid = index();
        grid.write(entity(0), (1.0, 1.0));

        // When
        grid.write(entity(0), (25.0, 1.0));

        // Then
        assert!(grid.entities_near(Cell::new(0, 0)).is_empty());
        assert_eq!(grid.entities_near(Cell::new(2, 0)).as_ref(), &[entity(0)]);
        assert_eq!(grid.occupied_cells(), vec![Cell::new(2, 0)]);
    }

    #[test]
    fn spatial_move_within_cell_keeps_entry() {
        // Given
        let mut grid = index();
        grid.write(entity(0), (1.0, 1.0));

        // When
        grid.write(entity(0), (2.0, 3.0));

        // Then
        assert_eq!(grid.entities_near(Cell::new(0, 0)).as_ref(), &[entity(0)]);
        assert_eq!(grid.read(entity(0)), Some((2.0, 3.0)));
    }

    #[test]
    fn spatial_destroy_unlinks() {
        // Given
        let mut grid = index();
        grid.write(entity(0), (1.0, 1.0));
        grid.write(entity(1), (2.0, 1.0));

        // When
        grid.destroy(entity(0));
        grid.destroy(entity(0));

        // Then
        assert_eq!(grid.read(entity(0)), None);
        assert_eq!(grid.entities_near(Cell::new(0, 0)).as_ref(), &[entity(1)]);
        assert_eq!(grid.len(), 1);

        // When
        grid.destroy(entity(1));

        // Then - empty cells are dropped
        assert!(grid.occupied_cells().is_empty());
    }

    #[test]
    fn spatial_entities_around() {
        // Given
        let mut grid = index();
        grid.write(entity(0), (5.0, 5.0)); // (0, 0)
        grid.write(entity(1), (-5.0, 5.0)); // (-1, 0)
        grid.write(entity(2), (15.0, 15.0)); // (1, 1)
        grid.write(entity(3), (25.0, 5.0)); // (2, 0)

        // When
        let mut around = grid.entities_around(Cell::new(0, 0), 1).into_vec();
        around.sort();

        // Then
        assert_eq!(around, vec![entity(0), entity(1), entity(2)]);
        assert_eq!(grid.entities_around(Cell::new(0, 0), 0).as_ref(), &[entity(0)]);
    }

    #[test]
    fn spatial_entities_around_huge_radius() {
        // Given
        let mut grid = index();
        grid.write(entity(0), (5.0, 5.0)); // (0, 0)
        grid.write(entity(1), (-5.0, 15.0)); // (-1, 1)
        grid.write(entity(2), (1.0e9, -1.0e9)); // far away

        // When
        let everything = grid.entities_around(Cell::new(0, 0), u32::MAX);
        let beyond_i32 = grid.entities_around(Cell::new(0, 0), 3_000_000_000);

        // Then - row-major: lowest y first
        assert_eq!(everything.as_ref(), &[entity(2), entity(0), entity(1)]);
        assert_eq!(beyond_i32, everything);
    }

    #[test]
    fn spatial_newer_generation_leaves_old_cell() {
        // Given
        let mut grid = index();
        let old = entity(0);
        let new = Entity::new_with_generation(Id::from(0), Generation::FIRST.next());
        grid.write(old, (1.0, 1.0));

        // When
        grid.write(new, (12.0, 12.0));

        // Then
        assert!(grid.entities_near(Cell::new(0, 0)).is_empty());
        assert_eq!(grid.entities_near(Cell::new(1, 1)).as_ref(), &[new]);
        assert_eq!(grid.read(old), None);
        assert_eq!(grid.occupied_cells(), vec![Cell::new(1, 1)]);

        // When - the stale handle can neither move nor re-enter the grid
        grid.write(old, (1.0, 1.0));

        // Then
        assert!(grid.entities_near(Cell::new(0, 0)).is_empty());
        assert_eq!(grid.read(new), Some((12.0, 12.0)));
    }

    #[test]
    fn spatial_over_cache_after_eviction_takeover() {
        // Given - the old handle sits in the backing map, evicted from the cache
        let mut grid = SpatialIndexStore::with_cell_size(
            CacheStore::<_, 1>::new(MapStore::<(f32, f32)>::new()),
            10.0,
        );
        let old = entity(0);
        let new = Entity::new_with_generation(Id::from(0), Generation::FIRST.next());
        grid.write(old, (1.0, 1.0));
        grid.write(entity(1), (2.0, 2.0));

        // When
        grid.write(new, (31.0, 1.0));

        // Then
        assert_eq!(grid.entities_near(Cell::new(0, 0)).as_ref(), &[entity(1)]);
        assert_eq!(grid.entities_near(Cell::new(3, 0)).as_ref(), &[new]);
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn spatial_indexes_existing_backing_values() {
        // Given
        let mut backing = MapStore::new();
        backing.write(entity(0), [3.0, 40.0]);
        backing.write(entity(1), [-1.0, 0.0]);

        // When
        let grid = SpatialIndexStore::with_cell_size(backing, 10.0);

        // Then
        assert_eq!(grid.entities_near(Cell::new(0, 4)).as_ref(), &[entity(0)]);
        assert_eq!(grid.entities_near(Cell::new(-1, 0)).as_ref(), &[entity(1)]);
    }

    #[test]
    fn spatial_grid_matches_values_after_mixed_operations() {
        // Given
        let mut grid = index();
        let mut model: HashMap<Entity, (f32, f32)> = HashMap::new();
        let mut seed: u32 = 7;

        // When
        for _ in 0..1_000 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let e = entity((seed >> 8) % 12);
            if (seed >> 3) % 4 == 0 {
                grid.destroy(e);
                model.remove(&e);
            } else {
                let x = ((seed >> 12) % 60) as f32 - 30.0;
                let y = ((seed >> 20) % 60) as f32 - 30.0;
                grid.write(e, (x, y));
                model.insert(e, (x, y));
            }
        }

        // Then - every cell holds exactly the entities whose value maps to it
        let mut expected: HashMap<Cell, Vec<Entity>> = HashMap::new();
        for (e, location) in &model {
            expected
                .entry(Cell::containing(*location, 10.0))
                .or_default()
                .push(*e);
        }
        let mut cells: Vec<Cell> = expected.keys().copied().collect();
        cells.sort_unstable();
        assert_eq!(grid.occupied_cells(), cells);
        for (cell, mut entities) in expected {
            entities.sort();
            assert_eq!(grid.entities_near(cell).sorted().into_vec(), entities);
        }
    }

    #[test]
    #[should_panic(expected = "cell_size must be positive and finite")]
    fn spatial_rejects_zero_cell_size() {
        let _ = SpatialIndexStore::with_cell_size(MapStore::<(f32, f32)>::new(), 0.0);
    }

    #[test]
    #[should_panic(expected = "cell_size must be positive and finite")]
    fn spatial_rejects_nan_cell_size() {
        let _ = SpatialIndexStore::with_cell_size(MapStore::<(f32, f32)>::new(), f32::NAN);
    }
}
