use crate::entity::Entity;

/// Position of a value in a store's packed vecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row(usize);

impl Row {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for Row {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// A block-based sparse index from entity slot ids to dense rows.
///
/// The id space is split into fixed-size blocks and a block is only allocated once it holds
/// an entry. Within a block, a plain vector gives O(1) lookup with good locality.
///
/// Entity ids handed out by the [`Registry`](crate::entity::Registry) are dense and get
/// reused, so in practice a handful of blocks covers the whole population:
///
/// | Operation  | Time           | Memory                        |
/// |------------|----------------|-------------------------------|
/// | `insert()` | O(1) amortized | Allocates block on first use  |
/// | `get()`    | O(1)           | No allocation                 |
/// | `remove()` | O(1)           | No deallocation               |
///
/// The index is keyed by [`Entity::index`] only. Stores keep the full handle next to the
/// value and compare generations themselves.
#[derive(Debug)]
pub struct BlockIndex {
    block_size: usize,

    /// Outer vec is indexed by `id / block_size`, inner vec by `id % block_size`.
    blocks: Vec<Option<Box<[Option<Row>]>>>,
}

impl BlockIndex {
    /// Default block size, balanced for registry-allocated ids.
    pub const DEFAULT_BLOCK_SIZE: usize = 256;

    /// Create an index with the default block size.
    #[inline]
    pub const fn new() -> Self {
        Self::new_with_block_size(Self::DEFAULT_BLOCK_SIZE)
    }

    /// Create an index with a custom block size.
    ///
    /// Smaller blocks waste less memory on very sparse ids; larger blocks need fewer
    /// allocations for dense ids.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is 0.
    #[inline]
    pub const fn new_with_block_size(block_size: usize) -> Self {
        assert!(block_size > 0, "block_size must be greater than 0");
        Self {
            block_size,
            blocks: Vec::new(),
        }
    }

    #[inline]
    fn locate(&self, entity: Entity) -> (usize, usize) {
        let index = entity.index();
        (index / self.block_size, index % self.block_size)
    }

    #[cfg(test)]
    /// Number of block slots, allocated or not.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    #[cfg(test)]
    /// Number of blocks actually allocated.
    pub fn allocated_block_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    /// Map the slot of `entity` to `row`, replacing any previous mapping.
    pub fn insert(&mut self, entity: Entity, row: Row) {
        let (block, slot) = self.locate(entity);

        if block >= self.blocks.len() {
            self.blocks.resize_with(block + 1, || None);
        }

        let block_size = self.block_size;
        let block = self.blocks[block].get_or_insert_with(|| vec![None; block_size].into());
        block[slot] = Some(row);
    }

    /// Get the row mapped to the slot of `entity`.
    #[inline]
    pub fn get(&self, entity: Entity) -> Option<Row> {
        let (block, slot) = self.locate(entity);
        self.blocks.get(block)?.as_ref()?[slot]
    }

    /// Remove the mapping for the slot of `entity`, returning the old row.
    pub fn remove(&mut self, entity: Entity) -> Option<Row> {
        let (block, slot) = self.locate(entity);
        self.blocks.get_mut(block)?.as_mut()?[slot].take()
    }

    /// Drop every mapping and release all blocks.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}

impl Default for BlockIndex {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: u32) -> Entity {
        Entity::new(id)
    }

    fn row(index: usize) -> Option<Row> {
        Some(Row::new(index))
    }

    #[test]
    fn block_index_single_block() {
        // Given
        let mut index = BlockIndex::new_with_block_size(10);

        // When
        index.insert(entity(0), 10.into());
        index.insert(entity(5), 40.into());
        index.insert(entity(9), 80.into());

        // Then
        assert_eq!(index.block_count(), 1);
        assert_eq!(index.get(entity(0)), row(10));
        assert_eq!(index.get(entity(1)), None);
        assert_eq!(index.get(entity(5)), row(40));
        assert_eq!(index.get(entity(9)), row(80));
    }

    #[test]
    fn block_index_skips_empty_blocks() {
        // Given
        let mut index = BlockIndex::new_with_block_size(4);

        // When
        index.insert(entity(0), 10.into());
        index.insert(entity(9), 80.into());

        // Then - three block slots, the middle one never allocated
        assert_eq!(index.block_count(), 3);
        assert_eq!(index.allocated_block_count(), 2);
        assert!(index.blocks[1].is_none());
        assert_eq!(index.get(entity(5)), None);
    }

    #[test]
    fn block_index_remove() {
        // Given
        let mut index = BlockIndex::new();
        index.insert(entity(0), 100.into());
        index.insert(entity(1), 200.into());

        // When
        let removed = index.remove(entity(1));

        // Then
        assert_eq!(removed, row(200));
        assert_eq!(index.get(entity(1)), None);
        assert_eq!(index.get(entity(0)), row(100));
        assert_eq!(index.remove(entity(3)), None);
        assert_eq!(index.remove(entity(100_000)), None);
    }

    #[test]
    fn block_index_overwrite() {
        // Given
        let mut index = BlockIndex::new();
        index.insert(entity(5), 100.into());

        // When
        index.insert(entity(5), 200.into());

        // Then
        assert_eq!(index.get(entity(5)), row(200));
    }

    #[test]
    fn block_index_sparse_ids() {
        // Given
        let mut index = BlockIndex::new_with_block_size(256);

        // When
        index.insert(entity(0), 0.into());
        index.insert(entity(10_000), 1.into());
        index.insert(entity(100_000), 2.into());

        // Then
        assert_eq!(index.get(entity(10_000)), row(1));
        assert_eq!(index.get(entity(100_000)), row(2));
        assert_eq!(index.block_count(), 391);
        assert_eq!(index.allocated_block_count(), 3);
    }

    #[test]
    #[should_panic(expected = "block_size must be greater than 0")]
    fn block_index_zero_block_size_panics() {
        let _ = BlockIndex::new_with_block_size(0);
    }
}
