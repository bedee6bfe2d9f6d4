//! Block store indexed by block number.

use ictest_domain::{Block, IngestError};
use parking_lot::Mutex;
use tracing::trace;

/// Default cap on placeholders created by one append.
pub const DEFAULT_MAX_BACKFILL: u64 = 100_000;

/// Blocks observed from a push source, indexable by block number.
///
/// The backing vector always covers every block number up to the highest one
/// appended. Numbers skipped by out-of-order delivery hold
/// `Block::default()` placeholders until the real block arrives.
#[derive(Debug)]
pub struct BlockStore {
    blocks: Mutex<Vec<Block>>,
    max_backfill: u64,
}

impl BlockStore {
    /// Creates an empty store with [`DEFAULT_MAX_BACKFILL`].
    pub fn new() -> Self {
        Self::with_max_backfill(DEFAULT_MAX_BACKFILL)
    }

    /// Creates an empty store that refuses appends skipping more than
    /// `max_backfill` block numbers.
    pub fn with_max_backfill(max_backfill: u64) -> Self {
        Self {
            blocks: Mutex::new(Vec::new()),
            max_backfill,
        }
    }

    /// Stores a block, backfilling any skipped numbers with placeholders.
    ///
    /// # Errors
    /// See [`BlockStore::insert`].
    pub fn append(
        &self,
        block_number: u64,
        slot_number: u64,
        hash: impl Into<String>,
    ) -> Result<(), IngestError> {
        self.insert(Block::new(block_number, slot_number, hash))
    }

    /// Stores `block` under its block number.
    ///
    /// A number already covered by the store (placeholder or redelivery) is
    /// overwritten in place.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidBlockNumber`] for block number 0 or a
    /// number that cannot be indexed on this platform,
    /// [`IngestError::BackfillTooLarge`] when the block would skip more than
    /// the configured number of blocks, and [`IngestError::OutOfMemory`] when
    /// the backfill cannot be allocated.
    pub fn insert(&self, block: Block) -> Result<(), IngestError> {
        let block_number = block.block_number;
        let index = block_number
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .ok_or(IngestError::InvalidBlockNumber(block_number))?;

        let mut blocks = self.blocks.lock();
        if index < blocks.len() {
            blocks[index] = block;
            return Ok(());
        }

        let gap = index - blocks.len();
        if gap as u64 > self.max_backfill {
            return Err(IngestError::BackfillTooLarge {
                block_number,
                gap: gap as u64,
                max: self.max_backfill,
            });
        }
        blocks
            .try_reserve(gap + 1)
            .map_err(|_| IngestError::OutOfMemory(block_number))?;
        if gap > 0 {
            trace!(block_number, gap, "Backfilling skipped blocks");
        }
        blocks.resize(index, Block::default());
        blocks.push(block);
        Ok(())
    }

    /// Returns the block stored under `block_number`, which may be a
    /// placeholder. `None` outside `1..=len`.
    pub fn get(&self, block_number: u64) -> Option<Block> {
        let index = usize::try_from(block_number.checked_sub(1)?).ok()?;
        self.blocks.lock().get(index).cloned()
    }

    /// Returns the highest stored block.
    pub fn last(&self) -> Option<Block> {
        self.blocks.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.blocks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.lock().is_empty()
    }

    /// Drops every block with a slot after `slot_number`, then any trailing
    /// placeholders. Returns the number of entries removed.
    pub fn truncate_after_slot(&self, slot_number: u64) -> usize {
        let mut blocks = self.blocks.lock();
        let before = blocks.len();
        while blocks
            .last()
            .is_some_and(|b| b.slot_number > slot_number || b.is_placeholder())
        {
            blocks.pop();
        }
        before - blocks.len()
    }
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = BlockStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get(1), None);
        assert_eq!(store.last(), None);
    }

    #[test]
    fn test_append_in_order() {
        let store = BlockStore::new();
        store.append(1, 10, "a").unwrap();
        store.append(2, 20, "b").unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1), Some(Block::new(1, 10, "a")));
        assert_eq!(store.last(), Some(Block::new(2, 20, "b")));
    }

    #[test]
    fn test_out_of_order_backfill() {
        let store = BlockStore::new();
        store.append(5, 50, "e").unwrap();

        assert_eq!(store.len(), 5);
        assert_eq!(store.get(3), Some(Block::default()));
        assert_eq!(store.get(5), Some(Block::new(5, 50, "e")));
        assert_eq!(store.get(0), None);
        assert_eq!(store.get(6), None);

        store.append(3, 30, "c").unwrap();
        assert_eq!(store.get(3), Some(Block::new(3, 30, "c")));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_block_number_zero_rejected() {
        let store = BlockStore::new();
        assert_eq!(
            store.append(0, 1, "x"),
            Err(IngestError::InvalidBlockNumber(0))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_huge_block_number_rejected() {
        let store = BlockStore::new();
        store.append(1, 10, "a").unwrap();

        let err = store.append(u64::MAX, 1, "x").unwrap_err();

        assert!(matches!(
            err,
            IngestError::BackfillTooLarge { .. } | IngestError::InvalidBlockNumber(_)
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_backfill_limit() {
        let store = BlockStore::with_max_backfill(3);

        store.append(4, 40, "d").unwrap();
        assert_eq!(store.len(), 4);

        let err = store.append(9, 90, "i").unwrap_err();
        assert_eq!(
            err,
            IngestError::BackfillTooLarge {
                block_number: 9,
                gap: 4,
                max: 3,
            }
        );
        assert_eq!(store.len(), 4);

        // Filling in below the tip never counts as backfill.
        store.append(2, 20, "b").unwrap();
        assert_eq!(store.get(2), Some(Block::new(2, 20, "b")));
    }

    #[test]
    fn test_truncate_after_slot() {
        let store = BlockStore::new();
        store.append(1, 10, "a").unwrap();
        store.append(2, 20, "b").unwrap();
        store.append(5, 50, "e").unwrap();

        // Block 5 goes, then the placeholders for 3 and 4.
        assert_eq!(store.truncate_after_slot(20), 3);
        assert_eq!(store.last(), Some(Block::new(2, 20, "b")));

        assert_eq!(store.truncate_after_slot(20), 0);
        assert_eq!(store.truncate_after_slot(0), 2);
        assert!(store.is_empty());
    }
}
