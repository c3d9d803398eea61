/// Sparse, on-demand-allocated sector store.
///
/// Maps sector indices to heap-owned blocks. A block exists only after the
/// first write touching its sector; a sector with no block reads as zero.
/// One lock guards the whole map and is held for the duration of a single
/// sector-level call, never across a multi-sector segment.
use alloc::boxed::Box;
use alloc::collections::btree_map::{BTreeMap, Entry};
use alloc::vec::Vec;

use spin::Mutex;

use crate::error::EngineError;

/// In-memory backing for one sector — exactly `sector_size` bytes, owned by
/// the store from first write until teardown.
struct Block {
    data: Box<[u8]>,
}

impl Block {
    /// Allocate a zero-filled block, reporting failure instead of aborting.
    fn zeroed(sector_size: u32) -> Result<Self, EngineError> {
        let len = sector_size as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| EngineError::AllocationFailure)?;
        data.resize(len, 0);
        Ok(Self {
            data: data.into_boxed_slice(),
        })
    }
}

/// Sector-indexed block map behind a single device-wide lock.
pub struct BlockStore {
    sector_size: u32,
    blocks: Mutex<BTreeMap<u64, Block>>,
}

impl BlockStore {
    pub fn new(sector_size: u32) -> Self {
        Self {
            sector_size,
            blocks: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn sector_size(&self) -> u32 {
        self.sector_size
    }

    /// Number of sectors that have been written at least once.
    pub fn allocated_blocks(&self) -> usize {
        self.blocks.lock().len()
    }

    /// Atomic check-then-insert on the locked map: the block for `sector` if
    /// one exists, otherwise a freshly inserted zero-filled one. Allocation
    /// happens under the lock, so concurrent first writes to the same sector
    /// agree on a single block.
    fn get_or_create<'a>(
        sector_size: u32,
        blocks: &'a mut BTreeMap<u64, Block>,
        sector: u64,
    ) -> Result<&'a mut Block, EngineError> {
        match blocks.entry(sector) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(Block::zeroed(sector_size)?)),
        }
    }

    /// Copy `out.len()` bytes from `sector` starting at `offset_in_sector`.
    ///
    /// A sector that was never written reads as zero. Caller guarantees
    /// `offset_in_sector + out.len() <= sector_size`.
    pub fn read(&self, sector: u64, offset_in_sector: u32, out: &mut [u8]) {
        let offset = offset_in_sector as usize;
        debug_assert!(offset + out.len() <= self.sector_size as usize);

        let blocks = self.blocks.lock();
        match blocks.get(&sector) {
            Some(block) => out.copy_from_slice(&block.data[offset..offset + out.len()]),
            None => out.fill(0),
        }
        drop(blocks);

        log::trace!("read {} bytes from sector {}+{}", out.len(), sector, offset);
    }

    /// Overwrite `data.len()` bytes of `sector` at `offset_in_sector`,
    /// allocating the block on the sector's first write. Bytes outside the
    /// written range keep their prior value (zero for a fresh block). Caller
    /// guarantees `offset_in_sector + data.len() <= sector_size`.
    pub fn write(&self, sector: u64, offset_in_sector: u32, data: &[u8]) -> Result<(), EngineError> {
        let offset = offset_in_sector as usize;
        debug_assert!(offset + data.len() <= self.sector_size as usize);

        let mut blocks = self.blocks.lock();
        let block = Self::get_or_create(self.sector_size, &mut blocks, sector)?;
        block.data[offset..offset + data.len()].copy_from_slice(data);
        drop(blocks);

        log::trace!("wrote {} bytes to sector {}+{}", data.len(), sector, offset);
        Ok(())
    }

    /// Release every block. Reached only through `RamDisk::teardown`, which
    /// consumes the device; callers must have quiesced all transfers.
    pub(crate) fn teardown(&mut self) {
        let mut blocks = self.blocks.lock();
        let released = blocks.len();
        blocks.clear();
        drop(blocks);

        log::debug!("released {} blocks", released);
    }
}
