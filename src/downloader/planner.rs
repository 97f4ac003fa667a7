//! Offset planning for batch exports
//!
//! Pages are requested from the highest offset down to zero. Offsets are
//! grouped into thousand-blocks: each block runs from the current offset down
//! to the largest multiple of 1000 strictly below it (clamped to zero), and
//! becomes one batch request.
//!
//! For a total of 250 items the planner starts at 300 and yields a single
//! block `[300, 200, 100, 0]`. The page at the rounded-up offset lies past the
//! last item and comes back empty.
//!
//! Offsets are tracked as `i64`; a total whose starting offset does not fit
//! cannot be planned.

use crate::downloader::config::{BLOCK_SIZE, PAGE_SIZE};
use crate::PageRequest;

/// First offset to request for `total` items: `ceil(total / 100) * 100`
///
/// `None` when the offset would exceed `i64::MAX`.
pub fn starting_offset(total: u64) -> Option<u64> {
    total
        .div_ceil(PAGE_SIZE)
        .checked_mul(PAGE_SIZE)
        .filter(|&offset| i64::try_from(offset).is_ok())
}

/// Lowest offset belonging to the block that starts at `offset`
///
/// `max(0, (ceil(offset / 1000) - 1) * 1000)`
pub fn thousand_floor(offset: u64) -> u64 {
    offset.div_ceil(BLOCK_SIZE).saturating_sub(1) * BLOCK_SIZE
}

/// Number of blocks the planner yields starting at `offset`
pub fn block_count(offset: u64) -> u64 {
    // Every block above the first thousand ends on a multiple of 1000 and the
    // one covering (0, 1000] also takes offset 0.
    offset.div_ceil(BLOCK_SIZE).max(1)
}

/// Page requests issued for `total` items, offset zero included
pub fn page_count(total: u64) -> Option<u64> {
    starting_offset(total).map(|offset| offset / PAGE_SIZE + 1)
}

/// Lazy producer of thousand-blocks of page descriptors
#[derive(Debug, Clone)]
pub struct OffsetPlanner {
    store_id: String,
    resource: String,
    /// Next offset to emit; negative once every page has been planned.
    offset: i64,
}

impl OffsetPlanner {
    /// Planner starting at an explicit offset (a multiple of 100)
    ///
    /// `None` if `offset` exceeds `i64::MAX`.
    pub fn new(
        store_id: impl Into<String>,
        resource: impl Into<String>,
        offset: u64,
    ) -> Option<Self> {
        let offset = i64::try_from(offset).ok()?;
        Some(Self {
            store_id: store_id.into(),
            resource: resource.into(),
            offset,
        })
    }

    /// Planner covering `total` items, `None` if `total` is too large to plan
    pub fn from_total(
        store_id: impl Into<String>,
        resource: impl Into<String>,
        total: u64,
    ) -> Option<Self> {
        Self::new(store_id, resource, starting_offset(total)?)
    }

    /// Offset the next block starts at, or `None` when planning is finished
    pub fn current_offset(&self) -> Option<u64> {
        (self.offset >= 0).then_some(self.offset as u64)
    }

    /// Blocks still to be produced
    pub fn remaining_blocks(&self) -> u64 {
        self.current_offset().map(block_count).unwrap_or(0)
    }

    /// Produce the next block, descending by one page at a time
    pub fn next_block(&mut self) -> Option<Vec<PageRequest>> {
        let start = self.current_offset()?;
        let floor = thousand_floor(start) as i64;

        let mut pages = Vec::with_capacity((BLOCK_SIZE / PAGE_SIZE) as usize + 1);
        while self.offset >= floor {
            pages.push(PageRequest::get(
                &self.store_id,
                &self.resource,
                self.offset as u64,
            ));
            self.offset -= PAGE_SIZE as i64;
        }
        Some(pages)
    }
}

impl Iterator for OffsetPlanner {
    type Item = Vec<PageRequest>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block()
    }
}
