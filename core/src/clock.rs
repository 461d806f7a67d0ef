//! Logical time sources
//!
//! Registries never read time on their own; they stamp whatever height the
//! caller passes in. The ledger facade asks a `LogicalClock` once per
//! mutating call.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::BlockHeight;

/// Source of logical time for stamping records
#[cfg_attr(test, mockall::automock)]
pub trait LogicalClock: Send + Sync {
    /// Height to stamp on the record being written
    fn now(&self) -> BlockHeight;
}

/// Monotonic counter that advances on every read
#[derive(Debug)]
pub struct BlockCounter {
    next: AtomicU64,
}

impl BlockCounter {
    /// Create a counter whose first reading is `genesis`
    pub fn new(genesis: BlockHeight) -> Self {
        BlockCounter {
            next: AtomicU64::new(genesis),
        }
    }

    /// Height the next reading will return, without advancing
    pub fn peek(&self) -> BlockHeight {
        self.next.load(Ordering::SeqCst)
    }
}

impl LogicalClock for BlockCounter {
    fn now(&self) -> BlockHeight {
        // Saturates at u64::MAX instead of wrapping back to 0
        match self
            .next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |h| Some(h.saturating_add(1)))
        {
            Ok(height) | Err(height) => height,
        }
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    height: AtomicU64,
}

impl ManualClock {
    /// Create a clock fixed at `height`
    pub fn new(height: BlockHeight) -> Self {
        ManualClock {
            height: AtomicU64::new(height),
        }
    }

    /// Jump to `height`
    pub fn set(&self, height: BlockHeight) {
        self.height.store(height, Ordering::SeqCst);
    }

    /// Move forward by `blocks`
    pub fn advance(&self, blocks: u64) {
        self.height.fetch_add(blocks, Ordering::SeqCst);
    }
}

impl LogicalClock for ManualClock {
    fn now(&self) -> BlockHeight {
        self.height.load(Ordering::SeqCst)
    }
}
