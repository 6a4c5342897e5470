//! Notification id generation
//!
//! Generated ids are uniform over `1..=i32::MAX`. Collisions are possible
//! but improbable; a collision replaces the earlier notification.

use rand::Rng;
use std::fmt::Debug;
use std::sync::atomic::{AtomicI32, Ordering};

/// Source of fresh positive notification ids
pub trait IdSource: Send + Sync + Debug {
    /// Next id; always positive
    fn next_id(&self) -> i32;
}

/// Uniformly random ids
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self) -> i32 {
        rand::rng().random_range(1..=i32::MAX)
    }
}

/// Deterministic ids counting up from a start value
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicI32,
}

impl SequentialIds {
    /// Start counting at `start` (clamped to 1)
    #[must_use]
    pub fn starting_at(start: i32) -> Self {
        Self {
            next: AtomicI32::new(start.max(1)),
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> i32 {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        if id > 0 {
            id
        } else {
            self.next.store(2, Ordering::Relaxed);
            1
        }
    }
}
