//! Correlation ID allocation.

use super::wire_format::is_reserved_id;

/// First ID handed out; 0 and 1 belong to the broadcast channels.
const FIRST_ID: u32 = 2;

/// Wrapping counter that never yields a reserved channel ID.
///
/// The caller supplies an "in use" predicate so an ID still waiting for its
/// response is skipped after the counter wraps.
#[derive(Debug, Clone)]
pub struct CorrelationIds {
    next: u32,
}

impl CorrelationIds {
    pub fn new() -> Self {
        Self::starting_at(FIRST_ID)
    }

    /// Start the counter at a given value. Reserved values are skipped.
    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }

    /// Allocate the next free ID.
    ///
    /// Returns `None` only if every non-reserved ID is in use.
    pub fn allocate(&mut self, in_use: impl Fn(u32) -> bool) -> Option<u32> {
        // Bounded so a saturated table cannot spin forever.
        for _ in 0..=u32::MAX as u64 {
            let candidate = self.next;
            self.next = self.next.wrapping_add(1);
            if is_reserved_id(candidate) || in_use(candidate) {
                continue;
            }
            return Some(candidate);
        }
        None
    }
}

impl Default for CorrelationIds {
    fn default() -> Self {
        Self::new()
    }
}
