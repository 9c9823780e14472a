//! Member color assignment.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed palette cycled through when assigning member colors. Shared across
/// all rooms; colors may repeat concurrently, there is no uniqueness
/// guarantee.
pub const MEMBER_COLORS: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E2",
    "#F8B739", "#52B788",
];

/// Round-robin color allocator backed by an atomic counter, so joins from
/// different rooms never contend on a lock.
#[derive(Debug, Default)]
pub struct Palette {
    next: AtomicUsize,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next color in the cycle.
    pub fn next_color(&self) -> &'static str {
        let idx = self.next.fetch_add(1, Ordering::Relaxed);
        MEMBER_COLORS[idx % MEMBER_COLORS.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles_round_robin() {
        let palette = Palette::new();
        for expected in MEMBER_COLORS {
            assert_eq!(palette.next_color(), expected);
        }
        // Wraps around after a full cycle.
        assert_eq!(palette.next_color(), MEMBER_COLORS[0]);
    }
}
