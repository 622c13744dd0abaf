//! Reentrancy latch for cross-renderer propagation.

/// Which renderer a latched settle is expected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Primary,
    Secondary,
}

/// Single-slot latch shared by both settle handlers.
///
/// A view change propagated from renderer A to renderer B makes B settle
/// and fire its own move-end, which the host forwards back in like any
/// other event. The propagating handler arms the latch for B's side; B's
/// handler absorbs that one settle instead of re-propagating it. The latch
/// holds a single expectation, so back-to-back propagations in the same
/// direction collapse onto one echo, matching how renderers coalesce
/// motion into one settle.
#[derive(Debug, Default)]
pub struct SyncGuard {
    expected: Option<Side>,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `side`'s renderer is about to settle because of a
    /// propagation, not a user action.
    pub fn arm(&mut self, side: Side) {
        self.expected = Some(side);
    }

    /// Returns `true` when a settle arriving from `side` is the echo of a
    /// propagation, consuming the expectation. The caller must drop the
    /// event in that case.
    pub fn absorb(&mut self, side: Side) -> bool {
        if self.expected == Some(side) {
            self.expected = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unarmed_guard_absorbs_nothing() {
        let mut guard = SyncGuard::new();
        assert!(!guard.absorb(Side::Primary));
        assert!(!guard.absorb(Side::Secondary));
    }

    #[test]
    fn test_armed_side_absorbs_exactly_once() {
        let mut guard = SyncGuard::new();
        guard.arm(Side::Secondary);
        assert!(guard.absorb(Side::Secondary));
        assert!(
            !guard.absorb(Side::Secondary),
            "expectation is consumed by the first echo"
        );
    }

    #[test]
    fn test_other_side_settle_passes_through() {
        let mut guard = SyncGuard::new();
        guard.arm(Side::Secondary);
        assert!(
            !guard.absorb(Side::Primary),
            "a primary settle is not the secondary's echo"
        );
        assert!(guard.absorb(Side::Secondary), "expectation survives it");
    }

    #[test]
    fn test_rearming_collapses_onto_one_echo() {
        let mut guard = SyncGuard::new();
        guard.arm(Side::Secondary);
        guard.arm(Side::Secondary);
        assert!(guard.absorb(Side::Secondary));
        assert!(!guard.absorb(Side::Secondary));
    }
}
