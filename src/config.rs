/// Pruning caps for a cycle search. `-1` means unbounded (`dump` passes
/// `(-1, -1)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectConfig {
    /// Once this many cycles have been recorded for the current outer-DFS
    /// cycle group, further `ReOnStack` re-pushes into that group are
    /// suppressed.
    pub max_cycles_in_cycle_group: i64,
    /// Once this many cycles have been recorded across all groups, the
    /// overall search stops and reports `YesPrune`.
    pub max_cycles: i64,
}

impl DetectConfig {
    /// The caps `detect_cycle()` uses: `(10, 100)`.
    pub const fn default_caps() -> Self {
        Self {
            max_cycles_in_cycle_group: 10,
            max_cycles: 100,
        }
    }

    /// The caps `dump()` uses: unbounded.
    pub const fn unbounded() -> Self {
        Self {
            max_cycles_in_cycle_group: -1,
            max_cycles: -1,
        }
    }

    pub(crate) fn group_cap_reached(&self, found_in_group: usize) -> bool {
        self.max_cycles_in_cycle_group >= 0
            && found_in_group as i64 >= self.max_cycles_in_cycle_group
    }

    pub(crate) fn total_cap_reached(&self, found_total: usize) -> bool {
        self.max_cycles >= 0 && found_total as i64 >= self.max_cycles
    }
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self::default_caps()
    }
}
