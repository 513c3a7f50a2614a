use std::sync::Arc;

use crate::TranIndex;

/// The victim-selection capability a caller attaches to a transaction the
/// moment it becomes a waiter. The WFG stores this and the accompanying
/// `arg` by value on the node and later copies both into any cycle record
/// that includes the transaction; it never calls `resolve` itself. The
/// caller's victim-selection code is expected to call it outside the latch.
pub trait CycleResolver: Send + Sync {
    fn resolve(&self, tran_index: TranIndex, arg: u64);
}

/// One waiter's position on a reported cycle.
///
/// `resolver` is `None` for a transaction-group cycle member that is only a
/// holder of the implicated group and was never itself registered as a
/// waiter anywhere (no `insert_out_edges`/`insert_waiter_tran_group` call
/// ever attached one), the group-cycle search still reports it as part of
/// the candidate set, but the WFG has no callback to copy for it.
#[derive(Clone)]
pub struct CycleWaiter {
    pub tran_index: TranIndex,
    pub resolver: Option<Arc<dyn CycleResolver>>,
    pub arg: u64,
}

impl std::fmt::Debug for CycleWaiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleWaiter")
            .field("tran_index", &self.tran_index)
            .field("arg", &self.arg)
            .finish_non_exhaustive()
    }
}

/// An elementary cycle (ordinary) or an approximating cycle-candidate set
/// (transaction-group). Length is always at least 2.
pub type Cycle = Vec<CycleWaiter>;

/// The outcome of a cycle search. An error case is modeled as
/// `Err(WfgError)` at the call site instead of a fourth variant here. Rust
/// ownership makes the "no list on error" rule automatic, since a `Result`
/// that errors simply never constructs an `Outcome` to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectCase {
    /// No cycles found.
    No,
    /// All cycles found, search was not pruned.
    Yes,
    /// Cycles found, but the search terminated early due to a pruning cap.
    YesPrune,
}

/// The result of a full `detect_cycle`/`dump` pass: ordinary cycles found by
/// the DFS search followed by group-cycle approximations.
#[derive(Debug)]
pub struct DetectOutcome {
    pub case: DetectCase,
    pub cycles: Vec<Cycle>,
}
