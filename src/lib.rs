//! An explicit, concurrent, in-memory Wait-For Graph for deadlock detection.
//!
//! A [`Wfg`] tracks which transactions are waiting on which others (ordinary
//! edges) and which are waiting on, or holding, slots of a counting
//! semaphore (transaction groups). Callers periodically invoke
//! [`Wfg::detect_cycle`] to find elementary cycles (certain deadlocks) and
//! transaction-group cycles (an approximation sufficient for victim
//! selection). A single `RwLock` is the only synchronization primitive; the
//! graph does no I/O and never blocks beyond acquiring that latch.
//!
//! No SQL parsing, storage layout, network protocol, client session
//! lifecycle, or replication lives here; this crate is the deadlock-graph
//! kernel a lock manager or transaction manager builds on top of.

mod config;
mod edge;
mod error;
mod group;
mod group_search;
mod node;
mod resolver;
mod search;
mod wfg;

/// Index of a transaction vertex, assigned densely by the caller via
/// [`Wfg::alloc_nodes`].
pub type TranIndex = usize;

/// Index of a transaction group, assigned by [`Wfg::alloc_tran_group`].
pub type TranGroupIndex = usize;

pub(crate) type EdgeIndex = usize;

pub use config::DetectConfig;
pub use error::{BadArgumentKind, WfgError, WfgResult};
pub use resolver::{Cycle, CycleResolver, CycleWaiter, DetectCase, DetectOutcome};
pub use wfg::{Wfg, WfgStatus};
