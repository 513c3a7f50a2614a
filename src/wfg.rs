use std::io::Write;
use std::sync::{Arc, RwLock};

use crate::config::DetectConfig;
use crate::edge::EdgeStore;
use crate::error::{BadArgumentKind, WfgError, WfgResult};
use crate::group::TranGroup;
use crate::group_search::group_cycle_search;
use crate::node::{NodeTable, ResolverSlot, Status};
use crate::resolver::{CycleResolver, DetectCase, DetectOutcome};
use crate::search::ordinary_cycle_search;
use crate::{TranGroupIndex, TranIndex};

/// Current totals, as returned by [`Wfg::get_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WfgStatus {
    pub edges: usize,
    pub waiters: usize,
}

struct WfgInner {
    nodes: NodeTable,
    edges: EdgeStore,
    groups: Vec<TranGroup>,
    waiter_count: usize,
}

impl WfgInner {
    fn new() -> Self {
        Self {
            nodes: NodeTable::new(),
            edges: EdgeStore::new(),
            groups: Vec::new(),
            waiter_count: 0,
        }
    }

    fn check_index(&self, t: TranIndex) -> WfgResult<()> {
        if self.nodes.in_range(t) {
            Ok(())
        } else {
            Err(WfgError::BadArgument(BadArgumentKind::IndexOutOfRange))
        }
    }

    fn check_group_index(&self, g: TranGroupIndex) -> WfgResult<()> {
        if g < self.groups.len() {
            Ok(())
        } else {
            Err(WfgError::BadArgument(BadArgumentKind::IndexOutOfRange))
        }
    }

    /// Appends one edge `waiter -> holder` to both intrusive lists. Does not
    /// check for duplicates or self-edges; callers of this helper have
    /// already validated the batch.
    fn link_edge(&mut self, waiter: TranIndex, holder: TranIndex) {
        let e = self.edges.alloc(waiter, holder);

        let waiter_tail = self.nodes.get(waiter).unwrap().last_holder_edge;
        self.edges.get_mut(e).prev_on_waiter = waiter_tail;
        match waiter_tail {
            Some(tail) => self.edges.get_mut(tail).next_on_waiter = Some(e),
            None => self.nodes.get_mut(waiter).unwrap().first_holder_edge = Some(e),
        }
        self.nodes.get_mut(waiter).unwrap().last_holder_edge = Some(e);

        let holder_tail = self.nodes.get(holder).unwrap().last_waiter_edge;
        self.edges.get_mut(e).prev_on_holder = holder_tail;
        match holder_tail {
            Some(tail) => self.edges.get_mut(tail).next_on_holder = Some(e),
            None => self.nodes.get_mut(holder).unwrap().first_waiter_edge = Some(e),
        }
        self.nodes.get_mut(holder).unwrap().last_waiter_edge = Some(e);
    }

    /// Splices edge `e` out of both lists and frees it.
    fn unlink_edge(&mut self, e: usize) {
        let (waiter, holder, prev_w, next_w, prev_h, next_h) = {
            let edge = self.edges.get(e);
            (
                edge.waiter,
                edge.holder,
                edge.prev_on_waiter,
                edge.next_on_waiter,
                edge.prev_on_holder,
                edge.next_on_holder,
            )
        };

        match prev_w {
            Some(p) => self.edges.get_mut(p).next_on_waiter = next_w,
            None => self.nodes.get_mut(waiter).unwrap().first_holder_edge = next_w,
        }
        match next_w {
            Some(n) => self.edges.get_mut(n).prev_on_waiter = prev_w,
            None => self.nodes.get_mut(waiter).unwrap().last_holder_edge = prev_w,
        }

        match prev_h {
            Some(p) => self.edges.get_mut(p).next_on_holder = next_h,
            None => self.nodes.get_mut(holder).unwrap().first_waiter_edge = next_h,
        }
        match next_h {
            Some(n) => self.edges.get_mut(n).prev_on_holder = prev_h,
            None => self.nodes.get_mut(holder).unwrap().last_waiter_edge = prev_h,
        }

        self.edges.free(e);
    }

    fn holder_edges_of(&self, waiter: TranIndex) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cursor = self.nodes.get(waiter).unwrap().first_holder_edge;
        while let Some(e) = cursor {
            out.push(e);
            cursor = self.edges.get(e).next_on_waiter;
        }
        out
    }

    fn has_holder_edge(&self, waiter: TranIndex, holder: TranIndex) -> bool {
        let mut cursor = self.nodes.get(waiter).unwrap().first_holder_edge;
        while let Some(e) = cursor {
            let edge = self.edges.get(e);
            if edge.holder == holder {
                return true;
            }
            cursor = edge.next_on_waiter;
        }
        false
    }

    fn detect_cycle_locked(&mut self, config: &DetectConfig) -> DetectOutcome {
        let (ordinary_case, mut cycles) =
            ordinary_cycle_search(&mut self.nodes, &self.edges, config);
        let mut pruned = ordinary_case == DetectCase::YesPrune;

        if !pruned {
            let group_pruned =
                group_cycle_search(&mut self.nodes, &self.edges, &self.groups, config, &mut cycles);
            pruned = pruned || group_pruned;
        }

        let case = if cycles.is_empty() {
            DetectCase::No
        } else if pruned {
            DetectCase::YesPrune
        } else {
            DetectCase::Yes
        };

        DetectOutcome { case, cycles }
    }
}

/// A Wait-For Graph: transaction vertices, directed waiter-to-holder edges,
/// and transaction groups (counting-semaphore membership), guarded by a
/// single process-wide latch.
pub struct Wfg {
    inner: RwLock<WfgInner>,
}

impl Default for Wfg {
    fn default() -> Self {
        Self::new()
    }
}

impl Wfg {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(WfgInner::new()),
        }
    }

    fn write(&self) -> WfgResult<std::sync::RwLockWriteGuard<'_, WfgInner>> {
        self.inner.write().map_err(|_| {
            log::warn!("wfg: latch poisoned on write acquisition");
            WfgError::LatchFailure
        })
    }

    fn read(&self) -> WfgResult<std::sync::RwLockReadGuard<'_, WfgInner>> {
        self.inner.read().map_err(|_| {
            log::warn!("wfg: latch poisoned on read acquisition");
            WfgError::LatchFailure
        })
    }

    /// Ensures at least `n` vertices exist. Never shrinks.
    pub fn alloc_nodes(&self, n: usize) -> WfgResult<()> {
        let mut g = self.write()?;
        let before = g.nodes.len();
        g.nodes.alloc(n);
        log::debug!("wfg: alloc_nodes({n}) grew node table {before} -> {}", g.nodes.len());
        Ok(())
    }

    /// Destroys all vertices, edges, and groups.
    pub fn free_nodes(&self) -> WfgResult<()> {
        let mut g = self.write()?;
        g.nodes.clear();
        g.edges.clear();
        g.groups.clear();
        g.waiter_count = 0;
        log::debug!("wfg: free_nodes");
        Ok(())
    }

    /// Appends one edge per distinct holder, in input order, on `waiter`'s
    /// holder list; sets `waiter`'s cycle-resolution callback. Rolls back
    /// entirely on any validation failure.
    pub fn insert_out_edges(
        &self,
        waiter: TranIndex,
        holders: &[TranIndex],
        resolver: Arc<dyn CycleResolver>,
        arg: u64,
    ) -> WfgResult<()> {
        let mut g = self.write()?;
        g.check_index(waiter)?;
        for &h in holders {
            g.check_index(h)?;
            if h == waiter {
                return Err(WfgError::BadArgument(BadArgumentKind::SelfEdge));
            }
        }

        let mut seen: Vec<TranIndex> = Vec::with_capacity(holders.len());
        for &h in holders {
            if seen.contains(&h) || g.has_holder_edge(waiter, h) {
                return Err(WfgError::BadArgument(BadArgumentKind::DuplicateHolder));
            }
            seen.push(h);
        }

        let was_waiter = g.nodes.get(waiter).unwrap().is_ordinary_waiter();
        for &h in holders {
            g.link_edge(waiter, h);
        }
        if !holders.is_empty() {
            g.nodes.get_mut(waiter).unwrap().resolver = Some(ResolverSlot { resolver, arg });
        }
        if !was_waiter && g.nodes.get(waiter).unwrap().is_ordinary_waiter() {
            g.waiter_count += 1;
        }

        log::trace!(
            "wfg: insert_out_edges(waiter={waiter}, holders={holders:?}) -> edges={}",
            g.edges.count()
        );
        Ok(())
    }

    /// Removes the listed out-edges of `waiter`, or all of them if `holders`
    /// is `None`.
    pub fn remove_out_edges(&self, waiter: TranIndex, holders: Option<&[TranIndex]>) -> WfgResult<()> {
        let mut g = self.write()?;
        g.check_index(waiter)?;

        let to_remove: Vec<usize> = match holders {
            None => g.holder_edges_of(waiter),
            Some(hs) => {
                for &h in hs {
                    g.check_index(h)?;
                }
                let mut out = Vec::new();
                for &h in hs {
                    let mut cursor = g.nodes.get(waiter).unwrap().first_holder_edge;
                    let mut found = None;
                    while let Some(e) = cursor {
                        let edge = g.edges.get(e);
                        if edge.holder == h {
                            found = Some(e);
                            break;
                        }
                        cursor = edge.next_on_waiter;
                    }
                    if let Some(e) = found {
                        out.push(e);
                    }
                }
                out
            }
        };

        let was_waiter = g.nodes.get(waiter).unwrap().is_ordinary_waiter();
        for e in to_remove {
            g.unlink_edge(e);
        }
        let is_waiter_now = g.nodes.get(waiter).unwrap().is_ordinary_waiter();
        if was_waiter && !is_waiter_now {
            g.waiter_count -= 1;
        }

        log::trace!("wfg: remove_out_edges(waiter={waiter}) -> edges={}", g.edges.count());
        Ok(())
    }

    /// Returns `(edge count, waiter count)`.
    pub fn get_status(&self) -> WfgResult<WfgStatus> {
        let g = self.read()?;
        Ok(WfgStatus {
            edges: g.edges.count(),
            waiters: g.waiter_count,
        })
    }

    /// Runs both cycle searches with the default pruning caps `(10, 100)`.
    pub fn detect_cycle(&self) -> WfgResult<DetectOutcome> {
        self.detect_cycle_with_config(DetectConfig::default_caps())
    }

    /// Runs both cycle searches with caller-supplied pruning caps.
    pub fn detect_cycle_with_config(&self, config: DetectConfig) -> WfgResult<DetectOutcome> {
        let mut g = self.write()?;
        let outcome = g.detect_cycle_locked(&config);
        log::debug!(
            "wfg: detect_cycle case={:?} cycles={}",
            outcome.case,
            outcome.cycles.len()
        );
        Ok(outcome)
    }

    /// Writes a human-readable dump of the graph followed by an unbounded
    /// cycle listing.
    pub fn dump<W: Write>(&self, out: &mut W) -> WfgResult<()> {
        let mut g = self.write()?;

        writeln!(out, "wfg: {} vertices, {} edges, {} waiters, {} groups",
            g.nodes.len(), g.edges.count(), g.waiter_count, g.groups.len())
            .map_err(|_| WfgError::InternalInvariant("dump: write failed"))?;

        for t in 0..g.nodes.len() {
            let holder_edges = g.holder_edges_of(t);
            if holder_edges.is_empty() {
                continue;
            }
            let holders: Vec<TranIndex> = holder_edges.iter().map(|&e| g.edges.get(e).holder).collect();
            writeln!(out, "  {t} -> {holders:?}")
                .map_err(|_| WfgError::InternalInvariant("dump: write failed"))?;
        }
        for (g_idx, group) in g.groups.iter().enumerate() {
            if group.holder_count() == 0 && group.waiter_count() == 0 {
                continue;
            }
            writeln!(
                out,
                "  group {g_idx}: holders={:?} waiters={:?}",
                group.holders(),
                group.waiters()
            )
            .map_err(|_| WfgError::InternalInvariant("dump: write failed"))?;
        }

        let outcome = g.detect_cycle_locked(&DetectConfig::unbounded());
        writeln!(out, "cycles ({:?}):", outcome.case)
            .map_err(|_| WfgError::InternalInvariant("dump: write failed"))?;
        for cycle in &outcome.cycles {
            let members: Vec<TranIndex> = cycle.iter().map(|w| w.tran_index).collect();
            writeln!(out, "  {members:?}").map_err(|_| WfgError::InternalInvariant("dump: write failed"))?;
        }

        Ok(())
    }

    /// Appends a new, empty transaction group and returns its index.
    pub fn alloc_tran_group(&self) -> WfgResult<TranGroupIndex> {
        let mut g = self.write()?;
        g.groups.push(TranGroup::new());
        let idx = g.groups.len() - 1;
        log::debug!("wfg: alloc_tran_group -> {idx}");
        Ok(idx)
    }

    pub fn insert_holder_tran_group(&self, group: TranGroupIndex, t: TranIndex) -> WfgResult<()> {
        let mut g = self.write()?;
        g.check_group_index(group)?;
        g.check_index(t)?;
        if g.groups[group].contains_holder(t) {
            log::debug!("wfg: insert_holder_tran_group duplicate holder {t} in group {group}");
        } else {
            g.groups[group].insert_holder(t);
        }
        Ok(())
    }

    pub fn remove_holder_tran_group(&self, group: TranGroupIndex, t: TranIndex) -> WfgResult<()> {
        let mut g = self.write()?;
        g.check_group_index(group)?;
        g.check_index(t)?;
        g.groups[group].remove_holder(t);
        Ok(())
    }

    pub fn insert_waiter_tran_group(
        &self,
        group: TranGroupIndex,
        t: TranIndex,
        resolver: Arc<dyn CycleResolver>,
        arg: u64,
    ) -> WfgResult<()> {
        let mut g = self.write()?;
        g.check_group_index(group)?;
        g.check_index(t)?;
        if g.groups[group].contains_waiter(t) {
            log::debug!("wfg: insert_waiter_tran_group duplicate waiter {t} in group {group}");
        } else {
            g.groups[group].insert_waiter(t);
        }
        g.nodes.get_mut(t).unwrap().resolver = Some(ResolverSlot { resolver, arg });
        Ok(())
    }

    pub fn remove_waiter_tran_group(&self, group: TranGroupIndex, t: TranIndex) -> WfgResult<()> {
        let mut g = self.write()?;
        g.check_group_index(group)?;
        g.check_index(t)?;
        g.groups[group].remove_waiter(t);
        Ok(())
    }

    /// Returns whether `t` is waiting in any form: an ordinary holder edge,
    /// or a transaction-group waiter.
    pub fn is_waiting(&self, t: TranIndex) -> WfgResult<bool> {
        let g = self.read()?;
        g.check_index(t)?;
        if g.nodes.get(t).unwrap().is_ordinary_waiter() {
            return Ok(true);
        }
        Ok(g.groups.iter().any(|group| group.contains_waiter(t)))
    }

    /// Returns whether `t` is a transaction-group waiter.
    pub fn is_tran_group_waiting(&self, t: TranIndex) -> WfgResult<bool> {
        let g = self.read()?;
        g.check_index(t)?;
        Ok(g.groups.iter().any(|group| group.contains_waiter(t)))
    }

    /// Counts how many list entries (holder edge, waiter edge, group holder,
    /// group waiter) reference `t`.
    pub fn get_tran_entries(&self, t: TranIndex) -> WfgResult<usize> {
        let g = self.read()?;
        g.check_index(t)?;
        let node = g.nodes.get(t).unwrap();

        let mut count = 0;
        let mut cursor = node.first_holder_edge;
        while let Some(e) = cursor {
            count += 1;
            cursor = g.edges.get(e).next_on_waiter;
        }
        let mut cursor = node.first_waiter_edge;
        while let Some(e) = cursor {
            count += 1;
            cursor = g.edges.get(e).next_on_holder;
        }
        for group in &g.groups {
            if group.contains_holder(t) {
                count += 1;
            }
            if group.contains_waiter(t) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Status of vertex `t`, for tests and diagnostics only.
    #[cfg(test)]
    pub(crate) fn status_of(&self, t: TranIndex) -> WfgResult<Status> {
        let g = self.read()?;
        g.check_index(t)?;
        Ok(g.nodes.get(t).unwrap().status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::DetectCase;
    use std::collections::BTreeSet;

    struct NoopResolver;
    impl CycleResolver for NoopResolver {
        fn resolve(&self, _tran_index: TranIndex, _arg: u64) {}
    }

    fn resolver() -> Arc<dyn CycleResolver> {
        Arc::new(NoopResolver)
    }

    fn cycle_members(cycle: &crate::resolver::Cycle) -> BTreeSet<TranIndex> {
        cycle.iter().map(|w| w.tran_index).collect()
    }

    #[test]
    fn chain_with_no_cycle() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(3).unwrap();
        wfg.insert_out_edges(1, &[0], resolver(), 0).unwrap();
        wfg.insert_out_edges(2, &[1], resolver(), 0).unwrap();

        let outcome = wfg.detect_cycle().unwrap();
        assert_eq!(outcome.case, DetectCase::No);
        assert!(outcome.cycles.is_empty());

        let status = wfg.get_status().unwrap();
        assert_eq!(status.edges, 2);
        assert_eq!(status.waiters, 2);
    }

    #[test]
    fn two_cycle_and_its_removal() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(3).unwrap();
        wfg.insert_out_edges(1, &[0], resolver(), 0).unwrap();
        wfg.insert_out_edges(2, &[1], resolver(), 0).unwrap();
        wfg.insert_out_edges(0, &[2], resolver(), 0).unwrap();

        let outcome = wfg.detect_cycle().unwrap();
        assert_eq!(outcome.case, DetectCase::Yes);
        assert_eq!(outcome.cycles.len(), 1);
        assert_eq!(cycle_members(&outcome.cycles[0]), BTreeSet::from([0, 1, 2]));

        wfg.remove_out_edges(0, Some(&[2])).unwrap();
        let outcome = wfg.detect_cycle().unwrap();
        assert_eq!(outcome.case, DetectCase::No);
    }

    #[test]
    fn statuses_are_not_visited_outside_a_search() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(3).unwrap();
        wfg.insert_out_edges(1, &[0], resolver(), 0).unwrap();
        wfg.insert_out_edges(2, &[1], resolver(), 0).unwrap();
        wfg.insert_out_edges(0, &[2], resolver(), 0).unwrap();

        for t in 0..3 {
            assert_eq!(wfg.status_of(t).unwrap(), Status::NotVisited);
        }
        wfg.detect_cycle().unwrap();
        for t in 0..3 {
            assert_eq!(wfg.status_of(t).unwrap(), Status::OffStack);
        }
    }

    #[test]
    fn insert_then_remove_restores_waiter_count() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(2).unwrap();
        wfg.insert_out_edges(0, &[1], resolver(), 0).unwrap();
        assert_eq!(wfg.get_status().unwrap(), WfgStatus { edges: 1, waiters: 1 });

        wfg.remove_out_edges(0, None).unwrap();
        assert_eq!(wfg.get_status().unwrap(), WfgStatus { edges: 0, waiters: 0 });
    }

    #[test]
    fn self_edge_is_rejected() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(1).unwrap();
        let err = wfg.insert_out_edges(0, &[0], resolver(), 0).unwrap_err();
        assert!(matches!(
            err,
            WfgError::BadArgument(BadArgumentKind::SelfEdge)
        ));
    }

    #[test]
    fn duplicate_holder_in_one_call_is_rejected() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(2).unwrap();
        let err = wfg.insert_out_edges(0, &[1, 1], resolver(), 0).unwrap_err();
        assert!(matches!(
            err,
            WfgError::BadArgument(BadArgumentKind::DuplicateHolder)
        ));
        // A rejected batch leaves no partial edges behind.
        assert_eq!(wfg.get_status().unwrap(), WfgStatus { edges: 0, waiters: 0 });
    }

    #[test]
    fn duplicate_against_existing_edge_is_rejected() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(2).unwrap();
        wfg.insert_out_edges(0, &[1], resolver(), 0).unwrap();
        let err = wfg.insert_out_edges(0, &[1], resolver(), 0).unwrap_err();
        assert!(matches!(
            err,
            WfgError::BadArgument(BadArgumentKind::DuplicateHolder)
        ));
    }

    #[test]
    fn zero_holders_is_accepted_and_produces_no_edges() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(1).unwrap();
        wfg.insert_out_edges(0, &[], resolver(), 0).unwrap();
        assert_eq!(wfg.get_status().unwrap(), WfgStatus { edges: 0, waiters: 0 });
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(1).unwrap();
        let err = wfg.insert_out_edges(0, &[5], resolver(), 0).unwrap_err();
        assert!(matches!(
            err,
            WfgError::BadArgument(BadArgumentKind::IndexOutOfRange)
        ));
    }

    #[test]
    fn alloc_nodes_with_smaller_n_is_a_noop() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(5).unwrap();
        wfg.alloc_nodes(2).unwrap();
        assert!(wfg.insert_out_edges(4, &[0], resolver(), 0).is_ok());
    }

    #[test]
    fn free_nodes_clears_everything() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(2).unwrap();
        wfg.insert_out_edges(0, &[1], resolver(), 0).unwrap();
        wfg.free_nodes().unwrap();
        assert_eq!(wfg.get_status().unwrap(), WfgStatus { edges: 0, waiters: 0 });
        assert!(wfg.is_waiting(0).is_err(), "index 0 no longer exists after free_nodes");
    }

    #[test]
    fn is_waiting_reflects_ordinary_and_group_waits() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(3).unwrap();
        wfg.insert_out_edges(0, &[1], resolver(), 0).unwrap();
        assert!(wfg.is_waiting(0).unwrap());
        assert!(!wfg.is_waiting(1).unwrap());
        assert!(!wfg.is_tran_group_waiting(0).unwrap());

        let group = wfg.alloc_tran_group().unwrap();
        wfg.insert_waiter_tran_group(group, 2, resolver(), 0).unwrap();
        assert!(wfg.is_waiting(2).unwrap());
        assert!(wfg.is_tran_group_waiting(2).unwrap());
    }

    #[test]
    fn get_tran_entries_counts_every_list_membership() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(3).unwrap();
        wfg.insert_out_edges(0, &[1, 2], resolver(), 0).unwrap();
        assert_eq!(wfg.get_tran_entries(0).unwrap(), 2);
        assert_eq!(wfg.get_tran_entries(1).unwrap(), 1);

        let group = wfg.alloc_tran_group().unwrap();
        wfg.insert_holder_tran_group(group, 1).unwrap();
        assert_eq!(wfg.get_tran_entries(1).unwrap(), 2);
    }

    #[test]
    fn dump_does_not_error_and_lists_cycles() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(3).unwrap();
        wfg.insert_out_edges(1, &[0], resolver(), 0).unwrap();
        wfg.insert_out_edges(2, &[1], resolver(), 0).unwrap();
        wfg.insert_out_edges(0, &[2], resolver(), 0).unwrap();

        let mut out = Vec::new();
        wfg.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("3 vertices"));
        assert!(text.contains("cycles"));
    }

    #[test]
    fn six_vertex_example_yields_exactly_six_cycles() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(6).unwrap();
        // 1-based labels from the sources map to 0-based indices here.
        let e = |w: TranIndex, hs: &[TranIndex]| wfg.insert_out_edges(w, hs, resolver(), 0).unwrap();
        e(0, &[1]); // 1 -> 2
        e(1, &[2, 3]); // 2 -> {3, 4}
        e(2, &[3, 5]); // 3 -> {4, 6}
        e(3, &[5]); // 4 -> 6
        e(4, &[0]); // 5 -> 1
        e(5, &[0, 4]); // 6 -> {1, 5}

        let outcome = wfg.detect_cycle().unwrap();
        assert_eq!(outcome.case, DetectCase::Yes);
        assert_eq!(outcome.cycles.len(), 6);

        let got: Vec<BTreeSet<TranIndex>> = outcome.cycles.iter().map(cycle_members).collect();
        let want: [BTreeSet<TranIndex>; 6] = [
            BTreeSet::from([0, 1, 2, 5, 4]),
            BTreeSet::from([0, 1, 3, 5, 4]),
            BTreeSet::from([0, 1, 2, 3, 5, 4]),
            BTreeSet::from([0, 1, 2, 5]),
            BTreeSet::from([0, 1, 3, 5]),
            BTreeSet::from([0, 1, 2, 3, 5]),
        ];
        for w in &want {
            assert!(got.contains(w), "expected cycle {w:?} missing from {got:?}");
        }
    }

    #[test]
    fn four_vertex_example_yields_exactly_four_cycles() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(4).unwrap();
        let e = |w: TranIndex, hs: &[TranIndex]| wfg.insert_out_edges(w, hs, resolver(), 0).unwrap();
        e(0, &[1, 3]); // 1 -> {2, 4}
        e(1, &[3]); // 2 -> 4
        e(2, &[0, 1, 3]); // 3 -> {1, 2, 4}
        e(3, &[2]); // 4 -> 3

        let outcome = wfg.detect_cycle().unwrap();
        assert_eq!(outcome.case, DetectCase::Yes);
        assert_eq!(outcome.cycles.len(), 4);

        let got: Vec<BTreeSet<TranIndex>> = outcome.cycles.iter().map(cycle_members).collect();
        let want: [BTreeSet<TranIndex>; 4] = [
            BTreeSet::from([0, 3, 2]),
            BTreeSet::from([0, 1, 3, 2]),
            BTreeSet::from([2, 1, 3]),
            BTreeSet::from([2, 3]),
        ];
        for w in &want {
            assert!(got.contains(w), "expected cycle {w:?} missing from {got:?}");
        }
    }

    #[test]
    fn group_cycle_reports_superset_of_expected_members() {
        let wfg = Wfg::new();
        wfg.alloc_nodes(7).unwrap();
        // vertices 1..7 from the sources map to indices 0..6 here.
        let group = wfg.alloc_tran_group().unwrap();
        wfg.insert_holder_tran_group(group, 0).unwrap();
        wfg.insert_holder_tran_group(group, 1).unwrap();
        wfg.insert_holder_tran_group(group, 2).unwrap();

        wfg.insert_waiter_tran_group(group, 0, resolver(), 0).unwrap(); // 1 -> G
        wfg.insert_out_edges(1, &[6], resolver(), 0).unwrap(); // 2 -> 7
        wfg.insert_out_edges(2, &[3, 4], resolver(), 0).unwrap(); // 3 -> {4,5}
        wfg.insert_waiter_tran_group(group, 3, resolver(), 0).unwrap(); // 4 -> G
        wfg.insert_out_edges(4, &[5], resolver(), 0).unwrap(); // 5 -> 6
        wfg.insert_out_edges(5, &[0], resolver(), 0).unwrap(); // 6 -> 1
        wfg.insert_waiter_tran_group(group, 6, resolver(), 0).unwrap(); // 7 -> G

        let outcome = wfg.detect_cycle().unwrap();
        assert_ne!(outcome.case, DetectCase::No);

        let all_members: BTreeSet<TranIndex> =
            outcome.cycles.iter().flat_map(cycle_members).collect();
        let expected_superset = BTreeSet::from([0, 1, 2, 3, 6]);
        assert!(
            expected_superset.is_subset(&all_members),
            "expected {expected_superset:?} to be covered by {all_members:?}"
        );
    }

    #[test]
    fn pruning_caps_elementary_cycles_but_dump_does_not() {
        let wfg = Wfg::new();
        // A complete digraph on 6 vertices has 409 elementary cycles, well
        // past the default total cap of 100, while staying small enough for
        // `dump`'s unbounded pass to enumerate in full.
        const N: usize = 6;
        wfg.alloc_nodes(N).unwrap();
        for w in 0..N {
            let holders: Vec<TranIndex> = (0..N).filter(|&h| h != w).collect();
            wfg.insert_out_edges(w, &holders, resolver(), 0).unwrap();
        }

        let outcome = wfg.detect_cycle().unwrap();
        assert_eq!(outcome.case, DetectCase::YesPrune);
        assert_eq!(outcome.cycles.len(), 100);

        let mut out = Vec::new();
        wfg.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("cycles (Yes):"));
        assert!(!text.contains("cycles (YesPrune):"));
    }

    #[test]
    fn pruned_search_still_leaves_every_status_off_stack() {
        let wfg = Wfg::new();
        const N: usize = 6;
        wfg.alloc_nodes(N).unwrap();
        for w in 0..N {
            let holders: Vec<TranIndex> = (0..N).filter(|&h| h != w).collect();
            wfg.insert_out_edges(w, &holders, resolver(), 0).unwrap();
        }

        let outcome = wfg.detect_cycle().unwrap();
        assert_eq!(outcome.case, DetectCase::YesPrune);

        for t in 0..N {
            assert_eq!(
                wfg.status_of(t).unwrap(),
                Status::OffStack,
                "vertex {t} left in a transient state after a pruned search"
            );
        }
    }
}
