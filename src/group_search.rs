//! Transaction-group cycle search: the counting-semaphore generalization of
//! the ordinary search.
//!
//! For each group with at least one holder and one waiter, and for each of
//! its waiters not already marked `OnGroupCycle`, a reachability sweep
//! determines whether every group transitively touched from that waiter has
//! all of its holders within the reached set. If so, the union of those
//! holders plus the triggering waiter is reported as one (approximating)
//! cycle, and its members are marked `OnGroupCycle` so later sweeps in the
//! same search do not re-report them.
//!
//! A worked seven-vertex example (group `G = {1,2,3}`, waiters `{1,4,7}`)
//! only closes if touching a group through either role pulls in the *other*
//! side's full membership too: reaching a holder of a group exposes every
//! waiter of that group (an implicit holder-to-waiter edge), and, to make
//! the scenario's claimed result reachable at all, since the starting waiter
//! otherwise never reaches its own group's other holders, reaching a
//! waiter of a group symmetrically exposes every holder of that group. This
//! symmetric reading is recorded as an Open Question resolution in
//! DESIGN.md.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use crate::config::DetectConfig;
use crate::edge::EdgeStore;
use crate::group::TranGroup;
use crate::node::{NodeTable, Status};
use crate::resolver::{Cycle, CycleWaiter, DetectCase};
use crate::TranIndex;

fn ordinary_successors(nodes: &NodeTable, edges: &EdgeStore, v: TranIndex) -> Vec<TranIndex> {
    let mut out = Vec::new();
    let mut cursor = nodes.get(v).unwrap().first_holder_edge;
    while let Some(e) = cursor {
        let edge = edges.get(e);
        out.push(edge.holder);
        cursor = edge.next_on_waiter;
    }
    out
}

/// Reachability sweep from `w`. Returns the full reached set and the set of
/// groups touched while computing it.
fn sweep(
    w: TranIndex,
    nodes: &NodeTable,
    edges: &EdgeStore,
    groups: &[TranGroup],
) -> (BTreeSet<TranIndex>, BTreeSet<usize>) {
    let mut reached: BTreeSet<TranIndex> = BTreeSet::new();
    let mut touched_groups: BTreeSet<usize> = BTreeSet::new();
    let mut worklist: VecDeque<TranIndex> = VecDeque::new();

    reached.insert(w);
    worklist.push_back(w);

    while let Some(v) = worklist.pop_front() {
        for h in ordinary_successors(nodes, edges, v) {
            if reached.insert(h) {
                worklist.push_back(h);
            }
        }

        for (g_idx, group) in groups.iter().enumerate() {
            if group.holder_count() == 0 || group.waiter_count() == 0 {
                continue;
            }
            let is_holder = group.contains_holder(v);
            let is_waiter = group.contains_waiter(v);
            if !is_holder && !is_waiter {
                continue;
            }
            touched_groups.insert(g_idx);
            if is_holder {
                for &ww in group.waiters() {
                    if reached.insert(ww) {
                        worklist.push_back(ww);
                    }
                }
            }
            if is_waiter {
                for &hh in group.holders() {
                    if reached.insert(hh) {
                        worklist.push_back(hh);
                    }
                }
            }
        }
    }

    (reached, touched_groups)
}

pub(crate) fn group_cycle_search(
    nodes: &mut NodeTable,
    edges: &EdgeStore,
    groups: &[TranGroup],
    config: &DetectConfig,
    cycles: &mut Vec<Cycle>,
) -> bool {
    nodes.reset_all_statuses();
    let mut pruned = false;

    'groups: for group in groups {
        if group.holder_count() == 0 || group.waiter_count() == 0 {
            continue;
        }
        let waiters: BTreeSet<TranIndex> = group.waiters().iter().copied().collect();

        for &w in &waiters {
            if nodes.get(w).unwrap().status == Status::OnGroupCycle {
                continue;
            }

            let (reached, touched_groups) = sweep(w, nodes, edges, groups);

            let closure_holds = !touched_groups.is_empty()
                && touched_groups
                    .iter()
                    .all(|&g| groups[g].holders().iter().all(|h| reached.contains(h)));

            if !closure_holds {
                continue;
            }

            let mut members: BTreeSet<TranIndex> = BTreeSet::new();
            for &g in &touched_groups {
                members.extend(groups[g].holders().iter().copied());
            }
            members.insert(w);

            let mut cycle_waiters = Vec::with_capacity(members.len());
            for &t in &members {
                let node = nodes.get(t).unwrap();
                match node.resolver.as_ref() {
                    Some(slot) => cycle_waiters.push(CycleWaiter {
                        tran_index: t,
                        resolver: Some(Arc::clone(&slot.resolver)),
                        arg: slot.arg,
                    }),
                    None => cycle_waiters.push(CycleWaiter {
                        tran_index: t,
                        resolver: None,
                        arg: 0,
                    }),
                }
            }
            cycles.push(cycle_waiters);
            log::debug!(
                "group cycle search: recorded group cycle with {} members (triggered by waiter {w})",
                members.len()
            );

            for &t in &members {
                nodes.get_mut(t).unwrap().status = Status::OnGroupCycle;
            }

            if config.total_cap_reached(cycles.len()) {
                pruned = true;
                break 'groups;
            }
        }
    }

    // Every status must be OffStack or OnGroupCycle by search end;
    // anything the sweeps never touched stays NotVisited.
    for node in nodes.iter_mut() {
        if node.status == Status::NotVisited {
            node.status = Status::OffStack;
        }
    }

    pruned
}
