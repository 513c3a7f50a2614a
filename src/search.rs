//! Ordinary elementary cycle search: a non-recursive DFS over the plain
//! waiter-to-holder edges, backed by an explicit stack of
//! `(vertex, current-holder-edge)` frames.

use std::sync::Arc;

use crate::config::DetectConfig;
use crate::edge::EdgeStore;
use crate::node::{NodeTable, Status};
use crate::resolver::{Cycle, CycleWaiter, DetectCase};
use crate::{EdgeIndex, TranIndex};

struct Frame {
    vertex: TranIndex,
    /// Next holder edge of `vertex` to examine, or `None` once exhausted.
    cursor: Option<EdgeIndex>,
}

/// Runs the search and returns `(case, cycles)`. Resets every status to
/// `NotVisited` on entry; every status is `OffStack` on return, including on
/// the pruned path, where the outer root loop and the DFS stack are cut
/// short with some vertices still `NotVisited`, `OnStack`, or `ReOnStack`.
/// The ordinary search never produces `OnGroupCycle`, so it leaves
/// everything `OffStack`.
pub(crate) fn ordinary_cycle_search(
    nodes: &mut NodeTable,
    edges: &EdgeStore,
    config: &DetectConfig,
) -> (DetectCase, Vec<Cycle>) {
    nodes.reset_all_statuses();

    let n = nodes.len();
    let mut cycles: Vec<Cycle> = Vec::new();
    let mut pruned = false;
    let mut next_cycle_group: i64 = 0;

    'roots: for root in 0..n {
        if nodes.get(root).expect("root in range").status != Status::NotVisited {
            continue;
        }

        let cycle_group_id = next_cycle_group;
        next_cycle_group += 1;
        let mut found_in_group: usize = 0;

        let mut stack: Vec<Frame> = Vec::new();
        nodes.get_mut(root).unwrap().status = Status::OnStack;
        stack.push(Frame {
            vertex: root,
            cursor: nodes.get(root).unwrap().first_holder_edge,
        });

        while let Some(frame) = stack.last_mut() {
            let Some(edge_idx) = frame.cursor else {
                let finished = stack.pop().expect("stack non-empty: just matched Some(frame)");
                nodes.get_mut(finished.vertex).unwrap().status = Status::OffStack;
                continue;
            };

            let edge = edges.get(edge_idx);
            let h = edge.holder;
            frame.cursor = edge.next_on_waiter;

            match nodes.get(h).expect("holder index in range").status {
                Status::NotVisited => {
                    nodes.get_mut(h).unwrap().status = Status::OnStack;
                    let cursor = nodes.get(h).unwrap().first_holder_edge;
                    stack.push(Frame { vertex: h, cursor });
                }
                Status::OnStack => {
                    let match_pos = stack
                        .iter()
                        .rposition(|f| f.vertex == h)
                        .expect("an OnStack vertex always has a frame on the current stack");

                    let mut cycle_waiters = Vec::with_capacity(stack.len() - match_pos);
                    for f in stack[match_pos..].iter().rev() {
                        let node = nodes.get(f.vertex).unwrap();
                        let slot = node
                            .resolver
                            .as_ref()
                            .expect("every vertex on a cycle has a holder edge and thus a resolver");
                        cycle_waiters.push(CycleWaiter {
                            tran_index: f.vertex,
                            resolver: Some(Arc::clone(&slot.resolver)),
                            arg: slot.arg,
                        });
                    }
                    for f in &stack[match_pos..] {
                        nodes.get_mut(f.vertex).unwrap().cycle_group = cycle_group_id;
                    }

                    cycles.push(cycle_waiters);
                    found_in_group += 1;
                    log::trace!(
                        "ordinary cycle search: recorded cycle #{} (root {})",
                        cycles.len(),
                        root
                    );

                    if config.total_cap_reached(cycles.len()) {
                        pruned = true;
                        break 'roots;
                    }
                }
                Status::ReOnStack => {
                    // Already on a previously recorded cycle through this
                    // outer root; nothing further to discover here.
                }
                Status::OffStack => {
                    let already_in_group = nodes.get(h).unwrap().cycle_group == cycle_group_id;
                    if already_in_group && !config.group_cap_reached(found_in_group) {
                        nodes.get_mut(h).unwrap().status = Status::ReOnStack;
                        let cursor = nodes.get(h).unwrap().first_holder_edge;
                        stack.push(Frame { vertex: h, cursor });
                    }
                }
                Status::OnGroupCycle => {
                    unreachable!(
                        "OnGroupCycle observed during the ordinary search; \
                         statuses are reset to NotVisited at the start of every search"
                    );
                }
            }
        }
    }

    // On the pruned path, `break 'roots` can leave later roots `NotVisited`
    // and the cut-short stack's vertices `OnStack`/`ReOnStack`. Every vertex
    // must be `OffStack` (or `OnGroupCycle`, never produced here) by search
    // end, so sweep any leftover marking before returning.
    for node in nodes.iter_mut() {
        if node.status != Status::OffStack {
            node.status = Status::OffStack;
        }
    }

    let case = if cycles.is_empty() {
        DetectCase::No
    } else if pruned {
        DetectCase::YesPrune
    } else {
        DetectCase::Yes
    };
    (case, cycles)
}
