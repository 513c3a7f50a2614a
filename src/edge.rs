use crate::{EdgeIndex, TranIndex};

/// A directed `waiter -> holder` relation. Simultaneously threaded onto two
/// independent intrusive doubly linked lists: the waiter's holder list
/// (`*_on_waiter`) and the holder's waiter list (`*_on_holder`). The
/// single-list intrusive pattern is generalized here to two lists per
/// edge, so the links are not expressed through a shared `IntrusiveNode`
/// trait but spelled out directly.
pub(crate) struct Edge {
    pub(crate) waiter: TranIndex,
    pub(crate) holder: TranIndex,
    pub(crate) next_on_waiter: Option<EdgeIndex>,
    pub(crate) prev_on_waiter: Option<EdgeIndex>,
    pub(crate) next_on_holder: Option<EdgeIndex>,
    pub(crate) prev_on_holder: Option<EdgeIndex>,
}

/// Arena of edges with free-slot recycling, mirroring a buffer pool's
/// slot-reuse idiom rather than ever-growing and never reclaiming storage.
pub(crate) struct EdgeStore {
    slots: Vec<Option<Edge>>,
    free_list: Vec<EdgeIndex>,
    count: usize,
}

impl EdgeStore {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            count: 0,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.count = 0;
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn get(&self, e: EdgeIndex) -> &Edge {
        self.slots[e].as_ref().expect("dangling edge index")
    }

    pub(crate) fn get_mut(&mut self, e: EdgeIndex) -> &mut Edge {
        self.slots[e].as_mut().expect("dangling edge index")
    }

    pub(crate) fn alloc(&mut self, waiter: TranIndex, holder: TranIndex) -> EdgeIndex {
        let edge = Edge {
            waiter,
            holder,
            next_on_waiter: None,
            prev_on_waiter: None,
            next_on_holder: None,
            prev_on_holder: None,
        };
        self.count += 1;
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(edge);
            idx
        } else {
            self.slots.push(Some(edge));
            self.slots.len() - 1
        }
    }

    pub(crate) fn free(&mut self, e: EdgeIndex) {
        assert!(self.slots[e].is_some(), "double free of edge {e}");
        self.slots[e] = None;
        self.free_list.push(e);
        self.count -= 1;
    }
}
