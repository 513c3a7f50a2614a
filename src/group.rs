use crate::TranIndex;

/// A transaction group: the set of transactions jointly holding, or waiting
/// on, slots of a counting semaphore. Holder and waiter membership are
/// modeled as plain `Vec`s rather than hand-threaded singly linked lists;
/// prepend is `Vec::insert(0, _)` and "remove the first occurrence" is
/// `position().map(|i| remove(i))`, which gives the same externally
/// observable semantics (LIFO prepend, remove-first-occurrence) without
/// reinventing a linked list the standard library already provides an
/// index-stable substitute for.
pub(crate) struct TranGroup {
    holders: Vec<TranIndex>,
    waiters: Vec<TranIndex>,
}

impl TranGroup {
    pub(crate) fn new() -> Self {
        Self {
            holders: Vec::new(),
            waiters: Vec::new(),
        }
    }

    pub(crate) fn holders(&self) -> &[TranIndex] {
        &self.holders
    }

    pub(crate) fn waiters(&self) -> &[TranIndex] {
        &self.waiters
    }

    pub(crate) fn holder_count(&self) -> usize {
        self.holders.len()
    }

    pub(crate) fn waiter_count(&self) -> usize {
        self.waiters.len()
    }

    pub(crate) fn insert_holder(&mut self, t: TranIndex) {
        self.holders.insert(0, t);
    }

    /// Removes the first occurrence of `t`, returning whether it was present.
    pub(crate) fn remove_holder(&mut self, t: TranIndex) -> bool {
        match self.holders.iter().position(|&h| h == t) {
            Some(idx) => {
                self.holders.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn insert_waiter(&mut self, t: TranIndex) {
        self.waiters.insert(0, t);
    }

    pub(crate) fn remove_waiter(&mut self, t: TranIndex) -> bool {
        match self.waiters.iter().position(|&w| w == t) {
            Some(idx) => {
                self.waiters.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains_holder(&self, t: TranIndex) -> bool {
        self.holders.contains(&t)
    }

    pub(crate) fn contains_waiter(&self, t: TranIndex) -> bool {
        self.waiters.contains(&t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_prepends_and_remove_drops_first_occurrence() {
        let mut g = TranGroup::new();
        g.insert_holder(1);
        g.insert_holder(2);
        g.insert_holder(3);
        assert_eq!(g.holders(), &[3, 2, 1]);

        assert!(g.remove_holder(2));
        assert_eq!(g.holders(), &[3, 1]);
        assert!(!g.remove_holder(2));
    }

    #[test]
    fn holder_and_waiter_membership_are_independent() {
        let mut g = TranGroup::new();
        g.insert_holder(1);
        g.insert_waiter(1);
        assert!(g.contains_holder(1));
        assert!(g.contains_waiter(1));

        g.remove_holder(1);
        assert!(!g.contains_holder(1));
        assert!(g.contains_waiter(1));
    }
}
