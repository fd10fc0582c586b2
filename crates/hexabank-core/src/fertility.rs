// ─────────────────────────────────────────────────────────────────────
// Hexabank — Fertility Queue
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Worklist of cells that may still spawn neighbours.
//!
//! Doubly linked through a side table indexed by cell id: O(1) insert
//! and remove-by-id, O(n) snapshot in insertion order.

use crate::registry::CellId;

#[derive(Debug, Clone, Copy, Default)]
struct Link {
    prev: Option<CellId>,
    next: Option<CellId>,
    queued: bool,
}

#[derive(Debug, Default)]
pub struct FertilityQueue {
    links: Vec<Link>,
    head: Option<CellId>,
    tail: Option<CellId>,
    len: usize,
}

impl FertilityQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.links.get(id).is_some_and(|l| l.queued)
    }

    /// Append `id`. Returns `false` if it was already queued.
    pub fn insert(&mut self, id: CellId) -> bool {
        if self.contains(id) {
            return false;
        }
        if id >= self.links.len() {
            self.links.resize(id + 1, Link::default());
        }
        self.links[id] = Link {
            prev: self.tail,
            next: None,
            queued: true,
        };
        match self.tail {
            Some(tail) => self.links[tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        true
    }

    /// Unlink `id`. Returns `false` if it was not queued.
    pub fn remove(&mut self, id: CellId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let Link { prev, next, .. } = self.links[id];
        match prev {
            Some(p) => self.links[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.links[n].prev = prev,
            None => self.tail = prev,
        }
        self.links[id] = Link::default();
        self.len -= 1;
        true
    }

    /// Ids currently queued, oldest first. Later insertions do not
    /// affect the returned vector.
    pub fn snapshot(&self) -> Vec<CellId> {
        let mut ids = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(id) = cursor {
            ids.push(id);
            cursor = self.links[id].next;
        }
        ids
    }
}
