//! Indexed priority frontier.
//!
//! A binary heap paired with an item -> slot index, so an item is present at
//! most once and can be re-prioritised or removed in `O(log n)`. Entries with
//! equal priority leave in insertion order.

use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::hash::Hash;

/// Which entry `get` returns first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Smallest priority first.
    Ascending,
    /// Largest priority first.
    Descending,
    /// Insertion order; priorities are stored but ignored.
    Fifo,
}

#[derive(Debug, Clone)]
struct Entry<T, P> {
    item: T,
    priority: P,
    seq: u64,
}

#[derive(Debug, Clone)]
pub struct Frontier<T, P> {
    heap: Vec<Entry<T, P>>,
    slots: FxHashMap<T, usize>,
    order: Order,
    next_seq: u64,
}

impl<T, P> Frontier<T, P>
where
    T: Copy + Eq + Hash,
    P: Copy + PartialOrd,
{
    pub fn new(order: Order) -> Self {
        Frontier {
            heap: Vec::new(),
            slots: FxHashMap::default(),
            order,
            next_seq: 0,
        }
    }

    pub fn ascending() -> Self {
        Self::new(Order::Ascending)
    }

    pub fn fifo() -> Self {
        Self::new(Order::Fifo)
    }

    pub fn order(&self) -> Order {
        self.order
    }

    /// Inserts `item`, or moves an existing entry to `priority` if that is
    /// strictly better under this frontier's order. Returns whether the
    /// frontier changed.
    pub fn put(&mut self, item: T, priority: P) -> bool {
        match self.slots.get(&item) {
            None => {
                self.push(item, priority);
                true
            }
            Some(&slot) => {
                let current = self.heap[slot].priority;
                if self.is_better(priority, current) {
                    self.reprioritise(slot, priority);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Inserts `item`, or moves an existing entry to `priority` whether it
    /// is better or worse.
    pub fn update(&mut self, item: T, priority: P) {
        match self.slots.get(&item) {
            None => self.push(item, priority),
            Some(&slot) => self.reprioritise(slot, priority),
        }
    }

    /// Removes and returns the first item.
    pub fn get(&mut self) -> Option<T> {
        self.pop().map(|(item, _)| item)
    }

    /// Removes and returns the first item with its priority.
    pub fn pop(&mut self) -> Option<(T, P)> {
        self.remove_slot(0).map(|entry| (entry.item, entry.priority))
    }

    pub fn peek(&self) -> Option<(T, P)> {
        self.heap.first().map(|e| (e.item, e.priority))
    }

    /// Removes `item` if present, returning its priority.
    pub fn remove(&mut self, item: &T) -> Option<P> {
        let slot = *self.slots.get(item)?;
        self.remove_slot(slot).map(|entry| entry.priority)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.slots.contains_key(item)
    }

    pub fn priority_of(&self, item: &T) -> Option<P> {
        self.slots.get(item).map(|&slot| self.heap[slot].priority)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.slots.clear();
    }

    fn push(&mut self, item: T, priority: P) {
        let seq = self.bump_seq();
        self.heap.push(Entry { item, priority, seq });
        let slot = self.heap.len() - 1;
        self.slots.insert(item, slot);
        self.sift_up(slot);
    }

    // A re-prioritised entry queues behind existing entries of equal priority.
    fn reprioritise(&mut self, slot: usize, priority: P) {
        let seq = self.bump_seq();
        self.heap[slot].priority = priority;
        self.heap[slot].seq = seq;
        let slot = self.sift_up(slot);
        self.sift_down(slot);
    }

    fn remove_slot(&mut self, slot: usize) -> Option<Entry<T, P>> {
        if slot >= self.heap.len() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(slot, last);
        let entry = self.heap.pop()?;
        self.slots.remove(&entry.item);
        if slot < self.heap.len() {
            let slot = self.sift_up(slot);
            self.sift_down(slot);
        }
        Some(entry)
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn is_better(&self, candidate: P, current: P) -> bool {
        match self.order {
            Order::Ascending => candidate < current,
            Order::Descending => candidate > current,
            Order::Fifo => false,
        }
    }

    /// Whether the entry in slot `a` leaves before the one in slot `b`.
    fn precedes(&self, a: usize, b: usize) -> bool {
        let (a, b) = (&self.heap[a], &self.heap[b]);
        let by_priority = match self.order {
            Order::Ascending => a.priority.partial_cmp(&b.priority),
            Order::Descending => b.priority.partial_cmp(&a.priority),
            Order::Fifo => Some(Ordering::Equal),
        };
        match by_priority.unwrap_or(Ordering::Equal) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => a.seq < b.seq,
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.slots.insert(self.heap[a].item, a);
        self.slots.insert(self.heap[b].item, b);
    }

    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.precedes(slot, parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot
    }

    fn sift_down(&mut self, mut slot: usize) -> usize {
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut first = slot;
            if left < self.heap.len() && self.precedes(left, first) {
                first = left;
            }
            if right < self.heap.len() && self.precedes(right, first) {
                first = right;
            }
            if first == slot {
                return slot;
            }
            self.swap(slot, first);
            slot = first;
        }
    }
}
