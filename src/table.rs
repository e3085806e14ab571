//! StrTable: flat open-addressing table of owned string keys and `i32` values.

use crate::error::TableError;
use crate::hash::{mix32, reduce};
use crate::observer::{GrowthEvent, GrowthObserver};
use core::fmt;
use core::mem;

/// Capacity of a freshly created table.
pub const INITIAL_CAPACITY: usize = 128;

/// Largest capacity `reduce` can address with a 32-bit table size.
pub const MAX_CAPACITY: usize = 1 << 31;

#[derive(Debug)]
struct Slot {
    key: String,
    value: i32,
}

/// Outcome of a linear probe for a key.
enum Probe {
    Occupied(usize),
    Vacant(usize),
    Exhausted,
}

pub struct StrTable {
    slots: Vec<Option<Slot>>,
    len: usize,
    observer: Option<Box<dyn GrowthObserver>>,
}

#[inline]
fn home(key: &str, capacity: usize) -> usize {
    reduce(mix32(key.as_bytes()), capacity as u32) as usize
}

fn alloc_slots(capacity: usize) -> Result<Vec<Option<Slot>>, TableError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(TableError::allocation("slot array"))?;
    slots.resize_with(capacity, || None);
    Ok(slots)
}

fn copy_key(key: &str) -> Result<String, TableError> {
    let mut owned = String::new();
    owned
        .try_reserve_exact(key.len())
        .map_err(TableError::allocation("key copy"))?;
    owned.push_str(key);
    Ok(owned)
}

/// Walk from the key's home slot until a match or an empty slot. Visits
/// each slot at most once.
fn find(slots: &[Option<Slot>], key: &str) -> Probe {
    let mask = slots.len() - 1;
    let mut idx = home(key, slots.len());
    for _ in 0..slots.len() {
        match &slots[idx] {
            None => return Probe::Vacant(idx),
            Some(slot) if slot.key == key => return Probe::Occupied(idx),
            Some(_) => idx = (idx + 1) & mask,
        }
    }
    Probe::Exhausted
}

/// Put an entry known to be absent into the first free slot from its home.
fn place(slots: &mut [Option<Slot>], slot: Slot) {
    let mask = slots.len() - 1;
    let mut idx = home(&slot.key, slots.len());
    while slots[idx].is_some() {
        idx = (idx + 1) & mask;
    }
    slots[idx] = Some(slot);
}

impl StrTable {
    /// Create an empty table with `INITIAL_CAPACITY` slots.
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(INITIAL_CAPACITY);
        slots.resize_with(INITIAL_CAPACITY, || None);
        Self {
            slots,
            len: 0,
            observer: None,
        }
    }

    /// Like `new`, but reports allocation failure instead of aborting.
    pub fn try_new() -> Result<Self, TableError> {
        Ok(Self {
            slots: alloc_slots(INITIAL_CAPACITY)?,
            len: 0,
            observer: None,
        })
    }

    /// Builder form of `set_observer`.
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: GrowthObserver + 'static,
    {
        self.set_observer(observer);
        self
    }

    /// Install the observer notified on every growth, replacing any previous one.
    pub fn set_observer<O>(&mut self, observer: O)
    where
        O: GrowthObserver + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.slots.len() as f64
    }

    fn needs_growth(&self) -> bool {
        self.len * 2 >= self.slots.len()
    }

    /// Insert `key` or overwrite its value.
    ///
    /// Returns the previous value when the key was already present. The
    /// load factor is checked before the key is looked up, so any call made
    /// while the table is at least half full doubles it first, updates
    /// included.
    pub fn set(&mut self, key: &str, value: i32) -> Result<Option<i32>, TableError> {
        if self.needs_growth() {
            self.grow()?;
        }
        match find(&self.slots, key) {
            Probe::Occupied(idx) => Ok(self.slots[idx]
                .as_mut()
                .map(|slot| mem::replace(&mut slot.value, value))),
            Probe::Vacant(idx) => {
                let key = copy_key(key)?;
                self.slots[idx] = Some(Slot { key, value });
                self.len += 1;
                Ok(None)
            }
            Probe::Exhausted => unreachable!("table below half load has a free slot"),
        }
    }

    /// Value stored for `key`, if any. Never mutates the table.
    pub fn get(&self, key: &str) -> Option<i32> {
        match find(&self.slots, key) {
            Probe::Occupied(idx) => self.slots[idx].as_ref().map(|s| s.value),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Positional accessor: the entry in slot `index`, or `None` when the
    /// slot is empty or `index >= capacity()`.
    ///
    /// Indices are stable between mutations; growth reshuffles every entry.
    pub fn probe(&self, index: usize) -> Option<(&str, i32)> {
        self.slots
            .get(index)?
            .as_ref()
            .map(|s| (s.key.as_str(), s.value))
    }

    /// Occupied entries in slot order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            table: self,
            next: 0,
        }
    }

    /// Keys that share a home slot with an earlier key, ignoring the probing
    /// that already resolved them. Diagnostic only.
    pub fn collisions(&self) -> u32 {
        let capacity = self.slots.len();
        let mut counts = vec![0u32; capacity];
        for slot in self.slots.iter().flatten() {
            counts[home(&slot.key, capacity)] += 1;
        }
        counts.iter().map(|&c| c.saturating_sub(1)).sum()
    }

    /// Double the capacity and re-place every entry against the new size.
    fn grow(&mut self) -> Result<(), TableError> {
        let old_capacity = self.slots.len();
        let new_capacity = old_capacity
            .checked_mul(2)
            .filter(|&c| c <= MAX_CAPACITY)
            .ok_or(TableError::CapacityOverflow {
                capacity: old_capacity,
            })?;

        let report = self.observer.is_some() || tracing::enabled!(tracing::Level::DEBUG);
        let collisions_before = if report { self.collisions() } else { 0 };

        let mut slots = alloc_slots(new_capacity)?;
        for slot in mem::take(&mut self.slots).into_iter().flatten() {
            place(&mut slots, slot);
        }
        self.slots = slots;

        if report {
            let event = GrowthEvent {
                old_capacity,
                new_capacity,
                entries: self.len,
                collisions_before,
                collisions_after: self.collisions(),
            };
            tracing::debug!(
                old_capacity,
                new_capacity,
                entries = event.entries,
                collisions_before = event.collisions_before,
                collisions_after = event.collisions_after,
                "table grown"
            );
            if let Some(observer) = self.observer.as_mut() {
                observer.on_growth(&event);
            }
        }
        Ok(())
    }
}

impl Default for StrTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StrTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrTable")
            .field("len", &self.len)
            .field("capacity", &self.slots.len())
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

/// Iterator over occupied slots of a `StrTable`, in slot order.
pub struct Iter<'a> {
    table: &'a StrTable,
    next: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, i32);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.table.capacity() {
            let idx = self.next;
            self.next += 1;
            if let Some(entry) = self.table.probe(idx) {
                return Some(entry);
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a StrTable {
    type Item = (&'a str, i32);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{BTreeSet, HashMap};
    use std::rc::Rc;

    fn key(i: usize) -> String {
        format!("k{i}")
    }

    /// Brute-force primary-slot contention for `keys` at `capacity`.
    fn expected_collisions<'a>(keys: impl IntoIterator<Item = &'a str>, capacity: usize) -> u32 {
        let mut per_home: HashMap<usize, u32> = HashMap::new();
        for k in keys {
            *per_home.entry(home(k, capacity)).or_default() += 1;
        }
        per_home.values().map(|&c| c - 1).sum()
    }

    /// Invariant: a fresh table is empty with the initial capacity.
    #[test]
    fn fresh_table_shape() {
        let t = StrTable::new();
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
        assert_eq!(t.iter().count(), 0);
        assert_eq!(t.collisions(), 0);

        let t = StrTable::try_new().unwrap();
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
    }

    /// Invariant: a stored key reads back its value and lands in its home slot
    /// when nothing else is there.
    #[test]
    fn set_then_get_lands_in_home_slot() {
        let mut t = StrTable::new();
        assert_eq!(t.set("the quick", 1).unwrap(), None);
        assert_eq!(t.get("the quick"), Some(1));
        assert_eq!(t.len(), 1);
        assert_eq!(t.probe(54), Some(("the quick", 1)));
    }

    /// Invariant: overwriting returns the previous value and keeps `len`.
    #[test]
    fn update_replaces_value() {
        let mut t = StrTable::new();
        assert_eq!(t.set("a", 5).unwrap(), None);
        assert_eq!(t.set("a", 9).unwrap(), Some(5));
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("a"), Some(9));
    }

    /// Invariant: lookups of absent keys miss, on empty and populated tables.
    #[test]
    fn missing_keys() {
        let mut t = StrTable::new();
        assert_eq!(t.get("missing"), None);
        t.set("present", 3).unwrap();
        assert_eq!(t.get("missing"), None);
        assert!(!t.contains_key("missing"));
        assert!(t.contains_key("present"));
        assert_eq!(t.get(""), None);
    }

    /// Invariant: the empty string is an ordinary key.
    #[test]
    fn empty_key() {
        let mut t = StrTable::new();
        t.set("", 7).unwrap();
        assert_eq!(t.get(""), Some(7));
        assert_eq!(t.probe(0), Some(("", 7)));
    }

    /// Invariant: keys sharing a home slot are kept apart by linear probing and
    /// counted by the collision diagnostic.
    #[test]
    fn shared_home_slot_probes_forward() {
        let mut by_home: HashMap<usize, String> = HashMap::new();
        let (first, second) = (0..)
            .map(key)
            .find_map(|k| {
                let h = home(&k, INITIAL_CAPACITY);
                match by_home.get(&h) {
                    Some(prev) => Some((prev.clone(), k)),
                    None => {
                        by_home.insert(h, k);
                        None
                    }
                }
            })
            .unwrap();

        let mut t = StrTable::new();
        t.set(&first, 1).unwrap();
        t.set(&second, 2).unwrap();
        assert_eq!(t.get(&first), Some(1));
        assert_eq!(t.get(&second), Some(2));
        assert_eq!(t.collisions(), 1);

        let h = home(&first, INITIAL_CAPACITY);
        assert_eq!(t.probe(h), Some((first.as_str(), 1)));
        assert_eq!(t.probe((h + 1) % INITIAL_CAPACITY), Some((second.as_str(), 2)));
    }

    /// Invariant: the 65th distinct key doubles capacity; 64 keys sit at load 0.5.
    #[test]
    fn growth_at_half_load() {
        let mut t = StrTable::new();
        for i in 0..64 {
            t.set(&key(i), i as i32).unwrap();
        }
        assert_eq!(t.capacity(), 128);
        assert_eq!(t.load_factor(), 0.5);

        t.set(&key(64), 64).unwrap();
        assert_eq!(t.capacity(), 256);
        assert_eq!(t.len(), 65);
        for i in 0..65 {
            assert_eq!(t.get(&key(i)), Some(i as i32));
        }
    }

    /// Invariant: the load factor is checked before the lookup, so an update
    /// made at load 0.5 doubles the table and keeps every value.
    #[test]
    fn update_at_half_load_grows() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let mut t = StrTable::new().with_observer(move |e: &GrowthEvent| {
            sink.borrow_mut().push(*e);
        });
        for i in 0..64 {
            t.set(&key(i), 0).unwrap();
        }
        assert_eq!(t.capacity(), 128);

        assert_eq!(t.set(&key(10), 1).unwrap(), Some(0));
        assert_eq!(t.capacity(), 256);
        assert_eq!(t.len(), 64);
        assert_eq!(events.borrow().len(), 1);
        assert_eq!(t.get(&key(10)), Some(1));
        for i in (0..64).filter(|&i| i != 10) {
            assert_eq!(t.get(&key(i)), Some(0));
        }

        // Below half load again: updates leave the capacity alone.
        t.set(&key(20), 2).unwrap();
        assert_eq!(t.capacity(), 256);
    }

    /// Invariant: the observer sees one event per doubling with the
    /// contention measured before and after the rehash.
    #[test]
    fn observer_reports_growth() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let mut t = StrTable::new().with_observer(move |e: &GrowthEvent| {
            sink.borrow_mut().push(*e);
        });

        let keys: Vec<String> = (0..64).map(key).collect();
        for k in &keys {
            t.set(k, 1).unwrap();
        }
        assert!(events.borrow().is_empty());
        let before = t.collisions();

        t.set("one more", 1).unwrap();
        let events = events.borrow();
        assert_eq!(events.len(), 1);
        let e = events[0];
        assert_eq!(e.old_capacity, 128);
        assert_eq!(e.new_capacity, 256);
        assert_eq!(e.entries, 64);
        assert_eq!(e.collisions_before, before);
        assert_eq!(
            e.collisions_after,
            expected_collisions(keys.iter().map(String::as_str), 256)
        );
    }

    /// Invariant: the diagnostic matches a brute-force count and does not
    /// change the table.
    #[test]
    fn collisions_match_brute_force() {
        let mut t = StrTable::new();
        let keys: Vec<String> = (0..50).map(|i| format!("word{i} next{i}")).collect();
        for k in &keys {
            t.set(k, 1).unwrap();
        }
        let snapshot = |t: &StrTable| -> Vec<Option<(String, i32)>> {
            (0..t.capacity())
                .map(|i| t.probe(i).map(|(k, v)| (k.to_string(), v)))
                .collect()
        };
        let before = snapshot(&t);
        assert_eq!(
            t.collisions(),
            expected_collisions(keys.iter().map(String::as_str), t.capacity())
        );
        assert_eq!(before, snapshot(&t));
    }

    /// Invariant: `probe` past the end is `None`; `iter` yields exactly the
    /// occupied slots.
    #[test]
    fn enumeration() {
        let mut t = StrTable::new();
        for i in 0..200 {
            t.set(&key(i), i as i32).unwrap();
        }
        assert_eq!(t.probe(t.capacity()), None);
        assert_eq!(t.probe(usize::MAX), None);

        let by_probe: BTreeSet<(String, i32)> = (0..t.capacity())
            .filter_map(|i| t.probe(i))
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let by_iter: BTreeSet<(String, i32)> =
            t.iter().map(|(k, v)| (k.to_string(), v)).collect();
        assert_eq!(by_probe.len(), 200);
        assert_eq!(by_probe, by_iter);
        assert_eq!((&t).into_iter().count(), t.len());
    }

    /// Invariant: capacity stays a power of two and the table stays at most
    /// half full after any number of inserts.
    #[test]
    fn capacity_tracks_len() {
        let mut t = StrTable::new();
        let mut last = t.capacity();
        for i in 0..5_000 {
            t.set(&key(i), 0).unwrap();
            let cap = t.capacity();
            assert!(cap.is_power_of_two());
            assert!(cap == last || cap == last * 2);
            assert!(t.len() * 2 <= cap);
            last = cap;
        }
        assert_eq!(t.capacity(), 16_384);
    }

    #[test]
    fn debug_output() {
        let mut t = StrTable::new();
        t.set("x", 1).unwrap();
        assert_eq!(
            format!("{t:?}"),
            "StrTable { len: 1, capacity: 128, observed: false }"
        );
    }

    #[test]
    fn error_messages() {
        let e = TableError::CapacityOverflow { capacity: MAX_CAPACITY };
        assert_eq!(e.to_string(), "cannot grow past 2147483648 slots");
    }
}
