//! Backing stores for [`ReferenceMap`](super::ReferenceMap).
//!
//! [`LocalStore`] is a plain `RefCell<HashMap>`: it is `Send` but not `Sync`,
//! so a map built on it cannot be shared between threads without the caller
//! wrapping it in a lock. [`SharedStore`] is a `DashMap` whose individual
//! operations are safe to call concurrently. Neither offers atomic
//! read-modify-write across two calls.
use super::reference::Reference;
use dashmap::DashMap;
use std::{cell::RefCell, collections::HashMap};

pub trait ReferenceStore<V>: Default {
    fn insert(&self, key: String, reference: Reference<V>);

    fn lookup(&self, key: &str) -> Option<Reference<V>>;

    fn remove(&self, key: &str) -> bool;

    /// Removes `key` only if `predicate` holds for the entry currently stored
    /// under it.
    fn remove_if(&self, key: &str, predicate: impl Fn(&Reference<V>) -> bool) -> bool;

    /// Keeps the entries for which `keep` holds; returns how many were removed.
    fn retain(&self, keep: impl Fn(&Reference<V>) -> bool) -> usize;

    fn len(&self) -> usize;

    fn clear(&self);

    fn keys(&self) -> Vec<String>;
}

pub struct LocalStore<V> {
    map: RefCell<HashMap<String, Reference<V>>>,
}

impl<V> Default for LocalStore<V> {
    fn default() -> Self {
        Self {
            map: RefCell::new(HashMap::new()),
        }
    }
}

impl<V> ReferenceStore<V> for LocalStore<V> {
    fn insert(&self, key: String, reference: Reference<V>) {
        self.map.borrow_mut().insert(key, reference);
    }

    fn lookup(&self, key: &str) -> Option<Reference<V>> {
        self.map.borrow().get(key).cloned()
    }

    fn remove(&self, key: &str) -> bool {
        self.map.borrow_mut().remove(key).is_some()
    }

    fn remove_if(&self, key: &str, predicate: impl Fn(&Reference<V>) -> bool) -> bool {
        let mut map = self.map.borrow_mut();
        match map.get(key) {
            Some(r) if predicate(r) => {
                map.remove(key);
                true
            }
            _ => false,
        }
    }

    fn retain(&self, keep: impl Fn(&Reference<V>) -> bool) -> usize {
        let mut map = self.map.borrow_mut();
        let before = map.len();
        map.retain(|_, r| keep(r));
        before - map.len()
    }

    fn len(&self) -> usize {
        self.map.borrow().len()
    }

    fn clear(&self) {
        self.map.borrow_mut().clear();
    }

    fn keys(&self) -> Vec<String> {
        self.map.borrow().keys().cloned().collect()
    }
}

pub struct SharedStore<V> {
    map: DashMap<String, Reference<V>>,
}

impl<V> Default for SharedStore<V> {
    fn default() -> Self {
        Self {
            map: DashMap::new(),
        }
    }
}

impl<V> ReferenceStore<V> for SharedStore<V> {
    fn insert(&self, key: String, reference: Reference<V>) {
        self.map.insert(key, reference);
    }

    fn lookup(&self, key: &str) -> Option<Reference<V>> {
        // the shard guard must be released before any follow-up removal
        self.map.get(key).map(|r| r.value().clone())
    }

    fn remove(&self, key: &str) -> bool {
        self.map.remove(key).is_some()
    }

    fn remove_if(&self, key: &str, predicate: impl Fn(&Reference<V>) -> bool) -> bool {
        self.map.remove_if(key, |_, r| predicate(r)).is_some()
    }

    fn retain(&self, keep: impl Fn(&Reference<V>) -> bool) -> usize {
        let mut removed = 0;
        self.map.retain(|_, r| {
            let kept = keep(r);
            if !kept {
                removed += 1;
            }
            kept
        });
        removed
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn clear(&self) {
        self.map.clear();
    }

    fn keys(&self) -> Vec<String> {
        self.map.iter().map(|e| e.key().clone()).collect()
    }
}
