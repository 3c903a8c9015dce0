//! Name-keyed maps of reclaimable references.
//!
//! A [`ReferenceMap`] is parameterized on two independent axes:
//!
//! - **Strength** ([`Strength`]): weak entries vanish as soon as the last
//!   handle outside the map is dropped; soft entries stay until
//!   [`ReferenceMap::reclaim_soft`] is called while nothing else holds them.
//! - **Backing store** ([`ReferenceStore`]): [`LocalStore`] for a single
//!   owner, [`SharedStore`] for concurrent `put`/`get` without external
//!   locking.
//!
//! A lookup that finds a reclaimed referent behaves exactly like a miss and
//! drops the stale entry on the way out.
//!
//! There is no tracing collector behind these references. Weak entries are
//! reclaimed through reference counting. Soft entries are reclaimed only when
//! the owner reports memory pressure by calling `reclaim_soft`.
use std::{marker::PhantomData, sync::Arc};

mod reference;
mod store;

pub use reference::{Reference, Strength};
pub use store::{LocalStore, ReferenceStore, SharedStore};

pub struct ReferenceMap<V, S = LocalStore<V>> {
    strength: Strength,
    store: S,
    _marker: PhantomData<fn() -> V>,
}

pub type LocalReferenceMap<V> = ReferenceMap<V, LocalStore<V>>;
pub type SharedReferenceMap<V> = ReferenceMap<V, SharedStore<V>>;

impl<V, S: ReferenceStore<V>> ReferenceMap<V, S> {
    pub fn new(strength: Strength) -> Self {
        Self {
            strength,
            store: S::default(),
            _marker: PhantomData,
        }
    }

    pub fn weak() -> Self {
        Self::new(Strength::Weak)
    }

    pub fn soft() -> Self {
        Self::new(Strength::Soft)
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }

    /// Stores `value` under `name`, replacing whatever was there.
    pub fn put(&self, name: impl Into<String>, value: &Arc<V>) {
        self.store
            .insert(name.into(), Reference::new(self.strength, value));
    }

    /// Returns the live referent stored under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<V>> {
        let reference = self.store.lookup(name)?;
        match reference.get() {
            Some(value) => Some(value),
            None => {
                // another thread may have replaced the entry since the lookup
                if self.store.remove_if(name, Reference::is_reclaimed) {
                    tracing::trace!("purged reclaimed entry for {name}");
                }
                None
            }
        }
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.store
            .lookup(name)
            .is_some_and(|r| !r.is_reclaimed())
    }

    pub fn remove(&self, name: &str) -> bool {
        self.store.remove(name)
    }

    /// Number of entries, including reclaimed ones not yet purged.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    /// Drops every entry whose referent has already been reclaimed.
    pub fn purge_stale(&self) -> usize {
        let purged = self.store.retain(|r| !r.is_reclaimed());
        if purged > 0 {
            tracing::trace!(purged, "purged reclaimed entries");
        }
        purged
    }

    /// Memory-pressure signal: clears soft entries that nothing outside the
    /// map refers to. Weak entries are untouched.
    pub fn reclaim_soft(&self) -> usize {
        let reclaimed = self.store.retain(|r| !r.is_softly_reachable_only());
        tracing::debug!(reclaimed, strength = %self.strength, "reclaimed soft entries");
        reclaimed
    }
}

impl<V, S: ReferenceStore<V>> Default for ReferenceMap<V, S> {
    fn default() -> Self {
        Self::new(Strength::Weak)
    }
}

impl<V, S: ReferenceStore<V>> std::fmt::Debug for ReferenceMap<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceMap")
            .field("strength", &self.strength)
            .field("len", &self.len())
            .finish()
    }
}
