use super::{TypeLoaderResolver, TypeResolver};
use crate::{
    cache::{LocalStore, ReferenceMap, ReferenceStore, SharedStore},
    error::TypeNotFoundError,
    metrics::{CacheCounters, CacheStat},
    types::{TypeDescription, TypeHandle},
};
use std::fmt::{self, Debug, Formatter};

/// Consults a [`ReferenceMap`] before falling back to `delegate`.
///
/// Only successful resolutions are stored; an error from the delegate is
/// returned as-is and leaves the cache untouched.
pub struct CachingResolver<D, S> {
    delegate: D,
    cache: ReferenceMap<TypeDescription, S>,
    counters: CacheCounters,
}

pub type LocalCachingResolver = CachingResolver<TypeLoaderResolver, LocalStore<TypeDescription>>;
pub type ConcurrentCachingResolver =
    CachingResolver<TypeLoaderResolver, SharedStore<TypeDescription>>;

impl<D, S> CachingResolver<D, S>
where
    D: TypeResolver,
    S: ReferenceStore<TypeDescription>,
{
    pub fn new(delegate: D, cache: ReferenceMap<TypeDescription, S>) -> Self {
        Self {
            delegate,
            cache,
            counters: CacheCounters::new(),
        }
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn cache(&self) -> &ReferenceMap<TypeDescription, S> {
        &self.cache
    }

    pub fn stats(&self) -> CacheStat {
        self.counters.snapshot(self.cache.len())
    }
}

impl<D, S> TypeResolver for CachingResolver<D, S>
where
    D: TypeResolver,
    S: ReferenceStore<TypeDescription>,
{
    fn resolve(&self, name: &str) -> Result<TypeHandle, TypeNotFoundError> {
        if let Some(handle) = self.cache.get(name) {
            self.counters.record_hit();
            tracing::trace!("cache hit for {name}");
            return Ok(handle);
        }

        self.counters.record_miss();
        tracing::trace!("cache miss for {name}");
        let handle = self
            .delegate
            .resolve(name)
            .inspect_err(|e| {
                tracing::debug!("not caching failed resolution: {e}");
            })?;
        self.cache.put(name, &handle);
        Ok(handle)
    }
}

impl<D: Debug, S: ReferenceStore<TypeDescription>> Debug for CachingResolver<D, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingResolver")
            .field("delegate", &self.delegate)
            .field("cache", &self.cache)
            .finish()
    }
}
