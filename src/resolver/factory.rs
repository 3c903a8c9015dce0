//! Construction of the five named resolver configurations.
//!
//! | Kind | Function | Cache |
//! |---|---|---|
//! | `no-cache` | [`cache_disabled`] | none |
//! | `weak-cache` | [`weak_caching_resolver`] | weak, single owner |
//! | `soft-cache` | [`soft_caching_resolver`] | soft, single owner |
//! | `weak-cache-concurrent` | [`weak_caching_concurrent_resolver`] | weak, concurrent |
//! | `soft-cache-concurrent` | [`soft_caching_concurrent_resolver`] | soft, concurrent |
//!
//! Every function picks its loader through [`default_loader`] exactly once,
//! at construction.
//!
//! ## Environment Variables
//!
//! - `TYPE_RESOLVERS_CACHE`: resolver kind used by [`ResolverKind::from_env`],
//!   one of the kebab-case names above.
use super::{
    CachingResolver, ConcurrentCachingResolver, ConcurrentResolver, LocalCachingResolver,
    Resolver, TypeLoaderResolver,
};
use crate::{
    cache::{ReferenceMap, Strength},
    error::ConfigError,
    loader::{defining_loader, LoaderContext, SharedLoader, TypeLoader},
    metrics::CacheStat,
};
use serde::{Deserialize, Serialize};
use std::{
    env::{self, VarError},
    fmt::{self, Display, Formatter},
    str::FromStr,
};

pub const CACHE_ENV_VAR: &str = "TYPE_RESOLVERS_CACHE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverKind {
    NoCache,
    WeakCache,
    SoftCache,
    #[default]
    WeakCacheConcurrent,
    SoftCacheConcurrent,
}

impl ResolverKind {
    pub const ALL: [ResolverKind; 5] = [
        ResolverKind::NoCache,
        ResolverKind::WeakCache,
        ResolverKind::SoftCache,
        ResolverKind::WeakCacheConcurrent,
        ResolverKind::SoftCacheConcurrent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResolverKind::NoCache => "no-cache",
            ResolverKind::WeakCache => "weak-cache",
            ResolverKind::SoftCache => "soft-cache",
            ResolverKind::WeakCacheConcurrent => "weak-cache-concurrent",
            ResolverKind::SoftCacheConcurrent => "soft-cache-concurrent",
        }
    }

    pub fn strength(self) -> Option<Strength> {
        match self {
            ResolverKind::NoCache => None,
            ResolverKind::WeakCache | ResolverKind::WeakCacheConcurrent => Some(Strength::Weak),
            ResolverKind::SoftCache | ResolverKind::SoftCacheConcurrent => Some(Strength::Soft),
        }
    }

    pub fn is_concurrent(self) -> bool {
        matches!(
            self,
            ResolverKind::WeakCacheConcurrent | ResolverKind::SoftCacheConcurrent
        )
    }

    /// Reads [`CACHE_ENV_VAR`]. `Ok(None)` when it is unset or empty.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        match env::var(CACHE_ENV_VAR) {
            Ok(v) if v.trim().is_empty() => Ok(None),
            Ok(v) => v.parse().map(Some),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(raw)) => Err(ConfigError::UnknownResolverKind(
                raw.to_string_lossy().into_owned(),
            )),
        }
    }
}

impl FromStr for ResolverKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownResolverKind(s.to_string()))
    }
}

impl Display for ResolverKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the loader a new resolver will hold: `explicit` if given, else the
/// context loader, else the [`defining_loader`].
pub fn default_loader(explicit: Option<SharedLoader>, ctx: &LoaderContext) -> SharedLoader {
    if let Some(loader) = explicit {
        tracing::debug!(loader = %loader.id(), "using explicit type loader");
        return loader;
    }

    if let Some(loader) = ctx.context_loader() {
        tracing::debug!(loader = %loader.id(), "using context type loader");
        return loader.clone();
    }

    let loader = defining_loader();
    tracing::debug!(loader = %loader.id(), "using defining type loader");
    loader
}

pub fn cache_disabled(loader: Option<SharedLoader>, ctx: &LoaderContext) -> TypeLoaderResolver {
    TypeLoaderResolver::new(default_loader(loader, ctx))
}

/// Weak, single-owner cache. Entries go away with the last outside handle,
/// which suits loaders that may themselves be discarded.
pub fn weak_caching_resolver(
    loader: Option<SharedLoader>,
    ctx: &LoaderContext,
) -> LocalCachingResolver {
    CachingResolver::new(cache_disabled(loader, ctx), ReferenceMap::weak())
}

/// Soft, single-owner cache for long-lived loaders.
pub fn soft_caching_resolver(
    loader: Option<SharedLoader>,
    ctx: &LoaderContext,
) -> LocalCachingResolver {
    CachingResolver::new(cache_disabled(loader, ctx), ReferenceMap::soft())
}

pub fn weak_caching_concurrent_resolver(
    loader: Option<SharedLoader>,
    ctx: &LoaderContext,
) -> ConcurrentCachingResolver {
    CachingResolver::new(cache_disabled(loader, ctx), ReferenceMap::weak())
}

pub fn soft_caching_concurrent_resolver(
    loader: Option<SharedLoader>,
    ctx: &LoaderContext,
) -> ConcurrentCachingResolver {
    CachingResolver::new(cache_disabled(loader, ctx), ReferenceMap::soft())
}

/// Builds the configuration named by `kind`.
pub fn build(kind: ResolverKind, loader: Option<SharedLoader>, ctx: &LoaderContext) -> Resolver {
    tracing::debug!(%kind, "building type resolver");
    match kind {
        ResolverKind::NoCache => cache_disabled(loader, ctx).into(),
        ResolverKind::WeakCache => weak_caching_resolver(loader, ctx).into(),
        ResolverKind::SoftCache => soft_caching_resolver(loader, ctx).into(),
        ResolverKind::WeakCacheConcurrent => weak_caching_concurrent_resolver(loader, ctx).into(),
        ResolverKind::SoftCacheConcurrent => soft_caching_concurrent_resolver(loader, ctx).into(),
    }
}

/// Builds the configuration named by `kind` in a form that can be shared
/// between threads. Single-owner kinds are rejected.
pub fn build_concurrent(
    kind: ResolverKind,
    loader: Option<SharedLoader>,
    ctx: &LoaderContext,
) -> Result<ConcurrentResolver, ConfigError> {
    tracing::debug!(%kind, "building shareable type resolver");
    match kind {
        ResolverKind::NoCache => Ok(cache_disabled(loader, ctx).into()),
        ResolverKind::WeakCacheConcurrent => {
            Ok(weak_caching_concurrent_resolver(loader, ctx).into())
        }
        ResolverKind::SoftCacheConcurrent => {
            Ok(soft_caching_concurrent_resolver(loader, ctx).into())
        }
        ResolverKind::WeakCache | ResolverKind::SoftCache => Err(ConfigError::NotShareable(kind)),
    }
}

impl Resolver {
    pub fn kind(&self) -> ResolverKind {
        match self {
            Resolver::TypeLoaderResolver(_) => ResolverKind::NoCache,
            Resolver::LocalCachingResolver(r) => match r.cache().strength() {
                Strength::Weak => ResolverKind::WeakCache,
                Strength::Soft => ResolverKind::SoftCache,
            },
            Resolver::ConcurrentCachingResolver(r) => match r.cache().strength() {
                Strength::Weak => ResolverKind::WeakCacheConcurrent,
                Strength::Soft => ResolverKind::SoftCacheConcurrent,
            },
        }
    }

    pub fn loader(&self) -> &SharedLoader {
        match self {
            Resolver::TypeLoaderResolver(r) => r.loader(),
            Resolver::LocalCachingResolver(r) => r.delegate().loader(),
            Resolver::ConcurrentCachingResolver(r) => r.delegate().loader(),
        }
    }

    /// Cache statistics; `None` for `no-cache`.
    pub fn stats(&self) -> Option<CacheStat> {
        match self {
            Resolver::TypeLoaderResolver(_) => None,
            Resolver::LocalCachingResolver(r) => Some(r.stats()),
            Resolver::ConcurrentCachingResolver(r) => Some(r.stats()),
        }
    }

    /// Forwards a memory-pressure signal to the cache, if there is one.
    pub fn reclaim_soft(&self) -> usize {
        match self {
            Resolver::TypeLoaderResolver(_) => 0,
            Resolver::LocalCachingResolver(r) => r.cache().reclaim_soft(),
            Resolver::ConcurrentCachingResolver(r) => r.cache().reclaim_soft(),
        }
    }
}

impl ConcurrentResolver {
    pub fn kind(&self) -> ResolverKind {
        match self {
            ConcurrentResolver::TypeLoaderResolver(_) => ResolverKind::NoCache,
            ConcurrentResolver::ConcurrentCachingResolver(r) => match r.cache().strength() {
                Strength::Weak => ResolverKind::WeakCacheConcurrent,
                Strength::Soft => ResolverKind::SoftCacheConcurrent,
            },
        }
    }

    pub fn loader(&self) -> &SharedLoader {
        match self {
            ConcurrentResolver::TypeLoaderResolver(r) => r.loader(),
            ConcurrentResolver::ConcurrentCachingResolver(r) => r.delegate().loader(),
        }
    }

    pub fn stats(&self) -> Option<CacheStat> {
        match self {
            ConcurrentResolver::TypeLoaderResolver(_) => None,
            ConcurrentResolver::ConcurrentCachingResolver(r) => Some(r.stats()),
        }
    }

    pub fn reclaim_soft(&self) -> usize {
        match self {
            ConcurrentResolver::TypeLoaderResolver(_) => 0,
            ConcurrentResolver::ConcurrentCachingResolver(r) => r.cache().reclaim_soft(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{loader::RegistryLoader, resolver::TypeResolver};
    use std::{sync::Arc, thread};

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ResolverKind::ALL {
            assert_eq!(kind.as_str().parse::<ResolverKind>(), Ok(kind));
        }
        assert_eq!(
            " Soft-Cache ".parse::<ResolverKind>(),
            Ok(ResolverKind::SoftCache)
        );
        assert_eq!(
            "lru".parse::<ResolverKind>(),
            Err(ConfigError::UnknownResolverKind("lru".into()))
        );
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&ResolverKind::WeakCacheConcurrent).unwrap();
        assert_eq!(json, "\"weak-cache-concurrent\"");
        let kind: ResolverKind = serde_json::from_str("\"no-cache\"").unwrap();
        assert_eq!(kind, ResolverKind::NoCache);
    }

    #[test]
    fn test_build_reports_its_kind() {
        let loader: SharedLoader = Arc::new(RegistryLoader::with_types("t", ["X"]));
        let ctx = LoaderContext::new();
        for kind in ResolverKind::ALL {
            let resolver = build(kind, Some(loader.clone()), &ctx);
            assert_eq!(resolver.kind(), kind);
            assert_eq!(resolver.kind().strength(), kind.strength());
            assert_eq!(resolver.stats().is_some(), kind != ResolverKind::NoCache);
            assert_eq!(resolver.loader().id(), loader.id());
            assert!(resolver.resolve("X").is_ok());
        }
    }

    #[test]
    fn test_reclaim_soft_through_resolver() {
        let loader = Arc::new(RegistryLoader::with_types("t", ["X"]));
        let resolver = build(
            ResolverKind::SoftCacheConcurrent,
            Some(loader.clone()),
            &LoaderContext::new(),
        );
        drop(resolver.resolve("X").unwrap());
        resolver.resolve("X").unwrap();
        assert_eq!(loader.load_count("X"), 1);

        assert_eq!(resolver.reclaim_soft(), 1);
        resolver.resolve("X").unwrap();
        assert_eq!(loader.load_count("X"), 2);
    }

    #[test]
    fn test_build_concurrent_shares_across_threads() {
        let loader = Arc::new(RegistryLoader::with_types("t", ["X"]));
        for kind in [
            ResolverKind::NoCache,
            ResolverKind::WeakCacheConcurrent,
            ResolverKind::SoftCacheConcurrent,
        ] {
            let resolver = build_concurrent(kind, Some(loader.clone()), &LoaderContext::new())
                .unwrap();
            assert_eq!(resolver.kind(), kind);
            assert_eq!(resolver.loader().id(), loader.id());

            let handles: Vec<_> = thread::scope(|s| {
                let workers: Vec<_> = (0..8).map(|_| s.spawn(|| resolver.resolve("X"))).collect();
                workers.into_iter().map(|w| w.join().unwrap()).collect()
            });
            for handle in handles {
                assert_eq!(handle.unwrap().name(), "X");
            }
            if kind.is_concurrent() {
                assert_eq!(resolver.stats().map(|s| s.size), Some(1));
            } else {
                assert!(resolver.stats().is_none());
                assert_eq!(resolver.reclaim_soft(), 0);
            }
        }
    }

    #[test]
    fn test_build_concurrent_rejects_single_owner_kinds() {
        for kind in [ResolverKind::WeakCache, ResolverKind::SoftCache] {
            let err = build_concurrent(kind, None, &LoaderContext::new()).err();
            assert_eq!(err, Some(ConfigError::NotShareable(kind)));
        }
    }

    #[test]
    fn test_kind_from_env() {
        // all cases in one test, the variable is process-wide
        env::remove_var(CACHE_ENV_VAR);
        assert_eq!(ResolverKind::from_env(), Ok(None));

        env::set_var(CACHE_ENV_VAR, "  ");
        assert_eq!(ResolverKind::from_env(), Ok(None));

        env::set_var(CACHE_ENV_VAR, "soft-cache");
        assert_eq!(ResolverKind::from_env(), Ok(Some(ResolverKind::SoftCache)));

        env::set_var(CACHE_ENV_VAR, "lru");
        assert_eq!(
            ResolverKind::from_env(),
            Err(ConfigError::UnknownResolverKind("lru".into()))
        );

        #[cfg(unix)]
        {
            use std::{ffi::OsString, os::unix::ffi::OsStringExt};
            env::set_var(CACHE_ENV_VAR, OsString::from_vec(vec![b'w', 0xff]));
            assert_eq!(
                ResolverKind::from_env(),
                Err(ConfigError::UnknownResolverKind("w\u{FFFD}".into()))
            );
        }

        env::remove_var(CACHE_ENV_VAR);
    }

    #[test]
    fn test_defining_loader_is_last_resort() {
        let resolver = cache_disabled(None, &LoaderContext::new());
        assert_eq!(resolver.loader().id(), defining_loader().id());
        assert!(resolver.resolve("u64").is_ok());
    }
}
