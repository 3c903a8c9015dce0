//! Name-to-type resolution.
//!
//! A [`TypeResolver`] turns a textual type name into a [`TypeHandle`]. The
//! decoding side of a serialization pipeline calls it every time it meets a
//! type tag, so the interesting part is how often the underlying
//! [`TypeLoader`](crate::loader::TypeLoader) gets involved:
//!
//! - [`TypeLoaderResolver`] asks the loader on every call.
//! - [`CachingResolver`] remembers successful results in a
//!   [`ReferenceMap`](crate::cache::ReferenceMap) and only asks its delegate
//!   on a miss. Failures are never remembered.
//!
//! The five ready-made configurations live in [`factory`]. [`Resolver`]
//! wraps whichever one was picked at runtime, and [`ConcurrentResolver`]
//! wraps the subset that is `Sync`.
//!
//! # Concurrency
//!
//! Resolvers add no locking of their own. Configurations backed by a
//! [`SharedStore`](crate::cache::SharedStore) are `Sync` and may be shared
//! across threads; two threads missing on the same name may both load it,
//! and the last `put` wins. Configurations backed by a
//! [`LocalStore`](crate::cache::LocalStore) are not `Sync`.
use crate::{error::TypeNotFoundError, types::TypeHandle};
use enum_dispatch::enum_dispatch;
use std::{rc::Rc, sync::Arc};

mod caching;
pub mod factory;
mod loader;

pub use caching::{CachingResolver, ConcurrentCachingResolver, LocalCachingResolver};
pub use loader::TypeLoaderResolver;

#[enum_dispatch]
pub trait TypeResolver {
    fn resolve(&self, name: &str) -> Result<TypeHandle, TypeNotFoundError>;
}

/// One of the factory configurations, chosen at runtime.
///
/// Not `Sync`, since it may hold a single-owner cache. Use
/// [`ConcurrentResolver`] to share a configuration chosen by name.
#[enum_dispatch(TypeResolver)]
pub enum Resolver {
    TypeLoaderResolver,
    LocalCachingResolver,
    ConcurrentCachingResolver,
}

/// The configurations that can be shared between threads.
#[enum_dispatch(TypeResolver)]
pub enum ConcurrentResolver {
    TypeLoaderResolver,
    ConcurrentCachingResolver,
}

impl<R: TypeResolver + ?Sized> TypeResolver for &R {
    fn resolve(&self, name: &str) -> Result<TypeHandle, TypeNotFoundError> {
        (**self).resolve(name)
    }
}

impl<R: TypeResolver + ?Sized> TypeResolver for Box<R> {
    fn resolve(&self, name: &str) -> Result<TypeHandle, TypeNotFoundError> {
        (**self).resolve(name)
    }
}

impl<R: TypeResolver + ?Sized> TypeResolver for Rc<R> {
    fn resolve(&self, name: &str) -> Result<TypeHandle, TypeNotFoundError> {
        (**self).resolve(name)
    }
}

impl<R: TypeResolver + ?Sized> TypeResolver for Arc<R> {
    fn resolve(&self, name: &str) -> Result<TypeHandle, TypeNotFoundError> {
        (**self).resolve(name)
    }
}
