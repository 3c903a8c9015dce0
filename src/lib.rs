//! # type-resolvers
//!
//! Resolution of textual type names into loaded type handles, as needed by a
//! decoder that meets type tags in an encoded stream.
//!
//! Loading a type is expensive, so most configurations put a
//! [`ReferenceMap`](cache::ReferenceMap) in front of the loader. Entries in
//! that map are weak or soft references, so cached types disappear when
//! nobody else uses them (weak) or when the owner signals memory pressure
//! (soft). There is no size- or time-based eviction.
//!
//! ## Core Types
//!
//! - **[`TypeResolver`](resolver::TypeResolver)**: `resolve(name)`.
//! - **[`TypeLoaderResolver`](resolver::TypeLoaderResolver)**: no caching.
//! - **[`CachingResolver`](resolver::CachingResolver)**: cache, then delegate.
//! - **[`factory`](resolver::factory)**: the five named configurations and
//!   the loader fallback chain.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use type_resolvers::{
//!     loader::{LoaderContext, RegistryLoader},
//!     resolver::{factory, TypeResolver},
//! };
//!
//! let loader = Arc::new(RegistryLoader::with_types("app", ["app.Point"]));
//! let resolver = factory::soft_caching_resolver(Some(loader.clone()), &LoaderContext::new());
//!
//! let point = resolver.resolve("app.Point").unwrap();
//! assert_eq!(point.name(), "app.Point");
//! resolver.resolve("app.Point").unwrap();
//! assert_eq!(loader.load_count("app.Point"), 1);
//! ```
pub mod cache;
pub mod cli;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod resolver;
pub mod types;

pub use error::{ConfigError, TypeNotFoundError};
pub use types::{LoaderId, TypeDescription, TypeHandle};
