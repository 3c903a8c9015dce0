//! Type loaders and the context used to pick one.
//!
//! A [`TypeLoader`] turns a name into a [`TypeHandle`]. The crate never
//! loads types itself; it only decides *which* loader a resolver holds and
//! how often that loader is consulted.
//!
//! Loader selection at resolver construction goes through three tiers (see
//! [`default_loader`](crate::resolver::factory::default_loader)):
//!
//! 1. an explicit loader handed to the factory,
//! 2. the context loader carried by a [`LoaderContext`],
//! 3. the crate's own [`defining_loader`].
use crate::{
    error::TypeNotFoundError,
    types::{LoaderId, TypeDescription, TypeHandle},
};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::{
    collections::HashSet,
    fmt::{self, Debug, Formatter},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, OnceLock,
    },
};

pub trait TypeLoader: Send + Sync {
    fn id(&self) -> LoaderId;

    fn name(&self) -> &str;

    /// Loads `name`, doing whatever work that takes every time it is called.
    fn load_type(&self, name: &str) -> Result<TypeHandle, TypeNotFoundError>;
}

pub type SharedLoader = Arc<dyn TypeLoader>;

/// Names known to the [`defining_loader`] out of the box.
pub const BUILTIN_TYPES: &[&str] = &[
    "bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128",
    "usize", "f32", "f64", "String", "Vec", "Option", "HashMap",
];

/// In-memory loader over a mutable set of type names.
///
/// Every successful `load_type` mints a fresh handle, so nothing inside the
/// loader keeps a loaded type alive. Load attempts, successful or not, are
/// counted per name.
pub struct RegistryLoader {
    id: LoaderId,
    name: String,
    known: RwLock<HashSet<String>>,
    loads: DashMap<String, u64>,
    total_loads: AtomicU64,
}

impl RegistryLoader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LoaderId::next(),
            name: name.into(),
            known: RwLock::new(HashSet::new()),
            loads: DashMap::new(),
            total_loads: AtomicU64::new(0),
        }
    }

    pub fn with_types<I, S>(name: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let this = Self::new(name);
        for t in types {
            this.define(t);
        }
        this
    }

    /// Makes `name` loadable. Returns `false` if it already was.
    pub fn define(&self, name: impl Into<String>) -> bool {
        self.known.write().insert(name.into())
    }

    /// Makes `name` unloadable. Handles already handed out stay valid.
    pub fn undefine(&self, name: &str) -> bool {
        self.known.write().remove(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.known.read().contains(name)
    }

    pub fn defined_types(&self) -> Vec<String> {
        let mut names: Vec<_> = self.known.read().iter().cloned().collect();
        names.sort();
        names
    }

    /// Number of times `load_type` was called for `name`.
    pub fn load_count(&self, name: &str) -> u64 {
        self.loads.get(name).map(|c| *c).unwrap_or(0)
    }

    pub fn total_loads(&self) -> u64 {
        self.total_loads.load(Ordering::Relaxed)
    }

    pub fn into_shared(self) -> SharedLoader {
        Arc::new(self)
    }
}

impl TypeLoader for RegistryLoader {
    fn id(&self) -> LoaderId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn load_type(&self, name: &str) -> Result<TypeHandle, TypeNotFoundError> {
        *self.loads.entry(name.to_string()).or_insert(0) += 1;
        self.total_loads.fetch_add(1, Ordering::Relaxed);

        if !self.is_defined(name) {
            return Err(TypeNotFoundError::in_loader(name, self.id));
        }
        tracing::trace!(loader = %self.id, "loaded type {name}");
        Ok(Arc::new(TypeDescription::new(name, self.id)))
    }
}

impl Debug for RegistryLoader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryLoader")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("defined", &self.known.read().len())
            .field("total_loads", &self.total_loads())
            .finish()
    }
}

static DEFINING_LOADER: OnceLock<Arc<RegistryLoader>> = OnceLock::new();

fn defining_registry() -> &'static Arc<RegistryLoader> {
    DEFINING_LOADER.get_or_init(|| {
        Arc::new(RegistryLoader::with_types(
            env!("CARGO_PKG_NAME"),
            BUILTIN_TYPES.iter().copied(),
        ))
    })
}

/// The loader that belongs to this crate itself; last resort of the loader
/// fallback chain. Knows the [`BUILTIN_TYPES`] and anything later registered
/// with [`define_builtin`].
pub fn defining_loader() -> SharedLoader {
    defining_registry().clone()
}

/// Registers an extra name with the [`defining_loader`].
pub fn define_builtin(name: impl Into<String>) -> bool {
    defining_registry().define(name)
}

/// Loader context captured at resolver construction.
///
/// Plays the role an ambient per-thread loader plays in hosts that have one,
/// but is passed explicitly so nothing is looked up from hidden global state.
#[derive(Clone, Default)]
pub struct LoaderContext {
    context_loader: Option<SharedLoader>,
}

impl LoaderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context_loader(loader: SharedLoader) -> Self {
        Self {
            context_loader: Some(loader),
        }
    }

    pub fn set_context_loader(&mut self, loader: Option<SharedLoader>) {
        self.context_loader = loader;
    }

    pub fn context_loader(&self) -> Option<&SharedLoader> {
        self.context_loader.as_ref()
    }
}

impl Debug for LoaderContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderContext")
            .field("context_loader", &self.context_loader.as_ref().map(|l| l.id()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_mints_fresh_handles() {
        let loader = RegistryLoader::with_types("test", ["Point"]);
        let a = loader.load_type("Point").unwrap();
        let b = loader.load_type("Point").unwrap();
        assert_eq!(a, b);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.defining_loader(), loader.id());
        assert_eq!(loader.load_count("Point"), 2);
    }

    #[test]
    fn test_registry_counts_failed_loads() {
        let loader = RegistryLoader::new("test");
        let err = loader.load_type("Missing").unwrap_err();
        assert_eq!(err, TypeNotFoundError::in_loader("Missing", loader.id()));
        assert_eq!(loader.load_count("Missing"), 1);
        assert_eq!(loader.total_loads(), 1);
    }

    #[test]
    fn test_define_and_undefine() {
        let loader = RegistryLoader::new("test");
        assert!(loader.define("Late"));
        assert!(!loader.define("Late"));
        assert!(loader.load_type("Late").is_ok());
        assert!(loader.undefine("Late"));
        assert!(loader.load_type("Late").is_err());
        assert!(loader.defined_types().is_empty());
    }

    #[test]
    fn test_defining_loader_is_stable() {
        let a = defining_loader();
        let b = defining_loader();
        assert_eq!(a.id(), b.id());
        assert_eq!(a.name(), "type-resolvers");
        assert!(a.load_type("i32").is_ok());
    }

    #[test]
    fn test_define_builtin_extends_defining_loader() {
        let name = "type_resolvers.tests.Extra";
        assert!(defining_loader().load_type(name).is_err());
        assert!(define_builtin(name));
        assert!(!define_builtin(name));

        let handle = defining_loader().load_type(name).unwrap();
        assert_eq!(handle.defining_loader(), defining_loader().id());
    }

    #[test]
    fn test_context_without_loader() {
        let mut ctx = LoaderContext::new();
        assert!(ctx.context_loader().is_none());

        let loader = RegistryLoader::new("ctx").into_shared();
        let id = loader.id();
        ctx.set_context_loader(Some(loader));
        assert_eq!(ctx.context_loader().map(|l| l.id()), Some(id));
    }
}
