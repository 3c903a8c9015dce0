use serde::Serialize;
use std::{
    fmt::{self, Debug, Display, Formatter},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// Process-unique identity of a type loader.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LoaderId(pub u64);

static NEXT_LOADER_ID: AtomicU64 = AtomicU64::new(1);

impl LoaderId {
    /// Allocates an id no other loader in this process has.
    pub fn next() -> Self {
        LoaderId(NEXT_LOADER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for LoaderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A type as produced by a loader.
///
/// Two descriptions compare equal when they carry the same name and were
/// defined by the same loader, regardless of which load produced them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeDescription {
    name: String,
    loader: LoaderId,
}

/// Shared handle to a loaded type. Caches only ever hold these weakly or
/// softly; the loader and the callers own them.
pub type TypeHandle = Arc<TypeDescription>;

impl TypeDescription {
    pub fn new(name: impl Into<String>, loader: LoaderId) -> Self {
        Self {
            name: name.into(),
            loader,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn defining_loader(&self) -> LoaderId {
        self.loader
    }
}

impl Debug for TypeDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} (loader {})", self.name, self.loader)
    }
}

impl Display for TypeDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_ids_are_unique() {
        let a = LoaderId::next();
        let b = LoaderId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_description_equality_ignores_allocation() {
        let loader = LoaderId::next();
        let first: TypeHandle = Arc::new(TypeDescription::new("Point", loader));
        let second: TypeHandle = Arc::new(TypeDescription::new("Point", loader));
        assert_eq!(first, second);
        assert!(!Arc::ptr_eq(&first, &second));

        let other_loader = Arc::new(TypeDescription::new("Point", LoaderId::next()));
        assert_ne!(first, other_loader);
    }
}
