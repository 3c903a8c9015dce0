use super::TypeResolver;
use crate::{error::TypeNotFoundError, loader::SharedLoader, types::TypeHandle};
use std::fmt::{self, Debug, Formatter};

/// Resolves every name by asking the loader again.
///
/// Repeated names are loaded repeatedly, along with whatever side effects
/// loading has. Use it when resolution must never observe a previously
/// loaded instance.
#[derive(Clone)]
pub struct TypeLoaderResolver {
    loader: SharedLoader,
}

impl TypeLoaderResolver {
    pub fn new(loader: SharedLoader) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &SharedLoader {
        &self.loader
    }
}

impl TypeResolver for TypeLoaderResolver {
    fn resolve(&self, name: &str) -> Result<TypeHandle, TypeNotFoundError> {
        self.loader.load_type(name)
    }
}

impl Debug for TypeLoaderResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeLoaderResolver")
            .field("loader", &self.loader.id())
            .finish()
    }
}
