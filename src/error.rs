use crate::{resolver::factory::ResolverKind, types::LoaderId};
use thiserror::Error;

/// Raised by a [`TypeLoader`](crate::loader::TypeLoader) that cannot locate or
/// load the requested name. Resolvers pass it through unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Type not found: {name}{}", loader_suffix(.loader))]
pub struct TypeNotFoundError {
    pub name: String,
    pub loader: Option<LoaderId>,
}

impl TypeNotFoundError {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loader: None,
        }
    }

    pub fn in_loader(name: impl Into<String>, loader: LoaderId) -> Self {
        Self {
            name: name.into(),
            loader: Some(loader),
        }
    }
}

fn loader_suffix(loader: &Option<LoaderId>) -> String {
    match loader {
        Some(id) => format!(" (loader {id})"),
        None => String::new(),
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown resolver kind: {0} (expected one of no-cache, weak-cache, soft-cache, weak-cache-concurrent, soft-cache-concurrent)")]
    UnknownResolverKind(String),
    #[error("Resolver kind {0} uses a single-owner cache and cannot be shared between threads")]
    NotShareable(ResolverKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_not_found_message() {
        let err = TypeNotFoundError::new("com.example.Missing");
        assert_eq!(err.to_string(), "Type not found: com.example.Missing");

        let err = TypeNotFoundError::in_loader("Missing", LoaderId(7));
        assert_eq!(err.to_string(), "Type not found: Missing (loader #7)");
    }
}
