use serde::Serialize;
use std::{
    fmt::{self, Display, Formatter},
    sync::{Arc, Weak},
};

/// How strongly a cache entry holds on to its referent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// Cleared as soon as the last handle outside the cache is dropped.
    Weak,
    /// Kept until memory pressure is signalled and nothing outside the cache
    /// holds the referent.
    Soft,
}

impl Display for Strength {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Weak => write!(f, "weak"),
            Strength::Soft => write!(f, "soft"),
        }
    }
}

/// A reclaimable reference to a cached value.
pub enum Reference<V> {
    Weak(Weak<V>),
    Soft(Arc<V>),
}

impl<V> Reference<V> {
    pub fn new(strength: Strength, value: &Arc<V>) -> Self {
        match strength {
            Strength::Weak => Reference::Weak(Arc::downgrade(value)),
            Strength::Soft => Reference::Soft(value.clone()),
        }
    }

    pub fn strength(&self) -> Strength {
        match self {
            Reference::Weak(_) => Strength::Weak,
            Reference::Soft(_) => Strength::Soft,
        }
    }

    /// Returns the referent, or `None` once it has been reclaimed.
    pub fn get(&self) -> Option<Arc<V>> {
        match self {
            Reference::Weak(w) => w.upgrade(),
            Reference::Soft(s) => Some(s.clone()),
        }
    }

    pub fn is_reclaimed(&self) -> bool {
        match self {
            Reference::Weak(w) => w.strong_count() == 0,
            Reference::Soft(_) => false,
        }
    }

    /// True for a soft reference whose referent nobody else holds, i.e. one
    /// that may be cleared under memory pressure.
    pub fn is_softly_reachable_only(&self) -> bool {
        match self {
            Reference::Weak(_) => false,
            Reference::Soft(s) => Arc::strong_count(s) == 1,
        }
    }
}

impl<V> Clone for Reference<V> {
    fn clone(&self) -> Self {
        match self {
            Reference::Weak(w) => Reference::Weak(w.clone()),
            Reference::Soft(s) => Reference::Soft(s.clone()),
        }
    }
}

impl<V> fmt::Debug for Reference<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = if self.is_reclaimed() { "reclaimed" } else { "live" };
        write!(f, "Reference({}, {state})", self.strength())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_reference_clears_on_drop() {
        let value = Arc::new(5);
        let reference = Reference::new(Strength::Weak, &value);
        assert_eq!(reference.get().as_deref(), Some(&5));
        drop(value);
        assert!(reference.is_reclaimed());
        assert!(reference.get().is_none());
    }

    #[test]
    fn test_soft_reference_outlives_callers() {
        let value = Arc::new(5);
        let reference = Reference::new(Strength::Soft, &value);
        assert!(!reference.is_softly_reachable_only());
        drop(value);
        assert!(!reference.is_reclaimed());
        assert!(reference.is_softly_reachable_only());
        assert_eq!(reference.get().as_deref(), Some(&5));
    }
}
