use lasso::{Spur, ThreadedRodeo};

/// Interned identifier for a non-terminal name.
pub type NameId = Spur;

/// Name store for non-terminals.
///
/// Guarantees:
/// - Same string always produces same NameId
/// - Different strings always produce different NameIds
/// - NameId can be resolved back to the original string
pub struct SymbolStore {
    rodeo: ThreadedRodeo,
}

impl SymbolStore {
    /// Create a new empty symbol store.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Intern a name, returning its NameId.
    pub fn intern(&self, name: &str) -> NameId {
        self.rodeo.get_or_intern(name)
    }

    /// Resolve a NameId back to its string.
    /// Returns None if the NameId was not created by this store.
    pub fn resolve(&self, id: NameId) -> Option<&str> {
        self.rodeo.try_resolve(&id)
    }

    /// Get the NameId for a name if it exists, without interning.
    pub fn get(&self, name: &str) -> Option<NameId> {
        self.rodeo.get(name)
    }

    /// Number of interned names.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for SymbolStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SymbolStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolStore")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_stable() {
        let store = SymbolStore::new();
        let a = store.intern("Expr");
        let b = store.intern("Expr");
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn distinct_names_distinct_ids() {
        let store = SymbolStore::new();
        let a = store.intern("A");
        let b = store.intern("B");
        assert_ne!(a, b);
        assert_eq!(store.resolve(a), Some("A"));
        assert_eq!(store.resolve(b), Some("B"));
    }

    #[test]
    fn get_does_not_intern() {
        let store = SymbolStore::new();
        assert!(store.get("missing").is_none());
        assert!(store.is_empty());
    }
}
