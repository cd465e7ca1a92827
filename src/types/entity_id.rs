//! Entity identifier type
//!
//! Every entity in a document is addressed by an `EntityId`. Ids are
//! allocated monotonically by the owning document and never reused, so a
//! stale id held by external code can always be detected: after the entity
//! is destroyed, `IgesDocument::is_valid` reports `false` for it forever.

use std::fmt;

/// A unique identifier for entities within a document
///
/// Id 0 is reserved and invalid. The id is distinct from the entity's
/// directory-entry sequence number, which is reassigned on every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// The null/invalid id (0)
    pub const NULL: EntityId = EntityId(0);

    /// Create a new id from a u32 value
    #[inline]
    pub const fn new(value: u32) -> Self {
        EntityId(value)
    }

    /// Get the raw u32 value
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Check if this is the null/invalid id
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        EntityId::NULL
    }
}

impl From<u32> for EntityId {
    fn from(value: u32) -> Self {
        EntityId(value)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = EntityId::new(42);
        assert_eq!(id.value(), 42);
        assert!(!id.is_null());
    }

    #[test]
    fn test_null_id() {
        let null = EntityId::NULL;
        assert!(null.is_null());
        assert_eq!(null.value(), 0);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(format!("{}", EntityId::new(7)), "#7");
    }

    #[test]
    fn test_id_ordering() {
        assert!(EntityId::new(100) < EntityId::new(200));
    }
}
