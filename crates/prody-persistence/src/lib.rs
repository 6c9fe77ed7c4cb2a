//! Prody Persistence - Database entities and persistence layer
//!
//! This crate provides:
//! - SeaORM entity definitions for the relational store
//! - Entity id generation helpers
//!
//! The relational store is the single source of truth; everything else in the
//! system (realtime rooms, token caches) is rebuilt from scratch on restart.

pub mod entity;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;

/// Generate a fresh entity id (UUIDv4, string form).
pub fn new_entity_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_id_is_uuid() {
        let id = new_entity_id();
        assert_eq!(id.len(), 36);
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_ne!(new_entity_id(), new_entity_id());
    }
}
