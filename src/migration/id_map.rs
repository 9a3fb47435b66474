//! Bidirectional legacy ↔ canonical id mapping.
//!
//! Built once per migration run from the point store, handed by reference to
//! the code that needs it, and dropped when the run ends. The forward
//! direction must stay a function (one canonical id per legacy id); the
//! reverse direction keeps the first legacy id registered for a canonical
//! id, so the original lineage wins when an intermediate rename also maps
//! there.

use crate::migration::error::MigrationError;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct IdMap {
    legacy_to_canonical: HashMap<String, String>,
    canonical_to_legacy: HashMap<String, String>,
}

impl IdMap {
    /// Registers a legacy → canonical pair. Re-registering the same pair is
    /// a no-op; mapping one legacy id to two canonical ids is fatal.
    pub fn insert(&mut self, legacy: &str, canonical: &str) -> Result<(), MigrationError> {
        if let Some(existing) = self.legacy_to_canonical.get(legacy) {
            if existing != canonical {
                return Err(MigrationError::LegacyCollision {
                    legacy: legacy.to_string(),
                    first: existing.clone(),
                    second: canonical.to_string(),
                });
            }
            return Ok(());
        }
        self.legacy_to_canonical
            .insert(legacy.to_string(), canonical.to_string());
        self.canonical_to_legacy
            .entry(canonical.to_string())
            .or_insert_with(|| legacy.to_string());
        Ok(())
    }

    pub fn canonical_for(&self, legacy: &str) -> Option<&str> {
        self.legacy_to_canonical.get(legacy).map(String::as_str)
    }

    pub fn legacy_for(&self, canonical: &str) -> Option<&str> {
        self.canonical_to_legacy.get(canonical).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.legacy_to_canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legacy_to_canonical.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_both_directions() {
        let mut map = IdMap::default();
        map.insert("SpringerMtn", "at-main-mi0000000").unwrap();
        assert_eq!(map.canonical_for("SpringerMtn"), Some("at-main-mi0000000"));
        assert_eq!(map.legacy_for("at-main-mi0000000"), Some("SpringerMtn"));
        assert_eq!(map.canonical_for("at-main-mi0000000"), None);
    }

    #[test]
    fn reinserting_same_pair_is_idempotent() {
        let mut map = IdMap::default();
        map.insert("a", "c").unwrap();
        map.insert("a", "c").unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn conflicting_forward_mapping_is_fatal() {
        let mut map = IdMap::default();
        map.insert("a", "c1").unwrap();
        assert!(matches!(
            map.insert("a", "c2"),
            Err(MigrationError::LegacyCollision { .. })
        ));
    }

    #[test]
    fn first_legacy_wins_the_reverse_direction() {
        let mut map = IdMap::default();
        map.insert("original", "c").unwrap();
        map.insert("intermediate", "c").unwrap();
        assert_eq!(map.legacy_for("c"), Some("original"));
    }
}
