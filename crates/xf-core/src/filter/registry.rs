//! Per-owner filter registry

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::descriptor::FilterDescriptor;

/// Identity of the widget that owns a filter entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerKey(String);

impl OwnerKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Mapping from owner to its single active descriptor.
///
/// Entries are replaced, never merged. The registry does not trigger
/// rendering; that is the recompute loop's job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRegistry {
    entries: AHashMap<OwnerKey, FilterDescriptor>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the owner's entry. Bounds are clamped to the
    /// field domains before storing.
    pub fn set(&mut self, owner: OwnerKey, descriptor: FilterDescriptor) {
        let descriptor = descriptor.normalized();
        tracing::debug!("Filter set for '{}': {:?}", owner, descriptor);
        self.entries.insert(owner, descriptor);
    }

    /// Remove the owner's entry. Returns whether an entry existed.
    pub fn clear(&mut self, owner: &OwnerKey) -> bool {
        let removed = self.entries.remove(owner).is_some();
        if removed {
            tracing::debug!("Filter cleared for '{}'", owner);
        }
        removed
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_active(&self, owner: &OwnerKey) -> bool {
        self.entries.contains_key(owner)
    }

    pub fn get(&self, owner: &OwnerKey) -> Option<&FilterDescriptor> {
        self.entries.get(owner)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&OwnerKey, &FilterDescriptor)> {
        self.entries.iter()
    }
}

/// Read-only handle onto the engine's registry, given to widgets at
/// construction so they can render their selected state.
#[derive(Clone)]
pub struct FilterHandle {
    registry: Arc<RwLock<FilterRegistry>>,
}

impl FilterHandle {
    pub(crate) fn new(registry: Arc<RwLock<FilterRegistry>>) -> Self {
        Self { registry }
    }

    pub fn is_active(&self, owner: &OwnerKey) -> bool {
        self.registry.read().is_active(owner)
    }

    pub fn get(&self, owner: &OwnerKey) -> Option<FilterDescriptor> {
        self.registry.read().get(owner).cloned()
    }

    pub fn active_count(&self) -> usize {
        self.registry.read().len()
    }
}

impl fmt::Debug for FilterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterHandle")
            .field("active", &self.active_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;

    fn day(value: i64) -> FilterDescriptor {
        FilterDescriptor::DiscreteEquals {
            dim: Field::DayOfWeek,
            value,
        }
    }

    #[test]
    fn test_set_replaces_entry() {
        let mut registry = FilterRegistry::new();
        let owner = OwnerKey::from("bar");

        registry.set(owner.clone(), day(1));
        registry.set(owner.clone(), day(4));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&owner), Some(&day(4)));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut registry = FilterRegistry::new();
        registry.set(OwnerKey::from("bar"), day(1));
        registry.set(OwnerKey::from("map"), day(2));

        let owner = OwnerKey::from("bar");
        assert!(registry.clear(&owner));
        let once = registry.clone();
        assert!(!registry.clear(&owner));

        assert_eq!(registry, once);
        assert!(!registry.is_active(&owner));
        assert!(registry.is_active(&OwnerKey::from("map")));
    }

    #[test]
    fn test_clear_all_empties_registry() {
        let mut registry = FilterRegistry::new();
        registry.set(OwnerKey::from("a"), day(1));
        registry.set(OwnerKey::from("b"), day(2));

        registry.clear_all();

        assert!(registry.is_empty());
    }

    #[test]
    fn test_set_clamps_out_of_domain_bounds() {
        let mut registry = FilterRegistry::new();
        let owner = OwnerKey::from("heatmap");
        registry.set(
            owner.clone(),
            FilterDescriptor::DiscreteBucket {
                dim: Field::Hour,
                lo: -4,
                hi: 40,
            },
        );

        assert_eq!(
            registry.get(&owner),
            Some(&FilterDescriptor::DiscreteBucket {
                dim: Field::Hour,
                lo: 0,
                hi: 23,
            })
        );
    }

    #[test]
    fn test_handle_sees_registry_updates() {
        let shared = Arc::new(RwLock::new(FilterRegistry::new()));
        let handle = FilterHandle::new(shared.clone());
        let owner = OwnerKey::from("map");

        assert!(!handle.is_active(&owner));
        shared.write().set(owner.clone(), day(3));
        assert!(handle.is_active(&owner));
        assert_eq!(handle.get(&owner), Some(day(3)));
    }
}
