//! Resource registration registry
//!
//! Maps resource-type identifiers to their [`ResourceRegistration`]s. The
//! registry is assembled once through its builder and never mutated
//! afterwards: `resolve` is a pure read, so concurrent invocations of the
//! dispatcher share it without locking. It is explicitly constructed and
//! passed around - never ambient static state - so tests can build isolated
//! registries per case.
//!
//! Registering the same type identifier twice is last-write-wins, matching
//! how repeated map insertion behaves for the caller assembling the registry.

use crate::registration::ResourceRegistration;
use std::collections::HashMap;

/// Immutable type-identifier to registration map
#[derive(Clone, Debug, Default)]
pub struct ResourceRegistry {
    resources: HashMap<String, ResourceRegistration>,
}

impl ResourceRegistry {
    /// Start building a registry
    #[must_use]
    pub fn builder() -> ResourceRegistryBuilder {
        ResourceRegistryBuilder {
            resources: HashMap::new(),
        }
    }

    /// Look up the registration for a resource type
    #[must_use]
    pub fn resolve(&self, type_identifier: &str) -> Option<&ResourceRegistration> {
        self.resources.get(type_identifier)
    }

    /// All registered type identifiers, sorted
    #[must_use]
    pub fn resource_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Number of registered resource types
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the registry has no registrations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Builder for [`ResourceRegistry`]; registration is append-only at setup
pub struct ResourceRegistryBuilder {
    resources: HashMap<String, ResourceRegistration>,
}

impl ResourceRegistryBuilder {
    /// Register a resource type
    ///
    /// Registering an identifier that already exists replaces the previous
    /// registration (last write wins).
    #[must_use]
    pub fn register(
        mut self,
        type_identifier: impl Into<String>,
        registration: ResourceRegistration,
    ) -> Self {
        let type_identifier = type_identifier.into();
        if self.resources.insert(type_identifier.clone(), registration).is_some() {
            tracing::warn!(resource_type = %type_identifier, "replacing an existing resource registration");
        }
        self
    }

    /// Freeze the registry
    #[must_use]
    pub fn build(self) -> ResourceRegistry {
        ResourceRegistry {
            resources: self.resources,
        }
    }
}
