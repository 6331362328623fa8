//! Namespaced entity type names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace of the built-in extraction dimensions.
pub const BUILTIN_NAMESPACE: &str = "duckling";

/// An entity type name of the form `namespace:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    /// Creates an entity type from its qualified name.
    #[must_use]
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self(qualified_name.into())
    }

    /// Creates a built-in entity type for an extraction dimension.
    #[must_use]
    pub fn builtin(dimension: &str) -> Self {
        Self(format!("{BUILTIN_NAMESPACE}:{dimension}"))
    }

    /// Returns the qualified name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the namespace, or an empty string when unqualified.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map_or("", |(namespace, _)| namespace)
    }

    /// Returns the unqualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, name)| name)
    }

    /// Qualifies the name with `namespace` unless it already has one.
    #[must_use]
    pub fn with_namespace(name: &str, namespace: &str) -> Self {
        if name.contains(':') {
            Self(name.to_string())
        } else {
            Self(format!("{namespace}:{name}"))
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
