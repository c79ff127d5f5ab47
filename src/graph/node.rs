//! Node identity and attributes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique name of a node in the dependency graph
///
/// Serializes as a plain string (the service name from the source document).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeName(String);

impl NodeName {
    /// Create a NodeName from a string
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind assigned to nodes that do not declare one
pub const DEFAULT_KIND: &str = "service";

fn default_kind() -> String {
    DEFAULT_KIND.to_string()
}

/// Attributes attached to a node
///
/// Every field is optional in the source document; missing fields take the
/// documented defaults. Unrecognized fields are carried through in `extra`
/// so they survive into query results untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAttrs {
    /// Free-form tag classifying the node (e.g. "service", "rds", "sqs")
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Whether the node is reachable from outside the deployment
    #[serde(rename = "publicExposed", default)]
    pub public_exposed: bool,
    /// Known vulnerabilities; presence alone marks the node vulnerable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerabilities: Option<Vec<serde_json::Value>>,
    /// Unrecognized attributes from the source document
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for NodeAttrs {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            public_exposed: false,
            vulnerabilities: None,
            extra: BTreeMap::new(),
        }
    }
}

impl NodeAttrs {
    /// True if the node carries a `vulnerabilities` attribute at all
    pub fn has_vulnerability(&self) -> bool {
        self.vulnerabilities.is_some()
    }

    /// True if the node lists at least one concrete vulnerability
    pub fn has_listed_vulnerability(&self) -> bool {
        self.vulnerabilities.as_deref().is_some_and(|v| !v.is_empty())
    }

    /// Set the kind tag
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Mark the node as publicly exposed
    pub fn exposed(mut self) -> Self {
        self.public_exposed = true;
        self
    }

    /// Append a vulnerability identifier
    pub fn with_vulnerability(mut self, id: impl Into<String>) -> Self {
        self.vulnerabilities
            .get_or_insert_with(Vec::new)
            .push(serde_json::Value::String(id.into()));
        self
    }
}

/// A node as declared in a source document: a required name plus attributes
#[derive(Debug, Clone, Deserialize)]
pub struct NodeDecl {
    pub name: NodeName,
    #[serde(flatten)]
    pub attrs: NodeAttrs,
}
