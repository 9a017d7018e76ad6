//! Namespace-qualified names as seen by the typed layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use xmladapt_dom::QName;

/// A local name plus namespace URI, without any prefix.
///
/// An empty `namespace_uri` means "no namespace". Comparison is ordinal and
/// case-sensitive, like XML itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct XmlName {
    pub local_name: String,
    #[serde(default)]
    pub namespace_uri: String,
}

impl XmlName {
    pub fn new(local_name: impl Into<String>, namespace_uri: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace_uri: namespace_uri.into(),
        }
    }

    /// A name in no namespace.
    pub fn local(local_name: impl Into<String>) -> Self {
        Self::new(local_name, String::new())
    }

    pub fn has_namespace(&self) -> bool {
        !self.namespace_uri.is_empty()
    }
}

impl From<&QName> for XmlName {
    fn from(name: &QName) -> Self {
        Self::new(name.local_name.clone(), name.namespace_uri.clone())
    }
}

impl fmt::Display for XmlName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_uri.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace_uri, self.local_name)
        }
    }
}
