//! Declarative type map definitions.
//!
//! A type map can be described in TOML or JSON instead of being assembled
//! in code:
//!
//! ```toml
//! default = "Item"
//!
//! [[types]]
//! type = "Item"
//! name = "Item"
//!
//! [[types]]
//! type = "Special"
//! name = "Item"
//! discriminator = "Special"
//! ```

use crate::error::{Error, Result};
use crate::known_type::{KnownType, TypeMap};
use crate::name::XmlName;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMapConfig {
    /// Logical type realized when a cursor creates a node on its own.
    pub default: String,
    #[serde(default)]
    pub types: Vec<TypeEntryConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntryConfig {
    #[serde(rename = "type")]
    pub logical_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator_namespace: Option<String>,
}

impl TypeMapConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| Error::ConfigFormat {
            message: err.to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|err| Error::ConfigFormat {
            message: err.to_string(),
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|err| Error::ConfigFormat {
            message: err.to_string(),
        })
    }

    /// Validate the definition and build the map.
    pub fn build(&self) -> Result<TypeMap> {
        TypeMap::builder(self.default.as_str())
            .extend(self.types.iter().map(TypeEntryConfig::to_known_type))
            .build()
    }
}

impl TypeEntryConfig {
    fn to_known_type(&self) -> KnownType {
        let mut entry = KnownType::new(self.logical_type.as_str(), self.name.as_str());
        if let Some(namespace) = &self.namespace {
            entry = entry.with_namespace(namespace.as_str());
        }
        if let Some(discriminator) = &self.discriminator {
            let namespace = self.discriminator_namespace.clone().unwrap_or_default();
            entry = entry.with_discriminator(XmlName::new(discriminator.as_str(), namespace));
        }
        entry
    }
}

impl From<&KnownType> for TypeEntryConfig {
    fn from(entry: &KnownType) -> Self {
        Self {
            logical_type: entry.logical_type.to_string(),
            name: entry.local_name.clone(),
            namespace: entry.namespace_uri.clone(),
            discriminator: entry.discriminator.as_ref().map(|d| d.local_name.clone()),
            discriminator_namespace: entry
                .discriminator
                .as_ref()
                .filter(|d| d.has_namespace())
                .map(|d| d.namespace_uri.clone()),
        }
    }
}

impl From<&TypeMap> for TypeMapConfig {
    fn from(map: &TypeMap) -> Self {
        Self {
            default: map.default_type().to_string(),
            types: map.entries().map(TypeEntryConfig::from).collect(),
        }
    }
}
