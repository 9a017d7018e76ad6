//! Logical types and the map between them and XML node signatures.
//!
//! A [`TypeMap`] answers two questions for a cursor:
//!
//! - given a node found in the tree, which logical type does it hold
//!   ([`TypeMap::try_resolve`])
//! - given a logical type to write, which element or attribute name and
//!   discriminator represent it ([`TypeMap::entry_for`])
//!
//! Maps are immutable once built and are shared between cursors through
//! an `Arc`.

use crate::error::{Error, Result};
use crate::name::XmlName;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Opaque identifier of a logical (host-side) type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalType(String);

impl LogicalType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LogicalType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for LogicalType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a name is being resolved for an element or an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAxis {
    Element,
    Attribute,
}

/// One row of a type map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownType {
    pub logical_type: LogicalType,
    pub local_name: String,
    /// `None` inherits: child elements take the parent element's
    /// namespace, attributes take no namespace.
    pub namespace_uri: Option<String>,
    /// Value of the `xsi:type` marker written for this type, if any.
    pub discriminator: Option<XmlName>,
}

impl KnownType {
    pub fn new(logical_type: impl Into<LogicalType>, local_name: impl Into<String>) -> Self {
        Self {
            logical_type: logical_type.into(),
            local_name: local_name.into(),
            namespace_uri: None,
            discriminator: None,
        }
    }

    pub fn with_namespace(mut self, namespace_uri: impl Into<String>) -> Self {
        self.namespace_uri = Some(namespace_uri.into());
        self
    }

    pub fn with_discriminator(mut self, discriminator: XmlName) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    /// The name a node of this type carries when written under a parent
    /// whose namespace is `parent_namespace`.
    pub fn effective_name(&self, axis: NodeAxis, parent_namespace: &str) -> XmlName {
        let namespace = match (&self.namespace_uri, axis) {
            (Some(ns), _) => ns.clone(),
            (None, NodeAxis::Element) => parent_namespace.to_string(),
            (None, NodeAxis::Attribute) => String::new(),
        };
        XmlName::new(self.local_name.clone(), namespace)
    }
}

/// What the type map sees of a node when classifying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSignature {
    pub axis: NodeAxis,
    pub name: XmlName,
    /// Namespace of the enclosing element, used for inheriting entries.
    pub parent_namespace: String,
    pub discriminator: Option<XmlName>,
}

/// Immutable set of [`KnownType`] entries with a designated default.
#[derive(Debug, Clone)]
pub struct TypeMap {
    default_type: LogicalType,
    entries: IndexMap<LogicalType, KnownType>,
    by_local_name: IndexMap<String, Vec<usize>>,
}

impl TypeMap {
    /// A map holding exactly one entry, which is also the default.
    pub fn single(entry: KnownType) -> Self {
        let default = entry.logical_type.clone();
        let mut entries = IndexMap::new();
        let mut by_local_name = IndexMap::new();
        by_local_name.insert(entry.local_name.clone(), vec![0]);
        entries.insert(default.clone(), entry);
        Self {
            default_type: default,
            entries,
            by_local_name,
        }
    }

    pub fn builder(default_type: impl Into<LogicalType>) -> TypeMapBuilder {
        TypeMapBuilder::new(default_type)
    }

    pub fn default_type(&self) -> &LogicalType {
        &self.default_type
    }

    /// The entry used when a cursor has to realize a node on its own.
    pub fn default_entry(&self) -> &KnownType {
        // Presence is checked when the map is built.
        &self.entries[&self.default_type]
    }

    pub fn entries(&self) -> impl Iterator<Item = &KnownType> {
        self.entries.values()
    }

    pub fn contains(&self, logical_type: &LogicalType) -> bool {
        self.entries.contains_key(logical_type)
    }

    /// The entry registered for `logical_type`.
    pub fn entry_for(&self, logical_type: &LogicalType) -> Result<&KnownType> {
        self.entries
            .get(logical_type)
            .ok_or_else(|| Error::UnknownType(logical_type.clone()))
    }

    /// Classify a node.
    ///
    /// Entries are first selected by name. A single candidate matches
    /// outright. When several entries share the name, the node's
    /// discriminator must select exactly one of them; anything else is
    /// treated as unrecognized.
    pub fn try_resolve(&self, signature: &NodeSignature) -> Option<&KnownType> {
        let indices = self.by_local_name.get(&signature.name.local_name)?;
        let mut candidates = indices
            .iter()
            .filter_map(|&index| self.entries.get_index(index).map(|(_, entry)| entry))
            .filter(|entry| {
                entry.effective_name(signature.axis, &signature.parent_namespace) == signature.name
            });

        let first = candidates.next()?;
        let rest: Vec<&KnownType> = candidates.collect();
        if rest.is_empty() {
            return Some(first);
        }

        let mut selected = std::iter::once(first)
            .chain(rest)
            .filter(|entry| entry.discriminator == signature.discriminator);
        match (selected.next(), selected.next()) {
            (Some(entry), None) => Some(entry),
            _ => None,
        }
    }
}

/// Collects entries and validates them into a [`TypeMap`].
///
/// # Example
///
/// ```
/// use xmladapt::{KnownType, TypeMap, XmlName};
///
/// let map = TypeMap::builder("Item")
///     .add(KnownType::new("Item", "Item"))
///     .add(KnownType::new("Special", "Item").with_discriminator(XmlName::local("Special")))
///     .build()
///     .unwrap();
/// assert_eq!(map.default_entry().local_name, "Item");
/// ```
#[derive(Debug, Clone)]
pub struct TypeMapBuilder {
    default_type: LogicalType,
    entries: Vec<KnownType>,
}

impl TypeMapBuilder {
    pub fn new(default_type: impl Into<LogicalType>) -> Self {
        Self {
            default_type: default_type.into(),
            entries: Vec::new(),
        }
    }

    pub fn add(mut self, entry: KnownType) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn extend(mut self, entries: impl IntoIterator<Item = KnownType>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Validate and freeze the map.
    ///
    /// Fails when a logical type appears twice, when two entries share a
    /// name, namespace and discriminator, or when the default type has no
    /// entry.
    pub fn build(self) -> Result<TypeMap> {
        let mut entries: IndexMap<LogicalType, KnownType> = IndexMap::new();
        let mut by_local_name: IndexMap<String, Vec<usize>> = IndexMap::new();
        let mut signatures = HashSet::new();

        for entry in self.entries {
            if entries.contains_key(&entry.logical_type) {
                return Err(Error::InvalidTypeMap {
                    message: format!("type '{}' is registered twice", entry.logical_type),
                });
            }
            let signature = (
                entry.local_name.clone(),
                entry.namespace_uri.clone(),
                entry.discriminator.clone(),
            );
            if !signatures.insert(signature) {
                return Err(Error::InvalidTypeMap {
                    message: format!(
                        "type '{}' has the same name and discriminator as another entry",
                        entry.logical_type
                    ),
                });
            }

            by_local_name
                .entry(entry.local_name.clone())
                .or_default()
                .push(entries.len());
            entries.insert(entry.logical_type.clone(), entry);
        }

        if !entries.contains_key(&self.default_type) {
            return Err(Error::InvalidTypeMap {
                message: format!("default type '{}' has no entry", self.default_type),
            });
        }

        Ok(TypeMap {
            default_type: self.default_type,
            entries,
            by_local_name,
        })
    }
}
