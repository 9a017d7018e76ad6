//! Core types for the arena-backed XML tree.

use std::fmt;

/// The namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The namespace reserved for `xmlns` declarations.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A lightweight handle to a node stored in a [`Document`](crate::Document).
///
/// Ids are never reused: a node that is removed from the tree keeps its id
/// and simply becomes detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The kind of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    CData,
    Comment,
}

/// A resolved, namespace-qualified name.
///
/// `namespace_uri` is empty when the name is in no namespace. The prefix is
/// purely presentational: two names are the same name when their local name
/// and namespace match, whatever prefixes they were written with.
#[derive(Debug, Clone)]
pub struct QName {
    /// Namespace prefix, if any (e.g., "xsi" in `xsi:type`).
    pub prefix: Option<String>,

    /// The local name (without namespace prefix).
    pub local_name: String,

    /// The namespace URI the name belongs to.
    pub namespace_uri: String,
}

impl QName {
    /// A name in no namespace.
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local_name: local_name.into(),
            namespace_uri: String::new(),
        }
    }

    /// A namespaced name written with the given prefix.
    pub fn new(
        prefix: Option<String>,
        local_name: impl Into<String>,
        namespace_uri: impl Into<String>,
    ) -> Self {
        Self {
            prefix,
            local_name: local_name.into(),
            namespace_uri: namespace_uri.into(),
        }
    }

    /// Check whether this name has the given local name and namespace.
    pub fn matches(&self, local_name: &str, namespace_uri: &str) -> bool {
        self.local_name == local_name && self.namespace_uri == namespace_uri
    }

    /// The name as it appears in markup (`prefix:local` or `local`).
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, self.local_name),
            _ => self.local_name.clone(),
        }
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.local_name == other.local_name && self.namespace_uri == other.namespace_uri
    }
}

impl Eq for QName {}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_uri.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace_uri, self.local_name)
        }
    }
}

/// An `xmlns` or `xmlns:prefix` declaration carried by an element.
///
/// Declarations are kept apart from ordinary attributes, so they never show
/// up when enumerating [`Document::attributes`](crate::Document::attributes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// `None` for the default namespace declaration.
    pub prefix: Option<String>,

    /// The declared namespace URI (empty undeclares the default namespace).
    pub uri: String,
}

/// Options controlling how text is read into the tree.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Keep whitespace-only text nodes that sit between elements.
    pub preserve_whitespace: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ElementData {
    pub(crate) name: QName,
    pub(crate) namespaces: Vec<NamespaceDecl>,
    pub(crate) attributes: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct AttributeData {
    pub(crate) name: QName,
    pub(crate) value: String,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Document,
    Element(ElementData),
    Attribute(AttributeData),
    Text(String),
    CData(String),
    Comment(String),
}

impl NodeData {
    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            NodeData::Document => NodeKind::Document,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Attribute(_) => NodeKind::Attribute,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::CData(_) => NodeKind::CData,
            NodeData::Comment(_) => NodeKind::Comment,
        }
    }
}

/// One slot of the arena.
///
/// For attribute nodes `parent` is the owner element; attributes never
/// appear in `children`.
#[derive(Debug, Clone)]
pub(crate) struct NodeSlot {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}
