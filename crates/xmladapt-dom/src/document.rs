//! The arena that owns every node of an XML tree.

use crate::types::{AttributeData, ElementData, NodeData, NodeSlot};
use crate::{DomError, NamespaceDecl, NodeId, NodeKind, QName, Result, XML_NAMESPACE};

/// A mutable XML document.
///
/// All nodes live in a single arena and are addressed by [`NodeId`]. The
/// document node is created with the document and is never removed; it
/// holds at most one element child (the document element) plus comments.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeSlot>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with no document element.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeSlot {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document node, parent of the document element.
    pub fn document_node(&self) -> NodeId {
        NodeId(0)
    }

    /// The single element child of the document node, if any.
    pub fn document_element(&self) -> Option<NodeId> {
        self.slot(self.document_node())
            .children
            .iter()
            .copied()
            .find(|&id| self.kind(id) == NodeKind::Element)
    }

    /// Check whether `id` is the document element.
    pub fn is_document_element(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Element && self.parent(id) == Some(self.document_node())
    }

    fn slot(&self, id: NodeId) -> &NodeSlot {
        &self.nodes[id.0]
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.slot(id).data
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut NodeSlot {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    // ==================== Navigation ====================

    /// The kind of a node.
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.slot(id).data.kind()
    }

    /// The parent of a node; for attributes this is the owner element.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    /// The element owning an attribute.
    pub fn owner_element(&self, attribute: NodeId) -> Option<NodeId> {
        match self.kind(attribute) {
            NodeKind::Attribute => self.parent(attribute),
            _ => None,
        }
    }

    /// Child nodes in document order (never includes attributes).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slot(id).children
    }

    /// Element children in document order.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.kind(child) == NodeKind::Element)
    }

    /// Attributes of an element in document order (namespace declarations excluded).
    pub fn attributes(&self, element: NodeId) -> &[NodeId] {
        match &self.slot(element).data {
            NodeData::Element(data) => &data.attributes,
            _ => &[],
        }
    }

    /// The sibling following `id` in its parent's child (or attribute) list.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = if self.kind(id) == NodeKind::Attribute {
            self.attributes(parent)
        } else {
            self.children(parent)
        };
        let index = siblings.iter().position(|&s| s == id)?;
        siblings.get(index + 1).copied()
    }

    /// Position of `id` among its siblings (children or attributes).
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        let siblings = if self.kind(id) == NodeKind::Attribute {
            self.attributes(parent)
        } else {
            self.children(parent)
        };
        siblings.iter().position(|&s| s == id)
    }

    // ==================== Data ====================

    /// The name of an element or attribute.
    pub fn name(&self, id: NodeId) -> Option<&QName> {
        match &self.slot(id).data {
            NodeData::Element(data) => Some(&data.name),
            NodeData::Attribute(data) => Some(&data.name),
            _ => None,
        }
    }

    /// The value of an attribute node.
    pub fn attribute_value(&self, attribute: NodeId) -> Option<&str> {
        match &self.slot(attribute).data {
            NodeData::Attribute(data) => Some(&data.value),
            _ => None,
        }
    }

    /// Replace the value of an attribute node.
    pub fn set_attribute_value(&mut self, attribute: NodeId, value: impl Into<String>) -> Result<()> {
        match &mut self.slot_mut(attribute).data {
            NodeData::Attribute(data) => {
                data.value = value.into();
                Ok(())
            }
            other => Err(DomError::WrongNodeKind {
                node: attribute,
                expected: NodeKind::Attribute,
                actual: other.kind(),
            }),
        }
    }

    /// Find an attribute of `element` by local name and namespace.
    pub fn find_attribute(&self, element: NodeId, local_name: &str, namespace_uri: &str) -> Option<NodeId> {
        self.attributes(element).iter().copied().find(|&attr| {
            self.name(attr)
                .is_some_and(|name| name.matches(local_name, namespace_uri))
        })
    }

    /// The text value of a node.
    ///
    /// Attributes yield their value; elements and the document node yield
    /// the concatenated text of all descendant text and CDATA nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        match &self.slot(id).data {
            NodeData::Attribute(data) => data.value.clone(),
            NodeData::Text(text) | NodeData::CData(text) => text.clone(),
            NodeData::Comment(_) => String::new(),
            NodeData::Element(_) | NodeData::Document => {
                let mut out = String::new();
                self.collect_text(id, &mut out);
                out
            }
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for &child in self.children(id) {
            match &self.slot(child).data {
                NodeData::Text(text) | NodeData::CData(text) => out.push_str(text),
                NodeData::Element(_) => self.collect_text(child, out),
                _ => {}
            }
        }
    }

    /// Replace the content of a node with `text`.
    ///
    /// For elements all children are dropped and a single text node is added
    /// (none when `text` is empty). For attributes the value is replaced.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<()> {
        match self.kind(id) {
            NodeKind::Attribute => self.set_attribute_value(id, text),
            NodeKind::Element => {
                self.remove_all_children(id)?;
                if !text.is_empty() {
                    let node = self.create_text(text);
                    self.append_child(id, node)?;
                }
                Ok(())
            }
            actual => Err(DomError::WrongNodeKind {
                node: id,
                expected: NodeKind::Element,
                actual,
            }),
        }
    }

    // ==================== Synthesis ====================

    /// Create a detached element.
    pub fn create_element(&mut self, name: QName) -> NodeId {
        tracing::trace!(name = %name, "create element");
        self.push(NodeData::Element(ElementData {
            name,
            namespaces: Vec::new(),
            attributes: Vec::new(),
        }))
    }

    /// Create a detached attribute.
    pub fn create_attribute(&mut self, name: QName, value: impl Into<String>) -> NodeId {
        tracing::trace!(name = %name, "create attribute");
        self.push(NodeData::Attribute(AttributeData {
            name,
            value: value.into(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    /// Create a detached CDATA node.
    pub fn create_cdata(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::CData(text.into()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    // ==================== Structure ====================

    fn require_container(&self, id: NodeId) -> Result<()> {
        match self.kind(id) {
            NodeKind::Element | NodeKind::Document => Ok(()),
            actual => Err(DomError::WrongNodeKind {
                node: id,
                expected: NodeKind::Element,
                actual,
            }),
        }
    }

    fn require_element(&self, id: NodeId) -> Result<()> {
        match self.kind(id) {
            NodeKind::Element => Ok(()),
            actual => Err(DomError::WrongNodeKind {
                node: id,
                expected: NodeKind::Element,
                actual,
            }),
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slot(id).parent {
            if self.kind(id) == NodeKind::Attribute {
                if let NodeData::Element(data) = &mut self.slot_mut(parent).data {
                    data.attributes.retain(|&a| a != id);
                }
            } else {
                self.slot_mut(parent).children.retain(|&c| c != id);
            }
            self.slot_mut(id).parent = None;
        }
    }

    /// Insert `new_child` into `parent` before `reference`, or at the end
    /// when `reference` is `None`.
    ///
    /// A child that is already attached elsewhere is moved.
    pub fn insert_before(&mut self, parent: NodeId, new_child: NodeId, reference: Option<NodeId>) -> Result<()> {
        self.require_container(parent)?;
        if self.kind(new_child) == NodeKind::Attribute {
            return Err(DomError::WrongNodeKind {
                node: new_child,
                expected: NodeKind::Element,
                actual: NodeKind::Attribute,
            });
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) || self.kind(reference) == NodeKind::Attribute {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }
        if parent == self.document_node()
            && self.kind(new_child) == NodeKind::Element
            && self.document_element().is_some_and(|root| root != new_child)
        {
            return Err(DomError::MultipleRoots);
        }

        self.detach(new_child);
        let children = &mut self.nodes[parent.0].children;
        let index = reference
            .and_then(|r| children.iter().position(|&c| c == r))
            .unwrap_or(children.len());
        children.insert(index, new_child);
        self.slot_mut(new_child).parent = Some(parent);
        Ok(())
    }

    /// Append `new_child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, new_child: NodeId) -> Result<()> {
        self.insert_before(parent, new_child, None)
    }

    /// Detach `child` from `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.parent(child) != Some(parent) || self.kind(child) == NodeKind::Attribute {
            return Err(DomError::NotAChild { parent, child });
        }
        tracing::trace!(?parent, ?child, "remove child");
        self.detach(child);
        Ok(())
    }

    /// Put `new_child` where `old_child` is and detach `old_child`.
    pub fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) -> Result<()> {
        if self.parent(old_child) != Some(parent) || self.kind(old_child) == NodeKind::Attribute {
            return Err(DomError::NotAChild {
                parent,
                child: old_child,
            });
        }
        self.detach(new_child);
        let children = &mut self.nodes[parent.0].children;
        if let Some(index) = children.iter().position(|&c| c == old_child) {
            children[index] = new_child;
        }
        self.slot_mut(new_child).parent = Some(parent);
        self.slot_mut(old_child).parent = None;
        Ok(())
    }

    /// Detach every child of a node.
    pub fn remove_all_children(&mut self, id: NodeId) -> Result<()> {
        self.require_container(id)?;
        let children = std::mem::take(&mut self.slot_mut(id).children);
        for child in children {
            self.slot_mut(child).parent = None;
        }
        Ok(())
    }

    /// Add `attribute` to `owner` before `reference`, or last when `None`.
    ///
    /// An existing attribute with the same name is removed first, so an
    /// element never carries two attributes with one name.
    pub fn insert_attribute_before(&mut self, owner: NodeId, attribute: NodeId, reference: Option<NodeId>) -> Result<()> {
        self.require_element(owner)?;
        if self.kind(attribute) != NodeKind::Attribute {
            return Err(DomError::WrongNodeKind {
                node: attribute,
                expected: NodeKind::Attribute,
                actual: self.kind(attribute),
            });
        }
        if let Some(reference) = reference {
            if self.owner_element(reference) != Some(owner) {
                return Err(DomError::NotAChild {
                    parent: owner,
                    child: reference,
                });
            }
        }

        let mut reference = reference;
        let duplicate = self.name(attribute).and_then(|name| {
            self.find_attribute(owner, &name.local_name, &name.namespace_uri)
        });
        if let Some(duplicate) = duplicate.filter(|&d| d != attribute) {
            if reference == Some(duplicate) {
                reference = self.next_sibling(duplicate);
            }
            self.detach(duplicate);
        }

        self.detach(attribute);
        if let NodeData::Element(data) = &mut self.nodes[owner.0].data {
            let index = reference
                .and_then(|r| data.attributes.iter().position(|&a| a == r))
                .unwrap_or(data.attributes.len());
            data.attributes.insert(index, attribute);
        }
        self.slot_mut(attribute).parent = Some(owner);
        Ok(())
    }

    /// Detach `attribute` from `owner`.
    pub fn remove_attribute(&mut self, owner: NodeId, attribute: NodeId) -> Result<()> {
        if self.owner_element(attribute) != Some(owner) {
            return Err(DomError::NotAChild {
                parent: owner,
                child: attribute,
            });
        }
        tracing::trace!(?owner, ?attribute, "remove attribute");
        self.detach(attribute);
        Ok(())
    }

    // ==================== Namespaces ====================

    /// Declarations made directly on an element.
    pub fn namespace_declarations(&self, element: NodeId) -> &[NamespaceDecl] {
        match &self.slot(element).data {
            NodeData::Element(data) => &data.namespaces,
            _ => &[],
        }
    }

    /// Declare (or redeclare) a namespace prefix on an element.
    pub fn declare_namespace(&mut self, element: NodeId, prefix: Option<&str>, uri: &str) -> Result<()> {
        self.require_element(element)?;
        if let NodeData::Element(data) = &mut self.slot_mut(element).data {
            let prefix = prefix.filter(|p| !p.is_empty()).map(str::to_string);
            match data.namespaces.iter_mut().find(|d| d.prefix == prefix) {
                Some(existing) => existing.uri = uri.to_string(),
                None => data.namespaces.push(NamespaceDecl {
                    prefix,
                    uri: uri.to_string(),
                }),
            }
        }
        Ok(())
    }

    /// Resolve a prefix (`None` for the default namespace) to a namespace
    /// URI, walking from `element` up through its ancestors.
    ///
    /// An unprefixed lookup with no default declaration in scope resolves to
    /// the empty namespace.
    pub fn lookup_namespace(&self, element: NodeId, prefix: Option<&str>) -> Option<String> {
        let prefix = prefix.filter(|p| !p.is_empty());
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE.to_string());
        }
        let mut current = Some(element);
        while let Some(id) = current {
            let decl = self
                .namespace_declarations(id)
                .iter()
                .find(|d| d.prefix.as_deref() == prefix);
            if let Some(decl) = decl {
                return Some(decl.uri.clone());
            }
            current = self.parent(id);
        }
        match prefix {
            None => Some(String::new()),
            Some(_) => None,
        }
    }

    /// Find how `uri` can be written in scope of `element`.
    ///
    /// Returns `Some(None)` when `uri` is the in-scope default namespace,
    /// `Some(Some(prefix))` for a prefix currently bound to it, and `None`
    /// when nothing in scope refers to it. Prefixes shadowed by a closer
    /// declaration are skipped.
    pub fn lookup_prefix(&self, element: NodeId, uri: &str) -> Option<Option<String>> {
        if uri == XML_NAMESPACE {
            return Some(Some("xml".to_string()));
        }
        let mut current = Some(element);
        while let Some(id) = current {
            for decl in self.namespace_declarations(id) {
                if decl.uri == uri
                    && self.lookup_namespace(element, decl.prefix.as_deref()).as_deref() == Some(uri)
                {
                    return Some(decl.prefix.clone());
                }
            }
            current = self.parent(id);
        }
        if uri.is_empty() && self.lookup_namespace(element, None).as_deref() == Some("") {
            return Some(None);
        }
        None
    }

    /// Find a bound, non-default prefix for `uri` in scope of `element`.
    pub fn lookup_bound_prefix(&self, element: NodeId, uri: &str) -> Option<String> {
        if uri == XML_NAMESPACE {
            return Some("xml".to_string());
        }
        let mut current = Some(element);
        while let Some(id) = current {
            for decl in self.namespace_declarations(id) {
                if let Some(prefix) = &decl.prefix {
                    if decl.uri == uri
                        && self.lookup_namespace(element, Some(prefix)).as_deref() == Some(uri)
                    {
                        return Some(prefix.clone());
                    }
                }
            }
            current = self.parent(id);
        }
        None
    }
}
