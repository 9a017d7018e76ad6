//! The typed view of a single node.
//!
//! Every handle in this crate ([`BoundNode`], and the cursors) implements
//! [`XmlNode`]. Handles hold [`NodeId`]s and never borrow the document; each
//! call is given the [`Document`] it should read or mutate.

use crate::cursor::ChildCursor;
use crate::error::{Error, Result};
use crate::ext;
use crate::flags::CursorFlags;
use crate::known_type::{KnownType, LogicalType, NodeAxis, NodeSignature, TypeMap};
use crate::name::XmlName;
use crate::saved::SavedNode;
use std::sync::Arc;
use xmladapt_dom::{Document, NodeId, NodeKind};

/// Read and write access to one element or attribute slot.
///
/// A slot may be *virtual*: a cursor that found nothing still answers
/// `name`, `value` and friends from its default type, and only creates the
/// node when [`XmlNode::realize`] (or a write) forces it.
pub trait XmlNode {
    /// The node currently bound, if any.
    fn node_id(&self) -> Option<NodeId>;

    /// Logical type of the bound node, or the default for a virtual slot.
    fn logical_type(&self) -> &LogicalType;

    fn name(&self, doc: &Document) -> XmlName;

    fn is_element(&self, doc: &Document) -> bool;

    /// Make sure the node exists and return it.
    fn realize(&mut self, doc: &mut Document) -> Result<NodeId>;

    fn exists(&self) -> bool {
        self.node_id().is_some()
    }

    fn is_attribute(&self, doc: &Document) -> bool {
        match self.node_id() {
            Some(id) => doc.kind(id) == NodeKind::Attribute,
            None => !self.is_element(doc),
        }
    }

    fn is_root(&self, doc: &Document) -> bool {
        self.node_id().is_some_and(|id| doc.is_document_element(id))
    }

    fn discriminator(&self, doc: &Document) -> Option<XmlName> {
        self.node_id().and_then(|id| ext::discriminator(doc, id))
    }

    fn is_nil(&self, doc: &Document) -> bool {
        self.node_id().is_some_and(|id| ext::is_nil(doc, id))
    }

    fn value(&self, doc: &Document) -> String {
        self.node_id().map(|id| doc.text_content(id)).unwrap_or_default()
    }

    /// Markup of the node, `None` for a virtual slot.
    fn xml(&self, doc: &Document) -> Result<Option<String>> {
        self.node_id()
            .map(|id| doc.node_to_xml(id))
            .transpose()
            .map_err(Error::from)
    }

    fn set_nil(&mut self, doc: &mut Document, nil: bool) -> Result<()> {
        if !self.is_element(doc) {
            return Err(Error::NotValidOnAttribute);
        }
        let id = self.realize(doc)?;
        ext::set_nil(doc, id, nil)
    }

    /// Replace the node's text. Writing a value to an element also clears
    /// its nil marker.
    fn set_value(&mut self, doc: &mut Document, value: &str) -> Result<()> {
        let id = self.realize(doc)?;
        if doc.kind(id) == NodeKind::Element {
            ext::set_nil(doc, id, false)?;
        }
        doc.set_text_content(id, value)?;
        Ok(())
    }

    /// Empty the node, keeping its name and discriminator. Virtual slots
    /// are left alone.
    fn clear(&mut self, doc: &mut Document) -> Result<()> {
        match self.node_id() {
            Some(id) => ext::clear(doc, id),
            None => Ok(()),
        }
    }

    fn get_attribute<'d>(&self, doc: &'d Document, name: &XmlName) -> Option<&'d str> {
        self.node_id()
            .filter(|&id| doc.kind(id) == NodeKind::Element)
            .and_then(|id| ext::get_attribute(doc, id, name))
    }

    fn has_attribute(&self, doc: &Document, name: &XmlName) -> bool {
        self.get_attribute(doc, name).is_some()
    }

    /// Set an attribute on the node, realizing it first. An empty value
    /// removes the attribute.
    fn set_attribute(&mut self, doc: &mut Document, name: &XmlName, value: &str) -> Result<()> {
        if !self.is_element(doc) {
            return Err(Error::NotValidOnAttribute);
        }
        let id = self.realize(doc)?;
        ext::set_attribute(doc, id, name, Some(value))
    }

    /// Snapshot of the current position.
    fn save(&self, doc: &Document) -> SavedNode {
        match self.node_id() {
            Some(id) => SavedNode::capture(doc, id, self.logical_type().clone()),
            None => SavedNode::detached(self.name(doc), self.logical_type().clone()),
        }
    }
}

/// A plain handle to an existing element or attribute with a known type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundNode {
    id: NodeId,
    logical_type: LogicalType,
}

impl BoundNode {
    pub fn new(id: NodeId, logical_type: LogicalType) -> Self {
        Self { id, logical_type }
    }

    /// Bind the document element, typed by `type_map` (or its default when
    /// the element is not recognized).
    pub fn root(doc: &Document, type_map: &TypeMap) -> Option<Self> {
        let id = doc.document_element()?;
        let logical_type = resolve(doc, type_map, id)
            .unwrap_or_else(|| type_map.default_entry())
            .logical_type
            .clone();
        Some(Self::new(id, logical_type))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Cursor over this node's children.
    pub fn select_children(&self, type_map: Arc<TypeMap>, flags: CursorFlags) -> ChildCursor {
        ChildCursor::new(self.id, type_map, flags)
    }

    /// Change the node to hold `entry`'s type, renaming (and thereby
    /// replacing) it if the name differs.
    pub fn coerce(&mut self, doc: &mut Document, entry: &KnownType) -> Result<()> {
        self.id = coerce_node(doc, self.id, entry)?;
        self.logical_type = entry.logical_type.clone();
        Ok(())
    }
}

impl XmlNode for BoundNode {
    fn node_id(&self) -> Option<NodeId> {
        Some(self.id)
    }

    fn logical_type(&self) -> &LogicalType {
        &self.logical_type
    }

    fn name(&self, doc: &Document) -> XmlName {
        ext::node_name(doc, self.id).unwrap_or_else(|| XmlName::local(""))
    }

    fn is_element(&self, doc: &Document) -> bool {
        doc.kind(self.id) == NodeKind::Element
    }

    fn realize(&mut self, _doc: &mut Document) -> Result<NodeId> {
        Ok(self.id)
    }
}

/// What the type map needs to know about `node`.
pub fn signature(doc: &Document, node: NodeId) -> Option<NodeSignature> {
    let name = ext::node_name(doc, node)?;
    let parent_namespace = doc
        .parent(node)
        .map(|parent| ext::namespace_of(doc, parent))
        .unwrap_or_default();
    let (axis, discriminator) = match doc.kind(node) {
        NodeKind::Element => (NodeAxis::Element, ext::discriminator(doc, node)),
        NodeKind::Attribute => (NodeAxis::Attribute, None),
        _ => return None,
    };
    Some(NodeSignature {
        axis,
        name,
        parent_namespace,
        discriminator,
    })
}

/// Classify `node` against `type_map`.
pub fn resolve<'m>(doc: &Document, type_map: &'m TypeMap, node: NodeId) -> Option<&'m KnownType> {
    signature(doc, node).and_then(|sig| type_map.try_resolve(&sig))
}

/// Retype `node` in place. Returns the node now holding the value, which
/// is a fresh node when the name had to change.
pub(crate) fn coerce_node(doc: &mut Document, node: NodeId, entry: &KnownType) -> Result<NodeId> {
    let parent = doc.parent(node).ok_or(Error::NotInCoercibleState)?;
    let current = ext::node_name(doc, node);

    match doc.kind(node) {
        NodeKind::Element => {
            let name = entry.effective_name(NodeAxis::Element, &ext::namespace_of(doc, parent));
            let target = if current.as_ref() == Some(&name) {
                node
            } else {
                tracing::trace!(from = ?current, to = %name, "replace element on coerce");
                let replacement = ext::create_element(doc, parent, &name)?;
                doc.replace_child(parent, replacement, node)?;
                replacement
            };
            ext::set_discriminator(doc, target, entry.discriminator.as_ref())?;
            Ok(target)
        }
        NodeKind::Attribute => {
            if entry.discriminator.is_some() {
                return Err(Error::DiscriminatorOnAttribute(entry.logical_type.clone()));
            }
            let name = entry.effective_name(NodeAxis::Attribute, "");
            if current.as_ref() == Some(&name) {
                return Ok(node);
            }
            tracing::trace!(from = ?current, to = %name, "replace attribute on coerce");
            let replacement = ext::create_attribute(doc, parent, &name, "")?;
            doc.insert_attribute_before(parent, replacement, Some(node))?;
            doc.remove_attribute(parent, node)?;
            Ok(replacement)
        }
        _ => Err(Error::NotInCoercibleState),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn type_map() -> TypeMap {
        TypeMap::builder("Item")
            .add(KnownType::new("Item", "Item"))
            .add(KnownType::new("Other", "Other"))
            .add(KnownType::new("Typed", "Other").with_discriminator(XmlName::local("T")))
            .build()
            .unwrap()
    }

    #[test]
    fn test_signature_of_nested_element() {
        let doc = Document::parse(r#"<X xmlns="urn:x"><Item>1</Item></X>"#).unwrap();
        let root = doc.document_element().unwrap();
        let item = doc.child_elements(root).next().unwrap();

        let sig = signature(&doc, item).unwrap();
        assert_eq!(sig.axis, NodeAxis::Element);
        assert_eq!(sig.name, XmlName::new("Item", "urn:x"));
        assert_eq!(sig.parent_namespace, "urn:x");
        assert_eq!(resolve(&doc, &type_map(), item).unwrap().logical_type.as_str(), "Item");
    }

    #[test]
    fn test_node_kind_of_non_element_handles() {
        let doc = Document::parse(r#"<X Item="1">text</X>"#).unwrap();
        let root = doc.document_element().unwrap();
        let text = doc.children(root)[0];
        let attribute = doc.attributes(root)[0];
        let ty = LogicalType::new("Item");

        for id in [doc.document_node(), text] {
            let node = BoundNode::new(id, ty.clone());
            assert!(!node.is_element(&doc));
            assert!(!node.is_attribute(&doc));
        }
        let node = BoundNode::new(attribute, ty.clone());
        assert!(node.is_attribute(&doc));
        assert!(!node.is_element(&doc));
        assert!(BoundNode::new(root, ty).is_element(&doc));
    }

    #[test]
    fn test_root_binding() {
        let doc = Document::parse(r#"<Item>1</Item>"#).unwrap();
        let map = type_map();
        let node = BoundNode::root(&doc, &map).unwrap();
        assert_eq!(node.logical_type().as_str(), "Item");
        assert!(node.is_root(&doc));
        assert_eq!(node.value(&doc), "1");
    }

    #[test]
    fn test_set_value_clears_nil() {
        let mut doc = Document::parse(
            r#"<X xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="true"/>"#,
        )
        .unwrap();
        let map = type_map();
        let mut node = BoundNode::root(&doc, &map).unwrap();
        assert!(node.is_nil(&doc));

        node.set_value(&mut doc, "v").unwrap();
        assert!(!node.is_nil(&doc));
        assert_eq!(
            doc.to_xml().unwrap(),
            r#"<X xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">v</X>"#
        );
    }

    #[test]
    fn test_coerce_renames_element() {
        let mut doc = Document::parse(r#"<X><Item>1</Item><Other/></X>"#).unwrap();
        let map = type_map();
        let root = doc.document_element().unwrap();
        let item = doc.child_elements(root).next().unwrap();
        let mut node = BoundNode::new(item, LogicalType::new("Item"));

        node.coerce(&mut doc, map.entry_for(&LogicalType::new("Other")).unwrap())
            .unwrap();
        assert_ne!(node.id(), item);
        assert_eq!(node.name(&doc), XmlName::local("Other"));
        assert_eq!(doc.to_xml().unwrap(), r#"<X><Other/><Other/></X>"#);
    }

    #[test]
    fn test_coerce_same_name_sets_discriminator() {
        let mut doc = Document::parse(r#"<X><Other>1</Other></X>"#).unwrap();
        let map = type_map();
        let root = doc.document_element().unwrap();
        let other = doc.child_elements(root).next().unwrap();
        let mut node = BoundNode::new(other, LogicalType::new("Other"));

        node.coerce(&mut doc, map.entry_for(&LogicalType::new("Typed")).unwrap())
            .unwrap();
        assert_eq!(node.id(), other);
        assert_eq!(node.discriminator(&doc), Some(XmlName::local("T")));
        assert_eq!(node.value(&doc), "1");

        node.coerce(&mut doc, map.entry_for(&LogicalType::new("Other")).unwrap())
            .unwrap();
        assert_eq!(node.discriminator(&doc), None);
    }

    #[test]
    fn test_set_attribute_on_attribute_node_fails() {
        let mut doc = Document::parse(r#"<X a="1"/>"#).unwrap();
        let root = doc.document_element().unwrap();
        let attr = doc.attributes(root)[0];
        let mut node = BoundNode::new(attr, LogicalType::new("Item"));

        assert!(node.is_attribute(&doc));
        assert_eq!(
            node.set_attribute(&mut doc, &XmlName::local("b"), "2"),
            Err(Error::NotValidOnAttribute)
        );
        assert_eq!(node.xml(&doc).unwrap().as_deref(), Some(r#"a="1""#));
    }
}
