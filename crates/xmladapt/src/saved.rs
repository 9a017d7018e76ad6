//! Snapshots of cursor positions.

use crate::ext;
use crate::known_type::LogicalType;
use crate::name::XmlName;
use crate::node::BoundNode;
use serde::{Deserialize, Serialize};
use xmladapt_dom::{Document, NodeId, NodeKind};

/// Structural address of a node: element ordinals from the document
/// element down, plus an attribute ordinal for attribute nodes.
///
/// Only elements are counted, so text and comments between siblings do not
/// shift a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath {
    pub elements: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<usize>,
}

impl NodePath {
    /// Address of `node`, `None` when it is not attached under the
    /// document element.
    pub fn of(doc: &Document, node: NodeId) -> Option<NodePath> {
        let mut current = node;
        let attribute = match doc.kind(node) {
            NodeKind::Attribute => {
                let owner = doc.owner_element(node)?;
                let index = doc.attributes(owner).iter().position(|&a| a == node)?;
                current = owner;
                Some(index)
            }
            NodeKind::Element => None,
            _ => return None,
        };

        let mut elements = Vec::new();
        while !doc.is_document_element(current) {
            let parent = doc.parent(current)?;
            let index = doc.child_elements(parent).position(|child| child == current)?;
            elements.push(index);
            current = parent;
        }
        elements.reverse();
        Some(NodePath { elements, attribute })
    }

    pub fn resolve(&self, doc: &Document) -> Option<NodeId> {
        let mut current = doc.document_element()?;
        for &index in &self.elements {
            current = doc.child_elements(current).nth(index)?;
        }
        match self.attribute {
            Some(index) => doc.attributes(current).get(index).copied(),
            None => Some(current),
        }
    }
}

/// Immutable record of where a cursor was and what it held there.
///
/// A saved node survives serialization of the document: it can be
/// resolved against a re-parsed copy as long as the structure up to the
/// node is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedNode {
    path: Option<NodePath>,
    name: XmlName,
    logical_type: LogicalType,
}

impl SavedNode {
    pub(crate) fn capture(doc: &Document, node: NodeId, logical_type: LogicalType) -> Self {
        Self {
            path: NodePath::of(doc, node),
            name: ext::node_name(doc, node).unwrap_or_else(|| XmlName::local("")),
            logical_type,
        }
    }

    pub(crate) fn detached(name: XmlName, logical_type: LogicalType) -> Self {
        Self {
            path: None,
            name,
            logical_type,
        }
    }

    pub fn path(&self) -> Option<&NodePath> {
        self.path.as_ref()
    }

    pub fn name(&self) -> &XmlName {
        &self.name
    }

    pub fn logical_type(&self) -> &LogicalType {
        &self.logical_type
    }

    /// The node this snapshot points at, if it still exists with the same
    /// name.
    pub fn resolve(&self, doc: &Document) -> Option<NodeId> {
        let node = self.path.as_ref()?.resolve(doc)?;
        (ext::node_name(doc, node).as_ref() == Some(&self.name)).then_some(node)
    }

    pub fn bind(&self, doc: &Document) -> Option<BoundNode> {
        self.resolve(doc)
            .map(|node| BoundNode::new(node, self.logical_type.clone()))
    }
}
