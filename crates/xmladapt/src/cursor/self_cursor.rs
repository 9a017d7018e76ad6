use super::XmlCursor;
use crate::error::{Error, Result};
use crate::ext;
use crate::flags::CursorFlags;
use crate::known_type::{LogicalType, TypeMap};
use crate::name::XmlName;
use crate::node::{self, XmlNode};
use crate::saved::SavedNode;
use std::sync::Arc;
use xmladapt_dom::{Document, NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Before,
    On,
    After,
}

/// Cursor over a single existing node.
///
/// It yields that node once. It can retype the node but never create or
/// delete it, so [`XmlCursor::create`] and [`XmlCursor::remove`] fail with
/// [`Error::Unsupported`].
#[derive(Debug, Clone)]
pub struct SelfCursor {
    node: NodeId,
    type_map: Arc<TypeMap>,
    logical_type: LogicalType,
    visit: Visit,
}

impl SelfCursor {
    /// Cursor over `node`, typed by `type_map` or its default.
    pub fn new(doc: &Document, node: NodeId, type_map: Arc<TypeMap>) -> Self {
        let logical_type = node::resolve(doc, &type_map, node)
            .unwrap_or_else(|| type_map.default_entry())
            .logical_type
            .clone();
        Self {
            node,
            type_map,
            logical_type,
            visit: Visit::Before,
        }
    }
}

impl XmlNode for SelfCursor {
    fn node_id(&self) -> Option<NodeId> {
        Some(self.node)
    }

    fn logical_type(&self) -> &LogicalType {
        &self.logical_type
    }

    fn name(&self, doc: &Document) -> XmlName {
        ext::node_name(doc, self.node).unwrap_or_else(|| XmlName::local(""))
    }

    fn is_element(&self, doc: &Document) -> bool {
        doc.kind(self.node) == NodeKind::Element
    }

    fn realize(&mut self, _doc: &mut Document) -> Result<NodeId> {
        Ok(self.node)
    }
}

impl XmlCursor for SelfCursor {
    fn flags(&self) -> CursorFlags {
        CursorFlags::ELEMENTS
    }

    fn has_current(&self) -> bool {
        self.visit == Visit::On
    }

    fn move_next(&mut self, _doc: &Document) -> bool {
        self.visit = match self.visit {
            Visit::Before => Visit::On,
            Visit::On | Visit::After => Visit::After,
        };
        self.visit == Visit::On
    }

    fn move_to(&mut self, doc: &Document, position: &SavedNode) -> Result<()> {
        if position.resolve(doc) != Some(self.node) {
            return Err(Error::CannotMoveToNode);
        }
        self.visit = Visit::On;
        Ok(())
    }

    fn move_to_end(&mut self, _doc: &Document) {
        self.visit = Visit::After;
    }

    fn reset(&mut self) {
        self.visit = Visit::Before;
    }

    fn create(&mut self, _doc: &mut Document, _logical_type: &LogicalType) -> Result<()> {
        Err(Error::Unsupported { operation: "create" })
    }

    fn coerce(&mut self, doc: &mut Document, logical_type: &LogicalType) -> Result<()> {
        if self.visit != Visit::On {
            return Err(Error::NotInCoercibleState);
        }
        let type_map = Arc::clone(&self.type_map);
        let entry = type_map.entry_for(logical_type)?;
        self.node = node::coerce_node(doc, self.node, entry)?;
        self.logical_type = entry.logical_type.clone();
        Ok(())
    }

    fn remove(&mut self, _doc: &mut Document) -> Result<()> {
        Err(Error::Unsupported { operation: "remove" })
    }
}
