use super::XmlCursor;
use super::state::{CursorState, next_match};
use crate::error::{Error, Result};
use crate::ext;
use crate::flags::CursorFlags;
use crate::known_type::{KnownType, LogicalType, NodeAxis, TypeMap};
use crate::name::XmlName;
use crate::node::{self, XmlNode};
use crate::saved::SavedNode;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use xmladapt_dom::{Document, NodeId, NodeKind};

/// The element whose children a cursor walks.
#[derive(Debug, Clone)]
enum ParentNode {
    Bound(NodeId),
    /// Not created yet: the cursor of the slot that will hold it.
    Virtual(Box<ChildCursor>),
}

/// Cursor over the recognized children (elements, attributes or both) of
/// one element.
///
/// The parent may itself be virtual, as when walking into a slot that has
/// not been written yet. Reading such a cursor finds nothing; the first
/// write realizes the whole chain of missing parents.
#[derive(Debug, Clone)]
pub struct ChildCursor {
    parent: ParentNode,
    type_map: Arc<TypeMap>,
    flags: CursorFlags,
    state: CursorState,
    current_type: Option<LogicalType>,
    /// Node realized for this slot, shared by every clone of the cursor so
    /// that a write through a child cursor's virtual parent is seen here.
    realized: Rc<Cell<Option<NodeId>>>,
}

impl ChildCursor {
    pub fn new(parent: NodeId, type_map: Arc<TypeMap>, flags: CursorFlags) -> Self {
        Self::with_parent(ParentNode::Bound(parent), type_map, flags)
    }

    fn with_parent(parent: ParentNode, type_map: Arc<TypeMap>, flags: CursorFlags) -> Self {
        Self {
            parent,
            type_map,
            flags,
            state: CursorState::Initial,
            current_type: None,
            realized: Rc::new(Cell::new(None)),
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn type_map(&self) -> &Arc<TypeMap> {
        &self.type_map
    }

    /// The parent element, if it exists yet.
    pub fn parent_id(&self) -> Option<NodeId> {
        match &self.parent {
            ParentNode::Bound(id) => Some(*id),
            ParentNode::Virtual(cursor) => cursor.node_id(),
        }
    }

    /// Cursor over the current node's children. When there is no current
    /// node the new cursor's parent is this cursor's (virtual) slot.
    pub fn select_children(&self, type_map: Arc<TypeMap>, flags: CursorFlags) -> ChildCursor {
        let parent = match self.current() {
            Some(id) => ParentNode::Bound(id),
            None => ParentNode::Virtual(Box::new(self.clone())),
        };
        Self::with_parent(parent, type_map, flags)
    }

    /// The current node, or the node a clone realized while this cursor
    /// was `Empty`.
    fn current(&self) -> Option<NodeId> {
        match self.state {
            CursorState::Empty => self.realized.get(),
            state => state.current(),
        }
    }

    /// Move from `Empty` onto the node a clone realized for this slot.
    fn adopt_realized(&mut self, doc: &Document) {
        if self.state != CursorState::Empty {
            return;
        }
        let Some(node) = self.realized.get() else {
            return;
        };
        let parent = self.parent_id();
        let attached = parent.is_some() && doc.parent(node) == parent;
        let logical_type = node::resolve(doc, &self.type_map, node).map(|entry| entry.logical_type.clone());
        match logical_type {
            Some(logical_type) if attached => {
                let state = match doc.kind(node) {
                    NodeKind::Attribute => CursorState::Attribute(node),
                    _ => CursorState::Element(node),
                };
                self.set_current(state, Some(logical_type));
            }
            _ => self.realized.set(None),
        }
    }

    fn step(&self, doc: &Document) -> (CursorState, Option<LogicalType>) {
        next_match(doc, self.parent_id(), self.flags, &self.type_map, self.state)
    }

    fn set_current(&mut self, state: CursorState, logical_type: Option<LogicalType>) {
        self.state = state;
        self.current_type = logical_type;
    }

    fn parent_namespace(&self, doc: &Document) -> String {
        self.parent_id()
            .map(|parent| ext::namespace_of(doc, parent))
            .unwrap_or_default()
    }

    fn axis(&self) -> NodeAxis {
        if self.flags.includes_elements() {
            NodeAxis::Element
        } else {
            NodeAxis::Attribute
        }
    }

    /// Make the parent exist. A slot filled from `Empty` also drops the
    /// parent's nil marker.
    fn realize_parent(&mut self, doc: &mut Document, clear_nil: bool) -> Result<NodeId> {
        let parent = match &mut self.parent {
            ParentNode::Bound(id) => *id,
            ParentNode::Virtual(cursor) => cursor.realize(doc)?,
        };
        self.parent = ParentNode::Bound(parent);
        if clear_nil {
            ext::set_nil(doc, parent, false)?;
        }
        Ok(parent)
    }

    fn create_element(doc: &mut Document, parent: NodeId, entry: &KnownType, reference: Option<NodeId>) -> Result<NodeId> {
        let name = entry.effective_name(NodeAxis::Element, &ext::namespace_of(doc, parent));
        trace!(logical_type = %entry.logical_type, name = %name, "create element");
        let element = ext::create_element(doc, parent, &name)?;
        // Elements always precede attributes, so an attribute reference
        // means "after the last element".
        let reference = reference.filter(|&r| doc.kind(r) == NodeKind::Element);
        doc.insert_before(parent, element, reference)?;
        if let Some(discriminator) = &entry.discriminator {
            ext::set_discriminator(doc, element, Some(discriminator))?;
        }
        Ok(element)
    }

    fn create_attribute(doc: &mut Document, parent: NodeId, entry: &KnownType, reference: Option<NodeId>) -> Result<NodeId> {
        let name = entry.effective_name(NodeAxis::Attribute, "");
        trace!(logical_type = %entry.logical_type, name = %name, "create attribute");
        let attribute = ext::create_attribute(doc, parent, &name, "")?;
        let reference = reference.filter(|&r| doc.kind(r) == NodeKind::Attribute);
        doc.insert_attribute_before(parent, attribute, reference)?;
        Ok(attribute)
    }

    fn delete(doc: &mut Document, node: NodeId) -> Result<()> {
        let parent = doc.parent(node).ok_or(Error::NotInRemovableState)?;
        match doc.kind(node) {
            NodeKind::Attribute => doc.remove_attribute(parent, node)?,
            _ => doc.remove_child(parent, node)?,
        }
        Ok(())
    }
}

impl XmlNode for ChildCursor {
    fn node_id(&self) -> Option<NodeId> {
        self.current()
    }

    fn logical_type(&self) -> &LogicalType {
        self.current_type
            .as_ref()
            .unwrap_or_else(|| self.type_map.default_type())
    }

    fn name(&self, doc: &Document) -> XmlName {
        match self.current().and_then(|id| ext::node_name(doc, id)) {
            Some(name) => name,
            None => self
                .type_map
                .default_entry()
                .effective_name(self.axis(), &self.parent_namespace(doc)),
        }
    }

    fn is_element(&self, doc: &Document) -> bool {
        match self.current() {
            Some(id) => doc.kind(id) == NodeKind::Element,
            None => self.flags.includes_elements(),
        }
    }

    fn discriminator(&self, doc: &Document) -> Option<XmlName> {
        match self.current() {
            Some(id) => ext::discriminator(doc, id),
            None => self.type_map.default_entry().discriminator.clone(),
        }
    }

    /// Create the default node if the cursor found nothing.
    fn realize(&mut self, doc: &mut Document) -> Result<NodeId> {
        self.adopt_realized(doc);
        if let Some(id) = self.state.current() {
            return Ok(id);
        }
        if !self.flags.supports_mutation() {
            return Err(Error::IteratorNotMutable);
        }
        if self.state != CursorState::Empty {
            return Err(Error::NotInRealizableState);
        }
        let default_type = self.type_map.default_type().clone();
        self.create(doc, &default_type)?;
        self.state.current().ok_or(Error::NotInRealizableState)
    }
}

impl XmlCursor for ChildCursor {
    fn flags(&self) -> CursorFlags {
        self.flags
    }

    fn has_current(&self) -> bool {
        self.state.has_current()
    }

    fn move_next(&mut self, doc: &Document) -> bool {
        self.adopt_realized(doc);
        if self.state.is_terminal() {
            return false;
        }
        let from_initial = self.state == CursorState::Initial;
        let (next, logical_type) = self.step(doc);
        match logical_type {
            Some(logical_type) => {
                let extra = !self.flags.allows_multiple()
                    && next_match(doc, self.parent_id(), self.flags, &self.type_map, next).1.is_some();
                if extra {
                    warn!(
                        logical_type = %logical_type,
                        "single-valued slot has more than one matching node"
                    );
                }
                self.set_current(next, Some(logical_type));
                true
            }
            None => {
                let terminal = if from_initial {
                    CursorState::Empty
                } else {
                    CursorState::End
                };
                self.set_current(terminal, None);
                false
            }
        }
    }

    fn move_to(&mut self, doc: &Document, position: &SavedNode) -> Result<()> {
        let node = position.resolve(doc).ok_or(Error::CannotMoveToNode)?;
        let parent = self.parent_id().ok_or(Error::CannotMoveToNode)?;
        if doc.parent(node) != Some(parent) {
            return Err(Error::CannotMoveToNode);
        }
        let state = match doc.kind(node) {
            NodeKind::Element if self.flags.includes_elements() => CursorState::Element(node),
            NodeKind::Attribute if self.flags.includes_attributes() => CursorState::Attribute(node),
            _ => return Err(Error::CannotMoveToNode),
        };
        let entry = node::resolve(doc, &self.type_map, node).ok_or(Error::CannotMoveToNode)?;
        let logical_type = entry.logical_type.clone();
        self.set_current(state, Some(logical_type));
        Ok(())
    }

    fn move_to_end(&mut self, doc: &Document) {
        self.adopt_realized(doc);
        let terminal = match self.state {
            CursorState::End | CursorState::Empty => self.state,
            CursorState::Initial if self.step(doc).1.is_none() => CursorState::Empty,
            _ => CursorState::End,
        };
        self.set_current(terminal, None);
    }

    fn reset(&mut self) {
        self.realized.set(None);
        self.set_current(CursorState::Initial, None);
    }

    fn create(&mut self, doc: &mut Document, logical_type: &LogicalType) -> Result<()> {
        let entry = self.type_map.entry_for(logical_type)?.clone();
        self.adopt_realized(doc);
        let fills_empty = self.state == CursorState::Empty;
        let reference = match self.state {
            CursorState::Element(id) | CursorState::Attribute(id) => Some(id),
            CursorState::End | CursorState::Empty => None,
            _ => return Err(Error::NotInCreatableState),
        };
        let as_element = self.flags.includes_elements();
        if !as_element && entry.discriminator.is_some() {
            return Err(Error::DiscriminatorOnAttribute(entry.logical_type));
        }

        let parent = self.realize_parent(doc, fills_empty)?;
        let node = if as_element {
            Self::create_element(doc, parent, &entry, reference)?
        } else {
            Self::create_attribute(doc, parent, &entry, reference)?
        };
        let state = if as_element {
            CursorState::Element(node)
        } else {
            CursorState::Attribute(node)
        };
        if fills_empty {
            self.realized.set(Some(node));
        }
        self.set_current(state, Some(entry.logical_type));
        Ok(())
    }

    fn coerce(&mut self, doc: &mut Document, logical_type: &LogicalType) -> Result<()> {
        self.adopt_realized(doc);
        let current = self.state.current().ok_or(Error::NotInCoercibleState)?;
        let type_map = Arc::clone(&self.type_map);
        let entry = type_map.entry_for(logical_type)?;
        let node = node::coerce_node(doc, current, entry)?;
        let state = match self.state {
            CursorState::Attribute(_) => CursorState::Attribute(node),
            _ => CursorState::Element(node),
        };
        self.set_current(state, Some(entry.logical_type.clone()));
        Ok(())
    }

    fn remove(&mut self, doc: &mut Document) -> Result<()> {
        self.adopt_realized(doc);
        let removed = self.state.current().ok_or(Error::NotInRemovableState)?;
        let primed = match self.step(doc).0 {
            CursorState::Element(next) => CursorState::ElementPrimed(next),
            CursorState::Attribute(next) => CursorState::AttributePrimed(next),
            _ => CursorState::End,
        };
        debug!(node = ?removed, "remove node");
        Self::delete(doc, removed)?;
        self.set_current(primed, None);
        Ok(())
    }
}
