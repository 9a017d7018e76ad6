//! Position tracking and the raw stepping rules shared by cursors.
//!
//! Stepping is split in two layers. [`advance`] moves to the next candidate
//! node without looking at types: child elements in document order, then
//! attributes in document order. [`next_match`] repeats `advance` until the
//! type map recognizes a node, so unrecognized nodes are skipped silently.

use crate::flags::CursorFlags;
use crate::known_type::{LogicalType, TypeMap};
use crate::node;
use xmladapt_dom::{Document, NodeId};

/// Where a cursor stands.
///
/// The primed states hold the node that follows a removed one: the next
/// `move_next` lands on it without stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorState {
    /// Before the first item.
    #[default]
    Initial,
    Element(NodeId),
    Attribute(NodeId),
    ElementPrimed(NodeId),
    AttributePrimed(NodeId),
    /// Exhausted after at least one item was produced.
    End,
    /// Exhausted without producing anything.
    Empty,
}

impl CursorState {
    /// The node the cursor is positioned on, primed nodes excluded.
    pub fn current(self) -> Option<NodeId> {
        match self {
            CursorState::Element(id) | CursorState::Attribute(id) => Some(id),
            _ => None,
        }
    }

    pub fn has_current(self) -> bool {
        self.current().is_some()
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CursorState::End | CursorState::Empty)
    }
}

/// One raw step: the next element or attribute of `parent`, ignoring types.
pub(crate) fn advance(doc: &Document, parent: Option<NodeId>, flags: CursorFlags, state: CursorState) -> CursorState {
    match state {
        CursorState::Initial => parent
            .and_then(|p| first_element(doc, p, flags).or_else(|| first_attribute(doc, p, flags)))
            .unwrap_or(CursorState::End),
        CursorState::Element(node) => next_element(doc, node)
            .or_else(|| parent.and_then(|p| first_attribute(doc, p, flags)))
            .unwrap_or(CursorState::End),
        CursorState::Attribute(node) => doc
            .next_sibling(node)
            .map_or(CursorState::End, CursorState::Attribute),
        CursorState::ElementPrimed(node) => CursorState::Element(node),
        CursorState::AttributePrimed(node) => CursorState::Attribute(node),
        CursorState::End | CursorState::Empty => state,
    }
}

fn first_element(doc: &Document, parent: NodeId, flags: CursorFlags) -> Option<CursorState> {
    if !flags.includes_elements() {
        return None;
    }
    doc.child_elements(parent).next().map(CursorState::Element)
}

fn first_attribute(doc: &Document, parent: NodeId, flags: CursorFlags) -> Option<CursorState> {
    if !flags.includes_attributes() {
        return None;
    }
    doc.attributes(parent).first().copied().map(CursorState::Attribute)
}

fn next_element(doc: &Document, node: NodeId) -> Option<CursorState> {
    let parent = doc.parent(node)?;
    doc.child_elements(parent)
        .skip_while(|&child| child != node)
        .nth(1)
        .map(CursorState::Element)
}

/// Step until a node the type map recognizes, or to `End`.
///
/// Returns the new state and the recognized type.
pub(crate) fn next_match(
    doc: &Document,
    parent: Option<NodeId>,
    flags: CursorFlags,
    type_map: &TypeMap,
    state: CursorState,
) -> (CursorState, Option<LogicalType>) {
    let mut state = state;
    loop {
        state = advance(doc, parent, flags, state);
        let Some(candidate) = state.current() else {
            return (CursorState::End, None);
        };
        match node::resolve(doc, type_map, candidate) {
            Some(entry) => return (state, Some(entry.logical_type.clone())),
            None => tracing::debug!(node = ?candidate, "skipping unrecognized node"),
        }
    }
}
