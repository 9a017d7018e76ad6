//! Typed cursors.
//!
//! A cursor is a stateful iterator over the nodes of one slot (the
//! recognized children of an element, or a single node) that can also
//! insert, retype and delete nodes at its position. Cursors implement
//! [`XmlNode`], so the current item is read and written through the cursor
//! itself.
//!
//! # State machine
//!
//! ```text
//!            move_next (found)                     move_next (none left)
//! Initial ─────────────────────▶ Element/Attribute ─────────────────────▶ End
//!    │                               │      ▲
//!    │ move_next (nothing found)     │      │ move_next
//!    ▼                        remove │      │
//!  Empty                             ▼      │
//!                              ElementPrimed/AttributePrimed
//! ```
//!
//! `End` and `Empty` are terminal until [`XmlCursor::reset`].

mod child;
mod self_cursor;
mod state;

pub use child::ChildCursor;
pub use self_cursor::SelfCursor;
pub use state::CursorState;

use crate::error::Result;
use crate::flags::CursorFlags;
use crate::known_type::LogicalType;
use crate::node::XmlNode;
use crate::saved::SavedNode;
use xmladapt_dom::Document;

/// Navigation and mutation over a slot of typed nodes.
pub trait XmlCursor: XmlNode {
    fn flags(&self) -> CursorFlags;

    fn has_current(&self) -> bool;

    /// Step to the next recognized node. Returns `false` once exhausted.
    fn move_next(&mut self, doc: &Document) -> bool;

    /// Jump to a previously saved node, which must be a recognized node of
    /// this cursor's slot.
    fn move_to(&mut self, doc: &Document, position: &SavedNode) -> Result<()>;

    /// Abandon the current position and become exhausted.
    fn move_to_end(&mut self, doc: &Document);

    fn reset(&mut self);

    /// Insert a node of type `logical_type` at the current position and
    /// make it current.
    fn create(&mut self, doc: &mut Document, logical_type: &LogicalType) -> Result<()>;

    /// Retype the current node.
    fn coerce(&mut self, doc: &mut Document, logical_type: &LogicalType) -> Result<()>;

    /// Delete the current node. The cursor is left just before the node
    /// that followed it.
    fn remove(&mut self, doc: &mut Document) -> Result<()>;

    /// Advance and retype, or create when exhausted. Writing a collection
    /// element by element reuses existing nodes this way.
    fn make_next(&mut self, doc: &mut Document, logical_type: &LogicalType) -> Result<()> {
        if self.move_next(doc) {
            self.coerce(doc, logical_type)
        } else {
            self.create(doc, logical_type)
        }
    }

    /// Delete every remaining node from the current position on.
    fn remove_to_end(&mut self, doc: &mut Document) -> Result<()> {
        while self.move_next(doc) {
            self.remove(doc)?;
        }
        Ok(())
    }
}
