//! Typed cursors over XML trees.
//!
//! This crate lets an object model keep its state directly in an XML tree.
//! A [`TypeMap`] ties logical types to element or attribute names (and, for
//! polymorphic slots, to an `xsi:type` discriminator). Cursors walk the
//! children of an element, yield only the nodes the map recognizes, and
//! insert, retype or delete nodes in place. Nodes that are missing are
//! created lazily on first write, parents included.
//!
//! # Overview
//!
//! - [`TypeMap`] / [`KnownType`]: the logical type ↔ node signature table
//! - [`ChildCursor`]: iterate and mutate the children of one element
//! - [`SelfCursor`]: treat a single existing node as a one-item slot
//! - [`BoundNode`]: a plain typed handle to an existing node
//! - [`SavedNode`]: a position snapshot to come back to with
//!   [`XmlCursor::move_to`]
//! - [`ext`]: attribute, nil and discriminator helpers
//!
//! The tree itself is a [`Document`] from `xmladapt-dom`. Cursors hold node
//! ids, not borrows, so the document is passed to each call.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use xmladapt::{ChildCursor, CursorFlags, Document, KnownType, LogicalType, TypeMap, XmlCursor, XmlNode};
//!
//! let mut doc = Document::parse("<List><Item>1</Item><Junk/><Item>2</Item></List>").unwrap();
//! let map = Arc::new(TypeMap::single(KnownType::new("Item", "Item")));
//! let root = doc.document_element().unwrap();
//!
//! let mut cursor = ChildCursor::new(root, map, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);
//! let mut values = Vec::new();
//! while cursor.move_next(&doc) {
//!     values.push(cursor.value(&doc));
//! }
//! assert_eq!(values, ["1", "2"]);
//!
//! cursor.create(&mut doc, &LogicalType::new("Item")).unwrap();
//! cursor.set_value(&mut doc, "3").unwrap();
//! assert_eq!(
//!     doc.to_xml().unwrap(),
//!     "<List><Item>1</Item><Junk/><Item>2</Item><Item>3</Item></List>"
//! );
//! ```

pub mod config;
pub mod cursor;
pub mod error;
pub mod ext;
pub mod flags;
pub mod known_type;
pub mod name;
pub mod node;
pub mod primitive;
pub mod saved;

// Re-export main types
pub use config::{TypeEntryConfig, TypeMapConfig};
pub use cursor::{ChildCursor, CursorState, SelfCursor, XmlCursor};
pub use error::{Error, ErrorKind, Result};
pub use flags::CursorFlags;
pub use known_type::{KnownType, LogicalType, NodeAxis, NodeSignature, TypeMap, TypeMapBuilder};
pub use name::XmlName;
pub use node::{BoundNode, XmlNode};
pub use primitive::{Primitive, XmlPrimitive};
pub use saved::{NodePath, SavedNode};
pub use xmladapt_dom::{Document, DomError, NodeId, ParseOptions};
