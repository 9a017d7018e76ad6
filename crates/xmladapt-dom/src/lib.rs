//! Arena-backed mutable XML tree.
//!
//! This crate is the node provider underneath [`xmladapt`](../xmladapt/index.html).
//! It wraps [`quick-xml`] to read text into a [`Document`] and to write it
//! back, and offers the structural operations a typed cursor needs: element
//! and attribute synthesis, `insert_before`/`remove_child`, ordered
//! attribute collections, and namespace scope lookup.
//!
//! # Overview
//!
//! The main types are:
//! - [`Document`]: owns every node; all navigation and mutation goes through it
//! - [`NodeId`]: a copyable handle to one node of a document
//! - [`QName`]: a resolved element or attribute name
//! - [`NamespaceDecl`]: an `xmlns` declaration, kept apart from attributes
//!
//! # Example
//!
//! ```rust
//! use xmladapt_dom::{Document, QName};
//!
//! let mut doc = Document::parse(r#"<order id="7"><line sku="a1"/></order>"#).unwrap();
//! let root = doc.document_element().unwrap();
//!
//! let first = doc.child_elements(root).next();
//! let note = doc.create_element(QName::local("note"));
//! doc.insert_before(root, note, first).unwrap();
//!
//! assert_eq!(
//!     doc.to_xml().unwrap(),
//!     r#"<order id="7"><note/><line sku="a1"/></order>"#
//! );
//! ```

pub mod document;
pub mod error;
pub mod parser;
pub mod types;
pub mod writer;

// Re-export main types
pub use document::Document;
pub use error::{DomError, Result};
pub use types::{
    NamespaceDecl, NodeId, NodeKind, ParseOptions, QName, XML_NAMESPACE, XMLNS_NAMESPACE,
};
