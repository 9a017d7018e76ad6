//! Error types for the XML tree.

use crate::{NodeId, NodeKind};
use thiserror::Error;

/// Result type alias for xmladapt-dom operations.
pub type Result<T> = std::result::Result<T, DomError>;

/// Errors raised while parsing, navigating, mutating or writing a [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// XML syntax error from quick-xml.
    #[error("XML syntax error: {message}{}", .position.map(|p| format!(" at byte {}", p)).unwrap_or_default())]
    XmlSyntax {
        message: String,
        /// Byte offset where the error occurred.
        position: Option<u64>,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What was expected when EOF was encountered.
        expected: String,
    },

    /// Mismatched end tag.
    #[error("Mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    /// Invalid XML structure.
    #[error("Invalid XML structure: {message}")]
    InvalidStructure { message: String },

    /// Empty document (no root element).
    #[error("Empty XML document: no root element found")]
    EmptyDocument,

    /// Multiple root elements.
    #[error("Invalid XML: multiple root elements")]
    MultipleRoots,

    /// A prefix was used without a matching `xmlns` declaration in scope.
    #[error("Namespace prefix '{prefix}' is not declared")]
    UndeclaredPrefix { prefix: String },

    /// The node exists but is not of the kind the operation needs.
    #[error("Node {node:?} is a {actual:?} node, expected {expected:?}")]
    WrongNodeKind {
        node: NodeId,
        expected: NodeKind,
        actual: NodeKind,
    },

    /// The node is not a child (or attribute) of the given parent.
    #[error("Node {child:?} is not attached to {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Writing the tree back to text failed.
    #[error("Failed to write XML: {message}")]
    Write { message: String },
}

impl From<quick_xml::Error> for DomError {
    fn from(err: quick_xml::Error) -> Self {
        DomError::XmlSyntax {
            message: err.to_string(),
            position: None,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for DomError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DomError::XmlSyntax {
            message: format!("Attribute error: {}", err),
            position: None,
        }
    }
}
