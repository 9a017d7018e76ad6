//! Error types for typed cursors and type maps.

use crate::LogicalType;
use thiserror::Error;
use xmladapt_dom::DomError;

/// Result type alias for xmladapt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by type maps, node adapters and cursors.
///
/// None of these are transient: they report a misconfigured type map or a
/// caller using a cursor outside of the states an operation allows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A logical type was used that the type map does not know.
    #[error("Type '{0}' is not registered in the type map")]
    UnknownType(LogicalType),

    /// The type map definition is inconsistent.
    #[error("Invalid type map: {message}")]
    InvalidTypeMap { message: String },

    /// A type map configuration file could not be read.
    #[error("Failed to load type map configuration: {message}")]
    ConfigFormat { message: String },

    #[error("The cursor is not in a state that allows creating a node")]
    NotInCreatableState,

    #[error("The cursor is not positioned on a node that can be coerced")]
    NotInCoercibleState,

    #[error("The cursor is not positioned on a node that can be removed")]
    NotInRemovableState,

    #[error("The cursor is not in a state that allows realizing a node")]
    NotInRealizableState,

    #[error("The cursor cannot move to the given node")]
    CannotMoveToNode,

    #[error("The cursor does not allow mutation")]
    IteratorNotMutable,

    /// Nil-ness only exists for elements.
    #[error("The operation is not valid on an attribute node")]
    NotValidOnAttribute,

    /// Discriminated types can only be written as elements.
    #[error("Type '{0}' carries a discriminator and cannot be stored in an attribute")]
    DiscriminatorOnAttribute(LogicalType),

    /// The cursor kind does not implement the operation.
    #[error("{operation} is not supported by this cursor")]
    Unsupported { operation: &'static str },

    /// The underlying tree rejected an operation.
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The type map is missing a type or is inconsistent.
    Configuration,
    /// A cursor operation was called in a state that does not permit it.
    InvalidCursorState,
    /// The node is of the wrong kind (element vs. attribute) for the operation.
    InvalidNodeKind,
    /// The underlying tree failed.
    Tree,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownType(_) | Error::InvalidTypeMap { .. } | Error::ConfigFormat { .. } => {
                ErrorKind::Configuration
            }
            Error::NotInCreatableState
            | Error::NotInCoercibleState
            | Error::NotInRemovableState
            | Error::NotInRealizableState
            | Error::CannotMoveToNode
            | Error::IteratorNotMutable
            | Error::Unsupported { .. } => ErrorKind::InvalidCursorState,
            Error::NotValidOnAttribute | Error::DiscriminatorOnAttribute(_) => {
                ErrorKind::InvalidNodeKind
            }
            Error::Dom(_) => ErrorKind::Tree,
        }
    }
}
