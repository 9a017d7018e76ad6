//! Cursor traversal policy.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Which nodes a cursor visits and what it may do with them.
    ///
    /// Flags are fixed when a cursor is created.
    ///
    /// # Example
    ///
    /// ```
    /// use xmladapt::CursorFlags;
    ///
    /// let flags = CursorFlags::ELEMENTS | CursorFlags::MULTIPLE;
    /// assert!(flags.allows_multiple());
    /// assert!(!flags.includes_attributes());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CursorFlags: u8 {
        /// Visit child elements.
        const ELEMENTS = 1 << 0;

        /// Visit attributes (after all elements).
        const ATTRIBUTES = 1 << 1;

        /// The slot holds a collection rather than a single value.
        const MULTIPLE = 1 << 2;

        /// The cursor may realize its default node when nothing was found.
        const MUTABLE = 1 << 3;

        const ALL_NODES = Self::ELEMENTS.bits() | Self::ATTRIBUTES.bits();
    }
}

impl CursorFlags {
    pub fn includes_elements(self) -> bool {
        self.contains(CursorFlags::ELEMENTS)
    }

    pub fn includes_attributes(self) -> bool {
        self.contains(CursorFlags::ATTRIBUTES)
    }

    pub fn allows_multiple(self) -> bool {
        self.contains(CursorFlags::MULTIPLE)
    }

    pub fn supports_mutation(self) -> bool {
        self.contains(CursorFlags::MUTABLE)
    }
}
