//! Declared type classification of object nodes.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Declared type of a node, as described by its node descriptor.
///
/// Properties answer their classification queries (`is_boolean`, `is_date`, ...)
/// from this value rather than from the runtime type of whatever value they
/// currently hold.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeType {
    /// Boolean flag.
    Boolean,
    /// Free text.
    String,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Long,
    /// Arbitrary precision decimal.
    Decimal,
    /// Monetary amount.
    Money,
    /// Date, date-time or time of day.
    Date,
    /// Reference to another object.
    Reference,
    /// Lookup code (a string drawn from a lookup table).
    Lookup,
    /// Collection of child objects.
    Collection,
}

impl NodeType {
    /// Returns true for boolean nodes.
    #[must_use]
    pub const fn is_boolean(self) -> bool {
        matches!(self, Self::Boolean)
    }

    /// Returns true for string nodes. Lookups are strings too.
    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::String | Self::Lookup)
    }

    /// Returns true for numeric nodes, including money.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Long | Self::Decimal | Self::Money
        )
    }

    /// Returns true for date nodes.
    #[must_use]
    pub const fn is_date(self) -> bool {
        matches!(self, Self::Date)
    }

    /// Returns true for money nodes.
    #[must_use]
    pub const fn is_money(self) -> bool {
        matches!(self, Self::Money)
    }

    /// Returns true for object reference nodes.
    #[must_use]
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::Reference)
    }

    /// Returns true for lookup nodes.
    #[must_use]
    pub const fn is_lookup(self) -> bool {
        matches!(self, Self::Lookup)
    }

    /// Returns true for collection nodes.
    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(self, Self::Collection)
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Decimal => "decimal",
            Self::Money => "money",
            Self::Date => "date",
            Self::Reference => "reference",
            Self::Lookup => "lookup",
            Self::Collection => "collection",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
