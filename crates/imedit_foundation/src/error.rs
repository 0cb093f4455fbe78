//! Error types for imedit.
//!
//! Uses `thiserror` for ergonomic error definition with rich context. Every
//! [`ErrorKind`] also carries the message key and positional arguments the
//! presentation layer feeds to its message formatter; the `Display`
//! implementation is the default English rendering.

use std::fmt;

use thiserror::Error;

use crate::convert::{ConversionError, TargetType};
use crate::reference::Reference;

/// The main error type for imedit operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a required-but-empty error.
    #[must_use]
    pub fn required(property: impl Into<String>) -> Self {
        Self::new(ErrorKind::Required {
            property: property.into(),
        })
    }

    /// Creates an invalid value error without an underlying cause.
    #[must_use]
    pub fn invalid_value(property: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidValue {
            property: property.into(),
            cause: None,
        })
    }

    /// Creates an invalid value error wrapping the failure that caused it.
    #[must_use]
    pub fn invalid_value_caused_by(
        property: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::new(ErrorKind::InvalidValue {
            property: property.into(),
            cause: Some(Box::new(cause)),
        })
    }

    /// Creates an attempt-to-modify-derived-property error.
    #[must_use]
    pub fn derived_modification(property: impl Into<String>) -> Self {
        Self::new(ErrorKind::DerivedModification {
            property: property.into(),
        })
    }

    /// Creates an attempt-to-modify-read-only-property error.
    #[must_use]
    pub fn read_only(property: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReadOnly {
            property: property.into(),
        })
    }

    /// Creates an object not found error.
    #[must_use]
    pub fn object_not_found(reference: Reference) -> Self {
        Self::new(ErrorKind::ObjectNotFound(reference))
    }

    /// Creates an unknown archetype error.
    #[must_use]
    pub fn unknown_archetype(short_name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownArchetype(short_name.into()))
    }

    /// Creates a store failure error.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store(message.into()))
    }

    /// Returns the message key for this error.
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        self.kind.message_key()
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A required value is null or empty.
    #[error("{property} is required")]
    Required {
        /// Display name of the property.
        property: String,
    },

    /// A value could not be parsed or is of an unsupported type.
    #[error("{property} is invalid")]
    InvalidValue {
        /// Display name of the property.
        property: String,
        /// The parse or type failure, if any.
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A date is earlier than the allowed minimum.
    #[error("the date {value} is less than the minimum allowed date {min}")]
    MinDate {
        /// The formatted offending date.
        value: String,
        /// The formatted minimum.
        min: String,
    },

    /// A date is later than the allowed maximum.
    #[error("the date {value} is greater than the maximum allowed date {max}")]
    MaxDate {
        /// The formatted offending date.
        value: String,
        /// The formatted maximum.
        max: String,
    },

    /// A string is shorter than the minimum length.
    #[error("{property} must be at least {min} characters")]
    MinLength {
        /// Display name of the property.
        property: String,
        /// The minimum length.
        min: usize,
    },

    /// A string is longer than the maximum length.
    #[error("{property} must be no more than {max} characters")]
    MaxLength {
        /// Display name of the property.
        property: String,
        /// The maximum length.
        max: usize,
    },

    /// A string contains control characters.
    #[error("{property} contains invalid characters")]
    InvalidCharacters {
        /// Display name of the property.
        property: String,
    },

    /// The stored value cannot be coerced to the requested type.
    #[error("failed to convert {property} value {value} to {target}")]
    ConversionFailed {
        /// Name of the property.
        property: String,
        /// The raw value, rendered for diagnostics.
        value: String,
        /// The requested type.
        target: TargetType,
        /// The coercion failure.
        #[source]
        cause: ConversionError,
    },

    /// Attempt to set a derived property.
    #[error("attempt to modify derived property: {property}")]
    DerivedModification {
        /// Display name of the property.
        property: String,
    },

    /// Attempt to set a property through a read-only view.
    #[error("attempt to modify read-only property: {property}")]
    ReadOnly {
        /// Display name of the property.
        property: String,
    },

    /// A collection holds fewer elements than its minimum cardinality.
    #[error("{property} must have at least {min} items")]
    MinCardinality {
        /// Display name of the property.
        property: String,
        /// The minimum cardinality.
        min: usize,
    },

    /// A collection holds more elements than its maximum cardinality.
    #[error("{property} must have no more than {max} items")]
    MaxCardinality {
        /// Display name of the property.
        property: String,
        /// The maximum cardinality.
        max: usize,
    },

    /// An object does not exist in the store.
    #[error("object not found: {0}")]
    ObjectNotFound(Reference),

    /// An archetype short name has no descriptor.
    #[error("unknown archetype: {0}")]
    UnknownArchetype(String),

    /// A node is not declared by an archetype.
    #[error("unknown node {node} on archetype {archetype}")]
    UnknownNode {
        /// The archetype short name.
        archetype: String,
        /// The node name.
        node: String,
    },

    /// A macro failed to evaluate.
    #[error("failed to evaluate macro {0}")]
    Macro(String),

    /// The object store failed.
    #[error("store failure: {0}")]
    Store(String),

    /// An object could not be deleted.
    #[error("failed to delete {reference}: {reason}")]
    DeletionFailed {
        /// The object that could not be deleted.
        reference: Reference,
        /// Why deletion failed.
        reason: String,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Returns the message key used to localise this error.
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Required { .. } => "property.error.required",
            Self::InvalidValue { .. } => "property.error.invalid",
            Self::MinDate { .. } => "property.error.minDate",
            Self::MaxDate { .. } => "property.error.maxDate",
            Self::MinLength { .. } => "property.error.minLength",
            Self::MaxLength { .. } => "property.error.maxLength",
            Self::InvalidCharacters { .. } => "property.error.invalidchars",
            Self::ConversionFailed { .. } => "property.error.conversion",
            Self::DerivedModification { .. } => "property.error.derived",
            Self::ReadOnly { .. } => "property.error.readonly",
            Self::MinCardinality { .. } => "property.error.minSize",
            Self::MaxCardinality { .. } => "property.error.maxSize",
            Self::ObjectNotFound(_) => "object.error.notfound",
            Self::UnknownArchetype(_) => "archetype.error.unknown",
            Self::UnknownNode { .. } => "archetype.error.unknownNode",
            Self::Macro(_) => "macro.error.failed",
            Self::Store(_) => "store.error.failed",
            Self::DeletionFailed { .. } => "object.error.delete",
            Self::Internal(_) => "error.internal",
        }
    }

    /// Returns the positional arguments for the message key.
    #[must_use]
    pub fn arguments(&self) -> Vec<String> {
        match self {
            Self::Required { property }
            | Self::InvalidValue { property, .. }
            | Self::InvalidCharacters { property }
            | Self::DerivedModification { property }
            | Self::ReadOnly { property } => vec![property.clone()],
            Self::MinDate { value, min } => vec![value.clone(), min.clone()],
            Self::MaxDate { value, max } => vec![value.clone(), max.clone()],
            Self::MinLength { property, min } | Self::MinCardinality { property, min } => {
                vec![property.clone(), min.to_string()]
            }
            Self::MaxLength { property, max } | Self::MaxCardinality { property, max } => {
                vec![property.clone(), max.to_string()]
            }
            Self::ConversionFailed {
                property,
                value,
                target,
                ..
            } => vec![property.clone(), value.clone(), target.to_string()],
            Self::ObjectNotFound(reference) => vec![reference.to_string()],
            Self::UnknownArchetype(name) | Self::Macro(name) => vec![name.clone()],
            Self::UnknownNode { archetype, node } => vec![archetype.clone(), node.clone()],
            Self::DeletionFailed { reference, reason } => {
                vec![reference.to_string(), reason.clone()]
            }
            Self::Store(message) | Self::Internal(message) => vec![message.clone()],
        }
    }

    /// Returns true for failures raised while checking a value, as opposed to
    /// failures of the surrounding machinery.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Required { .. }
                | Self::InvalidValue { .. }
                | Self::MinDate { .. }
                | Self::MaxDate { .. }
                | Self::MinLength { .. }
                | Self::MaxLength { .. }
                | Self::InvalidCharacters { .. }
                | Self::MinCardinality { .. }
                | Self::MaxCardinality { .. }
        )
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Archetype short name of the object being edited.
    pub archetype: Option<String>,
    /// Node name within the archetype.
    pub node: Option<String>,
    /// Chain of editors or operations that led to the error.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the archetype.
    #[must_use]
    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }

    /// Sets the node.
    #[must_use]
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(archetype) = &self.archetype {
            write!(f, "at {archetype}")?;
            if let Some(node) = &self.node {
                write!(f, ".{node}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
