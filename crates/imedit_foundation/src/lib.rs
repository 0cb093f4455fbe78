//! Core values, references, node types, and errors for imedit.
//!
//! This crate provides:
//! - [`Value`] - The untyped value held by an object node
//! - [`Reference`] - Archetype-qualified object references
//! - [`NodeType`] - Declared type classification of a node
//! - [`Error`] - Rich error types with message keys and context
//! - [`Converter`] - The injectable value coercion service

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod convert;
pub mod error;
pub mod reference;
pub mod types;
pub mod value;

pub use convert::{parse_date_time, ConversionError, Converter, DefaultConverter, TargetType};
pub use error::{Error, ErrorContext, ErrorKind};
pub use reference::{wildcard_match, ObjectId, Reference};
pub use types::NodeType;
pub use value::{Money, Value};

/// Result type alias using the imedit error type.
pub type Result<T> = std::result::Result<T, Error>;
