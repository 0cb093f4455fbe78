//! Properties, modifiable state, validation and transformers for imedit.
//!
//! This crate provides:
//! - [`Modifiable`] - Dirty state, cached validity and ordered listeners
//! - [`Validator`] - Per-pass error aggregation, optionally notifying listeners
//! - [`Property`] - Typed access to an untyped value, with a [`Transformer`]
//! - [`ObjectProperty`] / [`SimpleProperty`] - Object-bound and free-standing properties
//! - [`DelegatingProperty`] - Decorators such as [`ReadOnlyProperty`]
//! - [`PropertySet`] - The properties of one object, keeping derived values current
//! - [`Macros`] - Macro expansion for string properties

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod delegating;
pub mod macros;
pub mod modifiable;
pub mod object_property;
pub mod property;
pub mod property_set;
pub mod simple;
pub mod transformer;
pub mod validator;

pub use config::TransformerConfig;
pub use context::PropertyContext;
pub use delegating::{DelegatingProperty, Labelled, PropertyOverrides, ReadOnly, ReadOnlyProperty};
pub use macros::{MacroTable, Macros, Variables};
pub use modifiable::{
    Modifiable, ModifiableId, ModifiableListener, ModifiableListeners, ModifiableState,
    ValidState, listener,
};
pub use object_property::ObjectProperty;
pub use property::{CollectionProperty, Property, PropertyCore};
pub use property_set::PropertySet;
pub use simple::SimpleProperty;
pub use transformer::{
    CoercingTransformer, DateTimeMode, DateTimeTransformer, NoopTransformer, StringTransformer,
    TransformInput, Transformer, TransformerFactory,
};
pub use validator::{CapturedEntry, ErrorListener, Validator, ValidatorError};
