//! The property abstraction: one named, typed field of an object.
//!
//! A [`Property`] wraps an untyped [`Value`] with its descriptor metadata, a
//! transformer that every write goes through, and the [`Modifiable`] dirty,
//! validity and listener machinery. Typed reads go through the property's
//! injected [`Converter`].
//!
//! Properties compare and hash by name alone. Two properties with the same
//! name are equal whatever they hold, so a set of properties can never hold
//! two fields of the same name.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

use chrono::NaiveDateTime;
use imedit_foundation::{
    ConversionError, Converter, Error, ErrorContext, ErrorKind, Money, NodeType, Reference,
    Result, TargetType, Value,
};
use imedit_store::IMObject;
use rust_decimal::Decimal;

use crate::context::PropertyContext;
use crate::modifiable::{Modifiable, ModifiableState};
use crate::transformer::{TransformInput, Transformer};
use crate::validator::{Validator, ValidatorError};

/// A named, typed field.
pub trait Property: Modifiable {
    /// Returns the node name.
    fn name(&self) -> &str;

    /// Returns the name shown to users.
    fn display_name(&self) -> String;

    /// Returns the description, if any.
    fn description(&self) -> Option<String>;

    /// Returns the declared type.
    fn node_type(&self) -> NodeType;

    /// Returns the minimum string length.
    fn min_length(&self) -> usize;

    /// Returns the maximum string length, if bounded.
    fn max_length(&self) -> Option<usize>;

    /// Returns true if the value is computed from other fields.
    fn is_derived(&self) -> bool;

    /// Returns true if the property may not be edited.
    fn is_read_only(&self) -> bool;

    /// Returns true if the property is not shown.
    fn is_hidden(&self) -> bool;

    /// Returns true if a value is required.
    fn is_required(&self) -> bool;

    /// Returns the archetype short names a reference may point to. Entries
    /// may contain `*` wildcards. Empty means unrestricted.
    fn archetype_range(&self) -> Vec<Arc<str>>;

    /// Returns the current value.
    fn value(&self) -> Value;

    /// Transforms and stores a value.
    ///
    /// Returns `Ok(true)` if the value changed, in which case the property
    /// is marked modified and its listeners are notified. Setting the value
    /// the property already holds returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::DerivedModification`] for derived
    /// properties, and with the transformer's error if the value is
    /// rejected. A rejected value is also recorded against the property and
    /// reported by the next validation.
    fn set_value(&self, value: Value) -> Result<bool>;

    /// Marks the property modified and notifies listeners without changing
    /// the value. Used when the value changed underneath the property.
    fn refresh(&self);

    /// Returns the converter used by the typed getters.
    fn converter(&self) -> Rc<dyn Converter>;

    /// Returns the transformer, creating the default one on first use.
    fn transformer(&self) -> Rc<dyn Transformer>;

    /// Replaces the transformer. `None` reverts to the default.
    fn set_transformer(&self, transformer: Option<Rc<dyn Transformer>>);

    /// Returns this property as a collection, if it is one.
    fn as_collection(&self) -> Option<&dyn CollectionProperty> {
        None
    }

    /// Returns true for boolean properties.
    fn is_boolean(&self) -> bool {
        self.node_type().is_boolean()
    }

    /// Returns true for string and lookup properties.
    fn is_string(&self) -> bool {
        self.node_type().is_string()
    }

    /// Returns true for numeric properties.
    fn is_numeric(&self) -> bool {
        self.node_type().is_numeric()
    }

    /// Returns true for date properties.
    fn is_date(&self) -> bool {
        self.node_type().is_date()
    }

    /// Returns true for money properties.
    fn is_money(&self) -> bool {
        self.node_type().is_money()
    }

    /// Returns true for lookup properties.
    fn is_lookup(&self) -> bool {
        self.node_type().is_lookup()
    }

    /// Returns true for object reference properties.
    fn is_object_reference(&self) -> bool {
        self.node_type().is_reference()
    }

    /// Returns true for collection properties.
    fn is_collection(&self) -> bool {
        self.node_type().is_collection()
    }

    /// Returns the value as a boolean, `false` if null.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::ConversionFailed`] if the value is not a
    /// boolean.
    fn get_bool(&self) -> Result<bool> {
        self.get_bool_or(false)
    }

    /// Returns the value as a boolean, `default` if null.
    ///
    /// # Errors
    ///
    /// See [`get_bool`](Self::get_bool).
    fn get_bool_or(&self, default: bool) -> Result<bool> {
        Ok(coerce_to(self, TargetType::Bool, |value| {
            value.as_bool().ok_or_else(|| mismatch(value, TargetType::Bool))
        })?
        .unwrap_or(default))
    }

    /// Returns the value as an `i32`, `0` if null.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::ConversionFailed`] if the value is not an
    /// integer in range.
    fn get_int(&self) -> Result<i32> {
        self.get_int_or(0)
    }

    /// Returns the value as an `i32`, `default` if null.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    fn get_int_or(&self, default: i32) -> Result<i32> {
        Ok(coerce_to(self, TargetType::Int, |value| {
            let n = value.as_int().ok_or_else(|| mismatch(value, TargetType::Int))?;
            i32::try_from(n).map_err(|_| ConversionError::OutOfRange {
                value: n.to_string(),
                to: TargetType::Int,
            })
        })?
        .unwrap_or(default))
    }

    /// Returns the value as an `i64`, `0` if null.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::ConversionFailed`] if the value is not an
    /// integer.
    fn get_long(&self) -> Result<i64> {
        self.get_long_or(0)
    }

    /// Returns the value as an `i64`, `default` if null.
    ///
    /// # Errors
    ///
    /// See [`get_long`](Self::get_long).
    fn get_long_or(&self, default: i64) -> Result<i64> {
        Ok(coerce_to(self, TargetType::Long, |value| {
            value.as_int().ok_or_else(|| mismatch(value, TargetType::Long))
        })?
        .unwrap_or(default))
    }

    /// Returns the value rendered as a string, `None` if null.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::ConversionFailed`] if the converter cannot
    /// render the value.
    fn get_string(&self) -> Result<Option<String>> {
        coerce_to(self, TargetType::String, |value| Ok(value.to_string()))
    }

    /// Returns the value rendered as a string, `default` if null.
    ///
    /// # Errors
    ///
    /// See [`get_string`](Self::get_string).
    fn get_string_or(&self, default: &str) -> Result<String> {
        Ok(self.get_string()?.unwrap_or_else(|| default.to_string()))
    }

    /// Returns the value as a decimal, `None` if null.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::ConversionFailed`] if the value is not
    /// numeric.
    fn get_decimal(&self) -> Result<Option<Decimal>> {
        coerce_to(self, TargetType::Decimal, |value| {
            value.as_decimal().ok_or_else(|| mismatch(value, TargetType::Decimal))
        })
    }

    /// Returns the value as a decimal, `default` if null.
    ///
    /// # Errors
    ///
    /// See [`get_decimal`](Self::get_decimal).
    fn get_decimal_or(&self, default: Decimal) -> Result<Decimal> {
        Ok(self.get_decimal()?.unwrap_or(default))
    }

    /// Returns the value as money, `None` if null.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::ConversionFailed`] if the value is not
    /// numeric.
    fn get_money(&self) -> Result<Option<Money>> {
        coerce_to(self, TargetType::Money, |value| match value {
            Value::Money(money) => Ok(*money),
            other => Err(mismatch(other, TargetType::Money)),
        })
    }

    /// Returns the value as money, `default` if null.
    ///
    /// # Errors
    ///
    /// See [`get_money`](Self::get_money).
    fn get_money_or(&self, default: Money) -> Result<Money> {
        Ok(self.get_money()?.unwrap_or(default))
    }

    /// Returns the value as a date-time, `None` if null.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::ConversionFailed`] if the value is not a
    /// date.
    fn get_date(&self) -> Result<Option<NaiveDateTime>> {
        coerce_to(self, TargetType::Date, |value| {
            value.as_date().ok_or_else(|| mismatch(value, TargetType::Date))
        })
    }

    /// Returns the value as a date-time, `default` if null.
    ///
    /// # Errors
    ///
    /// See [`get_date`](Self::get_date).
    fn get_date_or(&self, default: NaiveDateTime) -> Result<NaiveDateTime> {
        Ok(self.get_date()?.unwrap_or(default))
    }

    /// Returns the value as an object reference, `None` if null.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::ConversionFailed`] if the value is not a
    /// reference.
    fn get_reference(&self) -> Result<Option<Reference>> {
        coerce_to(self, TargetType::Reference, |value| {
            value
                .as_reference()
                .cloned()
                .ok_or_else(|| mismatch(value, TargetType::Reference))
        })
    }
}

/// A property holding a collection of objects.
pub trait CollectionProperty: Property {
    /// Returns the elements.
    fn values(&self) -> Vec<IMObject>;

    /// Returns the number of elements.
    fn size(&self) -> usize;

    /// Adds an element, replacing an element with the same reference.
    ///
    /// The property is always marked modified. Returns true if the
    /// collection grew.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::DerivedModification`] for derived
    /// collections.
    fn add(&self, object: IMObject) -> Result<bool>;

    /// Removes the element with `reference`.
    ///
    /// The property is marked modified only if the collection shrank, which
    /// is also what is returned.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::DerivedModification`] for derived
    /// collections.
    fn remove(&self, reference: &Reference) -> Result<bool>;

    /// Returns the minimum number of elements.
    fn min_cardinality(&self) -> usize;

    /// Returns the maximum number of elements, `None` if unbounded.
    fn max_cardinality(&self) -> Option<usize>;

    /// Returns true if the elements are owned by the parent.
    fn is_parent_child(&self) -> bool;

    /// Returns true if an element with `reference` is present.
    fn contains(&self, reference: &Reference) -> bool {
        self.values()
            .iter()
            .any(|value| value.reference() == reference)
    }
}

/// Converts the value of `property` to `target` and extracts the typed
/// result. A null value, or a converter returning null, yields `None`.
fn coerce_to<P, T>(
    property: &P,
    target: TargetType,
    extract: impl FnOnce(&Value) -> std::result::Result<T, ConversionError>,
) -> Result<Option<T>>
where
    P: Property + ?Sized,
{
    let value = property.value();
    if value.is_null() {
        return Ok(None);
    }
    let failed = |cause| {
        Error::new(ErrorKind::ConversionFailed {
            property: property.name().to_string(),
            value: value.to_string(),
            target,
            cause,
        })
    };
    let converted = property
        .converter()
        .convert(&value, target)
        .map_err(failed)?;
    if converted.is_null() {
        return Ok(None);
    }
    extract(&converted).map(Some).map_err(failed)
}

/// The converter returned a value of the wrong type for `to`.
fn mismatch(value: &Value, to: TargetType) -> ConversionError {
    ConversionError::Unsupported {
        from: value
            .natural_type()
            .map_or_else(|| "null".to_string(), |t| t.to_string()),
        to,
    }
}

impl PartialEq for dyn Property + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for dyn Property + '_ {}

impl Hash for dyn Property + '_ {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Debug for dyn Property + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name())
            .field("type", &self.node_type())
            .field("value", &self.value())
            .finish()
    }
}

// =============================================================================
// PropertyCore
// =============================================================================

/// State and behaviour shared by the concrete property types.
///
/// Holds the [`ModifiableState`], the lazily created transformer and any
/// error recorded by a rejected write. Methods take the owning property as
/// `owner` so notifications carry the property itself.
pub struct PropertyCore {
    state: ModifiableState,
    context: PropertyContext,
    archetype: Option<Arc<str>>,
    transformer: RefCell<Option<Rc<dyn Transformer>>>,
    errors: RefCell<Vec<ValidatorError>>,
}

impl PropertyCore {
    /// Creates core state using `context`.
    #[must_use]
    pub fn new(context: PropertyContext) -> Self {
        Self {
            state: ModifiableState::new(),
            context,
            archetype: None,
            transformer: RefCell::new(None),
            errors: RefCell::new(Vec::new()),
        }
    }

    /// Sets the archetype reported in error contexts.
    #[must_use]
    pub fn with_archetype(mut self, archetype: impl Into<Arc<str>>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }

    /// Returns the modifiable state.
    #[must_use]
    pub fn state(&self) -> &ModifiableState {
        &self.state
    }

    /// Returns the context.
    #[must_use]
    pub fn context(&self) -> &PropertyContext {
        &self.context
    }

    /// Returns the transformer, creating the default for `owner` if none is
    /// set.
    pub fn transformer(&self, owner: &dyn Property) -> Rc<dyn Transformer> {
        if let Some(transformer) = self.transformer.borrow().as_ref() {
            return Rc::clone(transformer);
        }
        let created = self.context.transformers().create(owner, &self.context);
        *self.transformer.borrow_mut() = Some(Rc::clone(&created));
        created
    }

    /// Replaces the transformer.
    pub fn set_transformer(&self, transformer: Option<Rc<dyn Transformer>>) {
        *self.transformer.borrow_mut() = transformer;
        self.state.reset_valid();
    }

    /// Fails if `owner` is derived.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DerivedModification`].
    pub fn check_modifiable(&self, owner: &dyn Property) -> Result<()> {
        if owner.is_derived() {
            return Err(self.locate(owner, Error::derived_modification(owner.display_name())));
        }
        Ok(())
    }

    /// Adds the archetype and node of `owner` to `error`.
    #[must_use]
    pub fn locate(&self, owner: &dyn Property, error: Error) -> Error {
        let mut context = ErrorContext::new().with_node(owner.name());
        if let Some(archetype) = &self.archetype {
            context = context.with_archetype(archetype.as_ref());
        }
        error.with_context(context)
    }

    /// Transforms `value` and, if it differs from `owner`'s current value,
    /// passes it to `write` and notifies listeners.
    ///
    /// `write` must release any borrow it takes before returning.
    ///
    /// # Errors
    ///
    /// See [`Property::set_value`].
    pub fn set_value(
        &self,
        owner: &dyn Property,
        value: Value,
        write: impl FnOnce(Value),
    ) -> Result<bool> {
        self.check_modifiable(owner)?;
        let transformed = match self.transformer(owner).apply(owner, TransformInput::from(value)) {
            Ok(transformed) => transformed,
            Err(err) => {
                let err = self.locate(owner, err);
                self.invalidate(owner, &err);
                return Err(err);
            }
        };
        if transformed == owner.value() {
            if self.clear_errors(owner) {
                self.state.notify(owner);
            }
            return Ok(false);
        }
        write(transformed);
        self.clear_errors(owner);
        self.modified(owner);
        Ok(true)
    }

    /// Marks `owner` modified, clears its validity and notifies listeners.
    pub fn modified(&self, owner: &dyn Property) {
        self.state.set_dirty(true);
        self.state.reset_valid();
        self.state.notify(owner);
    }

    /// Records `error` against `owner` until the next accepted write.
    pub fn invalidate(&self, owner: &dyn Property, error: &Error) {
        let errors = vec![ValidatorError::from(error)];
        if let Some(listener) = self.state.error_listener() {
            listener.on_error(self.state.id(), &errors);
        }
        *self.errors.borrow_mut() = errors;
        self.state.reset_valid();
        tracing::debug!(property = owner.name(), error = %error, "value rejected");
    }

    /// Clears errors recorded by a rejected write. Returns true if there
    /// were any.
    pub fn clear_errors(&self, owner: &dyn Property) -> bool {
        if self.errors.borrow().is_empty() {
            return false;
        }
        self.errors.borrow_mut().clear();
        self.state.reset_valid();
        if let Some(listener) = owner.error_listener() {
            listener.on_clear(self.state.id());
        }
        true
    }

    /// Returns the errors recorded by a rejected write.
    #[must_use]
    pub fn errors(&self) -> Vec<ValidatorError> {
        self.errors.borrow().clone()
    }

    /// Validates `owner` through the validity cache.
    ///
    /// Errors recorded by a rejected write take precedence; otherwise
    /// `checks` runs.
    pub fn validate(
        &self,
        owner: &dyn Property,
        validator: &mut Validator,
        checks: impl FnOnce() -> Vec<Error>,
    ) -> bool {
        self.state.validate(validator, |validator| {
            let mut errors = self.errors();
            if errors.is_empty() {
                errors = checks()
                    .into_iter()
                    .map(|err| ValidatorError::from(self.locate(owner, err)))
                    .collect();
            }
            let valid = errors.is_empty();
            validator.add(owner, errors);
            valid
        })
    }

    /// Checks that a required value is present and that the transformer
    /// accepts the current value.
    #[must_use]
    pub fn check_value(&self, owner: &dyn Property) -> Vec<Error> {
        let value = owner.value();
        if value.is_empty() {
            return if owner.is_required() {
                vec![Error::required(owner.display_name())]
            } else {
                Vec::new()
            };
        }
        match self.transformer(owner).apply(owner, TransformInput::from(value)) {
            Ok(_) => Vec::new(),
            Err(err) => vec![err],
        }
    }
}

impl fmt::Debug for PropertyCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCore")
            .field("state", &self.state)
            .field("archetype", &self.archetype)
            .field("errors", &self.errors.borrow().len())
            .finish_non_exhaustive()
    }
}
