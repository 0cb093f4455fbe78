//! Macro expansion for string properties.
//!
//! A macro is a short code a user types into a text field (e.g. `@dose`)
//! that expands into longer text. Expansion runs over whitespace separated
//! tokens; a token may carry a numeric prefix (`2@dose`), exposed to the
//! macro as the `$number` variable.

use std::collections::HashMap;
use std::fmt;

use imedit_foundation::{Error, ErrorKind, Result, Value};
use imedit_store::IMObject;

/// Name of the variable holding a token's numeric prefix.
pub const NUMBER: &str = "number";

/// Named values available to macros.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variables {
    values: HashMap<String, Value>,
}

impl Variables {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Sets a variable, returning the set.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// Evaluates macros.
pub trait Macros {
    /// Returns true if `code` names a macro.
    fn exists(&self, code: &str) -> bool;

    /// Runs one macro.
    ///
    /// `context` is the object being edited; its node values are visible to
    /// the macro as variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the macro does not exist or fails to evaluate.
    fn run(&self, code: &str, context: Option<&IMObject>, variables: &Variables) -> Result<String>;

    /// Expands every macro in `text`.
    ///
    /// Whitespace is preserved. Tokens that are not macros are kept as typed,
    /// as are macros that fail, which are logged.
    fn run_all(&self, text: &str, context: Option<&IMObject>, variables: &Variables) -> String {
        let mut result = String::with_capacity(text.len());
        for token in tokens(text) {
            if token.starts_with(char::is_whitespace) {
                result.push_str(token);
                continue;
            }
            let (number, code) = split_number(token);
            if code.is_empty() || !self.exists(code) {
                result.push_str(token);
                continue;
            }
            let outcome = if number.is_empty() {
                self.run(code, context, variables)
            } else {
                let scoped = variables.clone().with(NUMBER, number);
                self.run(code, context, &scoped)
            };
            match outcome {
                Ok(expansion) => result.push_str(&expansion),
                Err(err) => {
                    tracing::warn!(code, error = %err, "macro failed to evaluate");
                    result.push_str(token);
                }
            }
        }
        result
    }
}

/// Splits text into alternating runs of whitespace and non-whitespace.
fn tokens(text: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(previous) if previous != space => {
                result.push(&text[start..i]);
                start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        result.push(&text[start..]);
    }
    result
}

/// Splits a token into its numeric prefix (digits, `.` and `/`) and the rest.
fn split_number(token: &str) -> (&str, &str) {
    let end = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '/'))
        .unwrap_or(token.len());
    token.split_at(end)
}

/// Macros defined as text templates.
///
/// A template may reference `$name` variables, resolved first from the
/// supplied variables and then from the context object's nodes.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    macros: HashMap<String, String>,
}

impl MacroTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a macro.
    pub fn define(&mut self, code: impl Into<String>, template: impl Into<String>) {
        self.macros.insert(code.into(), template.into());
    }

    /// Defines a macro, returning the table.
    #[must_use]
    pub fn with(mut self, code: impl Into<String>, template: impl Into<String>) -> Self {
        self.define(code, template);
        self
    }

    /// Returns the number of macros.
    #[must_use]
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    /// Returns true if no macros are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

impl Macros for MacroTable {
    fn exists(&self, code: &str) -> bool {
        self.macros.contains_key(code)
    }

    fn run(&self, code: &str, context: Option<&IMObject>, variables: &Variables) -> Result<String> {
        let template = self
            .macros
            .get(code)
            .ok_or_else(|| Error::new(ErrorKind::Macro(code.to_string())))?;
        expand(code, template, context, variables)
    }
}

impl fmt::Debug for MacroTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<&String> = self.macros.keys().collect();
        codes.sort();
        f.debug_struct("MacroTable").field("codes", &codes).finish()
    }
}

fn is_variable_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn expand(
    code: &str,
    template: &str,
    context: Option<&IMObject>,
    variables: &Variables,
) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        result.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let len = after
            .find(|c: char| !is_variable_char(c))
            .unwrap_or(after.len());
        if len == 0 {
            result.push('$');
            rest = after;
            continue;
        }
        let name = &after[..len];
        let value = variables
            .get(name)
            .cloned()
            .or_else(|| context.map(|object| object.get(name)))
            .filter(|value| !value.is_null())
            .ok_or_else(|| Error::new(ErrorKind::Macro(format!("{code}: ${name} is undefined"))))?;
        result.push_str(&value.to_string());
        rest = &after[len..];
    }
    result.push_str(rest);
    Ok(result)
}
