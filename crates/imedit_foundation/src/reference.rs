//! Object identifiers and archetype-qualified references.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Store-allocated object identifier.
///
/// Identifiers are allocated when an object is created, not when it is first
/// saved, so unsaved objects can already be referred to.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to an object: its archetype short name plus its identifier.
///
/// Two references are equal when both the archetype and the identifier match.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reference {
    /// Archetype short name, e.g. `party.customerperson`.
    pub archetype: Arc<str>,
    /// Object identifier.
    pub id: ObjectId,
}

impl Reference {
    /// Creates a new reference.
    #[must_use]
    pub fn new(archetype: impl Into<Arc<str>>, id: ObjectId) -> Self {
        Self {
            archetype: archetype.into(),
            id,
        }
    }

    /// Returns the archetype short name.
    #[must_use]
    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    /// Returns true if the archetype short name matches `pattern`.
    ///
    /// `*` matches any run of characters.
    #[must_use]
    pub fn is_a(&self, pattern: &str) -> bool {
        wildcard_match(pattern, &self.archetype)
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({}:{})", self.archetype, self.id)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.archetype, self.id)
    }
}

/// Matches `text` against a short-name pattern where `*` matches any run of
/// characters (including none).
#[must_use]
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let Some(first_star) = pattern.find('*') else {
        return pattern == text;
    };
    let (prefix, rest) = pattern.split_at(first_star);
    let Some(mut remaining) = text.strip_prefix(prefix) else {
        return false;
    };
    let parts: Vec<&str> = rest.split('*').filter(|p| !p.is_empty()).collect();
    let ends_with_star = pattern.ends_with('*');
    for (i, part) in parts.iter().enumerate() {
        let last = i + 1 == parts.len();
        if last && !ends_with_star {
            return remaining.ends_with(part);
        }
        match remaining.find(part) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }
    true
}
