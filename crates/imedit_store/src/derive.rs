//! Derived value rules.
//!
//! A [`Derivation`] computes one node of an archetype from the rest of the
//! object. The store runs every matching rule when asked to derive values and
//! reports which nodes actually changed, so callers only refresh those.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use imedit_foundation::{Value, wildcard_match};

use crate::object::IMObject;

/// Whether a computed zero may replace an existing non-zero value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZeroPolicy {
    /// A computed zero never overwrites an existing non-zero value.
    #[default]
    KeepExisting,
    /// Computed values always propagate.
    Propagate,
}

impl ZeroPolicy {
    /// Returns true if `computed` should replace `current`.
    #[must_use]
    pub fn accepts(self, current: &Value, computed: &Value) -> bool {
        if current == computed {
            return false;
        }
        match self {
            Self::Propagate => true,
            Self::KeepExisting => {
                !(computed.is_zero() && !current.is_null() && !current.is_zero())
            }
        }
    }
}

type Compute = Rc<dyn Fn(&IMObject) -> Value>;

/// Rule computing one node of matching archetypes.
#[derive(Clone)]
pub struct Derivation {
    archetype: Arc<str>,
    node: Arc<str>,
    compute: Compute,
    zero_policy: ZeroPolicy,
}

impl Derivation {
    /// Creates a rule setting `node` on objects whose short name matches
    /// `archetype` (which may contain `*` wildcards).
    pub fn new(
        archetype: impl Into<Arc<str>>,
        node: impl Into<Arc<str>>,
        compute: impl Fn(&IMObject) -> Value + 'static,
    ) -> Self {
        Self {
            archetype: archetype.into(),
            node: node.into(),
            compute: Rc::new(compute),
            zero_policy: ZeroPolicy::default(),
        }
    }

    /// Sets the zero policy.
    #[must_use]
    pub fn with_zero_policy(mut self, zero_policy: ZeroPolicy) -> Self {
        self.zero_policy = zero_policy;
        self
    }

    /// Returns the derived node name.
    #[must_use]
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Returns the zero policy.
    #[must_use]
    pub fn zero_policy(&self) -> ZeroPolicy {
        self.zero_policy
    }

    /// Returns true if the rule applies to `object`.
    #[must_use]
    pub fn applies_to(&self, object: &IMObject) -> bool {
        wildcard_match(&self.archetype, object.archetype())
    }

    /// Runs the rule, returning true if the node changed.
    pub fn apply(&self, object: &mut IMObject) -> bool {
        let current = object.get(&self.node);
        let computed = (self.compute)(object);
        if !self.zero_policy.accepts(&current, &computed) {
            if computed != current {
                tracing::trace!(node = %self.node, kept = %current, "computed zero ignored");
            }
            return false;
        }
        tracing::trace!(node = %self.node, from = %current, to = %computed, "derived value changed");
        object.set(&self.node, computed)
    }
}

impl fmt::Debug for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derivation")
            .field("archetype", &self.archetype)
            .field("node", &self.node)
            .field("zero_policy", &self.zero_policy)
            .finish_non_exhaustive()
    }
}

/// Runs each matching rule in registration order, returning the names of the
/// nodes that changed.
///
/// Later rules see the values set by earlier ones.
pub fn derive_all(rules: &[Derivation], object: &mut IMObject) -> Vec<Arc<str>> {
    let mut changed = Vec::new();
    for rule in rules {
        if !rule.applies_to(object) {
            continue;
        }
        if rule.apply(object) && !changed.contains(&rule.node) {
            changed.push(rule.node.clone());
        }
    }
    changed
}
