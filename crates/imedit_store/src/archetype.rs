//! Archetype and node descriptors.
//!
//! An archetype describes one kind of object: its short name and the nodes
//! (fields) an instance may hold. Descriptors are registered once in an
//! [`ArchetypeRegistry`] and looked up by short name.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use imedit_foundation::{Error, ErrorKind, NodeType, Result, Value, wildcard_match};

/// Name of the node holding an object's name.
pub const NAME: &str = "name";
/// Name of the node holding an object's description.
pub const DESCRIPTION: &str = "description";
/// Name of the node holding an object's active flag.
pub const ACTIVE: &str = "active";
/// Name of a relationship's source node.
pub const SOURCE: &str = "source";
/// Name of a relationship's target node.
pub const TARGET: &str = "target";
/// Name of a period relationship's start time node.
pub const ACTIVE_START_TIME: &str = "activeStartTime";
/// Name of a period relationship's end time node.
pub const ACTIVE_END_TIME: &str = "activeEndTime";
/// Name of a relationship's sequence node.
pub const SEQUENCE: &str = "sequence";

/// Schema definition for one node of an archetype.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDescriptor {
    /// Node name (e.g., `name`, `activeStartTime`).
    pub name: Arc<str>,
    /// Display name. Derived from the node name if not set.
    pub display_name: Option<Arc<str>>,
    /// Description.
    pub description: Option<Arc<str>>,
    /// Declared type.
    pub node_type: NodeType,
    /// Minimum string length.
    pub min_length: usize,
    /// Maximum string length, or `None` if unbounded.
    pub max_length: Option<usize>,
    /// Minimum number of values. A minimum of one makes the node required.
    pub min_cardinality: usize,
    /// Maximum number of values, or `None` if unbounded.
    pub max_cardinality: Option<usize>,
    /// Whether the node is hidden from display.
    pub hidden: bool,
    /// Whether the node is computed from other nodes.
    pub derived: bool,
    /// Whether the node is read-only.
    pub read_only: bool,
    /// Whether a collection node owns its elements.
    pub parent_child: bool,
    /// Short name patterns of the archetypes a reference or collection node
    /// may hold. May contain `*` wildcards.
    pub archetype_range: Vec<Arc<str>>,
    /// Value assigned when an instance is created.
    pub default: Value,
}

impl NodeDescriptor {
    /// Creates an optional node of the given type.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            node_type,
            min_length: 0,
            max_length: None,
            min_cardinality: 0,
            max_cardinality: if node_type.is_collection() {
                None
            } else {
                Some(1)
            },
            hidden: false,
            derived: false,
            read_only: false,
            parent_child: false,
            archetype_range: Vec::new(),
            default: Value::Null,
        }
    }

    /// Creates a collection node.
    #[must_use]
    pub fn collection(name: impl Into<Arc<str>>, range: &[&str]) -> Self {
        Self::new(name, NodeType::Collection).with_archetype_range(range)
    }

    /// Creates a reference node.
    #[must_use]
    pub fn reference(name: impl Into<Arc<str>>, range: &[&str]) -> Self {
        Self::new(name, NodeType::Reference).with_archetype_range(range)
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<Arc<str>>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<Arc<str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the minimum string length.
    #[must_use]
    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = min;
        self
    }

    /// Sets the maximum string length.
    #[must_use]
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Sets the cardinality bounds.
    #[must_use]
    pub fn with_cardinality(mut self, min: usize, max: Option<usize>) -> Self {
        self.min_cardinality = min;
        self.max_cardinality = max;
        self
    }

    /// Marks the node required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.min_cardinality = self.min_cardinality.max(1);
        self
    }

    /// Marks the node hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Marks the node derived.
    #[must_use]
    pub fn derived(mut self) -> Self {
        self.derived = true;
        self
    }

    /// Marks the node read-only.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Marks a collection node as owning its elements.
    #[must_use]
    pub fn parent_child(mut self) -> Self {
        self.parent_child = true;
        self
    }

    /// Sets the archetype range.
    #[must_use]
    pub fn with_archetype_range(mut self, range: &[&str]) -> Self {
        self.archetype_range = range.iter().map(|s| Arc::from(*s)).collect();
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Returns true if the node must hold a value.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.min_cardinality > 0
    }

    /// Returns the display name, deriving one from the node name if none was
    /// set: `activeStartTime` displays as `Active Start Time`.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(display_name) = &self.display_name {
            return display_name.to_string();
        }
        let mut result = String::with_capacity(self.name.len() + 4);
        for (i, ch) in self.name.chars().enumerate() {
            if i == 0 {
                result.extend(ch.to_uppercase());
            } else if ch.is_uppercase() {
                result.push(' ');
                result.push(ch);
            } else {
                result.push(ch);
            }
        }
        result
    }
}

/// Schema definition for one kind of object.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchetypeDescriptor {
    /// Short name (e.g., `party.customerperson`).
    pub short_name: Arc<str>,
    /// Display name.
    pub display_name: Option<Arc<str>>,
    /// Node descriptors, in declaration order.
    pub nodes: Vec<NodeDescriptor>,
}

impl ArchetypeDescriptor {
    /// Creates a descriptor with no nodes.
    #[must_use]
    pub fn new(short_name: impl Into<Arc<str>>) -> Self {
        Self {
            short_name: short_name.into(),
            display_name: None,
            nodes: Vec::new(),
        }
    }

    /// Creates an entity descriptor with the standard `name`, `description`
    /// and `active` nodes.
    #[must_use]
    pub fn entity(short_name: impl Into<Arc<str>>) -> Self {
        Self::new(short_name)
            .with_node(
                NodeDescriptor::new(NAME, NodeType::String)
                    .required()
                    .with_max_length(100),
            )
            .with_node(NodeDescriptor::new(DESCRIPTION, NodeType::String).with_max_length(255))
            .with_node(NodeDescriptor::new(ACTIVE, NodeType::Boolean).with_default(true))
    }

    /// Creates a period relationship descriptor linking archetypes in
    /// `source_range` to archetypes in `target_range`.
    #[must_use]
    pub fn relationship(
        short_name: impl Into<Arc<str>>,
        source_range: &[&str],
        target_range: &[&str],
    ) -> Self {
        Self::new(short_name)
            .with_node(NodeDescriptor::reference(SOURCE, source_range).required())
            .with_node(NodeDescriptor::reference(TARGET, target_range).required())
            .with_node(NodeDescriptor::new(ACTIVE_START_TIME, NodeType::Date))
            .with_node(NodeDescriptor::new(ACTIVE_END_TIME, NodeType::Date))
            .with_node(NodeDescriptor::new(SEQUENCE, NodeType::Integer).hidden())
            .with_node(NodeDescriptor::new(ACTIVE, NodeType::Boolean).with_default(true))
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<Arc<str>>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Adds a node, replacing any existing node of the same name.
    #[must_use]
    pub fn with_node(mut self, node: NodeDescriptor) -> Self {
        if let Some(existing) = self.nodes.iter_mut().find(|n| n.name == node.name) {
            *existing = node;
        } else {
            self.nodes.push(node);
        }
        self
    }

    /// Returns the node descriptor by name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|n| &*n.name == name)
    }

    /// Returns the node descriptor by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the archetype declares no such node.
    pub fn require_node(&self, name: &str) -> Result<&NodeDescriptor> {
        self.node(name).ok_or_else(|| {
            Error::new(ErrorKind::UnknownNode {
                archetype: self.short_name.to_string(),
                node: name.to_string(),
            })
        })
    }

    /// Returns true if this archetype describes a relationship.
    #[must_use]
    pub fn is_relationship(&self) -> bool {
        self.node(SOURCE).is_some() && self.node(TARGET).is_some()
    }
}

/// Registry of archetype descriptors, keyed by short name.
#[derive(Clone, Debug, Default)]
pub struct ArchetypeRegistry {
    archetypes: HashMap<Arc<str>, ArchetypeDescriptor>,
}

impl ArchetypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if a descriptor with the same short name is already
    /// registered.
    pub fn register(&mut self, descriptor: ArchetypeDescriptor) -> Result<()> {
        if self.archetypes.contains_key(&descriptor.short_name) {
            return Err(Error::new(ErrorKind::Internal(format!(
                "archetype already registered: {}",
                descriptor.short_name
            ))));
        }
        self.archetypes
            .insert(descriptor.short_name.clone(), descriptor);
        Ok(())
    }

    /// Registers a descriptor, returning the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a descriptor with the same short name is already
    /// registered.
    pub fn with(mut self, descriptor: ArchetypeDescriptor) -> Result<Self> {
        self.register(descriptor)?;
        Ok(self)
    }

    /// Returns the descriptor for a short name.
    #[must_use]
    pub fn get(&self, short_name: &str) -> Option<&ArchetypeDescriptor> {
        self.archetypes.get(short_name)
    }

    /// Returns the descriptor for a short name.
    ///
    /// # Errors
    ///
    /// Returns an error if no descriptor is registered.
    pub fn require(&self, short_name: &str) -> Result<&ArchetypeDescriptor> {
        self.get(short_name)
            .ok_or_else(|| Error::unknown_archetype(short_name))
    }

    /// Returns the registered short names matching `pattern`, sorted.
    #[must_use]
    pub fn short_names(&self, pattern: &str) -> Vec<Arc<str>> {
        self.expand(&[pattern])
    }

    /// Expands a set of short name patterns into the registered short names
    /// they match, sorted and without duplicates.
    ///
    /// Patterns without wildcards are kept even if unregistered, so ranges
    /// may name archetypes the registry does not know about yet.
    #[must_use]
    pub fn expand<S: AsRef<str>>(&self, patterns: &[S]) -> Vec<Arc<str>> {
        let mut result = BTreeSet::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.contains('*') {
                result.extend(
                    self.archetypes
                        .keys()
                        .filter(|name| wildcard_match(pattern, name))
                        .cloned(),
                );
            } else {
                result.insert(Arc::from(pattern));
            }
        }
        result.into_iter().collect()
    }

    /// Returns the union of the expanded archetype ranges of `node` across
    /// every archetype matching `short_names`.
    ///
    /// Used to find which archetypes may appear at the `source` or `target`
    /// end of a set of relationship archetypes.
    #[must_use]
    pub fn node_short_names<S: AsRef<str>>(&self, short_names: &[S], node: &str) -> Vec<Arc<str>> {
        let mut result = BTreeSet::new();
        for short_name in self.expand(short_names) {
            if let Some(descriptor) = self.get(&short_name).and_then(|a| a.node(node)) {
                result.extend(self.expand(&descriptor.archetype_range));
            }
        }
        result.into_iter().collect()
    }

    /// Returns true if `short_name` falls within the expanded range of
    /// patterns.
    #[must_use]
    pub fn in_range<S: AsRef<str>>(range: &[S], short_name: &str) -> bool {
        range
            .iter()
            .any(|pattern| wildcard_match(pattern.as_ref(), short_name))
    }

    /// Returns the number of registered archetypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    /// Returns true if no archetypes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}
