//! Relationship editor configuration.

/// Configuration for the relationship collection editors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationshipConfig {
    /// Whether inactive relationships are hidden from
    /// [`relationships`](crate::RelationshipCollectionEditor::relationships)
    /// when an editor is created.
    pub exclude_inactive: bool,
    /// Collection nodes tried, in order, when a new relationship is attached
    /// to the object at its far end.
    pub relationship_nodes: Vec<String>,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            exclude_inactive: true,
            relationship_nodes: vec![
                "entityRelationships".to_string(),
                "sourceEntityRelationships".to_string(),
                "targetEntityRelationships".to_string(),
            ],
        }
    }
}

impl RelationshipConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial state of the inactive filter.
    #[must_use]
    pub fn with_exclude_inactive(mut self, exclude: bool) -> Self {
        self.exclude_inactive = exclude;
        self
    }

    /// Sets the collection node candidates for the far end.
    #[must_use]
    pub fn with_relationship_nodes(mut self, nodes: &[&str]) -> Self {
        self.relationship_nodes = nodes.iter().map(ToString::to_string).collect();
        self
    }
}
