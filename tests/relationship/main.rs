//! Integration tests for Layer 3: Relationship
//!
//! Tests for relationship states, the batch state query and the relationship
//! collection editors.

mod fixtures;
mod query;
mod targets;
