//! Integration tests for Layer 1: Store
//!
//! Tests for archetype descriptors, objects, derived values and the memory
//! store's relationship queries.

mod archetypes;
mod derivation;
mod memory;
