//! imedit - Property, validation and relationship editing for archetype-described objects
//!
//! This crate re-exports all layers of the imedit system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: imedit_relationship - Relationship states, batch query, collection editors
//! Layer 2: imedit_property     - Modifiable, Validator, properties, transformers
//! Layer 1: imedit_store        - Archetypes, objects, the object store
//! Layer 0: imedit_foundation   - Core types (Value, Reference, Error, Converter)
//! ```

pub use imedit_foundation as foundation;
pub use imedit_property as property;
pub use imedit_relationship as relationship;
pub use imedit_store as store;
