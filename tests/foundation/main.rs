//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Reference, Converter, and Error.

mod errors;
mod values;
