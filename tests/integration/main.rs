//! Integration tests across layers
//!
//! Tests objects edited end to end: properties with macros and derived
//! values, object editors, relationship editors and the store behind them.

mod customers;
