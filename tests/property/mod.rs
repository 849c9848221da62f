//! Property-based tests for tree invariants

mod invariants;
