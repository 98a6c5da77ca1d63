//! Crate-level tests that need the mock boundaries
