//! Foundation module - small utilities shared by the rest of the crate

pub mod logging;
