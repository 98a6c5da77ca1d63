//! Core types shared across subsystems

pub mod config;
