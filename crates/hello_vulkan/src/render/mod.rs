//! Rendering module
//!
//! Nothing is drawn yet. This module holds the two external boundaries the
//! application is built on: the windowing system and the Vulkan driver.

pub mod vulkan;
pub mod window;

pub use window::{WindowBackend, WindowSystem};
