//! Window management subsystem
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │     Application                 │
//! └─────────────┬───────────────────┘
//!               │ Uses
//!      ┌────────▼────────┐
//!      │ WindowSystem    │ ← process-wide state (backend.rs)
//!      │ WindowBackend   │ ← one window (backend.rs)
//!      └────────┬────────┘
//!               │ Implemented by
//!   ┌───────────▼───────────┐
//!   │ vulkan::GlfwWindow    │ ← GLFW backend (vulkan/window.rs)
//!   │ test mocks            │
//!   └───────────────────────┘
//! ```

pub mod backend;

pub use backend::{WindowBackend, WindowSystem};
