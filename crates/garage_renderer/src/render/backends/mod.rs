//! Backend implementations for the render module
//!
//! Only the headless recording backend ships with the library. Windowed
//! backends implement [`GraphicsDevice`](super::GraphicsDevice) in the
//! application that owns the graphics context.

/// In-memory recording backend
pub mod headless;

pub use headless::{Command, HeadlessDevice, ResourceKind};
