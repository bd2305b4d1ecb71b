//! Plugin orchestration for rollkit (Layer 1).
//!
//! `rollkit_system` turns a set of plugins into a frozen
//! [`HookRegistry`](rollkit_hooks::HookRegistry):
//!
//! - [`plugin`] - Plugin trait, plugin groups and identifiers
//! - [`toolkit`] - The [`Toolkit`] root that builds plugins and hands out dispatchers
//! - [`config`] - In-process [`ToolkitConfig`]
//! - [`error`] - The [`ToolkitError`] taxonomy
//!
//! # Architecture
//!
//! - **Layer 1** (`rollkit_hooks`, `rollkit_system`): hook machinery and orchestration (this crate)
//! - **Layer 2** (`rollkit_core`): units, disk elements, profiles and formula plugins
//! - **Layer 3** (`rollkit_core_plugins`): infrastructure plugins such as logging

/// Toolkit configuration.
pub mod config;

/// Error types.
pub mod error;

/// Plugin trait for extensible functionality.
pub mod plugin;

/// Application root for plugin orchestration.
pub mod toolkit;

pub use config::ToolkitConfig;
pub use error::ToolkitError;
pub use toolkit::Toolkit;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::config::ToolkitConfig;
    pub use crate::error::ToolkitError;
    pub use crate::plugin::*;
    pub use crate::toolkit::Toolkit;
}
