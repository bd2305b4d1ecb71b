//! # Rollkit Internal Library
//!
//! Re-exports the core rollkit crates for convenience.

/// Layer 1: hook registry and dispatcher.
pub use rollkit_hooks;

/// Layer 1: plugins and the toolkit that builds them.
pub use rollkit_system;

/// Layer 2: units, disk elements, profiles and formula plugins.
pub use rollkit_core;

/// Layer 2: logging and default plugin groups.
pub use rollkit_core_plugins;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use rollkit_core::prelude::*;
    pub use rollkit_core_plugins::{DefaultPlugins, TracingConfig, TracingFormat, TracingPlugin};
    pub use rollkit_hooks::prelude::*;
    pub use rollkit_system::prelude::*;
}
