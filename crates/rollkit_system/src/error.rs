//! Error types for plugin orchestration.

use rollkit_hooks::HookError;
use thiserror::Error;

/// Errors raised while assembling a [`Toolkit`](crate::Toolkit).
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// A plugin's `build()` was rejected by the registry.
    #[error("plugin '{plugin}' failed to build: {source}")]
    PluginBuild {
        /// Name of the failing plugin.
        plugin: String,
        /// The registry error.
        #[source]
        source: HookError,
    },

    /// A plugin depends on a plugin that was never added.
    #[error("plugin '{plugin}' requires '{dependency}' which was not added")]
    MissingDependency {
        /// Name of the dependent plugin.
        plugin: String,
        /// Type name of the missing dependency.
        dependency: &'static str,
    },

    /// Plugin dependencies form a cycle.
    #[error("circular dependency detected among plugins: {}", plugins.join(", "))]
    CircularDependency {
        /// Names of the plugins involved.
        plugins: Vec<String>,
    },

    /// A unique plugin was added twice.
    #[error("plugin '{0}' is unique and was already added")]
    DuplicatePlugin(String),

    /// `finish()` was called twice.
    #[error("toolkit is already built")]
    AlreadyBuilt,

    /// The registry was requested before `finish()`.
    #[error("toolkit is not built yet; call finish() first")]
    NotBuilt,
}

impl ToolkitError {
    /// Creates a [`PluginBuild`](Self::PluginBuild) error.
    pub fn plugin_build(plugin: impl Into<String>, source: HookError) -> Self {
        Self::PluginBuild {
            plugin: plugin.into(),
            source,
        }
    }
}
