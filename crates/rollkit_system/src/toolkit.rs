//! Application root for plugin orchestration.
//!
//! The [`Toolkit`] owns the [`HookRegistry`]. Plugins populate it during the
//! build phase; once [`finish()`](Toolkit::finish) returns, the registry is
//! frozen and only reachable through shared references, so every
//! [`Dispatcher`] sees the same immutable set of hooks.
//!
//! # Lifecycle
//!
//! 1. **Dependency Resolution** - Validate and topologically sort plugins
//! 2. **Build Phase** - Call `plugin.build()` in dependency order
//! 3. **Ready Phase** - Call `plugin.ready()` in dependency order
//! 4. **Resolution** - Create dispatchers with [`dispatcher()`](Toolkit::dispatcher)
//! 5. **Cleanup Phase** - Call `plugin.cleanup()` in reverse order
//!
//! ```
//! use rollkit_hooks::ResolutionOrder;
//! use rollkit_system::{Toolkit, ToolkitConfig};
//!
//! let mut toolkit = Toolkit::with_config(
//!     ToolkitConfig::default().with_resolution_order(ResolutionOrder::LatestFirst),
//! );
//! toolkit.finish().unwrap();
//!
//! assert!(toolkit.is_built());
//! assert_eq!(toolkit.registry().unwrap().resolution_order(), ResolutionOrder::LatestFirst);
//! ```

use std::collections::BTreeSet;

use hashbrown::{HashMap, HashSet};
use rollkit_hooks::{Dispatcher, HookRegistry};

use crate::config::ToolkitConfig;
use crate::error::ToolkitError;
use crate::plugin::{Plugin, PluginId, Plugins};

/// Represents the build state of the toolkit.
///
/// Progresses linearly: `NotStarted` → `Building` → `Built`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum BuildState {
    #[default]
    NotStarted,
    Building,
    Built,
}

/// Internal entry for a registered plugin.
struct PluginEntry {
    id: PluginId,
    plugin: Box<dyn Plugin>,
    /// Cached for error messages.
    name: String,
}

/// The root that builds plugins into a frozen hook registry.
pub struct Toolkit {
    config: ToolkitConfig,
    registry: HookRegistry,
    pending_plugins: Vec<PluginEntry>,
    built_plugins: Vec<PluginEntry>,
    plugin_ids: HashSet<PluginId>,
    /// First duplicate unique plugin, reported by `finish()`.
    duplicate: Option<ToolkitError>,
    build_state: BuildState,
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Toolkit")
            .field("config", &self.config)
            .field("plugins", &self.plugin_names())
            .field("build_state", &self.build_state)
            .finish_non_exhaustive()
    }
}

impl Toolkit {
    /// Creates an empty toolkit with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ToolkitConfig::default())
    }

    /// Creates an empty toolkit with the given configuration.
    #[must_use]
    pub fn with_config(config: ToolkitConfig) -> Self {
        Self {
            config,
            registry: HookRegistry::with_order(config.resolution_order),
            pending_plugins: Vec::new(),
            built_plugins: Vec::new(),
            plugin_ids: HashSet::new(),
            duplicate: None,
            build_state: BuildState::NotStarted,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plugin Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds one or more plugins to the toolkit.
    ///
    /// Adding a unique plugin twice is reported by [`finish()`](Self::finish)
    /// as [`ToolkitError::DuplicatePlugin`]; the second instance is dropped.
    pub fn add_plugins<P: Plugins>(&mut self, plugins: P) -> &mut Self {
        plugins.add_to_toolkit(self);
        self
    }

    pub(crate) fn add_plugin_boxed(&mut self, id: PluginId, plugin: Box<dyn Plugin>) {
        let name = plugin.name().to_string();

        if plugin.is_unique() && self.plugin_ids.contains(&id) {
            tracing::warn!(plugin = %name, "unique plugin added twice, ignoring");
            if self.duplicate.is_none() {
                self.duplicate = Some(ToolkitError::DuplicatePlugin(name));
            }
            return;
        }
        self.plugin_ids.insert(id);

        let entry = PluginEntry { id, plugin, name };
        if self.build_state == BuildState::NotStarted {
            self.pending_plugins.push(entry);
        } else {
            tracing::warn!(plugin = %entry.name, "plugin added after finish(), ignoring");
        }
    }

    /// Returns true if a plugin of the given type has been added.
    #[must_use]
    pub fn has_plugin<P: Plugin>(&self) -> bool {
        self.plugin_ids.contains(&PluginId::of::<P>())
    }

    /// Returns plugin names, in build order once built.
    #[must_use]
    pub fn plugin_names(&self) -> Vec<&str> {
        self.built_plugins
            .iter()
            .chain(&self.pending_plugins)
            .map(|entry| entry.name.as_str())
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Builds and readies all plugins, then freezes the registry.
    ///
    /// # Errors
    ///
    /// - [`ToolkitError::AlreadyBuilt`] if called twice
    /// - [`ToolkitError::DuplicatePlugin`] if a unique plugin was added twice
    /// - [`ToolkitError::MissingDependency`] / [`ToolkitError::CircularDependency`]
    ///   if plugins cannot be ordered
    /// - [`ToolkitError::PluginBuild`] if the registry rejected a plugin
    pub fn finish(&mut self) -> Result<(), ToolkitError> {
        if self.build_state != BuildState::NotStarted {
            return Err(ToolkitError::AlreadyBuilt);
        }
        if let Some(err) = self.duplicate.take() {
            return Err(err);
        }

        let sorted_plugins = self.sort_plugins_by_dependencies()?;

        self.build_state = BuildState::Building;
        for entry in sorted_plugins {
            tracing::debug!(plugin = %entry.name, "building plugin");
            if let Err(source) = entry.plugin.build(&mut self.registry) {
                return Err(ToolkitError::plugin_build(entry.name, source));
            }
            self.built_plugins.push(entry);
        }

        for entry in &self.built_plugins {
            entry.plugin.ready(&self.registry);
        }

        self.build_state = BuildState::Built;
        tracing::info!(
            plugins = self.built_plugins.len(),
            specs = self.registry.specs().count(),
            "toolkit built"
        );
        Ok(())
    }

    /// Returns true once [`finish()`](Self::finish) has succeeded.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.build_state == BuildState::Built
    }

    /// Returns the frozen registry.
    ///
    /// # Errors
    ///
    /// [`ToolkitError::NotBuilt`] before [`finish()`](Self::finish) succeeded.
    pub fn registry(&self) -> Result<&HookRegistry, ToolkitError> {
        if self.is_built() {
            Ok(&self.registry)
        } else {
            Err(ToolkitError::NotBuilt)
        }
    }

    /// Creates a dispatcher over the frozen registry.
    ///
    /// # Errors
    ///
    /// [`ToolkitError::NotBuilt`] before [`finish()`](Self::finish) succeeded.
    pub fn dispatcher(&self) -> Result<Dispatcher<'_>, ToolkitError> {
        self.registry().map(Dispatcher::new)
    }

    /// Calls `cleanup()` on built plugins in reverse order.
    pub fn cleanup(&self) {
        for entry in self.built_plugins.iter().rev() {
            entry.plugin.cleanup();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal: Dependency Resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Topologically sorts pending plugins, keeping insertion order among
    /// independent plugins.
    fn sort_plugins_by_dependencies(&mut self) -> Result<Vec<PluginEntry>, ToolkitError> {
        let n = self.pending_plugins.len();

        let mut id_to_index: HashMap<PluginId, usize> = HashMap::new();
        for (i, entry) in self.pending_plugins.iter().enumerate() {
            id_to_index.entry(entry.id).or_insert(i);
        }

        let mut in_degree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, entry) in self.pending_plugins.iter().enumerate() {
            for dep_id in entry.plugin.dependencies() {
                let Some(&dep_idx) = id_to_index.get(&dep_id) else {
                    return Err(ToolkitError::MissingDependency {
                        plugin: entry.name.clone(),
                        dependency: dep_id.type_name(),
                    });
                };
                dependents[dep_idx].push(i);
                in_degree[i] += 1;
            }
        }

        // Kahn's algorithm; the ready set is ordered so ties follow insertion.
        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, deg)| **deg == 0)
            .map(|(i, _)| i)
            .collect();
        let mut sorted_indices: Vec<usize> = Vec::with_capacity(n);

        while let Some(idx) = ready.pop_first() {
            sorted_indices.push(idx);
            for &dependent_idx in &dependents[idx] {
                in_degree[dependent_idx] -= 1;
                if in_degree[dependent_idx] == 0 {
                    ready.insert(dependent_idx);
                }
            }
        }

        if sorted_indices.len() != n {
            let plugins = in_degree
                .iter()
                .enumerate()
                .filter(|(_, deg)| **deg > 0)
                .map(|(i, _)| self.pending_plugins[i].name.clone())
                .collect();
            return Err(ToolkitError::CircularDependency { plugins });
        }

        let mut slots: Vec<Option<PluginEntry>> = core::mem::take(&mut self.pending_plugins)
            .into_iter()
            .map(Some)
            .collect();
        Ok(sorted_indices
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect())
    }
}
