//! Plugin system for extensible attribute models.
//!
//! Plugins are the unit of composition in rollkit. Entity attributes, the
//! discretization rules and every formula are delivered by plugins that
//! declare hook specifications and register implementations.
//!
//! # Example
//!
//! ```
//! use rollkit_hooks::prelude::*;
//! use rollkit_system::plugin::{Plugin, PluginId};
//! use rollkit_system::toolkit::Toolkit;
//!
//! static BILLET: Tag = Tag::root("billet");
//! const MASS: Hook<f64> = Hook::new("mass");
//!
//! struct Billet {
//!     hooks: HookCache,
//! }
//!
//! impl Host for Billet {
//!     fn tag(&self) -> &'static Tag {
//!         &BILLET
//!     }
//!     fn hooks(&self) -> &HookCache {
//!         &self.hooks
//!     }
//!     fn label(&self) -> &str {
//!         "billet"
//!     }
//! }
//!
//! struct BilletPlugin;
//!
//! impl Plugin for BilletPlugin {
//!     fn build(&self, registry: &mut HookRegistry) -> Result<(), HookError> {
//!         registry.add_hookspecs(HookSpecs::new().spec::<Billet, f64>(&BILLET, MASS, "Mass in kg."))
//!     }
//! }
//!
//! struct DefaultMassPlugin;
//!
//! impl Plugin for DefaultMassPlugin {
//!     fn build(&self, registry: &mut HookRegistry) -> Result<(), HookError> {
//!         registry.register(HookImpls::new().implement(
//!             &BILLET,
//!             MASS,
//!             |_: &Billet, _: &Dispatcher<'_>| Ok(Some(1200.0)),
//!         ))
//!     }
//!
//!     fn dependencies(&self) -> Vec<PluginId> {
//!         vec![PluginId::of::<BilletPlugin>()]
//!     }
//! }
//!
//! let mut toolkit = Toolkit::new();
//! toolkit.add_plugins(DefaultMassPlugin).add_plugins(BilletPlugin);
//! toolkit.finish().unwrap();
//!
//! let ctx = toolkit.dispatcher().unwrap();
//! let billet = Billet { hooks: HookCache::new() };
//! assert_eq!(billet.attr(&ctx, MASS).unwrap(), 1200.0);
//! ```

use core::any::TypeId;

use rollkit_hooks::{HookError, HookRegistry};

use crate::toolkit::Toolkit;

// ─────────────────────────────────────────────────────────────────────────────
// PluginId
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier for a plugin type.
///
/// Used for dependency resolution and duplicate detection. Based on [`TypeId`],
/// so each plugin type has exactly one `PluginId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId {
    type_id: TypeId,
    type_name: &'static str,
}

impl PluginId {
    /// Creates a `PluginId` for the given plugin type.
    #[must_use]
    pub fn of<P: Plugin>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: core::any::type_name::<P>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name for debugging.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugin Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A bundle of hook specifications and implementations.
///
/// Plugins follow a strict lifecycle managed by the [`Toolkit`]:
///
/// 1. **Build Phase** - `build()` is called in dependency order with the
///    mutable registry
/// 2. **Ready Phase** - `ready()` is called in dependency order with the
///    frozen registry
/// 3. **Cleanup Phase** - `cleanup()` is called in reverse dependency order
///
/// A plugin that implements hooks specified by another plugin declares it
/// in [`dependencies()`](Self::dependencies); registration fails with
/// [`HookError::UnknownAttribute`] otherwise.
pub trait Plugin: Send + Sync + 'static {
    /// Declares specifications and registers implementations.
    ///
    /// # Errors
    ///
    /// Returns the registry error that rejected a bundle. The toolkit aborts
    /// the build with [`ToolkitError::PluginBuild`](crate::ToolkitError::PluginBuild).
    fn build(&self, registry: &mut HookRegistry) -> Result<(), HookError>;

    /// Called after all plugins have been built.
    ///
    /// Use this for validation against the complete registry or for one-time
    /// initialization such as installing a log subscriber.
    fn ready(&self, _registry: &HookRegistry) {}

    /// Called when the toolkit is shutting down.
    ///
    /// Called in **reverse** dependency order (dependents cleanup before dependencies).
    fn cleanup(&self) {}

    /// Returns the plugin's name for debugging and error messages.
    ///
    /// Default implementation returns the type name.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }

    /// Declares plugins that must be built before this one.
    fn dependencies(&self) -> Vec<PluginId> {
        Vec::new()
    }

    /// Returns true if this plugin can only be added once.
    ///
    /// Default is `true`. Set to `false` for plugins that can be added
    /// multiple times with different configurations.
    fn is_unique(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugins Trait (for add_plugins polymorphism)
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for types that can be added to a toolkit as plugins.
///
/// This trait enables `toolkit.add_plugins()` to accept both:
/// - Single plugins implementing [`Plugin`]
/// - Plugin groups via [`PluginGroupBuilder`]
pub trait Plugins {
    /// Adds these plugins to the toolkit.
    fn add_to_toolkit(self, toolkit: &mut Toolkit);
}

impl<P: Plugin> Plugins for P {
    fn add_to_toolkit(self, toolkit: &mut Toolkit) {
        let id = PluginId::of::<P>();
        toolkit.add_plugin_boxed(id, Box::new(self));
    }
}

impl Plugins for PluginGroupBuilder {
    fn add_to_toolkit(self, toolkit: &mut Toolkit) {
        for boxed in self.plugins {
            toolkit.add_plugin_boxed(boxed.id, boxed.plugin);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginGroup Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A collection of plugins that can be added together.
///
/// # Example
///
/// ```ignore
/// // Swap the formula plugin of a group for a custom one
/// Toolkit::new().add_plugins(
///     DefaultPlugins
///         .build()
///         .disable::<GeuzeSpreadPlugin>()
///         .add(MySpreadPlugin),
/// );
/// ```
pub trait PluginGroup {
    /// Returns the plugins in this group.
    fn build(self) -> PluginGroupBuilder;
}

// ─────────────────────────────────────────────────────────────────────────────
// BoxedPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// A boxed plugin with its captured [`PluginId`].
pub(crate) struct BoxedPlugin {
    pub(crate) id: PluginId,
    pub(crate) plugin: Box<dyn Plugin>,
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginGroupBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for customizing plugin groups.
///
/// Allows adding, removing, and reordering plugins within a group.
#[derive(Default)]
pub struct PluginGroupBuilder {
    pub(crate) plugins: Vec<BoxedPlugin>,
}

impl PluginGroupBuilder {
    /// Creates a new empty plugin group builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Adds a plugin to the end of the group.
    #[must_use]
    #[expect(
        clippy::should_implement_trait,
        reason = "This is a builder method, not std::ops::Add"
    )]
    pub fn add<P: Plugin>(mut self, plugin: P) -> Self {
        self.plugins.push(BoxedPlugin {
            id: PluginId::of::<P>(),
            plugin: Box::new(plugin),
        });
        self
    }

    /// Adds a plugin after another plugin in the group.
    ///
    /// If `Target` is not found, the plugin is added at the end.
    #[must_use]
    pub fn add_after<P: Plugin, Target: Plugin>(mut self, plugin: P) -> Self {
        let target = PluginId::of::<Target>();
        let position = self
            .plugins
            .iter()
            .position(|p| p.id == target)
            .map_or(self.plugins.len(), |i| i + 1);
        self.plugins.insert(
            position,
            BoxedPlugin {
                id: PluginId::of::<P>(),
                plugin: Box::new(plugin),
            },
        );
        self
    }

    /// Removes a plugin from the group by type.
    ///
    /// If the plugin is not found, this is a no-op.
    #[must_use]
    pub fn disable<P: Plugin>(mut self) -> Self {
        let target = PluginId::of::<P>();
        self.plugins.retain(|p| p.id != target);
        self
    }

    /// Returns true if the group contains a plugin of type `P`.
    #[must_use]
    pub fn contains<P: Plugin>(&self) -> bool {
        let target = PluginId::of::<P>();
        self.plugins.iter().any(|p| p.id == target)
    }

    /// Returns the number of plugins in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if the group contains no plugins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PluginA;
    impl Plugin for PluginA {
        fn build(&self, _registry: &mut HookRegistry) -> Result<(), HookError> {
            Ok(())
        }
    }

    struct PluginB;
    impl Plugin for PluginB {
        fn build(&self, _registry: &mut HookRegistry) -> Result<(), HookError> {
            Ok(())
        }
        fn dependencies(&self) -> Vec<PluginId> {
            vec![PluginId::of::<PluginA>()]
        }
    }

    struct PluginC;
    impl Plugin for PluginC {
        fn build(&self, _registry: &mut HookRegistry) -> Result<(), HookError> {
            Ok(())
        }
    }

    fn names(builder: &PluginGroupBuilder) -> Vec<&str> {
        builder.plugins.iter().map(|p| p.id.type_name()).collect()
    }

    #[test]
    fn plugin_id_equality() {
        assert_eq!(PluginId::of::<PluginA>(), PluginId::of::<PluginA>());
        assert_ne!(PluginId::of::<PluginA>(), PluginId::of::<PluginB>());
        assert_eq!(PluginId::of::<PluginA>().type_id(), TypeId::of::<PluginA>());
    }

    #[test]
    fn plugin_defaults() {
        let plugin = PluginA;
        assert!(plugin.name().contains("PluginA"));
        assert!(plugin.is_unique());
        assert!(plugin.dependencies().is_empty());
    }

    #[test]
    fn plugin_with_dependencies() {
        assert_eq!(PluginB.dependencies(), vec![PluginId::of::<PluginA>()]);
    }

    #[test]
    fn plugin_group_builder_add_after() {
        let builder = PluginGroupBuilder::new()
            .add(PluginA)
            .add(PluginB)
            .add_after::<_, PluginA>(PluginC);

        let order = names(&builder);
        assert_eq!(order.len(), 3);
        assert!(order[0].ends_with("PluginA"));
        assert!(order[1].ends_with("PluginC"));
        assert!(order[2].ends_with("PluginB"));
    }

    #[test]
    fn plugin_group_builder_add_after_not_found() {
        let builder = PluginGroupBuilder::new()
            .add(PluginA)
            .add_after::<_, PluginB>(PluginC);

        let order = names(&builder);
        assert!(order[0].ends_with("PluginA"));
        assert!(order[1].ends_with("PluginC"));
    }

    #[test]
    fn plugin_group_builder_disable() {
        let builder = PluginGroupBuilder::new()
            .add(PluginA)
            .add(PluginB)
            .disable::<PluginA>()
            .disable::<PluginC>();

        assert_eq!(builder.len(), 1);
        assert!(builder.contains::<PluginB>());
        assert!(!builder.contains::<PluginA>());
    }

    #[test]
    fn plugin_group_build() {
        struct TestPluginGroup;

        impl PluginGroup for TestPluginGroup {
            fn build(self) -> PluginGroupBuilder {
                PluginGroupBuilder::new().add(PluginA).add(PluginB)
            }
        }

        let builder = TestPluginGroup.build();
        assert_eq!(builder.len(), 2);
        assert!(!builder.is_empty());
        assert!(PluginGroupBuilder::new().is_empty());
    }
}
