//! Infrastructure plugins and the default plugin group for rollkit.
//!
//! - [`TracingPlugin`] - Logging via the `tracing` crate
//! - [`DefaultPlugins`] - Logging plus every model plugin of `rollkit_core`
//!
//! # Example
//!
//! ```no_run
//! use rollkit_core::prelude::*;
//! use rollkit_core_plugins::DefaultPlugins;
//! use rollkit_hooks::{HookCache, HostExt};
//! use rollkit_system::Toolkit;
//! use rollkit_system::plugin::PluginGroup;
//!
//! let mut toolkit = Toolkit::new();
//! toolkit.add_plugins(DefaultPlugins.build());
//! toolkit.finish().unwrap();
//!
//! let pass = Unit::roll_pass("P1")
//!     .in_profile(HookCache::new().with(WIDTH, 100.0).with(HEIGHT, 50.0))
//!     .ideal_out_profile(HookCache::new().with(WIDTH, 100.0).with(HEIGHT, 40.0))
//!     .build();
//!
//! let ctx = toolkit.dispatcher().unwrap();
//! let width = pass.out_profile().attr(&ctx, WIDTH).unwrap();
//! tracing::info!(width, "exit width");
//! ```

mod tracing_plugin;

pub use tracing_plugin::{TracingConfig, TracingFormat, TracingPlugin};

use rollkit_core::plugins::{DiskElementPlugin, ProfilePlugin, UnitPlugin};
use rollkit_core::roll_pass::{GeuzeSpreadPlugin, RollPassPlugin};
use rollkit_system::plugin::{PluginGroup, PluginGroupBuilder};

/// Default plugins for most rollkit applications.
///
/// Includes:
/// - [`TracingPlugin`] - Logging
/// - [`ProfilePlugin`] - Profile geometry
/// - [`UnitPlugin`] - Unit quantities
/// - [`DiskElementPlugin`] - Discretization into disk elements
/// - [`RollPassPlugin`] - Roll pass spreading
/// - [`GeuzeSpreadPlugin`] - Geuze spreading formula
///
/// Use `rollkit_core::plugins::MinimalPlugins` for the same model without
/// logging setup.
///
/// # Customization
///
/// ```
/// use rollkit_core::roll_pass::GeuzeSpreadPlugin;
/// use rollkit_core_plugins::{DefaultPlugins, TracingPlugin};
/// use rollkit_system::plugin::PluginGroup;
///
/// let group = DefaultPlugins
///     .build()
///     .disable::<TracingPlugin>()
///     .disable::<GeuzeSpreadPlugin>()
///     .add(GeuzeSpreadPlugin::new().with_fallback_coefficient(0.25));
/// assert_eq!(group.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPlugins;

impl PluginGroup for DefaultPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::new()
            .add(TracingPlugin::default())
            .add(ProfilePlugin)
            .add(UnitPlugin)
            .add(DiskElementPlugin)
            .add(RollPassPlugin)
            .add(GeuzeSpreadPlugin::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plugins_contains_tracing_and_model() {
        let group = DefaultPlugins.build();
        assert_eq!(group.len(), 6);
        assert!(group.contains::<TracingPlugin>());
        assert!(group.contains::<DiskElementPlugin>());
        assert!(group.contains::<GeuzeSpreadPlugin>());
    }

    #[test]
    fn tracing_can_be_disabled() {
        let group = DefaultPlugins.build().disable::<TracingPlugin>();
        assert_eq!(group.len(), 5);
        assert!(!group.contains::<TracingPlugin>());
    }
}
