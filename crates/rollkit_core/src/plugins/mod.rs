//! Model plugins: profile geometry, unit quantities and discretization.
//!
//! [`MinimalPlugins`] bundles every model plugin of this crate, including
//! the roll pass formulas. Logging is added by the infrastructure group in
//! `rollkit_core_plugins`.

mod disk_elements;
mod profile;
mod unit;

pub use disk_elements::DiskElementPlugin;
pub use profile::ProfilePlugin;
pub use unit::UnitPlugin;

use rollkit_system::plugin::{PluginGroup, PluginGroupBuilder};

use crate::roll_pass::{GeuzeSpreadPlugin, RollPassPlugin};

/// Model plugins without infrastructure.
///
/// Includes:
/// - [`ProfilePlugin`] - Profile geometry
/// - [`UnitPlugin`] - Unit quantities
/// - [`DiskElementPlugin`] - Discretization into disk elements
/// - [`RollPassPlugin`] - Roll pass spreading
/// - [`GeuzeSpreadPlugin`] - Geuze spreading formula
///
/// # Example
///
/// ```
/// use rollkit_core::plugins::MinimalPlugins;
/// use rollkit_core::roll_pass::GeuzeSpreadPlugin;
/// use rollkit_system::plugin::PluginGroup;
/// use rollkit_system::Toolkit;
///
/// let mut toolkit = Toolkit::new();
/// toolkit.add_plugins(MinimalPlugins.build().disable::<GeuzeSpreadPlugin>());
/// toolkit.finish().unwrap();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalPlugins;

impl PluginGroup for MinimalPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::new()
            .add(ProfilePlugin)
            .add(UnitPlugin)
            .add(DiskElementPlugin)
            .add(RollPassPlugin)
            .add(GeuzeSpreadPlugin::default())
    }
}
