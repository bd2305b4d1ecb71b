//! Rolling process model for rollkit (Layer 2).
//!
//! `rollkit_core` defines the entities whose attributes are resolved through
//! hooks, and the plugins that give those attributes their meaning:
//!
//! - [`unit`] - Units (processing stages) and the [`UnitBuilder`](unit::UnitBuilder)
//! - [`disk_element`] - Disk elements, the discrete slices of a unit
//! - [`profile`] - Boundary profiles and their geometry
//! - [`plugins`] - Profile, unit and discretization plugins
//! - [`roll_pass`] - Roll pass spreading and the Geuze formula
//!
//! # Example
//!
//! ```
//! use rollkit_core::prelude::*;
//! use rollkit_hooks::prelude::*;
//! use rollkit_system::prelude::*;
//!
//! let mut toolkit = Toolkit::new();
//! toolkit.add_plugins(MinimalPlugins.build());
//! toolkit.finish().unwrap();
//! let ctx = toolkit.dispatcher().unwrap();
//!
//! let unit = Unit::builder("furnace exit")
//!     .with(DURATION, 10.0)
//!     .with(LENGTH, 5.0)
//!     .with(DISK_ELEMENT_COUNT, 2)
//!     .in_profile(HookCache::new().with(X, 0.0))
//!     .build();
//!
//! let elements = unit.disk_elements(&ctx).unwrap();
//! assert_eq!(elements.len(), 2);
//! assert_eq!(elements[1].attr(&ctx, DURATION).unwrap(), 5.0);
//! assert_eq!(elements[1].in_profile().attr(&ctx, X).unwrap(), 2.5);
//! ```

pub mod disk_element;
pub mod plugins;
pub mod profile;
pub mod roll_pass;
pub mod unit;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::disk_element::{DISK_ELEMENT, DiskElement};
    pub use crate::plugins::{DiskElementPlugin, MinimalPlugins, ProfilePlugin, UnitPlugin};
    pub use crate::profile::{
        EQUIVALENT_RECTANGLE, HEIGHT, Profile, Rectangle, WIDTH, X,
    };
    pub use crate::roll_pass::{GEUZE_COEFFICIENT, GeuzeSpreadPlugin, RollPassPlugin, SPREAD};
    pub use crate::unit::{
        DISK_ELEMENT_COUNT, DURATION, LENGTH, ROLL_PASS, UNIT, Unit, UnitBuilder, VELOCITY,
    };
}
