//! A plugin-driven core for simulating metal rolling processes.
//!
//! Entities expose their attributes through hooks; plugins declare and
//! implement them, and a dispatcher resolves each attribute on first access.
//!
//! ```
//! use rollkit::prelude::*;
//!
//! let mut toolkit = Toolkit::new();
//! toolkit.add_plugins(MinimalPlugins.build());
//! toolkit.finish().unwrap();
//!
//! let unit = Unit::builder("U1")
//!     .with(DURATION, 10.0)
//!     .with(LENGTH, 5.0)
//!     .with(DISK_ELEMENT_COUNT, 2)
//!     .build();
//!
//! let ctx = toolkit.dispatcher().unwrap();
//! let elements = unit.disk_elements(&ctx).unwrap();
//! assert_eq!(elements[0].attr(&ctx, LENGTH).unwrap(), 2.5);
//! ```

pub use rollkit_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use rollkit_internal::prelude::*;
}
