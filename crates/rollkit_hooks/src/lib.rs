//! Hook-based attribute resolution for rollkit (Layer 1).
//!
//! `rollkit_hooks` provides the machinery that lets any entity expose derived
//! attributes whose formulas are supplied by plugins:
//!
//! - [`tag`] - Capability tags describing entity types and their ancestors
//! - [`hook`] - Typed hook keys and the [`HookValue`] trait for cached values
//! - [`cache`] - Per-entity attribute cache
//! - [`registry`] - Specifications, implementations and ordering policy
//! - [`dispatch`] - The [`Dispatcher`] that resolves attributes on demand
//! - [`error`] - The [`HookError`] taxonomy
//!
//! # Example
//!
//! ```
//! use rollkit_hooks::prelude::*;
//!
//! static PLATE: Tag = Tag::root("plate");
//! const AREA: Hook<f64> = Hook::new("area");
//! const WIDTH: Hook<f64> = Hook::new("width");
//!
//! struct Plate {
//!     hooks: HookCache,
//! }
//!
//! impl Host for Plate {
//!     fn tag(&self) -> &'static Tag {
//!         &PLATE
//!     }
//!     fn hooks(&self) -> &HookCache {
//!         &self.hooks
//!     }
//!     fn label(&self) -> &str {
//!         "plate"
//!     }
//! }
//!
//! let mut registry = HookRegistry::new();
//! registry
//!     .add_hookspecs(
//!         HookSpecs::new()
//!             .spec::<Plate, f64>(&PLATE, WIDTH, "Plate width.")
//!             .spec::<Plate, f64>(&PLATE, AREA, "Plate area."),
//!     )
//!     .unwrap();
//! registry
//!     .register(HookImpls::new().implement(&PLATE, AREA, |plate: &Plate, ctx: &Dispatcher<'_>| {
//!         let width = plate.attr(ctx, WIDTH)?;
//!         Ok(Some(width * width))
//!     }))
//!     .unwrap();
//!
//! let plate = Plate { hooks: HookCache::new().with(WIDTH, 3.0) };
//! let ctx = Dispatcher::new(&registry);
//! assert_eq!(plate.attr(&ctx, AREA).unwrap(), 9.0);
//! ```

pub mod cache;
pub mod dispatch;
pub mod error;
pub mod hook;
pub mod registry;
pub mod tag;

pub use cache::HookCache;
pub use dispatch::{Dispatcher, Host, HostExt};
pub use error::HookError;
pub use hook::{Hook, HookValue};
pub use registry::{
    HookImpls, HookRegistry, HookSpec, HookSpecs, ImplOptions, Priority, ResolutionOrder,
};
pub use tag::Tag;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::cache::HookCache;
    pub use crate::dispatch::{Dispatcher, Host, HostExt};
    pub use crate::error::HookError;
    pub use crate::hook::{Hook, HookValue};
    pub use crate::registry::{
        HookImpls, HookRegistry, HookSpecs, ImplOptions, Priority, ResolutionOrder,
    };
    pub use crate::tag::Tag;
}
