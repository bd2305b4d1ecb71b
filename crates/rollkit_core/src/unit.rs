//! Units: continuous processing stages.
//!
//! A [`Unit`] is one stage of the process, a rolling pass for instance. It
//! owns its boundary profiles and, once requested, its disk elements.
//!
//! # Assembly
//!
//! Units are assembled with a [`UnitBuilder`]. Known quantities are preset
//! on the unit and its profiles; everything else is resolved through hooks
//! on first access.
//!
//! ```
//! use rollkit_core::profile::{HEIGHT, WIDTH, X};
//! use rollkit_core::unit::{DISK_ELEMENT_COUNT, DURATION, LENGTH, Unit};
//! use rollkit_hooks::{HookCache, Host};
//!
//! let unit = Unit::builder("cooling section")
//!     .with(DURATION, 10.0)
//!     .with(LENGTH, 5.0)
//!     .with(DISK_ELEMENT_COUNT, 2)
//!     .in_profile(HookCache::new().with(X, 0.0).with(WIDTH, 100.0).with(HEIGHT, 50.0))
//!     .build();
//!
//! assert_eq!(unit.in_profile().unit().unwrap().label(), "cooling section");
//! assert!(unit.generated_disk_elements().is_none());
//! ```
//!
//! # Disk elements
//!
//! [`Unit::disk_elements`] generates the sequence exactly once, with the
//! length given by the [`DISK_ELEMENT_COUNT`] hook. Elements refer back to
//! the unit weakly and derive their neighbours from it, so the sequence is
//! the only place their order is stored.

use core::fmt;
use std::sync::{Arc, OnceLock, Weak};

use rollkit_hooks::{Dispatcher, Hook, HookCache, HookError, HookValue, Host, HostExt, Tag};

use crate::disk_element::DiskElement;
use crate::profile::{
    IDEAL_OUT_PROFILE, Profile, ProfileOwner, UNIT_IN_PROFILE, UNIT_OUT_PROFILE,
};

// ─────────────────────────────────────────────────────────────────────────────
// Tags and hooks
// ─────────────────────────────────────────────────────────────────────────────

/// Any unit.
pub static UNIT: Tag = Tag::root("unit");

/// A unit in which the workpiece is deformed between rolls.
pub static ROLL_PASS: Tag = Tag::child("roll_pass", &UNIT);

/// Time the workpiece spends in the unit.
pub const DURATION: Hook<f64> = Hook::new("duration");

/// Spatial extent of the unit along the rolling direction.
pub const LENGTH: Hook<f64> = Hook::new("length");

/// Mean workpiece velocity in the unit.
pub const VELOCITY: Hook<f64> = Hook::new("velocity");

/// Number of disk elements the unit is split into.
pub const DISK_ELEMENT_COUNT: Hook<usize> = Hook::new("disk_element_count");

// ─────────────────────────────────────────────────────────────────────────────
// Unit
// ─────────────────────────────────────────────────────────────────────────────

/// One continuous processing stage.
pub struct Unit {
    tag: &'static Tag,
    label: String,
    hooks: HookCache,
    in_profile: Profile,
    out_profile: Profile,
    ideal_out_profile: Option<Profile>,
    disk_elements: OnceLock<Vec<Arc<DiskElement>>>,
    this: Weak<Unit>,
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("tag", &self.tag.name())
            .field("label", &self.label)
            .field("hooks", &self.hooks)
            .field(
                "disk_elements",
                &self.disk_elements.get().map(Vec::len),
            )
            .finish_non_exhaustive()
    }
}

impl Unit {
    /// Starts assembling a generic unit.
    #[must_use]
    pub fn builder(label: impl Into<String>) -> UnitBuilder {
        UnitBuilder::new(&UNIT, label.into())
    }

    /// Starts assembling a roll pass.
    #[must_use]
    pub fn roll_pass(label: impl Into<String>) -> UnitBuilder {
        UnitBuilder::new(&ROLL_PASS, label.into())
    }

    /// Returns the entry profile.
    #[must_use]
    pub fn in_profile(&self) -> &Profile {
        &self.in_profile
    }

    /// Returns the exit profile.
    #[must_use]
    pub fn out_profile(&self) -> &Profile {
        &self.out_profile
    }

    /// Returns the target exit profile, if one was assembled.
    #[must_use]
    pub fn ideal_out_profile(&self) -> Option<&Profile> {
        self.ideal_out_profile.as_ref()
    }

    /// Returns the disk elements, generating them on first call.
    ///
    /// The sequence length is the resolved [`DISK_ELEMENT_COUNT`]; a count of
    /// zero yields an empty sequence.
    ///
    /// # Errors
    ///
    /// Propagates the error resolving [`DISK_ELEMENT_COUNT`]. Nothing is
    /// generated in that case, so a later call may succeed.
    pub fn disk_elements(&self, ctx: &Dispatcher<'_>) -> Result<&[Arc<DiskElement>], HookError> {
        if let Some(elements) = self.disk_elements.get() {
            return Ok(elements);
        }

        let count = self.attr(ctx, DISK_ELEMENT_COUNT)?;
        let elements = self.disk_elements.get_or_init(|| self.generate_disk_elements(count));
        Ok(elements)
    }

    /// Returns the disk elements if they were already generated.
    #[must_use]
    pub fn generated_disk_elements(&self) -> Option<&[Arc<DiskElement>]> {
        self.disk_elements.get().map(Vec::as_slice)
    }

    fn generate_disk_elements(&self, count: usize) -> Vec<Arc<DiskElement>> {
        tracing::debug!(unit = %self.label, count, "generating disk elements");
        (0..count)
            .map(|index| DiskElement::new(self.this.clone(), &self.label, index))
            .collect()
    }
}

impl Host for Unit {
    fn tag(&self) -> &'static Tag {
        self.tag
    }

    fn hooks(&self) -> &HookCache {
        &self.hooks
    }

    fn label(&self) -> &str {
        &self.label
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UnitBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Assembles a [`Unit`] with preset attribute values.
#[derive(Debug)]
pub struct UnitBuilder {
    tag: &'static Tag,
    label: String,
    hooks: HookCache,
    in_profile: HookCache,
    out_profile: HookCache,
    ideal_out_profile: Option<HookCache>,
}

impl UnitBuilder {
    fn new(tag: &'static Tag, label: String) -> Self {
        Self {
            tag,
            label,
            hooks: HookCache::new(),
            in_profile: HookCache::new(),
            out_profile: HookCache::new(),
            ideal_out_profile: None,
        }
    }

    /// Overrides the capability tag; it should descend from [`UNIT`].
    #[must_use]
    pub fn tag(mut self, tag: &'static Tag) -> Self {
        self.tag = tag;
        self
    }

    /// Presets a unit attribute.
    #[must_use]
    pub fn with<T: HookValue>(mut self, hook: Hook<T>, value: T) -> Self {
        self.hooks = self.hooks.with(hook, value);
        self
    }

    /// Sets the preset values of the entry profile.
    #[must_use]
    pub fn in_profile(mut self, hooks: HookCache) -> Self {
        self.in_profile = hooks;
        self
    }

    /// Sets the preset values of the exit profile.
    #[must_use]
    pub fn out_profile(mut self, hooks: HookCache) -> Self {
        self.out_profile = hooks;
        self
    }

    /// Adds a target exit profile with the given preset values.
    #[must_use]
    pub fn ideal_out_profile(mut self, hooks: HookCache) -> Self {
        self.ideal_out_profile = Some(hooks);
        self
    }

    /// Builds the unit.
    #[must_use]
    pub fn build(self) -> Arc<Unit> {
        let Self {
            tag,
            label,
            hooks,
            in_profile,
            out_profile,
            ideal_out_profile,
        } = self;

        Arc::new_cyclic(|this: &Weak<Unit>| {
            let profile = |tag: &'static Tag, suffix: &str, hooks: HookCache| {
                Profile::attached(
                    tag,
                    format!("{label} {suffix}"),
                    hooks,
                    ProfileOwner::Unit(this.clone()),
                )
            };

            Unit {
                tag,
                in_profile: profile(&UNIT_IN_PROFILE, "in profile", in_profile),
                out_profile: profile(&UNIT_OUT_PROFILE, "out profile", out_profile),
                ideal_out_profile: ideal_out_profile
                    .map(|hooks| profile(&IDEAL_OUT_PROFILE, "ideal out profile", hooks)),
                label: label.clone(),
                hooks,
                disk_elements: OnceLock::new(),
                this: this.clone(),
            }
        })
    }
}
