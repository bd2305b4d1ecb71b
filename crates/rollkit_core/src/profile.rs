//! Material cross-section state at a boundary.
//!
//! A [`Profile`] is the state of the workpiece at the entry or exit of a
//! unit or disk element. Its geometry is exposed through hooks, so values
//! preset by the assembly step and values derived by plugins are read the
//! same way.
//!
//! Boundary profiles keep a weak reference to the entity they belong to.
//! Chaining implementations use it to reach the owning unit or disk element.

use std::sync::{Arc, Weak};

use rollkit_hooks::{Hook, HookCache, Host, Tag};
use serde::{Deserialize, Serialize};

use crate::disk_element::DiskElement;
use crate::unit::Unit;

// ─────────────────────────────────────────────────────────────────────────────
// Tags
// ─────────────────────────────────────────────────────────────────────────────

/// Any profile.
pub static PROFILE: Tag = Tag::root("profile");

/// Entry profile of a unit.
pub static UNIT_IN_PROFILE: Tag = Tag::child("unit_in_profile", &PROFILE);

/// Exit profile of a unit.
pub static UNIT_OUT_PROFILE: Tag = Tag::child("unit_out_profile", &PROFILE);

/// Target exit profile of a unit, as designed by the pass schedule.
pub static IDEAL_OUT_PROFILE: Tag = Tag::child("ideal_out_profile", &PROFILE);

/// Entry profile of a disk element.
pub static DISK_ELEMENT_IN_PROFILE: Tag = Tag::child("disk_element_in_profile", &UNIT_IN_PROFILE);

/// Exit profile of a disk element.
pub static DISK_ELEMENT_OUT_PROFILE: Tag =
    Tag::child("disk_element_out_profile", &UNIT_OUT_PROFILE);

// ─────────────────────────────────────────────────────────────────────────────
// Hooks
// ─────────────────────────────────────────────────────────────────────────────

/// Position along the rolling direction.
pub const X: Hook<f64> = Hook::new("x");

/// Cross-section width.
pub const WIDTH: Hook<f64> = Hook::new("width");

/// Cross-section height.
pub const HEIGHT: Hook<f64> = Hook::new("height");

/// Rectangle substituted for the profile by spreading formulas.
///
/// Without a preset or a shape-specific implementation this is the bounding
/// rectangle `(width, height)` of the profile.
pub const EQUIVALENT_RECTANGLE: Hook<Rectangle> = Hook::new("equivalent_rectangle");

/// Width and height of a rectangular cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Extent across the rolling direction.
    pub width: f64,
    /// Extent in the direction of the roll gap.
    pub height: f64,
}

impl Rectangle {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the cross-section area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile
// ─────────────────────────────────────────────────────────────────────────────

/// Entity a boundary profile belongs to.
#[derive(Debug, Clone, Default)]
pub(crate) enum ProfileOwner {
    #[default]
    Detached,
    Unit(Weak<Unit>),
    DiskElement(Weak<DiskElement>),
}

/// Material state at a boundary.
#[derive(Debug)]
pub struct Profile {
    tag: &'static Tag,
    label: String,
    hooks: HookCache,
    owner: ProfileOwner,
}

impl Profile {
    /// Creates a profile that belongs to no unit.
    ///
    /// ```
    /// use rollkit_core::profile::{Profile, WIDTH};
    /// use rollkit_hooks::HookCache;
    ///
    /// let profile = Profile::new("billet", HookCache::new().with(WIDTH, 150.0));
    /// assert!(profile.unit().is_none());
    /// ```
    #[must_use]
    pub fn new(label: impl Into<String>, hooks: HookCache) -> Self {
        Self::attached(&PROFILE, label.into(), hooks, ProfileOwner::Detached)
    }

    pub(crate) fn attached(
        tag: &'static Tag,
        label: String,
        hooks: HookCache,
        owner: ProfileOwner,
    ) -> Self {
        Self {
            tag,
            label,
            hooks,
            owner,
        }
    }

    /// Returns the owning unit, if this is a unit boundary profile.
    #[must_use]
    pub fn unit(&self) -> Option<Arc<Unit>> {
        match &self.owner {
            ProfileOwner::Unit(unit) => unit.upgrade(),
            _ => None,
        }
    }

    /// Returns the owning disk element, if this is a disk element boundary profile.
    #[must_use]
    pub fn disk_element(&self) -> Option<Arc<DiskElement>> {
        match &self.owner {
            ProfileOwner::DiskElement(element) => element.upgrade(),
            _ => None,
        }
    }
}

impl Host for Profile {
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
