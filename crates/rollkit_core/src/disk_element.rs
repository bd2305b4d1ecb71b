//! Disk elements: discrete slices of a unit.
//!
//! A [`DiskElement`] knows its parent unit and its index. Its neighbours are
//! not stored: [`prev`](DiskElement::prev) and [`next`](DiskElement::next)
//! look them up in the parent's sequence, so the sequence and the
//! navigation can never disagree.

use core::fmt;
use std::sync::{Arc, Weak};

use rollkit_hooks::{HookCache, Host, Tag};

use crate::profile::{DISK_ELEMENT_IN_PROFILE, DISK_ELEMENT_OUT_PROFILE, Profile, ProfileOwner};
use crate::unit::Unit;

/// Any disk element.
pub static DISK_ELEMENT: Tag = Tag::root("disk_element");

/// One slice of a unit.
pub struct DiskElement {
    parent: Weak<Unit>,
    index: usize,
    label: String,
    hooks: HookCache,
    in_profile: Profile,
    out_profile: Profile,
}

impl fmt::Debug for DiskElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskElement")
            .field("label", &self.label)
            .field("index", &self.index)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl DiskElement {
    pub(crate) fn new(parent: Weak<Unit>, parent_label: &str, index: usize) -> Arc<Self> {
        let label = format!("{parent_label} disk element {index}");

        Arc::new_cyclic(|this: &Weak<DiskElement>| {
            let profile = |tag: &'static Tag, suffix: &str| {
                Profile::attached(
                    tag,
                    format!("{label} {suffix}"),
                    HookCache::new(),
                    ProfileOwner::DiskElement(this.clone()),
                )
            };

            DiskElement {
                parent,
                index,
                in_profile: profile(&DISK_ELEMENT_IN_PROFILE, "in profile"),
                out_profile: profile(&DISK_ELEMENT_OUT_PROFILE, "out profile"),
                label: label.clone(),
                hooks: HookCache::new(),
            }
        })
    }

    /// Returns the owning unit, or `None` once it was dropped.
    #[must_use]
    pub fn parent(&self) -> Option<Arc<Unit>> {
        self.parent.upgrade()
    }

    /// Returns the position in the parent's sequence.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns true for the first element of the sequence.
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Returns the previous element of the sequence.
    #[must_use]
    pub fn prev(&self) -> Option<Arc<DiskElement>> {
        self.sibling(self.index.checked_sub(1)?)
    }

    /// Returns the next element of the sequence.
    #[must_use]
    pub fn next(&self) -> Option<Arc<DiskElement>> {
        self.sibling(self.index.checked_add(1)?)
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

    fn sibling(&self, index: usize) -> Option<Arc<DiskElement>> {
        let parent = self.parent()?;
        parent.generated_disk_elements()?.get(index).cloned()
    }
}

impl Host for DiskElement {
    fn tag(&self) -> &'static Tag {
        &DISK_ELEMENT
    }

    fn hooks(&self) -> &HookCache {
        &self.hooks
    }

    fn label(&self) -> &str {
        &self.label
    }
}
