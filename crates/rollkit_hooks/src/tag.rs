//! Capability tags.
//!
//! A [`Tag`] names an entity type. Tags form a tree through their optional
//! parent, so a roll pass can be declared as a specialisation of a generic
//! unit:
//!
//! ```
//! use rollkit_hooks::Tag;
//!
//! static UNIT: Tag = Tag::root("unit");
//! static ROLL_PASS: Tag = Tag::child("roll_pass", &UNIT);
//!
//! let names: Vec<_> = ROLL_PASS.lineage().map(Tag::name).collect();
//! assert_eq!(names, ["roll_pass", "unit"]);
//! assert!(ROLL_PASS.is_a(&UNIT));
//! assert!(!UNIT.is_a(&ROLL_PASS));
//! ```
//!
//! Tag names must be unique within a process; equality compares names.

use core::fmt;

/// Static marker for an entity type, with an optional parent type.
#[derive(Debug)]
pub struct Tag {
    name: &'static str,
    parent: Option<&'static Tag>,
}

impl Tag {
    /// Creates a tag without ancestors.
    #[must_use]
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// Creates a tag specialising `parent`.
    #[must_use]
    pub const fn child(name: &'static str, parent: &'static Tag) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    /// Returns the tag name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the parent tag, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&'static Tag> {
        self.parent
    }

    /// Iterates this tag and its ancestors, most specific first.
    pub fn lineage(&'static self) -> Lineage {
        Lineage { next: Some(self) }
    }

    /// Returns true if `other` is this tag or one of its ancestors.
    #[must_use]
    pub fn is_a(&self, other: &Tag) -> bool {
        if self == other {
            return true;
        }
        self.parent.is_some_and(|parent| parent.is_a(other))
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Tag {}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a tag and its ancestors.
#[derive(Debug, Clone)]
pub struct Lineage {
    next: Option<&'static Tag>,
}

impl Iterator for Lineage {
    type Item = &'static Tag;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}
