//! Hook registry.
//!
//! The [`HookRegistry`] maps `(tag, hook name)` to a specification and to an
//! ordered list of candidate implementations. Plugins populate it during
//! their build phase; afterwards it is only ever shared immutably with
//! [`Dispatcher`]s.
//!
//! # Specifications and implementations
//!
//! A specification ([`HookSpec`]) declares that entities of a tag expose an
//! attribute of a given value type. Implementations are candidate resolvers
//! for a specified attribute. Both are usually registered in bundles
//! ([`HookSpecs`], [`HookImpls`]); a bundle is validated as a whole before
//! any of its entries is inserted.
//!
//! # Ordering
//!
//! Candidates for an entity are collected along its tag lineage, most
//! specific tag first. Within one tag they are sorted by [`Priority`], then
//! by [`ResolutionOrder`]:
//!
//! | Order | Same priority |
//! |-------|---------------|
//! | [`ResolutionOrder::RegistrationOrder`] | first registered runs first |
//! | [`ResolutionOrder::LatestFirst`] | last registered runs first |

use core::any::{Any, TypeId};
use core::fmt;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Host};
use crate::error::HookError;
use crate::hook::{Hook, HookValue};
use crate::tag::Tag;

/// Type-erased implementation: receives the host as `&dyn Any`.
pub(crate) type ErasedImpl = Arc<
    dyn Fn(&dyn Any, &Dispatcher<'_>) -> Result<Option<Arc<dyn HookValue>>, HookError>
        + Send
        + Sync,
>;

type HookKey = (&'static str, &'static str);

fn erase<F>(func: F) -> ErasedImpl
where
    F: Fn(&dyn Any, &Dispatcher<'_>) -> Result<Option<Arc<dyn HookValue>>, HookError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(func)
}

// ─────────────────────────────────────────────────────────────────────────────
// Ordering policy
// ─────────────────────────────────────────────────────────────────────────────

/// Order of candidates that share a tag and a priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOrder {
    /// First registered implementation is tried first (default).
    #[default]
    RegistrationOrder,
    /// Last registered implementation is tried first.
    LatestFirst,
}

/// Priority band of an implementation within its tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Tried before normal implementations.
    Early,
    /// Default band.
    #[default]
    Normal,
    /// Tried after every other implementation; used for default values.
    Fallback,
}

/// Per-implementation registration options.
#[derive(Debug, Clone, Default)]
pub struct ImplOptions {
    name: Option<String>,
    priority: Priority,
}

impl ImplOptions {
    /// Creates options with the normal priority.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a [`Priority::Fallback`] implementation.
    #[must_use]
    pub fn fallback() -> Self {
        Self::new().with_priority(Priority::Fallback)
    }

    /// Shorthand for a [`Priority::Early`] implementation.
    #[must_use]
    pub fn early() -> Self {
        Self::new().with_priority(Priority::Early)
    }

    /// Sets the priority band.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the name reported in diagnostics.
    ///
    /// Defaults to the type name of the implementing function.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Specifications
// ─────────────────────────────────────────────────────────────────────────────

/// Declaration that entities of a tag expose an attribute.
#[derive(Debug, Clone)]
pub struct HookSpec {
    tag: &'static Tag,
    name: &'static str,
    doc: &'static str,
    nullable: bool,
    value_type: TypeId,
    value_type_name: &'static str,
    host_type: TypeId,
    host_type_name: &'static str,
}

impl HookSpec {
    /// Creates a non-nullable specification of `hook` for hosts of type `E`.
    #[must_use]
    pub fn new<E: Host, T: HookValue>(tag: &'static Tag, hook: Hook<T>, doc: &'static str) -> Self {
        Self {
            tag,
            name: hook.name(),
            doc,
            nullable: false,
            value_type: TypeId::of::<T>(),
            value_type_name: core::any::type_name::<T>(),
            host_type: TypeId::of::<E>(),
            host_type_name: core::any::type_name::<E>(),
        }
    }

    /// Marks the attribute as nullable: if no candidate produces a value,
    /// resolution yields `None` instead of failing.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Returns the tag the specification was declared on.
    #[must_use]
    pub fn tag(&self) -> &'static Tag {
        self.tag
    }

    /// Returns the hook name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the documented contract.
    #[must_use]
    pub fn doc(&self) -> &'static str {
        self.doc
    }

    /// Returns true if the attribute may resolve to nothing.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns the declared value type name.
    #[must_use]
    pub fn value_type_name(&self) -> &'static str {
        self.value_type_name
    }

    /// Checks that `T` is the declared value type.
    pub(crate) fn check_value<T: 'static>(&self) -> Result<(), HookError> {
        if self.value_type == TypeId::of::<T>() {
            Ok(())
        } else {
            Err(HookError::TypeMismatch {
                hook: self.name,
                expected: self.value_type_name,
                found: core::any::type_name::<T>(),
            })
        }
    }
}

/// Bundle of specifications registered together.
#[derive(Debug, Clone, Default)]
pub struct HookSpecs {
    specs: Vec<HookSpec>,
}

impl HookSpecs {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a non-nullable specification.
    #[must_use]
    pub fn spec<E: Host, T: HookValue>(
        self,
        tag: &'static Tag,
        hook: Hook<T>,
        doc: &'static str,
    ) -> Self {
        self.with(HookSpec::new::<E, T>(tag, hook, doc))
    }

    /// Adds a nullable specification.
    #[must_use]
    pub fn nullable_spec<E: Host, T: HookValue>(
        self,
        tag: &'static Tag,
        hook: Hook<T>,
        doc: &'static str,
    ) -> Self {
        self.with(HookSpec::new::<E, T>(tag, hook, doc).nullable())
    }

    /// Adds a prepared specification.
    #[must_use]
    pub fn with(mut self, spec: HookSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Returns the number of specifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if the bundle is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Implementations
// ─────────────────────────────────────────────────────────────────────────────

/// Registered candidate resolver.
pub(crate) struct ImplEntry {
    pub(crate) name: String,
    priority: Priority,
    seq: u64,
    pub(crate) func: ErasedImpl,
}

/// Implementation waiting for validation.
struct PendingImpl {
    tag: &'static Tag,
    hook: &'static str,
    value_type: TypeId,
    value_type_name: &'static str,
    host_type: TypeId,
    host_type_name: &'static str,
    name: String,
    priority: Priority,
    func: ErasedImpl,
}

/// Bundle of implementations registered together.
#[derive(Default)]
pub struct HookImpls {
    impls: Vec<PendingImpl>,
}

impl fmt::Debug for HookImpls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.impls.iter().map(|i| (i.tag.name(), i.hook, &i.name)))
            .finish()
    }
}

impl HookImpls {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an implementation with default options.
    #[must_use]
    pub fn implement<E, T, F>(self, tag: &'static Tag, hook: Hook<T>, func: F) -> Self
    where
        E: Host,
        T: HookValue,
        F: Fn(&E, &Dispatcher<'_>) -> Result<Option<T>, HookError> + Send + Sync + 'static,
    {
        self.implement_with(tag, hook, ImplOptions::default(), func)
    }

    /// Adds an implementation with explicit options.
    #[must_use]
    pub fn implement_with<E, T, F>(
        mut self,
        tag: &'static Tag,
        hook: Hook<T>,
        options: ImplOptions,
        func: F,
    ) -> Self
    where
        E: Host,
        T: HookValue,
        F: Fn(&E, &Dispatcher<'_>) -> Result<Option<T>, HookError> + Send + Sync + 'static,
    {
        let name = options
            .name
            .unwrap_or_else(|| core::any::type_name::<F>().to_string());
        let erased = erase(move |host, ctx| {
            let Some(host) = host.downcast_ref::<E>() else {
                return Ok(None);
            };
            Ok(func(host, ctx)?.map(|value| Arc::new(value) as Arc<dyn HookValue>))
        });
        self.impls.push(PendingImpl {
            tag,
            hook: hook.name(),
            value_type: TypeId::of::<T>(),
            value_type_name: core::any::type_name::<T>(),
            host_type: TypeId::of::<E>(),
            host_type_name: core::any::type_name::<E>(),
            name,
            priority: options.priority,
            func: erased,
        });
        self
    }

    /// Returns the number of implementations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.impls.len()
    }

    /// Returns true if the bundle is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.impls.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of hook specifications and implementations.
#[derive(Default)]
pub struct HookRegistry {
    specs: IndexMap<HookKey, HookSpec>,
    impls: HashMap<HookKey, Vec<ImplEntry>>,
    order: ResolutionOrder,
    next_seq: u64,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("specs", &self.specs.keys().collect::<Vec<_>>())
            .field("impls", &self.impls.values().map(Vec::len).sum::<usize>())
            .field("order", &self.order)
            .finish()
    }
}

impl HookRegistry {
    /// Creates an empty registry using [`ResolutionOrder::RegistrationOrder`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given ordering policy.
    #[must_use]
    pub fn with_order(order: ResolutionOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    /// Returns the ordering policy.
    #[must_use]
    pub fn resolution_order(&self) -> ResolutionOrder {
        self.order
    }

    /// Changes the ordering policy and re-sorts every candidate list.
    pub fn set_resolution_order(&mut self, order: ResolutionOrder) {
        self.order = order;
        for entries in self.impls.values_mut() {
            sort_entries(entries, order);
        }
    }

    /// Declares a single non-nullable specification.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::DuplicateSpec`] if `(tag, hook)` is already declared.
    pub fn register_spec<E: Host, T: HookValue>(
        &mut self,
        tag: &'static Tag,
        hook: Hook<T>,
        doc: &'static str,
    ) -> Result<(), HookError> {
        self.add_hookspecs(HookSpecs::new().spec::<E, T>(tag, hook, doc))
    }

    /// Declares a bundle of specifications.
    ///
    /// Nothing is inserted unless every specification is valid.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::DuplicateSpec`] if any `(tag, hook)` is already
    /// declared, or appears twice in the bundle.
    pub fn add_hookspecs(&mut self, specs: HookSpecs) -> Result<(), HookError> {
        let mut seen: HashSet<HookKey> = HashSet::new();
        for spec in &specs.specs {
            let key = (spec.tag.name(), spec.name);
            if self.specs.contains_key(&key) || !seen.insert(key) {
                return Err(HookError::DuplicateSpec {
                    tag: spec.tag.name(),
                    hook: spec.name,
                });
            }
        }

        for spec in specs.specs {
            tracing::trace!(tag = spec.tag.name(), hook = spec.name, "hook specified");
            self.specs.insert((spec.tag.name(), spec.name), spec);
        }
        Ok(())
    }

    /// Registers a single implementation with default options.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn register_impl<E, T, F>(
        &mut self,
        tag: &'static Tag,
        hook: Hook<T>,
        func: F,
    ) -> Result<(), HookError>
    where
        E: Host,
        T: HookValue,
        F: Fn(&E, &Dispatcher<'_>) -> Result<Option<T>, HookError> + Send + Sync + 'static,
    {
        self.register(HookImpls::new().implement(tag, hook, func))
    }

    /// Registers a bundle of implementations.
    ///
    /// Nothing is inserted unless every implementation matches a
    /// specification visible from its tag.
    ///
    /// # Errors
    ///
    /// - [`HookError::UnknownAttribute`] if no specification exists for the
    ///   tag or its ancestors
    /// - [`HookError::TypeMismatch`] if the value type differs from the specification
    /// - [`HookError::HostMismatch`] if the host type differs from the specification
    pub fn register(&mut self, impls: HookImpls) -> Result<(), HookError> {
        for pending in &impls.impls {
            self.validate(pending)?;
        }

        for pending in impls.impls {
            tracing::trace!(
                tag = pending.tag.name(),
                hook = pending.hook,
                implementation = %pending.name,
                "hook implemented"
            );
            let entry = ImplEntry {
                name: pending.name,
                priority: pending.priority,
                seq: self.next_seq,
                func: pending.func,
            };
            self.next_seq += 1;
            let entries = self
                .impls
                .entry((pending.tag.name(), pending.hook))
                .or_default();
            entries.push(entry);
            sort_entries(entries, self.order);
        }
        Ok(())
    }

    fn validate(&self, pending: &PendingImpl) -> Result<(), HookError> {
        let spec = self
            .spec(pending.tag, pending.hook)
            .ok_or(HookError::UnknownAttribute {
                tag: pending.tag.name(),
                hook: pending.hook,
            })?;
        if spec.value_type != pending.value_type {
            return Err(HookError::TypeMismatch {
                hook: pending.hook,
                expected: spec.value_type_name,
                found: pending.value_type_name,
            });
        }
        if spec.host_type != pending.host_type {
            return Err(HookError::HostMismatch {
                tag: pending.tag.name(),
                hook: pending.hook,
                expected: spec.host_type_name,
                found: pending.host_type_name,
            });
        }
        Ok(())
    }

    /// Returns the specification of `name` visible from `tag`, searching
    /// the tag's ancestors.
    #[must_use]
    pub fn spec(&self, tag: &'static Tag, name: &'static str) -> Option<&HookSpec> {
        tag.lineage()
            .find_map(|tag| self.specs.get(&(tag.name(), name)))
    }

    /// Returns true if `name` is declared exactly on `tag`.
    #[must_use]
    pub fn contains_spec(&self, tag: &Tag, name: &'static str) -> bool {
        self.specs.contains_key(&(tag.name(), name))
    }

    /// Iterates every specification in declaration order.
    pub fn specs(&self) -> impl Iterator<Item = &HookSpec> {
        self.specs.values()
    }

    /// Returns the number of implementations registered exactly on `tag`.
    #[must_use]
    pub fn impl_count(&self, tag: &Tag, name: &'static str) -> usize {
        self.impls.get(&(tag.name(), name)).map_or(0, Vec::len)
    }

    /// Returns the names of the candidates for `name` on `tag`, in the
    /// order the dispatcher will try them.
    #[must_use]
    pub fn candidate_names(&self, tag: &'static Tag, name: &'static str) -> Vec<&str> {
        self.candidates(tag, name)
            .map(|entry| entry.name.as_str())
            .collect()
    }

    /// Iterates candidates along the lineage of `tag`, most specific first.
    pub(crate) fn candidates<'a>(
        &'a self,
        tag: &'static Tag,
        name: &'static str,
    ) -> impl Iterator<Item = &'a ImplEntry> + 'a {
        tag.lineage()
            .filter_map(move |tag| self.impls.get(&(tag.name(), name)))
            .flatten()
    }
}

fn sort_entries(entries: &mut [ImplEntry], order: ResolutionOrder) {
    entries.sort_by(|a, b| {
        a.priority.cmp(&b.priority).then_with(|| match order {
            ResolutionOrder::RegistrationOrder => a.seq.cmp(&b.seq),
            ResolutionOrder::LatestFirst => b.seq.cmp(&a.seq),
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::HookCache;

    static BAR: Tag = Tag::root("bar");
    static FLAT_BAR: Tag = Tag::child("flat_bar", &BAR);
    static COIL: Tag = Tag::root("coil");

    const WIDTH: Hook<f64> = Hook::new("width");
    const TURNS: Hook<usize> = Hook::new("turns");

    struct Bar {
        hooks: HookCache,
    }

    impl Host for Bar {
        fn tag(&self) -> &'static Tag {
            &BAR
        }
        fn hooks(&self) -> &HookCache {
            &self.hooks
        }
        fn label(&self) -> &str {
            "bar"
        }
    }

    struct Coil {
        hooks: HookCache,
    }

    impl Host for Coil {
        fn tag(&self) -> &'static Tag {
            &COIL
        }
        fn hooks(&self) -> &HookCache {
            &self.hooks
        }
        fn label(&self) -> &str {
            "coil"
        }
    }

    fn constant(value: f64) -> impl Fn(&Bar, &Dispatcher<'_>) -> Result<Option<f64>, HookError> {
        move |_, _| Ok(Some(value))
    }

    fn registry_with_width() -> HookRegistry {
        let mut registry = HookRegistry::new();
        registry
            .register_spec::<Bar, f64>(&BAR, WIDTH, "Bar width.")
            .unwrap();
        registry
    }

    #[test]
    fn duplicate_spec_is_rejected() {
        let mut registry = registry_with_width();
        let err = registry
            .register_spec::<Bar, f64>(&BAR, WIDTH, "again")
            .unwrap_err();
        assert_eq!(
            err,
            HookError::DuplicateSpec {
                tag: "bar",
                hook: "width"
            }
        );
    }

    #[test]
    fn duplicate_within_bundle_inserts_nothing() {
        let mut registry = HookRegistry::new();
        let specs = HookSpecs::new()
            .spec::<Coil, usize>(&COIL, TURNS, "Turns.")
            .spec::<Coil, usize>(&COIL, TURNS, "Turns again.");

        assert!(registry.add_hookspecs(specs).is_err());
        assert!(!registry.contains_spec(&COIL, "turns"));
    }

    #[test]
    fn same_name_on_child_tag_is_allowed() {
        let mut registry = registry_with_width();
        registry
            .register_spec::<Bar, f64>(&FLAT_BAR, WIDTH, "Flat bar width.")
            .expect("child tag may redeclare");
        assert_eq!(registry.spec(&FLAT_BAR, "width").unwrap().tag(), &FLAT_BAR);
    }

    #[test]
    fn spec_is_found_through_ancestors() {
        let registry = registry_with_width();
        let spec = registry.spec(&FLAT_BAR, "width").expect("inherited spec");
        assert_eq!(spec.tag(), &BAR);
        assert_eq!(spec.doc(), "Bar width.");
        assert!(!spec.is_nullable());
    }

    #[test]
    fn impl_without_spec_is_unknown() {
        let mut registry = registry_with_width();
        let err = registry
            .register_impl(&COIL, TURNS, |_: &Coil, _: &Dispatcher<'_>| Ok(Some(3)))
            .unwrap_err();
        assert_eq!(
            err,
            HookError::UnknownAttribute {
                tag: "coil",
                hook: "turns"
            }
        );
    }

    #[test]
    fn bundle_with_unknown_impl_registers_nothing() {
        let mut registry = registry_with_width();
        let impls = HookImpls::new()
            .implement(&BAR, WIDTH, constant(1.0))
            .implement(&COIL, TURNS, |_: &Coil, _: &Dispatcher<'_>| Ok(Some(3)));

        assert!(registry.register(impls).is_err());
        assert_eq!(registry.impl_count(&BAR, "width"), 0);
    }

    #[test]
    fn impl_with_wrong_host_is_rejected() {
        let mut registry = registry_with_width();
        let err = registry
            .register_impl(&BAR, WIDTH, |_: &Coil, _: &Dispatcher<'_>| Ok(Some(1.0)))
            .unwrap_err();
        assert!(matches!(err, HookError::HostMismatch { hook: "width", .. }));
    }

    #[test]
    fn impl_with_wrong_value_type_is_rejected() {
        const WIDTH_AS_COUNT: Hook<usize> = Hook::new("width");
        let mut registry = registry_with_width();
        let err = registry
            .register_impl(&BAR, WIDTH_AS_COUNT, |_: &Bar, _: &Dispatcher<'_>| Ok(Some(1)))
            .unwrap_err();
        assert!(matches!(err, HookError::TypeMismatch { hook: "width", .. }));
    }

    #[test]
    fn candidates_follow_priority_then_registration_order() {
        let mut registry = registry_with_width();
        registry
            .register(
                HookImpls::new()
                    .implement_with(&BAR, WIDTH, ImplOptions::fallback().named("default"), constant(0.0))
                    .implement_with(&BAR, WIDTH, ImplOptions::new().named("first"), constant(1.0))
                    .implement_with(&BAR, WIDTH, ImplOptions::new().named("second"), constant(2.0))
                    .implement_with(&BAR, WIDTH, ImplOptions::early().named("urgent"), constant(3.0)),
            )
            .unwrap();

        assert_eq!(
            registry.candidate_names(&BAR, "width"),
            ["urgent", "first", "second", "default"]
        );
    }

    #[test]
    fn latest_first_reverses_within_priority() {
        let mut registry = registry_with_width();
        registry
            .register(
                HookImpls::new()
                    .implement_with(&BAR, WIDTH, ImplOptions::fallback().named("default"), constant(0.0))
                    .implement_with(&BAR, WIDTH, ImplOptions::new().named("first"), constant(1.0))
                    .implement_with(&BAR, WIDTH, ImplOptions::new().named("second"), constant(2.0)),
            )
            .unwrap();

        registry.set_resolution_order(ResolutionOrder::LatestFirst);

        assert_eq!(
            registry.candidate_names(&BAR, "width"),
            ["second", "first", "default"]
        );
    }

    #[test]
    fn candidates_put_specific_tag_first() {
        let mut registry = registry_with_width();
        registry
            .register(
                HookImpls::new()
                    .implement_with(&BAR, WIDTH, ImplOptions::early().named("generic"), constant(1.0))
                    .implement_with(&FLAT_BAR, WIDTH, ImplOptions::fallback().named("flat"), constant(2.0)),
            )
            .unwrap();

        assert_eq!(registry.candidate_names(&FLAT_BAR, "width"), ["flat", "generic"]);
        assert_eq!(registry.candidate_names(&BAR, "width"), ["generic"]);
    }

    #[test]
    fn resolution_order_uses_snake_case_in_serde() {
        let order: ResolutionOrder = serde_json::from_str(r#""latest_first""#).unwrap();
        assert_eq!(order, ResolutionOrder::LatestFirst);
        assert_eq!(
            serde_json::to_string(&ResolutionOrder::RegistrationOrder).unwrap(),
            r#""registration_order""#
        );
    }
}
