//! Discretization of units into disk elements.
//!
//! Element quantities are apportioned from the parent unit: every element
//! gets `1 / disk_element_count` of the parent duration and length.
//!
//! Element positions are chained. The first element starts where the parent
//! starts; every other element starts where its predecessor ends:
//!
//! ```text
//! unit.in_profile.x ──► e0.in.x ─(+len)─► e0.out.x ──► e1.in.x ─(+len)─► e1.out.x ...
//! ```
//!
//! Resolving `x` on element `i` pulls its predecessors on demand. They are
//! resolved oldest first, starting after the nearest one already cached, so
//! each step finds its predecessor cached and resolution depth stays bounded
//! for any number of elements. Every step is cached on its profile, so
//! walking the whole sequence resolves every element once.

use std::sync::Arc;

use rollkit_hooks::prelude::*;
use rollkit_system::plugin::{Plugin, PluginId};

use crate::disk_element::{DISK_ELEMENT, DiskElement};
use crate::plugins::{ProfilePlugin, UnitPlugin};
use crate::profile::{DISK_ELEMENT_IN_PROFILE, DISK_ELEMENT_OUT_PROFILE, Profile, X};
use crate::unit::{DURATION, LENGTH, Unit};

/// Apportions unit quantities to disk elements and chains their positions.
///
/// # Hooks
///
/// | Hook | Tag | Implementation |
/// |------|-----|----------------|
/// | [`DURATION`] | [`DISK_ELEMENT`] | `parent.duration / number of elements` |
/// | [`LENGTH`] | [`DISK_ELEMENT`] | `parent.length / number of elements` |
/// | [`X`] | [`DISK_ELEMENT_IN_PROFILE`] | parent entry or predecessor exit |
/// | [`X`] | [`DISK_ELEMENT_OUT_PROFILE`] | `in_profile.x + length` |
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskElementPlugin;

impl Plugin for DiskElementPlugin {
    fn build(&self, registry: &mut HookRegistry) -> Result<(), HookError> {
        registry.add_hookspecs(
            HookSpecs::new()
                .spec::<DiskElement, f64>(&DISK_ELEMENT, DURATION, "Time spent in the element.")
                .spec::<DiskElement, f64>(&DISK_ELEMENT, LENGTH, "Extent of the element."),
        )?;

        registry.register(
            HookImpls::new()
                .implement_with(
                    &DISK_ELEMENT,
                    DURATION,
                    ImplOptions::new().named("disk_duration"),
                    |element: &DiskElement, ctx: &Dispatcher<'_>| {
                        apportion(element, ctx, DURATION)
                    },
                )
                .implement_with(
                    &DISK_ELEMENT,
                    LENGTH,
                    ImplOptions::new().named("disk_length"),
                    |element: &DiskElement, ctx: &Dispatcher<'_>| apportion(element, ctx, LENGTH),
                )
                .implement_with(
                    &DISK_ELEMENT_IN_PROFILE,
                    X,
                    ImplOptions::new().named("disk_in_x"),
                    in_x,
                )
                .implement_with(
                    &DISK_ELEMENT_OUT_PROFILE,
                    X,
                    ImplOptions::new().named("disk_out_x"),
                    out_x,
                ),
        )
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<ProfilePlugin>(), PluginId::of::<UnitPlugin>()]
    }
}

fn parent_of(element: &DiskElement) -> Result<Arc<Unit>, HookError> {
    element
        .parent()
        .ok_or_else(|| HookError::failed(format!("{} outlived its unit", element.label())))
}

/// Sequence `element` belongs to.
fn siblings<'u>(parent: &'u Unit, element: &DiskElement) -> Result<&'u [Arc<DiskElement>], HookError> {
    parent
        .generated_disk_elements()
        .ok_or_else(|| HookError::failed(format!("{} is not part of a sequence", element.label())))
}

/// Equal share of a parent quantity.
///
/// The share follows the generated sequence, not a fresh
/// `disk_element_count`, so it stays consistent after the count is
/// invalidated.
fn apportion(
    element: &DiskElement,
    ctx: &Dispatcher<'_>,
    hook: Hook<f64>,
) -> Result<Option<f64>, HookError> {
    let parent = parent_of(element)?;
    let count = siblings(&parent, element)?.len();
    if count == 0 {
        return Ok(None);
    }
    let Some(total) = parent.try_attr(ctx, hook)? else {
        return Ok(None);
    };
    Ok(Some(total / count as f64))
}

fn in_x(profile: &Profile, ctx: &Dispatcher<'_>) -> Result<Option<f64>, HookError> {
    let Some(element) = profile.disk_element() else {
        return Ok(None);
    };
    let parent = parent_of(&element)?;

    if element.is_first() {
        return parent.in_profile().try_attr(ctx, X);
    }

    let elements = siblings(&parent, &element)?;
    let predecessors = elements
        .get(..element.index())
        .ok_or_else(|| HookError::failed(format!("{} has no predecessor", element.label())))?;

    let start = predecessors
        .iter()
        .rposition(|prev| prev.out_profile().hooks().contains(X))
        .unwrap_or(0);

    let mut x = None;
    for prev in &predecessors[start..] {
        x = prev.out_profile().try_attr(ctx, X)?;
        if x.is_none() {
            return Ok(None);
        }
    }
    Ok(x)
}

fn out_x(profile: &Profile, ctx: &Dispatcher<'_>) -> Result<Option<f64>, HookError> {
    let Some(element) = profile.disk_element() else {
        return Ok(None);
    };
    let Some(in_x) = element.in_profile().try_attr(ctx, X)? else {
        return Ok(None);
    };
    let Some(length) = element.try_attr(ctx, LENGTH)? else {
        return Ok(None);
    };
    Ok(Some(in_x + length))
}
