//! Unit quantities.

use rollkit_hooks::prelude::*;
use rollkit_system::plugin::{Plugin, PluginId};

use crate::plugins::ProfilePlugin;
use crate::profile::{Profile, UNIT_OUT_PROFILE, X};
use crate::unit::{DISK_ELEMENT_COUNT, DURATION, LENGTH, UNIT, Unit, VELOCITY};

/// Declares unit quantities and their default formulas.
///
/// # Hooks
///
/// | Hook | Tag | Implementation |
/// |------|-----|----------------|
/// | [`DURATION`] | [`UNIT`] | `length / velocity`, fallback |
/// | [`LENGTH`] | [`UNIT`] | - |
/// | [`VELOCITY`] | [`UNIT`] | - |
/// | [`DISK_ELEMENT_COUNT`] | [`UNIT`] | `0`, fallback |
/// | [`X`] | [`UNIT_OUT_PROFILE`] | `in_profile.x + length` |
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitPlugin;

impl Plugin for UnitPlugin {
    fn build(&self, registry: &mut HookRegistry) -> Result<(), HookError> {
        registry.add_hookspecs(
            HookSpecs::new()
                .spec::<Unit, f64>(&UNIT, DURATION, "Time spent in the unit.")
                .spec::<Unit, f64>(&UNIT, LENGTH, "Extent along the rolling direction.")
                .spec::<Unit, f64>(&UNIT, VELOCITY, "Mean workpiece velocity.")
                .spec::<Unit, usize>(
                    &UNIT,
                    DISK_ELEMENT_COUNT,
                    "Number of disk elements to discretize into.",
                ),
        )?;

        registry.register(
            HookImpls::new()
                .implement_with(
                    &UNIT,
                    DISK_ELEMENT_COUNT,
                    ImplOptions::fallback().named("no_disks"),
                    |_: &Unit, _: &Dispatcher<'_>| Ok(Some(0)),
                )
                .implement_with(
                    &UNIT,
                    DURATION,
                    ImplOptions::fallback().named("unit_duration_from_velocity"),
                    duration_from_velocity,
                )
                .implement_with(
                    &UNIT_OUT_PROFILE,
                    X,
                    ImplOptions::new().named("unit_out_x"),
                    out_x,
                ),
        )
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<ProfilePlugin>()]
    }
}

fn duration_from_velocity(unit: &Unit, ctx: &Dispatcher<'_>) -> Result<Option<f64>, HookError> {
    let Some(length) = unit.try_attr(ctx, LENGTH)? else {
        return Ok(None);
    };
    let Some(velocity) = unit.try_attr(ctx, VELOCITY)? else {
        return Ok(None);
    };
    if velocity == 0.0 {
        return Err(HookError::failed(format!(
            "velocity of {} is zero",
            unit.label()
        )));
    }
    Ok(Some(length / velocity))
}

/// Exit position of a unit: entry position plus the unit length.
fn out_x(profile: &Profile, ctx: &Dispatcher<'_>) -> Result<Option<f64>, HookError> {
    let Some(unit) = profile.unit() else {
        return Ok(None);
    };
    let Some(in_x) = unit.in_profile().try_attr(ctx, X)? else {
        return Ok(None);
    };
    let Some(length) = unit.try_attr(ctx, LENGTH)? else {
        return Ok(None);
    };
    Ok(Some(in_x + length))
}
