//! Roll passes and spreading.
//!
//! A roll pass is a [`Unit`] tagged [`ROLL_PASS`]. Its [`SPREAD`] is the ratio
//! of exit to entry width; the exit profile width follows from it. Spread
//! formulas are separate plugins, so a pass schedule can pick the model
//! that fits its material:
//!
//! - [`GeuzeSpreadPlugin`] - spreading proportional to the height reduction

mod geuze_spread;

pub use geuze_spread::{GEUZE_COEFFICIENT, GeuzeSpreadPlugin};

use rollkit_hooks::prelude::*;
use rollkit_system::plugin::{Plugin, PluginId};

use crate::plugins::{ProfilePlugin, UnitPlugin};
use crate::profile::{Profile, UNIT_OUT_PROFILE, WIDTH};
pub use crate::unit::ROLL_PASS;
use crate::unit::Unit;

/// Ratio of exit width to entry width.
pub const SPREAD: Hook<f64> = Hook::new("spread");

/// Declares [`SPREAD`] on roll passes and derives the exit width from it.
///
/// # Hooks
///
/// | Hook | Tag | Implementation |
/// |------|-----|----------------|
/// | [`SPREAD`] | [`ROLL_PASS`] | - |
/// | [`WIDTH`] | [`UNIT_OUT_PROFILE`] | `in_profile.width * spread` |
#[derive(Debug, Clone, Copy, Default)]
pub struct RollPassPlugin;

impl Plugin for RollPassPlugin {
    fn build(&self, registry: &mut HookRegistry) -> Result<(), HookError> {
        registry.add_hookspecs(HookSpecs::new().spec::<Unit, f64>(
            &ROLL_PASS,
            SPREAD,
            "Ratio of exit width to entry width.",
        ))?;

        registry.register(HookImpls::new().implement_with(
            &UNIT_OUT_PROFILE,
            WIDTH,
            ImplOptions::new().named("out_width_from_spread"),
            out_width,
        ))
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<ProfilePlugin>(), PluginId::of::<UnitPlugin>()]
    }
}

fn out_width(profile: &Profile, ctx: &Dispatcher<'_>) -> Result<Option<f64>, HookError> {
    let Some(roll_pass) = profile.unit() else {
        return Ok(None);
    };
    let Some(spread) = roll_pass.try_attr(ctx, SPREAD)? else {
        return Ok(None);
    };
    let Some(in_width) = roll_pass.in_profile().try_attr(ctx, WIDTH)? else {
        return Ok(None);
    };
    Ok(Some(in_width * spread))
}
