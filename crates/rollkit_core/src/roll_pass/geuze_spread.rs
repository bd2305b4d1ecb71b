//! Geuze spreading model.
//!
//! The width change is proportional to the height reduction of the
//! equivalent rectangles:
//!
//! ```text
//! spread = 1 + c * (h_in - h_ideal_out) / w_in
//! ```

use rollkit_hooks::prelude::*;
use rollkit_system::plugin::{Plugin, PluginId};

use crate::profile::EQUIVALENT_RECTANGLE;
use crate::roll_pass::{ROLL_PASS, RollPassPlugin, SPREAD};
use crate::unit::Unit;

/// Geuze spreading coefficient `c`.
pub const GEUZE_COEFFICIENT: Hook<f64> = Hook::new("geuze_coefficient");

/// Coefficient used when no other source supplies one.
const DEFAULT_FALLBACK_COEFFICIENT: f64 = 0.3;

/// Geuze spreading formula for roll passes.
///
/// Declares [`GEUZE_COEFFICIENT`] and implements [`SPREAD`]. A fallback
/// coefficient of `0.3` is registered at [`Priority::Fallback`], so a
/// coefficient preset on the pass or supplied by a material plugin wins.
///
/// # Example
///
/// ```
/// use rollkit_core::roll_pass::GeuzeSpreadPlugin;
///
/// // Require an explicit coefficient for every pass.
/// let plugin = GeuzeSpreadPlugin::new().without_fallback_coefficient();
/// assert_eq!(plugin.fallback_coefficient(), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GeuzeSpreadPlugin {
    fallback_coefficient: Option<f64>,
}

impl Default for GeuzeSpreadPlugin {
    fn default() -> Self {
        Self {
            fallback_coefficient: Some(DEFAULT_FALLBACK_COEFFICIENT),
        }
    }
}

impl GeuzeSpreadPlugin {
    /// Creates the plugin with the default fallback coefficient.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback coefficient.
    #[must_use]
    pub fn with_fallback_coefficient(mut self, coefficient: f64) -> Self {
        self.fallback_coefficient = Some(coefficient);
        self
    }

    /// Registers no fallback coefficient.
    #[must_use]
    pub fn without_fallback_coefficient(mut self) -> Self {
        self.fallback_coefficient = None;
        self
    }

    /// Returns the fallback coefficient, if any.
    #[must_use]
    pub fn fallback_coefficient(&self) -> Option<f64> {
        self.fallback_coefficient
    }
}

impl Plugin for GeuzeSpreadPlugin {
    fn build(&self, registry: &mut HookRegistry) -> Result<(), HookError> {
        registry.add_hookspecs(HookSpecs::new().spec::<Unit, f64>(
            &ROLL_PASS,
            GEUZE_COEFFICIENT,
            "Geuze spreading coefficient.",
        ))?;

        let mut impls = HookImpls::new().implement_with(
            &ROLL_PASS,
            SPREAD,
            ImplOptions::new().named("geuze_spread"),
            spread,
        );
        if let Some(coefficient) = self.fallback_coefficient {
            impls = impls.implement_with(
                &ROLL_PASS,
                GEUZE_COEFFICIENT,
                ImplOptions::fallback().named("geuze_fallback_coefficient"),
                move |_: &Unit, _: &Dispatcher<'_>| Ok(Some(coefficient)),
            );
        }
        registry.register(impls)
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<RollPassPlugin>()]
    }
}

fn spread(roll_pass: &Unit, ctx: &Dispatcher<'_>) -> Result<Option<f64>, HookError> {
    let Some(coefficient) = roll_pass.try_attr(ctx, GEUZE_COEFFICIENT)? else {
        tracing::warn!(
            roll_pass = roll_pass.label(),
            "No Geuze coefficient available for {}.",
            roll_pass.label()
        );
        return Ok(None);
    };
    let Some(ideal_out_profile) = roll_pass.ideal_out_profile() else {
        return Err(HookError::failed(format!(
            "{} has no ideal out profile",
            roll_pass.label()
        )));
    };

    let in_rect = roll_pass.in_profile().attr(ctx, EQUIVALENT_RECTANGLE)?;
    let ideal_out_rect = ideal_out_profile.attr(ctx, EQUIVALENT_RECTANGLE)?;
    let height_change = in_rect.height - ideal_out_rect.height;
    let spread = 1.0 + coefficient * height_change / in_rect.width;

    tracing::debug!(roll_pass = roll_pass.label(), spread, "Spread after Geuze");
    Ok(Some(spread))
}
