//! Profile geometry.

use rollkit_hooks::prelude::*;
use rollkit_system::plugin::Plugin;

use crate::profile::{EQUIVALENT_RECTANGLE, HEIGHT, PROFILE, Profile, Rectangle, WIDTH, X};

/// Declares profile geometry and derives the equivalent rectangle.
///
/// # Hooks
///
/// | Hook | Tag | Implementation |
/// |------|-----|----------------|
/// | [`X`] | [`PROFILE`] | - |
/// | [`WIDTH`] | [`PROFILE`] | - |
/// | [`HEIGHT`] | [`PROFILE`] | - |
/// | [`EQUIVALENT_RECTANGLE`] | [`PROFILE`] | `(width, height)`, fallback |
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfilePlugin;

impl Plugin for ProfilePlugin {
    fn build(&self, registry: &mut HookRegistry) -> Result<(), HookError> {
        registry.add_hookspecs(
            HookSpecs::new()
                .spec::<Profile, f64>(&PROFILE, X, "Position along the rolling direction.")
                .spec::<Profile, f64>(&PROFILE, WIDTH, "Cross-section width.")
                .spec::<Profile, f64>(&PROFILE, HEIGHT, "Cross-section height.")
                .spec::<Profile, Rectangle>(
                    &PROFILE,
                    EQUIVALENT_RECTANGLE,
                    "Rectangle substituted for the profile by spreading formulas.",
                ),
        )?;

        registry.register(HookImpls::new().implement_with(
            &PROFILE,
            EQUIVALENT_RECTANGLE,
            ImplOptions::fallback().named("profile_bounding_rectangle"),
            bounding_rectangle,
        ))
    }
}

/// Uses the profile's width and height when no shape-specific formula applies.
fn bounding_rectangle(
    profile: &Profile,
    ctx: &Dispatcher<'_>,
) -> Result<Option<Rectangle>, HookError> {
    let Some(width) = profile.try_attr(ctx, WIDTH)? else {
        return Ok(None);
    };
    let Some(height) = profile.try_attr(ctx, HEIGHT)? else {
        return Ok(None);
    };
    Ok(Some(Rectangle::new(width, height)))
}
