//! Tests for splitting units into disk elements.
//!
//! Covers apportionment of duration and length, the empty sequence for a
//! zero count, position continuity across element boundaries and the
//! derived neighbour navigation.


use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rollkit_core::prelude::*;
use rollkit_hooks::prelude::*;
use rollkit_system::prelude::*;
use test_utils::{assert_close, model_toolkit, toolkit_with};

fn unit(duration: f64, length: f64, count: usize, in_x: f64) -> Arc<Unit> {
    Unit::builder("U1")
        .with(DURATION, duration)
        .with(LENGTH, length)
        .with(DISK_ELEMENT_COUNT, count)
        .in_profile(HookCache::new().with(X, in_x))
        .build()
}

// ─────────────────────────────────────────────────────────────────────────
// Apportionment
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn two_elements_split_duration_and_length() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = unit(10.0, 5.0, 2, 0.0);

    let elements = unit.disk_elements(&ctx).unwrap();

    assert_eq!(elements.len(), 2);
    for element in elements {
        assert_eq!(element.attr(&ctx, DURATION).unwrap(), 5.0);
        assert_eq!(element.attr(&ctx, LENGTH).unwrap(), 2.5);
    }
}

#[test]
fn elements_know_parent_and_index() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = unit(10.0, 5.0, 3, 0.0);

    let elements = unit.disk_elements(&ctx).unwrap();

    for (i, element) in elements.iter().enumerate() {
        assert_eq!(element.index(), i);
        assert!(Arc::ptr_eq(&element.parent().unwrap(), &unit));
    }
    assert!(elements[0].is_first());
    assert!(!elements[1].is_first());
}

#[test]
fn zero_count_yields_no_elements() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = Unit::builder("U0")
        .with(DURATION, 10.0)
        .with(LENGTH, 5.0)
        .build();

    assert!(unit.disk_elements(&ctx).unwrap().is_empty());
    assert_eq!(unit.attr(&ctx, DISK_ELEMENT_COUNT).unwrap(), 0);
}

#[test]
fn apportionment_never_runs_for_zero_count() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    struct CountingDurationPlugin(Arc<AtomicUsize>);

    impl Plugin for CountingDurationPlugin {
        fn build(&self, registry: &mut HookRegistry) -> Result<(), HookError> {
            let counter = Arc::clone(&self.0);
            registry.register(HookImpls::new().implement_with(
                &DISK_ELEMENT,
                DURATION,
                ImplOptions::early(),
                move |_: &DiskElement, _: &Dispatcher<'_>| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(None::<f64>)
                },
            ))
        }

        fn dependencies(&self) -> Vec<PluginId> {
            vec![PluginId::of::<DiskElementPlugin>()]
        }
    }

    let toolkit = toolkit_with(MinimalPlugins.build().add(CountingDurationPlugin(counter)));
    let ctx = toolkit.dispatcher().unwrap();

    let empty = unit(10.0, 5.0, 0, 0.0);
    for element in empty.disk_elements(&ctx).unwrap() {
        element.attr(&ctx, DURATION).unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let split = unit(10.0, 5.0, 4, 0.0);
    for element in split.disk_elements(&ctx).unwrap() {
        assert_close(element.attr(&ctx, DURATION).unwrap(), 2.5);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn elements_are_generated_once() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = unit(10.0, 5.0, 2, 0.0);

    let first = unit.disk_elements(&ctx).unwrap().to_vec();
    unit.hooks().set(DISK_ELEMENT_COUNT, 7);
    let second = unit.disk_elements(&ctx).unwrap();

    assert_eq!(second.len(), 2);
    assert!(first.iter().zip(second).all(|(a, b)| Arc::ptr_eq(a, b)));
}

#[test]
fn count_from_plugin_is_used() {
    struct FourDisksPlugin;

    impl Plugin for FourDisksPlugin {
        fn build(&self, registry: &mut HookRegistry) -> Result<(), HookError> {
            registry.register(HookImpls::new().implement(
                &UNIT,
                DISK_ELEMENT_COUNT,
                |_: &Unit, _: &Dispatcher<'_>| Ok(Some(4)),
            ))
        }

        fn dependencies(&self) -> Vec<PluginId> {
            vec![PluginId::of::<UnitPlugin>()]
        }
    }

    let toolkit = toolkit_with(MinimalPlugins.build().add(FourDisksPlugin));
    let ctx = toolkit.dispatcher().unwrap();
    let unit = Unit::builder("U4")
        .with(DURATION, 8.0)
        .with(LENGTH, 2.0)
        .build();

    let elements = unit.disk_elements(&ctx).unwrap();
    assert_eq!(elements.len(), 4);
    assert_eq!(elements[3].attr(&ctx, DURATION).unwrap(), 2.0);
}

#[test]
fn duration_falls_back_to_length_over_velocity() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = Unit::builder("U1")
        .with(LENGTH, 6.0)
        .with(VELOCITY, 2.0)
        .with(DISK_ELEMENT_COUNT, 3)
        .build();

    assert_eq!(unit.attr(&ctx, DURATION).unwrap(), 3.0);
    let elements = unit.disk_elements(&ctx).unwrap();
    assert_eq!(elements[0].attr(&ctx, DURATION).unwrap(), 1.0);
}

#[test]
fn missing_parent_quantity_is_unresolved() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = Unit::builder("U1").with(DISK_ELEMENT_COUNT, 2).build();

    let elements = unit.disk_elements(&ctx).unwrap();
    let err = elements[0].attr(&ctx, LENGTH).unwrap_err();
    assert!(matches!(err, HookError::Unresolved { hook: "length", .. }));
}

#[test]
fn apportionment_follows_generated_sequence_after_count_invalidation() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = unit(10.0, 5.0, 2, 0.0);
    let elements = unit.disk_elements(&ctx).unwrap();

    assert!(unit.hooks().invalidate(DISK_ELEMENT_COUNT));
    assert_eq!(unit.attr(&ctx, DISK_ELEMENT_COUNT).unwrap(), 0);

    let durations: Vec<f64> = elements
        .iter()
        .map(|element| element.attr(&ctx, DURATION).unwrap())
        .collect();
    assert_eq!(durations, vec![5.0, 5.0]);
    assert_eq!(elements[1].attr(&ctx, LENGTH).unwrap(), 2.5);
}

// ─────────────────────────────────────────────────────────────────────────
// Continuity
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn first_element_starts_at_unit_entry() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = unit(10.0, 5.0, 2, 12.0);

    let elements = unit.disk_elements(&ctx).unwrap();

    assert_eq!(elements[0].in_profile().attr(&ctx, X).unwrap(), 12.0);
    assert_eq!(elements[0].out_profile().attr(&ctx, X).unwrap(), 14.5);
    assert_eq!(elements[1].in_profile().attr(&ctx, X).unwrap(), 14.5);
    assert_eq!(elements[1].out_profile().attr(&ctx, X).unwrap(), 17.0);
}

#[test]
fn last_element_ends_at_unit_exit() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = unit(10.0, 5.0, 5, 1.0);

    let elements = unit.disk_elements(&ctx).unwrap();
    let last = elements.last().unwrap();

    assert_close(
        last.out_profile().attr(&ctx, X).unwrap(),
        unit.out_profile().attr(&ctx, X).unwrap(),
    );
}

#[test]
fn resolving_last_element_pulls_predecessors_once() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = unit(10.0, 5.0, 4, 0.0);

    let elements = unit.disk_elements(&ctx).unwrap();
    assert_eq!(elements[3].in_profile().attr(&ctx, X).unwrap(), 3.75);

    for element in &elements[..3] {
        assert!(element.out_profile().hooks().contains(X));
        assert!(element.in_profile().hooks().contains(X));
    }
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn missing_unit_entry_position_is_unresolved() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = Unit::builder("U1")
        .with(LENGTH, 5.0)
        .with(DISK_ELEMENT_COUNT, 2)
        .build();

    let elements = unit.disk_elements(&ctx).unwrap();
    assert!(matches!(
        elements[1].in_profile().attr(&ctx, X),
        Err(HookError::Unresolved { hook: "x", .. })
    ));
}

#[test]
fn long_sequence_resolves_last_element_first() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = unit(5000.0, 5000.0, 5000, 0.0);
    let elements = unit.disk_elements(&ctx).unwrap();

    let last = elements.last().unwrap();
    assert_eq!(last.in_profile().attr(&ctx, X).unwrap(), 4999.0);
    assert_eq!(last.out_profile().attr(&ctx, X).unwrap(), 5000.0);
    assert_eq!(ctx.depth(), 0);
    assert!(elements.iter().all(|element| element.out_profile().hooks().contains(X)));
}

#[test]
fn resolution_resumes_after_cached_predecessor() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = unit(8.0, 8.0, 8, 1.0);
    let elements = unit.disk_elements(&ctx).unwrap();

    elements[3].out_profile().hooks().set(X, 100.0);

    assert_eq!(elements[6].in_profile().attr(&ctx, X).unwrap(), 102.0);
    assert!(!elements[2].out_profile().hooks().contains(X));
    assert_eq!(elements[2].out_profile().attr(&ctx, X).unwrap(), 4.0);
}

// ─────────────────────────────────────────────────────────────────────────
// Navigation
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn neighbours_are_derived_from_parent_sequence() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = unit(10.0, 5.0, 3, 0.0);

    let elements = unit.disk_elements(&ctx).unwrap();

    assert!(elements[0].prev().is_none());
    assert!(Arc::ptr_eq(&elements[0].next().unwrap(), &elements[1]));
    assert!(Arc::ptr_eq(&elements[2].prev().unwrap(), &elements[1]));
    assert!(elements[2].next().is_none());
}

#[test]
fn dropped_unit_orphans_its_elements() {
    let toolkit = model_toolkit();
    let ctx = toolkit.dispatcher().unwrap();
    let unit = unit(10.0, 5.0, 2, 0.0);
    let element = Arc::clone(&unit.disk_elements(&ctx).unwrap()[1]);

    drop(unit);

    assert!(element.parent().is_none());
    assert!(element.prev().is_none());
    assert!(element.attr(&ctx, DURATION).is_err());
}

// ─────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────

mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn element_quantities_sum_to_unit_totals(
            count in 1usize..40,
            duration in 0.001f64..1.0e4,
            length in 0.001f64..1.0e3,
        ) {
            let toolkit = model_toolkit();
            let ctx = toolkit.dispatcher().unwrap();
            let unit = unit(duration, length, count, 0.0);

            let elements = unit.disk_elements(&ctx).unwrap();
            prop_assert_eq!(elements.len(), count);

            let mut total_duration = 0.0;
            let mut total_length = 0.0;
            for element in elements {
                let element_duration = element.attr(&ctx, DURATION).unwrap();
                prop_assert_eq!(element_duration, duration / count as f64);
                total_duration += element_duration;
                total_length += element.attr(&ctx, LENGTH).unwrap();
            }
            prop_assert!((total_duration - duration).abs() <= 1e-9 * duration.max(1.0));
            prop_assert!((total_length - length).abs() <= 1e-9 * length.max(1.0));
        }

        #[test]
        fn positions_are_continuous(
            count in 1usize..40,
            length in 0.001f64..1.0e3,
            in_x in -1.0e3f64..1.0e3,
        ) {
            let toolkit = model_toolkit();
            let ctx = toolkit.dispatcher().unwrap();
            let unit = unit(1.0, length, count, in_x);

            let elements = unit.disk_elements(&ctx).unwrap();
            prop_assert_eq!(elements[0].in_profile().attr(&ctx, X).unwrap(), in_x);
            for pair in elements.windows(2) {
                prop_assert_eq!(
                    pair[1].in_profile().attr(&ctx, X).unwrap(),
                    pair[0].out_profile().attr(&ctx, X).unwrap()
                );
            }
        }
    }
}
