//! End-to-end tests with the default plugin group.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use rollkit_core::prelude::*;
use rollkit_core_plugins::{DefaultPlugins, TracingConfig, TracingFormat, TracingPlugin};
use rollkit_hooks::prelude::*;
use rollkit_system::prelude::*;
use tracing::Level;

fn toolkit(group: PluginGroupBuilder) -> Toolkit {
    let mut toolkit = Toolkit::new();
    toolkit.add_plugins(group);
    toolkit.finish().expect("default plugins should build");
    toolkit
}

fn roll_pass(label: &str) -> UnitBuilder {
    Unit::roll_pass(label)
        .in_profile(HookCache::new().with(WIDTH, 100.0).with(HEIGHT, 50.0))
        .ideal_out_profile(HookCache::new().with(WIDTH, 100.0).with(HEIGHT, 40.0))
}

/// In-memory log sink.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under the subscriber `config` would install, writing to memory.
fn with_plugin_subscriber<R>(config: TracingConfig, f: impl FnOnce() -> R) -> (R, LogCapture) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let plugin = TracingPlugin::with_config(config.without_ansi());
    let result = tracing::subscriber::with_default(plugin.subscriber(move || writer.clone()), f);
    (result, capture)
}

fn compact() -> TracingConfig {
    TracingConfig::default().with_format(TracingFormat::Compact)
}

// ─────────────────────────────────────────────────────────────────────────
// Model
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn default_plugins_build_in_dependency_order() {
    let toolkit = toolkit(DefaultPlugins.build());

    let names = toolkit.plugin_names();
    let position = |suffix: &str| {
        names
            .iter()
            .position(|name| name.ends_with(suffix))
            .unwrap_or_else(|| panic!("{suffix} missing from {names:?}"))
    };
    assert!(position("ProfilePlugin") < position("UnitPlugin"));
    assert!(position("UnitPlugin") < position("DiskElementPlugin"));
    assert!(position("RollPassPlugin") < position("GeuzeSpreadPlugin"));
    assert!(toolkit.has_plugin::<TracingPlugin>());
}

#[test]
fn roll_pass_with_disk_elements() {
    let toolkit = toolkit(
        DefaultPlugins
            .build()
            .disable::<TracingPlugin>()
            .add(TracingPlugin::with_config(
                TracingConfig::default()
                    .with_level(Level::WARN)
                    .with_format(TracingFormat::Compact),
            )),
    );
    let ctx = toolkit.dispatcher().unwrap();
    let pass = roll_pass("P1")
        .with(DURATION, 10.0)
        .with(LENGTH, 5.0)
        .with(DISK_ELEMENT_COUNT, 2)
        .in_profile(
            HookCache::new()
                .with(X, 0.0)
                .with(WIDTH, 100.0)
                .with(HEIGHT, 50.0),
        )
        .build();

    let spread = pass.attr(&ctx, SPREAD).unwrap();
    assert!((spread - 1.03).abs() < 1e-12);

    let elements = pass.disk_elements(&ctx).unwrap();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[1].attr(&ctx, DURATION).unwrap(), 5.0);
    assert_eq!(elements[1].in_profile().attr(&ctx, X).unwrap(), 2.5);
    assert_eq!(pass.out_profile().attr(&ctx, X).unwrap(), 5.0);
}

// ─────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn dispatcher_warning_reaches_plugin_subscriber() {
    let toolkit = toolkit(DefaultPlugins.build());
    let ctx = toolkit.dispatcher().unwrap();
    let pass = Unit::roll_pass("P1")
        .in_profile(HookCache::new().with(WIDTH, 100.0).with(HEIGHT, 50.0))
        .build();

    let (spread, logs) = with_plugin_subscriber(compact(), || pass.try_attr(&ctx, SPREAD));

    assert_eq!(spread, Ok(None));
    let logs = logs.contents();
    let warning = logs
        .lines()
        .find(|line| line.contains("hook implementation failed"))
        .unwrap_or_else(|| panic!("no dispatcher warning in:\n{logs}"));
    assert!(warning.contains("WARN"));
    assert!(warning.contains("rollkit_hooks"));
    assert!(warning.contains("geuze_spread"));
    assert!(warning.contains("P1 has no ideal out profile"));
}

#[test]
fn json_format_emits_structured_dispatcher_warning() {
    let toolkit = toolkit(DefaultPlugins.build());
    let ctx = toolkit.dispatcher().unwrap();
    let pass = Unit::roll_pass("P1")
        .in_profile(HookCache::new().with(WIDTH, 100.0).with(HEIGHT, 50.0))
        .build();

    let (_, logs) = with_plugin_subscriber(
        TracingConfig::default().with_format(TracingFormat::Json),
        || pass.try_attr(&ctx, SPREAD),
    );

    let events: Vec<serde_json::Value> = logs
        .contents()
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect();
    let warning = events
        .iter()
        .find(|event| event["fields"]["hook"] == "spread")
        .expect("dispatcher warning should be logged");
    assert_eq!(warning["level"], "WARN");
    assert_eq!(warning["fields"]["host"], "P1");
    assert_eq!(warning["fields"]["implementation"], "geuze_spread");
}

#[test]
fn resolved_hooks_are_logged_only_with_resolution_trace() {
    let toolkit = toolkit(DefaultPlugins.build());
    let ctx = toolkit.dispatcher().unwrap();

    let quiet = roll_pass("P1").build();
    let (_, logs) = with_plugin_subscriber(compact(), || quiet.attr(&ctx, SPREAD));
    assert!(!logs.contents().contains("hook resolved"));

    let traced = roll_pass("P2").build();
    let (spread, logs) = with_plugin_subscriber(compact().with_resolution_trace(true), || {
        traced.attr(&ctx, SPREAD)
    });
    assert!((spread.unwrap() - 1.03).abs() < 1e-12);
    let logs = logs.contents();
    assert!(
        logs.lines()
            .any(|line| line.contains("hook resolved") && line.contains("implementation=geuze_spread")),
        "{logs}"
    );
}

#[test]
fn other_targets_are_limited_to_warnings_unless_directed() {
    let emit = || {
        tracing::info!(target: "plant_model", "stand setup loaded");
        tracing::warn!(target: "plant_model", "stand F3 offline");
    };

    let (_, logs) = with_plugin_subscriber(compact(), emit);
    let logs = logs.contents();
    assert!(!logs.contains("stand setup loaded"));
    assert!(logs.contains("stand F3 offline"));

    let (_, logs) = with_plugin_subscriber(compact().with_directives("plant_model=info"), emit);
    assert!(logs.contents().contains("stand setup loaded"));
}

// ─────────────────────────────────────────────────────────────────────────
// Lifecycle
// ─────────────────────────────────────────────────────────────────────────

/// Model extension that logs and records its shutdown.
struct MillPlugin {
    journal: Arc<Mutex<Vec<&'static str>>>,
}

impl Plugin for MillPlugin {
    fn build(&self, _registry: &mut HookRegistry) -> Result<(), HookError> {
        Ok(())
    }

    fn cleanup(&self) {
        self.journal.lock().push("cleanup mill");
        tracing::info!(target: "rollkit_mill", "mill shutting down");
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<GeuzeSpreadPlugin>()]
    }
}

#[test]
fn cleanup_shuts_down_logging_last() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let toolkit = toolkit(DefaultPlugins.build().add(MillPlugin {
        journal: Arc::clone(&journal),
    }));

    let (_, logs) = with_plugin_subscriber(compact(), || toolkit.cleanup());

    assert_eq!(*journal.lock(), vec!["cleanup mill"]);
    let logs = logs.contents();
    let mill = logs.find("mill shutting down").expect("mill cleanup should log");
    let logging = logs
        .find("rollkit logging shutting down")
        .expect("tracing cleanup should log");
    assert!(mill < logging, "{logs}");
}
