//! Logging plugin.
//!
//! [`TracingPlugin`] installs the `tracing` subscriber that receives the
//! resolution logs of the dispatcher and the model plugins. Filtering is
//! scoped to rollkit: every `rollkit*` target logs at the configured level,
//! everything else at `warn` unless extra directives say otherwise.
//!
//! | Target | Events |
//! |--------|--------|
//! | `rollkit_hooks` | `debug` per resolved hook, `warn` per failed implementation |
//! | `rollkit_core` | `debug` per generated sequence, `warn` for missing coefficients |
//! | `rollkit_system` | plugin build order |
//!
//! # Example
//!
//! ```
//! use rollkit_core_plugins::{TracingConfig, TracingFormat, TracingPlugin};
//! use rollkit_system::Toolkit;
//!
//! let config: TracingConfig =
//!     serde_json::from_str(r#"{"format":"compact","trace_resolution":true}"#).unwrap();
//!
//! let mut toolkit = Toolkit::new();
//! toolkit.add_plugins(TracingPlugin::with_config(config));
//! toolkit.finish().unwrap();
//! ```

use std::collections::BTreeSet;

use rollkit_hooks::{HookError, HookRegistry};
use rollkit_system::plugin::Plugin;
use serde::{Deserialize, Serialize};
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Target prefix shared by every rollkit crate.
const ROLLKIT_TARGET: &str = "rollkit";

/// Target of the dispatcher's per-hook events.
const RESOLUTION_TARGET: &str = "rollkit_hooks";

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TracingFormat {
    /// Multi-line human-readable output (default).
    #[default]
    Pretty,
    /// Single-line output.
    Compact,
    /// JSON lines for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration of a rollkit run.
///
/// ```
/// use rollkit_core_plugins::TracingConfig;
/// use tracing::Level;
///
/// let config = TracingConfig::default()
///     .with_level(Level::WARN)
///     .with_directives("plant_model=debug");
/// assert_eq!(config.filter_directives(), "warn,rollkit=warn,plant_model=debug");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Level of the rollkit crates (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    /// Output format.
    pub format: TracingFormat,
    /// Log every resolved hook with its value.
    pub trace_resolution: bool,
    /// Extra `EnvFilter` directives, e.g. `"plant_model=debug"`.
    pub directives: Option<String>,
    /// Colored output.
    pub ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: TracingFormat::Pretty,
            trace_resolution: false,
            directives: None,
            ansi: true,
        }
    }
}

impl TracingConfig {
    /// Sets the level of the rollkit crates.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level.as_str().to_ascii_lowercase();
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Logs every resolved hook, regardless of the configured level.
    #[must_use]
    pub fn with_resolution_trace(mut self, enabled: bool) -> Self {
        self.trace_resolution = enabled;
        self
    }

    /// Appends `EnvFilter` directives for other targets.
    #[must_use]
    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    /// Disables colored output.
    #[must_use]
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }

    /// Returns the `EnvFilter` directives this configuration installs.
    #[must_use]
    pub fn filter_directives(&self) -> String {
        let mut directives = format!("warn,{ROLLKIT_TARGET}={}", self.level);
        if self.trace_resolution {
            directives.push_str(&format!(",{RESOLUTION_TARGET}=debug"));
        }
        if let Some(extra) = &self.directives {
            directives.push(',');
            directives.push_str(extra);
        }
        directives
    }

    /// Invalid directives fall back to rollkit at `info`.
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.filter_directives())
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,{ROLLKIT_TARGET}=info")))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Installs the global `tracing` subscriber once every plugin is built.
///
/// An already installed global subscriber is left in place. Registers no
/// hooks.
#[derive(Debug, Clone, Default)]
pub struct TracingPlugin {
    config: TracingConfig,
}

impl TracingPlugin {
    /// Creates the plugin from a configuration.
    #[must_use]
    pub fn with_config(config: TracingConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TracingConfig {
        &self.config
    }

    /// Builds the subscriber [`ready`](Plugin::ready) installs, writing to
    /// `writer` instead of stdout.
    pub fn subscriber<W>(&self, writer: W) -> Box<dyn Subscriber + Send + Sync>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let fmt = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(self.config.ansi);
        let fmt: Box<dyn Layer<Registry> + Send + Sync> = match self.config.format {
            TracingFormat::Pretty => fmt.pretty().boxed(),
            TracingFormat::Compact => fmt.compact().boxed(),
            TracingFormat::Json => fmt.json().boxed(),
        };

        Box::new(
            tracing_subscriber::registry()
                .with(fmt)
                .with(self.config.env_filter()),
        )
    }
}

impl Plugin for TracingPlugin {
    fn build(&self, _registry: &mut HookRegistry) -> Result<(), HookError> {
        Ok(())
    }

    fn ready(&self, registry: &HookRegistry) {
        if tracing::subscriber::set_global_default(self.subscriber(std::io::stdout)).is_err() {
            tracing::debug!("global subscriber already installed, keeping it");
        }

        let tags: BTreeSet<&str> = registry.specs().map(|spec| spec.tag().name()).collect();
        tracing::info!(
            filter = %self.config.filter_directives(),
            format = ?self.config.format,
            hooks = registry.specs().count(),
            tags = tags.len(),
            "rollkit logging ready"
        );
    }

    fn cleanup(&self) {
        tracing::info!("rollkit logging shutting down");
    }
}
