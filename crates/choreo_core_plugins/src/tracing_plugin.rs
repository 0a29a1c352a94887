//! Tracing and observability plugin.
//!
//! Provides [`TracingPlugin`], which installs a `tracing` subscriber and
//! exposes its settings as a resource.
//!
//! # Lifecycle
//!
//! - **`build()`** publishes [`TracingConfig`] so other plugins can read the
//!   intended verbosity while they build.
//! - **`ready()`** installs the subscriber. Installation is global to the
//!   process and happens at most once; a second world (or a test harness
//!   that already installed one) keeps the existing subscriber.
//!
//! ```
//! use choreo_system::world::World;
//! use choreo_core_plugins::{TracingFormat, TracingPlugin, WorldInfoPlugin};
//! use tracing::Level;
//!
//! let mut world = World::new();
//! world.add_plugins(WorldInfoPlugin).add_plugins(
//!     TracingPlugin::default()
//!         .with_level(Level::DEBUG)
//!         .with_format(TracingFormat::Compact)
//!         .with_env_filter("choreo_graph=debug,choreo_pool=warn"),
//! );
//! world.finish();
//! ```

use crate::WorldInfoPlugin;
use choreo_system::plugin::{Plugin, PluginId};
use choreo_system::resource::GlobalResource;
use choreo_system::world::World;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable multi-line output (default).
    #[default]
    Pretty,
    /// Single-line output.
    Compact,
    /// JSON lines for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig Resource
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing settings published by [`TracingPlugin`].
///
/// Plugins can check `level` before assembling expensive diagnostics:
///
/// ```ignore
/// if world.get_global::<TracingConfig>().is_some_and(|c| c.level >= Level::DEBUG) {
///     tracing::debug!(states = ?graph.state_names(), "graph loaded");
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingConfig {
    /// The configured maximum level.
    pub level: Level,
    /// The configured output format.
    pub format: TracingFormat,
}

impl GlobalResource for TracingConfig {}

// ─────────────────────────────────────────────────────────────────────────────
// TracingPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Logging plugin built on [`tracing_subscriber`].
///
/// # Resources Provided
///
/// | Resource | Scope | Description |
/// |----------|-------|-------------|
/// | [`TracingConfig`] | Global | Tracing settings (read-only) |
///
/// # Dependencies
///
/// - [`WorldInfoPlugin`]
///
/// # Environment Filter
///
/// `with_env_filter` takes the usual `target=level` directives. An invalid
/// string falls back to the plain level.
#[derive(Debug, Clone)]
pub struct TracingPlugin {
    level: Level,
    format: TracingFormat,
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingPlugin {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingPlugin {
    /// Creates a plugin with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets per-target directives, e.g. `choreo_graph=debug,choreo_pool=warn`.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Emits span enter and exit events.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        }
    }
}

impl Plugin for TracingPlugin {
    fn build(&self, world: &mut World) {
        world.insert_global(TracingConfig {
            level: self.level,
            format: self.format,
        });
    }

    fn ready(&self, _world: &mut World) {
        let filter = self.env_filter();
        let span_events = self.span_events();

        // try_init fails when a global subscriber already exists; keep it.
        let installed = match self.format {
            TracingFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Compact => tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init(),
        };

        tracing::info!(
            level = %self.level,
            format = ?self.format,
            installed = installed.is_ok(),
            "TracingPlugin initialized"
        );
    }

    fn cleanup(&self, _world: &mut World) {
        tracing::info!("TracingPlugin shutting down");
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<WorldInfoPlugin>()]
    }
}
