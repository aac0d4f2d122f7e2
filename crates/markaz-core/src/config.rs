//! Application configuration.
//!
//! Every tunable constant (simulation presets, theme, camera timings, assistant
//! settings) lives in one `MarkazConfig` value. Layout presets are versioned
//! so that a config file written for an incompatible preset schema is refused
//! instead of silently misread.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MarkazError, Result};
use crate::graph::Node;

/// Version written into freshly generated layout presets.
pub const LAYOUT_PRESETS_VERSION: &str = "1.0.0";
/// Major preset schema version this build understands.
pub const SUPPORTED_PRESETS_MAJOR: u64 = 1;

/// Root configuration (`config.toml`).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct MarkazConfig {
    pub assistant: AssistantConfig,
    pub layout: LayoutPresets,
    pub theme: Theme,
    pub camera: CameraSettings,
}

impl MarkazConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        self.assistant.validate()
    }
}

/// Which assistant implementation answers prompts.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssistantBackend {
    /// A mind-map server exposing `POST /ask`.
    Remote,
    /// The OpenAI chat-completions API, called directly.
    #[default]
    OpenAi,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    pub backend: AssistantBackend,
    /// Base URL of the mind-map server (remote backend).
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Past messages of a chat sent along with each prompt.
    pub history_window: usize,
    /// Past messages of a chat retained in memory.
    pub history_limit: usize,
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            backend: AssistantBackend::default(),
            endpoint: "http://localhost:8000".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 1500,
            history_window: 6,
            history_limit: 15,
            timeout_secs: 60,
        }
    }
}

impl AssistantConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.history_window > self.history_limit {
            return Err(MarkazError::config(format!(
                "assistant.history_window ({}) exceeds assistant.history_limit ({})",
                self.history_window, self.history_limit
            )));
        }
        Ok(())
    }
}

/// Named, versioned force-simulation presets for the two layout modes.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LayoutPresets {
    pub schema_version: String,
    pub tree: TreePreset,
    pub network: NetworkPreset,
}

impl Default for LayoutPresets {
    fn default() -> Self {
        Self {
            schema_version: LAYOUT_PRESETS_VERSION.to_string(),
            tree: TreePreset::default(),
            network: NetworkPreset::default(),
        }
    }
}

impl LayoutPresets {
    pub fn validate(&self) -> Result<()> {
        let version = semver::Version::parse(&self.schema_version)?;
        if version.major != SUPPORTED_PRESETS_MAJOR {
            return Err(MarkazError::config(format!(
                "layout.schema_version {} is not compatible with {}.x",
                version, SUPPORTED_PRESETS_MAJOR
            )));
        }
        if self.tree.level_distance <= 0.0 {
            return Err(MarkazError::config("layout.tree.level_distance must be positive"));
        }
        if self.tree.link_distance <= 0.0 || self.network.link_distance <= 0.0 {
            return Err(MarkazError::config("layout link_distance must be positive"));
        }
        Ok(())
    }
}

/// Hierarchical top-down layering.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TreePreset {
    /// Distance between DAG levels.
    pub level_distance: f64,
    /// Many-body force strength (negative repels).
    pub charge_strength: f64,
    pub link_distance: f64,
    pub link_curvature: f64,
    pub arrow_length: f64,
    /// Arrow position along the link (0 = source, 1 = target).
    pub arrow_rel_pos: f64,
    /// Wait before zooming to fit once the simulation has been reheated.
    pub settle_delay_ms: u64,
    pub zoom_duration_ms: u64,
    pub zoom_padding: f64,
}

impl Default for TreePreset {
    fn default() -> Self {
        Self {
            level_distance: 80.0,
            charge_strength: -800.0,
            link_distance: 45.0,
            link_curvature: 0.3,
            arrow_length: 4.0,
            arrow_rel_pos: 1.0,
            settle_delay_ms: 500,
            zoom_duration_ms: 1000,
            zoom_padding: 150.0,
        }
    }
}

impl TreePreset {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn zoom_duration(&self) -> Duration {
        Duration::from_millis(self.zoom_duration_ms)
    }
}

/// Unconstrained organic clustering.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NetworkPreset {
    pub charge_strength: f64,
    pub link_distance: f64,
    pub link_curvature: f64,
    pub arrow_length: f64,
}

impl Default for NetworkPreset {
    fn default() -> Self {
        Self {
            charge_strength: -200.0,
            link_distance: 35.0,
            link_curvature: 0.0,
            arrow_length: 0.0,
        }
    }
}

/// Colors and link styling handed to the renderer.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Theme {
    pub node_color: String,
    pub root_color: String,
    pub link_color: String,
    pub highlight_color: String,
    pub link_opacity: f64,
    pub link_width: f64,
    pub link_particles: u32,
    pub particle_width: f64,
    pub particle_speed: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            node_color: "#00f2ff".to_string(),
            root_color: "#0033ff".to_string(),
            link_color: "#1a2a4a".to_string(),
            highlight_color: "#ffffff".to_string(),
            link_opacity: 0.4,
            link_width: 1.0,
            link_particles: 2,
            particle_width: 2.0,
            particle_speed: 0.007,
        }
    }
}

impl Theme {
    /// Display color of `node`: its own override, else the root or concept color.
    pub fn node_color<'a>(&'a self, node: &'a Node) -> &'a str {
        match node.color.as_deref() {
            Some(color) if !color.trim().is_empty() => color,
            _ if node.is_root => self.root_color.as_str(),
            _ => self.node_color.as_str(),
        }
    }
}

/// Camera focus and link highlight timings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CameraSettings {
    /// Extra distance kept between the camera and a focused node.
    pub focus_distance: f64,
    pub transition_ms: u64,
    pub highlight_decay_ms: u64,
    pub highlight_link_width: f64,
    pub highlight_particle_speed: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            focus_distance: 120.0,
            transition_ms: 1500,
            highlight_decay_ms: 3000,
            highlight_link_width: 3.0,
            highlight_particle_speed: 0.04,
        }
    }
}

impl CameraSettings {
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn highlight_decay(&self) -> Duration {
        Duration::from_millis(self.highlight_decay_ms)
    }
}
