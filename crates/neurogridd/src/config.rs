//! neurogridd.toml configuration.
//!
//! Every key is optional. A missing file, section or key falls back to the
//! built-in default.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use neurogrid_control::EngineSettings;
use neurogrid_narrator::NarratorSettings;

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "neurogridd.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub engine: EngineSection,
    pub narrator: NarratorSection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub tick_interval_ms: u64,
    pub autoscale_interval_ms: u64,
    pub narration_interval_ms: u64,
    /// Fixed RNG seed; entropy-seeded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub autoscale_enabled: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            autoscale_interval_ms: 3_000,
            narration_interval_ms: 8_000,
            seed: None,
            autoscale_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarratorSection {
    /// Generation service URL. The narrator runs offline without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub model: String,
    pub timeout_ms: u64,
    pub probability: f64,
    pub max_tokens: u32,
}

impl Default for NarratorSection {
    fn default() -> Self {
        let defaults = NarratorSettings::default();
        Self {
            endpoint: None,
            model: defaults.model,
            timeout_ms: defaults.timeout.as_millis() as u64,
            probability: 0.4,
            max_tokens: defaults.max_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl DaemonConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: DaemonConfig =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise from `neurogridd.toml` in the
    /// working directory when present, otherwise use defaults. An explicit
    /// path must exist. The result is validated either way.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if default_path.is_file() => Self::from_file(default_path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let engine = &self.engine;
        for (name, value) in [
            ("engine.tick_interval_ms", engine.tick_interval_ms),
            ("engine.autoscale_interval_ms", engine.autoscale_interval_ms),
            ("engine.narration_interval_ms", engine.narration_interval_ms),
            ("narrator.timeout_ms", self.narrator.timeout_ms),
        ] {
            if value == 0 {
                bail!("{name} must be greater than zero");
            }
        }

        let p = self.narrator.probability;
        if !(0.0..=1.0).contains(&p) {
            bail!("narrator.probability must be within [0, 1], got {p}");
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            tick_interval: Duration::from_millis(self.engine.tick_interval_ms),
            autoscale_interval: Duration::from_millis(self.engine.autoscale_interval_ms),
            narration_interval: Duration::from_millis(self.engine.narration_interval_ms),
            narration_probability: self.narrator.probability,
            autoscale_enabled: self.engine.autoscale_enabled,
            ..EngineSettings::default()
        }
    }

    pub fn narrator_settings(&self) -> NarratorSettings {
        NarratorSettings {
            model: self.narrator.model.clone(),
            timeout: Duration::from_millis(self.narrator.timeout_ms),
            max_tokens: self.narrator.max_tokens,
            ..NarratorSettings::default()
        }
    }
}
