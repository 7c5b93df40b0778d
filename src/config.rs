use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::order::{IdentitySolver, MicrolpSolver, Solver};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    /// Inset applied to every cluster rectangle, multiplied by its depth.
    pub margin: f64,
    /// Weight added to a cluster pair per edge between their members.
    pub weight_scale: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            margin: 0.0,
            weight_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SolverBackend {
    #[default]
    Microlp,
    Identity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    pub time_limit_secs: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Microlp,
            time_limit_secs: 300.0,
        }
    }
}

impl SolverConfig {
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_secs).unwrap_or_default()
    }

    pub fn build_solver(&self) -> Box<dyn Solver> {
        match self.backend {
            SolverBackend::Microlp => Box::new(MicrolpSolver),
            SolverBackend::Identity => Box::new(IdentitySolver),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub layout: LayoutConfig,
    pub solver: SolverConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    width: Option<f64>,
    height: Option<f64>,
    margin: Option<f64>,
    weight_scale: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SolverConfigFile {
    backend: Option<SolverBackend>,
    time_limit_secs: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutConfigFile>,
    solver: Option<SolverConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config {}", path.display()))
}

/// Applies the overrides in `contents` to the defaults. Strict JSON is tried
/// first, then JSON5 (comments, trailing commas).
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|_| json_err)?,
    };

    let mut config = Config::default();
    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.width {
            config.layout.width = v;
        }
        if let Some(v) = layout.height {
            config.layout.height = v;
        }
        if let Some(v) = layout.margin {
            config.layout.margin = v;
        }
        if let Some(v) = layout.weight_scale {
            config.layout.weight_scale = v;
        }
    }
    if let Some(solver) = parsed.solver {
        if let Some(v) = solver.backend {
            config.solver.backend = v;
        }
        if let Some(v) = solver.time_limit_secs {
            anyhow::ensure!(
                v.is_finite() && v >= 0.0,
                "timeLimitSecs must be a non-negative number, got {v}"
            );
            config.solver.time_limit_secs = v;
        }
    }
    anyhow::ensure!(
        config.layout.margin >= 0.0,
        "margin must not be negative, got {}",
        config.layout.margin
    );
    anyhow::ensure!(
        config.layout.weight_scale.is_finite() && config.layout.weight_scale >= 0.0,
        "weightScale must be a non-negative number, got {}",
        config.layout.weight_scale
    );
    Ok(config)
}
