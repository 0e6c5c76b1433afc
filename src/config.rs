use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::export::{Corner, EraseRendering};
use crate::sampler::{MIN_GAP, SamplerConfig};

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV_VAR: &str = "EFRAME_INK_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix of exported file names.
    pub app_name: String,
    /// Canvas size in points.
    pub canvas_size: [u32; 2],
    pub sampler: SamplerConfig,
    pub export: ExportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "ink".to_owned(),
            canvas_size: [800, 800],
            sampler: SamplerConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
}

/// What an export tier is allowed to produce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierPolicy {
    /// Resolution multiplier for raster export.
    pub pixel_ratio: f32,
    pub add_watermark: bool,
    /// Upper bound on the larger side of a raster export, in pixels.
    pub max_dimension: Option<u32>,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            add_watermark: true,
            max_dimension: Some(2048),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub tier: Tier,
    pub tiers: BTreeMap<Tier, TierPolicy>,
    pub output_dir: PathBuf,
    pub watermark_path: Option<PathBuf>,
    pub watermark_corner: Corner,
    /// Raster exports are flattened onto this color; `None` keeps transparency.
    pub background: Option<Color32>,
    pub erase_rendering: EraseRendering,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let tiers = BTreeMap::from([
            (Tier::Free, TierPolicy::default()),
            (
                Tier::Pro,
                TierPolicy {
                    pixel_ratio: 4.0,
                    add_watermark: false,
                    max_dimension: None,
                },
            ),
        ]);

        Self {
            tier: Tier::Free,
            tiers,
            output_dir: PathBuf::from("."),
            watermark_path: None,
            watermark_corner: Corner::BottomRight,
            background: Some(Color32::WHITE),
            erase_rendering: EraseRendering::Mask,
        }
    }
}

impl ExportConfig {
    /// Policy of the active tier. A tier missing from the table falls back
    /// to the most restrictive defaults.
    pub fn policy(&self) -> TierPolicy {
        self.tiers.get(&self.tier).copied().unwrap_or_default()
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by [`CONFIG_ENV_VAR`], or fall back to defaults.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", Path::new(&path).display());
                config
            }
            Err(err) => {
                log::warn!("{err}; using default config");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_size.contains(&0) {
            return Err(ConfigError::Invalid {
                field: "canvas_size",
                reason: format!("{:?} has a zero side", self.canvas_size),
            });
        }

        let sampler = &self.sampler;
        if !(sampler.min_distance >= 0.0 && sampler.max_gap >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "sampler",
                reason: "thresholds must be non-negative".to_owned(),
            });
        }
        let gap = sampler.max_gap;
        if gap != 0.0 && !(gap >= MIN_GAP && gap.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "sampler.max_gap",
                reason: format!("{gap} must be 0 or at least {MIN_GAP} px"),
            });
        }

        for (tier, policy) in &self.export.tiers {
            if !(policy.pixel_ratio.is_finite() && policy.pixel_ratio > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "export.tiers.pixel_ratio",
                    reason: format!("{tier:?} has ratio {}", policy.pixel_ratio),
                });
            }
            if policy.max_dimension == Some(0) {
                return Err(ConfigError::Invalid {
                    field: "export.tiers.max_dimension",
                    reason: format!("{tier:?} allows no pixels"),
                });
            }
        }

        Ok(())
    }
}
