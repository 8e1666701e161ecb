//! Configuration file support for geohazard
//!
//! Loads configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.geohazardrc.json` in the working directory
//! 3. `geohazard.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::hazard::HazardRules;
use crate::resilience::ResilienceWeights;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Public Nominatim instance
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

const DEFAULT_USER_AGENT: &str = concat!("geohazard/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_MS: u64 = 5000;
const DEFAULT_LIMIT: usize = 5;
const DEFAULT_ANALYSIS_DELAY_MS: u64 = 1500;

/// geohazard configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeohazardConfig {
    /// Geocoding service settings
    #[serde(default)]
    pub geocoder: Option<GeocoderConfig>,

    /// Hazard classifier thresholds
    #[serde(default)]
    pub hazards: Option<HazardConfig>,

    /// Resilience score penalties
    #[serde(default)]
    pub resilience: Option<ResilienceConfig>,

    /// Seed for the analysis RNG (default: OS entropy)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Simulated delay before the image placeholder analysis (default: 1500)
    #[serde(default)]
    pub analysis_delay_ms: Option<u64>,
}

/// Geocoding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeocoderConfig {
    /// Base URL of a Nominatim-compatible service
    pub base_url: Option<String>,
    /// User-Agent header sent with every request
    pub user_agent: Option<String>,
    /// Request timeout in milliseconds (default: 5000)
    pub timeout_ms: Option<u64>,
    /// Maximum search candidates (default: 5)
    pub limit: Option<usize>,
    /// ISO 3166-1 alpha-2 codes restricting searches (default: none)
    pub country_codes: Option<Vec<String>>,
}

/// Hazard classifier thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HazardConfig {
    /// Fault reference latitudes (default: [14.5995, 10.3157])
    pub fault_latitudes: Option<Vec<f64>>,
    /// Degrees of latitude counted as near a fault (default: 2.0)
    pub fault_radius_deg: Option<f64>,
    /// Typhoon belt longitude bounds (default: 120.0 - 126.0)
    pub typhoon_lon_min: Option<f64>,
    pub typhoon_lon_max: Option<f64>,
    /// Flood band latitude bounds (default: 10.0 - 15.0)
    pub flood_lat_min: Option<f64>,
    pub flood_lat_max: Option<f64>,
    /// Draw threshold for the tsunami gate (default: 0.5)
    pub tsunami_threshold: Option<f64>,
    /// Landslide latitude rules (default: north of 16.0, or 6.0 - 10.0)
    pub landslide_lat_north: Option<f64>,
    pub landslide_lat_min: Option<f64>,
    pub landslide_lat_max: Option<f64>,
}

/// Resilience score penalties
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResilienceConfig {
    /// Starting score (default: 100)
    pub base: Option<u8>,
    /// Penalty per high hazard (default: 20)
    pub high_penalty: Option<u8>,
    /// Penalty per moderate hazard (default: 10)
    pub moderate_penalty: Option<u8>,
    /// Lowest possible score (default: 30)
    pub floor: Option<u8>,
}

/// Resolved geocoding settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocoderSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
    pub limit: usize,
    pub country_codes: Vec<String>,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        GeocoderSettings {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            limit: DEFAULT_LIMIT,
            country_codes: Vec::new(),
        }
    }
}

/// Resolved configuration with defaults applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub geocoder: GeocoderSettings,
    pub hazard_rules: HazardRules,
    pub resilience_weights: ResilienceWeights,
    pub seed: Option<u64>,
    pub analysis_delay_ms: u64,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

fn check_finite(name: &str, value: Option<f64>) -> Result<()> {
    if let Some(v) = value {
        if !v.is_finite() {
            anyhow::bail!("hazards.{} must be a finite number (got {})", name, v);
        }
    }
    Ok(())
}

fn check_ordered(min_name: &str, min: f64, max_name: &str, max: f64) -> Result<()> {
    if min >= max {
        anyhow::bail!(
            "hazards.{} ({}) must be less than hazards.{} ({})",
            min_name,
            min,
            max_name,
            max
        );
    }
    Ok(())
}

impl GeohazardConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref g) = self.geocoder {
            if let Some(ref url) = g.base_url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    anyhow::bail!("geocoder.base_url must be an http(s) URL (got {})", url);
                }
            }
            if let Some(ref agent) = g.user_agent {
                if agent.trim().is_empty() {
                    anyhow::bail!("geocoder.user_agent must not be empty");
                }
            }
            if g.timeout_ms == Some(0) {
                anyhow::bail!("geocoder.timeout_ms must be positive");
            }
            if let Some(limit) = g.limit {
                if limit == 0 || limit > 50 {
                    anyhow::bail!("geocoder.limit must be between 1 and 50 (got {})", limit);
                }
            }
            if let Some(ref codes) = g.country_codes {
                for code in codes {
                    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                        anyhow::bail!(
                            "geocoder.country_codes entries must be two-letter codes (got {})",
                            code
                        );
                    }
                }
            }
        }

        if let Some(ref h) = self.hazards {
            if let Some(ref faults) = h.fault_latitudes {
                for lat in faults {
                    if !lat.is_finite() || lat.abs() > 90.0 {
                        anyhow::bail!(
                            "hazards.fault_latitudes must be within -90..90 (got {})",
                            lat
                        );
                    }
                }
            }
            for (name, val) in [
                ("fault_radius_deg", h.fault_radius_deg),
                ("typhoon_lon_min", h.typhoon_lon_min),
                ("typhoon_lon_max", h.typhoon_lon_max),
                ("flood_lat_min", h.flood_lat_min),
                ("flood_lat_max", h.flood_lat_max),
                ("tsunami_threshold", h.tsunami_threshold),
                ("landslide_lat_north", h.landslide_lat_north),
                ("landslide_lat_min", h.landslide_lat_min),
                ("landslide_lat_max", h.landslide_lat_max),
            ] {
                check_finite(name, val)?;
            }

            let defaults = HazardRules::default();
            if let Some(radius) = h.fault_radius_deg {
                if radius <= 0.0 {
                    anyhow::bail!("hazards.fault_radius_deg must be positive (got {})", radius);
                }
            }
            if let Some(t) = h.tsunami_threshold {
                if !(0.0..=1.0).contains(&t) {
                    anyhow::bail!("hazards.tsunami_threshold must be within 0..1 (got {})", t);
                }
            }
            check_ordered(
                "typhoon_lon_min",
                h.typhoon_lon_min.unwrap_or(defaults.typhoon_lon_min),
                "typhoon_lon_max",
                h.typhoon_lon_max.unwrap_or(defaults.typhoon_lon_max),
            )?;
            check_ordered(
                "flood_lat_min",
                h.flood_lat_min.unwrap_or(defaults.flood_lat_min),
                "flood_lat_max",
                h.flood_lat_max.unwrap_or(defaults.flood_lat_max),
            )?;
            check_ordered(
                "landslide_lat_min",
                h.landslide_lat_min.unwrap_or(defaults.landslide_lat_min),
                "landslide_lat_max",
                h.landslide_lat_max.unwrap_or(defaults.landslide_lat_max),
            )?;
        }

        if let Some(ref r) = self.resilience {
            let defaults = ResilienceWeights::default();
            let base = r.base.unwrap_or(defaults.base);
            let floor = r.floor.unwrap_or(defaults.floor);
            if base > 100 {
                anyhow::bail!("resilience.base must be at most 100 (got {})", base);
            }
            if floor > base {
                anyhow::bail!(
                    "resilience.floor ({}) must not exceed resilience.base ({})",
                    floor,
                    base
                );
            }
        }

        Ok(())
    }

    /// Resolve config into its final form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let geocoder = match &self.geocoder {
            Some(g) => {
                let defaults = GeocoderSettings::default();
                GeocoderSettings {
                    base_url: g.base_url.clone().unwrap_or(defaults.base_url),
                    user_agent: g.user_agent.clone().unwrap_or(defaults.user_agent),
                    timeout_ms: g.timeout_ms.unwrap_or(defaults.timeout_ms),
                    limit: g.limit.unwrap_or(defaults.limit),
                    country_codes: g
                        .country_codes
                        .as_ref()
                        .map(|codes| codes.iter().map(|c| c.to_ascii_lowercase()).collect())
                        .unwrap_or(defaults.country_codes),
                }
            }
            None => GeocoderSettings::default(),
        };

        let hazard_rules = match &self.hazards {
            Some(h) => {
                let d = HazardRules::default();
                HazardRules {
                    fault_latitudes: h.fault_latitudes.clone().unwrap_or(d.fault_latitudes),
                    fault_radius_deg: h.fault_radius_deg.unwrap_or(d.fault_radius_deg),
                    typhoon_lon_min: h.typhoon_lon_min.unwrap_or(d.typhoon_lon_min),
                    typhoon_lon_max: h.typhoon_lon_max.unwrap_or(d.typhoon_lon_max),
                    flood_lat_min: h.flood_lat_min.unwrap_or(d.flood_lat_min),
                    flood_lat_max: h.flood_lat_max.unwrap_or(d.flood_lat_max),
                    tsunami_threshold: h.tsunami_threshold.unwrap_or(d.tsunami_threshold),
                    landslide_lat_north: h.landslide_lat_north.unwrap_or(d.landslide_lat_north),
                    landslide_lat_min: h.landslide_lat_min.unwrap_or(d.landslide_lat_min),
                    landslide_lat_max: h.landslide_lat_max.unwrap_or(d.landslide_lat_max),
                }
            }
            None => HazardRules::default(),
        };

        let resilience_weights = match &self.resilience {
            Some(r) => {
                let d = ResilienceWeights::default();
                ResilienceWeights {
                    base: r.base.unwrap_or(d.base),
                    high_penalty: r.high_penalty.unwrap_or(d.high_penalty),
                    moderate_penalty: r.moderate_penalty.unwrap_or(d.moderate_penalty),
                    floor: r.floor.unwrap_or(d.floor),
                }
            }
            None => ResilienceWeights::default(),
        };

        Ok(ResolvedConfig {
            geocoder,
            hazard_rules,
            resilience_weights,
            seed: self.seed,
            analysis_delay_ms: self.analysis_delay_ms.unwrap_or(DEFAULT_ANALYSIS_DELAY_MS),
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        GeohazardConfig::default().resolve()
    }
}

/// Discover and load a config file from a directory
///
/// Search order:
/// 1. `.geohazardrc.json`
/// 2. `geohazard.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(root: &Path) -> Result<Option<(GeohazardConfig, PathBuf)>> {
    for name in [".geohazardrc.json", "geohazard.config.json"] {
        let path = root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<GeohazardConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: GeohazardConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `root`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(root)? {
            Some((config, path)) => (config, Some(path)),
            None => (GeohazardConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
