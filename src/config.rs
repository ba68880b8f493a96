//! Configuration for city generation.
//!
//! A `CityConfig` is validated once, when a generator is built from it.
//! Nothing is clamped: every out-of-range value is reported as a `ConfigError`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::buildings::{ArchetypeTable, HeightJitter};
use crate::districts::DistanceMetric;

/// How many district sites to scatter per generation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteCount {
    /// Exactly this many sites.
    Fixed(usize),
    /// Uniformly sampled in `[min, max)`; `min == max` means exactly `min`.
    Range { min: usize, max: usize },
}

impl Default for SiteCount {
    fn default() -> Self {
        SiteCount::Range { min: 8, max: 16 }
    }
}

impl std::fmt::Display for SiteCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteCount::Fixed(n) => write!(f, "{}", n),
            SiteCount::Range { min, max } => write!(f, "{}..{}", min, max),
        }
    }
}

/// Configuration parameters for city generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// Grid width in cells.
    pub width: usize,

    /// Grid height in cells.
    pub height: usize,

    /// Number of district sites.
    pub sites: SiteCount,

    /// Seed for the generator's random source.
    pub seed: u64,

    /// Distance metric used by the nearest-site classifier.
    pub metric: DistanceMetric,

    /// Spacing of the regular block-road lattice.
    pub block_size: usize,

    /// Extra passes widening district-border roads (0 = one cell wide).
    pub major_road_thickness: usize,

    /// Whether sites may be parks. When false, sites draw from the four
    /// remaining district categories.
    pub allow_parks: bool,

    /// Skip the border-road override when a backward neighbour is already road.
    pub suppress_border_road_near_road: bool,

    /// Emit a road placement for road cells instead of nothing.
    pub emit_roads: bool,

    /// Random building height multiplier range; `None` disables jitter.
    pub height_jitter: Option<HeightJitter>,

    /// Uniform scale divisor applied to every placement.
    pub scale_divisor: Option<f32>,

    /// Per-archetype handles forwarded to the placement consumer.
    pub archetypes: Option<ArchetypeTable>,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            sites: SiteCount::default(),
            seed: 651321525,
            metric: DistanceMetric::Euclidean,
            block_size: 8,
            major_road_thickness: 0,
            allow_parks: true,
            suppress_border_road_near_road: false,
            emit_roads: true,
            height_jitter: Some(HeightJitter::default()),
            scale_divisor: None,
            archetypes: None,
        }
    }
}

impl CityConfig {
    /// Check every field. Called by `CityGenerator::configure`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }

        if self.width.checked_mul(self.height).is_none() {
            return Err(ConfigError::GridTooLarge {
                width: self.width,
                height: self.height,
            });
        }

        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }

        match self.sites {
            SiteCount::Fixed(0) => return Err(ConfigError::ZeroSites),
            SiteCount::Range { min, max } if min > max => {
                return Err(ConfigError::InvalidSiteRange { min, max });
            }
            SiteCount::Range { min: 0, .. } => return Err(ConfigError::ZeroSites),
            _ => {}
        }

        if let Some(jitter) = self.height_jitter {
            let finite = jitter.min.is_finite() && jitter.max.is_finite();
            if !finite || jitter.min <= 0.0 || jitter.min > jitter.max {
                return Err(ConfigError::InvalidHeightRange {
                    min: jitter.min,
                    max: jitter.max,
                });
            }
        }

        if let Some(divisor) = self.scale_divisor {
            if !divisor.is_finite() || divisor <= 0.0 {
                return Err(ConfigError::InvalidScaleDivisor(divisor));
            }
        }

        Ok(())
    }

    /// Load and validate a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config: CityConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write this config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, json).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Width or height is zero
    EmptyGrid { width: usize, height: usize },
    /// Cell count does not fit in memory addressing
    GridTooLarge { width: usize, height: usize },
    /// Block lattice spacing is zero
    ZeroBlockSize,
    /// Site count (or the lower end of the range) is zero
    ZeroSites,
    /// Site range with min > max
    InvalidSiteRange { min: usize, max: usize },
    /// Height jitter range is empty, non-positive, or not finite
    InvalidHeightRange { min: f32, max: f32 },
    /// Scale divisor is non-positive or not finite
    InvalidScaleDivisor(f32),
    /// Config file could not be read or written
    Io(String),
    /// Config file is not valid JSON for `CityConfig`
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyGrid { width, height } => {
                write!(f, "Grid must be at least 1x1, got {}x{}", width, height)
            }
            ConfigError::GridTooLarge { width, height } => {
                write!(f, "Grid {}x{} has more cells than can be addressed", width, height)
            }
            ConfigError::ZeroBlockSize => write!(f, "Block size must be greater than zero"),
            ConfigError::ZeroSites => write!(f, "Site count must be greater than zero"),
            ConfigError::InvalidSiteRange { min, max } => {
                write!(f, "Site range minimum {} exceeds maximum {}", min, max)
            }
            ConfigError::InvalidHeightRange { min, max } => {
                write!(f, "Invalid height range {}..{}", min, max)
            }
            ConfigError::InvalidScaleDivisor(d) => {
                write!(f, "Scale divisor must be a positive number, got {}", d)
            }
            ConfigError::Io(msg) => write!(f, "Failed to access config file: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::CityGenerator;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(CityConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_empty_grid() {
        let config = CityConfig { width: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyGrid { width: 0, .. })));

        let config = CityConfig { height: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyGrid { height: 0, .. })));
    }

    #[test]
    fn test_rejects_grid_too_large() {
        let config = CityConfig { width: usize::MAX / 2, height: 4, ..Default::default() };
        assert_eq!(
            config.validate(),
            Err(ConfigError::GridTooLarge { width: usize::MAX / 2, height: 4 })
        );
        assert!(CityGenerator::configure(config).is_err());
    }

    #[test]
    fn test_rejects_zero_block_size() {
        let config = CityConfig { block_size: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::ZeroBlockSize));
    }

    #[test]
    fn test_rejects_bad_site_counts() {
        let config = CityConfig { sites: SiteCount::Fixed(0), ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSites));

        let config = CityConfig {
            sites: SiteCount::Range { min: 9, max: 3 },
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidSiteRange { min: 9, max: 3 }));

        let config = CityConfig {
            sites: SiteCount::Range { min: 0, max: 3 },
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSites));

        let config = CityConfig {
            sites: SiteCount::Range { min: 4, max: 4 },
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_height_and_scale() {
        let config = CityConfig {
            height_jitter: Some(HeightJitter { min: 5.0, max: 2.0 }),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHeightRange { .. })));

        let config = CityConfig { scale_divisor: Some(0.0), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidScaleDivisor(_))));
    }

    #[test]
    fn test_json_uses_defaults_for_missing_fields() {
        let config: CityConfig =
            serde_json::from_str(r#"{ "width": 12, "metric": "manhattan", "sites": { "fixed": 3 } }"#)
                .unwrap();
        assert_eq!(config.width, 12);
        assert_eq!(config.height, CityConfig::default().height);
        assert_eq!(config.metric, DistanceMetric::Manhattan);
        assert_eq!(config.sites, SiteCount::Fixed(3));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("city_config_{}.json", std::process::id()));
        let config = CityConfig {
            width: 20,
            sites: SiteCount::Range { min: 2, max: 5 },
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = CityConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
