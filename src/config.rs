use crate::feeds::{DateRange, Language, SearchFilters};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_delay")]
    pub simulated_delay_ms: u64,
    #[serde(default = "default_true")]
    pub has_location: bool,
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Globe,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub projection: Projection,
    #[serde(default = "default_center")]
    pub initial_center: [f64; 2],
    #[serde(default = "default_zoom")]
    pub initial_zoom: f64,
    #[serde(default = "default_focus_zoom")]
    pub focus_zoom: f64,
    #[serde(default = "default_fly_duration")]
    pub fly_duration_ms: u64,
}

fn default_tick_rate() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_delay() -> u64 {
    1500
}

fn default_true() -> bool {
    true
}

fn default_center() -> [f64; 2] {
    [0.0, 20.0]
}

fn default_zoom() -> f64 {
    2.0
}

fn default_focus_zoom() -> f64 {
    10.0
}

fn default_fly_duration() -> u64 {
    2000
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            simulated_delay_ms: default_delay(),
            has_location: true,
            date_range: DateRange::default(),
            language: Language::default(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
            initial_center: default_center(),
            initial_zoom: default_zoom(),
            focus_zoom: default_focus_zoom(),
            fly_duration_ms: default_fly_duration(),
        }
    }
}

impl SearchConfig {
    pub fn default_filters(&self) -> SearchFilters {
        SearchFilters {
            has_location: self.has_location,
            date_range: self.date_range,
            language: self.language,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}

impl MapConfig {
    pub fn fly_duration(&self) -> Duration {
        Duration::from_millis(self.fly_duration_ms)
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tweetglobe").join("config.toml"))
    }

    /// Load `path`, or the default location when `None`. A missing file is
    /// not an error; defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let [lng, lat] = self.map.initial_center;
        if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
            anyhow::bail!("map.initial_center out of range: [{}, {}]", lng, lat);
        }
        if self.general.tick_rate_ms == 0 {
            anyhow::bail!("general.tick_rate_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(&Self::default())?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
