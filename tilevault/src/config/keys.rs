//! Typed access to individual configuration settings.
//!
//! Every setting in the INI file is a [`ConfigKey`] named `section.key`.
//! Loading, saving and the CLI's `config get/set` all go through it.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::file::ConfigFile;
use super::ConfigError;

/// A single setting in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    LayerUrl,
    LayerSubdomains,
    LayerTileSize,
    LayerTms,
    LayerZoomOffset,
    LayerZoomReverse,
    LayerRetina,
    OfflineMinZoom,
    OfflineMaxZoom,
    OfflineProgress,
    OfflineReportSize,
    OfflineMaxTiles,
    CacheDirectory,
    HttpTimeout,
    HttpUserAgent,
}

const ALL_KEYS: [ConfigKey; 15] = [
    ConfigKey::LayerUrl,
    ConfigKey::LayerSubdomains,
    ConfigKey::LayerTileSize,
    ConfigKey::LayerTms,
    ConfigKey::LayerZoomOffset,
    ConfigKey::LayerZoomReverse,
    ConfigKey::LayerRetina,
    ConfigKey::OfflineMinZoom,
    ConfigKey::OfflineMaxZoom,
    ConfigKey::OfflineProgress,
    ConfigKey::OfflineReportSize,
    ConfigKey::OfflineMaxTiles,
    ConfigKey::CacheDirectory,
    ConfigKey::HttpTimeout,
    ConfigKey::HttpUserAgent,
];

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::LayerUrl
            | ConfigKey::LayerSubdomains
            | ConfigKey::LayerTileSize
            | ConfigKey::LayerTms
            | ConfigKey::LayerZoomOffset
            | ConfigKey::LayerZoomReverse
            | ConfigKey::LayerRetina => "layer",
            ConfigKey::OfflineMinZoom
            | ConfigKey::OfflineMaxZoom
            | ConfigKey::OfflineProgress
            | ConfigKey::OfflineReportSize
            | ConfigKey::OfflineMaxTiles => "offline",
            ConfigKey::CacheDirectory => "cache",
            ConfigKey::HttpTimeout | ConfigKey::HttpUserAgent => "http",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::LayerUrl => "url",
            ConfigKey::LayerSubdomains => "subdomains",
            ConfigKey::LayerTileSize => "tile_size",
            ConfigKey::LayerTms => "tms",
            ConfigKey::LayerZoomOffset => "zoom_offset",
            ConfigKey::LayerZoomReverse => "zoom_reverse",
            ConfigKey::LayerRetina => "retina",
            ConfigKey::OfflineMinZoom => "min_zoom",
            ConfigKey::OfflineMaxZoom => "max_zoom",
            ConfigKey::OfflineProgress => "progress",
            ConfigKey::OfflineReportSize => "report_size",
            ConfigKey::OfflineMaxTiles => "max_tiles",
            ConfigKey::CacheDirectory => "directory",
            ConfigKey::HttpTimeout => "timeout",
            ConfigKey::HttpUserAgent => "user_agent",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as it appears in the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::LayerUrl => config.layer.url.clone(),
            ConfigKey::LayerSubdomains => format_subdomains(&config.layer.subdomains),
            ConfigKey::LayerTileSize => config.layer.tile_size.to_string(),
            ConfigKey::LayerTms => config.layer.tms.to_string(),
            ConfigKey::LayerZoomOffset => config.layer.zoom_offset.to_string(),
            ConfigKey::LayerZoomReverse => config.layer.zoom_reverse.to_string(),
            ConfigKey::LayerRetina => config.layer.retina.to_string(),
            ConfigKey::OfflineMinZoom => config.offline.min_zoom.to_string(),
            ConfigKey::OfflineMaxZoom => config.offline.max_zoom.to_string(),
            ConfigKey::OfflineProgress => config.offline.progress.to_string(),
            ConfigKey::OfflineReportSize => config.offline.report_size.to_string(),
            ConfigKey::OfflineMaxTiles => config.offline.max_tiles.to_string(),
            ConfigKey::CacheDirectory => config
                .cache
                .directory
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
            ConfigKey::HttpTimeout => config.http.timeout.as_secs().to_string(),
            ConfigKey::HttpUserAgent => config.http.user_agent.clone(),
        }
    }

    /// Parses `value` and stores it into `config`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::LayerUrl => config.layer.url = value.to_string(),
            ConfigKey::LayerSubdomains => config.layer.subdomains = parse_subdomains(value),
            ConfigKey::LayerTileSize => config.layer.tile_size = self.parse(value)?,
            ConfigKey::LayerTms => config.layer.tms = self.parse_bool(value)?,
            ConfigKey::LayerZoomOffset => config.layer.zoom_offset = self.parse(value)?,
            ConfigKey::LayerZoomReverse => config.layer.zoom_reverse = self.parse_bool(value)?,
            ConfigKey::LayerRetina => config.layer.retina = self.parse_bool(value)?,
            ConfigKey::OfflineMinZoom => config.offline.min_zoom = self.parse(value)?,
            ConfigKey::OfflineMaxZoom => config.offline.max_zoom = self.parse(value)?,
            ConfigKey::OfflineProgress => config.offline.progress = value.parse()?,
            ConfigKey::OfflineReportSize => config.offline.report_size = self.parse_bool(value)?,
            ConfigKey::OfflineMaxTiles => config.offline.max_tiles = self.parse(value)?,
            ConfigKey::CacheDirectory => {
                config.cache.directory = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            ConfigKey::HttpTimeout => {
                config.http.timeout = Duration::from_secs(self.parse(value)?);
            }
            ConfigKey::HttpUserAgent => config.http.user_agent = value.to_string(),
        }
        Ok(())
    }

    fn parse<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        value.parse().map_err(|e: T::Err| self.invalid(value, e.to_string()))
    }

    fn parse_bool(&self, value: &str) -> Result<bool, ConfigError> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false".to_string())),
        }
    }

    fn invalid(&self, value: &str, reason: String) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason,
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: s.to_string(),
                value: String::new(),
                reason: "unknown configuration key".to_string(),
            })
    }
}

/// `a,b,c` is a list of names; `abc` is a list of single characters.
fn parse_subdomains(value: &str) -> Vec<String> {
    if value.contains(',') {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    } else {
        value.chars().map(String::from).collect()
    }
}

fn format_subdomains(subdomains: &[String]) -> String {
    if subdomains.iter().all(|s| s.chars().count() == 1) {
        subdomains.concat()
    } else {
        subdomains.join(",")
    }
}
