//! Configuration for the offline tile cache.
//!
//! [`OfflineConfig`] is the in-memory configuration every component is built
//! from. [`ConfigFile`] is the on-disk INI form the CLI loads it from.

mod file;
mod keys;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::coord::MAX_ZOOM;
use crate::fetch::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::tile::{TemplateError, TemplateOptions, TileUrlTemplate};

pub use file::{
    config_dir, config_file_path, default_cache_dir, CacheSettings, ConfigFile, HttpSettings,
    LayerSettings, OfflineSettings,
};
pub use keys::ConfigKey;

/// OpenStreetMap standard tile layer.
pub const DEFAULT_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default lowest zoom a save may start from.
pub const DEFAULT_MIN_ZOOM: u8 = 0;

/// Default highest zoom a save descends to.
pub const DEFAULT_MAX_ZOOM: u8 = 19;

/// Default cap on the number of tiles a single save may request.
pub const DEFAULT_MAX_TILES: u64 = 100_000;

/// Errors from building or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(String),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("min_zoom {min} is greater than max_zoom {max}")]
    ZoomRange { min: u8, max: u8 },

    #[error("max_zoom {max} exceeds the supported maximum {limit}")]
    ZoomTooHigh { max: u8, limit: u8 },

    #[error("tile_size must be greater than zero")]
    ZeroTileSize,

    #[error("max_tiles must be greater than zero")]
    ZeroTileLimit,

    #[error("invalid URL template: {0}")]
    Template(#[from] TemplateError),
}

/// How save progress is reported.
///
/// Exactly one mode applies to a controller, so listeners always know which
/// events to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    /// `TileSaved` / `SaveTileError` for each tile, then a terminal event.
    #[default]
    PerTile,
    /// Only the terminal `SaveEnd` / `SaveError`.
    Aggregate,
}

impl fmt::Display for ProgressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressMode::PerTile => write!(f, "per-tile"),
            ProgressMode::Aggregate => write!(f, "aggregate"),
        }
    }
}

impl FromStr for ProgressMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per-tile" | "per_tile" | "tile" => Ok(ProgressMode::PerTile),
            "aggregate" | "session" => Ok(ProgressMode::Aggregate),
            _ => Err(ConfigError::InvalidValue {
                key: "offline.progress".to_string(),
                value: s.to_string(),
                reason: "expected 'per-tile' or 'aggregate'".to_string(),
            }),
        }
    }
}

/// Offline cache configuration.
#[derive(Debug, Clone)]
pub struct OfflineConfig {
    /// Tile URL template, e.g. `https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png`.
    pub url_template: String,

    /// Subdomains rotated through `{s}`. The first one is canonical for keys.
    pub subdomains: Vec<String>,

    /// Tile edge length in pixels.
    pub tile_size: u32,

    /// Lowest zoom a save may start from.
    pub min_zoom: u8,

    /// Highest zoom a save descends to.
    pub max_zoom: u8,

    /// Use TMS row numbering for `{y}`.
    pub tms: bool,

    /// Added to the zoom written into URLs.
    pub zoom_offset: i32,

    /// Write `max_zoom - zoom` into URLs.
    pub zoom_reverse: bool,

    /// Substitute `@2x` for `{r}`.
    pub retina: bool,

    /// Extra template placeholders.
    pub template_values: HashMap<String, String>,

    /// Event granularity for saves.
    pub progress_mode: ProgressMode,

    /// Query the store size before a removal so it can be reported.
    pub report_size_before_removal: bool,

    /// Largest number of tiles one save may request.
    pub max_tiles: u64,

    /// HTTP request timeout.
    pub request_timeout: Duration,

    /// HTTP `User-Agent`.
    pub user_agent: String,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            tile_size: DEFAULT_TILE_SIZE,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            tms: false,
            zoom_offset: 0,
            zoom_reverse: false,
            retina: false,
            template_values: HashMap::new(),
            progress_mode: ProgressMode::default(),
            report_size_before_removal: true,
            max_tiles: DEFAULT_MAX_TILES,
            request_timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl OfflineConfig {
    /// Create a configuration for the given URL template.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            ..Default::default()
        }
    }

    /// Set the subdomain alphabet.
    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    /// Set the zoom range a save covers.
    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Set the tile size.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the progress reporting mode.
    pub fn with_progress_mode(mut self, mode: ProgressMode) -> Self {
        self.progress_mode = mode;
        self
    }

    /// Enable or disable the size query before removal.
    pub fn with_report_size_before_removal(mut self, enabled: bool) -> Self {
        self.report_size_before_removal = enabled;
        self
    }

    /// Set the largest number of tiles one save may request.
    pub fn with_max_tiles(mut self, max_tiles: u64) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    /// Enable or disable TMS row numbering.
    pub fn with_tms(mut self, tms: bool) -> Self {
        self.tms = tms;
        self
    }

    /// Set the HTTP timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Add a value for a custom template placeholder.
    pub fn with_template_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.template_values.insert(name.into(), value.into());
        self
    }

    /// Checks internal consistency and that the template parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::ZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if self.max_zoom > MAX_ZOOM {
            return Err(ConfigError::ZoomTooHigh {
                max: self.max_zoom,
                limit: MAX_ZOOM,
            });
        }
        if self.tile_size == 0 {
            return Err(ConfigError::ZeroTileSize);
        }
        if self.max_tiles == 0 {
            return Err(ConfigError::ZeroTileLimit);
        }
        self.template()?;
        Ok(())
    }

    /// Parses the URL template with this configuration's options.
    pub fn template(&self) -> Result<TileUrlTemplate, ConfigError> {
        let options = TemplateOptions {
            subdomains: self.subdomains.clone(),
            tms: self.tms,
            zoom_offset: self.zoom_offset,
            zoom_reverse: self.zoom_reverse,
            max_zoom: self.max_zoom,
            retina: self.retina,
            extra: self.template_values.clone(),
        };
        Ok(TileUrlTemplate::parse(&self.url_template, options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OfflineConfig::default();
        assert_eq!(config.min_zoom, 0);
        assert_eq!(config.max_zoom, 19);
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.subdomains, vec!["a", "b", "c"]);
        assert_eq!(config.progress_mode, ProgressMode::PerTile);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = OfflineConfig::new("https://{s}.t.example/{z}/{x}/{y}.png?k={key}")
            .with_subdomains(["x", "y"])
            .with_zoom_range(13, 19)
            .with_progress_mode(ProgressMode::Aggregate)
            .with_template_value("key", "abc")
            .with_report_size_before_removal(false);

        assert_eq!(config.subdomains, vec!["x", "y"]);
        assert_eq!((config.min_zoom, config.max_zoom), (13, 19));
        assert!(!config.report_size_before_removal);

        let template = config.template().unwrap();
        assert_eq!(
            template.resolve(&crate::coord::TileCoord::new(1, 0, 13)),
            "https://y.t.example/13/1/0.png?k=abc"
        );
    }

    #[test]
    fn test_validate_rejects_inverted_zoom_range() {
        let config = OfflineConfig::default().with_zoom_range(15, 10);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZoomRange { min: 15, max: 10 })
        ));
    }

    #[test]
    fn test_validate_rejects_zoom_beyond_grid() {
        let config = OfflineConfig::default().with_zoom_range(0, 64).with_tms(true);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZoomTooHigh { max: 64, limit: 30 })
        ));
        assert!(OfflineConfig::default()
            .with_zoom_range(0, MAX_ZOOM)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_tile_limit() {
        let config = OfflineConfig::default().with_max_tiles(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTileLimit)));
    }

    #[test]
    fn test_validate_rejects_zero_tile_size() {
        let config = OfflineConfig::default().with_tile_size(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTileSize)));
    }

    #[test]
    fn test_validate_rejects_bad_template() {
        let config = OfflineConfig::new("https://t/{bogus}.png");
        assert!(matches!(config.validate(), Err(ConfigError::Template(_))));
    }

    #[test]
    fn test_progress_mode_parse() {
        assert_eq!("per-tile".parse::<ProgressMode>().unwrap(), ProgressMode::PerTile);
        assert_eq!("Aggregate".parse::<ProgressMode>().unwrap(), ProgressMode::Aggregate);
        assert!("loud".parse::<ProgressMode>().is_err());
        assert_eq!(ProgressMode::Aggregate.to_string(), "aggregate");
    }
}
