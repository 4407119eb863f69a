//! INI configuration file.
//!
//! The file lives at `<config dir>/tilevault/config.ini`:
//!
//! ```ini
//! [layer]
//! url = https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png
//! subdomains = abc
//! tile_size = 256
//!
//! [offline]
//! min_zoom = 13
//! max_zoom = 19
//! progress = per-tile
//! max_tiles = 100000
//!
//! [cache]
//! directory = /home/user/.cache/tilevault/tiles
//!
//! [http]
//! timeout = 30
//!
//! [values]
//! apikey = secret
//! ```
//!
//! Missing files and missing keys fall back to defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;

use super::keys::ConfigKey;
use super::{
    ConfigError, OfflineConfig, ProgressMode, DEFAULT_MAX_TILES, DEFAULT_MAX_ZOOM,
    DEFAULT_MIN_ZOOM, DEFAULT_TILE_SIZE, DEFAULT_URL_TEMPLATE,
};
use crate::fetch::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

const APP_DIR: &str = "tilevault";
const CONFIG_FILE: &str = "config.ini";
const VALUES_SECTION: &str = "values";

/// Directory holding the configuration file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Default directory for the disk tile store.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("tiles")
}

/// `[layer]` section.
#[derive(Debug, Clone)]
pub struct LayerSettings {
    pub url: String,
    pub subdomains: Vec<String>,
    pub tile_size: u32,
    pub tms: bool,
    pub zoom_offset: i32,
    pub zoom_reverse: bool,
    pub retina: bool,
    /// `[values]` section, custom template placeholders.
    pub values: HashMap<String, String>,
}

/// `[offline]` section.
#[derive(Debug, Clone)]
pub struct OfflineSettings {
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub progress: ProgressMode,
    pub report_size: bool,
    pub max_tiles: u64,
}

/// `[cache]` section.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// `None` means [`default_cache_dir`].
    pub directory: Option<PathBuf>,
}

impl CacheSettings {
    /// Configured directory, or the platform default.
    pub fn directory_or_default(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(default_cache_dir)
    }
}

/// `[http]` section.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

/// Parsed configuration file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub layer: LayerSettings,
    pub offline: OfflineSettings,
    pub cache: CacheSettings,
    pub http: HttpSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            layer: LayerSettings {
                url: DEFAULT_URL_TEMPLATE.to_string(),
                subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                tile_size: DEFAULT_TILE_SIZE,
                tms: false,
                zoom_offset: 0,
                zoom_reverse: false,
                retina: false,
                values: HashMap::new(),
            },
            offline: OfflineSettings {
                min_zoom: DEFAULT_MIN_ZOOM,
                max_zoom: DEFAULT_MAX_ZOOM,
                progress: ProgressMode::default(),
                report_size: true,
                max_tiles: DEFAULT_MAX_TILES,
            },
            cache: CacheSettings { directory: None },
            http: HttpSettings {
                timeout: DEFAULT_TIMEOUT,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
        }
    }
}

impl ConfigFile {
    /// Loads the configuration from [`config_file_path`].
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads the configuration from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }

        if let Some(values) = ini.section(Some(VALUES_SECTION)) {
            for (name, value) in values.iter() {
                config
                    .layer
                    .values
                    .insert(name.to_string(), value.to_string());
            }
        }

        Ok(config)
    }

    /// Writes the configuration to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }

        let mut names: Vec<&String> = self.layer.values.keys().collect();
        names.sort();
        for name in names {
            ini.with_section(Some(VALUES_SECTION))
                .set(name.as_str(), self.layer.values[name].as_str());
        }

        ini.write_to_file(path)?;
        Ok(())
    }

    /// Builds a validated [`OfflineConfig`].
    pub fn to_offline_config(&self) -> Result<OfflineConfig, ConfigError> {
        let config = OfflineConfig {
            url_template: self.layer.url.clone(),
            subdomains: self.layer.subdomains.clone(),
            tile_size: self.layer.tile_size,
            min_zoom: self.offline.min_zoom,
            max_zoom: self.offline.max_zoom,
            tms: self.layer.tms,
            zoom_offset: self.layer.zoom_offset,
            zoom_reverse: self.layer.zoom_reverse,
            retina: self.layer.retina,
            template_values: self.layer.values.clone(),
            progress_mode: self.offline.progress,
            report_size_before_removal: self.offline.report_size,
            max_tiles: self.offline.max_tiles,
            request_timeout: self.http.timeout,
            user_agent: self.http.user_agent.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("nope.ini")).unwrap();
        assert_eq!(config.layer.url, DEFAULT_URL_TEMPLATE);
        assert_eq!(config.offline.max_zoom, 19);
        assert!(config.cache.directory.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(
            &path,
            "[layer]\nurl = https://{s}.t.example/{z}/{x}/{y}.png?k={apikey}\nsubdomains = 1234\n\n\
             [offline]\nmin_zoom = 13\nprogress = aggregate\n\n\
             [cache]\ndirectory = /tmp/tiles\n\n\
             [values]\napikey = secret\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.layer.subdomains, vec!["1", "2", "3", "4"]);
        assert_eq!(config.offline.min_zoom, 13);
        assert_eq!(config.offline.max_zoom, 19);
        assert_eq!(config.offline.progress, ProgressMode::Aggregate);
        assert_eq!(config.cache.directory, Some(PathBuf::from("/tmp/tiles")));
        assert_eq!(config.layer.values.get("apikey").map(String::as_str), Some("secret"));

        let offline = config.to_offline_config().unwrap();
        assert_eq!(offline.template_values.len(), 1);
        assert_eq!(offline.min_zoom, 13);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[offline]\nmax_zoom = lots\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "offline.max_zoom"));
    }

    #[test]
    fn test_save_then_load_preserves_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.offline.min_zoom = 12;
        config.layer.tms = true;
        config.http.timeout = Duration::from_secs(5);
        config
            .layer
            .values
            .insert("style".to_string(), "dark".to_string());
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded.offline.min_zoom, 12);
        assert!(loaded.layer.tms);
        assert_eq!(loaded.http.timeout, Duration::from_secs(5));
        assert_eq!(loaded.layer.values.get("style").map(String::as_str), Some("dark"));
    }

    #[test]
    fn test_inverted_zoom_range_fails_validation() {
        let mut config = ConfigFile::default();
        config.offline.min_zoom = 18;
        config.offline.max_zoom = 3;
        assert!(matches!(
            config.to_offline_config(),
            Err(ConfigError::ZoomRange { .. })
        ));
    }

    #[test]
    fn test_zoom_beyond_grid_fails_validation() {
        let mut config = ConfigFile::default();
        config.offline.max_zoom = 64;
        assert!(matches!(
            config.to_offline_config(),
            Err(ConfigError::ZoomTooHigh { max: 64, .. })
        ));
    }

    #[test]
    fn test_config_path_ends_with_app_file() {
        let path = config_file_path();
        assert!(path.ends_with("tilevault/config.ini"));
    }
}
