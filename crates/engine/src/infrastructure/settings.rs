//! Layered application settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file
//! (`zoinkies.toml` or the path in `ZOINKIES_CONFIG`), then `ZOINKIES__*`
//! environment variables with `__` separating nested keys, e.g.
//! `ZOINKIES__SPATIAL__ZOOM=16`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use zoinkies_domain::{LocationCriteria, MinionTier, SpatialIndex, DEFAULT_FIELDS_TO_RETURN};

use crate::entities::{CatalogConfig, CooldownTable, SelectionPolicy};
use crate::infrastructure::playable_locations::DEFAULT_PLAYABLE_LOCATIONS_BASE_URL;
use crate::infrastructure::resilient_provider::RetryConfig;

pub const DEFAULT_CONFIG_FILE: &str = "zoinkies.toml";
const ENV_PREFIX: &str = "ZOINKIES";
const CONFIG_PATH_VAR: &str = "ZOINKIES_CONFIG";

/// Dotenv files read by [`load_dotenv_files`], highest precedence first.
pub const DOTENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Load `.env.local` then `.env` from `dir` into the process environment.
///
/// Variables already set are never overwritten, so `.env.local` wins over
/// `.env` and both lose to the real environment. Returns the files that were
/// read; unreadable files are skipped.
pub fn load_dotenv_files(dir: &Path) -> Vec<PathBuf> {
    DOTENV_FILES
        .iter()
        .map(|name| dir.join(name))
        .filter(|path| path.is_file())
        .filter(|path| dotenvy::from_path(path).is_ok())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Playable locations provider connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    /// Empty means no key is sent.
    pub api_key: String,
    /// Bound on one cell fetch, retries included.
    pub timeout_secs: u64,
    /// Bound on a single HTTP request.
    pub request_timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PLAYABLE_LOCATIONS_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 10,
            request_timeout_secs: 5,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialSettings {
    pub zoom: u8,
    pub max_cells: usize,
}

impl Default for SpatialSettings {
    fn default() -> Self {
        Self {
            zoom: SpatialIndex::DEFAULT_ZOOM,
            max_cells: SpatialIndex::DEFAULT_MAX_CELLS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub minion_tiers: Vec<MinionTier>,
    pub selection_policy: SelectionPolicy,
    pub max_per_category: Option<usize>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            minion_tiers: MinionTier::ALL.to_vec(),
            selection_policy: SelectionPolicy::default(),
            max_per_category: None,
        }
    }
}

/// Criteria applied when a request does not bring its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaSettings {
    pub game_object_type: i32,
    pub max_location_count: u32,
    pub fields_to_return: Vec<String>,
}

impl Default for CriteriaSettings {
    fn default() -> Self {
        let criteria = LocationCriteria::default();
        Self {
            game_object_type: criteria.game_object_type,
            max_location_count: criteria.max_location_count,
            fields_to_return: DEFAULT_FIELDS_TO_RETURN
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub spatial: SpatialSettings,
    pub catalog: CatalogSettings,
    pub respawn: CooldownTable,
    pub criteria: CriteriaSettings,
}

impl AppSettings {
    /// Load from the default file location and the process environment.
    pub fn load() -> Result<Self, SettingsError> {
        let path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(Some(&path), None)
    }

    /// Load from an explicit file and environment.
    ///
    /// `env` replaces the process environment when given, which keeps tests
    /// independent of the host.
    pub fn load_from(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, SettingsError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let settings: AppSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;

        tracing::info!(
            zoom = settings.spatial.zoom,
            max_cells = settings.spatial.max_cells,
            provider = %settings.provider.base_url,
            api_key_set = !settings.provider.api_key.is_empty(),
            "Settings loaded"
        );
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.spatial_index()?;
        self.default_criteria()?;
        if self.provider.timeout_secs == 0 || self.provider.request_timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "provider timeouts must be at least one second".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.provider.retry.jitter_factor) {
            return Err(SettingsError::Invalid(format!(
                "retry jitter_factor must be within 0..=1, got {}",
                self.provider.retry.jitter_factor
            )));
        }
        if self.catalog.max_per_category == Some(0) {
            return Err(SettingsError::Invalid(
                "catalog max_per_category must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn spatial_index(&self) -> Result<SpatialIndex, SettingsError> {
        SpatialIndex::new(self.spatial.zoom, self.spatial.max_cells)
            .map_err(|e| SettingsError::Invalid(e.to_string()))
    }

    pub fn default_criteria(&self) -> Result<LocationCriteria, SettingsError> {
        let mut criteria =
            LocationCriteria::new(self.criteria.game_object_type, self.criteria.max_location_count)
                .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        if !self.criteria.fields_to_return.is_empty() {
            criteria.fields_to_return = self.criteria.fields_to_return.clone();
        }
        Ok(criteria)
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            minion_tiers: self.catalog.minion_tiers.clone(),
            selection_policy: self.catalog.selection_policy,
            max_per_category: self.catalog.max_per_category,
            cooldowns: self.respawn.clone(),
            ..CatalogConfig::default()
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.request_timeout_secs)
    }
}
