use serde::Deserialize;
use std::path::PathBuf;

use crate::api::TransportKind;
use crate::error::SearchError;

fn default_buffer_m() -> f64 {
    500.0
}
fn default_area_half_size_deg() -> f64 {
    0.45
}
fn default_verbose() -> bool {
    false
}

#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub places: bool,
    /// Distance in meters a place may lie from the roadway
    #[serde(default = "default_buffer_m")]
    pub buffer_m: f64,
    /// Half the side of the square search box around the city, in degrees
    #[serde(default = "default_area_half_size_deg")]
    pub area_half_size_deg: f64,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub overpass: Option<OverpassConfig>,
    #[serde(default)]
    pub nominatim: Option<NominatimConfig>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            output: None,
            places: false,
            buffer_m: default_buffer_m(),
            area_half_size_deg: default_area_half_size_deg(),
            verbose: default_verbose(),
            overpass: None,
            nominatim: None,
        }
    }
}

fn default_primary_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_mirror_url() -> String {
    "https://overpass.kumi.systems/api/interpreter".to_string()
}

fn default_timeout_secs() -> u64 {
    90
}

fn default_server_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverpassConfig {
    #[serde(default = "default_primary_url")]
    pub primary: String,
    #[serde(default = "default_mirror_url")]
    pub mirror: String,
    #[serde(default)]
    pub transport: TransportKind,
    /// Client-side request timeout; keep above `server_timeout_secs`
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Value of the `[timeout:]` setting in generated queries
    #[serde(default = "default_server_timeout_secs")]
    pub server_timeout_secs: u64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_url(),
            mirror: default_mirror_url(),
            transport: TransportKind::default(),
            timeout_secs: default_timeout_secs(),
            server_timeout_secs: default_server_timeout_secs(),
        }
    }
}

fn default_search_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_reverse_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct NominatimConfig {
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_reverse_url")]
    pub reverse_url: String,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            reverse_url: default_reverse_url(),
        }
    }
}

/// Accept only finite values above zero
pub fn require_positive(name: &str, value: f64) -> Result<f64, SearchError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SearchError::InvalidInput(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}

impl FileConfig {
    /// Check numeric settings that would otherwise fail silently later
    pub fn validate(&self) -> Result<(), SearchError> {
        require_positive("buffer_m", self.buffer_m)?;
        require_positive("area_half_size_deg", self.area_half_size_deg)?;
        Ok(())
    }

    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("roadsearch.toml"));
    paths.push(PathBuf::from(".roadsearch.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("roadsearch").join("config.toml"));
        paths.push(config_dir.join("roadsearch.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".roadsearch.toml"));
        paths.push(home.join(".config").join("roadsearch").join("config.toml"));
    }

    paths
}
