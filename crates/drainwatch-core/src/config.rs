use crate::error::{DrainError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Default distance for matching a report point to a drainage line
pub const DEFAULT_MATCH_THRESHOLD_METERS: f64 = 20.0;

/// Default maximum attachment size
pub const DEFAULT_ATTACHMENT_MAX_KB: usize = 2048;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Set programmatically by the embedding application
    Override,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Override => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Settings consumed by the report workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    /// Maximum point-to-line distance for a segment to count as matched
    pub match_threshold_meters: f64,
    /// Radius used by nearby search when the caller gives none; 0 means no filter
    pub nearby_default_radius_km: f64,
    /// Pre-populate associations by proximity when a submission names no segments
    pub auto_link_nearby: bool,
    pub attachment_max_kb: usize,
    pub attachment_extensions: Vec<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        LayeredConfig::with_defaults().workflow_config()
    }
}

/// Layered configuration for Drainwatch
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub match_threshold_meters: ConfigValue<f64>,
    pub nearby_default_radius_km: ConfigValue<f64>,
    pub auto_link_nearby: ConfigValue<bool>,
    pub attachment_max_kb: ConfigValue<usize>,
    pub attachment_extensions: ConfigValue<Vec<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            match_threshold_meters: ConfigValue::new(
                DEFAULT_MATCH_THRESHOLD_METERS,
                ConfigSource::Default,
            ),
            nearby_default_radius_km: ConfigValue::new(0.0, ConfigSource::Default),
            auto_link_nearby: ConfigValue::new(false, ConfigSource::Default),
            attachment_max_kb: ConfigValue::new(DEFAULT_ATTACHMENT_MAX_KB, ConfigSource::Default),
            attachment_extensions: ConfigValue::new(
                vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
                ConfigSource::Default,
            ),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| DrainError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| DrainError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(threshold) = file_config.match_threshold_meters {
            validate_threshold(threshold)?;
            self.match_threshold_meters.update(threshold, ConfigSource::File);
        }

        if let Some(radius) = file_config.nearby_default_radius_km {
            self.nearby_default_radius_km.update(radius, ConfigSource::File);
        }

        if let Some(auto_link) = file_config.auto_link_nearby {
            self.auto_link_nearby.update(auto_link, ConfigSource::File);
        }

        if let Some(max_kb) = file_config.attachment_max_kb {
            self.attachment_max_kb.update(max_kb, ConfigSource::File);
        }

        if let Some(extensions) = file_config.attachment_extensions {
            self.attachment_extensions.update(normalize_extensions(&extensions), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // DRAINWATCH_MATCH_THRESHOLD_METERS
        if let Ok(raw) = env::var("DRAINWATCH_MATCH_THRESHOLD_METERS") {
            match raw.parse::<f64>() {
                Ok(threshold) if validate_threshold(threshold).is_ok() => {
                    self.match_threshold_meters.update(threshold, ConfigSource::Environment)
                }
                _ => tracing::warn!(
                    "Invalid DRAINWATCH_MATCH_THRESHOLD_METERS value '{}': expected a positive number",
                    raw
                ),
            }
        }

        // DRAINWATCH_NEARBY_RADIUS_KM
        if let Ok(raw) = env::var("DRAINWATCH_NEARBY_RADIUS_KM") {
            match raw.parse::<f64>() {
                Ok(radius) => {
                    self.nearby_default_radius_km.update(radius, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid DRAINWATCH_NEARBY_RADIUS_KM value '{}': expected a number",
                    raw
                ),
            }
        }

        // DRAINWATCH_AUTO_LINK_NEARBY
        if let Ok(raw) = env::var("DRAINWATCH_AUTO_LINK_NEARBY") {
            match parse_bool(&raw) {
                Ok(flag) => self.auto_link_nearby.update(flag, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid DRAINWATCH_AUTO_LINK_NEARBY value '{}': expected true or false",
                    raw
                ),
            }
        }

        // DRAINWATCH_ATTACHMENT_MAX_KB
        if let Ok(raw) = env::var("DRAINWATCH_ATTACHMENT_MAX_KB") {
            match raw.parse::<usize>() {
                Ok(max_kb) => self.attachment_max_kb.update(max_kb, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid DRAINWATCH_ATTACHMENT_MAX_KB value '{}': expected an integer",
                    raw
                ),
            }
        }

        // DRAINWATCH_ATTACHMENT_EXTENSIONS (comma separated)
        if let Ok(raw) = env::var("DRAINWATCH_ATTACHMENT_EXTENSIONS") {
            let extensions: Vec<String> = raw.split(',').map(str::to_string).collect();
            self.attachment_extensions
                .update(normalize_extensions(&extensions), ConfigSource::Environment);
        }

        self
    }

    /// Apply programmatic overrides
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(threshold) = overrides.match_threshold_meters {
            self.match_threshold_meters.update(threshold, ConfigSource::Override);
        }

        if let Some(radius) = overrides.nearby_default_radius_km {
            self.nearby_default_radius_km.update(radius, ConfigSource::Override);
        }

        if let Some(auto_link) = overrides.auto_link_nearby {
            self.auto_link_nearby.update(auto_link, ConfigSource::Override);
        }

        if let Some(max_kb) = overrides.attachment_max_kb {
            self.attachment_max_kb.update(max_kb, ConfigSource::Override);
        }
    }

    /// Snapshot the resolved values for the workflow
    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            match_threshold_meters: self.match_threshold_meters.value,
            nearby_default_radius_km: self.nearby_default_radius_km.value,
            auto_link_nearby: self.auto_link_nearby.value,
            attachment_max_kb: self.attachment_max_kb.value,
            attachment_extensions: self.attachment_extensions.value.clone(),
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "match_threshold_meters".to_string(),
            (self.match_threshold_meters.value.to_string(), self.match_threshold_meters.source),
        );

        map.insert(
            "nearby_default_radius_km".to_string(),
            (self.nearby_default_radius_km.value.to_string(), self.nearby_default_radius_km.source),
        );

        map.insert(
            "auto_link_nearby".to_string(),
            (self.auto_link_nearby.value.to_string(), self.auto_link_nearby.source),
        );

        map.insert(
            "attachment_max_kb".to_string(),
            (self.attachment_max_kb.value.to_string(), self.attachment_max_kb.source),
        );

        map.insert(
            "attachment_extensions".to_string(),
            (self.attachment_extensions.value.join(","), self.attachment_extensions.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    match_threshold_meters: Option<f64>,
    nearby_default_radius_km: Option<f64>,
    auto_link_nearby: Option<bool>,
    attachment_max_kb: Option<usize>,
    attachment_extensions: Option<Vec<String>>,
}

/// Programmatic configuration overrides
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub match_threshold_meters: Option<f64>,
    pub nearby_default_radius_km: Option<f64>,
    pub auto_link_nearby: Option<bool>,
    pub attachment_max_kb: Option<usize>,
}

fn validate_threshold(value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DrainError::ConfigInvalid {
            key: "match_threshold_meters".to_string(),
            reason: format!("must be a positive number, got {}", value),
        })
    }
}

fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Parse a boolean flag from string
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(DrainError::ConfigInvalid {
            key: "flag".to_string(),
            reason: format!("Invalid boolean: {}. Use true or false", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.match_threshold_meters.value, 20.0);
        assert_eq!(config.match_threshold_meters.source, ConfigSource::Default);
        assert_eq!(config.nearby_default_radius_km.value, 0.0);
        assert!(!config.auto_link_nearby.value);
        assert_eq!(config.attachment_extensions.value, vec!["jpg", "jpeg", "png"]);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(20.0, ConfigSource::Default);

        value.update(25.0, ConfigSource::File);
        assert_eq!(value.value, 25.0);

        value.update(30.0, ConfigSource::Environment);
        assert_eq!(value.source, ConfigSource::Environment);

        value.update(35.0, ConfigSource::Override);
        assert_eq!(value.value, 35.0);

        // Lower precedence should not override
        value.update(40.0, ConfigSource::File);
        assert_eq!(value.value, 35.0);
        assert_eq!(value.source, ConfigSource::Override);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
match_threshold_meters = 35.5
nearby_default_radius_km = 0.5
auto_link_nearby = true
attachment_extensions = [".PNG", "webp"]
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.match_threshold_meters.value, 35.5);
        assert_eq!(config.match_threshold_meters.source, ConfigSource::File);
        assert_eq!(config.nearby_default_radius_km.value, 0.5);
        assert!(config.auto_link_nearby.value);
        assert_eq!(config.attachment_extensions.value, vec!["png", "webp"]);
        assert_eq!(config.attachment_max_kb.source, ConfigSource::Default);
    }

    #[test]
    fn test_file_rejects_non_positive_threshold() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "match_threshold_meters = 0.0").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(DrainError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_overrides_and_snapshot() {
        let mut config = LayeredConfig::with_defaults();
        config.apply_overrides(ConfigOverrides {
            match_threshold_meters: Some(50.0),
            auto_link_nearby: Some(true),
            ..Default::default()
        });

        let workflow = config.workflow_config();
        assert_eq!(workflow.match_threshold_meters, 50.0);
        assert!(workflow.auto_link_nearby);
        assert_eq!(workflow.attachment_max_kb, DEFAULT_ATTACHMENT_MAX_KB);
        assert_eq!(config.nearby_default_radius_km.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let map = LayeredConfig::with_defaults().to_inspection_map();
        let (value, source) = &map["match_threshold_meters"];
        assert_eq!(value, "20");
        assert_eq!(*source, ConfigSource::Default);
        assert!(map.contains_key("attachment_extensions"));
    }
}
