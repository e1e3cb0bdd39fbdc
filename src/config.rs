use crate::filter::Filter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Saved filter '{name}' has no usable terms: '{raw}'")]
    InvalidSavedFilter { name: String, raw: String },
    #[error("Unknown saved filter '@{0}'")]
    UnknownSavedFilter(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Free-form label for the loaded profile.
    pub profile_name: String,
    pub defaults: DefaultRules,
    /// Named filter strings, referenced on the command line as `@name`.
    pub saved: BTreeMap<String, String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            profile_name: "base".to_string(),
            defaults: DefaultRules::default(),
            saved: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultRules {
    /// Meta keywords applied to every filter that does not set them itself.
    /// Criteria in this string are ignored.
    pub filter: String,
}

impl FilterConfig {
    /// The configured defaults, reduced to their meta keywords.
    pub fn default_filter(&self) -> Filter {
        let parsed = Filter::from_string(&self.defaults.filter);
        if !parsed.criteria().is_empty() {
            tracing::warn!(
                criteria = %parsed.criteria_string(),
                "ignoring criteria in default filter"
            );
        }
        Filter::new().merge_meta(&parsed)
    }

    /// Resolve a filter argument: `@name` looks up a saved filter, anything
    /// else is parsed as a filter string.
    pub fn resolve(&self, input: &str) -> Result<Filter, ConfigError> {
        match input.strip_prefix('@') {
            Some(name) => self
                .saved
                .get(name)
                .map(|raw| Filter::from_string(raw))
                .ok_or_else(|| ConfigError::UnknownSavedFilter(name.to_string())),
            None => Ok(Filter::from_string(input)),
        }
    }

    /// Every saved filter must parse to at least one term.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, raw) in &self.saved {
            if Filter::from_string(raw).is_empty() {
                return Err(ConfigError::InvalidSavedFilter {
                    name: name.clone(),
                    raw: raw.clone(),
                });
            }
        }
        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FilterConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<FilterConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    let config = toml::from_str::<FilterConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display.clone(),
        source,
    })?;
    config.validate()?;

    tracing::debug!(
        path = %path_display,
        profile = %config.profile_name,
        saved = config.saved.len(),
        "loaded config"
    );
    Ok(config)
}

pub fn default_config() -> &'static FilterConfig {
    static DEFAULT_CONFIG: LazyLock<FilterConfig> = LazyLock::new(FilterConfig::default);
    &DEFAULT_CONFIG
}
