use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// User preferences and runtime settings for the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    /// Rows per page in list views.
    #[serde(default = "Config::default_page_size")]
    pub page_size: usize,
    /// Initial rows per page in the map finder.
    #[serde(default = "Config::default_page_size")]
    pub finder_page_size: usize,
    /// Seconds between background list refreshes.
    #[serde(default = "Config::default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    pub log_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Owner id used to scope saved finder filters.
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the JSON record store. Defaults to
    /// the platform data directory.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            page_size: Self::default_page_size(),
            finder_page_size: Self::default_page_size(),
            refresh_interval_secs: Self::default_refresh_interval_secs(),
            log_filter: None,
            user_id: None,
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_page_size() -> usize {
        10
    }

    pub fn default_refresh_interval_secs() -> u64 {
        20 * 60
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("CrmPortal")
    }

    /// Updates one setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        let value = value.trim();
        match key {
            "locale" => self.locale = value.to_string(),
            "currency" => self.currency = value.to_ascii_uppercase(),
            "ui_color_enabled" => {
                self.ui_color_enabled = value.parse().map_err(|_| invalid("expected true or false"))?
            }
            "page_size" => self.page_size = parse_positive(value).ok_or_else(|| invalid("expected a positive number"))?,
            "finder_page_size" => {
                self.finder_page_size = parse_positive(value)
                    .filter(|size| *size >= 10)
                    .ok_or_else(|| invalid("expected a number of at least 10"))?
            }
            "refresh_interval_secs" => {
                self.refresh_interval_secs = parse_positive(value)
                    .map(|secs| secs as u64)
                    .ok_or_else(|| invalid("expected a positive number of seconds"))?
            }
            "log_filter" => self.log_filter = non_empty(value),
            "user_id" => self.user_id = non_empty(value),
            "data_root" => self.data_root = non_empty(value).map(PathBuf::from),
            _ => return Err(invalid("unknown setting")),
        }
        Ok(())
    }
}

fn parse_positive(value: &str) -> Option<usize> {
    value.parse::<usize>().ok().filter(|n| *n > 0)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
