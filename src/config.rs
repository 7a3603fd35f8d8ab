use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Custom title for header (defaults to the API host if not set)
  pub title: Option<String>,
  pub api: ApiConfig,
  pub cache: CacheConfig,
  pub ui: UiConfig,
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub base_url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:8000".to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// How long fetched data is served without refetching
  pub stale_time_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { stale_time_secs: 60 }
  }
}

impl CacheConfig {
  pub fn stale_time(&self) -> Duration {
    Duration::from_secs(self.stale_time_secs)
  }
}

/// Page shown at startup
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StartView {
  Dashboard,
  #[default]
  Employees,
  Jobtitles,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
  pub default_view: StartView,
  /// How long notifications stay on screen
  pub toast_secs: u64,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      default_view: StartView::default(),
      toast_secs: 4,
    }
  }
}

impl UiConfig {
  pub fn toast_ttl(&self) -> Duration {
    Duration::from_secs(self.toast_secs)
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// EnvFilter directive, overridden by STAFFDESK_LOG
  pub level: String,
  /// Log file path (default: <data_dir>/staffdesk/staffdesk.log)
  pub file: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      file: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./staffdesk.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/staffdesk/config.yaml
  ///
  /// Without a file the defaults are used. STAFFDESK_API_URL overrides
  /// `api.base_url` either way.
  pub fn load(explicit_path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match &path {
      Some(p) => Self::load_from_path(p)?,
      None => Config::default(),
    };

    if let Ok(url) = std::env::var("STAFFDESK_API_URL") {
      if !url.trim().is_empty() {
        config.api.base_url = url;
      }
    }

    Ok((config, path))
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("staffdesk.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("staffdesk").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty file is valid and means "all defaults"
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Header title: configured title, else the API host
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.title {
      return title.clone();
    }
    url::Url::parse(&self.api.base_url)
      .ok()
      .and_then(|u| {
        u.host_str().map(|host| match u.port() {
          Some(port) => format!("{}:{}", host, port),
          None => host.to_string(),
        })
      })
      .unwrap_or_else(|| self.api.base_url.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.api.base_url, "http://localhost:8000");
    assert_eq!(config.cache.stale_time(), Duration::from_secs(60));
    assert_eq!(config.ui.default_view, StartView::Employees);
    assert_eq!(config.ui.toast_ttl(), Duration::from_secs(4));
    assert_eq!(config.log.level, "info");
  }

  #[test]
  fn test_partial_file_keeps_defaults() {
    let config = Config::parse(
      "title: Acme HR\napi:\n  base_url: http://hr.internal:9000\nui:\n  default_view: dashboard\n",
    )
    .unwrap();
    assert_eq!(config.title.as_deref(), Some("Acme HR"));
    assert_eq!(config.api.base_url, "http://hr.internal:9000");
    assert_eq!(config.ui.default_view, StartView::Dashboard);
    assert_eq!(config.ui.toast_secs, 4);
    assert_eq!(config.cache.stale_time_secs, 60);
  }

  #[test]
  fn test_empty_file_is_default() {
    let config = Config::parse("\n").unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8000");
  }

  #[test]
  fn test_unknown_view_rejected() {
    assert!(Config::parse("ui:\n  default_view: payroll\n").is_err());
  }

  #[test]
  fn test_display_title() {
    let mut config = Config::default();
    assert_eq!(config.display_title(), "localhost:8000");

    config.api.base_url = "https://hr.example.com/api".to_string();
    assert_eq!(config.display_title(), "hr.example.com");

    config.title = Some("Acme HR".to_string());
    assert_eq!(config.display_title(), "Acme HR");
  }
}
