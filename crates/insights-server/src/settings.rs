//! Runtime configuration, deserialised from `config.toml` and the
//! environment.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use insights_api::{PersistMode, service::DEFAULT_SAMPLE_ROWS};
use insights_core::assemble::AssemblyMode;
use insights_ingest::DEFAULT_PREVIEW_ROWS;
use insights_llm::LlmConfig;
use serde::Deserialize;

/// Environment variables override the file: `INSIGHTS_PORT=9000`,
/// `INSIGHTS_LLM__API_KEY=…`.
const ENV_PREFIX: &str = "INSIGHTS";

/// Read when `llm.api_key` is not configured.
pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// One JSON file per upload under `{data_dir}/insights`.
  #[default]
  Fs,
  /// `{data_dir}/insights.db`.
  Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub data_dir:     PathBuf,
  pub backend:      Backend,
  pub preview_rows: usize,
  pub sample_rows:  usize,
  pub persist:      PersistMode,
  pub assembly:     AssemblyMode,
  pub llm:          LlmConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:         "127.0.0.1".to_owned(),
      port:         8000,
      data_dir:     PathBuf::from("data"),
      backend:      Backend::default(),
      preview_rows: DEFAULT_PREVIEW_ROWS,
      sample_rows:  DEFAULT_SAMPLE_ROWS,
      persist:      PersistMode::default(),
      assembly:     AssemblyMode::default(),
      llm:          LlmConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Load `path` (optional) and then the `INSIGHTS_*` environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    let mut cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.resolve(std::env::var(API_KEY_VAR).ok());
    Ok(cfg)
  }

  /// Expand `~` in `data_dir` and fill an empty API key from `env_key`.
  fn resolve(&mut self, env_key: Option<String>) {
    self.data_dir = expand_tilde(&self.data_dir);
    if self.llm.api_key.is_empty()
      && let Some(key) = env_key
    {
      self.llm.api_key = key;
    }
  }

  pub fn uploads_dir(&self) -> PathBuf { self.data_dir.join("uploads") }

  pub fn insights_dir(&self) -> PathBuf { self.data_dir.join("insights") }

  pub fn database_path(&self) -> PathBuf { self.data_dir.join("insights.db") }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  fn from_toml(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_gives_defaults() {
    let cfg = from_toml("");
    assert_eq!(cfg.address(), "127.0.0.1:8000");
    assert_eq!(cfg.backend, Backend::Fs);
    assert_eq!(cfg.preview_rows, 5);
    assert_eq!(cfg.sample_rows, 20);
    assert_eq!(cfg.persist, PersistMode::Inline);
    assert_eq!(cfg.assembly, AssemblyMode::Structured);
    assert_eq!(cfg.llm.model, "tngtech/deepseek-r1t2-chimera:free");
  }

  #[test]
  fn nested_llm_table_and_modes() {
    let cfg = from_toml(
      r#"
        port = 9000
        data_dir = "/srv/insights"
        backend = "sqlite"
        persist = "background"
        assembly = "fallback"

        [llm]
        api_key = "sk-test"
        timeout_secs = 30
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.backend, Backend::Sqlite);
    assert_eq!(cfg.persist, PersistMode::Background);
    assert_eq!(cfg.assembly, AssemblyMode::Fallback);
    assert_eq!(cfg.llm.api_key, "sk-test");
    assert_eq!(cfg.llm.timeout_secs, Some(30));
    assert_eq!(cfg.llm.base_url, "https://openrouter.ai/api/v1");
    assert_eq!(cfg.database_path(), Path::new("/srv/insights/insights.db"));
    assert_eq!(cfg.uploads_dir(), Path::new("/srv/insights/uploads"));
  }

  #[test]
  fn env_key_only_fills_a_missing_key() {
    let mut cfg = from_toml("");
    cfg.resolve(Some("from-env".into()));
    assert_eq!(cfg.llm.api_key, "from-env");

    let mut cfg = from_toml("[llm]\napi_key = \"from-file\"");
    cfg.resolve(Some("from-env".into()));
    assert_eq!(cfg.llm.api_key, "from-file");
  }

  #[test]
  fn unknown_backend_is_rejected() {
    let result = config::Config::builder()
      .add_source(config::File::from_str("backend = \"redis\"", FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize::<ServerConfig>();
    assert!(result.is_err());
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/insights")),
      PathBuf::from(home).join("insights")
    );
    assert_eq!(expand_tilde(Path::new("/abs")), PathBuf::from("/abs"));
  }
}
