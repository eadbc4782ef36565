// アプリケーション設定（JSON設定ファイル）

use super::implementations::DefaultBatchConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// デフォルトのレコードファイル
pub const DEFAULT_STORE_PATH: &str = "records.json";

/// デフォルトのログレベル（`RUST_LOG` が優先される）
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// アプリケーション全体の設定
///
/// 設定ファイルに無い項目はデフォルト値になる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub log_level: String,
    pub batch: DefaultBatchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            batch: DefaultBatchConfig::default(),
        }
    }
}

impl AppConfig {
    /// 設定ファイルを読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Configuration file does not exist: {}", path.display());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// 設定ファイルがあれば読み込み、無ければデフォルト
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn with_store_path(mut self, store_path: impl Into<PathBuf>) -> Self {
        self.store_path = store_path.into();
        self
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.batch = self.batch.with_worker_count(worker_count);
        self
    }

    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.batch.validate()?;
        Ok(())
    }
}
