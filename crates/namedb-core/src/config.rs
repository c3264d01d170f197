//! namedb 统一配置
//!
//! 加载顺序：内置默认值 -> namedb.toml -> `NAMEDB__` 前缀的环境变量。

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_ENV_PREFIX, CONFIG_FILE_NAME, DEFAULT_DB_FILE};
use crate::error::{CoreError, Result};
use crate::filter::{NamePicker, Strategy};
use crate::telemetry::LogConfig;

/// The unified configuration, loaded from namedb.toml.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NamedbConfig {
    /// SQLite database file
    #[serde(default = "default_db_file")]
    pub db_file: PathBuf,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
}

impl Default for NamedbConfig {
    fn default() -> Self {
        Self {
            db_file: default_db_file(),
            telemetry: TelemetryConfig::default(),
            selection: SelectionConfig::default(),
        }
    }
}

impl NamedbConfig {
    /// 从指定路径或当前目录的 namedb.toml 加载配置，环境变量覆盖文件
    pub fn load_config(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(NamedbConfig::default()));

        // 文件层：显式路径优先（必须存在），否则尝试工作目录下 namedb.toml
        let mut base_dir: Option<PathBuf> = None;
        if let Some(p) = path {
            if !p.exists() {
                return Err(CoreError::config_error(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            base_dir = Some(p.parent().unwrap_or_else(|| Path::new(".")).to_path_buf());
            figment = figment.merge(Toml::file(p));
        } else {
            let default_path = Path::new(CONFIG_FILE_NAME);
            if default_path.exists() {
                figment = figment.merge(Toml::file(default_path));
            }
        }

        figment = figment.merge(Env::prefixed(CONFIG_ENV_PREFIX).split("__"));

        let mut cfg: NamedbConfig = figment.extract()?;

        if let Some(dir) = base_dir {
            cfg.resolve_relative_paths(&dir);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// 相对路径以配置文件所在目录为基准
    pub fn resolve_relative_paths(&mut self, base_dir: &Path) {
        if self.db_file.is_relative() {
            self.db_file = base_dir.join(&self.db_file);
        }
    }

    /// 验证配置参数的有效性
    pub fn validate(&self) -> Result<()> {
        if self.db_file.as_os_str().is_empty() {
            return Err(CoreError::config_error("db_file must not be empty"));
        }
        Ok(())
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default)]
    pub log_no_ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            log_no_ansi: false,
        }
    }
}

impl TelemetryConfig {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            format: self.log_format.clone(),
            no_ansi: self.log_no_ansi,
        }
    }
}

/// Random selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    /// index | scan
    #[serde(default)]
    pub strategy: Strategy,
    /// 固定随机种子；缺省时按当前时间播种
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SelectionConfig {
    pub fn picker(&self) -> NamePicker {
        match self.seed {
            Some(seed) => NamePicker::with_seed(self.strategy, seed),
            None => NamePicker::new(self.strategy),
        }
    }
}

fn default_db_file() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILE)
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}
