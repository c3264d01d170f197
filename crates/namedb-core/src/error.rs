//! 统一错误处理
//!
//! 过滤表达式本身永不报错；这里只覆盖协作方（存储、配置、IO）的失败。

use thiserror::Error;

/// 核心错误类型
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    // === 存储错误 ===
    #[error("Storage error: {message}")]
    Storage { message: String },

    // === 配置错误 ===
    #[error("Config error: {message}")]
    Config { message: String },

    // === IO 错误 ===
    #[error("IO error: {message}")]
    Io { message: String },

    // === 输入错误 ===
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// 创建存储错误
    pub fn storage(message: impl Into<String>) -> Self {
        CoreError::Storage {
            message: message.into(),
        }
    }

    /// 创建配置错误
    pub fn config_error(message: impl Into<String>) -> Self {
        CoreError::Config {
            message: message.into(),
        }
    }

    /// 创建输入错误
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        CoreError::Internal {
            message: message.into(),
        }
    }

    /// 存储层失败（调用方应视为致命错误）
    pub fn is_storage(&self) -> bool {
        matches!(self, CoreError::Storage { .. })
    }
}

/// Core 操作的 Result 类型别名
pub type Result<T> = std::result::Result<T, CoreError>;

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io {
            message: err.to_string(),
        }
    }
}

impl From<figment::Error> for CoreError {
    fn from(err: figment::Error) -> Self {
        CoreError::Config {
            message: err.to_string(),
        }
    }
}
