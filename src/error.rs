use std::path::PathBuf;
use thiserror::Error;

/// 对账流程错误
///
/// 匹配核心本身不会失败 (无法确定的结果一律降级为跳过)，
/// 这里只覆盖配置和外围 I/O。
#[derive(Debug, Error)]
pub enum ReconError {
    /// 配置加载 / 反序列化失败
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    /// 阈值非法 (负数、NaN、超出范围)
    #[error("invalid threshold `{name}`: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    /// 配置结构不完整
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// 文件读写失败
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// 目录文件结构不符合预期
    #[error("catalog {}: {reason}", path.display())]
    Catalog { path: PathBuf, reason: String },

    /// 阻塞任务异常退出
    #[error("worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, ReconError>;
