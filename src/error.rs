//! # 统一错误处理模块
//!
//! 定义 epsbatch 的所有错误类型，使用 `thiserror` 派生。
//!
//! 错误分为两类：
//! - 请求错误（`InvalidRequest` 类）：在任何转换开始之前同步返回，终止整个批次
//! - 转换错误（`ConversionFailure` 类）：仅影响单个任务，记录为失败结果
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// epsbatch 统一错误类型
#[derive(Error, Debug)]
pub enum EpsBatchError {
    // ─────────────────────────────────────────────────────────────
    // 请求错误
    // ─────────────────────────────────────────────────────────────
    #[error("Input path '{path}' does not exist")]
    InputNotFound { path: String },

    #[error("Input path '{path}' is not a directory")]
    NotADirectory { path: String },

    #[error("Could not create output directory '{path}': {source}")]
    OutputDirCreate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("A conversion run is already in progress")]
    RunInProgress,

    // ─────────────────────────────────────────────────────────────
    // 转换错误
    // ─────────────────────────────────────────────────────────────
    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to launch {command}: {source}")]
    CommandLaunch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    RenderFailed(String),

    #[error("No backend available for {operation} (probed: {probed})")]
    BackendUnavailable { operation: String, probed: String },

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(String),

    #[error("{0}")]
    Other(String),
}

impl EpsBatchError {
    /// 是否为批次开始前的请求校验错误
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            EpsBatchError::InputNotFound { .. }
                | EpsBatchError::NotADirectory { .. }
                | EpsBatchError::OutputDirCreate { .. }
                | EpsBatchError::RunInProgress
        )
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, EpsBatchError>;
