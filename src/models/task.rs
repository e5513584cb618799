//! # 转换任务与结果模型
//!
//! - `ConversionTask`: 单个源文件 -> 目标文件的转换单元，创建后不可变
//! - `ConversionResult`: 每个任务恰好产生一次的结果
//! - `BatchSummary`: 所有任务完成后的统计
//!
//! ## 依赖关系
//! - 被 `batch/` 和 `converters/` 使用
//! - 使用 `models/request.rs` 的 `Operation`

use super::request::Operation;

use std::fmt;
use std::path::{Path, PathBuf};

/// 单个转换任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    source: PathBuf,
    destination: PathBuf,
    operation: Operation,
}

impl ConversionTask {
    pub fn new(source: PathBuf, destination: PathBuf, operation: Operation) -> Self {
        Self {
            source,
            destination,
            operation,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// 日志前缀，如 `Converting a.svg -> a.eps: `
    fn log_prefix(&self) -> String {
        format!(
            "Converting {} -> {}: ",
            display_name(&self.source),
            display_name(&self.destination)
        )
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 任务结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Failure => write!(f, "failure"),
        }
    }
}

/// 单个任务的处理结果
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub task: ConversionTask,
    pub outcome: Outcome,
    /// 完整日志行（含源文件名、目标文件名与原因）
    pub message: String,
}

impl ConversionResult {
    pub fn success(task: ConversionTask) -> Self {
        let message = format!("{}Conversion successful.", task.log_prefix());
        Self {
            task,
            outcome: Outcome::Success,
            message,
        }
    }

    pub fn failure(task: ConversionTask, cause: &str) -> Self {
        let message = format!("{}Error: {}", task.log_prefix(), cause.trim());
        Self {
            task,
            outcome: Outcome::Failure,
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// 批次统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// 提交的任务数
    pub total_tasks: usize,
    /// 成功数量
    pub succeeded: usize,
}

impl BatchSummary {
    /// 从全部结果汇总
    pub fn from_results(results: &[ConversionResult]) -> Self {
        Self {
            total_tasks: results.len(),
            succeeded: results.iter().filter(|r| r.is_success()).count(),
        }
    }

    /// 失败数量
    pub fn failed(&self) -> usize {
        self.total_tasks - self.succeeded
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} conversions successful",
            self.succeeded, self.total_tasks
        )
    }
}
