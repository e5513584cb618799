//! # 转换请求模型
//!
//! 描述一次批量转换的全部输入：转换类型、输入/输出模式、路径与并行度。
//!
//! 输入为目录时输出必须为目录，由 `ConversionRequest::normalize` 统一修正，
//! 而不是拒绝请求。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 和 `cli/convert.rs` 使用
//! - 使用 `num_cpus` 获取默认并行度

use std::fmt;
use std::path::{Path, PathBuf};

/// 转换类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// SVG -> EPS
    VectorToEps,
    /// EPS -> PDF
    EpsToPdf,
}

impl Operation {
    /// 所有支持的转换类型
    pub const ALL: [Operation; 2] = [Operation::VectorToEps, Operation::EpsToPdf];

    /// 源文件扩展名（不含点）
    pub fn source_extension(self) -> &'static str {
        match self {
            Operation::VectorToEps => "svg",
            Operation::EpsToPdf => "eps",
        }
    }

    /// 目标文件扩展名（不含点）
    pub fn target_extension(self) -> &'static str {
        match self {
            Operation::VectorToEps => "eps",
            Operation::EpsToPdf => "pdf",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::VectorToEps => write!(f, "SVG to EPS"),
            Operation::EpsToPdf => write!(f, "EPS to PDF"),
        }
    }
}

/// 路径模式：单文件或目录批量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    SingleFile,
    DirectoryBatch,
}

impl fmt::Display for PathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathMode::SingleFile => write!(f, "file"),
            PathMode::DirectoryBatch => write!(f, "directory"),
        }
    }
}

/// 一次批量转换请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub operation: Operation,
    pub input_mode: PathMode,
    pub input_path: PathBuf,
    pub output_mode: PathMode,
    pub output_path: PathBuf,
    /// 最大并行数，0 表示使用主机并行度
    pub max_workers: usize,
}

impl ConversionRequest {
    /// 创建单文件 -> 单文件请求，并行度取主机默认值
    pub fn new(operation: Operation, input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            operation,
            input_mode: PathMode::SingleFile,
            input_path,
            output_mode: PathMode::SingleFile,
            output_path,
            max_workers: default_workers(),
        }
    }

    pub fn with_input_mode(mut self, mode: PathMode) -> Self {
        self.input_mode = mode;
        self
    }

    pub fn with_output_mode(mut self, mode: PathMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// 规范化请求
    ///
    /// - 输入为目录时强制输出为目录
    /// - 并行度为 0 时回退到主机并行度
    pub fn normalize(mut self) -> Self {
        if self.input_mode == PathMode::DirectoryBatch {
            self.output_mode = PathMode::DirectoryBatch;
        }
        if self.max_workers == 0 {
            self.max_workers = default_workers();
        }
        self
    }

    /// 计算源文件对应的输出路径
    ///
    /// 目录输出时为 `<output>/<stem>.<target_ext>`，文件输出时直接使用输出路径。
    pub fn destination_for(&self, source: &Path) -> PathBuf {
        match self.output_mode {
            PathMode::SingleFile => self.output_path.clone(),
            PathMode::DirectoryBatch => {
                let stem = source
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "output".to_string());
                self.output_path.join(format!(
                    "{}.{}",
                    stem,
                    self.operation.target_extension()
                ))
            }
        }
    }
}

/// 主机默认并行度
pub fn default_workers() -> usize {
    num_cpus::get().max(1)
}

/// 解析用户输入的并行数
///
/// 非数字或 0 返回 `None`，由调用方回退到 `default_workers()`。
pub fn parse_max_workers(raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}
