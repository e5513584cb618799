//! # convert 子命令 CLI 定义
//!
//! 单文件或目录批量转换 (SVG -> EPS, EPS -> PDF)
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use crate::models::{default_workers, parse_max_workers, ConversionRequest, Operation, PathMode};

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 转换类型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OperationArg {
    /// SVG to EPS
    SvgToEps,
    /// EPS to PDF
    EpsToPdf,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::SvgToEps => Operation::VectorToEps,
            OperationArg::EpsToPdf => Operation::EpsToPdf,
        }
    }
}

/// 路径模式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ModeArg {
    File,
    Directory,
}

impl From<ModeArg> for PathMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::File => PathMode::SingleFile,
            ModeArg::Directory => PathMode::DirectoryBatch,
        }
    }
}

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Conversion to perform
    #[arg(short = 't', long, value_enum)]
    pub operation: OperationArg,

    /// Input file or directory
    #[arg(short, long)]
    pub input: PathBuf,

    /// Treat the input as a single file or a directory (default: detected from the path)
    #[arg(long, value_enum)]
    pub input_mode: Option<ModeArg>,

    /// Output file or directory
    #[arg(short, long)]
    pub output: PathBuf,

    /// Write to a single file or into a directory (forced to directory for directory input)
    #[arg(long, value_enum, default_value_t = ModeArg::File)]
    pub output_mode: ModeArg,

    /// Number of parallel conversions (invalid values fall back to the CPU count)
    #[arg(short, long, env = "EPSBATCH_JOBS")]
    pub jobs: Option<String>,

    /// Write a CSV report of every conversion to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl ConvertArgs {
    /// 输入模式：未指定时根据路径判断
    pub fn resolved_input_mode(&self) -> PathMode {
        match self.input_mode {
            Some(mode) => mode.into(),
            None if self.input.is_dir() => PathMode::DirectoryBatch,
            None => PathMode::SingleFile,
        }
    }

    /// 解析并行数，返回 (并行数, 是否回退到默认值)
    pub fn resolved_jobs(&self) -> (usize, bool) {
        match self.jobs.as_deref() {
            None => (default_workers(), false),
            Some(raw) => match parse_max_workers(raw) {
                Some(n) => (n, false),
                None => (default_workers(), true),
            },
        }
    }

    /// 构造转换请求（尚未规范化）
    pub fn to_request(&self) -> ConversionRequest {
        let (jobs, _) = self.resolved_jobs();
        ConversionRequest::new(
            self.operation.into(),
            self.input.clone(),
            self.output.clone(),
        )
        .with_input_mode(self.resolved_input_mode())
        .with_output_mode(self.output_mode.into())
        .with_max_workers(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> ConvertArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Convert(args) => args,
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_invalid_jobs_falls_back() {
        let args = parse(&[
            "epsbatch", "convert", "-t", "eps-to-pdf", "-i", "a.eps", "-o", "a.pdf", "-j", "lots",
        ]);
        assert_eq!(args.resolved_jobs(), (default_workers(), true));
        assert_eq!(args.to_request().max_workers, default_workers());
    }

    #[test]
    fn test_valid_jobs() {
        let args = parse(&[
            "epsbatch", "convert", "-t", "svg-to-eps", "-i", "a.svg", "-o", "a.eps", "--jobs", "3",
        ]);
        assert_eq!(args.resolved_jobs(), (3, false));
        let request = args.to_request();
        assert_eq!(request.operation, Operation::VectorToEps);
        assert_eq!(request.input_mode, PathMode::SingleFile);
        assert_eq!(request.output_mode, PathMode::SingleFile);
        assert_eq!(request.max_workers, 3);
    }

    #[test]
    fn test_directory_input_is_detected_and_forces_output_mode() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().to_string_lossy().into_owned();
        let args = parse(&[
            "epsbatch", "convert", "-t", "svg-to-eps", "-i", input.as_str(), "-o", "out", "--output-mode", "file",
        ]);

        let request = args.to_request().normalize();
        assert_eq!(request.input_mode, PathMode::DirectoryBatch);
        assert_eq!(request.output_mode, PathMode::DirectoryBatch);
    }
}
