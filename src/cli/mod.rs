//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `convert`: 批量转换 (SVG -> EPS, EPS -> PDF)
//! - `backends`: 列出外部转换程序的探测结果
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: convert, backends

pub mod backends;
pub mod convert;

use clap::{Parser, Subcommand};

/// epsbatch - SVG/EPS/PDF 批量转换工具
#[derive(Parser)]
#[command(name = "epsbatch")]
#[command(version)]
#[command(about = "Batch converter for SVG -> EPS and EPS -> PDF", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert a file or every matching file in a directory
    Convert(convert::ConvertArgs),

    /// Show which external converter backends are available
    Backends(backends::BackendsArgs),
}
