//! # backends 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/backends.rs`

use super::convert::OperationArg;

use clap::Args;

/// backends 子命令参数
#[derive(Args, Debug)]
pub struct BackendsArgs {
    /// Only show backends for this conversion
    #[arg(short = 't', long, value_enum)]
    pub operation: Option<OperationArg>,
}
