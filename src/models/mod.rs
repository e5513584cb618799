//! # 数据模型模块
//!
//! 定义转换请求、转换任务与结果统计的数据模型。
//!
//! ## 依赖关系
//! - 被 `batch/`, `converters/` 和 `commands/` 使用
//! - 子模块: request, task

pub mod request;
pub mod task;

pub use request::{default_workers, parse_max_workers, ConversionRequest, Operation, PathMode};
pub use task::{BatchSummary, ConversionResult, ConversionTask, Outcome};
