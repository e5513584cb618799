//! # 批量处理模块
//!
//! 提供统一的文件批量转换能力。
//!
//! ## 功能
//! - 校验请求并收集待转换文件
//! - 有界并行执行
//! - 线程安全的进度输出与统计
//! - CSV 运行报告
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod report;
pub mod runner;
pub mod sink;

pub use collector::FileCollector;
pub use runner::{BatchReport, BatchScheduler};
pub use sink::{ChannelSink, MemorySink, ProgressSink};
