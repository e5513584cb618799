//! # epsbatch - SVG/EPS/PDF 批量转换
//!
//! 将单个文件或整个目录中的 SVG 转换为 EPS、EPS 转换为 PDF，
//! 在有界线程池中并行调用转换后端，逐个报告结果并输出汇总。
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/         (命令行参数定义)
//!   ├── commands/    (命令执行逻辑)
//!   │     ├── batch/      (调度、文件收集、进度输出、报告)
//!   │     ├── converters/ (单文件转换后端)
//!   │     └── models/     (请求、任务与结果)
//!   ├── utils/       (输出与进度条)
//!   └── error.rs     (错误处理)
//! ```

pub mod batch;
pub mod cli;
pub mod commands;
pub mod converters;
pub mod error;
pub mod models;
pub mod utils;

pub use batch::{BatchReport, BatchScheduler, ChannelSink, MemorySink, ProgressSink};
pub use converters::{Converter, ConverterRegistry, ExternalConverter, RendererConverter};
pub use error::{EpsBatchError, Result};
pub use models::{BatchSummary, ConversionRequest, ConversionResult, ConversionTask, Operation, Outcome, PathMode};
