//! # 转换器模块
//!
//! 定义单文件转换器接口 `Converter`，以及按转换类型查找转换器的 `ConverterRegistry`。
//!
//! ## 实现
//! - `renderer`: 进程内渲染器（捕获错误与 panic）
//! - `external`: 外部可执行程序（按顺序探测后端）
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 调用
//! - 使用 `models/` 的任务定义

pub mod external;
pub mod renderer;

pub use external::{ExternalConverter, Probe};
pub use renderer::{Renderer, RendererConverter};

use crate::error::{EpsBatchError, Result};
use crate::models::{ConversionTask, Operation};

use std::collections::HashMap;
use std::sync::Arc;

/// 单文件转换器
///
/// 每次调用只读写任务自身的源/目标路径，可被多个工作线程并发调用。
pub trait Converter: Send + Sync {
    /// 后端名称
    fn name(&self) -> &str;

    /// 转换单个文件
    fn convert(&self, task: &ConversionTask) -> Result<()>;
}

/// 转换器注册表
#[derive(Default, Clone)]
pub struct ConverterRegistry {
    converters: HashMap<Operation, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 默认注册表：两种转换均使用外部程序
    pub fn with_defaults() -> Self {
        Self::new()
            .register(Operation::VectorToEps, Arc::new(ExternalConverter::svg_to_eps()))
            .register(Operation::EpsToPdf, Arc::new(ExternalConverter::eps_to_pdf()))
    }

    /// 注册（或替换）某转换类型的转换器
    pub fn register(mut self, operation: Operation, converter: Arc<dyn Converter>) -> Self {
        self.converters.insert(operation, converter);
        self
    }

    /// 查找转换器
    pub fn resolve(&self, operation: Operation) -> Result<Arc<dyn Converter>> {
        self.converters
            .get(&operation)
            .cloned()
            .ok_or_else(|| EpsBatchError::BackendUnavailable {
                operation: operation.to_string(),
                probed: "no converter registered".to_string(),
            })
    }

    /// 查找并执行转换
    pub fn convert(&self, task: &ConversionTask) -> Result<()> {
        self.resolve(task.operation())?.convert(task)
    }
}
