//! # 进程内渲染器后端
//!
//! 将任意 `Renderer` 包装为 `Converter`。渲染器返回的错误和 panic
//! 都在此处被捕获并转换为 `RenderFailed`，不会越过转换器边界。
//!
//! ## 依赖关系
//! - 实现 `converters::Converter`

use super::Converter;
use crate::error::{EpsBatchError, Result};
use crate::models::ConversionTask;

use std::any::Any;
use std::error::Error;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// 渲染器返回的错误类型
pub type RenderError = Box<dyn Error + Send + Sync>;

/// 进程内渲染器：读取源文件并写出目标文件
pub trait Renderer: Send + Sync {
    fn render(&self, source: &Path, destination: &Path) -> std::result::Result<(), RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&Path, &Path) -> std::result::Result<(), RenderError> + Send + Sync,
{
    fn render(&self, source: &Path, destination: &Path) -> std::result::Result<(), RenderError> {
        self(source, destination)
    }
}

/// 基于进程内渲染器的转换器
pub struct RendererConverter<R> {
    name: String,
    renderer: R,
}

impl<R: Renderer> RendererConverter<R> {
    pub fn new(name: impl Into<String>, renderer: R) -> Self {
        Self {
            name: name.into(),
            renderer,
        }
    }
}

impl<R: Renderer> Converter for RendererConverter<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn convert(&self, task: &ConversionTask) -> Result<()> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.renderer.render(task.source(), task.destination())
        }));

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(EpsBatchError::RenderFailed(e.to_string())),
            Err(payload) => Err(EpsBatchError::RenderFailed(format!(
                "{} panicked: {}",
                self.name,
                panic_message(payload.as_ref())
            ))),
        }
    }
}

/// 从 panic 载荷中提取可读信息
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
