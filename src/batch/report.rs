//! # 运行报告导出
//!
//! 将每个任务的结果导出为 CSV，一行一个文件。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `csv` + `serde` 写入

use crate::error::{EpsBatchError, Result};
use crate::models::ConversionResult;

use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    source: String,
    destination: String,
    operation: String,
    outcome: String,
    message: &'a str,
}

impl<'a> From<&'a ConversionResult> for ReportRow<'a> {
    fn from(result: &'a ConversionResult) -> Self {
        Self {
            source: result.task.source().display().to_string(),
            destination: result.task.destination().display().to_string(),
            operation: result.task.operation().to_string(),
            outcome: result.outcome.to_string(),
            message: &result.message,
        }
    }
}

/// 导出结果为 CSV
pub fn to_csv(results: &[ConversionResult], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for result in results {
        wtr.serialize(ReportRow::from(result))?;
    }

    wtr.flush().map_err(|e| EpsBatchError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
