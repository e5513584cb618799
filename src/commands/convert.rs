//! # convert 命令实现
//!
//! 单文件或目录批量转换。
//!
//! ## 功能
//! - 构造并规范化转换请求
//! - 在后台线程运行批量调度器，终端实时输出每个文件的结果
//! - 失败文件汇总表
//! - 可选导出 CSV 报告
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `batch/`, `converters/`
//! - 使用 `utils/output.rs`

use crate::batch::{report, BatchReport, BatchScheduler, ProgressSink};
use crate::cli::convert::ConvertArgs;
use crate::converters::ConverterRegistry;
use crate::error::{EpsBatchError, Result};
use crate::utils::output;

use std::sync::Arc;
use tabled::{Table, Tabled};

/// 失败文件表格行
#[derive(Debug, Clone, Tabled)]
struct FailureRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// 终端输出
struct TerminalSink;

impl ProgressSink for TerminalSink {
    fn emit(&self, line: &str) {
        output::print_status(line);
    }
}

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    let request = args.to_request().normalize();

    output::print_header(&format!("Converting {}", request.operation));

    if let (jobs, true) = args.resolved_jobs() {
        output::print_warning(&format!(
            "Invalid worker count '{}', using {}",
            args.jobs.as_deref().unwrap_or_default(),
            jobs
        ));
    }

    output::print_info(&format!(
        "Input:  {} ({})",
        request.input_path.display(),
        request.input_mode
    ));
    output::print_info(&format!(
        "Output: {} ({})",
        request.output_path.display(),
        request.output_mode
    ));
    output::print_info(&format!("Workers: {}", request.max_workers));
    output::print_separator();

    let scheduler = BatchScheduler::new(ConverterRegistry::with_defaults()).with_progress_bar(true);
    let handle = scheduler.spawn(request, Arc::new(TerminalSink))?;
    let report = handle
        .join()
        .map_err(|_| EpsBatchError::Other("Scheduler thread panicked".to_string()))??;

    print_failures(&report);

    if let Some(ref report_path) = args.report {
        report::to_csv(&report.results, report_path)?;
        output::print_info(&format!("Report written to '{}'", report_path.display()));
    }

    Ok(())
}

fn print_failures(report: &BatchReport) {
    let rows: Vec<FailureRow> = report
        .failures()
        .map(|r| FailureRow {
            source: r.task.source().display().to_string(),
            destination: r.task.destination().display().to_string(),
            message: r.message.clone(),
        })
        .collect();

    if rows.is_empty() {
        return;
    }

    println!();
    output::print_warning(&format!("{} conversion(s) failed:", rows.len()));
    println!("{}", Table::new(&rows));
}
