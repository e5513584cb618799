//! # backends 命令实现
//!
//! 按优先级列出每种转换的外部后端及其解析结果。
//!
//! ## 依赖关系
//! - 使用 `cli/backends.rs` 定义的参数
//! - 使用 `converters/external.rs`

use crate::cli::backends::BackendsArgs;
use crate::converters::ExternalConverter;
use crate::error::Result;
use crate::models::Operation;
use crate::utils::output;

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct BackendRow {
    #[tabled(rename = "Conversion")]
    operation: String,
    #[tabled(rename = "Priority")]
    priority: usize,
    #[tabled(rename = "Backend")]
    backend: String,
    #[tabled(rename = "Location")]
    location: String,
}

/// 执行 backends 命令
pub fn execute(args: BackendsArgs) -> Result<()> {
    output::print_header("Converter Backends");

    let operations: Vec<Operation> = match args.operation {
        Some(op) => vec![op.into()],
        None => Operation::ALL.to_vec(),
    };

    let mut rows = Vec::new();
    let mut missing = Vec::new();

    for operation in operations {
        let converter = external_for(operation);
        for (i, probe) in converter.probes().iter().enumerate() {
            rows.push(BackendRow {
                operation: operation.to_string(),
                priority: i + 1,
                backend: probe.name().to_string(),
                location: probe
                    .resolve()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "not found".to_string()),
            });
        }

        if let Err(e) = converter.resolve() {
            missing.push(e.to_string());
        }
    }

    println!("{}", Table::new(&rows));

    for msg in &missing {
        output::print_warning(msg);
    }
    if missing.is_empty() {
        output::print_success("Every conversion has at least one backend");
    }

    Ok(())
}

fn external_for(operation: Operation) -> ExternalConverter {
    match operation {
        Operation::VectorToEps => ExternalConverter::svg_to_eps(),
        Operation::EpsToPdf => ExternalConverter::eps_to_pdf(),
    }
}
