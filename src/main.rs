//! # epsbatch 命令行入口
//!
//! ## 子命令
//! - `convert`  - 单文件或目录批量转换 (SVG -> EPS, EPS -> PDF)
//! - `backends` - 查看可用的外部转换程序

use clap::Parser;
use epsbatch::cli::Cli;
use epsbatch::commands;
use epsbatch::utils::output;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
