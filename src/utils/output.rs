//! # 美化输出工具
//!
//! 提供统一的终端输出样式。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `colored` crate

use colored::Colorize;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印转换失败消息
pub fn print_failure(msg: &str) {
    println!("{} {}", "[FAIL]".red().bold(), msg);
}

/// 转换状态行的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Failure,
    Summary,
    Warning,
    Info,
}

impl StatusKind {
    /// 汇总行与逐文件输出之间空一行
    pub fn leading_blank_line(self) -> bool {
        self == StatusKind::Summary
    }
}

/// 按内容判断状态行类别
pub fn status_kind(line: &str) -> StatusKind {
    if line.contains(": Error: ") {
        StatusKind::Failure
    } else if line.ends_with("Conversion successful.") {
        StatusKind::Success
    } else if line.starts_with("Process complete:") {
        StatusKind::Summary
    } else if line.starts_with("No '") {
        StatusKind::Warning
    } else {
        StatusKind::Info
    }
}

/// 按内容为转换状态行选择样式
pub fn print_status(line: &str) {
    let kind = status_kind(line);
    if kind.leading_blank_line() {
        println!();
    }
    match kind {
        StatusKind::Failure => print_failure(line),
        StatusKind::Success => print_success(line),
        StatusKind::Summary => print_done(line),
        StatusKind::Warning => print_warning(line),
        StatusKind::Info => print_info(line),
    }
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}
