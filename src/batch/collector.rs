//! # 文件收集器
//!
//! 根据输入目录和扩展名收集待转换文件列表。
//!
//! ## 功能
//! - 仅扫描目录的直接子项，不递归
//! - 扩展名匹配不区分大小写
//! - 按路径排序，保证提交顺序确定
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入目录
    input: PathBuf,
    /// 文件名匹配模式，`None` 表示匹配全部
    pattern: Option<Pattern>,
}

impl FileCollector {
    /// 创建收集器，默认匹配所有文件
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            pattern: None,
        }
    }

    /// 只收集指定扩展名（不含点）的文件
    pub fn with_extension(mut self, extension: &str) -> Self {
        // 转义后的模式一定合法
        self.pattern = Pattern::new(&format!("*.{}", Pattern::escape(extension))).ok();
        self
    }

    /// 收集所有匹配的文件
    pub fn collect(&self) -> Vec<PathBuf> {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter(|e| self.matches(e.path(), &options))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        files
    }

    fn matches(&self, path: &Path, options: &MatchOptions) -> bool {
        let pattern = match &self.pattern {
            Some(pattern) => pattern,
            None => return true,
        };

        // 非 UTF-8 文件名按有损形式匹配，扩展名部分不受影响
        path.file_name()
            .map(|n| pattern.matches_with(&n.to_string_lossy(), *options))
            .unwrap_or(false)
    }
}
