//! # 进度输出通道
//!
//! `ProgressSink` 接收人类可读的状态行，供外部界面显示。
//! 多个工作线程会同时调用 `emit`，每一行必须完整送达，不可拆分或丢失。
//!
//! ## 实现
//! - `ChannelSink`: 基于 `mpsc` 的多生产者单消费者队列
//! - `MemorySink`: 加锁的内存日志，便于嵌入方与测试读取
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 写入
//! - 被 `commands/convert.rs` 实现终端输出

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};

/// 线程安全、只追加的状态行通道
pub trait ProgressSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// 基于 mpsc 通道的输出
pub struct ChannelSink {
    tx: Sender<String>,
}

impl ChannelSink {
    /// 创建通道，返回 (发送端, 接收端)
    pub fn new() -> (Self, Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, line: &str) {
        // 接收端已关闭时丢弃
        let _ = self.tx.send(line.to_string());
    }
}

/// 内存日志
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前所有日志行的副本
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProgressSink for MemorySink {
    fn emit(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}
