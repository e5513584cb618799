//! # 批量调度器
//!
//! 将转换请求展开为任务，在有界线程池中并行执行，并按完成顺序收集结果。
//!
//! ## 功能
//! - 请求校验与输出目录创建（失败时在任何转换开始前返回）
//! - 单文件 / 目录两种输入模式
//! - 线程池大小为 `min(max_workers, 任务数)`
//! - 每个任务只执行一次，失败（包括 panic）记录为失败结果，不重试
//! - 全部完成后输出一次汇总
//! - 运行中标记，阻止同一调度器上的重叠运行
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `batch/collector.rs` 收集文件，`batch/sink.rs` 输出状态
//! - 使用 `converters/` 执行单文件转换
//! - 使用 `rayon` 线程池，`utils/progress.rs` 创建进度条

use super::collector::FileCollector;
use super::sink::ProgressSink;
use crate::converters::renderer::panic_message;
use crate::converters::ConverterRegistry;
use crate::error::{EpsBatchError, Result};
use crate::models::{BatchSummary, ConversionRequest, ConversionResult, ConversionTask, PathMode};
use crate::utils::progress;

use indicatif::ProgressBar;
use std::collections::HashMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

/// 一次运行的全部结果
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// 按完成顺序排列的结果
    pub results: Vec<ConversionResult>,
    pub summary: BatchSummary,
}

impl BatchReport {
    /// 失败的结果
    pub fn failures(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// 批量调度器
pub struct BatchScheduler {
    registry: Arc<ConverterRegistry>,
    running: Arc<AtomicBool>,
    show_progress: bool,
}

impl BatchScheduler {
    /// 创建新的调度器
    pub fn new(registry: ConverterRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            running: Arc::new(AtomicBool::new(false)),
            show_progress: false,
        }
    }

    /// 是否在终端显示进度条
    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// 是否有运行正在进行
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// 在当前线程执行一次批量转换
    pub fn run(&self, request: ConversionRequest, sink: &dyn ProgressSink) -> Result<BatchReport> {
        let _guard = RunGuard::acquire(&self.running)?;
        let request = request.normalize();
        let plan = plan(&request, sink)?;
        execute(
            &self.registry,
            plan,
            request.max_workers,
            sink,
            self.show_progress,
        )
    }

    /// 在后台线程执行一次批量转换
    ///
    /// 请求校验在调用线程上同步完成，校验失败直接返回错误。
    pub fn spawn(
        &self,
        request: ConversionRequest,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<JoinHandle<Result<BatchReport>>> {
        let guard = RunGuard::acquire(&self.running)?;
        let request = request.normalize();
        let plan = plan(&request, sink.as_ref())?;

        let registry = Arc::clone(&self.registry);
        let show_progress = self.show_progress;

        thread::Builder::new()
            .name("epsbatch-scheduler".to_string())
            .spawn(move || {
                let _guard = guard;
                execute(
                    &registry,
                    plan,
                    request.max_workers,
                    sink.as_ref(),
                    show_progress,
                )
            })
            .map_err(|e| EpsBatchError::ThreadPool(e.to_string()))
    }
}

/// 运行中标记，离开作用域时自动清除
struct RunGuard {
    flag: Arc<AtomicBool>,
}

impl RunGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EpsBatchError::RunInProgress)?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// 待执行的任务与已判定失败的任务
struct Plan {
    tasks: Vec<ConversionTask>,
    /// 目标文件与先前任务重复，不会执行
    collisions: Vec<ConversionResult>,
}

/// 校验请求、准备输出目录并生成任务列表
fn plan(request: &ConversionRequest, sink: &dyn ProgressSink) -> Result<Plan> {
    let input = &request.input_path;

    if !input.exists() {
        return Err(EpsBatchError::InputNotFound {
            path: input.display().to_string(),
        });
    }

    if request.input_mode == PathMode::DirectoryBatch && !input.is_dir() {
        return Err(EpsBatchError::NotADirectory {
            path: input.display().to_string(),
        });
    }

    prepare_output(request, sink)?;

    let candidates = match request.input_mode {
        PathMode::SingleFile => vec![ConversionTask::new(
            input.clone(),
            request.destination_for(input),
            request.operation,
        )],
        PathMode::DirectoryBatch => FileCollector::new(input.clone())
            .with_extension(request.operation.source_extension())
            .collect()
            .into_iter()
            .map(|source| {
                let destination = request.destination_for(&source);
                ConversionTask::new(source, destination, request.operation)
            })
            .collect(),
    };

    if candidates.is_empty() {
        sink.emit(&format!(
            "No '.{}' files found in '{}'.",
            request.operation.source_extension(),
            input.display()
        ));
    }

    Ok(split_collisions(candidates))
}

/// 每个目标文件只保留第一个写入它的任务
///
/// 如 `foo.svg` 与 `foo.SVG` 都会映射到 `foo.eps`，后者记为失败。
fn split_collisions(candidates: Vec<ConversionTask>) -> Plan {
    let mut owners: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut tasks = Vec::with_capacity(candidates.len());
    let mut collisions = Vec::new();

    for task in candidates {
        match owners.get(task.destination()) {
            Some(owner) => {
                let cause = format!(
                    "destination collides with {}",
                    owner
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| owner.display().to_string())
                );
                collisions.push(ConversionResult::failure(task, &cause));
            }
            None => {
                owners.insert(task.destination().to_path_buf(), task.source().to_path_buf());
                tasks.push(task);
            }
        }
    }

    Plan { tasks, collisions }
}

/// 创建输出目录（目录模式）或输出文件的父目录（文件模式）
fn prepare_output(request: &ConversionRequest, sink: &dyn ProgressSink) -> Result<()> {
    let (dir, label) = match request.output_mode {
        PathMode::DirectoryBatch => (request.output_path.as_path(), "Output directory"),
        PathMode::SingleFile => match request.output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => (parent, "Output file directory"),
            _ => return Ok(()),
        },
    };

    if dir.is_dir() {
        return Ok(());
    }

    create_dir(dir)?;
    sink.emit(&format!("{} created: {}", label, dir.display()));
    Ok(())
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| EpsBatchError::OutputDirCreate {
        path: dir.display().to_string(),
        source: e,
    })
}

/// 在有界线程池中执行全部任务
fn execute(
    registry: &ConverterRegistry,
    plan: Plan,
    max_workers: usize,
    sink: &dyn ProgressSink,
    show_progress: bool,
) -> Result<BatchReport> {
    let Plan { tasks, collisions } = plan;
    let total = tasks.len();
    let mut results = Vec::with_capacity(total + collisions.len());

    for result in collisions {
        sink.emit(&result.message);
        results.push(result);
    }

    if total > 0 {
        let workers = max_workers.clamp(1, total);
        let pb = if show_progress {
            progress::create_progress_bar(total as u64, "Converting")
        } else {
            ProgressBar::hidden()
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("epsbatch-worker-{}", i))
            .build()
            .map_err(|e| EpsBatchError::ThreadPool(e.to_string()))?;

        let (tx, rx) = mpsc::channel();

        pool.scope(|scope| {
            for task in tasks {
                let tx = tx.clone();
                let pb = &pb;
                scope.spawn(move |_| {
                    let result = convert_one(registry, task);
                    pb.suspend(|| sink.emit(&result.message));
                    pb.inc(1);
                    // 接收端在 scope 结束前一直存在
                    let _ = tx.send(result);
                });
            }
        });
        drop(tx);

        results.extend(rx.iter());
        pb.finish_and_clear();
    }

    let summary = BatchSummary::from_results(&results);
    sink.emit(&format!("Process complete: {}.", summary));

    Ok(BatchReport { results, summary })
}

/// 执行单个任务，错误与 panic 都转换为失败结果
fn convert_one(registry: &ConverterRegistry, task: ConversionTask) -> ConversionResult {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| registry.convert(&task)));

    match outcome {
        Ok(Ok(())) => ConversionResult::success(task),
        Ok(Err(e)) => ConversionResult::failure(task, &e.to_string()),
        Err(payload) => ConversionResult::failure(
            task,
            &format!("Unexpected error: {}", panic_message(payload.as_ref())),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::sink::MemorySink;
    use crate::converters::Converter;
    use crate::models::Operation;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tempfile::TempDir;

    /// 把源文件内容加上前缀写入目标文件
    struct StampConverter {
        calls: AtomicUsize,
    }

    impl StampConverter {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Converter for StampConverter {
        fn name(&self) -> &str {
            "stamp"
        }

        fn convert(&self, task: &ConversionTask) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let content = fs::read_to_string(task.source()).map_err(|e| {
                EpsBatchError::RenderFailed(format!("cannot read source: {}", e))
            })?;
            fs::write(task.destination(), format!("converted:{}", content)).map_err(|e| {
                EpsBatchError::FileWriteError {
                    path: task.destination().display().to_string(),
                    source: e,
                }
            })
        }
    }

    /// 指定文件名失败（或 panic），其余成功
    struct FlakyConverter {
        fail_on: &'static str,
        panic_on: Option<&'static str>,
    }

    impl Converter for FlakyConverter {
        fn name(&self) -> &str {
            "flaky"
        }

        fn convert(&self, task: &ConversionTask) -> Result<()> {
            let name = task.source().file_name().unwrap().to_string_lossy();
            if Some(&*name) == self.panic_on {
                panic!("renderer crashed on {}", name);
            }
            if name == self.fail_on {
                return Err(EpsBatchError::RenderFailed("malformed input".to_string()));
            }
            Ok(())
        }
    }

    fn registry_with(converter: Arc<dyn Converter>) -> ConverterRegistry {
        ConverterRegistry::new()
            .register(Operation::VectorToEps, Arc::clone(&converter))
            .register(Operation::EpsToPdf, converter)
    }

    fn populate(dir: &Path, count: usize, ext: &str) {
        for i in 0..count {
            fs::write(dir.join(format!("figure_{:02}.{}", i, ext)), format!("body {}", i)).unwrap();
        }
    }

    fn dir_request(operation: Operation, input: &Path, output: &Path, workers: usize) -> ConversionRequest {
        ConversionRequest::new(operation, input.to_path_buf(), output.to_path_buf())
            .with_input_mode(PathMode::DirectoryBatch)
            .with_output_mode(PathMode::DirectoryBatch)
            .with_max_workers(workers)
    }

    #[test]
    fn test_all_succeed_for_any_worker_count() {
        let n = 6;
        for workers in 1..=n + 5 {
            let input = TempDir::new().unwrap();
            let output = TempDir::new().unwrap();
            populate(input.path(), n, "svg");

            let converter = Arc::new(StampConverter::new());
            let scheduler = BatchScheduler::new(registry_with(converter.clone()));
            let sink = MemorySink::new();

            let report = scheduler
                .run(dir_request(Operation::VectorToEps, input.path(), output.path(), workers), &sink)
                .unwrap();

            assert_eq!(report.summary.total_tasks, n);
            assert_eq!(report.summary.succeeded, n);
            assert_eq!(report.results.len(), n);
            assert!(report.results.iter().all(|r| r.is_success()));
            assert_eq!(converter.calls.load(Ordering::SeqCst), n);

            let lines = sink.lines();
            assert_eq!(lines.last().unwrap(), "Process complete: 6/6 conversions successful.");
            assert_eq!(lines.iter().filter(|l| l.ends_with("Conversion successful.")).count(), n);
        }
    }

    #[test]
    fn test_results_form_exact_task_set() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        populate(input.path(), 8, "eps");

        let scheduler = BatchScheduler::new(registry_with(Arc::new(StampConverter::new())));
        let report = scheduler
            .run(dir_request(Operation::EpsToPdf, input.path(), output.path(), 3), &MemorySink::new())
            .unwrap();

        let sources: HashSet<PathBuf> = report
            .results
            .iter()
            .map(|r| r.task.source().to_path_buf())
            .collect();
        let expected: HashSet<PathBuf> = (0..8)
            .map(|i| input.path().join(format!("figure_{:02}.eps", i)))
            .collect();
        assert_eq!(sources, expected);

        for result in &report.results {
            assert_eq!(result.task.destination().extension().unwrap(), "pdf");
            assert!(result.task.destination().starts_with(output.path()));
        }
    }

    #[test]
    fn test_no_matching_files() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("readme.txt"), "").unwrap();

        let converter = Arc::new(StampConverter::new());
        let scheduler = BatchScheduler::new(registry_with(converter.clone()));
        let sink = MemorySink::new();

        let report = scheduler
            .run(dir_request(Operation::VectorToEps, input.path(), output.path(), 4), &sink)
            .unwrap();

        assert_eq!(report.summary, BatchSummary::default());
        assert!(report.results.is_empty());
        assert_eq!(converter.calls.load(Ordering::SeqCst), 0);

        let lines = sink.lines();
        let not_found: Vec<_> = lines.iter().filter(|l| l.starts_with("No '.svg' files found")).collect();
        assert_eq!(not_found.len(), 1);
        assert_eq!(lines.last().unwrap(), "Process complete: 0/0 conversions successful.");
    }

    #[test]
    fn test_failure_is_isolated() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        populate(input.path(), 5, "eps");

        let scheduler = BatchScheduler::new(registry_with(Arc::new(FlakyConverter {
            fail_on: "figure_02.eps",
            panic_on: None,
        })));
        let sink = MemorySink::new();

        let report = scheduler
            .run(dir_request(Operation::EpsToPdf, input.path(), output.path(), 2), &sink)
            .unwrap();

        assert_eq!(report.summary.total_tasks, 5);
        assert_eq!(report.summary.succeeded, 4);

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].message,
            "Converting figure_02.eps -> figure_02.pdf: Error: malformed input"
        );
        assert_eq!(sink.lines().last().unwrap(), "Process complete: 4/5 conversions successful.");
    }

    #[test]
    fn test_panicking_converter_is_recorded_as_failure() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        populate(input.path(), 4, "svg");

        let scheduler = BatchScheduler::new(registry_with(Arc::new(FlakyConverter {
            fail_on: "",
            panic_on: Some("figure_01.svg"),
        })));

        let report = scheduler
            .run(dir_request(Operation::VectorToEps, input.path(), output.path(), 4), &MemorySink::new())
            .unwrap();

        assert_eq!(report.summary.total_tasks, 4);
        assert_eq!(report.summary.succeeded, 3);
        let failure = report.failures().next().unwrap();
        assert!(failure.message.contains("Unexpected error: renderer crashed on figure_01.svg"));
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_repeated_runs_are_independent() {
        let input = TempDir::new().unwrap();
        populate(input.path(), 4, "svg");

        let scheduler = BatchScheduler::new(registry_with(Arc::new(StampConverter::new())));

        let mut snapshots = Vec::new();
        for _ in 0..2 {
            let output = TempDir::new().unwrap();
            let report = scheduler
                .run(dir_request(Operation::VectorToEps, input.path(), output.path(), 2), &MemorySink::new())
                .unwrap();
            assert_eq!(report.summary.succeeded, 4);

            let mut files: Vec<(String, String)> = fs::read_dir(output.path())
                .unwrap()
                .map(|e| {
                    let path = e.unwrap().path();
                    (
                        path.file_name().unwrap().to_string_lossy().into_owned(),
                        fs::read_to_string(&path).unwrap(),
                    )
                })
                .collect();
            files.sort();
            snapshots.push(files);
        }

        assert_eq!(snapshots[0].len(), 4);
        assert_eq!(snapshots[0], snapshots[1]);
        assert_eq!(snapshots[0][0], ("figure_00.eps".to_string(), "converted:body 0".to_string()));
    }

    #[test]
    fn test_single_file_into_directory() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let source = input.path().join("logo.svg");
        fs::write(&source, "<svg/>").unwrap();
        let out_dir = output.path().join("converted");

        let scheduler = BatchScheduler::new(registry_with(Arc::new(StampConverter::new())));
        let sink = MemorySink::new();
        let request = ConversionRequest::new(Operation::VectorToEps, source, out_dir.clone())
            .with_output_mode(PathMode::DirectoryBatch);

        let report = scheduler.run(request, &sink).unwrap();

        assert_eq!(report.summary.total_tasks, 1);
        assert_eq!(report.summary.succeeded, 1);
        assert_eq!(
            fs::read_to_string(out_dir.join("logo.eps")).unwrap(),
            "converted:<svg/>"
        );
        let lines = sink.lines();
        assert_eq!(lines[0], format!("Output directory created: {}", out_dir.display()));
        assert_eq!(lines.last().unwrap(), "Process complete: 1/1 conversions successful.");
    }

    #[test]
    fn test_single_file_to_explicit_file() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let source = input.path().join("plot.eps");
        fs::write(&source, "%!PS").unwrap();
        let destination = output.path().join("nested").join("final.pdf");

        let scheduler = BatchScheduler::new(registry_with(Arc::new(StampConverter::new())));
        let sink = MemorySink::new();
        let request = ConversionRequest::new(Operation::EpsToPdf, source, destination.clone());

        let report = scheduler.run(request, &sink).unwrap();

        assert_eq!(report.results[0].task.destination(), destination.as_path());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "converted:%!PS");
        assert!(sink.lines()[0].starts_with("Output file directory created:"));
    }

    #[test]
    fn test_directory_input_forces_directory_output() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        populate(input.path(), 2, "svg");
        let out_dir = output.path().join("as-directory.eps");

        let scheduler = BatchScheduler::new(registry_with(Arc::new(StampConverter::new())));
        let request = ConversionRequest::new(
            Operation::VectorToEps,
            input.path().to_path_buf(),
            out_dir.clone(),
        )
        .with_input_mode(PathMode::DirectoryBatch)
        .with_output_mode(PathMode::SingleFile);

        let report = scheduler.run(request, &MemorySink::new()).unwrap();

        assert_eq!(report.summary.succeeded, 2);
        assert!(out_dir.is_dir());
        assert!(out_dir.join("figure_00.eps").is_file());
        assert!(out_dir.join("figure_01.eps").is_file());
    }

    #[test]
    fn test_missing_input_is_invalid_request() {
        let output = TempDir::new().unwrap();
        let converter = Arc::new(StampConverter::new());
        let scheduler = BatchScheduler::new(registry_with(converter.clone()));
        let sink = MemorySink::new();

        let request = dir_request(
            Operation::EpsToPdf,
            &output.path().join("nope"),
            output.path(),
            2,
        );
        let err = scheduler.run(request, &sink).unwrap_err();

        assert!(matches!(err, EpsBatchError::InputNotFound { .. }));
        assert!(err.is_invalid_request());
        assert!(sink.lines().is_empty());
        assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_file_given_as_directory_input_is_rejected() {
        let input = TempDir::new().unwrap();
        let source = input.path().join("single.svg");
        fs::write(&source, "").unwrap();

        let scheduler = BatchScheduler::new(registry_with(Arc::new(StampConverter::new())));
        let request = dir_request(Operation::VectorToEps, &source, input.path(), 1);

        let err = scheduler.run(request, &MemorySink::new()).unwrap_err();
        assert!(matches!(err, EpsBatchError::NotADirectory { .. }));
    }

    #[test]
    fn test_uncreatable_output_directory() {
        let input = TempDir::new().unwrap();
        populate(input.path(), 1, "svg");
        let blocker = input.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();

        let scheduler = BatchScheduler::new(registry_with(Arc::new(StampConverter::new())));
        let request = dir_request(
            Operation::VectorToEps,
            input.path(),
            &blocker.join("out"),
            1,
        );

        let err = scheduler.run(request, &MemorySink::new()).unwrap_err();
        assert!(matches!(err, EpsBatchError::OutputDirCreate { .. }));
    }

    #[test]
    fn test_overlapping_runs_are_refused() {
        let scheduler = BatchScheduler::new(ConverterRegistry::new());
        let _guard = RunGuard::acquire(&scheduler.running).unwrap();
        assert!(scheduler.is_running());

        let dir = TempDir::new().unwrap();
        let request = dir_request(Operation::EpsToPdf, dir.path(), dir.path(), 1);
        let err = scheduler.run(request, &MemorySink::new()).unwrap_err();
        assert!(matches!(err, EpsBatchError::RunInProgress));
    }

    #[test]
    fn test_spawn_runs_in_background() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        populate(input.path(), 3, "eps");

        let scheduler = BatchScheduler::new(registry_with(Arc::new(StampConverter::new())));
        let sink = Arc::new(MemorySink::new());

        let handle = scheduler
            .spawn(
                dir_request(Operation::EpsToPdf, input.path(), output.path(), 2),
                sink.clone(),
            )
            .unwrap();
        let report = handle.join().unwrap().unwrap();

        assert_eq!(report.summary.succeeded, 3);
        assert!(!scheduler.is_running());
        assert_eq!(sink.lines().last().unwrap(), "Process complete: 3/3 conversions successful.");
    }

    #[test]
    fn test_spawn_validates_synchronously() {
        let dir = TempDir::new().unwrap();
        let scheduler = BatchScheduler::new(ConverterRegistry::new());

        let result = scheduler.spawn(
            dir_request(Operation::EpsToPdf, &dir.path().join("missing"), dir.path(), 1),
            Arc::new(MemorySink::new()),
        );

        assert!(matches!(result, Err(EpsBatchError::InputNotFound { .. })));
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_unregistered_operation_fails_every_task() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        populate(input.path(), 3, "eps");

        let scheduler = BatchScheduler::new(ConverterRegistry::new());
        let report = scheduler
            .run(dir_request(Operation::EpsToPdf, input.path(), output.path(), 8), &MemorySink::new())
            .unwrap();

        assert_eq!(report.summary.total_tasks, 3);
        assert_eq!(report.summary.succeeded, 0);
        assert!(report
            .results
            .iter()
            .all(|r| r.message.contains("No backend available for EPS to PDF")));
    }

    /// 记录同时进行的转换数峰值及使用过的工作线程
    struct GaugeConverter {
        active: AtomicUsize,
        peak: AtomicUsize,
        threads: std::sync::Mutex<HashSet<String>>,
    }

    impl GaugeConverter {
        fn new() -> Self {
            Self {
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                threads: std::sync::Mutex::new(HashSet::new()),
            }
        }
    }

    impl Converter for GaugeConverter {
        fn name(&self) -> &str {
            "gauge"
        }

        fn convert(&self, _task: &ConversionTask) -> Result<()> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if let Some(name) = thread::current().name() {
                self.threads.lock().unwrap().insert(name.to_string());
            }
            thread::sleep(Duration::from_millis(30));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn run_with_gauge(files: usize, workers: usize) -> (BatchReport, Arc<GaugeConverter>) {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        populate(input.path(), files, "eps");

        let gauge = Arc::new(GaugeConverter::new());
        let scheduler = BatchScheduler::new(registry_with(gauge.clone()));
        let report = scheduler
            .run(dir_request(Operation::EpsToPdf, input.path(), output.path(), workers), &MemorySink::new())
            .unwrap();
        (report, gauge)
    }

    #[test]
    fn test_concurrency_never_exceeds_max_workers() {
        let (report, gauge) = run_with_gauge(12, 3);

        assert_eq!(report.summary.succeeded, 12);
        let peak = gauge.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 3, "peak concurrency {}", peak);

        let threads = gauge.threads.lock().unwrap();
        assert!(threads.len() <= 3);
        assert!(threads.iter().all(|t| t.starts_with("epsbatch-worker-")));
    }

    #[test]
    fn test_pool_is_capped_by_task_count() {
        let (report, gauge) = run_with_gauge(2, 16);

        assert_eq!(report.summary.total_tasks, 2);
        assert_eq!(report.summary.succeeded, 2);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 2);
        assert!(gauge.threads.lock().unwrap().len() <= 2);
    }

    #[test]
    fn test_duplicate_destinations_are_not_run() {
        let candidates = vec![
            ConversionTask::new(PathBuf::from("in/foo.SVG"), PathBuf::from("out/foo.eps"), Operation::VectorToEps),
            ConversionTask::new(PathBuf::from("in/foo.svg"), PathBuf::from("out/foo.eps"), Operation::VectorToEps),
            ConversionTask::new(PathBuf::from("in/bar.svg"), PathBuf::from("out/bar.eps"), Operation::VectorToEps),
        ];

        let plan = split_collisions(candidates);

        let kept: Vec<&Path> = plan.tasks.iter().map(|t| t.source()).collect();
        assert_eq!(kept, vec![Path::new("in/foo.SVG"), Path::new("in/bar.svg")]);
        assert_eq!(plan.collisions.len(), 1);
        assert_eq!(
            plan.collisions[0].message,
            "Converting foo.svg -> foo.eps: Error: destination collides with foo.SVG"
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_case_variants_sharing_a_stem_write_once() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("foo.svg"), "lower").unwrap();
        fs::write(input.path().join("foo.SVG"), "upper").unwrap();

        let converter = Arc::new(StampConverter::new());
        let scheduler = BatchScheduler::new(registry_with(converter.clone()));
        let sink = MemorySink::new();

        let report = scheduler
            .run(dir_request(Operation::VectorToEps, input.path(), output.path(), 2), &sink)
            .unwrap();

        assert_eq!(report.summary.total_tasks, 2);
        assert_eq!(report.summary.succeeded, 1);
        assert_eq!(converter.calls.load(Ordering::SeqCst), 1);

        let destinations: HashSet<&Path> = report
            .results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.task.destination())
            .collect();
        assert_eq!(destinations.len(), 1);

        // 排序后 foo.SVG 在前，先占用 foo.eps
        assert_eq!(
            fs::read_to_string(output.path().join("foo.eps")).unwrap(),
            "converted:upper"
        );
        let failure = report.failures().next().unwrap();
        assert!(failure.message.contains("destination collides with foo.SVG"));
        assert!(sink.lines().iter().any(|l| l == &failure.message));
        assert_eq!(sink.lines().last().unwrap(), "Process complete: 1/2 conversions successful.");
    }
}
