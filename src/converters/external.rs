//! # 外部程序后端
//!
//! 通过外部可执行程序完成单文件转换，每个文件启动一个进程并同步等待。
//!
//! ## 后端探测
//! 每种转换对应一个有序的 `Probe` 列表，取第一个能找到可执行文件的后端：
//! - EPS -> PDF: `epstopdf`，其次 Ghostscript（含程序目录下附带的 `ghostscript/`）
//! - SVG -> EPS: `rsvg-convert`，其次 `inkscape`
//!
//! 全部探测失败时返回 `BackendUnavailable`，并列出所有探测过的后端。
//!
//! ## 依赖关系
//! - 实现 `converters::Converter`
//! - 使用 `which` 在 PATH 中查找可执行文件

use super::Converter;
use crate::error::{EpsBatchError, Result};
use crate::models::{ConversionTask, Operation};

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// 根据 (源文件, 目标文件) 构造命令行参数
pub type ArgsBuilder = fn(&Path, &Path) -> Vec<OsString>;

/// 单个候选后端
#[derive(Clone)]
pub struct Probe {
    name: String,
    /// 按优先级排列的可执行文件名
    executables: Vec<String>,
    /// PATH 之外的额外查找目录
    search_dirs: Vec<PathBuf>,
    args: ArgsBuilder,
}

impl Probe {
    pub fn new(name: impl Into<String>, executables: &[&str], args: ArgsBuilder) -> Self {
        Self {
            name: name.into(),
            executables: executables.iter().map(|s| s.to_string()).collect(),
            search_dirs: Vec::new(),
            args,
        }
    }

    /// 添加额外查找目录（在 PATH 之后检查）
    pub fn with_search_dir(mut self, dir: PathBuf) -> Self {
        self.search_dirs.push(dir);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 查找可执行文件
    pub fn resolve(&self) -> Option<PathBuf> {
        for exe in &self.executables {
            if let Ok(path) = which::which(exe) {
                return Some(path);
            }
        }

        for dir in &self.search_dirs {
            for exe in &self.executables {
                let candidate = dir.join(format!("{}{}", exe, std::env::consts::EXE_SUFFIX));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        None
    }

    pub fn arguments(&self, source: &Path, destination: &Path) -> Vec<OsString> {
        (self.args)(source, destination)
    }
}

/// 外部程序转换器
pub struct ExternalConverter {
    operation: Operation,
    probes: Vec<Probe>,
}

impl ExternalConverter {
    pub fn new(operation: Operation, probes: Vec<Probe>) -> Self {
        Self { operation, probes }
    }

    /// EPS -> PDF: epstopdf，其次 Ghostscript
    pub fn eps_to_pdf() -> Self {
        Self::new(
            Operation::EpsToPdf,
            vec![
                Probe::new("epstopdf", &["epstopdf"], epstopdf_args),
                ghostscript_probe(),
            ],
        )
    }

    /// SVG -> EPS: rsvg-convert，其次 inkscape
    pub fn svg_to_eps() -> Self {
        Self::new(
            Operation::VectorToEps,
            vec![
                Probe::new("rsvg-convert", &["rsvg-convert"], rsvg_convert_args),
                Probe::new("inkscape", &["inkscape"], inkscape_args),
            ],
        )
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    /// 取第一个可用的后端
    pub fn resolve(&self) -> Result<(&Probe, PathBuf)> {
        self.probes
            .iter()
            .find_map(|probe| probe.resolve().map(|path| (probe, path)))
            .ok_or_else(|| EpsBatchError::BackendUnavailable {
                operation: self.operation.to_string(),
                probed: self
                    .probes
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl Converter for ExternalConverter {
    fn name(&self) -> &str {
        match self.operation {
            Operation::VectorToEps => "external svg-to-eps",
            Operation::EpsToPdf => "external eps-to-pdf",
        }
    }

    fn convert(&self, task: &ConversionTask) -> Result<()> {
        let (probe, program) = self.resolve()?;
        let args = probe.arguments(task.source(), task.destination());
        run_command(&program, probe.name(), &args)
    }
}

/// 运行外部命令并同步等待
///
/// stdin 为空，不允许交互；退出码非 0 时以 stderr 作为失败原因。
fn run_command(program: &Path, name: &str, args: &[OsString]) -> Result<()> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    hide_console_window(&mut cmd);

    let output = cmd.output().map_err(|e| EpsBatchError::CommandLaunch {
        command: name.to_string(),
        source: e,
    })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(EpsBatchError::CommandFailed {
        command: name.to_string(),
        status: match output.status.code() {
            Some(code) => format!("code {}", code),
            None => "no exit code".to_string(),
        },
        stderr: if stderr.is_empty() {
            "no error output".to_string()
        } else {
            stderr
        },
    })
}

#[cfg(windows)]
fn hide_console_window(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console_window(_cmd: &mut Command) {}

// ─────────────────────────────────────────────────────────────
// 各后端参数
// ─────────────────────────────────────────────────────────────

/// Ghostscript 可执行文件名，PATH 中的 `gs` 优先
#[cfg(windows)]
const GHOSTSCRIPT_EXECUTABLES: &[&str] = &["gs", "gswin64c", "gswin32c"];
#[cfg(not(windows))]
const GHOSTSCRIPT_EXECUTABLES: &[&str] = &["gs"];

fn ghostscript_probe() -> Probe {
    let mut probe = Probe::new("ghostscript", GHOSTSCRIPT_EXECUTABLES, ghostscript_args);
    for dir in bundled_ghostscript_dirs() {
        probe = probe.with_search_dir(dir);
    }
    probe
}

/// 程序所在目录下附带的 Ghostscript
fn bundled_ghostscript_dirs() -> Vec<PathBuf> {
    let exe_dir = match std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
    {
        Some(dir) => dir,
        None => return Vec::new(),
    };

    let bundled = exe_dir.join("ghostscript");
    vec![bundled.join("bin"), bundled]
}

fn prefixed(prefix: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(prefix);
    arg.push(path);
    arg
}

fn epstopdf_args(source: &Path, destination: &Path) -> Vec<OsString> {
    vec![source.into(), prefixed("--outfile=", destination)]
}

fn ghostscript_args(source: &Path, destination: &Path) -> Vec<OsString> {
    vec![
        "-dNOPAUSE".into(),
        "-dBATCH".into(),
        "-dEPSCrop".into(),
        "-sDEVICE=pdfwrite".into(),
        prefixed("-sOutputFile=", destination),
        source.into(),
    ]
}

fn rsvg_convert_args(source: &Path, destination: &Path) -> Vec<OsString> {
    vec![
        "-f".into(),
        "eps".into(),
        "-o".into(),
        destination.into(),
        source.into(),
    ]
}

fn inkscape_args(source: &Path, destination: &Path) -> Vec<OsString> {
    vec![
        source.into(),
        "--export-type=eps".into(),
        prefixed("--export-filename=", destination),
    ]
}
