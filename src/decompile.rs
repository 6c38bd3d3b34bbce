use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use crate::config::Config;
use crate::error::PipelineError;
use crate::interpreter::Interpreter;
use crate::tool::{Invocation, ToolRunner};
use crate::types::{DecompileReport, PythonVersion};

const BYTECODE_EXT: &str = "pyc";
const SOURCE_EXT: &str = "py";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompilerKind {
    Pycdc,
    Decompyle3,
}

/// How a decompiler hands back the recovered source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Takes the bytecode path, prints source to stdout.
    Stdout,
    /// Takes the bytecode file name and writes the source next to it.
    Alongside,
}

impl DecompilerKind {
    pub fn output_mode(self) -> OutputMode {
        match self {
            DecompilerKind::Pycdc => OutputMode::Stdout,
            DecompilerKind::Decompyle3 => OutputMode::Alongside,
        }
    }

    pub fn executable(self, config: &Config, interpreter: &Interpreter) -> PathBuf {
        match self {
            DecompilerKind::Pycdc => config.pycdc_path(),
            DecompilerKind::Decompyle3 => interpreter.script_path("decompyle3"),
        }
    }
}

impl Display for DecompilerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecompilerKind::Pycdc => write!(f, "pycdc"),
            DecompilerKind::Decompyle3 => write!(f, "decompyle3"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionMatch {
    Exact(PythonVersion),
    Any,
}

impl VersionMatch {
    pub fn matches(&self, version: Option<&PythonVersion>) -> bool {
        match self {
            VersionMatch::Exact(wanted) => version == Some(wanted),
            VersionMatch::Any => true,
        }
    }
}

/// Checked top to bottom, first match wins.
pub const DECOMPILERS: &[(VersionMatch, DecompilerKind)] = &[
    (
        VersionMatch::Exact(PythonVersion::new(3, 13)),
        DecompilerKind::Pycdc,
    ),
    (VersionMatch::Any, DecompilerKind::Decompyle3),
];

pub fn select_decompiler(version: Option<&PythonVersion>) -> DecompilerKind {
    DECOMPILERS
        .iter()
        .find(|(rule, _)| rule.matches(version))
        .map(|(_, kind)| *kind)
        .unwrap_or(DecompilerKind::Decompyle3)
}

pub struct Decompile<'a> {
    runner: &'a dyn ToolRunner,
    kind: DecompilerKind,
    executable: PathBuf,
}

impl<'a> Decompile<'a> {
    pub fn new(runner: &'a dyn ToolRunner, kind: DecompilerKind, executable: PathBuf) -> Self {
        Self {
            runner,
            kind,
            executable,
        }
    }

    /// Decompiles one `.pyc`, leaving the `.py` beside it.
    pub fn decompile(&self, pyc: &Path) -> Result<(), PipelineError> {
        let source = pyc.with_extension(SOURCE_EXT);
        let output = match self.kind.output_mode() {
            OutputMode::Stdout => {
                let output = self.runner.run(&Invocation::new(&self.executable).arg(pyc))?;
                if output.success() {
                    fs::write(&source, &output.stdout)?;
                }
                output
            }
            OutputMode::Alongside => {
                let (dir, name) = match (pyc.parent(), pyc.file_name()) {
                    (Some(dir), Some(name)) => (dir, name),
                    _ => return Err(io::Error::from(io::ErrorKind::InvalidInput).into()),
                };
                let invocation = Invocation::new(&self.executable)
                    .arg(name)
                    .current_dir(dir);
                let output = self.runner.run(&invocation)?;
                // a failed run may still leave partial source behind
                if !output.success() && source.is_file() {
                    fs::remove_file(&source)?;
                }
                output
            }
        };

        if output.success() {
            Ok(())
        } else {
            Err(PipelineError::DecompileFailed {
                kind: self.kind,
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

/// Decompiles every `.pyc` under `extracted` with the decompiler chosen for
/// `version`, then moves each recovered `.py` into `out_dir` at the same
/// relative path. `out_dir` is emptied first.
pub fn decompile_and_move(
    config: &Config,
    interpreter: &Interpreter,
    runner: &dyn ToolRunner,
    extracted: &Path,
    out_dir: &Path,
    version: Option<PythonVersion>,
) -> Result<DecompileReport, PipelineError> {
    match version {
        Some(v) => info!("Decompiling source files for Python {v}..."),
        None => info!("Decompiling source files for Python unknown..."),
    }
    recreate_dir(out_dir)?;

    let kind = select_decompiler(version.as_ref());
    let executable = kind.executable(config, interpreter);
    info!("Using {kind} decompiler.");
    if !executable.is_file() {
        return Err(PipelineError::MissingDecompiler {
            kind,
            path: executable,
        });
    }

    let decompiler = Decompile::new(runner, kind, executable);
    let mut report = DecompileReport {
        decompiler: kind,
        succeeded: 0,
        failed: 0,
        relocated: 0,
        unmoved: 0,
    };

    for pyc in collect_files(extracted, BYTECODE_EXT)? {
        match decompiler.decompile(&pyc) {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                debug!("failed on {}: {e}", pyc.display());
                report.failed += 1;
            }
        }
    }
    info!("Decompilation finished: {report}.");

    for py in collect_files(extracted, SOURCE_EXT)? {
        let relative = py.strip_prefix(extracted).unwrap_or(&py);
        let target = out_dir.join(relative);
        match relocate(&py, &target) {
            Ok(()) => report.relocated += 1,
            Err(e) => {
                error!("Failed to move {} to {}: {e}", py.display(), target.display());
                report.unmoved += 1;
            }
        }
    }

    if !report.is_success() {
        error!("No file could be decompiled with {kind}.");
    }
    Ok(report)
}

fn recreate_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

/// Every file below `root` with extension `ext`, sorted.
fn collect_files(root: &Path, ext: &str) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|e| e == ext) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

fn relocate(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    move_file(from, to)
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // rename fails across devices
    fs::copy(from, to)?;
    fs::remove_file(from)
}
