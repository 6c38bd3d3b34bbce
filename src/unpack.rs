use std::path::Path;
use std::sync::OnceLock;

use log::{info, warn};
use regex::Regex;

use crate::config::Config;
use crate::error::PipelineError;
use crate::tool::{Invocation, ToolRunner};
use crate::types::{Extraction, PythonVersion};

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Python version: (\d+)\.(\d+)").expect("version pattern is valid")
    })
}

/// First `Python version: X.Y` token in the unpacker log.
pub fn parse_python_version(log: &str) -> Option<PythonVersion> {
    let caps = version_pattern().captures(log)?;
    Some(PythonVersion::new(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
    ))
}

/// Runs the unpacker on `exe` and returns the extraction directory it created
/// together with the Python version it reported.
pub fn run_unpacker(
    config: &Config,
    runner: &dyn ToolRunner,
    exe: &Path,
    local_version: Option<PythonVersion>,
) -> Result<Extraction, PipelineError> {
    if !exe.is_file() {
        return Err(PipelineError::NoSuchFile(exe.to_path_buf()));
    }
    // the unpacker runs inside the base dir
    let exe = std::path::absolute(exe)?;
    let exe = exe.as_path();
    let name = exe.file_name().unwrap_or(exe.as_os_str()).to_string_lossy();
    info!("Extracting {name}...");

    let script = config.unpacker_path();
    if !script.is_file() {
        return Err(PipelineError::MissingUnpacker(script));
    }

    let invocation = Invocation::new(&config.python)
        .arg(&script)
        .arg(exe)
        .current_dir(&config.base_dir);
    let output = runner.run(&invocation)?;
    if !output.success() {
        return Err(PipelineError::UnpackFailed {
            code: output.code,
            stderr: output.stderr,
        });
    }

    for line in output.stdout.lines() {
        info!("{line}");
    }

    let version = parse_python_version(&output.stdout);
    match (version, local_version) {
        (Some(found), Some(local)) => {
            info!("EXE was built with Python {found}. You are using Python {local}.");
            if found != local {
                warn!("For best results, your local Python version should match the EXE's version!");
            }
        }
        (Some(found), None) => info!("EXE was built with Python {found}."),
        (None, _) => warn!("Could not determine Python version from extraction log."),
    }

    let dir = config.extraction_dir(exe);
    if !dir.is_dir() {
        return Err(PipelineError::MissingExtraction(dir));
    }

    Ok(Extraction { dir, version })
}
