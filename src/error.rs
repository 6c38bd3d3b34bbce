use std::path::PathBuf;

use crate::decompile::DecompilerKind;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("'{0}' not found, create it and add 'decompyle3'")]
    MissingManifest(PathBuf),
    #[error("failed to install requirements (exit code {code:?}): {stderr}")]
    InstallFailed { code: Option<i32>, stderr: String },
    #[error("no such file: {0}")]
    NoSuchFile(PathBuf),
    #[error("unpacker not found at: {0}")]
    MissingUnpacker(PathBuf),
    #[error("unpacker failed (exit code {code:?}):\n{stderr}")]
    UnpackFailed { code: Option<i32>, stderr: String },
    #[error("extraction directory was not created: {0}")]
    MissingExtraction(PathBuf),
    #[error("{kind} decompiler not found at: {path}")]
    MissingDecompiler { kind: DecompilerKind, path: PathBuf },
    #[error("{kind} exited with code {code:?}: {stderr}")]
    DecompileFailed {
        kind: DecompilerKind,
        code: Option<i32>,
        stderr: String,
    },
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}
