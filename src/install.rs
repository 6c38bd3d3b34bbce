use log::info;

use crate::config::Config;
use crate::error::PipelineError;
use crate::tool::{Invocation, ToolRunner};

/// Checks for the requirements manifest and installs it with pip.
pub fn ensure_requirements(config: &Config, runner: &dyn ToolRunner) -> Result<(), PipelineError> {
    let manifest = config.requirements_path();
    if !manifest.is_file() {
        return Err(PipelineError::MissingManifest(manifest));
    }

    if !config.install_requirements {
        info!("Skipping requirements installation.");
        return Ok(());
    }

    info!("Installing requirements...");
    let invocation = Invocation::new(&config.python)
        .args(["-m", "pip", "install", "-r"])
        .arg(&manifest)
        .current_dir(&config.base_dir);
    let output = runner.run(&invocation)?;
    if !output.success() {
        return Err(PipelineError::InstallFailed {
            code: output.code,
            stderr: output.stderr,
        });
    }

    info!("Requirements are up to date.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::tool::fake::FakeRunner;

    #[test]
    fn missing_manifest_is_fatal_and_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_| Ok(FakeRunner::ok("")));

        let err = ensure_requirements(&Config::new(dir.path()), &runner).unwrap_err();
        assert!(matches!(err, PipelineError::MissingManifest(_)));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn runs_pip_against_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("requirements.txt"), "decompyle3\n").unwrap();
        let runner = FakeRunner::new(|_| Ok(FakeRunner::ok("")));

        ensure_requirements(&Config::new(dir.path()), &runner).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].to_string().contains("-m pip install -r"));
        assert_eq!(calls[0].current_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn pip_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("requirements.txt"), "decompyle3\n").unwrap();
        let runner = FakeRunner::new(|_| Ok(FakeRunner::failed(1, "no network")));

        match ensure_requirements(&Config::new(dir.path()), &runner) {
            Err(PipelineError::InstallFailed { code, stderr }) => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "no network");
            }
            other => panic!("expected install failure, got {other:?}"),
        }
    }

    #[test]
    fn skip_install_still_requires_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new(dir.path());
        config.install_requirements = false;
        let runner = FakeRunner::new(|_| Ok(FakeRunner::ok("")));

        assert!(ensure_requirements(&config, &runner).is_err());

        fs::write(dir.path().join("requirements.txt"), "decompyle3\n").unwrap();
        ensure_requirements(&config, &runner).unwrap();
        assert!(runner.calls.borrow().is_empty());
    }
}
