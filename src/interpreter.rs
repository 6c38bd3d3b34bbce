use std::path::{Path, PathBuf};

use log::debug;

use crate::config::Config;
use crate::error::PipelineError;
use crate::tool::{Invocation, ToolRunner};
use crate::types::PythonVersion;

const QUERY: &str = "import sys; print(sys.executable); print('%d.%d' % sys.version_info[:2])";

/// The local Python installation the pipeline drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub executable: PathBuf,
    pub version: Option<PythonVersion>,
}

impl Interpreter {
    /// Asks the interpreter where it lives and which version it is. When that fails
    /// the configured name is looked up on `PATH` and the version stays unknown.
    pub fn locate(config: &Config, runner: &dyn ToolRunner) -> Self {
        let invocation = Invocation::new(&config.python).args(["-c", QUERY]);
        match runner.run(&invocation) {
            Ok(output) if output.success() => {
                let mut lines = output.stdout.lines().map(str::trim);
                let executable = lines.next().filter(|l| !l.is_empty()).map(PathBuf::from);
                let version = lines.next().and_then(|l| l.parse().ok());
                if let Some(executable) = executable {
                    return Self { executable, version };
                }
                debug!("interpreter query printed nothing useful: {:?}", output.stdout);
            }
            Ok(output) => debug!("interpreter query exited with {:?}", output.code),
            Err(e) => debug!("interpreter query failed: {e}"),
        }

        Self {
            executable: find_on_path(&config.python).unwrap_or_else(|| config.python.clone()),
            version: None,
        }
    }

    /// Directory holding the interpreter binary.
    pub fn install_dir(&self) -> PathBuf {
        self.executable
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Where pip drops console scripts for this interpreter.
    pub fn script_path(&self, name: &str) -> PathBuf {
        if cfg!(windows) {
            self.install_dir().join("Scripts").join(format!("{name}.exe"))
        } else {
            self.install_dir().join(name)
        }
    }
}

fn find_on_path(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        let candidate = candidate.with_extension("exe");
        (cfg!(windows) && candidate.is_file()).then_some(candidate)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::fake::FakeRunner;

    #[test]
    fn parses_query_output() {
        let runner = FakeRunner::new(|_| Ok(FakeRunner::ok("/opt/py/bin/python3\n3.11\n")));
        let interpreter = Interpreter::locate(&Config::new("/work"), &runner);

        assert_eq!(interpreter.executable, PathBuf::from("/opt/py/bin/python3"));
        assert_eq!(interpreter.version, Some(PythonVersion::new(3, 11)));
        assert_eq!(interpreter.install_dir(), PathBuf::from("/opt/py/bin"));
    }

    #[test]
    fn failed_query_keeps_configured_name() {
        let runner = FakeRunner::new(|_| Ok(FakeRunner::failed(9009, "")));
        let mut config = Config::new("/work");
        config.python = PathBuf::from("/nonexistent/dir/python-x");

        let interpreter = Interpreter::locate(&config, &runner);
        assert_eq!(interpreter.executable, PathBuf::from("/nonexistent/dir/python-x"));
        assert_eq!(interpreter.version, None);
    }

    #[test]
    fn console_scripts_sit_next_to_interpreter() {
        let interpreter = Interpreter {
            executable: PathBuf::from("/opt/py/bin/python3"),
            version: None,
        };
        let script = interpreter.script_path("decompyle3");
        if cfg!(windows) {
            assert_eq!(script, PathBuf::from("/opt/py/bin/Scripts/decompyle3.exe"));
        } else {
            assert_eq!(script, PathBuf::from("/opt/py/bin/decompyle3"));
        }
    }
}
