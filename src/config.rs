use std::path::{Path, PathBuf};

pub const REQUIREMENTS_FILE: &str = "requirements.txt";
pub const UNPACKER_SCRIPT: &str = "pyinstxtractor.py";
pub const TOOLS_DIR: &str = "Tools";
pub const EXTRACTED_SUFFIX: &str = "_extracted";
pub const SOURCE_SUFFIX: &str = "_source";

#[cfg(windows)]
pub const DEFAULT_PYTHON: &str = "python";
#[cfg(not(windows))]
pub const DEFAULT_PYTHON: &str = "python3";

#[cfg(windows)]
const PYCDC_BINARY: &str = "pycdc.exe";
#[cfg(not(windows))]
const PYCDC_BINARY: &str = "pycdc";

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
    pub output_dir: PathBuf,
    pub python: PathBuf,
    pub delete_temp: bool,
    pub install_requirements: bool,
}

impl Config {
    /// `base_dir` is made absolute so tools run inside it see the same paths.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let base_dir = std::path::absolute(&base_dir).unwrap_or(base_dir);
        Self {
            output_dir: base_dir.join("output"),
            base_dir,
            python: PathBuf::from(DEFAULT_PYTHON),
            delete_temp: true,
            install_requirements: true,
        }
    }

    pub fn requirements_path(&self) -> PathBuf {
        self.base_dir.join(REQUIREMENTS_FILE)
    }

    pub fn unpacker_path(&self) -> PathBuf {
        self.base_dir.join(UNPACKER_SCRIPT)
    }

    pub fn pycdc_path(&self) -> PathBuf {
        self.base_dir.join(TOOLS_DIR).join(PYCDC_BINARY)
    }

    /// Where the unpacker leaves its files: `<base>/<exe name>_extracted`.
    pub fn extraction_dir(&self, exe: &Path) -> PathBuf {
        let mut name = exe.file_name().unwrap_or(exe.as_os_str()).to_os_string();
        name.push(EXTRACTED_SUFFIX);
        self.base_dir.join(name)
    }

    /// `<output>/<exe name with .exe replaced by _source>`.
    pub fn source_dir(&self, exe: &Path) -> PathBuf {
        let name = exe
            .file_name()
            .unwrap_or(exe.as_os_str())
            .to_string_lossy()
            .into_owned();
        let split = name.len().saturating_sub(4);
        let stem = match name.get(split..) {
            Some(ext) if split > 0 && ext.eq_ignore_ascii_case(".exe") => &name[..split],
            _ => name.as_str(),
        };
        self.output_dir.join(format!("{stem}{SOURCE_SUFFIX}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_live_under_base() {
        let config = Config::new("/work");
        assert_eq!(config.requirements_path(), PathBuf::from("/work/requirements.txt"));
        assert_eq!(config.unpacker_path(), PathBuf::from("/work/pyinstxtractor.py"));
        assert_eq!(config.output_dir, PathBuf::from("/work/output"));
        assert!(config.pycdc_path().starts_with("/work/Tools"));
    }

    #[test]
    fn relative_base_becomes_absolute() {
        let config = Config::new("work");
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config.base_dir, cwd.join("work"));
        assert_eq!(config.unpacker_path(), cwd.join("work").join("pyinstxtractor.py"));
    }

    #[test]
    fn extraction_dir_appends_suffix_to_file_name() {
        let config = Config::new("/work");
        assert_eq!(
            config.extraction_dir(Path::new("/downloads/game.exe")),
            PathBuf::from("/work/game.exe_extracted")
        );
    }

    #[test]
    fn source_dir_replaces_exe_extension() {
        let config = Config::new("/work");
        assert_eq!(
            config.source_dir(Path::new("/downloads/game.exe")),
            PathBuf::from("/work/output/game_source")
        );
        assert_eq!(
            config.source_dir(Path::new("/downloads/TOOL.EXE")),
            PathBuf::from("/work/output/TOOL_source")
        );
        assert_eq!(
            config.source_dir(Path::new("/downloads/packed")),
            PathBuf::from("/work/output/packed_source")
        );
    }
}
