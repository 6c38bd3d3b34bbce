use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

mod cleanup;
mod config;
mod decompile;
mod error;
mod install;
mod interpreter;
mod picker;
mod pipeline;
mod tool;
mod types;
mod unpack;

use config::Config;
use picker::{DialogPicker, FilePicker, FixedPicker, PromptPicker};
use pipeline::{Outcome, Pipeline};
use tool::SystemRunner;

/// Recovers Python source from a PyInstaller executable.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Executable to process; a file dialog opens when omitted.
    exe: Option<PathBuf>,
    /// Directory holding requirements.txt, pyinstxtractor.py and Tools/.
    #[arg(long)]
    base_dir: Option<PathBuf>,
    /// Parent directory for recovered sources [default: <base-dir>/output].
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Python interpreter used for pip and the unpacker.
    #[arg(long, default_value = config::DEFAULT_PYTHON)]
    python: PathBuf,
    /// Keep the temporary extraction directory.
    #[arg(long)]
    keep_temp: bool,
    /// Do not run pip against requirements.txt.
    #[arg(long)]
    skip_install: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(Config, Option<PathBuf>)> {
        let base_dir = match self.base_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let mut config = Config::new(base_dir);
        if let Some(output_dir) = self.output_dir {
            config.output_dir = std::path::absolute(output_dir)?;
        }
        // bare names are looked up on PATH, anything else is a path
        config.python = if self.python.components().count() > 1 {
            std::path::absolute(self.python)?
        } else {
            self.python
        };
        config.delete_temp = !self.keep_temp;
        config.install_requirements = !self.skip_install;
        Ok((config, self.exe))
    }
}

fn run(config: &Config, exe: Option<PathBuf>) -> anyhow::Result<Outcome> {
    let runner = SystemRunner;
    let stdin = std::io::stdin();
    let dialog = DialogPicker::new(&runner, PromptPicker::new(stdin.lock()));
    let fixed;
    let picker: &dyn FilePicker = match exe {
        Some(path) => {
            fixed = FixedPicker(path);
            &fixed
        }
        None => &dialog,
    };

    Ok(Pipeline::new(config, &runner, picker).run()?)
}

/// Logs how the run ended. Only a fatal error is a failed exit; a batch in
/// which nothing decompiled is reported but still exits cleanly.
fn finish(result: anyhow::Result<Outcome>) -> bool {
    match result {
        Ok(Outcome::Cancelled) => {
            info!("No file selected. Exiting.");
            true
        }
        Ok(Outcome::Completed { report, output_dir }) if report.is_success() => {
            let shown = std::fs::canonicalize(&output_dir).unwrap_or(output_dir);
            info!("SUCCESS! The source code is located in: {}", shown.display());
            true
        }
        Ok(Outcome::Completed { .. }) => {
            error!("Decompilation failed. Check logs for details.");
            true
        }
        Err(e) => {
            error!("{e}");
            false
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();

    let (config, exe) = match args.into_config() {
        Ok(v) => v,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if finish(run(&config, exe)) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
