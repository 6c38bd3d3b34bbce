use std::path::PathBuf;

use log::{error, info};

use crate::cleanup::cleanup;
use crate::config::Config;
use crate::decompile::decompile_and_move;
use crate::error::PipelineError;
use crate::install::ensure_requirements;
use crate::interpreter::Interpreter;
use crate::picker::FilePicker;
use crate::tool::ToolRunner;
use crate::types::DecompileReport;
use crate::unpack::run_unpacker;

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No file was selected; nothing was extracted.
    Cancelled,
    Completed {
        report: DecompileReport,
        output_dir: PathBuf,
    },
}

pub struct Pipeline<'a> {
    config: &'a Config,
    runner: &'a dyn ToolRunner,
    picker: &'a dyn FilePicker,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, runner: &'a dyn ToolRunner, picker: &'a dyn FilePicker) -> Self {
        Self {
            config,
            runner,
            picker,
        }
    }

    pub fn run(&self) -> Result<Outcome, PipelineError> {
        ensure_requirements(self.config, self.runner)?;

        let Some(exe) = self.picker.pick()? else {
            return Ok(Outcome::Cancelled);
        };

        let interpreter = Interpreter::locate(self.config, self.runner);
        let extraction = run_unpacker(self.config, self.runner, &exe, interpreter.version)?;

        let output_dir = self.config.source_dir(&exe);
        let decompiled = decompile_and_move(
            self.config,
            &interpreter,
            self.runner,
            &extraction.dir,
            &output_dir,
            extraction.version,
        );

        // runs whatever the decompiler reported
        if let Err(e) = cleanup(&extraction.dir, self.config.delete_temp) {
            error!("Failed to delete {}: {e}", extraction.dir.display());
        }

        let report = decompiled?;
        if report.is_success() {
            info!("Recovered {} source files.", report.relocated);
        }
        Ok(Outcome::Completed { report, output_dir })
    }
}
