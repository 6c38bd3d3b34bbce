use std::io::BufRead;
use std::path::PathBuf;

use log::{debug, warn};

use crate::error::PipelineError;
use crate::tool::{Invocation, ToolRunner};

const DIALOG_TITLE: &str = "Select an EXE file to extract";

/// Asks the user for the executable to process. `None` means the user cancelled.
pub trait FilePicker {
    fn pick(&self) -> Result<Option<PathBuf>, PipelineError>;
}

/// Always answers with the same path, used when the path came from the command line.
pub struct FixedPicker(pub PathBuf);

impl FilePicker for FixedPicker {
    fn pick(&self) -> Result<Option<PathBuf>, PipelineError> {
        Ok(Some(self.0.clone()))
    }
}

/// Reads a path from a line of input; an empty line cancels.
pub struct PromptPicker<R> {
    input: std::cell::RefCell<R>,
}

impl<R: BufRead> PromptPicker<R> {
    pub fn new(input: R) -> Self {
        Self {
            input: std::cell::RefCell::new(input),
        }
    }
}

impl<R: BufRead> FilePicker for PromptPicker<R> {
    fn pick(&self) -> Result<Option<PathBuf>, PipelineError> {
        eprint!("{DIALOG_TITLE}: ");
        let mut line = String::new();
        self.input.borrow_mut().read_line(&mut line)?;
        Ok(non_empty_path(&line))
    }
}

/// Native dialog through the platform's scripting tool.
pub struct DialogPicker<'a, F> {
    runner: &'a dyn ToolRunner,
    fallback: F,
}

impl<'a, F: FilePicker> DialogPicker<'a, F> {
    pub fn new(runner: &'a dyn ToolRunner, fallback: F) -> Self {
        Self { runner, fallback }
    }
}

impl<F: FilePicker> FilePicker for DialogPicker<'_, F> {
    fn pick(&self) -> Result<Option<PathBuf>, PipelineError> {
        let invocation = dialog_invocation();
        match self.runner.run(&invocation) {
            // zenity and osascript exit non-zero on cancel
            Ok(output) if output.success() => Ok(non_empty_path(&output.stdout)),
            Ok(output) => {
                debug!("file dialog exited with {:?}", output.code);
                Ok(None)
            }
            Err(PipelineError::Spawn { program, source }) => {
                warn!(
                    "No file dialog available ({}: {source}), falling back to prompt.",
                    program.display()
                );
                self.fallback.pick()
            }
            Err(e) => Err(e),
        }
    }
}

fn non_empty_path(text: &str) -> Option<PathBuf> {
    let trimmed = text.trim().trim_matches('"');
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

#[cfg(windows)]
fn dialog_invocation() -> Invocation {
    let script = format!(
        "Add-Type -AssemblyName System.Windows.Forms; \
         $d = New-Object System.Windows.Forms.OpenFileDialog; \
         $d.Title = '{DIALOG_TITLE}'; \
         $d.Filter = 'Executable files (*.exe)|*.exe'; \
         if ($d.ShowDialog() -eq 'OK') {{ $d.FileName }}"
    );
    Invocation::new("powershell").args(["-NoProfile", "-STA", "-Command", script.as_str()])
}

#[cfg(target_os = "macos")]
fn dialog_invocation() -> Invocation {
    let script = format!(
        "POSIX path of (choose file with prompt \"{DIALOG_TITLE}\" of type {{\"exe\"}})"
    );
    Invocation::new("osascript").args(["-e", script.as_str()])
}

#[cfg(not(any(windows, target_os = "macos")))]
fn dialog_invocation() -> Invocation {
    Invocation::new("zenity").args([
        "--file-selection",
        format!("--title={DIALOG_TITLE}").as_str(),
        "--file-filter=Executable files | *.exe",
    ])
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::tool::fake::FakeRunner;

    struct Unreachable;

    impl FilePicker for Unreachable {
        fn pick(&self) -> Result<Option<PathBuf>, PipelineError> {
            panic!("fallback must not be used");
        }
    }

    #[test]
    fn dialog_returns_selected_path() {
        let runner = FakeRunner::new(|_| Ok(FakeRunner::ok("/tmp/game.exe\n")));
        let picked = DialogPicker::new(&runner, Unreachable).pick().unwrap();
        assert_eq!(picked, Some(PathBuf::from("/tmp/game.exe")));
    }

    #[test]
    fn dialog_cancel_is_none() {
        let runner = FakeRunner::new(|_| Ok(FakeRunner::failed(1, "")));
        assert_eq!(DialogPicker::new(&runner, Unreachable).pick().unwrap(), None);

        let runner = FakeRunner::new(|_| Ok(FakeRunner::ok("  \n")));
        assert_eq!(DialogPicker::new(&runner, Unreachable).pick().unwrap(), None);
    }

    #[test]
    fn missing_dialog_tool_falls_back_to_prompt() {
        let runner = FakeRunner::new(|inv| Err(FakeRunner::not_found(inv)));
        let prompt = PromptPicker::new(Cursor::new("C:\\games\\game.exe\r\n"));
        assert_eq!(
            DialogPicker::new(&runner, prompt).pick().unwrap(),
            Some(PathBuf::from("C:\\games\\game.exe"))
        );
    }

    #[test]
    fn empty_prompt_cancels() {
        let prompt = PromptPicker::new(Cursor::new("\n"));
        assert_eq!(prompt.pick().unwrap(), None);

        let prompt = PromptPicker::new(Cursor::new(""));
        assert_eq!(prompt.pick().unwrap(), None);
    }

    #[test]
    fn quoted_prompt_path_is_unquoted() {
        let prompt = PromptPicker::new(Cursor::new("\"/tmp/with space.exe\"\n"));
        assert_eq!(
            prompt.pick().unwrap(),
            Some(PathBuf::from("/tmp/with space.exe"))
        );
    }
}
