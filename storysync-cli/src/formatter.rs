//! Formatter that shells out to an external command such as prettier.

use std::path::{Path, PathBuf};
use std::process::Command;
use storysync::{FormatError, Formatter};

/// Runs `program args... <story>` in the project root.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandFormatter {
    /// Build from a command line; `None` if it is empty.
    pub fn from_command(command: &[String], working_dir: impl Into<PathBuf>) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            working_dir: working_dir.into(),
        })
    }

    /// The program being run.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, path: &Path) -> Result<(), FormatError> {
        tracing::debug!(program = %self.program, path = %path.display(), "Running formatter");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|source| FormatError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(FormatError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Either a command formatter or nothing, chosen from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredFormatter {
    Command(CommandFormatter),
    Disabled,
}

impl ConfiguredFormatter {
    /// Choose from an optional command line.
    pub fn new(command: Option<&[String]>, working_dir: &Path) -> Self {
        command
            .and_then(|command| CommandFormatter::from_command(command, working_dir))
            .map_or(Self::Disabled, Self::Command)
    }
}

impl Formatter for ConfiguredFormatter {
    fn format(&self, path: &Path) -> Result<(), FormatError> {
        match self {
            Self::Command(formatter) => formatter.format(path),
            Self::Disabled => Ok(()),
        }
    }
}
