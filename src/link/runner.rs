use crate::link::script::Shell;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};
use tracing::info;

/// Exit state of a script run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStatus {
    /// Exit code, absent when the process was killed by a signal
    pub code: Option<i32>,
}

impl ScriptStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ScriptStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Something that can execute a link script and wait for it.
pub trait ScriptRunner {
    fn run(&self, shell: Shell, script: &Path) -> io::Result<ScriptStatus>;
}

/// Runs scripts with the plain interpreter and the caller's privileges.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectRunner;

impl DirectRunner {
    pub fn command(&self, shell: Shell, script: &Path) -> Command {
        match shell {
            Shell::Batch => {
                let mut cmd = Command::new("cmd");
                cmd.arg("/C").arg(script);
                cmd
            }
            Shell::Posix => {
                let mut cmd = Command::new("sh");
                cmd.arg(script);
                cmd
            }
        }
    }
}

impl ScriptRunner for DirectRunner {
    fn run(&self, shell: Shell, script: &Path) -> io::Result<ScriptStatus> {
        info!(script = %script.display(), "running script");
        Ok(self.command(shell, script).status()?.into())
    }
}

/// Runs scripts with administrative rights.
///
/// Batch scripts go through PowerShell's `Start-Process -Verb RunAs`, which
/// raises the UAC prompt and reports the elevated process's exit code. POSIX
/// scripts are handed to `elevation_command` (`sudo` unless configured
/// otherwise).
#[derive(Debug, Clone)]
pub struct ElevatedRunner {
    pub elevation_command: String,
}

impl Default for ElevatedRunner {
    fn default() -> Self {
        Self {
            elevation_command: String::from("sudo"),
        }
    }
}

impl ElevatedRunner {
    pub fn new(elevation_command: impl Into<String>) -> Self {
        Self {
            elevation_command: elevation_command.into(),
        }
    }

    pub fn command(&self, shell: Shell, script: &Path) -> Command {
        match shell {
            Shell::Batch => {
                let script = script.to_string_lossy().replace('\'', "''");
                let mut cmd = Command::new("powershell");
                cmd.args(["-NoProfile", "-NonInteractive", "-Command"]).arg(format!(
                    "$p = Start-Process -FilePath '{script}' -Verb RunAs -Wait -PassThru; exit $p.ExitCode"
                ));
                cmd
            }
            Shell::Posix => {
                let mut cmd = Command::new(&self.elevation_command);
                cmd.arg("sh").arg(script);
                cmd
            }
        }
    }
}

impl ScriptRunner for ElevatedRunner {
    fn run(&self, shell: Shell, script: &Path) -> io::Result<ScriptStatus> {
        info!(script = %script.display(), "running script with elevated rights");
        Ok(self.command(shell, script).status()?.into())
    }
}
