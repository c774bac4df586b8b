use crate::link::error::LinkError;
use crate::link::link_request::LinkRequest;
use crate::link::path_style::PathStyle;
use crate::link::relative_path::{LinkTarget, link_target};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use tracing::{debug, warn};

/// The command interpreter a link script is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    /// Windows `cmd.exe` batch file using `mklink`
    Batch,
    /// POSIX `sh` script using `ln -s`
    Posix,
}

impl Shell {
    pub fn native() -> Shell {
        if cfg!(windows) { Shell::Batch } else { Shell::Posix }
    }

    pub fn path_style(self) -> PathStyle {
        match self {
            Shell::Batch => PathStyle::WINDOWS,
            Shell::Posix => PathStyle::UNIX,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Shell::Batch => ".bat",
            Shell::Posix => ".sh",
        }
    }

    pub fn line_ending(self) -> &'static str {
        match self {
            Shell::Batch => "\r\n",
            Shell::Posix => "\n",
        }
    }

    /// Command entering `dir`, aborting the script if that fails.
    pub fn change_directory(self, dir: &str) -> String {
        match self {
            Shell::Batch => format!("cd /d {} || exit /b 1", self.quote(dir)),
            Shell::Posix => format!("cd -- {} || exit 1", self.quote(dir)),
        }
    }

    /// Command creating a link called `name` in the current directory.
    pub fn make_symlink(self, name: &str, target: &str) -> String {
        match self {
            Shell::Batch => format!("mklink {} {}", self.quote(name), self.quote(target)),
            Shell::Posix => format!("ln -s -- {} {}", self.quote(target), self.quote(name)),
        }
    }

    fn quote(self, value: &str) -> String {
        match self {
            // Batch files expand %VAR% even inside quotes.
            Shell::Batch => format!("\"{}\"", value.replace('%', "%%")),
            Shell::Posix => format!("'{}'", value.replace('\'', r"'\''")),
        }
    }
}

/// A link the script will create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLink {
    /// File name of the link inside the destination
    pub name: String,
    /// What the link points at
    pub target: LinkTarget,
}

/// The commands of one link script and the name of the file holding them.
#[derive(Debug, Clone)]
pub struct ScriptDocument {
    shell: Shell,
    file_name: String,
    commands: Vec<String>,
    links: Vec<PlannedLink>,
}

impl ScriptDocument {
    /// Builds the script for `request`.
    ///
    /// # Arguments
    ///
    /// * `request` - The sources and destination to link
    /// * `shell` - The interpreter the commands are written for
    /// * `app_name` - Prefix of the generated file name
    ///
    /// # Returns
    ///
    /// * `Result<ScriptDocument, LinkError>` - A directory change followed by
    ///   one link command per source, in request order
    pub fn build(
        request: &LinkRequest,
        shell: Shell,
        app_name: &str,
    ) -> Result<ScriptDocument, LinkError> {
        let style = shell.path_style();
        let destination = path_str(&request.destination)?;
        let destination = style.trim_trailing_separator(destination);
        let destination_segments = style.split(destination);

        let mut commands = Vec::with_capacity(request.sources.len() + 1);
        let mut links = Vec::with_capacity(request.sources.len());
        let mut seen_names = HashSet::new();

        commands.push(shell.change_directory(destination));

        for source in &request.sources {
            let source_str = path_str(source)?;
            let name = style
                .split(source_str)
                .last()
                .copied()
                .filter(|name| !name.is_empty())
                .ok_or_else(|| LinkError::InvalidSource(source.clone()))?;

            let key = if style.case_sensitive {
                name.to_string()
            } else {
                name.to_uppercase()
            };
            if !seen_names.insert(key) {
                warn!(link_name = name, source = %source.display(), "link name used more than once");
            }

            let target = link_target(
                &destination_segments,
                source_str,
                request.use_relative_path,
                style,
            );
            let command = shell.make_symlink(name, target.as_str());
            debug!(%command, "script line");
            commands.push(command);
            links.push(PlannedLink {
                name: name.to_string(),
                target,
            });
        }

        Ok(ScriptDocument {
            shell,
            file_name: unique_file_name(app_name, shell),
            commands,
            links,
        })
    }

    pub fn shell(&self) -> Shell {
        self.shell
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn links(&self) -> &[PlannedLink] {
        &self.links
    }

    pub fn into_links(self) -> Vec<PlannedLink> {
        self.links
    }

    /// The script's text, one command per line.
    pub fn render(&self) -> String {
        let line_ending = self.shell.line_ending();
        let mut text = self.commands.join(line_ending);
        text.push_str(line_ending);
        text
    }
}

fn path_str(path: &Path) -> Result<&str, LinkError> {
    path.to_str()
        .ok_or_else(|| LinkError::NonUtf8Path(path.to_path_buf()))
}

static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

/// Nanoseconds since the epoch, strictly increasing within the process.
fn next_stamp() -> u64 {
    let now = u64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos()).unwrap_or(0);
    let previous = LAST_STAMP
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1)
}

/// File name of a new script: `<app_name>_<stamp><extension>`.
pub fn unique_file_name(app_name: &str, shell: Shell) -> String {
    format!("{}_{}{}", app_name, next_stamp(), shell.extension())
}
