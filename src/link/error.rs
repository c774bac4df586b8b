use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of a link run.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("destination directory does not exist: {}", .0.display())]
    DestinationNotFound(PathBuf),

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("source has no file name: {}", .0.display())]
    InvalidSource(PathBuf),

    #[error("failed to write script {}", .path.display())]
    ScriptWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch script interpreter")]
    Launch {
        #[source]
        source: io::Error,
        /// Where the script was kept, if it was
        script: Option<PathBuf>,
    },

    #[error("link script exited with {}", describe_code(.code))]
    Execution {
        code: Option<i32>,
        /// Where the script was kept, if it was
        script: Option<PathBuf>,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => String::from("no status (terminated by signal)"),
    }
}
