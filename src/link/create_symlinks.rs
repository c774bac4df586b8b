use crate::link::error::LinkError;
use crate::link::link_options::LinkOptions;
use crate::link::link_request::LinkRequest;
use crate::link::runner::{ScriptRunner, ScriptStatus};
use crate::link::script::{PlannedLink, ScriptDocument};
use crate::link::script_file::ScriptFile;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    /// The links the script created, in order
    pub links: Vec<PlannedLink>,
    /// Location of the script, when it was retained
    pub script: Option<PathBuf>,
    /// The interpreter's exit state
    pub status: ScriptStatus,
}

/// Checks that the destination directory exists.
pub fn validate_destination(destination: &Path) -> Result<(), LinkError> {
    if destination.is_dir() {
        Ok(())
    } else {
        warn!(destination = %destination.display(), "destination path does not exist");
        Err(LinkError::DestinationNotFound(destination.to_path_buf()))
    }
}

/// Builds the script for `request` without writing or running it.
pub fn preview_script(
    request: &LinkRequest,
    opts: &LinkOptions,
) -> Result<ScriptDocument, LinkError> {
    validate_destination(&request.destination)?;
    ScriptDocument::build(request, opts.shell, &opts.app_name)
}

/// Creates the requested links by writing a script and running it.
///
/// Nothing is written when the destination is missing. Once written, the
/// script is deleted after the run unless the request retains it, or the
/// run failed and `opts.retain_on_failure` is set. Deletion also happens
/// when the interpreter could not be started.
///
/// # Arguments
///
/// * `request` - The sources, destination and per-run flags
/// * `opts` - Script dialect, location and retention policy
/// * `runner` - Executes the written script
///
/// # Returns
///
/// * `Result<LinkReport, LinkError>` - The planned links and the script's
///   exit state, or the first failure
pub fn create_symlinks(
    request: &LinkRequest,
    opts: &LinkOptions,
    runner: &dyn ScriptRunner,
) -> Result<LinkReport, LinkError> {
    let document = preview_script(request, opts)?;
    let script = ScriptFile::create(&opts.script_dir, &document)?;

    info!(
        script = %script.path().display(),
        links = document.links().len(),
        "link script created"
    );

    let outcome = runner.run(document.shell(), script.path());
    let succeeded = matches!(&outcome, Ok(status) if status.success());

    let kept = if request.retain_script_file || (opts.retain_on_failure && !succeeded) {
        kept_path(script.keep())
    } else {
        script.remove();
        None
    };

    let status = run_status(outcome, kept.clone())?;

    Ok(LinkReport {
        links: document.into_links(),
        script: kept,
        status,
    })
}

/// Where a kept script ended up. A failed keep is logged so it cannot hide
/// the run's own result.
fn kept_path(kept: Result<PathBuf, LinkError>) -> Option<PathBuf> {
    match kept {
        Ok(path) => {
            info!(script = %path.display(), "script retained");
            Some(path)
        }
        Err(err) => {
            warn!(error = %err, "failed to retain script");
            None
        }
    }
}

/// Maps the runner's outcome to the run's result.
fn run_status(
    outcome: io::Result<ScriptStatus>,
    script: Option<PathBuf>,
) -> Result<ScriptStatus, LinkError> {
    let status = outcome.map_err(|source| LinkError::Launch {
        source,
        script: script.clone(),
    })?;
    if !status.success() {
        return Err(LinkError::Execution {
            code: status.code,
            script,
        });
    }
    Ok(status)
}
