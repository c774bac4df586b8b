use crate::link::error::LinkError;
use crate::link::script::ScriptDocument;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

/// A link script written to disk.
///
/// The file is removed when this value is dropped, so every early return
/// between writing and running the script cleans up after itself. Call
/// [`ScriptFile::keep`] to leave it in place.
#[derive(Debug)]
pub struct ScriptFile {
    path: TempPath,
}

impl ScriptFile {
    /// Writes `document` to a new file in `dir`.
    ///
    /// Fails instead of overwriting when a file of the same name exists.
    pub fn create(dir: &Path, document: &ScriptDocument) -> Result<ScriptFile, LinkError> {
        let path = dir.join(document.file_name());
        let write_error = |source| LinkError::ScriptWrite {
            path: path.clone(),
            source,
        };

        let mut file = Builder::new()
            .prefix(document.file_name())
            .suffix("")
            .rand_bytes(0)
            .tempfile_in(dir)
            .map_err(write_error)?;
        file.write_all(document.render().as_bytes())
            .map_err(write_error)?;
        file.flush().map_err(write_error)?;

        debug!(path = %file.path().display(), "script written");

        // Closes the handle so the interpreter can open the file on Windows.
        Ok(ScriptFile {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Leaves the script on disk and returns where it is.
    pub fn keep(self) -> Result<PathBuf, LinkError> {
        self.path.keep().map_err(|err| LinkError::ScriptWrite {
            path: err.path.to_path_buf(),
            source: err.error,
        })
    }

    /// Deletes the script. Failures are logged, not returned.
    pub fn remove(self) {
        let path = self.path.to_path_buf();
        if let Err(err) = self.path.close() {
            warn!(path = %path.display(), error = %err, "failed to delete script");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::link_request::LinkRequest;
    use crate::link::script::Shell;
    use std::fs;
    use tempfile::tempdir;

    fn document() -> ScriptDocument {
        let request = LinkRequest::new(vec!["/srv/data/file.txt".into()], "/srv/links");
        ScriptDocument::build(&request, Shell::Posix, "SymlinkCreator").unwrap()
    }

    #[test]
    fn writes_rendered_document() {
        let dir = tempdir().unwrap();
        let doc = document();
        let script = ScriptFile::create(dir.path(), &doc).unwrap();

        assert_eq!(script.path(), dir.path().join(doc.file_name()));
        assert_eq!(fs::read_to_string(script.path()).unwrap(), doc.render());
    }

    #[test]
    fn drop_removes_file() {
        let dir = tempdir().unwrap();
        let script = ScriptFile::create(dir.path(), &document()).unwrap();
        let path = script.path().to_path_buf();

        drop(script);
        assert!(!path.exists());
    }

    #[test]
    fn remove_deletes_file() {
        let dir = tempdir().unwrap();
        let script = ScriptFile::create(dir.path(), &document()).unwrap();
        let path = script.path().to_path_buf();

        script.remove();
        assert!(!path.exists());
    }

    #[test]
    fn keep_leaves_file_in_place() {
        let dir = tempdir().unwrap();
        let script = ScriptFile::create(dir.path(), &document()).unwrap();
        let path = script.path().to_path_buf();

        let kept = script.keep().unwrap();
        assert_eq!(kept, path);
        assert!(kept.exists());
    }

    #[test]
    fn refuses_to_overwrite_existing_file() {
        let dir = tempdir().unwrap();
        let doc = document();
        let existing = dir.path().join(doc.file_name());
        fs::write(&existing, "echo keep me").unwrap();

        let err = ScriptFile::create(dir.path(), &doc).unwrap_err();
        assert!(matches!(err, LinkError::ScriptWrite { .. }));
        assert_eq!(fs::read_to_string(existing).unwrap(), "echo keep me");
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let dir = tempdir().unwrap();
        let err = ScriptFile::create(&dir.path().join("missing"), &document()).unwrap_err();
        assert!(matches!(err, LinkError::ScriptWrite { .. }));
    }
}
