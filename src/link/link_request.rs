use std::path::PathBuf;

/// One run's worth of links to create.
///
/// Built once from the user's selection and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    /// Absolute paths of the files to link, in the order links are created
    pub sources: Vec<PathBuf>,
    /// The directory the links are created in
    pub destination: PathBuf,
    /// If true, links on the destination's drive point at relative paths
    pub use_relative_path: bool,
    /// If true, the generated script is left on disk after it ran
    pub retain_script_file: bool,
}

impl LinkRequest {
    /// Creates a request with relative targets on and script retention off.
    pub fn new(sources: Vec<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            sources,
            destination: destination.into(),
            use_relative_path: true,
            retain_script_file: false,
        }
    }

    pub fn relative(mut self, use_relative_path: bool) -> Self {
        self.use_relative_path = use_relative_path;
        self
    }

    pub fn retain_script(mut self, retain_script_file: bool) -> Self {
        self.retain_script_file = retain_script_file;
        self
    }
}
