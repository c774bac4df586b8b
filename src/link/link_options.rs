use crate::link::script::Shell;
use std::env;
use std::path::PathBuf;

/// Prefix of every generated script's file name.
pub const APP_NAME: &str = "SymlinkCreator";

/// Options controlling how link scripts are generated and kept.
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// The interpreter the script is written for
    pub shell: Shell,
    /// Directory the script file is written to
    pub script_dir: PathBuf,
    /// Identifier the script file name starts with
    pub app_name: String,
    /// If true, keeps the script when it failed to run or exited non-zero
    pub retain_on_failure: bool,
}

/// Default implementation for LinkOptions
impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            shell: Shell::native(),
            script_dir: env::temp_dir(),
            app_name: String::from(APP_NAME),
            retain_on_failure: false,
        }
    }
}
