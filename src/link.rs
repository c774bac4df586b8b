//! Generation and execution of symbolic link scripts.

pub mod create_symlinks;
pub mod error;
pub mod link_options;
pub mod link_request;
pub mod path_style;
pub mod relative_path;
pub mod runner;
pub mod script;
pub mod script_file;


pub use create_symlinks::{LinkReport, create_symlinks, preview_script};
pub use error::LinkError;
pub use link_options::LinkOptions;
pub use link_request::LinkRequest;
