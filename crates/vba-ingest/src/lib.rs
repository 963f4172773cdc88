//! Discovery and assembly of VBA projects from source files.
//!
//! Two inputs are accepted: a directory tree with `Modules/`,
//! `ClassModules/`, `Objects/` and `Forms/` subfolders, or a
//! [`FileManifest`] listing files by role. Both produce a populated
//! [`vba_project::ProjectBuilder`]; no bytes are encoded here.

pub mod discovery;
pub mod error;
pub mod manifest;
pub mod source;

pub use discovery::{ModuleRole, SourceFile, build_from_directory, discover_sources, list_role_files};
pub use error::{DiscoveryError, Result};
pub use manifest::{FileManifest, create_project_from_files};
pub use source::{decode_source, read_source};
