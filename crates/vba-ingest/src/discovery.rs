//! Directory-layout discovery.
//!
//! ```text
//! <root>/
//!   Modules/        *.bas  standard module
//!   ClassModules/   *.cls  standard module
//!   Objects/        *.cls  document module (ThisWorkbook, Sheet1, ...)
//!   Forms/          *.frm  standard module
//! ```
//!
//! Roles are added in the order above. Within a role, files are sorted
//! by file name, so the same tree always produces the same module order.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use vba_project::{Codepage, Module, ProjectBuilder, ProjectInfo};

use crate::error::{DiscoveryError, Result};
use crate::source::read_source;

/// What a source file becomes in the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleRole {
    Module,
    ClassModule,
    Document,
    Form,
}

impl ModuleRole {
    /// Discovery order.
    pub const ALL: [Self; 4] = [Self::Module, Self::ClassModule, Self::Document, Self::Form];

    /// Subdirectory holding files of this role.
    #[must_use]
    pub const fn folder(self) -> &'static str {
        match self {
            Self::Module => "Modules",
            Self::ClassModule => "ClassModules",
            Self::Document => "Objects",
            Self::Form => "Forms",
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Module => "bas",
            Self::ClassModule | Self::Document => "cls",
            Self::Form => "frm",
        }
    }

    /// Create the module for a file of this role.
    ///
    /// Only `Objects/` files become document modules; class and form
    /// files are loaded as standard modules.
    pub fn module(self, name: &str, source: String) -> std::result::Result<Module, vba_project::ValidationError> {
        match self {
            Self::Document => Module::document(name, source),
            Self::Module | Self::ClassModule | Self::Form => Module::standard(name, source),
        }
    }
}

/// A source file matched to its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub role: ModuleRole,
}

/// Lists files with the given extension (case-insensitive) in `dir`.
///
/// Returns files sorted by file name. A missing directory yields no files.
pub fn list_role_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| DiscoveryError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| DiscoveryError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Find every recognized source file under `root`, in insertion order.
///
/// # Errors
///
/// Fails when `root` is missing or not a directory, or when no source
/// file is found. Nothing is read in those cases.
pub fn discover_sources(root: &Path) -> Result<Vec<SourceFile>> {
    if !root.exists() {
        return Err(DiscoveryError::NotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut sources = Vec::new();
    for role in ModuleRole::ALL {
        let files = list_role_files(&root.join(role.folder()), role.extension())?;
        debug!(folder = role.folder(), files = files.len(), "scanned folder");
        sources.extend(files.into_iter().map(|path| SourceFile { path, role }));
    }

    if sources.is_empty() {
        return Err(DiscoveryError::NoInput {
            path: root.to_path_buf(),
        });
    }
    Ok(sources)
}

/// Build a project from a directory tree.
///
/// # Errors
///
/// Fails as [`discover_sources`] does, or when a file cannot be read or
/// its name is not a usable module name.
pub fn build_from_directory(root: &Path, info: ProjectInfo) -> Result<ProjectBuilder> {
    let sources = discover_sources(root)?;
    let builder = build_from_sources(&sources, info)?;
    info!(
        root = %root.display(),
        modules = builder.modules().len(),
        "built project from directory"
    );
    Ok(builder)
}

/// Load each source file and add it to a new project, in order.
pub(crate) fn build_from_sources(sources: &[SourceFile], info: ProjectInfo) -> Result<ProjectBuilder> {
    let codepage = info.codepage;
    let mut builder = ProjectBuilder::with_info(info)?;
    for source in sources {
        let module = load_module(source, codepage)?;
        builder
            .add_module(module)
            .map_err(|e| DiscoveryError::invalid_module(&source.path, e))?;
    }
    Ok(builder)
}

fn load_module(source: &SourceFile, codepage: Codepage) -> Result<Module> {
    let name = source
        .path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    let text = read_source(&source.path, codepage)?;
    let module = source
        .role
        .module(name, text)
        .map_err(|e| DiscoveryError::invalid_module(&source.path, e))?;
    debug!(
        path = %source.path.display(),
        module = module.name(),
        kind = module.kind().label(),
        "loaded module"
    );
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_list_role_files_sorted_and_filtered() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        fs::write(dir.join("b.bas"), "").unwrap();
        fs::write(dir.join("A.BAS"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::create_dir(dir.join("nested.bas")).unwrap();

        let files = list_role_files(dir, "bas").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["A.BAS", "b.bas"]);
    }

    #[test]
    fn test_missing_folder_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        assert!(list_role_files(&temp.path().join("Modules"), "bas").unwrap().is_empty());
    }

    #[test]
    fn test_roles() {
        assert_eq!(ModuleRole::Document.folder(), "Objects");
        assert_eq!(ModuleRole::Form.extension(), "frm");
        let module = ModuleRole::ClassModule.module("Widget", String::new()).unwrap();
        assert!(module.kind().is_procedural());
        let module = ModuleRole::Document.module("Sheet1", String::new()).unwrap();
        assert!(!module.kind().is_procedural());
    }
}
