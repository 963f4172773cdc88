//! Explicit file lists, as an alternative to the directory layout.
//!
//! ```json
//! {
//!   "modules": ["src/Module1.bas"],
//!   "class_modules": ["src/Widget.cls"],
//!   "doc_modules": ["src/ThisWorkbook.cls"],
//!   "forms": ["src/UserForm1.frm"]
//! }
//! ```
//!
//! Absent keys are empty lists and unknown keys are ignored. Files are
//! added in list order: modules, class modules, document modules, forms.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;
use vba_project::{ProjectBuilder, ProjectInfo};

use crate::discovery::{ModuleRole, SourceFile, build_from_sources};
use crate::error::{DiscoveryError, Result};

/// Source files grouped by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileManifest {
    pub modules: Vec<PathBuf>,
    pub class_modules: Vec<PathBuf>,
    pub doc_modules: Vec<PathBuf>,
    pub forms: Vec<PathBuf>,
}

impl FileManifest {
    /// Parse manifest JSON.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Load a manifest file; relative paths resolve against its directory.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing, unreadable or not a manifest.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DiscoveryError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| DiscoveryError::file_read(path, e))?;
        let manifest = Self::from_json(&text).map_err(|e| DiscoveryError::Manifest {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(match path.parent() {
            Some(base) => manifest.resolve(base),
            None => manifest,
        })
    }

    /// Join every relative path onto `base`.
    #[must_use]
    pub fn resolve(self, base: &Path) -> Self {
        let join = |paths: Vec<PathBuf>| -> Vec<PathBuf> {
            paths
                .into_iter()
                .map(|p| if p.is_absolute() { p } else { base.join(p) })
                .collect()
        };
        Self {
            modules: join(self.modules),
            class_modules: join(self.class_modules),
            doc_modules: join(self.doc_modules),
            forms: join(self.forms),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources().is_empty()
    }

    /// Every listed file with its role, in insertion order.
    #[must_use]
    pub fn sources(&self) -> Vec<SourceFile> {
        let groups = [
            (ModuleRole::Module, &self.modules),
            (ModuleRole::ClassModule, &self.class_modules),
            (ModuleRole::Document, &self.doc_modules),
            (ModuleRole::Form, &self.forms),
        ];
        groups
            .into_iter()
            .flat_map(|(role, paths)| {
                paths.iter().map(move |path| SourceFile {
                    path: path.clone(),
                    role,
                })
            })
            .collect()
    }
}

/// Build a project from an explicit file list.
///
/// An empty manifest yields a project with no modules.
///
/// # Errors
///
/// Fails as loading a discovered directory does.
pub fn create_project_from_files(manifest: &FileManifest, info: ProjectInfo) -> Result<ProjectBuilder> {
    let sources = manifest.sources();
    let builder = build_from_sources(&sources, info)?;
    info!(modules = builder.modules().len(), "built project from manifest");
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_and_absent_keys() {
        let manifest =
            FileManifest::from_json(r#"{"modules": ["a.bas"], "extras": ["x"], "forms": []}"#).unwrap();
        assert_eq!(manifest.modules, [PathBuf::from("a.bas")]);
        assert!(manifest.class_modules.is_empty());
        assert!(manifest.doc_modules.is_empty());
    }

    #[test]
    fn test_sources_in_role_order() {
        let manifest = FileManifest::from_json(
            r#"{
                "forms": ["UserForm1.frm"],
                "doc_modules": ["ThisWorkbook.cls"],
                "class_modules": ["Widget.cls"],
                "modules": ["Module2.bas", "Module1.bas"]
            }"#,
        )
        .unwrap();
        let roles: Vec<_> = manifest.sources().iter().map(|s| s.role).collect();
        assert_eq!(
            roles,
            [
                ModuleRole::Module,
                ModuleRole::Module,
                ModuleRole::ClassModule,
                ModuleRole::Document,
                ModuleRole::Form
            ]
        );
        // List order is kept, not sorted.
        assert_eq!(manifest.sources()[0].path, PathBuf::from("Module2.bas"));
    }

    #[test]
    fn test_resolve_relative_paths() {
        let base = Path::new("/work/project");
        let manifest = FileManifest {
            modules: vec![PathBuf::from("src/Module1.bas")],
            ..FileManifest::default()
        }
        .resolve(base);
        assert_eq!(manifest.modules[0], base.join("src/Module1.bas"));
    }

    #[test]
    fn test_empty_manifest_builds_empty_project() {
        assert!(FileManifest::default().is_empty());
        let builder = create_project_from_files(&FileManifest::default(), ProjectInfo::default()).unwrap();
        assert!(builder.modules().is_empty());
        assert_eq!(builder.info().name, "VBAProject");
    }

    #[test]
    fn test_empty_lists_build_empty_project() {
        let manifest = FileManifest::from_json(
            r#"{"modules": [], "class_modules": [], "doc_modules": [], "forms": []}"#,
        )
        .unwrap();
        let builder = create_project_from_files(&manifest, ProjectInfo::default()).unwrap();
        assert!(builder.modules().is_empty());
    }
}
