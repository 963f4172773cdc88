//! Project aggregate: builder phase and frozen snapshot.
//!
//! [`ProjectBuilder`] is mutated while a project is assembled and checks
//! every change as it is made. [`ProjectBuilder::build`] hands out a
//! [`VbaProject`] snapshot that the stream encoders read but never modify.

use tracing::debug;
use uuid::Uuid;

use crate::codepage::Codepage;
use crate::error::ValidationError;
use crate::module::{Module, validate_identifier, validate_stream_name};
use crate::reference::ReferenceRecord;

/// Target platform recorded in PROJECTSYSKIND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SysKind {
    Win16,
    #[default]
    Win32,
    Macintosh,
    Win64,
}

impl SysKind {
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::Win16 => 0,
            Self::Win32 => 1,
            Self::Macintosh => 2,
            Self::Win64 => 3,
        }
    }

    #[must_use]
    pub const fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Win16),
            1 => Some(Self::Win32),
            2 => Some(Self::Macintosh),
            3 => Some(Self::Win64),
            _ => None,
        }
    }
}

/// Whether the project is shown in the VBA editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityState {
    Hidden,
    #[default]
    Visible,
}

impl VisibilityState {
    /// The single byte written to the `GC=` line.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Hidden => 0x00,
            Self::Visible => 0xFF,
        }
    }
}

impl TryFrom<i64> for VisibilityState {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Hidden),
            255 => Ok(Self::Visible),
            _ => Err(ValidationError::InvalidVisibilityState { value }),
        }
    }
}

/// Project protection flags plus an optional password hash.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtectionState {
    flags: u32,
    password_hash: Option<Vec<u8>>,
}

impl ProtectionState {
    /// User asked for the project to be locked.
    pub const USER_PROTECTED: u32 = 0x1;
    /// Host application locked the project.
    pub const HOST_PROTECTED: u32 = 0x2;
    /// The editor locked the project.
    pub const VBE_PROTECTED: u32 = 0x4;

    const VALID: u32 = Self::USER_PROTECTED | Self::HOST_PROTECTED | Self::VBE_PROTECTED;

    /// Validate protection flags.
    ///
    /// # Errors
    ///
    /// Fails when bits other than the three protection flags are set.
    pub fn new(flags: u32) -> Result<Self, ValidationError> {
        if flags & !Self::VALID != 0 {
            return Err(ValidationError::InvalidProtectionState { value: flags });
        }
        Ok(Self {
            flags,
            password_hash: None,
        })
    }

    /// Attach a password hash structure, stored verbatim in `DPB=`.
    #[must_use]
    pub fn with_password_hash(mut self, hash: Vec<u8>) -> Self {
        self.password_hash = Some(hash);
        self
    }

    #[must_use]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    #[must_use]
    pub fn password_hash(&self) -> Option<&[u8]> {
        self.password_hash.as_deref()
    }
}

/// Scalar project properties written to PROJECTINFORMATION.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub sys_kind: SysKind,
    /// PROJECTCOMPATVERSION, omitted when `None`.
    pub compat_version: Option<u32>,
    pub lcid: u32,
    pub lcid_invoke: u32,
    pub codepage: Codepage,
    pub name: String,
    pub doc_string: String,
    pub help_file: String,
    pub help_context: u32,
    pub version_major: u32,
    pub version_minor: u16,
    pub constants: String,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            sys_kind: SysKind::Win32,
            compat_version: None,
            lcid: 0x409,
            lcid_invoke: 0x409,
            codepage: Codepage::WINDOWS_1252,
            name: "VBAProject".to_string(),
            doc_string: String::new(),
            help_file: String::new(),
            help_context: 0,
            version_major: 1,
            version_minor: 0,
            constants: String::new(),
        }
    }
}

impl ProjectInfo {
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_codepage(mut self, codepage: Codepage) -> Self {
        self.codepage = codepage;
        self
    }

    #[must_use]
    pub fn with_sys_kind(mut self, sys_kind: SysKind) -> Self {
        self.sys_kind = sys_kind;
        self
    }

    #[must_use]
    pub fn with_compat_version(mut self, compat_version: u32) -> Self {
        self.compat_version = Some(compat_version);
        self
    }

    #[must_use]
    pub fn with_doc_string(mut self, doc_string: impl Into<String>) -> Self {
        self.doc_string = doc_string.into();
        self
    }

    #[must_use]
    pub fn with_help_file(mut self, help_file: impl Into<String>, help_context: u32) -> Self {
        self.help_file = help_file.into();
        self.help_context = help_context;
        self
    }

    #[must_use]
    pub fn with_version(mut self, major: u32, minor: u16) -> Self {
        self.version_major = major;
        self.version_minor = minor;
        self
    }

    /// Conditional compilation constants, e.g. `DEBUG = 1 : TRACE = 0`.
    #[must_use]
    pub fn with_constants(mut self, constants: impl Into<String>) -> Self {
        self.constants = constants.into();
        self
    }
}

/// Frozen project, ready for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VbaProject {
    info: ProjectInfo,
    project_id: Uuid,
    visibility: VisibilityState,
    protection: ProtectionState,
    modules: Vec<Module>,
    references: Vec<ReferenceRecord>,
    performance_cache: Option<Vec<u8>>,
}

impl VbaProject {
    #[must_use]
    pub fn info(&self) -> &ProjectInfo {
        &self.info
    }

    #[must_use]
    pub fn codepage(&self) -> Codepage {
        self.info.codepage
    }

    #[must_use]
    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    #[must_use]
    pub fn visibility(&self) -> VisibilityState {
        self.visibility
    }

    #[must_use]
    pub fn protection(&self) -> &ProtectionState {
        &self.protection
    }

    /// Modules in insertion order.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// References in insertion order.
    #[must_use]
    pub fn references(&self) -> &[ReferenceRecord] {
        &self.references
    }

    #[must_use]
    pub fn performance_cache(&self) -> Option<&[u8]> {
        self.performance_cache.as_deref()
    }
}

/// Mutable project under construction.
#[derive(Debug, Clone, Default)]
pub struct ProjectBuilder {
    project: VbaProject,
}

impl Default for VbaProject {
    fn default() -> Self {
        Self {
            info: ProjectInfo::default(),
            project_id: Uuid::nil(),
            visibility: VisibilityState::Visible,
            protection: ProtectionState::default(),
            modules: Vec::new(),
            references: Vec::new(),
            performance_cache: None,
        }
    }
}

impl ProjectBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the given project properties.
    ///
    /// # Errors
    ///
    /// Fails when the project name is not a VBA identifier.
    pub fn with_info(info: ProjectInfo) -> Result<Self, ValidationError> {
        let mut builder = Self::new();
        builder.set_info(info)?;
        Ok(builder)
    }

    /// Replace the project properties.
    pub fn set_info(&mut self, info: ProjectInfo) -> Result<(), ValidationError> {
        validate_identifier(&info.name)?;
        self.project.info = info;
        Ok(())
    }

    #[must_use]
    pub fn info(&self) -> &ProjectInfo {
        &self.project.info
    }

    /// Append a module.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateModule`] when a module with the
    /// same name, compared case-insensitively, already exists, and
    /// [`ValidationError::DuplicateStream`] when its stream name collides
    /// with another module's the same way. A stream name that is not a
    /// valid storage entry is rejected with
    /// [`ValidationError::InvalidStreamName`].
    pub fn add_module(&mut self, module: Module) -> Result<(), ValidationError> {
        let modules = &self.project.modules;
        if modules
            .iter()
            .any(|existing| existing.name().eq_ignore_ascii_case(module.name()))
        {
            return Err(ValidationError::duplicate_module(module.name()));
        }
        validate_stream_name(module.stream_name())?;
        if modules
            .iter()
            .any(|existing| same_stream(existing.stream_name(), module.stream_name()))
        {
            return Err(ValidationError::DuplicateStream {
                name: module.stream_name().to_owned(),
            });
        }
        debug!(module = module.name(), kind = module.kind().label(), "added module");
        self.project.modules.push(module);
        Ok(())
    }

    /// Append a reference. Duplicates are allowed.
    pub fn add_reference(&mut self, reference: ReferenceRecord) {
        debug!(reference = %reference.name, kind = reference.tag(), "added reference");
        self.project.references.push(reference);
    }

    /// Set visibility from its stored numeric form.
    ///
    /// # Errors
    ///
    /// Accepts exactly 0 (hidden) and 255 (visible).
    pub fn set_visibility_state(&mut self, value: i64) -> Result<(), ValidationError> {
        self.project.visibility = VisibilityState::try_from(value)?;
        Ok(())
    }

    pub fn set_visibility(&mut self, visibility: VisibilityState) {
        self.project.visibility = visibility;
    }

    /// Set protection from raw flags.
    ///
    /// # Errors
    ///
    /// Fails when bits outside the protection flags are set.
    pub fn set_protection_flags(&mut self, flags: u32) -> Result<(), ValidationError> {
        self.project.protection = ProtectionState::new(flags)?;
        Ok(())
    }

    pub fn set_protection_state(&mut self, protection: ProtectionState) {
        self.project.protection = protection;
    }

    /// Set the project GUID from braced text.
    ///
    /// # Errors
    ///
    /// Fails unless `guid` has the `{8-4-4-4-12}` hex shape.
    pub fn set_project_id(&mut self, guid: &str) -> Result<(), ValidationError> {
        self.project.project_id = crate::guid::parse_braced(guid)?;
        Ok(())
    }

    pub fn set_performance_cache(&mut self, cache: Vec<u8>) {
        self.project.performance_cache = Some(cache);
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.project.modules
    }

    #[must_use]
    pub fn references(&self) -> &[ReferenceRecord] {
        &self.project.references
    }

    /// Snapshot the current state.
    #[must_use]
    pub fn build(&self) -> VbaProject {
        self.project.clone()
    }

    /// Finish building without copying.
    #[must_use]
    pub fn into_project(self) -> VbaProject {
        self.project
    }
}

/// Compound-file names compare case-insensitively.
fn same_stream(a: &str, b: &str) -> bool {
    a.to_uppercase() == b.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_accepts_only_0_and_255() {
        let mut builder = ProjectBuilder::new();
        builder.set_visibility_state(0).unwrap();
        assert_eq!(builder.build().visibility(), VisibilityState::Hidden);
        builder.set_visibility_state(255).unwrap();
        assert_eq!(builder.build().visibility(), VisibilityState::Visible);

        for value in [1, -1, 254, 256, i64::MAX] {
            assert_eq!(
                builder.set_visibility_state(value),
                Err(ValidationError::InvalidVisibilityState { value })
            );
        }
        assert_eq!(builder.build().visibility(), VisibilityState::Visible);
    }

    #[test]
    fn test_duplicate_module_case_insensitive() {
        let mut builder = ProjectBuilder::new();
        builder.add_module(Module::standard("Module1", "").unwrap()).unwrap();
        let err = builder
            .add_module(Module::class("module1", "").unwrap())
            .unwrap_err();
        assert_eq!(err, ValidationError::duplicate_module("module1"));
        assert_eq!(builder.modules().len(), 1);
    }

    #[test]
    fn test_stream_names_unique_ignoring_case() {
        let mut builder = ProjectBuilder::new();
        builder
            .add_module(Module::standard("Alpha", "").unwrap().with_stream_name("beta").unwrap())
            .unwrap();
        let err = builder.add_module(Module::standard("Beta", "").unwrap()).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateStream { name: "Beta".into() });

        let err = builder
            .add_module(Module::class("Gamma", "").unwrap().with_stream_name("BETA").unwrap())
            .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateStream { name: "BETA".into() });
        assert_eq!(builder.modules().len(), 1);

        // A stream may reuse the name of a module whose stream is elsewhere.
        builder
            .add_module(Module::class("Gamma", "").unwrap().with_stream_name("Alpha").unwrap())
            .unwrap();
        assert_eq!(builder.modules().len(), 2);
    }

    #[test]
    fn test_module_name_too_long_for_stream() {
        let mut builder = ProjectBuilder::new();
        let name = format!("M{}", "x".repeat(31));
        let err = builder.add_module(Module::standard(name.as_str(), "").unwrap()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidStreamName { .. }));
        assert!(builder.modules().is_empty());
    }

    #[test]
    fn test_duplicate_references_allowed() {
        let mut builder = ProjectBuilder::new();
        builder.add_reference(ReferenceRecord::stdole());
        builder.add_reference(ReferenceRecord::stdole());
        assert_eq!(builder.references().len(), 2);
    }

    #[test]
    fn test_project_id() {
        let mut builder = ProjectBuilder::new();
        builder
            .set_project_id("{12345678-1234-1234-1234-123456789012}")
            .unwrap();
        assert_eq!(
            builder.build().project_id(),
            Uuid::from_u128(0x1234_5678_1234_1234_1234_1234_5678_9012)
        );
        assert!(builder.set_project_id("12345678-1234-1234-1234-123456789012").is_err());
        assert!(builder.set_project_id("{1234}").is_err());
    }

    #[test]
    fn test_protection_flags() {
        assert!(ProtectionState::new(0).is_ok());
        assert_eq!(ProtectionState::new(7).unwrap().flags(), 7);
        assert_eq!(
            ProtectionState::new(8),
            Err(ValidationError::InvalidProtectionState { value: 8 })
        );
    }

    #[test]
    fn test_project_name_must_be_identifier() {
        assert!(ProjectBuilder::with_info(ProjectInfo::default().with_name("Budget2024")).is_ok());
        assert!(ProjectBuilder::with_info(ProjectInfo::default().with_name("My Project")).is_err());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut builder = ProjectBuilder::new();
        builder.add_module(Module::standard("A", "").unwrap()).unwrap();
        let snapshot = builder.build();
        builder.add_module(Module::standard("B", "").unwrap()).unwrap();
        assert_eq!(snapshot.modules().len(), 1);
        assert_eq!(builder.build().modules().len(), 2);
    }

    #[test]
    fn test_defaults() {
        let info = ProjectInfo::default();
        assert_eq!(info.sys_kind.value(), 1);
        assert_eq!(info.lcid, 0x409);
        assert_eq!(info.codepage.get(), 1252);
        assert_eq!(info.name, "VBAProject");
        assert_eq!(SysKind::from_value(3), Some(SysKind::Win64));
        assert_eq!(SysKind::from_value(4), None);
    }
}
