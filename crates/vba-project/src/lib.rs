//! VBA project model and MS-OVBA stream encoder.
//!
//! A project is assembled with [`ProjectBuilder`], frozen into a
//! [`VbaProject`], and encoded into the streams a `vbaProject.bin`
//! container holds. The container itself (compound file layout) is
//! written elsewhere.
//!
//! # Example
//!
//! ```
//! use vba_project::{Module, ProjectBuilder, ReferenceRecord, dir};
//!
//! let mut builder = ProjectBuilder::new();
//! builder.add_reference(ReferenceRecord::stdole());
//! builder.add_module(Module::standard("Module1", "Sub Foo()\nEnd Sub")?)?;
//!
//! let project = builder.build();
//! let bytes = dir::encode(&project)?;
//! let decoded = dir::decode(&bytes)?;
//! assert_eq!(decoded.modules[0].name, "Module1");
//! # Ok::<(), vba_project::ProjectError>(())
//! ```

pub mod backend;
mod codepage;
pub mod crypto;
pub mod dir;
mod error;
pub mod field;
mod guid;
mod module;
mod project;
mod project_stream;
mod reference;
mod streams;

pub use backend::{
    Assembler, Backends, Compression, DataEncryption, OvbaCompression, OvbaEncryption,
    PerformanceCacheSource, SourceOnly, StoredPerformanceCache,
};
pub use codepage::Codepage;
pub use dir::DirStream;
pub use error::{
    DecodingError, EncodingError, FramingError, ProjectError, Result, ValidationError,
};
pub use guid::{format_guid, parse_braced};
pub use module::{
    CLASS_HEADER_LINES, MAX_STREAM_NAME_UNITS, Module, ModuleKind, ModuleRecord, validate_identifier,
    validate_stream_name,
};
pub use project::{
    ProjectBuilder, ProjectInfo, ProtectionState, SysKind, VbaProject, VisibilityState,
};
pub use project_stream::{project_text, project_wm};
pub use reference::{ControlReference, Libid, ReferenceKind, ReferenceRecord};
pub use streams::{ModuleStream, ProjectStreams, SOURCE_ONLY_VERSION};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
