//! Uncompressed `dir` stream bytes back to project fields.

use tracing::debug;

use super::VERSION_RESERVED;
use crate::codepage::Codepage;
use crate::error::{DecodingError, FramingError, Result};
use crate::field::ids::{
    DIR_TERMINATOR, PROJECT_CODEPAGE, PROJECT_COMPATVERSION, PROJECT_CONSTANTS,
    PROJECT_CONSTANTS_UNICODE, PROJECT_COOKIE, PROJECT_DOCSTRING, PROJECT_DOCSTRING_UNICODE,
    PROJECT_HELPCONTEXT, PROJECT_HELPFILEPATH, PROJECT_HELPFILEPATH_2, PROJECT_LCID,
    PROJECT_LCIDINVOKE, PROJECT_LIBFLAGS, PROJECT_MODULES, PROJECT_NAME, PROJECT_SYSKIND,
    PROJECT_VERSION,
};
use crate::field::{ByteReader, DualEncodedString, DualIds};
use crate::module::ModuleRecord;
use crate::project::{ProjectInfo, SysKind};
use crate::reference::ReferenceRecord;

/// Contents of a decoded `dir` stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirStream {
    pub info: ProjectInfo,
    pub references: Vec<ReferenceRecord>,
    pub modules: Vec<ModuleRecord>,
}

/// Decompress, then decode.
///
/// # Errors
///
/// Fails on a malformed compressed container or any [`decode`] failure.
pub fn decode_compressed(bytes: &[u8]) -> Result<DirStream> {
    let raw = vba_compression::decompress(bytes)?;
    decode(&raw)
}

/// Decode an uncompressed `dir` stream.
///
/// # Errors
///
/// Fails on truncation, an unexpected record id, a size field that does
/// not match its payload, dual strings whose halves disagree, or bytes
/// after the terminator.
pub fn decode(bytes: &[u8]) -> Result<DirStream> {
    let mut reader = ByteReader::new(bytes);
    let info = read_information(&mut reader)?;
    let codepage = info.codepage;

    let mut references = Vec::new();
    while reader.peek_id() != Some(PROJECT_MODULES) {
        let reference = ReferenceRecord::decode(&mut reader, codepage)?;
        debug!(name = %reference.name, kind = reference.tag(), "decoded reference");
        references.push(reference);
    }

    let count = reader.record_int::<u16>(PROJECT_MODULES, "PROJECTMODULES")?;
    reader.record_int::<u16>(PROJECT_COOKIE, "PROJECTCOOKIE")?;
    let modules = (0..count)
        .map(|_| ModuleRecord::decode(&mut reader, codepage))
        .collect::<Result<Vec<_>>>()?;
    reader.marker(DIR_TERMINATOR, "dir terminator")?;

    if !reader.is_empty() {
        return Err(DecodingError::TrailingBytes {
            count: reader.remaining(),
        }
        .into());
    }

    Ok(DirStream {
        info,
        references,
        modules,
    })
}

fn read_information(reader: &mut ByteReader<'_>) -> Result<ProjectInfo> {
    let sys_kind = reader.record_int::<u32>(PROJECT_SYSKIND, "PROJECTSYSKIND")?;
    let sys_kind = SysKind::from_value(sys_kind).ok_or(DecodingError::InvalidValue {
        field: "SysKind",
        value: u64::from(sys_kind),
    })?;
    let compat_version = match reader.peek_id() {
        Some(PROJECT_COMPATVERSION) => {
            Some(reader.record_int::<u32>(PROJECT_COMPATVERSION, "PROJECTCOMPATVERSION")?)
        }
        _ => None,
    };
    let lcid = reader.record_int::<u32>(PROJECT_LCID, "PROJECTLCID")?;
    let lcid_invoke = reader.record_int::<u32>(PROJECT_LCIDINVOKE, "PROJECTLCIDINVOKE")?;
    let codepage = reader.record_int::<u16>(PROJECT_CODEPAGE, "PROJECTCODEPAGE")?;
    let codepage = Codepage::new(codepage).map_err(|_| DecodingError::InvalidValue {
        field: "CodePage",
        value: u64::from(codepage),
    })?;

    let name = codepage.decode("ProjectName", reader.record(PROJECT_NAME, "PROJECTNAME")?)?;
    let doc_string = DualEncodedString::decode(
        reader,
        DualIds::new(PROJECT_DOCSTRING, PROJECT_DOCSTRING_UNICODE),
        "ProjectDocString",
    )?
    .text("ProjectDocString", codepage)?;

    let help_file = codepage.decode(
        "ProjectHelpFile",
        reader.record(PROJECT_HELPFILEPATH, "PROJECTHELPFILEPATH")?,
    )?;
    let help_file_2 = codepage.decode(
        "ProjectHelpFile",
        reader.record(PROJECT_HELPFILEPATH_2, "PROJECTHELPFILEPATH")?,
    )?;
    if help_file != help_file_2 {
        return Err(DecodingError::DualMismatch {
            field: "ProjectHelpFile",
            ansi: help_file,
            unicode: help_file_2,
        }
        .into());
    }
    let help_context = reader.record_int::<u32>(PROJECT_HELPCONTEXT, "PROJECTHELPCONTEXT")?;
    reader.record_int::<u32>(PROJECT_LIBFLAGS, "PROJECTLIBFLAGS")?;

    let offset = reader.position();
    reader.expect_id(PROJECT_VERSION, "PROJECTVERSION")?;
    let reserved = reader.read::<u32>()?;
    if reserved != VERSION_RESERVED {
        return Err(FramingError {
            id: PROJECT_VERSION,
            offset,
            declared: reserved as usize,
            actual: VERSION_RESERVED as usize,
        }
        .into());
    }
    let version_major = reader.read::<u32>()?;
    let version_minor = reader.read::<u16>()?;

    let constants = DualEncodedString::decode(
        reader,
        DualIds::new(PROJECT_CONSTANTS, PROJECT_CONSTANTS_UNICODE),
        "ProjectConstants",
    )?
    .text("ProjectConstants", codepage)?;

    Ok(ProjectInfo {
        sys_kind,
        compat_version,
        lcid,
        lcid_invoke,
        codepage,
        name,
        doc_string,
        help_file,
        help_context,
        version_major,
        version_minor,
        constants,
    })
}
