//! Project snapshot to uncompressed `dir` stream bytes.

use tracing::{debug, info};

use super::{
    MAX_CONSTANTS_LEN, MAX_DOC_STRING_LEN, MAX_HELP_FILE_LEN, MAX_NAME_LEN, PROJECT_COOKIE_VALUE,
    VERSION_RESERVED,
};
use crate::error::{EncodingError, Result};
use crate::field::ids::{
    DIR_TERMINATOR, PROJECT_CODEPAGE, PROJECT_COMPATVERSION, PROJECT_CONSTANTS,
    PROJECT_CONSTANTS_UNICODE, PROJECT_COOKIE, PROJECT_DOCSTRING, PROJECT_DOCSTRING_UNICODE,
    PROJECT_HELPCONTEXT, PROJECT_HELPFILEPATH, PROJECT_HELPFILEPATH_2, PROJECT_LCID,
    PROJECT_LCIDINVOKE, PROJECT_LIBFLAGS, PROJECT_MODULES, PROJECT_NAME, PROJECT_SYSKIND,
    PROJECT_VERSION,
};
use crate::field::{DualEncodedString, DualIds, RecordWriter};
use crate::project::VbaProject;

/// Encode with every MODULEOFFSET set to zero (modules without p-code).
///
/// # Errors
///
/// Any field that cannot be encoded aborts the whole stream.
pub fn encode(project: &VbaProject) -> Result<Vec<u8>> {
    encode_with_offsets(project, &[])
}

/// Encode with per-module text offsets, in module order.
///
/// Modules past the end of `text_offsets` get offset zero.
pub fn encode_with_offsets(project: &VbaProject, text_offsets: &[u32]) -> Result<Vec<u8>> {
    let mut out = RecordWriter::new();
    write_information(project, &mut out)?;

    let codepage = project.codepage();
    for (index, reference) in project.references().iter().enumerate() {
        let start = out.len();
        reference.encode(codepage, &mut out)?;
        debug!(
            index,
            name = %reference.name,
            kind = reference.tag(),
            bytes = out.len() - start,
            "encoded reference"
        );
    }

    let count = u16::try_from(project.modules().len()).map_err(|_| {
        EncodingError::too_long("PROJECTMODULES", project.modules().len(), usize::from(u16::MAX))
    })?;
    out.record_int(PROJECT_MODULES, count)
        .record_int(PROJECT_COOKIE, PROJECT_COOKIE_VALUE);

    for (index, module) in project.modules().iter().enumerate() {
        let text_offset = text_offsets.get(index).copied().unwrap_or(0);
        let start = out.len();
        module.record(text_offset).encode(codepage, &mut out)?;
        debug!(
            index,
            module = module.name(),
            text_offset,
            bytes = out.len() - start,
            "encoded module record"
        );
    }
    out.marker(DIR_TERMINATOR);

    info!(
        project = %project.info().name,
        references = project.references().len(),
        modules = project.modules().len(),
        bytes = out.len(),
        "encoded dir stream"
    );
    Ok(out.into_bytes())
}

fn write_information(project: &VbaProject, out: &mut RecordWriter) -> std::result::Result<(), EncodingError> {
    let info = project.info();
    let codepage = info.codepage;

    out.record_int(PROJECT_SYSKIND, info.sys_kind.value());
    if let Some(compat_version) = info.compat_version {
        out.record_int(PROJECT_COMPATVERSION, compat_version);
    }
    out.record_int(PROJECT_LCID, info.lcid)
        .record_int(PROJECT_LCIDINVOKE, info.lcid_invoke)
        .record_int(PROJECT_CODEPAGE, codepage.get());

    let name = codepage.encode("ProjectName", &info.name)?;
    if name.len() > MAX_NAME_LEN {
        return Err(EncodingError::too_long("ProjectName", name.len(), MAX_NAME_LEN));
    }
    out.record(PROJECT_NAME, "ProjectName", &name)?;

    let doc_string = DualEncodedString::new("ProjectDocString", &info.doc_string, codepage)?;
    doc_string.check_limit("ProjectDocString", MAX_DOC_STRING_LEN)?;
    doc_string.encode(
        DualIds::new(PROJECT_DOCSTRING, PROJECT_DOCSTRING_UNICODE),
        "ProjectDocString",
        out,
    )?;

    // Both help file records carry the same codepage text.
    let help_file = codepage.encode("ProjectHelpFile", &info.help_file)?;
    if help_file.len() > MAX_HELP_FILE_LEN {
        return Err(EncodingError::too_long("ProjectHelpFile", help_file.len(), MAX_HELP_FILE_LEN));
    }
    out.record(PROJECT_HELPFILEPATH, "ProjectHelpFile", &help_file)?
        .record(PROJECT_HELPFILEPATH_2, "ProjectHelpFile", &help_file)?
        .record_int(PROJECT_HELPCONTEXT, info.help_context)
        .record_int(PROJECT_LIBFLAGS, 0u32)
        .int(PROJECT_VERSION)
        .int(VERSION_RESERVED)
        .int(info.version_major)
        .int(info.version_minor);

    let constants = DualEncodedString::new("ProjectConstants", &info.constants, codepage)?;
    constants.check_limit("ProjectConstants", MAX_CONSTANTS_LEN)?;
    constants.encode(
        DualIds::new(PROJECT_CONSTANTS, PROJECT_CONSTANTS_UNICODE),
        "ProjectConstants",
        out,
    )?;
    Ok(())
}
