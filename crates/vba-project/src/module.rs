//! Module entity and its MODULE directory record (MS-OVBA 2.3.4.2.3.2).

use uuid::Uuid;

use crate::codepage::Codepage;
use crate::error::{EncodingError, ProjectError, ValidationError};
use crate::field::ids::{
    MODULE_COOKIE, MODULE_DOCSTRING, MODULE_DOCSTRING_UNICODE, MODULE_HELPCONTEXT, MODULE_NAME,
    MODULE_NAME_UNICODE, MODULE_OFFSET, MODULE_PRIVATE, MODULE_READONLY, MODULE_STREAMNAME,
    MODULE_STREAMNAME_UNICODE, MODULE_TERMINATOR, MODULE_TYPE_OTHER, MODULE_TYPE_PROCEDURAL,
};
use crate::field::{ByteReader, DualEncodedString, DualIds, RecordWriter};

/// Lines of the `VERSION 1.0 CLASS` / `BEGIN` / `MultiUse = -1` / `END`
/// header that exported class and document modules start with.
pub const CLASS_HEADER_LINES: usize = 4;

/// Value of every MODULECOOKIE record.
const COOKIE: u16 = 0xFFFF;

/// Longest compound-file entry name, in UTF-16 code units.
pub const MAX_STREAM_NAME_UNITS: usize = 31;

const NAME_IDS: DualIds = DualIds::new(MODULE_NAME, MODULE_NAME_UNICODE);
const STREAM_NAME_IDS: DualIds = DualIds::new(MODULE_STREAMNAME, MODULE_STREAMNAME_UNICODE);
const DOC_STRING_IDS: DualIds = DualIds::new(MODULE_DOCSTRING, MODULE_DOCSTRING_UNICODE);

/// The four module variants a project can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKind {
    /// Procedural module (`.bas`).
    Standard,
    /// Class module (`.cls`).
    Class,
    /// Module behind a host document such as `ThisWorkbook` or `Sheet1`.
    Document { type_guid: Option<Uuid> },
    /// User form: code plus the designer's binary frame resource (`.frx`).
    ///
    /// `type_guid` names the designer class; unset means MSForms.
    Form { type_guid: Option<Uuid>, frame: Vec<u8> },
}

impl ModuleKind {
    /// Whether the module is written with MODULETYPE `0x0021`.
    #[must_use]
    pub fn is_procedural(&self) -> bool {
        matches!(self, Self::Standard)
    }

    /// Short label for logs and tables.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Class => "class",
            Self::Document { .. } => "document",
            Self::Form { .. } => "form",
        }
    }
}

/// One source module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    name: String,
    kind: ModuleKind,
    source: String,
    stream_name: Option<String>,
    doc_string: String,
    help_context: u32,
    read_only: bool,
    private: bool,
}

impl Module {
    /// Create a module.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidIdentifier`] when `name` is not a
    /// VBA identifier.
    pub fn new(name: impl Into<String>, kind: ModuleKind, source: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_identifier(&name)?;
        Ok(Self {
            name,
            kind,
            source: source.into(),
            stream_name: None,
            doc_string: String::new(),
            help_context: 0,
            read_only: false,
            private: false,
        })
    }

    pub fn standard(name: impl Into<String>, source: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(name, ModuleKind::Standard, source)
    }

    pub fn class(name: impl Into<String>, source: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(name, ModuleKind::Class, source)
    }

    pub fn document(name: impl Into<String>, source: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(name, ModuleKind::Document { type_guid: None }, source)
    }

    pub fn form(
        name: impl Into<String>,
        source: impl Into<String>,
        frame: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            name,
            ModuleKind::Form {
                type_guid: None,
                frame,
            },
            source,
        )
    }

    /// Set the type GUID of a document or form module.
    ///
    /// Standard and class modules carry no type GUID and are returned
    /// unchanged.
    #[must_use]
    pub fn with_type_guid(mut self, guid: Uuid) -> Self {
        if let ModuleKind::Document { type_guid } | ModuleKind::Form { type_guid, .. } = &mut self.kind {
            *type_guid = Some(guid);
        }
        self
    }

    /// Store the module under a stream name other than its own name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidStreamName`] when `stream_name`
    /// cannot name an entry in the `VBA` storage.
    pub fn with_stream_name(mut self, stream_name: impl Into<String>) -> Result<Self, ValidationError> {
        let stream_name = stream_name.into();
        validate_stream_name(&stream_name)?;
        self.stream_name = Some(stream_name);
        Ok(self)
    }

    #[must_use]
    pub fn with_doc_string(mut self, doc_string: impl Into<String>) -> Self {
        self.doc_string = doc_string.into();
        self
    }

    #[must_use]
    pub fn with_help_context(mut self, help_context: u32) -> Self {
        self.help_context = help_context;
        self
    }

    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    #[must_use]
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &ModuleKind {
        &self.kind
    }

    #[must_use]
    pub fn type_guid(&self) -> Option<Uuid> {
        match self.kind {
            ModuleKind::Document { type_guid } | ModuleKind::Form { type_guid, .. } => type_guid,
            ModuleKind::Standard | ModuleKind::Class => None,
        }
    }

    /// Source text exactly as supplied.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Name of the module's stream in the `VBA` storage.
    #[must_use]
    pub fn stream_name(&self) -> &str {
        self.stream_name.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn doc_string(&self) -> &str {
        &self.doc_string
    }

    #[must_use]
    pub fn help_context(&self) -> u32 {
        self.help_context
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.private
    }

    /// Source text as stored in the module stream.
    ///
    /// Line endings become CRLF. Exported files lose their leading
    /// `VERSION` block: the [`CLASS_HEADER_LINES`]-line header of a class
    /// or document module, or a form's designer block up to its first
    /// top-level `End`. Applying the transform to its own output changes
    /// nothing.
    #[must_use]
    pub fn normalized_source(&self) -> String {
        let text = self.source.replace("\r\n", "\n").replace('\r', "\n");
        let mut lines: Vec<&str> = text.split('\n').collect();

        let skip = match lines.first() {
            Some(first) if first.starts_with("VERSION") && first.contains("CLASS") => CLASS_HEADER_LINES,
            Some(first) if first.starts_with("VERSION") => lines
                .iter()
                .position(|line| line.trim_end() == "End")
                .map_or(0, |end| end + 1),
            _ => 0,
        };
        lines.drain(..skip.min(lines.len()));
        lines.join("\r\n")
    }

    /// The directory-stream view of this module.
    #[must_use]
    pub fn record(&self, text_offset: u32) -> ModuleRecord {
        ModuleRecord {
            name: self.name.clone(),
            stream_name: self.stream_name().to_string(),
            doc_string: self.doc_string.clone(),
            text_offset,
            help_context: self.help_context,
            procedural: self.kind.is_procedural(),
            read_only: self.read_only,
            private: self.private,
        }
    }

    /// Encode the MODULE record.
    ///
    /// `text_offset` is the length of the p-code that precedes the
    /// compressed source in the module stream.
    pub fn directory_record(&self, text_offset: u32, codepage: Codepage) -> Result<Vec<u8>, EncodingError> {
        let mut out = RecordWriter::new();
        self.record(text_offset).encode(codepage, &mut out)?;
        Ok(out.into_bytes())
    }
}

/// Check that `name` is a VBA identifier: ASCII letters, digits and
/// underscores, starting with a letter.
///
/// A leading underscore is rejected as well as a leading digit, matching
/// what the VBA editor accepts for module and project names.
pub fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::invalid_identifier(name))
    }
}

/// Check that `name` can be used as a stream name inside the `VBA` storage.
///
/// Compound-file entry names are 1 to 31 UTF-16 units and may not contain
/// `/`, `\`, `:`, `!` or control characters. `.` and `..` are refused too.
pub fn validate_stream_name(name: &str) -> Result<(), ValidationError> {
    let reason = if name.is_empty() {
        Some("empty")
    } else if name.encode_utf16().count() > MAX_STREAM_NAME_UNITS {
        Some("longer than 31 UTF-16 units")
    } else if name == "." || name == ".." {
        Some("relative path component")
    } else if name.chars().any(|c| matches!(c, '/' | '\\' | ':' | '!') || c.is_control()) {
        Some("contains a reserved character")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ValidationError::invalid_stream_name(name, reason)),
        None => Ok(()),
    }
}

/// MODULE record fields, as written to or read from a directory stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub name: String,
    pub stream_name: String,
    pub doc_string: String,
    pub text_offset: u32,
    pub help_context: u32,
    pub procedural: bool,
    pub read_only: bool,
    pub private: bool,
}

impl ModuleRecord {
    /// Write the record: name, stream name, doc string, offset, help
    /// context, cookie, type, then the read-only and private flags.
    pub fn encode(&self, codepage: Codepage, out: &mut RecordWriter) -> Result<(), EncodingError> {
        DualEncodedString::new("ModuleName", &self.name, codepage)?.encode(NAME_IDS, "ModuleName", out)?;
        DualEncodedString::new("ModuleStreamName", &self.stream_name, codepage)?.encode(
            STREAM_NAME_IDS,
            "ModuleStreamName",
            out,
        )?;
        DualEncodedString::new("ModuleDocString", &self.doc_string, codepage)?.encode(
            DOC_STRING_IDS,
            "ModuleDocString",
            out,
        )?;

        out.record_int(MODULE_OFFSET, self.text_offset)
            .record_int(MODULE_HELPCONTEXT, self.help_context)
            .record_int(MODULE_COOKIE, COOKIE)
            .marker(if self.procedural {
                MODULE_TYPE_PROCEDURAL
            } else {
                MODULE_TYPE_OTHER
            });
        if self.read_only {
            out.marker(MODULE_READONLY);
        }
        if self.private {
            out.marker(MODULE_PRIVATE);
        }
        out.marker(MODULE_TERMINATOR);
        Ok(())
    }

    /// Read one record, through its terminator.
    pub fn decode(reader: &mut ByteReader<'_>, codepage: Codepage) -> Result<Self, ProjectError> {
        let name = DualEncodedString::decode(reader, NAME_IDS, "ModuleName")?.text("ModuleName", codepage)?;
        let stream_name = DualEncodedString::decode(reader, STREAM_NAME_IDS, "ModuleStreamName")?
            .text("ModuleStreamName", codepage)?;
        let doc_string = DualEncodedString::decode(reader, DOC_STRING_IDS, "ModuleDocString")?
            .text("ModuleDocString", codepage)?;
        let text_offset = reader.record_int::<u32>(MODULE_OFFSET, "MODULEOFFSET")?;
        let help_context = reader.record_int::<u32>(MODULE_HELPCONTEXT, "MODULEHELPCONTEXT")?;
        reader.record_int::<u16>(MODULE_COOKIE, "MODULECOOKIE")?;

        let procedural = reader.peek_id() == Some(MODULE_TYPE_PROCEDURAL);
        reader.marker(
            if procedural {
                MODULE_TYPE_PROCEDURAL
            } else {
                MODULE_TYPE_OTHER
            },
            "MODULETYPE",
        )?;
        let read_only = reader.marker_if(MODULE_READONLY, "MODULEREADONLY")?;
        let private = reader.marker_if(MODULE_PRIVATE, "MODULEPRIVATE")?;
        reader.marker(MODULE_TERMINATOR, "module terminator")?;

        Ok(Self {
            name,
            stream_name,
            doc_string,
            text_offset,
            help_context,
            procedural,
            read_only,
            private,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_rules() {
        for name in ["Module1", "ThisWorkbook", "a", "My_Class_2"] {
            assert!(validate_identifier(name).is_ok(), "{name}");
        }
        for name in ["", "1Module", "_hidden", "My Module", "Modül", "Sheet-1"] {
            assert_eq!(
                validate_identifier(name),
                Err(ValidationError::invalid_identifier(name)),
                "{name}"
            );
        }
        assert!(Module::standard("9Lives", "").is_err());
    }

    #[test]
    fn test_line_endings() {
        let module = Module::standard("Module1", "Sub Foo()\nEnd Sub\r\nSub Bar()\rEnd Sub").unwrap();
        assert_eq!(
            module.normalized_source(),
            "Sub Foo()\r\nEnd Sub\r\nSub Bar()\r\nEnd Sub"
        );
    }

    #[test]
    fn test_class_header_stripped() {
        let source = "VERSION 1.0 CLASS\nBEGIN\n  MultiUse = -1  'True\nEND\nAttribute VB_Name = \"Widget\"\nOption Explicit\n";
        let module = Module::class("Widget", source).unwrap();
        let normalized = module.normalized_source();
        assert_eq!(normalized, "Attribute VB_Name = \"Widget\"\r\nOption Explicit\r\n");

        // Stored text untouched, transform idempotent.
        assert_eq!(module.source(), source);
        let again = Module::class("Widget", normalized.clone()).unwrap();
        assert_eq!(again.normalized_source(), normalized);
    }

    #[test]
    fn test_document_without_header_kept() {
        let source = "Attribute VB_Name = \"ThisWorkbook\"\r\nPrivate Sub Workbook_Open()\r\nEnd Sub";
        let module = Module::document("ThisWorkbook", source).unwrap();
        assert_eq!(module.normalized_source(), source);
    }

    #[test]
    fn test_form_designer_block_stripped() {
        let source = "VERSION 5.00\nBegin {C62A69F0-16DC-11CE-9E98-00AA00574A4F} UserForm1\n   Caption = \"UserForm1\"\nEnd\nAttribute VB_Name = \"UserForm1\"\n";
        let module = Module::form("UserForm1", source, vec![0xFF]).unwrap();
        assert_eq!(module.normalized_source(), "Attribute VB_Name = \"UserForm1\"\r\n");
    }

    #[test]
    fn test_exported_header_stripped_for_any_kind() {
        // Discovery loads ClassModules/*.cls as standard modules.
        let source = "VERSION 1.0 CLASS\r\nBEGIN\r\n  MultiUse = -1  'True\r\nEND\r\nOption Explicit";
        let module = Module::standard("Widget", source).unwrap();
        assert_eq!(module.normalized_source(), "Option Explicit");
    }

    #[test]
    fn test_stream_name_defaults_to_name() {
        let module = Module::standard("Module1", "").unwrap();
        assert_eq!(module.stream_name(), "Module1");
        let renamed = module.with_stream_name("Module1_old").unwrap();
        assert_eq!(renamed.stream_name(), "Module1_old");
        assert_eq!(renamed.name(), "Module1");
    }

    #[test]
    fn test_stream_name_rules() {
        let longest = "x".repeat(31);
        for name in ["Module1", "Sheet 1", "_VBA_PROJECT_CUR", "a.b", longest.as_str()] {
            assert!(validate_stream_name(name).is_ok(), "{name}");
        }
        let rejected = [
            ("", "empty"),
            ("..", "relative path component"),
            (".", "relative path component"),
            ("../../escape", "contains a reserved character"),
            ("dir\\file", "contains a reserved character"),
            ("C:stream", "contains a reserved character"),
            ("bang!", "contains a reserved character"),
            ("tab\tname", "contains a reserved character"),
        ];
        for (name, reason) in rejected {
            assert_eq!(
                validate_stream_name(name),
                Err(ValidationError::invalid_stream_name(name, reason)),
                "{name:?}"
            );
        }
        let long = "x".repeat(32);
        assert_eq!(
            validate_stream_name(&long),
            Err(ValidationError::invalid_stream_name(&long, "longer than 31 UTF-16 units"))
        );
        // Units, not bytes: 31 two-byte characters still fit.
        assert!(validate_stream_name(&"é".repeat(31)).is_ok());
    }

    #[test]
    fn test_with_stream_name_rejects_path() {
        let err = Module::standard("Gamma", "").unwrap().with_stream_name("../../escape");
        assert!(matches!(err, Err(ValidationError::InvalidStreamName { .. })));
        let err = Module::standard("Delta", "").unwrap().with_stream_name("");
        assert!(matches!(err, Err(ValidationError::InvalidStreamName { .. })));
    }

    #[test]
    fn test_type_guid_only_on_document_and_form() {
        let guid = Uuid::from_u128(0x0002_0819_0000_0000_C000_0000_0000_0046);
        assert_eq!(Module::document("Sheet1", "").unwrap().type_guid(), None);
        assert_eq!(
            Module::document("Sheet1", "").unwrap().with_type_guid(guid).type_guid(),
            Some(guid)
        );
        let form = Module::form("UserForm1", "", vec![1, 2]).unwrap().with_type_guid(guid);
        assert_eq!(
            form.kind(),
            &ModuleKind::Form {
                type_guid: Some(guid),
                frame: vec![1, 2]
            }
        );
        assert_eq!(Module::standard("Module1", "").unwrap().with_type_guid(guid).type_guid(), None);
    }

    #[test]
    fn test_directory_record_order() {
        let module = Module::standard("M", "").unwrap().with_private(true);
        let bytes = module.directory_record(0x20, Codepage::WINDOWS_1252).unwrap();

        let ids: Vec<u16> = {
            let mut reader = ByteReader::new(&bytes);
            let mut ids = Vec::new();
            while !reader.is_empty() {
                let field = crate::field::IdSizeField::decode(&mut reader).unwrap();
                ids.push(field.id);
            }
            ids
        };
        assert_eq!(
            ids,
            [
                0x0019, 0x0047, 0x001A, 0x0032, 0x001C, 0x0048, 0x0031, 0x001E, 0x002C, 0x0021,
                0x0028, 0x002B
            ]
        );
    }

    #[test]
    fn test_record_round_trip() {
        let module = Module::document("Sheet1", "")
            .unwrap()
            .with_doc_string("First sheet")
            .with_help_context(7)
            .with_read_only(true);
        let record = module.record(1234);
        let mut out = RecordWriter::new();
        record.encode(Codepage::WINDOWS_1252, &mut out).unwrap();

        let mut reader = ByteReader::new(out.as_bytes());
        let decoded = ModuleRecord::decode(&mut reader, Codepage::WINDOWS_1252).unwrap();
        assert_eq!(decoded, record);
        assert!(!decoded.procedural);
        assert!(reader.is_empty());
    }
}
