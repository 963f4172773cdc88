//! Library references (PROJECTREFERENCES, MS-OVBA 2.3.4.2.2).
//!
//! Every reference starts with a REFERENCENAME record, emitted even when
//! the name is empty, followed by exactly one variant record:
//!
//! | Variant    | Records                                                        |
//! |------------|----------------------------------------------------------------|
//! | Registered | `0x000D` libid, reserved                                       |
//! | Project    | `0x000E` absolute libid, relative libid, major, minor          |
//! | Control    | [`0x0033` original], `0x002F` twiddled, [name], `0x0030` extended |

mod libid;

pub use libid::Libid;

use uuid::Uuid;

use crate::codepage::Codepage;
use crate::error::{DecodingError, EncodingError, ProjectError, ValidationError};
use crate::field::ids::{
    REFERENCE_CONTROL, REFERENCE_CONTROL_EXTENDED, REFERENCE_NAME, REFERENCE_NAME_UNICODE,
    REFERENCE_ORIGINAL, REFERENCE_PROJECT, REFERENCE_REGISTERED,
};
use crate::field::{ByteReader, DualEncodedString, DualIds, RecordWriter};

pub(crate) const NAME_IDS: DualIds = DualIds::new(REFERENCE_NAME, REFERENCE_NAME_UNICODE);

/// A named reference to a type library, another project, or an ActiveX control library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub name: String,
    pub kind: ReferenceKind,
}

/// The variant-specific part of a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Automation type library registered on the machine.
    Registered { libid: String },
    /// Another VBA project.
    Project {
        absolute: String,
        relative: String,
        major: u32,
        minor: u16,
    },
    /// Twiddled type library of an ActiveX control.
    Control(ControlReference),
}

/// Fields of a control reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlReference {
    /// Libid of the original type library, when the control was upgraded.
    pub original: Option<String>,
    pub twiddled: String,
    /// Name stored between the twiddled and extended records.
    pub extended_name: Option<String>,
    pub extended: String,
    pub original_typelib: Uuid,
    pub cookie: u32,
}

impl ReferenceRecord {
    pub fn new(name: impl Into<String>, kind: ReferenceKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Reference to a registered type library.
    pub fn registered(name: impl Into<String>, libid: &Libid) -> Self {
        Self::new(
            name,
            ReferenceKind::Registered {
                libid: libid.to_string(),
            },
        )
    }

    /// Reference to another VBA project.
    pub fn project(
        name: impl Into<String>,
        absolute: impl Into<String>,
        relative: impl Into<String>,
        major: u32,
        minor: u16,
    ) -> Self {
        Self::new(
            name,
            ReferenceKind::Project {
                absolute: absolute.into(),
                relative: relative.into(),
                major,
                minor,
            },
        )
    }

    /// The `stdole` reference every host-created project carries.
    #[must_use]
    pub fn stdole() -> Self {
        Self::registered("stdole", &Libid::stdole())
    }

    /// Parse the libid of a registered reference.
    ///
    /// Returns `None` for project and control references.
    pub fn libid(&self) -> Option<Result<Libid, ValidationError>> {
        match &self.kind {
            ReferenceKind::Registered { libid } => Some(libid.parse()),
            ReferenceKind::Project { .. } | ReferenceKind::Control(_) => None,
        }
    }

    /// Record tag of the variant.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self.kind {
            ReferenceKind::Registered { .. } => "registered",
            ReferenceKind::Project { .. } => "project",
            ReferenceKind::Control(_) => "control",
        }
    }

    /// Encode the name record and the variant record.
    ///
    /// # Errors
    ///
    /// Fails when the name or a libid cannot be encoded in `codepage`.
    pub fn encode(&self, codepage: Codepage, out: &mut RecordWriter) -> Result<(), EncodingError> {
        DualEncodedString::new("ReferenceName", &self.name, codepage)?.encode(
            NAME_IDS,
            "ReferenceName",
            out,
        )?;

        match &self.kind {
            ReferenceKind::Registered { libid } => {
                let libid = codepage.encode("Libid", libid)?;
                out.nested(REFERENCE_REGISTERED, "REFERENCEREGISTERED", |w| {
                    w.sized("Libid", &libid)?.int(0u32).int(0u16);
                    Ok(())
                })?;
            }
            ReferenceKind::Project {
                absolute,
                relative,
                major,
                minor,
            } => {
                let absolute = codepage.encode("LibidAbsolute", absolute)?;
                let relative = codepage.encode("LibidRelative", relative)?;
                out.nested(REFERENCE_PROJECT, "REFERENCEPROJECT", |w| {
                    w.sized("LibidAbsolute", &absolute)?
                        .sized("LibidRelative", &relative)?
                        .int(*major)
                        .int(*minor);
                    Ok(())
                })?;
            }
            ReferenceKind::Control(control) => control.encode(codepage, out)?,
        }
        Ok(())
    }

    /// Decode one reference, starting at its optional name record.
    ///
    /// # Errors
    ///
    /// Fails on truncation, framing mismatches, or an id that starts no
    /// known reference variant.
    pub fn decode(reader: &mut ByteReader<'_>, codepage: Codepage) -> Result<Self, ProjectError> {
        let name = decode_name(reader, codepage)?.unwrap_or_default();

        let kind = match reader.peek_id() {
            Some(REFERENCE_REGISTERED) => {
                reader.framed(REFERENCE_REGISTERED, "REFERENCEREGISTERED", |r| {
                    let libid = codepage.decode("Libid", r.sized()?)?;
                    r.read::<u32>()?;
                    r.read::<u16>()?;
                    Ok(ReferenceKind::Registered { libid })
                })?
            }
            Some(REFERENCE_PROJECT) => reader.framed(REFERENCE_PROJECT, "REFERENCEPROJECT", |r| {
                Ok(ReferenceKind::Project {
                    absolute: codepage.decode("LibidAbsolute", r.sized()?)?,
                    relative: codepage.decode("LibidRelative", r.sized()?)?,
                    major: r.read()?,
                    minor: r.read()?,
                })
            })?,
            Some(REFERENCE_ORIGINAL | REFERENCE_CONTROL) => {
                ReferenceKind::Control(ControlReference::decode(reader, codepage)?)
            }
            Some(found) => {
                return Err(DecodingError::UnexpectedRecord {
                    offset: reader.position(),
                    found,
                    expected: "a reference record",
                }
                .into());
            }
            None => {
                return Err(DecodingError::UnexpectedEof {
                    offset: reader.position(),
                    needed: 2,
                    remaining: reader.remaining(),
                }
                .into());
            }
        };
        Ok(Self { name, kind })
    }
}

impl ControlReference {
    fn encode(&self, codepage: Codepage, out: &mut RecordWriter) -> Result<(), EncodingError> {
        if let Some(original) = &self.original {
            out.record(
                REFERENCE_ORIGINAL,
                "LibidOriginal",
                &codepage.encode("LibidOriginal", original)?,
            )?;
        }

        let twiddled = codepage.encode("LibidTwiddled", &self.twiddled)?;
        out.nested(REFERENCE_CONTROL, "REFERENCECONTROL", |w| {
            w.sized("LibidTwiddled", &twiddled)?.int(0u32).int(0u16);
            Ok(())
        })?;

        if let Some(name) = &self.extended_name {
            DualEncodedString::new("NameRecordExtended", name, codepage)?.encode(
                NAME_IDS,
                "NameRecordExtended",
                out,
            )?;
        }

        let extended = codepage.encode("LibidExtended", &self.extended)?;
        out.nested(REFERENCE_CONTROL_EXTENDED, "REFERENCECONTROL", |w| {
            w.sized("LibidExtended", &extended)?
                .int(0u32)
                .int(0u16)
                .bytes(&self.original_typelib.to_bytes_le())
                .int(self.cookie);
            Ok(())
        })?;
        Ok(())
    }

    fn decode(reader: &mut ByteReader<'_>, codepage: Codepage) -> Result<Self, ProjectError> {
        let original = match reader.peek_id() {
            Some(REFERENCE_ORIGINAL) => Some(
                codepage.decode("LibidOriginal", reader.record(REFERENCE_ORIGINAL, "REFERENCEORIGINAL")?)?,
            ),
            _ => None,
        };

        let twiddled = reader.framed(REFERENCE_CONTROL, "REFERENCECONTROL", |r| {
            let libid = codepage.decode("LibidTwiddled", r.sized()?)?;
            r.read::<u32>()?;
            r.read::<u16>()?;
            Ok(libid)
        })?;

        let extended_name = decode_name(reader, codepage)?;

        let (extended, original_typelib, cookie) =
            reader.framed(REFERENCE_CONTROL_EXTENDED, "REFERENCECONTROL extended", |r| {
                let libid = codepage.decode("LibidExtended", r.sized()?)?;
                r.read::<u32>()?;
                r.read::<u16>()?;
                let guid = Uuid::from_bytes_le(r.array::<16>()?);
                Ok((libid, guid, r.read::<u32>()?))
            })?;

        Ok(Self {
            original,
            twiddled,
            extended_name,
            extended,
            original_typelib,
            cookie,
        })
    }
}

fn decode_name(reader: &mut ByteReader<'_>, codepage: Codepage) -> Result<Option<String>, ProjectError> {
    if reader.peek_id() != Some(REFERENCE_NAME) {
        return Ok(None);
    }
    let name = DualEncodedString::decode(reader, NAME_IDS, "ReferenceName")?;
    Ok(Some(name.text("ReferenceName", codepage)?))
}
