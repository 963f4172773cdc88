//! The `dir` stream (MS-OVBA 2.3.4.2).
//!
//! ```text
//! PROJECTINFORMATION   SysKind, [CompatVersion], Lcid, LcidInvoke, CodePage,
//!                      Name, DocString, HelpFile, HelpContext, LibFlags,
//!                      Version, Constants
//! PROJECTREFERENCES    one REFERENCE per reference, until 0x000F
//! PROJECTMODULES       0x000F count, 0x0013 cookie, one MODULE per module
//! Terminator           0x0010, 0
//! ```
//!
//! [`encode`] produces the uncompressed stream; the container stores it
//! compressed (see [`crate::streams::ProjectStreams`]).

mod decode;
mod encode;

pub use decode::{DirStream, decode, decode_compressed};
pub use encode::{encode, encode_with_offsets};

/// Longest project name in bytes.
pub const MAX_NAME_LEN: usize = 128;
/// Longest project doc string in bytes (codepage half).
pub const MAX_DOC_STRING_LEN: usize = 2000;
/// Longest help file path in bytes.
pub const MAX_HELP_FILE_LEN: usize = 260;
/// Longest conditional compilation constants string in bytes.
pub const MAX_CONSTANTS_LEN: usize = 1015;

/// Size written in the PROJECTVERSION record, which does not count its payload.
pub(crate) const VERSION_RESERVED: u32 = 4;
/// Value of the PROJECTCOOKIE record.
pub(crate) const PROJECT_COOKIE_VALUE: u16 = 0xFFFF;
