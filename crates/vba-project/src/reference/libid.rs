//! Registered type library identifiers (MS-OVBA 2.1.1.8).
//!
//! ```text
//! *\G{00020430-0000-0000-C000-000000000046}#2.0#0#C:\Windows\System32\stdole2.tlb#OLE Automation
//!    |                                      |   | |                                |
//!    LibidGuid                               |   | LibidPath                        LibidDescription
//!                                            |   LibidLcid (hex)
//!                                            LibidVersion (hex major.minor)
//! ```

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::ValidationError;
use crate::guid::format_guid;

const PREFIX: &str = "*\\G";

/// A parsed `*\G` library identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Libid {
    pub guid: Uuid,
    pub major: u16,
    pub minor: u16,
    pub lcid: u32,
    pub path: String,
    pub description: String,
}

impl Libid {
    pub fn new(guid: Uuid, major: u16, minor: u16) -> Self {
        Self {
            guid,
            major,
            minor,
            lcid: 0,
            path: String::new(),
            description: String::new(),
        }
    }

    /// OLE Automation (`stdole2.tlb`), referenced by every host-created project.
    #[must_use]
    pub fn stdole() -> Self {
        Self {
            guid: Uuid::from_u128(0x0002_0430_0000_0000_C000_0000_0000_0046),
            major: 2,
            minor: 0,
            lcid: 0,
            path: "C:\\Windows\\System32\\stdole2.tlb".to_string(),
            description: "OLE Automation".to_string(),
        }
    }

    #[must_use]
    pub fn with_lcid(mut self, lcid: u32) -> Self {
        self.lcid = lcid;
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl fmt::Display for Libid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}{}#{:x}.{:x}#{:x}#{}#{}",
            format_guid(&self.guid),
            self.major,
            self.minor,
            self.lcid,
            self.path,
            self.description
        )
    }
}

impl FromStr for Libid {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |message: &str| ValidationError::invalid_libid(s, message);

        let body = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| fail("expected *\\G prefix"))?;
        // Anything after the fourth '#' belongs to the description.
        let mut parts = body.splitn(5, '#');
        let guid = parts.next().unwrap_or_default();
        let version = parts.next().ok_or_else(|| fail("missing version"))?;
        let lcid = parts.next().ok_or_else(|| fail("missing LCID"))?;
        let path = parts.next().ok_or_else(|| fail("missing path"))?;
        let description = parts.next().ok_or_else(|| fail("missing description"))?;

        let guid = crate::guid::parse_braced(guid).map_err(|_| fail("malformed GUID"))?;
        let (major, minor) = version
            .split_once('.')
            .ok_or_else(|| fail("version must be major.minor"))?;
        let major = u16::from_str_radix(major, 16).map_err(|_| fail("invalid major version"))?;
        let minor = u16::from_str_radix(minor, 16).map_err(|_| fail("invalid minor version"))?;
        let lcid = u32::from_str_radix(lcid, 16).map_err(|_| fail("invalid LCID"))?;

        Ok(Self {
            guid,
            major,
            minor,
            lcid,
            path: path.to_string(),
            description: description.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STDOLE: &str = "*\\G{00020430-0000-0000-C000-000000000046}#2.0#0#C:\\Windows\\System32\\stdole2.tlb#OLE Automation";

    #[test]
    fn test_stdole_text() {
        assert_eq!(Libid::stdole().to_string(), STDOLE);
    }

    #[test]
    fn test_parse() {
        let libid: Libid = STDOLE.parse().unwrap();
        assert_eq!(libid, Libid::stdole());
    }

    #[test]
    fn test_hex_fields() {
        let libid: Libid = "*\\G{000204EF-0000-0000-C000-000000000046}#4.2#9#VBE7.DLL#Visual Basic For Applications"
            .parse()
            .unwrap();
        assert_eq!((libid.major, libid.minor, libid.lcid), (4, 2, 9));

        let libid = Libid::new(Uuid::nil(), 10, 11).with_lcid(0x409);
        assert!(libid.to_string().contains("#a.b#409#"));
    }

    #[test]
    fn test_parse_errors() {
        assert!("{00020430-0000-0000-C000-000000000046}#2.0#0##".parse::<Libid>().is_err());
        assert!("*\\G{00020430}#2.0#0##".parse::<Libid>().is_err());
        assert!("*\\G{00020430-0000-0000-C000-000000000046}#2#0##".parse::<Libid>().is_err());
        assert!("*\\G{00020430-0000-0000-C000-000000000046}#2.0".parse::<Libid>().is_err());
    }
}
