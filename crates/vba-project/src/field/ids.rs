//! Record identifiers of the directory stream (MS-OVBA 2.3.4.2).

// PROJECTINFORMATION
pub const PROJECT_SYSKIND: u16 = 0x0001;
pub const PROJECT_LCID: u16 = 0x0002;
pub const PROJECT_CODEPAGE: u16 = 0x0003;
pub const PROJECT_NAME: u16 = 0x0004;
pub const PROJECT_DOCSTRING: u16 = 0x0005;
pub const PROJECT_HELPFILEPATH: u16 = 0x0006;
pub const PROJECT_HELPCONTEXT: u16 = 0x0007;
pub const PROJECT_LIBFLAGS: u16 = 0x0008;
pub const PROJECT_VERSION: u16 = 0x0009;
pub const PROJECT_CONSTANTS: u16 = 0x000C;
pub const PROJECT_LCIDINVOKE: u16 = 0x0014;
pub const PROJECT_CONSTANTS_UNICODE: u16 = 0x003C;
pub const PROJECT_HELPFILEPATH_2: u16 = 0x003D;
pub const PROJECT_DOCSTRING_UNICODE: u16 = 0x0040;
pub const PROJECT_COMPATVERSION: u16 = 0x004A;

// PROJECTREFERENCES
pub const REFERENCE_REGISTERED: u16 = 0x000D;
pub const REFERENCE_PROJECT: u16 = 0x000E;
pub const REFERENCE_NAME: u16 = 0x0016;
pub const REFERENCE_CONTROL: u16 = 0x002F;
pub const REFERENCE_CONTROL_EXTENDED: u16 = 0x0030;
pub const REFERENCE_ORIGINAL: u16 = 0x0033;
pub const REFERENCE_NAME_UNICODE: u16 = 0x003E;

// PROJECTMODULES
pub const PROJECT_MODULES: u16 = 0x000F;
pub const DIR_TERMINATOR: u16 = 0x0010;
pub const PROJECT_COOKIE: u16 = 0x0013;
pub const MODULE_NAME: u16 = 0x0019;
pub const MODULE_STREAMNAME: u16 = 0x001A;
pub const MODULE_DOCSTRING: u16 = 0x001C;
pub const MODULE_HELPCONTEXT: u16 = 0x001E;
pub const MODULE_TYPE_PROCEDURAL: u16 = 0x0021;
pub const MODULE_TYPE_OTHER: u16 = 0x0022;
pub const MODULE_READONLY: u16 = 0x0025;
pub const MODULE_PRIVATE: u16 = 0x0028;
pub const MODULE_TERMINATOR: u16 = 0x002B;
pub const MODULE_COOKIE: u16 = 0x002C;
pub const MODULE_OFFSET: u16 = 0x0031;
pub const MODULE_STREAMNAME_UNICODE: u16 = 0x0032;
pub const MODULE_NAME_UNICODE: u16 = 0x0047;
pub const MODULE_DOCSTRING_UNICODE: u16 = 0x0048;
