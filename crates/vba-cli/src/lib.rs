//! Library side of the `vba-compiler` binary.

pub mod build;
pub mod logging;
