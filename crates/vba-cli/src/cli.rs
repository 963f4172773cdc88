//! CLI argument definitions for the VBA project compiler.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "vba-compiler",
    version,
    about = "Build VBA project streams from exported module sources",
    long_about = "Build the MS-OVBA streams of a VBA project from exported sources.\n\n\
                  Reads .bas, .cls and .frm files, encodes the dir, PROJECT,\n\
                  PROJECTwm, _VBA_PROJECT and module streams, and writes each\n\
                  stream as a file under the output directory."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Discover module sources and write the project streams.
    Build(BuildArgs),

    /// Decode a directory stream and print its contents.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Source root containing Modules, ClassModules, Objects and Forms folders.
    #[arg(
        value_name = "SOURCE",
        required_unless_present = "manifest",
        conflicts_with = "manifest"
    )]
    pub source: Option<PathBuf>,

    /// JSON file dictionary listing module files by role.
    #[arg(long = "manifest", value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Directory that receives one file per stream.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Project name (default: VBAProject).
    #[arg(long = "name")]
    pub name: Option<String>,

    /// Code page for project strings and module source (default: 1252).
    #[arg(long = "codepage", value_name = "CODEPAGE")]
    pub codepage: Option<u16>,

    /// Braced project GUID written to the PROJECT stream.
    #[arg(long = "project-id", value_name = "GUID")]
    pub project_id: Option<String>,

    /// Mark the project as not viewable.
    #[arg(long = "hidden")]
    pub hidden: bool,

    /// Add a reference to the OLE automation type library.
    #[arg(long = "stdole")]
    pub stdole: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Path to a dir stream file.
    #[arg(value_name = "DIR_STREAM")]
    pub dir_stream: PathBuf,

    /// The file holds compressed container bytes.
    #[arg(long = "compressed")]
    pub compressed: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
