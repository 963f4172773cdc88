//! Build and inspect commands, kept in the library for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span};

use vba_ingest::{FileManifest, build_from_directory, create_project_from_files};
use vba_project::{
    Backends, Codepage, DirStream, ProjectBuilder, ProjectInfo, ProjectStreams, ReferenceRecord,
    VisibilityState, dir,
};

/// Where module sources come from.
#[derive(Debug, Clone)]
pub enum SourceInput {
    /// Directory with `Modules`, `ClassModules`, `Objects` and `Forms` folders.
    Directory(PathBuf),
    /// JSON file dictionary.
    Manifest(PathBuf),
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub input: SourceInput,
    pub output_dir: PathBuf,
    pub name: Option<String>,
    pub codepage: Option<u16>,
    /// Braced GUID text.
    pub project_id: Option<String>,
    pub hidden: bool,
    /// Add the standard OLE automation reference.
    pub stdole: bool,
}

/// What a build wrote.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub project_name: String,
    pub output_dir: PathBuf,
    pub references: usize,
    pub modules: Vec<ModuleSummary>,
    pub files: Vec<WrittenFile>,
}

#[derive(Debug, Clone)]
pub struct ModuleSummary {
    pub name: String,
    pub kind: &'static str,
    pub stream_name: String,
    pub source_lines: usize,
}

#[derive(Debug, Clone)]
pub struct WrittenFile {
    pub stream: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Collect sources, encode every stream and write each under the output directory.
///
/// # Errors
///
/// Returns an error when discovery, encoding or writing fails.
pub fn run_build(options: &BuildOptions) -> Result<BuildReport> {
    let span = info_span!("build", output = %options.output_dir.display());
    let _guard = span.enter();

    let info = project_info(options)?;
    let mut builder = load_builder(&options.input, info)?;
    configure(&mut builder, options)?;
    let project = builder.into_project();

    let streams = ProjectStreams::build(&project, &Backends::default())
        .context("encode project streams")?;
    let files = write_streams(&streams, &options.output_dir)?;
    info!(files = files.len(), "project streams written");

    let modules = project
        .modules()
        .iter()
        .map(|module| ModuleSummary {
            name: module.name().to_owned(),
            kind: module.kind().label(),
            stream_name: module.stream_name().to_owned(),
            source_lines: module.source().lines().count(),
        })
        .collect();

    Ok(BuildReport {
        project_name: project.info().name.clone(),
        output_dir: options.output_dir.clone(),
        references: project.references().len(),
        modules,
        files,
    })
}

fn project_info(options: &BuildOptions) -> Result<ProjectInfo> {
    let mut info = ProjectInfo::default();
    if let Some(name) = &options.name {
        info = info.with_name(name.clone());
    }
    if let Some(codepage) = options.codepage {
        let codepage = Codepage::new(codepage).context("resolve --codepage")?;
        info = info.with_codepage(codepage);
    }
    Ok(info)
}

fn load_builder(input: &SourceInput, info: ProjectInfo) -> Result<ProjectBuilder> {
    match input {
        SourceInput::Directory(root) => build_from_directory(root, info)
            .with_context(|| format!("collect sources from {}", root.display())),
        SourceInput::Manifest(path) => {
            let manifest = FileManifest::load(path)
                .with_context(|| format!("load manifest {}", path.display()))?;
            create_project_from_files(&manifest, info)
                .with_context(|| format!("collect sources listed in {}", path.display()))
        }
    }
}

fn configure(builder: &mut ProjectBuilder, options: &BuildOptions) -> Result<()> {
    if options.stdole {
        builder.add_reference(ReferenceRecord::stdole());
    }
    if let Some(id) = &options.project_id {
        builder.set_project_id(id).context("parse --project-id")?;
    }
    if options.hidden {
        builder.set_visibility(VisibilityState::Hidden);
    }
    Ok(())
}

/// Write every stream as its own file, mirroring the storage layout.
///
/// # Errors
///
/// Returns an error when a directory or file cannot be written.
pub fn write_streams(streams: &ProjectStreams, output_dir: &Path) -> Result<Vec<WrittenFile>> {
    let mut written = Vec::new();
    for (stream, data) in streams.entries() {
        let path = stream
            .split('/')
            .fold(output_dir.to_path_buf(), |path, part| path.join(part));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, data).with_context(|| format!("write {}", path.display()))?;
        written.push(WrittenFile {
            stream,
            path,
            bytes: data.len(),
        });
    }
    Ok(written)
}

/// Decode a directory stream file.
///
/// # Errors
///
/// Returns an error when the file cannot be read or decoded.
pub fn run_inspect(path: &Path, compressed: bool) -> Result<DirStream> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let decoded = if compressed {
        dir::decode_compressed(&bytes)
    } else {
        dir::decode(&bytes)
    };
    decoded.with_context(|| format!("decode directory stream {}", path.display()))
}
