//! Every stream of a `vbaProject.bin` except the compound file itself.
//!
//! | Path              | Contents                                       |
//! |-------------------|------------------------------------------------|
//! | `PROJECT`         | project properties as text                     |
//! | `PROJECTwm`       | module name map                                |
//! | `VBA/_VBA_PROJECT`| header plus performance cache                  |
//! | `VBA/dir`         | compressed directory stream                    |
//! | `VBA/<stream>`    | p-code followed by compressed module source    |

use tracing::{debug, info, info_span};

use crate::backend::Backends;
use crate::dir;
use crate::error::{EncodingError, Result};
use crate::project::VbaProject;
use crate::project_stream::{project_text, project_wm};

/// First two bytes of `_VBA_PROJECT`.
const VBA_PROJECT_RESERVED: u16 = 0x61CC;
/// `_VBA_PROJECT` version that tells the host to ignore cached p-code.
pub const SOURCE_ONLY_VERSION: u16 = 0xFFFF;

/// One module stream under `VBA/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStream {
    pub name: String,
    /// Length of the p-code prefix; recorded as MODULEOFFSET.
    pub text_offset: u32,
    pub data: Vec<u8>,
}

/// Encoded streams ready for a compound file writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStreams {
    pub project: Vec<u8>,
    pub project_wm: Vec<u8>,
    pub vba_project: Vec<u8>,
    /// Compressed.
    pub dir: Vec<u8>,
    pub modules: Vec<ModuleStream>,
}

impl ProjectStreams {
    /// Encode `project` with the given collaborators.
    ///
    /// # Errors
    ///
    /// Fails on the first field or source text that cannot be encoded;
    /// nothing is returned in that case.
    pub fn build(project: &VbaProject, backends: &Backends) -> Result<Self> {
        let span = info_span!("build_streams", project = %project.info().name);
        let _guard = span.enter();
        let codepage = project.codepage();

        let mut modules = Vec::with_capacity(project.modules().len());
        for module in project.modules() {
            let source = module.normalized_source();
            let pcode = backends.assembler.assemble(&source);
            let text_offset = u32::try_from(pcode.len())
                .map_err(|_| EncodingError::too_long("ModuleStream", pcode.len(), u32::MAX as usize))?;
            let compressed = backends
                .compression
                .compress(&codepage.encode("ModuleSource", &source)?);

            let mut data = pcode;
            data.extend_from_slice(&compressed);
            debug!(
                module = module.name(),
                text_offset,
                source_bytes = source.len(),
                stream_bytes = data.len(),
                "encoded module stream"
            );
            modules.push(ModuleStream {
                name: module.stream_name().to_string(),
                text_offset,
                data,
            });
        }

        let offsets: Vec<u32> = modules.iter().map(|m| m.text_offset).collect();
        let dir_stream = dir::encode_with_offsets(project, &offsets)?;
        let dir = backends.compression.compress(&dir_stream);

        let streams = Self {
            project: project_text(project, backends.encryption.as_ref())?,
            project_wm: project_wm(project)?,
            vba_project: vba_project_stream(project, backends),
            dir,
            modules,
        };
        info!(
            modules = streams.modules.len(),
            dir_bytes = streams.dir.len(),
            dir_uncompressed = dir_stream.len(),
            "built project streams"
        );
        Ok(streams)
    }

    /// Every stream with its path inside the container, `/` separated.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, &[u8])> {
        let mut entries = vec![
            ("PROJECT".to_string(), self.project.as_slice()),
            ("PROJECTwm".to_string(), self.project_wm.as_slice()),
            ("VBA/_VBA_PROJECT".to_string(), self.vba_project.as_slice()),
            ("VBA/dir".to_string(), self.dir.as_slice()),
        ];
        entries.extend(
            self.modules
                .iter()
                .map(|module| (format!("VBA/{}", module.name), module.data.as_slice())),
        );
        entries
    }
}

fn vba_project_stream(project: &VbaProject, backends: &Backends) -> Vec<u8> {
    let cache = backends.performance_cache.performance_cache(project);
    let version = if cache.is_some() {
        backends.performance_cache.version()
    } else {
        SOURCE_ONLY_VERSION
    };

    let mut out = Vec::with_capacity(7 + cache.as_ref().map_or(0, Vec::len));
    out.extend_from_slice(&VBA_PROJECT_RESERVED.to_le_bytes());
    out.extend_from_slice(&version.to_le_bytes());
    out.push(0x00);
    out.extend_from_slice(&0u16.to_le_bytes());
    if let Some(cache) = cache {
        out.extend_from_slice(&cache);
    }
    out
}
