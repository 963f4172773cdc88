//! Collaborators the stream builder delegates to.
//!
//! Each concern sits behind a trait so that a real p-code assembler or a
//! host-specific performance cache can be plugged in. The defaults
//! produce a source-only project that hosts recompile on load.

use crate::crypto;
use crate::project::VbaProject;

/// Byte-stream compression applied to the `dir` stream and module source.
pub trait Compression {
    fn compress(&self, data: &[u8]) -> Vec<u8>;
}

/// Compiles module source into p-code.
pub trait Assembler {
    /// P-code for `source`; empty when only source is stored.
    fn assemble(&self, source: &str) -> Vec<u8>;
}

/// Supplies the opaque blob stored after the `_VBA_PROJECT` header.
pub trait PerformanceCacheSource {
    fn performance_cache(&self, project: &VbaProject) -> Option<Vec<u8>>;

    /// Version written to `_VBA_PROJECT` when a cache is present.
    fn version(&self) -> u16 {
        0x00B2
    }
}

/// Encryption used for the protection lines of the `PROJECT` stream.
pub trait DataEncryption {
    fn encrypt(&self, project_key: u8, data: &[u8]) -> Vec<u8>;
}

/// MS-OVBA 2.4.1 compression.
#[derive(Debug, Clone, Copy, Default)]
pub struct OvbaCompression;

impl Compression for OvbaCompression {
    fn compress(&self, data: &[u8]) -> Vec<u8> {
        vba_compression::compress(data)
    }
}

/// Stores source only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceOnly;

impl Assembler for SourceOnly {
    fn assemble(&self, _source: &str) -> Vec<u8> {
        Vec::new()
    }
}

/// Uses the cache blob set on the project, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredPerformanceCache;

impl PerformanceCacheSource for StoredPerformanceCache {
    fn performance_cache(&self, project: &VbaProject) -> Option<Vec<u8>> {
        project.performance_cache().map(<[u8]>::to_vec)
    }
}

/// MS-OVBA 2.4.3 encryption with a fixed seed.
#[derive(Debug, Clone, Copy)]
pub struct OvbaEncryption {
    pub seed: u8,
}

impl Default for OvbaEncryption {
    fn default() -> Self {
        Self { seed: 0x07 }
    }
}

impl DataEncryption for OvbaEncryption {
    fn encrypt(&self, project_key: u8, data: &[u8]) -> Vec<u8> {
        crypto::encrypt(self.seed, project_key, data)
    }
}

/// The set of collaborators used by [`crate::streams::ProjectStreams::build`].
pub struct Backends {
    pub compression: Box<dyn Compression>,
    pub assembler: Box<dyn Assembler>,
    pub performance_cache: Box<dyn PerformanceCacheSource>,
    pub encryption: Box<dyn DataEncryption>,
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            compression: Box::new(OvbaCompression),
            assembler: Box::new(SourceOnly),
            performance_cache: Box::new(StoredPerformanceCache),
            encryption: Box::new(OvbaEncryption::default()),
        }
    }
}

impl Backends {
    #[must_use]
    pub fn with_assembler(mut self, assembler: impl Assembler + 'static) -> Self {
        self.assembler = Box::new(assembler);
        self
    }

    #[must_use]
    pub fn with_compression(mut self, compression: impl Compression + 'static) -> Self {
        self.compression = Box::new(compression);
        self
    }

    #[must_use]
    pub fn with_performance_cache(mut self, source: impl PerformanceCacheSource + 'static) -> Self {
        self.performance_cache = Box::new(source);
        self
    }

    #[must_use]
    pub fn with_encryption(mut self, encryption: impl DataEncryption + 'static) -> Self {
        self.encryption = Box::new(encryption);
        self
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectBuilder;

    #[test]
    fn test_defaults() {
        let backends = Backends::default();
        assert!(backends.assembler.assemble("Sub Foo()\r\nEnd Sub").is_empty());
        assert_eq!(backends.compression.compress(b""), [0x01]);

        let mut builder = ProjectBuilder::new();
        assert_eq!(backends.performance_cache.performance_cache(&builder.build()), None);
        builder.set_performance_cache(vec![1, 2, 3]);
        assert_eq!(
            backends.performance_cache.performance_cache(&builder.build()),
            Some(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_encryption_seed() {
        let encrypted = OvbaEncryption { seed: 0x41 }.encrypt(0x10, &[0xFF]);
        assert_eq!(encrypted[0], 0x41);
    }
}
