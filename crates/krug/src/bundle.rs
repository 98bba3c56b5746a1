//! Bundle provisioning.
//!
//! Materializes a fresh, isolated bundle directory per test case by
//! extracting the architecture-named root filesystem archive into a
//! collision-free temporary directory. The caller owns the directory and
//! must remove it through [`crate::driver::RuntimeDriver::clean`].

use std::path::{Path, PathBuf};

use krug_common::paths::ROOTFS_ARCHIVE;
use krug_common::{KrugError, KrugResult};

/// Provisions bundle directories from a root filesystem archive.
#[derive(Debug, Clone)]
pub struct BundleProvisioner {
    /// The tar.gz archive extracted into each bundle.
    archive: PathBuf,
}

impl Default for BundleProvisioner {
    fn default() -> Self {
        Self {
            archive: ROOTFS_ARCHIVE.clone(),
        }
    }
}

impl BundleProvisioner {
    /// Create a provisioner using the default archive location.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provisioner for a specific archive.
    #[must_use]
    pub fn with_archive(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
        }
    }

    /// Materialize a fresh bundle directory.
    ///
    /// Creates a temporary directory and extracts the rootfs archive into
    /// it. On extraction failure the partially-created directory is removed
    /// before returning, so the caller never receives a broken bundle.
    /// Extraction failures are environment faults and are not retried.
    ///
    /// # Errors
    ///
    /// Returns [`KrugError::Provision`] if directory creation or extraction
    /// fails.
    pub fn provision(&self) -> KrugResult<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix("krug-bundle-")
            .tempdir()
            .map_err(|e| KrugError::Provision {
                message: format!("failed to create bundle directory: {e}"),
            })?
            .keep();

        tracing::debug!(
            bundle = %dir.display(),
            archive = %self.archive.display(),
            "Provisioning bundle"
        );

        if let Err(err) = self.extract_into(&dir) {
            if let Err(rm_err) = std::fs::remove_dir_all(&dir) {
                tracing::warn!(
                    bundle = %dir.display(),
                    error = %rm_err,
                    "Failed to remove partial bundle"
                );
            }
            return Err(err);
        }

        Ok(dir)
    }

    fn extract_into(&self, dir: &Path) -> KrugResult<()> {
        let file = std::fs::File::open(&self.archive).map_err(|e| KrugError::Provision {
            message: format!(
                "failed to open rootfs archive {}: {e}",
                self.archive.display()
            ),
        })?;

        let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
        archive.set_preserve_permissions(true);

        archive.unpack(dir).map_err(|e| KrugError::Provision {
            message: format!(
                "failed to extract {} into {}: {e}",
                self.archive.display(),
                dir.display()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_archive(path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let mut header = tar::Header::new_gnu();
        header.set_path("etc/hostname").unwrap();
        header.set_size(5);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, &b"krug\n"[..]).unwrap();

        builder.into_inner().unwrap().finish().unwrap().flush().unwrap();
    }

    #[test]
    fn provisions_fresh_bundle() {
        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("rootfs.tar.gz");
        write_test_archive(&archive);

        let bundle = BundleProvisioner::with_archive(&archive).provision().unwrap();
        assert!(bundle.join("etc/hostname").is_file());

        // The bundle outlives the provisioner; removal is the caller's job.
        std::fs::remove_dir_all(&bundle).unwrap();
    }

    #[test]
    fn bundles_do_not_collide() {
        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("rootfs.tar.gz");
        write_test_archive(&archive);

        let provisioner = BundleProvisioner::with_archive(&archive);
        let a = provisioner.provision().unwrap();
        let b = provisioner.provision().unwrap();
        assert_ne!(a, b);

        std::fs::remove_dir_all(&a).unwrap();
        std::fs::remove_dir_all(&b).unwrap();
    }

    #[test]
    fn missing_archive_is_a_provision_error() {
        let provisioner = BundleProvisioner::with_archive("/nonexistent/rootfs.tar.gz");
        let err = provisioner.provision().unwrap_err();
        assert!(matches!(err, KrugError::Provision { .. }));
    }

    #[test]
    fn corrupt_archive_leaves_no_bundle_behind() {
        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("rootfs.tar.gz");
        std::fs::write(&archive, b"not a gzip stream").unwrap();

        let err = BundleProvisioner::with_archive(&archive).provision().unwrap_err();
        assert!(matches!(err, KrugError::Provision { .. }));
    }
}
