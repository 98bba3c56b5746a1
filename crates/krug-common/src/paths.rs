//! Harness paths and environment overrides.

use std::path::PathBuf;

use once_cell::sync::Lazy;

/// Name of the configuration document inside a bundle.
pub const CONFIG_FILENAME: &str = "config.json";

/// Name under which the self-check program is placed inside a bundle.
pub const SELFCHECK_FILENAME: &str = "selfcheck";

/// The runtime binary under test.
///
/// Read once from the `RUNTIME` environment variable, defaulting to `runc`.
pub static RUNTIME_COMMAND: Lazy<String> =
    Lazy::new(|| std::env::var("RUNTIME").unwrap_or_else(|_| "runc".to_string()));

/// The root filesystem archive extracted into each fresh bundle.
///
/// Read once from the `KRUG_ROOTFS` environment variable, defaulting to an
/// architecture-named archive in the current directory.
pub static ROOTFS_ARCHIVE: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("KRUG_ROOTFS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(rootfs_archive_name(std::env::consts::ARCH)))
});

/// The self-check binary copied into bundles for in-container validation.
///
/// Read once from the `KRUG_SELFCHECK` environment variable, defaulting to
/// `krug-selfcheck`. Relative names are also resolved next to the harness
/// executable at copy time.
pub static SELFCHECK_BINARY: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("KRUG_SELFCHECK")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("krug-selfcheck"))
});

/// Archive name for a given architecture, e.g. `rootfs-x86_64.tar.gz`.
#[must_use]
pub fn rootfs_archive_name(arch: &str) -> String {
    format!("rootfs-{arch}.tar.gz")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_name_is_arch_specific() {
        assert_eq!(rootfs_archive_name("x86_64"), "rootfs-x86_64.tar.gz");
        assert_eq!(rootfs_archive_name("aarch64"), "rootfs-aarch64.tar.gz");
    }

    #[test]
    fn config_filename_is_spec_mandated() {
        assert_eq!(CONFIG_FILENAME, "config.json");
    }
}
