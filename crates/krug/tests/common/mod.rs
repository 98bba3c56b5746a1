//! Shared test fixtures: a scriptable stub runtime and a minimal rootfs
//! archive.

use std::path::{Path, PathBuf};

/// A minimal OCI-shaped runtime: a shell script maintaining a container
/// registry in a scratch directory. Exit codes and state output follow the
/// conventions the harness expects from a real runtime.
pub struct StubRuntime {
    /// Scratch directory holding the script and registry. Removed on drop.
    _dir: tempfile::TempDir,
    /// Path to the runtime script.
    pub bin: PathBuf,
    /// Registry directory, one file per live container.
    pub registry: PathBuf,
}

impl StubRuntime {
    pub fn install() -> Self {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let registry = dir.path().join("registry");
        std::fs::create_dir(&registry).unwrap();

        let script = format!(
            r#"#!/bin/sh
set -u
registry='{registry}'
verb="$1"
shift
case "$verb" in
create)
    bundle=''
    if [ "${{1-}}" = "--bundle" ]; then bundle="$2"; shift 2; fi
    id="${{1-}}"
    if [ -z "$id" ]; then echo 'container id cannot be empty' >&2; exit 1; fi
    if [ ! -f "$bundle/config.json" ]; then echo 'config.json not found in bundle' >&2; exit 1; fi
    if [ -e "$registry/$id" ]; then echo "container with id exists: $id" >&2; exit 1; fi
    printf 'created' > "$registry/$id"
    ;;
start)
    id="${{1-}}"
    if [ ! -e "$registry/$id" ]; then echo "container does not exist: $id" >&2; exit 1; fi
    printf 'running' > "$registry/$id"
    ;;
state)
    id="${{1-}}"
    if [ ! -e "$registry/$id" ]; then echo "container does not exist: $id" >&2; exit 1; fi
    status=$(cat "$registry/$id")
    printf '{{"ociVersion":"1.2.0","id":"%s","status":"%s","bundle":"/"}}\n' "$id" "$status"
    ;;
delete)
    if [ "${{1-}}" = "--force" ]; then shift; fi
    id="${{1-}}"
    if [ ! -e "$registry/$id" ]; then echo "container does not exist: $id" >&2; exit 1; fi
    rm -f "$registry/$id"
    ;;
*)
    echo "unknown verb: $verb" >&2
    exit 1
    ;;
esac
"#,
            registry = registry.display()
        );

        let bin = dir.path().join("stub-runtime");
        std::fs::write(&bin, script).unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        Self {
            _dir: dir,
            bin,
            registry,
        }
    }

    /// Whether the registry currently holds a container under this id.
    pub fn registered(&self, id: &str) -> bool {
        self.registry.join(id).exists()
    }
}

/// Write a one-file rootfs tar.gz usable as a provisioning source.
pub fn write_rootfs_archive(path: &Path) {
    let file = std::fs::File::create(path).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut header = tar::Header::new_gnu();
    header.set_path("bin/.keep").unwrap();
    header.set_size(0);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append(&header, &b""[..]).unwrap();

    builder.into_inner().unwrap().finish().unwrap();
}
