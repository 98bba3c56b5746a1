//! Runtime lifecycle driver.
//!
//! Owns one bundle plus one external runtime invocation and exposes the
//! spec's lifecycle verbs. The runtime under test is a black box: the
//! driver's own flags (`config_written`, `created_id`) are hypotheses used
//! only for precondition checks and cleanup decisions, never as a substitute
//! for the state verb's report.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use krug_common::paths::CONFIG_FILENAME;
use krug_common::{ContainerId, KrugError, KrugResult};
use krug_oci::{Generator, StateReport};

/// Drives one container instance through the external runtime's lifecycle.
///
/// Handles are not destroyed implicitly: every code path that acquires one
/// must end in [`RuntimeDriver::clean`], which is safe to call from any
/// state.
#[derive(Debug)]
pub struct RuntimeDriver {
    /// Resolved runtime binary.
    runtime: PathBuf,
    /// The exclusively-owned bundle directory.
    bundle_dir: PathBuf,
    /// Identifier for the next create. None until assigned; may be empty.
    id: Option<ContainerId>,
    /// Whether a configuration document has been written into the bundle.
    config_written: bool,
    /// Identifier under which a create succeeded, if any.
    created_id: Option<ContainerId>,
}

impl RuntimeDriver {
    /// Bind a runtime binary to a bundle directory.
    ///
    /// # Errors
    ///
    /// Returns [`KrugError::Init`] if the binary cannot be resolved or the
    /// bundle directory does not exist.
    pub fn new(runtime: impl AsRef<Path>, bundle_dir: impl Into<PathBuf>) -> KrugResult<Self> {
        let runtime = resolve_binary(runtime.as_ref())?;
        let bundle_dir = bundle_dir.into();

        if !bundle_dir.is_dir() {
            return Err(KrugError::Init {
                message: format!("bundle directory {} does not exist", bundle_dir.display()),
            });
        }

        Ok(Self {
            runtime,
            bundle_dir,
            id: None,
            config_written: false,
            created_id: None,
        })
    }

    /// The bundle directory this driver owns.
    #[must_use]
    pub fn bundle_dir(&self) -> &Path {
        &self.bundle_dir
    }

    /// The identifier assigned for the next create, if any.
    #[must_use]
    pub const fn id(&self) -> Option<&ContainerId> {
        self.id.as_ref()
    }

    /// Write the generated configuration into the bundle.
    ///
    /// The document is synced to disk before returning: the runtime reads
    /// `config.json` from the bundle during create, not via an in-memory
    /// handoff, so the write must be durably complete first.
    ///
    /// # Errors
    ///
    /// Returns [`KrugError::ConfigWrite`] if serialization or the file write
    /// fails.
    pub fn set_config(&mut self, generator: &Generator) -> KrugResult<()> {
        let path = self.bundle_dir.join(CONFIG_FILENAME);
        let document =
            serde_json::to_vec_pretty(generator.spec()).map_err(|e| KrugError::ConfigWrite {
                message: format!("failed to serialize configuration: {e}"),
            })?;

        write_synced(&path, &document).map_err(|e| KrugError::ConfigWrite {
            message: format!("failed to write {}: {e}", path.display()),
        })?;

        self.config_written = true;
        tracing::debug!(config = %path.display(), "Wrote container configuration");
        Ok(())
    }

    /// Record the identifier to use for the next create.
    ///
    /// No validation is performed: invalid identifiers, including the empty
    /// string, are passed to the runtime verbatim so its own validation can
    /// be exercised.
    pub fn set_id(&mut self, id: impl Into<ContainerId>) {
        self.id = Some(id.into());
    }

    /// Invoke the runtime's create verb.
    ///
    /// On success the driver records that a container now exists under the
    /// assigned identifier. On a non-zero exit the runtime's diagnostic
    /// output is returned and no flag changes; duplicate-id and missing-id
    /// enforcement belong to the runtime, the driver only surfaces results.
    ///
    /// # Errors
    ///
    /// [`KrugError::Precondition`] if no configuration was written or no
    /// identifier assigned; [`KrugError::Create`] on a runtime failure.
    pub fn create(&mut self) -> KrugResult<()> {
        if !self.config_written {
            return Err(KrugError::Precondition {
                operation: "create",
                reason: "no configuration has been written into the bundle",
            });
        }
        let Some(id) = self.id.clone() else {
            return Err(KrugError::Precondition {
                operation: "create",
                reason: "no identifier has been assigned",
            });
        };

        let output = self
            .command()
            .arg("create")
            .arg("--bundle")
            .arg(&self.bundle_dir)
            .arg(id.as_str())
            .output()?;

        if output.status.success() {
            tracing::debug!(id = %id, bundle = %self.bundle_dir.display(), "Container created");
            self.created_id = Some(id);
            Ok(())
        } else {
            Err(KrugError::Create {
                message: diagnostic("create", &output),
            })
        }
    }

    /// Invoke the runtime's start verb.
    ///
    /// # Errors
    ///
    /// [`KrugError::Precondition`] if no create has succeeded for this
    /// handle — failing fast avoids ambiguous diagnostics from the runtime;
    /// [`KrugError::Start`] on a runtime failure.
    pub fn start(&mut self) -> KrugResult<()> {
        let Some(id) = self.created_id.clone() else {
            return Err(KrugError::Precondition {
                operation: "start",
                reason: "create has not succeeded for this handle",
            });
        };

        let output = self.command().arg("start").arg(id.as_str()).output()?;

        if output.status.success() {
            tracing::debug!(id = %id, "Container started");
            Ok(())
        } else {
            Err(KrugError::Start {
                message: diagnostic("start", &output),
            })
        }
    }

    /// Query the runtime for the container's state.
    ///
    /// This is the only authoritative source of lifecycle state; the
    /// driver's bookkeeping is never substituted for the runtime's report.
    ///
    /// # Errors
    ///
    /// [`KrugError::Precondition`] if no identifier is held;
    /// [`KrugError::StateQuery`] on a non-zero exit or unparseable output.
    pub fn state(&self) -> KrugResult<StateReport> {
        let Some(id) = self.id.as_ref() else {
            return Err(KrugError::Precondition {
                operation: "state",
                reason: "no identifier has been assigned",
            });
        };

        let output = self.command().arg("state").arg(id.as_str()).output()?;

        if !output.status.success() {
            return Err(KrugError::StateQuery {
                message: diagnostic("state", &output),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        StateReport::from_json(&stdout).map_err(|e| KrugError::StateQuery {
            message: format!("unparseable state output: {e}: {}", stdout.trim()),
        })
    }

    /// Best-effort teardown; safe to call unconditionally on every exit
    /// path, from any state, any number of times.
    ///
    /// Attempts the runtime's delete verb when a create was recorded (or
    /// `force` is set, to sweep possibly-orphaned registrations), then
    /// unconditionally removes the bundle directory. A delete failure never
    /// short-circuits the directory removal. Once nothing is left to clean,
    /// subsequent calls succeed.
    ///
    /// # Errors
    ///
    /// Returns the first failure as [`KrugError::Cleanup`]; delete failures
    /// during a pure force-sweep (no create recorded) are logged only.
    pub fn clean(&mut self, force: bool) -> KrugResult<()> {
        let mut first_err: Option<KrugError> = None;

        let recorded = self.created_id.take();
        let target = recorded
            .clone()
            .or_else(|| if force { self.id.clone() } else { None })
            // An empty id can never have been registered.
            .filter(|id| !id.is_empty());

        if let Some(id) = target {
            match self
                .command()
                .arg("delete")
                .arg("--force")
                .arg(id.as_str())
                .output()
            {
                Ok(output) if output.status.success() => {
                    tracing::debug!(id = %id, "Container deleted");
                }
                Ok(output) => {
                    let message = diagnostic("delete", &output);
                    tracing::warn!(id = %id, message, "Delete failed during cleanup");
                    if recorded.is_some() {
                        first_err = Some(KrugError::Cleanup { message });
                    }
                }
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "Failed to invoke delete during cleanup");
                    if recorded.is_some() {
                        first_err = Some(KrugError::Cleanup {
                            message: format!("failed to invoke delete: {e}"),
                        });
                    }
                }
            }
        }

        if self.bundle_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.bundle_dir) {
                tracing::warn!(
                    bundle = %self.bundle_dir.display(),
                    error = %e,
                    "Failed to remove bundle directory"
                );
                first_err.get_or_insert(KrugError::Cleanup {
                    message: format!(
                        "failed to remove bundle {}: {e}",
                        self.bundle_dir.display()
                    ),
                });
            } else {
                tracing::debug!(bundle = %self.bundle_dir.display(), "Removed bundle directory");
            }
        }

        first_err.map_or(Ok(()), Err)
    }

    fn command(&self) -> Command {
        Command::new(&self.runtime)
    }
}

/// Resolve a runtime binary: paths must exist, bare names are searched on
/// `PATH`.
fn resolve_binary(runtime: &Path) -> KrugResult<PathBuf> {
    if runtime.components().count() > 1 {
        if runtime.is_file() {
            return Ok(runtime.to_path_buf());
        }
        return Err(KrugError::Init {
            message: format!("runtime binary {} does not exist", runtime.display()),
        });
    }

    let path_var = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(runtime);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(KrugError::Init {
        message: format!("runtime binary {} not found on PATH", runtime.display()),
    })
}

/// Render a verb failure from the process output, preferring stderr.
fn diagnostic(verb: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout)
    } else {
        stderr
    };
    format!("{verb} exited with {}: {}", output.status, text.trim())
}

fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
