//! Conformance scenarios.
//!
//! Each scenario acquires a fresh bundle and driver handle, exercises part
//! of the lifecycle against the runtime under test, and releases everything
//! through [`RuntimeDriver::clean`] on every exit path — success, deviation,
//! or unexpected error — so one failing scenario never leaks a bundle or an
//! orphaned container registration into the next.

use std::path::PathBuf;

use krug_common::paths::{RUNTIME_COMMAND, SELFCHECK_BINARY, SELFCHECK_FILENAME};
use krug_common::{ContainerId, KrugError, KrugResult};
use krug_oci::{Generator, OCI_VERSION, Requirement, SpecError};

use crate::bundle::BundleProvisioner;
use crate::driver::RuntimeDriver;

/// Shared inputs for a scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    /// The runtime binary under test.
    pub runtime: String,
}

impl Default for ScenarioContext {
    fn default() -> Self {
        Self {
            runtime: RUNTIME_COMMAND.clone(),
        }
    }
}

/// A named conformance scenario.
pub struct Scenario {
    /// Stable scenario name, used for filtering and reporting.
    pub name: &'static str,
    /// One-line description of what the scenario validates.
    pub summary: &'static str,
    run: fn(&ScenarioContext) -> KrugResult<()>,
}

impl Scenario {
    /// Execute the scenario.
    ///
    /// # Errors
    ///
    /// Returns the first lifecycle failure or classified deviation.
    pub fn run(&self, ctx: &ScenarioContext) -> KrugResult<()> {
        (self.run)(ctx)
    }
}

/// The full conformance suite, in execution order.
#[must_use]
pub fn suite() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "basic",
            summary: "default configuration creates and starts",
            run: |ctx| validate_inside(ctx, Generator::default()),
        },
        Scenario {
            name: "rootfs-readwrite",
            summary: "root filesystem readonly=false is applied",
            run: |ctx| {
                let mut g = Generator::default();
                g.set_root_readonly(false);
                validate_inside(ctx, g)
            },
        },
        Scenario {
            name: "rootfs-readonly",
            summary: "root filesystem readonly=true is applied",
            run: |ctx| {
                let mut g = Generator::default();
                g.set_root_readonly(true);
                validate_inside(ctx, g)
            },
        },
        Scenario {
            name: "hostname",
            summary: "configured hostname is visible in the container",
            run: |ctx| {
                let mut g = Generator::default();
                g.set_hostname("hostname-specific");
                validate_inside(ctx, g)
            },
        },
        Scenario {
            name: "rlimits",
            summary: "process rlimits are applied",
            run: |ctx| {
                let mut g = Generator::default();
                g.add_process_rlimit("RLIMIT_NOFILE", 1024, 1024);
                validate_inside(ctx, g)
            },
        },
        Scenario {
            name: "sysctls",
            summary: "linux sysctls are applied",
            run: |ctx| {
                let mut g = Generator::default();
                g.add_linux_sysctl("net.ipv4.ip_forward", "1");
                validate_inside(ctx, g)
            },
        },
        Scenario {
            name: "create-lifecycle",
            summary: "create rejects empty and duplicate ids, accepts unique ids",
            run: create_lifecycle,
        },
    ]
}

/// The suite filtered by a substring match on scenario names.
#[must_use]
pub fn filtered(filter: Option<&str>) -> Vec<Scenario> {
    suite()
        .into_iter()
        .filter(|s| filter.is_none_or(|f| s.name.contains(f)))
        .collect()
}

/// Provision a bundle, inject the self-check program as the container
/// process, and drive create + start; the self-check verifies the applied
/// configuration from inside the sandbox.
fn validate_inside(ctx: &ScenarioContext, mut generator: Generator) -> KrugResult<()> {
    let bundle = BundleProvisioner::new().provision()?;

    let mut driver = match RuntimeDriver::new(&ctx.runtime, &bundle) {
        Ok(driver) => driver,
        Err(err) => {
            // No handle to clean through yet; the bundle is ours to remove.
            if let Err(rm_err) = std::fs::remove_dir_all(&bundle) {
                tracing::warn!(bundle = %bundle.display(), error = %rm_err, "Bundle leak");
            }
            return Err(err);
        }
    };

    generator.set_process_args(vec![format!("/{SELFCHECK_FILENAME}")]);

    let result = (|| {
        driver.set_config(&generator)?;

        let selfcheck = selfcheck_source()?;
        std::fs::copy(&selfcheck, driver.bundle_dir().join(SELFCHECK_FILENAME))?;

        driver.set_id(ContainerId::generate());
        driver.create()?;
        driver.start()
    })();

    finish(driver, result)
}

/// The three-case create sequence on one shared handle: an empty id must be
/// rejected, a fresh id must create a container whose reported id matches,
/// and reusing that id while the container exists must be rejected.
fn create_lifecycle(ctx: &ScenarioContext) -> KrugResult<()> {
    let bundle = BundleProvisioner::new().provision()?;

    let mut driver = match RuntimeDriver::new(&ctx.runtime, &bundle) {
        Ok(driver) => driver,
        Err(err) => {
            if let Err(rm_err) = std::fs::remove_dir_all(&bundle) {
                tracing::warn!(bundle = %bundle.display(), error = %rm_err, "Bundle leak");
            }
            return Err(err);
        }
    };

    let container_id = ContainerId::generate();
    let cases = [
        (
            ContainerId::new(""),
            false,
            SpecError::new(
                Requirement::CreateWithBundlePathAndID,
                "create MUST generate an error if the ID is not provided",
                OCI_VERSION,
            ),
        ),
        (
            container_id.clone(),
            true,
            SpecError::new(
                Requirement::CreateNewContainer,
                "create MUST create a new container",
                OCI_VERSION,
            ),
        ),
        (
            container_id,
            false,
            SpecError::new(
                Requirement::CreateWithUniqueID,
                "create MUST generate an error if the ID provided is not unique",
                OCI_VERSION,
            ),
        ),
    ];

    let result = (|| {
        let mut generator = Generator::default();
        generator.set_process_args(vec!["ls".to_string()]);
        driver.set_config(&generator)?;

        for (id, expect_success, spec_error) in cases {
            driver.set_id(id.clone());
            let created = driver.create();

            if created.is_ok() != expect_success {
                tracing::debug!(
                    id = %id,
                    outcome = ?created.err().map(|e| e.to_string()),
                    "Unexpected create outcome"
                );
                return Err(deviation(spec_error));
            }

            if expect_success {
                let state = driver.state()?;
                if state.id != id.as_str() {
                    return Err(deviation(SpecError::new(
                        Requirement::CreateNewContainer,
                        format!("state reports id {:?}, expected {:?}", state.id, id.as_str()),
                        OCI_VERSION,
                    )));
                }
            }
        }
        Ok(())
    })();

    finish(driver, result)
}

/// Run guaranteed cleanup and merge its outcome with the scenario body's.
///
/// The body's error wins; a cleanup failure after a passing body is still a
/// failure.
fn finish(mut driver: RuntimeDriver, result: KrugResult<()>) -> KrugResult<()> {
    let cleanup = driver.clean(true);
    match (result, cleanup) {
        (Err(err), cleanup) => {
            if let Err(cleanup_err) = cleanup {
                tracing::warn!(error = %cleanup_err, "Cleanup failed after scenario error");
            }
            Err(err)
        }
        (Ok(()), Err(cleanup_err)) => Err(cleanup_err),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn deviation(err: SpecError) -> KrugError {
    KrugError::Conformance {
        message: err.to_string(),
    }
}

/// Locate the self-check binary: the configured path if it exists, else a
/// sibling of the harness executable.
fn selfcheck_source() -> KrugResult<PathBuf> {
    let configured = SELFCHECK_BINARY.clone();
    if configured.is_file() {
        return Ok(configured);
    }

    if configured.components().count() == 1 {
        if let Some(candidate) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&configured)))
            .filter(|candidate| candidate.is_file())
        {
            return Ok(candidate);
        }
    }

    Err(KrugError::Provision {
        message: format!("self-check binary {} not found", configured.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suite_names_are_unique() {
        let names: Vec<_> = suite().iter().map(|s| s.name).collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }

    #[test]
    fn suite_covers_the_lifecycle_properties() {
        let names: Vec<_> = suite().iter().map(|s| s.name).collect();
        for expected in [
            "basic",
            "rootfs-readwrite",
            "rootfs-readonly",
            "hostname",
            "rlimits",
            "sysctls",
            "create-lifecycle",
        ] {
            assert!(names.contains(&expected), "missing scenario {expected}");
        }
    }

    #[test]
    fn filter_narrows_by_substring() {
        let rootfs = filtered(Some("rootfs"));
        assert_eq!(rootfs.len(), 2);

        let all = filtered(None);
        assert_eq!(all.len(), suite().len());

        assert!(filtered(Some("no-such-scenario")).is_empty());
    }

    #[test]
    fn context_defaults_to_the_global_runtime() {
        let ctx = ScenarioContext::default();
        assert_eq!(ctx.runtime, *RUNTIME_COMMAND);
    }
}
