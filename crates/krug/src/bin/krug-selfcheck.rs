//! In-container self-check entry point.
//!
//! Runs as the container's init process, reads the bundle-relative
//! configuration at `/config.json`, and verifies the runtime applied it.
//! Failed checks go to stderr; the exit code is the harness-observable
//! verdict.

use std::process::ExitCode;

use krug_oci::Spec;

/// The configuration document as seen from inside the container, with the
/// rootfs doubling as the bundle directory.
const CONFIG_PATH: &str = "/config.json";

fn main() -> ExitCode {
    let raw = match std::fs::read_to_string(CONFIG_PATH) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("selfcheck: cannot read {CONFIG_PATH}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let spec: Spec = match serde_json::from_str(&raw) {
        Ok(spec) => spec,
        Err(err) => {
            eprintln!("selfcheck: cannot parse {CONFIG_PATH}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let failures = krug::selfcheck::validate_spec(&spec);
    for failure in &failures {
        eprintln!("selfcheck: {failure}");
    }

    if failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
