//! In-container configuration checks.
//!
//! The `krug-selfcheck` binary is copied into each bundle and configured as
//! the container's process. Running as init inside the sandbox, it reads
//! `/config.json` and verifies that the runtime actually applied what the
//! configuration declared: hostname, root filesystem writability, rlimits,
//! and sysctls. Only configured fields are checked.

use std::collections::HashMap;
use std::path::Path;

use krug_oci::Spec;
use krug_oci::runtime::Rlimit;
use rustix::process::Resource;

/// Where the runtime mounts the kernel parameter tree.
const PROC_SYS: &str = "/proc/sys";

/// Path probed to observe root filesystem writability.
const WRITE_PROBE: &str = "/selfcheck-write-probe";

/// Verify the applied configuration from inside the container.
///
/// Returns one message per failed check; an empty vector means the runtime
/// applied everything the configuration declared.
#[must_use]
pub fn validate_spec(spec: &Spec) -> Vec<String> {
    let mut failures = Vec::new();

    if let Some(expected) = spec.hostname.as_deref() {
        failures.extend(check_hostname(expected));
    }

    if let Some(root) = spec.root.as_ref() {
        failures.extend(check_root_writability(root.readonly));
    }

    if let Some(process) = spec.process.as_ref() {
        failures.extend(check_rlimits(&process.rlimits));
    }

    if let Some(linux) = spec.linux.as_ref() {
        failures.extend(check_sysctls_at(Path::new(PROC_SYS), &linux.sysctl));
    }

    failures
}

fn check_hostname(expected: &str) -> Option<String> {
    let uname = rustix::system::uname();
    let observed = uname.nodename().to_string_lossy();
    (observed != expected)
        .then(|| format!("hostname is {observed:?}, configuration requires {expected:?}"))
}

fn check_root_writability(readonly: bool) -> Option<String> {
    let probe = std::fs::write(WRITE_PROBE, b"probe");
    match (readonly, probe) {
        (true, Ok(())) => {
            let _ = std::fs::remove_file(WRITE_PROBE);
            Some("root filesystem is writable, configuration requires readonly".to_string())
        }
        (true, Err(_)) => None,
        (false, Ok(())) => {
            let _ = std::fs::remove_file(WRITE_PROBE);
            None
        }
        (false, Err(err)) => Some(format!(
            "root filesystem is not writable ({err}), configuration requires read-write"
        )),
    }
}

fn check_rlimits(rlimits: &[Rlimit]) -> Vec<String> {
    let mut failures = Vec::new();

    for rlimit in rlimits {
        let Some(resource) = resource_for(&rlimit.limit_type) else {
            failures.push(format!("unrecognized rlimit type {:?}", rlimit.limit_type));
            continue;
        };

        let observed = rustix::process::getrlimit(resource);
        if observed.current != Some(rlimit.soft) || observed.maximum != Some(rlimit.hard) {
            failures.push(format!(
                "{} is soft={:?} hard={:?}, configuration requires soft={} hard={}",
                rlimit.limit_type, observed.current, observed.maximum, rlimit.soft, rlimit.hard
            ));
        }
    }

    failures
}

/// Verify each configured sysctl under the given `/proc/sys` root.
fn check_sysctls_at(proc_sys: &Path, sysctls: &HashMap<String, String>) -> Vec<String> {
    let mut failures = Vec::new();

    for (key, expected) in sysctls {
        let path = proc_sys.join(sysctl_path(key));
        match std::fs::read_to_string(&path) {
            Ok(observed) => {
                let observed = observed.trim();
                if observed != expected {
                    failures.push(format!(
                        "sysctl {key} is {observed:?}, configuration requires {expected:?}"
                    ));
                }
            }
            Err(err) => failures.push(format!("sysctl {key} unreadable at {}: {err}", path.display())),
        }
    }

    failures
}

/// Kernel parameter name to its procfs relative path.
fn sysctl_path(key: &str) -> String {
    key.replace('.', "/")
}

/// Map an rlimit type name from the configuration to a kernel resource.
fn resource_for(limit_type: &str) -> Option<Resource> {
    match limit_type {
        "RLIMIT_CPU" => Some(Resource::Cpu),
        "RLIMIT_FSIZE" => Some(Resource::Fsize),
        "RLIMIT_DATA" => Some(Resource::Data),
        "RLIMIT_STACK" => Some(Resource::Stack),
        "RLIMIT_CORE" => Some(Resource::Core),
        "RLIMIT_RSS" => Some(Resource::Rss),
        "RLIMIT_NPROC" => Some(Resource::Nproc),
        "RLIMIT_NOFILE" => Some(Resource::Nofile),
        "RLIMIT_MEMLOCK" => Some(Resource::Memlock),
        "RLIMIT_AS" => Some(Resource::As),
        "RLIMIT_LOCKS" => Some(Resource::Locks),
        "RLIMIT_SIGPENDING" => Some(Resource::Sigpending),
        "RLIMIT_MSGQUEUE" => Some(Resource::Msgqueue),
        "RLIMIT_NICE" => Some(Resource::Nice),
        "RLIMIT_RTPRIO" => Some(Resource::Rtprio),
        "RLIMIT_RTTIME" => Some(Resource::Rttime),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sysctl_keys_map_to_procfs_paths() {
        assert_eq!(sysctl_path("net.ipv4.ip_forward"), "net/ipv4/ip_forward");
        assert_eq!(sysctl_path("kernel.hostname"), "kernel/hostname");
    }

    #[test]
    fn known_rlimit_types_resolve() {
        assert_eq!(resource_for("RLIMIT_NOFILE"), Some(Resource::Nofile));
        assert_eq!(resource_for("RLIMIT_NPROC"), Some(Resource::Nproc));
        assert_eq!(resource_for("RLIMIT_BOGUS"), None);
    }

    #[test]
    fn sysctl_check_reads_the_parameter_tree() {
        let proc_sys = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(proc_sys.path().join("net/ipv4")).unwrap();
        std::fs::write(proc_sys.path().join("net/ipv4/ip_forward"), "1\n").unwrap();

        let mut sysctls = HashMap::new();
        sysctls.insert("net.ipv4.ip_forward".to_string(), "1".to_string());
        assert!(check_sysctls_at(proc_sys.path(), &sysctls).is_empty());

        sysctls.insert("net.ipv4.ip_forward".to_string(), "0".to_string());
        let failures = check_sysctls_at(proc_sys.path(), &sysctls);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("ip_forward"));
    }

    #[test]
    fn missing_sysctl_is_reported() {
        let proc_sys = tempfile::tempdir().unwrap();
        let mut sysctls = HashMap::new();
        sysctls.insert("net.ipv4.ip_forward".to_string(), "1".to_string());

        let failures = check_sysctls_at(proc_sys.path(), &sysctls);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("unreadable"));
    }

    #[test]
    fn unconfigured_fields_are_not_checked() {
        let spec = Spec::default();
        assert!(validate_spec(&spec).is_empty());
    }

    #[test]
    fn unrecognized_rlimit_type_is_reported() {
        let rlimits = vec![Rlimit {
            limit_type: "RLIMIT_BOGUS".to_string(),
            hard: 1,
            soft: 1,
        }];
        let failures = check_rlimits(&rlimits);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("RLIMIT_BOGUS"));
    }
}
