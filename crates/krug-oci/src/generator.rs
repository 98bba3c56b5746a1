//! Configuration generator.
//!
//! Produces the declarative `config.json` document the runtime under test
//! reads during create. The default configuration is a complete, minimal
//! container: bundle-relative rootfs, `sh` as the process, host-independent
//! environment, and the standard set of namespaces, mounts, and
//! capabilities. Scenarios mutate it from there.

use std::collections::HashMap;

use crate::runtime::{
    Capabilities, Linux, Mount, Namespace, NamespaceType, Process, Rlimit, Root, Spec, User,
};

/// Capabilities granted to the container process by default.
const DEFAULT_CAPABILITIES: &[&str] = &[
    "CAP_CHOWN",
    "CAP_DAC_OVERRIDE",
    "CAP_FSETID",
    "CAP_FOWNER",
    "CAP_MKNOD",
    "CAP_NET_RAW",
    "CAP_SETGID",
    "CAP_SETUID",
    "CAP_SETFCAP",
    "CAP_SETPCAP",
    "CAP_NET_BIND_SERVICE",
    "CAP_SYS_CHROOT",
    "CAP_KILL",
    "CAP_AUDIT_WRITE",
];

/// Builder over [`Spec`] used by scenarios to describe the container under
/// test.
#[derive(Debug, Clone)]
pub struct Generator {
    spec: Spec,
}

impl Default for Generator {
    fn default() -> Self {
        let caps: Vec<String> = DEFAULT_CAPABILITIES
            .iter()
            .map(ToString::to_string)
            .collect();

        let spec = Spec {
            root: Some(Root {
                // The extracted rootfs doubles as the bundle directory.
                path: ".".into(),
                readonly: false,
            }),
            process: Some(Process {
                terminal: false,
                user: User::default(),
                args: vec!["sh".to_string()],
                env: vec![
                    "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin"
                        .to_string(),
                    "TERM=xterm".to_string(),
                ],
                cwd: "/".into(),
                capabilities: Some(Capabilities {
                    bounding: caps.clone(),
                    effective: caps.clone(),
                    permitted: caps,
                    ambient: Vec::new(),
                }),
                rlimits: vec![Rlimit {
                    limit_type: "RLIMIT_NOFILE".to_string(),
                    hard: 1024,
                    soft: 1024,
                }],
                no_new_privileges: false,
            }),
            mounts: default_mounts(),
            linux: Some(Linux {
                namespaces: vec![
                    Namespace::fresh(NamespaceType::Pid),
                    Namespace::fresh(NamespaceType::Network),
                    Namespace::fresh(NamespaceType::Ipc),
                    Namespace::fresh(NamespaceType::Uts),
                    Namespace::fresh(NamespaceType::Mount),
                ],
                sysctl: HashMap::new(),
                masked_paths: Vec::new(),
                readonly_paths: Vec::new(),
            }),
            ..Default::default()
        };

        Self { spec }
    }
}

fn default_mounts() -> Vec<Mount> {
    vec![
        Mount::pseudo("/proc", "proc", "proc", &[]),
        Mount::pseudo(
            "/dev",
            "tmpfs",
            "tmpfs",
            &["nosuid", "strictatime", "mode=755", "size=65536k"],
        ),
        Mount::pseudo(
            "/dev/pts",
            "devpts",
            "devpts",
            &[
                "nosuid",
                "noexec",
                "newinstance",
                "ptmxmode=0666",
                "mode=0620",
            ],
        ),
        Mount::pseudo(
            "/dev/shm",
            "tmpfs",
            "shm",
            &["nosuid", "noexec", "nodev", "mode=1777", "size=65536k"],
        ),
        Mount::pseudo("/dev/mqueue", "mqueue", "mqueue", &["nosuid", "noexec", "nodev"]),
        Mount::pseudo("/sys", "sysfs", "sysfs", &["nosuid", "noexec", "nodev", "ro"]),
    ]
}

impl Generator {
    /// Create a generator with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The generated specification.
    #[must_use]
    pub const fn spec(&self) -> &Spec {
        &self.spec
    }

    /// Set whether the root filesystem is read-only.
    pub fn set_root_readonly(&mut self, readonly: bool) -> &mut Self {
        self.root_mut().readonly = readonly;
        self
    }

    /// Set the container process arguments.
    pub fn set_process_args(&mut self, args: Vec<String>) -> &mut Self {
        self.process_mut().args = args;
        self
    }

    /// Set the container hostname.
    pub fn set_hostname(&mut self, hostname: impl Into<String>) -> &mut Self {
        self.spec.hostname = Some(hostname.into());
        self
    }

    /// Append a process resource limit.
    pub fn add_process_rlimit(
        &mut self,
        limit_type: impl Into<String>,
        hard: u64,
        soft: u64,
    ) -> &mut Self {
        self.process_mut().rlimits.push(Rlimit {
            limit_type: limit_type.into(),
            hard,
            soft,
        });
        self
    }

    /// Set a kernel parameter inside the container.
    pub fn add_linux_sysctl(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.linux_mut().sysctl.insert(key.into(), value.into());
        self
    }

    fn root_mut(&mut self) -> &mut Root {
        self.spec.root.get_or_insert_with(|| Root {
            path: ".".into(),
            readonly: false,
        })
    }

    fn process_mut(&mut self) -> &mut Process {
        self.spec.process.get_or_insert_with(|| Process {
            terminal: false,
            user: User::default(),
            args: vec!["sh".to_string()],
            env: Vec::new(),
            cwd: "/".into(),
            capabilities: None,
            rlimits: Vec::new(),
            no_new_privileges: false,
        })
    }

    fn linux_mut(&mut self) -> &mut Linux {
        self.spec.linux.get_or_insert_with(Linux::default)
    }
}
