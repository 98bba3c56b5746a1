//! Normative requirement identifiers and spec-tagged errors.
//!
//! When observed behavior deviates from the runtime spec, scenarios label
//! the deviation with the requirement it violates so failures read against
//! the specification text instead of as opaque process-exit noise. Purely
//! diagnostic; nothing here makes control-flow decisions.

use std::fmt;

use thiserror::Error;

/// Normative requirements of the runtime spec lifecycle the harness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// create MUST generate an error if the ID is not provided.
    CreateWithBundlePathAndID,
    /// create MUST create a new container.
    CreateNewContainer,
    /// create MUST generate an error if the ID provided is not unique.
    CreateWithUniqueID,
    /// start MUST generate an error for a container that was never created.
    StartWithoutCreate,
    /// state MUST generate an error for a container that does not exist.
    QueryNonexistent,
    /// delete MUST generate an error for a container that does not exist.
    DeleteNonexistent,
}

impl Requirement {
    /// Stable identifier for assertion output.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::CreateWithBundlePathAndID => "create-with-bundle-path-and-id",
            Self::CreateNewContainer => "create-new-container",
            Self::CreateWithUniqueID => "create-with-unique-id",
            Self::StartWithoutCreate => "start-without-create",
            Self::QueryNonexistent => "query-nonexistent",
            Self::DeleteNonexistent => "delete-nonexistent",
        }
    }

    /// The spec document section the requirement comes from.
    #[must_use]
    pub const fn reference(&self) -> &'static str {
        match self {
            Self::CreateWithBundlePathAndID
            | Self::CreateNewContainer
            | Self::CreateWithUniqueID => "runtime.md#create",
            Self::StartWithoutCreate => "runtime.md#start",
            Self::QueryNonexistent => "runtime.md#query-state",
            Self::DeleteNonexistent => "runtime.md#delete",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// An observed deviation paired with the requirement it violates and the
/// spec version it refers to. Carries no live resources.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{explanation} [{requirement}, OCI runtime spec v{version}: {}]", .requirement.reference())]
pub struct SpecError {
    /// The violated requirement.
    pub requirement: Requirement,
    /// Human-readable explanation of the deviation.
    pub explanation: String,
    /// The spec version the requirement refers to.
    pub version: String,
}

impl SpecError {
    /// Classify a deviation against a requirement.
    #[must_use]
    pub fn new(
        requirement: Requirement,
        explanation: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            requirement,
            explanation: explanation.into(),
            version: version.into(),
        }
    }
}
