//! Common error types for the krug harness.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`KrugError`].
pub type KrugResult<T> = Result<T, KrugError>;

/// Errors surfaced by the conformance harness.
///
/// Lifecycle-verb failures (`Create`, `Start`, `StateQuery`) wrap the
/// external runtime's diagnostic output verbatim; the failure is frequently
/// the object under test and must reach the scenario unaltered.
#[derive(Error, Diagnostic, Debug)]
pub enum KrugError {
    /// Bundle provisioning failed.
    #[error("Bundle provisioning failed: {message}")]
    #[diagnostic(
        code(krug::bundle::provision),
        help("Check that the root filesystem archive exists and is a valid tar.gz")
    )]
    Provision {
        /// What went wrong during setup.
        message: String,
    },

    /// Driver preconditions unmet at construction.
    #[error("Driver initialization failed: {message}")]
    #[diagnostic(code(krug::driver::init))]
    Init {
        /// What was missing or unresolvable.
        message: String,
    },

    /// Configuration document could not be serialized or written.
    #[error("Failed to write container configuration: {message}")]
    #[diagnostic(code(krug::driver::config_write))]
    ConfigWrite {
        /// The underlying serialization or I/O failure.
        message: String,
    },

    /// A lifecycle operation was invoked out of order.
    #[error("Operation '{operation}' invoked out of order: {reason}")]
    #[diagnostic(
        code(krug::driver::precondition),
        help("Lifecycle verbs must follow set_config -> set_id -> create -> start")
    )]
    Precondition {
        /// The operation that was rejected.
        operation: &'static str,
        /// Which precondition was unmet.
        reason: &'static str,
    },

    /// The external runtime reported a create failure.
    #[error("Runtime create failed: {message}")]
    #[diagnostic(code(krug::runtime::create))]
    Create {
        /// The runtime's diagnostic output.
        message: String,
    },

    /// The external runtime reported a start failure.
    #[error("Runtime start failed: {message}")]
    #[diagnostic(code(krug::runtime::start))]
    Start {
        /// The runtime's diagnostic output.
        message: String,
    },

    /// The state query failed or produced unparseable output.
    #[error("Runtime state query failed: {message}")]
    #[diagnostic(code(krug::runtime::state))]
    StateQuery {
        /// The runtime's diagnostic output or the parse failure.
        message: String,
    },

    /// Best-effort teardown encountered a failure.
    #[error("Cleanup failed: {message}")]
    #[diagnostic(code(krug::driver::cleanup))]
    Cleanup {
        /// The first failure encountered while cleaning up.
        message: String,
    },

    /// Observed behavior deviated from a normative spec requirement.
    #[error("{message}")]
    #[diagnostic(code(krug::conformance))]
    Conformance {
        /// The classified deviation, rendered for assertion output.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(krug::io))]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    #[diagnostic(code(krug::serialization))]
    Serialization(String),
}

impl From<serde_json::Error> for KrugError {
    fn from(err: serde_json::Error) -> Self {
        KrugError::Serialization(err.to_string())
    }
}
