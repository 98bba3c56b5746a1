//! # krug-oci
//!
//! OCI runtime specification model for the krug conformance harness.
//!
//! This crate provides:
//! - `config.json` data types ([`runtime`])
//! - state report types and parsing ([`state`])
//! - the configuration generator ([`generator`])
//! - normative requirement identifiers for classifying deviations
//!   ([`requirement`])

#![warn(missing_docs)]

pub mod generator;
pub mod requirement;
pub mod runtime;
pub mod state;

pub use generator::Generator;
pub use requirement::{Requirement, SpecError};
pub use runtime::{OCI_VERSION, Spec};
pub use state::{ContainerStatus, StateReport};
