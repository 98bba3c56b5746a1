//! # krug
//!
//! An OCI runtime conformance harness.
//!
//! krug drives an external, spec-compliant runtime binary (`runc` by
//! default, overridable via the `RUNTIME` environment variable) through the
//! container lifecycle and asserts that observable behavior matches the
//! runtime spec's normative requirements.
//!
//! ## Usage
//!
//! ```no_run
//! use krug::bundle::BundleProvisioner;
//! use krug::driver::RuntimeDriver;
//! use krug_common::ContainerId;
//! use krug_oci::Generator;
//!
//! # fn example() -> krug_common::KrugResult<()> {
//! let bundle = BundleProvisioner::new().provision()?;
//! let mut driver = RuntimeDriver::new("runc", &bundle)?;
//!
//! driver.set_config(&Generator::default())?;
//! driver.set_id(ContainerId::generate());
//! driver.create()?;
//! driver.start()?;
//!
//! let state = driver.state()?;
//! println!("{}: {}", state.id, state.status);
//!
//! driver.clean(true)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod bundle;
pub mod cli;
pub mod driver;
pub mod scenario;
pub mod selfcheck;

pub use driver::RuntimeDriver;
