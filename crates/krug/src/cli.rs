//! CLI command definitions and handlers.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};

use krug_common::paths::RUNTIME_COMMAND;

use crate::scenario::{self, ScenarioContext};

/// krug - OCI runtime conformance harness
#[derive(Parser)]
#[command(name = "krug")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Runtime binary under test (also settable via RUNTIME)
    #[arg(long, global = true, default_value_t = RUNTIME_COMMAND.clone())]
    pub runtime: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Harness commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the conformance suite against the runtime under test
    Validate {
        /// Only run scenarios whose name contains this substring
        filter: Option<String>,
    },

    /// List the scenarios in the suite
    List,
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Returns an error if any scenario fails, so the process exits
    /// non-zero.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::List => {
                for scenario in scenario::suite() {
                    println!("{:<20} {}", scenario.name, scenario.summary);
                }
                Ok(())
            }
            Commands::Validate { filter } => {
                let ctx = ScenarioContext {
                    runtime: self.runtime,
                };
                run_suite(&ctx, filter.as_deref())
            }
        }
    }
}

fn run_suite(ctx: &ScenarioContext, filter: Option<&str>) -> Result<()> {
    let scenarios = scenario::filtered(filter);
    if scenarios.is_empty() {
        return Err(eyre!("no scenario matches filter {filter:?}"));
    }

    let total = scenarios.len();
    let mut failed = 0usize;

    for scenario in scenarios {
        tracing::info!(scenario = scenario.name, runtime = %ctx.runtime, "Running scenario");
        match scenario.run(ctx) {
            Ok(()) => tracing::info!(scenario = scenario.name, "Scenario passed"),
            Err(err) => {
                failed += 1;
                tracing::error!(scenario = scenario.name, error = %err, "Scenario failed");
            }
        }
    }

    println!("{}/{total} scenarios passed", total - failed);
    if failed > 0 {
        return Err(eyre!("{failed} of {total} scenarios failed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn validate_accepts_a_filter() {
        let cli = Cli::parse_from(["krug", "validate", "rootfs"]);
        match cli.command {
            Commands::Validate { filter } => assert_eq!(filter.as_deref(), Some("rootfs")),
            Commands::List => panic!("expected validate"),
        }
    }

    #[test]
    fn runtime_flag_overrides_the_default() {
        let cli = Cli::parse_from(["krug", "--runtime", "crun", "list"]);
        assert_eq!(cli.runtime, "crun");
    }
}
