//! CLI functionality for the cqm tool
//!
//! Each subcommand has a `*Config` built by the binary and a `run` function
//! that reads the JSON inputs, does the work and writes the result.

#[cfg(feature = "cli")]
pub mod dependencies;
#[cfg(feature = "cli")]
pub mod diff;
#[cfg(feature = "cli")]
pub mod load;
#[cfg(feature = "cli")]
pub mod logic;
#[cfg(feature = "cli")]
pub mod normalize;
#[cfg(feature = "cli")]
pub mod output;
#[cfg(feature = "cli")]
pub mod read;
