//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`estimate`] - One-shot cost check for a region file
//! - [`run`] - Boot the engine and drive region files to completion

pub mod common;
pub mod estimate;
pub mod run;
