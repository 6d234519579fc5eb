//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use mapcarve::density::DensityError;
use mapcarve::service::{ServiceError, SubmitError};
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Failed to load the density grid
    GridLoad { path: String, error: DensityError },
    /// Failed to read or parse a region file
    RegionFile { path: String, message: String },
    /// Failed to create the service
    ServiceCreation(ServiceError),
    /// Failed to read job status
    StatusRead(ServiceError),
    /// A submission was rejected
    Submit { name: String, error: SubmitError },
    /// One or more extractions failed
    JobsFailed(usize),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::GridLoad { .. } => {
                eprintln!();
                eprintln!("The density grid must be a square power-of-two PNG where each");
                eprintln!("pixel encodes a cell weight as red * 256 + green.");
            }
            CliError::Submit {
                error: SubmitError::CostExceeded { .. },
                ..
            } => {
                eprintln!();
                eprintln!("Try a smaller region, or raise admission.cost_ceiling in config.ini");
            }
            CliError::Submit {
                error: SubmitError::QueueFull,
                ..
            } => {
                eprintln!();
                eprintln!("The job queue is at capacity. Wait for in-flight jobs to drain,");
                eprintln!("or raise executor.queue_capacity in config.ini");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start the async runtime: {}", e),
            CliError::GridLoad { path, error } => {
                write!(f, "Failed to load density grid '{}': {}", path, error)
            }
            CliError::RegionFile { path, message } => {
                write!(f, "Failed to read region file '{}': {}", path, message)
            }
            CliError::ServiceCreation(e) => {
                write!(f, "Failed to start the extraction service: {}", e)
            }
            CliError::StatusRead(e) => write!(f, "Failed to read job status: {}", e),
            CliError::Submit { name, error } => {
                write!(f, "Submission '{}' rejected: {}", name, error)
            }
            CliError::JobsFailed(count) => write!(f, "{} extraction job(s) failed", count),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) => Some(e),
            CliError::GridLoad { error, .. } => Some(error),
            CliError::ServiceCreation(e) => Some(e),
            CliError::StatusRead(e) => Some(e),
            CliError::Submit { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::ServiceCreation(e)
    }
}
