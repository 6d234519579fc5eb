//! Extraction service assembly
//!
//! Ties the crate's pieces into one engine with a small surface:
//!
//! ```text
//!   SubmitRequest            JobId / SubmitError
//!        |                          ^
//!        v                          |
//!   +---------------------------------------+
//!   |            CarveService               |
//!   |  estimate -> admit -> queue -> pool   |
//!   +---------------------------------------+
//!        |                          |
//!        v                          v
//!   ProgressTracker            ResultStore
//! ```
//!
//! Configuration lives in [`ServiceConfig`], admission failures in
//! [`SubmitError`], and the dataset timestamp cache in [`TimestampCache`].

mod config;
mod error;
mod facade;
mod timestamp;

pub use config::{ServiceConfig, DEFAULT_COST_CEILING, DEFAULT_TIMESTAMP_REFRESH};
pub use error::{ServiceError, SubmitError};
pub use facade::{CarveService, JobStatus, SubmitRequest, SystemSnapshot};
pub use timestamp::TimestampCache;
