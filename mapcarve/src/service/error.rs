//! Service error types.

use crate::region::RegionError;
use crate::store::StoreError;
use std::fmt;

/// Errors from service construction and status queries.
#[derive(Debug)]
pub enum ServiceError {
    /// Filesystem failure setting up service directories.
    Io(std::io::Error),
    /// Result store failure while reading a completion record.
    Store(StoreError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Io(err) => write!(f, "I/O error: {}", err),
            ServiceError::Store(err) => write!(f, "result store error: {}", err),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Io(err) => Some(err),
            ServiceError::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Io(err)
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Store(err)
    }
}

/// Why a submission was rejected.
///
/// Every variant is a normal admission outcome, not an engine fault; callers
/// are expected to surface the reason to whoever submitted the request.
#[derive(Debug)]
pub enum SubmitError {
    /// The region payload failed to parse or validate.
    InvalidRegion(RegionError),
    /// Estimated cost exceeds the admission ceiling.
    CostExceeded { cost: u64, ceiling: u64 },
    /// The queue is at capacity; retry later.
    QueueFull,
    /// The service has shut down and accepts nothing.
    Stopped,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::InvalidRegion(err) => write!(f, "invalid region: {}", err),
            SubmitError::CostExceeded { cost, ceiling } => {
                write!(f, "estimated cost {} exceeds the ceiling of {}", cost, ceiling)
            }
            SubmitError::QueueFull => write!(f, "job queue is full, try again later"),
            SubmitError::Stopped => write!(f, "service is shut down"),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::InvalidRegion(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RegionError> for SubmitError {
    fn from(err: RegionError) -> Self {
        SubmitError::InvalidRegion(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_error_messages() {
        let err = SubmitError::CostExceeded {
            cost: 500,
            ceiling: 100,
        };
        assert_eq!(
            err.to_string(),
            "estimated cost 500 exceeds the ceiling of 100"
        );
        assert_eq!(
            SubmitError::QueueFull.to_string(),
            "job queue is full, try again later"
        );
    }

    #[test]
    fn test_invalid_region_keeps_its_source() {
        use std::error::Error;

        let err = SubmitError::from(RegionError::BboxTooShort(2));
        assert!(err.to_string().starts_with("invalid region:"));
        assert!(err.source().is_some());
    }
}
