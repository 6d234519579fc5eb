//! Job identity and lifecycle records
//!
//! A job is one admitted extraction request. Its identity is a UUID that
//! doubles as the basename for everything the job leaves on disk. The two
//! serialized records here share the extraction tool's wire vocabulary:
//! [`ProgressSnapshot`] mirrors the NDJSON progress lines the tool emits,
//! and [`CompletionRecord`] extends the final snapshot with the run's
//! size and duration.

use crate::region::{Region, RegionError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique job identifier.
///
/// Generated ids are UUID v4 strings. The id is embedded in file names, so
/// it never contains path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An admitted extraction job.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    /// Display name supplied by the caller.
    pub name: String,
    pub region: Region,
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    /// Creates a job with a generated id and the current submission time.
    pub fn new(name: impl Into<String>, region: Region) -> Self {
        Self {
            id: JobId::generate(),
            name: name.into(),
            region,
            submitted_at: Utc::now(),
        }
    }
}

/// Point-in-time extraction progress, one per tool progress line.
///
/// Field names on the wire are the extraction tool's: `Timestamp`,
/// `CellsTotal`, `CellsProg` and so on. A line missing any counter fails to
/// parse, which the worker treats as a job failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProgressSnapshot {
    /// Dataset timestamp the extraction is running against.
    pub timestamp: String,
    pub cells_total: u64,
    pub cells_prog: u64,
    pub nodes_total: u64,
    pub nodes_prog: u64,
    pub elems_total: u64,
    pub elems_prog: u64,
}

/// Durable record of a finished job.
///
/// Serializes flat: the final progress counters and the completion fields
/// form a single JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompletionRecord {
    #[serde(flatten)]
    pub progress: ProgressSnapshot,
    /// Size of the produced artifact in bytes.
    pub size_bytes: u64,
    /// Wall-clock run duration in seconds.
    pub elapsed: f64,
    pub complete: bool,
}

impl CompletionRecord {
    /// Builds the record for a successful run.
    pub fn new(progress: ProgressSnapshot, elapsed: Duration, size_bytes: u64) -> Self {
        Self {
            progress,
            size_bytes,
            elapsed: elapsed.as_secs_f64(),
            complete: true,
        }
    }

    /// The run duration as a [`Duration`].
    ///
    /// A stored value that is negative or non-finite reads as zero.
    pub fn elapsed_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.elapsed).unwrap_or_default()
    }
}

/// Metadata sidecar describing what a job was asked to extract.
///
/// Written once at admission and never read back by the engine; it exists
/// so the results directory is self-describing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobMetadata {
    pub uuid: String,
    pub name: String,
    pub region_type: String,
    pub region_data: Value,
    pub submitted_at: DateTime<Utc>,
}

impl JobMetadata {
    /// Captures a job's request metadata.
    pub fn for_job(job: &Job) -> Result<Self, RegionError> {
        Ok(Self {
            uuid: job.id.to_string(),
            name: job.name.clone(),
            region_type: job.region.kind().to_string(),
            region_data: job.region.canonical_value()?,
            submitted_at: job.submitted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = JobId::generate();
        let b = JobId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36, "UUID v4 string form");
    }

    #[test]
    fn test_id_display_round_trips() {
        let id = JobId::new("abc-123");
        assert_eq!(id.to_string(), "abc-123");
        assert_eq!(JobId::from("abc-123"), id);
    }

    #[test]
    fn test_progress_parses_a_tool_line() {
        let line = r#"{"Timestamp":"2024-01-01T00:00:00Z","CellsTotal":100,"CellsProg":50,"NodesTotal":10,"NodesProg":5,"ElemsTotal":4,"ElemsProg":2}"#;
        let snapshot: ProgressSnapshot = serde_json::from_str(line).expect("valid line");

        assert_eq!(snapshot.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(snapshot.cells_total, 100);
        assert_eq!(snapshot.cells_prog, 50);
        assert_eq!(snapshot.nodes_total, 10);
        assert_eq!(snapshot.nodes_prog, 5);
        assert_eq!(snapshot.elems_total, 4);
        assert_eq!(snapshot.elems_prog, 2);
    }

    #[test]
    fn test_progress_rejects_missing_counters() {
        let line = r#"{"Timestamp":"t","CellsTotal":1,"CellsProg":1}"#;
        let result: Result<ProgressSnapshot, _> = serde_json::from_str(line);
        assert!(result.is_err(), "Missing counters must fail the parse");
    }

    #[test]
    fn test_completion_serializes_flat() {
        let progress = ProgressSnapshot {
            timestamp: "t".into(),
            cells_total: 2,
            cells_prog: 2,
            nodes_total: 4,
            nodes_prog: 4,
            elems_total: 6,
            elems_prog: 6,
        };
        let record = CompletionRecord::new(progress, Duration::from_secs(3), 1024);

        let value = serde_json::to_value(&record).expect("serializes");
        assert_eq!(value["CellsTotal"], 2, "Progress fields sit at the top level");
        assert_eq!(value["SizeBytes"], 1024);
        assert_eq!(value["Elapsed"], 3.0);
        assert_eq!(value["Complete"], true);

        let back: CompletionRecord = serde_json::from_value(value).expect("round trips");
        assert_eq!(back, record);
        assert_eq!(back.elapsed_duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_elapsed_is_written_in_seconds() {
        let record =
            CompletionRecord::new(ProgressSnapshot::default(), Duration::from_millis(2500), 512);

        let value = serde_json::to_value(&record).expect("serializes");
        assert_eq!(value["Elapsed"], 2.5, "Elapsed is wall-clock seconds");
        assert_eq!(record.elapsed_duration(), Duration::from_millis(2500));
    }

    #[test]
    fn test_elapsed_duration_tolerates_bad_stored_values() {
        let json = r#"{"Timestamp":"t","CellsTotal":0,"CellsProg":0,"NodesTotal":0,"NodesProg":0,"ElemsTotal":0,"ElemsProg":0,"SizeBytes":0,"Elapsed":-4.0,"Complete":true}"#;
        let record: CompletionRecord = serde_json::from_str(json).expect("parses");
        assert_eq!(record.elapsed_duration(), Duration::ZERO);
    }

    #[test]
    fn test_metadata_captures_the_request() {
        let region = Region::from_payload("bbox", &json!([1.0, 2.0, 3.0, 4.0])).unwrap();
        let job = Job::new("alps", region);
        let metadata = JobMetadata::for_job(&job).expect("serializable region");

        assert_eq!(metadata.uuid, job.id.to_string());
        assert_eq!(metadata.name, "alps");
        assert_eq!(metadata.region_type, "bbox");
        assert_eq!(metadata.region_data, json!([1.0, 2.0, 3.0, 4.0]));

        let value = serde_json::to_value(&metadata).expect("serializes");
        assert!(value.get("Uuid").is_some());
        assert!(value.get("SubmittedAt").is_some());
    }
}
