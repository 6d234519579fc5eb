//! Durable result store
//!
//! One flat directory holds everything a job leaves behind, keyed by job id:
//!
//! ```text
//! results/
//! ├── {id}                extensionless completion record (JSON)
//! ├── {id}_region.json    request metadata sidecar
//! └── {id}.osm.pbf        extracted artifact
//! ```
//!
//! The completion record is the authoritative done signal, so it is written
//! to a temporary name and renamed into place; a concurrent reader sees
//! either no record or a complete one, never a partial write. The metadata
//! sidecar and the artifact carry no such guarantee and are not part of the
//! status contract.

use crate::job::{CompletionRecord, JobId, JobMetadata};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default filename suffix for extracted artifacts.
pub const DEFAULT_ARTIFACT_SUFFIX: &str = ".osm.pbf";

/// Errors raised by the result store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed store for job results.
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
    artifact_suffix: String,
}

impl ResultStore {
    /// Opens a store rooted at the given directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            artifact_suffix: DEFAULT_ARTIFACT_SUFFIX.to_string(),
        })
    }

    /// Overrides the artifact filename suffix.
    pub fn with_artifact_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.artifact_suffix = suffix.into();
        self
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The artifact filename suffix in effect.
    pub fn artifact_suffix(&self) -> &str {
        &self.artifact_suffix
    }

    /// Path of a job's completion record.
    pub fn completion_path(&self, id: &JobId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Path of a job's metadata sidecar.
    pub fn metadata_path(&self, id: &JobId) -> PathBuf {
        self.root.join(format!("{}_region.json", id))
    }

    /// Path of a job's extracted artifact.
    pub fn artifact_path(&self, id: &JobId) -> PathBuf {
        self.root.join(format!("{}{}", id, self.artifact_suffix))
    }

    /// Writes the metadata sidecar for an admitted job.
    pub fn write_metadata(&self, id: &JobId, metadata: &JobMetadata) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(metadata)?;
        fs::write(self.metadata_path(id), bytes)?;
        Ok(())
    }

    /// Persists a completion record atomically with respect to readers.
    ///
    /// The record lands under a temporary name first and is renamed into
    /// place. The id owns its temp name because only one worker ever runs a
    /// given job.
    pub fn write_completion(
        &self,
        id: &JobId,
        record: &CompletionRecord,
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(record)?;
        let tmp = self.root.join(format!("{}.tmp", id));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, self.completion_path(id))?;
        Ok(())
    }

    /// Reads a job's completion record.
    ///
    /// `Ok(None)` means no record exists; a present but unparseable record
    /// is an error.
    pub fn read_completion(&self, id: &JobId) -> Result<Option<CompletionRecord>, StoreError> {
        match fs::read(self.completion_path(id)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Moves a finished artifact into the store, returning its size in bytes.
    ///
    /// Rename-based, so the source must live on the same filesystem as the
    /// store root.
    pub fn ingest_artifact(&self, id: &JobId, source: &Path) -> Result<u64, StoreError> {
        let size = fs::metadata(source)?.len();
        fs::rename(source, self.artifact_path(id))?;
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Job, ProgressSnapshot};
    use crate::region::Region;
    use std::time::Duration;

    fn sample_record() -> CompletionRecord {
        CompletionRecord::new(
            ProgressSnapshot {
                timestamp: "2024-01-01T00:00:00Z".into(),
                cells_total: 4,
                cells_prog: 4,
                ..Default::default()
            },
            Duration::from_millis(250),
            2048,
        )
    }

    #[test]
    fn test_completion_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path()).unwrap();
        let id = JobId::generate();

        assert!(store.read_completion(&id).unwrap().is_none());

        let record = sample_record();
        store.write_completion(&id, &record).unwrap();

        let back = store.read_completion(&id).unwrap().expect("record exists");
        assert_eq!(back, record);
    }

    #[test]
    fn test_completion_file_is_extensionless_and_tmp_free() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path()).unwrap();
        let id = JobId::new("fixed-id");

        store.write_completion(&id, &sample_record()).unwrap();

        assert!(dir.path().join("fixed-id").is_file());
        assert!(
            !dir.path().join("fixed-id.tmp").exists(),
            "Temp file must be renamed away"
        );
    }

    #[test]
    fn test_malformed_completion_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path()).unwrap();
        let id = JobId::new("broken");

        fs::write(store.completion_path(&id), b"not json").unwrap();
        assert!(matches!(
            store.read_completion(&id),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_metadata_sidecar_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path()).unwrap();

        let region = Region::bbox([0.0, 0.0, 1.0, 1.0]).unwrap();
        let job = Job::new("test-area", region);
        let metadata = JobMetadata::for_job(&job).unwrap();
        store.write_metadata(&job.id, &metadata).unwrap();

        let path = dir.path().join(format!("{}_region.json", job.id));
        let value: serde_json::Value =
            serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(value["Name"], "test-area");
        assert_eq!(value["RegionType"], "bbox");
        assert_eq!(value["Uuid"], job.id.to_string());
    }

    #[test]
    fn test_ingest_moves_the_artifact_and_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("results")).unwrap();
        let id = JobId::new("art");

        let source = dir.path().join("art.partial");
        fs::write(&source, b"pbf-bytes").unwrap();

        let size = store.ingest_artifact(&id, &source).unwrap();
        assert_eq!(size, 9);
        assert!(!source.exists(), "Source is moved, not copied");
        assert_eq!(
            fs::read(store.artifact_path(&id)).unwrap(),
            b"pbf-bytes"
        );
        assert!(store
            .artifact_path(&id)
            .to_string_lossy()
            .ends_with("art.osm.pbf"));
    }

    #[test]
    fn test_custom_artifact_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path())
            .unwrap()
            .with_artifact_suffix(".pbf");
        let id = JobId::new("x");

        assert!(store.artifact_path(&id).to_string_lossy().ends_with("x.pbf"));
    }

    #[test]
    fn test_new_creates_nested_roots() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = ResultStore::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.root(), nested.as_path());
    }
}
