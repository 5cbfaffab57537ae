//! Exam and student-record repository over a key-value document store.
//!
//! Storage mirrors the browser app's local-storage layout: one JSON
//! document per key, each written as a whole.
//!
//! | key                   | document                 |
//! |-----------------------|--------------------------|
//! | `examsList`           | `Vec<ExamSummary>`       |
//! | `examSetup_<id>`      | `ExamDefinition`         |
//! | `studentRecords_<id>` | `Vec<StudentRecord>`     |
//!
//! Every mutation is a read-modify-write of a whole document. There is no
//! locking: two processes writing the same document race and the last
//! writer wins.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ExamError;
use crate::model::{ExamDefinition, ExamSummary, StudentRecord};
use crate::validate::ensure_valid;

const EXAMS_LIST_KEY: &str = "examsList";

fn exam_key(exam_id: &str) -> String {
    format!("examSetup_{exam_id}")
}

fn records_key(exam_id: &str) -> String {
    format!("studentRecords_{exam_id}")
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// A string-keyed store of serialized documents.
pub trait KeyValueBackend {
    /// Read a document, `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, ExamError>;

    /// Replace a document.
    fn set(&mut self, key: &str, value: &str) -> Result<(), ExamError>;

    /// Remove a document. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), ExamError>;
}

/// Keeps documents in memory. Useful for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    documents: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, ExamError> {
        Ok(self.documents.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ExamError> {
        self.documents.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ExamError> {
        self.documents.remove(key);
        Ok(())
    }
}

/// Stores each document as `<dir>/<key>.json`.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the target, so a document is either the old or the new
/// version, never a partial one.
#[derive(Debug, Clone)]
pub struct DirBackend {
    dir: PathBuf,
}

impl DirBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ExamError> {
        let safe = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(ExamError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid storage key: {key:?}"),
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueBackend for DirBackend {
    fn get(&self, key: &str) -> Result<Option<String>, ExamError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), "read document");
                Ok(Some(content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ExamError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        tracing::debug!(path = %path.display(), bytes = value.len(), "wrote document");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ExamError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// Whether an upsert added a record or replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Exams and student records on top of a [`KeyValueBackend`].
#[derive(Debug, Clone)]
pub struct ExamRepository<B> {
    backend: B,
}

impl ExamRepository<DirBackend> {
    /// Repository storing documents under `dir`.
    pub fn open_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(DirBackend::new(dir))
    }
}

impl ExamRepository<MemoryBackend> {
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl<B: KeyValueBackend> ExamRepository<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read_doc<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ExamError> {
        match self.backend.get(key)? {
            Some(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|source| ExamError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn write_doc<T: Serialize>(&mut self, key: &str, doc: &T) -> Result<(), ExamError> {
        let content = serde_json::to_string(doc).map_err(|source| ExamError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, &content)
    }

    /// All exams in the index, in creation order.
    pub fn list_exams(&self) -> Result<Vec<ExamSummary>, ExamError> {
        Ok(self.read_doc(EXAMS_LIST_KEY)?.unwrap_or_default())
    }

    /// Load an exam definition.
    pub fn load(&self, exam_id: &str) -> Result<ExamDefinition, ExamError> {
        if !crate::validate::is_valid_exam_id(exam_id) {
            return Err(ExamError::ExamNotFound(exam_id.to_string()));
        }
        self.read_doc(&exam_key(exam_id))?
            .ok_or_else(|| ExamError::ExamNotFound(exam_id.to_string()))
    }

    /// Validate and store an exam, adding or refreshing its index entry.
    ///
    /// Nothing is written if validation fails.
    pub fn save(&mut self, exam: &ExamDefinition) -> Result<(), ExamError> {
        ensure_valid(exam)?;

        let mut index = self.list_exams()?;
        let summary = exam.summary();
        match index.iter().position(|s| s.id == exam.id) {
            Some(pos) => index[pos] = summary,
            None => index.push(summary),
        }

        self.write_doc(&exam_key(&exam.id), exam)?;
        self.write_doc(EXAMS_LIST_KEY, &index)?;
        tracing::info!(exam = %exam.id, name = %exam.name, "saved exam setup");
        Ok(())
    }

    /// Remove an exam, its index entry, and all of its records.
    pub fn delete_exam(&mut self, exam_id: &str) -> Result<(), ExamError> {
        let mut index = self.list_exams()?;
        let before = index.len();
        index.retain(|s| s.id != exam_id);
        let in_index = index.len() != before;

        if !in_index && self.load(exam_id).is_err() {
            return Err(ExamError::ExamNotFound(exam_id.to_string()));
        }

        self.write_doc(EXAMS_LIST_KEY, &index)?;
        self.backend.remove(&exam_key(exam_id))?;
        self.backend.remove(&records_key(exam_id))?;
        tracing::info!(exam = %exam_id, "deleted exam and its records");
        Ok(())
    }

    /// All records of an exam, with derived fields recomputed.
    pub fn list_records(&self, exam_id: &str) -> Result<Vec<StudentRecord>, ExamError> {
        let exam = self.load(exam_id)?;
        let mut records: Vec<StudentRecord> =
            self.read_doc(&records_key(exam_id))?.unwrap_or_default();
        for record in &mut records {
            record.recompute(&exam);
        }
        Ok(records)
    }

    pub fn find_record(
        &self,
        exam_id: &str,
        student_id: &str,
    ) -> Result<Option<StudentRecord>, ExamError> {
        Ok(self
            .list_records(exam_id)?
            .into_iter()
            .find(|r| r.student_id == student_id))
    }

    /// Insert a record, or replace the one with the same student id.
    pub fn upsert_record(
        &mut self,
        exam_id: &str,
        mut record: StudentRecord,
    ) -> Result<UpsertOutcome, ExamError> {
        if record.student_id.trim().is_empty() {
            return Err(ExamError::EmptyStudentId);
        }
        let exam = self.load(exam_id)?;
        record.recompute(&exam);

        let mut records = self.list_records(exam_id)?;
        let outcome = match records
            .iter()
            .position(|r| r.student_id == record.student_id)
        {
            Some(pos) => {
                records[pos] = record;
                UpsertOutcome::Updated
            }
            None => {
                records.push(record);
                UpsertOutcome::Inserted
            }
        };

        self.write_doc(&records_key(exam_id), &records)?;
        tracing::info!(exam = %exam_id, ?outcome, "saved student record");
        Ok(outcome)
    }

    /// Remove a student's record, returning it.
    pub fn delete_record(
        &mut self,
        exam_id: &str,
        student_id: &str,
    ) -> Result<StudentRecord, ExamError> {
        let mut records = self.list_records(exam_id)?;
        let pos = records
            .iter()
            .position(|r| r.student_id == student_id)
            .ok_or_else(|| ExamError::RecordNotFound {
                exam_id: exam_id.to_string(),
                student_id: student_id.to_string(),
            })?;
        let removed = records.remove(pos);

        self.write_doc(&records_key(exam_id), &records)?;
        tracing::info!(exam = %exam_id, student = %student_id, "deleted student record");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SetupIssue;
    use crate::model::fixtures::*;

    fn repo_with_exam() -> ExamRepository<MemoryBackend> {
        let mut repo = ExamRepository::in_memory();
        repo.save(&two_co_exam()).unwrap();
        repo
    }

    #[test]
    fn save_and_load_exam() {
        let repo = repo_with_exam();
        let loaded = repo.load("midterm").unwrap();
        assert_eq!(loaded, two_co_exam());

        let index = repo.list_exams().unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].name, "Midterm");
    }

    #[test]
    fn saving_again_replaces_index_entry() {
        let mut repo = repo_with_exam();
        let mut exam = two_co_exam();
        exam.name = "Midterm (revised)".into();
        repo.save(&exam).unwrap();

        let index = repo.list_exams().unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].name, "Midterm (revised)");
    }

    #[test]
    fn invalid_exam_is_not_written() {
        let mut repo = ExamRepository::in_memory();
        let mut exam = two_co_exam();
        exam.questions[0].co_code = "CO9".into();

        let err = repo.save(&exam).unwrap_err();
        assert!(matches!(
            err.setup_issues(),
            [SetupIssue::UnknownCoReference { .. }]
        ));
        assert!(repo.backend().is_empty());
    }

    #[test]
    fn missing_exam_is_not_found() {
        let repo = ExamRepository::in_memory();
        assert!(matches!(
            repo.load("nope"),
            Err(ExamError::ExamNotFound(_))
        ));
        assert!(matches!(
            repo.list_records("nope"),
            Err(ExamError::ExamNotFound(_))
        ));
    }

    #[test]
    fn upsert_replaces_exactly_once() {
        let mut repo = repo_with_exam();
        let exam = two_co_exam();

        let first = StudentRecord::new(&exam, "S1", marks(&[("1", 8), ("2", 9)]));
        let other = StudentRecord::new(&exam, "S2", marks(&[("1", 1)]));
        let second = StudentRecord::new(&exam, "S1", marks(&[("1", 2), ("2", 3)]));

        assert_eq!(repo.upsert_record("midterm", first).unwrap(), UpsertOutcome::Inserted);
        assert_eq!(repo.upsert_record("midterm", other).unwrap(), UpsertOutcome::Inserted);
        assert_eq!(repo.upsert_record("midterm", second).unwrap(), UpsertOutcome::Updated);

        let records = repo.list_records("midterm").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records.iter().filter(|r| r.student_id == "S1").count(), 1);
        assert_eq!(records[0].student_id, "S1");
        assert_eq!(records[0].total, 5);
    }

    #[test]
    fn upsert_rejects_blank_student_and_unknown_exam() {
        let mut repo = repo_with_exam();
        let exam = two_co_exam();
        let blank = StudentRecord::new(&exam, " ", marks(&[]));
        assert!(matches!(
            repo.upsert_record("midterm", blank),
            Err(ExamError::EmptyStudentId)
        ));
        let record = StudentRecord::new(&exam, "S1", marks(&[]));
        assert!(matches!(
            repo.upsert_record("other", record),
            Err(ExamError::ExamNotFound(_))
        ));
    }

    #[test]
    fn stale_aggregates_are_recomputed_on_load() {
        let mut backend = MemoryBackend::new();
        backend
            .set(
                &exam_key("midterm"),
                &serde_json::to_string(&two_co_exam()).unwrap(),
            )
            .unwrap();
        backend
            .set(
                &records_key("midterm"),
                r#"[{"uid":"S1","marks":{"1":8,"2":9},"coMarks":{"CO1":1},"totalMarks":99}]"#,
            )
            .unwrap();

        let repo = ExamRepository::new(backend);
        let records = repo.list_records("midterm").unwrap();
        assert_eq!(records[0].total, 17);
        assert_eq!(records[0].co_marks, marks(&[("CO1", 8), ("CO2", 9)]));
    }

    #[test]
    fn corrupt_document_names_its_key() {
        let mut backend = MemoryBackend::new();
        backend.set(EXAMS_LIST_KEY, "{not json").unwrap();
        let repo = ExamRepository::new(backend);
        let err = repo.list_exams().unwrap_err();
        assert!(matches!(err, ExamError::Corrupt { ref key, .. } if key == "examsList"));
    }

    #[test]
    fn delete_record() {
        let mut repo = repo_with_exam();
        let exam = two_co_exam();
        repo.upsert_record("midterm", StudentRecord::new(&exam, "S1", marks(&[("1", 3)])))
            .unwrap();

        let removed = repo.delete_record("midterm", "S1").unwrap();
        assert_eq!(removed.total, 3);
        assert!(repo.list_records("midterm").unwrap().is_empty());

        let err = repo.delete_record("midterm", "S1").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_exam_removes_everything() {
        let mut repo = repo_with_exam();
        let exam = two_co_exam();
        repo.upsert_record("midterm", StudentRecord::new(&exam, "S1", marks(&[])))
            .unwrap();

        repo.delete_exam("midterm").unwrap();
        assert!(repo.list_exams().unwrap().is_empty());
        assert!(repo.load("midterm").is_err());
        assert_eq!(repo.backend().get(&records_key("midterm")).unwrap(), None);

        assert!(matches!(
            repo.delete_exam("midterm"),
            Err(ExamError::ExamNotFound(_))
        ));
    }

    #[test]
    fn dir_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = ExamRepository::open_dir(dir.path().join("data"));
        repo.save(&two_co_exam()).unwrap();
        let exam = two_co_exam();
        repo.upsert_record("midterm", StudentRecord::new(&exam, "S1", marks(&[("2", 4)])))
            .unwrap();

        assert!(dir.path().join("data/examsList.json").exists());
        assert!(dir.path().join("data/examSetup_midterm.json").exists());

        let reopened = ExamRepository::open_dir(dir.path().join("data"));
        let records = reopened.list_records("midterm").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].co_marks["CO2"], 4);
    }

    #[test]
    fn dir_backend_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = DirBackend::new(dir.path());
        assert!(backend.set("../escape", "{}").is_err());
        assert!(backend.get("a/b").is_err());
        assert_eq!(backend.get("absent").unwrap(), None);
        backend.remove("absent").unwrap();
    }
}
