//! comarks-core — exam model, Course-Outcome aggregation, and storage.
//!
//! This crate defines the exam data model, the pure aggregation functions
//! that roll per-question marks up into per-outcome totals, and the
//! repository the CLI persists exams and student records through.

pub mod aggregate;
pub mod config;
pub mod entry;
pub mod error;
pub mod model;
pub mod parser;
pub mod store;
pub mod summary;
pub mod validate;

pub use error::{ExamError, SetupIssue};
pub use model::{CourseOutcome, ExamDefinition, ExamSummary, Marks, Question, StudentRecord};
pub use store::{DirBackend, ExamRepository, KeyValueBackend, MemoryBackend, UpsertOutcome};
