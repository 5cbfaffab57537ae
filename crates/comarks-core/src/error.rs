//! Error types for exam setup, marks entry, and storage.
//!
//! Every failing operation leaves persisted state untouched; callers report
//! the error to the user and carry on.

use thiserror::Error;

/// A single problem found while validating an exam definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupIssue {
    /// The exam id is empty or contains characters unsafe for storage keys.
    #[error("exam id {0:?} must be non-empty and use only letters, digits, '-' or '_'")]
    InvalidId(String),

    #[error("exam name is empty")]
    MissingName,

    #[error("total marks must be greater than zero")]
    NonPositiveTotalMarks,

    #[error("exam has no course outcomes")]
    NoCourseOutcomes,

    /// CO at this (0-based) position has an empty code.
    #[error("course outcome #{} has an empty code", .0 + 1)]
    EmptyCoCode(usize),

    #[error("duplicate course outcome code: {0}")]
    DuplicateCoCode(String),

    #[error("exam has no questions")]
    NoQuestions,

    /// Question at this (0-based) position has an empty number.
    #[error("question #{} has an empty number", .0 + 1)]
    EmptyQuestionNumber(usize),

    #[error("duplicate question number: {0}")]
    DuplicateQuestionNumber(String),

    #[error("question {0} must be worth more than zero marks")]
    NonPositiveMaxMarks(String),

    #[error("question {question} refers to unknown course outcome {co_code:?}")]
    UnknownCoReference { question: String, co_code: String },

    #[error("question max marks add up to more than {} marks", crate::model::Marks::MAX)]
    MaxMarksOverflow,
}

/// Errors raised by the comarks core.
#[derive(Debug, Error)]
pub enum ExamError {
    /// The exam definition failed validation.
    #[error("invalid exam setup: {}", join_issues(.0))]
    InvalidSetup(Vec<SetupIssue>),

    #[error("student id is empty")]
    EmptyStudentId,

    #[error("exam not found: {0}")]
    ExamNotFound(String),

    #[error("no record for student {student_id} in exam {exam_id}")]
    RecordNotFound { exam_id: String, student_id: String },

    #[error("exam has no question {0}")]
    UnknownQuestion(String),

    /// Reading or writing a stored document failed.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be (de)serialized.
    #[error("malformed document {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ExamError {
    /// Returns `true` for lookup failures (missing exam, record, or question).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ExamError::ExamNotFound(_)
                | ExamError::RecordNotFound { .. }
                | ExamError::UnknownQuestion(_)
        )
    }

    /// The setup issues, if this is a validation failure.
    pub fn setup_issues(&self) -> &[SetupIssue] {
        match self {
            ExamError::InvalidSetup(issues) => issues,
            _ => &[],
        }
    }
}

fn join_issues(issues: &[SetupIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
