//! Core data model types for comarks.
//!
//! Field names on the wire follow the documents the browser app
//! wrote (`cos`, `desc`, `uid`, `totalMarks`, ...), so stored exams and
//! records stay readable by both.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{compute_co_marks, compute_total};

/// Raw or aggregated marks. Marks are whole numbers.
pub type Marks = u32;

/// A named learning objective that questions are mapped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOutcome {
    /// Unique code, e.g. "CO1".
    pub code: String,
    /// Free-form description.
    #[serde(rename = "desc", default)]
    pub description: String,
}

/// A single exam question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question number, unique within the exam (e.g. "1", "2a").
    pub number: String,
    /// The question text.
    #[serde(default)]
    pub statement: String,
    /// Code of the Course Outcome this question counts towards.
    #[serde(rename = "co")]
    pub co_code: String,
    /// Maximum marks a student can be awarded.
    #[serde(rename = "marks")]
    pub max_marks: Marks,
}

/// The static description of an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDefinition {
    /// Unique identifier, also used in storage keys.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Denominator of the overall percentage. Not required to match the
    /// sum of question max marks.
    pub total_marks: Marks,
    /// Course Outcomes in definition order.
    #[serde(rename = "cos")]
    pub course_outcomes: Vec<CourseOutcome>,
    /// Questions in definition order.
    pub questions: Vec<Question>,
    /// Creation time, stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ExamDefinition {
    /// Generate a fresh exam identifier.
    pub fn generate_id() -> String {
        format!("exam_{}", Uuid::new_v4().simple())
    }

    /// Look up a Course Outcome by code.
    pub fn course_outcome(&self, code: &str) -> Option<&CourseOutcome> {
        self.course_outcomes.iter().find(|co| co.code == code)
    }

    /// Look up a question by number.
    pub fn question(&self, number: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.number == number)
    }

    /// Sum of all question max marks, saturating at `Marks::MAX`.
    pub fn max_marks_sum(&self) -> Marks {
        self.questions
            .iter()
            .fold(0, |acc, q| acc.saturating_add(q.max_marks))
    }

    /// The index entry for this exam.
    pub fn summary(&self) -> ExamSummary {
        ExamSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            total_marks: self.total_marks,
            created_at: self.created_at,
        }
    }
}

/// One entry of the exam index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSummary {
    pub id: String,
    pub name: String,
    pub total_marks: Marks,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// One student's marks for one exam.
///
/// `co_marks` and `total` are derived from `question_marks`. They are kept
/// in the stored document for compatibility but are recomputed whenever a
/// record is loaded or written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "uid")]
    pub student_id: String,
    #[serde(rename = "marks", default)]
    pub question_marks: BTreeMap<String, Marks>,
    #[serde(rename = "coMarks", default)]
    pub co_marks: BTreeMap<String, Marks>,
    #[serde(rename = "totalMarks", default)]
    pub total: Marks,
}

impl StudentRecord {
    /// Build a record from raw marks, computing the derived fields.
    pub fn new(
        exam: &ExamDefinition,
        student_id: impl Into<String>,
        question_marks: BTreeMap<String, Marks>,
    ) -> Self {
        let mut record = Self {
            student_id: student_id.into(),
            question_marks,
            co_marks: BTreeMap::new(),
            total: 0,
        };
        record.recompute(exam);
        record
    }

    /// Refresh `co_marks` and `total` from the raw question marks.
    pub fn recompute(&mut self, exam: &ExamDefinition) {
        self.co_marks = compute_co_marks(exam, &self.question_marks);
        self.total = compute_total(&self.co_marks);
    }

    /// Awarded marks for a question, 0 when absent.
    pub fn mark(&self, question_number: &str) -> Marks {
        self.question_marks
            .get(question_number)
            .copied()
            .unwrap_or(0)
    }
}
