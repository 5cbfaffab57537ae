//! Marks entry for a single student.
//!
//! Raw input is clamped here, before it ever reaches the aggregator.
//! Editing an existing record is an explicit call: the record is handed to
//! [`MarksEntry::edit`] instead of being stashed somewhere for later pickup.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{clamp_mark, compute_co_marks, compute_percentage, compute_total};
use crate::error::ExamError;
use crate::model::{ExamDefinition, Marks, StudentRecord};
use crate::summary::{co_breakdown, question_breakdown, CoBreakdown, QuestionBreakdown};

/// Marks being entered for one student against one exam.
#[derive(Debug, Clone)]
pub struct MarksEntry<'a> {
    exam: &'a ExamDefinition,
    student_id: String,
    marks: BTreeMap<String, Marks>,
    editing: bool,
}

/// Result of [`MarksEntry::calculate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksSummary {
    pub co_marks: BTreeMap<String, Marks>,
    pub total: Marks,
    /// Percentage of the exam's total marks.
    pub percentage: u32,
    /// Per-CO marks against their obtainable maximum, in definition order.
    pub breakdown: Vec<CoBreakdown>,
    /// Per-question marks against their max, in question order.
    pub questions: Vec<QuestionBreakdown>,
}

impl<'a> MarksEntry<'a> {
    /// Start a fresh entry with every question at 0.
    pub fn new(exam: &'a ExamDefinition) -> Self {
        let marks = exam
            .questions
            .iter()
            .map(|q| (q.number.clone(), 0))
            .collect();
        Self {
            exam,
            student_id: String::new(),
            marks,
            editing: false,
        }
    }

    /// Start from an existing record.
    ///
    /// Marks for questions the exam no longer has are dropped, new
    /// questions start at 0, and stored marks are clamped against the
    /// current max marks.
    pub fn edit(exam: &'a ExamDefinition, record: &StudentRecord) -> Self {
        let mut entry = Self::new(exam);
        entry.student_id = record.student_id.clone();
        entry.editing = true;
        for question in &exam.questions {
            if let Some(&stored) = record.question_marks.get(&question.number) {
                entry
                    .marks
                    .insert(question.number.clone(), stored.min(question.max_marks));
            }
        }
        entry
    }

    pub fn exam(&self) -> &ExamDefinition {
        self.exam
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    /// Whether this entry started from an existing record.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn set_student_id(&mut self, student_id: impl Into<String>) {
        self.student_id = student_id.into();
    }

    /// Current mark for a question (0 for unknown numbers).
    pub fn mark(&self, question_number: &str) -> Marks {
        self.marks.get(question_number).copied().unwrap_or(0)
    }

    pub fn marks(&self) -> &BTreeMap<String, Marks> {
        &self.marks
    }

    /// Set a question's mark from raw input, returning the clamped value.
    pub fn set_mark(&mut self, question_number: &str, raw: i64) -> Result<Marks, ExamError> {
        let question = self
            .exam
            .question(question_number)
            .ok_or_else(|| ExamError::UnknownQuestion(question_number.to_string()))?;

        let clamped = clamp_mark(raw, question.max_marks);
        if i64::from(clamped) != raw {
            tracing::warn!(
                question = question_number,
                raw,
                clamped,
                max = question.max_marks,
                "mark out of range, clamped"
            );
        }
        self.marks.insert(question.number.clone(), clamped);
        Ok(clamped)
    }

    /// Aggregate the current marks.
    pub fn calculate(&self) -> MarksSummary {
        let co_marks = compute_co_marks(self.exam, &self.marks);
        let total = compute_total(&co_marks);
        MarksSummary {
            breakdown: co_breakdown(self.exam, &co_marks),
            questions: question_breakdown(self.exam, &self.marks),
            percentage: compute_percentage(total, self.exam.total_marks),
            co_marks,
            total,
        }
    }

    /// Finish the entry as a record ready for upsert.
    pub fn into_record(self) -> Result<StudentRecord, ExamError> {
        let student_id = self.student_id.trim();
        if student_id.is_empty() {
            return Err(ExamError::EmptyStudentId);
        }
        Ok(StudentRecord::new(self.exam, student_id, self.marks))
    }
}
