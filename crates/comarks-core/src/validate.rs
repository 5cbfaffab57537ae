//! Exam setup validation.
//!
//! An exam is only persisted when [`validate_exam`] finds nothing. Questions
//! pointing at an unknown Course Outcome are rejected here, at setup time,
//! rather than silently dropped during aggregation.

use std::collections::HashSet;

use crate::error::{ExamError, SetupIssue};
use crate::model::{ExamDefinition, Marks};

/// Whether `id` can be used as an exam id (and therefore in a storage key).
pub fn is_valid_exam_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Collect every setup issue in an exam definition.
pub fn validate_exam(exam: &ExamDefinition) -> Vec<SetupIssue> {
    let mut issues = Vec::new();

    if !is_valid_exam_id(&exam.id) {
        issues.push(SetupIssue::InvalidId(exam.id.clone()));
    }
    if exam.name.trim().is_empty() {
        issues.push(SetupIssue::MissingName);
    }
    if exam.total_marks == 0 {
        issues.push(SetupIssue::NonPositiveTotalMarks);
    }

    if exam.course_outcomes.is_empty() {
        issues.push(SetupIssue::NoCourseOutcomes);
    }
    let mut co_codes = HashSet::new();
    for (idx, co) in exam.course_outcomes.iter().enumerate() {
        if co.code.trim().is_empty() {
            issues.push(SetupIssue::EmptyCoCode(idx));
        } else if !co_codes.insert(co.code.as_str()) {
            issues.push(SetupIssue::DuplicateCoCode(co.code.clone()));
        }
    }

    if exam.questions.is_empty() {
        issues.push(SetupIssue::NoQuestions);
    }
    let mut numbers = HashSet::new();
    let mut max_marks_sum: Option<Marks> = Some(0);
    for (idx, question) in exam.questions.iter().enumerate() {
        max_marks_sum = max_marks_sum.and_then(|sum| sum.checked_add(question.max_marks));
        if question.number.trim().is_empty() {
            issues.push(SetupIssue::EmptyQuestionNumber(idx));
            continue;
        }
        if !numbers.insert(question.number.as_str()) {
            issues.push(SetupIssue::DuplicateQuestionNumber(question.number.clone()));
        }
        if question.max_marks == 0 {
            issues.push(SetupIssue::NonPositiveMaxMarks(question.number.clone()));
        }
        if !co_codes.contains(question.co_code.as_str()) {
            issues.push(SetupIssue::UnknownCoReference {
                question: question.number.clone(),
                co_code: question.co_code.clone(),
            });
        }
    }
    if max_marks_sum.is_none() {
        issues.push(SetupIssue::MaxMarksOverflow);
    }

    issues
}

/// Fail with [`ExamError::InvalidSetup`] if the exam has any issue.
pub fn ensure_valid(exam: &ExamDefinition) -> Result<(), ExamError> {
    let issues = validate_exam(exam);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ExamError::InvalidSetup(issues))
    }
}
