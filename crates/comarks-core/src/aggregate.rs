//! Marks aggregation: per-question marks rolled up into per-Course-Outcome
//! totals, an overall total, and percentages.
//!
//! Everything here is pure. Clamping happens at the input boundary
//! ([`clamp_mark`]); the aggregation functions trust the marks they get.
//! Sums saturate at `Marks::MAX` instead of overflowing.

use std::collections::BTreeMap;

use crate::model::{ExamDefinition, Marks};

/// Sum awarded marks into one bucket per Course Outcome.
///
/// The result has exactly the exam's CO codes as keys. Missing question
/// marks count as 0. A question whose `co_code` matches no Course Outcome
/// contributes to no bucket.
pub fn compute_co_marks(
    exam: &ExamDefinition,
    question_marks: &BTreeMap<String, Marks>,
) -> BTreeMap<String, Marks> {
    let mut co_marks: BTreeMap<String, Marks> = exam
        .course_outcomes
        .iter()
        .map(|co| (co.code.clone(), 0))
        .collect();

    for question in &exam.questions {
        let awarded = question_marks.get(&question.number).copied().unwrap_or(0);
        if let Some(bucket) = co_marks.get_mut(&question.co_code) {
            *bucket = bucket.saturating_add(awarded);
        }
    }

    co_marks
}

/// Sum of all per-CO marks.
pub fn compute_total(co_marks: &BTreeMap<String, Marks>) -> Marks {
    co_marks.values().fold(0, |acc, m| acc.saturating_add(*m))
}

/// Direct sum of awarded marks over the exam's questions.
///
/// Agrees with `compute_total(compute_co_marks(..))` whenever every
/// question maps to a known Course Outcome.
pub fn question_marks_sum(exam: &ExamDefinition, question_marks: &BTreeMap<String, Marks>) -> Marks {
    exam.questions
        .iter()
        .map(|q| question_marks.get(&q.number).copied().unwrap_or(0))
        .fold(0, Marks::saturating_add)
}

/// Maximum obtainable marks per Course Outcome.
///
/// A CO with no questions maps to 0.
pub fn co_possible_marks(exam: &ExamDefinition) -> BTreeMap<String, Marks> {
    let mut possible: BTreeMap<String, Marks> = exam
        .course_outcomes
        .iter()
        .map(|co| (co.code.clone(), 0))
        .collect();
    for question in &exam.questions {
        if let Some(bucket) = possible.get_mut(&question.co_code) {
            *bucket = bucket.saturating_add(question.max_marks);
        }
    }
    possible
}

/// `round(100 * score / denominator)`, or 0 when the denominator is 0.
///
/// Halves round away from zero. The result may exceed 100 when the score
/// is larger than the denominator.
pub fn compute_percentage(score: Marks, denominator: Marks) -> u32 {
    if denominator == 0 {
        return 0;
    }
    (100.0 * f64::from(score) / f64::from(denominator)).round() as u32
}

/// Clamp raw input into `[0, max_marks]`.
pub fn clamp_mark(awarded: i64, max_marks: Marks) -> Marks {
    let floored = awarded.max(0);
    floored.min(i64::from(max_marks)) as Marks
}
