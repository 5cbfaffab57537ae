//! Per-student and per-class result summaries.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::{co_possible_marks, compute_co_marks, compute_percentage, compute_total};
use crate::model::{ExamDefinition, Marks, StudentRecord};

/// Marks for one Course Outcome against its obtainable maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoBreakdown {
    pub code: String,
    pub awarded: Marks,
    pub possible: Marks,
    /// 0 when `possible` is 0.
    pub percentage: u32,
}

/// Break CO marks down in the exam's CO order.
pub fn co_breakdown(exam: &ExamDefinition, co_marks: &BTreeMap<String, Marks>) -> Vec<CoBreakdown> {
    let possible = co_possible_marks(exam);
    exam.course_outcomes
        .iter()
        .map(|co| {
            let awarded = co_marks.get(&co.code).copied().unwrap_or(0);
            let possible = possible.get(&co.code).copied().unwrap_or(0);
            CoBreakdown {
                code: co.code.clone(),
                awarded,
                possible,
                percentage: compute_percentage(awarded, possible),
            }
        })
        .collect()
}

/// Marks for one question against its maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBreakdown {
    pub number: String,
    pub co_code: String,
    pub awarded: Marks,
    pub max: Marks,
    pub percentage: u32,
}

/// Per-question marks in the exam's question order. Missing marks count as 0.
pub fn question_breakdown(
    exam: &ExamDefinition,
    question_marks: &BTreeMap<String, Marks>,
) -> Vec<QuestionBreakdown> {
    exam.questions
        .iter()
        .map(|q| {
            let awarded = question_marks.get(&q.number).copied().unwrap_or(0);
            QuestionBreakdown {
                number: q.number.clone(),
                co_code: q.co_code.clone(),
                awarded,
                max: q.max_marks,
                percentage: compute_percentage(awarded, q.max_marks),
            }
        })
        .collect()
}

/// Coarse performance class used to colour results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Fair,
    Good,
    Excellent,
}

impl Band {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            0..=39 => Band::Low,
            40..=59 => Band::Fair,
            60..=79 => Band::Good,
            _ => Band::Excellent,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Low => write!(f, "low"),
            Band::Fair => write!(f, "fair"),
            Band::Good => write!(f, "good"),
            Band::Excellent => write!(f, "excellent"),
        }
    }
}

/// Whether a percentage meets the pass threshold.
pub fn passed(percentage: u32, threshold: u32) -> bool {
    percentage >= threshold
}

/// A student's results, recomputed from raw marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: String,
    /// Question marks in the exam's question order.
    pub question_marks: Vec<(String, Marks)>,
    pub course_outcomes: Vec<CoBreakdown>,
    pub total: Marks,
    pub percentage: u32,
    pub band: Band,
}

impl StudentSummary {
    pub fn from_record(exam: &ExamDefinition, record: &StudentRecord) -> Self {
        let co_marks = compute_co_marks(exam, &record.question_marks);
        let total = compute_total(&co_marks);
        let percentage = compute_percentage(total, exam.total_marks);
        Self {
            student_id: record.student_id.clone(),
            question_marks: exam
                .questions
                .iter()
                .map(|q| (q.number.clone(), record.mark(&q.number)))
                .collect(),
            course_outcomes: co_breakdown(exam, &co_marks),
            total,
            percentage,
            band: Band::from_percentage(percentage),
        }
    }
}

/// Class-wide mean for one Course Outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoAverage {
    pub code: String,
    pub mean_awarded: f64,
    pub possible: Marks,
    /// Mean awarded as a percentage of `possible`, 0 when `possible` is 0.
    pub percentage: u32,
}

/// Mean marks per Course Outcome across all records.
///
/// Returns an empty list when there are no records.
pub fn co_averages(exam: &ExamDefinition, records: &[StudentRecord]) -> Vec<CoAverage> {
    if records.is_empty() {
        return Vec::new();
    }
    let possible = co_possible_marks(exam);
    let mut sums: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        let co_marks = compute_co_marks(exam, &record.question_marks);
        for (code, marks) in &co_marks {
            if let Some(co) = exam.course_outcome(code) {
                *sums.entry(co.code.as_str()).or_default() += u64::from(*marks);
            }
        }
    }

    let n = records.len() as f64;
    exam.course_outcomes
        .iter()
        .map(|co| {
            let mean_awarded = sums.get(co.code.as_str()).copied().unwrap_or(0) as f64 / n;
            let possible = possible.get(&co.code).copied().unwrap_or(0);
            let percentage = if possible == 0 {
                0
            } else {
                (100.0 * mean_awarded / f64::from(possible)).round() as u32
            };
            CoAverage {
                code: co.code.clone(),
                mean_awarded,
                possible,
                percentage,
            }
        })
        .collect()
}

/// Records whose student id contains `query`, ignoring case.
pub fn filter_records<'r>(records: &'r [StudentRecord], query: &str) -> Vec<&'r StudentRecord> {
    let needle = query.trim().to_lowercase();
    records
        .iter()
        .filter(|r| needle.is_empty() || r.student_id.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(Band::from_percentage(0), Band::Low);
        assert_eq!(Band::from_percentage(39), Band::Low);
        assert_eq!(Band::from_percentage(40), Band::Fair);
        assert_eq!(Band::from_percentage(60), Band::Good);
        assert_eq!(Band::from_percentage(80), Band::Excellent);
        assert_eq!(Band::from_percentage(125), Band::Excellent);
        assert_eq!(Band::Good.to_string(), "good");
    }

    #[test]
    fn pass_threshold() {
        assert!(passed(40, 40));
        assert!(!passed(39, 40));
    }

    #[test]
    fn summary_ignores_stale_stored_aggregates() {
        let exam = two_co_exam();
        let mut record = StudentRecord::new(&exam, "S1", marks(&[("1", 8), ("2", 9)]));
        record.total = 3;
        record.co_marks.clear();

        let summary = StudentSummary::from_record(&exam, &record);
        assert_eq!(summary.total, 17);
        assert_eq!(summary.percentage, 85);
        assert_eq!(summary.band, Band::Excellent);
        assert_eq!(
            summary.question_marks,
            vec![("1".to_string(), 8), ("2".to_string(), 9)]
        );
    }

    #[test]
    fn breakdown_for_outcome_without_questions_is_zero() {
        let mut exam = two_co_exam();
        exam.course_outcomes.push(co("CO3"));
        let breakdown = co_breakdown(&exam, &marks(&[("CO1", 5)]));
        assert_eq!(breakdown.len(), 3);
        assert_eq!(breakdown[0].percentage, 50);
        assert_eq!(
            breakdown[2],
            CoBreakdown {
                code: "CO3".into(),
                awarded: 0,
                possible: 0,
                percentage: 0
            }
        );
    }

    #[test]
    fn class_averages() {
        let exam = two_co_exam();
        let records = vec![
            StudentRecord::new(&exam, "S1", marks(&[("1", 8), ("2", 9)])),
            StudentRecord::new(&exam, "S2", marks(&[("1", 4), ("2", 0)])),
        ];
        let averages = co_averages(&exam, &records);
        assert_eq!(averages[0].code, "CO1");
        assert!((averages[0].mean_awarded - 6.0).abs() < f64::EPSILON);
        assert_eq!(averages[0].percentage, 60);
        assert_eq!(averages[1].percentage, 45);
        assert!(co_averages(&exam, &[]).is_empty());
    }

    #[test]
    fn search_is_case_insensitive() {
        let exam = two_co_exam();
        let records = vec![
            StudentRecord::new(&exam, "CS-101", marks(&[])),
            StudentRecord::new(&exam, "cs-102", marks(&[])),
            StudentRecord::new(&exam, "EE-201", marks(&[])),
        ];
        assert_eq!(filter_records(&records, "cs").len(), 2);
        assert_eq!(filter_records(&records, "EE").len(), 1);
        assert_eq!(filter_records(&records, "").len(), 3);
        assert!(filter_records(&records, "zz").is_empty());
    }
}
