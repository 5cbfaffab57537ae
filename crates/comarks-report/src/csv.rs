//! CSV results export.
//!
//! One header row, then one row per student in stored order:
//!
//! ```text
//! UID,Q1 (CO1),Q2 (CO2),CO1,CO2,Total,Percentage
//! S1,8,9,8,9,17,85%
//! ```

use std::path::Path;

use anyhow::{Context, Result};

use comarks_core::aggregate::compute_percentage;
use comarks_core::model::{ExamDefinition, StudentRecord};
use comarks_core::summary::StudentSummary;

/// Quote a field if it contains a comma, quote, or line break.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let row: Vec<String> = fields.into_iter().map(|f| csv_field(&f)).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

/// Render all records of an exam as CSV.
///
/// CO marks, total, and percentage are recomputed from the raw question
/// marks rather than read from the stored aggregates.
pub fn generate_csv(exam: &ExamDefinition, records: &[StudentRecord]) -> String {
    let mut csv = String::new();

    let header = std::iter::once("UID".to_string())
        .chain(
            exam.questions
                .iter()
                .map(|q| format!("Q{} ({})", q.number, q.co_code)),
        )
        .chain(exam.course_outcomes.iter().map(|co| co.code.clone()))
        .chain(["Total".to_string(), "Percentage".to_string()]);
    push_row(&mut csv, header);

    for record in records {
        let summary = StudentSummary::from_record(exam, record);
        let row = std::iter::once(summary.student_id.clone())
            .chain(summary.question_marks.iter().map(|(_, m)| m.to_string()))
            .chain(summary.course_outcomes.iter().map(|co| co.awarded.to_string()))
            .chain([
                summary.total.to_string(),
                format!("{}%", compute_percentage(summary.total, exam.total_marks)),
            ]);
        push_row(&mut csv, row);
    }

    csv
}

/// Default export file name, `<exam name>_results.csv`.
///
/// Characters that are awkward in file names are replaced by `_`.
pub fn default_file_name(exam: &ExamDefinition) -> String {
    let stem: String = exam
        .name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { exam.id.clone() } else { stem };
    format!("{stem}_results.csv")
}

/// Write a CSV export to a file.
pub fn write_csv_report(exam: &ExamDefinition, records: &[StudentRecord], path: &Path) -> Result<()> {
    let csv = generate_csv(exam, records);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, csv)
        .with_context(|| format!("failed to write CSV export to {}", path.display()))?;
    Ok(())
}
