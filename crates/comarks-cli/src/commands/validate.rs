//! The `comarks validate` command.

use std::path::PathBuf;

use anyhow::Result;

use comarks_core::parser;
use comarks_core::validate::validate_exam;

pub fn execute(exam_path: PathBuf) -> Result<()> {
    let exams = if exam_path.is_dir() {
        parser::load_exam_directory(&exam_path)?
    } else {
        vec![parser::parse_exam(&exam_path)?]
    };

    let mut total_issues = 0;

    for exam in &exams {
        println!(
            "Exam: {} ({} course outcomes, {} questions)",
            exam.name,
            exam.course_outcomes.len(),
            exam.questions.len()
        );

        let issues = validate_exam(exam);
        for issue in &issues {
            println!("  ERROR: {issue}");
        }
        if exam.max_marks_sum() != exam.total_marks && issues.is_empty() {
            println!(
                "  NOTE: questions add up to {} marks, total marks is {}",
                exam.max_marks_sum(),
                exam.total_marks
            );
        }
        total_issues += issues.len();
    }

    if total_issues == 0 {
        println!("All exams valid.");
        Ok(())
    } else {
        anyhow::bail!("{total_issues} issue(s) found")
    }
}
