//! The `comarks enter` command.

use anyhow::{Context as _, Result};
use comfy_table::{Cell, Table};

use comarks_core::entry::{MarksEntry, MarksSummary};
use comarks_core::summary::passed;
use comarks_core::{ExamDefinition, UpsertOutcome};

use super::Context;

/// Resolve a question as typed. The literal number wins; otherwise a
/// leading `Q`/`q` is dropped if that names a question of the exam.
fn resolve_question<'q>(exam: &ExamDefinition, question: &'q str) -> &'q str {
    if exam.question(question).is_some() {
        return question;
    }
    match question.strip_prefix(['Q', 'q']) {
        Some(rest) if exam.question(rest).is_some() => rest,
        _ => question,
    }
}

/// Parse `NUMBER=MARKS` arguments against an exam's question numbers.
fn parse_marks(exam: &ExamDefinition, args: &[String]) -> Result<Vec<(String, i64)>> {
    args.iter()
        .map(|arg| {
            let (question, mark) = arg
                .split_once('=')
                .with_context(|| format!("invalid mark '{arg}', expected NUMBER=MARKS"))?;
            let question = resolve_question(exam, question.trim());
            let mark: i64 = mark
                .trim()
                .parse()
                .with_context(|| format!("invalid mark value in '{arg}'"))?;
            Ok((question.to_string(), mark))
        })
        .collect()
}

pub fn execute(ctx: &Context, exam_id: &str, student: &str, marks: &[String]) -> Result<()> {
    let (config, mut repo) = ctx.repository()?;
    let exam = repo.load(exam_id)?;
    let parsed = parse_marks(&exam, marks)?;

    let existing = repo.find_record(exam_id, student.trim())?;
    let mut entry = match &existing {
        Some(record) => MarksEntry::edit(&exam, record),
        None => {
            let mut entry = MarksEntry::new(&exam);
            entry.set_student_id(student);
            entry
        }
    };

    for (question, raw) in &parsed {
        let clamped = entry.set_mark(question, *raw)?;
        if i64::from(clamped) != *raw {
            eprintln!("Note: Q{question} mark {raw} clamped to {clamped}");
        }
    }

    let summary = entry.calculate();
    let record = entry.into_record()?;
    let student_id = record.student_id.clone();
    let outcome = repo.upsert_record(exam_id, record)?;

    print_summary(&summary, exam.total_marks, config.pass_percentage);
    println!(
        "{} marks for student {student_id}",
        match outcome {
            UpsertOutcome::Inserted => "Saved",
            UpsertOutcome::Updated => "Updated",
        }
    );
    Ok(())
}

fn print_summary(summary: &MarksSummary, total_marks: u32, pass_percentage: u32) {
    let mut questions = Table::new();
    questions.set_header(vec!["Q", "CO", "Marks", "Max", "%"]);
    for q in &summary.questions {
        questions.add_row(vec![
            Cell::new(format!("Q{}", q.number)),
            Cell::new(&q.co_code),
            Cell::new(q.awarded),
            Cell::new(q.max),
            Cell::new(format!("{}%", q.percentage)),
        ]);
    }
    println!("{questions}");

    let mut table = Table::new();
    table.set_header(vec!["CO", "Marks", "Possible", "%"]);
    for co in &summary.breakdown {
        table.add_row(vec![
            Cell::new(&co.code),
            Cell::new(co.awarded),
            Cell::new(co.possible),
            Cell::new(format!("{}%", co.percentage)),
        ]);
    }
    println!("{table}");
    println!(
        "Total: {} / {} ({}%) {}",
        summary.total,
        total_marks,
        summary.percentage,
        if passed(summary.percentage, pass_percentage) {
            "PASS"
        } else {
            "FAIL"
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use comarks_core::{CourseOutcome, Question};

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn exam_with_questions(numbers: &[&str]) -> ExamDefinition {
        ExamDefinition {
            id: "quiz".into(),
            name: "Quiz".into(),
            total_marks: 10,
            course_outcomes: vec![CourseOutcome {
                code: "CO1".into(),
                description: String::new(),
            }],
            questions: numbers
                .iter()
                .map(|n| Question {
                    number: n.to_string(),
                    statement: String::new(),
                    co_code: "CO1".into(),
                    max_marks: 5,
                })
                .collect(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn parses_question_marks() {
        let exam = exam_with_questions(&["1", "2", "3"]);
        let parsed = parse_marks(&exam, &args(&["1=8", "Q2=9", "q3 = -2", "Q=4"])).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("1".to_string(), 8),
                ("2".to_string(), 9),
                ("3".to_string(), -2),
                ("Q".to_string(), 4),
            ]
        );
    }

    #[test]
    fn literal_question_number_wins_over_prefix() {
        let exam = exam_with_questions(&["Q1", "q2", "3"]);
        let parsed = parse_marks(&exam, &args(&["Q1=5", "q2=1", "Q3=2"])).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("Q1".to_string(), 5),
                ("q2".to_string(), 1),
                ("3".to_string(), 2),
            ]
        );
    }

    #[test]
    fn rejects_malformed_marks() {
        let exam = exam_with_questions(&["1"]);
        assert!(parse_marks(&exam, &args(&["18"])).is_err());
        assert!(parse_marks(&exam, &args(&["1=eight"])).is_err());
    }
}
