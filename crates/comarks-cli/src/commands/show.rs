//! The `comarks show` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use comarks_core::aggregate::co_possible_marks;

use super::Context;

pub fn execute(ctx: &Context, exam_id: &str) -> Result<()> {
    let (_, repo) = ctx.repository()?;
    let exam = repo.load(exam_id)?;
    let possible = co_possible_marks(&exam);

    println!("{} ({})", exam.name, exam.id);
    println!("Total marks: {}", exam.total_marks);

    let mut outcomes = Table::new();
    outcomes.set_header(vec!["CO", "Description", "Questions", "Possible"]);
    for co in &exam.course_outcomes {
        let questions: Vec<&str> = exam
            .questions
            .iter()
            .filter(|q| q.co_code == co.code)
            .map(|q| q.number.as_str())
            .collect();
        outcomes.add_row(vec![
            Cell::new(&co.code),
            Cell::new(&co.description),
            Cell::new(questions.join(", ")),
            Cell::new(possible.get(&co.code).copied().unwrap_or(0)),
        ]);
    }
    println!("\n{outcomes}");

    let mut questions = Table::new();
    questions.set_header(vec!["Q", "CO", "Max", "Statement"]);
    for q in &exam.questions {
        questions.add_row(vec![
            Cell::new(format!("Q{}", q.number)),
            Cell::new(&q.co_code),
            Cell::new(q.max_marks),
            Cell::new(&q.statement),
        ]);
    }
    println!("\n{questions}");

    if exam.max_marks_sum() != exam.total_marks {
        println!(
            "\nNote: questions add up to {} marks; percentages use total marks {}.",
            exam.max_marks_sum(),
            exam.total_marks
        );
    }
    Ok(())
}
