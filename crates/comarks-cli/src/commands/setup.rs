//! The `comarks setup` command.

use std::path::PathBuf;

use anyhow::Result;

use comarks_core::parser;

use super::Context;

pub fn execute(ctx: &Context, exam_path: PathBuf) -> Result<()> {
    let exam = parser::parse_exam(&exam_path)?;
    let (_, mut repo) = ctx.repository()?;

    let replacing = repo.load(&exam.id).is_ok();
    repo.save(&exam)?;

    println!(
        "{} exam {} ({})",
        if replacing { "Updated" } else { "Saved" },
        exam.name,
        exam.id
    );
    println!(
        "  {} course outcomes, {} questions, total marks {}",
        exam.course_outcomes.len(),
        exam.questions.len(),
        exam.total_marks
    );
    Ok(())
}
