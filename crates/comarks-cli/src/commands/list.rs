//! The `comarks list` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    let (_, repo) = ctx.repository()?;
    let exams = repo.list_exams()?;

    if exams.is_empty() {
        println!("No exams saved. Run `comarks setup --exam <file>` to add one.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Total Marks", "Students", "Created"]);
    for exam in &exams {
        let students = repo
            .list_records(&exam.id)
            .map(|r| r.len().to_string())
            .unwrap_or_else(|_| "-".to_string());
        table.add_row(vec![
            Cell::new(&exam.id),
            Cell::new(&exam.name),
            Cell::new(exam.total_marks),
            Cell::new(students),
            Cell::new(exam.created_at.format("%Y-%m-%d")),
        ]);
    }

    println!("{table}");
    Ok(())
}
