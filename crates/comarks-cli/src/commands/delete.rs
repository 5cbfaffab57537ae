//! The `comarks delete-record` and `comarks delete-exam` commands.

use anyhow::Result;

use super::Context;

pub fn record(ctx: &Context, exam_id: &str, student: &str) -> Result<()> {
    let (_, mut repo) = ctx.repository()?;
    let removed = repo.delete_record(exam_id, student.trim())?;
    println!(
        "Deleted record for student {} ({} marks)",
        removed.student_id, removed.total
    );
    Ok(())
}

pub fn exam(ctx: &Context, exam_id: &str) -> Result<()> {
    let (_, mut repo) = ctx.repository()?;
    // A corrupt records document must not block deleting the exam.
    let records = match repo.list_records(exam_id) {
        Ok(records) => Some(records.len()),
        Err(e) if e.is_not_found() => Some(0),
        Err(e) => {
            tracing::warn!(exam = %exam_id, error = %e, "student records unreadable, deleting anyway");
            None
        }
    };
    repo.delete_exam(exam_id)?;
    match records {
        Some(count) => println!("Deleted exam {exam_id} and {count} student record(s)"),
        None => println!("Deleted exam {exam_id} and its unreadable student records"),
    }
    Ok(())
}
