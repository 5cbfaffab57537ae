//! The `comarks export` command.

use std::path::PathBuf;

use anyhow::Result;

use comarks_report::csv::default_file_name;
use comarks_report::{write_csv_report, write_html_report};

use super::Context;

pub fn execute(ctx: &Context, exam_id: &str, format: &str, output: Option<PathBuf>) -> Result<()> {
    let (_, repo) = ctx.repository()?;
    let exam = repo.load(exam_id)?;
    let records = repo.list_records(exam_id)?;

    if records.is_empty() {
        anyhow::bail!("no records to export for exam {exam_id}");
    }

    let default_path = PathBuf::from(default_file_name(&exam));
    let path = match format {
        "csv" => {
            let path = output.unwrap_or(default_path);
            write_csv_report(&exam, &records, &path)?;
            path
        }
        "html" => {
            let path = output.unwrap_or_else(|| default_path.with_extension("html"));
            write_html_report(&exam, &records, &path)?;
            path
        }
        other => anyhow::bail!("unknown format: {other} (expected csv or html)"),
    };

    println!(
        "Exported {} record(s) to {}",
        records.len(),
        path.display()
    );
    Ok(())
}
