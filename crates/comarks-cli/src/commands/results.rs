//! The `comarks results` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use comarks_core::summary::{co_averages, filter_records, passed, StudentSummary};

use super::Context;

pub fn execute(ctx: &Context, exam_id: &str, search: Option<&str>, format: &str) -> Result<()> {
    let (config, repo) = ctx.repository()?;
    let exam = repo.load(exam_id)?;
    let records = repo.list_records(exam_id)?;
    let matching = filter_records(&records, search.unwrap_or(""));
    let summaries: Vec<StudentSummary> = matching
        .iter()
        .map(|record| StudentSummary::from_record(&exam, record))
        .collect();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
            return Ok(());
        }
        "text" => {}
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    if records.is_empty() {
        println!("No student records for {}.", exam.name);
        return Ok(());
    }
    if summaries.is_empty() {
        println!("No students match '{}'.", search.unwrap_or_default());
        return Ok(());
    }

    let mut header = vec!["UID".to_string()];
    header.extend(exam.questions.iter().map(|q| format!("Q{}", q.number)));
    header.extend(exam.course_outcomes.iter().map(|co| co.code.clone()));
    header.extend(["Total".to_string(), "%".to_string(), "Result".to_string()]);

    let mut table = Table::new();
    table.set_header(header);
    for summary in &summaries {
        let mut row = vec![Cell::new(&summary.student_id)];
        row.extend(summary.question_marks.iter().map(|(_, m)| Cell::new(m)));
        row.extend(summary.course_outcomes.iter().map(|co| Cell::new(co.awarded)));
        row.push(Cell::new(summary.total));
        row.push(Cell::new(format!("{}%", summary.percentage)));
        row.push(Cell::new(
            if passed(summary.percentage, config.pass_percentage) {
                "PASS"
            } else {
                "FAIL"
            },
        ));
        table.add_row(row);
    }
    println!("{table}");

    let pass_count = summaries
        .iter()
        .filter(|s| passed(s.percentage, config.pass_percentage))
        .count();
    println!(
        "\n{} student(s), {} passed (threshold {}%)",
        summaries.len(),
        pass_count,
        config.pass_percentage
    );

    let mut averages = Table::new();
    averages.set_header(vec!["CO", "Class Avg", "Possible", "%"]);
    for avg in co_averages(&exam, &records) {
        averages.add_row(vec![
            Cell::new(&avg.code),
            Cell::new(format!("{:.2}", avg.mean_awarded)),
            Cell::new(avg.possible),
            Cell::new(format!("{}%", avg.percentage)),
        ]);
    }
    println!("\n{averages}");
    Ok(())
}
