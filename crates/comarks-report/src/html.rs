//! HTML results page.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use comarks_core::aggregate::co_possible_marks;
use comarks_core::model::{ExamDefinition, StudentRecord};
use comarks_core::summary::{co_averages, Band, CoAverage, StudentSummary};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn band_class(band: Band) -> &'static str {
    match band {
        Band::Low => "band-low",
        Band::Fair => "band-fair",
        Band::Good => "band-good",
        Band::Excellent => "band-excellent",
    }
}

/// Generate the results page for an exam.
pub fn generate_html(exam: &ExamDefinition, records: &[StudentRecord]) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>{} results</title>\n",
        html_escape(&exam.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{} results</h1>\n", html_escape(&exam.name)));
    html.push_str(&format!(
        "<p class=\"meta\">Total students: {} | Total marks: {} | Created {}</p>\n",
        records.len(),
        exam.total_marks,
        exam.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    html.push_str("</header>\n");

    // Course Outcome overview
    html.push_str("<section class=\"outcomes\">\n");
    html.push_str("<h2>Course Outcomes</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Code</th><th>Description</th><th>Possible</th><th>Class average</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    let averages = co_averages(exam, records);
    let possible = co_possible_marks(exam);
    for co in &exam.course_outcomes {
        let average = averages.iter().find(|a| a.code == co.code);
        let average_text = match average {
            Some(a) => format!("{:.1} ({}%)", a.mean_awarded, a.percentage),
            None => "-".to_string(),
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&co.code),
            html_escape(&co.description),
            possible.get(&co.code).copied().unwrap_or(0),
            average_text,
        ));
    }
    html.push_str("</tbody></table>\n");

    if !averages.is_empty() {
        html.push_str(&generate_bar_chart(&averages));
    }
    html.push_str("</section>\n");

    // Per-student results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Students</h2>\n");
    if records.is_empty() {
        html.push_str("<p class=\"meta\">No student records yet.</p>\n");
    } else {
        html.push_str("<table class=\"results-table\" id=\"results\">\n<thead><tr>");
        let mut col = 0;
        let mut header_cell = |html: &mut String, label: String| {
            html.push_str(&format!(
                "<th onclick=\"sortTable({col})\">{label}</th>"
            ));
            col += 1;
        };
        header_cell(&mut html, "UID".into());
        for q in &exam.questions {
            header_cell(
                &mut html,
                format!(
                    "Q{}<br><small>({})</small>",
                    html_escape(&q.number),
                    html_escape(&q.co_code)
                ),
            );
        }
        for co in &exam.course_outcomes {
            header_cell(&mut html, html_escape(&co.code));
        }
        header_cell(&mut html, "Total".into());
        header_cell(&mut html, "%".into());
        html.push_str("</tr></thead>\n<tbody>\n");

        for record in records {
            let summary = StudentSummary::from_record(exam, record);
            html.push_str("<tr>");
            html.push_str(&format!("<td>{}</td>", html_escape(&summary.student_id)));
            for (_, mark) in &summary.question_marks {
                html.push_str(&format!("<td class=\"num\">{mark}</td>"));
            }
            for co in &summary.course_outcomes {
                html.push_str(&format!("<td class=\"num\">{}</td>", co.awarded));
            }
            html.push_str(&format!("<td class=\"num total\">{}</td>", summary.total));
            html.push_str(&format!(
                "<td class=\"num {}\">{}%</td>",
                band_class(summary.band),
                summary.percentage
            ));
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the HTML results page to a file.
pub fn write_html_report(exam: &ExamDefinition, records: &[StudentRecord], path: &Path) -> Result<()> {
    let html = generate_html(exam, records);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart(averages: &[CoAverage]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 120;

    let total_height = averages.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, average) in averages.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let pct = average.percentage.min(100) as usize;
        let width = pct * max_width / 100;

        let color = match Band::from_percentage(average.percentage) {
            Band::Excellent => "#22c55e",
            Band::Good => "#3b82f6",
            Band::Fair => "#eab308",
            Band::Low => "#ef4444",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&average.code)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            average.percentage
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --low: #fde2e2; --fair: #fef9c3; --good: #dbeafe; --excellent: #dcfce7; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --low: #7f1d1d; --fair: #713f12; --good: #1e3a8a; --excellent: #064e3b; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
td.num { text-align: center; }
td.total { font-weight: bold; }
.band-low { background: var(--low); }
.band-fair { background: var(--fair); }
.band-good { background: var(--good); }
.band-excellent { background: var(--excellent); }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = !isNaN(na) && !isNaN(nb) ? na - nb : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn html_report_contains_required_elements() {
        let exam = two_co_exam();
        let records = vec![
            record(&exam, "S1", &[("1", 8), ("2", 9)]),
            record(&exam, "S2", &[("1", 2)]),
        ];
        let html = generate_html(&exam, &records);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Midterm results"));
        assert!(html.contains("<td>S1</td>"));
        assert!(html.contains("85%"));
        assert!(html.contains("band-excellent"));
        assert!(html.contains("band-low"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn html_escapes_user_text() {
        let mut exam = two_co_exam();
        exam.name = "<script>alert(1)</script>".into();
        let records = vec![record(&exam, "a&b", &[])];
        let html = generate_html(&exam, &records);

        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a&amp;b"));
    }

    #[test]
    fn empty_results_page() {
        let html = generate_html(&two_co_exam(), &[]);
        assert!(html.contains("No student records yet."));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn html_report_write_to_file() {
        let exam = two_co_exam();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");

        write_html_report(&exam, &[record(&exam, "S1", &[("1", 5)])], &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
