//! TOML exam definition parser.
//!
//! Loads exam definitions from TOML files and directories. Parsing does not
//! validate; see [`crate::validate`].

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;

use crate::model::{CourseOutcome, ExamDefinition, Marks, Question};

/// Intermediate TOML structure for exam files.
#[derive(Debug, Deserialize)]
struct TomlExamFile {
    exam: TomlExamHeader,
    #[serde(default)]
    course_outcomes: Vec<TomlCourseOutcome>,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    #[serde(default)]
    id: Option<String>,
    name: String,
    total_marks: Marks,
}

#[derive(Debug, Deserialize)]
struct TomlCourseOutcome {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    number: String,
    #[serde(default)]
    statement: String,
    co: String,
    max_marks: Marks,
}

/// Parse a single TOML file into an `ExamDefinition`.
pub fn parse_exam(path: &Path) -> Result<ExamDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;

    parse_exam_str(&content, path)
}

/// Parse a TOML string into an `ExamDefinition`.
///
/// An exam without an `id` gets a freshly generated one.
pub fn parse_exam_str(content: &str, source_path: &Path) -> Result<ExamDefinition> {
    let parsed: TomlExamFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let id = parsed
        .exam
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(ExamDefinition::generate_id);

    Ok(ExamDefinition {
        id,
        name: parsed.exam.name,
        total_marks: parsed.exam.total_marks,
        course_outcomes: parsed
            .course_outcomes
            .into_iter()
            .map(|co| CourseOutcome {
                code: co.code,
                description: co.description,
            })
            .collect(),
        questions: parsed
            .questions
            .into_iter()
            .map(|q| Question {
                number: q.number,
                statement: q.statement,
                co_code: q.co,
                max_marks: q.max_marks,
            })
            .collect(),
        created_at: Utc::now(),
    })
}

/// Recursively load all `.toml` exam files from a directory.
pub fn load_exam_directory(dir: &Path) -> Result<Vec<ExamDefinition>> {
    let mut exams = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            exams.extend(load_exam_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_exam(&path) {
                Ok(exam) => exams.push(exam),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(exams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[exam]
id = "midterm"
name = "Midterm"
total_marks = 20

[[course_outcomes]]
code = "CO1"
description = "Recall definitions"

[[course_outcomes]]
code = "CO2"
description = "Apply techniques"

[[questions]]
number = "1"
statement = "Define a course outcome."
co = "CO1"
max_marks = 10

[[questions]]
number = "2"
statement = "Compute the totals."
co = "CO2"
max_marks = 10
"#;

    #[test]
    fn parse_valid_toml() {
        let exam = parse_exam_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(exam.id, "midterm");
        assert_eq!(exam.name, "Midterm");
        assert_eq!(exam.total_marks, 20);
        assert_eq!(exam.course_outcomes.len(), 2);
        assert_eq!(exam.course_outcomes[1].description, "Apply techniques");
        assert_eq!(exam.questions[1].co_code, "CO2");
        assert!(crate::validate::validate_exam(&exam).is_empty());
    }

    #[test]
    fn missing_id_is_generated() {
        let toml = r#"
[exam]
name = "Quiz"
total_marks = 5

[[course_outcomes]]
code = "CO1"

[[questions]]
number = "1"
co = "CO1"
max_marks = 5
"#;
        let exam = parse_exam_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert!(exam.id.starts_with("exam_"));
        assert!(exam.course_outcomes[0].description.is_empty());
        assert!(exam.questions[0].statement.is_empty());
    }

    #[test]
    fn negative_marks_are_rejected() {
        let toml = r#"
[exam]
name = "Quiz"
total_marks = -5
"#;
        assert!(parse_exam_str(toml, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_exam_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("midterm.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "[exam\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let exams = load_exam_directory(dir.path()).unwrap();
        assert_eq!(exams.len(), 1);
        assert_eq!(exams[0].id, "midterm");
    }
}
