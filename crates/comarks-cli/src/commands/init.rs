//! The `comarks init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create comarks.toml
    if std::path::Path::new("comarks.toml").exists() {
        println!("comarks.toml already exists, skipping.");
    } else {
        std::fs::write("comarks.toml", SAMPLE_CONFIG)?;
        println!("Created comarks.toml");
    }

    // Create example exam
    std::fs::create_dir_all("exams")?;
    let example_path = std::path::Path::new("exams/example.toml");
    if example_path.exists() {
        println!("exams/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_EXAM)?;
        println!("Created exams/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit exams/example.toml with your course outcomes and questions");
    println!("  2. Run: comarks setup --exam exams/example.toml");
    println!("  3. Run: comarks enter --exam-id example --student S001 --mark 1=8 --mark 2=9");
    println!("  4. Run: comarks results --exam-id example");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# comarks configuration

# Where exams and student records are stored. ${VAR} references are expanded.
data_dir = "./comarks-data"

# Minimum overall percentage counted as a pass.
pass_percentage = 40
"#;

const EXAMPLE_EXAM: &str = r#"[exam]
id = "example"
name = "Example Exam"
total_marks = 20

[[course_outcomes]]
code = "CO1"
description = "Recall the core definitions"

[[course_outcomes]]
code = "CO2"
description = "Apply the techniques to new problems"

[[questions]]
number = "1"
statement = "Define the key terms introduced in unit 1."
co = "CO1"
max_marks = 10

[[questions]]
number = "2"
statement = "Solve the worked problem from unit 2."
co = "CO2"
max_marks = 10
"#;
