//! comarks CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "comarks",
    version,
    about = "Course-Outcome marks calculator for exams"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example exam
    Init,

    /// Validate exam TOML files
    Validate {
        /// Path to exam file or directory
        #[arg(long)]
        exam: PathBuf,
    },

    /// Save an exam definition from a TOML file
    Setup {
        /// Path to exam file
        #[arg(long)]
        exam: PathBuf,
    },

    /// List saved exams
    List,

    /// Show an exam's outcomes and questions
    Show {
        #[arg(long)]
        exam_id: String,
    },

    /// Enter or update a student's marks
    Enter {
        #[arg(long)]
        exam_id: String,

        /// Student UID
        #[arg(long)]
        student: String,

        /// Question mark as NUMBER=MARKS (repeatable, e.g. --mark 1=8 --mark 2=9)
        #[arg(long = "mark", value_name = "Q=N")]
        marks: Vec<String>,
    },

    /// Show per-student results
    Results {
        #[arg(long)]
        exam_id: String,

        /// Only students whose UID contains this text
        #[arg(long)]
        search: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete one student's record
    DeleteRecord {
        #[arg(long)]
        exam_id: String,

        #[arg(long)]
        student: String,
    },

    /// Delete an exam and all of its records
    DeleteExam {
        #[arg(long)]
        exam_id: String,
    },

    /// Export results to a file
    Export {
        #[arg(long)]
        exam_id: String,

        /// Output format: csv, html
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output path (default: "<exam name>_results.<format>")
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("comarks=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context {
        config_path: cli.config,
        data_dir: cli.data_dir,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { exam } => commands::validate::execute(exam),
        Commands::Setup { exam } => commands::setup::execute(&ctx, exam),
        Commands::List => commands::list::execute(&ctx),
        Commands::Show { exam_id } => commands::show::execute(&ctx, &exam_id),
        Commands::Enter {
            exam_id,
            student,
            marks,
        } => commands::enter::execute(&ctx, &exam_id, &student, &marks),
        Commands::Results {
            exam_id,
            search,
            format,
        } => commands::results::execute(&ctx, &exam_id, search.as_deref(), &format),
        Commands::DeleteRecord { exam_id, student } => {
            commands::delete::record(&ctx, &exam_id, &student)
        }
        Commands::DeleteExam { exam_id } => commands::delete::exam(&ctx, &exam_id),
        Commands::Export {
            exam_id,
            format,
            output,
        } => commands::export::execute(&ctx, &exam_id, &format, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
