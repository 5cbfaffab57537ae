//! comarks-report — CSV and HTML exports of exam results.

pub mod csv;
pub mod html;

pub use csv::{generate_csv, write_csv_report};
pub use html::{generate_html, write_html_report};
