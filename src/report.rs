use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use chrono::Local;
/// Ordered queue of lab notes collected while the session runs; printed at
/// the end and saved next to the plot image.
#[derive(Debug, Default)]
pub struct LabReport {
    entries: Vec<String>,
}
pub const REPORT_HEADING: &str = "Lab Report (recap of plot selections):";
impl LabReport {
    pub fn new() -> Self {
        Self::default()
    }
    /// Report seeded with the program banner and today's date.
    pub fn with_intro(program: &str, version: &str) -> Self {
        let mut report = Self::new();
        report.push(format!("Program: {program}: v{version}"));
        report.push("Plot CSV text file data generated by ADALM-2000 Active Learning Module");
        report.push(format!(
            "Today's date: {}",
            Local::now().format("%A, %B %d %Y")
        ));
        report
    }
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
    /// Full report text: heading plus one tab-indented line per entry.
    /// Entries may carry embedded newlines for nested detail lines.
    pub fn render(&self) -> String {
        let mut text = String::from(REPORT_HEADING);
        for entry in &self.entries {
            text.push_str("\n\t");
            text.push_str(entry);
        }
        text.push('\n');
        text
    }
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())
    }
}
