//! Output formatting for CLI commands

use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }

    /// Prints a line of human-readable text (ignored in JSON mode)
    pub fn line(&self, message: &str) {
        if self.is_text() {
            println!("{}", message);
        }
    }

    /// Prints a heading followed by its underline (text only)
    pub fn heading(&self, title: &str) {
        if self.is_text() {
            println!("{}", title);
            println!("{}", "-".repeat(title.len()));
        }
    }

    /// Prints structured data as the whole command output (JSON mode)
    pub fn data<T: Serialize>(&self, data: &T) {
        if self.format == OutputFormat::Json {
            if let Ok(json) = serde_json::to_string_pretty(data) {
                println!("{}", json);
            }
        }
    }
}
