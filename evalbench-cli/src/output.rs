//! Output formatting for CLI

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// Compact format (single line per item)
    Compact,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

/// Output writer that handles different formats
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format }
    }

    /// The active format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write a list of items
    pub fn write_list<T: Serialize + TableDisplay>(
        &self,
        items: &[T],
        headers: &[&str],
    ) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                if items.is_empty() {
                    println!("{}", "No items found.".dimmed());
                    return Ok(());
                }

                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.apply_modifier(UTF8_ROUND_CORNERS);
                let header_cells: Vec<Cell> =
                    headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect();
                table.set_header(header_cells);
                for item in items {
                    table.add_row(item.to_row());
                }

                println!("{table}");
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(items)?;
                println!("{}", json);
            }
            OutputFormat::Compact => {
                for item in items {
                    item.display_compact();
                }
            }
        }
        Ok(())
    }

    /// Write a success message
    pub fn success(&self, message: &str) {
        if self.format == OutputFormat::Table {
            println!("{} {}", "✓".green(), message);
        } else {
            println!("{}", message);
        }
    }

    /// Write an error message
    pub fn error(&self, message: &str) {
        if self.format == OutputFormat::Table {
            eprintln!("{} {}", "✗".red(), message);
        } else {
            eprintln!("Error: {}", message);
        }
    }

    /// Write a warning message
    pub fn warning(&self, message: &str) {
        if self.format == OutputFormat::Table {
            println!("{} {}", "⚠".yellow(), message);
        } else {
            println!("Warning: {}", message);
        }
    }

    /// Write an info message
    pub fn info(&self, message: &str) {
        if self.format == OutputFormat::Table {
            println!("{} {}", "ℹ".blue(), message);
        } else {
            println!("{}", message);
        }
    }

    /// Start a spinner for long operations
    pub fn spinner(&self, message: &str) -> Option<indicatif::ProgressBar> {
        if self.format == OutputFormat::Table {
            let pb = indicatif::ProgressBar::new_spinner();
            pb.set_style(
                indicatif::ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            pb.set_message(message.to_string());
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            Some(pb)
        } else {
            println!("{}", message);
            None
        }
    }
}

/// Trait for displaying items in a table
pub trait TableDisplay {
    /// Convert item to a table row
    fn to_row(&self) -> Vec<Cell>;

    /// Display in compact format
    fn display_compact(&self);
}

/// Print a key-value pair in detail format
pub fn print_field(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// A page footer like "page 2/3 (25 instances)"
pub fn page_footer(current_page: usize, total_pages: usize, total_items: usize) -> String {
    format!(
        "page {}/{} ({} instance(s))",
        current_page + 1,
        total_pages,
        total_items
    )
}

/// Truncate long cell text for table display
pub fn truncate_cell(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}

/// Verdict badge with color
pub fn verdict_badge(selected_option: &str, positional_bias: bool) -> String {
    let base = match selected_option.to_lowercase().as_str() {
        "yes" | "pass" => selected_option.green().to_string(),
        "no" | "fail" => selected_option.red().to_string(),
        "" => "-".dimmed().to_string(),
        _ => selected_option.to_string(),
    };
    if positional_bias {
        format!("{} {}", base, "(bias)".yellow())
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_cell() {
        assert_eq!(truncate_cell("short", 10), "short");
        assert_eq!(truncate_cell("a longer text", 8), "a longe…");
    }

    #[test]
    fn test_page_footer() {
        assert_eq!(page_footer(1, 3, 25), "page 2/3 (25 instance(s))");
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Compact.to_string(), "compact");
    }
}
