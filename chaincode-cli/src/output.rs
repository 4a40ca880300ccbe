//! Output formatting utilities

use base64::{engine::general_purpose, Engine as _};
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

/// How raw state bytes are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayloadFormat {
    /// UTF-8 text (lossy)
    Text,
    Hex,
    Base64,
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Render a state payload for display
pub fn render_payload(bytes: &[u8], format: PayloadFormat) -> String {
    match format {
        PayloadFormat::Text => String::from_utf8_lossy(bytes).into_owned(),
        PayloadFormat::Hex => hex::encode(bytes),
        PayloadFormat::Base64 => general_purpose::STANDARD.encode(bytes),
    }
}

/// Format a balance with thousands separators
pub fn format_balance(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_payload() {
        assert_eq!(render_payload(b"hi", PayloadFormat::Text), "hi");
        assert_eq!(render_payload(b"hi", PayloadFormat::Hex), "6869");
        assert_eq!(render_payload(b"hi", PayloadFormat::Base64), "aGk=");
    }

    #[test]
    fn test_format_balance() {
        assert_eq!(format_balance(10_000_000.0), "10,000,000.00");
        assert_eq!(format_balance(999.5), "999.50");
        assert_eq!(format_balance(-1234.25), "-1,234.25");
    }
}
