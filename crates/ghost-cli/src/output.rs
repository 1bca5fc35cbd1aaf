//! Output formatting utilities for CLI commands.

use serde::Serialize;

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;

/// Trait for types that can be formatted for output
pub trait FormattedOutput: Serialize {
    fn format_text(&self) -> String;

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Render `value` in the requested format.
pub fn render<T: FormattedOutput>(format: OutputFormat, value: &T) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Text => value.format_text(),
        OutputFormat::Json => value.format_json()?,
    })
}

/// Print formatted output to stdout
pub fn print_output<T: FormattedOutput>(ctx: &CommandContext, value: &T) -> Result<(), CliError> {
    println!("{}", render(ctx.format, value)?);
    Ok(())
}

/// Helper for status outputs
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub status: String,
    pub message: String,
}

impl StatusOutput {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

impl FormattedOutput for StatusOutput {
    fn format_text(&self) -> String {
        match self.status.as_str() {
            "success" => format!("✓ {}", self.message),
            _ => format!("{}: {}", self.status, self.message),
        }
    }
}

/// First 16 hex digits of a digest.
pub fn short_digest(digest: &str) -> &str {
    digest.get(..16).unwrap_or(digest)
}
