//! Output formatting for run results.
//!
//! Results go to stdout (or a file) as plain text lines, a single JSON
//! document, or JSON Lines. Diagnostics never go through this writer.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::{OutputRecord, SaveStatus};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines: `Success! <path>`, `Failed! <path>`, `Error: <msg>`
    Text,
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Some(Self::Text),
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }

    pub fn is_structured(&self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// Render a record as a single text line (no trailing newline).
pub fn text_line(record: &OutputRecord) -> String {
    match record {
        OutputRecord::Saved(save) => match save.status {
            SaveStatus::Saved { .. } => format!("Success! {}", save.out_path.display()),
            SaveStatus::Failed { .. } => format!("Failed! {}", save.out_path.display()),
        },
        OutputRecord::Error(error) => format!("Error: {}", error.message),
        OutputRecord::Summary(summary) => format!(
            "Done: {}/{} saved, {} load error(s), {} save error(s) in {:.2}s",
            summary.saved,
            summary.save_attempts,
            summary.load_failed,
            summary.save_failed,
            summary.total_seconds
        ),
    }
}

/// A writer that emits run records in the configured format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write a run record.
    ///
    /// Text format renders it with [`text_line`]; the JSON formats serialize it.
    pub fn write_record(&mut self, record: &OutputRecord) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.writer, "{}", text_line(record))?;
                self.items_written += 1;
                Ok(())
            }
            _ => self.write(record),
        }
    }

    /// Write a single serializable item.
    ///
    /// Text format has no rendering for arbitrary items and falls back to one
    /// compact JSON object per line.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json if self.pretty => {
                serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
            }
            _ => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
            }
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write multiple items.
    ///
    /// For JSON format, writes as a JSON array; otherwise one item per line.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, items)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, items).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += items.len();
            }
            _ => {
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Serialize records to JSONL format.
pub fn to_jsonl<T: Serialize>(items: &[T]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for item in items {
        output.push_str(&serde_json::to_string(item)?);
        output.push('\n');
    }
    Ok(output)
}
