//! Console reporting: streams run events to stdout (or a file) while a
//! progress bar runs on stderr.

use std::io::{self, Write};
use std::sync::Mutex;

use fanpipe_core::{
    ErrorRecord, ErrorSource, OutputFormat, OutputRecord, OutputWriter, PipelineError,
    ReportSink, RunSummary, SaveRecord,
};
use indicatif::{ProgressBar, ProgressStyle};

type BoxedWriter = Box<dyn Write + Send>;

/// A [`ReportSink`] that writes records through an [`OutputWriter`].
///
/// Text and JSONL stream as events arrive. JSON needs a single array, so
/// records are held until [`ConsoleSink::finish`].
pub struct ConsoleSink {
    writer: Mutex<OutputWriter<BoxedWriter>>,
    pending: Mutex<Vec<OutputRecord>>,
    write_error: Mutex<Option<io::Error>>,
    progress: ProgressBar,
    fan_out: u64,
}

impl ConsoleSink {
    pub fn new(
        writer: BoxedWriter,
        format: OutputFormat,
        pretty: bool,
        progress: ProgressBar,
    ) -> Self {
        Self {
            writer: Mutex::new(OutputWriter::new(writer, format, pretty)),
            pending: Mutex::new(Vec::new()),
            write_error: Mutex::new(None),
            progress,
            fan_out: 1,
        }
    }

    /// Advance the progress bar by this many steps per failed load.
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out as u64;
        self
    }

    fn emit(&self, record: OutputRecord) {
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if writer.format() == OutputFormat::Json {
            drop(writer);
            if let Ok(mut pending) = self.pending.lock() {
                pending.push(record);
            }
            return;
        }

        let result = self.progress.suspend(|| writer.write_record(&record));
        if let Err(e) = result {
            self.keep_error(e);
        }
    }

    fn keep_error(&self, error: io::Error) {
        tracing::warn!("Failed to write output: {}", error);
        if let Ok(mut slot) = self.write_error.lock() {
            if slot.is_none() {
                *slot = Some(error);
            }
        }
    }

    /// Write the summary (and, for JSON, the collected array) and flush.
    ///
    /// Returns the first write error seen during the run, if any.
    pub fn finish(&self, summary: &RunSummary) -> io::Result<()> {
        self.progress.finish_and_clear();

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("output writer poisoned"))?;
        let summary = OutputRecord::Summary(summary.clone());

        match writer.format() {
            OutputFormat::Json => {
                let mut records = self
                    .pending
                    .lock()
                    .map(|mut p| std::mem::take(&mut *p))
                    .unwrap_or_default();
                records.push(summary);
                writer.write_all(&records)?;
            }
            OutputFormat::JsonLines => writer.write_record(&summary)?,
            // The text summary goes to stderr via print_summary.
            OutputFormat::Text => {}
        }
        writer.flush()?;

        match self.write_error.lock() {
            Ok(mut slot) => slot.take().map_or(Ok(()), Err),
            Err(_) => Ok(()),
        }
    }
}

impl ReportSink for ConsoleSink {
    fn record(&self, record: &SaveRecord) {
        self.progress.inc(1);
        self.emit(OutputRecord::Saved(record.clone()));
    }

    fn error(&self, source: ErrorSource, error: &PipelineError) {
        tracing::debug!("{} error: {}", source, error);
        if source == ErrorSource::Load {
            // This source will never reach the saver.
            self.progress.inc(self.fan_out);
        }
        self.emit(OutputRecord::Error(ErrorRecord::new(source, error)));
    }
}

/// Create a progress bar over the expected number of save attempts.
pub fn create_progress_bar(total: u64, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("saving...");
    pb
}

/// Print a formatted summary table to stderr.
pub fn print_summary(summary: &RunSummary) {
    let rate = if summary.total_seconds > 0.0 {
        summary.saved as f64 / summary.total_seconds
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Sources:      {:>8}", summary.requested);
    eprintln!("    Loaded:       {:>8}", summary.loaded);
    if summary.load_failed > 0 {
        eprintln!("    Load errors:  {:>8}", summary.load_failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Saved:        {:>8}", summary.saved);
    if summary.save_failed > 0 {
        eprintln!("    Save errors:  {:>8}", summary.save_failed);
    }
    eprintln!("    Attempts:     {:>8}", summary.save_attempts);
    eprintln!("    Duration:     {:>7.1}s", summary.total_seconds);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}
