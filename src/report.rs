//! Summary and detail logs of one run.
//!
//! The summary log gets a header, one line per entry and a final tally; the
//! detail log collects raw ping transcripts. On [`Report::finish`] the detail
//! log is appended to the summary log and removed, leaving one file.

use std::fs::{self, File};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::{macros::format_description, OffsetDateTime, UtcOffset};

use crate::classify::Verdict;
use crate::config::Settings;
use crate::console::Console;
use crate::types::{ProbeReport, RunSummary, Tone};

const RULE: &str = "================================================================";
const DETAIL_TITLE: &str = "DETAILED PING OUTPUT";

/// `UTC+HH:MM` / `UTC-HH:MM`.
pub fn utc_offset_label(offset: UtcOffset) -> String {
    let (h, m, _) = offset.as_hms();
    let sign = if offset.is_negative() { '-' } else { '+' };
    format!("UTC{sign}{:02}:{:02}", h.unsigned_abs(), m.unsigned_abs())
}

/// First line of the summary log.
pub fn header_line(started: OffsetDateTime) -> String {
    let stamp = started
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| started.unix_timestamp().to_string());
    format!(
        "Ping results {stamp} ({})",
        utc_offset_label(started.offset())
    )
}

/// Owns both logs and the run tally.
pub struct Report<'c, C: Console> {
    summary: LineWriter<File>,
    detail: LineWriter<File>,
    summary_path: PathBuf,
    detail_path: PathBuf,
    width: usize,
    tally: RunSummary,
    console: &'c mut C,
}

impl<'c, C: Console> Report<'c, C> {
    /// Create (truncating) both logs in `dir` and write the header.
    ///
    /// `width` must already be the widest host identifier of the run.
    pub fn begin(
        dir: &Path,
        settings: &Settings,
        started: OffsetDateTime,
        width: usize,
        console: &'c mut C,
    ) -> Result<Self> {
        let summary_path = dir.join(&settings.summary_file);
        let detail_path = dir.join(&settings.detail_file);
        let summary = File::create(&summary_path)
            .with_context(|| format!("failed to create {}", summary_path.display()))?;
        let detail = File::create(&detail_path)
            .with_context(|| format!("failed to create {}", detail_path.display()))?;

        let mut report = Self {
            summary: LineWriter::new(summary),
            detail: LineWriter::new(detail),
            summary_path,
            detail_path,
            width,
            tally: RunSummary::default(),
            console,
        };
        report.write_summary(&header_line(started))?;
        report.write_summary("")?;
        Ok(report)
    }

    /// A row matched the prefix but named no host. Not counted.
    pub fn invalid(&mut self, line: u64, text: &str) -> Result<()> {
        let msg = format!("WARNING: no valid host found in line {line}: {text}");
        self.console.line(Tone::Warning, &msg);
        self.write_summary(&msg)
    }

    /// Append one probed host to both logs and the tally.
    pub fn record(&mut self, probe: &ProbeReport, verdict: &Verdict) -> Result<()> {
        let line = format!(
            "{:<width$}  {}",
            probe.result.host.as_str(),
            verdict.label,
            width = self.width
        );
        self.console.line(verdict.tone, &line);
        self.write_summary(&line)?;

        writeln!(self.detail, "---{}---", probe.result.host)?;
        for raw in &probe.transcript {
            writeln!(self.detail, "{raw}")?;
        }
        writeln!(self.detail)?;
        writeln!(self.detail)?;

        self.tally.attempted += 1;
        if verdict.responded {
            self.tally.responded += 1;
        }
        Ok(())
    }

    /// Write the tally, merge the detail log into the summary log and
    /// delete it.
    pub fn finish(mut self) -> Result<RunSummary> {
        let tally = self.tally;
        let line = format!(
            "{}/{} hosts responded successfully.",
            tally.responded, tally.attempted
        );
        self.write_summary("")?;
        self.console.line(
            if tally.all_responded() {
                Tone::Positive
            } else {
                Tone::Negative
            },
            &line,
        );
        self.write_summary(&line)?;
        for text in ["", "", RULE, DETAIL_TITLE, RULE, ""] {
            self.write_summary(text)?;
        }

        self.detail.flush()?;
        let details = fs::read(&self.detail_path)
            .with_context(|| format!("failed to read {}", self.detail_path.display()))?;
        self.summary.write_all(&details)?;
        self.summary.flush()?;

        let Self {
            summary,
            detail,
            detail_path,
            ..
        } = self;
        drop(detail);
        drop(summary);
        fs::remove_file(&detail_path)
            .with_context(|| format!("failed to remove {}", detail_path.display()))?;
        Ok(tally)
    }

    /// End a run that found nothing to probe. The detail log is removed.
    pub fn no_hosts(mut self, field: &str, prefix: &str) -> Result<()> {
        let msg = format!("No hosts found: no '{field}' value starts with '{prefix}'.");
        self.console.line(Tone::Negative, &msg);
        self.write_summary(&msg)?;
        self.summary.flush()?;

        let Self {
            detail,
            detail_path,
            ..
        } = self;
        drop(detail);
        fs::remove_file(&detail_path)
            .with_context(|| format!("failed to remove {}", detail_path.display()))?;
        Ok(())
    }

    fn write_summary(&mut self, text: &str) -> Result<()> {
        writeln!(self.summary, "{text}")
            .with_context(|| format!("failed to write {}", self.summary_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn offset_labels() {
        assert_eq!(utc_offset_label(offset!(+2)), "UTC+02:00");
        assert_eq!(utc_offset_label(offset!(-5:30)), "UTC-05:30");
        assert_eq!(
            utc_offset_label(UtcOffset::from_hms(0, -30, 0).unwrap()),
            "UTC-00:30"
        );
        assert_eq!(utc_offset_label(UtcOffset::UTC), "UTC+00:00");
    }

    #[test]
    fn header_has_local_time_and_offset() {
        let started = datetime!(2024-03-09 07:05:01 +1);
        assert_eq!(
            header_line(started),
            "Ping results 2024-03-09 07:05:01 (UTC+01:00)"
        );
    }
}
