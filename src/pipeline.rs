use std::path::Path;

use anyhow::Result;
use time::OffsetDateTime;

use crate::classify::{classify, Outcome};
use crate::config::Settings;
use crate::console::Console;
use crate::extract::{load_entries, Entry};
use crate::probe::{count_replies, Prober};
use crate::report::Report;
use crate::types::{HostId, ProbeReport, RunSummary};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// Nothing matched the prefix; only the header and a notice were written.
    NoHosts,
}

/// Extract hosts from `input`, probe each in source order and write the
/// report next to `input`.
pub async fn run<P, C>(
    input: &Path,
    settings: &Settings,
    prober: &P,
    console: &mut C,
    started: OffsetDateTime,
) -> Result<RunOutcome>
where
    P: Prober,
    C: Console,
{
    let extraction = load_entries(input, &settings.field, &settings.prefix)?;
    let dir = input.parent().unwrap_or_else(|| Path::new("."));

    let mut report = Report::begin(dir, settings, started, extraction.width(), console)?;

    if !extraction.has_hosts() {
        for entry in &extraction.entries {
            if let Entry::Invalid { line, text } = entry {
                report.invalid(*line, text)?;
            }
        }
        report.no_hosts(&settings.field, &settings.prefix)?;
        return Ok(RunOutcome::NoHosts);
    }

    for entry in &extraction.entries {
        match entry {
            Entry::Invalid { line, text } => report.invalid(*line, text)?,
            Entry::Host(host) => {
                let probe = probe_host(prober, host).await;
                let verdict = classify(&probe.result, settings.probe_count);
                if verdict.outcome == Outcome::NotFound {
                    tracing::debug!(
                        %host,
                        counted = probe.result.total(),
                        expected = settings.probe_count,
                        "indecisive probe"
                    );
                }
                report.record(&probe, &verdict)?;
            }
        }
    }

    let summary = report.finish()?;
    tracing::info!(
        attempted = summary.attempted,
        responded = summary.responded,
        "run complete"
    );
    Ok(RunOutcome::Completed(summary))
}

/// A probe that could not run still yields a report: its error text is the
/// transcript, which counts as nothing.
async fn probe_host<P: Prober>(prober: &P, host: &HostId) -> ProbeReport {
    match prober.probe(host).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(%host, error = %format!("{e:#}"), "probe failed");
            let transcript = vec![format!("probe failed: {e:#}")];
            ProbeReport {
                result: count_replies(host, &transcript),
                transcript,
            }
        }
    }
}
