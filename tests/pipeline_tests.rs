use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use esxi_ping_report::config::Settings;
use esxi_ping_report::console::Console;
use esxi_ping_report::pipeline::{run, RunOutcome};
use esxi_ping_report::probe::{count_replies, Prober};
use esxi_ping_report::types::{HostId, ProbeReport, RunSummary, Tone};
use time::macros::datetime;
use time::OffsetDateTime;

/// Replays canned ping transcripts and remembers which hosts were asked for.
#[derive(Default)]
struct Scripted {
    transcripts: HashMap<String, Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl Scripted {
    fn with(mut self, host: &str, lines: &[&str]) -> Self {
        self.transcripts
            .insert(host.to_string(), lines.iter().map(|l| l.to_string()).collect());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Prober for Scripted {
    async fn probe(&self, host: &HostId) -> Result<ProbeReport> {
        self.calls.lock().unwrap().push(host.to_string());
        let transcript = self
            .transcripts
            .get(host.as_str())
            .cloned()
            .ok_or_else(|| anyhow!("no route to {host}"))?;
        Ok(ProbeReport {
            result: count_replies(host, &transcript),
            transcript,
        })
    }
}

/// Collects console lines in memory.
#[derive(Default)]
struct Recorder {
    lines: Vec<(Tone, String)>,
}

impl Console for Recorder {
    fn line(&mut self, tone: Tone, text: &str) {
        self.lines.push((tone, text.to_string()));
    }
}

const INVENTORY: &str = "\
number,short_description,assignment_group
INC100,ESXi host esx01.lab not responding,Infra
INC101,Printer offline on floor 2,Desk
INC102,ESXi host 10.0.0.5 high latency,Infra
INC103,ESXi host,Infra
INC104,ESXi host esx-gone down since Monday,Infra
";

fn reply(host: &str) -> String {
    format!("Reply from {host}: bytes=32 time<1ms TTL=64")
}

fn prober() -> Scripted {
    let full: Vec<String> = (0..4).map(|_| reply("esx01.lab")).collect();
    let full: Vec<&str> = full.iter().map(String::as_str).collect();
    let half = reply("10.0.0.5");
    Scripted::default()
        .with("esx01.lab", &full)
        .with(
            "10.0.0.5",
            &[
                "Pinging 10.0.0.5 with 32 bytes of data:",
                &half,
                "Request timed out.",
                &half,
                "Request timed out.",
            ],
        )
        .with(
            "esx-gone",
            &["Ping request could not find host esx-gone. Please check the name and try again."],
        )
}

fn started() -> OffsetDateTime {
    datetime!(2024-05-06 08:30:00 +2)
}

fn write_input(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("incidents.csv");
    fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn probes_matching_hosts_in_order_and_merges_logs() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), INVENTORY);
    let settings = Settings::default();
    let prober = prober();
    let mut console = Recorder::default();

    let outcome = run(&input, &settings, &prober, &mut console, started())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed(RunSummary {
            attempted: 3,
            responded: 2
        })
    );
    assert_eq!(prober.calls(), vec!["esx01.lab", "10.0.0.5", "esx-gone"]);
    assert!(!dir.path().join(&settings.detail_file).exists());

    let log = fs::read_to_string(dir.path().join(&settings.summary_file)).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(
        &lines[..10],
        &[
            "Ping results 2024-05-06 08:30:00 (UTC+02:00)",
            "",
            "esx01.lab  100% (4/4) pings received.",
            "10.0.0.5   50% (2/4) pings received.",
            "WARNING: no valid host found in line 5: ESXi host",
            "esx-gone   host not found",
            "",
            "2/3 hosts responded successfully.",
            "",
            "",
        ]
    );
    assert_eq!(lines[11], "DETAILED PING OUTPUT");

    let details = lines[14..].join("\n");
    assert!(details.starts_with("---esx01.lab---\nReply from esx01.lab"));
    assert!(details.contains(
        "---10.0.0.5---\n\
         Pinging 10.0.0.5 with 32 bytes of data:\n\
         Reply from 10.0.0.5: bytes=32 time<1ms TTL=64\n\
         Request timed out.\n"
    ));
    assert!(details.contains("Request timed out.\n\n\n---esx-gone---\nPing request could not find host"));

    let tones: Vec<Tone> = console.lines.iter().map(|(t, _)| *t).collect();
    assert_eq!(
        tones,
        vec![
            Tone::Positive,
            Tone::Warning,
            Tone::Warning,
            Tone::Negative,
            Tone::Negative
        ]
    );
}

#[tokio::test]
async fn all_responding_ends_positive() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "short_description\nESXi host esx01.lab\nsomething else\n",
    );
    let prober = prober();
    let mut console = Recorder::default();

    let outcome = run(&input, &Settings::default(), &prober, &mut console, started())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed(RunSummary {
            attempted: 1,
            responded: 1
        })
    );
    assert_eq!(
        console.lines.last().unwrap(),
        &(Tone::Positive, "1/1 hosts responded successfully.".to_string())
    );
}

#[tokio::test]
async fn no_matching_rows_writes_header_and_notice_only() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "number,short_description\nINC1,Printer offline\nINC2,esxi host lowercase\n",
    );
    let settings = Settings::default();
    let prober = prober();
    let mut console = Recorder::default();

    let outcome = run(&input, &settings, &prober, &mut console, started())
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::NoHosts);
    assert!(prober.calls().is_empty());
    assert!(!dir.path().join(&settings.detail_file).exists());

    let log = fs::read_to_string(dir.path().join(&settings.summary_file)).unwrap();
    assert_eq!(
        log,
        "Ping results 2024-05-06 08:30:00 (UTC+02:00)\n\
         \n\
         No hosts found: no 'short_description' value starts with 'ESXi host'.\n"
    );
}

#[tokio::test]
async fn failed_probe_is_reported_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "short_description\nESXi host unknown01 down\n");
    let settings = Settings::default();
    let prober = prober();
    let mut console = Recorder::default();

    let outcome = run(&input, &settings, &prober, &mut console, started())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed(RunSummary {
            attempted: 1,
            responded: 0
        })
    );
    let log = fs::read_to_string(dir.path().join(&settings.summary_file)).unwrap();
    assert!(log.contains("unknown01  host not found\n"));
    assert!(log.contains("---unknown01---\nprobe failed: no route to unknown01\n"));
}

#[tokio::test]
async fn rerun_differs_only_in_header() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), INVENTORY);
    let settings = Settings::default();
    let path = dir.path().join(&settings.summary_file);

    let mut console = Recorder::default();
    run(&input, &settings, &prober(), &mut console, started())
        .await
        .unwrap();
    let first = fs::read_to_string(&path).unwrap();

    let later = datetime!(2024-05-07 09:00:00 -4);
    run(&input, &settings, &prober(), &mut console, later)
        .await
        .unwrap();
    let second = fs::read_to_string(&path).unwrap();

    let (h1, body1) = first.split_once('\n').unwrap();
    let (h2, body2) = second.split_once('\n').unwrap();
    assert_ne!(h1, h2);
    assert_eq!(h2, "Ping results 2024-05-07 09:00:00 (UTC-04:00)");
    assert_eq!(body1, body2);
}

#[tokio::test]
async fn missing_column_aborts_before_any_log() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "number,description\nINC1,ESXi host esx01\n");
    let settings = Settings::default();
    let mut console = Recorder::default();

    let err = run(&input, &settings, &prober(), &mut console, started())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("column 'short_description' not found"));
    assert!(!dir.path().join(&settings.summary_file).exists());
}
