use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::process::Command;
use tokio::time;

use crate::types::{HostId, ProbeReport, ProbeResult};

/// Markers of an answered echo request (Windows, then Unix `ping`).
const REPLY_MARKERS: &[&str] = &["Reply from", "bytes from"];
/// Markers of an unanswered echo request (Windows, BSD/macOS, Linux `-O`).
const TIMEOUT_MARKERS: &[&str] = &["Request timed out", "Request timeout for", "no answer yet for"];

/// A reachability check against a single host.
///
/// Implementations block the caller until the probe is complete.
pub trait Prober {
    fn probe(&self, host: &HostId) -> impl Future<Output = Result<ProbeReport>>;
}

/// Count answered and unanswered echoes of a ping transcript.
///
/// Unix `ping` never prints a timeout line for the last echo, so when the
/// `N packets transmitted, M received` statistics line is present it decides
/// the counts. Otherwise reply and timeout lines are counted; lines matching
/// neither marker (banners, resolver errors) are not counted, so a transcript
/// that cannot be fully attributed ends up with a total below the probe count.
pub fn count_replies<S: AsRef<str>>(host: &HostId, lines: &[S]) -> ProbeResult {
    let mut success = 0;
    let mut failure = 0;
    let mut stats = None;
    for line in lines {
        let line = line.as_ref();
        if REPLY_MARKERS.iter().any(|m| line.contains(m)) {
            success += 1;
        } else if TIMEOUT_MARKERS.iter().any(|m| line.contains(m)) {
            failure += 1;
        } else if let Some(counts) = unix_statistics(line) {
            stats = Some(counts);
        }
    }
    if let Some((transmitted, received)) = stats {
        success = received;
        failure = transmitted - received;
    }
    ProbeResult {
        host: host.clone(),
        success,
        failure,
    }
}

/// `(transmitted, received)` from a Unix statistics line such as
/// `4 packets transmitted, 3 received, 25% packet loss` (iputils) or
/// `4 packets transmitted, 3 packets received, 25.0% packet loss` (BSD).
fn unix_statistics(line: &str) -> Option<(u32, u32)> {
    let mut parts = line.split(',');
    let sent = parts.next()?.trim().strip_suffix("packets transmitted")?;
    let transmitted: u32 = sent.trim().parse().ok()?;
    let received: u32 = parts
        .next()?
        .split_whitespace()
        .next()?
        .parse()
        .ok()?;
    (received <= transmitted).then_some((transmitted, received))
}

/// Probes hosts with the operating system's `ping` binary.
#[derive(Debug, Clone)]
pub struct PingProber {
    count: u32,
    deadline: Duration,
}

impl PingProber {
    pub fn new(count: u32, deadline: Duration) -> Self {
        Self { count, deadline }
    }

    fn command(&self, host: &HostId) -> Command {
        let mut cmd = Command::new("ping");
        let count = self.count.to_string();
        if cfg!(windows) {
            cmd.args(["-n", count.as_str()]);
        } else if cfg!(target_os = "linux") {
            // -O makes iputils print a line for every unanswered request.
            cmd.args(["-c", count.as_str(), "-O"]);
        } else {
            cmd.args(["-c", count.as_str()]);
        }
        cmd.arg(host.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Prober for PingProber {
    async fn probe(&self, host: &HostId) -> Result<ProbeReport> {
        let output = time::timeout(self.deadline, self.command(host).output())
            .await
            .map_err(|_| anyhow!("ping {host} did not finish within {:?}", self.deadline))?
            .with_context(|| format!("failed to run ping for {host}"))?;

        let mut transcript: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect();
        transcript.extend(
            String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(str::to_string),
        );

        let result = count_replies(host, &transcript);
        tracing::debug!(
            %host,
            status = ?output.status.code(),
            success = result.success,
            failure = result.failure,
            "ping finished"
        );
        Ok(ProbeReport { result, transcript })
    }
}
