use crate::types::{ProbeResult, Tone};

/// Label used for both unreachable and indecisive hosts.
pub const NOT_FOUND_LABEL: &str = "host not found";

/// Reachability class of one probed host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every echo answered.
    Full,
    /// Some, but not all, echoes answered.
    Partial,
    /// Measured, and nothing answered.
    Unreachable,
    /// Replies and timeouts do not add up to the probe count.
    NotFound,
}

/// Presentation of a classified probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: Outcome,
    pub label: String,
    pub tone: Tone,
    /// At least one echo answered.
    pub responded: bool,
}

/// Classify `result` against the configured `count` of echoes.
pub fn classify(result: &ProbeResult, count: u32) -> Verdict {
    let total = result.total();
    let outcome = if total != count {
        Outcome::NotFound
    } else if result.success == count {
        Outcome::Full
    } else if result.success > 0 {
        Outcome::Partial
    } else {
        Outcome::Unreachable
    };

    let (label, tone) = match outcome {
        Outcome::Full | Outcome::Partial => (
            format!(
                "{}% ({}/{}) pings received.",
                percent(result.success, total),
                result.success,
                total
            ),
            if outcome == Outcome::Full {
                Tone::Positive
            } else {
                Tone::Warning
            },
        ),
        Outcome::Unreachable | Outcome::NotFound => (NOT_FOUND_LABEL.to_string(), Tone::Negative),
    };

    Verdict {
        outcome,
        label,
        tone,
        responded: result.success >= 1,
    }
}

/// `part / whole` as a percentage, rounded half up.
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    ((part * 200 + whole) / (whole * 2)) as u32
}
