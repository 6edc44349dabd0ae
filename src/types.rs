use std::fmt;

/// A canonical host identifier taken from an inventory row.
///
/// Never empty and never contains whitespace; only the extractor builds one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostId(String);

impl HostId {
    pub(crate) fn new(raw: &str) -> Option<Self> {
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display width in chars, used for column alignment.
    pub fn width(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Counted replies for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub host: HostId,
    pub success: u32,
    pub failure: u32,
}

impl ProbeResult {
    pub fn total(&self) -> u32 {
        self.success + self.failure
    }
}

/// A probe result together with the raw transcript it was counted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub result: ProbeResult,
    pub transcript: Vec<String>,
}

/// Console color classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Positive,
    Warning,
    Negative,
}

/// Running tally for one run. Owned and updated by the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: u32,
    pub responded: u32,
}

impl RunSummary {
    pub fn all_responded(&self) -> bool {
        self.responded == self.attempted
    }
}
