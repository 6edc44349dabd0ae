use std::time::Duration;

/// Column holding the free-text description of an inventory row.
pub const FIELD: &str = "short_description";
/// Rows whose description starts with this name an ESXi host.
pub const PREFIX: &str = "ESXi host";
/// Echo requests sent to each host.
pub const PROBE_COUNT: u32 = 4;
/// The durable artifact of a run, written next to the input file.
pub const SUMMARY_FILE: &str = "ping_results.txt";
/// Transient transcript log, merged into the summary and removed.
pub const DETAIL_FILE: &str = "ping_details.txt";

/// Fixed parameters of a run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub field: String,
    pub prefix: String,
    pub probe_count: u32,
    /// Upper bound for one `ping` invocation, covering all its echoes.
    pub probe_deadline: Duration,
    pub summary_file: String,
    pub detail_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field: FIELD.to_string(),
            prefix: PREFIX.to_string(),
            probe_count: PROBE_COUNT,
            probe_deadline: Duration::from_secs(30),
            summary_file: SUMMARY_FILE.to_string(),
            detail_file: DETAIL_FILE.to_string(),
        }
    }
}
