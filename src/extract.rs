use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ExtractError;
use crate::types::HostId;

/// One row of the inventory table, keyed by header name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct InputRecord(HashMap<String, String>);

impl InputRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InputRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// What a single description value yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derived<'a> {
    /// Value does not start with the prefix.
    NoMatch,
    /// Prefix matched but nothing followed it.
    Empty,
    Host(&'a str),
}

/// Strip `prefix` (case-sensitive, anchored) and any whitespace after it, then
/// keep everything up to the next whitespace.
///
/// `"ESXi host 10.0.0.5 extra text"` yields `Host("10.0.0.5")`.
pub fn derive_host<'a>(value: &'a str, prefix: &str) -> Derived<'a> {
    let Some(rest) = value.strip_prefix(prefix) else {
        return Derived::NoMatch;
    };
    match rest.split_whitespace().next() {
        Some(host) => Derived::Host(host),
        None => Derived::Empty,
    }
}

/// An extracted row, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Host(HostId),
    /// Prefix matched but no identifier could be derived.
    Invalid { line: u64, text: String },
}

/// Result of the pre-scan over the whole input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub entries: Vec<Entry>,
    width: usize,
}

impl Extraction {
    pub fn hosts(&self) -> impl Iterator<Item = &HostId> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Host(h) => Some(h),
            Entry::Invalid { .. } => None,
        })
    }

    pub fn has_hosts(&self) -> bool {
        self.hosts().next().is_some()
    }

    /// Widest host identifier; the alignment column of every summary line.
    pub fn width(&self) -> usize {
        self.width
    }

    fn push(&mut self, entry: Entry) {
        if let Entry::Host(h) = &entry {
            self.width = self.width.max(h.width());
        }
        self.entries.push(entry);
    }
}

/// Select matching records and derive their host identifiers.
///
/// Records are `(line, record)` pairs; the line number only feeds diagnostics.
pub fn extract_entries<I>(records: I, field: &str, prefix: &str) -> Extraction
where
    I: IntoIterator<Item = (u64, InputRecord)>,
{
    let mut out = Extraction::default();
    for (line, record) in records {
        let Some(value) = record.field(field) else {
            continue;
        };
        match derive_host(value, prefix) {
            Derived::NoMatch => {}
            Derived::Empty => out.push(Entry::Invalid {
                line,
                text: value.to_string(),
            }),
            Derived::Host(raw) => match HostId::new(raw) {
                Some(host) => out.push(Entry::Host(host)),
                None => out.push(Entry::Invalid {
                    line,
                    text: value.to_string(),
                }),
            },
        }
    }
    out
}

/// Parse CSV from `reader` and extract host entries from column `field`.
pub fn read_entries<R: Read>(
    reader: R,
    field: &str,
    prefix: &str,
) -> std::result::Result<Extraction, ExtractError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    if !headers.iter().any(|h| h == field) {
        return Err(ExtractError::MissingColumn(field.to_string()));
    }

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(|source| ExtractError::Row {
            line: source.position().map(|p| p.line()).unwrap_or_default(),
            source,
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let record: InputRecord = row
            .deserialize(Some(&headers))
            .map_err(|source| ExtractError::Row { line, source })?;
        records.push((line, record));
    }
    Ok(extract_entries(records, field, prefix))
}

/// Open `path` and extract host entries from it.
pub fn load_entries(path: &Path, field: &str, prefix: &str) -> Result<Extraction> {
    let file =
        File::open(path).with_context(|| format!("failed to open input: {}", path.display()))?;
    let extraction = read_entries(file, field, prefix)
        .with_context(|| format!("failed to extract hosts from {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        entries = extraction.entries.len(),
        width = extraction.width(),
        "input scanned"
    );
    Ok(extraction)
}
