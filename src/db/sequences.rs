//! Reading of spliced transcript sequences from FASTA files.

use std::path::Path;

use bio::io::fasta;
use rustc_hash::FxHashMap;

use crate::common::io::std::open_read_maybe_gz;

/// Read the sequences of a FASTA file, optionally gzip compressed, keyed by record identifier.
///
/// Sequences are upper-cased; duplicate identifiers keep the first sequence.
pub fn read_sequences<P>(path: P) -> Result<FxHashMap<String, String>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let reader = fasta::Reader::from_bufread(open_read_maybe_gz(path.as_ref())?);
    let mut result = FxHashMap::default();
    for record in reader.records() {
        let record = record?;
        let seq = String::from_utf8_lossy(record.seq()).to_ascii_uppercase();
        if result.contains_key(record.id()) {
            tracing::warn!("duplicate sequence for {}, keeping the first", record.id());
            continue;
        }
        result.insert(record.id().to_string(), seq);
    }
    tracing::debug!(
        "read {} sequences from {}",
        result.len(),
        path.as_ref().display()
    );
    Ok(result)
}
