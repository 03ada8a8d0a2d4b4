//! Reading of UCSC `knownGene.txt` tables.

use std::path::Path;

use anyhow::anyhow;
use rustc_hash::FxHashMap;

use crate::common::{contig, io::std::open_read_maybe_gz};
use crate::reference::genome::{GenomeInterval, Strand};
use crate::reference::transcript::TranscriptModel;

/// Number of leading columns interpreted from a `knownGene.txt` line.
const KNOWN_GENE_COLUMNS: usize = 10;

/// One line of `knownGene.txt`.
///
/// Coordinates are as in the file, i.e., 0-based starts and 1-based ends.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct KnownGeneRecord {
    pub name: String,
    pub chrom: String,
    pub strand: Strand,
    pub tx_start: i32,
    pub tx_end: i32,
    pub cds_start: i32,
    pub cds_end: i32,
    pub exon_count: usize,
    pub exon_starts: String,
    pub exon_ends: String,
}

/// Parse a comma-separated coordinate list, e.g., `100,200,`.
fn parse_coords(name: &str, list: &str) -> Result<Vec<i32>, anyhow::Error> {
    list.split(',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim()
                .parse::<i32>()
                .map_err(|e| anyhow!("invalid coordinate {:?} for {}: {}", s, name, e))
        })
        .collect()
}

impl KnownGeneRecord {
    /// Chromosome number, `None` for chromosomes that are not supported.
    pub fn chrom_no(&self) -> Option<u32> {
        contig::chrom_no(&self.chrom).filter(|no| contig::is_canonical(*no))
    }

    /// Exons as 0-based half-open intervals in genome order.
    pub fn exons(&self) -> Result<Vec<GenomeInterval>, anyhow::Error> {
        let chrom = self
            .chrom_no()
            .ok_or_else(|| anyhow!("unsupported chromosome {:?} of {}", self.chrom, self.name))?;
        let starts = parse_coords(&self.name, &self.exon_starts)?;
        let ends = parse_coords(&self.name, &self.exon_ends)?;
        if starts.len() != self.exon_count || ends.len() != self.exon_count {
            anyhow::bail!(
                "{} declares {} exons but has {} starts and {} ends",
                self.name,
                self.exon_count,
                starts.len(),
                ends.len()
            );
        }
        Ok(starts
            .into_iter()
            .zip(ends)
            .map(|(start, end)| GenomeInterval::new(chrom, start, end))
            .collect())
    }

    /// Construct the transcript model from the record and the spliced transcript sequence.
    pub fn to_transcript(
        &self,
        gene_symbol: Option<String>,
        sequence: &str,
    ) -> Result<TranscriptModel, anyhow::Error> {
        let exons = self.exons()?;
        let chrom = exons
            .first()
            .map(|exon| exon.chrom)
            .ok_or_else(|| anyhow!("{} has no exons", self.name))?;
        Ok(TranscriptModel::new(
            &self.name,
            gene_symbol,
            self.strand,
            GenomeInterval::new(chrom, self.tx_start, self.tx_end),
            GenomeInterval::new(chrom, self.cds_start, self.cds_end),
            exons,
            sequence,
        )?)
    }
}

/// Read all records from a `knownGene.txt` file, optionally gzip compressed.
///
/// Records on chromosomes other than 1-22, X, Y, and MT are skipped.
pub fn read_known_gene<P>(path: P) -> Result<Vec<KnownGeneRecord>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .has_headers(false)
        .flexible(true)
        .from_reader(open_read_maybe_gz(path.as_ref())?);

    let mut result = Vec::new();
    let mut skipped = 0usize;
    for (lineno, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() < KNOWN_GENE_COLUMNS {
            anyhow::bail!(
                "line {} of {} has {} columns but at least {} are required",
                lineno + 1,
                path.as_ref().display(),
                record.len(),
                KNOWN_GENE_COLUMNS
            );
        }
        let record = csv::StringRecord::from(
            record
                .iter()
                .take(KNOWN_GENE_COLUMNS)
                .collect::<Vec<_>>(),
        );
        let record: KnownGeneRecord = record
            .deserialize(None)
            .map_err(|e| anyhow!("problem with line {}: {}", lineno + 1, e))?;
        if record.chrom_no().is_none() {
            tracing::debug!("skipping {} on {}", &record.name, &record.chrom);
            skipped += 1;
            continue;
        }
        result.push(record);
    }

    tracing::debug!(
        "read {} knownGene records, skipped {} on other chromosomes",
        result.len(),
        skipped
    );
    Ok(result)
}

/// Read mapping from transcript identifier to gene symbol from a two-column TSV file.
pub fn read_gene_symbols<P>(path: P) -> Result<FxHashMap<String, String>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .has_headers(false)
        .flexible(true)
        .from_reader(open_read_maybe_gz(path.as_ref())?);

    let mut result = FxHashMap::default();
    for record in rdr.records() {
        let record = record?;
        if let (Some(tx_id), Some(symbol)) = (record.get(0), record.get(1)) {
            if !symbol.is_empty() {
                result.insert(tx_id.to_string(), symbol.to_string());
            }
        }
    }
    Ok(result)
}
