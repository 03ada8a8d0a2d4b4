//! Consistency checks of transcript models against their sequences.

use std::path::PathBuf;

use clap::Parser;
use indexmap::IndexMap;
use parse_display::Display;
use strum::IntoEnumIterator;
use thousands::Separable;

use crate::common::io::std::open_write_maybe_gz;
use crate::db::known_gene::{self, KnownGeneRecord};
use crate::db::sequences;
use crate::reference::translator;

/// Command line arguments for `db check` sub command.
#[derive(Parser, Debug)]
#[command(about = "Check transcript models against their sequences", long_about = None)]
pub struct Args {
    /// Path to the UCSC `knownGene.txt` file, optionally gzip compressed.
    #[arg(long)]
    pub path_known_gene: PathBuf,
    /// Path to the FASTA file with the spliced transcript sequences.
    #[arg(long)]
    pub path_sequences: PathBuf,
    /// Path to the TSV report, written to stdout if missing.
    #[arg(long)]
    pub path_output: Option<PathBuf>,
}

/// A problem found with a transcript.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    serde::Serialize,
    strum::EnumIter,
)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Problem {
    /// No sequence with the transcript's identifier.
    MissingSequence,
    /// Sequence length differs from the summed exon lengths.
    LengthMismatch,
    /// Transcript model cannot be constructed, e.g., unsorted exons.
    InvalidModel,
    /// CDS length is not a multiple of three.
    IncompleteCds,
    /// CDS does not start with `ATG`.
    MissingStartCodon,
    /// CDS does not end with a stop codon.
    MissingStopCodon,
    /// Stop codon before the end of the CDS.
    InternalStopCodon,
}

/// Row of the report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
struct ReportRow<'a> {
    transcript_id: &'a str,
    problem: Problem,
}

/// Problems of the transcript described by `record` with the spliced sequence `sequence`.
pub fn check_record(record: &KnownGeneRecord, sequence: Option<&str>) -> Vec<Problem> {
    let Some(sequence) = sequence else {
        return vec![Problem::MissingSequence];
    };
    match record.exons() {
        Ok(exons) => {
            let mrna_length: i32 = exons.iter().map(|exon| exon.len()).sum();
            if mrna_length != sequence.len() as i32 {
                return vec![Problem::LengthMismatch];
            }
        }
        Err(_) => return vec![Problem::InvalidModel],
    }
    let tx = match record.to_transcript(None, sequence) {
        Ok(tx) => tx,
        Err(e) => {
            tracing::debug!("invalid model {}: {}", &record.name, e);
            return vec![Problem::InvalidModel];
        }
    };
    if !tx.is_coding() {
        return Vec::new();
    }

    let mut result = Vec::new();
    let cds = tx.cds_sequence();
    if cds.len() % 3 != 0 {
        result.push(Problem::IncompleteCds);
    }
    if !cds.starts_with("ATG") {
        result.push(Problem::MissingStartCodon);
    }
    let protein = translator::translate(cds);
    if !protein.ends_with('*') || cds.len() % 3 != 0 {
        result.push(Problem::MissingStopCodon);
    }
    if protein
        .char_indices()
        .any(|(idx, aa)| aa == '*' && idx + 1 < protein.len())
    {
        result.push(Problem::InternalStopCodon);
    }
    result
}

/// Main entry point for `db check` sub command.
pub fn run(common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting 'db check'");
    tracing::info!("  common = {:#?}", &common);
    tracing::info!("  args = {:#?}", &args);

    let records = known_gene::read_known_gene(&args.path_known_gene)?;
    let sequences = sequences::read_sequences(&args.path_sequences)?;

    let writer: Box<dyn std::io::Write> = match &args.path_output {
        Some(path) => open_write_maybe_gz(path)?,
        None => Box::new(std::io::stdout()),
    };
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);

    let mut counts = Problem::iter()
        .map(|problem| (problem, 0usize))
        .collect::<IndexMap<_, _>>();
    let mut n_ok = 0usize;
    for record in &records {
        let problems = check_record(record, sequences.get(&record.name).map(String::as_str));
        if problems.is_empty() {
            n_ok += 1;
        }
        for problem in problems {
            *counts.entry(problem).or_default() += 1;
            csv_writer.serialize(ReportRow {
                transcript_id: &record.name,
                problem,
            })?;
        }
    }
    csv_writer.flush()?;

    tracing::info!(
        "{} of {} transcripts without problems",
        n_ok.separate_with_commas(),
        records.len().separate_with_commas()
    );
    for (problem, count) in counts.iter().filter(|(_, count)| **count > 0) {
        tracing::info!("  {}: {}", problem, count.separate_with_commas());
    }

    Ok(())
}
