//! Annotation of sequence variants.

pub mod ann;
pub mod builder;
pub mod csq;
pub mod provider;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use itertools::Itertools;
use rayon::prelude::*;
use thousands::Separable;

use crate::annotate::seqvars::ann::Annotation;
use crate::annotate::seqvars::builder::AnnotationBuilderOptionsBuilder;
use crate::annotate::seqvars::csq::{ConfigBuilder, ConsequencePredictor, VcfVariant};
use crate::annotate::seqvars::provider::TranscriptDb;
use crate::common::io::std::{open_read_maybe_gz, open_write_maybe_gz};
use crate::db::{load_transcripts, SourcePaths};

/// Format of the annotation output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, parse_display::Display,
)]
#[display(style = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per variant.
    #[default]
    Jsonl,
    /// The input columns followed by comma-separated `ANN` entries.
    Ann,
}

/// Command line arguments for `annotate seqvars` sub command.
#[derive(Parser, Debug)]
#[command(about = "Annotate sequence variants", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub sources: SourcePaths,

    /// Path to the input TSV file with the columns `CHROM POS REF ALT`.
    #[arg(long)]
    pub path_input_tsv: PathBuf,
    /// Path to the output file, gzip compressed if ending in `.gz`.
    #[arg(long)]
    pub path_output: PathBuf,
    /// Format of the output file.
    #[arg(long, value_enum, default_value_t = OutputFormat::Jsonl)]
    pub output_format: OutputFormat,

    /// For debug purposes, maximal number of variants to annotate.
    #[arg(long)]
    pub max_var_count: Option<usize>,

    /// Shift deletions towards the 3' end of the transcript.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub nt3_prime_shifting: bool,
    /// Size of the up- and downstream regions.
    #[arg(long, default_value_t = 5_000)]
    pub up_down_stream_window: i32,
    /// Report `p.?` for variants affecting splice sites.
    #[arg(long)]
    pub splice_site_protein_unknown: bool,
}

/// A variant with its annotations as written to the JSON lines output.
#[derive(Debug, serde::Serialize)]
struct AnnotatedVariant<'a> {
    #[serde(flatten)]
    variant: &'a VcfVariant,
    annotations: &'a [Annotation],
}

/// Read the variants from the tab-separated file at `path`.
fn read_variants(
    path: &Path,
    max_var_count: Option<usize>,
) -> Result<Vec<VcfVariant>, anyhow::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .from_reader(open_read_maybe_gz(path)?);

    let mut result = Vec::new();
    for record in reader.deserialize() {
        if max_var_count.is_some_and(|max_var_count| result.len() >= max_var_count) {
            tracing::warn!(
                "Stopping after {} records as requested by --max-var-count",
                result.len()
            );
            break;
        }
        let var: VcfVariant = record?;
        result.push(var);
    }
    Ok(result)
}

/// Write the annotations of one variant in the given format.
fn write_record(
    writer: &mut dyn Write,
    format: OutputFormat,
    var: &VcfVariant,
    annotations: &[Annotation],
) -> Result<(), anyhow::Error> {
    match format {
        OutputFormat::Jsonl => {
            serde_json::to_writer(
                &mut *writer,
                &AnnotatedVariant {
                    variant: var,
                    annotations,
                },
            )?;
            writeln!(writer)?;
        }
        OutputFormat::Ann => {
            let anns = annotations.iter().join(",");
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}",
                &var.chromosome, var.position, &var.reference, &var.alternative, anns
            )?;
        }
    }
    Ok(())
}

/// Main entry point for `annotate seqvars` sub command.
pub fn run(_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Loading transcript database");
    let tx_db = TranscriptDb::new(load_transcripts(&args.sources)?);
    let config = ConfigBuilder::default()
        .builder_options(
            AnnotationBuilderOptionsBuilder::default()
                .nt3_prime_shifting(args.nt3_prime_shifting)
                .up_down_stream_window(args.up_down_stream_window)
                .splice_site_protein_unknown(args.splice_site_protein_unknown)
                .build()?,
        )
        .build()?;
    let predictor = ConsequencePredictor::new(Arc::new(tx_db), config);

    tracing::info!("Reading variants from {}", args.path_input_tsv.display());
    let variants = read_variants(&args.path_input_tsv, args.max_var_count)?;

    tracing::info!("Annotating {} variants ...", variants.len().separate_with_commas());
    let start = Instant::now();
    let predictions = variants
        .par_iter()
        .map(|var| predictor.predict(var))
        .collect::<Vec<_>>();

    let mut writer = open_write_maybe_gz(&args.path_output)?;
    let mut total_written = 0usize;
    for (var, prediction) in variants.iter().zip(predictions) {
        match prediction {
            Ok(annotations) => {
                let annotations = annotations.unwrap_or_default();
                write_record(&mut writer, args.output_format, var, &annotations)?;
                total_written += 1;
            }
            Err(e) => tracing::warn!("could not annotate {:?}: {}", var, e),
        }
    }
    writer.flush()?;

    tracing::info!(
        "... annotated {} of {} variants in {:?}",
        total_written.separate_with_commas(),
        variants.len().separate_with_commas(),
        start.elapsed()
    );
    Ok(())
}
