//! Loading of transcript databases and their consistency checks.

use std::path::PathBuf;

use thousands::Separable;

use crate::reference::transcript::TranscriptModel;

pub mod check;
pub mod known_gene;
pub mod sequences;

/// Paths to the files making up a transcript database.
#[derive(Debug, Clone, PartialEq, Eq, clap::Args)]
pub struct SourcePaths {
    /// Path to the UCSC `knownGene.txt` file, optionally gzip compressed.
    #[arg(long)]
    pub path_known_gene: PathBuf,
    /// Path to a TSV file mapping transcript identifiers to gene symbols.
    #[arg(long)]
    pub path_gene_symbols: Option<PathBuf>,
    /// Path to the FASTA file with the spliced transcript sequences.
    #[arg(long)]
    pub path_sequences: PathBuf,
}

/// Load the transcript models described by `paths`.
///
/// Transcripts without a sequence or with a sequence inconsistent with their exons are skipped
/// with a warning.
pub fn load_transcripts(paths: &SourcePaths) -> Result<Vec<TranscriptModel>, anyhow::Error> {
    tracing::info!(
        "Loading transcripts from {}",
        paths.path_known_gene.display()
    );
    let records = known_gene::read_known_gene(&paths.path_known_gene)?;
    let mut gene_symbols = match &paths.path_gene_symbols {
        Some(path) => known_gene::read_gene_symbols(path)?,
        None => Default::default(),
    };
    let sequences = sequences::read_sequences(&paths.path_sequences)?;

    let mut result = Vec::with_capacity(records.len());
    for record in &records {
        let Some(sequence) = sequences.get(&record.name) else {
            tracing::warn!("no sequence for {}, skipping", &record.name);
            continue;
        };
        match record.to_transcript(gene_symbols.remove(&record.name), sequence) {
            Ok(tx) => result.push(tx),
            Err(e) => tracing::warn!("skipping {}: {}", &record.name, e),
        }
    }

    tracing::info!(
        "... loaded {} of {} transcripts",
        result.len().separate_with_commas(),
        records.len().separate_with_commas()
    );
    Ok(result)
}

#[cfg(test)]
pub(crate) mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    pub fn fixture_paths() -> SourcePaths {
        SourcePaths {
            path_known_gene: "tests/data/db/known_gene.tsv".into(),
            path_gene_symbols: Some("tests/data/db/gene_symbols.tsv".into()),
            path_sequences: "tests/data/db/mrna.fa".into(),
        }
    }

    #[tracing_test::traced_test]
    #[test]
    fn load_fixture() -> Result<(), anyhow::Error> {
        let txs = load_transcripts(&fixture_paths())?;

        assert_eq!(
            txs.iter().map(|tx| tx.id.as_str()).collect::<Vec<_>>(),
            vec!["tx_single", "tx_plus", "tx_minus", "tx_nc", "tx_badcds"]
        );
        assert_eq!(txs[1].gene_symbol.as_deref(), Some("GENE2"));
        assert_eq!(txs[3].gene_symbol, None);
        assert_eq!(txs[2], crate::reference::fixtures::tx_three_exons_minus());
        assert!(logs_contain("no sequence for tx_noseq"));
        assert!(logs_contain("skipping tx_badlen"));

        Ok(())
    }
}
