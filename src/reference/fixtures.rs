//! Transcript models shared by the unit tests.

use crate::reference::genome::{GenomeInterval, Strand};
use crate::reference::transcript::TranscriptModel;

/// Coding sequence `MAERKSGFQDLNGTWHV*` shared by the multi-exon transcripts.
pub const CDS_MULTI_EXON: &str = "ATGGCTGAACGTAAATCCGGATTCCAGGACCTGAATGGCACCTGGCATGTGTGA";

/// Single exon transcript on chr1:100-199 (+) with CDS chr1:103-195.
///
/// The protein is `MLQDPKGCTELASSLKEVRPFNGMQDLSAT*`.
pub fn tx_single_exon() -> TranscriptModel {
    TranscriptModel::new(
        "tx_single",
        Some("GENE1".to_string()),
        Strand::Plus,
        GenomeInterval::from_closed(1, 100, 199),
        GenomeInterval::from_closed(1, 103, 195),
        vec![GenomeInterval::from_closed(1, 100, 199)],
        "GCCATGTTACAAGATCCGAAAGGCTGCACTGAACTGGCATCCAGCCTGAAAGAGGTTCGACCATTCAACGGTATGCAGGATCTTAGCGCAACCTAAGCGC",
    )
    .expect("valid transcript")
}

fn three_exon_layout() -> Vec<GenomeInterval> {
    vec![
        GenomeInterval::from_closed(1, 1001, 1020),
        GenomeInterval::from_closed(1, 1101, 1130),
        GenomeInterval::from_closed(1, 1201, 1240),
    ]
}

/// Three exons chr1:1001-1020, 1101-1130, 1201-1240 (+) with CDS chr1:1011-1214.
pub fn tx_three_exons_plus() -> TranscriptModel {
    let sequence = format!("ACGTACGTAC{}GATTACAGATTACAGATTACAGATTA", CDS_MULTI_EXON);
    TranscriptModel::new(
        "tx_plus",
        Some("GENE2".to_string()),
        Strand::Plus,
        GenomeInterval::from_closed(1, 1001, 1240),
        GenomeInterval::from_closed(1, 1011, 1214),
        three_exon_layout(),
        &sequence,
    )
    .expect("valid transcript")
}

/// Same exon layout and genomic CDS as [`tx_three_exons_plus`] but on the minus strand.
pub fn tx_three_exons_minus() -> TranscriptModel {
    let sequence = format!(
        "GGGAAATTTCCCGGGAAATTTCCCGG{}TTTTTAAAAA",
        CDS_MULTI_EXON
    );
    TranscriptModel::new(
        "tx_minus",
        Some("GENE3".to_string()),
        Strand::Minus,
        GenomeInterval::from_closed(1, 1001, 1240),
        GenomeInterval::from_closed(1, 1011, 1214),
        three_exon_layout(),
        &sequence,
    )
    .expect("valid transcript")
}

/// Non-coding transcript with the exon layout of [`tx_three_exons_plus`].
pub fn tx_non_coding() -> TranscriptModel {
    TranscriptModel::new(
        "tx_nc",
        None,
        Strand::Plus,
        GenomeInterval::from_closed(1, 1001, 1240),
        GenomeInterval::from_closed(1, 1241, 1240),
        three_exon_layout(),
        &"ACGT".repeat(23)[..90],
    )
    .expect("valid transcript")
}
