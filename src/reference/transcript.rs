//! Immutable transcript models.

use crate::error::Error;
use crate::reference::genome::{GenomeInterval, Strand};

/// Accepted characters in transcript sequences, case-insensitive.
const SEQUENCE_ALPHABET: &str = "ACGTN";

/// Description of one transcript together with its spliced cDNA sequence.
///
/// All intervals are 0-based, half-open, and on the forward strand.  The exons are stored in
/// genome order.  A non-coding transcript has an empty `cds_region`.  The `sequence` is given in
/// transcript orientation, i.e., it is the reverse complement of the genome for transcripts on
/// the minus strand.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptModel {
    /// Transcript identifier, e.g., `uc001aaa.3`.
    pub id: String,
    /// Optional gene symbol.
    pub gene_symbol: Option<String>,
    /// Chromosome number.
    pub chrom: u32,
    pub strand: Strand,
    /// Transcribed region.
    pub tx_region: GenomeInterval,
    /// Coding region, empty for non-coding transcripts.
    pub cds_region: GenomeInterval,
    /// Exons in genome order.
    pub exons: Vec<GenomeInterval>,
    /// Spliced cDNA sequence in transcript orientation.
    pub sequence: String,
    mrna_length: i32,
    cds_length: i32,
    rcds_start: i32,
}

impl TranscriptModel {
    /// Construct a new transcript model, validating the structure and computing the derived
    /// lengths.
    pub fn new(
        id: &str,
        gene_symbol: Option<String>,
        strand: Strand,
        tx_region: GenomeInterval,
        cds_region: GenomeInterval,
        exons: Vec<GenomeInterval>,
        sequence: &str,
    ) -> Result<Self, Error> {
        let invalid = |msg: String| Error::InvalidTranscript(format!("{}: {}", id, msg));

        if exons.is_empty() {
            return Err(invalid("transcript has no exons".into()));
        }
        if tx_region.is_empty() {
            return Err(invalid(format!("empty transcription region {}", tx_region)));
        }
        for (i, exon) in exons.iter().enumerate() {
            if exon.is_empty() || !tx_region.contains(exon) {
                return Err(invalid(format!(
                    "exon {} ({}) is empty or outside of {}",
                    i + 1,
                    exon,
                    tx_region
                )));
            }
            if i > 0 && exons[i - 1].end > exon.begin {
                return Err(invalid(format!(
                    "exons {} and {} are unsorted or overlapping",
                    i,
                    i + 1
                )));
            }
        }
        let (first, last) = (&exons[0], &exons[exons.len() - 1]);
        if first.begin != tx_region.begin || last.end != tx_region.end {
            return Err(invalid(format!(
                "exons span {}-{} but transcription region is {}",
                first.begin + 1,
                last.end,
                tx_region
            )));
        }
        let is_coding = !cds_region.is_empty();
        if is_coding && !tx_region.contains(&cds_region) {
            return Err(invalid(format!(
                "coding region {} outside of {}",
                cds_region, tx_region
            )));
        }

        if let Some(c) = sequence
            .chars()
            .find(|c| !SEQUENCE_ALPHABET.contains(c.to_ascii_uppercase()))
        {
            return Err(invalid(format!("invalid character {:?} in sequence", c)));
        }
        let mrna_length = exons.iter().map(|exon| exon.len()).sum::<i32>();
        if sequence.len() as i32 != mrna_length {
            return Err(invalid(format!(
                "sequence length {} does not match exon length {}",
                sequence.len(),
                mrna_length
            )));
        }

        let (cds_length, rcds_start) = if is_coding {
            (
                compute_cds_length(id, &exons, &cds_region)?,
                compute_rcds_start(id, strand, &tx_region, &exons, &cds_region)?,
            )
        } else {
            (0, 0)
        };

        Ok(Self {
            id: id.to_string(),
            gene_symbol,
            chrom: tx_region.chrom,
            strand,
            tx_region,
            cds_region,
            exons,
            sequence: sequence.to_ascii_uppercase(),
            mrna_length,
            cds_length,
            rcds_start,
        })
    }

    pub fn is_coding(&self) -> bool {
        !self.cds_region.is_empty()
    }

    /// Length of the spliced transcript.
    pub fn mrna_length(&self) -> i32 {
        self.mrna_length
    }

    /// Number of coding nucleotides, including the stop codon.
    pub fn cds_length(&self) -> i32 {
        self.cds_length
    }

    /// 1-based offset of the first coding nucleotide in `sequence`, 0 for non-coding
    /// transcripts.
    pub fn rcds_start(&self) -> i32 {
        self.rcds_start
    }

    pub fn exon_count(&self) -> usize {
        self.exons.len()
    }

    /// 1-based, fully closed start of the transcription region.
    pub fn tx_start(&self) -> i32 {
        self.tx_region.begin + 1
    }

    pub fn tx_end(&self) -> i32 {
        self.tx_region.end
    }

    /// 1-based, fully closed start of the coding region; `cds_end() + 1` if non-coding.
    pub fn cds_start(&self) -> i32 {
        self.cds_region.begin + 1
    }

    pub fn cds_end(&self) -> i32 {
        self.cds_region.end
    }

    /// Introns in genome order.
    pub fn introns(&self) -> impl Iterator<Item = GenomeInterval> + '_ {
        self.exons
            .windows(2)
            .map(|w| GenomeInterval::new(self.chrom, w[0].end, w[1].begin))
    }

    /// 1-based rank of the exon with the given genome-order index, in transcript orientation.
    pub fn exon_rank(&self, idx: usize) -> i32 {
        match self.strand {
            Strand::Plus => idx as i32 + 1,
            Strand::Minus => (self.exons.len() - idx) as i32,
        }
    }

    /// 1-based rank of the intron with the given genome-order index, in transcript orientation.
    pub fn intron_rank(&self, idx: usize) -> i32 {
        match self.strand {
            Strand::Plus => idx as i32 + 1,
            Strand::Minus => (self.exons.len() - 1 - idx) as i32,
        }
    }

    /// Zero-based offset of the first coding nucleotide in `sequence`.
    pub(crate) fn cds_offset(&self) -> usize {
        std::cmp::max(self.rcds_start - 1, 0) as usize
    }

    /// The transcript sequence starting at the CDS, including the 3' UTR.
    pub fn cds_starting_sequence(&self) -> &str {
        &self.sequence[self.cds_offset()..]
    }

    /// The coding sequence only.
    pub fn cds_sequence(&self) -> &str {
        let begin = self.cds_offset();
        &self.sequence[begin..begin + self.cds_length as usize]
    }
}

/// Number of coding nucleotides, scanning the exons in genome order.
fn compute_cds_length(
    id: &str,
    exons: &[GenomeInterval],
    cds_region: &GenomeInterval,
) -> Result<i32, Error> {
    // 1-based, fully closed
    let (cds_start, cds_end) = (cds_region.begin + 1, cds_region.end);
    let mut cds_open = false;
    let mut length = 0;
    for exon in exons {
        let (exon_start, exon_end) = (exon.begin + 1, exon.end);
        if !cds_open {
            if exon_start <= cds_start && cds_start <= exon_end {
                if cds_end <= exon_end {
                    return Ok(cds_end - cds_start + 1);
                }
                length += exon_end - cds_start + 1;
                cds_open = true;
            }
        } else if cds_end < exon_start {
            return Err(Error::InconsistentTranscript(format!(
                "{}: CDS end {} lies before exon {}",
                id, cds_end, exon
            )));
        } else if cds_end > exon_end {
            length += exon_end - exon_start + 1;
        } else {
            return Ok(length + cds_end - exon_start + 1);
        }
    }
    Err(Error::InvalidTranscript(format!(
        "{}: coding region {} does not start and end in exons",
        id, cds_region
    )))
}

/// 1-based offset of the start codon in the spliced transcript.
fn compute_rcds_start(
    id: &str,
    strand: Strand,
    tx_region: &GenomeInterval,
    exons: &[GenomeInterval],
    cds_region: &GenomeInterval,
) -> Result<i32, Error> {
    let (tx_start, tx_end) = (tx_region.begin + 1, tx_region.end);
    let (cds_start, cds_end) = (cds_region.begin + 1, cds_region.end);
    let mut cum_intron = 0;
    match strand {
        Strand::Plus => {
            for (i, exon) in exons.iter().enumerate() {
                if i > 0 {
                    cum_intron += exon.begin - exons[i - 1].end;
                }
                if exon.begin < cds_start && cds_start <= exon.end {
                    return Ok(cds_start - tx_start - cum_intron + 1);
                }
            }
        }
        Strand::Minus => {
            for (i, exon) in exons.iter().enumerate().rev() {
                if i + 1 < exons.len() {
                    cum_intron += exons[i + 1].begin - exon.end;
                }
                if exon.begin < cds_end && cds_end <= exon.end {
                    return Ok(tx_end - cds_end - cum_intron + 1);
                }
            }
        }
    }
    Err(Error::InvalidTranscript(format!(
        "{}: translation start of {} not in an exon",
        id, cds_region
    )))
}
