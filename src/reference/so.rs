//! Sequence ontology predicates: classify genome intervals against transcript features.
//!
//! All predicates take intervals on the forward strand; strand-dependent features (splice
//! donor vs. acceptor, UTRs, up- and downstream) are resolved using the transcript's strand.

use crate::reference::genome::{GenomeInterval, Strand};
use crate::reference::projector::CoordinateProjector;
use crate::reference::transcript::TranscriptModel;

/// Length of the splice donor/acceptor site in the intron.
const SPLICE_SITE_LEN: i32 = 2;
/// Splice region reaches this far into the exon.
const SPLICE_REGION_EXONIC: i32 = 3;
/// Splice region reaches this far into the intron.
const SPLICE_REGION_INTRONIC: i32 = 8;

/// Feature predicates for one transcript.
#[derive(Debug, Clone)]
pub struct SequenceOntology<'a> {
    tx: &'a TranscriptModel,
    /// 0-based genome positions of the start codon bases.
    start_site: Vec<i32>,
    /// 0-based genome positions of the stop codon bases.
    stop_site: Vec<i32>,
}

impl<'a> SequenceOntology<'a> {
    pub fn new(tx: &'a TranscriptModel) -> Self {
        let (start_site, stop_site) = if tx.is_coding() {
            let projector = CoordinateProjector::new(tx);
            let begin = tx.cds_offset() as i32;
            let end = begin + tx.cds_length();
            let positions = |range: std::ops::Range<i32>| {
                range
                    .filter_map(|tx_pos| projector.transcript_to_genome_pos(tx_pos).ok())
                    .map(|pos| pos.pos0())
                    .collect::<Vec<_>>()
            };
            (
                positions(begin..std::cmp::min(begin + 3, end)),
                positions(std::cmp::max(end - 3, begin)..end),
            )
        } else {
            (Vec::new(), Vec::new())
        };
        Self {
            tx,
            start_site,
            stop_site,
        }
    }

    pub fn transcript(&self) -> &'a TranscriptModel {
        self.tx
    }

    /// Exonic parts of the coding region.
    fn cds_exons(&self) -> impl Iterator<Item = GenomeInterval> + '_ {
        self.tx
            .exons
            .iter()
            .filter_map(|exon| exon.intersection(&self.tx.cds_region))
    }

    /// Intronic parts of the coding region.
    fn cds_introns(&self) -> impl Iterator<Item = GenomeInterval> + '_ {
        self.tx
            .introns()
            .filter_map(|intron| intron.intersection(&self.tx.cds_region))
    }

    pub fn overlaps_with_exon(&self, iv: &GenomeInterval) -> bool {
        self.tx.exons.iter().any(|exon| exon.overlaps(iv))
    }

    pub fn lies_in_exon(&self, iv: &GenomeInterval) -> bool {
        self.tx.exons.iter().any(|exon| exon.contains(iv))
    }

    /// Whether some exon lies completely within `iv`.
    pub fn contains_exon(&self, iv: &GenomeInterval) -> bool {
        self.tx.exons.iter().any(|exon| iv.contains(exon))
    }

    pub fn overlaps_with_intron(&self, iv: &GenomeInterval) -> bool {
        self.tx.introns().any(|intron| intron.overlaps(iv))
    }

    pub fn lies_in_intron(&self, iv: &GenomeInterval) -> bool {
        self.tx.introns().any(|intron| intron.contains(iv))
    }

    pub fn overlaps_with_cds(&self, iv: &GenomeInterval) -> bool {
        self.tx.cds_region.overlaps(iv)
    }

    pub fn overlaps_with_cds_exon(&self, iv: &GenomeInterval) -> bool {
        self.cds_exons().any(|exon| exon.overlaps(iv))
    }

    pub fn lies_in_cds_exon(&self, iv: &GenomeInterval) -> bool {
        self.cds_exons().any(|exon| exon.contains(iv))
    }

    pub fn overlaps_with_cds_intron(&self, iv: &GenomeInterval) -> bool {
        self.cds_introns().any(|intron| intron.overlaps(iv))
    }

    /// Splice donor sites, the first two intronic bases in transcript orientation.
    fn splice_donor_sites(&self) -> impl Iterator<Item = GenomeInterval> + '_ {
        let strand = self.tx.strand;
        self.tx.introns().map(move |intron| match strand {
            Strand::Plus => {
                GenomeInterval::new(intron.chrom, intron.begin, intron.begin + SPLICE_SITE_LEN)
            }
            Strand::Minus => {
                GenomeInterval::new(intron.chrom, intron.end - SPLICE_SITE_LEN, intron.end)
            }
        })
    }

    /// Splice acceptor sites, the last two intronic bases in transcript orientation.
    fn splice_acceptor_sites(&self) -> impl Iterator<Item = GenomeInterval> + '_ {
        let strand = self.tx.strand;
        self.tx.introns().map(move |intron| match strand {
            Strand::Plus => {
                GenomeInterval::new(intron.chrom, intron.end - SPLICE_SITE_LEN, intron.end)
            }
            Strand::Minus => {
                GenomeInterval::new(intron.chrom, intron.begin, intron.begin + SPLICE_SITE_LEN)
            }
        })
    }

    /// Splice regions of each intron, excluding the donor and acceptor sites.
    fn splice_regions(&self) -> impl Iterator<Item = GenomeInterval> + '_ {
        self.tx.introns().flat_map(|intron| {
            let chrom = intron.chrom;
            let inner_begin = intron.begin + SPLICE_SITE_LEN;
            let inner_end = intron.end - SPLICE_SITE_LEN;
            let clip = move |begin: i32, end: i32| {
                GenomeInterval::new(
                    chrom,
                    std::cmp::max(begin, inner_begin),
                    std::cmp::min(end, inner_end),
                )
            };
            [
                GenomeInterval::new(chrom, intron.begin - SPLICE_REGION_EXONIC, intron.begin),
                clip(inner_begin, intron.begin + SPLICE_REGION_INTRONIC),
                clip(intron.end - SPLICE_REGION_INTRONIC, inner_end),
                GenomeInterval::new(chrom, intron.end, intron.end + SPLICE_REGION_EXONIC),
            ]
            .into_iter()
            .filter(|iv| !iv.is_empty())
        })
    }

    pub fn overlaps_with_splice_donor_site(&self, iv: &GenomeInterval) -> bool {
        self.splice_donor_sites().any(|site| site.overlaps(iv))
    }

    pub fn overlaps_with_splice_acceptor_site(&self, iv: &GenomeInterval) -> bool {
        self.splice_acceptor_sites().any(|site| site.overlaps(iv))
    }

    pub fn overlaps_with_splice_region(&self, iv: &GenomeInterval) -> bool {
        self.splice_regions().any(|region| region.overlaps(iv))
    }

    pub fn overlaps_with_translational_start_site(&self, iv: &GenomeInterval) -> bool {
        iv.chrom == self.tx.chrom && self.start_site.iter().any(|pos| iv.contains_pos(*pos))
    }

    pub fn overlaps_with_translational_stop_site(&self, iv: &GenomeInterval) -> bool {
        iv.chrom == self.tx.chrom && self.stop_site.iter().any(|pos| iv.contains_pos(*pos))
    }

    /// Transcribed region 5' of the CDS.
    fn five_prime_utr(&self) -> GenomeInterval {
        let (tx, cds) = (&self.tx.tx_region, &self.tx.cds_region);
        match self.tx.strand {
            Strand::Plus => GenomeInterval::new(tx.chrom, tx.begin, cds.begin),
            Strand::Minus => GenomeInterval::new(tx.chrom, cds.end, tx.end),
        }
    }

    /// Transcribed region 3' of the CDS.
    fn three_prime_utr(&self) -> GenomeInterval {
        let (tx, cds) = (&self.tx.tx_region, &self.tx.cds_region);
        match self.tx.strand {
            Strand::Plus => GenomeInterval::new(tx.chrom, cds.end, tx.end),
            Strand::Minus => GenomeInterval::new(tx.chrom, tx.begin, cds.begin),
        }
    }

    pub fn overlaps_with_five_prime_utr(&self, iv: &GenomeInterval) -> bool {
        self.tx.is_coding() && self.five_prime_utr().overlaps(iv)
    }

    pub fn overlaps_with_three_prime_utr(&self, iv: &GenomeInterval) -> bool {
        self.tx.is_coding() && self.three_prime_utr().overlaps(iv)
    }

    /// Whether `iv` overlaps the `window` bases 5' of the transcript.
    pub fn overlaps_with_upstream_region(&self, iv: &GenomeInterval, window: i32) -> bool {
        let tx = &self.tx.tx_region;
        let region = match self.tx.strand {
            Strand::Plus => GenomeInterval::new(tx.chrom, tx.begin - window, tx.begin),
            Strand::Minus => GenomeInterval::new(tx.chrom, tx.end, tx.end + window),
        };
        region.overlaps(iv)
    }

    /// Whether `iv` overlaps the `window` bases 3' of the transcript.
    pub fn overlaps_with_downstream_region(&self, iv: &GenomeInterval, window: i32) -> bool {
        let tx = &self.tx.tx_region;
        let region = match self.tx.strand {
            Strand::Plus => GenomeInterval::new(tx.chrom, tx.end, tx.end + window),
            Strand::Minus => GenomeInterval::new(tx.chrom, tx.begin - window, tx.begin),
        };
        region.overlaps(iv)
    }
}
