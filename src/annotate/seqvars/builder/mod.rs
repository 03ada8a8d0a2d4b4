//! Construction of annotations for one variant on one transcript.
//!
//! The entry point is [`build_annotation`] which dispatches on the kind of the variant to the
//! specialized builders in [`snv`] and [`deletion`].  Branches shared by all variant kinds
//! (non-coding transcripts, introns, UTRs, flanking and intergenic regions) live in
//! [`AnnotationContext`].

use crate::annotate::seqvars::ann::{Annotation, Location, Message, Pos, Rank, VariantEffect};
use crate::error::Error;
use crate::reference::genome::{revcomp, GenomeInterval, GenomeVariant, Strand, VariantKind};
use crate::reference::projector::{CoordinateProjector, TxLocation};
use crate::reference::so::SequenceOntology;
use crate::reference::transcript::TranscriptModel;

pub mod deletion;
pub mod snv;

/// Configuration of the annotation builders.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_builder::Builder,
    serde::Serialize,
    serde::Deserialize,
)]
#[builder(pattern = "immutable")]
pub struct AnnotationBuilderOptions {
    /// Shift deletions within an exon towards the 3' end of the transcript before annotation.
    #[builder(default = "true")]
    pub nt3_prime_shifting: bool,
    /// Size of the up- and downstream regions.
    #[builder(default = "5_000")]
    pub up_down_stream_window: i32,
    /// Report `p.?` for changes that affect splice sites or regions.
    #[builder(default = "false")]
    pub splice_site_protein_unknown: bool,
}

impl Default for AnnotationBuilderOptions {
    fn default() -> Self {
        Self {
            nt3_prime_shifting: true,
            up_down_stream_window: 5_000,
            splice_site_protein_unknown: false,
        }
    }
}

/// Build the annotation of `variant` on `tx`.
pub fn build_annotation(
    tx: &TranscriptModel,
    variant: &GenomeVariant,
    options: &AnnotationBuilderOptions,
) -> Result<Annotation, Error> {
    if variant.chrom() != tx.chrom {
        return Err(Error::InvalidGenomeChange(format!(
            "{} is not on the chromosome of {}",
            variant, tx.id
        )));
    }
    match variant.kind() {
        VariantKind::Snv => snv::build(tx, variant, options),
        VariantKind::Deletion => deletion::build(tx, variant, options),
        kind => Err(Error::UnsupportedVariant(format!(
            "no annotation builder for {} {}",
            kind, variant
        ))),
    }
}

/// Effects and protein change as computed by one branch of a builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Classification {
    pub effects: Vec<VariantEffect>,
    pub hgvs_p: Option<String>,
}

impl Classification {
    pub fn new(effects: Vec<VariantEffect>, hgvs_p: Option<&str>) -> Self {
        Self {
            effects,
            hgvs_p: hgvs_p.map(|s| s.to_string()),
        }
    }
}

/// State shared by the builders while annotating one variant.
pub(crate) struct AnnotationContext<'a> {
    pub tx: &'a TranscriptModel,
    /// The variant as given by the caller.
    pub variant: &'a GenomeVariant,
    /// The variant that is annotated, possibly shifted.
    pub change: GenomeVariant,
    pub options: &'a AnnotationBuilderOptions,
    pub projector: CoordinateProjector<'a>,
    pub so: SequenceOntology<'a>,
    pub messages: Vec<Message>,
}

impl<'a> AnnotationContext<'a> {
    pub fn new(
        tx: &'a TranscriptModel,
        variant: &'a GenomeVariant,
        options: &'a AnnotationBuilderOptions,
    ) -> Self {
        Self {
            tx,
            variant,
            change: variant.clone(),
            options,
            projector: CoordinateProjector::new(tx),
            so: SequenceOntology::new(tx),
            messages: Vec::new(),
        }
    }

    /// Interval of the annotated change.
    pub fn interval(&self) -> GenomeInterval {
        self.change.interval()
    }

    /// Orient the allele to the transcript strand.
    pub fn oriented(&self, allele: &str) -> String {
        match self.tx.strand {
            Strand::Plus => allele.to_string(),
            Strand::Minus => revcomp(allele),
        }
    }

    /// First and last 0-based position of the change in transcript orientation.
    pub fn first_last_pos0(&self) -> (i32, i32) {
        let iv = self.interval();
        match self.tx.strand {
            Strand::Plus => (iv.begin, iv.end - 1),
            Strand::Minus => (iv.end - 1, iv.begin),
        }
    }

    /// Format a 0-based genome position as HGVS transcript position, e.g., `-3`, `10+5`, `*4`.
    pub fn hgvs_pos(&self, pos0: i32) -> String {
        let tx = self.tx;
        let cds_begin = tx.cds_offset() as i32;
        let cds_end = cds_begin + tx.cds_length();
        let fmt = |tx_pos: i32| {
            if !tx.is_coding() {
                format!("{}", tx_pos + 1)
            } else if tx_pos < cds_begin {
                format!("-{}", cds_begin - tx_pos)
            } else if tx_pos >= cds_end {
                format!("*{}", tx_pos - cds_end + 1)
            } else {
                format!("{}", tx_pos - cds_begin + 1)
            }
        };
        match self.projector.locate(pos0) {
            TxLocation::Exonic { tx_pos, .. } => fmt(tx_pos),
            TxLocation::Intronic {
                up_tx_pos,
                up_distance,
                down_tx_pos,
                down_distance,
                ..
            } => {
                if up_distance <= down_distance {
                    format!("{}+{}", fmt(up_tx_pos), up_distance)
                } else {
                    format!("{}-{}", fmt(down_tx_pos), down_distance)
                }
            }
            TxLocation::Upstream { distance } => format!("-{}", cds_begin + distance),
            TxLocation::Downstream { distance } => {
                let utr3_len = if tx.is_coding() {
                    tx.mrna_length() - cds_end
                } else {
                    0
                };
                format!("*{}", utr3_len + distance)
            }
        }
    }

    /// HGVS description of the changed transcript positions without prefix, e.g., `4_6`.
    pub fn hgvs_range(&self) -> String {
        let iv = self.interval();
        if iv.contains(&self.tx.tx_region) {
            return "(?_?)".to_string();
        }
        let (first, last) = self.first_last_pos0();
        if first == last {
            self.hgvs_pos(first)
        } else {
            format!("{}_{}", self.hgvs_pos(first), self.hgvs_pos(last))
        }
    }

    /// Transcript-level HGVS prefix.
    pub fn hgvs_prefix(&self) -> &'static str {
        if self.tx.is_coding() {
            "c."
        } else {
            "n."
        }
    }

    /// Exon or intron overlapped by the change, the 5'-most in transcript orientation.
    pub fn location(&self) -> Option<Location> {
        let iv = self.interval();
        let exon_total = self.tx.exon_count() as i32;
        let exon = (0..self.tx.exon_count())
            .filter(|idx| self.tx.exons[*idx].overlaps(&iv))
            .map(|idx| self.tx.exon_rank(idx))
            .min();
        if let Some(ord) = exon {
            return Some(Location::Exon(Rank {
                ord,
                total: exon_total,
            }));
        }
        self.tx
            .introns()
            .enumerate()
            .filter(|(_, intron)| intron.overlaps(&iv))
            .map(|(idx, _)| self.tx.intron_rank(idx))
            .min()
            .map(|ord| {
                Location::Intron(Rank {
                    ord,
                    total: exon_total - 1,
                })
            })
    }

    /// Splice effect of the change, the most specific one if any.
    pub fn splice_effect(&self) -> Option<VariantEffect> {
        let iv = self.interval();
        if self.so.overlaps_with_splice_donor_site(&iv) {
            Some(VariantEffect::SpliceDonorVariant)
        } else if self.so.overlaps_with_splice_acceptor_site(&iv) {
            Some(VariantEffect::SpliceAcceptorVariant)
        } else if self.so.overlaps_with_splice_region(&iv) {
            Some(VariantEffect::SpliceRegionVariant)
        } else {
            None
        }
    }

    /// Add the splice effect, if any, to `effects`.
    pub fn with_splice_effect(&self, mut effects: Vec<VariantEffect>) -> Vec<VariantEffect> {
        effects.extend(self.splice_effect());
        effects
    }

    /// Distance of the change to the transcribed region, `None` if overlapping.
    fn distance(&self) -> Option<i32> {
        let (iv, tx) = (self.interval(), &self.tx.tx_region);
        if iv.end <= tx.begin {
            Some(tx.begin - iv.end + 1)
        } else if iv.begin >= tx.end {
            Some(iv.begin - tx.end + 1)
        } else {
            None
        }
    }

    /// CDNA, CDS, and protein position of the first changed base in transcript orientation.
    fn positions(&self) -> (Option<Pos>, Option<Pos>, Option<Pos>) {
        let (first, _) = self.first_last_pos0();
        let tx_pos = match self.projector.locate(first) {
            TxLocation::Exonic { tx_pos, .. } => tx_pos,
            _ => return (None, None, None),
        };
        let cdna = Some(Pos {
            ord: tx_pos + 1,
            total: Some(self.tx.mrna_length()),
        });
        let cds_pos = tx_pos - self.tx.cds_offset() as i32;
        if !self.tx.is_coding() || cds_pos < 0 || cds_pos >= self.tx.cds_length() {
            return (cdna, None, None);
        }
        (
            cdna,
            Some(Pos {
                ord: cds_pos + 1,
                total: Some(self.tx.cds_length()),
            }),
            Some(Pos {
                ord: cds_pos / 3 + 1,
                total: Some(self.tx.cds_length() / 3),
            }),
        )
    }

    /// Warn about transcripts whose CDS is not a whole number of codons.
    pub fn check_cds_complete(&mut self) {
        if self.tx.cds_length() % 3 != 0 {
            self.messages.push(Message::WarningTranscriptIncomplete);
        }
    }

    /// Assemble the final annotation.
    pub fn finish(self, classification: Classification, hgvs_t: String) -> Annotation {
        let Classification {
            mut effects,
            mut hgvs_p,
        } = classification;
        effects.sort();
        effects.dedup();
        if self.options.splice_site_protein_unknown
            && hgvs_p.is_some()
            && effects.iter().any(|effect| effect.is_splice())
        {
            hgvs_p = Some("p.?".to_string());
        }
        let is_flanking = effects.iter().any(|effect| {
            matches!(
                effect,
                VariantEffect::UpstreamGeneVariant
                    | VariantEffect::DownstreamGeneVariant
                    | VariantEffect::IntergenicVariant
            )
        });
        let (tx_pos, cds_pos, protein_pos) = self.positions();
        let mut messages = self.messages.clone();
        messages.sort();
        messages.dedup();
        tracing::trace!(
            "{} on {}: {:?} {} {:?}",
            self.variant,
            self.tx.id,
            &effects,
            &hgvs_t,
            &hgvs_p
        );
        Annotation {
            transcript_id: self.tx.id.clone(),
            gene_symbol: self.tx.gene_symbol.clone(),
            is_coding: self.tx.is_coding(),
            variant: self.variant.clone(),
            location: if is_flanking { None } else { self.location() },
            distance: if is_flanking { self.distance() } else { None },
            effects,
            hgvs_t,
            hgvs_p,
            tx_pos,
            cds_pos,
            protein_pos,
            messages,
        }
    }

    /// Annotation for non-coding transcripts.
    ///
    /// `hgvs_suffix` is appended to the transcript positions, e.g., `del` or `A>G`.
    pub fn build_non_coding(self, hgvs_suffix: &str) -> Annotation {
        let iv = self.interval();
        let mut effects = Vec::new();
        if self.so.overlaps_with_exon(&iv) {
            effects.push(VariantEffect::NonCodingTranscriptExonVariant);
            if self.so.contains_exon(&iv) {
                effects.push(VariantEffect::TranscriptAblation);
            }
        } else if self.so.overlaps_with_intron(&iv) {
            effects.push(VariantEffect::NonCodingTranscriptIntronVariant);
        } else {
            return self.build_up_or_downstream(hgvs_suffix);
        }
        let effects = self.with_splice_effect(effects);
        let hgvs_t = format!("n.{}{}", self.hgvs_range(), hgvs_suffix);
        self.finish(Classification::new(effects, Some("p.?")), hgvs_t)
    }

    /// Annotation for deletions containing a whole exon.
    pub fn build_feature_ablation(self, hgvs_suffix: &str) -> Annotation {
        let hgvs_t = format!("{}{}{}", self.hgvs_prefix(), self.hgvs_range(), hgvs_suffix);
        self.finish(
            Classification::new(vec![VariantEffect::TranscriptAblation], Some("p.0?")),
            hgvs_t,
        )
    }

    /// Annotation for changes overlapping the start codon.
    pub fn build_start_loss(self, hgvs_suffix: &str) -> Annotation {
        let hgvs_t = format!("{}{}{}", self.hgvs_prefix(), self.hgvs_range(), hgvs_suffix);
        self.finish(
            Classification::new(vec![VariantEffect::StartLost], Some("p.0?")),
            hgvs_t,
        )
    }

    /// Annotation for changes in introns between coding exons.
    pub fn build_intronic(self, hgvs_suffix: &str) -> Annotation {
        let effects = self.with_splice_effect(vec![VariantEffect::IntronVariant]);
        let hgvs_t = format!("c.{}{}", self.hgvs_range(), hgvs_suffix);
        self.finish(Classification::new(effects, None), hgvs_t)
    }

    /// Annotation for changes in the UTRs, including their introns.
    pub fn build_utr(self, hgvs_suffix: &str) -> Annotation {
        let iv = self.interval();
        let mut effects = Vec::new();
        if self.so.overlaps_with_five_prime_utr(&iv) {
            effects.push(VariantEffect::FivePrimeUtrVariant);
        }
        if self.so.overlaps_with_three_prime_utr(&iv) {
            effects.push(VariantEffect::ThreePrimeUtrVariant);
        }
        if self.so.overlaps_with_intron(&iv) {
            effects.push(VariantEffect::IntronVariant);
        }
        let effects = self.with_splice_effect(effects);
        let hgvs_t = format!("c.{}{}", self.hgvs_range(), hgvs_suffix);
        self.finish(Classification::new(effects, None), hgvs_t)
    }

    /// Annotation for changes in the up- or downstream region, falling back to intergenic.
    pub fn build_up_or_downstream(self, hgvs_suffix: &str) -> Annotation {
        let iv = self.interval();
        let window = self.options.up_down_stream_window;
        let mut effects = Vec::new();
        if self.so.overlaps_with_upstream_region(&iv, window) {
            effects.push(VariantEffect::UpstreamGeneVariant);
        }
        if self.so.overlaps_with_downstream_region(&iv, window) {
            effects.push(VariantEffect::DownstreamGeneVariant);
        }
        if effects.is_empty() {
            return self.build_intergenic();
        }
        let hgvs_t = format!("{}{}{}", self.hgvs_prefix(), self.hgvs_range(), hgvs_suffix);
        self.finish(Classification::new(effects, None), hgvs_t)
    }

    /// Annotation for changes far away from the transcript, described on the genome.
    pub fn build_intergenic(self) -> Annotation {
        let iv = self.interval();
        let range = if iv.len() == 1 {
            format!("{}", iv.end)
        } else {
            format!("{}_{}", iv.begin + 1, iv.end)
        };
        let suffix = match self.change.kind() {
            VariantKind::Snv => format!("{}>{}", self.change.reference, self.change.alternative),
            _ => "del".to_string(),
        };
        let hgvs_t = format!("g.{}{}", range, suffix);
        self.finish(
            Classification::new(vec![VariantEffect::IntergenicVariant], None),
            hgvs_t,
        )
    }
}
