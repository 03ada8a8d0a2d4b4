//! Annotation records and the vocabulary used in them.

use itertools::Itertools;
use parse_display::{Display, FromStr};
use strum::IntoEnumIterator;

use crate::reference::genome::GenomeVariant;

/// Putative impact level.
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
#[display(style = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PutativeImpact {
    High,
    Moderate,
    Low,
    Modifier,
}

/// Effect of a variant on a transcript.
///
/// The declaration order is the priority order, most severe first; sorting a list of effects
/// puts the most severe one in front.
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VariantEffect {
    TranscriptAblation,
    SpliceAcceptorVariant,
    SpliceDonorVariant,
    StopGained,
    FrameshiftElongation,
    FrameshiftTruncation,
    FrameshiftVariant,
    StopLost,
    StartLost,
    DisruptiveInframeDeletion,
    InframeDeletion,
    MissenseVariant,
    SpliceRegionVariant,
    StopRetainedVariant,
    SynonymousVariant,
    #[display("5_prime_UTR_variant")]
    #[serde(rename = "5_prime_UTR_variant")]
    FivePrimeUtrVariant,
    #[display("3_prime_UTR_variant")]
    #[serde(rename = "3_prime_UTR_variant")]
    ThreePrimeUtrVariant,
    NonCodingTranscriptExonVariant,
    NonCodingTranscriptIntronVariant,
    IntronVariant,
    UpstreamGeneVariant,
    DownstreamGeneVariant,
    IntergenicVariant,
}

impl From<VariantEffect> for PutativeImpact {
    fn from(val: VariantEffect) -> Self {
        match val {
            VariantEffect::TranscriptAblation
            | VariantEffect::SpliceAcceptorVariant
            | VariantEffect::SpliceDonorVariant
            | VariantEffect::StopGained
            | VariantEffect::FrameshiftElongation
            | VariantEffect::FrameshiftTruncation
            | VariantEffect::FrameshiftVariant
            | VariantEffect::StopLost
            | VariantEffect::StartLost => PutativeImpact::High,
            VariantEffect::DisruptiveInframeDeletion
            | VariantEffect::InframeDeletion
            | VariantEffect::MissenseVariant
            | VariantEffect::SpliceRegionVariant => PutativeImpact::Moderate,
            VariantEffect::StopRetainedVariant | VariantEffect::SynonymousVariant => {
                PutativeImpact::Low
            }
            VariantEffect::FivePrimeUtrVariant
            | VariantEffect::ThreePrimeUtrVariant
            | VariantEffect::NonCodingTranscriptExonVariant
            | VariantEffect::NonCodingTranscriptIntronVariant
            | VariantEffect::IntronVariant
            | VariantEffect::UpstreamGeneVariant
            | VariantEffect::DownstreamGeneVariant
            | VariantEffect::IntergenicVariant => PutativeImpact::Modifier,
        }
    }
}

impl VariantEffect {
    /// Return vector of all values of `VariantEffect`.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    pub fn impact(&self) -> PutativeImpact {
        PutativeImpact::from(*self)
    }

    pub fn is_splice(&self) -> bool {
        matches!(
            self,
            VariantEffect::SpliceAcceptorVariant
                | VariantEffect::SpliceDonorVariant
                | VariantEffect::SpliceRegionVariant
        )
    }
}

/// Encode exon/intron rank.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    FromStr,
    Default,
    serde::Deserialize,
    serde::Serialize,
)]
#[display("{ord}/{total}")]
pub struct Rank {
    pub ord: i32,
    pub total: i32,
}

/// Exon or intron that a variant is located in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, FromStr, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    #[display("exon{0}")]
    Exon(Rank),
    #[display("intron{0}")]
    Intron(Rank),
}

impl Location {
    pub fn rank(&self) -> Rank {
        match self {
            Location::Exon(rank) | Location::Intron(rank) => *rank,
        }
    }
}

/// Position, optionally with total length.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    serde::Deserialize,
    serde::Serialize,
)]
pub struct Pos {
    pub ord: i32,
    pub total: Option<i32>,
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(total) = self.total {
            write!(f, "{}/{}", self.ord, total)
        } else {
            write!(f, "{}", self.ord)
        }
    }
}

/// Non-fatal remark attached to an annotation.
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
    FromStr,
    serde::Deserialize,
    serde::Serialize,
)]
#[display(style = "SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// The transcript base differs from the variant's reference allele.
    WarningRefDoesNotMatchGenome,
    /// The CDS length is not a multiple of three.
    WarningTranscriptIncomplete,
    /// The variant was shifted towards the 3' end of the transcript.
    InfoRealignThreePrime,
}

/// Result of annotating one variant with one transcript.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Annotation {
    /// Identifier of the transcript.
    pub transcript_id: String,
    pub gene_symbol: Option<String>,
    /// Whether the transcript is protein coding.
    pub is_coding: bool,
    /// The annotated variant.
    pub variant: GenomeVariant,
    /// Effects in priority order, most severe first.
    pub effects: Vec<VariantEffect>,
    /// Exon or intron rank of the variant.
    pub location: Option<Location>,
    /// HGVS description of the nucleotide change, e.g., `c.4_6del`.
    pub hgvs_t: String,
    /// HGVS description of the protein change, e.g., `p.Leu2del`.
    pub hgvs_p: Option<String>,
    /// 1-based cDNA position.
    pub tx_pos: Option<Pos>,
    /// 1-based CDS position.
    pub cds_pos: Option<Pos>,
    /// 1-based protein position.
    pub protein_pos: Option<Pos>,
    /// Distance to the transcript for up- and downstream variants.
    pub distance: Option<i32>,
    pub messages: Vec<Message>,
}

impl Annotation {
    /// The most severe effect.
    pub fn most_severe_effect(&self) -> Option<VariantEffect> {
        self.effects.iter().min().copied()
    }

    /// Impact of the most severe effect.
    pub fn putative_impact(&self) -> PutativeImpact {
        self.most_severe_effect()
            .map(PutativeImpact::from)
            .unwrap_or(PutativeImpact::Modifier)
    }
}

fn fmt_opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// Renders the annotation in the style of an `ANN` field entry.
impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let allele = if self.variant.alternative.is_empty() {
            "-"
        } else {
            self.variant.alternative.as_str()
        };
        let effects = self.effects.iter().join("&");
        let biotype = if self.is_coding { "Coding" } else { "Noncoding" };
        let rank = self.location.map(|l| l.rank());
        let messages = self.messages.iter().join("&");
        write!(
            f,
            "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            allele,
            effects,
            self.putative_impact(),
            self.gene_symbol.as_deref().unwrap_or_default(),
            self.transcript_id,
            biotype,
            fmt_opt(&rank),
            self.hgvs_t,
            self.hgvs_p.as_deref().unwrap_or_default(),
            fmt_opt(&self.tx_pos),
            fmt_opt(&self.cds_pos),
            fmt_opt(&self.protein_pos),
            fmt_opt(&self.distance),
            messages,
        )
    }
}
