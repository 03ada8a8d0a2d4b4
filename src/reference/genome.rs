//! Positions, intervals, and variants on the genome.

use std::str::FromStr;

use nom::{
    bytes::complete::{tag, take_while, take_while1},
    character::complete::digit1,
    combinator::{all_consuming, map_res},
    IResult, Parser,
};
use parse_display::{Display, FromStr};

use crate::common::contig;
use crate::error::Error;

/// Strand of a transcript.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    FromStr,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Strand {
    #[display("+")]
    #[serde(rename = "+")]
    Plus,
    #[display("-")]
    #[serde(rename = "-")]
    Minus,
}

/// A 1-based position on the forward strand of a chromosome.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct GenomePosition {
    /// Chromosome number, see [`crate::common::contig`].
    pub chrom: u32,
    /// 1-based position.
    pub pos: i32,
}

impl GenomePosition {
    pub fn new(chrom: u32, pos: i32) -> Self {
        Self { chrom, pos }
    }

    /// The 0-based coordinate of the position.
    pub fn pos0(&self) -> i32 {
        self.pos - 1
    }
}

impl std::fmt::Display for GenomePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", contig::chrom_name(self.chrom), self.pos)
    }
}

/// A half-open, 0-based interval `[begin, end)` on the forward strand of a chromosome.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct GenomeInterval {
    pub chrom: u32,
    pub begin: i32,
    pub end: i32,
}

impl GenomeInterval {
    pub fn new(chrom: u32, begin: i32, end: i32) -> Self {
        Self { chrom, begin, end }
    }

    /// Construct from 1-based, fully closed coordinates.
    pub fn from_closed(chrom: u32, start: i32, end: i32) -> Self {
        Self::new(chrom, start - 1, end)
    }

    pub fn len(&self) -> i32 {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }

    /// Whether the 0-based position `pos0` lies in the interval.
    pub fn contains_pos(&self, pos0: i32) -> bool {
        self.begin <= pos0 && pos0 < self.end
    }

    /// Whether `other` lies completely within `self`.
    pub fn contains(&self, other: &GenomeInterval) -> bool {
        self.chrom == other.chrom && self.begin <= other.begin && other.end <= self.end
    }

    /// Whether the two intervals share at least one position.
    pub fn overlaps(&self, other: &GenomeInterval) -> bool {
        self.chrom == other.chrom && self.overlaps_range(other.begin, other.end)
    }

    /// Whether the interval shares at least one position with `[begin, end)`.
    pub fn overlaps_range(&self, begin: i32, end: i32) -> bool {
        self.begin < end && begin < self.end
    }

    /// Return the interval moved by `delta` positions.
    pub fn shifted(&self, delta: i32) -> Self {
        Self::new(self.chrom, self.begin + delta, self.end + delta)
    }

    /// Intersection of the two intervals, if not empty.
    pub fn intersection(&self, other: &GenomeInterval) -> Option<GenomeInterval> {
        let begin = std::cmp::max(self.begin, other.begin);
        let end = std::cmp::min(self.end, other.end);
        (self.chrom == other.chrom && begin < end).then(|| Self::new(self.chrom, begin, end))
    }
}

impl std::fmt::Display for GenomeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}",
            contig::chrom_name(self.chrom),
            self.begin + 1,
            self.end
        )
    }
}

/// The kind of a genome variant, derived from allele lengths.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    FromStr,
    serde::Serialize,
    serde::Deserialize,
    strum::EnumIter,
)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// Single-nucleotide substitution.
    Snv,
    /// Deletion of one or more nucleotides.
    Deletion,
    /// Insertion of one or more nucleotides.
    Insertion,
    /// Block substitution of several nucleotides.
    Mnv,
}

/// Accepted characters in alleles.
const ALLELE_ALPHABET: &str = "ACGTN";

/// A variant on the forward strand of the genome.
///
/// `pos` gives the first reference base.  Deletions have an empty `alternative`; insertions
/// have an empty `reference` and are placed between `pos - 1` and `pos`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GenomeVariant {
    pub pos: GenomePosition,
    pub reference: String,
    pub alternative: String,
}

impl GenomeVariant {
    /// Construct a new variant, validating the alleles.
    pub fn new(chrom: u32, pos: i32, reference: &str, alternative: &str) -> Result<Self, Error> {
        let reference = reference.to_ascii_uppercase();
        let alternative = alternative.to_ascii_uppercase();
        if let Some(c) = reference
            .chars()
            .chain(alternative.chars())
            .find(|c| !ALLELE_ALPHABET.contains(*c))
        {
            return Err(Error::InvalidVariant(format!(
                "invalid character {:?} in allele {}>{}",
                c, reference, alternative
            )));
        }
        if reference == alternative {
            return Err(Error::InvalidVariant(format!(
                "reference and alternative allele are identical: {:?}",
                reference
            )));
        }
        if pos < 1 {
            return Err(Error::InvalidVariant(format!(
                "position must be 1-based but was {}",
                pos
            )));
        }
        Ok(Self {
            pos: GenomePosition::new(chrom, pos),
            reference,
            alternative,
        })
    }

    pub fn chrom(&self) -> u32 {
        self.pos.chrom
    }

    pub fn kind(&self) -> VariantKind {
        match (self.reference.len(), self.alternative.len()) {
            (1, 1) => VariantKind::Snv,
            (_, 0) => VariantKind::Deletion,
            (0, _) => VariantKind::Insertion,
            _ => VariantKind::Mnv,
        }
    }

    /// The affected reference interval.
    pub fn interval(&self) -> GenomeInterval {
        let begin = self.pos.pos0();
        GenomeInterval::new(self.pos.chrom, begin, begin + self.reference.len() as i32)
    }

    fn parse(input: &str) -> IResult<&str, (&str, i32, &str, &str)> {
        let chrom = take_while1(|c: char| c != ':');
        let pos = map_res(digit1, |s: &str| s.parse::<i32>());
        let allele = || take_while(|c: char| c != ':');
        all_consuming((chrom, tag(":"), pos, tag(":"), allele(), tag(":"), allele()))
            .map(|(chrom, _, pos, _, reference, _, alternative)| {
                (chrom, pos, reference, alternative)
            })
            .parse(input)
    }
}

impl std::fmt::Display for GenomeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            contig::chrom_name(self.pos.chrom),
            self.pos.pos,
            self.reference,
            self.alternative
        )
    }
}

impl FromStr for GenomeVariant {
    type Err = Error;

    /// Parse from `CHROM:POS:REF:ALT`, e.g., `chr1:103:A:G` or `1:106:TTA:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, (chrom, pos, reference, alternative)) =
            Self::parse(s).map_err(|e| Error::InvalidVariant(format!("{}: {}", s, e)))?;
        let chrom = contig::chrom_no(chrom)
            .ok_or_else(|| Error::InvalidVariant(format!("unknown chromosome {:?}", chrom)))?;
        Self::new(chrom, pos, reference, alternative)
    }
}

/// Reverse-complement a nucleotide string.
pub fn revcomp(seq: &str) -> String {
    String::from_utf8_lossy(&bio::alphabets::dna::revcomp(seq.as_bytes())).into_owned()
}
