//! Projection between genome, transcript, and CDS coordinates.
//!
//! Internally, positions are converted into "oriented" coordinates that increase in transcript
//! direction: the 0-based genome position on the plus strand and its negation on the minus
//! strand.  This keeps all interval logic strand-agnostic.

use crate::error::ProjectionError;
use crate::reference::genome::{GenomeInterval, GenomePosition, Strand};
use crate::reference::transcript::TranscriptModel;

/// A 0-based position in the coding sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CdsPosition {
    /// 0-based position in the CDS-starting transcript sequence.
    pub pos: i32,
    /// Distance from the projected position to `pos` if the position had to be moved, e.g., when
    /// lying in an intron or before the CDS.
    pub offset: i32,
}

impl CdsPosition {
    /// Offset of the position within its codon.
    pub fn frameshift(&self) -> i32 {
        self.pos % 3
    }

    /// 0-based index of the codon containing the position.
    pub fn codon(&self) -> i32 {
        self.pos / 3
    }
}

/// Location of a genome position relative to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxLocation {
    /// 5' of the transcript; `distance` is 1 for the adjacent position.
    Upstream { distance: i32 },
    /// 3' of the transcript; `distance` is 1 for the adjacent position.
    Downstream { distance: i32 },
    /// Within the exon with the given genome-order index.
    Exonic { tx_pos: i32, exon_idx: usize },
    /// Within the intron with the given genome-order index.
    ///
    /// `up_tx_pos` is the last exonic transcript position before the intron and `down_tx_pos`
    /// the first one after it; the distances are counted from these positions.
    Intronic {
        intron_idx: usize,
        up_tx_pos: i32,
        up_distance: i32,
        down_tx_pos: i32,
        down_distance: i32,
    },
}

/// Exon in oriented coordinates together with its offset in the transcript.
#[derive(Debug, Clone, Copy)]
struct OrientedExon {
    begin: i32,
    end: i32,
    tx_offset: i32,
}

/// Coordinate projection for one transcript.
#[derive(Debug, Clone)]
pub struct CoordinateProjector<'a> {
    tx: &'a TranscriptModel,
    /// Exons in transcript order.
    exons: Vec<OrientedExon>,
}

impl<'a> CoordinateProjector<'a> {
    pub fn new(tx: &'a TranscriptModel) -> Self {
        let mut tx_offset = 0;
        let mut exons = Vec::with_capacity(tx.exons.len());
        let ordered: Box<dyn Iterator<Item = &GenomeInterval>> = match tx.strand {
            Strand::Plus => Box::new(tx.exons.iter()),
            Strand::Minus => Box::new(tx.exons.iter().rev()),
        };
        for exon in ordered {
            let (begin, end) = match tx.strand {
                Strand::Plus => (exon.begin, exon.end),
                Strand::Minus => (1 - exon.end, 1 - exon.begin),
            };
            exons.push(OrientedExon {
                begin,
                end,
                tx_offset,
            });
            tx_offset += end - begin;
        }
        Self { tx, exons }
    }

    pub fn transcript(&self) -> &'a TranscriptModel {
        self.tx
    }

    fn orient(&self, pos0: i32) -> i32 {
        match self.tx.strand {
            Strand::Plus => pos0,
            Strand::Minus => -pos0,
        }
    }

    fn exon_idx(&self, oriented_idx: usize) -> usize {
        match self.tx.strand {
            Strand::Plus => oriented_idx,
            Strand::Minus => self.exons.len() - 1 - oriented_idx,
        }
    }

    fn intron_idx(&self, oriented_idx: usize) -> usize {
        match self.tx.strand {
            Strand::Plus => oriented_idx,
            Strand::Minus => self.exons.len() - 2 - oriented_idx,
        }
    }

    /// Locate the 0-based genome position `pos0` relative to the transcript.
    pub fn locate(&self, pos0: i32) -> TxLocation {
        let o = self.orient(pos0);
        // Both are present as a transcript has at least one exon.
        let (first, last) = (self.exons[0], self.exons[self.exons.len() - 1]);
        if o < first.begin {
            return TxLocation::Upstream {
                distance: first.begin - o,
            };
        }
        if o >= last.end {
            return TxLocation::Downstream {
                distance: o - last.end + 1,
            };
        }
        let idx = self.exons.partition_point(|exon| exon.end <= o);
        let exon = self.exons[idx];
        if exon.begin <= o {
            TxLocation::Exonic {
                tx_pos: exon.tx_offset + o - exon.begin,
                exon_idx: self.exon_idx(idx),
            }
        } else {
            let prev = self.exons[idx - 1];
            TxLocation::Intronic {
                intron_idx: self.intron_idx(idx - 1),
                up_tx_pos: prev.tx_offset + prev.end - prev.begin - 1,
                up_distance: o - prev.end + 1,
                down_tx_pos: exon.tx_offset,
                down_distance: exon.begin - o,
            }
        }
    }

    /// Project exonic genome position to 0-based transcript position.
    pub fn genome_to_transcript_pos(&self, pos: &GenomePosition) -> Result<i32, ProjectionError> {
        match self.locate(pos.pos0()) {
            TxLocation::Exonic { tx_pos, .. } => Ok(tx_pos),
            TxLocation::Intronic { intron_idx, .. } => Err(ProjectionError::Intronic {
                tx_id: self.tx.id.clone(),
                pos: pos.pos,
                intron: intron_idx,
            }),
            TxLocation::Upstream { .. } | TxLocation::Downstream { .. } => {
                Err(ProjectionError::OutsideTranscript {
                    tx_id: self.tx.id.clone(),
                    pos: pos.pos,
                })
            }
        }
    }

    /// Project 0-based transcript position back to the genome.
    pub fn transcript_to_genome_pos(&self, tx_pos: i32) -> Result<GenomePosition, ProjectionError> {
        let exon = self
            .exons
            .iter()
            .find(|exon| {
                exon.tx_offset <= tx_pos && tx_pos < exon.tx_offset + exon.end - exon.begin
            })
            .ok_or_else(|| ProjectionError::OutsideSequence {
                tx_id: self.tx.id.clone(),
                pos: tx_pos,
                len: self.tx.mrna_length(),
            })?;
        let o = exon.begin + tx_pos - exon.tx_offset;
        Ok(GenomePosition::new(self.tx.chrom, self.orient(o) + 1))
    }

    /// Project exonic genome position to CDS position.
    ///
    /// Positions in the 5' UTR are saturated to `0` with the (negative) distance in `offset`.
    pub fn genome_to_cds_pos(&self, pos: &GenomePosition) -> Result<CdsPosition, ProjectionError> {
        let cds_pos = self.genome_to_transcript_pos(pos)? - self.tx.cds_offset() as i32;
        Ok(if cds_pos < 0 {
            CdsPosition {
                pos: 0,
                offset: cds_pos,
            }
        } else {
            CdsPosition {
                pos: cds_pos,
                offset: 0,
            }
        })
    }

    /// Project any genome position to a CDS position.
    ///
    /// Intronic positions are moved to the first position of the following exon (in transcript
    /// orientation), positions outside of the transcript to its first or behind its last base.
    pub fn project_genome_to_cds_pos(&self, pos: &GenomePosition) -> CdsPosition {
        let (tx_pos, offset) = match self.locate(pos.pos0()) {
            TxLocation::Exonic { tx_pos, .. } => (tx_pos, 0),
            TxLocation::Intronic {
                down_tx_pos,
                down_distance,
                ..
            } => (down_tx_pos, down_distance),
            TxLocation::Upstream { distance } => (0, distance),
            TxLocation::Downstream { distance } => (self.tx.mrna_length(), -distance),
        };
        let cds_pos = tx_pos - self.tx.cds_offset() as i32;
        if cds_pos < 0 {
            CdsPosition {
                pos: 0,
                offset: offset + cds_pos,
            }
        } else {
            CdsPosition {
                pos: cds_pos,
                offset,
            }
        }
    }

    /// Transcript sequence starting at the first CDS base.
    pub fn cds_starting_sequence(&self) -> &'a str {
        self.tx.cds_starting_sequence()
    }
}
