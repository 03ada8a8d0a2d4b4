//! Application of genome variants to transcript sequences.

use crate::error::Error;
use crate::reference::genome::{revcomp, GenomeVariant, Strand, VariantKind};
use crate::reference::projector::{CoordinateProjector, TxLocation};

/// Builds mutated transcript sequences.
#[derive(Debug, Clone)]
pub struct SequenceChangeHelper<'a, 'b> {
    projector: &'b CoordinateProjector<'a>,
}

impl<'a, 'b> SequenceChangeHelper<'a, 'b> {
    pub fn new(projector: &'b CoordinateProjector<'a>) -> Self {
        Self { projector }
    }

    /// Return the CDS-starting transcript sequence with `variant` applied.
    ///
    /// Deletions remove all exonic bases in the deleted interval that are not 5' of the CDS.  SNVs
    /// replace the base at the variant's position; the alternative allele is reverse-complemented
    /// for transcripts on the minus strand.
    pub fn cds_with_genome_variant(&self, variant: &GenomeVariant) -> Result<String, Error> {
        let tx = self.projector.transcript();
        let cds_offset = tx.cds_offset() as i32;
        let seq = self.projector.cds_starting_sequence();
        match variant.kind() {
            VariantKind::Deletion => {
                let iv = variant.interval();
                let mut deleted = (iv.begin..iv.end)
                    .filter_map(|pos0| match self.projector.locate(pos0) {
                        TxLocation::Exonic { tx_pos, .. } if tx_pos >= cds_offset => {
                            Some((tx_pos - cds_offset) as usize)
                        }
                        _ => None,
                    })
                    .collect::<Vec<_>>();
                deleted.sort_unstable();
                let mut result = String::with_capacity(seq.len());
                let mut deleted = deleted.into_iter().peekable();
                for (i, c) in seq.char_indices() {
                    if deleted.peek() == Some(&i) {
                        deleted.next();
                    } else {
                        result.push(c);
                    }
                }
                Ok(result)
            }
            VariantKind::Snv => {
                let tx_pos = self.projector.genome_to_transcript_pos(&variant.pos)?;
                let cds_pos = tx_pos - cds_offset;
                if cds_pos < 0 {
                    return Err(Error::InvalidGenomeChange(format!(
                        "{} lies 5' of the CDS of {}",
                        variant, tx.id
                    )));
                }
                let alt = match tx.strand {
                    Strand::Plus => variant.alternative.clone(),
                    Strand::Minus => revcomp(&variant.alternative),
                };
                let cds_pos = cds_pos as usize;
                Ok(format!("{}{}{}", &seq[..cds_pos], alt, &seq[cds_pos + 1..]))
            }
            kind => Err(Error::UnsupportedVariant(format!(
                "cannot apply {} {} to transcript sequence",
                kind, variant
            ))),
        }
    }
}
