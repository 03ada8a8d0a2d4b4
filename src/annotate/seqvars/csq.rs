//! Compute molecular consequence of variants.

use std::sync::Arc;

use crate::annotate::seqvars::ann::Annotation;
use crate::annotate::seqvars::builder::{build_annotation, AnnotationBuilderOptions};
use crate::annotate::seqvars::provider::TranscriptDb;
use crate::common::contig;
use crate::error::Error;
use crate::reference::genome::{GenomeVariant, VariantKind};

/// A variant description how VCF would do it.
#[derive(Debug, PartialEq, Eq, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct VcfVariant {
    /// Chromosome name.
    pub chromosome: String,
    /// 1-based position on the chromosome of first base of `reference`.
    pub position: i32,
    /// Reference bases.
    pub reference: String,
    /// Alternative bases.
    pub alternative: String,
}

/// Configuration for consequence prediction.
#[derive(Debug, Clone, Default, derive_builder::Builder)]
#[builder(pattern = "immutable")]
pub struct Config {
    /// Options passed to the annotation builders.
    #[builder(default)]
    pub builder_options: AnnotationBuilderOptions,
}

/// Predicts the consequences of variants on the transcripts of a [`TranscriptDb`].
#[derive(Debug, Clone)]
pub struct ConsequencePredictor {
    /// The transcript database.
    db: Arc<TranscriptDb>,
    /// Configuration.
    config: Config,
}

impl ConsequencePredictor {
    pub fn new(db: Arc<TranscriptDb>, config: Config) -> Self {
        Self { db, config }
    }

    pub fn db(&self) -> &TranscriptDb {
        &self.db
    }

    /// Convert the VCF-style variant into a normalized [`GenomeVariant`].
    ///
    /// The common suffix of the alleles is trimmed first, then the common prefix.  Returns
    /// `Ok(None)` if the chromosome name is not known.
    pub fn normalize(&self, var: &VcfVariant) -> Result<Option<GenomeVariant>, anyhow::Error> {
        let Some(chrom) = contig::chrom_no(&var.chromosome) else {
            tracing::debug!("unknown chromosome {:?}", &var.chromosome);
            return Ok(None);
        };

        let reference = var.reference.to_ascii_uppercase();
        let alternative = var.alternative.to_ascii_uppercase();
        let mut reference = reference.as_bytes();
        let mut alternative = alternative.as_bytes();
        let mut position = var.position;

        while let ([.., r], [.., a]) = (reference, alternative) {
            if r != a {
                break;
            }
            reference = &reference[..reference.len() - 1];
            alternative = &alternative[..alternative.len() - 1];
        }
        while let ([r, ..], [a, ..]) = (reference, alternative) {
            if r != a {
                break;
            }
            reference = &reference[1..];
            alternative = &alternative[1..];
            position += 1;
        }

        Ok(Some(GenomeVariant::new(
            chrom,
            position,
            std::str::from_utf8(reference)?,
            std::str::from_utf8(alternative)?,
        )?))
    }

    /// Annotate `var` on all transcripts within the up/downstream window.
    ///
    /// Returns `Ok(None)` if the chromosome is unknown and an empty vector if no transcript
    /// is close enough.
    pub fn predict(&self, var: &VcfVariant) -> Result<Option<Vec<Annotation>>, anyhow::Error> {
        let Some(variant) = self.normalize(var)? else {
            return Ok(None);
        };
        match variant.kind() {
            VariantKind::Snv | VariantKind::Deletion => (),
            kind => {
                return Err(Error::UnsupportedVariant(format!(
                    "{} is of kind {}",
                    &variant, kind
                ))
                .into())
            }
        }

        let options = &self.config.builder_options;
        let txs = self
            .db
            .find_overlapping(&variant.interval(), options.up_down_stream_window);
        tracing::trace!("{} overlaps {} transcripts", &variant, txs.len());

        let annotations = txs
            .into_iter()
            .map(|tx| build_annotation(tx, &variant, options))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(annotations))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::reference::fixtures;

    fn predictor() -> ConsequencePredictor {
        let db = TranscriptDb::new(vec![
            fixtures::tx_single_exon(),
            fixtures::tx_three_exons_plus(),
            fixtures::tx_three_exons_minus(),
            fixtures::tx_non_coding(),
        ]);
        ConsequencePredictor::new(Arc::new(db), Config::default())
    }

    fn vcf_var(chromosome: &str, position: i32, reference: &str, alternative: &str) -> VcfVariant {
        VcfVariant {
            chromosome: chromosome.to_string(),
            position,
            reference: reference.to_string(),
            alternative: alternative.to_string(),
        }
    }

    #[rstest::rstest]
    #[case(vcf_var("chr1", 103, "A", "G"), "1:103:A:G")]
    #[case(vcf_var("1", 105, "GTTA", "G"), "1:106:TTA:")]
    #[case(vcf_var("1", 106, "TTAC", "C"), "1:106:TTA:")]
    #[case(vcf_var("chrX", 10, "cAGt", "cGt"), "X:11:A:")]
    #[case(vcf_var("MT", 10, "AC", "AG"), "MT:11:C:G")]
    #[case(vcf_var("1", 105, "G", "GA"), "1:106::A")]
    fn normalize(#[case] var: VcfVariant, #[case] expected: &str) -> Result<(), anyhow::Error> {
        let normalized = predictor().normalize(&var)?.map(|v| v.to_string());
        assert_eq!(normalized.as_deref(), Some(expected));

        Ok(())
    }

    #[test]
    fn normalize_unknown_chrom() -> Result<(), anyhow::Error> {
        assert_eq!(
            predictor().normalize(&vcf_var("chrUn_gl000220", 10, "A", "G"))?,
            None
        );

        Ok(())
    }

    #[test]
    fn normalize_identical_alleles() {
        assert!(predictor().normalize(&vcf_var("1", 10, "AC", "AC")).is_err());
    }

    #[test]
    fn predict_snv() -> Result<(), anyhow::Error> {
        let predictor = predictor();
        let annotations = predictor
            .predict(&vcf_var("chr1", 103, "A", "G"))?
            .unwrap_or_default();

        assert_eq!(
            annotations
                .iter()
                .map(|a| a.transcript_id.as_str())
                .collect::<Vec<_>>(),
            vec!["tx_single", "tx_plus", "tx_minus", "tx_nc"]
        );
        assert_eq!(annotations[0].hgvs_t, "c.1A>G");
        assert_eq!(annotations[0].hgvs_p.as_deref(), Some("p.0?"));

        Ok(())
    }

    #[test]
    fn predict_deletion_matches_builder() -> Result<(), anyhow::Error> {
        let predictor = predictor();
        let annotations = predictor
            .predict(&vcf_var("chr1", 105, "GTTA", "G"))?
            .unwrap_or_default();

        let variant = GenomeVariant::new(1, 106, "TTA", "")?;
        let expected = build_annotation(
            &fixtures::tx_single_exon(),
            &variant,
            &AnnotationBuilderOptions::default(),
        )?;
        assert_eq!(annotations.len(), 4);
        assert_eq!(annotations[0], expected);

        Ok(())
    }

    #[test]
    fn predict_respects_window() -> Result<(), anyhow::Error> {
        let db = predictor().db.clone();
        let config = ConfigBuilder::default()
            .builder_options(
                crate::annotate::seqvars::builder::AnnotationBuilderOptionsBuilder::default()
                    .up_down_stream_window(100)
                    .build()?,
            )
            .build()?;
        let predictor = ConsequencePredictor::new(db, config);

        let annotations = predictor
            .predict(&vcf_var("1", 150, "A", "G"))?
            .unwrap_or_default();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].transcript_id, "tx_single");

        Ok(())
    }

    #[test]
    fn predict_no_transcripts() -> Result<(), anyhow::Error> {
        let predictor = predictor();

        assert_eq!(
            predictor.predict(&vcf_var("chr2", 100, "A", "G"))?,
            Some(vec![])
        );
        assert_eq!(predictor.predict(&vcf_var("chrUn_x", 100, "A", "G"))?, None);

        Ok(())
    }

    #[test]
    fn predict_unsupported() {
        let predictor = predictor();

        let err = predictor
            .predict(&vcf_var("1", 105, "G", "GA"))
            .expect_err("insertions are not supported");
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnsupportedVariant(_))
        ));
        assert!(predictor.predict(&vcf_var("1", 105, "GT", "AC")).is_err());
    }
}
