//! Annotation of single nucleotide variants.

use crate::annotate::seqvars::ann::{Annotation, Message, VariantEffect};
use crate::error::Error;
use crate::reference::genome::{GenomeVariant, VariantKind};
use crate::reference::seq_change::SequenceChangeHelper;
use crate::reference::transcript::TranscriptModel;
use crate::reference::translator;

use super::{AnnotationBuilderOptions, AnnotationContext, Classification};

/// Build the annotation of the SNV `variant` on `tx`.
pub fn build(
    tx: &TranscriptModel,
    variant: &GenomeVariant,
    options: &AnnotationBuilderOptions,
) -> Result<Annotation, Error> {
    if variant.kind() != VariantKind::Snv {
        return Err(Error::InvalidGenomeChange(format!(
            "{} does not describe a SNV",
            variant
        )));
    }

    let ctx = AnnotationContext::new(tx, variant, options);
    let suffix = format!(
        "{}>{}",
        ctx.oriented(&variant.reference),
        ctx.oriented(&variant.alternative)
    );
    if !tx.is_coding() {
        return Ok(ctx.build_non_coding(&suffix));
    }

    let iv = ctx.interval();
    Ok(
        if ctx.so.lies_in_cds_exon(&iv) && tx.cds_region.contains(&iv) {
            build_cds_exonic(ctx)?
        } else if ctx.so.overlaps_with_cds_intron(&iv) && ctx.so.overlaps_with_cds(&iv) {
            ctx.build_intronic(&suffix)
        } else if ctx.so.overlaps_with_five_prime_utr(&iv)
            || ctx.so.overlaps_with_three_prime_utr(&iv)
        {
            ctx.build_utr(&suffix)
        } else {
            ctx.build_up_or_downstream(&suffix)
        },
    )
}

/// Annotation of SNVs within the coding part of an exon.
///
/// The wild type codon is taken from the transcript so transcripts that differ from the
/// reference genome are described relative to the transcript.
fn build_cds_exonic(mut ctx: AnnotationContext<'_>) -> Result<Annotation, Error> {
    let tx = ctx.tx;
    let tx_pos = ctx.projector.genome_to_transcript_pos(&ctx.change.pos)? as usize;
    let cds_pos = ctx.projector.genome_to_cds_pos(&ctx.change.pos)?;
    ctx.check_cds_complete();

    let seq = tx.sequence.as_bytes();
    let ref_base = ctx.oriented(&ctx.change.reference).as_bytes()[0];
    let alt_base = ctx.oriented(&ctx.change.alternative).as_bytes()[0];
    let tx_base = seq.get(tx_pos).copied().unwrap_or(b'N');
    if tx_base != ref_base {
        ctx.messages.push(Message::WarningRefDoesNotMatchGenome);
    }

    let frame = cds_pos.frameshift() as usize;
    let codon_start = tx_pos - frame;
    let wt_codon = (codon_start..codon_start + 3)
        .map(|i| seq.get(i).copied().unwrap_or(b'N'))
        .collect::<Vec<_>>();
    let mut var_codon = wt_codon.clone();
    var_codon[frame] = alt_base;
    let wt_aa = translator::translate_codon(&wt_codon);
    let var_aa = translator::translate_codon(&var_codon);
    let aa_pos = cds_pos.codon();

    let iv = ctx.interval();
    let classification = if ctx.so.overlaps_with_translational_start_site(&iv) {
        Classification::new(vec![VariantEffect::StartLost], Some("p.0?"))
    } else if wt_aa == var_aa {
        let effect = if ctx.so.overlaps_with_translational_stop_site(&iv) {
            VariantEffect::StopRetainedVariant
        } else {
            VariantEffect::SynonymousVariant
        };
        Classification::new(vec![effect], Some("p.="))
    } else if wt_aa == b'*' {
        let var_cds =
            SequenceChangeHelper::new(&ctx.projector).cds_with_genome_variant(&ctx.change)?;
        let var_protein = translator::translate(&var_cds);
        let stop = var_protein
            .get(aa_pos as usize..)
            .and_then(|tail| tail.find('*'))
            .map(|dist| format!("*{}", dist))
            .unwrap_or_else(|| "*?".to_string());
        Classification::new(
            vec![VariantEffect::StopLost],
            Some(&*format!(
                "p.*{}{}ext{}",
                aa_pos + 1,
                translator::to_long(var_aa),
                stop
            )),
        )
    } else if var_aa == b'*' {
        Classification::new(
            vec![VariantEffect::StopGained],
            Some(&*format!("p.{}{}*", translator::to_long(wt_aa), aa_pos + 1)),
        )
    } else {
        Classification::new(
            vec![VariantEffect::MissenseVariant],
            Some(&*format!(
                "p.{}{}{}",
                translator::to_long(wt_aa),
                aa_pos + 1,
                translator::to_long(var_aa)
            )),
        )
    };
    let classification = Classification {
        effects: ctx.with_splice_effect(classification.effects),
        ..classification
    };

    let hgvs_t = format!(
        "c.{}{}>{}",
        ctx.hgvs_range(),
        tx_base as char,
        alt_base as char
    );
    Ok(ctx.finish(classification, hgvs_t))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::annotate::seqvars::ann::{Location, Pos, Rank};
    use crate::annotate::seqvars::builder::AnnotationBuilderOptionsBuilder;
    use crate::reference::fixtures;
    use crate::reference::genome::{GenomeInterval, Strand};

    fn annotate(tx: &TranscriptModel, variant: &str) -> Result<Annotation, anyhow::Error> {
        Ok(build(
            tx,
            &variant.parse()?,
            &AnnotationBuilderOptions::default(),
        )?)
    }

    /// Effects, transcript and protein HGVS.
    fn summary(ann: &Annotation) -> (Vec<VariantEffect>, String, Option<String>) {
        (ann.effects.clone(), ann.hgvs_t.clone(), ann.hgvs_p.clone())
    }

    #[rstest::rstest]
    #[case("1:103:A:G", &[VariantEffect::StartLost], "c.1A>G", "p.0?")]
    #[case("1:106:T:C", &[VariantEffect::SynonymousVariant], "c.4T>C", "p.=")]
    #[case("1:109:C:T", &[VariantEffect::StopGained], "c.7C>T", "p.Gln3*")]
    #[case("1:112:G:C", &[VariantEffect::MissenseVariant], "c.10G>C", "p.Asp4His")]
    #[case("1:195:A:G", &[VariantEffect::StopRetainedVariant], "c.93A>G", "p.=")]
    #[case("1:193:T:C", &[VariantEffect::StopLost], "c.91T>C", "p.*31Glnext*?")]
    fn cds_single_exon(
        #[case] variant: &str,
        #[case] effects: &[VariantEffect],
        #[case] hgvs_t: &str,
        #[case] hgvs_p: &str,
    ) -> Result<(), anyhow::Error> {
        let ann = annotate(&fixtures::tx_single_exon(), variant)?;

        assert_eq!(
            summary(&ann),
            (
                effects.to_vec(),
                hgvs_t.to_string(),
                Some(hgvs_p.to_string())
            )
        );
        assert_eq!(ann.location, Some(Location::Exon(Rank { ord: 1, total: 1 })));
        assert!(ann.messages.is_empty());

        Ok(())
    }

    #[test]
    fn cds_positions() -> Result<(), anyhow::Error> {
        let ann = annotate(&fixtures::tx_single_exon(), "1:112:G:C")?;

        assert_eq!(
            (ann.tx_pos, ann.cds_pos, ann.protein_pos),
            (
                Some(Pos {
                    ord: 13,
                    total: Some(100)
                }),
                Some(Pos {
                    ord: 10,
                    total: Some(93)
                }),
                Some(Pos {
                    ord: 4,
                    total: Some(31)
                }),
            )
        );
        insta::assert_snapshot!(ann.to_string(), @"C|missense_variant|MODERATE|GENE1|tx_single|Coding|1/1|c.10G>C|p.Asp4His|13/100|10/93|4/31||");

        Ok(())
    }

    #[test]
    fn cds_stop_lost_with_downstream_stop() -> Result<(), anyhow::Error> {
        // TAA GCG CTA A...: the next in-frame stop is two codons further.
        let tx = TranscriptModel::new(
            "tx_ext",
            None,
            Strand::Plus,
            GenomeInterval::from_closed(1, 1, 18),
            GenomeInterval::from_closed(1, 1, 9),
            vec![GenomeInterval::from_closed(1, 1, 18)],
            "ATGGCTTAAGCGTAGAAA",
        )?;
        let ann = annotate(&tx, "1:7:T:C")?;

        assert_eq!(
            summary(&ann),
            (
                vec![VariantEffect::StopLost],
                "c.7T>C".to_string(),
                Some("p.*3Glnext*2".to_string())
            )
        );

        Ok(())
    }

    #[test]
    fn cds_reference_mismatch() -> Result<(), anyhow::Error> {
        let ann = annotate(&fixtures::tx_single_exon(), "1:106:G:C")?;

        assert_eq!(
            summary(&ann),
            (
                vec![VariantEffect::SynonymousVariant],
                "c.4T>C".to_string(),
                Some("p.=".to_string())
            )
        );
        assert_eq!(ann.messages, vec![Message::WarningRefDoesNotMatchGenome]);

        Ok(())
    }

    #[test]
    fn cds_incomplete_transcript() -> Result<(), anyhow::Error> {
        let reference = fixtures::tx_single_exon();
        let tx = TranscriptModel::new(
            "tx_incomplete",
            None,
            Strand::Plus,
            reference.tx_region,
            GenomeInterval::from_closed(1, 103, 194),
            reference.exons.clone(),
            &reference.sequence,
        )?;
        let ann = annotate(&tx, "1:106:T:C")?;

        assert_eq!(ann.effects, vec![VariantEffect::SynonymousVariant]);
        assert_eq!(ann.messages, vec![Message::WarningTranscriptIncomplete]);

        Ok(())
    }

    #[rstest::rstest]
    #[case(
        "1:1020:C:A",
        &[VariantEffect::MissenseVariant, VariantEffect::SpliceRegionVariant],
        "c.10C>A",
        Some("p.Arg4Ser")
    )]
    #[case(
        "1:1101:G:T",
        &[VariantEffect::MissenseVariant, VariantEffect::SpliceRegionVariant],
        "c.11G>T",
        Some("p.Arg4Leu")
    )]
    #[case("1:1030:A:G", &[VariantEffect::IntronVariant], "c.10+10A>G", None)]
    #[case(
        "1:1025:A:G",
        &[VariantEffect::SpliceRegionVariant, VariantEffect::IntronVariant],
        "c.10+5A>G",
        None
    )]
    #[case(
        "1:1021:G:A",
        &[VariantEffect::SpliceDonorVariant, VariantEffect::IntronVariant],
        "c.10+1G>A",
        None
    )]
    #[case(
        "1:1100:A:G",
        &[VariantEffect::SpliceAcceptorVariant, VariantEffect::IntronVariant],
        "c.11-1A>G",
        None
    )]
    #[case("1:1005:A:G", &[VariantEffect::FivePrimeUtrVariant], "c.-6A>G", None)]
    #[case("1:1220:A:G", &[VariantEffect::ThreePrimeUtrVariant], "c.*6A>G", None)]
    fn three_exons_plus(
        #[case] variant: &str,
        #[case] effects: &[VariantEffect],
        #[case] hgvs_t: &str,
        #[case] hgvs_p: Option<&str>,
    ) -> Result<(), anyhow::Error> {
        let ann = annotate(&fixtures::tx_three_exons_plus(), variant)?;

        assert_eq!(
            summary(&ann),
            (
                effects.to_vec(),
                hgvs_t.to_string(),
                hgvs_p.map(|s| s.to_string())
            )
        );

        Ok(())
    }

    #[rstest::rstest]
    #[case("1:1210:G:T", &[VariantEffect::MissenseVariant], "c.5C>A", "p.Ala2Asp")]
    #[case("1:1205:G:A", &[VariantEffect::MissenseVariant], "c.10C>T", "p.Arg4Cys")]
    #[case("1:1213:A:G", &[VariantEffect::StartLost], "c.2T>C", "p.0?")]
    fn three_exons_minus(
        #[case] variant: &str,
        #[case] effects: &[VariantEffect],
        #[case] hgvs_t: &str,
        #[case] hgvs_p: &str,
    ) -> Result<(), anyhow::Error> {
        let ann = annotate(&fixtures::tx_three_exons_minus(), variant)?;

        assert_eq!(
            summary(&ann),
            (
                effects.to_vec(),
                hgvs_t.to_string(),
                Some(hgvs_p.to_string())
            )
        );
        assert_eq!(ann.location, Some(Location::Exon(Rank { ord: 1, total: 3 })));
        assert!(ann.messages.is_empty());

        Ok(())
    }

    #[test]
    fn splice_site_protein_unknown() -> Result<(), anyhow::Error> {
        let options = AnnotationBuilderOptionsBuilder::default()
            .splice_site_protein_unknown(true)
            .build()?;
        let tx = fixtures::tx_three_exons_plus();

        let ann = build(&tx, &"1:1020:C:A".parse()?, &options)?;
        assert_eq!(ann.hgvs_p.as_deref(), Some("p.?"));
        let ann = build(&tx, &"1:1014:G:T".parse()?, &options)?;
        assert_eq!(ann.hgvs_p.as_deref(), Some("p.Ala2Ser"));

        Ok(())
    }

    #[test]
    fn flanking_and_intergenic() -> Result<(), anyhow::Error> {
        let tx = fixtures::tx_single_exon();

        let ann = annotate(&tx, "1:90:A:G")?;
        assert_eq!(
            summary(&ann),
            (
                vec![VariantEffect::UpstreamGeneVariant],
                "c.-13A>G".to_string(),
                None
            )
        );
        assert_eq!((ann.location, ann.distance), (None, Some(10)));

        let ann = annotate(&tx, "1:205:A:G")?;
        assert_eq!(
            summary(&ann),
            (
                vec![VariantEffect::DownstreamGeneVariant],
                "c.*10A>G".to_string(),
                None
            )
        );
        assert_eq!(ann.distance, Some(6));

        let ann = annotate(&tx, "1:10000:A:G")?;
        assert_eq!(
            summary(&ann),
            (
                vec![VariantEffect::IntergenicVariant],
                "g.10000A>G".to_string(),
                None
            )
        );
        insta::assert_snapshot!(ann.to_string(), @"G|intergenic_variant|MODIFIER|GENE1|tx_single|Coding||g.10000A>G|||||9801|");

        Ok(())
    }

    #[test]
    fn flanking_minus_strand() -> Result<(), anyhow::Error> {
        let tx = fixtures::tx_three_exons_minus();

        let ann = annotate(&tx, "1:1250:A:G")?;
        assert_eq!(ann.effects, vec![VariantEffect::UpstreamGeneVariant]);
        assert_eq!(ann.hgvs_t, "c.-36T>C");
        let ann = annotate(&tx, "1:1000:A:G")?;
        assert_eq!(ann.effects, vec![VariantEffect::DownstreamGeneVariant]);
        assert_eq!(ann.hgvs_t, "c.*11T>C");

        Ok(())
    }

    #[test]
    fn non_coding() -> Result<(), anyhow::Error> {
        let tx = fixtures::tx_non_coding();

        let ann = annotate(&tx, "1:1005:A:G")?;
        assert_eq!(
            summary(&ann),
            (
                vec![VariantEffect::NonCodingTranscriptExonVariant],
                "n.5A>G".to_string(),
                Some("p.?".to_string())
            )
        );
        assert_eq!(ann.location, Some(Location::Exon(Rank { ord: 1, total: 3 })));

        let ann = annotate(&tx, "1:1050:A:G")?;
        assert_eq!(
            summary(&ann),
            (
                vec![VariantEffect::NonCodingTranscriptIntronVariant],
                "n.20+30A>G".to_string(),
                Some("p.?".to_string())
            )
        );
        assert_eq!(
            ann.location,
            Some(Location::Intron(Rank { ord: 1, total: 2 }))
        );

        let ann = annotate(&tx, "1:990:A:G")?;
        assert_eq!(
            summary(&ann),
            (
                vec![VariantEffect::UpstreamGeneVariant],
                "n.-11A>G".to_string(),
                None
            )
        );

        Ok(())
    }

    #[test]
    fn rejects_deletion() -> Result<(), anyhow::Error> {
        let result = build(
            &fixtures::tx_single_exon(),
            &"1:106:TTA:".parse()?,
            &AnnotationBuilderOptions::default(),
        );
        assert!(matches!(result, Err(Error::InvalidGenomeChange(_))));

        Ok(())
    }
}
