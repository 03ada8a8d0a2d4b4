//! Annotation of deletions.

use crate::annotate::seqvars::ann::{Annotation, Message, VariantEffect};
use crate::error::Error;
use crate::reference::aa_change::AminoAcidChange;
use crate::reference::genome::{GenomePosition, GenomeVariant, Strand, VariantKind};
use crate::reference::projector::TxLocation;
use crate::reference::seq_change::SequenceChangeHelper;
use crate::reference::transcript::TranscriptModel;
use crate::reference::translator;

use super::{AnnotationBuilderOptions, AnnotationContext, Classification};

/// Build the annotation of the deletion `variant` on `tx`.
pub fn build(
    tx: &TranscriptModel,
    variant: &GenomeVariant,
    options: &AnnotationBuilderOptions,
) -> Result<Annotation, Error> {
    if variant.kind() != VariantKind::Deletion {
        return Err(Error::InvalidGenomeChange(format!(
            "{} does not describe a deletion",
            variant
        )));
    }

    let mut ctx = AnnotationContext::new(tx, variant, options);
    if options.nt3_prime_shifting {
        if let Some(shifted) = shift_three_prime(&ctx) {
            tracing::trace!("shifted {} to {} on {}", variant, shifted, tx.id);
            ctx.change = shifted;
            ctx.messages.push(Message::InfoRealignThreePrime);
        }
    }

    if !tx.is_coding() {
        return Ok(ctx.build_non_coding("del"));
    }

    let iv = ctx.interval();
    Ok(if ctx.so.contains_exon(&iv) {
        ctx.build_feature_ablation("del")
    } else if ctx.so.overlaps_with_translational_start_site(&iv) {
        ctx.build_start_loss("del")
    } else if ctx.so.overlaps_with_cds_exon(&iv) && ctx.so.overlaps_with_cds(&iv) {
        build_cds_exonic(ctx)?
    } else if ctx.so.overlaps_with_cds_intron(&iv) && ctx.so.overlaps_with_cds(&iv) {
        ctx.build_intronic("del")
    } else if ctx.so.overlaps_with_five_prime_utr(&iv) || ctx.so.overlaps_with_three_prime_utr(&iv)
    {
        ctx.build_utr("del")
    } else {
        ctx.build_up_or_downstream("del")
    })
}

/// Move a deletion within one exon as far towards the 3' end of the transcript as the
/// transcript sequence allows.
///
/// Returns `None` if the deletion does not lie within an exon or cannot be shifted.
fn shift_three_prime(ctx: &AnnotationContext<'_>) -> Option<GenomeVariant> {
    let tx = ctx.tx;
    let iv = ctx.interval();
    let exon = tx.exons.iter().find(|exon| exon.contains(&iv))?;
    let tx_pos = |pos0: i32| match ctx.projector.locate(pos0) {
        TxLocation::Exonic { tx_pos, .. } => Some(tx_pos as usize),
        _ => None,
    };
    let (first, _) = ctx.first_last_pos0();
    let start = tx_pos(first)?;
    let exon_end = match tx.strand {
        Strand::Plus => tx_pos(exon.end - 1)?,
        Strand::Minus => tx_pos(exon.begin)?,
    } + 1;

    let len = iv.len() as usize;
    let seq = tx.sequence.as_bytes();
    let mut shift = 0;
    while start + len + shift < exon_end && seq[start + shift] == seq[start + len + shift] {
        shift += 1;
    }
    if shift == 0 {
        return None;
    }

    let begin0 = match tx.strand {
        Strand::Plus => iv.begin + shift as i32,
        Strand::Minus => iv.begin - shift as i32,
    };
    let reference = ctx.oriented(&tx.sequence[start + shift..start + shift + len]);
    GenomeVariant::new(tx.chrom, begin0 + 1, &reference, "").ok()
}

/// Annotation of deletions affecting coding exons.
fn build_cds_exonic(mut ctx: AnnotationContext<'_>) -> Result<Annotation, Error> {
    ctx.check_cds_complete();
    let iv = ctx.interval();
    let chrom = ctx.tx.chrom;

    let wt_cds = ctx.projector.cds_starting_sequence();
    let var_cds =
        SequenceChangeHelper::new(&ctx.projector).cds_with_genome_variant(&ctx.change)?;
    let wt_aa = translator::translate(wt_cds);
    let var_aa = translator::translate(&var_cds);

    let (first, last) = ctx.first_last_pos0();
    let begin_pos = ctx
        .projector
        .project_genome_to_cds_pos(&GenomePosition::new(chrom, first + 1));
    let last_pos = ctx
        .projector
        .project_genome_to_cds_pos(&GenomePosition::new(chrom, last + 1));
    let begin_codon = begin_pos.codon() as usize;

    let var_stop = find_stop(&var_aa, begin_codon);
    let wt_end = std::cmp::min((last_pos.pos as usize + 3) / 3, wt_aa.len());
    let del_aa = wt_aa.get(begin_codon..wt_end).unwrap_or_default();
    let delta = if begin_pos.frameshift() == 0 { 0 } else { 1 };
    let var_end = std::cmp::min(begin_codon + delta, var_aa.len());
    let ins_aa = var_aa.get(begin_codon..var_end).unwrap_or_default();
    let aa_change = AminoAcidChange::new(begin_codon as i32, del_aa.to_string(), ins_aa.to_string())
        .truncate_both_sides()
        .normalize_deletion(&wt_aa);

    let mut effects = ctx.with_splice_effect(Vec::new());
    let hgvs_t = format!("c.{}del", ctx.hgvs_range());
    let stop_site = ctx.so.overlaps_with_translational_stop_site(&iv);
    if stop_site
        && aa_change.reference.is_empty()
        && aa_change.alternative.is_empty()
        && var_stop.is_some()
        && var_stop == find_stop(&wt_aa, begin_codon)
    {
        effects.push(VariantEffect::StopRetainedVariant);
        return Ok(ctx.finish(Classification::new(effects, Some("p.=")), hgvs_t));
    }
    if stop_site {
        effects.push(VariantEffect::StopLost);
    }

    let frameshift = ctx.change.reference.len() % 3 != 0;
    let hgvs_p = if frameshift {
        effects.push(match var_aa.len().cmp(&wt_aa.len()) {
            std::cmp::Ordering::Greater => VariantEffect::FrameshiftElongation,
            std::cmp::Ordering::Less => VariantEffect::FrameshiftTruncation,
            std::cmp::Ordering::Equal => VariantEffect::FrameshiftVariant,
        });
        frameshift_protein(aa_change, &wt_aa, &var_aa, var_stop, stop_site)
    } else {
        effects.push(if begin_pos.frameshift() == 0 {
            VariantEffect::InframeDeletion
        } else {
            VariantEffect::DisruptiveInframeDeletion
        });
        inframe_protein(&aa_change, &wt_aa, var_stop.is_some())
    };

    Ok(ctx.finish(Classification::new(effects, Some(hgvs_p.as_str())), hgvs_t))
}

/// 0-based position of the first stop codon at or after `from`.
fn find_stop(aa: &str, from: usize) -> Option<usize> {
    aa.get(from..)
        .and_then(|tail| tail.find('*'))
        .map(|idx| idx + from)
}

/// Long amino acid code at 0-based position `pos`, `Xaa` if out of range.
fn long_at(aa: &str, pos: i32) -> &'static str {
    let code = usize::try_from(pos)
        .ok()
        .and_then(|pos| aa.as_bytes().get(pos))
        .copied()
        .unwrap_or(translator::UNKNOWN_AA);
    translator::to_long(code)
}

/// Protein change of an in-frame deletion.
fn inframe_protein(aa_change: &AminoAcidChange, wt_aa: &str, has_stop: bool) -> String {
    if !has_stop {
        return "p.0?".to_string();
    }
    if aa_change.reference.is_empty() {
        return "p.=".to_string();
    }
    let suffix = if aa_change.alternative.is_empty() {
        String::new()
    } else {
        format!("ins{}", translator::to_long_str(&aa_change.alternative))
    };
    let (pos, last_pos) = (aa_change.pos, aa_change.last_pos());
    if pos == last_pos {
        format!("p.{}{}del{}", long_at(wt_aa, pos), pos + 1, suffix)
    } else {
        format!(
            "p.{}{}_{}{}del{}",
            long_at(wt_aa, pos),
            pos + 1,
            long_at(wt_aa, last_pos),
            last_pos + 1,
            suffix
        )
    }
}

/// Protein change of a frameshift deletion.
///
/// `var_stop` is the first stop codon of `var_aa` at or after the first changed codon.
fn frameshift_protein(
    mut aa_change: AminoAcidChange,
    wt_aa: &str,
    var_aa: &str,
    var_stop: Option<usize>,
    stop_lost: bool,
) -> String {
    loop {
        let first = aa_change.reference.as_bytes().first().copied();
        let var = var_aa.as_bytes().get(aa_change.pos as usize).copied();
        match (first, var) {
            (Some(first), Some(var)) if first == var => aa_change = aa_change.shift_right(),
            _ => break,
        }
    }

    let pos = aa_change.pos;
    let var_len = var_aa.len() as i32;
    if stop_lost && pos == var_len {
        return format!("p.*{}del?", pos + 1);
    }
    if pos >= var_len {
        return if aa_change.reference.len() <= 1 {
            format!("p.{}{}del", long_at(wt_aa, pos), pos + 1)
        } else {
            let last_pos = aa_change.last_pos();
            format!(
                "p.{}{}_{}{}del",
                long_at(wt_aa, pos),
                pos + 1,
                long_at(wt_aa, last_pos),
                last_pos + 1
            )
        };
    }

    let wt_is_stop = wt_aa.as_bytes().get(pos as usize) == Some(&b'*');
    let delta = if wt_is_stop { 0 } else { 1 };
    let suffix = var_stop
        .map(|stop| format!("*{}", stop as i32 - pos + delta))
        .unwrap_or_else(|| "*?".to_string());
    if stop_lost && wt_is_stop {
        format!("p.*{}{}ext{}", pos + 1, long_at(var_aa, pos), suffix)
    } else {
        format!(
            "p.{}{}{}fs{}",
            long_at(wt_aa, pos),
            pos + 1,
            long_at(var_aa, pos),
            suffix
        )
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::annotate::seqvars::ann::{Location, Rank};
    use crate::annotate::seqvars::builder::AnnotationBuilderOptionsBuilder;
    use crate::reference::fixtures;

    fn annotate_with(
        tx: &TranscriptModel,
        variant: &GenomeVariant,
        options: &AnnotationBuilderOptions,
    ) -> Result<(Vec<VariantEffect>, String, Option<String>), anyhow::Error> {
        let ann = build(tx, variant, options)?;
        Ok((ann.effects, ann.hgvs_t, ann.hgvs_p))
    }

    fn annotate(
        tx: &TranscriptModel,
        variant: &str,
    ) -> Result<(Vec<VariantEffect>, String, Option<String>), anyhow::Error> {
        annotate_with(tx, &variant.parse()?, &AnnotationBuilderOptions::default())
    }

    fn expected(
        effects: &[VariantEffect],
        hgvs_t: &str,
        hgvs_p: Option<&str>,
    ) -> (Vec<VariantEffect>, String, Option<String>) {
        (
            effects.to_vec(),
            hgvs_t.to_string(),
            hgvs_p.map(|s| s.to_string()),
        )
    }

    #[rstest::rstest]
    #[case("1:106:TTA:", &[VariantEffect::InframeDeletion], "c.4_6del", "p.Leu2del")]
    #[case("1:106:TT:", &[VariantEffect::FrameshiftTruncation], "c.4_5del", "p.Leu2Thrfs*8")]
    #[case(
        "1:107:TAC:",
        &[VariantEffect::DisruptiveInframeDeletion],
        "c.5_7del",
        "p.Leu2_Gln3delins*"
    )]
    #[case("1:133:CTG:", &[VariantEffect::InframeDeletion], "c.31_33del", "p.Leu11del")]
    #[case(
        "1:110:AAGATC:",
        &[VariantEffect::DisruptiveInframeDeletion],
        "c.8_13del",
        "p.Gln3_Asp4del"
    )]
    #[case(
        "1:193:TAA:",
        &[VariantEffect::StopLost, VariantEffect::InframeDeletion],
        "c.91_93del",
        "p.0?"
    )]
    #[case("1:104:TGT:", &[VariantEffect::StartLost], "c.3_5del", "p.0?")]
    fn cds_single_exon(
        #[case] variant: &str,
        #[case] effects: &[VariantEffect],
        #[case] hgvs_t: &str,
        #[case] hgvs_p: &str,
    ) -> Result<(), anyhow::Error> {
        assert_eq!(
            annotate(&fixtures::tx_single_exon(), variant)?,
            expected(effects, hgvs_t, Some(hgvs_p))
        );

        Ok(())
    }

    #[test]
    fn three_prime_shifting() -> Result<(), anyhow::Error> {
        let tx = fixtures::tx_single_exon();
        let variant: GenomeVariant = "1:118:A:".parse()?;

        let ann = build(&tx, &variant, &AnnotationBuilderOptions::default())?;
        assert_eq!(
            (ann.effects.clone(), ann.hgvs_t.clone(), ann.hgvs_p.clone()),
            expected(
                &[VariantEffect::FrameshiftVariant],
                "c.18del",
                Some("p.Gly7Alafs*9")
            )
        );
        assert_eq!(ann.messages, vec![Message::InfoRealignThreePrime]);
        assert_eq!(ann.variant, variant);

        let options = AnnotationBuilderOptionsBuilder::default()
            .nt3_prime_shifting(false)
            .build()?;
        let ann = build(&tx, &variant, &options)?;
        assert_eq!(ann.hgvs_t, "c.16del");
        assert_eq!(ann.hgvs_p.as_deref(), Some("p.Gly7Alafs*9"));
        assert!(ann.messages.is_empty());

        // TAA becomes TAG after shifting onto the last base of the stop codon.
        let ann = build(&tx, &"1:194:A:".parse()?, &AnnotationBuilderOptions::default())?;
        assert_eq!(
            (ann.effects.clone(), ann.hgvs_t.clone(), ann.hgvs_p.clone()),
            expected(&[VariantEffect::StopRetainedVariant], "c.93del", Some("p.="))
        );
        assert_eq!(ann.messages, vec![Message::InfoRealignThreePrime]);

        let ann = build(&tx, &"1:194:A:".parse()?, &options)?;
        assert_eq!(ann.hgvs_t, "c.92del");
        assert_eq!(ann.effects, vec![VariantEffect::StopRetainedVariant]);
        assert_eq!(ann.hgvs_p.as_deref(), Some("p.="));

        Ok(())
    }

    #[test]
    fn three_prime_shifting_minus() -> Result<(), anyhow::Error> {
        // c.13_14 is "AA" at the end of the first exon, shifting stops at the exon boundary.
        let tx = fixtures::tx_three_exons_minus();
        let ann = build(&tx, &"1:1202:T:".parse()?, &AnnotationBuilderOptions::default())?;

        assert_eq!(ann.hgvs_t, "c.14del");
        assert_eq!(ann.messages, vec![Message::InfoRealignThreePrime]);

        Ok(())
    }

    #[test]
    fn transcript_ablation() -> Result<(), anyhow::Error> {
        let tx = fixtures::tx_single_exon();
        let variant = GenomeVariant::new(1, 100, &tx.sequence, "")?;

        let ann = build(&tx, &variant, &AnnotationBuilderOptions::default())?;
        assert_eq!(
            (ann.effects.clone(), ann.hgvs_t.clone(), ann.hgvs_p.clone()),
            expected(&[VariantEffect::TranscriptAblation], "c.(?_?)del", Some("p.0?"))
        );
        assert_eq!(ann.location, Some(Location::Exon(Rank { ord: 1, total: 1 })));

        Ok(())
    }

    #[test]
    fn exon_ablation() -> Result<(), anyhow::Error> {
        let tx = fixtures::tx_three_exons_plus();
        let variant = GenomeVariant::new(1, 1095, &"N".repeat(40), "")?;

        assert_eq!(
            annotate_with(&tx, &variant, &AnnotationBuilderOptions::default())?,
            expected(
                &[VariantEffect::TranscriptAblation],
                "c.11-6_40+4del",
                Some("p.0?")
            )
        );

        Ok(())
    }

    #[test]
    fn across_splice_sites() -> Result<(), anyhow::Error> {
        let tx = fixtures::tx_three_exons_plus();
        let options = AnnotationBuilderOptions::default();

        let variant = GenomeVariant::new(1, 1018, "AACNNNNN", "")?;
        assert_eq!(
            annotate_with(&tx, &variant, &options)?,
            expected(
                &[
                    VariantEffect::SpliceDonorVariant,
                    VariantEffect::FrameshiftTruncation
                ],
                "c.8_10+5del",
                Some("p.Glu3Glyfs*15")
            )
        );

        let variant = GenomeVariant::new(1, 1125, "ATGGCANN", "")?;
        assert_eq!(
            annotate_with(&tx, &variant, &options)?,
            expected(
                &[
                    VariantEffect::SpliceDonorVariant,
                    VariantEffect::FrameshiftTruncation
                ],
                "c.35_40+2del",
                Some("p.Asn12Thrfs*5")
            )
        );

        let variant = GenomeVariant::new(1, 1019, &format!("AC{}GT", "N".repeat(80)), "")?;
        assert_eq!(
            annotate_with(&tx, &variant, &options)?,
            expected(
                &[
                    VariantEffect::SpliceDonorVariant,
                    VariantEffect::DisruptiveInframeDeletion
                ],
                "c.9_12del",
                Some("p.Arg4del")
            )
        );

        Ok(())
    }

    #[test]
    fn splice_site_protein_unknown() -> Result<(), anyhow::Error> {
        let tx = fixtures::tx_three_exons_plus();
        let options = AnnotationBuilderOptionsBuilder::default()
            .splice_site_protein_unknown(true)
            .build()?;
        let variant = GenomeVariant::new(1, 1018, "AACNNNNN", "")?;

        assert_eq!(build(&tx, &variant, &options)?.hgvs_p.as_deref(), Some("p.?"));

        Ok(())
    }

    #[rstest::rstest]
    #[case(
        "1:1203:ACG:",
        &[VariantEffect::InframeDeletion, VariantEffect::SpliceRegionVariant],
        "c.10_12del",
        "p.Arg4del"
    )]
    #[case("1:1205:G:", &[VariantEffect::FrameshiftVariant], "c.10del", "p.Arg4Valfs*8")]
    fn cds_minus(
        #[case] variant: &str,
        #[case] effects: &[VariantEffect],
        #[case] hgvs_t: &str,
        #[case] hgvs_p: &str,
    ) -> Result<(), anyhow::Error> {
        assert_eq!(
            annotate(&fixtures::tx_three_exons_minus(), variant)?,
            expected(effects, hgvs_t, Some(hgvs_p))
        );

        Ok(())
    }

    #[rstest::rstest]
    #[case("1:1040:AAAA:", &[VariantEffect::IntronVariant], "c.10+20_10+23del", None)]
    #[case(
        "1:1002:CG:",
        &[VariantEffect::FivePrimeUtrVariant],
        "c.-9_-8del",
        None
    )]
    #[case("1:980:AA:", &[VariantEffect::UpstreamGeneVariant], "c.-31_-30del", None)]
    #[case("1:9000:AA:", &[VariantEffect::IntergenicVariant], "g.9000_9001del", None)]
    fn non_cds(
        #[case] variant: &str,
        #[case] effects: &[VariantEffect],
        #[case] hgvs_t: &str,
        #[case] hgvs_p: Option<&str>,
    ) -> Result<(), anyhow::Error> {
        assert_eq!(
            annotate(&fixtures::tx_three_exons_plus(), variant)?,
            expected(effects, hgvs_t, hgvs_p)
        );

        Ok(())
    }

    #[test]
    fn non_coding() -> Result<(), anyhow::Error> {
        let tx = fixtures::tx_non_coding();

        assert_eq!(
            annotate(&tx, "1:1030:GTA:")?,
            expected(
                &[VariantEffect::NonCodingTranscriptIntronVariant],
                "n.20+10_20+12del",
                Some("p.?")
            )
        );
        let variant = GenomeVariant::new(1, 1095, &"N".repeat(40), "")?;
        assert_eq!(
            annotate_with(&tx, &variant, &AnnotationBuilderOptions::default())?,
            expected(
                &[
                    VariantEffect::TranscriptAblation,
                    VariantEffect::SpliceDonorVariant,
                    VariantEffect::NonCodingTranscriptExonVariant,
                ],
                "n.21-6_50+4del",
                Some("p.?")
            )
        );

        Ok(())
    }

    #[test]
    fn rejects_snv() -> Result<(), anyhow::Error> {
        let result = build(
            &fixtures::tx_single_exon(),
            &"1:106:T:C".parse()?,
            &AnnotationBuilderOptions::default(),
        );
        assert!(matches!(result, Err(Error::InvalidGenomeChange(_))));

        Ok(())
    }
}
