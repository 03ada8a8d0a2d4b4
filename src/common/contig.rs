//! Chromosome name handling.
//!
//! Chromosomes are identified by number internally: 1-22 for the autosomes, 23 for X, 24 for Y
//! and 25 for the mitochondrial genome.  Names of scaffolds, unplaced contigs, and alternative
//! haplotypes have no number and are rejected.

use std::collections::HashMap;

use once_cell::sync::Lazy;

pub const CHR_X: u32 = 23;
pub const CHR_Y: u32 = 24;
pub const CHR_M: u32 = 25;

/// Mapping from accepted chromosome names to chromosome number.
static NAME_TO_CHROM_NO: Lazy<HashMap<String, u32>> = Lazy::new(|| {
    let mut result = HashMap::new();
    for i in 1..=22 {
        result.insert(format!("{}", i), i);
        result.insert(format!("chr{}", i), i);
    }
    for (name, no) in [("X", CHR_X), ("Y", CHR_Y), ("M", CHR_M), ("MT", CHR_M)] {
        result.insert(name.to_string(), no);
        result.insert(format!("chr{}", name), no);
    }
    result
});

/// Return the chromosome number for the given name, e.g., `"chrX"` or `"X"` give 23.
pub fn chrom_no(name: &str) -> Option<u32> {
    NAME_TO_CHROM_NO.get(name).copied()
}

/// Return the display name (without `chr` prefix) of the given chromosome number.
pub fn chrom_name(chrom_no: u32) -> String {
    match chrom_no {
        CHR_X => "X".to_string(),
        CHR_Y => "Y".to_string(),
        CHR_M => "MT".to_string(),
        _ => format!("{}", chrom_no),
    }
}

/// Whether the chromosome number refers to a canonical chromosome.
pub fn is_canonical(chrom_no: u32) -> bool {
    (1..=CHR_M).contains(&chrom_no)
}
