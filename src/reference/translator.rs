//! Translation of nucleotide sequences to amino acids.

/// Standard genetic code, indexed by `16 * first + 4 * second + third` with `A=0, C=1, G=2, T=3`.
#[rustfmt::skip]
const CODON_TABLE: [u8; 64] = [
    b'K', b'N', b'K', b'N', b'T', b'T', b'T', b'T', b'R', b'S', b'R', b'S', b'I', b'I', b'M', b'I',
    b'Q', b'H', b'Q', b'H', b'P', b'P', b'P', b'P', b'R', b'R', b'R', b'R', b'L', b'L', b'L', b'L',
    b'E', b'D', b'E', b'D', b'A', b'A', b'A', b'A', b'G', b'G', b'G', b'G', b'V', b'V', b'V', b'V',
    b'*', b'Y', b'*', b'Y', b'S', b'S', b'S', b'S', b'*', b'C', b'W', b'C', b'L', b'F', b'L', b'F',
];

/// Amino acid for unknown or ambiguous codons.
pub const UNKNOWN_AA: u8 = b'X';

fn base_index(base: u8) -> Option<usize> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' | b'U' | b'u' => Some(3),
        _ => None,
    }
}

/// Translate one codon to the one-letter amino acid code, `X` if it contains ambiguous bases.
pub fn translate_codon(codon: &[u8]) -> u8 {
    match codon {
        [a, b, c] => match (base_index(*a), base_index(*b), base_index(*c)) {
            (Some(a), Some(b), Some(c)) => CODON_TABLE[16 * a + 4 * b + c],
            _ => UNKNOWN_AA,
        },
        _ => UNKNOWN_AA,
    }
}

/// Translate a nucleotide sequence codon by codon, ignoring a trailing incomplete codon.
///
/// Translation does not stop at stop codons; these are rendered as `*`.
pub fn translate(seq: &str) -> String {
    seq.as_bytes()
        .chunks_exact(3)
        .map(|codon| translate_codon(codon) as char)
        .collect()
}

/// Three-letter code of the one-letter amino acid code `aa`; the stop codon stays `*`.
pub fn to_long(aa: u8) -> &'static str {
    match aa {
        b'A' => "Ala",
        b'R' => "Arg",
        b'N' => "Asn",
        b'D' => "Asp",
        b'C' => "Cys",
        b'Q' => "Gln",
        b'E' => "Glu",
        b'G' => "Gly",
        b'H' => "His",
        b'I' => "Ile",
        b'L' => "Leu",
        b'K' => "Lys",
        b'M' => "Met",
        b'F' => "Phe",
        b'P' => "Pro",
        b'S' => "Ser",
        b'T' => "Thr",
        b'W' => "Trp",
        b'Y' => "Tyr",
        b'V' => "Val",
        b'U' => "Sec",
        b'O' => "Pyl",
        b'*' => "*",
        _ => "Xaa",
    }
}

/// Three-letter representation of a string of one-letter amino acid codes.
pub fn to_long_str(aas: &str) -> String {
    aas.bytes().map(to_long).collect()
}
