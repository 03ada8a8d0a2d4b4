//! Changes on the amino acid level and their normalization.

use derive_new::new;

/// A change of the amino acids `reference` at 0-based protein position `pos` to `alternative`.
///
/// Both sequences use one-letter codes and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, new, serde::Serialize, serde::Deserialize)]
pub struct AminoAcidChange {
    pub pos: i32,
    pub reference: String,
    pub alternative: String,
}

impl AminoAcidChange {
    /// 0-based position of the last reference amino acid; `pos - 1` if the reference is empty.
    pub fn last_pos(&self) -> i32 {
        self.pos + self.reference.len() as i32 - 1
    }

    /// Drop the first character of both sequences and move one position to the right.
    ///
    /// Returns an unchanged copy if the reference is empty.
    pub fn shift_right(&self) -> Self {
        if self.reference.is_empty() {
            return self.clone();
        }
        Self {
            pos: self.pos + 1,
            reference: self.reference[1..].to_string(),
            alternative: self.alternative.get(1..).unwrap_or_default().to_string(),
        }
    }

    /// Remove the common prefix (advancing `pos`) and then the common suffix.
    pub fn truncate_both_sides(&self) -> Self {
        let (reference, alternative) = (self.reference.as_bytes(), self.alternative.as_bytes());
        let prefix = reference
            .iter()
            .zip(alternative)
            .take_while(|(r, a)| r == a)
            .count();
        let (reference, alternative) = (&reference[prefix..], &alternative[prefix..]);
        let suffix = reference
            .iter()
            .rev()
            .zip(alternative.iter().rev())
            .take_while(|(r, a)| r == a)
            .count();
        Self {
            pos: self.pos + prefix as i32,
            reference: String::from_utf8_lossy(&reference[..reference.len() - suffix]).into_owned(),
            alternative: String::from_utf8_lossy(&alternative[..alternative.len() - suffix])
                .into_owned(),
        }
    }

    /// Shift a pure deletion towards the C-terminus while the deleted residues repeat.
    ///
    /// `wt_aa` is the wild type protein sequence.  Changes with an alternative are returned
    /// unchanged.
    pub fn normalize_deletion(&self, wt_aa: &str) -> Self {
        if self.reference.is_empty() || !self.alternative.is_empty() {
            return self.clone();
        }
        let wt_aa = wt_aa.as_bytes();
        let mut result = self.clone();
        loop {
            let after = result.pos as usize + result.reference.len();
            match wt_aa.get(after) {
                Some(&next) if result.reference.as_bytes()[0] == next => {
                    result.reference.remove(0);
                    result.reference.push(next as char);
                    result.pos += 1;
                }
                _ => break,
            }
        }
        result
    }
}
