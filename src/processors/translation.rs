//! RNA codon to amino acid translation.
//!
//! Implements the standard genetic code as a static 64-entry table mapping
//! 3-base RNA codons to amino acids. The three stop codons keep their
//! traditional names (Ochre, Amber, Opal) as their symbol.

use std::fmt;

use thiserror::Error;

/// Number of bases per codon.
pub const CODON_LENGTH: usize = 3;

/// Role of a codon in translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodonRole {
    /// Initiates translation (AUG).
    Start,
    /// Terminates translation (UAA, UAG, UGA).
    Stop,
    /// Ordinary coding codon.
    Internal,
}

/// A single amino acid (or stop signal) as produced by one codon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AminoAcid {
    /// Full name, e.g. "Phenylalanine".
    pub name: &'static str,
    /// Three-letter symbol, e.g. "Phe". Stop codons use their traditional names.
    pub symbol: &'static str,
    /// Single-letter code, '*' for stop codons.
    pub code: char,
    /// Start/stop/internal classification.
    pub role: CodonRole,
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.symbol, self.code)
    }
}

const fn internal(name: &'static str, symbol: &'static str, code: char) -> AminoAcid {
    AminoAcid {
        name,
        symbol,
        code,
        role: CodonRole::Internal,
    }
}

const fn stop(symbol: &'static str) -> AminoAcid {
    AminoAcid {
        name: "Stop",
        symbol,
        code: '*',
        role: CodonRole::Stop,
    }
}

/// The standard genetic code: all 64 RNA codons.
pub static CODON_TABLE: [(&str, AminoAcid); 64] = [
    ("UUU", internal("Phenylalanine", "Phe", 'F')),
    ("UUC", internal("Phenylalanine", "Phe", 'F')),
    ("UUA", internal("Leucine", "Leu", 'L')),
    ("UUG", internal("Leucine", "Leu", 'L')),
    ("UCU", internal("Serine", "Ser", 'S')),
    ("UCC", internal("Serine", "Ser", 'S')),
    ("UCA", internal("Serine", "Ser", 'S')),
    ("UCG", internal("Serine", "Ser", 'S')),
    ("UAU", internal("Tyrosine", "Tyr", 'Y')),
    ("UAC", internal("Tyrosine", "Tyr", 'Y')),
    ("UAA", stop("Ochre")),
    ("UAG", stop("Amber")),
    ("UGU", internal("Cysteine", "Cys", 'C')),
    ("UGC", internal("Cysteine", "Cys", 'C')),
    ("UGA", stop("Opal")),
    ("UGG", internal("Tryptophan", "Trp", 'W')),
    ("CUU", internal("Leucine", "Leu", 'L')),
    ("CUC", internal("Leucine", "Leu", 'L')),
    ("CUA", internal("Leucine", "Leu", 'L')),
    ("CUG", internal("Leucine", "Leu", 'L')),
    ("CCU", internal("Proline", "Pro", 'P')),
    ("CCC", internal("Proline", "Pro", 'P')),
    ("CCA", internal("Proline", "Pro", 'P')),
    ("CCG", internal("Proline", "Pro", 'P')),
    ("CAU", internal("Histidine", "His", 'H')),
    ("CAC", internal("Histidine", "His", 'H')),
    ("CAA", internal("Glutamine", "Gln", 'Q')),
    ("CAG", internal("Glutamine", "Gln", 'Q')),
    ("CGU", internal("Arginine", "Arg", 'R')),
    ("CGC", internal("Arginine", "Arg", 'R')),
    ("CGA", internal("Arginine", "Arg", 'R')),
    ("CGG", internal("Arginine", "Arg", 'R')),
    ("AUU", internal("Isoleucine", "Ile", 'I')),
    ("AUC", internal("Isoleucine", "Ile", 'I')),
    ("AUA", internal("Isoleucine", "Ile", 'I')),
    (
        "AUG",
        AminoAcid {
            name: "Methionine",
            symbol: "Met",
            code: 'M',
            role: CodonRole::Start,
        },
    ),
    ("ACU", internal("Threonine", "Thr", 'T')),
    ("ACC", internal("Threonine", "Thr", 'T')),
    ("ACA", internal("Threonine", "Thr", 'T')),
    ("ACG", internal("Threonine", "Thr", 'T')),
    ("AAU", internal("Asparagine", "Asn", 'N')),
    ("AAC", internal("Asparagine", "Asn", 'N')),
    ("AAA", internal("Lysine", "Lys", 'K')),
    ("AAG", internal("Lysine", "Lys", 'K')),
    ("AGU", internal("Serine", "Ser", 'S')),
    ("AGC", internal("Serine", "Ser", 'S')),
    ("AGA", internal("Arginine", "Arg", 'R')),
    ("AGG", internal("Arginine", "Arg", 'R')),
    ("GUU", internal("Valine", "Val", 'V')),
    ("GUC", internal("Valine", "Val", 'V')),
    ("GUA", internal("Valine", "Val", 'V')),
    ("GUG", internal("Valine", "Val", 'V')),
    ("GCU", internal("Alanine", "Ala", 'A')),
    ("GCC", internal("Alanine", "Ala", 'A')),
    ("GCA", internal("Alanine", "Ala", 'A')),
    ("GCG", internal("Alanine", "Ala", 'A')),
    ("GAU", internal("Aspartic acid", "Asp", 'D')),
    ("GAC", internal("Aspartic acid", "Asp", 'D')),
    ("GAA", internal("Glutamic acid", "Glu", 'E')),
    ("GAG", internal("Glutamic acid", "Glu", 'E')),
    ("GGU", internal("Glycine", "Gly", 'G')),
    ("GGC", internal("Glycine", "Gly", 'G')),
    ("GGA", internal("Glycine", "Gly", 'G')),
    ("GGG", internal("Glycine", "Gly", 'G')),
];

/// Errors that can occur during translation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TranslationError {
    /// A 3-base codon that maps to no amino acid.
    #[error("bad codon at position {position}: \"{codon}\" does not map to any amino acid")]
    InvalidCodon { position: usize, codon: String },

    /// The sequence length is not a multiple of three.
    #[error("incomplete codon at position {position}: trailing fragment \"{fragment}\"")]
    IncompleteCodon { position: usize, fragment: String },
}

/// Result type for translation operations.
pub type Result<T> = std::result::Result<T, TranslationError>;

/// Look up a single codon in the standard genetic code.
///
/// Matching is case-insensitive. Returns `None` for anything that is not a
/// valid 3-base RNA codon.
pub fn lookup(codon: &str) -> Option<&'static AminoAcid> {
    if codon.len() != CODON_LENGTH {
        return None;
    }
    let upper = codon.to_ascii_uppercase();
    CODON_TABLE
        .iter()
        .find(|(key, _)| *key == upper)
        .map(|(_, acid)| acid)
}

/// Translate an RNA sequence into its amino acid chain.
///
/// The sequence is split into consecutive 3-base codons starting at
/// position 0. The first invalid codon aborts the translation with its byte
/// offset and the offending subsequence; a trailing fragment of one or two
/// bases is reported the same way.
///
/// # Example
///
/// ```
/// use labbench::processors::translation::translate;
///
/// let chain = translate("AUGGUAAAC").unwrap();
/// assert_eq!(chain[0].name, "Methionine");
/// assert_eq!(chain.len(), 3);
/// ```
pub fn translate(rna: &str) -> Result<Vec<&'static AminoAcid>> {
    let mut chain = Vec::with_capacity(rna.len() / CODON_LENGTH);

    // Chunk by characters, not bytes, so arbitrary input (including
    // multibyte text) reports a bad codon instead of slicing mid-character.
    let indices: Vec<usize> = rna.char_indices().map(|(i, _)| i).collect();

    let mut chunk_start = 0;
    while chunk_start < indices.len() {
        let chunk_end = chunk_start + CODON_LENGTH;
        let position = indices[chunk_start];

        if chunk_end > indices.len() {
            return Err(TranslationError::IncompleteCodon {
                position,
                fragment: rna[position..].to_string(),
            });
        }

        let end_byte = indices.get(chunk_end).copied().unwrap_or(rna.len());
        let codon = &rna[position..end_byte];

        match lookup(codon) {
            Some(acid) => chain.push(acid),
            None => {
                return Err(TranslationError::InvalidCodon {
                    position,
                    codon: codon.to_string(),
                })
            }
        }

        chunk_start = chunk_end;
    }

    Ok(chain)
}

/// Render a translated chain as a single-letter code string, e.g. "MVN*".
pub fn chain_codes(chain: &[&AminoAcid]) -> String {
    chain.iter().map(|acid| acid.code).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_all_codons() {
        assert_eq!(CODON_TABLE.len(), 64);

        let bases = ['U', 'C', 'A', 'G'];
        for a in bases {
            for b in bases {
                for c in bases {
                    let codon: String = [a, b, c].iter().collect();
                    assert!(lookup(&codon).is_some(), "missing codon {}", codon);
                }
            }
        }
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let acid = lookup("aug").unwrap();
        assert_eq!(acid.name, "Methionine");
        assert_eq!(acid.role, CodonRole::Start);
    }

    #[test]
    fn test_lookup_invalid() {
        assert!(lookup("ABA").is_none());
        assert!(lookup("AU").is_none());
        assert!(lookup("AUGG").is_none());
    }

    #[test]
    fn test_stop_codons() {
        assert_eq!(lookup("UAA").unwrap().symbol, "Ochre");
        assert_eq!(lookup("UAG").unwrap().symbol, "Amber");
        assert_eq!(lookup("UGA").unwrap().symbol, "Opal");
        for codon in ["UAA", "UAG", "UGA"] {
            let acid = lookup(codon).unwrap();
            assert_eq!(acid.role, CodonRole::Stop);
            assert_eq!(acid.code, '*');
        }
    }

    #[test]
    fn test_translate_sequence() {
        let chain = translate("AUGGUAAACUCACCUAAUCUAUCC").unwrap();
        let names: Vec<&str> = chain.iter().map(|a| a.name).collect();
        assert_eq!(
            names,
            vec![
                "Methionine",
                "Valine",
                "Asparagine",
                "Serine",
                "Proline",
                "Asparagine",
                "Leucine",
                "Serine",
            ]
        );
        assert_eq!(chain_codes(&chain), "MVNSPNLS");
    }

    #[test]
    fn test_translate_reports_bad_codon_position() {
        // Position 30 holds "ABA", which is not a valid codon
        let err = translate("AUGGUAAACUCACCUAAUCUAUCCGGAUGGABAGCC").unwrap_err();
        assert_eq!(
            err,
            TranslationError::InvalidCodon {
                position: 30,
                codon: "ABA".to_string(),
            }
        );
    }

    #[test]
    fn test_translate_reports_trailing_fragment() {
        let err = translate("AUGGU").unwrap_err();
        assert_eq!(
            err,
            TranslationError::IncompleteCodon {
                position: 3,
                fragment: "GU".to_string(),
            }
        );
    }

    #[test]
    fn test_translate_empty_is_empty_chain() {
        assert!(translate("").unwrap().is_empty());
    }

    #[test]
    fn test_translate_multibyte_input_is_invalid_codon() {
        // A multibyte character lands inside the first codon; this must be
        // a typed error, not a byte-slicing panic
        let err = translate("AA\u{e9}").unwrap_err();
        assert_eq!(
            err,
            TranslationError::InvalidCodon {
                position: 0,
                codon: "AA\u{e9}".to_string(),
            }
        );

        // Same when the multibyte character starts a later codon
        let err = translate("AUG\u{e9}UA").unwrap_err();
        assert_eq!(
            err,
            TranslationError::InvalidCodon {
                position: 3,
                codon: "\u{e9}UA".to_string(),
            }
        );
    }

    #[test]
    fn test_translate_multibyte_trailing_fragment() {
        let err = translate("AUG\u{e9}A").unwrap_err();
        assert_eq!(
            err,
            TranslationError::IncompleteCodon {
                position: 3,
                fragment: "\u{e9}A".to_string(),
            }
        );
    }
}
