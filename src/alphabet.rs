//! Sequence alphabets, strand complementation and sequence-type inference.

use serde::{Deserialize, Serialize};

/// Number of leading characters inspected by [`guess_type`].
const GUESS_PREFIX_LEN: usize = 1000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeqType {
    Dna,
    Rna,
    Aa,
    #[default]
    Unknown,
}

/// A filtered sequence and its complementary strand, aligned position by position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Complemented {
    pub seq: String,
    pub comp_seq: String,
}

pub fn guess_type(seq: &str) -> SeqType {
    let prefix: Vec<u8> = seq
        .bytes()
        .filter(|c| !c.is_ascii_whitespace())
        .take(GUESS_PREFIX_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if prefix.is_empty() {
        return SeqType::Unknown;
    }
    if prefix
        .iter()
        .all(|c| matches!(c, b'A' | b'T' | b'G' | b'C' | b'N' | b'.'))
    {
        SeqType::Dna
    } else if prefix
        .iter()
        .all(|c| matches!(c, b'A' | b'U' | b'G' | b'C' | b'N' | b'.'))
    {
        SeqType::Rna
    } else if prefix.iter().all(|c| is_amino_acid(*c)) {
        SeqType::Aa
    } else {
        SeqType::Unknown
    }
}

/// The 20 standard residues, the ambiguity letters B/J/X/Z and the `*` stop.
#[inline(always)]
pub fn is_amino_acid(letter: u8) -> bool {
    matches!(
        letter.to_ascii_uppercase(),
        b'A' | b'R'
            | b'N'
            | b'D'
            | b'C'
            | b'E'
            | b'Q'
            | b'G'
            | b'H'
            | b'I'
            | b'L'
            | b'K'
            | b'M'
            | b'F'
            | b'P'
            | b'S'
            | b'T'
            | b'W'
            | b'Y'
            | b'V'
            | b'B'
            | b'J'
            | b'X'
            | b'Z'
            | b'*'
    )
}

/// Residues matched by an amino-acid ambiguity letter, or `None` for concrete residues.
pub fn aa_ambiguity(letter: u8) -> Option<&'static [u8]> {
    match letter.to_ascii_uppercase() {
        b'B' => Some(b"DN"),
        b'J' => Some(b"IL"),
        b'Z' => Some(b"EQ"),
        b'X' => Some(b"ACDEFGHIKLMNPQRSTVWY"),
        _ => None,
    }
}

fn dna_complement(letter: u8) -> Option<u8> {
    let comp = match letter.to_ascii_lowercase() {
        b'a' => b't',
        b't' => b'a',
        b'g' => b'c',
        b'c' => b'g',
        b'r' => b'y',
        b'y' => b'r',
        b'k' => b'm',
        b'm' => b'k',
        b's' => b's',
        b'w' => b'w',
        b'b' => b'v',
        b'v' => b'b',
        b'd' => b'h',
        b'h' => b'd',
        b'n' => b'n',
        b'.' => b'.',
        b'-' => b'-',
        _ => return None,
    };
    Some(match_case(letter, comp))
}

fn rna_complement(letter: u8) -> Option<u8> {
    match letter.to_ascii_lowercase() {
        b'a' => Some(match_case(letter, b'u')),
        b'u' => Some(match_case(letter, b'a')),
        b't' => None,
        _ => dna_complement(letter),
    }
}

#[inline(always)]
fn match_case(original: u8, comp: u8) -> u8 {
    if original.is_ascii_uppercase() {
        comp.to_ascii_uppercase()
    } else {
        comp
    }
}

/// Filters `seq` to the alphabet of `seq_type` and builds the complementary strand.
///
/// Amino acids have no complement, so for [`SeqType::Aa`] the residues are
/// kept and the complementary strand is empty.
pub fn complement(seq: &str, seq_type: SeqType) -> Complemented {
    let mut ret = Complemented::default();
    for letter in seq.bytes() {
        match seq_type {
            SeqType::Aa => {
                if is_amino_acid(letter) {
                    ret.seq.push(letter as char);
                }
            }
            SeqType::Rna => {
                if let Some(comp) = rna_complement(letter) {
                    ret.seq.push(letter as char);
                    ret.comp_seq.push(comp as char);
                }
            }
            SeqType::Dna | SeqType::Unknown => {
                if let Some(comp) = dna_complement(letter) {
                    ret.seq.push(letter as char);
                    ret.comp_seq.push(comp as char);
                }
            }
        }
    }
    ret
}

pub fn reverse_complement(seq: &str, seq_type: SeqType) -> String {
    complement(seq, seq_type).comp_seq.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_type() {
        assert_eq!(guess_type("ATGCN.atgcn"), SeqType::Dna);
        assert_eq!(guess_type("AUGCN.augc"), SeqType::Rna);
        assert_eq!(guess_type("MKVLA*"), SeqType::Aa);
        assert_eq!(guess_type("mkvlbjxz"), SeqType::Aa);
        assert_eq!(guess_type("ATG1"), SeqType::Unknown);
        assert_eq!(guess_type(""), SeqType::Unknown);
    }

    #[test]
    fn test_guess_type_prefix_only() {
        let mut seq = "A".repeat(GUESS_PREFIX_LEN);
        seq.push('!');
        assert_eq!(guess_type(&seq), SeqType::Dna);
    }

    #[test]
    fn test_complement_dna() {
        let comp = complement("ATGCatgcRYn", SeqType::Dna);
        assert_eq!(comp.seq, "ATGCatgcRYn");
        assert_eq!(comp.comp_seq, "TACGtacgYRn");
    }

    #[test]
    fn test_complement_drops_unknown_letters_in_lockstep() {
        let comp = complement("at1g c\nx", SeqType::Dna);
        assert_eq!(comp.seq, "atgc");
        assert_eq!(comp.comp_seq, "tacg");
        assert_eq!(comp.seq.len(), comp.comp_seq.len());
    }

    #[test]
    fn test_complement_rna() {
        let comp = complement("AUGCt", SeqType::Rna);
        assert_eq!(comp.seq, "AUGC");
        assert_eq!(comp.comp_seq, "UACG");
    }

    #[test]
    fn test_complement_aa() {
        let comp = complement("MKV1*", SeqType::Aa);
        assert_eq!(comp.seq, "MKV*");
        assert_eq!(comp.comp_seq, "");
    }

    #[test]
    fn test_complement_empty() {
        assert_eq!(complement("", SeqType::Dna), Complemented::default());
    }

    #[test]
    fn test_complement_round_trip() {
        for (seq, seq_type) in [
            ("gattacaNNRYKMSWBDHV", SeqType::Dna),
            ("GAUUACAnn", SeqType::Rna),
        ] {
            let once = complement(seq, seq_type);
            let twice = complement(&once.comp_seq, seq_type);
            assert_eq!(twice.comp_seq, seq);
        }
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("GAATTCc", SeqType::Dna), "gGAATTC");
        assert_eq!(reverse_complement("AACG", SeqType::Rna), "CGUU");
        let seq = "ggtctcNNNNacgt";
        assert_eq!(
            reverse_complement(&reverse_complement(seq, SeqType::Dna), SeqType::Dna),
            seq
        );
    }

    #[test]
    fn test_aa_ambiguity() {
        assert_eq!(aa_ambiguity(b'b'), Some(&b"DN"[..]));
        assert_eq!(aa_ambiguity(b'M'), None);
    }
}
