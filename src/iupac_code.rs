const BIT_A: u8 = 1;
const BIT_C: u8 = 2;
const BIT_G: u8 = 4;
const BIT_T: u8 = 8;

/// Concrete bases in bit order.
const BASES: [(u8, u8); 4] = [(BIT_A, b'A'), (BIT_C, b'C'), (BIT_G, b'G'), (BIT_T, b'T')];

/// Ambiguity letters and the bases they stand for.
const AMBIGUITY: [(u8, u8); 11] = [
    (b'W', BIT_A | BIT_T),
    (b'S', BIT_C | BIT_G),
    (b'M', BIT_A | BIT_C),
    (b'K', BIT_G | BIT_T),
    (b'R', BIT_A | BIT_G),
    (b'Y', BIT_C | BIT_T),
    (b'B', BIT_C | BIT_G | BIT_T),
    (b'D', BIT_A | BIT_G | BIT_T),
    (b'H', BIT_A | BIT_C | BIT_T),
    (b'V', BIT_A | BIT_C | BIT_G),
    (b'N', BIT_A | BIT_C | BIT_G | BIT_T),
];

/// The set of bases an IUPAC nucleotide letter stands for, as a bitmask.
///
/// `U` shares the `T` bit so the same table serves DNA and RNA. Letters outside
/// the IUPAC alphabet map to the empty set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IupacCode(u8);

impl IupacCode {
    #[inline(always)]
    pub fn from_letter(letter: u8) -> Self {
        let letter = match letter.to_ascii_uppercase() {
            b'U' => b'T',
            other => other,
        };
        BASES
            .iter()
            .find(|(_, base)| *base == letter)
            .map(|(bit, _)| Self(*bit))
            .or_else(|| {
                AMBIGUITY
                    .iter()
                    .find(|(code, _)| *code == letter)
                    .map(|(_, bits)| Self(*bits))
            })
            .unwrap_or(Self(0))
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub fn subset(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// True for letters standing for more than one base.
    #[inline(always)]
    pub fn is_ambiguous(letter: u8) -> bool {
        IupacCode::from_letter(letter).0.count_ones() > 1
    }

    /// True if `base` is a concrete base contained in this code.
    #[inline(always)]
    pub fn matches_base(self, base: u8) -> bool {
        let base = Self::from_letter(base);
        base.0.count_ones() == 1 && !self.subset(base).is_empty()
    }

    /// Upper-case bases in this code, in `ACGT` order.
    pub fn bases(self) -> impl Iterator<Item = u8> {
        BASES
            .into_iter()
            .filter(move |(bit, _)| self.0 & bit != 0)
            .map(|(_, base)| base)
    }

    /// Regex alternation for an ambiguity letter, eg `N` => `(a|c|g|t)`.
    ///
    /// Returns `None` for concrete bases and non-IUPAC letters.
    pub fn regex_class(letter: u8, rna: bool) -> Option<String> {
        if !Self::is_ambiguous(letter) {
            return None;
        }
        let bases: Vec<String> = Self::from_letter(letter)
            .bases()
            .map(|base| match (base, rna) {
                (b'T', true) => "u".to_string(),
                (base, _) => (base.to_ascii_lowercase() as char).to_string(),
            })
            .collect();
        Some(format!("({})", bases.join("|")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_letter() {
        assert!(
            !IupacCode::from_letter(b'V')
                .subset(IupacCode::from_letter(b'G'))
                .is_empty()
        );
        assert!(
            IupacCode::from_letter(b'H')
                .subset(IupacCode::from_letter(b'G'))
                .is_empty()
        );
        assert_eq!(IupacCode::from_letter(b'a'), IupacCode(BIT_A));
        assert_eq!(IupacCode::from_letter(b'U'), IupacCode(BIT_T));
        assert!(IupacCode::from_letter(b'X').is_empty());
    }

    #[test]
    fn test_bases() {
        let bases = |letter: u8| IupacCode::from_letter(letter).bases().collect::<Vec<u8>>();
        assert_eq!(bases(b'A'), b"A");
        assert_eq!(bases(b'v'), b"ACG");
        assert_eq!(bases(b'n'), b"ACGT");
        assert!(bases(b'?').is_empty());
    }

    #[test]
    fn test_matches_base() {
        let r = IupacCode::from_letter(b'R');
        assert!(r.matches_base(b'a'));
        assert!(r.matches_base(b'G'));
        assert!(!r.matches_base(b'c'));
        // an ambiguous subject letter is not a concrete base
        assert!(!r.matches_base(b'N'));
        assert!(IupacCode::from_letter(b'Y').matches_base(b'u'));
    }

    #[test]
    fn test_regex_class() {
        assert_eq!(
            IupacCode::regex_class(b'N', false).as_deref(),
            Some("(a|c|g|t)")
        );
        assert_eq!(IupacCode::regex_class(b'y', false).as_deref(), Some("(c|t)"));
        assert_eq!(IupacCode::regex_class(b'Y', true).as_deref(), Some("(c|u)"));
        assert_eq!(IupacCode::regex_class(b'A', false), None);
        assert_eq!(IupacCode::regex_class(b'X', false), None);
    }
}
