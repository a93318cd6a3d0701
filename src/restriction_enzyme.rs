use crate::{
    alphabet::{SeqType, reverse_complement},
    sequence_record::Direction,
};
use serde::{Deserialize, Serialize};

/// Inclusive window that cut sites must fall into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRange {
    pub start: usize,
    pub end: usize,
}

impl SearchRange {
    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position <= self.end
    }
}

/// A restriction enzyme.
///
/// `fcut` and `rcut` are the top and bottom strand cut positions, counted from
/// the first base of the recognition sequence. EcoRI (`G^AATTC`) is `1/5`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enzyme {
    pub name: String,
    pub rseq: String,
    pub fcut: isize,
    pub rcut: isize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<SearchRange>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overhang {
    Blunt,
    FivePrime(usize),
    ThreePrime(usize),
}

impl Enzyme {
    pub fn new(name: &str, rseq: &str, fcut: isize, rcut: isize) -> Self {
        Self {
            name: name.to_string(),
            rseq: rseq.to_string(),
            fcut,
            rcut,
            range: None,
        }
    }

    pub fn with_range(mut self, start: usize, end: usize) -> Self {
        self.range = Some(SearchRange { start, end });
        self
    }

    /// True if the recognition sequence equals its own reverse complement.
    pub fn is_palindromic(&self) -> bool {
        let rseq = self.rseq.to_ascii_uppercase();
        reverse_complement(&rseq, SeqType::Dna) == rseq
    }

    pub fn overhang(&self) -> Overhang {
        let len = self.fcut.abs_diff(self.rcut);
        match self.fcut.cmp(&self.rcut) {
            std::cmp::Ordering::Equal => Overhang::Blunt,
            std::cmp::Ordering::Less => Overhang::FivePrime(len),
            std::cmp::Ordering::Greater => Overhang::ThreePrime(len),
        }
    }
}

/// An enzyme named for lookup in the preset table, or given in full.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnzymeRef {
    Preset(String),
    Custom(Enzyme),
}

impl From<&str> for EnzymeRef {
    fn from(name: &str) -> Self {
        Self::Preset(name.to_string())
    }
}

impl From<Enzyme> for EnzymeRef {
    fn from(enzyme: Enzyme) -> Self {
        Self::Custom(enzyme)
    }
}

/// Where an enzyme cuts a sequence.
///
/// `start..end` spans the recognition site; `fcut`/`rcut` are the absolute
/// top and bottom strand cut positions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutSite {
    pub id: String,
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub fcut: usize,
    pub rcut: usize,
    pub direction: Direction,
    pub enzyme: Enzyme,
}
