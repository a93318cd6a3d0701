//! The canonical record every parser produces.

use crate::alphabet::{SeqType, complement, guess_type};
use serde::{Deserialize, Serialize};

pub const UNNAMED: &str = "Unnamed";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Reverse,
    #[default]
    None,
    Forward,
}

impl Direction {
    pub fn as_i8(self) -> i8 {
        match self {
            Self::Reverse => -1,
            Self::None => 0,
            Self::Forward => 1,
        }
    }
}

impl From<i8> for Direction {
    fn from(value: i8) -> Self {
        match value {
            v if v < 0 => Self::Reverse,
            0 => Self::None,
            _ => Self::Forward,
        }
    }
}

/// A named, directional range over a sequence.
///
/// `start..end` is half-open; `start > end` wraps through index 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub direction: Direction,
    pub color: Option<String>,
    pub kind: String,
}

impl Annotation {
    pub fn is_wrapping(&self) -> bool {
        self.start > self.end
    }

    /// Reduces both indices modulo `seq_len`.
    pub fn reduce(&mut self, seq_len: usize) {
        if seq_len > 0 {
            self.start %= seq_len;
            self.end %= seq_len;
        }
    }
}

pub type Primer = Annotation;

/// Per-base trace data of a capillary sequencing run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chromatogram {
    pub qualities: Vec<u8>,
    pub peak_positions: Vec<u16>,
    pub a: Vec<i16>,
    pub c: Vec<i16>,
    pub g: Vec<i16>,
    pub t: Vec<i16>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub name: String,
    pub seq: String,
    pub complement_seq: String,
    pub seq_type: SeqType,
    pub circular: bool,
    pub annotations: Vec<Annotation>,
    pub primers: Vec<Primer>,
    /// Unix milliseconds, when the source file carries a date.
    pub date: Option<i64>,
    pub chromatogram: Option<Chromatogram>,
}

impl SequenceRecord {
    /// Builds a record from raw sequence text, guessing the type unless given.
    ///
    /// Characters outside the alphabet are dropped from both strands.
    pub fn new(name: &str, raw_seq: &str, seq_type: Option<SeqType>) -> Self {
        let seq_type = seq_type.unwrap_or_else(|| guess_type(raw_seq));
        let strands = complement(raw_seq, seq_type);
        Self {
            name: name.to_string(),
            seq: strands.seq,
            complement_seq: strands.comp_seq,
            seq_type,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Reduces every annotation and primer index modulo the sequence length.
    pub fn reduce_ranges(&mut self) {
        let len = self.len();
        self.annotations
            .iter_mut()
            .chain(self.primers.iter_mut())
            .for_each(|a| a.reduce(len));
    }
}

/// Picks the first non-empty candidate, falling back to [`UNNAMED`].
pub fn first_name<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(UNNAMED)
        .to_string()
}

/// Days since 1970-01-01 for a proleptic Gregorian date, as unix milliseconds.
pub fn date_to_unix_ms(year: i64, month: u32, day: u32) -> Option<i64> {
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    let (y, m) = if month <= 2 {
        (year - 1, month as i64 + 9)
    } else {
        (year, month as i64 - 3)
    };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let doy = (153 * m + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    let days = era * 146_097 + doe - 719_468;
    Some(days * 86_400_000)
}

/// Inverse of [`date_to_unix_ms`], as `(year, month, day)`.
pub fn unix_ms_to_date(ms: i64) -> (i64, u32, u32) {
    let days = ms.div_euclid(86_400_000) + 719_468;
    let era = days.div_euclid(146_097);
    let doe = days - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_filters_both_strands() {
        let record = SequenceRecord::new("x", "ATG C1a", None);
        assert_eq!(record.seq_type, SeqType::Unknown);
        assert_eq!(record.seq, "ATGCa");
        assert_eq!(record.complement_seq, "TACGt");

        let record = SequenceRecord::new("x", "atgc", None);
        assert_eq!(record.seq_type, SeqType::Dna);
        assert_eq!(record.complement_seq, "tacg");
    }

    #[test]
    fn test_reduce_ranges() {
        let mut record = SequenceRecord::new("x", "aaaaaaaaaa", None);
        record.annotations.push(Annotation {
            start: 8,
            end: 10,
            ..Default::default()
        });
        record.reduce_ranges();
        assert_eq!(record.annotations[0].start, 8);
        assert_eq!(record.annotations[0].end, 0);
        assert!(record.annotations[0].is_wrapping());
    }

    #[test]
    fn test_direction() {
        assert_eq!(Direction::from(-1), Direction::Reverse);
        assert_eq!(Direction::from(0), Direction::None);
        assert_eq!(Direction::from(1), Direction::Forward);
        assert_eq!(Direction::Reverse.as_i8(), -1);
    }

    #[test]
    fn test_first_name() {
        assert_eq!(first_name([None, Some("  "), Some("pUC19")]), "pUC19");
        assert_eq!(first_name([None, None]), UNNAMED);
    }

    #[test]
    fn test_date_to_unix_ms() {
        assert_eq!(date_to_unix_ms(1970, 1, 1), Some(0));
        assert_eq!(date_to_unix_ms(2012, 6, 26), Some(1_340_668_800_000));
        assert_eq!(date_to_unix_ms(2000, 3, 1), Some(951_868_800_000));
        assert_eq!(date_to_unix_ms(2000, 13, 1), None);
        assert_eq!(unix_ms_to_date(0), (1970, 1, 1));
        assert_eq!(unix_ms_to_date(1_340_668_800_000), (2012, 6, 26));
        assert_eq!(unix_ms_to_date(951_868_800_000), (2000, 3, 1));
    }
}
