//! Ambiguity-aware pattern search over both strands.

use crate::{
    alphabet::{SeqType, aa_ambiguity, complement},
    iupac_code::IupacCode,
    sequence_record::{Direction, SequenceRecord},
};
use itertools::Itertools;
use log::warn;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// More hits than this in either direction abandons the search.
pub const MAX_SEARCH_HITS: usize = 4000;
/// Queries must keep at least this many bases after subtracting mismatches.
pub const MIN_EFFECTIVE_QUERY_LEN: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchResult {
    pub start: usize,
    pub end: usize,
    pub direction: Direction,
}

/// Builds a case-insensitive regex for `query`, expanding ambiguity letters.
pub fn query_regex(query: &str, seq_type: SeqType) -> Option<Regex> {
    let pattern: String = query
        .bytes()
        .map(|letter| {
            let class = match seq_type {
                SeqType::Aa => aa_ambiguity(letter).map(|residues| {
                    let alternatives = residues.iter().map(|r| (*r as char).to_string()).join("|");
                    format!("({alternatives})")
                }),
                _ => IupacCode::regex_class(letter, seq_type == SeqType::Rna),
            };
            class.unwrap_or_else(|| regex::escape(&(letter as char).to_string()))
        })
        .collect();
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

fn letters_match(query: u8, subject: u8, seq_type: SeqType) -> bool {
    if query.eq_ignore_ascii_case(&subject) {
        return true;
    }
    match seq_type {
        SeqType::Aa => {
            aa_ambiguity(query).is_some_and(|set| set.contains(&subject.to_ascii_uppercase()))
        }
        _ => IupacCode::is_ambiguous(query) && IupacCode::from_letter(query).matches_base(subject),
    }
}

/// Start offsets of every window of `subject` within `max_mismatches` of `query`.
fn hamming_hits(query: &[u8], subject: &[u8], max_mismatches: usize, seq_type: SeqType) -> Vec<usize> {
    if query.len() > subject.len() {
        return vec![];
    }
    (0..=subject.len() - query.len())
        .filter(|&offset| {
            let mut mismatches = 0;
            for (q, s) in query.iter().zip(&subject[offset..]) {
                if !letters_match(*q, *s, seq_type) {
                    mismatches += 1;
                    if mismatches > max_mismatches {
                        return false;
                    }
                }
            }
            true
        })
        .collect()
}

/// One directional pass, with indices reduced modulo `modulus`.
fn search_strand(
    query: &str,
    max_mismatches: usize,
    subject: &str,
    seq_type: SeqType,
    modulus: usize,
    direction: Direction,
) -> Vec<SearchResult> {
    let spans: Vec<(usize, usize)> = if max_mismatches == 0 {
        match query_regex(query, seq_type) {
            Some(re) => re.find_iter(subject).map(|m| (m.start(), m.end())).collect(),
            None => vec![],
        }
    } else {
        hamming_hits(query.as_bytes(), subject.as_bytes(), max_mismatches, seq_type)
            .into_iter()
            .map(|start| (start, start + query.len()))
            .collect()
    };
    spans
        .into_iter()
        .map(|(start, end)| SearchResult {
            start: start % modulus,
            end: end % modulus,
            direction,
        })
        .collect()
}

fn search_modulo(
    query: &str,
    max_mismatches: usize,
    subject: &str,
    seq_type: SeqType,
    modulus: Option<usize>,
) -> Vec<SearchResult> {
    if query.len() < max_mismatches + MIN_EFFECTIVE_QUERY_LEN {
        warn!(
            "search query '{query}' with {max_mismatches} mismatches leaves fewer than {MIN_EFFECTIVE_QUERY_LEN} bases"
        );
        return vec![];
    }
    let strands = complement(subject, seq_type);
    let modulus = modulus.unwrap_or(strands.seq.len());
    if strands.seq.is_empty() || modulus == 0 {
        return vec![];
    }

    let forward = search_strand(query, max_mismatches, &strands.seq, seq_type, modulus, Direction::Forward);
    let reversed_query: String = query.chars().rev().collect();
    let reverse = search_strand(
        &reversed_query,
        max_mismatches,
        &strands.comp_seq,
        seq_type,
        modulus,
        Direction::Reverse,
    );
    if forward.len() > MAX_SEARCH_HITS || reverse.len() > MAX_SEARCH_HITS {
        warn!(
            "search for '{query}' found more than {MAX_SEARCH_HITS} hits in one direction; results dropped"
        );
        return vec![];
    }

    let mut results: Vec<SearchResult> = forward.into_iter().chain(reverse).collect();
    results.sort_by_key(|r| (r.start, std::cmp::Reverse(r.direction)));
    results
}

/// Searches `subject` for `query` on both strands, allowing `max_mismatches`.
///
/// The reverse pass scans the complement strand with the reversed query, so
/// reverse hits are reported in top-strand coordinates.
pub fn search(query: &str, max_mismatches: usize, subject: &str, seq_type: SeqType) -> Vec<SearchResult> {
    search_modulo(query, max_mismatches, subject, seq_type, None)
}

/// Searches a record; circular records are scanned doubled so hits may span the origin.
pub fn search_record(query: &str, max_mismatches: usize, record: &SequenceRecord) -> Vec<SearchResult> {
    if !record.circular {
        return search(query, max_mismatches, &record.seq, record.seq_type);
    }
    let doubled = record.seq.repeat(2);
    let mut results: Vec<SearchResult> =
        search_modulo(query, max_mismatches, &doubled, record.seq_type, Some(record.len()))
            .into_iter()
            .unique()
            .collect();
    results.sort_by_key(|r| (r.start, std::cmp::Reverse(r.direction)));
    results
}
