//! Restriction digest: cut sites of a set of enzymes on a sequence.

use crate::{
    ENZYMES,
    alphabet::{SeqType, reverse_complement},
    id_generator::IdGenerator,
    restriction_enzyme::{CutSite, Enzyme, EnzymeRef},
    search::query_regex,
    sequence_record::{Direction, SequenceRecord},
};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A piece of the molecule between two neighbouring top-strand cuts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub start: usize,
    pub end: usize,
    pub length: usize,
}

fn lookup_custom<'a>(custom: &'a HashMap<String, Enzyme>, name: &str) -> Option<&'a Enzyme> {
    custom.get(name).or_else(|| {
        custom
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, enzyme)| enzyme)
    })
}

/// Resolves enzyme references in order, then appends the remaining custom
/// enzymes sorted by key. Each enzyme name is used once.
fn resolve_enzymes(enzymes: &[EnzymeRef], custom: &HashMap<String, Enzyme>) -> Vec<Enzyme> {
    let mut seen = HashSet::new();
    let mut ret = vec![];
    for enzyme_ref in enzymes {
        let enzyme = match enzyme_ref {
            EnzymeRef::Preset(name) => {
                let found = lookup_custom(custom, name).or_else(|| ENZYMES.get(name)).cloned();
                if found.is_none() {
                    debug!("Unknown restriction enzyme '{name}' ignored");
                }
                found
            }
            EnzymeRef::Custom(enzyme) => Some(enzyme.clone()),
        };
        if let Some(enzyme) = enzyme {
            if seen.insert(enzyme.name.to_ascii_lowercase()) {
                ret.push(enzyme);
            }
        }
    }
    for key in custom.keys().sorted() {
        let enzyme = &custom[key];
        if seen.insert(enzyme.name.to_ascii_lowercase()) {
            ret.push(enzyme.clone());
        }
    }
    ret
}

/// Cut sites of one enzyme, without ids, keyed by `(fcut, direction)`.
fn enzyme_cut_sites(seq: &str, enzyme: &Enzyme, circular: bool) -> Vec<CutSite> {
    let len = seq.len();
    let rlen = enzyme.rseq.len();
    if len == 0 || rlen == 0 {
        return vec![];
    }
    let doubled = seq.repeat(2);
    let mut passes = vec![(enzyme.rseq.clone(), Direction::Forward)];
    if !enzyme.is_palindromic() {
        passes.push((reverse_complement(&enzyme.rseq, SeqType::Dna), Direction::Reverse));
    }

    let mut sites: BTreeMap<(usize, Direction), CutSite> = BTreeMap::new();
    for (pattern, direction) in passes {
        let Some(re) = query_regex(&pattern, SeqType::Dna) else {
            debug!("Recognition sequence '{}' of {} is not searchable", enzyme.rseq, enzyme.name);
            continue;
        };
        let mut from = 0;
        while let Some(m) = re.find_at(&doubled, from) {
            from = m.start() + 1;
            let start = m.start() as isize;
            let (fcut, rcut) = match direction {
                Direction::Reverse => (
                    start + rlen as isize - enzyme.rcut,
                    start + rlen as isize - enzyme.fcut,
                ),
                _ => (start + enzyme.fcut, start + enzyme.rcut),
            };
            if !circular {
                let inside = |p: isize| (0..=len as isize).contains(&p);
                if m.end() > len || !inside(fcut) || !inside(rcut) {
                    continue;
                }
            }
            let site = CutSite {
                id: String::new(),
                name: enzyme.name.clone(),
                start: m.start() % len,
                end: m.end() % len,
                fcut: fcut.rem_euclid(len as isize) as usize,
                rcut: rcut.rem_euclid(len as isize) as usize,
                direction,
                enzyme: enzyme.clone(),
            };
            sites.insert((site.fcut, direction), site);
        }
    }

    sites
        .into_values()
        .filter(|site| !(site.fcut == 0 && site.rcut == 0))
        .filter(|site| {
            enzyme
                .range
                .is_none_or(|range| range.contains(site.fcut) && range.contains(site.rcut))
        })
        .collect()
}

fn digest_sequence(
    seq: &str,
    circular: bool,
    enzymes: &[EnzymeRef],
    custom: &HashMap<String, Enzyme>,
    ids: &mut dyn IdGenerator,
) -> Vec<CutSite> {
    let mut sites: Vec<CutSite> = resolve_enzymes(enzymes, custom)
        .iter()
        .flat_map(|enzyme| enzyme_cut_sites(seq, enzyme, circular))
        .collect();
    sites.sort_by_key(|site| (site.fcut, site.direction));
    for site in &mut sites {
        site.id = ids.next_id();
    }
    sites
}

/// Finds every cut site of `enzymes` on `seq`, treating it as circular.
///
/// Preset names are looked up in `custom` first, then in the built-in table;
/// unknown names are dropped. All enzymes in `custom` take part as well.
pub fn digest(
    seq: &str,
    enzymes: &[EnzymeRef],
    custom: &HashMap<String, Enzyme>,
    ids: &mut dyn IdGenerator,
) -> Vec<CutSite> {
    digest_sequence(seq, true, enzymes, custom, ids)
}

/// Like [`digest`], but drops sites crossing the ends of a linear record.
pub fn digest_record(
    record: &SequenceRecord,
    enzymes: &[EnzymeRef],
    custom: &HashMap<String, Enzyme>,
    ids: &mut dyn IdGenerator,
) -> Vec<CutSite> {
    digest_sequence(&record.seq, record.circular, enzymes, custom, ids)
}

/// Fragments produced by cutting the top strand at every site.
pub fn fragments(seq_len: usize, circular: bool, cut_sites: &[CutSite]) -> Vec<Fragment> {
    if seq_len == 0 {
        return vec![];
    }
    let cuts: Vec<usize> = cut_sites
        .iter()
        .map(|site| site.fcut % seq_len)
        .sorted()
        .dedup()
        .collect();
    if circular {
        if cuts.is_empty() {
            return vec![Fragment { start: 0, end: 0, length: seq_len }];
        }
        return cuts
            .iter()
            .zip(cuts.iter().cycle().skip(1))
            .map(|(&start, &end)| {
                let length = match (end + seq_len - start) % seq_len {
                    0 => seq_len,
                    length => length,
                };
                Fragment { start, end, length }
            })
            .collect();
    }
    std::iter::once(0)
        .chain(cuts.into_iter().filter(|&c| c > 0))
        .chain(std::iter::once(seq_len))
        .tuple_windows()
        .map(|(start, end)| Fragment {
            start,
            end: end % seq_len,
            length: end - start,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_generator::SequentialIds;

    fn ids() -> SequentialIds {
        SequentialIds::new("cut")
    }

    #[test]
    fn test_aatii_single_site() {
        let seq = "ttttttttttgacgtcttttttttttttttttttt";
        let sites = digest(seq, &["AatII".into()], &HashMap::new(), &mut ids());
        assert_eq!(sites.len(), 1);
        let site = &sites[0];
        assert_eq!(site.name, "AatII");
        assert_eq!((site.start, site.end), (10, 16));
        assert_eq!((site.fcut, site.rcut), (15, 11));
        assert_eq!(site.direction, Direction::Forward);
        assert_eq!(site.id, "cut-0");
    }

    #[test]
    fn test_overlapping_sites() {
        let sites = digest("aaGCGCGCaaaa", &["HhaI".into()], &HashMap::new(), &mut ids());
        assert_eq!(sites.len(), 2);
        let starts: Vec<usize> = sites.iter().map(|site| site.start).sorted().collect();
        assert_eq!(starts, vec![2, 4]);
        let fcuts: Vec<usize> = sites.iter().map(|site| site.fcut).sorted().collect();
        assert_eq!(fcuts, vec![5, 7]);
    }

    #[test]
    fn test_site_across_origin_found_once() {
        let seq = format!("attc{}ga", "c".repeat(30));
        let sites = digest(&seq, &["EcoRI".into()], &HashMap::new(), &mut ids());
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].start, 34);
        assert_eq!(sites[0].end, 4);
        assert_eq!((sites[0].fcut, sites[0].rcut), (35, 3));
    }

    #[test]
    fn test_non_palindromic_both_strands() {
        // BsaI on the top strand, then its reverse complement.
        let seq = format!("{}ggtctc{}gagacc{}", "a".repeat(10), "a".repeat(20), "a".repeat(20));
        let sites = digest(&seq, &["bsai".into()], &HashMap::new(), &mut ids());
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].direction, Direction::Forward);
        assert_eq!((sites[0].fcut, sites[0].rcut), (17, 21));
        assert_eq!(sites[1].direction, Direction::Reverse);
        assert_eq!((sites[1].fcut, sites[1].rcut), (31, 35));
    }

    #[test]
    fn test_custom_enzymes_and_unknown_names() {
        let mut custom = HashMap::new();
        custom.insert("EcoRI".to_string(), Enzyme::new("EcoRI", "GAATTC", 3, 3));
        custom.insert("Zed".to_string(), Enzyme::new("Zed", "CCCTTT", 1, 5));
        let seq = "aagaattcaaaccctttaaaaaaa";
        let sites = digest(seq, &["EcoRI".into(), "NotAnEnzyme".into()], &custom, &mut ids());
        let names: Vec<&str> = sites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["EcoRI", "Zed"]);
        assert_eq!((sites[0].fcut, sites[0].rcut), (5, 5));
    }

    #[test]
    fn test_range_filter() {
        let seq = "gaattcaaaaaaaaaagaattcaaaaaaaaaa";
        let enzyme = Enzyme::new("EcoRI", "GAATTC", 1, 5).with_range(10, 31);
        let sites = digest(seq, &[enzyme.into()], &HashMap::new(), &mut ids());
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].fcut, 17);
    }

    #[test]
    fn test_degenerate_origin_site_dropped() {
        let seq = "ccgggaaaaaaaaaaaaaaaaaaaa";
        let enzyme = Enzyme::new("Origin", "CCGG", 0, 0);
        assert!(digest(seq, &[enzyme.into()], &HashMap::new(), &mut ids()).is_empty());
    }

    #[test]
    fn test_digest_record_linear_ends() {
        let mut record = SequenceRecord::new("x", &format!("attc{}ga", "c".repeat(30)), None);
        assert!(digest_record(&record, &["EcoRI".into()], &HashMap::new(), &mut ids()).is_empty());
        record.circular = true;
        assert_eq!(digest_record(&record, &["EcoRI".into()], &HashMap::new(), &mut ids()).len(), 1);
    }

    #[test]
    fn test_fragments() {
        let seq = "aagaattcaaaaaaaaagaattcaaaaaaaaaa";
        let sites = digest(seq, &["EcoRI".into()], &HashMap::new(), &mut ids());
        let cuts: Vec<usize> = sites.iter().map(|s| s.fcut).collect();
        assert_eq!(cuts, vec![3, 18]);

        let linear = fragments(seq.len(), false, &sites);
        let lengths: Vec<usize> = linear.iter().map(|f| f.length).collect();
        assert_eq!(lengths, vec![3, 15, 15]);

        let circular = fragments(seq.len(), true, &sites);
        let lengths: Vec<usize> = circular.iter().map(|f| f.length).collect();
        assert_eq!(lengths, vec![15, 18]);

        assert_eq!(fragments(10, true, &[]), vec![Fragment { start: 0, end: 0, length: 10 }]);
    }
}
