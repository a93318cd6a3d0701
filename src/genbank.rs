//! GenBank flat-file records read through gb-io.

use crate::{
    alphabet::SeqType,
    error::{FormatError, Result},
    feature_location::location_span,
    formats::ParseOptions,
    sequence_record::{Annotation, SequenceRecord, date_to_unix_ms, first_name},
};
use gb_io::{
    reader::SeqReader,
    seq::{Feature, Seq, Topology},
};
use itertools::Itertools;

/// Qualifiers that name a feature; the first one encountered wins.
const NAME_QUALIFIERS: [&str; 8] = [
    "gene",
    "product",
    "note",
    "db_xref",
    "protein_id",
    "label",
    "lab_host",
    "locus_tag",
];
const COLOR_QUALIFIERS: [&str; 3] = ["ApEinfo_fwdcolor", "ApEinfo_revcolor", "color"];
const PRIMER_KINDS: [&str; 2] = ["primer_bind", "primer"];
/// LOCUS names written by exporters that had no real name to offer.
const PLACEHOLDER_NAMES: [&str; 2] = ["Exported", "Untitled"];

pub fn parse_genbank(text: &str, options: &mut ParseOptions) -> Result<Vec<SequenceRecord>> {
    let mut records = vec![];
    for seq in SeqReader::new(text.as_bytes()) {
        records.push(to_record(&seq?, options)?);
    }
    if records.is_empty() {
        return Err(FormatError::Empty);
    }
    Ok(records)
}

/// First qualifier value, in file order, whose key is one of `keys`.
fn qualifier(feature: &Feature, keys: &[&str]) -> Option<String> {
    feature.qualifiers.iter().find_map(|(key, value)| {
        if !keys.contains(&&**key) {
            return None;
        }
        let value = value.as_deref()?.split_whitespace().join(" ");
        (!value.is_empty()).then_some(value)
    })
}

fn to_record(gb: &Seq, options: &mut ParseOptions) -> Result<SequenceRecord> {
    let seq: String = gb
        .seq
        .iter()
        .map(|&b| b as char)
        .filter(|c| matches!(c.to_ascii_lowercase(), 'a' | 't' | 'g' | 'c'))
        .collect();
    if seq.is_empty() {
        return Err(FormatError::NoSequence { format: "GenBank" });
    }

    let locus_name = gb
        .name
        .as_deref()
        .filter(|name| !PLACEHOLDER_NAMES.contains(name))
        .filter(|name| !name.chars().all(|c| c.is_ascii_digit()));
    let name = first_name([locus_name, gb.accession.as_deref(), options.file_stem()]);

    let mut record = SequenceRecord::new(&name, &seq, Some(SeqType::Dna));
    record.date = gb
        .date
        .as_ref()
        .and_then(|date| date_to_unix_ms(date.year() as i64, date.month(), date.day()));

    for feature in &gb.features {
        let Some(span) = location_span(&feature.location, record.len()) else {
            continue;
        };
        let kind = feature.kind.to_string();
        let annotation = Annotation {
            id: options.ids.next_id(),
            name: qualifier(feature, &NAME_QUALIFIERS).unwrap_or_else(|| kind.clone()),
            start: span.start,
            end: span.end,
            direction: span.direction,
            color: qualifier(feature, &COLOR_QUALIFIERS),
            kind,
        };
        if PRIMER_KINDS.contains(&annotation.kind.as_str()) {
            record.primers.push(annotation);
        } else {
            record.annotations.push(annotation);
        }
    }

    let wraps_origin = record
        .annotations
        .iter()
        .chain(record.primers.iter())
        .any(Annotation::is_wrapping);
    record.circular = matches!(gb.topology, Topology::Circular) || wraps_origin;
    record.reduce_ranges();
    Ok(record)
}
