//! JBEI `seq:seq` XML parser.

use crate::{
    alphabet::SeqType,
    error::{FormatError, Result},
    formats::ParseOptions,
    sequence_record::{Annotation, Direction, SequenceRecord, first_name},
    xml_tree::{Element, parse_xml},
};

pub fn parse_jbei(text: &str, options: &mut ParseOptions) -> Result<Vec<SequenceRecord>> {
    let root = parse_xml(text)?;
    let seq = root
        .child_text("sequence")
        .ok_or(FormatError::NoSequence { format: "JBEI" })?;
    let name = first_name([root.child_text("name"), options.file_stem()]);
    let mut record = SequenceRecord::new(&name, seq, Some(SeqType::Dna));
    record.circular = root
        .child_text("circular")
        .is_some_and(|c| c.eq_ignore_ascii_case("true"));

    let features = root.child("features").map(|f| f.children_named("feature"));
    for feature in features.into_iter().flatten() {
        if let Some(annotation) = parse_feature(feature, options) {
            record.annotations.push(annotation);
        }
    }
    record.reduce_ranges();
    Ok(vec![record])
}

fn parse_feature(feature: &Element, options: &mut ParseOptions) -> Option<Annotation> {
    let mut locations = feature.children_named("location");
    let first = locations.next()?;
    let last = locations.last().unwrap_or(first);
    let start: usize = first.child_text("genbankStart")?.parse().ok()?;
    let end: usize = last.child_text("end")?.parse().ok()?;
    let kind = feature.child_text("type").unwrap_or("misc_feature");
    let direction = match feature.child_text("complement") {
        Some(c) if c.eq_ignore_ascii_case("true") => Direction::Reverse,
        _ => Direction::Forward,
    };
    Some(Annotation {
        id: options.ids.next_id(),
        name: first_name([feature.child_text("label"), Some(kind)]),
        start: start.saturating_sub(1),
        end,
        direction,
        color: None,
        kind: kind.to_string(),
    })
}
