//! SBOL v1 (`DnaComponent`) and SBOL v2 (`ComponentDefinition`) RDF/XML parser.

use crate::{
    alphabet::SeqType,
    error::{FormatError, Result},
    formats::ParseOptions,
    sequence_record::{Annotation, Direction, SequenceRecord, first_name},
    xml_tree::{Element, parse_xml},
};

const SO_CIRCULAR: &str = "0000988";
const SO_LINEAR: &str = "0000987";
const SO_PLASMID: &str = "0000155";
/// Sequences longer than this without a topology hint are taken to be plasmids.
const CIRCULAR_LENGTH_HINT: usize = 2000;

/// Extracts the 7-digit Sequence Ontology number from a URI such as
/// `http://identifiers.org/so/SO:0000167` or `.../obo/SO_0000167`.
fn so_term(uri: &str) -> Option<&str> {
    let at = uri.rfind("SO:").or_else(|| uri.rfind("SO_"))?;
    uri.get(at + 3..at + 10)
        .filter(|id| id.chars().all(|c| c.is_ascii_digit()))
}

fn so_kind(term: &str) -> &'static str {
    match term {
        "0000167" => "promoter",
        "0000316" => "CDS",
        "0000141" => "terminator",
        "0000139" => "RBS",
        "0000296" => "rep_origin",
        "0000057" => "operator",
        "0000704" => "gene",
        "0005850" => "primer_bind",
        _ => "misc_feature",
    }
}

fn resources<'a>(element: &'a Element, child: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    element
        .children_named(child)
        .filter_map(|c| c.attr("resource"))
}

fn kind_of(element: &Element, child: &str) -> String {
    resources(element, child)
        .filter_map(so_term)
        .map(so_kind)
        .find(|kind| *kind != "misc_feature")
        .unwrap_or("misc_feature")
        .to_string()
}

pub fn parse_sbol(text: &str, options: &mut ParseOptions) -> Result<Vec<SequenceRecord>> {
    let root = parse_xml(text)?;
    let is_v2 = text.contains("sbols.org/v2") || text.contains("ComponentDefinition");
    let mentions_plasmid = text.to_ascii_lowercase().contains("plasmid");
    let records = if is_v2 {
        parse_v2(&root, mentions_plasmid, options)
    } else {
        parse_v1(&root, mentions_plasmid, options)
    };
    if records.is_empty() {
        return Err(FormatError::NoSequence { format: "SBOL" });
    }
    Ok(records)
}

/// Topology from explicit type terms, then a `circular` child, then heuristics.
///
/// The last resort is any mention of "plasmid" in the document.
fn is_circular(
    component: &Element,
    types: &[&str],
    seq_len: usize,
    mentions_plasmid: bool,
) -> bool {
    let terms: Vec<&str> = types.iter().filter_map(|t| so_term(t)).collect();
    if terms.contains(&SO_CIRCULAR) {
        return true;
    }
    if terms.contains(&SO_LINEAR) {
        return false;
    }
    if let Some(circular) = component.child_text("circular") {
        return circular.eq_ignore_ascii_case("true");
    }
    terms.contains(&SO_PLASMID) || seq_len > CIRCULAR_LENGTH_HINT || mentions_plasmid
}

fn v1_sequence(component: &Element) -> Option<&str> {
    component.path(&["dnaSequence", "DnaSequence"])?.child_text("nucleotides")
}

/// DnaComponents at the document root, inside a Collection, or anywhere.
fn v1_components(root: &Element) -> Vec<&Element> {
    if root.name == "DnaComponent" {
        return vec![root];
    }
    let top: Vec<&Element> = root.children_named("DnaComponent").collect();
    if !top.is_empty() {
        return top;
    }
    let in_collection: Vec<&Element> = root
        .children_named("Collection")
        .flat_map(|c| c.children_named("component"))
        .flat_map(|c| c.children_named("DnaComponent"))
        .collect();
    if !in_collection.is_empty() {
        return in_collection;
    }
    let mut found = vec![];
    root.find_all(
        &|e| e.name == "DnaComponent" && v1_sequence(e).is_some(),
        &mut found,
    );
    found
}

fn parse_v1(
    root: &Element,
    mentions_plasmid: bool,
    options: &mut ParseOptions,
) -> Vec<SequenceRecord> {
    let mut records = vec![];
    for component in v1_components(root) {
        let Some(seq) = v1_sequence(component) else {
            continue;
        };
        let name = first_name([
            component.child_text("name"),
            component.child_text("displayId"),
            options.file_stem(),
        ]);
        let mut record = SequenceRecord::new(&name, seq, Some(SeqType::Dna));
        let types: Vec<&str> = resources(component, "type").collect();
        record.circular = is_circular(component, &types, record.len(), mentions_plasmid);
        for annotation in component
            .children_named("annotation")
            .flat_map(|a| a.children_named("SequenceAnnotation"))
        {
            if let Some(annotation) = v1_annotation(annotation, options) {
                record.annotations.push(annotation);
            }
        }
        record.reduce_ranges();
        records.push(record);
    }

    if records.is_empty() {
        // A bare DnaSequence without a component still carries a sequence.
        let mut found = vec![];
        root.find_all(&|e| e.name == "DnaSequence", &mut found);
        for node in found {
            if let Some(seq) = node.child_text("nucleotides") {
                let name = first_name([options.file_stem()]);
                records.push(SequenceRecord::new(&name, seq, Some(SeqType::Dna)));
            }
        }
    }
    records
}

fn v1_annotation(annotation: &Element, options: &mut ParseOptions) -> Option<Annotation> {
    let start: usize = annotation.child_text("bioStart")?.parse().ok()?;
    let end: usize = annotation.child_text("bioEnd")?.parse().ok()?;
    let direction = match annotation.child_text("strand") {
        Some("-") => Direction::Reverse,
        _ => Direction::Forward,
    };
    let sub = annotation.path(&["subComponent", "DnaComponent"]);
    let kind = sub.map_or_else(|| "misc_feature".to_string(), |s| kind_of(s, "type"));
    let name = first_name([
        sub.and_then(|s| s.child_text("name")),
        sub.and_then(|s| s.child_text("displayId")),
        Some(kind.as_str()),
    ]);
    Some(Annotation {
        id: options.ids.next_id(),
        name,
        start: start.saturating_sub(1),
        end,
        direction,
        color: None,
        kind,
    })
}

fn parse_v2(
    root: &Element,
    mentions_plasmid: bool,
    options: &mut ParseOptions,
) -> Vec<SequenceRecord> {
    let mut definitions = vec![];
    root.find_all(&|e| e.name == "ComponentDefinition", &mut definitions);
    let mut sequences = vec![];
    root.find_all(&|e| e.name == "Sequence", &mut sequences);

    let mut records = vec![];
    for definition in definitions {
        let by_reference = resources(definition, "sequence")
            .find_map(|uri| sequences.iter().find(|s| s.attr("about") == Some(uri)));
        let sequence = match (by_reference, sequences.as_slice()) {
            (Some(sequence), _) => *sequence,
            (None, [only]) => *only,
            _ => continue,
        };
        let Some(seq) = sequence.child_text("elements") else {
            continue;
        };
        let name = first_name([
            definition.child_text("title"),
            definition.child_text("displayId"),
            options.file_stem(),
        ]);
        let mut record = SequenceRecord::new(&name, seq, Some(SeqType::Dna));
        let types: Vec<&str> = resources(definition, "type")
            .chain(resources(definition, "role"))
            .collect();
        record.circular = is_circular(definition, &types, record.len(), mentions_plasmid);
        for annotation in definition
            .children_named("sequenceAnnotation")
            .flat_map(|a| a.children_named("SequenceAnnotation"))
        {
            if let Some(annotation) = v2_annotation(annotation, options) {
                record.annotations.push(annotation);
            }
        }
        record.reduce_ranges();
        records.push(record);
    }
    records
}

fn v2_annotation(annotation: &Element, options: &mut ParseOptions) -> Option<Annotation> {
    let range = annotation
        .children_named("location")
        .find_map(|l| l.child("Range"))?;
    let start: usize = range.child_text("start")?.parse().ok()?;
    let end: usize = range.child_text("end")?.parse().ok()?;
    let direction = match resources(range, "orientation").next() {
        Some(uri) if uri.contains("reverseComplement") => Direction::Reverse,
        _ => Direction::Forward,
    };
    let kind = kind_of(annotation, "role");
    let name = first_name([
        annotation.child_text("title"),
        annotation.child_text("displayId"),
        Some(kind.as_str()),
    ]);
    Some(Annotation {
        id: options.ids.next_id(),
        name,
        start: start.saturating_sub(1),
        end,
        direction,
        color: None,
        kind,
    })
}
