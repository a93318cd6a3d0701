//! iGEM Registry `rsbpml` part export.

use crate::{
    alphabet::SeqType,
    error::{FormatError, Result},
    formats::ParseOptions,
    sequence_record::{Annotation, Direction, SequenceRecord, first_name},
};
use serde::Deserialize;

pub const BACKBONE_ANNOTATION: &str = "Backbone";

#[derive(Debug, Deserialize)]
#[serde(rename = "rsbpml")]
struct RsbpmlXml {
    #[serde(rename = "part_list", default)]
    part_lists: Vec<PartListXml>,
}

#[derive(Debug, Deserialize)]
struct PartListXml {
    #[serde(rename = "part", default)]
    parts: Vec<PartXml>,
}

#[derive(Debug, Deserialize)]
struct PartXml {
    #[serde(default)]
    part_name: Option<String>,
    #[serde(default)]
    sequences: Option<SequencesXml>,
    #[serde(default)]
    features: Option<FeaturesXml>,
}

#[derive(Debug, Deserialize)]
struct SequencesXml {
    #[serde(default)]
    seq_data: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FeaturesXml {
    #[serde(rename = "feature", default)]
    features: Vec<FeatureXml>,
}

#[derive(Debug, Deserialize)]
struct FeatureXml {
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    startpos: Option<usize>,
    #[serde(default)]
    endpos: Option<usize>,
}

pub fn parse_biobrick(text: &str, options: &mut ParseOptions) -> Result<Vec<SequenceRecord>> {
    let xml: RsbpmlXml = quick_xml::de::from_str(text)?;
    let mut records = vec![];
    for part in xml.part_lists.into_iter().flat_map(|l| l.parts) {
        let seq: String = part
            .sequences
            .iter()
            .flat_map(|s| s.seq_data.iter())
            .map(String::as_str)
            .collect();
        let part_record = SequenceRecord::new("", &seq, Some(SeqType::Dna));
        if part_record.is_empty() {
            continue;
        }
        let part_len = part_record.len();
        let name = first_name([part.part_name.as_deref(), options.file_stem()]);
        let backbone = options.backbone.clone().unwrap_or_default();
        let mut record = SequenceRecord::new(&name, &(part_record.seq + &backbone), Some(SeqType::Dna));

        for feature in part.features.into_iter().flat_map(|f| f.features) {
            let (Some(start), Some(end)) = (feature.startpos, feature.endpos) else {
                continue;
            };
            let kind = feature.kind.unwrap_or_else(|| "misc_feature".to_string());
            let direction = match feature.direction.as_deref() {
                Some("reverse") => Direction::Reverse,
                Some("forward") => Direction::Forward,
                _ => Direction::None,
            };
            record.annotations.push(Annotation {
                id: options.ids.next_id(),
                name: first_name([feature.title.as_deref(), Some(kind.as_str())]),
                start: start.saturating_sub(1),
                end,
                direction,
                color: None,
                kind,
            });
        }

        if record.len() > part_len {
            record.circular = true;
            record.annotations.push(Annotation {
                id: options.ids.next_id(),
                name: BACKBONE_ANNOTATION.to_string(),
                start: part_len,
                end: record.len(),
                direction: Direction::None,
                color: None,
                kind: "backbone".to_string(),
            });
        }
        record.reduce_ranges();
        records.push(record);
    }
    if records.is_empty() {
        return Err(FormatError::NoSequence { format: "BioBrick" });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PART: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rsbpml>
  <part_list>
    <part>
      <part_id>151</part_id>
      <part_name>BBa_B0034</part_name>
      <part_short_desc>RBS (Elowitz 1999)</part_short_desc>
      <part_type>RBS</part_type>
      <sequences>
        <seq_data>
aaagaggagaaa
        </seq_data>
      </sequences>
      <features>
        <feature>
          <id>1</id>
          <title>conserved</title>
          <type>BioBrick</type>
          <direction>forward</direction>
          <startpos>5</startpos>
          <endpos>8</endpos>
        </feature>
        <feature>
          <id>2</id>
          <type>stop</type>
          <direction>reverse</direction>
          <startpos>10</startpos>
          <endpos>12</endpos>
        </feature>
      </features>
    </part>
  </part_list>
</rsbpml>"#;

    #[test]
    fn test_parse_part() {
        let records = parse_biobrick(PART, &mut ParseOptions::default()).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "BBa_B0034");
        assert_eq!(record.seq, "aaagaggagaaa");
        assert!(!record.circular);
        assert_eq!(record.annotations.len(), 2);
        let conserved = &record.annotations[0];
        assert_eq!(conserved.name, "conserved");
        assert_eq!((conserved.start, conserved.end), (4, 8));
        assert_eq!(conserved.direction, Direction::Forward);
        assert_eq!(record.annotations[1].name, "stop");
        assert_eq!(record.annotations[1].direction, Direction::Reverse);
    }

    #[test]
    fn test_backbone_appended() {
        let mut options = ParseOptions::default().with_backbone("tactagtagcggccgctgcag");
        let record = parse_biobrick(PART, &mut options).unwrap().remove(0);
        assert_eq!(record.len(), 12 + 21);
        assert!(record.seq.ends_with("ctgcag"));
        assert!(record.circular);
        let backbone = record.annotations.last().unwrap();
        assert_eq!(backbone.name, BACKBONE_ANNOTATION);
        assert_eq!((backbone.start, backbone.end), (12, 0));
    }

    #[test]
    fn test_part_without_sequence() {
        let xml = "<rsbpml><part_list><part><part_name>BBa_X</part_name></part></part_list></rsbpml>";
        assert!(matches!(
            parse_biobrick(xml, &mut ParseOptions::default()),
            Err(FormatError::NoSequence { .. })
        ));
    }
}
