//! SnapGene `.dna` files, read through the `snapgene-reader` package.

use crate::{
    alphabet::SeqType,
    error::Result,
    formats::ParseOptions,
    sequence_record::{Annotation, Direction, SequenceRecord, date_to_unix_ms, first_name},
};
use snapgene_reader::{Directionality, SnapGeneFile};

impl From<Directionality> for Direction {
    fn from(value: Directionality) -> Self {
        match value {
            Directionality::Forward => Direction::Forward,
            Directionality::Reverse => Direction::Reverse,
            Directionality::None | Directionality::Bidirectional => Direction::None,
        }
    }
}

pub fn parse_snapgene(data: &[u8], options: &mut ParseOptions) -> Result<Vec<SequenceRecord>> {
    let file = SnapGeneFile::from_bytes(data)?;
    let name = first_name([file.notes.custom_map_label.as_deref(), options.file_stem()]);
    let mut record = SequenceRecord::new(&name, &file.sequence, Some(SeqType::Dna));
    record.circular = file.circular;
    record.date = file
        .notes
        .created_ymd()
        .and_then(|(y, m, d)| date_to_unix_ms(y, m, d));

    for feature in file.features {
        record.annotations.push(Annotation {
            id: options.ids.next_id(),
            name: feature.name,
            start: feature.start,
            end: feature.end,
            direction: feature.directionality.into(),
            color: feature.color,
            kind: feature.kind,
        });
    }
    for primer in file.primers {
        record.primers.push(Annotation {
            id: options.ids.next_id(),
            name: primer.name,
            start: primer.start,
            end: primer.end,
            direction: if primer.reverse {
                Direction::Reverse
            } else {
                Direction::Forward
            },
            color: None,
            kind: "primer_bind".to_string(),
        });
    }
    record.reduce_ranges();
    Ok(vec![record])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::FormatError, id_generator::SequentialIds};

    fn block(block_type: u8, payload: &[u8]) -> Vec<u8> {
        let mut ret = vec![block_type];
        ret.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        ret.extend_from_slice(payload);
        ret
    }

    fn snapgene_file(circular: bool, notes: Option<&str>) -> Vec<u8> {
        let mut data = block(9, b"SnapGene\x00\x01\x00\x0f\x00\x14");
        let mut dna = vec![u8::from(circular)];
        dna.extend_from_slice(b"GAATTCaaaaaaaaaaGGATCC");
        data.extend(block(0, &dna));
        if let Some(notes) = notes {
            data.extend(block(6, notes.as_bytes()));
        }
        data.extend(block(
            10,
            br#"<Features><Feature name="insert" directionality="3" type="misc_feature"><Segment range="7-16"/></Feature>
                <Feature name="tail" directionality="2" type="CDS"><Segment range="17-22"/></Feature></Features>"#,
        ));
        data.extend(block(
            5,
            br#"<Primers><Primer name="p1"><BindingSite location="1-6" boundStrand="0"/></Primer></Primers>"#,
        ));
        data
    }

    #[test]
    fn test_parse_snapgene() {
        let data = snapgene_file(
            true,
            Some("<Notes><CustomMapLabel>pDemo</CustomMapLabel><Created>2012.6.26</Created></Notes>"),
        );
        let mut options = ParseOptions::default().with_ids(SequentialIds::new("sg"));
        let record = parse_snapgene(&data, &mut options).unwrap().remove(0);
        assert_eq!(record.name, "pDemo");
        assert!(record.circular);
        assert_eq!(record.len(), 22);
        assert_eq!(record.date, Some(1_340_668_800_000));

        assert_eq!(record.annotations.len(), 2);
        let insert = &record.annotations[0];
        assert_eq!(insert.id, "sg-0");
        assert_eq!(insert.direction, Direction::None);
        assert_eq!((insert.start, insert.end), (6, 16));
        // Ends at the last base, so the reduced end is the origin.
        assert_eq!(record.annotations[1].end, 0);
        assert_eq!(record.annotations[1].direction, Direction::Reverse);

        assert_eq!(record.primers.len(), 1);
        assert_eq!(record.primers[0].direction, Direction::Forward);
        assert_eq!(record.primers[0].id, "sg-2");
    }

    #[test]
    fn test_name_from_file_stem() {
        let data = snapgene_file(false, None);
        let mut options = ParseOptions::default().with_file_name("vectors/pUC19.dna");
        let record = parse_snapgene(&data, &mut options).unwrap().remove(0);
        assert_eq!(record.name, "pUC19");
        assert!(!record.circular);
        assert_eq!(record.date, None);
    }

    #[test]
    fn test_not_snapgene() {
        assert!(matches!(
            parse_snapgene(b">fasta\nATGC", &mut ParseOptions::default()),
            Err(FormatError::SnapGene(_))
        ));
    }
}
