//! Writes records back out as GenBank or FASTA text.

use crate::{
    alphabet::SeqType,
    feature_location::to_gb_location,
    sequence_record::{Annotation, SequenceRecord, unix_ms_to_date},
};
use anyhow::Result;
use bio::io::fasta;
use gb_io::seq::{Date, Feature, Seq, Topology};

fn gb_feature(annotation: &Annotation, seq_len: usize) -> Feature {
    let mut qualifiers = vec![("label".into(), Some(annotation.name.clone()))];
    if let Some(color) = &annotation.color {
        qualifiers.push(("ApEinfo_fwdcolor".into(), Some(color.clone())));
    }
    Feature {
        kind: annotation.kind.clone().into(),
        location: to_gb_location(annotation.start, annotation.end, annotation.direction, seq_len),
        qualifiers,
    }
}

fn locus_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Converts a record into a gb-io sequence, primers included as features.
pub fn to_gb_seq(record: &SequenceRecord) -> Seq {
    let mut seq = Seq::empty();
    seq.name = Some(locus_name(&record.name));
    seq.topology = if record.circular {
        Topology::Circular
    } else {
        Topology::Linear
    };
    seq.molecule_type = match record.seq_type {
        SeqType::Rna => Some("RNA".to_string()),
        SeqType::Aa => None,
        _ => Some("DNA".to_string()),
    };
    seq.date = record.date.and_then(|ms| {
        let (year, month, day) = unix_ms_to_date(ms);
        Date::from_ymd(year as i32, month, day).ok()
    });
    seq.seq = record.seq.clone().into_bytes();
    seq.len = Some(record.len());
    seq.features = record
        .annotations
        .iter()
        .chain(record.primers.iter())
        .map(|annotation| gb_feature(annotation, record.len()))
        .collect();
    seq
}

pub fn to_genbank(record: &SequenceRecord) -> Result<String> {
    let mut buffer = vec![];
    gb_io::writer::write(&mut buffer, &to_gb_seq(record))?;
    Ok(String::from_utf8(buffer)?)
}

/// One FASTA entry per record; the first word of the name becomes the id.
pub fn to_fasta(records: &[SequenceRecord]) -> Result<String> {
    let mut buffer = vec![];
    {
        let mut writer = fasta::Writer::new(&mut buffer);
        for record in records {
            let (id, desc) = match record.name.split_once(' ') {
                Some((id, desc)) => (id, Some(desc)),
                None => (record.name.as_str(), None),
            };
            writer.write(id, desc, record.seq.as_bytes())?;
        }
        writer.flush()?;
    }
    Ok(String::from_utf8(buffer)?)
}
