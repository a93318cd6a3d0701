//! FASTA, legacy `;`-commented FASTA, and bare sequence text.

use crate::{
    error::{FormatError, Result},
    formats::ParseOptions,
    sequence_record::{SequenceRecord, first_name},
};
use bio::io::fasta;

pub fn parse_fasta(text: &str, options: &mut ParseOptions) -> Result<Vec<SequenceRecord>> {
    let head = text.trim_start();
    let records = if head.starts_with('>') {
        parse_headed(head)?
    } else if head.starts_with(';') {
        vec![parse_legacy(head, options)]
    } else {
        let name = first_name([options.file_stem()]);
        vec![SequenceRecord::new(&name, head, None)]
    };
    let records: Vec<SequenceRecord> = records.into_iter().filter(|r| !r.is_empty()).collect();
    if records.is_empty() {
        return Err(FormatError::NoSequence { format: "FASTA" });
    }
    Ok(records)
}

fn parse_headed(text: &str) -> Result<Vec<SequenceRecord>> {
    let mut records = vec![];
    for record in fasta::Reader::new(text.as_bytes()).records() {
        let record = record?;
        let name = match record.desc() {
            Some(desc) => format!("{} {}", record.id(), desc),
            None => record.id().to_string(),
        };
        let seq = String::from_utf8_lossy(record.seq());
        records.push(SequenceRecord::new(&first_name([Some(name.as_str())]), &seq, None));
    }
    Ok(records)
}

/// The first `;` comment names the record; later comments are ignored.
fn parse_legacy(text: &str, options: &ParseOptions) -> SequenceRecord {
    let mut name = None;
    let mut seq = String::new();
    for line in text.lines() {
        match line.strip_prefix(';') {
            Some(comment) => {
                if name.is_none() {
                    name = Some(comment.trim());
                }
            }
            None => seq.push_str(line.trim()),
        }
    }
    SequenceRecord::new(&first_name([name, options.file_stem()]), &seq, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::SeqType;

    #[test]
    fn test_multi_record() {
        let text = ">seq1 first one\nATGC\nATGC\n\n>seq2\nMKVLAAGIVG\n>empty\n";
        let records = parse_fasta(text, &mut ParseOptions::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "seq1 first one");
        assert_eq!(records[0].seq, "ATGCATGC");
        assert_eq!(records[0].seq_type, SeqType::Dna);
        assert_eq!(records[0].complement_seq, "TACGTACG");
        assert_eq!(records[1].name, "seq2");
        assert_eq!(records[1].seq_type, SeqType::Aa);
        assert!(records[1].complement_seq.is_empty());
    }

    #[test]
    fn test_legacy_comments() {
        let text = ";my insert\n;second comment\nAUGC\nAUGC\n";
        let records = parse_fasta(text, &mut ParseOptions::default()).unwrap();
        assert_eq!(records[0].name, "my insert");
        assert_eq!(records[0].seq, "AUGCAUGC");
        assert_eq!(records[0].seq_type, SeqType::Rna);
    }

    #[test]
    fn test_bare_sequence_uses_file_stem() {
        let mut options = ParseOptions::default().with_file_name("dir/frag.seq");
        let records = parse_fasta("acgt\nacgt", &mut options).unwrap();
        assert_eq!(records[0].name, "frag");
        assert_eq!(records[0].seq, "acgtacgt");

        let records = parse_fasta("acgt", &mut ParseOptions::default()).unwrap();
        assert_eq!(records[0].name, "Unnamed");
    }

    #[test]
    fn test_only_headers_fails() {
        assert!(matches!(
            parse_fasta(">a\n>b\n", &mut ParseOptions::default()),
            Err(FormatError::NoSequence { .. })
        ));
    }
}
