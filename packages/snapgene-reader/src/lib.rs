//! Reader for SnapGene `.dna` files.
//!
//! A SnapGene file is a flat list of blocks, each a one-byte type followed by
//! a big-endian `u32` length and the payload. The first block must be the
//! cookie block (type 9) whose payload starts with `SnapGene`. Sequence data
//! lives in block 0; features, primers and notes are XML documents in blocks
//! 10, 5 and 6. Every other block is skipped.

use serde::Deserialize;
use thiserror::Error;

pub const SNAPGENE_MAGIC: &[u8; 8] = b"SnapGene";

const COOKIE_BLOCK: u8 = 9;
const DNA_BLOCK: u8 = 0;
const PRIMERS_BLOCK: u8 = 5;
const NOTES_BLOCK: u8 = 6;
const FEATURES_BLOCK: u8 = 10;
const BLOCK_HEADER_LEN: usize = 5;

#[derive(Debug, Error)]
pub enum SnapGeneError {
    #[error("not a SnapGene file: missing cookie block")]
    BadMagic,

    #[error("SnapGene block {block_type} at offset {offset} is truncated")]
    Truncated { block_type: u8, offset: usize },

    #[error("SnapGene file has no DNA block")]
    NoSequence,

    #[error("invalid SnapGene {block} XML: {message}")]
    Xml {
        block: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, SnapGeneError>;

/// True if `data` opens with a SnapGene cookie block.
pub fn has_snapgene_magic(data: &[u8]) -> bool {
    data.first() == Some(&COOKIE_BLOCK)
        && data.get(BLOCK_HEADER_LEN..BLOCK_HEADER_LEN + SNAPGENE_MAGIC.len())
            == Some(&SNAPGENE_MAGIC[..])
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Directionality {
    #[default]
    None,
    Forward,
    Reverse,
    Bidirectional,
}

impl From<u8> for Directionality {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Forward,
            2 => Self::Reverse,
            3 => Self::Bidirectional,
            _ => Self::None,
        }
    }
}

/// A feature with a 0-based half-open range; `start > end` wraps the origin.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub kind: String,
    pub directionality: Directionality,
    pub start: usize,
    pub end: usize,
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Primer {
    pub name: String,
    pub sequence: String,
    pub start: usize,
    pub end: usize,
    /// True when the primer binds the bottom strand.
    pub reverse: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Notes {
    pub custom_map_label: Option<String>,
    /// Creation date as written by SnapGene, eg `2012.6.26`.
    pub created: Option<String>,
}

impl Notes {
    /// The creation date as `(year, month, day)`.
    pub fn created_ymd(&self) -> Option<(i64, u32, u32)> {
        let mut parts = self.created.as_deref()?.trim().split('.');
        let year = parts.next()?.parse().ok()?;
        let month = parts.next()?.parse().ok()?;
        let day = parts.next()?.parse().ok()?;
        Some((year, month, day))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapGeneFile {
    pub sequence: String,
    pub circular: bool,
    pub features: Vec<Feature>,
    pub primers: Vec<Primer>,
    pub notes: Notes,
}

impl SnapGeneFile {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !has_snapgene_magic(data) {
            return Err(SnapGeneError::BadMagic);
        }
        let mut ret = Self::default();
        let mut has_dna = false;
        for (block_type, payload) in read_blocks(data)? {
            match block_type {
                DNA_BLOCK => {
                    ret.circular = payload.first().is_some_and(|props| props & 1 == 1);
                    let seq = payload.get(1..).unwrap_or_default();
                    ret.sequence = String::from_utf8_lossy(seq).to_string();
                    has_dna = true;
                }
                FEATURES_BLOCK => ret.features = parse_features(payload)?,
                PRIMERS_BLOCK => ret.primers = parse_primers(payload)?,
                NOTES_BLOCK => ret.notes = parse_notes(payload)?,
                _ => {}
            }
        }
        if !has_dna {
            return Err(SnapGeneError::NoSequence);
        }
        Ok(ret)
    }
}

fn read_blocks(data: &[u8]) -> Result<Vec<(u8, &[u8])>> {
    let mut blocks = vec![];
    let mut offset = 0;
    while offset < data.len() {
        let block_type = data[offset];
        let truncated = SnapGeneError::Truncated { block_type, offset };
        let len_bytes: [u8; 4] = data
            .get(offset + 1..offset + BLOCK_HEADER_LEN)
            .and_then(|b| b.try_into().ok())
            .ok_or(truncated)?;
        let len = u32::from_be_bytes(len_bytes) as usize;
        let start = offset + BLOCK_HEADER_LEN;
        let payload = data
            .get(start..start + len)
            .ok_or(SnapGeneError::Truncated { block_type, offset })?;
        blocks.push((block_type, payload));
        offset = start + len;
    }
    Ok(blocks)
}

fn from_xml<'de, T: Deserialize<'de>>(block: &'static str, payload: &'de [u8]) -> Result<T> {
    let text = std::str::from_utf8(payload).map_err(|e| SnapGeneError::Xml {
        block,
        message: e.to_string(),
    })?;
    quick_xml::de::from_str(text).map_err(|e| SnapGeneError::Xml {
        block,
        message: e.to_string(),
    })
}

/// Parses a 1-based inclusive `a-b` range into a 0-based half-open one.
fn parse_range(range: &str) -> Option<(usize, usize)> {
    let (a, b) = range.trim().split_once('-')?;
    let a: usize = a.trim().parse().ok()?;
    let b: usize = b.trim().parse().ok()?;
    Some((a.saturating_sub(1), b))
}

#[derive(Debug, Deserialize)]
struct FeaturesXml {
    #[serde(rename = "Feature", default)]
    features: Vec<FeatureXml>,
}

#[derive(Debug, Deserialize)]
struct FeatureXml {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(rename = "@directionality", default)]
    directionality: Option<u8>,
    #[serde(rename = "Segment", default)]
    segments: Vec<SegmentXml>,
}

#[derive(Debug, Deserialize)]
struct SegmentXml {
    #[serde(rename = "@range", default)]
    range: String,
    #[serde(rename = "@color", default)]
    color: Option<String>,
}

fn parse_features(payload: &[u8]) -> Result<Vec<Feature>> {
    let xml: FeaturesXml = from_xml("Features", payload)?;
    Ok(xml
        .features
        .into_iter()
        .filter_map(|feature| {
            let ranges: Vec<(usize, usize)> = feature
                .segments
                .iter()
                .filter_map(|s| parse_range(&s.range))
                .collect();
            let start = ranges.iter().map(|r| r.0).min()?;
            let end = ranges.iter().map(|r| r.1).max()?;
            let color = feature.segments.iter().find_map(|s| s.color.clone());
            Some(Feature {
                name: feature.name,
                kind: feature.kind,
                directionality: feature.directionality.unwrap_or_default().into(),
                start,
                end,
                color,
            })
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct PrimersXml {
    #[serde(rename = "Primer", default)]
    primers: Vec<PrimerXml>,
}

#[derive(Debug, Deserialize)]
struct PrimerXml {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@sequence", default)]
    sequence: String,
    #[serde(rename = "BindingSite", default)]
    binding_sites: Vec<BindingSiteXml>,
}

#[derive(Debug, Deserialize)]
struct BindingSiteXml {
    #[serde(rename = "@location", default)]
    location: String,
    #[serde(rename = "@boundStrand", default)]
    bound_strand: Option<u8>,
}

fn parse_primers(payload: &[u8]) -> Result<Vec<Primer>> {
    let xml: PrimersXml = from_xml("Primers", payload)?;
    Ok(xml
        .primers
        .into_iter()
        .filter_map(|primer| {
            let site = primer.binding_sites.first()?;
            let (start, end) = parse_range(&site.location)?;
            Some(Primer {
                reverse: site.bound_strand == Some(1),
                name: primer.name,
                sequence: primer.sequence,
                start,
                end,
            })
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct NotesXml {
    #[serde(rename = "CustomMapLabel", default)]
    custom_map_label: Option<String>,
    #[serde(rename = "Created", default)]
    created: Option<CreatedXml>,
}

#[derive(Debug, Deserialize)]
struct CreatedXml {
    #[serde(rename = "$text", default)]
    date: String,
}

fn parse_notes(payload: &[u8]) -> Result<Notes> {
    let xml: NotesXml = from_xml("Notes", payload)?;
    Ok(Notes {
        custom_map_label: xml.custom_map_label.filter(|l| !l.trim().is_empty()),
        created: xml.created.map(|c| c.date),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(block_type: u8, payload: &[u8]) -> Vec<u8> {
        let mut ret = vec![block_type];
        ret.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        ret.extend_from_slice(payload);
        ret
    }

    fn cookie() -> Vec<u8> {
        block(COOKIE_BLOCK, b"SnapGene\x00\x01\x00\x0f\x00\x14")
    }

    fn sample() -> Vec<u8> {
        let mut data = cookie();
        data.extend(block(DNA_BLOCK, b"\x01atgcatgcatgcatgcatgc"));
        data.extend(block(
            NOTES_BLOCK,
            br#"<Notes><Type>Synthetic</Type><CustomMapLabel>pTest</CustomMapLabel><Created UTC="10:00:00">2012.6.26</Created></Notes>"#,
        ));
        data.extend(block(
            FEATURES_BLOCK,
            br##"<Features nextValidID="3">
                <Feature recentID="0" name="lacZ" directionality="2" type="CDS">
                  <Segment range="3-12" color="#993366" type="standard"/>
                  <Q name="note"><V text="partial"/></Q>
                </Feature>
                <Feature recentID="1" name="split" type="misc_feature">
                  <Segment range="14-16" type="standard"/>
                  <Segment range="18-20" type="standard"/>
                </Feature>
                <Feature recentID="2" name="wrap" directionality="3" type="misc_feature">
                  <Segment range="19-2" type="standard"/>
                </Feature>
              </Features>"##,
        ));
        data.extend(block(
            PRIMERS_BLOCK,
            br#"<Primers nextValidID="1"><HybridizationParams minContinuousMatchLen="10"/>
                <Primer recentID="0" name="fwd" sequence="catgcatg">
                  <BindingSite location="4-11" boundStrand="1" annealedBases="catgcatg"/>
                </Primer></Primers>"#,
        ));
        data.extend(block(13, b"\x00\x01unknown"));
        data
    }

    #[test]
    fn test_magic() {
        assert!(has_snapgene_magic(&sample()));
        assert!(!has_snapgene_magic(b"\x09\x00\x00\x00\x0eNotSnap"));
        assert!(!has_snapgene_magic(b""));
        assert!(matches!(
            SnapGeneFile::from_bytes(b"LOCUS"),
            Err(SnapGeneError::BadMagic)
        ));
    }

    #[test]
    fn test_read_sample() {
        let file = SnapGeneFile::from_bytes(&sample()).unwrap();
        assert!(file.circular);
        assert_eq!(file.sequence, "atgcatgcatgcatgcatgc");
        assert_eq!(file.notes.custom_map_label.as_deref(), Some("pTest"));
        assert_eq!(file.notes.created_ymd(), Some((2012, 6, 26)));

        assert_eq!(file.features.len(), 3);
        let lacz = &file.features[0];
        assert_eq!(lacz.name, "lacZ");
        assert_eq!(lacz.kind, "CDS");
        assert_eq!(lacz.directionality, Directionality::Reverse);
        assert_eq!((lacz.start, lacz.end), (2, 12));
        assert_eq!(lacz.color.as_deref(), Some("#993366"));
        let split = &file.features[1];
        assert_eq!(split.directionality, Directionality::None);
        assert_eq!((split.start, split.end), (13, 20));
        let wrap = &file.features[2];
        assert_eq!(wrap.directionality, Directionality::Bidirectional);
        assert_eq!((wrap.start, wrap.end), (18, 2));

        assert_eq!(file.primers.len(), 1);
        assert_eq!(file.primers[0].name, "fwd");
        assert_eq!((file.primers[0].start, file.primers[0].end), (3, 11));
        assert!(file.primers[0].reverse);
    }

    #[test]
    fn test_truncated_block() {
        let mut data = cookie();
        data.extend_from_slice(&[DNA_BLOCK, 0, 0, 0, 50, 0, b'a']);
        assert!(matches!(
            SnapGeneFile::from_bytes(&data),
            Err(SnapGeneError::Truncated { block_type: 0, .. })
        ));
    }

    #[test]
    fn test_missing_dna_block() {
        assert!(matches!(
            SnapGeneFile::from_bytes(&cookie()),
            Err(SnapGeneError::NoSequence)
        ));
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("1-10"), Some((0, 10)));
        assert_eq!(parse_range("x"), None);
    }
}
