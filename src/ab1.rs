//! ABIF (`.ab1`) Sanger chromatogram parser.
//!
//! An ABIF file is a big-endian tagged directory. The header holds one
//! directory entry at offset 6 pointing at the real directory; each 28-byte
//! entry names a tag (`PBAS`, `PLOC`, `DATA`...) and a tag number, and stores
//! its payload inline when it fits in four bytes.

use crate::{
    alphabet::SeqType,
    error::{FormatError, Result},
    formats::ParseOptions,
    sequence_record::{Chromatogram, SequenceRecord, first_name},
};

pub const ABIF_MAGIC: &[u8; 4] = b"ABIF";

const FORMAT: &str = "ab1";
const HEADER_LEN: usize = 34;
const DIR_ENTRY_SIZE: usize = 28;
/// Bases of the raw trace channels `DATA` 9 to 12 when no `FWO_` tag gives the
/// filter wheel order.
const DEFAULT_CHANNEL_ORDER: &[u8; 4] = b"GACT";

#[derive(Debug)]
struct DirEntry {
    offset: usize,
    tag: [u8; 4],
    number: i32,
    num_elements: usize,
    data_size: usize,
    data_offset: usize,
}

fn truncated(reason: String) -> FormatError {
    FormatError::Truncated {
        format: FORMAT,
        reason,
    }
}

fn read_i32(data: &[u8], offset: usize) -> Result<i32> {
    data.get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(i32::from_be_bytes)
        .ok_or_else(|| truncated(format!("i32 at offset {offset}")))
}

fn read_entry(data: &[u8], offset: usize) -> Result<DirEntry> {
    let tag: [u8; 4] = data
        .get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| truncated(format!("directory entry at offset {offset}")))?;
    Ok(DirEntry {
        offset,
        tag,
        number: read_i32(data, offset + 4)?,
        num_elements: read_i32(data, offset + 12)?.max(0) as usize,
        data_size: read_i32(data, offset + 16)?.max(0) as usize,
        data_offset: read_i32(data, offset + 20)?.max(0) as usize,
    })
}

impl DirEntry {
    fn payload<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        let start = if self.data_size <= 4 {
            self.offset + 20
        } else {
            self.data_offset
        };
        data.get(start..start + self.data_size).ok_or_else(|| {
            truncated(format!(
                "{} payload of {} bytes at offset {start}",
                String::from_utf8_lossy(&self.tag),
                self.data_size
            ))
        })
    }
}

struct Directory<'a> {
    data: &'a [u8],
    entries: Vec<DirEntry>,
}

impl<'a> Directory<'a> {
    fn read(data: &'a [u8]) -> Result<Self> {
        if data.len() < HEADER_LEN || !data.starts_with(ABIF_MAGIC) {
            return Err(FormatError::Signature {
                format: FORMAT,
                reason: "missing ABIF header".to_string(),
            });
        }
        let num_entries = read_i32(data, 18)?.max(0) as usize;
        let dir_offset = read_i32(data, 26)?.max(0) as usize;
        let entries = (0..num_entries)
            .map(|i| read_entry(data, dir_offset + i * DIR_ENTRY_SIZE))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { data, entries })
    }

    fn find(&self, tag: &[u8; 4], number: i32) -> Option<&DirEntry> {
        self.entries
            .iter()
            .find(|e| &e.tag == tag && e.number == number)
    }

    /// Payload bytes of the first of `numbers` present for `tag`.
    fn bytes(&self, tag: &[u8; 4], numbers: &[i32]) -> Result<Option<&'a [u8]>> {
        match numbers.iter().find_map(|n| self.find(tag, *n)) {
            Some(entry) => {
                let payload = entry.payload(self.data)?;
                Ok(Some(&payload[..entry.num_elements.min(payload.len())]))
            }
            None => Ok(None),
        }
    }

    /// Big-endian 16-bit words of the first of `numbers` present for `tag`.
    fn words(&self, tag: &[u8; 4], numbers: &[i32]) -> Result<Option<Vec<u16>>> {
        let Some(entry) = numbers.iter().find_map(|n| self.find(tag, *n)) else {
            return Ok(None);
        };
        let payload = entry.payload(self.data)?;
        Ok(Some(
            payload
                .chunks_exact(2)
                .take(entry.num_elements)
                .map(|w| u16::from_be_bytes([w[0], w[1]]))
                .collect(),
        ))
    }
}

pub fn parse_ab1(data: &[u8], options: &mut ParseOptions) -> Result<Vec<SequenceRecord>> {
    let dir = Directory::read(data)?;

    let bases = dir
        .bytes(b"PBAS", &[2, 1])?
        .filter(|b| !b.is_empty())
        .ok_or(FormatError::NoSequence { format: FORMAT })?;
    let peaks = dir.words(b"PLOC", &[2, 1])?.unwrap_or_default();
    let qualities = dir
        .bytes(b"PCON", &[2, 1])?
        .map(<[u8]>::to_vec)
        .unwrap_or_default();
    let channel_order = match dir.bytes(b"FWO_", &[1])? {
        Some(order) if order.len() == 4 => order,
        _ => &DEFAULT_CHANNEL_ORDER[..],
    };

    let mut chromatogram = Chromatogram {
        qualities,
        peak_positions: peaks.clone(),
        ..Default::default()
    };
    for (number, base) in (9..=12).zip(channel_order) {
        let raw = dir.words(b"DATA", &[number])?.unwrap_or_default();
        // Resample the trace at each called peak.
        let trace: Vec<i16> = peaks
            .iter()
            .map(|&p| raw.get(p as usize).map_or(0, |&v| v as i16))
            .collect();
        match base.to_ascii_uppercase() {
            b'A' => chromatogram.a = trace,
            b'C' => chromatogram.c = trace,
            b'G' => chromatogram.g = trace,
            b'T' => chromatogram.t = trace,
            _ => {}
        }
    }

    // SMPL is a Pascal string; skip its length byte.
    let sample = dir
        .bytes(b"SMPL", &[1])?
        .and_then(|b| b.get(1..))
        .map(String::from_utf8_lossy);
    let name = first_name([sample.as_deref(), options.file_stem()]);

    let mut record = SequenceRecord::new(&name, &String::from_utf8_lossy(bases), Some(SeqType::Dna));
    record.chromatogram = Some(chromatogram);
    Ok(vec![record])
}
