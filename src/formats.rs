//! Format detection and the shared parser entry points.

use crate::{
    ab1, biobrick,
    error::{FormatError, Result},
    fasta, genbank,
    id_generator::{IdGenerator, RandomIds},
    jbei, sbol,
    sequence_record::SequenceRecord,
    snapgene,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};

/// Caller-supplied knobs shared by every parser.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Used to name records that carry no usable name of their own.
    pub file_name: Option<String>,
    /// BioBrick backbone appended after the part sequence.
    pub backbone: Option<String>,
    /// Overrides the topology of every parsed record.
    pub circular: Option<bool>,
    #[serde(skip, default = "default_id_generator")]
    pub ids: Box<dyn IdGenerator>,
}

fn default_id_generator() -> Box<dyn IdGenerator> {
    Box::new(RandomIds)
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            file_name: None,
            backbone: None,
            circular: None,
            ids: default_id_generator(),
        }
    }
}

impl ParseOptions {
    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    pub fn with_backbone(mut self, backbone: &str) -> Self {
        self.backbone = Some(backbone.to_string());
        self
    }

    pub fn with_circular(mut self, circular: bool) -> Self {
        self.circular = Some(circular);
        self
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// The file name without directories and extension.
    pub fn file_stem(&self) -> Option<&str> {
        let file_name = self.file_name.as_deref()?;
        Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.trim().is_empty())
    }

    fn extension(&self) -> Option<String> {
        let file_name = self.file_name.as_deref()?;
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    GenBank,
    Fasta,
    Sbol,
    SnapGene,
    Ab1,
    Jbei,
    BioBrick,
}

impl FileFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::GenBank => "GenBank",
            Self::Fasta => "FASTA",
            Self::Sbol => "SBOL",
            Self::SnapGene => "SnapGene",
            Self::Ab1 => "ab1",
            Self::Jbei => "JBEI",
            Self::BioBrick => "BioBrick",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "gb" | "gbk" | "genbank" | "ape" => Some(Self::GenBank),
            "fa" | "fas" | "fasta" | "fna" | "seq" | "txt" => Some(Self::Fasta),
            "sbol" | "rdf" => Some(Self::Sbol),
            "dna" => Some(Self::SnapGene),
            "ab1" | "abi" => Some(Self::Ab1),
            _ => None,
        }
    }
}

impl FromStr for FileFormat {
    type Err = FormatError;

    /// Accepts a format label or a file extension, case-insensitively.
    fn from_str(name: &str) -> Result<Self> {
        let name = name.trim().trim_start_matches('.').to_ascii_lowercase();
        [
            Self::GenBank,
            Self::Fasta,
            Self::Sbol,
            Self::SnapGene,
            Self::Ab1,
            Self::Jbei,
            Self::BioBrick,
        ]
        .into_iter()
        .find(|format| format.label().eq_ignore_ascii_case(&name))
        .or_else(|| Self::from_extension(&name))
        .ok_or(FormatError::UnknownFormat(name))
    }
}

/// Sniffs the format from magic bytes, then content, then the file extension.
pub fn detect_format(input: &[u8], options: &ParseOptions) -> Option<FileFormat> {
    if snapgene_reader::has_snapgene_magic(input) {
        return Some(FileFormat::SnapGene);
    }
    if input.starts_with(ab1::ABIF_MAGIC) {
        return Some(FileFormat::Ab1);
    }
    let text = String::from_utf8_lossy(input);
    let head = text.trim_start();
    if head.starts_with("LOCUS") {
        return Some(FileFormat::GenBank);
    }
    if head.starts_with('>') || head.starts_with(';') {
        return Some(FileFormat::Fasta);
    }
    if head.starts_with('<') {
        if text.contains("<rsbpml") {
            return Some(FileFormat::BioBrick);
        }
        if text.contains("<seq:seq") {
            return Some(FileFormat::Jbei);
        }
        if text.contains("ComponentDefinition") || text.contains("DnaComponent") {
            return Some(FileFormat::Sbol);
        }
    }
    options
        .extension()
        .as_deref()
        .and_then(FileFormat::from_extension)
}

pub fn parse_format(
    format: FileFormat,
    input: &[u8],
    options: &mut ParseOptions,
) -> Result<Vec<SequenceRecord>> {
    let mut records = match format {
        FileFormat::SnapGene => snapgene::parse_snapgene(input, options),
        FileFormat::Ab1 => ab1::parse_ab1(input, options),
        FileFormat::GenBank => genbank::parse_genbank(&String::from_utf8_lossy(input), options),
        FileFormat::Fasta => fasta::parse_fasta(&String::from_utf8_lossy(input), options),
        FileFormat::Sbol => sbol::parse_sbol(&String::from_utf8_lossy(input), options),
        FileFormat::Jbei => jbei::parse_jbei(&String::from_utf8_lossy(input), options),
        FileFormat::BioBrick => biobrick::parse_biobrick(&String::from_utf8_lossy(input), options),
    }?;
    if let Some(circular) = options.circular {
        for record in &mut records {
            record.circular = circular;
        }
    }
    Ok(records)
}

/// Parses any supported format; undetectable text is read as a bare sequence.
pub fn parse_bytes(input: &[u8], options: &mut ParseOptions) -> Result<Vec<SequenceRecord>> {
    if input.iter().all(|c| c.is_ascii_whitespace()) {
        return Err(FormatError::Empty);
    }
    let format = detect_format(input, options).unwrap_or(FileFormat::Fasta);
    parse_format(format, input, options)
}

pub fn parse_file(path: &str, options: &mut ParseOptions) -> Result<Vec<SequenceRecord>> {
    let input = fs::read(path)?;
    if options.file_name.is_none() {
        options.file_name = Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string);
    }
    parse_bytes(&input, options)
}
