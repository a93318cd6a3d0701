//! Error type shared by all format parsers.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FormatError>;

/// Hard failure of a format parser.
///
/// Parsers only fail when no sequence can be extracted or the container can
/// not be read at all; everything else degrades to defaults.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("input is empty")]
    Empty,

    #[error("no sequence found in {format} input")]
    NoSequence { format: &'static str },

    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("malformed GenBank: {0}")]
    GenBank(String),

    #[error("not a {format} file: {reason}")]
    Signature {
        format: &'static str,
        reason: String,
    },

    #[error("{format} data is truncated: {reason}")]
    Truncated {
        format: &'static str,
        reason: String,
    },

    #[error("could not determine the sequence format of '{0}'")]
    UnknownFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SnapGene(#[from] snapgene_reader::SnapGeneError),
}

impl From<quick_xml::Error> for FormatError {
    fn from(err: quick_xml::Error) -> Self {
        FormatError::Xml(err.to_string())
    }
}

impl From<quick_xml::DeError> for FormatError {
    fn from(err: quick_xml::DeError) -> Self {
        FormatError::Xml(err.to_string())
    }
}

impl From<gb_io::reader::GbParserError> for FormatError {
    fn from(err: gb_io::reader::GbParserError) -> Self {
        FormatError::GenBank(err.to_string())
    }
}
