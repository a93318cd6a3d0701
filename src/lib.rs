use enzymes::Enzymes;
use lazy_static::lazy_static;

pub mod ab1;
pub mod alphabet;
pub mod biobrick;
pub mod digest;
pub mod enzymes;
pub mod error;
pub mod export;
pub mod fasta;
pub mod feature_location;
pub mod formats;
pub mod genbank;
pub mod id_generator;
pub mod iupac_code;
pub mod jbei;
pub mod restriction_enzyme;
pub mod sbol;
pub mod search;
pub mod sequence_record;
pub mod snapgene;
pub mod stacking;
pub mod xml_tree;

pub use error::FormatError;
pub use formats::{FileFormat, ParseOptions, parse_bytes, parse_file};
pub use sequence_record::{Annotation, Direction, SequenceRecord};

lazy_static! {
    // Preset restriction enzymes
    pub static ref ENZYMES: Enzymes = Enzymes::builtin();
}
