use crate::restriction_enzyme::Enzyme;
use anyhow::{Result, anyhow};
use log::error;
use std::{collections::HashMap, fs};

const BUILTIN_ENZYMES_JSON: &str = include_str!("../assets/enzymes.json");

/// The preset restriction enzyme table, looked up case-insensitively by name.
#[derive(Clone, Debug, Default)]
pub struct Enzymes {
    restriction_enzymes: Vec<Enzyme>,
    by_name: HashMap<String, usize>,
}

impl Enzymes {
    pub fn new(json_text: &str) -> Result<Self> {
        let restriction_enzymes = load_enzymes_from_json_text(json_text)?;
        let by_name = restriction_enzymes
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.to_ascii_lowercase(), i))
            .collect();
        Ok(Self {
            restriction_enzymes,
            by_name,
        })
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_ENZYMES_JSON).unwrap_or_else(|e| {
            error!("Built-in enzyme table is invalid: {e}");
            Self::default()
        })
    }

    pub fn get(&self, name: &str) -> Option<&Enzyme> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .and_then(|i| self.restriction_enzymes.get(*i))
    }

    pub fn len(&self) -> usize {
        self.restriction_enzymes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restriction_enzymes.is_empty()
    }
}

pub fn load_enzymes_from_json_text(json_text: &str) -> Result<Vec<Enzyme>> {
    let res: serde_json::Value = serde_json::from_str(json_text)?;
    let arr = res
        .as_array()
        .ok_or(anyhow!("Enzymes file is not a JSON array"))?;
    let mut ret = Vec::with_capacity(arr.len());
    for row in arr {
        let enzyme: Enzyme = serde_json::from_value(row.clone())
            .map_err(|e| anyhow!("Bad restriction enzyme {row}: {e}"))?;
        if enzyme.rseq.is_empty() {
            return Err(anyhow!("Restriction enzyme '{}' has no recognition sequence", enzyme.name));
        }
        ret.push(enzyme);
    }
    Ok(ret)
}

pub fn load_enzymes_from_path(path: &str) -> Result<Vec<Enzyme>> {
    let text = fs::read_to_string(path).map_err(|e| anyhow!("Could not read enzyme file '{path}': {e}"))?;
    load_enzymes_from_json_text(&text)
}

/// Keys a custom enzyme list by name, the shape `digest` takes.
pub fn custom_enzyme_map(enzymes: Vec<Enzyme>) -> HashMap<String, Enzyme> {
    enzymes.into_iter().map(|e| (e.name.clone(), e)).collect()
}
