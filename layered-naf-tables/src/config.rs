//! Conversion configuration.
//!
//! Field selection comes from command-line flags ([`ConllOptions`],
//! [`ExtractOptions`]). Formatting comes from [`ConversionConfig`], which
//! may be loaded from a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{TableError, TableResult};

/// Formatting settings shared by both pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    /// Prefix stripped from term ids to build row keys.
    pub term_prefix: String,
    /// Field delimiter of the CoNLL table.
    pub conll_delimiter: String,
    /// Field delimiter of the entity and opinion tables.
    pub csv_delimiter: String,
    /// Sentinel written for every field of an absent opinion part.
    pub placeholder: String,
    /// Extension of the CoNLL output files.
    pub conll_extension: String,
    /// Extensions of the input files to convert.
    pub input_extensions: Vec<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            term_prefix: "t".into(),
            conll_delimiter: "\t".into(),
            csv_delimiter: ",".into(),
            placeholder: "-".into(),
            conll_extension: "conll".into(),
            input_extensions: vec!["naf".into(), "kaf".into(), "xml".into()],
        }
    }
}

impl ConversionConfig {
    /// Load from a TOML file. Keys left out keep their defaults.
    pub fn load(path: &Path) -> TableResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| TableError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content).map_err(|message| TableError::Config {
            path: path.display().to_string(),
            message,
        })
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> TableResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn from_toml(content: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        config.conll_delimiter_byte()?;
        config.csv_delimiter_byte()?;
        Ok(config)
    }

    pub fn conll_delimiter_byte(&self) -> Result<u8, String> {
        single_byte("conll_delimiter", &self.conll_delimiter)
    }

    pub fn csv_delimiter_byte(&self) -> Result<u8, String> {
        single_byte("csv_delimiter", &self.csv_delimiter)
    }

    /// Whether a file with this extension should be converted.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.input_extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(extension))
    }
}

fn single_byte(key: &str, value: &str) -> Result<u8, String> {
    match value.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(format!(
            "{} must be a single byte, got {:?}",
            key, value
        )),
    }
}

/// Fields of the CoNLL table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConllOptions {
    pub lemmas: bool,
    pub pos: bool,
    pub morph: bool,
    /// Add the token's character offset as a column.
    pub offsets: bool,
    /// Add the `nerc` BIO column.
    pub entities: bool,
}

/// Tables produced by the extraction pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub entities: bool,
    pub opinions: bool,
}

impl ExtractOptions {
    /// True when at least one annotation type was requested.
    pub fn any(&self) -> bool {
        self.entities || self.opinions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ConversionConfig::from_toml("placeholder = \"NA\"\n").unwrap();
        assert_eq!(config.placeholder, "NA");
        assert_eq!(config.term_prefix, "t");
        assert_eq!(config.conll_delimiter_byte(), Ok(b'\t'));
    }

    #[test]
    fn test_multi_byte_delimiter_rejected() {
        let err = ConversionConfig::from_toml("csv_delimiter = \";;\"\n").unwrap_err();
        assert!(err.contains("csv_delimiter"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(ConversionConfig::from_toml("delimiter = \",\"\n").is_err());
    }

    #[test]
    fn test_accepts_extension() {
        let config = ConversionConfig::default();
        assert!(config.accepts_extension("naf"));
        assert!(config.accepts_extension("NAF"));
        assert!(!config.accepts_extension("txt"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConversionConfig::load(Path::new("/nonexistent/naf.toml")).unwrap_err();
        assert!(matches!(err, TableError::Config { .. }));
    }
}
