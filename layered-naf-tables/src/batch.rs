//! Directory conversion.
//!
//! Files are processed one at a time, in file-name order. The first error
//! stops the batch; outputs written for earlier files stay in place.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use layered_naf::NafDocument;

use crate::config::{ConllOptions, ConversionConfig, ExtractOptions};
use crate::conll::to_conll;
use crate::diagnostics::Diagnostics;
use crate::errors::{TableError, TableResult};
use crate::extract::{extract_entities, extract_opinions};
use crate::writer::write_records;

/// What one input file produced.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    /// Files written for this input, in write order.
    pub outputs: Vec<PathBuf>,
    pub diagnostics: Diagnostics,
}

/// What a directory run produced, one entry per converted file.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn outputs(&self) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .flat_map(|file| file.outputs.iter().map(PathBuf::as_path))
    }

    pub fn diagnostic_count(&self) -> usize {
        self.files.iter().map(|file| file.diagnostics.len()).sum()
    }
}

/// Input documents of `dir`, sorted by file name.
///
/// Only regular files with an extension accepted by `config` are listed.
pub fn input_files(dir: &Path, config: &ConversionConfig) -> TableResult<Vec<PathBuf>> {
    let io_error = |source| TableError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let accepted = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| config.accepts_extension(ext));
        if accepted {
            files.push(path);
        } else {
            tracing::debug!(path = %path.display(), "skipping entry");
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Write `<stem>.<conll_extension>` for one document.
///
/// A document without any single-token term produces no file.
pub fn convert_conll_file(
    input: &Path,
    output_dir: &Path,
    options: &ConllOptions,
    config: &ConversionConfig,
) -> TableResult<FileReport> {
    let delimiter = delimiter(config.conll_delimiter_byte())?;
    let document = NafDocument::from_path(input)?;
    let converted = to_conll(&document, options, config);

    let mut outputs = Vec::new();
    if converted.value.is_empty() {
        tracing::warn!(input = %input.display(), "no single-token terms, no CoNLL file written");
    } else {
        let path = output_dir.join(format!("{}.{}", stem(input), config.conll_extension));
        write_records(&path, converted.value.records(), delimiter)?;
        outputs.push(path);
    }

    Ok(FileReport {
        input: input.to_path_buf(),
        outputs,
        diagnostics: converted.diagnostics,
    })
}

/// Write `<stem>-entities.csv` and/or `<stem>-opinions.csv` for one document.
///
/// A table with no records produces no file.
pub fn extract_file(
    input: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
    config: &ConversionConfig,
) -> TableResult<FileReport> {
    let delimiter = delimiter(config.csv_delimiter_byte())?;
    let document = NafDocument::from_path(input)?;
    let stem = stem(input);

    let mut tables = Vec::new();
    if options.entities {
        tables.push(("entities", extract_entities(&document)?));
    }
    if options.opinions {
        tables.push(("opinions", extract_opinions(&document, config)?));
    }

    let mut outputs = Vec::new();
    for (kind, table) in tables {
        if table.is_empty() {
            tracing::debug!(input = %input.display(), kind, "no records, file not written");
            continue;
        }
        let path = output_dir.join(format!("{}-{}.csv", stem, kind));
        write_records(&path, table.records(), delimiter)?;
        outputs.push(path);
    }

    Ok(FileReport {
        input: input.to_path_buf(),
        outputs,
        diagnostics: Diagnostics::new(),
    })
}

/// Convert every document of `input_dir` into CoNLL files in `output_dir`.
pub fn convert_conll_dir(
    input_dir: &Path,
    output_dir: &Path,
    options: &ConllOptions,
    config: &ConversionConfig,
) -> TableResult<BatchReport> {
    run_dir(input_dir, output_dir, config, |input| {
        convert_conll_file(input, output_dir, options, config)
    })
}

/// Extract entity and opinion tables for every document of `input_dir`.
pub fn extract_dir(
    input_dir: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
    config: &ConversionConfig,
) -> TableResult<BatchReport> {
    run_dir(input_dir, output_dir, config, |input| {
        extract_file(input, output_dir, options, config)
    })
}

fn run_dir<F>(
    input_dir: &Path,
    output_dir: &Path,
    config: &ConversionConfig,
    mut convert: F,
) -> TableResult<BatchReport>
where
    F: FnMut(&Path) -> TableResult<FileReport>,
{
    let inputs = input_files(input_dir, config)?;
    check_stems(&inputs)?;
    fs::create_dir_all(output_dir).map_err(|source| TableError::Io {
        path: output_dir.display().to_string(),
        source,
    })?;

    let mut report = BatchReport::default();
    for input in &inputs {
        tracing::debug!(input = %input.display(), "converting");
        let file = convert(input)?;
        tracing::info!(
            input = %input.display(),
            outputs = file.outputs.len(),
            diagnostics = file.diagnostics.len(),
            "converted"
        );
        report.files.push(file);
    }
    Ok(report)
}

/// Outputs are named after the input stem, so `doc.naf` and `doc.kaf` in
/// one batch are refused before anything is written.
fn check_stems(inputs: &[PathBuf]) -> TableResult<()> {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    for input in inputs {
        let stem = stem(input);
        if let Some(first) = seen.get(&stem) {
            return Err(TableError::SharedStem {
                stem,
                first: first.display().to_string(),
                second: input.display().to_string(),
            });
        }
        seen.insert(stem, input);
    }
    Ok(())
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn delimiter(byte: Result<u8, String>) -> TableResult<u8> {
    byte.map_err(|message| TableError::Config {
        path: "<configuration>".into(),
        message,
    })
}
