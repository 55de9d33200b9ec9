//! Argument parsing and shared plumbing for the `naf2conll`, `naf-extract`
//! and `naf-show` binaries.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser};
use layered_naf::{DocumentDisplay, NafDocument};
use layered_naf_tables::{
    convert_conll_dir, extract_dir, BatchReport, ConllOptions, ConversionConfig, ExtractOptions,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Printed by `naf-extract` when neither table was requested.
pub const NOTHING_REQUESTED: &str = "No information requested. See help for options";

/// Flags accepted by every command.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// TOML file with formatting settings
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Log per-file progress
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Install the stderr subscriber. `RUST_LOG` overrides the default filter.
    pub fn init_logging(&self) {
        let default_filter = if self.verbose {
            "layered_naf=info,layered_naf_tables=info,layered_naf_cli=info"
        } else {
            "layered_naf=warn,layered_naf_tables=warn,layered_naf_cli=warn"
        };

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    pub fn load_config(&self) -> anyhow::Result<ConversionConfig> {
        let config = ConversionConfig::load_or_default(self.config.as_deref())?;
        tracing::debug!(?config, "configuration");
        Ok(config)
    }
}

/// Convert a directory of NAF files into CoNLL tables
#[derive(Debug, Parser)]
#[command(name = "naf2conll", version)]
pub struct Naf2ConllArgs {
    /// Directory of input NAF files
    #[arg(value_name = "IN")]
    pub input: PathBuf,

    /// Directory for the CoNLL files
    #[arg(value_name = "OUT")]
    pub output: PathBuf,

    /// Include the BIO entity column
    #[arg(short, long)]
    pub entities: bool,

    /// Include part-of-speech tags
    #[arg(short, long)]
    pub pos: bool,

    /// Include lemmas
    #[arg(short, long)]
    pub lemmas: bool,

    /// Include morphological features
    #[arg(short, long)]
    pub morph: bool,

    /// Include token character offsets
    #[arg(long)]
    pub offsets: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl Naf2ConllArgs {
    pub fn options(&self) -> ConllOptions {
        ConllOptions {
            lemmas: self.lemmas,
            pos: self.pos,
            morph: self.morph,
            offsets: self.offsets,
            entities: self.entities,
        }
    }

    pub fn run(&self) -> anyhow::Result<BatchReport> {
        let config = self.common.load_config()?;
        convert_conll_dir(&self.input, &self.output, &self.options(), &config).with_context(
            || format!("converting {} to CoNLL", self.input.display()),
        )
    }
}

/// Extract entity and opinion tables from a directory of NAF files
#[derive(Debug, Parser)]
#[command(name = "naf-extract", version)]
pub struct ExtractArgs {
    /// Directory of input NAF files
    #[arg(value_name = "IN")]
    pub input: PathBuf,

    /// Directory for the CSV files
    #[arg(value_name = "OUT")]
    pub output: PathBuf,

    /// Write an entity table per document
    #[arg(short, long)]
    pub entities: bool,

    /// Write an opinion table per document
    #[arg(short, long)]
    pub opinions: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ExtractArgs {
    pub fn options(&self) -> ExtractOptions {
        ExtractOptions {
            entities: self.entities,
            opinions: self.opinions,
        }
    }

    /// Returns `None` without touching the filesystem when no table was
    /// requested.
    pub fn run(&self) -> anyhow::Result<Option<BatchReport>> {
        let options = self.options();
        if !options.any() {
            return Ok(None);
        }
        let config = self.common.load_config()?;
        let report = extract_dir(&self.input, &self.output, &options, &config)
            .with_context(|| format!("extracting tables from {}", self.input.display()))?;
        Ok(Some(report))
    }
}

/// Print the annotation layers of one NAF file
#[derive(Debug, Parser)]
#[command(name = "naf-show", version)]
pub struct ShowArgs {
    /// NAF file to display
    pub file: PathBuf,

    /// Also underline opinion holders, targets and expressions
    #[arg(long)]
    pub opinions: bool,

    /// Print the loaded document as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ShowArgs {
    pub fn render(&self) -> anyhow::Result<String> {
        let document = NafDocument::from_path(&self.file)
            .with_context(|| format!("loading {}", self.file.display()))?;

        if self.json {
            return Ok(serde_json::to_string_pretty(&document)?);
        }

        let mut display = DocumentDisplay::new(&document).with_entities();
        if self.opinions {
            display.include_opinions();
        }
        Ok(display.to_string())
    }
}

/// One line describing a finished batch. Individual diagnostics were
/// already logged as they were recorded.
pub fn summary(report: &BatchReport) -> String {
    format!(
        "{} files converted, {} files written, {} warnings",
        report.files.len(),
        report.outputs().count(),
        report.diagnostic_count()
    )
}
