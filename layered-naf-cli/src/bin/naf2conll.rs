//! naf2conll - convert a directory of NAF files into CoNLL tables.

use clap::Parser;
use layered_naf_cli::{summary, Naf2ConllArgs};

fn main() -> anyhow::Result<()> {
    let args = Naf2ConllArgs::parse();
    args.common.init_logging();

    let report = args.run()?;
    eprintln!("{}", summary(&report));
    Ok(())
}
