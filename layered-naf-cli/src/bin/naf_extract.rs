//! naf-extract - write entity and opinion CSV tables for a directory of NAF
//! files.

use clap::Parser;
use layered_naf_cli::{summary, ExtractArgs, NOTHING_REQUESTED};

fn main() -> anyhow::Result<()> {
    let args = ExtractArgs::parse();
    args.common.init_logging();

    match args.run()? {
        Some(report) => eprintln!("{}", summary(&report)),
        None => println!("{}", NOTHING_REQUESTED),
    }
    Ok(())
}
