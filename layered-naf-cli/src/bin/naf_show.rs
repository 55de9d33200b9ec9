//! naf-show - print the annotation layers of a NAF file.

use clap::Parser;
use layered_naf_cli::ShowArgs;

fn main() -> anyhow::Result<()> {
    let args = ShowArgs::parse();
    args.common.init_logging();

    println!("{}", args.render()?);
    Ok(())
}
