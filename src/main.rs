use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use jackc::{driver, TraceOptions};

#[derive(Parser, Debug)]
#[command(version, about = "Compiles Jack classes into stack VM code")]
struct Cli {
    /// A .jack file, or a directory whose .jack files are compiled one by one
    path: PathBuf,

    /// Also write the token trace as <Name>T.xml
    #[arg(short, long)]
    tokens: bool,

    /// Also write the parse tree as <Name>.xml
    #[arg(short, long)]
    parse_tree: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let options = TraceOptions {
        tokens: cli.tokens,
        parse_tree: cli.parse_tree,
    };

    let files = driver::sources(&cli.path)
        .with_context(|| format!("Failed to collect sources from {}", cli.path.display()))?;

    let mut failed = 0;
    for file in &files {
        match driver::compile_file(file, &options) {
            Ok(written) => {
                for path in written {
                    log::info!("wrote {}", path.display());
                }
            }
            Err(e) => {
                log::error!("{e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files failed to compile", files.len());
    }
    Ok(())
}
