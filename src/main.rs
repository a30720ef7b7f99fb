use clap::Parser;
use discin::logging;
use discin::presentation::cli::{run, Cli};
use tracing::{debug, error};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)?;
    debug!("discin starting");

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
