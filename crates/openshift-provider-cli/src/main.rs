mod command;

use anyhow::Result;
use clap::Parser;
use fluvio_future::task::run_block_on;

use self::command::Cli;

fn main() -> Result<()> {
    fluvio_future::subscriber::init_logger();
    let cli = Cli::parse();
    run_block_on(cli.process())
}
