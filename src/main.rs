use clap::Parser;
use eyre::Result;
use log::info;

fn main() -> Result<()> {
    // Initialize the logger
    pretty_env_logger::init();

    info!("cmdform started");

    cmdform::cli::Cli::parse().run()
}
