use anyhow::Result;
use clap::Parser;
use memnet_dialog::cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("memnet_dialog=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
