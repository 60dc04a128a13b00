use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use crate::{inspect::InspectArgs, run::RunArgs};

mod geojson_surface;
mod inspect;
mod run;
mod svg_view;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file and write the routes
    Run {
        #[command(flatten)]
        args: RunArgs,
    },
    /// Print the vehicles of a problem file
    #[command(visible_alias = "i")]
    Inspect {
        #[command(flatten)]
        args: InspectArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename(".env.local").ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Run { args } => run::run(args).await?,
        Commands::Inspect { args } => inspect::run(args)?,
    }

    Ok(())
}
