mod cmd;
mod output;
mod rt;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use cmd::check::CheckOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "check-queue",
    about = "Check support ticket queues against per-status SLA policies",
    version,
    propagate_version = true
)]
struct Cli {
    /// Parameter file
    #[arg(
        short = 'p',
        long = "paramfile",
        global = true,
        env = "QUEUECHECK_CONFIG",
        default_value = "config.yaml"
    )]
    paramfile: PathBuf,

    /// Verbose (-v info, -vv debug)
    #[arg(short = 'v', global = true, action = ArgAction::Count)]
    verbosity: u8,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Check tickets owned by the current user
    #[arg(long, conflicts_with = "who")]
    me: bool,

    /// Check tickets owned by someone else (e.g. Nobody)
    #[arg(long)]
    who: Option<String>,

    /// Tickets fetched and classified per round
    #[arg(long)]
    batch_size: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every matching ticket (the default)
    Check,

    /// Validate the parameter file
    Validate,
}

fn current_user() -> anyhow::Result<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .context("--me needs USER to be set")
}

fn run_check(cli: &Cli) -> anyhow::Result<()> {
    let who = if cli.me {
        Some(current_user()?)
    } else {
        cli.who.clone()
    };
    cmd::check::run(
        &cli.paramfile,
        CheckOptions {
            who: who.as_deref(),
            batch_size: cli.batch_size,
            json: cli.json,
        },
    )
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Some(Commands::Validate) => cmd::validate::run(&cli.paramfile, cli.json),
        Some(Commands::Check) | None => run_check(&cli),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
