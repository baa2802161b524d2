use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use numlens::{
    Config, JsonStore, LookupClient, PhoneNumber, ReportStore, TelegramClient, Workflow,
};

#[derive(Parser)]
#[command(name = "numlens")]
#[command(about = "Telegram phone number lookup bot with community reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the YAML config file
    #[arg(long, default_value = "numlens.yml")]
    config: PathBuf,

    /// Path to the report store, overriding the config
    #[arg(long)]
    store_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot loop and the liveness endpoint
    Run,

    /// Look up a single number from the terminal
    Lookup {
        /// Phone number in any format; non-digits are stripped
        number: String,
    },

    /// Show the community reports recorded for a number
    Reports {
        /// Phone number in any format; non-digits are stripped
        number: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("numlens=info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(path) = cli.store_path {
        config.store.path = path;
    }

    match cli.command {
        Commands::Run => run_bot(config).await,
        Commands::Lookup { number } => lookup_once(config, &number).await,
        Commands::Reports { number } => show_reports(config, &number),
    }
}

async fn run_bot(config: Config) -> Result<()> {
    let token = std::env::var("BOT_TOKEN").context("BOT_TOKEN not set")?;
    let api_key = std::env::var("API_KEY").context("API_KEY not set")?;

    let lookup = LookupClient::new(&config.lookup, api_key);
    let store = JsonStore::new(&config.store.path);
    let workflow = Workflow::new(lookup, store);

    let telegram = TelegramClient::new(&token);
    let port = config.listen_port();

    tokio::try_join!(
        numlens::server::run(port),
        numlens::telegram::run(&telegram, &workflow, config.telegram.poll_timeout_secs),
    )?;

    Ok(())
}

async fn lookup_once(config: Config, number: &str) -> Result<()> {
    let api_key = std::env::var("API_KEY").context("API_KEY not set")?;

    let lookup = LookupClient::new(&config.lookup, api_key);
    let store = JsonStore::new(&config.store.path);
    let workflow = Workflow::new(lookup, store);

    let reply = workflow.handle_message(number).await;

    println!("{}", reply.text);
    for link in &reply.links {
        println!("{}: {}", link.label, link.url);
    }

    Ok(())
}

fn show_reports(config: Config, number: &str) -> Result<()> {
    let number = match PhoneNumber::parse(number) {
        Ok(number) => number,
        Err(err) => anyhow::bail!("Invalid number: {err}"),
    };

    let store = JsonStore::new(&config.store.path);
    let ledger = store.load()?;
    let names = ledger.names_for(&number);

    if names.is_empty() {
        println!("No reports for +{number}.");
        return Ok(());
    }

    println!("Reports for +{number}:");
    for name in names {
        println!("  {name}");
    }

    Ok(())
}
