//! Cloudseal - encrypted directory metadata tool

use clap::{Parser, Subcommand};
use cloudseal_cli::{commands, CliConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cloudseal")]
#[command(about = "Encode and decode end-to-end encrypted directory metadata")]
#[command(version)]
struct Args {
    /// Base64 identity secret key
    #[arg(long, env = "CLOUDSEAL_IDENTITY", hide_env_values = true, global = true)]
    identity: Option<String>,

    /// State file with directory keys, file records and known files
    #[arg(long, env = "CLOUDSEAL_STATE", global = true)]
    state: Option<PathBuf>,

    /// metadata.version written for directories without records
    #[arg(long, default_value = "1", env = "CLOUDSEAL_DEFAULT_VERSION", global = true)]
    default_version: u32,

    /// Enable debug logging
    #[arg(short, long, env = "CLOUDSEAL_DEBUG", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new identity key pair
    Keygen,
    /// Encode a JSON array of file records into a metadata document
    Encode {
        #[arg(long)]
        records: PathBuf,
        #[arg(long)]
        server_url: String,
    },
    /// Decode a metadata document into the state file
    Decode {
        #[arg(long)]
        document: PathBuf,
        #[arg(long)]
        account: String,
        #[arg(long)]
        server_url: String,
    },
    /// Show the decrypted file list of a metadata document
    Inspect {
        #[arg(long)]
        document: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = CliConfig {
        identity: args.identity,
        state_path: args.state,
        default_version: args.default_version,
        debug: args.debug,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Command::Keygen => {
            println!("{}", serde_json::to_string_pretty(&commands::keygen())?);
        }
        Command::Encode {
            records,
            server_url,
        } => {
            println!("{}", commands::encode(&config, &records, &server_url)?);
        }
        Command::Decode {
            document,
            account,
            server_url,
        } => {
            if config.state_path.is_none() {
                tracing::warn!("no --state given; decoded records will not be kept");
            }
            let summary = commands::decode(&config, &document, &account, &server_url)?;
            tracing::info!(
                "decoded {} file(s), skipped {} unknown, current key slot {:?}",
                summary.saved,
                summary.dropped,
                summary.current_slot
            );
        }
        Command::Inspect { document } => {
            let report = commands::inspect(&config, &document)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
