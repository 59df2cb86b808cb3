//! slink - deep-link resolution and attribution SDK initialization sync
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use slink_core::AuthState;
use slink_relay::HeadlessOptions;
use slink_sdk::{Credentials, SimulatedBehavior};

/// slink - resolve deep links and reconcile attribution SDK initialization
#[derive(Parser, Debug)]
#[command(name = "slink")]
#[command(about = "Deep-link resolution and attribution SDK initialization sync", long_about = None)]
struct Args {
    /// Directory holding `.slink/` (defaults to the current directory)
    #[arg(long, value_name = "DIR", global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a link and print the resolved link as JSON
    Parse {
        #[arg(value_name = "URI")]
        uri: String,
    },

    /// Route links and print one JSON decision per line
    Route {
        #[arg(value_name = "URI", required = true)]
        uris: Vec<String>,
    },

    /// Run one SDK initialization attempt headless, printing NDJSON events
    Run {
        /// Simulate a failed configure with this status code
        #[arg(long, value_name = "CODE", conflicts_with = "fail_without_code")]
        fail: Option<i32>,

        /// Simulate a failed configure that carries no status code
        #[arg(long)]
        fail_without_code: bool,

        /// Simulated configure latency
        #[arg(long, value_name = "MS", default_value_t = 300)]
        latency_ms: u64,

        /// Drop the configure completion so only the status poll can conclude
        #[arg(long)]
        lose_callback: bool,

        /// Partner id to use instead of the configured one
        #[arg(long, requires = "token")]
        partner_id: Option<String>,

        /// Token to use instead of the configured one
        #[arg(long, requires = "partner_id")]
        token: Option<String>,

        /// Link to route while the attempt is in flight (repeatable)
        #[arg(long = "link", value_name = "URI")]
        links: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    slink_core::logging::init()?;

    let args = Args::parse();

    let project_path = args
        .project
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    match args.command {
        Command::Parse { uri } => {
            println!("{}", slink_relay::parse_to_json(&project_path, &uri)?);
        }
        Command::Route { uris } => {
            for line in slink_relay::route_to_json(&project_path, &uris)? {
                println!("{}", line);
            }
        }
        Command::Run {
            fail,
            fail_without_code,
            latency_ms,
            lose_callback,
            partner_id,
            token,
            links,
        } => {
            let latency = Duration::from_millis(latency_ms);
            let mut behavior = if fail.is_some() || fail_without_code {
                SimulatedBehavior::fail(fail, latency)
            } else {
                SimulatedBehavior::succeed(latency)
            };
            if lose_callback {
                behavior = behavior.without_callback();
            }

            let credentials = match (partner_id, token) {
                (Some(partner_id), Some(token)) => {
                    let environment = slink_app::load_settings(&project_path).sdk.environment;
                    Some(Credentials::new(partner_id, token, environment))
                }
                _ => None,
            };

            let options = HeadlessOptions {
                behavior,
                credentials,
                links,
            };

            if let AuthState::Failed { .. } =
                slink_relay::run_headless(&project_path, options).await?
            {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
