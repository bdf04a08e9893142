//! # delve-dns
//!
//! Command-line front end for the resolution core: resolves one name and
//! prints the answer in a dig-like layout.

mod bootstrap;

use anyhow::Context;
use clap::Parser;
use delve_dns_application::services::NameServerSet;
use delve_dns_application::Resolution;
use delve_dns_domain::{Address, CliOverrides, Message, RecordType};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "delve-dns")]
#[command(version)]
#[command(about = "Recursive and forwarding DNS resolver")]
struct Cli {
    /// Domain name to resolve
    name: String,

    /// Record type (A, AAAA, CNAME, NS, MX, TXT, ...)
    #[arg(default_value = "A")]
    record_type: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Ask this server first, e.g. `udp://9.9.9.9` (repeatable)
    #[arg(short, long = "server")]
    servers: Vec<String>,

    /// Replace the configured default name servers (repeatable)
    #[arg(long = "nameserver")]
    nameservers: Vec<String>,

    /// Only ask the servers once with recursion desired; do not follow
    /// referrals
    #[arg(short, long)]
    iterative: bool,

    /// Overall deadline for one wire request, in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Log level or filter directive
    #[arg(short, long)]
    log_level: Option<String>,

    /// Print the answer as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Output<'a> {
    from_cache: bool,
    message: &'a Message,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        recursive: cli.iterative.then_some(false),
        nameservers: (!cli.nameservers.is_empty()).then(|| cli.nameservers.clone()),
        timeout_ms: cli.timeout_ms,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config.logging);

    let record_type: RecordType = cli
        .record_type
        .parse()
        .map_err(anyhow::Error::msg)
        .context("invalid record type")?;

    let servers = cli
        .servers
        .iter()
        .map(|s| s.parse::<Address>())
        .collect::<Result<Vec<_>, _>>()
        .context("invalid --server address")?;
    let servers = (!servers.is_empty()).then(|| NameServerSet::new(servers));

    let resolver = bootstrap::build_resolver(&config)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling query");
            on_interrupt.cancel();
        }
    });

    info!(domain = %cli.name, qtype = %record_type, "Resolving");
    let resolution = resolver
        .resolve_cancellable(&cli.name, record_type, servers, &cancel)
        .await?
        .context("query cancelled")?;

    print_resolution(&resolution, cli.json)
}

fn print_resolution(resolution: &Resolution, json: bool) -> anyhow::Result<()> {
    if json {
        let output = Output {
            from_cache: resolution.from_cache,
            message: &resolution.message,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", resolution.message);
        println!(
            "\n;; from cache: {}",
            if resolution.from_cache { "yes" } else { "no" }
        );
    }
    Ok(())
}
