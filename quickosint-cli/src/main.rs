//! QuickOSINT CLI
//!
//! Single-target OSINT: DNS resolution, IP geolocation, social media presence and WHOIS.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use quickosint_core::{DetectionRules, Operation, OperationSet, DEFAULT_GEO_ENDPOINT};
use quickosint_net::NetConfig;
use quickosint_runtime::{Console, EntryMode, InvestigationConfig, Investigator};

#[derive(Parser, Debug)]
#[command(name = "quickosint")]
#[command(author, version, about = "QuickOSINT: DNS, geolocation, social media and WHOIS lookups for one target", long_about = None)]
struct Cli {
    /// Domain, hostname, IP address or username (prompted for when omitted)
    target: Option<String>,

    /// Run DNS resolution
    #[arg(long)]
    dns: bool,

    /// Run IP geolocation
    #[arg(long)]
    geo: bool,

    /// Run the social media search
    #[arg(long)]
    social: bool,

    /// Run the WHOIS lookup
    #[arg(long)]
    whois: bool,

    /// Run every operation (the default when no operation is given)
    #[arg(long)]
    all: bool,

    /// Also save the report to this file (overwritten if it exists)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prompt for the target and operations
    #[arg(short, long)]
    interactive: bool,

    /// Detection rules TOML replacing the built-in proxy/datacenter markers
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Geolocation API base URL
    #[arg(long, env = "QUICKOSINT_GEO_ENDPOINT", default_value = DEFAULT_GEO_ENDPOINT)]
    geo_endpoint: String,

    /// Proxy for HTTP lookups, e.g. socks5h://127.0.0.1:9050
    #[arg(long, env = "QUICKOSINT_PROXY")]
    proxy: Option<String>,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

impl Cli {
    /// Operations named by flags, `None` when no flag was given
    fn selection(&self) -> Option<OperationSet> {
        if self.all {
            return Some(OperationSet::all());
        }
        let selection: OperationSet = [
            (self.dns, Operation::Dns),
            (self.geo, Operation::Geo),
            (self.social, Operation::Social),
            (self.whois, Operation::Whois),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .map(|(_, op)| op)
        .collect();

        (!selection.is_empty()).then_some(selection)
    }

    fn entry_mode(&self) -> EntryMode {
        let selection = self.selection();
        match (&self.target, self.interactive) {
            (Some(target), false) => EntryMode::Directive {
                target: target.clone(),
                operations: selection.unwrap_or_else(OperationSet::all),
            },
            (target, _) => EntryMode::Interactive {
                target: target.clone(),
                operations: selection,
            },
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging; stdout is reserved for prompts and the report
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let rules = match &cli.rules {
        Some(path) => DetectionRules::load(path)
            .with_context(|| format!("Could not load detection rules from {}", path.display()))?,
        None => DetectionRules::default(),
    };
    debug!(
        "Detection rules: {} proxy marker(s), {} datacenter marker(s)",
        rules.proxy.len(),
        rules.datacenter.len()
    );

    let config = InvestigationConfig {
        net: NetConfig {
            geo_endpoint: cli.geo_endpoint.clone(),
            proxy: cli.proxy.clone(),
            ..Default::default()
        },
        rules,
    };

    let mut investigator = Investigator::from_config(config)?;
    let mut console = Console::new(std::io::stdin().lock(), std::io::stdout());
    investigator
        .execute(cli.entry_mode(), &mut console, cli.output.as_deref())
        .await?;

    Ok(())
}
