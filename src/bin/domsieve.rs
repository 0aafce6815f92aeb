//! domsieve: probe a domain list and write blocked and domestic lists.

use clap::{Args, Parser, Subcommand};
use domsieve::source::{load_cidr_table, load_suffix_set, RemoteList};
use domsieve::{Classifier, Config, NetworkProber, Pipeline};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "domsieve")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Split a domain list into blocked, domestic and unclassified sets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Common {
    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the domain list and write the output lists
    Run {
        #[command(flatten)]
        common: Common,

        /// Nameserver to query (repeatable)
        #[arg(short, long = "nameserver")]
        nameservers: Vec<IpAddr>,

        /// Nameserver port
        #[arg(short, long)]
        port: Option<u16>,

        /// Maximum probes in flight
        #[arg(long)]
        concurrency: Option<usize>,

        /// Input domain list
        #[arg(long)]
        domain_list: Option<PathBuf>,

        /// Output file for unreachable entries
        #[arg(long)]
        blocked_output: Option<PathBuf>,

        /// Output file for domestic entries
        #[arg(long)]
        domestic_output: Option<PathBuf>,
    },

    /// Classify domains with given addresses, without probing
    Classify {
        #[command(flatten)]
        common: Common,

        /// `domain` or `domain=ip,ip,...`
        #[arg(required = true)]
        domains: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let common = match &cli.command {
        Commands::Run { common, .. } | Commands::Classify { common, .. } => common,
    };

    let level = if common.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &common.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {:?}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Commands::Run {
            nameservers,
            port,
            concurrency,
            domain_list,
            blocked_output,
            domestic_output,
            ..
        } => {
            if !nameservers.is_empty() {
                config.nameservers = nameservers;
            }
            if let Some(port) = port {
                config.dns_port = port;
            }
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }
            if let Some(path) = domain_list {
                config.domain_list = path;
            }
            if let Some(path) = blocked_output {
                config.blocked_output = path;
            }
            if let Some(path) = domestic_output {
                config.domestic_output = path;
            }
            if let Err(e) = config.validate() {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }

            if let Err(e) = run(&config) {
                log::error!("{}", e);
            }
        }
        Commands::Classify { domains, .. } => classify(&config, &domains),
    }
}

fn run(config: &Config) -> domsieve::Result<()> {
    let entries = domsieve::listfile::load_list(&config.domain_list);
    if entries.is_empty() {
        return Ok(());
    }

    let (suffixes, cidrs) = load_reference(config);
    let pipeline = Pipeline::new(NetworkProber::from_config(config), suffixes, cidrs)
        .with_trust_threshold(config.trust_threshold)
        .with_workers(config.worker_count());

    let partition = pipeline.run(&entries)?;
    log::info!(
        "blocked: {}, domestic: {}, unclassified: {}",
        partition.blocked.len(),
        partition.domestic.len(),
        partition.unclassified.len()
    );
    partition.write(&config.blocked_output, &config.domestic_output)
}

fn classify(config: &Config, domains: &[String]) {
    let (suffixes, cidrs) = load_reference(config);
    let classifier = Classifier::new(Arc::new(suffixes), Arc::new(cidrs));

    for arg in domains {
        let (domain, ips) = match arg.split_once('=') {
            Some((domain, ips)) => (
                domain,
                ips.split(',')
                    .map(str::trim)
                    .filter(|ip| !ip.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>(),
            ),
            None => (arg.as_str(), Vec::new()),
        };
        println!("{}\t{}", domain, classifier.verdict(domain, &ips));
    }
}

fn load_reference(config: &Config) -> (domsieve::SuffixSet, domsieve::CidrTable) {
    let timeout = config.download_timeout();
    let suffixes = load_suffix_set(&RemoteList::from_source(&config.suffix_list, timeout));
    let cidrs = load_cidr_table(&RemoteList::from_source(&config.cidr_list, timeout));
    (suffixes, cidrs)
}
