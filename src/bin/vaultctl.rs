use vault_scanner::Config;

use anyhow::Context;
use log::{debug, error, info};
use std::path::PathBuf;
use structopt::StructOpt;

mod cli;

#[derive(Debug, StructOpt)]
#[structopt(about = "vaultctl - collect photo metadata for the vault")]
struct GlobalOpts {
    #[structopt(short, long, parse(from_os_str))]
    /// The configuration file to use, if it is not the one in the user's config directory.
    config: Option<PathBuf>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Scan a directory for photos and write their metadata to the vault.
    Scan {
        #[structopt(short, long, parse(from_os_str))]
        /// The directory to scan, if it is not the configured one.
        root: Option<PathBuf>,
        #[structopt(short, long, parse(from_os_str))]
        /// The vault directory the results are written to, if it is not the configured one.
        vault: Option<PathBuf>,
        #[structopt(short = "j", long)]
        /// The number of files that are read in parallel.
        threads: Option<usize>,
        #[structopt(long)]
        /// Print every status message instead of only errors.
        verbose: bool,
    },
    /// List the photos found by the last scan.
    List {
        #[structopt(short, long, parse(from_os_str))]
        /// The vault directory containing the results, if it is not the configured one.
        vault: Option<PathBuf>,
    },
    /// Show the configuration.
    Config {
        #[structopt(long)]
        /// Write the default configuration.
        init: bool,
        #[structopt(short, long)]
        /// Replace an existing configuration, keeping a backup of it.
        overwrite: bool,
    },
}

fn main() {
    env_logger::init_from_env(
        env_logger::Env::new()
            .filter_or("VAULTCTL_LOG", "info")
            .write_style("VAULTCTL_LOG_STYLE"),
    );

    let opts = GlobalOpts::from_args();

    debug!("Options: {:?}", opts);

    match run(opts) {
        Err(err) => {
            error!("Exiting due to error: {:#}", err);
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}

fn run(opts: GlobalOpts) -> anyhow::Result<()> {
    let config_path = match opts.config {
        Some(path) => path,
        None => Config::default_path().context("Cannot determine the user's config directory")?,
    };
    info!("Using configuration: {}", config_path.to_string_lossy());

    match opts.command {
        Command::Config { init, overwrite } => cli::config(&config_path, init, overwrite),
        Command::Scan {
            root,
            vault,
            threads,
            verbose,
        } => {
            let config = Config::load_or_create(&config_path)?;
            cli::scan::scan(&config, root, vault, threads, verbose)
        }
        Command::List { vault } => {
            let config = Config::load_or_create(&config_path)?;
            cli::scan::list(&config, vault)
        }
    }
}
