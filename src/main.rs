use std::path::PathBuf;

use clap::Parser;
use eyre::Result;
use lisk_autotx::{
    accounts::{load_accounts, read_lines},
    config::{Config, DEFAULT_CONFIG_PATH},
    logging::setup_logging,
    prompt,
    proxy::ProxyPool,
    retry::RetryPolicy,
    runner::Runner,
    selection::{ProcessMode, RunOptions, ScheduleMode, TxSelection},
};
use tracing::{error, info};

/// Lisk auto TX and airdrop task claim.
///
/// Options left out on the command line are asked for interactively.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Private key file (overrides config)
    #[arg(long)]
    keys: Option<PathBuf>,

    /// Proxy file (overrides config)
    #[arg(long)]
    proxies: Option<PathBuf>,

    /// Use proxies for task claims
    #[arg(long)]
    use_proxy: Option<bool>,

    /// 1 = TX and claim, 2 = TX only, 3 = claim only
    #[arg(long, value_parser = ProcessMode::from_answer)]
    mode: Option<ProcessMode>,

    /// Transactions to run, e.g. "1,3,5" or "all"
    #[arg(long, value_parser = TxSelection::parse)]
    tx: Option<TxSelection>,

    /// 1 = fixed delay from config, 2 = daily at the configured UTC time
    #[arg(long, value_parser = ScheduleMode::from_answer)]
    schedule: Option<ScheduleMode>,

    /// Attempts per TX step: 0 for unlimited, "none" for a single attempt
    #[arg(long)]
    retries: Option<String>,

    /// Run a single cycle and exit
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Log level or filter directives (overrides config)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn print_header() {
    println!();
    println!("***********************************");
    println!("    Lisk auto TX and Task Claim");
    println!("***********************************");
    println!();
}

fn resolve_options(cli: &Cli) -> Result<RunOptions> {
    let use_proxy = match cli.use_proxy {
        Some(use_proxy) => use_proxy,
        None => prompt::use_proxy()?,
    };
    let mode = match cli.mode {
        Some(mode) => mode,
        None => prompt::process_mode()?,
    };
    let transactions = match (&cli.tx, mode.executes_transactions()) {
        (Some(tx), _) => tx.clone(),
        (None, true) => prompt::transactions()?,
        (None, false) => TxSelection::default(),
    };
    let schedule = match cli.schedule {
        Some(schedule) => schedule,
        None if cli.once => ScheduleMode::FixedDelay,
        None => prompt::schedule_mode()?,
    };
    let retry = match &cli.retries {
        Some(answer) => RetryPolicy::from_answer(answer),
        None => prompt::retry_policy()?,
    };

    Ok(RunOptions::builder()
        .mode(mode)
        .transactions(transactions)
        .use_proxy(use_proxy)
        .schedule(schedule)
        .retry(retry)
        .once(cli.once)
        .build())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(keys) = &cli.keys {
        config.key_file = keys.clone();
    }
    if let Some(proxies) = &cli.proxies {
        config.proxy_file = proxies.clone();
    }
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    setup_logging(&log_level, cli.json_logs || config.json_logs);

    print_header();
    let options = resolve_options(&cli)?;

    let batch = load_accounts(&config.key_file)?;
    let proxies = if options.use_proxy {
        let lines = read_lines(&config.proxy_file)?;
        match ProxyPool::new(&lines, batch.total()) {
            Ok(pool) => Some(pool),
            Err(e) => {
                error!("{}", e);
                return Ok(());
            }
        }
    } else {
        None
    };

    info!(
        accounts = batch.accounts.len(),
        rejected = batch.rejected.len(),
        proxies = proxies.as_ref().map(ProxyPool::len).unwrap_or_default(),
        mode = ?options.mode,
        transactions = %options.transactions,
        retry = %options.retry,
        "Loaded run configuration"
    );

    Runner::new(config, options, batch, proxies)?.run().await
}
