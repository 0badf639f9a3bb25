//! Tide staking pool command-line tool.
//!
//! Each invocation loads the pool state file, applies one operation and
//! writes the state back. Amounts are decimal units (`12.5`), times are
//! Unix seconds and default to the current clock.

mod settings;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tide_core::constants::PERIOD_SECONDS;
use tide_core::traits::{InterestCalculator, Treasury};
use tide_core::types::{Address, RewardFunding, Timestamp};
use tide_core::units::{format_units, parse_units};
use tide_interest::CompoundEngine;
use tide_pool::{MemoryTreasury, StakingPool, snapshot};
use tracing::info;

use crate::settings::PoolSettings;

type Pool = StakingPool<MemoryTreasury>;

#[derive(Parser)]
#[command(name = "tide", version, about = "Tide time-bounded staking pool")]
struct Cli {
    /// Pool state file (default: <data_dir>/tide/pool.json).
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the pool state and initialize it from a settings file.
    Init(InitArgs),
    /// Deposit principal for a patron.
    Stake(AmountArgs),
    /// Withdraw part of a patron's accrued value.
    Unstake(AmountArgs),
    /// Withdraw a patron's entire accrued value.
    UnstakeAll(PatronArgs),
    /// Show a patron's principal and accrued value.
    Total(PatronArgs),
    /// Release unclaimed rewards to the owner after expiry.
    Sweep(CallerArgs),
    /// Transfer pool ownership.
    ChangeOwner(ChangeOwnerArgs),
    /// Compound an amount over whole periods (no state).
    Compound(CompoundArgs),
    /// Worst-case reward budget for a settings file (no state).
    Budget(BudgetArgs),
    /// Show pool configuration, counters and sweep preview.
    Status(NowArg),
}

#[derive(Args)]
struct NowArg {
    /// Unix time of the operation (default: now).
    #[arg(long)]
    now: Option<Timestamp>,
}

#[derive(Args)]
struct InitArgs {
    /// Pool settings file (TOML).
    #[arg(short, long)]
    config: PathBuf,

    /// Deployer address; becomes the pre-init owner.
    #[arg(long)]
    caller: Address,

    /// Currency sent with init (default: the required reward budget).
    #[arg(long)]
    received: Option<String>,

    /// Overwrite an existing state file.
    #[arg(long)]
    force: bool,

    #[command(flatten)]
    now: NowArg,
}

#[derive(Args)]
struct AmountArgs {
    #[arg(long)]
    patron: Address,

    /// Amount in units (e.g. 10.5).
    #[arg(long)]
    amount: String,

    #[command(flatten)]
    now: NowArg,
}

#[derive(Args)]
struct PatronArgs {
    #[arg(long)]
    patron: Address,

    #[command(flatten)]
    now: NowArg,
}

#[derive(Args)]
struct CallerArgs {
    #[arg(long)]
    caller: Address,

    #[command(flatten)]
    now: NowArg,
}

#[derive(Args)]
struct ChangeOwnerArgs {
    #[arg(long)]
    caller: Address,

    #[arg(long)]
    new_owner: Address,
}

#[derive(Args)]
struct CompoundArgs {
    /// Principal in units.
    #[arg(long)]
    principal: String,

    /// Per-period rate as a decimal fraction (e.g. 0.0000225).
    #[arg(long)]
    rate: String,

    /// Number of whole periods.
    #[arg(long)]
    periods: u64,
}

#[derive(Args)]
struct BudgetArgs {
    /// Pool settings file (TOML).
    #[arg(short, long)]
    config: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    let state = cli.state.unwrap_or_else(settings::default_state_path);

    match cli.command {
        Commands::Init(args) => cmd_init(&state, args),
        Commands::Stake(args) => cmd_stake(&state, args),
        Commands::Unstake(args) => cmd_unstake(&state, args),
        Commands::UnstakeAll(args) => cmd_unstake_all(&state, args),
        Commands::Total(args) => cmd_total(&state, args),
        Commands::Sweep(args) => cmd_sweep(&state, args),
        Commands::ChangeOwner(args) => cmd_change_owner(&state, args),
        Commands::Compound(args) => cmd_compound(args),
        Commands::Budget(args) => cmd_budget(args),
        Commands::Status(args) => cmd_status(&state, args),
    }
}

/// Initialize the logging subsystem. `RUST_LOG` takes precedence over `level_str`.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn now_or_clock(now: &NowArg) -> Result<Timestamp> {
    match now.now {
        Some(t) => Ok(t),
        None => Ok(SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("System clock is before the Unix epoch")?
            .as_secs()),
    }
}

fn parse_amount(s: &str) -> Result<u128> {
    parse_units(s).with_context(|| format!("Invalid amount: {s}"))
}

fn load_pool(path: &Path) -> Result<Pool> {
    snapshot::load(path).with_context(|| format!("Failed to load pool state: {}", path.display()))
}

fn save_pool(pool: &Pool, path: &Path) -> Result<()> {
    snapshot::save(pool, path)
        .with_context(|| format!("Failed to save pool state: {}", path.display()))
}

fn cmd_init(state: &Path, args: InitArgs) -> Result<()> {
    if state.exists() && !args.force {
        bail!("Pool state already exists: {} (use --force)", state.display());
    }
    let now = now_or_clock(&args.now)?;
    let settings = PoolSettings::load(&args.config)?;
    let params = settings.to_params()?;
    let funding = settings.funding()?;

    let received = match &args.received {
        Some(r) => parse_amount(r)?,
        None => match funding {
            RewardFunding::Declared(b) => b,
            RewardFunding::WorstCase => CompoundEngine::new(params.rate_per_period)
                .worst_case_interest(params.hard_cap, params.start, params.end)
                .context("Worst-case reward budget overflows")?,
        },
    };

    let mut pool = Pool::new(args.caller, MemoryTreasury::new());
    let budget = pool.init(&args.caller, params, funding, received, now)?;
    save_pool(&pool, state)?;

    info!(state = %state.display(), "cli: pool state created");
    println!("Pool initialized");
    println!("  owner:         {}", pool.owner());
    println!("  reward budget: {}", format_units(budget));
    println!("  state:         {}", state.display());
    Ok(())
}

fn cmd_stake(state: &Path, args: AmountArgs) -> Result<()> {
    let mut pool = load_pool(state)?;
    let amount = parse_amount(&args.amount)?;
    let now = now_or_clock(&args.now)?;

    let record = pool.stake(&args.patron, amount, now)?;
    save_pool(&pool, state)?;

    println!("Staked {} for {}", format_units(amount), args.patron);
    println!("  principal: {}", format_units(record.principal));
    println!("  accrued:   {}", format_units(record.accrued));
    println!("  interest:  {}", format_units(record.interest()));
    Ok(())
}

fn cmd_unstake(state: &Path, args: AmountArgs) -> Result<()> {
    let mut pool = load_pool(state)?;
    let amount = parse_amount(&args.amount)?;
    let now = now_or_clock(&args.now)?;

    let record = pool.unstake(&args.patron, amount, now)?;
    save_pool(&pool, state)?;

    println!("Withdrew {} to {}", format_units(amount), args.patron);
    println!("  principal: {}", format_units(record.principal));
    println!("  accrued:   {}", format_units(record.accrued));
    println!("  interest:  {}", format_units(record.interest()));
    Ok(())
}

fn cmd_unstake_all(state: &Path, args: PatronArgs) -> Result<()> {
    let mut pool = load_pool(state)?;
    let now = now_or_clock(&args.now)?;

    let amount = pool.unstake_all(&args.patron, now)?;
    save_pool(&pool, state)?;

    println!("Withdrew {} to {}", format_units(amount), args.patron);
    Ok(())
}

fn cmd_total(state: &Path, args: PatronArgs) -> Result<()> {
    let pool = load_pool(state)?;
    let now = now_or_clock(&args.now)?;

    let (principal, accrued) = pool.total(&args.patron, now)?;
    println!("Patron {}", args.patron);
    println!("  principal: {}", format_units(principal));
    println!("  accrued:   {}", format_units(accrued));
    println!("  interest:  {}", format_units(accrued - principal));
    Ok(())
}

fn cmd_sweep(state: &Path, args: CallerArgs) -> Result<()> {
    let mut pool = load_pool(state)?;
    let now = now_or_clock(&args.now)?;

    let report = pool.sweep(&args.caller, now)?;
    save_pool(&pool, state)?;

    println!("Swept {} to {}", format_units(report.amount_to_owner), args.caller);
    println!("  patrons:         {}", report.patrons);
    println!("  total principal: {}", format_units(report.total_principal));
    println!("  owed interest:   {}", format_units(report.owed_interest));
    println!("  interest paid:   {}", format_units(report.interest_paid));
    Ok(())
}

fn cmd_change_owner(state: &Path, args: ChangeOwnerArgs) -> Result<()> {
    let mut pool = load_pool(state)?;
    pool.change_owner(&args.caller, args.new_owner)?;
    save_pool(&pool, state)?;
    println!("Owner is now {}", args.new_owner);
    Ok(())
}

fn cmd_compound(args: CompoundArgs) -> Result<()> {
    let principal = parse_amount(&args.principal)?;
    let rate = parse_units(&args.rate).with_context(|| format!("Invalid rate: {}", args.rate))?;
    let engine = CompoundEngine::new(rate);

    let value = engine.compound(principal, args.periods)?;
    println!("{}", format_units(value));
    Ok(())
}

fn cmd_budget(args: BudgetArgs) -> Result<()> {
    let settings = PoolSettings::load(&args.config)?;
    let params = settings.to_params()?;
    if params.start >= params.end {
        bail!("Invalid window: start {} >= end {}", params.start, params.end);
    }
    let budget = CompoundEngine::new(params.rate_per_period)
        .worst_case_interest(params.hard_cap, params.start, params.end)
        .context("Worst-case reward budget overflows")?;

    println!("Worst-case reward budget: {}", format_units(budget));
    println!("  periods:  {}", params.duration() / PERIOD_SECONDS);
    println!("  hard cap: {}", format_units(params.hard_cap));
    Ok(())
}

fn cmd_status(state: &Path, args: NowArg) -> Result<()> {
    let pool = load_pool(state)?;
    let now = now_or_clock(&args)?;
    let cfg = pool.config();

    println!("Tide staking pool");
    println!("  owner:              {}", cfg.owner());
    println!("  initialized:        {}", cfg.is_initialized());
    println!("  window:             {} .. {}", cfg.start(), cfg.end());
    println!("  open:               {}", cfg.is_open(now));
    println!("  rate per period:    {}", format_units(cfg.rate_per_period()));
    println!("  hard cap:           {}", format_units(cfg.hard_cap()));
    println!("  contribution limit: {}", format_units(cfg.contribution_limit()));
    println!("  remaining capacity: {}", format_units(cfg.remaining_capacity()));
    println!("  reward budget:      {}", format_units(cfg.reward_budget()));
    println!("  total principal:    {}", format_units(cfg.total_principal()));
    println!("  interest paid:      {}", format_units(cfg.interest_paid()));
    println!("  patrons:            {}", pool.ledger().len());
    println!("  treasury balance:   {}", format_units(pool.treasury().balance()));
    println!("  outstanding:        {}", format_units(pool.outstanding(now)?));

    if cfg.is_swept() {
        println!("  swept:              {}", format_units(cfg.swept_amount()));
    } else if cfg.is_initialized() {
        match pool.reconcile() {
            Ok(report) => println!(
                "  sweepable:          {}",
                format_units(report.amount_to_owner)
            ),
            Err(e) => println!("  sweepable:          unavailable ({e})"),
        }
    }
    Ok(())
}
