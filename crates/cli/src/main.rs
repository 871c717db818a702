//! Command line front end: scan pools, analyze one pool, backtest a range.
mod output;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use range_scout_data::{JsonDirectoryFeed, PoolFeed, fetch_histories};
use range_scout_scanner::config::{ChainFilter, ScannerConfig};
use range_scout_scanner::objective::RankBy;
use range_scout_scanner::scanner::PoolScanner;
use range_scout_simulation::state::{BacktestConfig, FeeModel, RangeSpec, RebalancePolicy};
use range_scout_simulation::strategy_simulator::run_backtest;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "range-scout")]
#[command(about = "Concentrated-liquidity pool scanner and range backtester", long_about = None)]
struct Cli {
    /// Directory holding pools.json and history/<pool_id>.json
    #[arg(long, env = "RANGE_SCOUT_FEED_DIR", default_value = "data", global = true)]
    feed_dir: PathBuf,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RankArg {
    Tvl,
    Ratio,
    Margin,
}

impl From<RankArg> for RankBy {
    fn from(arg: RankArg) -> Self {
        match arg {
            RankArg::Tvl => RankBy::Tvl,
            RankArg::Ratio => RankBy::Ratio,
            RankArg::Margin => RankBy::Margin,
        }
    }
}

#[derive(Args)]
struct HorizonArgs {
    /// Holding horizon in days
    #[arg(short, long, default_value_t = 7)]
    days: u32,

    /// Range half-width in standard deviations
    #[arg(long, default_value = "2")]
    sd: Decimal,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the listed pools by risk-adjusted fee yield
    Scan {
        /// Keep only these chains (repeatable)
        #[arg(long = "chain")]
        chains: Vec<String>,

        /// Minimum TVL in USD [default: 0]
        #[arg(long)]
        min_tvl: Option<Decimal>,

        /// Keep pools whose symbols contain any of these (repeatable)
        #[arg(long = "asset")]
        assets: Vec<String>,

        /// Holding horizon in days [default: 7]
        #[arg(short, long)]
        days: Option<u32>,

        /// Range half-width in standard deviations [default: 2]
        #[arg(long)]
        sd: Option<Decimal>,

        /// Number of rows to return [default: 20]
        #[arg(long)]
        top: Option<usize>,

        /// Ranking key [default: ratio]
        #[arg(long, value_enum)]
        rank_by: Option<RankArg>,

        /// JSON file with scanner settings; flags given here override it
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Score a single pool by id
    Analyze {
        pool_id: String,

        #[command(flatten)]
        horizon: HorizonArgs,
    },
    /// Replay a pool's history against a position range
    Backtest {
        pool_id: String,

        /// Capital in USD
        #[arg(long, default_value = "10000")]
        capital: Decimal,

        /// Days of history to replay
        #[arg(short, long, default_value_t = 30)]
        days: u32,

        /// Fixed range half-width (0.05 = ±5%); sized from volatility when absent
        #[arg(long)]
        half_width: Option<Decimal>,

        /// Standard deviations for a volatility-sized range
        #[arg(long, default_value = "2")]
        sd: Decimal,

        /// Horizon in days for a volatility-sized range
        #[arg(long, default_value_t = 7)]
        horizon: u32,

        /// Days of history before the window used for the initial volatility
        #[arg(long, default_value_t = 30)]
        warmup: u32,

        /// Recenter the range every time price leaves it
        #[arg(long)]
        rebalance: bool,

        /// Cost of one rebalance as a fraction of position value
        #[arg(long, default_value = "0.003")]
        cost: Decimal,

        /// Volatility lookback in days when recentering a volatility-sized range
        #[arg(long, default_value_t = 30)]
        lookback: u32,

        /// Scale reported APR by the range's concentration multiplier
        #[arg(long)]
        concentration: bool,

        /// Print the per-step trace
        #[arg(long)]
        trace: bool,
    },
}

/// Scan flags given on the command line; `None` or empty keeps the configured value.
#[derive(Debug, Default)]
struct ScanOverrides {
    chains: Vec<String>,
    min_tvl: Option<Decimal>,
    assets: Vec<String>,
    days: Option<u32>,
    sd: Option<Decimal>,
    top: Option<usize>,
    rank_by: Option<RankBy>,
}

fn apply_scan_overrides(mut config: ScannerConfig, overrides: ScanOverrides) -> ScannerConfig {
    if !overrides.chains.is_empty() {
        config = config.with_chains(ChainFilter::Only(overrides.chains));
    }
    if let Some(min_tvl) = overrides.min_tvl {
        config = config.with_min_tvl(min_tvl);
    }
    if !overrides.assets.is_empty() {
        config = config.with_assets(overrides.assets);
    }
    if let Some(days) = overrides.days {
        config = config.with_days_window(days);
    }
    if let Some(sd) = overrides.sd {
        config = config.with_sd_multiplier(sd);
    }
    if let Some(top) = overrides.top {
        config = config.with_top_n(top);
    }
    if let Some(rank_by) = overrides.rank_by {
        config = config.with_rank_by(rank_by);
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let feed = JsonDirectoryFeed::new(&cli.feed_dir);
    info!(feed = %feed.root().display(), "using feed directory");

    match cli.command {
        Commands::Scan {
            chains,
            min_tvl,
            assets,
            days,
            sd,
            top,
            rank_by,
            config,
        } => {
            let base = match config {
                Some(path) => {
                    let raw = tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str::<ScannerConfig>(&raw)
                        .with_context(|| format!("parsing {}", path.display()))?
                }
                None => ScannerConfig::default(),
            };
            let config = apply_scan_overrides(
                base,
                ScanOverrides {
                    chains,
                    min_tvl,
                    assets,
                    days,
                    sd,
                    top,
                    rank_by: rank_by.map(RankBy::from),
                },
            );
            let scanner = PoolScanner::new(config)?;

            let pools = feed.list_pools().await?;
            let candidates = scanner.filter_candidates(&pools);
            let histories = fetch_histories(&feed, &candidates).await?;
            let results = scanner.scan(&candidates, &histories);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No pools matched.");
            } else {
                output::scan_table(&results).printstd();
            }
        }
        Commands::Analyze { pool_id, horizon } => {
            let scanner = PoolScanner::new(
                ScannerConfig::default()
                    .with_days_window(horizon.days)
                    .with_sd_multiplier(horizon.sd),
            )?;
            let Some(history) = feed.pool_history(pool_id.trim()).await? else {
                bail!("no history for pool {pool_id}");
            };

            // a listing entry, when present, supplies names and TVL
            let listing = feed.list_pools().await.unwrap_or_default();
            let result = match listing.iter().find(|p| p.pool_id == pool_id.trim()) {
                Some(candidate) => scanner.evaluate(candidate, &history),
                None => {
                    let histories = HashMap::from([(pool_id.trim().to_string(), history)]);
                    scanner.analyze_single(&pool_id, &histories)?
                }
            };
            let Some(result) = result else {
                bail!("history of pool {pool_id} is too thin to score");
            };

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::scan_table(std::slice::from_ref(&result)).printstd();
            }
        }
        Commands::Backtest {
            pool_id,
            capital,
            days,
            half_width,
            sd,
            horizon,
            warmup,
            rebalance,
            cost,
            lookback,
            concentration,
            trace,
        } => {
            let range = match half_width {
                Some(half_width) => RangeSpec::Fixed { half_width },
                None => RangeSpec::Dynamic {
                    sd_multiplier: sd,
                    horizon_days: horizon,
                },
            };
            let mut config = BacktestConfig::new(capital, days)
                .with_range(range)
                .with_warmup_days(warmup);
            if rebalance {
                config = config.with_rebalance(RebalancePolicy {
                    lookback_days: lookback,
                    cost_rate: cost,
                });
            }
            if concentration {
                config = config.with_fee_model(FeeModel::ConcentrationScaled);
            }

            let Some(history) = feed.pool_history(pool_id.trim()).await? else {
                bail!("no history for pool {pool_id}");
            };
            let report = run_backtest(&history, &config)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_backtest(&report, trace);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn file_config() -> ScannerConfig {
        ScannerConfig::default()
            .with_chains(ChainFilter::Only(vec!["base".into()]))
            .with_min_tvl(dec!(250000))
            .with_assets(["WETH"])
            .with_days_window(14)
            .with_sd_multiplier(dec!(1.5))
            .with_top_n(5)
            .with_rank_by(RankBy::Margin)
    }

    #[test]
    fn test_absent_flags_keep_file_settings() {
        let config = apply_scan_overrides(file_config(), ScanOverrides::default());
        assert_eq!(config, file_config());
    }

    #[test]
    fn test_given_flags_override_file_settings() {
        let overrides = ScanOverrides {
            chains: vec!["ethereum".into()],
            min_tvl: Some(dec!(1000)),
            days: Some(3),
            rank_by: Some(RankBy::Tvl),
            ..ScanOverrides::default()
        };
        let config = apply_scan_overrides(file_config(), overrides);

        assert_eq!(config.chains, ChainFilter::Only(vec!["ethereum".into()]));
        assert_eq!(config.min_tvl_usd, dec!(1000));
        assert_eq!(config.days_window, 3);
        assert_eq!(config.rank_by, RankBy::Tvl);
        assert_eq!(config.assets, vec!["WETH".to_string()]);
        assert_eq!(config.sd_multiplier, dec!(1.5));
        assert_eq!(config.top_n, 5);
    }
}
