//! CLI definition and dispatch.
//!
//! Each command loads the INI config, validates it, builds a request and
//! hands it to a [`Pipeline`] wired with concrete adapters. Results go to
//! stdout through the report port; diagnostics go to stderr.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::indicator_adapter::TechnicalIndicatorAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::analysis::{
    StrategyComparison, StrategyResult, compare_strategies, indicator_requests, run_strategy,
};
use crate::domain::backtest::{BacktestConfig, BacktestResult, DEFAULT_INITIAL_CAPITAL, run_backtest};
use crate::domain::config_validation::{
    parse_date, validate_backtest_config, validate_portfolio_config, validate_portfolio_window,
    validate_strategy_config,
};
use crate::domain::error::SigtraderError;
use crate::domain::metrics::{RiskMetrics, analyze_risk};
use crate::domain::ohlcv::{PriceBar, window_start};
use crate::domain::portfolio::{
    DEFAULT_PORTFOLIO_LOOKBACK_DAYS, PortfolioAggregator, PortfolioRequest, PortfolioResult,
};
use crate::domain::strategy::{
    DEFAULT_BOLLINGER_PERIOD, DEFAULT_LONG_PERIOD, DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD,
    DEFAULT_RSI_PERIOD, DEFAULT_SHORT_PERIOD, DEFAULT_STD_DEV, StrategyId, StrategyKind,
};
use crate::domain::universe::{parse_symbols, parse_weights};
use crate::ports::config_port::ConfigPort;
use crate::ports::indicator_port::IndicatorPort;
use crate::ports::price_history_port::PriceHistoryPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_BACKTEST_LOOKBACK_DAYS: i64 = 365;

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "Trading signal generation and backtesting")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// INI configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory of <SYMBOL>.csv price files, overrides [data] path
    #[arg(short, long)]
    pub data: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available strategies
    Strategies,
    /// List the symbols that have price history
    Symbols {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Run one strategy on one symbol
    Signals {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Run several strategies on one symbol and rank them
    Compare {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        symbol: String,
        /// Comma-separated strategy identifiers, all when omitted
        #[arg(long, value_delimiter = ',')]
        strategies: Vec<String>,
    },
    /// Simulate trading a strategy's signals with capital
    Backtest {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        capital: Option<f64>,
    },
    /// Evaluate one strategy across several symbols
    Portfolio {
        #[command(flatten)]
        source: SourceArgs,
        /// Comma-separated symbols, overrides [portfolio] symbols
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        strategy: Option<String>,
    },
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let outcome = match cli.command {
        Command::Strategies => run_strategies(&mut out),
        Command::Symbols { source } => {
            with_pipeline(&source, |pipeline, _| pipeline.symbols(&mut out).map(|_| ()))
        }
        Command::Signals {
            source,
            symbol,
            strategy,
        } => with_pipeline(&source, |pipeline, config| {
            pipeline
                .signals(config, &symbol, strategy.as_deref(), &mut out)
                .map(|_| ())
        }),
        Command::Compare {
            source,
            symbol,
            strategies,
        } => with_pipeline(&source, |pipeline, config| {
            pipeline
                .compare(config, &symbol, &strategies, &mut out)
                .map(|_| ())
        }),
        Command::Backtest {
            source,
            symbol,
            strategy,
            capital,
        } => with_pipeline(&source, |pipeline, config| {
            pipeline
                .backtest(config, &symbol, strategy.as_deref(), capital, &mut out)
                .map(|_| ())
        }),
        Command::Portfolio {
            source,
            symbols,
            strategy,
        } => with_pipeline(&source, |pipeline, config| {
            pipeline
                .portfolio(config, symbols.as_deref(), strategy.as_deref(), &mut out)
                .map(|_| ())
        }),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_strategies(out: &mut dyn Write) -> Result<(), SigtraderError> {
    TextReportAdapter::new().write_catalog(out, &StrategyKind::catalog())
}

fn with_pipeline<F>(source: &SourceArgs, body: F) -> Result<(), SigtraderError>
where
    F: FnOnce(&Pipeline<'_>, &dyn ConfigPort) -> Result<(), SigtraderError>,
{
    let config = load_config(source.config.as_deref())?;
    let data_dir = resolve_data_dir(&config, source.data.as_deref())?;
    info!(data = %data_dir.display(), "using price directory");

    let prices = CsvPriceAdapter::new(data_dir);
    let indicators = TechnicalIndicatorAdapter::new();
    let report = TextReportAdapter::new();
    let pipeline = Pipeline::new(&prices, &indicators, &report);
    body(&pipeline, &config)
}

/// Loads the INI file, or an empty configuration when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, SigtraderError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn resolve_data_dir(
    config: &dyn ConfigPort,
    override_dir: Option<&Path>,
) -> Result<PathBuf, SigtraderError> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    config
        .get_string("data", "path")
        .map(PathBuf::from)
        .ok_or_else(|| SigtraderError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        })
}

fn period(config: &dyn ConfigPort, key: &str, default: usize) -> usize {
    let value = config.get_int("strategy", key, default as i64);
    usize::try_from(value).unwrap_or(default)
}

/// Strategy named by `override_name`, else `[strategy] kind`, else moving
/// average; parameters come from `[strategy]`.
pub fn build_strategy_kind(
    config: &dyn ConfigPort,
    override_name: Option<&str>,
) -> Result<StrategyKind, SigtraderError> {
    let id = match override_name
        .map(str::to_string)
        .or_else(|| config.get_string("strategy", "kind"))
    {
        Some(name) => name.parse::<StrategyId>()?,
        None => StrategyId::MovingAverage,
    };

    let kind = match id {
        StrategyId::MovingAverage => StrategyKind::MovingAverageCrossover {
            short_period: period(config, "short_period", DEFAULT_SHORT_PERIOD),
            long_period: period(config, "long_period", DEFAULT_LONG_PERIOD),
        },
        StrategyId::Rsi => StrategyKind::RsiThreshold {
            period: period(config, "rsi_period", DEFAULT_RSI_PERIOD),
            oversold: config.get_double("strategy", "oversold", DEFAULT_OVERSOLD),
            overbought: config.get_double("strategy", "overbought", DEFAULT_OVERBOUGHT),
        },
        StrategyId::Macd => StrategyKind::MacdCrossover,
        StrategyId::BollingerBands => StrategyKind::BollingerTouch {
            period: period(config, "bollinger_period", DEFAULT_BOLLINGER_PERIOD),
            std_dev: config.get_double("strategy", "std_dev", DEFAULT_STD_DEV),
        },
        StrategyId::Combined => StrategyKind::Combined,
    };
    Ok(kind)
}

pub fn build_backtest_config(
    config: &dyn ConfigPort,
    capital_override: Option<f64>,
) -> Result<BacktestConfig, SigtraderError> {
    let initial_capital = capital_override.unwrap_or_else(|| {
        config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)
    });
    if initial_capital <= 0.0 || !initial_capital.is_finite() {
        return Err(SigtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(BacktestConfig { initial_capital })
}

/// Requested window end (if configured) and length in days for `section`.
pub fn build_window(
    config: &dyn ConfigPort,
    section: &str,
    default_lookback: i64,
) -> Result<(Option<NaiveDate>, i64), SigtraderError> {
    let end_date = config
        .get_string(section, "end_date")
        .map(|value| parse_date(&value, section, "end_date"))
        .transpose()?;
    let lookback = config.get_int(section, "lookback_days", default_lookback);
    Ok((end_date, lookback))
}

pub fn build_portfolio_request(
    config: &dyn ConfigPort,
    symbols_override: Option<&str>,
    strategy_override: Option<&str>,
) -> Result<PortfolioRequest, SigtraderError> {
    let raw = symbols_override
        .map(str::to_string)
        .or_else(|| config.get_string("portfolio", "symbols"))
        .ok_or_else(|| SigtraderError::ConfigMissing {
            section: "portfolio".to_string(),
            key: "symbols".to_string(),
        })?;
    let symbols = parse_symbols(&raw)?;

    let weights = match config.get_string("portfolio", "weights") {
        Some(value) => parse_weights(&value).map_err(|e| SigtraderError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "weights".to_string(),
            reason: e.to_string(),
        })?,
        None => Default::default(),
    };

    let strategy = build_strategy_kind(config, strategy_override)?;
    let (end_date, lookback_days) =
        build_window(config, "portfolio", DEFAULT_PORTFOLIO_LOOKBACK_DAYS)?;

    Ok(PortfolioRequest {
        symbols,
        strategy,
        weights,
        end_date,
        lookback_days,
    })
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Command pipelines over abstract ports.
pub struct Pipeline<'a> {
    prices: &'a dyn PriceHistoryPort,
    indicators: &'a dyn IndicatorPort,
    report: &'a dyn ReportPort,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        prices: &'a dyn PriceHistoryPort,
        indicators: &'a dyn IndicatorPort,
        report: &'a dyn ReportPort,
    ) -> Self {
        Pipeline {
            prices,
            indicators,
            report,
        }
    }

    /// Bars for one symbol over the `[backtest]` window.
    fn load_bars(&self, config: &dyn ConfigPort, symbol: &str) -> Result<Vec<PriceBar>, SigtraderError> {
        let (end_date, lookback) = build_window(config, "backtest", DEFAULT_BACKTEST_LOOKBACK_DAYS)?;
        let end = match end_date {
            Some(date) => date,
            None => self.prices.latest_date(symbol)?,
        };
        let start = window_start(end, lookback).ok_or_else(|| SigtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "lookback_days".to_string(),
            reason: format!("{} days before {} is out of range", lookback, end),
        })?;

        let bars = self.prices.fetch_bars(symbol, start, end)?;
        if bars.is_empty() {
            return Err(SigtraderError::NoData {
                symbol: symbol.to_string(),
            });
        }
        debug!(symbol, %start, %end, bars = bars.len(), "price window");
        Ok(bars)
    }

    pub fn symbols(&self, out: &mut dyn Write) -> Result<Vec<String>, SigtraderError> {
        let symbols = self.prices.list_symbols()?;
        debug!(count = symbols.len(), "listed symbols");
        self.report.write_symbols(out, &symbols)?;
        Ok(symbols)
    }

    pub fn signals(
        &self,
        config: &dyn ConfigPort,
        symbol: &str,
        strategy: Option<&str>,
        out: &mut dyn Write,
    ) -> Result<StrategyResult, SigtraderError> {
        validate_strategy_config(config)?;
        validate_backtest_config(config)?;
        let kind = build_strategy_kind(config, strategy)?;
        let symbol = normalize_symbol(symbol);

        let bars = self.load_bars(config, &symbol)?;
        let indicators = self.indicators.compute(&bars, &kind.required_indicators());
        let result = run_strategy(&kind, &symbol, &bars, &indicators)?;

        info!(symbol = %symbol, strategy = %kind, signals = result.signals.len(), "signals generated");
        self.report.write_strategy(out, &symbol, &result)?;
        Ok(result)
    }

    pub fn compare(
        &self,
        config: &dyn ConfigPort,
        symbol: &str,
        strategies: &[String],
        out: &mut dyn Write,
    ) -> Result<StrategyComparison, SigtraderError> {
        validate_strategy_config(config)?;
        validate_backtest_config(config)?;

        let kinds = if strategies.is_empty() {
            StrategyId::ALL
                .iter()
                .map(|id| build_strategy_kind(config, Some(id.as_str())))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            strategies
                .iter()
                .map(|name| build_strategy_kind(config, Some(name)))
                .collect::<Result<Vec<_>, _>>()?
        };
        let symbol = normalize_symbol(symbol);

        let bars = self.load_bars(config, &symbol)?;
        let indicators = self.indicators.compute(&bars, &indicator_requests(&kinds));
        let comparison = compare_strategies(&kinds, &symbol, &bars, &indicators);

        self.report.write_comparison(out, &comparison)?;
        Ok(comparison)
    }

    pub fn backtest(
        &self,
        config: &dyn ConfigPort,
        symbol: &str,
        strategy: Option<&str>,
        capital: Option<f64>,
        out: &mut dyn Write,
    ) -> Result<(BacktestResult, Option<RiskMetrics>), SigtraderError> {
        validate_strategy_config(config)?;
        validate_backtest_config(config)?;
        let kind = build_strategy_kind(config, strategy)?;
        let backtest_config = build_backtest_config(config, capital)?;
        let symbol = normalize_symbol(symbol);

        let bars = self.load_bars(config, &symbol)?;
        let indicators = self.indicators.compute(&bars, &kind.required_indicators());
        let result = run_strategy(&kind, &symbol, &bars, &indicators)?;

        let backtest = run_backtest(&result.signals, &bars, &backtest_config);
        let risk = analyze_risk(&backtest.equity_curve);

        self.report
            .write_backtest(out, &symbol, &result, &backtest, risk.as_ref())?;
        Ok((backtest, risk))
    }

    pub fn portfolio(
        &self,
        config: &dyn ConfigPort,
        symbols: Option<&str>,
        strategy: Option<&str>,
        out: &mut dyn Write,
    ) -> Result<PortfolioResult, SigtraderError> {
        validate_strategy_config(config)?;
        match symbols {
            Some(_) => validate_portfolio_window(config)?,
            None => validate_portfolio_config(config)?,
        }
        let request = build_portfolio_request(config, symbols, strategy)?;

        let result = PortfolioAggregator::new(self.prices, self.indicators).run(&request);

        self.report.write_portfolio(out, &result)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn cli_parses_signals() {
        let cli = Cli::parse_from([
            "sigtrader", "signals", "--data", "prices", "--symbol", "spy", "--strategy", "rsi",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Signals {
                source,
                symbol,
                strategy,
            } => {
                assert_eq!(source.data, Some(PathBuf::from("prices")));
                assert_eq!(symbol, "spy");
                assert_eq!(strategy.as_deref(), Some("rsi"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn cli_parses_symbols() {
        let cli = Cli::parse_from(["sigtrader", "symbols", "-d", "prices"]);
        match cli.command {
            Command::Symbols { source } => {
                assert_eq!(source.data, Some(PathBuf::from("prices")));
                assert_eq!(source.config, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn cli_parses_compare_list() {
        let cli = Cli::parse_from([
            "sigtrader",
            "compare",
            "--symbol",
            "SPY",
            "--strategies",
            "ma,macd",
        ]);
        match cli.command {
            Command::Compare { strategies, .. } => assert_eq!(strategies, vec!["ma", "macd"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn strategy_defaults_to_moving_average() {
        let kind = build_strategy_kind(&config(""), None).unwrap();
        assert_eq!(
            kind,
            StrategyKind::MovingAverageCrossover {
                short_period: 20,
                long_period: 50
            }
        );
    }

    #[test]
    fn strategy_reads_parameters() {
        let cfg = config("[strategy]\nkind = bollinger\nbollinger_period = 10\nstd_dev = 1.5\n");
        assert_eq!(
            build_strategy_kind(&cfg, None).unwrap(),
            StrategyKind::BollingerTouch {
                period: 10,
                std_dev: 1.5
            }
        );
    }

    #[test]
    fn strategy_override_wins() {
        let cfg = config("[strategy]\nkind = rsi\n");
        assert_eq!(
            build_strategy_kind(&cfg, Some("macd")).unwrap(),
            StrategyKind::MacdCrossover
        );
    }

    #[test]
    fn unknown_strategy_is_client_error() {
        let err = build_strategy_kind(&config(""), Some("ichimoku")).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn backtest_capital() {
        let cfg = config("[backtest]\ninitial_capital = 25000\n");
        assert_eq!(build_backtest_config(&cfg, None).unwrap().initial_capital, 25_000.0);
        assert_eq!(
            build_backtest_config(&cfg, Some(5_000.0)).unwrap().initial_capital,
            5_000.0
        );
        assert!(build_backtest_config(&cfg, Some(0.0)).is_err());
    }

    #[test]
    fn data_dir_resolution() {
        let cfg = config("[data]\npath = /srv/prices\n");
        assert_eq!(resolve_data_dir(&cfg, None).unwrap(), PathBuf::from("/srv/prices"));
        assert_eq!(
            resolve_data_dir(&cfg, Some(Path::new("here"))).unwrap(),
            PathBuf::from("here")
        );
        assert!(matches!(
            resolve_data_dir(&config(""), None),
            Err(SigtraderError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn portfolio_request_from_config() {
        let cfg = config(
            "[portfolio]\nsymbols = aapl,msft\nweights = AAPL=0.7,MSFT=0.3\nlookback_days = 30\nend_date = 2024-06-30\n",
        );
        let request = build_portfolio_request(&cfg, None, Some("rsi")).unwrap();
        assert_eq!(request.symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(request.weight_of("AAPL"), 0.7);
        assert_eq!(request.lookback_days, 30);
        assert_eq!(request.end_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(request.strategy.id(), StrategyId::Rsi);
    }

    #[test]
    fn portfolio_symbols_override() {
        let request = build_portfolio_request(&config(""), Some("spy, qqq"), None).unwrap();
        assert_eq!(request.symbols, vec!["SPY", "QQQ"]);
        assert_eq!(request.lookback_days, DEFAULT_PORTFOLIO_LOOKBACK_DAYS);
    }

    #[test]
    fn portfolio_without_symbols_fails() {
        assert!(matches!(
            build_portfolio_request(&config(""), None, None),
            Err(SigtraderError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn load_config_without_path_is_empty() {
        let cfg = load_config(None).unwrap();
        assert_eq!(cfg.get_string("data", "path"), None);
    }
}
