//! Configuration validation.
//!
//! Validates config fields before a run. Absent keys fall back to defaults
//! and are only checked once present.

use crate::domain::error::SigtraderError;
use crate::domain::strategy::{
    DEFAULT_BOLLINGER_PERIOD, DEFAULT_LONG_PERIOD, DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD,
    DEFAULT_RSI_PERIOD, DEFAULT_SHORT_PERIOD, DEFAULT_STD_DEV, StrategyId,
};
use crate::domain::universe::{parse_symbols, parse_weights};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

/// Longest accepted price window, one hundred years.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// Smallest band multiplier; band keys carry two decimals.
pub const MIN_STD_DEV: f64 = 0.01;

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_kind(config)?;
    validate_periods(config)?;
    validate_thresholds(config)?;
    validate_std_dev(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_initial_capital(config)?;
    validate_lookback(config, "backtest")?;
    if let Some(value) = config.get_string("backtest", "end_date") {
        parse_date(&value, "backtest", "end_date")?;
    }
    Ok(())
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    match config.get_string("portfolio", "symbols") {
        Some(s) if !s.trim().is_empty() => {
            parse_symbols(&s)?;
        }
        _ => {
            return Err(SigtraderError::ConfigMissing {
                section: "portfolio".to_string(),
                key: "symbols".to_string(),
            });
        }
    }

    if let Some(weights) = config.get_string("portfolio", "weights") {
        parse_weights(&weights).map_err(|e| invalid("portfolio", "weights", e.to_string()))?;
    }

    validate_portfolio_window(config)
}

/// Checks `[portfolio] lookback_days` and `end_date` alone, for runs whose
/// symbols come from elsewhere.
pub fn validate_portfolio_window(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_lookback(config, "portfolio")?;
    if let Some(value) = config.get_string("portfolio", "end_date") {
        parse_date(&value, "portfolio", "end_date")?;
    }
    Ok(())
}

/// Parses a `YYYY-MM-DD` config value.
pub fn parse_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, SigtraderError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| invalid(section, key, format!("invalid {} format, expected YYYY-MM-DD", key)))
}

fn invalid(section: &str, key: &str, reason: String) -> SigtraderError {
    SigtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

fn validate_kind(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    if let Some(kind) = config.get_string("strategy", "kind") {
        kind.parse::<StrategyId>()?;
    }
    Ok(())
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let short = config.get_int("strategy", "short_period", DEFAULT_SHORT_PERIOD as i64);
    let long = config.get_int("strategy", "long_period", DEFAULT_LONG_PERIOD as i64);
    let rsi = config.get_int("strategy", "rsi_period", DEFAULT_RSI_PERIOD as i64);
    let bollinger = config.get_int("strategy", "bollinger_period", DEFAULT_BOLLINGER_PERIOD as i64);

    for (key, value) in [
        ("short_period", short),
        ("long_period", long),
        ("rsi_period", rsi),
        ("bollinger_period", bollinger),
    ] {
        if value < 1 {
            return Err(invalid("strategy", key, format!("{} must be at least 1", key)));
        }
    }

    if short >= long {
        return Err(invalid(
            "strategy",
            "short_period",
            "short_period must be less than long_period".to_string(),
        ));
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let oversold = config.get_double("strategy", "oversold", DEFAULT_OVERSOLD);
    let overbought = config.get_double("strategy", "overbought", DEFAULT_OVERBOUGHT);

    if !(0.0..=100.0).contains(&oversold) {
        return Err(invalid(
            "strategy",
            "oversold",
            "oversold must be between 0 and 100".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&overbought) {
        return Err(invalid(
            "strategy",
            "overbought",
            "overbought must be between 0 and 100".to_string(),
        ));
    }
    if oversold >= overbought {
        return Err(invalid(
            "strategy",
            "oversold",
            "oversold must be below overbought".to_string(),
        ));
    }
    Ok(())
}

fn validate_std_dev(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_double("strategy", "std_dev", DEFAULT_STD_DEV);
    if value < MIN_STD_DEV || !value.is_finite() {
        return Err(invalid(
            "strategy",
            "std_dev",
            format!("std_dev must be at least {}", MIN_STD_DEV),
        ));
    }
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_double(
        "backtest",
        "initial_capital",
        crate::domain::backtest::DEFAULT_INITIAL_CAPITAL,
    );
    if value <= 0.0 || !value.is_finite() {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort, section: &str) -> Result<(), SigtraderError> {
    let value = config.get_int(section, "lookback_days", 1);
    if !(1..=MAX_LOOKBACK_DAYS).contains(&value) {
        return Err(invalid(
            section,
            "lookback_days",
            format!("lookback_days must be between 1 and {}", MAX_LOOKBACK_DAYS),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use crate::domain::universe::UniverseError;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn empty_config_uses_valid_defaults() {
        let config = make_config("");
        assert!(validate_strategy_config(&config).is_ok());
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn valid_strategy_config_passes() {
        let config = make_config(
            r#"
[strategy]
kind = rsi
short_period = 10
long_period = 30
rsi_period = 14
oversold = 25
overbought = 75
bollinger_period = 20
std_dev = 2.5
"#,
        );
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn unknown_kind_fails() {
        let config = make_config("[strategy]\nkind = momentum\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::UnsupportedStrategy { name } if name == "momentum"));
    }

    #[test]
    fn zero_period_fails() {
        let config = make_config("[strategy]\nrsi_period = 0\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "rsi_period"));
    }

    #[test]
    fn short_must_be_below_long() {
        let config = make_config("[strategy]\nshort_period = 50\nlong_period = 20\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "short_period"));
    }

    #[test]
    fn oversold_above_overbought_fails() {
        let config = make_config("[strategy]\noversold = 80\noverbought = 70\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "oversold"));
    }

    #[test]
    fn overbought_out_of_range_fails() {
        let config = make_config("[strategy]\noverbought = 120\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "overbought"));
    }

    #[test]
    fn std_dev_must_be_positive() {
        let config = make_config("[strategy]\nstd_dev = 0\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "std_dev"));
    }

    #[test]
    fn std_dev_below_key_precision_fails() {
        let config = make_config("[strategy]\nstd_dev = 0.001\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "std_dev"));

        let config = make_config("[strategy]\nstd_dev = 0.01\n");
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn initial_capital_must_be_positive() {
        let config = make_config("[backtest]\ninitial_capital = -100\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "initial_capital")
        );
    }

    #[test]
    fn invalid_end_date_format_fails() {
        let config = make_config("[backtest]\nend_date = 2024/12/31\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "end_date"));
    }

    #[test]
    fn lookback_must_be_positive() {
        let config = make_config("[backtest]\nlookback_days = 0\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "lookback_days"));
    }

    #[test]
    fn lookback_has_upper_bound() {
        let config = make_config("[backtest]\nlookback_days = 100000000\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "lookback_days"));

        let config = make_config("[portfolio]\nsymbols = AAA\nlookback_days = 36501\n");
        assert!(validate_portfolio_config(&config).is_err());

        let config = make_config("[backtest]\nlookback_days = 36500\n");
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn valid_portfolio_config_passes() {
        let config = make_config(
            "[portfolio]\nsymbols = AAPL,MSFT\nweights = AAPL=0.6,MSFT=0.4\nlookback_days = 100\n",
        );
        assert!(validate_portfolio_config(&config).is_ok());
    }

    #[test]
    fn missing_symbols_fails() {
        let config = make_config("[portfolio]\nlookback_days = 100\n");
        let err = validate_portfolio_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigMissing { key, .. } if key == "symbols"));
    }

    #[test]
    fn duplicate_symbols_fail() {
        let config = make_config("[portfolio]\nsymbols = AAPL,aapl\n");
        let err = validate_portfolio_config(&config).unwrap_err();
        assert!(matches!(
            err,
            SigtraderError::InvalidSymbolList(UniverseError::DuplicateSymbol(_))
        ));
    }

    #[test]
    fn negative_weight_fails() {
        let config = make_config("[portfolio]\nsymbols = AAPL\nweights = AAPL=-1\n");
        let err = validate_portfolio_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "weights"));
    }
}
