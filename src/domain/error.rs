//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for sigtrader.
#[derive(Debug, thiserror::Error)]
pub enum SigtraderError {
    #[error("insufficient data for {strategy}: have {bars} bars, need {minimum}")]
    InsufficientData {
        strategy: String,
        bars: usize,
        minimum: usize,
    },

    #[error("{strategy}: indicator {indicator} is not available")]
    MissingIndicator { strategy: String, indicator: String },

    #[error("{strategy}: indicator {indicator} has {actual} values for {expected} bars")]
    MisalignedIndicator {
        strategy: String,
        indicator: String,
        expected: usize,
        actual: usize,
    },

    #[error("{strategy}: price bars are not in strictly increasing date order")]
    UnorderedBars { strategy: String },

    #[error("unsupported strategy: {name}")]
    UnsupportedStrategy { name: String },

    #[error("sub-strategy {strategy} failed: {reason}")]
    SubStrategyFailed { strategy: String, reason: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    InvalidSymbolList(#[from] UniverseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigtraderError {
    /// True for failures caused by the caller's request rather than by the data.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SigtraderError::UnsupportedStrategy { .. }
                | SigtraderError::ConfigParse { .. }
                | SigtraderError::ConfigMissing { .. }
                | SigtraderError::ConfigInvalid { .. }
                | SigtraderError::InvalidSymbolList(_)
        )
    }
}

impl From<&SigtraderError> for std::process::ExitCode {
    fn from(err: &SigtraderError) -> Self {
        let code: u8 = match err {
            SigtraderError::Io(_) => 1,
            SigtraderError::UnsupportedStrategy { .. }
            | SigtraderError::ConfigParse { .. }
            | SigtraderError::ConfigMissing { .. }
            | SigtraderError::ConfigInvalid { .. }
            | SigtraderError::InvalidSymbolList(_) => 2,
            SigtraderError::DataSource { .. } | SigtraderError::UnknownSymbol { .. } => 3,
            SigtraderError::InsufficientData { .. }
            | SigtraderError::MissingIndicator { .. }
            | SigtraderError::MisalignedIndicator { .. }
            | SigtraderError::UnorderedBars { .. }
            | SigtraderError::SubStrategyFailed { .. }
            | SigtraderError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = SigtraderError::InsufficientData {
            strategy: "RSI (14)".into(),
            bars: 10,
            minimum: 24,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for RSI (14): have 10 bars, need 24"
        );
    }

    #[test]
    fn unsupported_strategy_is_client_error() {
        let err = SigtraderError::UnsupportedStrategy {
            name: "ichimoku".into(),
        };
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "unsupported strategy: ichimoku");
    }

    #[test]
    fn data_failures_are_not_client_errors() {
        let err = SigtraderError::NoData {
            symbol: "BHP".into(),
        };
        assert!(!err.is_client_error());
    }

    #[test]
    fn universe_error_converts() {
        let err: SigtraderError = UniverseError::EmptyToken.into();
        assert!(matches!(err, SigtraderError::InvalidSymbolList(_)));
        assert!(err.is_client_error());
    }
}
