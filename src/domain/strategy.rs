//! Strategy family: identity, parameters and catalog.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::SigtraderError;
use crate::domain::indicator::macd::DEFAULT_MACD;
use crate::domain::indicator::IndicatorType;

pub const DEFAULT_SHORT_PERIOD: usize = 20;
pub const DEFAULT_LONG_PERIOD: usize = 50;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;
pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_STD_DEV: f64 = 2.0;

/// Bars required by the MACD crossover regardless of parameters.
pub const MACD_MIN_BARS: usize = 50;
/// Extra bars RSI and Bollinger need beyond their window.
pub const WARMUP_MARGIN: usize = 10;

/// Parameterless strategy identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyId {
    MovingAverage,
    Rsi,
    Macd,
    BollingerBands,
    Combined,
}

impl StrategyId {
    pub const ALL: [StrategyId; 5] = [
        StrategyId::MovingAverage,
        StrategyId::Rsi,
        StrategyId::Macd,
        StrategyId::BollingerBands,
        StrategyId::Combined,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyId::MovingAverage => "moving_average",
            StrategyId::Rsi => "rsi",
            StrategyId::Macd => "macd",
            StrategyId::BollingerBands => "bollinger_bands",
            StrategyId::Combined => "combined",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = SigtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "moving_average" | "ma" | "sma" => Ok(StrategyId::MovingAverage),
            "rsi" => Ok(StrategyId::Rsi),
            "macd" => Ok(StrategyId::Macd),
            "bollinger_bands" | "bollinger" | "bb" => Ok(StrategyId::BollingerBands),
            "combined" => Ok(StrategyId::Combined),
            _ => Err(SigtraderError::UnsupportedStrategy {
                name: s.trim().to_string(),
            }),
        }
    }
}

/// A strategy together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyKind {
    MovingAverageCrossover {
        short_period: usize,
        long_period: usize,
    },
    RsiThreshold {
        period: usize,
        oversold: f64,
        overbought: f64,
    },
    MacdCrossover,
    BollingerTouch {
        period: usize,
        std_dev: f64,
    },
    Combined,
}

impl StrategyKind {
    /// The strategy identified by `id` with default parameters.
    pub fn with_defaults(id: StrategyId) -> Self {
        match id {
            StrategyId::MovingAverage => StrategyKind::MovingAverageCrossover {
                short_period: DEFAULT_SHORT_PERIOD,
                long_period: DEFAULT_LONG_PERIOD,
            },
            StrategyId::Rsi => StrategyKind::RsiThreshold {
                period: DEFAULT_RSI_PERIOD,
                oversold: DEFAULT_OVERSOLD,
                overbought: DEFAULT_OVERBOUGHT,
            },
            StrategyId::Macd => StrategyKind::MacdCrossover,
            StrategyId::BollingerBands => StrategyKind::BollingerTouch {
                period: DEFAULT_BOLLINGER_PERIOD,
                std_dev: DEFAULT_STD_DEV,
            },
            StrategyId::Combined => StrategyKind::Combined,
        }
    }

    /// Sub-strategies merged by the combined strategy, in vote order.
    pub fn combined_components() -> [StrategyKind; 3] {
        [
            StrategyKind::with_defaults(StrategyId::MovingAverage),
            StrategyKind::with_defaults(StrategyId::Rsi),
            StrategyKind::with_defaults(StrategyId::Macd),
        ]
    }

    pub fn id(&self) -> StrategyId {
        match self {
            StrategyKind::MovingAverageCrossover { .. } => StrategyId::MovingAverage,
            StrategyKind::RsiThreshold { .. } => StrategyId::Rsi,
            StrategyKind::MacdCrossover => StrategyId::Macd,
            StrategyKind::BollingerTouch { .. } => StrategyId::BollingerBands,
            StrategyKind::Combined => StrategyId::Combined,
        }
    }

    /// Display name carrying the parameters, e.g. "Moving Average Crossover (20/50)".
    pub fn name(&self) -> String {
        match self {
            StrategyKind::MovingAverageCrossover {
                short_period,
                long_period,
            } => format!("Moving Average Crossover ({}/{})", short_period, long_period),
            StrategyKind::RsiThreshold { period, .. } => format!("RSI ({})", period),
            StrategyKind::MacdCrossover => "MACD".to_string(),
            StrategyKind::BollingerTouch { period, std_dev } => {
                format!("Bollinger Bands ({}, {})", period, std_dev)
            }
            StrategyKind::Combined => "Combined".to_string(),
        }
    }

    /// Minimum number of price bars before the strategy will run.
    pub fn min_bars(&self) -> usize {
        match self {
            StrategyKind::MovingAverageCrossover { long_period, .. } => *long_period,
            StrategyKind::RsiThreshold { period, .. } => period + WARMUP_MARGIN,
            StrategyKind::MacdCrossover => MACD_MIN_BARS,
            StrategyKind::BollingerTouch { period, .. } => period + WARMUP_MARGIN,
            StrategyKind::Combined => Self::combined_components()
                .iter()
                .map(StrategyKind::min_bars)
                .max()
                .unwrap_or(0),
        }
    }

    /// Indicator series the strategy reads.
    pub fn required_indicators(&self) -> Vec<IndicatorType> {
        match self {
            StrategyKind::MovingAverageCrossover {
                short_period,
                long_period,
            } => vec![
                IndicatorType::Sma(*short_period),
                IndicatorType::Sma(*long_period),
            ],
            StrategyKind::RsiThreshold { period, .. } => vec![IndicatorType::Rsi(*period)],
            StrategyKind::MacdCrossover => vec![DEFAULT_MACD],
            StrategyKind::BollingerTouch { period, std_dev } => {
                vec![IndicatorType::bollinger(*period, *std_dev)]
            }
            StrategyKind::Combined => Self::combined_components()
                .iter()
                .flat_map(StrategyKind::required_indicators)
                .collect(),
        }
    }

    pub fn catalog() -> Vec<StrategyInfo> {
        StrategyId::ALL.iter().map(|&id| StrategyInfo::of(id)).collect()
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Catalog entry describing a strategy to users.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyInfo {
    pub id: StrategyId,
    pub name: &'static str,
    pub description: &'static str,
    pub risk_level: RiskLevel,
    pub timeframe: &'static str,
    pub parameters: &'static [&'static str],
}

impl StrategyInfo {
    pub fn of(id: StrategyId) -> Self {
        match id {
            StrategyId::MovingAverage => StrategyInfo {
                id,
                name: "Moving Average Crossover",
                description: "Trades crossings of a short and a long simple moving average",
                risk_level: RiskLevel::Medium,
                timeframe: "medium term",
                parameters: &["short_period", "long_period"],
            },
            StrategyId::Rsi => StrategyInfo {
                id,
                name: "Relative Strength Index",
                description: "Trades RSI exits from oversold and entries into overbought",
                risk_level: RiskLevel::Low,
                timeframe: "short term",
                parameters: &["period", "oversold", "overbought"],
            },
            StrategyId::Macd => StrategyInfo {
                id,
                name: "MACD",
                description: "Trades crossings of the MACD line and its signal line",
                risk_level: RiskLevel::High,
                timeframe: "medium term",
                parameters: &["fast_period", "slow_period", "signal_period"],
            },
            StrategyId::BollingerBands => StrategyInfo {
                id,
                name: "Bollinger Bands",
                description: "Buys touches of the lower band and sells touches of the upper band",
                risk_level: RiskLevel::Medium,
                timeframe: "short to medium term",
                parameters: &["period", "std_dev"],
            },
            StrategyId::Combined => StrategyInfo {
                id,
                name: "Combined",
                description: "Confidence-weighted consensus of the MA, RSI and MACD strategies",
                risk_level: RiskLevel::Medium,
                timeframe: "medium term",
                parameters: &[],
            },
        }
    }
}
