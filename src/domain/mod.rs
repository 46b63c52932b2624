//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod strategy;
pub mod confidence;
pub mod signal_generator;
pub mod combiner;
pub mod performance;
pub mod backtest;
pub mod metrics;
pub mod analysis;
pub mod portfolio;
pub mod universe;
pub mod config_validation;
pub mod error;
