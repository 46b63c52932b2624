//! Symbol lists and weight maps for multi-symbol runs.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("invalid weight entry '{0}', expected SYMBOL=WEIGHT with a non-negative weight")]
    InvalidWeight(String),
}

/// Splits a comma list into upper-cased symbols, rejecting blanks and repeats.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Parses `SYM=0.5,SYM2=0.25`. An empty string is an empty map.
pub fn parse_weights(input: &str) -> Result<HashMap<String, f64>, UniverseError> {
    let mut weights = HashMap::new();
    if input.trim().is_empty() {
        return Ok(weights);
    }

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let (symbol, value) = trimmed
            .split_once('=')
            .ok_or_else(|| UniverseError::InvalidWeight(trimmed.to_string()))?;
        let symbol = symbol.trim().to_uppercase();
        let weight: f64 = value
            .trim()
            .parse()
            .map_err(|_| UniverseError::InvalidWeight(trimmed.to_string()))?;
        if symbol.is_empty() || !weight.is_finite() || weight < 0.0 {
            return Err(UniverseError::InvalidWeight(trimmed.to_string()));
        }
        if weights.insert(symbol.clone(), weight).is_some() {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
    }

    Ok(weights)
}
