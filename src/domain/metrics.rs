//! Risk statistics over an equity curve.
//!
//! The Sharpe figure here is the plain mean-to-deviation ratio of step
//! returns: no risk-free rate and no annualization.

use super::backtest::EquityPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct RiskMetrics {
    pub volatility_pct: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub peak_value: f64,
}

/// Returns `None` when the curve has fewer than two points.
pub fn analyze_risk(equity_curve: &[EquityPoint]) -> Option<RiskMetrics> {
    let values: Vec<f64> = equity_curve.iter().map(|p| p.net_worth).collect();
    analyze_values(&values)
}

pub fn analyze_values(values: &[f64]) -> Option<RiskMetrics> {
    if values.len() < 2 {
        return None;
    }

    let returns = step_returns(values);
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    let sharpe_ratio = if stddev > 0.0 { mean / stddev } else { 0.0 };
    let (max_drawdown, peak_value) = compute_drawdown(values);

    Some(RiskMetrics {
        volatility_pct: stddev * 100.0,
        max_drawdown_pct: max_drawdown * 100.0,
        sharpe_ratio,
        peak_value,
    })
}

fn step_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| {
            let prev = w[0];
            let curr = w[1];
            if prev != 0.0 { (curr - prev) / prev } else { 0.0 }
        })
        .collect()
}

/// Largest fractional decline from the running peak, and the peak itself.
fn compute_drawdown(values: &[f64]) -> (f64, f64) {
    let mut peak = values[0];
    let mut max_dd = 0.0_f64;

    for &value in values {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    (max_dd, peak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_equity_curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                net_worth: v,
            })
            .collect()
    }

    #[test]
    fn too_short_curve_has_no_metrics() {
        assert!(analyze_risk(&[]).is_none());
        assert!(analyze_risk(&make_equity_curve(&[100.0])).is_none());
    }

    #[test]
    fn drawdown_from_running_peak() {
        let metrics = analyze_risk(&make_equity_curve(&[100.0, 110.0, 90.0, 120.0])).unwrap();
        assert_relative_eq!(metrics.max_drawdown_pct, 20.0 / 110.0 * 100.0, epsilon = 1e-9);
        assert!((metrics.max_drawdown_pct - 18.18).abs() < 0.01);
        assert_relative_eq!(metrics.peak_value, 120.0);
    }

    #[test]
    fn volatility_is_population_stddev() {
        // returns +10%, -10%: mean 0, population stddev 10%
        let metrics = analyze_values(&[100.0, 110.0, 99.0]).unwrap();
        assert_relative_eq!(metrics.volatility_pct, 10.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.sharpe_ratio, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn constant_curve_is_neutral() {
        let metrics = analyze_values(&[100.0, 100.0, 100.0]).unwrap();
        assert_relative_eq!(metrics.volatility_pct, 0.0);
        assert_relative_eq!(metrics.max_drawdown_pct, 0.0);
        assert_relative_eq!(metrics.sharpe_ratio, 0.0);
    }

    #[test]
    fn rising_curve_has_positive_sharpe() {
        let metrics = analyze_values(&[100.0, 101.0, 103.0, 104.0]).unwrap();
        assert!(metrics.sharpe_ratio > 0.0);
        assert_relative_eq!(metrics.max_drawdown_pct, 0.0);
    }

    #[test]
    fn zero_value_step_is_neutral() {
        let metrics = analyze_values(&[0.0, 50.0, 25.0]).unwrap();
        assert!(metrics.volatility_pct.is_finite());
        assert!(metrics.sharpe_ratio.is_finite());
        assert_relative_eq!(metrics.max_drawdown_pct, 50.0, epsilon = 1e-9);
    }
}
