use crate::domain::market::candle::Candle;

/// Least-squares fit of y against x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination in [0, 1]; 0 when y is constant or the
    /// fit is degenerate.
    pub r_squared: f64,
}

/// Simple linear regression with R². Computed on centered coordinates so
/// millisecond-scale x values don't lose the slope to cancellation.
pub fn linear_regression(x: &[f64], y: &[f64]) -> LinearFit {
    let n = x.len().min(y.len());
    if n < 2 {
        return LinearFit {
            slope: 0.0,
            intercept: 0.0,
            r_squared: 0.0,
        };
    }

    let x = &x[..n];
    let y = &y[..n];
    let x_mean = x.iter().sum::<f64>() / n as f64;
    let y_mean = y.iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        sxy += (xi - x_mean) * (yi - y_mean);
        sxx += (xi - x_mean) * (xi - x_mean);
    }

    if sxx == 0.0 {
        return LinearFit {
            slope: 0.0,
            intercept: y_mean,
            r_squared: 0.0,
        };
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let ss_total: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
    let ss_residual: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| {
            let predicted = slope * xi + intercept;
            (yi - predicted).powi(2)
        })
        .sum();

    let r_squared = if ss_total > 0.0 {
        1.0 - ss_residual / ss_total
    } else {
        0.0
    };

    LinearFit {
        slope,
        intercept,
        r_squared,
    }
}

/// Regression of closes against candle index. `r_squared` doubles as the
/// trend strength used by the flag detectors.
pub fn close_trend(candles: &[Candle]) -> LinearFit {
    let x: Vec<f64> = (0..candles.len()).map(|i| i as f64).collect();
    let y: Vec<f64> = candles.iter().map(|c| c.close).collect();
    linear_regression(&x, &y)
}

/// Exponential moving average series, seeded from the first price. Output
/// has the same length as the input.
pub fn ema(prices: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out: Vec<f64> = Vec::with_capacity(prices.len());
    for price in prices {
        let next = match out.last() {
            Some(previous) => price * k + previous * (1.0 - k),
            None => *price,
        };
        out.push(next);
    }
    out
}

/// Relative Strength Index over the last `period` closes, simple-average
/// variant. Returns the 50 midpoint when there is not enough data and 100
/// when the window has no losses.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return 50.0;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..=period {
        let change = closes[closes.len() - i] - closes[closes.len() - i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regression_recovers_a_perfect_line() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|xi| 3.0 * xi + 2.0).collect();
        let fit = linear_regression(&x, &y);
        assert!((fit.slope - 3.0).abs() < 1e-12);
        assert!((fit.intercept - 2.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_regression_handles_millisecond_x() {
        // x values on the unix-ms scale must not destroy the slope
        let base = 1_704_067_200_000_f64;
        let x: Vec<f64> = (0..30).map(|i| base + i as f64 * 1_000.0).collect();
        let y: Vec<f64> = (0..30).map(|i| 96_000.0 + i as f64 * 5.0).collect();
        let fit = linear_regression(&x, &y);
        assert!((fit.slope - 0.005).abs() < 1e-9);
        assert!(fit.r_squared > 0.999);
    }

    #[test]
    fn test_regression_degenerate_inputs() {
        assert_eq!(linear_regression(&[], &[]).slope, 0.0);
        assert_eq!(linear_regression(&[1.0], &[5.0]).slope, 0.0);

        // Constant x: no slope, intercept at the mean
        let fit = linear_regression(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 2.0);

        // Constant y: flat line with zero strength
        let fit = linear_regression(&[0.0, 1.0, 2.0], &[7.0, 7.0, 7.0]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn test_ema_converges_toward_constant_input() {
        let prices = vec![100.0; 50];
        let series = ema(&prices, 9);
        assert_eq!(series.len(), 50);
        assert!(series.iter().all(|v| (*v - 100.0).abs() < 1e-12));

        // A step change decays toward the new level without overshoot
        let mut prices = vec![100.0; 10];
        prices.extend(vec![110.0; 40]);
        let series = ema(&prices, 9);
        assert!(series[9] < series[20]);
        assert!(series[49] <= 110.0);
        assert!(series[49] > 109.0);
    }

    #[test]
    fn test_ema_empty_input() {
        assert!(ema(&[], 9).is_empty());
    }

    #[test]
    fn test_rsi_extremes() {
        let rising: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&rising, 14), 100.0);

        let falling: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        assert_eq!(rsi(&falling, 14), 0.0);
    }

    #[test]
    fn test_rsi_insufficient_data_is_neutral() {
        let closes = [100.0, 101.0, 102.0];
        assert_eq!(rsi(&closes, 14), 50.0);
        assert_eq!(rsi(&closes, 0), 50.0);
    }

    #[test]
    fn test_rsi_balanced_window_is_midpoint() {
        // Alternating +1/-1 changes: average gain equals average loss
        let mut closes = vec![100.0];
        for i in 0..20 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        let value = rsi(&closes, 14);
        assert!((value - 50.0).abs() < 1e-9);
    }
}
