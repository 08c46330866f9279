use serde::{Deserialize, Serialize};

/// An OHLCV candle over one timeframe bucket.
///
/// `time` is the bucket start in unix milliseconds, aligned to the
/// timeframe's interval. Prices are plain f64 because the whole market side
/// of the simulation runs on floating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Absolute size of the real body.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Full high-low range.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Shadow above the body.
    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// Shadow below the body.
    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// OHLC ordering invariant: low ≤ min(open, close) ≤ max(open, close) ≤ high,
    /// with every field finite.
    pub fn is_well_formed(&self) -> bool {
        let finite = self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite();
        finite && self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            time: 0,
            open,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_body_and_shadows() {
        let c = candle(100.0, 110.0, 95.0, 104.0);
        assert_eq!(c.body(), 4.0);
        assert_eq!(c.range(), 15.0);
        assert_eq!(c.upper_shadow(), 6.0);
        assert_eq!(c.lower_shadow(), 5.0);
        assert!(c.is_bullish());
    }

    #[test]
    fn test_well_formed() {
        assert!(candle(100.0, 110.0, 95.0, 104.0).is_well_formed());
        // High below the body is malformed
        assert!(!candle(100.0, 102.0, 95.0, 104.0).is_well_formed());
        // NaN anywhere is malformed
        assert!(!candle(f64::NAN, 110.0, 95.0, 104.0).is_well_formed());
    }
}
