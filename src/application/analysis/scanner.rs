use crate::application::analysis::detectors;
use crate::domain::market::candle::Candle;
use crate::domain::market::pattern::Pattern;

/// Minimum wall-clock gap between two scan passes. Calls inside the window
/// return the previous result unchanged.
pub const DETECTION_INTERVAL_MS: i64 = 5_000;

/// Candles required before the scanner runs at all.
const MIN_CANDLES: usize = 20;

/// The scan window: only the most recent candles are considered.
const WINDOW: usize = 30;

/// Buffer trim bounds: once more than `BUFFER_HIGH` detections accumulate,
/// only the latest `BUFFER_KEEP` survive, so stale signals age out.
const BUFFER_HIGH: usize = 10;
const BUFFER_KEEP: usize = 5;

/// Scans candle windows for chart and candlestick formations.
///
/// Detections are cumulative across passes (the rolling buffer), and the
/// heavier chart-geometry detectors only run on every other pass.
pub struct PatternScanner {
    patterns: Vec<Pattern>,
    last_detection_ms: Option<i64>,
    check_chart_patterns: bool,
}

impl PatternScanner {
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            last_detection_ms: None,
            check_chart_patterns: true,
        }
    }

    /// Runs all detectors over the most recent candles and returns the
    /// current pattern list as a snapshot. Rate-limited to one real pass per
    /// `DETECTION_INTERVAL_MS`; within the window the previous list comes
    /// back untouched.
    pub fn detect(&mut self, candles: &[Candle], now_ms: i64) -> Vec<Pattern> {
        if let Some(last) = self.last_detection_ms
            && now_ms - last < DETECTION_INTERVAL_MS
        {
            return self.patterns.clone();
        }
        self.last_detection_ms = Some(now_ms);

        if self.patterns.len() > BUFFER_HIGH {
            self.patterns = self
                .patterns
                .split_off(self.patterns.len() - BUFFER_KEEP);
        }

        if candles.len() < MIN_CANDLES {
            return self.patterns.clone();
        }

        let window = &candles[candles.len().saturating_sub(WINDOW)..];

        self.push(detectors::detect_hammer(window));
        self.push(detectors::detect_engulfing(window));
        self.push(detectors::detect_doji(window));

        // Chart geometry runs on alternate passes only
        if self.check_chart_patterns {
            self.push(detectors::detect_bull_flag(window));
            self.push(detectors::detect_bear_flag(window));
            self.push(detectors::detect_triangle(window));
            self.push(detectors::detect_channel(window));
        }
        self.check_chart_patterns = !self.check_chart_patterns;

        self.push(detectors::detect_rsi_extremes(window));

        self.patterns.clone()
    }

    fn push(&mut self, detection: Option<Pattern>) {
        if let Some(pattern) = detection {
            self.patterns.push(pattern);
        }
    }
}

impl Default for PatternScanner {
    fn default() -> Self {
        Self::new()
    }
}
