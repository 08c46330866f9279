use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of chart and candlestick formations the scanner can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternType {
    Hammer,
    Engulfing,
    Doji,
    BullFlag,
    BearFlag,
    Triangle,
    Channel,
    Oversold,
    Overbought,
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatternType::Hammer => "hammer",
            PatternType::Engulfing => "engulfing",
            PatternType::Doji => "doji",
            PatternType::BullFlag => "bull flag",
            PatternType::BearFlag => "bear flag",
            PatternType::Triangle => "triangle",
            PatternType::Channel => "channel",
            PatternType::Oversold => "oversold",
            PatternType::Overbought => "overbought",
        };
        write!(f, "{}", name)
    }
}

/// A detected formation over a candle window, with a confidence score in [0, 1]
/// and a human-readable message for the consumer to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub pattern_type: PatternType,
    pub start_time: i64,
    pub end_time: i64,
    pub start_price: f64,
    pub end_price: f64,
    pub confidence: f64,
    pub message: String,
}
