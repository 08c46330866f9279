use crate::application::analysis::indicators::{close_trend, linear_regression, rsi};
use crate::domain::market::candle::Candle;
use crate::domain::market::pattern::{Pattern, PatternType};

/// Confidence assigned when a detector has no better estimate.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

const RSI_PERIOD: usize = 14;

/// Small real body with a long lower shadow after a falling stretch.
pub fn detect_hammer(window: &[Candle]) -> Option<Pattern> {
    if window.len() < 3 {
        return None;
    }

    let current = window.last()?;
    let body = current.body();
    let range = current.range();

    let shape_ok = current.lower_shadow() > body * 2.0
        && current.upper_shadow() < body * 0.5
        && body > 0.0
        && body < range * 0.3;
    if !shape_ok {
        return None;
    }

    // Hammers only mean something after a downtrend
    let context = &window[window.len().saturating_sub(5)..window.len() - 1];
    if close_trend(context).slope >= 0.0 {
        return None;
    }

    let message = if current.is_bullish() {
        "Bullish hammer - potential reversal after downtrend"
    } else {
        "Hammer with bearish close - watch for confirmation"
    };

    Some(Pattern {
        pattern_type: PatternType::Hammer,
        start_time: current.time,
        end_time: current.time,
        start_price: current.low,
        end_price: current.high,
        confidence: 0.75,
        message: message.to_string(),
    })
}

/// Current body fully contains the previous body in the opposite direction,
/// exceeding it by more than 10%.
pub fn detect_engulfing(window: &[Candle]) -> Option<Pattern> {
    if window.len() < 2 {
        return None;
    }

    let current = &window[window.len() - 1];
    let previous = &window[window.len() - 2];

    let previous_body = previous.body();
    let current_body = current.body();
    if current_body <= previous_body * 1.1 {
        return None;
    }

    let bullish = !previous.is_bullish()
        && current.is_bullish()
        && current.open < previous.close
        && current.close > previous.open;
    let bearish = previous.is_bullish()
        && !current.is_bullish()
        && current.open > previous.close
        && current.close < previous.open;

    if bullish {
        Some(Pattern {
            pattern_type: PatternType::Engulfing,
            start_time: previous.time,
            end_time: current.time,
            start_price: previous.open.min(previous.close),
            end_price: current.open.max(current.close),
            confidence: 0.8,
            message: "Bullish engulfing - momentum shifting up".to_string(),
        })
    } else if bearish {
        Some(Pattern {
            pattern_type: PatternType::Engulfing,
            start_time: previous.time,
            end_time: current.time,
            start_price: previous.open.max(previous.close),
            end_price: current.open.min(current.close),
            confidence: 0.8,
            message: "Bearish engulfing - momentum shifting down".to_string(),
        })
    } else {
        None
    }
}

/// Body under 10% of the full range: indecision bar.
pub fn detect_doji(window: &[Candle]) -> Option<Pattern> {
    let current = window.last()?;
    let range = current.range();
    if range <= 0.0 || current.body() >= range * 0.1 {
        return None;
    }

    Some(Pattern {
        pattern_type: PatternType::Doji,
        start_time: current.time,
        end_time: current.time,
        start_price: current.low,
        end_price: current.high,
        confidence: 0.6,
        message: "Doji - market indecision, potential reversal ahead".to_string(),
    })
}

/// Strong upward pole followed by a tight sideways flag.
pub fn detect_bull_flag(window: &[Candle]) -> Option<Pattern> {
    flag_pattern(window, true)
}

/// Strong downward pole followed by a tight sideways flag.
pub fn detect_bear_flag(window: &[Candle]) -> Option<Pattern> {
    flag_pattern(window, false)
}

fn flag_pattern(window: &[Candle], bullish: bool) -> Option<Pattern> {
    if window.len() < 15 {
        return None;
    }

    let first_half = &window[..10];
    let second_half = &window[10..];

    let pole = close_trend(first_half);
    let pole_direction_ok = if bullish {
        pole.slope > 0.0
    } else {
        pole.slope < 0.0
    };
    if !pole_direction_ok || pole.r_squared < 0.6 {
        return None;
    }

    // Consolidation: the flag's slope is at most 40% of the pole's
    let flag = close_trend(second_half);
    if flag.slope.abs() > pole.slope.abs() * 0.4 {
        return None;
    }

    let flag_high = second_half.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let flag_low = second_half.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let flag_height = flag_high - flag_low;

    let first = &first_half[0];
    let pole_height = if bullish {
        first_half[first_half.len() - 1].close - first.open
    } else {
        first.open - first_half[first_half.len() - 1].close
    };

    if pole_height <= 0.0 || flag_height >= pole_height * 0.5 {
        return None;
    }

    let last = &second_half[second_half.len() - 1];
    let (pattern_type, message) = if bullish {
        (
            PatternType::BullFlag,
            "Bull flag - continuation likely, upside bias",
        )
    } else {
        (
            PatternType::BearFlag,
            "Bear flag - downside continuation likely",
        )
    };

    Some(Pattern {
        pattern_type,
        start_time: first.time,
        end_time: last.time,
        start_price: first.open,
        end_price: last.close,
        confidence: DEFAULT_CONFIDENCE,
        message: message.to_string(),
    })
}

/// Falling highs against rising lows: converging triangle.
pub fn detect_triangle(window: &[Candle]) -> Option<Pattern> {
    if window.len() < 15 {
        return None;
    }

    let (times, highs, lows) = edges(window);
    let high_trend = linear_regression(&times, &highs);
    let low_trend = linear_regression(&times, &lows);

    let converging = high_trend.slope < 0.0 && low_trend.slope > 0.0;
    let convergence = (high_trend.slope - low_trend.slope).abs();
    if !converging || convergence <= 0.000001 {
        return None;
    }

    let last = window.last()?;
    Some(Pattern {
        pattern_type: PatternType::Triangle,
        start_time: window[0].time,
        end_time: last.time,
        start_price: (highs[0] + lows[0]) / 2.0,
        end_price: last.close,
        confidence: 0.65,
        message: "Symmetrical triangle - breakout imminent, direction unclear".to_string(),
    })
}

/// Highs and lows moving on near-parallel, non-trivial slopes.
pub fn detect_channel(window: &[Candle]) -> Option<Pattern> {
    if window.len() < 10 {
        return None;
    }

    let (times, highs, lows) = edges(window);
    let high_trend = linear_regression(&times, &highs);
    let low_trend = linear_regression(&times, &lows);

    let slope_diff = (high_trend.slope - low_trend.slope).abs();
    let parallel = slope_diff < high_trend.slope.abs() * 0.3;
    if !parallel || high_trend.slope.abs() <= 0.000001 {
        return None;
    }

    let message = if high_trend.slope > 0.0 {
        "Ascending channel - buy dips, sell at resistance"
    } else {
        "Descending channel - sell rallies, buy at support"
    };

    let n = window.len();
    Some(Pattern {
        pattern_type: PatternType::Channel,
        start_time: window[0].time,
        end_time: window[n - 1].time,
        start_price: (highs[0] + lows[0]) / 2.0,
        end_price: (highs[n - 1] + lows[n - 1]) / 2.0,
        confidence: DEFAULT_CONFIDENCE,
        message: message.to_string(),
    })
}

/// 14-period RSI below 30 or above 70. Confidence scales with the distance
/// from the threshold, capped at 0.9.
pub fn detect_rsi_extremes(window: &[Candle]) -> Option<Pattern> {
    if window.len() < RSI_PERIOD + 1 {
        return None;
    }

    let closes: Vec<f64> = window.iter().map(|c| c.close).collect();
    let value = rsi(&closes, RSI_PERIOD);
    let last = window.last()?;

    let (pattern_type, confidence, message) = if value < 30.0 {
        (
            PatternType::Oversold,
            ((30.0 - value) / 30.0 * 0.8 + 0.5).min(0.9),
            format!("RSI oversold ({value:.1}) - potential bounce incoming"),
        )
    } else if value > 70.0 {
        (
            PatternType::Overbought,
            ((value - 70.0) / 30.0 * 0.8 + 0.5).min(0.9),
            format!("RSI overbought ({value:.1}) - potential pullback likely"),
        )
    } else {
        return None;
    };

    Some(Pattern {
        pattern_type,
        start_time: last.time,
        end_time: last.time,
        start_price: last.low,
        end_price: last.high,
        confidence,
        message,
    })
}

fn edges(window: &[Candle]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let times = window.iter().map(|c| c.time as f64).collect();
    let highs = window.iter().map(|c| c.high).collect();
    let lows = window.iter().map(|c| c.low).collect();
    (times, highs, lows)
}
