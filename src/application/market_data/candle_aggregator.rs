use crate::application::market_data::price_process::PRICE_FLOOR;
use crate::domain::market::candle::Candle;
use crate::domain::market::timeframe::Timeframe;
use rand::Rng;
use std::collections::VecDeque;

/// Sealed candles kept per timeframe; the oldest is evicted beyond this.
pub const HISTORY_CAP: usize = 500;

/// Synthetic candles generated per timeframe at construction.
const BOOTSTRAP_CANDLES: usize = 200;

#[derive(Debug)]
struct TimeframeSeries {
    timeframe: Timeframe,
    history: VecDeque<Candle>,
    open_candle: Candle,
}

/// Buckets the tick-level price stream into OHLCV candles, one series per
/// timeframe, each holding a single live candle plus a bounded history.
///
/// Continuity is a hard invariant: every candle (bootstrapped or sealed)
/// opens exactly where its predecessor closed.
#[derive(Debug)]
pub struct CandleAggregator {
    series: Vec<TimeframeSeries>,
}

impl CandleAggregator {
    /// Builds all timeframe series, synthesizing history backward from the
    /// seed price so charts are populated from the first frame.
    pub fn new<R: Rng>(seed_price: f64, now_ms: i64, base_volatility: f64, rng: &mut R) -> Self {
        let series = Timeframe::all()
            .into_iter()
            .map(|timeframe| {
                let history = bootstrap_history(timeframe, seed_price, now_ms, base_volatility, rng);
                let open_price = history
                    .back()
                    .map(|c| c.close)
                    .unwrap_or(seed_price);

                // The live candle starts where the synthesized history ended
                let open_candle = Candle {
                    time: timeframe.bucket_start(now_ms),
                    open: open_price,
                    high: open_price.max(seed_price),
                    low: open_price.min(seed_price),
                    close: seed_price,
                    volume: rng.random::<f64>() * 2.0,
                };

                TimeframeSeries {
                    timeframe,
                    history,
                    open_candle,
                }
            })
            .collect();

        Self { series }
    }

    /// Folds one tick into every timeframe series, sealing candles whose
    /// bucket has rolled over.
    pub fn on_tick<R: Rng>(&mut self, price: f64, now_ms: i64, rng: &mut R) {
        for series in &mut self.series {
            let bucket = series.timeframe.bucket_start(now_ms);

            if bucket != series.open_candle.time {
                let sealed = series.open_candle.clone();
                series.history.push_back(sealed);
                if series.history.len() > HISTORY_CAP {
                    series.history.pop_front();
                }

                // New candle opens at the sealed close, never at the tick
                // price, so consecutive candles have no gap
                let open_price = series
                    .history
                    .back()
                    .map(|c| c.close)
                    .unwrap_or(price);
                series.open_candle = Candle {
                    time: bucket,
                    open: open_price,
                    high: open_price.max(price),
                    low: open_price.min(price),
                    close: price,
                    volume: (price - open_price).abs() * (0.5 + rng.random::<f64>() * 1.5),
                };
            } else {
                let previous_close = series.open_candle.close;
                series.open_candle.high = series.open_candle.high.max(price);
                series.open_candle.low = series.open_candle.low.min(price);
                series.open_candle.close = price;
                // Volume proxy grows with the magnitude of the move
                series.open_candle.volume +=
                    (price - previous_close).abs() * (0.01 + rng.random::<f64>() * 0.05);
            }
        }
    }

    /// Sealed history plus the live candle, oldest first.
    pub fn candles(&self, timeframe: Timeframe) -> Vec<Candle> {
        self.series
            .iter()
            .find(|s| s.timeframe == timeframe)
            .map(|s| {
                let mut out: Vec<Candle> = s.history.iter().cloned().collect();
                out.push(s.open_candle.clone());
                out
            })
            .unwrap_or_default()
    }
}

/// Synthesizes `BOOTSTRAP_CANDLES` candles walking backward from the seed
/// price with a simplified drift/volatility/fat-tail model, then reverses
/// them into ascending time. The latest candle closes exactly at the seed.
fn bootstrap_history<R: Rng>(
    timeframe: Timeframe,
    seed_price: f64,
    now_ms: i64,
    base_volatility: f64,
    rng: &mut R,
) -> VecDeque<Candle> {
    let interval = timeframe.interval_ms();
    let mut candles = Vec::with_capacity(BOOTSTRAP_CANDLES);

    let mut price = seed_price;
    let mut local_trend = 0.0_f64;
    let mut local_vol = base_volatility;

    for i in 0..BOOTSTRAP_CANDLES {
        let time = now_ms - (i as i64 + 1) * interval;

        // Trend occasionally re-seeds, otherwise decays
        if rng.random::<f64>() < 0.1 {
            local_trend = (rng.random::<f64>() - 0.5) * 0.002;
        }
        local_trend *= 0.95;

        local_vol = local_vol * 0.98 + (0.0002 + rng.random::<f64>() * 0.0003) * 0.02;

        let base_change = (rng.random::<f64>() - 0.5 + local_trend) * local_vol
            * (5.0 + rng.random::<f64>() * 5.0);

        // Occasional larger moves give the history fat tails
        let large_move = if rng.random::<f64>() < 0.05 {
            (rng.random::<f64>() - 0.5) * local_vol * 20.0
        } else {
            0.0
        };

        let close = price;
        let open = (price * (1.0 - base_change - large_move)).max(PRICE_FLOOR);

        let wick_range = (open - close).abs() * (1.0 + rng.random::<f64>() * 2.0);
        let wick_bias = rng.random::<f64>() - 0.5;
        let high = open.max(close) + wick_range * wick_bias.max(0.0) * rng.random::<f64>();
        let low = (open.min(close) - wick_range * (-wick_bias).max(0.0) * rng.random::<f64>())
            .max(PRICE_FLOOR);

        let volume_base = 2.0 + rng.random::<f64>() * 8.0;
        let volume_spike = if (base_change + large_move).abs() > 0.001 {
            1.0 + rng.random::<f64>() * 5.0
        } else {
            1.0
        };

        candles.push(Candle {
            time,
            open,
            high,
            low,
            close,
            volume: volume_base * volume_spike,
        });

        // Walking backward: this candle's open is the previous candle's close
        price = open;
    }

    candles.reverse();
    candles.into()
}
