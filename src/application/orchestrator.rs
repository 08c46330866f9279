use crate::application::analysis::indicators;
use crate::application::analysis::scanner::PatternScanner;
use crate::application::market_data::engine::MarketEngine;
use crate::application::trading::ledger::Ledger;
use crate::domain::errors::OrderRejection;
use crate::domain::market::candle::Candle;
use crate::domain::market::pattern::Pattern;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::trading::types::{
    Account, CloseReason, Order, Position, PositionSide, TradeRecord,
};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

/// Broad direction of the recent market, derived from the last 20 closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

/// Consolidated read-only view published after every tick. Everything in
/// here is a copy; consumers cannot reach back into component state.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub time_ms: i64,
    pub price: f64,
    pub initial_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub trend: Trend,
    pub shock_active: bool,
    pub volatility: f64,
    pub candles: Vec<Candle>,
    /// EMA overlays over the snapshot candles' closes.
    pub ema9: Vec<f64>,
    pub ema21: Vec<f64>,
    pub ema50: Vec<f64>,
    /// Headline 14-period RSI over the snapshot candles.
    pub rsi: f64,
    pub account: Account,
    pub positions: Vec<Position>,
    pub orders: Vec<Order>,
    pub history: Vec<TradeRecord>,
    pub patterns: Vec<Pattern>,
}

/// Owns the three core components and drives them in a fixed order each
/// tick: price step, then ledger sweep, then pattern scan, then snapshot.
/// Nothing calls back into an earlier stage within a tick.
pub struct Orchestrator {
    engine: MarketEngine,
    ledger: Ledger,
    scanner: PatternScanner,
    chart_timeframe: Timeframe,
    last_tick_ms: i64,
    tick_count: u64,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl Orchestrator {
    pub fn new(
        engine: MarketEngine,
        ledger: Ledger,
        scanner: PatternScanner,
        chart_timeframe: Timeframe,
        now_ms: i64,
    ) -> Self {
        let candles = engine.candles(chart_timeframe);
        let price = engine.current_price();

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let initial = Snapshot {
            tick: 0,
            time_ms: now_ms,
            price,
            initial_price: engine.initial_price(),
            price_change: 0.0,
            price_change_percent: 0.0,
            trend: trend_of(&candles),
            shock_active: engine.is_shock_active(),
            volatility: engine.volatility(),
            ema9: indicators::ema(&closes, 9),
            ema21: indicators::ema(&closes, 21),
            ema50: indicators::ema(&closes, 50),
            rsi: indicators::rsi(&closes, 14),
            candles,
            account: ledger.account(),
            positions: Vec::new(),
            orders: Vec::new(),
            history: Vec::new(),
            patterns: Vec::new(),
        };
        let (snapshot_tx, _) = watch::channel(initial);

        Self {
            engine,
            ledger,
            scanner,
            chart_timeframe,
            last_tick_ms: now_ms,
            tick_count: 0,
            snapshot_tx,
        }
    }

    /// Watch a live feed of snapshots, one per tick.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    /// One complete simulation step. Synchronous, bounded, and resilient:
    /// a price the ledger cannot represent skips the ledger sweep for that
    /// tick instead of aborting the loop.
    pub fn step(&mut self, now_ms: i64) -> Snapshot {
        let dt = (now_ms - self.last_tick_ms).max(0) as f64 / 1_000.0;
        self.last_tick_ms = now_ms;
        self.tick_count += 1;

        let price = self.engine.tick(now_ms, dt);

        match Decimal::from_f64(price) {
            Some(tick_price) if tick_price > Decimal::ZERO => {
                let filled = self.ledger.check_limit_orders(tick_price, now_ms);
                for position in &filled {
                    info!(id = %position.id, entry = %position.entry_price, "limit order filled");
                }

                let sweep = self.ledger.update_positions(tick_price, now_ms);
                for position in &sweep.liquidated {
                    warn!(
                        id = %position.id,
                        side = %position.side,
                        "position liquidated"
                    );
                }
            }
            _ => {
                warn!(price, "tick price not representable, ledger sweep skipped");
            }
        }

        let candles = self.engine.candles(self.chart_timeframe);
        let patterns = self.scanner.detect(&candles, now_ms);
        let snapshot = self.compose_snapshot(now_ms, price, candles, patterns);
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }

    /// Runs the fixed-rate tick loop until the shutdown flag flips. Shutdown
    /// stops scheduling further ticks; the in-flight tick always completes.
    pub async fn run(&mut self, tick_interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(interval_ms = tick_interval.as_millis() as u64, "orchestrator: tick loop started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    self.step(Utc::now().timestamp_millis());
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!(ticks = self.tick_count, "orchestrator: tick loop stopped");
    }

    // ----- trading commands, executed at the current tick price -----

    pub fn open_position(
        &mut self,
        side: PositionSide,
        size: Decimal,
        leverage: u32,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
        now_ms: i64,
    ) -> Result<Position, OrderRejection> {
        let price = self.current_tick_price()?;
        self.ledger
            .open_market_position(side, size, leverage, price, stop_loss, take_profit, now_ms)
    }

    pub fn close_position(&mut self, position_id: Uuid, now_ms: i64) -> Option<TradeRecord> {
        let price = self.current_tick_price().ok()?;
        self.ledger
            .close_position(position_id, price, CloseReason::Market, now_ms)
    }

    pub fn place_limit_order(
        &mut self,
        side: PositionSide,
        trigger_price: Decimal,
        size: Decimal,
        leverage: u32,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
        now_ms: i64,
    ) -> Result<Order, OrderRejection> {
        self.ledger
            .place_limit_order(side, trigger_price, size, leverage, stop_loss, take_profit, now_ms)
    }

    pub fn cancel_order(&mut self, order_id: Uuid) -> bool {
        self.ledger.cancel_order(order_id)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn engine(&self) -> &MarketEngine {
        &self.engine
    }

    fn current_tick_price(&self) -> Result<Decimal, OrderRejection> {
        let price = self.engine.current_price();
        match Decimal::from_f64(price) {
            Some(decimal) if decimal > Decimal::ZERO => Ok(decimal),
            _ => Err(OrderRejection::UnrepresentablePrice(price)),
        }
    }

    fn compose_snapshot(
        &self,
        now_ms: i64,
        price: f64,
        candles: Vec<Candle>,
        patterns: Vec<Pattern>,
    ) -> Snapshot {
        let initial_price = self.engine.initial_price();
        let price_change = price - initial_price;
        let price_change_percent = if initial_price > 0.0 {
            price_change / initial_price * 100.0
        } else {
            0.0
        };

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        Snapshot {
            tick: self.tick_count,
            time_ms: now_ms,
            price,
            initial_price,
            price_change,
            price_change_percent,
            trend: trend_of(&candles),
            shock_active: self.engine.is_shock_active(),
            volatility: self.engine.volatility(),
            ema9: indicators::ema(&closes, 9),
            ema21: indicators::ema(&closes, 21),
            ema50: indicators::ema(&closes, 50),
            rsi: indicators::rsi(&closes, 14),
            candles,
            account: self.ledger.account(),
            positions: self.ledger.positions(),
            orders: self.ledger.orders(),
            history: self.ledger.history(),
            patterns,
        }
    }
}

/// Bullish/bearish when the last 20 closes moved more than ±0.5%.
fn trend_of(candles: &[Candle]) -> Trend {
    if candles.len() < 20 {
        return Trend::Neutral;
    }
    let recent = &candles[candles.len() - 20..];
    let first = recent[0].close;
    let last = recent[recent.len() - 1].close;
    if first <= 0.0 {
        return Trend::Neutral;
    }
    let change = (last - first) / first * 100.0;
    if change > 0.5 {
        Trend::Bullish
    } else if change < -0.5 {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}
