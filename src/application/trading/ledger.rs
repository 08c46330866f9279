use crate::domain::errors::OrderRejection;
use crate::domain::trading::types::{
    Account, CloseReason, Order, Position, PositionSide, TradeRecord,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use tracing::{info, warn};
use uuid::Uuid;

pub const MAX_LEVERAGE: u32 = 100;

/// Closed trades kept in history, newest first.
const HISTORY_CAP: usize = 100;

/// Fraction of margin an adverse move may consume before forced close.
/// The remaining 0.5% is the liquidation buffer.
const LIQUIDATION_THRESHOLD: Decimal = dec!(0.995);

/// Result of one `update_positions` sweep.
#[derive(Debug, Default)]
pub struct PositionSweep {
    pub closed: Vec<TradeRecord>,
    pub liquidated: Vec<Position>,
}

/// Order and position bookkeeping for a single margin account.
///
/// The ledger exclusively owns its positions, orders, history and account;
/// callers only see clones. Account aggregates are recomputed after every
/// structural mutation, never left stale.
pub struct Ledger {
    account: Account,
    positions: Vec<Position>,
    orders: Vec<Order>,
    history: VecDeque<TradeRecord>,
}

impl Ledger {
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            account: Account::new(initial_balance),
            positions: Vec::new(),
            orders: Vec::new(),
            history: VecDeque::new(),
        }
    }

    pub fn account(&self) -> Account {
        self.account.clone()
    }

    pub fn positions(&self) -> Vec<Position> {
        self.positions.clone()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders.clone()
    }

    /// Closed trades, newest first.
    pub fn history(&self) -> Vec<TradeRecord> {
        self.history.iter().cloned().collect()
    }

    /// Opens a market position at `current_price`. Margin equals
    /// `size / leverage` in base-account units.
    pub fn open_market_position(
        &mut self,
        side: PositionSide,
        size: Decimal,
        leverage: u32,
        current_price: Decimal,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
        now_ms: i64,
    ) -> Result<Position, OrderRejection> {
        validate_request(size, leverage, current_price)?;

        let margin = size / Decimal::from(leverage);
        if margin > self.account.available_margin {
            return Err(OrderRejection::InsufficientMargin {
                required: margin,
                available: self.account.available_margin,
            });
        }

        let position = Position {
            id: Uuid::new_v4(),
            side,
            entry_price: current_price,
            size,
            leverage,
            margin,
            stop_loss,
            take_profit,
            open_time: now_ms,
            unrealized_pnl: Decimal::ZERO,
            unrealized_pnl_percent: Decimal::ZERO,
            liquidation_price: liquidation_price(side, current_price, leverage, stop_loss),
        };

        info!(
            id = %position.id,
            side = %side,
            %size,
            leverage,
            entry = %current_price,
            liquidation = %position.liquidation_price,
            "Ledger: position opened"
        );

        self.positions.push(position.clone());
        self.recompute_account();

        Ok(position)
    }

    /// Places a resting limit order, reserving its margin until it fills or
    /// is cancelled.
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
        validate_request(size, leverage, trigger_price)?;

        let margin = size / Decimal::from(leverage);
        if margin > self.account.available_margin {
            return Err(OrderRejection::InsufficientMargin {
                required: margin,
                available: self.account.available_margin,
            });
        }

        let order = Order {
            id: Uuid::new_v4(),
            side,
            trigger_price,
            size,
            leverage,
            stop_loss,
            take_profit,
            created_at: now_ms,
        };

        info!(
            id = %order.id,
            side = %side,
            trigger = %trigger_price,
            %size,
            leverage,
            "Ledger: limit order placed"
        );

        self.orders.push(order.clone());
        self.recompute_account();

        Ok(order)
    }

    /// Removes a resting order and releases its reservation. Returns false if
    /// no such order exists.
    pub fn cancel_order(&mut self, order_id: Uuid) -> bool {
        let Some(index) = self.orders.iter().position(|o| o.id == order_id) else {
            return false;
        };

        let order = self.orders.remove(index);
        self.recompute_account();
        info!(id = %order.id, "Ledger: limit order cancelled");
        true
    }

    /// Fills every order whose trigger the price has crossed in its favor,
    /// converting it into a market position at `current_price`. Triggered
    /// orders leave the book whether or not the conversion succeeds.
    pub fn check_limit_orders(&mut self, current_price: Decimal, now_ms: i64) -> Vec<Position> {
        let (triggered, resting): (Vec<Order>, Vec<Order>) = std::mem::take(&mut self.orders)
            .into_iter()
            .partition(|order| match order.side {
                PositionSide::Long => current_price <= order.trigger_price,
                PositionSide::Short => current_price >= order.trigger_price,
            });

        if triggered.is_empty() {
            self.orders = resting;
            return Vec::new();
        }

        // Restore the book first so resting reservations still count against
        // the margin available to the fills
        self.orders = resting;
        self.recompute_account();

        let mut filled = Vec::new();
        for order in triggered {
            match self.open_market_position(
                order.side,
                order.size,
                order.leverage,
                current_price,
                order.stop_loss,
                order.take_profit,
                now_ms,
            ) {
                Ok(position) => {
                    info!(order = %order.id, position = %position.id, "Ledger: limit order filled");
                    filled.push(position);
                }
                Err(rejection) => {
                    warn!(order = %order.id, %rejection, "Ledger: triggered order dropped");
                }
            }
        }

        filled
    }

    /// Closes one position at `current_price`, realizing its PnL into the
    /// balance. Returns the trade record, or None for an unknown id.
    pub fn close_position(
        &mut self,
        position_id: Uuid,
        current_price: Decimal,
        reason: CloseReason,
        now_ms: i64,
    ) -> Option<TradeRecord> {
        let index = self.positions.iter().position(|p| p.id == position_id)?;
        let position = self.positions.remove(index);

        let pnl = calculate_pnl(&position, current_price);
        let pnl_percent = pnl_percent(pnl, position.margin);

        let trade = TradeRecord {
            id: position.id,
            side: position.side,
            entry_price: position.entry_price,
            exit_price: current_price,
            size: position.size,
            leverage: position.leverage,
            pnl,
            pnl_percent,
            open_time: position.open_time,
            close_time: now_ms,
            close_reason: reason,
        };

        info!(
            id = %trade.id,
            exit = %current_price,
            %pnl,
            reason = %reason,
            "Ledger: position closed"
        );

        self.account.balance += pnl;
        self.history.push_front(trade.clone());
        self.history.truncate(HISTORY_CAP);
        self.recompute_account();

        Some(trade)
    }

    /// Per-tick sweep over open positions: refreshes unrealized PnL, then
    /// applies at most one closing event per position in strict priority
    /// liquidation > stop-loss > take-profit, each closing at its trigger
    /// price rather than the tick price.
    pub fn update_positions(&mut self, current_price: Decimal, now_ms: i64) -> PositionSweep {
        let mut pending: Vec<(Uuid, Decimal, CloseReason)> = Vec::new();

        for position in &mut self.positions {
            let pnl = calculate_pnl(position, current_price);
            position.unrealized_pnl = pnl;
            position.unrealized_pnl_percent = pnl_percent(pnl, position.margin);

            let liquidated = match position.side {
                PositionSide::Long => current_price <= position.liquidation_price,
                PositionSide::Short => current_price >= position.liquidation_price,
            };
            if liquidated {
                pending.push((position.id, position.liquidation_price, CloseReason::Liquidation));
                continue;
            }

            if let Some(stop) = position.stop_loss {
                let hit = match position.side {
                    PositionSide::Long => current_price <= stop,
                    PositionSide::Short => current_price >= stop,
                };
                if hit {
                    pending.push((position.id, stop, CloseReason::Sl));
                    continue;
                }
            }

            if let Some(target) = position.take_profit {
                let hit = match position.side {
                    PositionSide::Long => current_price >= target,
                    PositionSide::Short => current_price <= target,
                };
                if hit {
                    pending.push((position.id, target, CloseReason::Tp));
                }
            }
        }

        let mut sweep = PositionSweep::default();
        for (id, exit_price, reason) in pending {
            if reason == CloseReason::Liquidation
                && let Some(position) = self.positions.iter().find(|p| p.id == id)
            {
                warn!(
                    %id,
                    liquidation = %exit_price,
                    "Ledger: position hit its liquidation price"
                );
                sweep.liquidated.push(position.clone());
            }
            if let Some(trade) = self.close_position(id, exit_price, reason, now_ms) {
                sweep.closed.push(trade);
            }
        }

        self.recompute_account();
        sweep
    }

    /// Recomputes the account aggregates. Pending limit orders keep their
    /// margin reserved, so
    /// `available = equity - used - reserved`.
    fn recompute_account(&mut self) {
        let mut unrealized = Decimal::ZERO;
        let mut used_margin = Decimal::ZERO;
        for position in &self.positions {
            unrealized += position.unrealized_pnl;
            used_margin += position.margin;
        }

        let reserved: Decimal = self.orders.iter().map(Order::reserved_margin).sum();

        self.account.used_margin = used_margin;
        self.account.equity = self.account.balance + unrealized;
        self.account.available_margin = self.account.equity - used_margin - reserved;
    }
}

fn validate_request(
    size: Decimal,
    leverage: u32,
    price: Decimal,
) -> Result<(), OrderRejection> {
    if size <= Decimal::ZERO {
        return Err(OrderRejection::InvalidSize(size));
    }
    if leverage < 1 || leverage > MAX_LEVERAGE {
        return Err(OrderRejection::InvalidLeverage(leverage));
    }
    if price <= Decimal::ZERO {
        return Err(OrderRejection::InvalidPrice(price));
    }
    Ok(())
}

/// Liquidation price fixed at open time: the adverse price at which the move
/// consumes `LIQUIDATION_THRESHOLD` of margin. A stop-loss inside that level
/// becomes the effective liquidation price, so the forced-close level is
/// always the first one the market can reach.
fn liquidation_price(
    side: PositionSide,
    entry: Decimal,
    leverage: u32,
    stop_loss: Option<Decimal>,
) -> Decimal {
    let buffer = LIQUIDATION_THRESHOLD / Decimal::from(leverage);
    match side {
        PositionSide::Long => {
            let mut liquidation = entry * (Decimal::ONE - buffer);
            if let Some(stop) = stop_loss
                && stop > liquidation
            {
                liquidation = stop;
            }
            liquidation
        }
        PositionSide::Short => {
            let mut liquidation = entry * (Decimal::ONE + buffer);
            if let Some(stop) = stop_loss
                && stop < liquidation
            {
                liquidation = stop;
            }
            liquidation
        }
    }
}

/// Leveraged PnL in base-account units:
/// `(favorable price diff) * size * leverage / current_price`.
/// An unrepresentable result clamps to zero; that is a data anomaly, not a
/// valid trading outcome.
fn calculate_pnl(position: &Position, current_price: Decimal) -> Decimal {
    if current_price <= Decimal::ZERO || position.entry_price <= Decimal::ZERO {
        warn!(
            id = %position.id,
            price = %current_price,
            "Ledger: non-positive price in PnL calculation, clamping to zero"
        );
        return Decimal::ZERO;
    }

    let price_diff = match position.side {
        PositionSide::Long => current_price - position.entry_price,
        PositionSide::Short => position.entry_price - current_price,
    };

    price_diff
        .checked_mul(position.size)
        .and_then(|v| v.checked_mul(Decimal::from(position.leverage)))
        .and_then(|v| v.checked_div(current_price))
        .unwrap_or_else(|| {
            warn!(id = %position.id, "Ledger: PnL overflowed, clamping to zero");
            Decimal::ZERO
        })
}

fn pnl_percent(pnl: Decimal, margin: Decimal) -> Decimal {
    pnl.checked_div(margin)
        .map(|v| v * dec!(100))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_704_067_200_000;

    fn ledger() -> Ledger {
        Ledger::new(dec!(10))
    }

    fn assert_account_invariant(ledger: &Ledger) {
        let account = ledger.account();
        let unrealized: Decimal = ledger.positions().iter().map(|p| p.unrealized_pnl).sum();
        let reserved: Decimal = ledger.orders().iter().map(Order::reserved_margin).sum();
        assert_eq!(account.equity, account.balance + unrealized);
        assert_eq!(
            account.available_margin,
            account.equity - account.used_margin - reserved
        );
    }

    #[test]
    fn test_open_market_position_reserves_margin() {
        let mut ledger = ledger();
        let position = ledger
            .open_market_position(
                PositionSide::Long,
                dec!(0.1),
                20,
                dec!(100000),
                None,
                None,
                NOW,
            )
            .unwrap();

        assert_eq!(position.margin, dec!(0.005));
        let account = ledger.account();
        assert_eq!(account.used_margin, dec!(0.005));
        assert_eq!(account.available_margin, dec!(9.995));
        assert_account_invariant(&ledger);
    }

    #[test]
    fn test_open_rejects_invalid_parameters() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.open_market_position(
                PositionSide::Long,
                dec!(0),
                10,
                dec!(100000),
                None,
                None,
                NOW
            ),
            Err(OrderRejection::InvalidSize(_))
        ));
        assert!(matches!(
            ledger.open_market_position(
                PositionSide::Long,
                dec!(1),
                0,
                dec!(100000),
                None,
                None,
                NOW
            ),
            Err(OrderRejection::InvalidLeverage(0))
        ));
        assert!(matches!(
            ledger.open_market_position(
                PositionSide::Long,
                dec!(1),
                101,
                dec!(100000),
                None,
                None,
                NOW
            ),
            Err(OrderRejection::InvalidLeverage(101))
        ));
        assert!(matches!(
            ledger.open_market_position(PositionSide::Long, dec!(1), 10, dec!(0), None, None, NOW),
            Err(OrderRejection::InvalidPrice(_))
        ));

        // No state leaked from the rejections
        assert!(ledger.positions().is_empty());
        assert_eq!(ledger.account(), Account::new(dec!(10)));
    }

    #[test]
    fn test_open_rejects_insufficient_margin() {
        let mut ledger = ledger();
        // size 1000 at 1x needs 1000 margin against a 10 balance
        let result = ledger.open_market_position(
            PositionSide::Long,
            dec!(1000),
            1,
            dec!(100000),
            None,
            None,
            NOW,
        );
        assert!(matches!(
            result,
            Err(OrderRejection::InsufficientMargin { .. })
        ));
        assert!(ledger.positions().is_empty());
    }

    #[test]
    fn test_unrealized_pnl_long() {
        let mut ledger = ledger();
        ledger
            .open_market_position(
                PositionSide::Long,
                dec!(0.1),
                20,
                dec!(100000),
                None,
                None,
                NOW,
            )
            .unwrap();

        ledger.update_positions(dec!(102000), NOW + 1_000);

        let position = &ledger.positions()[0];
        // ((102000 - 100000) * 0.1 * 20) / 102000
        let expected = (dec!(2000) * dec!(0.1) * dec!(20)) / dec!(102000);
        assert_eq!(position.unrealized_pnl, expected);
        assert!(position.unrealized_pnl > dec!(0.0392));
        assert!(position.unrealized_pnl < dec!(0.0393));
        assert_account_invariant(&ledger);
    }

    #[test]
    fn test_short_liquidation_price_and_forced_close() {
        let mut ledger = ledger();
        let position = ledger
            .open_market_position(
                PositionSide::Short,
                dec!(0.1),
                10,
                dec!(50000),
                None,
                None,
                NOW,
            )
            .unwrap();

        // 50000 * (1 + 0.995 / 10)
        assert_eq!(position.liquidation_price, dec!(54975));

        let sweep = ledger.update_positions(dec!(54975), NOW + 1_000);
        assert_eq!(sweep.liquidated.len(), 1);
        assert_eq!(sweep.closed.len(), 1);
        let trade = &sweep.closed[0];
        assert_eq!(trade.close_reason, CloseReason::Liquidation);
        assert_eq!(trade.exit_price, dec!(54975));
        assert!(ledger.positions().is_empty());
        assert_account_invariant(&ledger);
    }

    #[test]
    fn test_loose_stop_does_not_widen_liquidation() {
        let mut ledger = ledger();
        // Long at 100000, 10x: computed liquidation 90050. A stop at 80000 is
        // below it, so the liquidation level stays at 90050.
        let position = ledger
            .open_market_position(
                PositionSide::Long,
                dec!(0.1),
                10,
                dec!(100000),
                Some(dec!(80000)),
                None,
                NOW,
            )
            .unwrap();
        assert_eq!(position.liquidation_price, dec!(90050));

        let sweep = ledger.update_positions(dec!(90050), NOW + 1_000);
        assert_eq!(sweep.closed.len(), 1);
        assert_eq!(sweep.closed[0].close_reason, CloseReason::Liquidation);
        assert_eq!(sweep.closed[0].exit_price, dec!(90050));
    }

    #[test]
    fn test_tight_stop_becomes_liquidation_level() {
        let mut ledger = ledger();
        // Stop at 95000 sits above the computed 90050, so the forced-close
        // level tightens to the stop.
        let position = ledger
            .open_market_position(
                PositionSide::Long,
                dec!(0.1),
                10,
                dec!(100000),
                Some(dec!(95000)),
                None,
                NOW,
            )
            .unwrap();
        assert_eq!(position.liquidation_price, dec!(95000));
    }

    #[test]
    fn test_stop_loss_and_take_profit_close_at_trigger() {
        let mut ledger = ledger();
        ledger
            .open_market_position(
                PositionSide::Long,
                dec!(0.1),
                2,
                dec!(100000),
                Some(dec!(98000)),
                None,
                NOW,
            )
            .unwrap();
        ledger
            .open_market_position(
                PositionSide::Long,
                dec!(0.1),
                2,
                dec!(100000),
                None,
                Some(dec!(101000)),
                NOW,
            )
            .unwrap();

        // Price gaps below the first position's stop: closes at the stop
        // price, not the tick price
        let sweep = ledger.update_positions(dec!(97500), NOW + 1_000);
        assert_eq!(sweep.closed.len(), 1);
        assert_eq!(sweep.closed[0].close_reason, CloseReason::Sl);
        assert_eq!(sweep.closed[0].exit_price, dec!(98000));
        assert!(sweep.liquidated.is_empty());

        let sweep = ledger.update_positions(dec!(101500), NOW + 2_000);
        assert_eq!(sweep.closed.len(), 1);
        assert_eq!(sweep.closed[0].close_reason, CloseReason::Tp);
        assert_eq!(sweep.closed[0].exit_price, dec!(101000));
        assert!(ledger.positions().is_empty());
        assert_account_invariant(&ledger);
    }

    #[test]
    fn test_limit_order_margin_round_trip() {
        let mut ledger = ledger();
        let before = ledger.account().available_margin;

        let order = ledger
            .place_limit_order(
                PositionSide::Long,
                dec!(95000),
                dec!(0.5),
                10,
                None,
                None,
                NOW,
            )
            .unwrap();

        assert_eq!(
            ledger.account().available_margin,
            before - order.reserved_margin()
        );
        assert_account_invariant(&ledger);

        assert!(ledger.cancel_order(order.id));
        assert_eq!(ledger.account().available_margin, before);
        assert!(!ledger.cancel_order(order.id));
        assert_account_invariant(&ledger);
    }

    #[test]
    fn test_reservation_survives_other_mutations() {
        let mut ledger = ledger();
        let order = ledger
            .place_limit_order(
                PositionSide::Long,
                dec!(95000),
                dec!(0.5),
                10,
                None,
                None,
                NOW,
            )
            .unwrap();

        // An unrelated open/close cycle must not wipe the reservation
        let position = ledger
            .open_market_position(
                PositionSide::Short,
                dec!(0.2),
                10,
                dec!(100000),
                None,
                None,
                NOW,
            )
            .unwrap();
        ledger.close_position(position.id, dec!(100000), CloseReason::Market, NOW + 500);

        assert_eq!(
            ledger.account().available_margin,
            dec!(10) - order.reserved_margin()
        );
        assert_account_invariant(&ledger);
    }

    #[test]
    fn test_limit_order_fill_converts_to_position() {
        let mut ledger = ledger();
        let order = ledger
            .place_limit_order(
                PositionSide::Long,
                dec!(95000),
                dec!(0.5),
                10,
                Some(dec!(92000)),
                Some(dec!(99000)),
                NOW,
            )
            .unwrap();

        // Above the trigger: nothing fills
        assert!(ledger.check_limit_orders(dec!(96000), NOW + 100).is_empty());
        assert_eq!(ledger.orders().len(), 1);

        // At/below the trigger: fills at the current price
        let filled = ledger.check_limit_orders(dec!(94800), NOW + 200);
        assert_eq!(filled.len(), 1);
        let position = &filled[0];
        assert_eq!(position.entry_price, dec!(94800));
        assert_eq!(position.size, order.size);
        assert_eq!(position.stop_loss, Some(dec!(92000)));
        assert_eq!(position.take_profit, Some(dec!(99000)));

        assert!(ledger.orders().is_empty());
        // Reservation handed off to used margin
        assert_eq!(ledger.account().used_margin, dec!(0.05));
        assert_account_invariant(&ledger);
    }

    #[test]
    fn test_short_limit_order_fills_on_rise() {
        let mut ledger = ledger();
        ledger
            .place_limit_order(
                PositionSide::Short,
                dec!(105000),
                dec!(0.1),
                5,
                None,
                None,
                NOW,
            )
            .unwrap();

        assert!(ledger.check_limit_orders(dec!(104000), NOW + 100).is_empty());
        let filled = ledger.check_limit_orders(dec!(105200), NOW + 200);
        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0].side, PositionSide::Short);
    }

    #[test]
    fn test_close_realizes_pnl_into_balance() {
        let mut ledger = ledger();
        let position = ledger
            .open_market_position(
                PositionSide::Long,
                dec!(0.1),
                20,
                dec!(100000),
                None,
                None,
                NOW,
            )
            .unwrap();

        let trade = ledger
            .close_position(position.id, dec!(102000), CloseReason::Market, NOW + 1_000)
            .unwrap();

        let expected_pnl = (dec!(2000) * dec!(0.1) * dec!(20)) / dec!(102000);
        assert_eq!(trade.pnl, expected_pnl);
        assert_eq!(ledger.account().balance, dec!(10) + expected_pnl);
        assert!(ledger.positions().is_empty());
        assert_eq!(ledger.history().len(), 1);
        assert_account_invariant(&ledger);

        // Closing again is a no-op
        assert!(
            ledger
                .close_position(position.id, dec!(102000), CloseReason::Market, NOW + 2_000)
                .is_none()
        );
    }

    #[test]
    fn test_history_capped_newest_first() {
        let mut ledger = Ledger::new(dec!(1000));
        for i in 0..105_i64 {
            let position = ledger
                .open_market_position(
                    PositionSide::Long,
                    dec!(0.1),
                    10,
                    dec!(100000),
                    None,
                    None,
                    NOW + i,
                )
                .unwrap();
            ledger.close_position(position.id, dec!(100000), CloseReason::Market, NOW + i);
        }

        let history = ledger.history();
        assert_eq!(history.len(), 100);
        // Newest first: the most recent close time leads
        assert_eq!(history[0].close_time, NOW + 104);
        assert_eq!(history[99].close_time, NOW + 5);
    }

    #[test]
    fn test_pnl_clamps_on_bad_price() {
        let position = Position {
            id: Uuid::new_v4(),
            side: PositionSide::Long,
            entry_price: dec!(100000),
            size: dec!(0.1),
            leverage: 10,
            margin: dec!(0.01),
            stop_loss: None,
            take_profit: None,
            open_time: NOW,
            unrealized_pnl: Decimal::ZERO,
            unrealized_pnl_percent: Decimal::ZERO,
            liquidation_price: dec!(90050),
        };
        assert_eq!(calculate_pnl(&position, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(calculate_pnl(&position, dec!(-5)), Decimal::ZERO);
    }

    #[test]
    fn test_getters_return_snapshots() {
        let mut ledger = ledger();
        ledger
            .open_market_position(
                PositionSide::Long,
                dec!(0.1),
                10,
                dec!(100000),
                None,
                None,
                NOW,
            )
            .unwrap();

        let mut snapshot = ledger.positions();
        snapshot[0].size = dec!(999);
        // Internal state untouched by mutating the snapshot
        assert_eq!(ledger.positions()[0].size, dec!(0.1));
    }
}
