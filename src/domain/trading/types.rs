use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Direction of a leveraged position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// Why a position left the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseReason {
    Market,
    Limit,
    Sl,
    Tp,
    Liquidation,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::Market => write!(f, "market"),
            CloseReason::Limit => write!(f, "limit"),
            CloseReason::Sl => write!(f, "stop loss"),
            CloseReason::Tp => write!(f, "take profit"),
            CloseReason::Liquidation => write!(f, "liquidation"),
        }
    }
}

/// A resting limit order. The book holds nothing else, so there is no order
/// type field; a fill converts the order into a market position at the
/// current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub side: PositionSide,
    pub trigger_price: Decimal,
    pub size: Decimal,
    pub leverage: u32,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub created_at: i64,
}

impl Order {
    /// Margin reserved against this order while it rests on the book.
    pub fn reserved_margin(&self) -> Decimal {
        self.size
            .checked_div(Decimal::from(self.leverage))
            .unwrap_or(Decimal::ZERO)
    }
}

/// An open leveraged position.
///
/// `margin` and `liquidation_price` are fixed at open time; the unrealized
/// PnL fields are refreshed on every ledger sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub size: Decimal,
    pub leverage: u32,
    pub margin: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub open_time: i64,
    pub unrealized_pnl: Decimal,
    pub unrealized_pnl_percent: Decimal,
    pub liquidation_price: Decimal,
}

/// A closed position, as recorded in the trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: Uuid,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub size: Decimal,
    pub leverage: u32,
    pub pnl: Decimal,
    pub pnl_percent: Decimal,
    pub open_time: i64,
    pub close_time: i64,
    pub close_reason: CloseReason,
}

/// Margin account state. Recomputed after every structural ledger mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub balance: Decimal,
    pub equity: Decimal,
    pub available_margin: Decimal,
    pub used_margin: Decimal,
}

impl Account {
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            balance: initial_balance,
            equity: initial_balance,
            available_margin: initial_balance,
            used_margin: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_account() {
        let account = Account::new(dec!(10));
        assert_eq!(account.balance, dec!(10));
        assert_eq!(account.equity, dec!(10));
        assert_eq!(account.available_margin, dec!(10));
        assert_eq!(account.used_margin, Decimal::ZERO);
    }

    #[test]
    fn test_order_reserved_margin() {
        let order = Order {
            id: Uuid::new_v4(),
            side: PositionSide::Long,
            trigger_price: dec!(95000),
            size: dec!(0.5),
            leverage: 10,
            stop_loss: None,
            take_profit: None,
            created_at: 0,
        };
        assert_eq!(order.reserved_margin(), dec!(0.05));
    }

    #[test]
    fn test_side_display() {
        assert_eq!(PositionSide::Long.to_string(), "LONG");
        assert_eq!(PositionSide::Short.to_string(), "SHORT");
    }

    #[test]
    fn test_close_reason_serde() {
        let json = serde_json::to_string(&CloseReason::Liquidation).unwrap();
        assert_eq!(json, "\"liquidation\"");
    }
}
