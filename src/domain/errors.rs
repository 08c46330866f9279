use rust_decimal::Decimal;
use thiserror::Error;

/// Why an order or position request was rejected.
///
/// Rejections never mutate ledger state; the caller decides how to surface
/// them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderRejection {
    #[error("Invalid size: {0} (must be > 0)")]
    InvalidSize(Decimal),

    #[error("Invalid leverage: {0}x (must be within 1-100x)")]
    InvalidLeverage(u32),

    #[error("Invalid price: {0} (must be > 0)")]
    InvalidPrice(Decimal),

    #[error("Insufficient margin: need {required}, available {available}")]
    InsufficientMargin {
        required: Decimal,
        available: Decimal,
    },

    #[error("Price {0} is not representable as a decimal")]
    UnrepresentablePrice(f64),
}
