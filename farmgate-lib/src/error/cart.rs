//! Cart error types

use rust_decimal::Decimal;

/// Errors raised by cart mutations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CartError {
    /// The voucher's amount or percentage is out of range.
    #[error("Voucher '{code}' is invalid: {reason}")]
    InvalidVoucher { code: String, reason: String },

    /// The cart subtotal is below the voucher's minimum.
    #[error("Voucher '{code}' requires a subtotal of at least {minimum}")]
    BelowMinimum { code: String, minimum: Decimal },

    /// A line was added with a negative or out-of-range unit price.
    #[error("Invalid price for product '{product_id}'")]
    InvalidPrice { product_id: String },
}
