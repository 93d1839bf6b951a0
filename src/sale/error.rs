//! Sale errors

use thiserror::Error;

/// Error raised by step, rate and purchase operations.
///
/// Every variant is reported before any state is touched, so a failed
/// operation never leaves a partial update behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaleError {
    #[error("invalid step: {0}")]
    InvalidStep(&'static str),

    #[error("step capacity exceeded: at most {max} steps")]
    CapacityExceeded { max: usize },

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("division by zero rate")]
    DivisionByZero,

    #[error("invalid sale window: {0}")]
    InvalidWindow(&'static str),

    #[error("invalid rate: {0}")]
    InvalidRate(&'static str),

    #[error("invalid purchase: {0}")]
    InvalidPurchase(&'static str),

    #[error("sale opens at {opening}, now is {now}")]
    SaleNotOpen { opening: u64, now: u64 },

    #[error("sale closed at {closing}, now is {now}")]
    SaleClosed { closing: u64, now: u64 },
}

/// Result type for sale operations
pub type SaleResult<T> = Result<T, SaleError>;
