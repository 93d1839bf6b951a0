pub mod error;
pub mod events;
pub mod model;
pub mod rates;
pub mod steps;
pub mod window;

pub use error::{SaleError, SaleResult};
pub use events::SaleEvent;
pub use model::{Sale, SaleParams};

/// Hard ceiling on the number of steps, the implicit closing step included.
pub const MAX_STEPS: usize = 255;

/// Custom due dates that can be appended before the table is full.
pub const MAX_BOUNDARIES: usize = MAX_STEPS - 1;

/// Base rate used when none is configured (tokens per pricing unit).
pub const DEFAULT_RATE: u128 = 1000;

/// USD/ETH factor used when none is configured.
pub const DEFAULT_USD_RATE: u128 = 1;

/// Default sale length in seconds (30 days).
pub const DEFAULT_SALE_DURATION_SECS: u64 = 30 * 24 * 60 * 60;
