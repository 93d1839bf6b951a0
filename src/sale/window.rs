use super::error::{SaleError, SaleResult};

/// Fixed opening/closing boundaries of a sale (Unix seconds, UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleWindow {
    opening: u64,
    closing: u64,
}

impl SaleWindow {
    /// Build a window that has not opened yet at `now`.
    pub fn new(opening: u64, closing: u64, now: u64) -> SaleResult<Self> {
        if opening < now {
            return Err(SaleError::InvalidWindow("opening time is in the past"));
        }
        if opening > closing {
            return Err(SaleError::InvalidWindow("opening time is after closing time"));
        }
        Ok(Self { opening, closing })
    }

    pub fn opening(&self) -> u64 {
        self.opening
    }

    pub fn closing(&self) -> u64 {
        self.closing
    }

    pub fn is_open(&self, now: u64) -> bool {
        now >= self.opening && now <= self.closing
    }

    pub fn has_closed(&self, now: u64) -> bool {
        now > self.closing
    }

    /// Gate used by the purchase flow.
    pub fn ensure_open(&self, now: u64) -> SaleResult<()> {
        if now < self.opening {
            return Err(SaleError::SaleNotOpen {
                opening: self.opening,
                now,
            });
        }
        if self.has_closed(now) {
            return Err(SaleError::SaleClosed {
                closing: self.closing,
                now,
            });
        }
        Ok(())
    }
}
