use std::collections::HashMap;

use super::error::{SaleError, SaleResult};
use super::steps::StepTable;

/// Per-step exchange rates on top of a [`StepTable`].
///
/// Rates are sparse: a step without an explicit entry is priced at the
/// immutable base rate.
#[derive(Debug, Clone)]
pub struct RateSchedule {
    steps: StepTable,
    base_rate: u128,
    rate_of: HashMap<u8, u128>,
    usd_to_eth_rate: u128,
}

impl RateSchedule {
    pub fn new(steps: StepTable, base_rate: u128, usd_to_eth_rate: u128) -> SaleResult<Self> {
        if base_rate == 0 {
            return Err(SaleError::InvalidRate("base rate must be > 0"));
        }
        Ok(Self {
            steps,
            base_rate,
            rate_of: HashMap::new(),
            usd_to_eth_rate,
        })
    }

    pub fn steps(&self) -> &StepTable {
        &self.steps
    }

    /// Step insertion goes through the schedule so rates and steps stay in one place.
    pub fn add_step(&mut self, due_date: u64) -> SaleResult<u8> {
        self.steps.add_step(due_date)
    }

    pub fn base_rate(&self) -> u128 {
        self.base_rate
    }

    pub fn usd_rate(&self) -> u128 {
        self.usd_to_eth_rate
    }

    /// Effective rate of `step`, falling back to the base rate.
    pub fn step_rate(&self, step: u8) -> SaleResult<u128> {
        self.steps.ensure_step(step)?;
        Ok(self.rate_of.get(&step).copied().unwrap_or(self.base_rate))
    }

    /// Explicitly configured rate, if any.
    pub fn explicit_rate(&self, step: u8) -> Option<u128> {
        self.rate_of.get(&step).copied()
    }

    /// Overwrite the rate of `step`. Returns the previous effective rate.
    pub fn set_step_rate(&mut self, step: u8, rate: u128) -> SaleResult<u128> {
        let old = self.step_rate(step)?;
        self.rate_of.insert(step, rate);
        Ok(old)
    }

    /// Overwrite the USD/ETH factor. Returns the previous value.
    pub fn set_usd_rate(&mut self, value: u128) -> u128 {
        std::mem::replace(&mut self.usd_to_eth_rate, value)
    }

    pub fn current_rate(&self, now: u64) -> SaleResult<u128> {
        self.step_rate(self.steps.current_step(now))
    }

    /// `amount * usd_rate / current_rate`, truncated toward zero.
    pub fn tokens_for(&self, amount: u128, now: u64) -> SaleResult<u128> {
        let rate = self.current_rate(now)?;
        let scaled = amount
            .checked_mul(self.usd_to_eth_rate)
            .ok_or(SaleError::ArithmeticOverflow)?;
        if rate == 0 {
            return Err(SaleError::DivisionByZero);
        }
        Ok(scaled / rate)
    }
}
