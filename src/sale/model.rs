use log::{debug, warn};
use serde::Serialize;

use super::error::{SaleError, SaleResult};
use super::events::{EventJournal, SaleEventKind};
use super::rates::RateSchedule;
use super::steps::StepTable;
use super::window::SaleWindow;

/// Construction parameters of a sale.
#[derive(Debug, Clone, Copy)]
pub struct SaleParams {
    pub opening_time: u64,
    pub closing_time: u64,
    pub rate: u128,
    pub usd_rate: u128,
}

/// Result of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Purchase {
    pub beneficiary: String,
    pub amount: u128,
    pub tokens: u128,
    pub step: u8,
    pub rate: u128,
}

/// Read-only snapshot of the sale at a given time.
#[derive(Debug, Clone, Serialize)]
pub struct SaleSummary {
    pub now: u64,
    pub opening_time: u64,
    pub closing_time: u64,
    pub is_open: bool,
    pub has_closed: bool,
    pub base_rate: u128,
    pub usd_rate: u128,
    pub step_count: u8,
    pub current_step: u8,
    pub current_rate: u128,
    pub raised: u128,
    pub tokens_sold: u128,
    pub events: usize,
}

/// One sale: a time window, its stepped rate schedule, running totals and
/// the audit journal. Every mutation records an event only once it has
/// succeeded.
#[derive(Debug)]
pub struct Sale {
    schedule: RateSchedule,
    raised: u128,
    tokens_sold: u128,
    journal: EventJournal,
}

impl Sale {
    pub fn new(params: SaleParams, now: u64) -> SaleResult<Self> {
        let window = SaleWindow::new(params.opening_time, params.closing_time, now)?;
        let schedule = RateSchedule::new(StepTable::new(window), params.rate, params.usd_rate)?;
        Ok(Self {
            schedule,
            raised: 0,
            tokens_sold: 0,
            journal: EventJournal::new(),
        })
    }

    pub fn window(&self) -> &SaleWindow {
        self.schedule.steps().window()
    }

    pub fn steps(&self) -> &StepTable {
        self.schedule.steps()
    }

    pub fn schedule(&self) -> &RateSchedule {
        &self.schedule
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    pub fn raised(&self) -> u128 {
        self.raised
    }

    pub fn tokens_sold(&self) -> u128 {
        self.tokens_sold
    }

    pub fn add_step(&mut self, due_date: u64, now: u64) -> SaleResult<u8> {
        let step = self.schedule.add_step(due_date)?;
        self.journal.record(SaleEventKind::StepAdded {
            timestamp: now,
            step,
            due_date,
        });
        Ok(step)
    }

    pub fn set_step_rate(&mut self, step: u8, rate: u128, now: u64) -> SaleResult<u128> {
        let old_rate = self.schedule.set_step_rate(step, rate)?;
        if rate == 0 {
            warn!("step {} rate set to zero; purchases in it will fail", step);
        }
        self.journal.record(SaleEventKind::StepRateChanged {
            timestamp: now,
            step,
            old_rate,
            new_rate: rate,
        });
        Ok(old_rate)
    }

    pub fn set_usd_rate(&mut self, value: u128, now: u64) -> u128 {
        let old_rate = self.schedule.set_usd_rate(value);
        self.journal.record(SaleEventKind::UsdRateChanged {
            timestamp: now,
            old_rate,
            new_rate: value,
        });
        old_rate
    }

    pub fn current_step(&self, now: u64) -> u8 {
        self.schedule.steps().current_step(now)
    }

    pub fn current_rate(&self, now: u64) -> SaleResult<u128> {
        self.schedule.current_rate(now)
    }

    pub fn tokens_for(&self, amount: u128, now: u64) -> SaleResult<u128> {
        self.schedule.tokens_for(amount, now)
    }

    /// Validate a payment, price it at the current step and add it to the
    /// running totals.
    pub fn buy_tokens(&mut self, beneficiary: &str, amount: u128, now: u64) -> SaleResult<Purchase> {
        let beneficiary = beneficiary.trim();
        if beneficiary.is_empty() {
            return Err(SaleError::InvalidPurchase("beneficiary required"));
        }
        if amount == 0 {
            return Err(SaleError::InvalidPurchase("amount must be > 0"));
        }
        self.window().ensure_open(now)?;

        let step = self.current_step(now);
        let rate = self.schedule.step_rate(step)?;
        let tokens = self.tokens_for(amount, now)?;

        let raised = self
            .raised
            .checked_add(amount)
            .ok_or(SaleError::ArithmeticOverflow)?;
        let tokens_sold = self
            .tokens_sold
            .checked_add(tokens)
            .ok_or(SaleError::ArithmeticOverflow)?;
        self.raised = raised;
        self.tokens_sold = tokens_sold;
        debug!(
            "PURCHASE - {} paid {} at step {} (rate={}) -> {} tokens; raised={}",
            beneficiary, amount, step, rate, tokens, raised
        );

        self.journal.record(SaleEventKind::TokensPurchased {
            timestamp: now,
            beneficiary: beneficiary.to_string(),
            amount,
            tokens,
            step,
        });

        Ok(Purchase {
            beneficiary: beneficiary.to_string(),
            amount,
            tokens,
            step,
            rate,
        })
    }

    pub fn summary(&self, now: u64) -> SaleResult<SaleSummary> {
        let window = self.window();
        Ok(SaleSummary {
            now,
            opening_time: window.opening(),
            closing_time: window.closing(),
            is_open: window.is_open(now),
            has_closed: window.has_closed(now),
            base_rate: self.schedule.base_rate(),
            usd_rate: self.schedule.usd_rate(),
            step_count: self.steps().step_count(),
            current_step: self.current_step(now),
            current_rate: self.current_rate(now)?,
            raised: self.raised(),
            tokens_sold: self.tokens_sold(),
            events: self.journal.len(),
        })
    }
}
