use crate::sale::{Sale, SaleEvent};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Time source handed to every resolving call.
pub type Clock = fn() -> u64;

/// Current Unix time in seconds (UTC).
pub fn system_clock() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

/// Shared application state: one in-memory sale and the clock it is read against.
///
/// Mutations hold the write lock for the whole operation (step append,
/// closing remap and journal entry), so readers never see half of it.
pub struct AppState {
    pub sale: RwLock<Sale>,
    pub clock: Clock,
}

impl AppState {
    pub fn new(sale: Sale) -> Self {
        Self::with_clock(sale, system_clock)
    }

    pub fn with_clock(sale: Sale, clock: Clock) -> Self {
        Self {
            sale: RwLock::new(sale),
            clock,
        }
    }

    pub fn now(&self) -> u64 {
        (self.clock)()
    }
}

/* ---------- Step API Models ---------- */

#[derive(Serialize)]
pub struct StepInfo {
    pub step: u8,
    pub due_date: u64,
    pub rate: u128,
    pub explicit_rate: bool,
}

#[derive(Serialize)]
pub struct StepsResponse {
    pub step_count: u8,
    pub current_step: u8,
    pub steps: Vec<StepInfo>,
}

#[derive(Deserialize)]
pub struct AddStepRequest {
    pub due_date: u64,
}

#[derive(Serialize)]
pub struct AddStepResponse {
    pub step: u8,
    pub due_date: u64,
    pub step_count: u8,
}

/* ---------- Rate API Models ---------- */

#[derive(Serialize)]
pub struct StepRateResponse {
    pub step: u8,
    pub rate: u128,
    pub explicit_rate: bool,
}

#[derive(Deserialize)]
pub struct SetRateRequest {
    pub rate: u128,
}

#[derive(Serialize)]
pub struct RateChangeResponse {
    pub old_rate: u128,
    pub new_rate: u128,
}

#[derive(Serialize)]
pub struct UsdRateResponse {
    pub usd_rate: u128,
}

#[derive(Deserialize)]
pub struct SetUsdRateRequest {
    pub value: u128,
}

/* ---------- Purchase API Models ---------- */

/// `amount` stays a string in the query so the full u128 range parses.
#[derive(Deserialize)]
pub struct QuoteQuery {
    pub amount: String,
    pub at: Option<u64>,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub amount: u128,
    pub at: u64,
    pub step: u8,
    pub rate: u128,
    pub usd_rate: u128,
    pub tokens: u128,
}

#[derive(Deserialize)]
pub struct PurchaseRequest {
    pub beneficiary: String,
    pub amount: u128,
}

/* ---------- Events API Models ---------- */

#[derive(Deserialize)]
pub struct EventsQuery {
    pub since: Option<usize>,
}

#[derive(Serialize)]
pub struct EventsResponse<'a> {
    pub total: usize,
    pub events: Vec<&'a SaleEvent>,
}
