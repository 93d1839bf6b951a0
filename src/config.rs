use log::warn;
use std::env;
use std::str::FromStr;

use crate::sale::{DEFAULT_RATE, DEFAULT_SALE_DURATION_SECS, DEFAULT_USD_RATE, SaleParams};

/// Seconds between startup and the default opening time.
const DEFAULT_OPENING_DELAY_SECS: u64 = 60;

/// A step to apply at startup: its due date and an optional explicit rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEntry {
    pub due_date: u64,
    pub rate: Option<u128>,
}

/// Runtime settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub sale: SaleParams,
    pub steps: Vec<StepEntry>,
}

impl Settings {
    pub fn from_env(now: u64) -> Self {
        Self::from_lookup(now, |key| env::var(key).ok())
    }

    /// Build settings from any key lookup; missing or malformed values fall
    /// back to defaults.
    pub fn from_lookup<F>(now: u64, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "PORT", 8080u16);

        let opening_time = parse_or(
            &lookup,
            "SALE_OPENING_TIME",
            now.saturating_add(DEFAULT_OPENING_DELAY_SECS),
        );
        let closing_time = parse_or(
            &lookup,
            "SALE_CLOSING_TIME",
            opening_time.saturating_add(DEFAULT_SALE_DURATION_SECS),
        );
        let rate = parse_or(&lookup, "SALE_RATE", DEFAULT_RATE);
        let usd_rate = parse_or(&lookup, "SALE_USD_RATE", DEFAULT_USD_RATE);

        let steps = lookup("SALE_STEPS")
            .map(|raw| parse_steps(&raw))
            .unwrap_or_default();

        Self {
            host,
            port,
            sale: SaleParams {
                opening_time,
                closing_time,
                rate,
                usd_rate,
            },
            steps,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("CONFIG - {key}={raw:?} is not valid, using default");
            default
        }),
        None => default,
    }
}

/// Parse `due_date[:rate]` entries separated by commas. Malformed entries
/// are skipped with a warning.
pub fn parse_steps(raw: &str) -> Vec<StepEntry> {
    let mut steps = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (due, rate) = match entry.split_once(':') {
            Some((due, rate)) => (due.trim(), Some(rate.trim())),
            None => (entry, None),
        };
        let Ok(due_date) = due.parse::<u64>() else {
            warn!("CONFIG - SALE_STEPS entry {entry:?} has an invalid due date, skipped");
            continue;
        };
        let rate = match rate.map(str::parse::<u128>) {
            Some(Ok(r)) => Some(r),
            Some(Err(_)) => {
                warn!("CONFIG - SALE_STEPS entry {entry:?} has an invalid rate, skipped");
                continue;
            }
            None => None,
        };
        steps.push(StepEntry { due_date, rate });
    }
    steps
}
