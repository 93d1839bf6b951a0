use log::info;
use serde::Serialize;
use uuid::Uuid;

/// Audit notification emitted after a successful mutation.
///
/// The journal never reads a clock: the only time an event carries is the
/// sale time its caller applied the operation at.
#[derive(Debug, Clone, Serialize)]
pub struct SaleEvent {
    pub seq: usize,
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: SaleEventKind,
}

/// `timestamp` is the sale time the operation was applied at, as supplied
/// by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SaleEventKind {
    StepAdded {
        timestamp: u64,
        step: u8,
        due_date: u64,
    },
    StepRateChanged {
        timestamp: u64,
        step: u8,
        old_rate: u128,
        new_rate: u128,
    },
    UsdRateChanged {
        timestamp: u64,
        old_rate: u128,
        new_rate: u128,
    },
    TokensPurchased {
        timestamp: u64,
        beneficiary: String,
        amount: u128,
        tokens: u128,
        step: u8,
    },
}

/// Append-only in-memory journal of sale events.
///
/// Entries are kept for the lifetime of the sale and never pruned; one entry
/// per admin change or purchase. Persisting or rotating them is left to
/// whoever consumes `GET /events/`.
#[derive(Debug, Default)]
pub struct EventJournal {
    events: Vec<SaleEvent>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn record(&mut self, kind: SaleEventKind) -> &SaleEvent {
        let event = SaleEvent {
            seq: self.events.len(),
            id: Uuid::new_v4(),
            kind,
        };
        info!("EVENT #{} {:?}", self.events.len(), event.kind);
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SaleEvent> {
        self.events.iter()
    }
}
