//! Process-local store implementations. Unbounded, no eviction.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::domain::{ClientId, ClientRecord, FinancialRecord};
use super::repository::{
    ClientRecordStore, FinancialHistorySource, FinancialRecordStore, RepositoryError,
};

fn lock<'a, T>(mutex: &'a Mutex<T>, store: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{store} lock poisoned")))
}

#[derive(Default, Clone)]
pub struct InMemoryClientRecordStore {
    records: Arc<Mutex<HashMap<ClientId, ClientRecord>>>,
}

impl InMemoryClientRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        lock(&self.records, "client store").map(|guard| guard.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        self.len().map(|len| len == 0)
    }
}

impl ClientRecordStore for InMemoryClientRecordStore {
    fn add(&self, id: &ClientId, record: ClientRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records, "client store")?;
        guard.insert(id.clone(), record);
        info!(client_id = %id, "client record stored");
        Ok(())
    }

    fn get(&self, id: &ClientId) -> Result<ClientRecord, RepositoryError> {
        let guard = lock(&self.records, "client store")?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }
}

#[derive(Clone)]
pub struct InMemoryFinancialRecordStore {
    records: Arc<Mutex<HashMap<ClientId, FinancialRecord>>>,
    history: Arc<dyn FinancialHistorySource>,
}

impl InMemoryFinancialRecordStore {
    pub fn new(history: Arc<dyn FinancialHistorySource>) -> Self {
        Self {
            records: Arc::default(),
            history,
        }
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        lock(&self.records, "financial store").map(|guard| guard.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        self.len().map(|len| len == 0)
    }
}

impl FinancialRecordStore for InMemoryFinancialRecordStore {
    fn ensure(&self, id: &ClientId) -> Result<FinancialRecord, RepositoryError> {
        let mut guard = lock(&self.records, "financial store")?;
        if let Some(existing) = guard.get(id) {
            return Ok(*existing);
        }

        let record = self.history.synthesize(id);
        guard.insert(id.clone(), record);
        info!(client_id = %id, "financial history synthesized");
        Ok(record)
    }

    fn get(&self, id: &ClientId) -> Result<FinancialRecord, RepositoryError> {
        let guard = lock(&self.records, "financial store")?;
        guard
            .get(id)
            .copied()
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }
}

const DEBT_RANGE: RangeInclusive<u64> = 1_000..=1_005;
const LATE_PAYMENT_RANGE: RangeInclusive<u32> = 0..=2;

/// Bounded-random history drawn from an explicitly seeded generator.
pub struct SeededFinancialHistory {
    rng: Mutex<StdRng>,
}

impl SeededFinancialHistory {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seed from `seed` when given, otherwise from OS entropy. The chosen seed is logged.
    pub fn from_config(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        info!(seed, "financial history generator seeded");
        Self::new(seed)
    }
}

impl FinancialHistorySource for SeededFinancialHistory {
    fn synthesize(&self, id: &ClientId) -> FinancialRecord {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let record = FinancialRecord {
            outstanding_debt: rng.gen_range(DEBT_RANGE),
            late_payments: rng.gen_range(LATE_PAYMENT_RANGE),
            has_bankruptcy: rng.gen_bool(0.5),
        };
        debug!(client_id = %id, ?record, "drew synthetic financial history");
        record
    }
}

/// Same history for every client; useful for deterministic demos and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedFinancialHistory(pub FinancialRecord);

impl FinancialHistorySource for FixedFinancialHistory {
    fn synthesize(&self, _id: &ClientId) -> FinancialRecord {
        self.0
    }
}
