use super::domain::{ClientId, ClientRecord, FinancialRecord};

/// Structured application data per client. `add` overwrites (last write wins).
pub trait ClientRecordStore: Send + Sync {
    fn add(&self, id: &ClientId, record: ClientRecord) -> Result<(), RepositoryError>;
    fn get(&self, id: &ClientId) -> Result<ClientRecord, RepositoryError>;

    fn monthly_income(&self, id: &ClientId) -> Result<u64, RepositoryError> {
        self.get(id).map(|record| record.monthly_income())
    }

    fn monthly_expenses(&self, id: &ClientId) -> Result<u64, RepositoryError> {
        self.get(id).map(|record| record.monthly_expenses())
    }
}

/// Synthetic financial history per client, materialised on first access.
pub trait FinancialRecordStore: Send + Sync {
    /// Return the stored record, synthesising and storing one if absent. Idempotent.
    fn ensure(&self, id: &ClientId) -> Result<FinancialRecord, RepositoryError>;
    fn get(&self, id: &ClientId) -> Result<FinancialRecord, RepositoryError>;
}

/// Policy producing the history of a client seen for the first time.
pub trait FinancialHistorySource: Send + Sync {
    fn synthesize(&self, id: &ClientId) -> FinancialRecord;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("no client found with id {0}")]
    NotFound(ClientId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
