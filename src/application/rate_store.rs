// Store interface for pairs and their rate values
use crate::domain::pair::Pair;
use crate::domain::rate::Observation;
use chrono::NaiveDateTime;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("pair not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Sole owner of persisted pairs and values. Ranges are inclusive on both ends.
pub trait RateStore: Send + Sync {
    /// Insert a pair. Fails with `Conflict` if the name is taken.
    fn add_pair(&self, name: &str, description: &str) -> StoreResult<i64>;

    /// All pairs, ordered by id
    fn get_pairs(&self) -> StoreResult<Vec<Pair>>;

    /// Replace the description of an existing pair.
    fn update_pair(&self, name: &str, description: &str) -> StoreResult<()>;

    /// Remove a pair and, by cascade, all of its values.
    fn delete_pair(&self, name: &str) -> StoreResult<()>;

    /// Insert a batch of values atomically. Returns the number inserted.
    fn add_values(&self, pair_name: &str, series: &[Observation]) -> StoreResult<usize>;

    /// Create a pair and its values in a single transaction.
    fn add_pair_with_values(
        &self,
        name: &str,
        description: &str,
        series: &[Observation],
    ) -> StoreResult<usize>;

    /// Delete values in `[begin, end]`. An unknown pair deletes nothing.
    fn delete_values(
        &self,
        pair_name: &str,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> StoreResult<usize>;

    /// Values in `[begin, end]`, ascending by timestamp.
    fn get_values(
        &self,
        pair_name: &str,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> StoreResult<Vec<Observation>>;
}
