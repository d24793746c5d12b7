//! Record store abstraction
//!
//! Everything above this crate talks to nights through [`NightStore`], so
//! the tracker can be driven by SQLite on device and by an in-memory fake
//! in tests.

use async_trait::async_trait;

use crate::night::Night;
use crate::Result;

#[async_trait]
pub trait NightStore: Send + Sync {
    /// Persist a new night and return its assigned id
    async fn insert(&self, night: &Night) -> Result<i64>;

    /// Overwrite an existing night, matched by id
    async fn update(&self, night: &Night) -> Result<()>;

    async fn get(&self, id: i64) -> Result<Option<Night>>;

    /// The most recently inserted night, in progress or not
    async fn latest(&self) -> Result<Option<Night>>;

    /// All nights, newest first
    async fn all(&self) -> Result<Vec<Night>>;

    /// Delete every night, returning how many were removed
    async fn clear(&self) -> Result<usize>;
}
