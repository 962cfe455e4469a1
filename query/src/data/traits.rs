//! Repository traits for database backends
//!
//! This module defines the search interface shared by every backend. SQLite and
//! PostgreSQL implement it with their own dialect and argument binding.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{Page, PageRequest, Sort};
use crate::filter::SearchParams;

/// Search repository over one entity, yielding rows as `T`
///
/// Every operation parses and resolves the parameters first; construction errors are
/// returned as [`DataError::Query`] without touching the database.
#[async_trait]
pub trait ComplexQueryRepository<T>: Send + Sync
where
    T: Send,
{
    /// All matching rows, in database order
    async fn query(&self, params: &SearchParams) -> Result<Vec<T>, DataError>;

    /// All matching rows, ordered
    async fn query_sorted(&self, params: &SearchParams, sort: &Sort) -> Result<Vec<T>, DataError>;

    /// One page of matching rows plus the total match count
    async fn query_page(
        &self,
        params: &SearchParams,
        request: &PageRequest,
    ) -> Result<Page<T>, DataError>;

    /// Number of matching rows
    async fn count(&self, params: &SearchParams) -> Result<u64, DataError>;
}
