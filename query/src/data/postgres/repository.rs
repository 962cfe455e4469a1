//! ComplexQueryRepository implementation for PostgreSQL

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Arguments, FromRow, PgPool};

use crate::data::error::DataError;
use crate::data::plan::QueryPlan;
use crate::data::sql::{PostgresDialect, SqlQuery};
use crate::data::traits::ComplexQueryRepository;
use crate::data::types::{Page, PageRequest, Sort, known_total};
use crate::error::QueryError;
use crate::filter::{FilterValue, SearchParams};
use crate::schema::SchemaRegistry;

/// Search repository over one PostgreSQL entity
pub struct PostgresQueryRepository<T> {
    pool: PgPool,
    registry: Arc<SchemaRegistry>,
    entity: String,
    _row: PhantomData<fn() -> T>,
}

impl<T> PostgresQueryRepository<T> {
    /// Create a repository; fails if `entity` is not registered
    pub fn new(
        pool: PgPool,
        registry: Arc<SchemaRegistry>,
        entity: impl Into<String>,
    ) -> Result<Self, QueryError> {
        let entity = entity.into();
        registry.get(&entity)?;
        Ok(Self {
            pool,
            registry,
            entity,
            _row: PhantomData,
        })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    fn plan(&self, params: &SearchParams, sort: &Sort) -> Result<QueryPlan<'_>, QueryError> {
        QueryPlan::new(&self.registry, &self.entity, params, sort)
    }

    async fn fetch_count(&self, query: SqlQuery) -> Result<u64, DataError> {
        let args = bind_arguments(&query.params).map_err(DataError::from_postgres)?;
        let total: i64 = sqlx::query_scalar_with::<_, i64, _>(&query.sql, args)
            .fetch_one(&self.pool)
            .await
            .map_err(DataError::from_postgres)?;
        Ok(total.max(0) as u64)
    }
}

impl<T> PostgresQueryRepository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    async fn fetch(&self, query: SqlQuery) -> Result<Vec<T>, DataError> {
        let args = bind_arguments(&query.params).map_err(DataError::from_postgres)?;
        let rows = sqlx::query_as_with::<_, T, _>(&query.sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(DataError::from_postgres)?;
        tracing::debug!(entity = %self.entity, rows = rows.len(), "Search query executed");
        Ok(rows)
    }
}

#[async_trait]
impl<T> ComplexQueryRepository<T> for PostgresQueryRepository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static,
{
    async fn query(&self, params: &SearchParams) -> Result<Vec<T>, DataError> {
        self.query_sorted(params, &Sort::unsorted()).await
    }

    async fn query_sorted(&self, params: &SearchParams, sort: &Sort) -> Result<Vec<T>, DataError> {
        let query = self.plan(params, sort)?.select(&PostgresDialect, None);
        self.fetch(query).await
    }

    async fn query_page(
        &self,
        params: &SearchParams,
        request: &PageRequest,
    ) -> Result<Page<T>, DataError> {
        let plan = self.plan(params, request.sort())?;
        let select = plan.select(&PostgresDialect, Some((request.limit(), request.offset())));
        let count = plan.count(&PostgresDialect);

        let content = self.fetch(select).await?;
        let total = match known_total(request, content.len()) {
            Some(total) => total,
            None => self.fetch_count(count).await?,
        };
        Ok(Page::new(content, request, total))
    }

    async fn count(&self, params: &SearchParams) -> Result<u64, DataError> {
        let query = self.plan(params, &Sort::unsorted())?.count(&PostgresDialect);
        self.fetch_count(query).await
    }
}

/// Bind filter values in placeholder order (`$1`, `$2`, ...)
fn bind_arguments(values: &[FilterValue]) -> Result<PgArguments, sqlx::Error> {
    let mut args = PgArguments::default();
    for value in values {
        match value {
            FilterValue::Null => args.add(Option::<String>::None),
            FilterValue::Bool(v) => args.add(*v),
            FilterValue::Int(v) => args.add(*v),
            FilterValue::Float(v) => args.add(*v),
            FilterValue::Text(v) => args.add(v.clone()),
            FilterValue::List(_) => Err(format!(
                "cannot bind a {} as a single parameter",
                value.kind_name()
            )
            .into()),
        }
        .map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}
