//! ComplexQueryRepository implementation for SQLite

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Arguments, FromRow, SqlitePool};

use crate::data::error::DataError;
use crate::data::plan::QueryPlan;
use crate::data::sql::{SqlQuery, SqliteDialect};
use crate::data::traits::ComplexQueryRepository;
use crate::data::types::{Page, PageRequest, Sort, known_total};
use crate::error::QueryError;
use crate::filter::{FilterValue, SearchParams};
use crate::schema::SchemaRegistry;

/// Search repository over one SQLite entity
pub struct SqliteQueryRepository<T> {
    pool: SqlitePool,
    registry: Arc<SchemaRegistry>,
    entity: String,
    _row: PhantomData<fn() -> T>,
}

impl<T> SqliteQueryRepository<T> {
    /// Create a repository; fails if `entity` is not registered
    pub fn new(
        pool: SqlitePool,
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

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn plan(&self, params: &SearchParams, sort: &Sort) -> Result<QueryPlan<'_>, QueryError> {
        QueryPlan::new(&self.registry, &self.entity, params, sort)
    }

    async fn fetch_count(&self, query: SqlQuery) -> Result<u64, DataError> {
        let args = bind_arguments(&query.params).map_err(DataError::from_sqlite)?;
        let total: i64 = sqlx::query_scalar_with::<_, i64, _>(&query.sql, args)
            .fetch_one(&self.pool)
            .await
            .map_err(DataError::from_sqlite)?;
        Ok(total.max(0) as u64)
    }
}

impl<T> SqliteQueryRepository<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    async fn fetch(&self, query: SqlQuery) -> Result<Vec<T>, DataError> {
        let args = bind_arguments(&query.params).map_err(DataError::from_sqlite)?;
        let rows = sqlx::query_as_with::<_, T, _>(&query.sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(DataError::from_sqlite)?;
        tracing::debug!(entity = %self.entity, rows = rows.len(), "Search query executed");
        Ok(rows)
    }
}

#[async_trait]
impl<T> ComplexQueryRepository<T> for SqliteQueryRepository<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static,
{
    async fn query(&self, params: &SearchParams) -> Result<Vec<T>, DataError> {
        self.query_sorted(params, &Sort::unsorted()).await
    }

    async fn query_sorted(&self, params: &SearchParams, sort: &Sort) -> Result<Vec<T>, DataError> {
        let query = self.plan(params, sort)?.select(&SqliteDialect, None);
        self.fetch(query).await
    }

    async fn query_page(
        &self,
        params: &SearchParams,
        request: &PageRequest,
    ) -> Result<Page<T>, DataError> {
        let plan = self.plan(params, request.sort())?;
        let select = plan.select(&SqliteDialect, Some((request.limit(), request.offset())));
        let count = plan.count(&SqliteDialect);

        let content = self.fetch(select).await?;
        let total = match known_total(request, content.len()) {
            Some(total) => total,
            None => self.fetch_count(count).await?,
        };
        Ok(Page::new(content, request, total))
    }

    async fn count(&self, params: &SearchParams) -> Result<u64, DataError> {
        let query = self.plan(params, &Sort::unsorted())?.count(&SqliteDialect);
        self.fetch_count(query).await
    }
}

/// Bind filter values in placeholder order
fn bind_arguments<'q>(values: &[FilterValue]) -> Result<SqliteArguments<'q>, sqlx::Error> {
    let mut args = SqliteArguments::default();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;
    use crate::data::types::Order;
    use crate::schema::{ColumnType, EntitySchema};

    async fn setup_test_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        for statement in [
            "CREATE TABLE organizations (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                age INTEGER,
                active BOOLEAN NOT NULL DEFAULT 1,
                organization_id INTEGER REFERENCES organizations(id)
            )",
            "INSERT INTO organizations (id, name) VALUES (1, 'Acme'), (2, 'Globex')",
            "INSERT INTO users (id, name, age, active, organization_id) VALUES
                (1, 'Ann', 30, 1, 1),
                (2, 'Bob', 25, 0, 1),
                (3, '50%_off', 41, 1, 2),
                (4, '50 percent off', 30, 1, 2),
                (5, 'Cid', NULL, 1, NULL)",
        ] {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }
        pool
    }

    fn registry() -> Arc<SchemaRegistry> {
        let mut registry = SchemaRegistry::default();
        registry.register(
            EntitySchema::new("organizations", "organizations")
                .column("id", ColumnType::Integer)
                .column("name", ColumnType::Text),
        );
        registry.register(
            EntitySchema::new("users", "users")
                .column("id", ColumnType::Integer)
                .column("name", ColumnType::Text)
                .column("age", ColumnType::Integer)
                .column("active", ColumnType::Boolean)
                .relation("organization", "organizations", "organization_id", "id"),
        );
        Arc::new(registry)
    }

    #[derive(Debug, sqlx::FromRow)]
    struct UserRow {
        id: i64,
        name: String,
    }

    async fn users() -> SqliteQueryRepository<UserRow> {
        SqliteQueryRepository::new(setup_test_pool().await, registry(), "users").unwrap()
    }

    fn params(entries: Vec<(&str, FilterValue)>) -> SearchParams {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn ids(rows: &[UserRow]) -> Vec<i64> {
        let mut ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_unknown_entity_rejected() {
        let pool = setup_test_pool().await;
        let result = SqliteQueryRepository::<UserRow>::new(pool, registry(), "ghosts");
        assert!(matches!(result, Err(QueryError::UnknownEntity { .. })));
    }

    #[tokio::test]
    async fn test_empty_params_match_all() {
        let repo = users().await;
        let rows = repo.query(&SearchParams::new()).await.unwrap();
        assert_eq!(ids(&rows), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_eq_filter() {
        let repo = users().await;
        let rows = repo
            .query(&params(vec![("EQ_age", FilterValue::Int(30))]))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![1, 4]);
    }

    #[tokio::test]
    async fn test_filters_are_conjunctive() {
        let repo = users().await;
        let rows = repo
            .query(&params(vec![
                ("EQ_age", FilterValue::Int(30)),
                ("LIKE_name", FilterValue::from("percent")),
            ]))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![4]);
    }

    #[tokio::test]
    async fn test_like_wildcards_are_literal() {
        let repo = users().await;
        let rows = repo
            .query(&params(vec![("LIKE_name", FilterValue::from("50%_off"))]))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![3]);
        assert_eq!(rows[0].name, "50%_off");
    }

    #[tokio::test]
    async fn test_like_on_integer_column() {
        let repo = users().await;
        let rows = repo
            .query(&params(vec![("LIKE_age", FilterValue::Int(4))]))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![3]);
    }

    async fn readings() -> SqliteQueryRepository<Record> {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        for statement in [
            "CREATE TABLE readings (
                id INTEGER PRIMARY KEY,
                flag BOOLEAN NOT NULL,
                score REAL,
                data BLOB
            )",
            "INSERT INTO readings (id, flag, score, data) VALUES
                (1, 1, 1e-7, x'FF00'),
                (2, 0, 2.5, NULL)",
        ] {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }

        let mut registry = SchemaRegistry::default();
        registry.register(
            EntitySchema::new("readings", "readings")
                .column("id", ColumnType::Integer)
                .column("flag", ColumnType::Boolean)
                .column("score", ColumnType::Real),
        );
        SqliteQueryRepository::new(pool, Arc::new(registry), "readings").unwrap()
    }

    fn record_ids(rows: &[Record]) -> Vec<FilterValue> {
        rows.iter()
            .filter_map(|row| row.get("id").cloned())
            .collect()
    }

    #[tokio::test]
    async fn test_like_on_boolean_column_rejected() {
        let repo = readings().await;
        for value in [FilterValue::Bool(true), FilterValue::from("1")] {
            let err = repo
                .query(&params(vec![("LIKE_flag", value)]))
                .await
                .unwrap_err();
            assert!(err.is_query_error(), "unexpected error: {err}");
        }
    }

    #[tokio::test]
    async fn test_like_on_real_column_matches_cast_text() {
        let repo = readings().await;

        let err = repo
            .query(&params(vec![("LIKE_score", FilterValue::Float(1e-7))]))
            .await
            .unwrap_err();
        assert!(err.is_query_error(), "unexpected error: {err}");

        let rows = repo
            .query(&params(vec![("LIKE_score", FilterValue::from("2.5"))]))
            .await
            .unwrap();
        assert_eq!(record_ids(&rows), vec![FilterValue::Int(2)]);

        // SQLite renders small reals in exponent form
        let rows = repo
            .query(&params(vec![("LIKE_score", FilterValue::from("e-07"))]))
            .await
            .unwrap();
        assert_eq!(record_ids(&rows), vec![FilterValue::Int(1)]);
    }

    #[tokio::test]
    async fn test_records_with_blob_column() {
        let repo = readings().await;
        let sort = Sort::from(Order::asc("id"));
        let rows = repo.query_sorted(&SearchParams::new(), &sort).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("data"), Some(&FilterValue::from("ff00")));
        assert_eq!(rows[0].get("flag"), Some(&FilterValue::Bool(true)));
        assert_eq!(rows[1].get("data"), Some(&FilterValue::Null));
        assert_eq!(rows[1].get("score"), Some(&FilterValue::Float(2.5)));
    }

    #[tokio::test]
    async fn test_null_filters() {
        let repo = users().await;
        let rows = repo
            .query(&params(vec![("NULL_age", FilterValue::Null)]))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![5]);

        let rows = repo
            .query(&params(vec![("NOTEQ_organization", FilterValue::Null)]))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_in_filter() {
        let repo = users().await;
        let rows = repo
            .query(&params(vec![("IN_name", vec!["Ann", "Cid", "Zed"].into())]))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![1, 5]);

        let rows = repo
            .query(&params(vec![("IN_name", FilterValue::List(vec![]))]))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_boolean_filter() {
        let repo = users().await;
        let rows = repo
            .query(&params(vec![("EQ_active", FilterValue::Bool(false))]))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![2]);
    }

    #[tokio::test]
    async fn test_nested_filter() {
        let repo = users().await;
        let rows = repo
            .query(&params(vec![
                ("EQ_organization.name", FilterValue::from("Globex")),
                ("GT_age", FilterValue::Int(35)),
            ]))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![3]);
    }

    #[tokio::test]
    async fn test_query_sorted_by_nested_path() {
        let repo = users().await;
        let sort = Sort::from(Order::desc("organization.name")).and(Order::asc("id"));
        let rows = repo
            .query_sorted(&params(vec![("NOTNULL_organization", FilterValue::Null)]), &sort)
            .await
            .unwrap();
        let ordered: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ordered, vec![3, 4, 1, 2]);
    }

    #[tokio::test]
    async fn test_query_page() {
        let repo = users().await;
        let request = PageRequest::new(2, 2)
            .unwrap()
            .with_sort(Sort::from(Order::asc("id")));
        let page = repo.query_page(&SearchParams::new(), &request).await.unwrap();

        let ordered: Vec<i64> = page.content.iter().map(|r| r.id).collect();
        assert_eq!(ordered, vec![3, 4]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(page.has_previous());
    }

    #[tokio::test]
    async fn test_query_page_past_end() {
        let repo = users().await;
        let request = PageRequest::new(9, 2).unwrap();
        let page = repo.query_page(&SearchParams::new(), &request).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn test_count() {
        let repo = users().await;
        assert_eq!(repo.count(&SearchParams::new()).await.unwrap(), 5);
        assert_eq!(
            repo.count(&params(vec![("GTE_age", FilterValue::Int(30))]))
                .await
                .unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn test_count_agrees_with_list_length() {
        let repo = users().await;
        for search in [
            SearchParams::new(),
            params(vec![("GTE_age", FilterValue::Int(30))]),
            params(vec![("LIKE_name", FilterValue::from("off"))]),
            params(vec![
                ("EQ_organization.name", FilterValue::from("Acme")),
                ("EQ_active", FilterValue::Bool(true)),
            ]),
            params(vec![("IN_organization.name", vec!["Globex", "Initech"].into())]),
            params(vec![("IN_name", FilterValue::List(vec![]))]),
        ] {
            let rows = repo.query(&search).await.unwrap();
            let count = repo.count(&search).await.unwrap();
            assert_eq!(count, rows.len() as u64, "params {search:?}");
        }
    }

    #[tokio::test]
    async fn test_invalid_filters_never_reach_database() {
        let repo = users().await;
        repo.pool().close().await;

        for bad in [
            params(vec![("BETWEEN_age", FilterValue::Int(1))]),
            params(vec![("EQ_nickname", FilterValue::from("x"))]),
            params(vec![("GT_name", FilterValue::Int(1))]),
            params(vec![("IN_age", FilterValue::Int(1))]),
        ] {
            let err = repo.query(&bad).await.unwrap_err();
            assert!(err.is_query_error(), "unexpected error: {err}");
        }

        // Same plan against a closed pool fails in the backend instead
        let err = repo.query(&SearchParams::new()).await.unwrap_err();
        assert_eq!(err.backend(), "sqlite");
    }

    #[tokio::test]
    async fn test_records_over_join() {
        let repo: SqliteQueryRepository<Record> =
            SqliteQueryRepository::new(setup_test_pool().await, registry(), "users").unwrap();
        let rows = repo
            .query(&params(vec![("EQ_organization.name", FilterValue::from("Acme"))]))
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        // Only root columns are selected
        assert_eq!(
            rows[0].columns().collect::<Vec<_>>(),
            vec!["id", "name", "age", "active", "organization_id"]
        );
    }
}
