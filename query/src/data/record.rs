//! Schema-less row type
//!
//! Decodes any result row into ordered column/value pairs, so callers that know the
//! entity only through the registry (the CLI, for one) can still query it. Binary values
//! come out as hex text; PostgreSQL types with no `FilterValue` counterpart come out null.

use serde::Serialize;
use serde::ser::SerializeMap;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, FromRow, Row, TypeInfo, ValueRef};

use crate::filter::FilterValue;

/// One result row as column/value pairs, in select order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FilterValue)>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&FilterValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FilterValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FilterValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Record {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let mut fields = Vec::with_capacity(row.columns().len());
        for column in row.columns() {
            let index = column.ordinal();
            let raw = row.try_get_raw(index)?;
            let value = if raw.is_null() {
                FilterValue::Null
            } else {
                // Declared type wins for booleans, storage class for everything else
                let declared = column.type_info().name().to_ascii_uppercase();
                let storage = raw.type_info().name().to_ascii_uppercase();
                match (declared.as_str(), storage.as_str()) {
                    ("BOOLEAN", "INTEGER") => FilterValue::Bool(row.try_get(index)?),
                    (_, "INTEGER") => FilterValue::Int(row.try_get(index)?),
                    (_, "REAL") => FilterValue::Float(row.try_get(index)?),
                    (_, "BLOB") => {
                        FilterValue::Text(hex::encode(row.try_get::<Vec<u8>, _>(index)?))
                    }
                    _ => {
                        let bytes: &[u8] = row.try_get_unchecked(index)?;
                        FilterValue::Text(String::from_utf8_lossy(bytes).into_owned())
                    }
                }
            };
            fields.push((column.name().to_string(), value));
        }
        Ok(Self { fields })
    }
}

impl<'r> FromRow<'r, PgRow> for Record {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let mut fields = Vec::with_capacity(row.columns().len());
        for column in row.columns() {
            let index = column.ordinal();
            let value: Option<FilterValue> = match column.type_info().name() {
                "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(FilterValue::Bool),
                "INT2" => row
                    .try_get::<Option<i16>, _>(index)?
                    .map(|v| FilterValue::Int(v.into())),
                "INT4" => row
                    .try_get::<Option<i32>, _>(index)?
                    .map(|v| FilterValue::Int(v.into())),
                "INT8" => row.try_get::<Option<i64>, _>(index)?.map(FilterValue::Int),
                "FLOAT4" => row
                    .try_get::<Option<f32>, _>(index)?
                    .map(|v| FilterValue::Float(v.into())),
                "FLOAT8" => row.try_get::<Option<f64>, _>(index)?.map(FilterValue::Float),
                "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" => row
                    .try_get::<Option<String>, _>(index)?
                    .map(FilterValue::Text),
                "BYTEA" => row
                    .try_get::<Option<Vec<u8>>, _>(index)?
                    .map(|bytes| FilterValue::Text(hex::encode(bytes))),
                other => {
                    if !row.try_get_raw(index)?.is_null() {
                        tracing::warn!(
                            column = %column.name(),
                            column_type = %other,
                            "Unsupported column type, value reported as null"
                        );
                    }
                    None
                }
            };
            fields.push((
                column.name().to_string(),
                value.unwrap_or(FilterValue::Null),
            ));
        }
        Ok(Self { fields })
    }
}
