//! Entity schema registry
//!
//! Explicit per-entity attribute registry used to resolve filter and sort paths.
//! Entities declare their columns and to-one relations; nested paths such as
//! `user.organization.name` are resolved by looking up one attribute per segment.
//!
//! Registries are built in code with the [`EntitySchema`] builder or deserialized
//! from JSON config, and should be validated once at startup.

mod registry;

pub use registry::SchemaRegistry;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::FilterValue;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Boolean,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
        }
    }

    /// Whether `value` can be ordered against a column of this type
    pub fn is_orderable_with(&self, value: &FilterValue) -> bool {
        matches!(
            (self, value),
            (
                ColumnType::Integer | ColumnType::Real,
                FilterValue::Int(_) | FilterValue::Float(_)
            ) | (ColumnType::Text, FilterValue::Text(_))
                | (ColumnType::Boolean, FilterValue::Bool(_))
        )
    }

    /// Whether `value` can be LIKE-matched against the text form of this column
    ///
    /// Boolean and real columns cast to text differently per backend, so booleans take
    /// no operand and reals take only text.
    pub fn accepts_like_operand(&self, value: &FilterValue) -> bool {
        match self {
            ColumnType::Text | ColumnType::Integer => {
                !matches!(value, FilterValue::Null | FilterValue::List(_))
            }
            ColumnType::Real => matches!(value, FilterValue::Text(_)),
            ColumnType::Boolean => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named attribute of an entity
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attribute {
    /// Plain column on the entity table
    Column {
        column: String,
        #[serde(rename = "type")]
        column_type: ColumnType,
    },
    /// To-one relation: `column` on this table references `references` on `entity`
    Relation {
        entity: String,
        column: String,
        references: String,
    },
}

/// Table-backed entity with its filterable attributes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntitySchema {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add a column whose name matches the attribute name
    pub fn column(self, name: &str, column_type: ColumnType) -> Self {
        self.column_as(name, name, column_type)
    }

    /// Add an attribute backed by a differently named column
    pub fn column_as(mut self, name: &str, column: &str, column_type: ColumnType) -> Self {
        self.attributes.insert(
            name.to_string(),
            Attribute::Column {
                column: column.to_string(),
                column_type,
            },
        );
        self
    }

    /// Add a to-one relation to another registered entity
    pub fn relation(mut self, name: &str, entity: &str, column: &str, references: &str) -> Self {
        self.attributes.insert(
            name.to_string(),
            Attribute::Relation {
                entity: entity.to_string(),
                column: column.to_string(),
                references: references.to_string(),
            },
        );
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Type of a physical column declared on this entity
    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.attributes.values().find_map(|attr| match attr {
            Attribute::Column {
                column: c,
                column_type,
            } if c == column => Some(*column_type),
            _ => None,
        })
    }
}
