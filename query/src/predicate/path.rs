//! Attribute path resolution
//!
//! Walks a dotted path one segment at a time through the schema registry, collecting
//! the relation joins needed to reach the final column.

use crate::constants::NESTED_ATTRIBUTE_SEPARATOR;
use crate::error::QueryError;
use crate::schema::{Attribute, ColumnType, EntitySchema, SchemaRegistry};

/// Join through a to-one relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Relation path from the root (`user`, `user.organization`)
    pub path: String,
    /// Path of the joined entity holding the foreign key; `None` for the root
    pub parent: Option<String>,
    pub table: String,
    /// Foreign key column on the parent
    pub column: String,
    /// Referenced column on the joined table
    pub references: String,
}

/// A resolved attribute: the column to test and the joins leading to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    pub path: String,
    pub joins: Vec<Join>,
    /// Join path owning the column; `None` for the root table
    pub owner: Option<String>,
    pub column: String,
    pub column_type: ColumnType,
}

/// Resolve `path` starting from the `root` entity
///
/// A path ending on a relation resolves to the relation's foreign key column.
pub fn resolve_path(
    registry: &SchemaRegistry,
    root: &EntitySchema,
    path: &str,
) -> Result<AttributePath, QueryError> {
    let segments: Vec<&str> = path.split(NESTED_ATTRIBUTE_SEPARATOR).collect();
    let last = segments.len() - 1;

    let mut entity = root;
    let mut joins = Vec::new();
    let mut owner: Option<String> = None;

    for (i, segment) in segments.iter().copied().enumerate() {
        if segment.trim().is_empty() {
            return Err(QueryError::invalid_path(path, segment, "empty path segment"));
        }

        let attribute = entity.attribute(segment).ok_or_else(|| {
            QueryError::invalid_path(
                path,
                segment,
                format!("no such attribute on '{}'", entity.name),
            )
        })?;

        match attribute {
            Attribute::Column {
                column,
                column_type,
            } => {
                if i != last {
                    return Err(QueryError::invalid_path(
                        path,
                        segment,
                        format!("'{}' is a column of '{}', not a relation", segment, entity.name),
                    ));
                }
                return Ok(AttributePath {
                    path: path.to_string(),
                    joins,
                    owner,
                    column: column.clone(),
                    column_type: *column_type,
                });
            }
            Attribute::Relation {
                entity: target,
                column,
                references,
            } => {
                let target_schema = registry.get(target).map_err(|_| {
                    QueryError::invalid_path(
                        path,
                        segment,
                        format!("relation target '{}' is not registered", target),
                    )
                })?;

                if i == last {
                    let column_type = target_schema.column_type(references).ok_or_else(|| {
                        QueryError::invalid_path(
                            path,
                            segment,
                            format!("referenced column '{}.{}' is not declared", target, references),
                        )
                    })?;
                    return Ok(AttributePath {
                        path: path.to_string(),
                        joins,
                        owner,
                        column: column.clone(),
                        column_type,
                    });
                }

                let join_path = segments[..=i].join(".");
                joins.push(Join {
                    path: join_path.clone(),
                    parent: owner.take(),
                    table: target_schema.table.clone(),
                    column: column.clone(),
                    references: references.clone(),
                });
                owner = Some(join_path);
                entity = target_schema;
            }
        }
    }

    Err(QueryError::invalid_path(path, path, "empty attribute path"))
}
