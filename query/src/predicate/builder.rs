//! Predicate builder
//!
//! Translates filter descriptors into a predicate tree against an entity schema.

use crate::constants::LIKE_ESCAPE_CHAR;
use crate::error::QueryError;
use crate::filter::{FilterDescriptor, FilterValue, Operator};
use crate::schema::{EntitySchema, SchemaRegistry};
use crate::utils::sql::escape_like_pattern;

use super::ast::{CompareOp, Predicate};
use super::path::{AttributePath, resolve_path};

/// Build the conjunction of all filters, in input order
///
/// An empty filter list yields a predicate matching every row.
pub fn build_predicate(
    registry: &SchemaRegistry,
    entity: &EntitySchema,
    filters: &[FilterDescriptor],
) -> Result<Predicate, QueryError> {
    let predicates = filters
        .iter()
        .map(|filter| {
            let path = resolve_path(registry, entity, filter.attribute_path())?;
            build_filter_predicate(path, filter)
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        entity = %entity.name,
        filters = predicates.len(),
        "Built search predicate"
    );
    Ok(Predicate::and(predicates))
}

fn build_filter_predicate(
    path: AttributePath,
    filter: &FilterDescriptor,
) -> Result<Predicate, QueryError> {
    let value = filter.value();
    let predicate = match filter.operator() {
        Operator::Eq if value.is_null() => Predicate::IsNull(path),
        Operator::NotEq if value.is_null() => Predicate::IsNotNull(path),
        Operator::Eq => compare(path, CompareOp::Eq, value),
        Operator::NotEq => compare(path, CompareOp::NotEq, value),
        Operator::Gt => ordering(path, CompareOp::Gt, value)?,
        Operator::Gte => ordering(path, CompareOp::Gte, value)?,
        Operator::Lt => ordering(path, CompareOp::Lt, value)?,
        Operator::Lte => ordering(path, CompareOp::Lte, value)?,
        Operator::Like => {
            let text = value
                .as_pattern_text()
                .filter(|_| path.column_type.accepts_like_operand(value))
                .ok_or_else(|| QueryError::InvalidLikeOperand {
                    path: path.path.clone(),
                    value_kind: value.kind_name(),
                    column_type: path.column_type.to_string(),
                })?;
            Predicate::Like {
                pattern: format!("%{}%", escape_like_pattern(&text, LIKE_ESCAPE_CHAR)),
                escape: LIKE_ESCAPE_CHAR,
                path,
            }
        }
        Operator::Null => Predicate::IsNull(path),
        Operator::NotNull => Predicate::IsNotNull(path),
        Operator::In => match value {
            FilterValue::List(items) => {
                if items.iter().any(|item| matches!(item, FilterValue::List(_))) {
                    return Err(QueryError::InvalidInOperand {
                        path: path.path,
                        value_kind: "nested list",
                    });
                }
                Predicate::In {
                    path,
                    values: items.clone(),
                }
            }
            other => {
                return Err(QueryError::InvalidInOperand {
                    path: path.path,
                    value_kind: other.kind_name(),
                });
            }
        },
    };
    Ok(predicate)
}

fn compare(path: AttributePath, op: CompareOp, value: &FilterValue) -> Predicate {
    Predicate::Compare {
        path,
        op,
        value: value.clone(),
    }
}

fn ordering(
    path: AttributePath,
    op: CompareOp,
    value: &FilterValue,
) -> Result<Predicate, QueryError> {
    if !path.column_type.is_orderable_with(value) {
        return Err(QueryError::NonComparableValue {
            path: path.path,
            value_kind: value.kind_name(),
            column_type: path.column_type.to_string(),
        });
    }
    Ok(compare(path, op, value))
}
