use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

use super::{Attribute, EntitySchema};

/// Registered entities by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "Vec<EntitySchema>", into = "Vec<EntitySchema>")]
pub struct SchemaRegistry {
    entities: BTreeMap<String, EntitySchema>,
}

impl SchemaRegistry {
    /// Register an entity, replacing any previous entity of the same name
    pub fn register(&mut self, entity: EntitySchema) {
        if self.entities.contains_key(&entity.name) {
            tracing::warn!(entity = %entity.name, "Replacing registered entity");
        }
        self.entities.insert(entity.name.clone(), entity);
    }

    pub fn get(&self, name: &str) -> Result<&EntitySchema, QueryError> {
        self.entities
            .get(name)
            .ok_or_else(|| QueryError::UnknownEntity {
                name: name.to_string(),
            })
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntitySchema> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Check that every relation points at a registered entity and column
    pub fn validate(&self) -> Result<(), QueryError> {
        for entity in self.entities.values() {
            if entity.table.trim().is_empty() {
                return Err(QueryError::InvalidSchema(format!(
                    "entity '{}' has no table",
                    entity.name
                )));
            }
            for (name, attribute) in &entity.attributes {
                let Attribute::Relation {
                    entity: target,
                    references,
                    ..
                } = attribute
                else {
                    continue;
                };
                let target_schema = self.entities.get(target).ok_or_else(|| {
                    QueryError::InvalidSchema(format!(
                        "relation '{}.{}' targets unknown entity '{}'",
                        entity.name, name, target
                    ))
                })?;
                if target_schema.column_type(references).is_none() {
                    return Err(QueryError::InvalidSchema(format!(
                        "relation '{}.{}' references unknown column '{}.{}'",
                        entity.name, name, target, references
                    )));
                }
            }
        }
        tracing::debug!(entities = self.entities.len(), "Schema registry validated");
        Ok(())
    }
}

impl From<Vec<EntitySchema>> for SchemaRegistry {
    fn from(entities: Vec<EntitySchema>) -> Self {
        let mut registry = SchemaRegistry::default();
        for entity in entities {
            registry.register(entity);
        }
        registry
    }
}

impl From<SchemaRegistry> for Vec<EntitySchema> {
    fn from(registry: SchemaRegistry) -> Self {
        registry.entities.into_values().collect()
    }
}
