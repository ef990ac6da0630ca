//! Model and field definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage type of a model field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Json,
}

impl FieldType {
    /// Human readable description used in rejection messages
    pub fn expected(self) -> &'static str {
        match self {
            FieldType::String | FieldType::Text => "a string",
            FieldType::Integer => "an integer",
            FieldType::Float => "a number",
            FieldType::Boolean => "true or false",
            FieldType::Date => "a date (YYYY-MM-DD)",
            FieldType::DateTime => "an RFC 3339 timestamp",
            FieldType::Json => "a JSON document",
        }
    }
}

/// A single field on a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Type of the column stored on the model's own table
    pub field_type: FieldType,
    /// Target model when the field references another entity
    pub association: Option<String>,
}

impl FieldDefinition {
    /// Create a scalar field
    pub fn scalar(field_type: FieldType) -> Self {
        Self {
            field_type,
            association: None,
        }
    }

    /// Create an association to `target_model`, keyed by an integer id
    pub fn association<S: Into<String>>(target_model: S) -> Self {
        Self {
            field_type: FieldType::Integer,
            association: Some(target_model.into()),
        }
    }

    /// Override the key type of an association
    pub fn keyed_by(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn is_association(&self) -> bool {
        self.association.is_some()
    }

    pub fn target_model(&self) -> Option<&str> {
        self.association.as_deref()
    }
}

/// Field metadata for one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Model name as used by the host application
    pub name: String,
    /// Table the model is stored in (lowercased model name by default)
    pub table: String,
    /// Primary key column referenced by association joins
    pub primary_key: String,
    pub fields: HashMap<String, FieldDefinition>,
}

impl ModelDefinition {
    /// Create an empty definition for `name`
    pub fn new<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        Self {
            table: name.to_lowercase(),
            name,
            primary_key: "id".to_string(),
            fields: HashMap::new(),
        }
    }

    /// Add a scalar field
    pub fn field<S: Into<String>>(mut self, name: S, field_type: FieldType) -> Self {
        self.fields
            .insert(name.into(), FieldDefinition::scalar(field_type));
        self
    }

    /// Add an association field pointing at `target_model`
    pub fn association<S: Into<String>, T: Into<String>>(mut self, name: S, target_model: T) -> Self {
        self.fields
            .insert(name.into(), FieldDefinition::association(target_model));
        self
    }

    /// Add a fully specified field
    pub fn with_field<S: Into<String>>(mut self, name: S, definition: FieldDefinition) -> Self {
        self.fields.insert(name.into(), definition);
        self
    }

    pub fn with_table<S: Into<String>>(mut self, table: S) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_primary_key<S: Into<String>>(mut self, primary_key: S) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    /// Look up a field by name
    pub fn get(&self, field: &str) -> Option<&FieldDefinition> {
        self.fields.get(field)
    }

    /// Whether the model has a field (scalar or association) called `field`
    pub fn has_field(&self, field: &str) -> bool {
        field == self.primary_key || self.fields.contains_key(field)
    }

    /// Iterate over association fields
    pub fn associations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter_map(|(name, definition)| {
            definition
                .target_model()
                .map(|target| (name.as_str(), target))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_definition_builder() {
        let training = ModelDefinition::new("Training")
            .field("title", FieldType::String)
            .field("startDate", FieldType::Date)
            .association("company", "company");

        assert_eq!(training.table, "training");
        assert_eq!(training.primary_key, "id");
        assert!(training.has_field("title"));
        assert!(training.has_field("id"));
        assert!(!training.has_field("colour"));

        let company = training.get("company").unwrap();
        assert!(company.is_association());
        assert_eq!(company.target_model(), Some("company"));
        assert_eq!(company.field_type, FieldType::Integer);
    }

    #[test]
    fn test_associations_iterator() {
        let presence = ModelDefinition::new("trainingpresence")
            .field("presence", FieldType::Boolean)
            .association("user", "user")
            .association("trainingDate", "trainingdate");

        let mut associations: Vec<_> = presence.associations().collect();
        associations.sort();
        assert_eq!(
            associations,
            vec![("trainingDate", "trainingdate"), ("user", "user")]
        );
    }

    #[test]
    fn test_uuid_keyed_association() {
        let definition = FieldDefinition::association("company").keyed_by(FieldType::String);
        assert_eq!(definition.field_type, FieldType::String);
        assert!(definition.is_association());
    }

    #[test]
    fn test_definition_deserializes() {
        let json = serde_json::json!({
            "name": "training",
            "table": "training",
            "primary_key": "id",
            "fields": {
                "title": { "field_type": "string", "association": null },
                "company": { "field_type": "integer", "association": "company" }
            }
        });

        let definition: ModelDefinition = serde_json::from_value(json).unwrap();
        assert!(definition.get("company").unwrap().is_association());
        assert_eq!(definition.get("title").unwrap().field_type, FieldType::String);
    }
}
