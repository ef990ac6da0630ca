//! Model Registry - lookup of model definitions by name

use std::collections::HashMap;

use super::definition::ModelDefinition;

/// Source of model metadata, implemented by whatever owns the schema
pub trait ModelMetadataProvider: Send + Sync {
    /// Field metadata for `model_name`, if the model is known
    fn fields_of(&self, model_name: &str) -> Option<&ModelDefinition>;
}

/// In-memory registry of model definitions
///
/// Names are matched case-insensitively, so `Training` and `training`
/// resolve to the same definition.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelDefinition>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model, replacing any previous definition with the same name
    pub fn register(&mut self, definition: ModelDefinition) -> &mut Self {
        tracing::debug!(
            model = %definition.name,
            fields = definition.fields.len(),
            "Registering model metadata"
        );
        self.models
            .insert(definition.name.to_lowercase(), definition);
        self
    }

    /// Builder-style registration
    pub fn with_model(mut self, definition: ModelDefinition) -> Self {
        self.register(definition);
        self
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Names of all registered models
    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.values().map(|m| m.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl ModelMetadataProvider for ModelRegistry {
    fn fields_of(&self, model_name: &str) -> Option<&ModelDefinition> {
        self.models.get(&model_name.to_lowercase())
    }
}
