//! Model Metadata - field and association definitions supplied by the host
//!
//! The criteria parser only needs to know, per model, which fields exist,
//! what type their values have, and which of them point at another model.

pub mod definition;
pub mod registry;

pub use definition::{FieldDefinition, FieldType, ModelDefinition};
pub use registry::{ModelMetadataProvider, ModelRegistry};
