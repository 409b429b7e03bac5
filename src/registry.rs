//! Schema registry: named schema storage and reference resolution.
//!
//! The registry is what makes [`RefSchema`](crate::RefSchema) indirection
//! work: schemas register under names, references resolve through the
//! registry during validation, and a depth limit bounds recursive chains.
//! It also drives whole-graph JSON Schema export with `$defs`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{json, Value};
use stillwater::Validation;

use crate::config::ParseOptions;
use crate::error::SchemaErrors;
use crate::schema::SchemaLike;
use crate::validation::{execute_in, ParseContext, ParseFault, RegistryAccess, DEFAULT_MAX_DEPTH};

type SchemaMap = Arc<RwLock<HashMap<String, Arc<dyn SchemaLike>>>>;

/// A thread-safe registry for storing and retrieving named schemas.
///
/// Multiple threads can validate concurrently (read access); registration
/// is serialized (write access). Clones share the same underlying storage.
///
/// # Example
///
/// ```rust
/// use scrutiny::{Schema, SchemaRegistry};
/// use serde_json::json;
///
/// let registry = SchemaRegistry::new();
/// registry.register("UserId", Schema::integer().positive()).unwrap();
/// registry.register("User", Schema::object()
///     .field("id", Schema::ref_("UserId"))
///     .field("name", Schema::string()),
/// ).unwrap();
///
/// let result = registry.validate("User", &json!({"id": 7, "name": "Ada"})).unwrap();
/// assert!(result.is_success());
/// ```
pub struct SchemaRegistry {
    schemas: SchemaMap,
    max_depth: usize,
}

impl SchemaRegistry {
    /// Creates a new empty registry with the default max depth.
    pub fn new() -> Self {
        Self {
            schemas: Arc::new(RwLock::new(HashMap::new())),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum reference depth for circular-reference prevention.
    /// Validation of a reference chain deeper than this reports an issue
    /// instead of recursing forever.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Registers a schema under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if the name is taken.
    pub fn register<S>(&self, name: impl Into<String>, schema: S) -> Result<(), RegistryError>
    where
        S: SchemaLike + 'static,
    {
        let name = name.into();
        let mut schemas = self.schemas.write();
        if schemas.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        schemas.insert(name, Arc::new(schema));
        Ok(())
    }

    /// Retrieves a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn SchemaLike>> {
        self.schemas.read().get(name).cloned()
    }

    /// Returns the names of references that do not resolve to a registered
    /// schema. Call after registration to check graph integrity.
    pub fn validate_refs(&self) -> Vec<String> {
        let schemas = self.schemas.read();
        let mut all_refs = Vec::new();
        for schema in schemas.values() {
            schema.collect_refs(&mut all_refs);
        }

        let mut unresolved: Vec<String> = all_refs
            .into_iter()
            .filter(|name| !schemas.contains_key(name))
            .collect();
        unresolved.sort();
        unresolved.dedup();
        unresolved
    }

    /// Validates a value against a named schema, with references resolved
    /// through this registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SchemaNotFound`] for an unknown name, and
    /// propagates faults (effectful schema reached synchronously,
    /// unmergeable intersection).
    pub fn validate(
        &self,
        schema_name: &str,
        value: &Value,
    ) -> Result<Validation<Value, SchemaErrors>, RegistryError> {
        self.run(schema_name, value, ParseContext::sync())
    }

    /// Effectful counterpart of [`SchemaRegistry::validate`]: schemas with
    /// effectful validators are permitted.
    pub fn validate_async(
        &self,
        schema_name: &str,
        value: &Value,
    ) -> Result<Validation<Value, SchemaErrors>, RegistryError> {
        self.run(schema_name, value, ParseContext::effectful())
    }

    fn run(
        &self,
        schema_name: &str,
        value: &Value,
        ctx: ParseContext,
    ) -> Result<Validation<Value, SchemaErrors>, RegistryError> {
        let schema = self
            .get(schema_name)
            .ok_or_else(|| RegistryError::SchemaNotFound(schema_name.to_string()))?;

        let ctx = ctx.with_registry(Arc::new(self.clone()), self.max_depth);
        Ok(execute_in(&*schema, value, &ctx, &ParseOptions::default())?)
    }

    /// Exports every registered schema as one JSON Schema document with
    /// all definitions under `$defs`.
    pub fn to_json_schema(&self) -> Value {
        let schemas = self.schemas.read();
        let mut defs = serde_json::Map::new();
        for (name, schema) in schemas.iter() {
            defs.insert(name.clone(), schema.to_json_schema());
        }
        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "$defs": defs,
        })
    }

    /// Exports one named schema as a standalone JSON Schema document that
    /// carries the full `$defs` table for its references. Returns `None`
    /// for an unknown name.
    pub fn export_schema(&self, name: &str) -> Option<Value> {
        let schema = self.get(name)?;
        let base = self.to_json_schema();

        let mut result = schema.to_json_schema();
        result["$schema"] = json!("https://json-schema.org/draft/2020-12/schema");
        result["$defs"] = base["$defs"].clone();
        Some(result)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SchemaRegistry {
    fn clone(&self) -> Self {
        Self {
            schemas: Arc::clone(&self.schemas),
            max_depth: self.max_depth,
        }
    }
}

impl RegistryAccess for SchemaRegistry {
    fn get_schema(&self, name: &str) -> Option<Arc<dyn SchemaLike>> {
        self.get(name)
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a schema with a name that already exists.
    #[error("schema '{0}' already registered")]
    DuplicateName(String),

    /// Attempted to validate with a schema name that doesn't exist.
    #[error("schema '{0}' not found")]
    SchemaNotFound(String),

    /// Validation hit a fault; see [`ParseFault`].
    #[error(transparent)]
    Fault(#[from] ParseFault),
}
