//! # Scrutiny
//!
//! A runtime schema-validation engine: declarative schemas are executed
//! against arbitrary JSON input, accumulating ALL issues — with full paths
//! into nested structures — rather than short-circuiting on the first
//! failure, and optionally transforming values along the way.
//!
//! ## Overview
//!
//! A schema is a typed validator: a type-specific structural check plus a
//! list of composable [`checks::Check`]s run in attachment order. Composite
//! schemas (objects, arrays, unions, tuples, records, intersections)
//! recursively run their children and merge values and issues, prefixing
//! issue paths so every failure is located relative to the top-level input.
//! Wrapper schemas (optional, nullable, default, prefault, catch) govern
//! how absent and null values flow through.
//!
//! Failures accumulate as data: a failed parse yields one [`SchemaErrors`]
//! holding ordered [`Issue`]s, projectable into flat per-field buckets
//! ([`SchemaErrors::flatten`]) or a shape-mirroring tree
//! ([`SchemaErrors::treeify`]). Messages resolve lazily through the
//! configured formatter chain when the error object is built, never at
//! issue-push time.
//!
//! ## Core Types
//!
//! - [`Schema`]: factory for every schema type
//! - [`SchemaLike`]: the trait all schemas implement; carries the parse
//!   entry points (`parse`, `safe_parse`, `parse_async`, ...)
//! - [`JsonPath`]: paths to values in nested structures (`users[0].email`)
//! - [`Issue`] / [`SchemaErrors`]: one failure / the aggregate error
//! - [`SchemaRegistry`]: named schemas, references, recursion
//!
//! ## Example
//!
//! ```rust
//! use scrutiny::{Schema, SchemaExt, SchemaLike};
//! use serde_json::json;
//!
//! let signup = Schema::object()
//!     .field("email", Schema::string().trim().email())
//!     .field("age", Schema::integer().min(13))
//!     .field("plan", Schema::string().default_to(json!("free")));
//!
//! let parsed = signup
//!     .parse(&json!({"email": " ada@example.com ", "age": 36}))
//!     .unwrap();
//! assert_eq!(parsed["email"], json!("ada@example.com"));
//! assert_eq!(parsed["plan"], json!("free"));
//!
//! // two issues, each at its field path, none short-circuited
//! let err = signup.parse(&json!({"email": "nope", "age": 9})).unwrap_err();
//! assert!(matches!(err, scrutiny::ParseError::Invalid(_)));
//! ```

pub mod checks;
pub mod config;
pub mod error;
pub mod interop;
pub mod path;
pub mod registry;
pub mod schema;
pub mod validation;

pub use checks::{Bag, Check, RefineCtx};
pub use config::{configure, global_config, reset_config, Config, MessageFn, ParseOptions};
pub use error::{ErrorTree, FlattenedErrors, Issue, IssueKind, SchemaErrors};
pub use interop::ToJsonSchema;
pub use path::{JsonPath, PathSegment};
pub use registry::{RegistryError, SchemaRegistry};
pub use schema::{
    AnySchema, ArraySchema, BooleanSchema, CatchContext, CatchSchema, CustomSchema,
    DefaultSchema, DefinitionError, DiscriminatedUnionSchema, EnumSchema, IntegerSchema,
    IntersectionSchema, LiteralSchema, MapSchema, NonOptionalSchema, NullSchema, NullableSchema,
    NumberSchema, ObjectSchema, OptionalSchema, PipeSchema, PrefaultSchema, RecordSchema,
    RefSchema, RefinedSchema, Schema, SchemaExt, SchemaHandle, SchemaLike, SetSchema,
    StringSchema, TransformSchema, TupleSchema, UnionSchema,
};
pub use validation::{ParseContext, ParseError, ParseFault, Payload, RegistryAccess};

/// Type alias for validation results using SchemaErrors.
pub type ValidationResult<T> = stillwater::Validation<T, SchemaErrors>;
