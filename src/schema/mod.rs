//! Schema definitions for validation.
//!
//! Each schema type validates one structural shape and accumulates all
//! issues rather than short-circuiting on the first failure. [`Schema`] is
//! the factory; builder methods on the returned types attach constraints,
//! and [`SchemaExt`] layers wrappers (optional, default, catch, pipes,
//! refinements) over any schema.
//!
//! # Example
//!
//! ```rust
//! use scrutiny::{JsonPath, Schema, SchemaExt, SchemaLike};
//! use serde_json::json;
//!
//! let user = Schema::object()
//!     .field("name", Schema::string().min_len(1))
//!     .field("age", Schema::integer().non_negative())
//!     .field("role", Schema::string().default_to(json!("member")));
//!
//! let result = user.validate(&json!({"name": "Ada", "age": 36}), &JsonPath::root());
//! assert!(result.is_success());
//! ```

mod array;
mod custom;
mod intersection;
mod literal;
mod numeric;
mod object;
mod pipe;
mod primitive;
mod record;
mod ref_schema;
mod set;
mod string;
mod traits;
mod tuple;
mod union;
mod wrappers;

pub use array::ArraySchema;
pub use custom::{CustomSchema, RefinedSchema};
pub use intersection::IntersectionSchema;
pub use literal::{EnumSchema, LiteralSchema};
pub use numeric::{IntegerSchema, NumberSchema};
pub use object::ObjectSchema;
pub use pipe::{PipeSchema, TransformSchema};
pub use primitive::{AnySchema, BooleanSchema, NullSchema};
pub use record::{MapSchema, RecordSchema};
pub use ref_schema::RefSchema;
pub use set::SetSchema;
pub use string::StringSchema;
pub use traits::{SchemaExt, SchemaHandle, SchemaLike};
pub use tuple::TupleSchema;
pub use union::{DefinitionError, DiscriminatedUnionSchema, UnionSchema};
pub use wrappers::{
    CatchContext, CatchSchema, DefaultSchema, NonOptionalSchema, NullableSchema, OptionalSchema,
    PrefaultSchema,
};

use serde_json::Value;

use crate::checks::RefineCtx;

/// Entry point for creating validation schemas.
///
/// # Example
///
/// ```rust
/// use scrutiny::Schema;
///
/// let username = Schema::string().trim().min_len(3).max_len(32);
/// let port = Schema::integer().range(1..=65535);
/// ```
pub struct Schema;

impl Schema {
    /// Creates a new string schema.
    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    /// Creates a new integer schema (floats are rejected).
    pub fn integer() -> IntegerSchema {
        IntegerSchema::new()
    }

    /// Creates a new number schema (integer or float).
    pub fn number() -> NumberSchema {
        NumberSchema::new()
    }

    /// Creates a new boolean schema.
    pub fn boolean() -> BooleanSchema {
        BooleanSchema::new()
    }

    /// Creates a schema accepting exactly `null`.
    pub fn null() -> NullSchema {
        NullSchema::new()
    }

    /// Creates a schema accepting any value.
    pub fn any() -> AnySchema {
        AnySchema::new()
    }

    /// Creates a schema accepting exactly one literal value.
    pub fn literal(value: impl Into<Value>) -> LiteralSchema {
        LiteralSchema::new(value)
    }

    /// Creates a schema accepting one of a finite set of literals.
    pub fn enumeration(values: impl IntoIterator<Item = impl Into<Value>>) -> EnumSchema {
        EnumSchema::new(values)
    }

    /// Creates a new array schema with a uniform element type.
    pub fn array(element: impl SchemaLike + 'static) -> ArraySchema {
        ArraySchema::new(element)
    }

    /// Creates an empty tuple schema; add positions with
    /// [`TupleSchema::item`].
    pub fn tuple() -> TupleSchema {
        TupleSchema::new()
    }

    /// Creates a set schema: an array validated membership-wise and
    /// deduplicated.
    pub fn set(element: impl SchemaLike + 'static) -> SetSchema {
        SetSchema::new(element)
    }

    /// Creates a new object schema.
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    /// Creates a record schema: an object with uniform keys and values.
    pub fn record(
        key: impl SchemaLike + 'static,
        value: impl SchemaLike + 'static,
    ) -> RecordSchema {
        RecordSchema::new(key, value)
    }

    /// Creates a map schema over `[key, value]` entry pairs.
    pub fn map(key: impl SchemaLike + 'static, value: impl SchemaLike + 'static) -> MapSchema {
        MapSchema::new(key, value)
    }

    /// Creates an empty union; add alternatives with
    /// [`UnionSchema::option`].
    pub fn union() -> UnionSchema {
        UnionSchema::new()
    }

    /// Creates a discriminated union dispatching on `key`; add object
    /// options with [`DiscriminatedUnionSchema::option`].
    pub fn discriminated_union(key: impl Into<String>) -> DiscriminatedUnionSchema {
        DiscriminatedUnionSchema::new(key)
    }

    /// Creates an intersection of two schemas.
    pub fn intersection(
        left: impl SchemaLike + 'static,
        right: impl SchemaLike + 'static,
    ) -> IntersectionSchema {
        IntersectionSchema::new(left, right)
    }

    /// Wraps a schema in optional semantics.
    pub fn optional(inner: impl SchemaLike + 'static) -> OptionalSchema {
        OptionalSchema::new(inner)
    }

    /// Wraps a schema in nullable semantics.
    pub fn nullable(inner: impl SchemaLike + 'static) -> NullableSchema {
        NullableSchema::new(inner)
    }

    /// Creates a schema from a custom predicate.
    pub fn custom(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> CustomSchema {
        CustomSchema::new(test)
    }

    /// Creates a standalone transform schema.
    pub fn transform(
        f: impl Fn(Value, &mut RefineCtx) -> Value + Send + Sync + 'static,
    ) -> TransformSchema {
        TransformSchema::new(f)
    }

    /// Creates a reference to a named schema in a registry.
    pub fn ref_(name: impl Into<String>) -> RefSchema {
        RefSchema::new(name)
    }
}
