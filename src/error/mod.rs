//! Validation error types: the issue model and the aggregate error object.

mod issue;
mod schema_error;

pub use issue::{type_name, Issue, IssueKind};
pub use schema_error::{ErrorTree, FlattenedErrors, SchemaErrors};
