//! The aggregate error object and its UI-facing projections.
//!
//! A failed parse produces exactly one [`SchemaErrors`]: a non-empty,
//! ordered collection of finalized [`Issue`]s. Ordinary validation failures
//! never surface as separate exceptions; they accumulate here as data.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use indexmap::IndexMap;
use stillwater::prelude::*;

use crate::config::MessageResolver;
use crate::error::Issue;
use crate::path::{JsonPath, PathSegment};

/// A non-empty collection of finalized validation issues.
///
/// Wraps a `NonEmptyVec<Issue>` so a failure always carries at least one
/// issue, as `Validation<T, SchemaErrors>` requires. Issue order follows
/// path construction order: declaration order within a schema, attachment
/// order within a check list.
///
/// # Combining
///
/// `SchemaErrors` implements `Semigroup`, so failures from independent
/// validations can be merged:
///
/// ```rust
/// use scrutiny::{Issue, JsonPath, SchemaErrors};
/// use stillwater::prelude::*;
///
/// let a = SchemaErrors::single(Issue::invalid_type(
///     "string", None, JsonPath::root().push_field("name"),
/// ));
/// let b = SchemaErrors::single(Issue::invalid_type(
///     "number", None, JsonPath::root().push_field("age"),
/// ));
///
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaErrors(NonEmptyVec<Issue>);

impl SchemaErrors {
    /// Creates a `SchemaErrors` containing a single issue, finalized with
    /// the current global configuration.
    pub fn single(issue: Issue) -> Self {
        Self::from_vec(vec![issue])
    }

    /// Creates a `SchemaErrors` from a vec of issues, finalized with the
    /// current global configuration.
    ///
    /// # Panics
    ///
    /// Panics if the provided vec is empty.
    pub fn from_vec(issues: Vec<Issue>) -> Self {
        Self::finalize(issues, &MessageResolver::new(None))
    }

    /// Finalizes raw issues into an error object: resolves every missing
    /// message through the formatter chain and applies input stripping.
    pub(crate) fn finalize(mut issues: Vec<Issue>, resolver: &MessageResolver) -> Self {
        for issue in &mut issues {
            issue.finalize(resolver);
        }
        Self(NonEmptyVec::from_vec(issues).expect("SchemaErrors requires at least one issue"))
    }

    /// Returns the number of issues in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns false since this collection is guaranteed non-empty.
    pub fn is_empty(&self) -> bool {
        false // NonEmptyVec is never empty
    }

    /// Returns an iterator over the contained issues.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    /// Returns the first issue in the collection.
    pub fn first(&self) -> &Issue {
        self.0.head()
    }

    /// Returns all issues at the specified path.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&Issue> {
        self.0.iter().filter(|i| &i.path == path).collect()
    }

    /// Returns all issues with the specified code (e.g. `"too_small"`).
    pub fn with_code(&self, code: &str) -> Vec<&Issue> {
        self.0.iter().filter(|i| i.code() == code).collect()
    }

    /// Appends one issue, finalizing it with the current global
    /// configuration. Used by custom refinement callbacks; the collection
    /// is otherwise immutable after construction.
    pub fn push(&mut self, issue: Issue) {
        let addition = SchemaErrors::single(issue);
        self.0 = self.0.clone().combine(addition.0);
    }

    /// Appends several issues; see [`SchemaErrors::push`].
    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        for issue in issues {
            self.push(issue);
        }
    }

    /// Converts this collection into a `Vec<Issue>`.
    pub fn into_vec(self) -> Vec<Issue> {
        self.0.into_vec()
    }

    /// Buckets issues by their top-level path segment.
    ///
    /// Root-level issues (empty path) land in `form_errors`; everything
    /// else lands in `field_errors` under the stringified first segment.
    /// Field order follows first occurrence.
    pub fn flatten(&self) -> FlattenedErrors {
        let mut flattened = FlattenedErrors::default();
        for issue in self.iter() {
            match issue.path.first() {
                None => flattened.form_errors.push(issue.message()),
                Some(segment) => flattened
                    .field_errors
                    .entry(segment.key_string())
                    .or_default()
                    .push(issue.message()),
            }
        }
        flattened
    }

    /// Projects issues into a tree mirroring the input's shape.
    ///
    /// Each node carries the messages of issues terminating there, plus
    /// child nodes under `properties` (object keys) and `items` (array
    /// indices).
    pub fn treeify(&self) -> ErrorTree {
        let mut root = ErrorTree::default();
        for issue in self.iter() {
            let segments: Vec<&PathSegment> = issue.path.segments().collect();
            root.insert(&segments, issue.message());
        }
        root
    }
}

impl Semigroup for SchemaErrors {
    fn combine(self, other: Self) -> Self {
        SchemaErrors(self.0.combine(other.0))
    }
}

impl Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} issue(s):", self.len())?;
        for (i, issue) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

impl IntoIterator for SchemaErrors {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a SchemaErrors {
    type Item = &'a Issue;
    type IntoIter = Box<dyn Iterator<Item = &'a Issue> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

// SchemaErrors only contains Issue, which is Send + Sync.
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<SchemaErrors>();
    assert_sync::<SchemaErrors>();
};

/// The flat projection of an error: root-level messages plus per-field
/// message lists, bucketed by top-level key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedErrors {
    /// Messages of issues with an empty path.
    pub form_errors: Vec<String>,
    /// Messages of issues bucketed by their first path segment.
    pub field_errors: IndexMap<String, Vec<String>>,
}

/// The tree projection of an error: messages at each node, children keyed
/// by object property or array index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorTree {
    /// Messages of issues terminating at this node.
    pub errors: Vec<String>,
    /// Child nodes for object properties.
    pub properties: IndexMap<String, ErrorTree>,
    /// Child nodes for array elements.
    pub items: BTreeMap<usize, ErrorTree>,
}

impl ErrorTree {
    fn insert(&mut self, segments: &[&PathSegment], message: String) {
        match segments.first() {
            None => self.errors.push(message),
            Some(PathSegment::Field(name)) => self
                .properties
                .entry(name.clone())
                .or_default()
                .insert(&segments[1..], message),
            Some(PathSegment::Index(idx)) => self
                .items
                .entry(*idx)
                .or_default()
                .insert(&segments[1..], message),
        }
    }

    /// True when no issues terminate at or below this node.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.properties.is_empty() && self.items.is_empty()
    }
}
