//! Paths locating values inside nested JSON structures.
//!
//! Every issue produced during validation carries a [`JsonPath`] rooted at
//! the top-level input. Paths are built from [`PathSegment`]s (field access
//! or array index) and render in dot-path form, e.g. `users[0].email`.

use std::fmt::{self, Display};

/// A segment of a JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A field/property access (e.g. `user`, `email`).
    Field(String),
    /// An array index access (e.g. `[0]`, `[42]`).
    Index(usize),
}

impl PathSegment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }

    /// The string form used as a bucket key by error flattening: the field
    /// name itself, or the decimal index.
    pub fn key_string(&self) -> String {
        match self {
            PathSegment::Field(name) => name.clone(),
            PathSegment::Index(idx) => idx.to_string(),
        }
    }
}

/// A path to a value in a nested JSON-like structure.
///
/// Paths are immutable; `push_field`/`push_index` return extended copies, so
/// a parent path can be shared across sibling validations.
///
/// # Example
///
/// ```rust
/// use scrutiny::JsonPath;
///
/// let path = JsonPath::root()
///     .push_field("users")
///     .push_index(0)
///     .push_field("email");
///
/// assert_eq!(path.to_dot_path(), "users[0].email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Creates an empty path representing the root value.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from a single field segment.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Creates a path from a single index segment.
    pub fn from_index(idx: usize) -> Self {
        Self {
            segments: vec![PathSegment::Index(idx)],
        }
    }

    /// Returns a new path with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));
        Self { segments }
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the first segment, or None if this is root.
    ///
    /// Error flattening buckets issues by this segment.
    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.first()
    }

    /// Returns the last segment, or None if this is root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Returns the parent path (all segments except the last), or None if
    /// this is root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Renders this path in dot-path display form.
    ///
    /// Field names that are not bare identifiers are bracketed and quoted,
    /// so the rendering is unambiguous for display purposes:
    ///
    /// ```rust
    /// use scrutiny::JsonPath;
    ///
    /// let path = JsonPath::root().push_field("user data").push_index(3);
    /// assert_eq!(path.to_dot_path(), r#"["user data"][3]"#);
    /// ```
    pub fn to_dot_path(&self) -> String {
        self.to_string()
    }
}

/// True if `name` can be rendered without bracket-quoting.
fn is_bare_key(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if is_bare_key(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Field(name) => {
                    write!(f, "[\"{}\"]", name.replace('"', "\\\""))?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_is_empty() {
        let path = JsonPath::root();
        assert!(path.is_root());
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_single_field() {
        let path = JsonPath::root().push_field("user");
        assert_eq!(path.to_string(), "user");
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_single_index() {
        let path = JsonPath::root().push_index(0);
        assert_eq!(path.to_string(), "[0]");
    }

    #[test]
    fn test_nested_fields() {
        let path = JsonPath::root().push_field("user").push_field("email");
        assert_eq!(path.to_string(), "user.email");
    }

    #[test]
    fn test_complex_path() {
        let path = JsonPath::root()
            .push_field("users")
            .push_index(0)
            .push_field("email");
        assert_eq!(path.to_string(), "users[0].email");
    }

    #[test]
    fn test_non_identifier_key_is_quoted() {
        let path = JsonPath::root().push_field("a").push_field("b c");
        assert_eq!(path.to_string(), r#"a["b c"]"#);

        let path = JsonPath::root().push_field("0day");
        assert_eq!(path.to_string(), r#"["0day"]"#);
    }

    #[test]
    fn test_quote_escaping() {
        let path = JsonPath::root().push_field(r#"say "hi""#);
        assert_eq!(path.to_string(), r#"["say \"hi\""]"#);
    }

    #[test]
    fn test_path_immutability() {
        let base = JsonPath::root().push_field("users");
        let path_a = base.push_index(0);
        let path_b = base.push_index(1);

        assert_eq!(base.to_string(), "users");
        assert_eq!(path_a.to_string(), "users[0]");
        assert_eq!(path_b.to_string(), "users[1]");
    }

    #[test]
    fn test_parent_and_last() {
        let path = JsonPath::root()
            .push_field("users")
            .push_index(0)
            .push_field("email");

        assert_eq!(path.last(), Some(&PathSegment::Field("email".to_string())));
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "users[0]");
        assert!(JsonPath::root().parent().is_none());
    }

    #[test]
    fn test_first_segment_key_string() {
        let path = JsonPath::root().push_field("items").push_index(2);
        assert_eq!(path.first().unwrap().key_string(), "items");

        let path = JsonPath::root().push_index(7);
        assert_eq!(path.first().unwrap().key_string(), "7");
    }
}
