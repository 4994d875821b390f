//! Source-side references to other NetBox objects
//!
//! An assignment list on the source holds either bare identifiers or nested
//! objects carrying a natural key. Both are captured by [`Reference`] so the
//! resolver never inspects raw JSON shapes.

use serde_json::Value;

/// One element of a source assignment list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Bare numeric id
    Id(i64),
    /// Bare string identifier, used verbatim as a lookup term
    Key(String),
    /// Nested object identified by slug, name or source id
    Named {
        /// Slug of the referenced object
        slug: Option<String>,
        /// Name of the referenced object
        name: Option<String>,
        /// Source-instance id (not meaningful on the destination)
        id: Option<i64>,
    },
}

impl Reference {
    /// Build a reference from one raw list element
    ///
    /// Returns `None` for shapes that cannot identify anything
    /// (null, booleans, floats, arrays).
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Id),
            Value::String(s) => Some(Self::Key(s.clone())),
            Value::Object(map) => {
                let text = |key: &str| {
                    map.get(key)
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_owned)
                };
                Some(Self::Named {
                    slug: text("slug"),
                    name: text("name"),
                    id: map.get("id").and_then(Value::as_i64),
                })
            }
            _ => None,
        }
    }

    /// Named reference carrying only a slug
    #[inline]
    #[must_use]
    pub fn slug(slug: impl Into<String>) -> Self {
        Self::Named {
            slug: Some(slug.into()),
            name: None,
            id: None,
        }
    }

    /// Named reference carrying only a name
    #[inline]
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Named {
            slug: None,
            name: Some(name.into()),
            id: None,
        }
    }

    /// Term used to find the referenced object on the destination
    ///
    /// Slug wins over name, name over the stringified id.
    #[must_use]
    pub fn lookup_term(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(id.to_string()),
            Self::Key(key) => Some(key.clone()),
            Self::Named { slug, name, id } => slug
                .clone()
                .or_else(|| name.clone())
                .or_else(|| id.map(|id| id.to_string())),
        }
    }

    /// Slug carried by a nested reference, if any
    #[inline]
    #[must_use]
    pub fn slug_term(&self) -> Option<&str> {
        match self {
            Self::Named { slug, .. } => slug.as_deref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.lookup_term() {
            Some(term) => write!(f, "{term}"),
            None => write!(f, "<unidentified>"),
        }
    }
}
