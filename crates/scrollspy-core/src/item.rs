#![forbid(unsafe_code)]

//! Item identity.
//!
//! A catalog item is identified by its color token, which doubles as its
//! display identity. Rendered nodes are referred to through an opaque
//! [`ElementHandle`] issued by the host.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Color token identifying one catalog item (e.g. `"#3a86ff"`).
///
/// Two items with the same token collide: the catalog keeps one entry per
/// token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    /// Wrap a color token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Color {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Color {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl Borrow<str> for Color {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque reference to a rendered node.
///
/// Only the host knows what the number points at; the core stores it and
/// hands it back for scroll-to requests and geometry lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(pub u64);

impl ElementHandle {
    /// Raw host identifier.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn color_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(Color::from("#3a86ff"), 1);
        assert_eq!(map.get("#3a86ff"), Some(&1));
    }

    #[test]
    fn color_serializes_as_plain_string() {
        let json = serde_json::to_string(&Color::from("red")).unwrap();
        assert_eq!(json, "\"red\"");
    }

    #[test]
    fn handle_display() {
        assert_eq!(ElementHandle(7).to_string(), "el#7");
        assert_eq!(ElementHandle(7).raw(), 7);
    }
}
