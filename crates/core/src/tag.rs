//! Tags carried by remote objects and their search-query escaping.

use serde::{Deserialize, Serialize};

/// Tag scope carrying the cluster identity every managed object is stamped with.
pub const TAG_SCOPE_CLUSTER: &str = "nsx-op/cluster";
/// Tag scope carrying the owning namespace name.
pub const TAG_SCOPE_NAMESPACE: &str = "nsx-op/namespace";
/// Tag scope carrying the owning namespace UID.
pub const TAG_SCOPE_NAMESPACE_UID: &str = "nsx-op/namespace_uid";
/// Tag scope carrying the UID of the custom resource an object was generated from.
pub const TAG_SCOPE_CR_UID: &str = "nsx-op/cr_uid";
/// Tag scope carrying the name of the custom resource an object was generated from.
pub const TAG_SCOPE_CR_NAME: &str = "nsx-op/cr_name";

/// A `{scope, tag}` pair. The wire name of `value` is `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub scope: String,
    #[serde(rename = "tag", default)]
    pub value: String,
}

impl Tag {
    pub fn new(scope: impl Into<String>, value: impl Into<String>) -> Self {
        Self { scope: scope.into(), value: value.into() }
    }
}

/// Escape a token for embedding in a search query: `/` becomes `\/` and `:` becomes `\:`.
pub fn escape_query_token(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if c == '/' || c == ':' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Find the value of the first tag with the given scope.
pub fn tag_value<'a>(tags: &'a [Tag], scope: &str) -> Option<&'a str> {
    tags.iter().find(|t| t.scope == scope).map(|t| t.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_slash_and_colon() {
        assert_eq!(escape_query_token("nsx-op/cluster"), "nsx-op\\/cluster");
        assert_eq!(escape_query_token("a:b/c"), "a\\:b\\/c");
        assert_eq!(escape_query_token("plain"), "plain");
    }

    #[test]
    fn tag_uses_wire_field_name() {
        let t = Tag::new("s", "v");
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v, serde_json::json!({"scope": "s", "tag": "v"}));
        let back: Tag = serde_json::from_value(v).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn tag_value_picks_first_match() {
        let tags = vec![Tag::new("a", "1"), Tag::new("b", "2"), Tag::new("a", "3")];
        assert_eq!(tag_value(&tags, "a"), Some("1"));
        assert_eq!(tag_value(&tags, "c"), None);
    }
}
