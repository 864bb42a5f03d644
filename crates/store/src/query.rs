//! Tag-scoped search queries used by full resync.

use netsync_core::tag::{escape_query_token, TAG_SCOPE_CLUSTER};
use netsync_core::Tag;

/// Narrows a resync beyond the mandatory cluster-identity clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncFilter {
    /// Extra tag clauses; a tag with an empty value matches on scope alone.
    pub tags: Vec<Tag>,
    pub org: Option<String>,
    pub project: Option<String>,
}

impl ResyncFilter {
    pub fn with_tag(mut self, scope: &str, value: &str) -> Self {
        self.tags.push(Tag::new(scope, value));
        self
    }

    pub fn under_project(mut self, org: &str, project: &str) -> Self {
        self.org = Some(org.to_string());
        self.project = Some(project.to_string());
        self
    }

    fn path_prefix(&self) -> Option<String> {
        match (self.org.as_deref(), self.project.as_deref()) {
            (Some(o), Some(p)) => Some(format!("/orgs/{}/projects/{}/", o, p)),
            (Some(o), None) => Some(format!("/orgs/{}/", o)),
            _ => None,
        }
    }
}

fn push_tag_clause(q: &mut String, tag: &Tag) {
    q.push_str(" AND tags.scope:");
    q.push_str(&escape_query_token(&tag.scope));
    if !tag.value.is_empty() {
        q.push_str(" AND tags.tag:");
        q.push_str(&escape_query_token(&tag.value));
    }
}

/// `resource_type:{T} AND tags.scope:{cluster scope} AND tags.tag:{cluster} [AND ...] [AND path:{prefix}*]`
pub fn build_query(resource_type: &str, cluster: &str, filter: &ResyncFilter) -> String {
    let mut q = format!("resource_type:{}", resource_type);
    push_tag_clause(&mut q, &Tag::new(TAG_SCOPE_CLUSTER, cluster));
    for tag in &filter.tags {
        push_tag_clause(&mut q, tag);
    }
    if let Some(prefix) = filter.path_prefix() {
        q.push_str(" AND path:");
        q.push_str(&escape_query_token(&prefix));
        q.push('*');
    }
    q
}
