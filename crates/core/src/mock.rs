//! In-memory remote clients for tests and offline CLI runs.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value as Json;

use crate::client::{HierarchyClient, SearchClient, SearchPage};
use crate::envelope::RootEnvelope;
use crate::error::RemoteError;

/// Records every patch; individual calls (0-based) can be scripted to fail.
#[derive(Debug, Default)]
pub struct MockHierarchyClient {
    calls: Mutex<Vec<(Json, bool)>>,
    failures: Mutex<HashMap<usize, RemoteError>>,
}

impl MockHierarchyClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `n`-th patch call fail with `err`.
    pub fn fail_call(self, n: usize, err: RemoteError) -> Self {
        self.failures.lock().unwrap_or_else(|e| e.into_inner()).insert(n, err);
        self
    }

    /// Envelopes received so far, as JSON.
    pub fn calls(&self) -> Vec<Json> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).iter().map(|(j, _)| j.clone()).collect()
    }

    /// Revision-check flag of each call.
    pub fn revision_flags(&self) -> Vec<bool> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).iter().map(|(_, f)| *f).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait::async_trait]
impl HierarchyClient for MockHierarchyClient {
    async fn patch(&self, envelope: &RootEnvelope, enforce_revision_check: bool) -> Result<(), RemoteError> {
        let n = {
            let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
            calls.push((envelope.to_json(), enforce_revision_check));
            calls.len() - 1
        };
        match self.failures.lock().unwrap_or_else(|e| e.into_inner()).remove(&n) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Serves a fixed result set with offset cursors.
#[derive(Debug, Default)]
pub struct MockSearchClient {
    results: Vec<Json>,
    max_page_size: Option<u32>,
    fail_at_request: Option<(usize, RemoteError)>,
    requests: Mutex<Vec<(String, Option<String>, u32)>>,
}

impl MockSearchClient {
    pub fn new(results: Vec<Json>) -> Self {
        Self { results, ..Default::default() }
    }

    /// Reject any page size above `max` with `PageSizeExceeded`.
    pub fn with_max_page_size(mut self, max: u32) -> Self {
        self.max_page_size = Some(max);
        self
    }

    /// Fail the `n`-th request (0-based) with `err`.
    pub fn fail_request(mut self, n: usize, err: RemoteError) -> Self {
        self.fail_at_request = Some((n, err));
        self
    }

    /// `(query, cursor, page_size)` of every request received.
    pub fn requests(&self) -> Vec<(String, Option<String>, u32)> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait::async_trait]
impl SearchClient for MockSearchClient {
    async fn list(&self, query: &str, cursor: Option<&str>, page_size: u32) -> Result<SearchPage, RemoteError> {
        let n = {
            let mut reqs = self.requests.lock().unwrap_or_else(|e| e.into_inner());
            reqs.push((query.to_string(), cursor.map(|s| s.to_string()), page_size));
            reqs.len() - 1
        };
        if let Some((at, err)) = &self.fail_at_request {
            if *at == n {
                return Err(err.clone());
            }
        }
        if let Some(max) = self.max_page_size {
            if page_size > max {
                return Err(RemoteError::PageSizeExceeded);
            }
        }
        let offset = match cursor {
            Some(c) if !c.is_empty() => c.parse::<usize>().map_err(|_| RemoteError::api(400, "bad cursor"))?,
            _ => 0,
        };
        let start = offset.min(self.results.len());
        let end = (start + page_size as usize).min(self.results.len());
        let next = if end < self.results.len() { Some(end.to_string()) } else { None };
        Ok(SearchPage {
            results: self.results[start..end].to_vec(),
            cursor: next,
            result_count: self.results.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::RootKind;

    #[tokio::test]
    async fn search_pages_with_offset_cursor() {
        let c = MockSearchClient::new((0..5).map(|i| serde_json::json!({"id": i.to_string()})).collect());
        let p1 = c.list("q", None, 2).await.unwrap();
        assert_eq!(p1.results.len(), 2);
        assert_eq!(p1.cursor.as_deref(), Some("2"));
        assert_eq!(p1.result_count, 5);
        let p3 = c.list("q", Some("4"), 2).await.unwrap();
        assert_eq!(p3.results.len(), 1);
        assert_eq!(p3.cursor, None);
        assert_eq!(c.requests().len(), 2);
    }

    #[tokio::test]
    async fn search_rejects_oversized_pages() {
        let c = MockSearchClient::new(vec![]).with_max_page_size(50);
        assert_eq!(c.list("q", None, 51).await, Err(RemoteError::PageSizeExceeded));
        assert!(c.list("q", None, 50).await.is_ok());
    }

    #[tokio::test]
    async fn hierarchy_records_and_fails_scripted_calls() {
        let c = MockHierarchyClient::new().fail_call(1, RemoteError::api(500, "boom"));
        let env = RootEnvelope::new(RootKind::Tenant, vec![]);
        assert!(c.patch(&env, false).await.is_ok());
        assert!(c.patch(&env, false).await.is_err());
        assert!(c.patch(&env, true).await.is_ok());
        assert_eq!(c.call_count(), 3);
        assert_eq!(c.revision_flags(), vec![false, false, true]);
    }
}
