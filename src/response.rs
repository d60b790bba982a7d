use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// A search response body, decoded once.
/// The upstream either answers with results or with `{"error": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Failure { error: String },
    Success {
        meta: Meta,
        #[serde(default)]
        results: Results,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub hits: u64,
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Results {
    #[serde(default)]
    pub docs: Vec<Record>,
    #[serde(default)]
    pub facets: Option<Facets>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Facets {
    /// Each field holds the flat `[value, count, value, count, ...]` list.
    #[serde(default)]
    pub facet_fields: HashMap<String, Vec<Value>>,
}

impl SearchResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| Error::MalformedResponse(e.to_string()))
    }

    pub fn hits(&self) -> Option<u64> {
        match self {
            SearchResponse::Success { meta, .. } => Some(meta.hits),
            SearchResponse::Failure { .. } => None,
        }
    }

    pub fn records(&self) -> &[Record] {
        match self {
            SearchResponse::Success { results, .. } => &results.docs,
            SearchResponse::Failure { .. } => &[],
        }
    }

    pub fn facets(&self) -> Option<&Facets> {
        match self {
            SearchResponse::Success { results, .. } => results.facets.as_ref(),
            SearchResponse::Failure { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SearchResponse::Failure { error } => Some(error),
            SearchResponse::Success { .. } => None,
        }
    }
}

/// One fetched page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Total number of matches across all pages.
    pub hits: u64,
    pub records: Vec<Record>,
    pub facets: Facets,
}

impl Page {
    pub fn returned(&self) -> usize {
        self.records.len()
    }

    /// Decoded `(value, count)` pairs of a facet field, empty if the field is absent.
    pub fn facet(&self, field: &str) -> Vec<(String, u64)> {
        self.facets
            .facet_fields
            .get(field)
            .map(|flat| decode_facet(flat))
            .unwrap_or_default()
    }
}

impl TryFrom<SearchResponse> for Page {
    type Error = Error;

    fn try_from(resp: SearchResponse) -> Result<Self> {
        match resp {
            SearchResponse::Success { meta, results } => Ok(Page {
                hits: meta.hits,
                records: results.docs,
                facets: results.facets.unwrap_or_default(),
            }),
            SearchResponse::Failure { error } => Err(Error::MalformedResponse(format!(
                "error body on a successful status: {error}"
            ))),
        }
    }
}

/// A single result document: field name to value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Field as text. Lists are joined with `"; "`, missing or null fields are empty.
    pub fn text(&self, field: &str) -> String {
        match self.0.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::Array(items)) => items.iter().map(value_text).collect::<Vec<_>>().join("; "),
            Some(other) => value_text(other),
        }
    }

    /// Field as a list of strings. A scalar becomes a one element list.
    pub fn list(&self, field: &str) -> Vec<String> {
        match self.0.get(field) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(value_text).collect(),
            Some(other) => vec![value_text(other)],
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Turns the flat facet encoding `[v1, c1, v2, c2, ...]` into ordered `(value, count)` pairs.
/// Upstream order is kept. A trailing value without a count is dropped,
/// counts that are not non-negative integers read as 0.
pub fn decode_facet(flat: &[Value]) -> Vec<(String, u64)> {
    flat.chunks_exact(2)
        .map(|pair| (value_text(&pair[0]), pair[1].as_u64().unwrap_or(0)))
        .collect()
}
