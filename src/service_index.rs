//! Service index document
//!
//! A package source publishes a JSON index mapping service types to
//! endpoints:
//!
//! ```json
//! {
//!   "version": "3.0.0",
//!   "resources": [
//!     { "@id": "https://api.example.org/query", "@type": "SearchQueryService" },
//!     { "@id": "https://api.example.org/v3/", "@type": ["PackageBaseAddress/3.0.0", "PackageBaseAddress"] }
//!   ]
//! }
//! ```
//!
//! The document is kept as fetched, together with the time it was requested.
//! Refreshing means building a new [`ServiceIndex`].

use crate::error::{LockscopeError, LockscopeResult};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::warn;
use url::Url;

/// `@type` is either a single type or a list of aliases
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResourceType {
    One(String),
    Many(Vec<String>),
}

impl ResourceType {
    fn into_types(self) -> Vec<String> {
        match self {
            Self::One(t) => vec![t],
            Self::Many(types) => types,
        }
    }
}

/// One entry of `resources`, with `@type` normalized
struct Resource<'a> {
    position: usize,
    types: Vec<String>,
    raw: &'a Value,
}

impl Resource<'_> {
    fn endpoint(&self) -> LockscopeResult<Url> {
        let id = self
            .raw
            .get("@id")
            .and_then(Value::as_str)
            .ok_or_else(|| LockscopeError::entry(self.position, "missing string @id"))?;

        Url::parse(id).map_err(|e| LockscopeError::entry(self.position, format!("@id '{}': {}", id, e)))
    }
}

/// Fetched service index and the time it was requested
#[derive(Debug, Clone)]
pub struct ServiceIndex {
    index: Value,
    request_time: DateTime<Utc>,
}

impl ServiceIndex {
    pub fn new(index: Value, request_time: DateTime<Utc>) -> Self {
        Self {
            index,
            request_time,
        }
    }

    /// Parse a document fetched at `request_time`
    pub fn from_json_str(content: &str, request_time: DateTime<Utc>) -> LockscopeResult<Self> {
        Ok(Self::new(serde_json::from_str(content)?, request_time))
    }

    /// Load a previously saved document; its modification time stands in for the request time
    pub async fn from_file(path: &Path) -> LockscopeResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            LockscopeError::io(format!("reading service index {}", path.display()), e)
        })?;
        let request_time = tokio::fs::metadata(path)
            .await
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Self::from_json_str(&content, request_time)
    }

    /// Raw JSON document
    pub fn index(&self) -> &Value {
        &self.index
    }

    pub fn request_time(&self) -> DateTime<Utc> {
        self.request_time
    }

    /// Time elapsed since the document was requested
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.request_time
    }

    /// Endpoints of every resource declaring `service_type`, in document order
    ///
    /// Duplicated declarations are returned as duplicates. An entry whose
    /// `@type` cannot be read matches nothing. A matching entry with a bad
    /// `@id` fails this lookup only; the document stays usable.
    pub fn endpoints(&self, service_type: &str) -> LockscopeResult<Vec<Url>> {
        self.resources()?
            .into_iter()
            .filter(|r| r.types.iter().any(|t| t == service_type))
            .map(|r| r.endpoint())
            .collect()
    }

    /// Endpoints of the first type in `service_types` that has any
    pub fn first_endpoints(&self, service_types: &[&str]) -> LockscopeResult<Vec<Url>> {
        for service_type in service_types {
            let endpoints = self.endpoints(service_type)?;
            if !endpoints.is_empty() {
                return Ok(endpoints);
            }
        }
        Ok(Vec::new())
    }

    fn resources(&self) -> LockscopeResult<Vec<Resource<'_>>> {
        let entries = self
            .index
            .get("resources")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                LockscopeError::ServiceIndexMalformed("missing 'resources' array".to_string())
            })?;

        Ok(entries
            .iter()
            .enumerate()
            .filter_map(|(position, raw)| {
                let declared = raw
                    .get("@type")
                    .and_then(|t| ResourceType::deserialize(t).ok());
                let Some(declared) = declared else {
                    warn!(
                        "Skipping service index entry #{}: missing or unreadable @type",
                        position
                    );
                    return None;
                };
                Some(Resource {
                    position,
                    types: declared.into_types(),
                    raw,
                })
            })
            .collect())
    }
}
