//! Request and response types exchanged with the transport.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::SearchError;

/// HTTP methods used by sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// One request for the transport. `path` is relative to the endpoint and
/// starts with `/`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

impl TransportRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append several query parameters.
    pub fn params(mut self, params: &[(String, String)]) -> Self {
        self.query.extend_from_slice(params);
        self
    }

    /// Set the JSON body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A raw response from the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SearchError> {
        serde_json::from_str(&self.body).map_err(|e| SearchError::parse(e.to_string()))
    }
}

/// Acknowledged responses of index management endpoints.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Acknowledgement {
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default)]
    pub index: Option<String>,
}

/// A search response whose hits decode into `T`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse<T> {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    pub hits: Hits<T>,
    #[serde(default)]
    pub aggregations: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hits<T> {
    /// A number on older engines, `{"value", "relation"}` on newer ones.
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub max_score: Option<f64>,
    pub hits: Vec<Hit<T>>,
}

impl<T> Hits<T> {
    /// The total hit count in either encoding.
    pub fn total_count(&self) -> Option<u64> {
        match self.total.as_ref()? {
            Value::Number(total) => total.as_u64(),
            Value::Object(total) => total.get("value").and_then(Value::as_u64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hit<T> {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source")]
    pub source: T,
}

impl<T> SearchResponse<T> {
    /// The decoded `_source` of every hit, in rank order.
    pub fn sources(self) -> Vec<T> {
        self.hits.hits.into_iter().map(|hit| hit.source).collect()
    }
}

/// A document fetched by id.
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T> {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    pub found: bool,
    #[serde(rename = "_source")]
    pub source: Option<T>,
}

/// Result of a write to a single document.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WriteResult {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    pub result: String,
}

/// One row of `_cat/indices`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IndexInfo {
    pub index: String,
    #[serde(default)]
    pub health: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "docs.count", default)]
    pub docs_count: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = TransportRequest::new(Method::Post, "/blog/_search")
            .param("timeout", "8s")
            .body("{}");

        assert_eq!(request.query, vec![("timeout".to_string(), "8s".to_string())]);
        assert_eq!(request.body.as_deref(), Some("{}"));
        assert_eq!(request.method.as_str(), "POST");
    }

    #[test]
    fn test_search_response_decoding() {
        let body = json!({
            "took": 3,
            "timed_out": false,
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "max_score": 1.5,
                "hits": [
                    { "_index": "blog", "_id": "1", "_score": 1.5, "_source": { "title": "rust" } }
                ]
            }
        });
        let response = TransportResponse::new(200, body.to_string());

        let decoded: SearchResponse<Value> = response.json().unwrap();

        assert_eq!(decoded.hits.total_count(), Some(1));
        assert_eq!(decoded.sources(), vec![json!({ "title": "rust" })]);
    }

    #[test]
    fn test_legacy_total() {
        let hits: Hits<Value> =
            serde_json::from_value(json!({ "total": 7, "hits": [] })).unwrap();

        assert_eq!(hits.total_count(), Some(7));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Post {
        title: String,
    }

    #[test]
    fn test_document_without_source() {
        let response = TransportResponse::new(
            200,
            r#"{"_index":"blog","_id":"9","found":false}"#,
        );

        let document: Document<Post> = response.json().unwrap();

        assert!(!document.found);
        assert_eq!(document.source, None);
    }

    #[test]
    fn test_parse_error() {
        let response = TransportResponse::new(200, "not json");

        let result: Result<Value, SearchError> = response.json();
        assert!(matches!(result, Err(SearchError::ParseError(_))));
    }
}
