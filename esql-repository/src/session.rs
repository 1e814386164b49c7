//! Per-request sessions.
//!
//! A [`Session`] pairs a [`QueryBuilder`] with the index it targets and the
//! query parameters sent with every request. Search endpoints compile the
//! builder once; index and document endpoints ignore it.

use esql_query::QueryBuilder;
use esql_schema::{infer_mapping, Mappable, RecordDescriptor};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::errors::SearchError;
use crate::interfaces::Transport;
use crate::opensearch::{default_index_settings, validate_index_name};
use crate::types::{
    Acknowledgement, Document, Method, SearchResponse, TransportRequest, TransportResponse,
    WriteResult,
};

/// Body of a partial document update.
#[derive(Serialize)]
struct PartialUpdate<'a, T> {
    doc: &'a T,
}

/// Turn a status of 400 or above into `SearchError::ResponseError`.
pub(crate) fn check_status(response: TransportResponse) -> Result<TransportResponse, SearchError> {
    if response.status >= 400 {
        return Err(SearchError::response(response.status, response.body));
    }
    Ok(response)
}

/// One logical request against an index.
///
/// # Example
///
/// ```ignore
/// let mut session = client.db("blog");
/// session
///     .query()
///     .must([json!({ "title": "rust" })])
///     .limit(10);
///
/// let posts: SearchResponse<Post> = session.find_as().await?;
/// ```
pub struct Session<'a> {
    transport: &'a dyn Transport,
    index: String,
    params: Vec<(String, String)>,
    builder: QueryBuilder,
}

impl<'a> Session<'a> {
    pub(crate) fn new(transport: &'a dyn Transport, index: String, timeout: &str) -> Self {
        Self {
            transport,
            index,
            params: vec![("timeout".to_string(), timeout.to_string())],
            builder: QueryBuilder::new(),
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// The query builder of this session.
    pub fn query(&mut self) -> &mut QueryBuilder {
        &mut self.builder
    }

    /// The compiled template, once a search endpoint ran.
    pub fn template(&self) -> Option<&str> {
        self.builder.template()
    }

    /// Replace the `timeout` parameter, e.g. `10ms` or `5s`.
    pub fn timeout(&mut self, timeout: impl Into<String>) -> &mut Self {
        self.params.retain(|(key, _)| key != "timeout");
        self.params.push(("timeout".to_string(), timeout.into()));
        self
    }

    /// Add a query parameter sent with every search request.
    pub fn param(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Compile the builder and run the search.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn find(&mut self) -> Result<Value, SearchError> {
        let template = self.builder.make_query()?.to_string();
        let request = TransportRequest::new(Method::Post, self.path("_search"))
            .params(&self.params)
            .body(template);

        self.send(&request).await?.json()
    }

    /// [`Session::find`], decoding every hit's `_source` into `T`.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn find_as<T: DeserializeOwned>(&mut self) -> Result<SearchResponse<T>, SearchError> {
        let template = self.builder.make_query()?.to_string();
        let request = TransportRequest::new(Method::Post, self.path("_search"))
            .params(&self.params)
            .body(template);

        self.send(&request).await?.json()
    }

    /// Compile the builder and ask the engine to validate and explain it.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn validate_query(&mut self) -> Result<Value, SearchError> {
        let template = self.builder.make_query()?.to_string();
        let request = TransportRequest::new(Method::Get, self.path("_validate/query"))
            .param("explain", "true")
            .body(template);

        self.send(&request).await?.json()
    }

    /// Compile the builder and delete every matching document.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn delete_by_query(&mut self) -> Result<Value, SearchError> {
        let template = self.builder.make_query()?.to_string();
        let request = TransportRequest::new(Method::Post, self.path("_delete_by_query"))
            .params(&self.params)
            .body(template);

        let response = self.send(&request).await?.json()?;
        info!(index = %self.index, "Deleted documents by query");
        Ok(response)
    }

    /// Run a prepared search body as is, bypassing the builder.
    #[instrument(skip(self, body), fields(index = %self.index))]
    pub async fn exec(&self, body: impl Into<String>) -> Result<Value, SearchError> {
        let request = TransportRequest::new(Method::Post, self.path("_search"))
            .params(&self.params)
            .body(body);

        self.send(&request).await?.json()
    }

    /// Search with `{"match_all": settings}`; `null` means no settings.
    #[instrument(skip(self, settings), fields(index = %self.index))]
    pub async fn match_all(&self, settings: Value) -> Result<Value, SearchError> {
        let settings = match settings {
            Value::Null => json!({}),
            settings => settings,
        };
        let body = json!({ "query": { "match_all": settings } });

        self.exec(body.to_string()).await
    }

    /// Create the index with `settings` (and optionally `mappings`).
    #[instrument(skip(self, settings), fields(index = %self.index))]
    pub async fn create_index(&self, settings: &Value) -> Result<Acknowledgement, SearchError> {
        validate_index_name(&self.index)?;
        let body =
            serde_json::to_string(settings).map_err(|e| SearchError::serialization(e.to_string()))?;
        let request = TransportRequest::new(Method::Put, self.path("")).body(body);

        let acknowledgement: Acknowledgement = self.send(&request).await?.json()?;
        info!(index = %self.index, acknowledged = acknowledgement.acknowledged, "Created index");
        Ok(acknowledgement)
    }

    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn delete_index(&self) -> Result<Acknowledgement, SearchError> {
        validate_index_name(&self.index)?;
        let request = TransportRequest::new(Method::Delete, self.path(""));

        let acknowledgement: Acknowledgement = self.send(&request).await?.json()?;
        info!(index = %self.index, "Deleted index");
        Ok(acknowledgement)
    }

    /// `true` on 200, `false` on 404.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn index_exists(&self) -> Result<bool, SearchError> {
        validate_index_name(&self.index)?;
        let request = TransportRequest::new(Method::Head, self.path(""));

        let response = self.transport.execute(&request).await?;
        match response.status {
            404 => Ok(false),
            _ => check_status(response).map(|_| true),
        }
    }

    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn show_mapping(&self) -> Result<Value, SearchError> {
        validate_index_name(&self.index)?;
        let request = TransportRequest::new(Method::Get, self.path("_mapping"));

        self.send(&request).await?.json()
    }

    /// Put the mapping inferred from `record`, creating the index with
    /// default settings first when it does not exist.
    ///
    /// The mapping is inferred before any request is sent.
    #[instrument(skip(self, record), fields(index = %self.index, record = %record.name()))]
    pub async fn auto_mapping(
        &self,
        record: &RecordDescriptor,
    ) -> Result<Acknowledgement, SearchError> {
        validate_index_name(&self.index)?;
        let mapping = infer_mapping(record)?;

        if !self.index_exists().await? {
            debug!(index = %self.index, "Index missing, creating it with default settings");
            self.create_index(&default_index_settings()).await?;
        }

        let request =
            TransportRequest::new(Method::Put, self.path("_mapping")).body(mapping.to_string());
        self.send(&request).await?.json()
    }

    /// [`Session::auto_mapping`] for a [`Mappable`] type.
    pub async fn auto_mapping_for<T: Mappable>(&self) -> Result<Acknowledgement, SearchError> {
        self.auto_mapping(&T::descriptor()).await
    }

    /// Index a document, under `id` when given or an engine-generated id.
    #[instrument(skip(self, document), fields(index = %self.index))]
    pub async fn index_doc<T: Serialize>(
        &self,
        id: Option<&str>,
        document: &T,
    ) -> Result<WriteResult, SearchError> {
        let body =
            serde_json::to_string(document).map_err(|e| SearchError::serialization(e.to_string()))?;
        let request = match id {
            Some(id) => TransportRequest::new(Method::Put, self.doc_path("_doc", id)?),
            None => {
                validate_index_name(&self.index)?;
                TransportRequest::new(Method::Post, self.path("_doc"))
            }
        }
        .body(body);

        self.send(&request).await?.json()
    }

    /// Fetch a document by id; `None` when it does not exist.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn get_doc<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>, SearchError> {
        let request = TransportRequest::new(Method::Get, self.doc_path("_doc", id)?);

        let response = self.transport.execute(&request).await?;
        if response.status == 404 {
            debug!(id = %id, "Document not found");
            return Ok(None);
        }

        let document: Document<T> = check_status(response)?.json()?;
        Ok(document.source.filter(|_| document.found))
    }

    /// Merge a partial document into an existing one.
    #[instrument(skip(self, partial), fields(index = %self.index))]
    pub async fn update_doc<T: Serialize>(
        &self,
        id: &str,
        partial: &T,
    ) -> Result<WriteResult, SearchError> {
        let body = serde_json::to_string(&PartialUpdate { doc: partial })
            .map_err(|e| SearchError::serialization(e.to_string()))?;
        let request = TransportRequest::new(Method::Post, self.doc_path("_update", id)?).body(body);

        self.send(&request).await?.json()
    }

    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn delete_doc(&self, id: &str) -> Result<WriteResult, SearchError> {
        let request = TransportRequest::new(Method::Delete, self.doc_path("_doc", id)?);

        self.send(&request).await?.json()
    }

    /// `/{index}/{suffix}`; without an index, `/{suffix}`.
    fn path(&self, suffix: &str) -> String {
        match (self.index.is_empty(), suffix.is_empty()) {
            (true, _) => format!("/{}", suffix),
            (false, true) => format!("/{}", self.index),
            (false, false) => format!("/{}/{}", self.index, suffix),
        }
    }

    /// `/{index}/{endpoint}/{id}` with the id percent-encoded as one segment.
    fn doc_path(&self, endpoint: &str, id: &str) -> Result<String, SearchError> {
        validate_index_name(&self.index)?;
        // `.` and `..` survive encoding and are resolved as dot segments.
        if id.is_empty() || id == "." || id == ".." {
            return Err(SearchError::invalid_document_id(id));
        }
        Ok(format!("/{}/{}/{}", self.index, endpoint, urlencoding::encode(id)))
    }

    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, SearchError> {
        check_status(self.transport.execute(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::MockTransport;
    use crate::client::EsqlClient;
    use esql_query::{JoinKind, QueryError};
    use esql_schema::{FieldDescriptor, FieldKind};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Post {
        title: String,
    }

    fn client(transport: &MockTransport) -> EsqlClient {
        EsqlClient::new(Box::new(transport.clone()))
    }

    #[tokio::test]
    async fn test_find_posts_template() {
        let transport = MockTransport::new();
        let client = client(&transport);
        let mut session = client.db("blog");
        session.query().term([json!({ "Level": 5 })]);

        session.find().await.unwrap();

        let requests = transport.recorded().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path, "/blog/_search");
        assert_eq!(
            requests[0].query,
            vec![("timeout".to_string(), "8s".to_string())]
        );
        assert_eq!(
            requests[0].body.as_deref(),
            Some(r#"{"query":{"term":{"Level":5}}}"#)
        );
        assert_eq!(session.template(), Some(r#"{"query":{"term":{"Level":5}}}"#));
    }

    #[tokio::test]
    async fn test_find_as_decodes_hits() {
        let transport = MockTransport::new();
        transport
            .respond(
                200,
                r#"{"hits":{"total":{"value":1},"hits":[{"_index":"blog","_id":"1","_source":{"title":"rust"}}]}}"#,
            )
            .await;
        let client = client(&transport);
        let mut session = client.db("blog");
        session
            .query()
            .joins(JoinKind::Nested, "comments", Value::Null)
            .must([json!({ "comments.author": "ann" })]);

        let response: SearchResponse<Post> = session.find_as().await.unwrap();

        assert_eq!(response.hits.total_count(), Some(1));
        assert_eq!(
            response.sources(),
            vec![Post {
                title: "rust".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_error_status_is_response_error() {
        let transport = MockTransport::new();
        transport.respond(400, r#"{"error":"parsing_exception"}"#).await;
        let client = client(&transport);
        let mut session = client.db("blog");

        let err = session.find().await.unwrap_err();

        assert!(matches!(err, SearchError::ResponseError { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_latched_query_error_sends_nothing() {
        let transport = MockTransport::new();
        let client = client(&transport);
        let mut session = client.db("blog");
        session.query().avg("Score", "group_Missing");

        let err = session.find().await.unwrap_err();

        assert!(matches!(
            err,
            SearchError::Query(QueryError::UnknownGroupError(_))
        ));
        assert!(transport.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn test_session_runs_search_once() {
        let transport = MockTransport::new();
        let client = client(&transport);
        let mut session = client.db("blog");

        session.find().await.unwrap();
        let err = session.find().await.unwrap_err();

        assert!(matches!(
            err,
            SearchError::Query(QueryError::AlreadyCompiledError)
        ));
        assert_eq!(transport.recorded().await.len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_override() {
        let transport = MockTransport::new();
        let client = client(&transport);
        let mut session = client.db("blog");
        session.timeout("500ms").param("routing", "user1");

        session.find().await.unwrap();

        let requests = transport.recorded().await;
        assert_eq!(
            requests[0].query,
            vec![
                ("timeout".to_string(), "500ms".to_string()),
                ("routing".to_string(), "user1".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_validate_query_and_delete_by_query() {
        let transport = MockTransport::new();
        let client = client(&transport);

        let mut validate = client.db("blog");
        validate.query().must([json!({ "title": "rust" })]);
        validate.validate_query().await.unwrap();

        let mut delete = client.db("blog");
        delete.query().term([json!({ "draft": true })]);
        delete.delete_by_query().await.unwrap();

        let requests = transport.recorded().await;
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].path, "/blog/_validate/query");
        assert_eq!(
            requests[0].query,
            vec![("explain".to_string(), "true".to_string())]
        );
        assert_eq!(requests[1].path, "/blog/_delete_by_query");
        assert_eq!(
            requests[1].body.as_deref(),
            Some(r#"{"query":{"term":{"draft":true}}}"#)
        );
    }

    #[tokio::test]
    async fn test_match_all_and_exec() {
        let transport = MockTransport::new();
        let client = client(&transport);
        let session = client.db("");

        session.match_all(Value::Null).await.unwrap();
        session.match_all(json!({ "boost": 1.2 })).await.unwrap();
        session.exec(r#"{"size":0}"#).await.unwrap();

        let requests = transport.recorded().await;
        assert_eq!(requests[0].path, "/_search");
        assert_eq!(
            requests[0].body.as_deref(),
            Some(r#"{"query":{"match_all":{}}}"#)
        );
        assert_eq!(
            requests[1].body.as_deref(),
            Some(r#"{"query":{"match_all":{"boost":1.2}}}"#)
        );
        assert_eq!(requests[2].body.as_deref(), Some(r#"{"size":0}"#));
    }

    #[tokio::test]
    async fn test_invalid_index_name_sends_nothing() {
        let transport = MockTransport::new();
        let client = client(&transport);
        let session = client.db("Blog Posts");

        let err = session.create_index(&default_index_settings()).await.unwrap_err();

        assert!(matches!(err, SearchError::InvalidIndexName(_)));
        assert!(transport.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn test_index_exists() {
        let transport = MockTransport::new();
        transport.respond(200, "").await;
        transport.respond(404, "").await;
        transport.respond(503, "unavailable").await;
        let client = client(&transport);
        let session = client.db("blog");

        assert!(session.index_exists().await.unwrap());
        assert!(!session.index_exists().await.unwrap());
        assert_eq!(session.index_exists().await.unwrap_err().status(), Some(503));

        let requests = transport.recorded().await;
        assert_eq!(requests[0].method, Method::Head);
        assert_eq!(requests[0].path, "/blog");
    }

    #[tokio::test]
    async fn test_auto_mapping_creates_missing_index() {
        let transport = MockTransport::new();
        transport.respond(404, "").await;
        transport.respond(200, r#"{"acknowledged":true,"index":"blog"}"#).await;
        transport.respond(200, r#"{"acknowledged":true}"#).await;
        let client = client(&transport);
        let session = client.db("blog");
        let record = RecordDescriptor::new("Post")
            .field(FieldDescriptor::new("title", FieldKind::Text))
            .field(FieldDescriptor::new("draft", FieldKind::Boolean).tags("-"));

        let acknowledgement = session.auto_mapping(&record).await.unwrap();

        assert!(acknowledgement.acknowledged);
        let requests = transport.recorded().await;
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].method, Method::Put);
        assert_eq!(requests[1].path, "/blog");
        assert_eq!(requests[2].path, "/blog/_mapping");
        let mapping: Value = serde_json::from_str(requests[2].body.as_deref().unwrap()).unwrap();
        assert_eq!(
            mapping,
            json!({
                "properties": {
                    "title": { "type": "text" },
                    "draft": { "enabled": false }
                }
            })
        );
    }

    #[tokio::test]
    async fn test_auto_mapping_existing_index() {
        let transport = MockTransport::new();
        transport.respond(200, "").await;
        transport.respond(200, r#"{"acknowledged":true}"#).await;
        let client = client(&transport);
        let session = client.db("blog");
        let record =
            RecordDescriptor::new("Post").field(FieldDescriptor::new("title", FieldKind::Text));

        session.auto_mapping(&record).await.unwrap();

        let requests = transport.recorded().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].path, "/blog/_mapping");
    }

    #[tokio::test]
    async fn test_auto_mapping_bad_tag_sends_nothing() {
        let transport = MockTransport::new();
        let client = client(&transport);
        let session = client.db("blog");
        let record = RecordDescriptor::new("Post")
            .field(FieldDescriptor::new("title", FieldKind::Text).tags("analyzer"));

        let err = session.auto_mapping(&record).await.unwrap_err();

        assert!(matches!(err, SearchError::Schema(_)));
        assert!(transport.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn test_document_endpoints() {
        let transport = MockTransport::new();
        let written = r#"{"_index":"blog","_id":"1","result":"created"}"#;
        transport.respond(201, written).await;
        transport
            .respond(200, r#"{"_index":"blog","_id":"1","found":true,"_source":{"title":"rust"}}"#)
            .await;
        transport.respond(404, r#"{"_index":"blog","_id":"2","found":false}"#).await;
        transport.respond(200, written).await;
        transport.respond(200, written).await;
        let client = client(&transport);
        let session = client.db("blog");
        let post = Post {
            title: "rust".to_string(),
        };

        let created = session.index_doc(Some("1"), &post).await.unwrap();
        let found: Option<Post> = session.get_doc("1").await.unwrap();
        let missing: Option<Post> = session.get_doc("2").await.unwrap();
        session.update_doc("1", &json!({ "title": "tokio" })).await.unwrap();
        session.delete_doc("1").await.unwrap();

        assert_eq!(created.result, "created");
        assert_eq!(found, Some(post));
        assert_eq!(missing, None);

        let requests = transport.recorded().await;
        let routes: Vec<(Method, &str)> = requests
            .iter()
            .map(|request| (request.method, request.path.as_str()))
            .collect();
        assert_eq!(
            routes,
            vec![
                (Method::Put, "/blog/_doc/1"),
                (Method::Get, "/blog/_doc/1"),
                (Method::Get, "/blog/_doc/2"),
                (Method::Post, "/blog/_update/1"),
                (Method::Delete, "/blog/_doc/1"),
            ]
        );
        assert_eq!(
            requests[3].body.as_deref(),
            Some(r#"{"doc":{"title":"tokio"}}"#)
        );
    }

    #[tokio::test]
    async fn test_index_doc_without_id() {
        let transport = MockTransport::new();
        transport
            .respond(201, r#"{"_index":"blog","_id":"abc","result":"created"}"#)
            .await;
        let client = client(&transport);

        let result = client
            .db("blog")
            .index_doc(None, &json!({ "title": "rust" }))
            .await
            .unwrap();

        assert_eq!(result.id, "abc");
        assert_eq!(transport.recorded().await[0].path, "/blog/_doc");
    }

    #[tokio::test]
    async fn test_document_id_is_one_path_segment() {
        let transport = MockTransport::new();
        let written = r#"{"_index":"blog","_id":"x","result":"deleted"}"#;
        transport.respond(200, written).await;
        transport.respond(200, written).await;
        let client = client(&transport);
        let session = client.db("blog");

        session.delete_doc("../../other/_doc/7").await.unwrap();
        session.update_doc("a?b#c", &json!({ "title": "rust" })).await.unwrap();

        let requests = transport.recorded().await;
        assert_eq!(requests[0].path, "/blog/_doc/..%2F..%2Fother%2F_doc%2F7");
        assert_eq!(requests[1].path, "/blog/_update/a%3Fb%23c");
        assert!(requests[1].query.is_empty());
    }

    #[tokio::test]
    async fn test_dot_segment_ids_rejected() {
        let transport = MockTransport::new();
        let client = client(&transport);
        let session = client.db("blog");

        for id in ["", ".", ".."] {
            let err = session.delete_doc(id).await.unwrap_err();
            assert!(matches!(err, SearchError::InvalidDocumentId(_)));
        }
        assert!(transport.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn test_document_endpoints_need_one_index() {
        let transport = MockTransport::new();
        let client = client(&transport);

        let err = client.db("blog,author").get_doc::<Post>("1").await.unwrap_err();

        assert!(matches!(err, SearchError::InvalidIndexName(_)));
        assert!(transport.recorded().await.is_empty());
    }
}
