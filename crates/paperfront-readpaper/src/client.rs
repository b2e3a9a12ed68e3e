use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use paperfront_core::{Credentials, PaperCatalog, PaperRecord, ReadPaperConfig};

use crate::error::{ReadPaperError, Result};
use crate::http::{Session, take_data};

const API_PREFIX: &str = "/api/microService-app-aiKnowledge";
const ALL_PAPERS: &str = "/client/doc/getDocListByFolderId";
const ALL_TAGS: &str = "/userDoc/getUserAllClassifyList";
const NOTE_BY_PDF_ID: &str = "/paperNote/getOwnerPaperNoteBaseInfo";
const NOTE_BY_NOTE_ID: &str = "/paperNote/getPaperNoteBaseInfoById";
const ANNOTATIONS: &str = "/pdfMark/v2/web/getByNote";
const USER_AGENT: &str = "paperfront/0.1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Scope<'a> {
    org_id: &'a str,
    app_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocListRequest<'a> {
    folder_id: &'a str,
    sort_type: u8,
    #[serde(flatten)]
    scope: Scope<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NoteInfoRequest<'a> {
    pdf_id: &'a str,
    note_id: &'a str,
    paper_id: &'a str,
    #[serde(flatten)]
    scope: Scope<'a>,
}

/// Client for the ReadPaper "aiKnowledge" web API.
pub struct ReadPaperClient {
    session: Session,
    base_url: String,
    org_id: String,
    app_id: String,
}

impl ReadPaperClient {
    pub fn new(config: &ReadPaperConfig, credentials: &Credentials) -> Result<Self> {
        let session = Session::new(&config.base_url, credentials, USER_AGENT)?;
        Ok(Self {
            session,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            org_id: config.org_id.clone(),
            app_id: config.app_id.clone(),
        })
    }

    pub fn with_base_url(base_url: &str, credentials: &Credentials) -> Result<Self> {
        let config = ReadPaperConfig {
            base_url: base_url.to_string(),
            ..ReadPaperConfig::default()
        };
        Self::new(&config, credentials)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    fn scope(&self) -> Scope<'_> {
        Scope {
            org_id: &self.org_id,
            app_id: &self.app_id,
        }
    }

    async fn post_data<B: Serialize>(&self, path: &str, body: &B) -> Result<Value> {
        let url = self.endpoint(path);
        debug!(%url, "POST");
        let resp = self.session.post_json(&url, body).await?;
        take_data(&url, resp)
    }

    fn expect_list(path: &str, data: Value) -> Result<Vec<Value>> {
        match data {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(ReadPaperError::Parse(format!(
                "{path}: expected a list, got {other}"
            ))),
        }
    }

    /// Every paper in the user's library, as raw JSON records.
    pub async fn fetch_all_papers(&self) -> Result<Vec<Value>> {
        let body = DocListRequest {
            folder_id: "0",
            sort_type: 0,
            scope: self.scope(),
        };
        let data = self.post_data(ALL_PAPERS, &body).await?;
        Self::expect_list(ALL_PAPERS, data)
    }

    /// Every classification (tag) the user has defined.
    pub async fn fetch_all_tags(&self) -> Result<Vec<Value>> {
        let data = self.post_data(ALL_TAGS, &self.scope()).await?;
        Self::expect_list(ALL_TAGS, data)
    }

    /// Note id and download details for the paper with document id `pdf_id`.
    pub async fn fetch_note_description(&self, pdf_id: &str) -> Result<Value> {
        let body = NoteInfoRequest {
            pdf_id,
            note_id: "",
            paper_id: "",
            scope: self.scope(),
        };
        self.post_data(NOTE_BY_PDF_ID, &body).await
    }

    /// Same payload as [`fetch_note_description`](Self::fetch_note_description), keyed by note id.
    pub async fn fetch_note_description_by_note_id(&self, note_id: &str) -> Result<Value> {
        let body = NoteInfoRequest {
            pdf_id: "",
            note_id,
            paper_id: "",
            scope: self.scope(),
        };
        self.post_data(NOTE_BY_NOTE_ID, &body).await
    }

    /// Highlights and comments on a note. Returns the whole response, not just `data`.
    pub async fn fetch_annotations(&self, note_id: &str) -> Result<Value> {
        let url = self.endpoint(ANNOTATIONS);
        debug!(%url, "GET");
        self.session.get_json(&url, &[("noteId", note_id)]).await
    }
}

#[async_trait]
impl PaperCatalog for ReadPaperClient {
    async fn fetch_all_papers(&self) -> paperfront_core::Result<Vec<PaperRecord>> {
        let raw = ReadPaperClient::fetch_all_papers(self).await?;
        let records = raw
            .iter()
            .filter_map(|v| match PaperRecord::from_json(v) {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(error = %e, "skipping paper entry");
                    None
                }
            })
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn path(endpoint: &str) -> String {
        format!("{API_PREFIX}{endpoint}")
    }

    fn client(base_url: &str) -> ReadPaperClient {
        let mut creds = Credentials::default();
        creds.cookies.insert("SESSION".to_string(), "abc".to_string());
        creds.headers.insert("X-Token".to_string(), "tok".to_string());
        creds.headers.insert("Content-Length".to_string(), "999".to_string());
        ReadPaperClient::with_base_url(base_url, &creds).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_all_papers_sends_fixed_payload() {
        let mut server = Server::new_async().await;

        let m = server
            .mock("POST", path(ALL_PAPERS).as_str())
            .match_header("x-token", "tok")
            .match_header("cookie", Matcher::Regex("SESSION=abc".to_string()))
            .match_body(Matcher::PartialJson(json!({
                "folderId": "0",
                "sortType": 0,
                "orgId": "535992339879038976",
                "appId": "aiKnowledge"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": 1, "data": [{"docName": "Attention Is All You Need", "pdfId": "p1"}]}"#)
            .create_async()
            .await;

        let papers = client(&server.url()).fetch_all_papers().await.unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0]["pdfId"], "p1");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_catalog_skips_untitled_entries() {
        let mut server = Server::new_async().await;

        let _m = server
            .mock("POST", path(ALL_PAPERS).as_str())
            .with_status(200)
            .with_body(
                r#"{"data": [
                    {"docName": "BERT", "authors": ["Devlin"], "publishDate": 1609459200000},
                    {"pdfId": "no-title"}
                ]}"#,
            )
            .create_async()
            .await;

        let c = client(&server.url());
        let records = PaperCatalog::fetch_all_papers(&c).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "BERT");
        assert_eq!(records[0].publish_date_ms, 1609459200000);
    }

    #[tokio::test]
    async fn test_fetch_all_tags() {
        let mut server = Server::new_async().await;

        let _m = server
            .mock("POST", path(ALL_TAGS).as_str())
            .match_body(Matcher::Json(json!({
                "orgId": "535992339879038976",
                "appId": "aiKnowledge"
            })))
            .with_status(200)
            .with_body(r#"{"data": [{"classifyName": "nlp"}, {"classifyName": "cv"}]}"#)
            .create_async()
            .await;

        let tags = client(&server.url()).fetch_all_tags().await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1]["classifyName"], "cv");
    }

    #[tokio::test]
    async fn test_note_description_lookups() {
        let mut server = Server::new_async().await;

        let _by_pdf = server
            .mock("POST", path(NOTE_BY_PDF_ID).as_str())
            .match_body(Matcher::PartialJson(json!({
                "pdfId": "p1", "noteId": "", "paperId": ""
            })))
            .with_status(200)
            .with_body(r#"{"data": {"noteId": "n1", "pdfId": "p1"}}"#)
            .create_async()
            .await;
        let _by_note = server
            .mock("POST", path(NOTE_BY_NOTE_ID).as_str())
            .match_body(Matcher::PartialJson(json!({
                "pdfId": "", "noteId": "n1", "paperId": ""
            })))
            .with_status(200)
            .with_body(r#"{"data": {"noteId": "n1", "pdfId": "p1"}}"#)
            .create_async()
            .await;

        let c = client(&server.url());
        let a = c.fetch_note_description("p1").await.unwrap();
        let b = c.fetch_note_description_by_note_id("n1").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a["noteId"], "n1");
    }

    #[tokio::test]
    async fn test_annotations_get_without_content_length() {
        let mut server = Server::new_async().await;

        let m = server
            .mock("GET", path(ANNOTATIONS).as_str())
            .match_query(Matcher::UrlEncoded("noteId".to_string(), "n1".to_string()))
            .match_header("content-length", Matcher::Missing)
            .match_header("x-token", "tok")
            .with_status(200)
            .with_body(r#"{"status": 1, "data": [{"text": "highlight"}]}"#)
            .create_async()
            .await;

        let body = client(&server.url()).fetch_annotations("n1").await.unwrap();
        assert_eq!(body["status"], 1);
        assert_eq!(body["data"][0]["text"], "highlight");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let mut server = Server::new_async().await;

        let _m = server
            .mock("POST", path(ALL_PAPERS).as_str())
            .with_status(401)
            .with_body("login required")
            .create_async()
            .await;

        let err = client(&server.url()).fetch_all_papers().await.unwrap_err();
        match err {
            ReadPaperError::ApiError(_, msg) => assert!(msg.contains("401")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let mut server = Server::new_async().await;

        let _m = server
            .mock("POST", path(ALL_PAPERS).as_str())
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = client(&server.url()).fetch_all_papers().await.unwrap_err();
        assert!(matches!(err, ReadPaperError::Parse(_)));
    }

    #[tokio::test]
    async fn test_catalog_error_maps_to_core_error() {
        let mut server = Server::new_async().await;

        let _m = server
            .mock("POST", path(ALL_PAPERS).as_str())
            .with_status(200)
            .with_body(r#"{"data": {"not": "a list"}}"#)
            .create_async()
            .await;

        let c = client(&server.url());
        let err = PaperCatalog::fetch_all_papers(&c).await.unwrap_err();
        assert!(matches!(err, paperfront_core::PaperfrontError::Catalog(_)));
    }
}
