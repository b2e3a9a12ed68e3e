use std::sync::Arc;

use reqwest::Url;
use reqwest::cookie::Jar;
use reqwest::header::{CONTENT_LENGTH, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;

use paperfront_core::Credentials;

use crate::error::{ReadPaperError, Result};

// ─── Session ──────────────────────────────────────────────────────────────────

/// One logged-in browser session: a cookie jar and header set reused by every request.
pub struct Session {
    client: reqwest::Client,
    headers: HeaderMap,
}

impl Session {
    pub fn new(base_url: &str, credentials: &Credentials, user_agent: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| ReadPaperError::InvalidUrl(format!("{base_url}: {e}")))?;

        let jar = Arc::new(Jar::default());
        for (name, value) in &credentials.cookies {
            jar.add_cookie_str(&format!("{name}={value}"), &url);
        }

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .cookie_provider(jar)
            .build()?;

        Ok(Self {
            client,
            headers: header_map(credentials)?,
        })
    }

    /// Headers captured from the browser, minus `Content-Length`.
    ///
    /// A captured length never matches the body we send; the server truncates the
    /// response when it is short and hangs when it is long.
    pub fn request_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();
        headers.remove(CONTENT_LENGTH);
        headers
    }

    pub async fn post_json<B: Serialize>(&self, url: &str, body: &B) -> Result<Value> {
        let resp = self
            .client
            .post(url)
            .headers(self.request_headers())
            .json(body)
            .send()
            .await?;
        read_json(url, resp).await
    }

    pub async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        let resp = self
            .client
            .get(url)
            .headers(self.request_headers())
            .query(query)
            .send()
            .await?;
        read_json(url, resp).await
    }
}

async fn read_json(url: &str, resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ReadPaperError::ApiError(
            url.to_string(),
            format!("HTTP {}: {body}", status.as_u16()),
        ));
    }
    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|e| ReadPaperError::Parse(e.to_string()))
}

fn header_map(credentials: &Credentials) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &credentials.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ReadPaperError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ReadPaperError::InvalidHeader(format!("{name}: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// The `data` member of a response envelope.
pub fn take_data(url: &str, mut body: Value) -> Result<Value> {
    match body.get_mut("data") {
        Some(data) => Ok(data.take()),
        None => Err(ReadPaperError::Parse(format!("{url}: response has no `data` field"))),
    }
}
