use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{AUTHORIZATION, HeaderValue, InvalidHeaderValue};

/// An [`HttpClient`] wrapper that sends `Authorization: Basic` credentials.
///
/// The header is marked sensitive so it is redacted from `Debug` output.
/// Credentials never appear in the request URL, which reqwest includes in
/// its error messages.
pub struct BasicAuth<C> {
    inner: C,
    header: HeaderValue,
}

impl<C> BasicAuth<C> {
    pub fn new(inner: C, username: &str, password: &str) -> Result<Self, InvalidHeaderValue> {
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        let mut header = HeaderValue::from_str(&format!("Basic {encoded}"))?;
        header.set_sensitive(true);
        Ok(Self { inner, header })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for BasicAuth<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut().insert(AUTHORIZATION, self.header.clone());
        self.inner.execute(req).await
    }
}
