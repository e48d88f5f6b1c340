mod basic;
mod client;
mod basic_auth;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use basic_auth::BasicAuth;

use reqwest::StatusCode;

/// Sends `req` and reads the whole body as text, whatever the status.
pub async fn fetch_text<C: HttpClient + ?Sized>(
    client: &C,
    req: reqwest::Request,
) -> reqwest::Result<(StatusCode, String)> {
    let resp = client.execute(req).await?;
    let status = resp.status();
    Ok((status, resp.text().await?))
}
