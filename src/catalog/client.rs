//! HTTP client for the catalog endpoint.

use super::models::{Catalog, Track};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    const USER_AGENT: &'static str = concat!("lyra/", env!("CARGO_PKG_VERSION"));

    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(Self::USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("build reqwest client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/getMusicList", self.base_url)
    }

    /// Fetch the full track list. Read-only and idempotent.
    pub async fn fetch(&self) -> anyhow::Result<Catalog> {
        let url = self.endpoint();
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("catalog endpoint returned {}", response.status());
        }

        let tracks: Vec<Track> = response.json().await.context("decode catalog json")?;
        tracing::info!(count = tracks.len(), "catalog fetched");
        Ok(Catalog::new(tracks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let c = CatalogClient::new("http://localhost:3000/").unwrap();
        assert_eq!(c.endpoint(), "http://localhost:3000/getMusicList");
    }
}
