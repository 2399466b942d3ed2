use anyhow::{Context as _, anyhow};
use serde::Deserialize;
use url::Url;

use crate::page::{IMAGE_ID, Page};

pub const DEFAULT_ENDPOINT: &str = "https://api.unsplash.com/photos/random";
pub const DEFAULT_CLIENT_ID: &str = "50JaSmCkjZSFtUms6eOWi3NQFZDAAdNCHURx9cewjmg";
pub const DEFAULT_TOPIC: &str = "pelican";

#[derive(Debug, Deserialize)]
struct RandomPhoto {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    small: String,
}

#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    endpoint: Url,
    client_id: String,
}

impl Fetcher {
    pub fn new(
        user_agent: &str,
        endpoint: Url,
        client_id: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            client,
            endpoint,
            client_id: client_id.into(),
        })
    }

    /// One GET for a random photo about `topic`; returns its small variant.
    /// There is no retry.
    pub async fn fetch_random(&self, topic: &str) -> anyhow::Result<Url> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("query", topic)
            .append_pair("client_id", &self.client_id);

        // The query carries the credential; report the bare endpoint only.
        let endpoint = &self.endpoint;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {}", endpoint))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("GET {} failed with status {}", endpoint, status));
        }

        let bytes = resp.bytes().await.context("read response body")?;
        let photo: RandomPhoto =
            serde_json::from_slice(&bytes).context("parse random photo json")?;
        Url::parse(&photo.urls.small)
            .with_context(|| format!("invalid image url {:?}", photo.urls.small))
    }
}

/// Replace the page image with a freshly fetched one.
///
/// Failures are logged and leave the page as it was.
pub async fn swap_image(fetcher: &Fetcher, page: &Page, topic: &str) -> Option<Url> {
    let url = match fetcher.fetch_random(topic).await {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), topic, "fetch random image failed");
            return None;
        }
    };

    if let Err(e) = page.set_image_src(IMAGE_ID, url.as_str()) {
        tracing::error!(error = %format!("{e:#}"), "apply fetched image failed");
        return None;
    }
    tracing::info!(%url, "swapped image");
    Some(url)
}
