use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::catalog::query::ListQuery;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

pub mod models;

pub use models::{Anime, AnimePage};
use models::{AnimeListResponse, AnimeResponse};

/// Read-only access to the anime catalog.
///
/// Every failure (transport, timeout, non-2xx, bad body) comes back as
/// `Err`; callers are not expected to tell them apart.
#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_anime(&self, query: &ListQuery) -> Result<AnimePage>;
    async fn get_anime(&self, id: u64) -> Result<Anime>;
}

pub struct JikanClient {
    client: Client,
    base_url: String,
}

impl JikanClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("anidex/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<T> {
        debug!(url = %url, params = ?params, "Requesting Jikan");

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .inspect_err(|e| warn!(url = %url, error = %e, "Jikan request failed"))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Jikan returned an error status");
            return Err(Error::Api { status });
        }

        let body = response
            .json::<T>()
            .await
            .inspect_err(|e| warn!(url = %url, error = %e, "Failed to decode Jikan response"))?;
        Ok(body)
    }
}

#[async_trait::async_trait]
impl CatalogApi for JikanClient {
    async fn list_anime(&self, query: &ListQuery) -> Result<AnimePage> {
        let url = format!("{}/anime", self.base_url);
        let resp: AnimeListResponse = self.get_json(&url, query.pairs()).await?;
        debug!(
            count = resp.data.len(),
            last_page = resp.pagination.last_visible_page,
            "Fetched anime list"
        );
        Ok(resp.into())
    }

    async fn get_anime(&self, id: u64) -> Result<Anime> {
        let url = format!("{}/anime/{}", self.base_url, id);
        let resp: AnimeResponse = self.get_json(&url, &[]).await?;
        Ok(resp.data)
    }
}
