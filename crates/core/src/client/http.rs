use crate::client::{ApiError, CostApi};
use crate::config::Settings;
use crate::domain::analysis::CostAnalysis;
use crate::domain::cost::{validate_batch, CategoryTotal, CostRecord};
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::time::Duration;

const COSTS_PATH: &str = "/costs";
const ANALYSIS_PATH: &str = "/costs/analysis";
const LATEST_PATH: &str = "/costs/latest";
const SUMMARY_PATH: &str = "/costs/summary";
const RESOURCE_PATH: &str = "/costs/resource";
const DATES_PATH: &str = "/costs/dates";

#[derive(Debug, Clone)]
pub struct HttpCostApi {
    http: reqwest::Client,
    base_url: String,
    max_attempts: u32,
}

impl HttpCostApi {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(
            &settings.api_base_url,
            Duration::from_secs(settings.api_timeout_secs),
            settings.api_retries,
        )
    }

    pub fn new(base_url: &str, timeout: Duration, max_attempts: u32) -> anyhow::Result<Self> {
        let parsed = reqwest::Url::parse(base_url)
            .with_context(|| format!("invalid API base url: {base_url}"))?;
        anyhow::ensure!(
            matches!(parsed.scheme(), "http" | "https"),
            "API base url must be http(s), got {base_url}"
        );

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build cost API http client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_attempts: max_attempts.max(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Up to 20 most recent records, newest `usage_date` first.
    pub async fn fetch_latest_costs(&self) -> Result<Vec<CostRecord>, ApiError> {
        self.fetch_records(self.url(LATEST_PATH), &[]).await
    }

    pub async fn fetch_category_summary(&self) -> Result<Vec<CategoryTotal>, ApiError> {
        self.get_json(self.url(SUMMARY_PATH), &[]).await
    }

    pub async fn fetch_costs_for_resource(
        &self,
        resource_id: &str,
    ) -> Result<Vec<CostRecord>, ApiError> {
        let base = self.url(RESOURCE_PATH);
        let mut url = reqwest::Url::parse(&base)
            .map_err(|err| ApiError::decode(&base, format!("invalid request url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::decode(&base, "base url cannot carry path segments"))?
            .push(resource_id);
        self.fetch_records(url.to_string(), &[]).await
    }

    /// Records with `start <= usage_date <= end`.
    pub async fn fetch_costs_between(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<CostRecord>, ApiError> {
        self.fetch_records(self.url(DATES_PATH), &[("start", start), ("end", end)])
            .await
    }

    async fn fetch_records(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<Vec<CostRecord>, ApiError> {
        let records: Vec<CostRecord> = self.get_json(url.clone(), query).await?;
        validate_batch(&records).map_err(|err| ApiError::decode(&url, format!("{err:#}")))?;
        Ok(records)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.get_once(&url, query).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !err.is_retryable() {
                        return Err(err);
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1).min(5));
                    tracing::warn!(
                        attempt,
                        ?backoff,
                        %url,
                        error = %err,
                        "cost API request failed; retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| ApiError::network(url, &err))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|err| ApiError::network(url, &err))?;

        if !status.is_success() {
            return Err(ApiError::Http {
                url: url.to_string(),
                status,
                body: text,
            });
        }

        tracing::debug!(%url, %status, bytes = text.len(), "cost API response");

        serde_json::from_str::<T>(&text).map_err(|err| ApiError::decode(url, err.to_string()))
    }
}

#[async_trait::async_trait]
impl CostApi for HttpCostApi {
    async fn fetch_costs(&self) -> Result<Vec<CostRecord>, ApiError> {
        self.fetch_records(self.url(COSTS_PATH), &[]).await
    }

    async fn fetch_cost_analysis(&self) -> Result<CostAnalysis, ApiError> {
        self.get_json(self.url(ANALYSIS_PATH), &[]).await
    }
}
