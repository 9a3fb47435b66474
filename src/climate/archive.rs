//! Client for the external historical-archive API.
//!
//! One request per point: latitude/longitude, an inclusive date range, daily
//! max/min temperature in Fahrenheit, timezone resolved by the server. The
//! response is a parallel-array daily series. Rate limits and transient
//! server errors are retried with the configured policy; any other non-2xx
//! status aborts immediately.

use crate::climate::error::ArchiveError;
use crate::climate::retry::{is_retryable_status, RetryPolicy, Sleep};
use bon::bon;
use chrono::NaiveDate;
use log::{info, warn};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

const DAILY_VARIABLES: &str = "temperature_2m_max,temperature_2m_min";

/// Parallel-array daily observation series for one point.
#[derive(Debug, Clone, Deserialize)]
pub struct DailySeries {
    pub time: Vec<NaiveDate>,
    #[serde(rename = "temperature_2m_max")]
    pub hi: Vec<Option<f64>>,
    #[serde(rename = "temperature_2m_min")]
    pub lo: Vec<Option<f64>>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Iterates `(date, max, min)` across the parallel arrays.
    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>, Option<f64>)> + '_ {
        self.time
            .iter()
            .zip(self.hi.iter())
            .zip(self.lo.iter())
            .map(|((date, hi), lo)| (*date, *hi, *lo))
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: DailySeries,
}

enum RequestFailure {
    Retryable(ArchiveError, Option<Duration>),
    Fatal(ArchiveError),
}

/// HTTP client for the climate archive.
pub struct ArchiveClient {
    http: Client,
    base_url: String,
    policy: RetryPolicy,
}

#[bon]
impl ArchiveClient {
    #[builder]
    pub fn new(base_url: Option<String>, policy: Option<RetryPolicy>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            policy: policy.unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the daily max/min series for a coordinate over an inclusive
    /// date range, retrying transient failures per the policy.
    pub async fn daily_series<S: Sleep>(
        &self,
        sleeper: &S,
        lat: f64,
        lon: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailySeries, ArchiveError> {
        let query = [
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
            ("daily", DAILY_VARIABLES.to_string()),
            ("temperature_unit", "fahrenheit".to_string()),
            ("timezone", "auto".to_string()),
        ];

        let mut attempt = 0;
        loop {
            match self.request(&query).await {
                Ok(series) => {
                    info!(
                        "Fetched {} daily observations for ({lat}, {lon})",
                        series.len()
                    );
                    return Ok(series);
                }
                Err(RequestFailure::Retryable(error, hint)) => {
                    attempt += 1;
                    if attempt >= self.policy.max_attempts {
                        return Err(ArchiveError::RetryBudgetExhausted {
                            url: self.base_url.clone(),
                            attempts: attempt,
                            source: Box::new(error),
                        });
                    }
                    let delay = self.policy.delay_for(attempt - 1, hint);
                    warn!(
                        "Archive request failed (attempt {attempt}): {error}; retrying in {delay:?}"
                    );
                    sleeper.sleep(delay).await;
                }
                Err(RequestFailure::Fatal(error)) => return Err(error),
            }
        }
    }

    async fn request(&self, query: &[(&str, String)]) -> Result<DailySeries, RequestFailure> {
        let response = self
            .http
            .get(&self.base_url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                RequestFailure::Retryable(
                    ArchiveError::NetworkRequest(self.base_url.clone(), e),
                    None,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let hint = parse_retry_after(response.headers());
            let error = ArchiveError::HttpStatus {
                url: self.base_url.clone(),
                status,
            };
            return Err(if is_retryable_status(status) {
                RequestFailure::Retryable(error, hint)
            } else {
                RequestFailure::Fatal(error)
            });
        }

        let body: ArchiveResponse = response.json().await.map_err(|e| {
            RequestFailure::Fatal(ArchiveError::ResponseParse(self.base_url.clone(), e))
        })?;

        let daily = body.daily;
        if daily.time.len() != daily.hi.len() || daily.time.len() != daily.lo.len() {
            return Err(RequestFailure::Fatal(ArchiveError::SeriesLengthMismatch {
                url: self.base_url.clone(),
                dates: daily.time.len(),
                hi: daily.hi.len(),
                lo: daily.lo.len(),
            }));
        }
        Ok(daily)
    }
}

impl Default for ArchiveClient {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .map(Duration::from_secs_f64)
}
