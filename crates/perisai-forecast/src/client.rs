use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use perisai_domain::error::{DomainError, DomainResult};
use perisai_domain::forecast::{ForecastProvider, ForecastRequest, ForecastSeries};
use perisai_domain::tenant::RiskUser;
use serde_json::Value;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the external forecast service. Every failure maps to
/// `DomainError::ForecastUnavailable` so callers degrade the forecast
/// column instead of failing the report row.
pub struct ForecastClient {
    http: reqwest::Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build forecast HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

/// The request field the service expects the caller code under.
fn code_field(user: RiskUser) -> &'static str {
    match user {
        RiskUser::Industry => "industry_code",
        RiskUser::Supplier => "supplier_code",
        RiskUser::Retail => "retail_code",
    }
}

fn request_body(request: &ForecastRequest) -> Value {
    let mut body = serde_json::Map::new();
    body.insert("endpoint".to_string(), Value::from(request.endpoint.clone()));
    body.insert(
        code_field(request.user).to_string(),
        Value::from(request.code.clone()),
    );
    Value::Object(body)
}

#[async_trait]
impl ForecastProvider for ForecastClient {
    async fn fetch_forecast(&self, request: &ForecastRequest) -> DomainResult<ForecastSeries> {
        let url = format!("{}/forecast", self.base_url);
        debug!(endpoint = %request.endpoint, %url, "querying forecast service");

        let response = self
            .http
            .post(&url)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| DomainError::ForecastUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| DomainError::ForecastUnavailable(e.to_string()))?;

        response
            .json::<ForecastSeries>()
            .await
            .map_err(|e| DomainError::ForecastUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_field_per_risk_user() {
        assert_eq!(code_field(RiskUser::Industry), "industry_code");
        assert_eq!(code_field(RiskUser::Supplier), "supplier_code");
        assert_eq!(code_field(RiskUser::Retail), "retail_code");
    }

    #[test]
    fn test_request_body_shape() {
        let request = ForecastRequest {
            endpoint: "late-shipment".to_string(),
            user: RiskUser::Supplier,
            code: "SUP-042".to_string(),
        };

        let body = request_body(&request);
        assert_eq!(body["endpoint"], "late-shipment");
        assert_eq!(body["supplier_code"], "SUP-042");
        assert!(body.get("industry_code").is_none());
    }
}
