use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::catalog::{RiskCatalogEntry, RiskCatalogRepository};
use crate::error::DomainResult;
use crate::forecast::{forecast_prediction, ForecastDirection, ForecastProvider, ForecastRequest};
use crate::rate::{mitigation_effectivity, priority_of, Effectivity, Priority};
use crate::registry::{RiskKey, RiskRegistry};
use crate::tenant::{RiskUser, TenantContext};

/// One assembled report row. Derived and transient; recomputed on every
/// request, never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RiskReportRow {
    pub risk_name: String,
    pub risk_desc: String,
    pub priority: Priority,
    pub forecast_prediction: ForecastDirection,
    pub mitigation_effectivity: Effectivity,
}

impl RiskReportRow {
    /// Row for an entry whose computation could not produce figures.
    fn degraded(entry: &RiskCatalogEntry) -> Self {
        Self {
            risk_name: entry.risk_name.clone(),
            risk_desc: entry.risk_desc.clone(),
            priority: Priority::Unavailable,
            forecast_prediction: ForecastDirection::Unavailable,
            mitigation_effectivity: Effectivity::InsufficientData,
        }
    }
}

/// Assembles the risk report for one tenant: loads the catalog, dispatches
/// every entry through the registry, and combines rate, forecast, and
/// effectivity figures. One entry's failure never aborts the batch.
pub struct RiskReportService {
    catalog: Arc<dyn RiskCatalogRepository>,
    registry: Arc<RiskRegistry>,
    forecast: Arc<dyn ForecastProvider>,
}

impl RiskReportService {
    pub fn new(
        catalog: Arc<dyn RiskCatalogRepository>,
        registry: Arc<RiskRegistry>,
        forecast: Arc<dyn ForecastProvider>,
    ) -> Self {
        Self {
            catalog,
            registry,
            forecast,
        }
    }

    /// Catalog load failure is the only terminal error; every loaded entry
    /// yields exactly one row.
    pub async fn report_for(
        &self,
        user: RiskUser,
        tenant: &TenantContext,
    ) -> DomainResult<Vec<RiskReportRow>> {
        debug!(%user, tenant_id = tenant.tenant_id, "loading risk catalog");
        let entries = self.catalog.list_for_user(user, tenant.tenant_id).await?;

        let mut rows = Vec::with_capacity(entries.len());
        for entry in &entries {
            rows.push(self.row_for(entry, tenant).await);
        }

        info!(
            %user,
            tenant_id = tenant.tenant_id,
            rows = rows.len(),
            "assembled risk report"
        );
        Ok(rows)
    }

    async fn row_for(&self, entry: &RiskCatalogEntry, tenant: &TenantContext) -> RiskReportRow {
        let key = RiskKey::of_entry(entry);

        let Some(computer) = self.registry.lookup(&key) else {
            warn!(
                risk_name = %entry.risk_name,
                risk_group = %entry.risk_group,
                "no computer registered for catalog entry"
            );
            return RiskReportRow::degraded(entry);
        };

        let series = match computer.rate_series(tenant).await {
            Ok(series) => series,
            Err(e) => {
                error!(
                    risk_name = %entry.risk_name,
                    error = %e,
                    "risk computation failed, emitting degraded row"
                );
                return RiskReportRow::degraded(entry);
            }
        };

        let current_rate = series.last().map(|point| point.rate);
        let prediction = self
            .prediction_for(computer.forecast_endpoint(), entry, tenant)
            .await;

        RiskReportRow {
            risk_name: entry.risk_name.clone(),
            risk_desc: entry.risk_desc.clone(),
            priority: priority_of(current_rate),
            forecast_prediction: prediction,
            mitigation_effectivity: mitigation_effectivity(&series),
        }
    }

    /// Forecast failures only degrade the forecast column, never the row.
    async fn prediction_for(
        &self,
        endpoint: &str,
        entry: &RiskCatalogEntry,
        tenant: &TenantContext,
    ) -> ForecastDirection {
        let Some(code) = tenant.entity_code.clone() else {
            warn!(
                risk_name = %entry.risk_name,
                tenant_id = tenant.tenant_id,
                "tenant has no forecast entity code"
            );
            return ForecastDirection::Unavailable;
        };

        let request = ForecastRequest {
            endpoint: endpoint.to_string(),
            user: entry.risk_user,
            code,
        };

        match self.forecast.fetch_forecast(&request).await {
            Ok(series) => forecast_prediction(&series),
            Err(e) => {
                warn!(
                    risk_name = %entry.risk_name,
                    endpoint,
                    error = %e,
                    "forecast lookup failed"
                );
                ForecastDirection::Unavailable
            }
        }
    }
}
