use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::catalog::RiskCatalogEntry;
use crate::error::DomainResult;
use crate::gateway::RecordGateway;
use crate::rate::RECENT_PERIOD_WINDOW;
use crate::records::{
    HistoryShipment, InspectionProduct, LetterOfAgreement, ProductionRequest, Receive, Rfq,
    TenantScoped, Transfer,
};
use crate::tenant::{RiskUser, TenantContext};
use crate::trend::{
    agreement_period, aggregate_yearly, classify_agreement, classify_inspection,
    classify_production, classify_receive, classify_rfq, classify_shipment, classify_transfer,
    inspection_period, production_period, rate_series, receive_period, recent_window, rfq_period,
    shipment_period, transfer_period, Outcome, RatePoint,
};

/// Dispatch key for one monitored risk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RiskKey {
    pub user: RiskUser,
    pub group: String,
    pub name: String,
}

impl RiskKey {
    pub fn new(user: RiskUser, group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user,
            group: group.into(),
            name: name.into(),
        }
    }

    pub fn of_entry(entry: &RiskCatalogEntry) -> Self {
        Self {
            user: entry.risk_user,
            group: entry.risk_group.clone(),
            name: entry.risk_name.clone(),
        }
    }
}

/// Computes the windowed rate series for one risk and names the forecast
/// model that predicts it.
#[async_trait]
pub trait RiskComputer: Send + Sync {
    async fn rate_series(&self, tenant: &TenantContext) -> DomainResult<Vec<RatePoint>>;

    fn forecast_endpoint(&self) -> &str;
}

/// Generic computer: gateway fetch, yearly aggregation, recent window,
/// rate conversion.
struct GatewayRisk<T: 'static> {
    gateway: Arc<RecordGateway<T>>,
    period: fn(&T) -> NaiveDate,
    classify: fn(&T) -> Vec<Outcome>,
    endpoint: &'static str,
}

#[async_trait]
impl<T> RiskComputer for GatewayRisk<T>
where
    T: TenantScoped + Send + Sync + 'static,
{
    async fn rate_series(&self, tenant: &TenantContext) -> DomainResult<Vec<RatePoint>> {
        let records = self.gateway.fetch(tenant).await?;
        let series = aggregate_yearly(&records, self.period, self.classify);
        Ok(rate_series(&recent_window(series, RECENT_PERIOD_WINDOW)))
    }

    fn forecast_endpoint(&self) -> &str {
        self.endpoint
    }
}

/// The per-domain gateways the registry composes its computers from.
#[derive(Clone)]
pub struct DomainGateways {
    pub receives: Arc<RecordGateway<Receive>>,
    pub transfers: Arc<RecordGateway<Transfer>>,
    pub production_requests: Arc<RecordGateway<ProductionRequest>>,
    pub inspection_products: Arc<RecordGateway<InspectionProduct>>,
    pub rfqs: Arc<RecordGateway<Rfq>>,
    pub history_shipments: Arc<RecordGateway<HistoryShipment>>,
    pub letters_of_agreement: Arc<RecordGateway<LetterOfAgreement>>,
}

/// Dispatch table from catalog key to computer, built once at startup.
/// Catalog entries with no registered computer produce a degraded report
/// row rather than being skipped.
#[derive(Default)]
pub struct RiskRegistry {
    computers: HashMap<RiskKey, Arc<dyn RiskComputer>>,
}

impl RiskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: RiskKey, computer: Arc<dyn RiskComputer>) {
        self.computers.insert(key, computer);
    }

    pub fn lookup(&self, key: &RiskKey) -> Option<Arc<dyn RiskComputer>> {
        self.computers.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.computers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.computers.is_empty()
    }

    /// The built-in risk catalog handlers.
    pub fn standard(gateways: &DomainGateways) -> Self {
        let mut registry = Self::new();

        registry.register(
            RiskKey::new(RiskUser::Industry, "Inventory", "Material Rejection"),
            Arc::new(GatewayRisk {
                gateway: gateways.receives.clone(),
                period: receive_period,
                classify: classify_receive,
                endpoint: "material-rejection",
            }),
        );
        registry.register(
            RiskKey::new(RiskUser::Industry, "Inventory", "Late Internal Transfer"),
            Arc::new(GatewayRisk {
                gateway: gateways.transfers.clone(),
                period: transfer_period,
                classify: classify_transfer,
                endpoint: "late-transfer",
            }),
        );
        registry.register(
            RiskKey::new(RiskUser::Industry, "Manufacturing", "Late Production"),
            Arc::new(GatewayRisk {
                gateway: gateways.production_requests.clone(),
                period: production_period,
                classify: classify_production,
                endpoint: "late-production",
            }),
        );
        registry.register(
            RiskKey::new(RiskUser::Industry, "Manufacturing", "Defective Production"),
            Arc::new(GatewayRisk {
                gateway: gateways.inspection_products.clone(),
                period: inspection_period,
                classify: classify_inspection,
                endpoint: "defective-production",
            }),
        );
        registry.register(
            RiskKey::new(RiskUser::Supplier, "Procurement", "Late RFQ Response"),
            Arc::new(GatewayRisk {
                gateway: gateways.rfqs.clone(),
                period: rfq_period,
                classify: classify_rfq,
                endpoint: "late-rfq",
            }),
        );
        registry.register(
            RiskKey::new(RiskUser::Supplier, "Contract", "Late Shipment"),
            Arc::new(GatewayRisk {
                gateway: gateways.history_shipments.clone(),
                period: shipment_period,
                classify: classify_shipment,
                endpoint: "late-shipment",
            }),
        );
        registry.register(
            RiskKey::new(RiskUser::Retail, "Agreement", "Agreement Breach"),
            Arc::new(GatewayRisk {
                gateway: gateways.letters_of_agreement.clone(),
                period: agreement_period,
                classify: classify_agreement,
                endpoint: "agreement-breach",
            }),
        );

        registry
    }
}
