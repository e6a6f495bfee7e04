pub mod broker;
pub mod catalog;
pub mod error;
pub mod forecast;
pub mod gateway;
pub mod inventory_service;
pub mod rate;
pub mod records;
pub mod registry;
pub mod report_service;
pub mod tenant;
pub mod trend;

pub use broker::{BrokerRpc, RpcRequest, BROKER_RPC_TIMEOUT};
pub use catalog::{RiskCatalogEntry, RiskCatalogRepository};
pub use error::{BrokerError, DomainError, DomainResult};
pub use forecast::{
    forecast_prediction, ForecastDirection, ForecastProvider, ForecastRequest, ForecastSeries,
    SeriesPoint,
};
pub use gateway::{FallbackRead, RecordGateway};
pub use inventory_service::{InventoryService, ReceiveSummary};
pub use rate::{
    decline_rate, growth_rate, mitigation_effectivity, priority_of, rate_of, round2, Effectivity,
    Priority, PRIORITY_HIGH_THRESHOLD, PRIORITY_MEDIUM_THRESHOLD, RECENT_PERIOD_WINDOW,
};
pub use records::{
    filter_tenant, HistoryShipment, InspectionProduct, LetterOfAgreement, ProductionRequest,
    Receive, ReceiveDetail, Rfq, TenantScoped, Transfer,
};
pub use registry::{DomainGateways, RiskComputer, RiskKey, RiskRegistry};
pub use report_service::{RiskReportRow, RiskReportService};
pub use tenant::{RiskUser, TenantContext};
pub use trend::{
    aggregate_monthly, aggregate_yearly, rate_series, recent_window, Outcome, RatePoint,
    TrendPoint,
};
