use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::DomainResult;
use crate::gateway::RecordGateway;
use crate::rate::rate_of;
use crate::records::{Receive, Transfer};
use crate::tenant::TenantContext;
use crate::trend::{
    aggregate_monthly, aggregate_yearly, classify_receive, classify_transfer, receive_period,
    transfer_period, TrendPoint,
};

/// Accept/reject totals across the whole receive history, consistent with
/// the per-year trend the totals are folded from.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReceiveSummary {
    pub total_quantity: f64,
    pub total_accept: f64,
    pub total_reject: f64,
    pub accept_rate: f64,
    pub reject_rate: f64,
}

/// Trend statistics over the inventory domain (receives and transfers).
pub struct InventoryService {
    receives: Arc<RecordGateway<Receive>>,
    transfers: Arc<RecordGateway<Transfer>>,
}

impl InventoryService {
    pub fn new(
        receives: Arc<RecordGateway<Receive>>,
        transfers: Arc<RecordGateway<Transfer>>,
    ) -> Self {
        Self {
            receives,
            transfers,
        }
    }

    /// Accepted/rejected quantities per calendar year, ascending.
    pub async fn receive_trend_yearly(
        &self,
        tenant: &TenantContext,
    ) -> DomainResult<Vec<TrendPoint>> {
        let records = self.receives.fetch(tenant).await?;
        Ok(aggregate_yearly(&records, receive_period, classify_receive))
    }

    /// Accepted/rejected quantities per calendar month, chronological.
    pub async fn receive_trend_monthly(
        &self,
        tenant: &TenantContext,
    ) -> DomainResult<Vec<TrendPoint>> {
        let records = self.receives.fetch(tenant).await?;
        Ok(aggregate_monthly(&records, receive_period, classify_receive))
    }

    /// On-time/late transfer counts per calendar year, ascending.
    pub async fn transfer_trend_yearly(
        &self,
        tenant: &TenantContext,
    ) -> DomainResult<Vec<TrendPoint>> {
        let records = self.transfers.fetch(tenant).await?;
        Ok(aggregate_yearly(&records, transfer_period, classify_transfer))
    }

    pub async fn receive_summary(&self, tenant: &TenantContext) -> DomainResult<ReceiveSummary> {
        let trend = self.receive_trend_yearly(tenant).await?;

        let total_accept: f64 = trend.iter().map(|point| point.conforming).sum();
        let total_reject: f64 = trend.iter().map(|point| point.nonconforming).sum();
        let total_quantity = total_accept + total_reject;

        debug!(
            tenant_id = tenant.tenant_id,
            total_quantity, "computed receive summary"
        );

        Ok(ReceiveSummary {
            total_quantity,
            total_accept,
            total_reject,
            accept_rate: rate_of(total_accept, total_quantity),
            reject_rate: rate_of(total_reject, total_quantity),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MockBrokerRpc;
    use crate::gateway::MockFallbackRead;
    use serde_json::json;

    fn wire_receive(pkid: i64, date: &str, accepted: f64, rejected: f64) -> serde_json::Value {
        json!({
            "pkid": pkid,
            "tenant_id": 1,
            "received_date": date,
            "receiveDetails": [
                { "accepted_quantity": accepted, "rejected_quantity": rejected }
            ]
        })
    }

    fn service_with_reply(reply: serde_json::Value) -> InventoryService {
        let mut receive_rpc = MockBrokerRpc::new();
        receive_rpc
            .expect_call()
            .returning(move |_, _, _| Ok(reply.clone()));
        let mut receive_fallback = MockFallbackRead::<Receive>::new();
        receive_fallback.expect_read().times(0);

        let transfer_rpc = MockBrokerRpc::new();
        let transfer_fallback = MockFallbackRead::<Transfer>::new();

        InventoryService::new(
            Arc::new(RecordGateway::receives(
                Arc::new(receive_rpc),
                Arc::new(receive_fallback),
            )),
            Arc::new(RecordGateway::transfers(
                Arc::new(transfer_rpc),
                Arc::new(transfer_fallback),
            )),
        )
    }

    #[tokio::test]
    async fn test_summary_over_two_years_of_receives() {
        // 10 receive records across 2023-2024.
        let reply = json!([
            wire_receive(1, "2023-01-10", 80.0, 20.0),
            wire_receive(2, "2023-02-11", 90.0, 10.0),
            wire_receive(3, "2023-04-12", 70.0, 30.0),
            wire_receive(4, "2023-07-13", 100.0, 0.0),
            wire_receive(5, "2023-11-14", 60.0, 40.0),
            wire_receive(6, "2024-01-15", 95.0, 5.0),
            wire_receive(7, "2024-03-16", 85.0, 15.0),
            wire_receive(8, "2024-06-17", 75.0, 25.0),
            wire_receive(9, "2024-09-18", 90.0, 10.0),
            wire_receive(10, "2024-12-19", 55.0, 45.0),
        ]);

        let service = service_with_reply(reply);
        let tenant = TenantContext::new(1, "token");

        let trend = service.receive_trend_yearly(&tenant).await.unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].period, "2023");
        assert_eq!(trend[0].conforming, 400.0);
        assert_eq!(trend[0].nonconforming, 100.0);
        assert_eq!(trend[1].period, "2024");
        assert_eq!(trend[1].conforming, 400.0);
        assert_eq!(trend[1].nonconforming, 100.0);

        let summary = service.receive_summary(&tenant).await.unwrap();
        assert_eq!(summary.total_quantity, 1000.0);
        assert_eq!(summary.total_accept, 800.0);
        assert_eq!(summary.total_reject, 200.0);
        assert_eq!(summary.accept_rate, 80.0);
        assert_eq!(summary.reject_rate, 20.0);

        // The summary folds exactly the quantities the yearly trend carries.
        let folded: f64 = trend
            .iter()
            .map(|p| p.conforming + p.nonconforming)
            .sum();
        assert_eq!(summary.total_quantity, folded);
    }

    #[tokio::test]
    async fn test_summary_of_empty_history_is_all_zero() {
        let service = service_with_reply(json!([]));
        let tenant = TenantContext::new(1, "token");

        let summary = service.receive_summary(&tenant).await.unwrap();
        assert_eq!(summary.total_quantity, 0.0);
        assert_eq!(summary.accept_rate, 0.0);
        assert_eq!(summary.reject_rate, 0.0);
    }

    #[tokio::test]
    async fn test_monthly_trend_buckets_by_month() {
        let reply = json!([
            wire_receive(1, "2024-01-10", 10.0, 0.0),
            wire_receive(2, "2024-01-20", 10.0, 2.0),
            wire_receive(3, "2024-02-01", 5.0, 5.0),
        ]);

        let service = service_with_reply(reply);
        let tenant = TenantContext::new(1, "token");

        let trend = service.receive_trend_monthly(&tenant).await.unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].period, "Jan 2024");
        assert_eq!(trend[0].conforming, 20.0);
        assert_eq!(trend[1].period, "Feb 2024");
        assert_eq!(trend[1].nonconforming, 5.0);
    }
}
