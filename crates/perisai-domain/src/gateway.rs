use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::broker::{
    BrokerRpc, RpcRequest, BROKER_RPC_TIMEOUT, QUEUE_GET_HISTORY_SHIPMENTS,
    QUEUE_GET_INSPECTION_PRODUCTS, QUEUE_GET_LETTERS_OF_AGREEMENT,
    QUEUE_GET_PRODUCTION_REQUESTS, QUEUE_GET_RECEIVES, QUEUE_GET_RFQS, QUEUE_GET_TRANSFERS,
};
use crate::error::{DomainError, DomainResult};
use crate::records::{
    filter_tenant, HistoryShipment, InspectionProduct, LetterOfAgreement, ProductionRequest,
    Receive, Rfq, TenantScoped, Transfer,
};
use crate::tenant::TenantContext;

/// Direct read against the owning domain's secondary store, used only when
/// the broker exchange degrades. Infrastructure (perisai-postgres)
/// implements this trait per record type.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FallbackRead<T: Send + Sync + 'static>: Send + Sync {
    async fn read(&self, tenant: &TenantContext) -> DomainResult<Vec<T>>;
}

type DecodeFn<T> = fn(Value) -> serde_json::Result<Vec<T>>;

/// Typed fetch for one domain fact: broker request/reply first, direct
/// secondary read when the exchange times out or the transport fails.
/// Callers observe identical shape and tenant semantics from either path.
pub struct RecordGateway<T: 'static> {
    queue: &'static str,
    decode: DecodeFn<T>,
    rpc: Arc<dyn BrokerRpc>,
    fallback: Arc<dyn FallbackRead<T>>,
}

impl<T> RecordGateway<T>
where
    T: TenantScoped + Send + Sync + 'static,
{
    pub fn new(
        queue: &'static str,
        decode: DecodeFn<T>,
        rpc: Arc<dyn BrokerRpc>,
        fallback: Arc<dyn FallbackRead<T>>,
    ) -> Self {
        Self {
            queue,
            decode,
            rpc,
            fallback,
        }
    }

    pub fn queue(&self) -> &'static str {
        self.queue
    }

    pub async fn fetch(&self, tenant: &TenantContext) -> DomainResult<Vec<T>> {
        let request = RpcRequest::for_tenant(tenant);

        match self.rpc.call(self.queue, request, BROKER_RPC_TIMEOUT).await {
            Ok(reply) => {
                let records = (self.decode)(reply).map_err(|e| DomainError::MalformedReply {
                    queue: self.queue.to_string(),
                    reason: e.to_string(),
                })?;
                debug!(
                    queue = self.queue,
                    path = "broker",
                    count = records.len(),
                    "fetched domain records"
                );
                Ok(filter_tenant(records, tenant.tenant_id))
            }
            Err(err) if err.triggers_fallback() => {
                warn!(
                    queue = self.queue,
                    error = %err,
                    "broker path degraded, reading from secondary store"
                );
                let records = self.fallback.read(tenant).await?;
                debug!(
                    queue = self.queue,
                    path = "fallback",
                    count = records.len(),
                    "fetched domain records"
                );
                Ok(filter_tenant(records, tenant.tenant_id))
            }
            // A reply arrived but broke the serialization contract. That is
            // a hard error, not a degradation.
            Err(err) => Err(DomainError::MalformedReply {
                queue: self.queue.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}

fn decode_records<T: for<'de> Deserialize<'de>>(value: Value) -> serde_json::Result<Vec<T>> {
    serde_json::from_value(value)
}

/// Wire shape of shipment-oriented replies: records grouped per year.
#[derive(Debug, Deserialize)]
struct ShipmentYearWire {
    #[serde(rename = "historyShipments", default)]
    history_shipments: Vec<HistoryShipment>,
}

fn decode_history_shipments(value: Value) -> serde_json::Result<Vec<HistoryShipment>> {
    let years: Vec<ShipmentYearWire> = serde_json::from_value(value)?;
    Ok(years
        .into_iter()
        .flat_map(|year| year.history_shipments)
        .collect())
}

impl RecordGateway<Receive> {
    pub fn receives(rpc: Arc<dyn BrokerRpc>, fallback: Arc<dyn FallbackRead<Receive>>) -> Self {
        Self::new(QUEUE_GET_RECEIVES, decode_records::<Receive>, rpc, fallback)
    }
}

impl RecordGateway<Transfer> {
    pub fn transfers(rpc: Arc<dyn BrokerRpc>, fallback: Arc<dyn FallbackRead<Transfer>>) -> Self {
        Self::new(QUEUE_GET_TRANSFERS, decode_records::<Transfer>, rpc, fallback)
    }
}

impl RecordGateway<ProductionRequest> {
    pub fn production_requests(
        rpc: Arc<dyn BrokerRpc>,
        fallback: Arc<dyn FallbackRead<ProductionRequest>>,
    ) -> Self {
        Self::new(
            QUEUE_GET_PRODUCTION_REQUESTS,
            decode_records::<ProductionRequest>,
            rpc,
            fallback,
        )
    }
}

impl RecordGateway<InspectionProduct> {
    pub fn inspection_products(
        rpc: Arc<dyn BrokerRpc>,
        fallback: Arc<dyn FallbackRead<InspectionProduct>>,
    ) -> Self {
        Self::new(
            QUEUE_GET_INSPECTION_PRODUCTS,
            decode_records::<InspectionProduct>,
            rpc,
            fallback,
        )
    }
}

impl RecordGateway<Rfq> {
    pub fn rfqs(rpc: Arc<dyn BrokerRpc>, fallback: Arc<dyn FallbackRead<Rfq>>) -> Self {
        Self::new(QUEUE_GET_RFQS, decode_records::<Rfq>, rpc, fallback)
    }
}

impl RecordGateway<HistoryShipment> {
    pub fn history_shipments(
        rpc: Arc<dyn BrokerRpc>,
        fallback: Arc<dyn FallbackRead<HistoryShipment>>,
    ) -> Self {
        Self::new(
            QUEUE_GET_HISTORY_SHIPMENTS,
            decode_history_shipments,
            rpc,
            fallback,
        )
    }
}

impl RecordGateway<LetterOfAgreement> {
    pub fn letters_of_agreement(
        rpc: Arc<dyn BrokerRpc>,
        fallback: Arc<dyn FallbackRead<LetterOfAgreement>>,
    ) -> Self {
        Self::new(
            QUEUE_GET_LETTERS_OF_AGREEMENT,
            decode_records::<LetterOfAgreement>,
            rpc,
            fallback,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MockBrokerRpc;
    use crate::error::BrokerError;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;

    fn tenant() -> TenantContext {
        TenantContext::new(1, "Bearer test")
    }

    fn wire_transfer(pkid: i64, tenant_id: Option<i64>) -> Value {
        json!({
            "pkid": pkid,
            "tenant_id": tenant_id,
            "target_deadline_date": "2024-03-01",
            "received_date": null
        })
    }

    fn stored_transfer(pkid: i64, tenant_id: Option<i64>) -> Transfer {
        Transfer {
            pkid,
            tenant_id,
            target_deadline_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            received_date: None,
        }
    }

    #[tokio::test]
    async fn test_broker_reply_is_tenant_filtered() {
        let mut rpc = MockBrokerRpc::new();
        rpc.expect_call()
            .withf(|queue, request, timeout| {
                queue == QUEUE_GET_TRANSFERS
                    && request.tenant_id == 1
                    && *timeout == BROKER_RPC_TIMEOUT
            })
            .times(1)
            .return_once(|_, _, _| {
                Ok(json!([
                    wire_transfer(1, Some(1)),
                    wire_transfer(2, None),
                    wire_transfer(3, Some(2)),
                ]))
            });

        let mut fallback = MockFallbackRead::<Transfer>::new();
        fallback.expect_read().times(0);

        let gateway = RecordGateway::transfers(Arc::new(rpc), Arc::new(fallback));
        let records = gateway.fetch(&tenant()).await.unwrap();

        let pkids: Vec<i64> = records.iter().map(|t| t.pkid).collect();
        assert_eq!(pkids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_secondary_store() {
        let mut rpc = MockBrokerRpc::new();
        rpc.expect_call()
            .times(1)
            .return_once(|_, _, _| Err(BrokerError::Timeout(Duration::from_millis(5000))));

        let mut fallback = MockFallbackRead::<Transfer>::new();
        fallback
            .expect_read()
            .withf(|tenant: &TenantContext| tenant.tenant_id == 1)
            .times(1)
            .return_once(|_| Ok(vec![stored_transfer(7, Some(1)), stored_transfer(8, Some(2))]));

        let gateway = RecordGateway::transfers(Arc::new(rpc), Arc::new(fallback));
        let records = gateway.fetch(&tenant()).await.unwrap();

        // Fallback output goes through the same tenant filter as broker
        // output.
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pkid, 7);
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back() {
        let mut rpc = MockBrokerRpc::new();
        rpc.expect_call()
            .times(1)
            .return_once(|_, _, _| Err(BrokerError::Transport("connection refused".to_string())));

        let mut fallback = MockFallbackRead::<Transfer>::new();
        fallback
            .expect_read()
            .times(1)
            .return_once(|_| Ok(vec![stored_transfer(5, None)]));

        let gateway = RecordGateway::transfers(Arc::new(rpc), Arc::new(fallback));
        let records = gateway.fetch(&tenant()).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_fails_hard_without_fallback() {
        let mut rpc = MockBrokerRpc::new();
        rpc.expect_call()
            .times(1)
            .return_once(|_, _, _| Ok(json!([{ "pkid": "not a number" }])));

        let mut fallback = MockFallbackRead::<Transfer>::new();
        fallback.expect_read().times(0);

        let gateway = RecordGateway::transfers(Arc::new(rpc), Arc::new(fallback));
        let result = gateway.fetch(&tenant()).await;

        assert!(matches!(
            result,
            Err(DomainError::MalformedReply { queue, .. }) if queue == QUEUE_GET_TRANSFERS
        ));
    }

    #[tokio::test]
    async fn test_decode_error_from_transport_fails_hard() {
        let mut rpc = MockBrokerRpc::new();
        rpc.expect_call()
            .times(1)
            .return_once(|_, _, _| Err(BrokerError::Decode("unexpected EOF".to_string())));

        let mut fallback = MockFallbackRead::<Transfer>::new();
        fallback.expect_read().times(0);

        let gateway = RecordGateway::transfers(Arc::new(rpc), Arc::new(fallback));
        let result = gateway.fetch(&tenant()).await;
        assert!(matches!(result, Err(DomainError::MalformedReply { .. })));
    }

    #[tokio::test]
    async fn test_fallback_error_is_terminal() {
        let mut rpc = MockBrokerRpc::new();
        rpc.expect_call()
            .times(1)
            .return_once(|_, _, _| Err(BrokerError::Timeout(Duration::from_millis(5000))));

        let mut fallback = MockFallbackRead::<Transfer>::new();
        fallback
            .expect_read()
            .times(1)
            .return_once(|_| Err(DomainError::RepositoryError(anyhow::anyhow!("db down"))));

        let gateway = RecordGateway::transfers(Arc::new(rpc), Arc::new(fallback));
        let result = gateway.fetch(&tenant()).await;
        assert!(matches!(result, Err(DomainError::RepositoryError(_))));
    }

    #[tokio::test]
    async fn test_shipment_reply_is_flattened() {
        let mut rpc = MockBrokerRpc::new();
        rpc.expect_call().times(1).return_once(|_, _, _| {
            Ok(json!([
                {
                    "year": "2023",
                    "historyShipments": [{
                        "pkid": 1,
                        "tenant_id": 1,
                        "target_arrival_date": "2023-05-01",
                        "arrival_date": "2023-05-03"
                    }]
                },
                {
                    "year": "2024",
                    "historyShipments": [{
                        "pkid": 2,
                        "tenant_id": null,
                        "target_arrival_date": "2024-02-01",
                        "arrival_date": "2024-01-28"
                    }]
                }
            ]))
        });

        let mut fallback = MockFallbackRead::<HistoryShipment>::new();
        fallback.expect_read().times(0);

        let gateway = RecordGateway::history_shipments(Arc::new(rpc), Arc::new(fallback));
        let records = gateway.fetch(&tenant()).await.unwrap();

        let pkids: Vec<i64> = records.iter().map(|s| s.pkid).collect();
        assert_eq!(pkids, vec![1, 2]);
    }
}
