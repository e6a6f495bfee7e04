use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::BrokerError;
use crate::tenant::TenantContext;

/// Reply wait for one broker round-trip. Shared by the transport and the
/// tests that assert on degradation behavior.
pub const BROKER_RPC_TIMEOUT: Duration = Duration::from_millis(5000);

// Well-known request queues, one per domain fact type.
pub const QUEUE_GET_RECEIVES: &str = "rpc_get_receives";
pub const QUEUE_GET_TRANSFERS: &str = "rpc_get_transfers";
pub const QUEUE_GET_PRODUCTION_REQUESTS: &str = "rpc_get_production_requests";
pub const QUEUE_GET_INSPECTION_PRODUCTS: &str = "rpc_get_inspection_products";
pub const QUEUE_GET_RFQS: &str = "rpc_get_rfqs";
pub const QUEUE_GET_HISTORY_SHIPMENTS: &str = "rpc_get_history_shipments";
pub const QUEUE_GET_LETTERS_OF_AGREEMENT: &str = "rpc_get_letters_of_agreement";

#[derive(Debug, Clone, Serialize)]
pub struct RpcHeaders {
    pub authorization: String,
}

/// Request payload published to a domain queue. The correlation token and
/// reply queue identity are owned by the transport, not the payload.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub tenant_id: i64,
    pub headers: RpcHeaders,
    #[serde(flatten)]
    pub args: serde_json::Map<String, Value>,
}

impl RpcRequest {
    pub fn for_tenant(tenant: &TenantContext) -> Self {
        Self {
            tenant_id: tenant.tenant_id,
            headers: RpcHeaders {
                authorization: tenant.authorization.clone(),
            },
            args: serde_json::Map::new(),
        }
    }

    /// Attach a domain-specific argument (supplier pkid, date range, ...).
    pub fn with_arg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.args.insert(key.into(), value);
        self
    }
}

/// One correlated request/reply exchange over the message broker.
/// Infrastructure (perisai-nats) implements this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrokerRpc: Send + Sync {
    /// Publish `request` to `queue` and wait up to `timeout` for the
    /// correlated reply, returning its parsed JSON payload.
    async fn call(
        &self,
        queue: &str,
        request: RpcRequest,
        timeout: Duration,
    ) -> Result<Value, BrokerError>;
}
