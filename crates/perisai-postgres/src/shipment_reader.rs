use async_trait::async_trait;
use perisai_domain::error::{DomainError, DomainResult};
use perisai_domain::gateway::FallbackRead;
use perisai_domain::records::HistoryShipment;
use perisai_domain::tenant::TenantContext;
use tracing::debug;

use crate::client::PostgresClient;

/// Reads the flat shipment history. The per-year grouping of the broker
/// reply is a wire concern; the table already holds one row per shipment.
pub struct PostgresShipmentReader {
    client: PostgresClient,
}

impl PostgresShipmentReader {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FallbackRead<HistoryShipment> for PostgresShipmentReader {
    async fn read(&self, tenant: &TenantContext) -> DomainResult<Vec<HistoryShipment>> {
        debug!(
            tenant_id = tenant.tenant_id,
            "reading history shipments from secondary store"
        );

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT pkid, tenant_id, target_arrival_date, arrival_date
                 FROM history_shipments
                 WHERE (tenant_id = $1 OR tenant_id IS NULL)
                   AND (is_deleted = FALSE OR is_deleted IS NULL)
                 ORDER BY pkid",
                &[&tenant.tenant_id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(rows
            .into_iter()
            .map(|row| HistoryShipment {
                pkid: row.get(0),
                tenant_id: row.get(1),
                target_arrival_date: row.get(2),
                arrival_date: row.get(3),
            })
            .collect())
    }
}
