use async_trait::async_trait;
use perisai_domain::error::{DomainError, DomainResult};
use perisai_domain::gateway::FallbackRead;
use perisai_domain::records::ProductionRequest;
use perisai_domain::tenant::TenantContext;
use tracing::debug;

use crate::client::PostgresClient;

pub struct PostgresProductionReader {
    client: PostgresClient,
}

impl PostgresProductionReader {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FallbackRead<ProductionRequest> for PostgresProductionReader {
    async fn read(&self, tenant: &TenantContext) -> DomainResult<Vec<ProductionRequest>> {
        debug!(
            tenant_id = tenant.tenant_id,
            "reading production requests from secondary store"
        );

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT pkid, tenant_id, target_finish_date, finished_date
                 FROM production_requests
                 WHERE (tenant_id = $1 OR tenant_id IS NULL)
                   AND (is_deleted = FALSE OR is_deleted IS NULL)
                 ORDER BY pkid",
                &[&tenant.tenant_id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(rows
            .into_iter()
            .map(|row| ProductionRequest {
                pkid: row.get(0),
                tenant_id: row.get(1),
                target_finish_date: row.get(2),
                finished_date: row.get(3),
            })
            .collect())
    }
}
