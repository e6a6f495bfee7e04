use async_trait::async_trait;
use perisai_domain::error::{DomainError, DomainResult};
use perisai_domain::gateway::FallbackRead;
use perisai_domain::records::InspectionProduct;
use perisai_domain::tenant::TenantContext;
use tracing::debug;

use crate::client::PostgresClient;

pub struct PostgresInspectionReader {
    client: PostgresClient,
}

impl PostgresInspectionReader {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FallbackRead<InspectionProduct> for PostgresInspectionReader {
    async fn read(&self, tenant: &TenantContext) -> DomainResult<Vec<InspectionProduct>> {
        debug!(
            tenant_id = tenant.tenant_id,
            "reading inspection products from secondary store"
        );

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT pkid, tenant_id, inspection_date, passed_quantity, failed_quantity
                 FROM inspection_products
                 WHERE (tenant_id = $1 OR tenant_id IS NULL)
                   AND (is_deleted = FALSE OR is_deleted IS NULL)
                 ORDER BY pkid",
                &[&tenant.tenant_id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(rows
            .into_iter()
            .map(|row| InspectionProduct {
                pkid: row.get(0),
                tenant_id: row.get(1),
                inspection_date: row.get(2),
                passed_quantity: row.get(3),
                failed_quantity: row.get(4),
            })
            .collect())
    }
}
