use async_trait::async_trait;
use perisai_domain::catalog::{RiskCatalogEntry, RiskCatalogRepository};
use perisai_domain::error::{DomainError, DomainResult};
use perisai_domain::tenant::RiskUser;
use tracing::{debug, info};

use crate::client::PostgresClient;

/// Read side of the tenant's risk catalog. The write lifecycle (create,
/// update, soft delete) belongs to the tenant-management service.
pub struct PostgresRiskCatalogRepository {
    client: PostgresClient,
}

impl PostgresRiskCatalogRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RiskCatalogRepository for PostgresRiskCatalogRepository {
    async fn list_for_user(
        &self,
        user: RiskUser,
        tenant_id: i64,
    ) -> DomainResult<Vec<RiskCatalogEntry>> {
        debug!(%user, tenant_id, "loading risk catalog entries");

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT pkid, risk_name, risk_desc, risk_user, risk_group,
                        risk_mitigation, tenant_id
                 FROM risks
                 WHERE risk_user = $1
                   AND (tenant_id = $2 OR tenant_id IS NULL)
                   AND (is_deleted = FALSE OR is_deleted IS NULL)
                 ORDER BY risk_group, risk_name",
                &[&user.to_string(), &tenant_id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let stored_user: String = row.get(3);
            entries.push(RiskCatalogEntry {
                pkid: row.get(0),
                risk_name: row.get(1),
                risk_desc: row.get(2),
                risk_user: stored_user.parse()?,
                risk_group: row.get(4),
                risk_mitigation: row.get(5),
                tenant_id: row.get(6),
            });
        }

        info!(%user, tenant_id, count = entries.len(), "loaded risk catalog entries");
        Ok(entries)
    }
}
