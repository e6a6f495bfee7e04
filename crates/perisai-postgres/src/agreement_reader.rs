use async_trait::async_trait;
use perisai_domain::error::{DomainError, DomainResult};
use perisai_domain::gateway::FallbackRead;
use perisai_domain::records::LetterOfAgreement;
use perisai_domain::tenant::TenantContext;
use tracing::debug;

use crate::client::PostgresClient;

pub struct PostgresAgreementReader {
    client: PostgresClient,
}

impl PostgresAgreementReader {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FallbackRead<LetterOfAgreement> for PostgresAgreementReader {
    async fn read(&self, tenant: &TenantContext) -> DomainResult<Vec<LetterOfAgreement>> {
        debug!(
            tenant_id = tenant.tenant_id,
            "reading letters of agreement from secondary store"
        );

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT pkid, tenant_id, effective_date, is_fulfilled
                 FROM letters_of_agreement
                 WHERE (tenant_id = $1 OR tenant_id IS NULL)
                   AND (is_deleted = FALSE OR is_deleted IS NULL)
                 ORDER BY pkid",
                &[&tenant.tenant_id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(rows
            .into_iter()
            .map(|row| LetterOfAgreement {
                pkid: row.get(0),
                tenant_id: row.get(1),
                effective_date: row.get(2),
                is_fulfilled: row.get(3),
            })
            .collect())
    }
}
