use async_trait::async_trait;
use chrono::NaiveDate;
use perisai_domain::error::{DomainError, DomainResult};
use perisai_domain::gateway::FallbackRead;
use perisai_domain::records::{Receive, ReceiveDetail};
use perisai_domain::tenant::TenantContext;
use tracing::debug;

use crate::client::PostgresClient;

/// Direct read of receives with their detail rows, eagerly joined in one
/// statement so the read never partially executes.
pub struct PostgresReceiveReader {
    client: PostgresClient,
}

impl PostgresReceiveReader {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

type ReceiveRow = (i64, Option<i64>, NaiveDate, Option<f64>, Option<f64>);

/// Fold join rows (ordered by receive pkid) back into nested records. A
/// receive without surviving detail rows keeps an empty detail list.
fn fold_receive_rows(rows: Vec<ReceiveRow>) -> Vec<Receive> {
    let mut receives: Vec<Receive> = Vec::new();

    for (pkid, tenant_id, received_date, accepted, rejected) in rows {
        if receives.last().map(|r| r.pkid) != Some(pkid) {
            receives.push(Receive {
                pkid,
                tenant_id,
                received_date,
                details: Vec::new(),
            });
        }
        if let (Some(accepted_quantity), Some(rejected_quantity)) = (accepted, rejected) {
            if let Some(receive) = receives.last_mut() {
                receive.details.push(ReceiveDetail {
                    accepted_quantity,
                    rejected_quantity,
                });
            }
        }
    }

    receives
}

#[async_trait]
impl FallbackRead<Receive> for PostgresReceiveReader {
    async fn read(&self, tenant: &TenantContext) -> DomainResult<Vec<Receive>> {
        debug!(tenant_id = tenant.tenant_id, "reading receives from secondary store");

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT r.pkid, r.tenant_id, r.received_date,
                        d.accepted_quantity, d.rejected_quantity
                 FROM receives r
                 LEFT JOIN receive_details d
                   ON d.receive_pkid = r.pkid
                  AND (d.is_deleted = FALSE OR d.is_deleted IS NULL)
                 WHERE (r.tenant_id = $1 OR r.tenant_id IS NULL)
                   AND (r.is_deleted = FALSE OR r.is_deleted IS NULL)
                 ORDER BY r.pkid",
                &[&tenant.tenant_id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let tuples = rows
            .into_iter()
            .map(|row| (row.get(0), row.get(1), row.get(2), row.get(3), row.get(4)))
            .collect();

        Ok(fold_receive_rows(tuples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fold_groups_details_under_their_receive() {
        let rows = vec![
            (1, Some(1), date(2024, 1, 1), Some(90.0), Some(10.0)),
            (1, Some(1), date(2024, 1, 1), Some(40.0), Some(0.0)),
            (2, None, date(2024, 2, 2), Some(70.0), Some(30.0)),
        ];

        let receives = fold_receive_rows(rows);
        assert_eq!(receives.len(), 2);
        assert_eq!(receives[0].details.len(), 2);
        assert_eq!(receives[1].details.len(), 1);
        assert_eq!(receives[1].tenant_id, None);
    }

    #[test]
    fn test_fold_keeps_detail_less_receive() {
        // LEFT JOIN emits one all-null detail row for a receive without
        // details; the receive must survive with an empty list.
        let rows = vec![(5, Some(1), date(2023, 6, 1), None, None)];

        let receives = fold_receive_rows(rows);
        assert_eq!(receives.len(), 1);
        assert!(receives[0].details.is_empty());
    }
}
