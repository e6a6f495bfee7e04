use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::tenant::RiskUser;

/// One configured business risk. Owned by tenant-scoped storage; the
/// reporting pipeline only ever reads it (the write-side lifecycle lives
/// with the tenant-management service).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskCatalogEntry {
    pub pkid: i64,
    pub risk_name: String,
    pub risk_desc: String,
    pub risk_user: RiskUser,
    pub risk_group: String,
    pub risk_mitigation: String,
    pub tenant_id: Option<i64>,
}

/// Read access to the risk catalog. Infrastructure (perisai-postgres)
/// implements this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RiskCatalogRepository: Send + Sync {
    /// Non-deleted catalog entries for one risk user, scoped to
    /// `tenant_id` (entries with a null tenant apply to every tenant).
    async fn list_for_user(
        &self,
        user: RiskUser,
        tenant_id: i64,
    ) -> DomainResult<Vec<RiskCatalogEntry>>;
}
