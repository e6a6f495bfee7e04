use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Caller context threaded explicitly through every gateway and service
/// call. Nothing in the pipeline falls back to an ambient default tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: i64,
    pub authorization: String,
    /// Industry/supplier/retail code the forecast service keys on. Absent
    /// when the tenant has no forecast profile; the forecast column then
    /// degrades to unavailable.
    pub entity_code: Option<String>,
}

impl TenantContext {
    pub fn new(tenant_id: i64, authorization: impl Into<String>) -> Self {
        Self {
            tenant_id,
            authorization: authorization.into(),
            entity_code: None,
        }
    }

    pub fn with_entity_code(mut self, code: impl Into<String>) -> Self {
        self.entity_code = Some(code.into());
        self
    }
}

/// Tenant type a risk catalog entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskUser {
    Industry,
    Supplier,
    Retail,
}

impl fmt::Display for RiskUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskUser::Industry => write!(f, "Industry"),
            RiskUser::Supplier => write!(f, "Supplier"),
            RiskUser::Retail => write!(f, "Retail"),
        }
    }
}

impl FromStr for RiskUser {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Industry" => Ok(RiskUser::Industry),
            "Supplier" => Ok(RiskUser::Supplier),
            "Retail" => Ok(RiskUser::Retail),
            other => Err(DomainError::InvalidRiskUser(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_user_round_trip() {
        for user in [RiskUser::Industry, RiskUser::Supplier, RiskUser::Retail] {
            assert_eq!(user.to_string().parse::<RiskUser>().unwrap(), user);
        }
    }

    #[test]
    fn test_risk_user_rejects_unknown() {
        let result = "Wholesale".parse::<RiskUser>();
        assert!(matches!(result, Err(DomainError::InvalidRiskUser(_))));
    }
}
