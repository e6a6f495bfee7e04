use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A domain fact that may be scoped to one tenant. A null tenant means the
/// record applies to every tenant (kept for backward compatibility with
/// pre-multi-tenant data).
pub trait TenantScoped {
    fn tenant_id(&self) -> Option<i64>;
}

/// Keep records visible to `tenant_id`: an exact match or an unscoped record.
pub fn filter_tenant<T: TenantScoped>(records: Vec<T>, tenant_id: i64) -> Vec<T> {
    records
        .into_iter()
        .filter(|r| r.tenant_id().map_or(true, |t| t == tenant_id))
        .collect()
}

macro_rules! tenant_scoped {
    ($($ty:ty),+ $(,)?) => {
        $(impl TenantScoped for $ty {
            fn tenant_id(&self) -> Option<i64> {
                self.tenant_id
            }
        })+
    };
}

/// Inventory receipt, eagerly joined with its detail rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Receive {
    pub pkid: i64,
    pub tenant_id: Option<i64>,
    pub received_date: NaiveDate,
    #[serde(alias = "receiveDetails", default)]
    pub details: Vec<ReceiveDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiveDetail {
    pub accepted_quantity: f64,
    pub rejected_quantity: f64,
}

/// Internal inventory transfer. `received_date` is empty while in transit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transfer {
    pub pkid: i64,
    pub tenant_id: Option<i64>,
    pub target_deadline_date: NaiveDate,
    pub received_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductionRequest {
    pub pkid: i64,
    pub tenant_id: Option<i64>,
    pub target_finish_date: NaiveDate,
    pub finished_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectionProduct {
    pub pkid: i64,
    pub tenant_id: Option<i64>,
    pub inspection_date: NaiveDate,
    pub passed_quantity: f64,
    pub failed_quantity: f64,
}

/// Procurement request-for-quotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rfq {
    pub pkid: i64,
    pub tenant_id: Option<i64>,
    pub response_deadline_date: NaiveDate,
    pub responded_date: Option<NaiveDate>,
}

/// One contract shipment observation. The broker groups these by year on
/// the wire; the gateway decoder flattens them back to records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryShipment {
    pub pkid: i64,
    pub tenant_id: Option<i64>,
    pub target_arrival_date: NaiveDate,
    pub arrival_date: Option<NaiveDate>,
}

/// Letter of agreement. `is_fulfilled` is empty while the agreement is
/// still open.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LetterOfAgreement {
    pub pkid: i64,
    pub tenant_id: Option<i64>,
    pub effective_date: NaiveDate,
    pub is_fulfilled: Option<bool>,
}

tenant_scoped!(
    Receive,
    Transfer,
    ProductionRequest,
    InspectionProduct,
    Rfq,
    HistoryShipment,
    LetterOfAgreement,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(pkid: i64, tenant_id: Option<i64>) -> Transfer {
        Transfer {
            pkid,
            tenant_id,
            target_deadline_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            received_date: None,
        }
    }

    #[test]
    fn test_filter_keeps_matching_and_unscoped() {
        let records = vec![transfer(1, Some(1)), transfer(2, None), transfer(3, Some(2))];

        let filtered = filter_tenant(records, 1);
        let pkids: Vec<i64> = filtered.iter().map(|t| t.pkid).collect();
        assert_eq!(pkids, vec![1, 2]);
    }

    #[test]
    fn test_filter_unscoped_visible_to_every_tenant() {
        for tenant in [1, 2, 99] {
            let filtered = filter_tenant(vec![transfer(1, None)], tenant);
            assert_eq!(filtered.len(), 1);
        }
    }

    #[test]
    fn test_receive_decodes_wire_detail_alias() {
        let json = serde_json::json!({
            "pkid": 10,
            "tenant_id": null,
            "received_date": "2024-01-15",
            "receiveDetails": [
                { "accepted_quantity": 90.0, "rejected_quantity": 10.0 }
            ]
        });

        let receive: Receive = serde_json::from_value(json).unwrap();
        assert_eq!(receive.details.len(), 1);
        assert_eq!(receive.details[0].accepted_quantity, 90.0);
    }
}
